use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::RgbImage;
use tracing::{debug, info};

use crate::consts::{GT_OVERLAY_COLOR, OVERLAY_ALPHA, PRED_OVERLAY_COLOR};
use crate::error::{ColonyError, Result};
use crate::io::image_io::save_rgb_png;
use crate::io::ser::SerHeader;
use crate::io::ser_writer::SerWriter;
use crate::pipeline::{AnalysisResult, MetricsRow};

use super::csv_export::write_metrics_csv;
use super::caption::{caption_bar, CaptionText};
use super::overlay::{division_banner, gray_to_rgb, hstack, overlay_mask, vstack};
use super::{FrameArtifactRefs, FrameArtifacts, Renderer};

pub const FRAMES_DIR: &str = "frames";
pub const VIDEO_FILE: &str = "overlay.ser";
pub const METRICS_FILE: &str = "metrics.csv";
pub const SUMMARY_FILE: &str = "result.json";

/// Writes a job's artifacts under one directory:
///
/// ```text
/// <root>/frames/{orig,gt,pred,triplet}_NNNN.png   (triplet carries a caption bar)
/// <root>/overlay.ser
/// <root>/metrics.csv
/// <root>/result.json
/// ```
pub struct DirectoryRenderer {
    root: PathBuf,
    frames_dir: PathBuf,
    video_frames: Vec<RgbImage>,
}

impl DirectoryRenderer {
    pub fn new(root: &Path) -> Result<Self> {
        let frames_dir = root.join(FRAMES_DIR);
        std::fs::create_dir_all(&frames_dir)?;
        Ok(Self {
            root: root.to_path_buf(),
            frames_dir,
            video_frames: Vec::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn save(&self, img: &RgbImage, kind: &str, index: usize) -> Result<PathBuf> {
        let path = self.frames_dir.join(format!("{kind}_{index:04}.png"));
        save_rgb_png(img, &path)?;
        Ok(path)
    }
}

impl Renderer for DirectoryRenderer {
    fn render_frame(&mut self, artifacts: &FrameArtifacts<'_>) -> Result<FrameArtifactRefs> {
        let index = artifacts.record.frame;
        let data = &artifacts.frame.data;
        for mask in std::iter::once(artifacts.pred_mask).chain(artifacts.gt_mask) {
            if mask.dim() != data.dim() {
                return Err(ColonyError::ShapeMismatch {
                    expected: data.dim(),
                    actual: mask.dim(),
                    context: format!("render mask for frame {index}"),
                });
            }
        }

        let orig = gray_to_rgb(data);
        let pred = overlay_mask(data, artifacts.pred_mask, PRED_OVERLAY_COLOR, OVERLAY_ALPHA);
        let gt = artifacts
            .gt_mask
            .map(|m| overlay_mask(data, m, GT_OVERLAY_COLOR, OVERLAY_ALPHA));
        let panels = hstack(&[&orig, gt.as_ref().unwrap_or(&orig), &pred]);
        let caption = caption_bar(
            panels.width(),
            &CaptionText {
                time: index as f64 / artifacts.fps,
                area_gt: artifacts.record.area_gt,
                area_pred: artifacts.record.biomass,
                growth: artifacts.record.growth_rate,
            },
        );
        let triplet = vstack(&[&caption, &panels]);

        let refs = FrameArtifactRefs {
            index,
            orig: Some(self.save(&orig, "orig", index)?),
            gt: gt.as_ref().map(|g| self.save(g, "gt", index)).transpose()?,
            pred: Some(self.save(&pred, "pred", index)?),
            triplet: Some(self.save(&triplet, "triplet", index)?),
        };

        let mut video_frame = pred;
        if artifacts.record.division_like {
            division_banner(&mut video_frame);
        }
        self.video_frames.push(video_frame);
        debug!(index, "Rendered frame artifacts");
        Ok(refs)
    }

    fn finish_video(&mut self) -> Result<Option<PathBuf>> {
        let Some(first) = self.video_frames.first() else {
            return Ok(None);
        };
        let (w, h) = first.dimensions();
        let path = self.root.join(VIDEO_FILE);
        let header = SerHeader::rgb8(w, h, self.video_frames.len() as u32);
        let mut writer = SerWriter::create(&path, &header)?;
        for frame in self.video_frames.drain(..) {
            writer.write_raw_frame(frame.as_raw())?;
        }
        writer.finalize()?;
        info!(path = %path.display(), "Wrote overlay video");
        Ok(Some(path))
    }

    fn write_metrics(&mut self, rows: &[MetricsRow]) -> Result<Option<PathBuf>> {
        let path = self.root.join(METRICS_FILE);
        write_metrics_csv(&path, rows)?;
        Ok(Some(path))
    }

    fn write_summary(&mut self, result: &AnalysisResult) -> Result<Option<PathBuf>> {
        let path = self.root.join(SUMMARY_FILE);
        let writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(writer, result)?;
        Ok(Some(path))
    }
}
