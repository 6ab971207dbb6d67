use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::{ColonyError, Result};
use crate::frame::{normalize_minmax, Frame, SourceInfo, SourceKind};
use crate::mask::BinaryMask;

use super::image_io::{is_image_file, load_gray, load_mask};
use super::ser::SerReader;

/// Subdirectory holding raw frames in a segmentation dataset.
pub const RAW_IMAGES_DIR: &str = "raw_images";
/// Subdirectory holding ground-truth masks in a segmentation dataset.
pub const MASKS_DIR: &str = "manual_segmentation_masks";

/// A loaded, normalized frame sequence ready for analysis.
#[derive(Clone, Debug)]
pub struct FrameSequence {
    /// Min-max normalized to [0, 1], in sequence order.
    pub frames: Vec<Frame>,
    /// Ground-truth masks, indexed like `frames`, when the source has them.
    pub ground_truth: Option<Vec<BinaryMask>>,
    pub source: SourceInfo,
}

impl FrameSequence {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Display name of the source: its file or directory name.
    pub fn source_name(&self) -> String {
        self.source
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.path.display().to_string())
    }
}

/// Load a SER video or an image directory, chosen by what `path` is.
pub fn load_sequence(path: &Path) -> Result<FrameSequence> {
    if path.is_dir() {
        return load_image_directory(path);
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("ser") => load_ser_sequence(path),
        _ if path.exists() => Err(ColonyError::UnsupportedInput(format!(
            "{}: expected a .ser video or an image directory",
            path.display()
        ))),
        _ => Err(ColonyError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        ))),
    }
}

/// Read every frame of a SER file, converting color to luminance and
/// stretching each frame to [0, 1].
pub fn load_ser_sequence(path: &Path) -> Result<FrameSequence> {
    let reader = SerReader::open(path)?;
    let source = reader.source_info(path);
    info!(
        path = %path.display(),
        frames = source.total_frames,
        width = source.width,
        height = source.height,
        "Reading SER video"
    );
    let frames = (0..reader.frame_count())
        .into_par_iter()
        .map(|i| {
            let mut frame = reader.read_frame(i)?;
            frame.data = normalize_minmax(&frame.data);
            Ok(frame)
        })
        .collect::<Result<Vec<_>>>()?;
    if frames.is_empty() {
        return Err(ColonyError::EmptySequence);
    }
    Ok(FrameSequence {
        frames,
        ground_truth: None,
        source,
    })
}

/// Load a directory of still images, sorted by file name.
///
/// When the directory contains `raw_images/`, frames come from there and
/// ground truth from a sibling `manual_segmentation_masks/` if present.
pub fn load_image_directory(dir: &Path) -> Result<FrameSequence> {
    let raw_dir = if dir.join(RAW_IMAGES_DIR).is_dir() {
        dir.join(RAW_IMAGES_DIR)
    } else {
        dir.to_path_buf()
    };
    let image_paths = list_images(&raw_dir)?;
    if image_paths.is_empty() {
        return Err(ColonyError::EmptySequence);
    }

    let frames = image_paths
        .par_iter()
        .enumerate()
        .map(|(i, path)| {
            let raw = load_gray(path)?;
            Ok(Frame::with_index(normalize_minmax(&raw), i))
        })
        .collect::<Result<Vec<_>>>()?;
    let (h, w) = frames[0].dim();
    check_shapes(frames.iter().map(|f| f.dim()), (h, w), "dataset frame")?;

    let masks_dir = dir.join(MASKS_DIR);
    let ground_truth = if masks_dir.is_dir() {
        let mask_paths = list_images(&masks_dir)?;
        let masks = mask_paths
            .par_iter()
            .map(|p| load_mask(p))
            .collect::<Result<Vec<_>>>()?;
        check_shapes(masks.iter().map(|m| m.dim()), (h, w), "ground-truth mask")?;
        debug!(masks = masks.len(), "Loaded ground-truth masks");
        (!masks.is_empty()).then_some(masks)
    } else {
        None
    };

    let bit_depth = image::open(&image_paths[0])
        .map(|img| {
            let color = img.color();
            (color.bits_per_pixel() / color.channel_count() as u16) as u8
        })
        .unwrap_or(8);

    info!(
        path = %dir.display(),
        frames = frames.len(),
        ground_truth = ground_truth.as_ref().map_or(0, |g| g.len()),
        "Loaded image dataset"
    );

    Ok(FrameSequence {
        source: SourceInfo {
            path: dir.to_path_buf(),
            kind: SourceKind::Dataset,
            total_frames: frames.len(),
            width: w as u32,
            height: h as u32,
            bit_depth,
            ground_truth_frames: ground_truth.as_ref().map_or(0, |g| g.len()),
        },
        frames,
        ground_truth,
    })
}

fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_image_file(p))
        .collect();
    paths.sort();
    Ok(paths)
}

fn check_shapes(
    dims: impl Iterator<Item = (usize, usize)>,
    expected: (usize, usize),
    what: &str,
) -> Result<()> {
    for (i, dim) in dims.enumerate() {
        if dim != expected {
            return Err(ColonyError::ShapeMismatch {
                expected,
                actual: dim,
                context: format!("{what} {i}"),
            });
        }
    }
    Ok(())
}
