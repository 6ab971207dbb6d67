use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::analysis::PhenotypeCounts;
use crate::render::FrameArtifactRefs;

use super::types::FrameRecord;

/// One row of the exported metrics table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricsRow {
    pub frame: usize,
    /// Seconds since the first analyzed frame: `frame / fps`.
    pub time: f64,
    pub area_pred: usize,
    #[serde(serialize_with = "serialize_float", deserialize_with = "deserialize_float")]
    pub growth_pred: f64,
    pub component_count: usize,
    pub rod_like: usize,
    pub elongated: usize,
    pub compact: usize,
    pub other: usize,
    /// 1 when the frame was flagged as division-like.
    pub division_like: u8,
    pub area_gt: Option<usize>,
}

impl MetricsRow {
    pub fn from_record(record: &FrameRecord, fps: f64) -> Self {
        let counts = record.phenotype_counts;
        Self {
            frame: record.frame,
            time: record.frame as f64 / fps,
            area_pred: record.biomass,
            growth_pred: record.growth_rate,
            component_count: record.component_count(),
            rod_like: counts.rod_like,
            elongated: counts.elongated,
            compact: counts.compact,
            other: counts.other,
            division_like: u8::from(record.division_like),
            area_gt: record.area_gt,
        }
    }
}

pub fn metrics_rows(records: &[FrameRecord], fps: f64) -> Vec<MetricsRow> {
    records
        .iter()
        .map(|r| MetricsRow::from_record(r, fps))
        .collect()
}

/// Column-oriented metrics, as returned to clients.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSeries {
    pub time: Vec<f64>,
    pub area_pred: Vec<usize>,
    /// Present only when ground truth was supplied.
    pub area_gt: Option<Vec<usize>>,
    /// `-inf` on frames where the biomass drops to zero.
    #[serde(serialize_with = "serialize_floats", deserialize_with = "deserialize_floats")]
    pub growth_pred: Vec<f64>,
    pub division_like: Vec<u8>,
    pub component_count: Vec<usize>,
    pub phenotype_counts: Vec<PhenotypeCounts>,
}

impl MetricsSeries {
    pub fn from_rows(rows: &[MetricsRow]) -> Self {
        let has_gt = rows.iter().any(|r| r.area_gt.is_some());
        Self {
            time: rows.iter().map(|r| r.time).collect(),
            area_pred: rows.iter().map(|r| r.area_pred).collect(),
            area_gt: has_gt.then(|| rows.iter().map(|r| r.area_gt.unwrap_or(0)).collect()),
            growth_pred: rows.iter().map(|r| r.growth_pred).collect(),
            division_like: rows.iter().map(|r| r.division_like).collect(),
            component_count: rows.iter().map(|r| r.component_count).collect(),
            phenotype_counts: rows
                .iter()
                .map(|r| PhenotypeCounts {
                    rod_like: r.rod_like,
                    elongated: r.elongated,
                    compact: r.compact,
                    other: r.other,
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// Payload stored on a completed job.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub job_id: String,
    /// Number of analyzed (window-center) frames.
    pub n_frames: usize,
    pub fps: f64,
    pub frames: Vec<FrameArtifactRefs>,
    pub video: Option<PathBuf>,
    pub metrics_csv: Option<PathBuf>,
    pub metrics: MetricsSeries,
    pub division_events: Vec<usize>,
}

/// Text form of a float, spelling out `nan`, `inf` and `-inf`.
pub(crate) fn format_float(v: f64) -> String {
    if v.is_nan() {
        "nan".into()
    } else if v.is_infinite() {
        if v > 0.0 { "inf".into() } else { "-inf".into() }
    } else {
        v.to_string()
    }
}

/// JSON has no non-finite numbers; those travel as their text form.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum FloatRepr {
    Number(f64),
    Text(String),
}

impl FloatRepr {
    fn new(v: f64) -> Self {
        if v.is_finite() {
            Self::Number(v)
        } else {
            Self::Text(format_float(v))
        }
    }

    fn into_f64<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            Self::Number(v) => Ok(v),
            Self::Text(text) => text
                .parse()
                .map_err(|_| E::custom(format!("invalid float {text:?}"))),
        }
    }
}

fn serialize_float<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    FloatRepr::new(*value).serialize(serializer)
}

fn deserialize_float<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    FloatRepr::deserialize(deserializer)?.into_f64()
}

fn serialize_floats<S>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(values.iter().map(|&v| FloatRepr::new(v)))
}

fn deserialize_floats<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<FloatRepr>::deserialize(deserializer)?
        .into_iter()
        .map(FloatRepr::into_f64)
        .collect()
}
