use std::path::Path;

use crate::error::Result;
use crate::pipeline::metrics::format_float;
use crate::pipeline::MetricsRow;

const BASE_COLUMNS: [&str; 10] = [
    "frame",
    "time",
    "area_pred",
    "growth_pred",
    "component_count",
    "rod_like",
    "elongated",
    "compact",
    "other",
    "division_like",
];

/// Write the metrics table. The `area_gt` column is present only when at
/// least one row carries ground truth.
pub fn write_metrics_csv(path: &Path, rows: &[MetricsRow]) -> Result<()> {
    let with_gt = rows.iter().any(|r| r.area_gt.is_some());
    let mut writer = csv::Writer::from_path(path)?;

    let mut header: Vec<&str> = BASE_COLUMNS.to_vec();
    if with_gt {
        header.push("area_gt");
    }
    writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![
            row.frame.to_string(),
            row.time.to_string(),
            row.area_pred.to_string(),
            format_float(row.growth_pred),
            row.component_count.to_string(),
            row.rod_like.to_string(),
            row.elongated.to_string(),
            row.compact.to_string(),
            row.other.to_string(),
            row.division_like.to_string(),
        ];
        if with_gt {
            record.push(row.area_gt.unwrap_or(0).to_string());
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
