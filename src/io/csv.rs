use std::{fs::File, path::Path};

use anyhow::{Context, Result};
use polars::{
    frame::DataFrame,
    io::SerWriter,
    prelude::{CsvWriter, NamedFrom},
    series::Series,
};

use crate::engine::Reconciliation;

/// Write one family's reconciliation table as CSV, one row per attribute.
/// An undefined percent difference (zero source sum) is written as an empty
/// cell, not a number.
pub fn write_reconciliation_csv(report: &Reconciliation, path: &Path) -> Result<()> {
    let attributes: Vec<String> = report.rows.iter().map(|row| row.attribute.clone()).collect();
    let source_sums: Vec<f64> = report.rows.iter().map(|row| row.source_sum).collect();
    let target_sums: Vec<f64> = report.rows.iter().map(|row| row.target_sum).collect();
    let differences: Vec<f64> = report.rows.iter().map(|row| row.difference).collect();
    let percents: Vec<Option<f64>> =
        report.rows.iter().map(|row| row.percent_difference).collect();

    let mut df = DataFrame::new(vec![
        Series::new("attribute".into(), attributes).into(),
        Series::new("source_sum".into(), source_sums).into(),
        Series::new("target_sum".into(), target_sums).into(),
        Series::new("difference".into(), differences).into(),
        Series::new("percent_difference".into(), percents).into(),
    ])?;

    let file = File::create(path)
        .with_context(|| format!("failed to create CSV file: {}", path.display()))?;
    CsvWriter::new(file)
        .finish(&mut df)
        .with_context(|| format!("failed to write reconciliation CSV to {}", path.display()))
}
