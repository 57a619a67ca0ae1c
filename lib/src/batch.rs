//! Batch prediction over CSV files.
//!
//! Input is a CSV with a header row naming request fields. Output has one line
//! per input row: `row,prediction,lower_bound,upper_bound,error`. A row that
//! fails is reported in the `error` column; the batch carries on.

use std::io::{Read, Write};

use serde::Serialize;

use crate::attributes::{AttributeValue, PropertyAttributes};
use crate::error::BatchError;
use crate::schema::FeatureGroup;
use crate::service::PredictionService;

/// Counts for a finished batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub rows: usize,
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Debug, Serialize)]
struct OutputRow {
    row: usize,
    prediction: Option<f64>,
    lower_bound: Option<u64>,
    upper_bound: Option<u64>,
    error: Option<String>,
}

impl OutputRow {
    fn failed(row: usize, error: String) -> Self {
        Self {
            row,
            prediction: None,
            lower_bound: None,
            upper_bound: None,
            error: Some(error),
        }
    }
}

fn parse_number_or_text(cell: &str) -> AttributeValue {
    match cell.parse::<f64>() {
        Ok(n) => AttributeValue::Number(n),
        Err(_) => AttributeValue::Text(cell.to_string()),
    }
}

/// Convert one CSV cell according to the column's schema group.
fn cell_value(group: Option<FeatureGroup>, cell: &str) -> AttributeValue {
    match group {
        Some(FeatureGroup::Categorical) => AttributeValue::Text(cell.to_string()),
        _ if cell.is_empty() => AttributeValue::Absent,
        Some(FeatureGroup::Flag) => match cell.to_ascii_lowercase().as_str() {
            "true" => AttributeValue::Bool(true),
            "false" => AttributeValue::Bool(false),
            _ => parse_number_or_text(cell),
        },
        Some(FeatureGroup::Numeric) | None => parse_number_or_text(cell),
    }
}

/// Predict every row of `input` and write the results to `output`.
///
/// Only I/O failures and an unreadable header abort the batch.
pub fn predict_csv<R: Read, W: Write>(
    service: &PredictionService,
    input: R,
    output: W,
) -> Result<BatchSummary, BatchError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);
    let mut writer = csv::Writer::from_writer(output);

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(BatchError::MissingHeader);
    }
    let schema = service.artifact().schema();
    let groups: Vec<Option<FeatureGroup>> = headers.iter().map(|h| schema.group_of(h)).collect();

    let mut summary = BatchSummary::default();
    for (i, record) in reader.records().enumerate() {
        let row = i + 1;
        summary.rows += 1;

        let out = match record {
            Err(err) if err.is_io_error() => return Err(err.into()),
            Err(err) => OutputRow::failed(row, err.to_string()),
            Ok(record) => {
                let attributes: PropertyAttributes = headers
                    .iter()
                    .zip(&groups)
                    .zip(record.iter())
                    .map(|((name, group), cell)| (name, cell_value(*group, cell)))
                    .collect();

                match service.predict(&attributes) {
                    Ok(outcome) => OutputRow {
                        row,
                        prediction: Some(outcome.estimate),
                        lower_bound: Some(outcome.range.lower_bound),
                        upper_bound: Some(outcome.range.upper_bound),
                        error: None,
                    },
                    Err(failure) => OutputRow::failed(row, failure.to_string()),
                }
            }
        };

        if let Some(error) = &out.error {
            tracing::warn!(row, %error, "batch row failed");
            summary.failed += 1;
        } else {
            summary.succeeded += 1;
        }
        writer.serialize(&out)?;
    }

    writer.flush()?;
    tracing::info!(
        rows = summary.rows,
        succeeded = summary.succeeded,
        failed = summary.failed,
        "batch prediction finished"
    );
    Ok(summary)
}
