use crate::adapters::input::parse_value;
use crate::core::contract::FeatureContract;
use crate::core::predictor::PredictorFacade;
use crate::domain::model::ParameterMapping;
use crate::domain::ports::Regressor;
use crate::utils::error::{PredictorError, Result};
use serde::Serialize;
use std::io::{Read, Write};
use std::path::Path;

/// One output line of a batch run. `row` is 1-based, not counting the header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchRecord {
    pub row: usize,
    pub prediction: Option<f64>,
    pub error: Option<String>,
}

impl BatchRecord {
    pub fn from_result(row: usize, result: &Result<f64>) -> Self {
        match result {
            Ok(value) => Self {
                row,
                prediction: Some(*value),
                error: None,
            },
            Err(e) => Self {
                row,
                prediction: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Reads a headed CSV into one mapping per record. Empty cells are left out
/// so that they surface as missing features. A record that cannot be read
/// (e.g. wrong number of fields) becomes an error for that row only.
pub fn read_mappings<R: Read>(
    contract: &FeatureContract,
    reader: R,
) -> Result<Vec<Result<ParameterMapping>>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let rows: Vec<Result<ParameterMapping>> = csv_reader
        .records()
        .map(|record| {
            let record = record.map_err(PredictorError::from)?;
            Ok(headers
                .iter()
                .zip(record.iter())
                .filter(|(_, cell)| !cell.is_empty())
                .map(|(name, cell)| (name.to_string(), parse_value(contract, name, cell)))
                .collect())
        })
        .collect();

    tracing::debug!(records = rows.len(), "CSV input parsed");
    Ok(rows)
}

pub fn read_mappings_from_file<P: AsRef<Path>>(
    contract: &FeatureContract,
    path: P,
) -> Result<Vec<Result<ParameterMapping>>> {
    let file = std::fs::File::open(path)?;
    read_mappings(contract, file)
}

/// 逐列預測；讀取失敗的列直接保留其錯誤
pub fn predict_rows<M: Regressor>(
    facade: &PredictorFacade<M>,
    rows: Vec<Result<ParameterMapping>>,
) -> Vec<Result<f64>> {
    rows.into_iter()
        .map(|row| row.and_then(|parameters| facade.predict(&parameters)))
        .collect()
}

pub fn write_results<W: Write>(writer: W, results: &[Result<f64>]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for (idx, result) in results.iter().enumerate() {
        csv_writer.serialize(BatchRecord::from_result(idx + 1, result))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_results_to_file<P: AsRef<Path>>(path: P, results: &[Result<f64>]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = std::fs::File::create(path)?;
    write_results(file, results)
}
