use crate::dataset::Dataset;
use crate::errors::DashboardError;
use crate::models::Record;
use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::{info, warn};

/// Cells read as missing rather than as a number.
const MISSING_MARKERS: [&str; 9] = ["", "NA", "N/A", "n/a", "NaN", "nan", "-nan", "null", "NULL"];

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Location")]
    location: String,
    #[serde(rename = "Cond Type")]
    cond_type: String,
    #[serde(rename = "Value")]
    value: Option<String>,
}

pub fn resolve_data_path() -> PathBuf {
    if let Ok(path) = env::var("COVID_DATA_PATH") {
        return PathBuf::from(path);
    }

    PathBuf::from("data/covid_data.csv")
}

pub async fn load_dataset(path: &Path) -> Result<Dataset, DashboardError> {
    let bytes = fs::read(path).await?;
    let dataset = parse_dataset(&bytes)?;
    info!(path = %path.display(), rows = dataset.len(), "loaded dataset");
    if dataset.is_empty() {
        warn!("dataset has no rows; charts will be empty");
    }
    Ok(dataset)
}

pub fn parse_dataset(bytes: &[u8]) -> Result<Dataset, DashboardError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(bytes);

    let mut records = Vec::new();
    for (index, row) in reader.deserialize::<CsvRow>().enumerate() {
        let row = row?;
        // header is line 1
        let line = index as u64 + 2;
        let date = parse_date(&row.date).ok_or_else(|| DashboardError::InvalidDate {
            row: line,
            value: row.date.clone(),
        })?;
        let value = parse_value(row.value.as_deref(), line)?;
        records.push(Record {
            date,
            location: row.location,
            cond_type: row.cond_type.parse()?,
            value,
        });
    }

    Ok(Dataset::new(records))
}

/// `M/D/YYYY`, `M/D/YY` or `YYYY-MM-DD`. The year field's width picks the format,
/// since `%Y` would otherwise read `21` as the year 21.
fn parse_date(value: &str) -> Option<NaiveDate> {
    let format = if let Some((_, year)) = value.rsplit_once('/') {
        match year.len() {
            2 => "%m/%d/%y",
            4 => "%m/%d/%Y",
            _ => return None,
        }
    } else {
        match value.split_once('-') {
            Some((year, _)) if year.len() == 4 => "%Y-%m-%d",
            _ => return None,
        }
    };
    NaiveDate::parse_from_str(value, format).ok()
}

/// Counts are finite and non-negative; missing markers become `None`.
fn parse_value(raw: Option<&str>, line: u64) -> Result<Option<f64>, DashboardError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    if MISSING_MARKERS.contains(&raw) {
        return Ok(None);
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(Some(value)),
        _ => Err(DashboardError::InvalidValue {
            row: line,
            value: raw.to_string(),
        }),
    }
}
