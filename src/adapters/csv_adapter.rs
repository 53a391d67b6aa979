//! CSV file data adapter.
//!
//! Reads headered two-column files: `time,close` for prices and
//! `time,position` for positions. Rows are sorted by timestamp after
//! parsing; duplicate timestamps within one file are rejected.

use crate::domain::error::PostesterError;
use crate::domain::series::{PositionPoint, PricePoint};
use crate::ports::data_port::DataPort;
use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};

pub struct CsvAdapter {
    close_path: PathBuf,
    position_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(close_path: PathBuf, position_path: PathBuf) -> Self {
        Self {
            close_path,
            position_path,
        }
    }

    fn read_rows(path: &Path, value_column: &str) -> Result<Vec<(NaiveDateTime, f64)>, PostesterError> {
        let content = fs::read_to_string(path).map_err(|e| PostesterError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut rows = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| PostesterError::Data {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;

            let time_str = record.get(0).ok_or_else(|| PostesterError::Data {
                reason: format!("missing time column in {}", path.display()),
            })?;
            let time = parse_time(time_str).ok_or_else(|| PostesterError::Data {
                reason: format!("invalid timestamp '{}' in {}", time_str, path.display()),
            })?;

            let value: f64 = record
                .get(1)
                .ok_or_else(|| PostesterError::Data {
                    reason: format!("missing {} column in {}", value_column, path.display()),
                })?
                .parse()
                .map_err(|e| PostesterError::Data {
                    reason: format!("invalid {} value in {}: {}", value_column, path.display(), e),
                })?;

            rows.push((time, value));
        }

        rows.sort_by_key(|(time, _)| *time);
        for window in rows.windows(2) {
            if window[0].0 == window[1].0 {
                return Err(PostesterError::Data {
                    reason: format!("duplicate timestamp {} in {}", window[0].0, path.display()),
                });
            }
        }
        Ok(rows)
    }
}

fn parse_time(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .ok()
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

impl DataPort for CsvAdapter {
    fn fetch_closes(&self) -> Result<Vec<PricePoint>, PostesterError> {
        Ok(Self::read_rows(&self.close_path, "close")?
            .into_iter()
            .map(|(time, close)| PricePoint { time, close })
            .collect())
    }

    fn fetch_positions(&self) -> Result<Vec<PositionPoint>, PostesterError> {
        Ok(Self::read_rows(&self.position_path, "position")?
            .into_iter()
            .map(|(time, position)| PositionPoint { time, position })
            .collect())
    }
}
