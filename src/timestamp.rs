//! Epoch timestamp conversion.

use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use clap::ValueEnum;
use log::info;
use serde::Serialize;
use thiserror::Error;

use crate::{
    cli::{OutputFormat, TimestampArgs},
    data::parse_datetime_text,
    table,
};

/// Magnitudes at or above this are read as milliseconds.
pub const MILLISECOND_THRESHOLD: i64 = 100_000_000_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimestampError {
    #[error("epoch value {value} is out of range for {unit:?}")]
    OutOfRange { value: i64, unit: TimestampUnit },
    #[error("'{0}' is neither an epoch number nor a recognised date")]
    Unparseable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "kebab-case")]
pub enum TimestampUnit {
    Seconds,
    Milliseconds,
}

pub fn detect_unit(value: i64) -> TimestampUnit {
    if value.unsigned_abs() >= MILLISECOND_THRESHOLD.unsigned_abs() {
        TimestampUnit::Milliseconds
    } else {
        TimestampUnit::Seconds
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversion {
    pub utc: NaiveDateTime,
    pub seconds: i64,
    pub milliseconds: i64,
}

impl Conversion {
    fn from_utc(utc: DateTime<Utc>) -> Self {
        Self {
            utc: utc.naive_utc(),
            seconds: utc.timestamp(),
            milliseconds: utc.timestamp_millis(),
        }
    }

    pub fn iso(&self) -> String {
        self.utc.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }

    pub fn date(&self) -> String {
        self.utc.format("%Y-%m-%d").to_string()
    }
}

pub fn from_epoch(value: i64, unit: Option<TimestampUnit>) -> Result<Conversion, TimestampError> {
    let unit = unit.unwrap_or_else(|| detect_unit(value));
    let utc = match unit {
        TimestampUnit::Seconds => DateTime::from_timestamp(value, 0),
        TimestampUnit::Milliseconds => DateTime::from_timestamp_millis(value),
    }
    .ok_or(TimestampError::OutOfRange { value, unit })?;
    Ok(Conversion::from_utc(utc))
}

/// Dates without a time component are taken as midnight UTC.
pub fn from_date_text(text: &str) -> Result<Conversion, TimestampError> {
    let parsed = parse_datetime_text(text.trim())
        .map_err(|_| TimestampError::Unparseable(text.to_string()))?;
    Ok(Conversion::from_utc(parsed.and_utc()))
}

/// Epoch when the input is an integer, date text otherwise.
pub fn convert(input: &str, unit: Option<TimestampUnit>) -> Result<Conversion, TimestampError> {
    match input.trim().parse::<i64>() {
        Ok(value) => from_epoch(value, unit),
        Err(_) => from_date_text(input),
    }
}

pub fn execute(args: &TimestampArgs) -> Result<()> {
    let conversion = convert(&args.value, args.unit)?;
    match args.format {
        OutputFormat::Json => {
            let document = serde_json::json!({
                "input": args.value,
                "iso": conversion.iso(),
                "date": conversion.date(),
                "seconds": conversion.seconds,
                "milliseconds": conversion.milliseconds,
            });
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        OutputFormat::Table => {
            let headers = ["iso", "date", "seconds", "milliseconds"].map(String::from);
            let rows = vec![vec![
                conversion.iso(),
                conversion.date(),
                conversion.seconds.to_string(),
                conversion.milliseconds.to_string(),
            ]];
            table::print_table(&headers, &rows);
        }
    }
    info!("Converted '{}' to {}", args.value.trim(), conversion.iso());
    Ok(())
}
