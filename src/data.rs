//! Tagged cell values and the parsing rules that assign their tags.
//!
//! Every cell is classified exactly once, when the grid is ingested, using a
//! fixed precedence: empty, numeric, date, boolean, text. Downstream code
//! switches on [`CellValue`] instead of re-deriving the type of a cell.

use std::fmt;

use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Boolean(bool),
    Date(NaiveDateTime),
    #[default]
    Empty,
}

impl CellValue {
    /// Classifies a raw textual cell.
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::Empty;
        }
        if let Some(number) = parse_decimal(trimmed) {
            return CellValue::Number(number);
        }
        if let Ok(date) = parse_datetime_text(trimmed) {
            return CellValue::Date(date);
        }
        if let Some(flag) = parse_boolean(trimmed) {
            return CellValue::Boolean(flag);
        }
        CellValue::Text(raw.to_string())
    }

    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Empty,
            serde_json::Value::Bool(flag) => CellValue::Boolean(*flag),
            serde_json::Value::Number(number) => number
                .as_f64()
                .map(CellValue::Number)
                .unwrap_or_else(|| CellValue::Text(number.to_string())),
            serde_json::Value::String(text) => CellValue::from_raw(text),
            other => CellValue::Text(other.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.is_empty(),
            _ => false,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(number) if number.is_finite() => Some(*number),
            CellValue::Text(text) => parse_decimal(text.trim()),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::Date(date) => Some(*date),
            CellValue::Text(text) => parse_datetime_text(text.trim()).ok(),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            CellValue::Boolean(flag) => Some(*flag),
            CellValue::Text(text) => parse_boolean(text.trim()),
            _ => None,
        }
    }

    /// String form used for distinct counts and frequency tables.
    pub fn display(&self) -> String {
        match self {
            CellValue::Number(number) => format_number(*number),
            CellValue::Text(text) => text.clone(),
            CellValue::Boolean(flag) => flag.to_string(),
            CellValue::Date(date) => format_datetime(date),
            CellValue::Empty => String::new(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl Serialize for CellValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            CellValue::Number(number) => serializer.serialize_f64(*number),
            CellValue::Boolean(flag) => serializer.serialize_bool(*flag),
            CellValue::Empty => serializer.serialize_none(),
            other => serializer.serialize_str(&other.display()),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::from_raw(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::Date(value)
    }
}

/// Strict decimal parse: finite values only, and at least one digit.
pub fn parse_decimal(value: &str) -> Option<f64> {
    if !value.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse::<f64>().ok().filter(|number| number.is_finite())
}

/// Only the all-lower and all-upper spellings count; `True` stays text.
pub fn parse_boolean(value: &str) -> Option<bool> {
    match value {
        "true" | "TRUE" => Some(true),
        "false" | "FALSE" => Some(false),
        _ => None,
    }
}

pub fn parse_naive_date(value: &str) -> Result<NaiveDate> {
    const DATE_FORMATS: &[&str] = &[
        "%Y-%m-%d",
        "%m/%d/%Y",
        "%d/%m/%Y",
        "%Y/%m/%d",
        "%d-%m-%Y",
        "%b %d, %Y",
        "%B %d, %Y",
        "%d %b %Y",
        "%d %B %Y",
    ];
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as date"))
}

pub fn parse_naive_datetime(value: &str) -> Result<NaiveDateTime> {
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%m/%d/%Y %H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
        "%m/%d/%Y %H:%M",
    ];
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as datetime"))
}

/// Accepts either a calendar date (taken as midnight UTC) or a date-time.
pub fn parse_datetime_text(value: &str) -> Result<NaiveDateTime> {
    if let Ok(date) = parse_naive_date(value) {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    parse_naive_datetime(value)
}

pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        let rendered = format!("{value:.4}");
        rendered
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

pub fn format_datetime(value: &NaiveDateTime) -> String {
    if value.time() == NaiveTime::MIN {
        value.format("%Y-%m-%d").to_string()
    } else {
        value.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
