//! Grid loading: delimiter and encoding resolution, CSV and JSON readers.
//!
//! Every command reads its input through [`load_grid`]. The input shape is
//! picked from the path:
//!
//! - `-` reads delimited text from stdin.
//! - `.json` expects an array of row arrays, the shape a spreadsheet range
//!   export produces; JSON scalars keep their native type.
//! - anything else is delimited text, tab for `.tsv` and comma otherwise,
//!   unless `--delimiter` overrides it.
//!
//! The first row is always the header row.

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};
use log::{debug, info};

use crate::{cli::InputArgs, data::CellValue, grid::ValueGrid};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

fn read_input_bytes(path: &Path) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    if is_dash(path) {
        std::io::stdin()
            .lock()
            .read_to_end(&mut bytes)
            .context("Reading input from stdin")?;
    } else {
        let file = File::open(path).with_context(|| format!("Opening input file {path:?}"))?;
        BufReader::new(file)
            .read_to_end(&mut bytes)
            .with_context(|| format!("Reading input file {path:?}"))?;
    }
    Ok(bytes)
}

/// Parses delimited text into raw string rows, header row included.
///
/// Records may have differing field counts; the grid normalizes them.
pub fn parse_delimited(text: &str, delimiter: u8, limit: usize) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        if limit > 0 && idx > limit {
            break;
        }
        let record = record.with_context(|| format!("Reading CSV record {}", idx + 1))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// Parses a JSON array of row arrays, header row included.
pub fn parse_json_rows(text: &str, limit: usize) -> Result<Vec<Vec<CellValue>>> {
    let document: Vec<Vec<serde_json::Value>> =
        serde_json::from_str(text).context("Parsing JSON grid (expected an array of rows)")?;
    let take = if limit > 0 { limit + 1 } else { usize::MAX };
    Ok(document
        .into_iter()
        .take(take)
        .enumerate()
        .map(|(idx, row)| {
            row.iter()
                .map(|value| match (idx, value) {
                    (0, serde_json::Value::String(text)) => CellValue::Text(text.clone()),
                    (0, serde_json::Value::Null) => CellValue::Empty,
                    (0, other) => CellValue::Text(other.to_string()),
                    (_, other) => CellValue::from_json(other),
                })
                .collect()
        })
        .collect())
}

pub fn load_grid(source: &InputArgs) -> Result<ValueGrid> {
    let path = source.input.as_path();
    let encoding = resolve_encoding(source.input_encoding.as_deref())?;
    let bytes = read_input_bytes(path)?;
    let text = decode_bytes(&bytes, encoding).with_context(|| format!("Decoding {path:?}"))?;

    let grid = if is_json(path) && !is_dash(path) {
        info!("Loading JSON grid from {path:?}");
        let rows = parse_json_rows(&text, source.limit)?;
        ValueGrid::from_rows(rows).with_context(|| format!("Building grid from {path:?}"))?
    } else {
        let delimiter = resolve_input_delimiter(path, source.delimiter);
        info!(
            "Loading '{}' with delimiter '{}'",
            path.display(),
            printable_delimiter(delimiter)
        );
        let rows = parse_delimited(&text, delimiter, source.limit)
            .with_context(|| format!("Parsing {path:?}"))?;
        ValueGrid::from_text_rows(rows).with_context(|| format!("Building grid from {path:?}"))?
    };
    debug!(
        "Loaded {} data row(s) across {} column(s)",
        grid.row_count(),
        grid.column_count()
    );
    Ok(grid)
}
