#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use sheet_insights::grid::ValueGrid;
use tempfile::{TempDir, tempdir};

pub const SALES_HEADER: &str = "region,units,price,ordered,active,note";
const REGIONS: [&str; 3] = ["North", "South", "East"];

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

/// Sales-like CSV: `units` and `price` rise in lockstep, `region` cycles
/// through three values, `active` alternates and every fourth `note` is blank.
pub fn sales_csv(rows: usize) -> String {
    let mut out = String::from(SALES_HEADER);
    out.push('\n');
    for i in 0..rows {
        let region = REGIONS[i % REGIONS.len()];
        let units = 10 + i;
        let price = 2.0 + i as f64 * 0.5;
        let day = (i % 28) + 1;
        let active = i % 2 == 0;
        let note = if i % 4 == 0 {
            String::new()
        } else {
            format!("note {i}")
        };
        out.push_str(&format!(
            "{region},{units},{price:.2},2024-01-{day:02},{active},{note}\n"
        ));
    }
    out
}

pub fn sales_grid(rows: usize) -> ValueGrid {
    grid_from_csv(&sales_csv(rows))
}

pub fn grid_from_csv(text: &str) -> ValueGrid {
    let rows = sheet_insights::io_utils::parse_delimited(text, b',', 0).expect("parse csv");
    ValueGrid::from_text_rows(rows).expect("build grid")
}
