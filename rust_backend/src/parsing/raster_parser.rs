use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

/// Rectangular block of numbers read from a whitespace-delimited text file.
///
/// Values are stored row-major; `nan` tokens are kept as `f64::NAN`.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Raster {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flattened row-major values.
    pub fn values(&self) -> &[f64] {
        &self.data
    }
}

/// Parse a raster text file.
pub fn parse_raster_file(path: &Path) -> Result<Raster> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read raster file {}", path.display()))?;
    parse_raster_str(&content).with_context(|| format!("Invalid raster file {}", path.display()))
}

/// Parse raster text: one row per line, whitespace between columns.
///
/// Everything after `#` on a line is ignored, as are blank lines. All rows
/// must have the same number of columns.
pub fn parse_raster_str(content: &str) -> Result<Raster> {
    let mut data = Vec::new();
    let mut cols: Option<usize> = None;
    let mut rows = 0;

    for (line_no, line) in content.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("");
        if line.trim().is_empty() {
            continue;
        }

        let start = data.len();
        for (col, token) in line.split_whitespace().enumerate() {
            let value: f64 = token.parse().with_context(|| {
                format!(
                    "Invalid number '{}' at line {}, column {}",
                    token,
                    line_no + 1,
                    col + 1
                )
            })?;
            data.push(value);
        }

        let width = data.len() - start;
        match cols {
            None => cols = Some(width),
            Some(expected) if expected != width => bail!(
                "Line {} has {} columns, expected {}",
                line_no + 1,
                width,
                expected
            ),
            Some(_) => {}
        }
        rows += 1;
    }

    let cols = match cols {
        Some(c) => c,
        None => bail!("Raster contains no data"),
    };

    Ok(Raster { rows, cols, data })
}
