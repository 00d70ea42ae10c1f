use anyhow::{bail, Context, Result};
use polars::prelude::*;
use std::path::Path;

/// Number of leading columns a coverage table must provide.
pub const REQUIRED_COLUMNS: usize = 3;

/// The three numeric columns of a coverage table.
///
/// Missing cells are represented as `f64::NAN`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableColumns {
    /// Longitude proxy (hour-like code or degrees, decoded later).
    pub angle_proxy: Vec<f64>,
    pub latitude: Vec<f64>,
    pub value: Vec<f64>,
}

impl TableColumns {
    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

/// Parse a header-less coverage CSV into a Polars DataFrame
pub fn parse_table_csv(csv_path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(false)
        .try_into_reader_with_file_path(Some(csv_path.into()))?
        .finish()
        .context("Failed to parse CSV into DataFrame")?;

    Ok(df)
}

/// Parse a coverage CSV and extract its three numeric columns
pub fn parse_table_csv_to_columns(csv_path: &Path) -> Result<TableColumns> {
    let df = parse_table_csv(csv_path)
        .with_context(|| format!("Failed to read coverage table {}", csv_path.display()))?;
    dataframe_to_columns(&df)
}

/// Convert a DataFrame to [`TableColumns`], using the first three columns by position
pub fn dataframe_to_columns(df: &DataFrame) -> Result<TableColumns> {
    if df.width() < REQUIRED_COLUMNS {
        bail!(
            "Coverage table has {} columns, expected at least {}",
            df.width(),
            REQUIRED_COLUMNS
        );
    }

    Ok(TableColumns {
        angle_proxy: float_column(df, 0, "angle proxy")?,
        latitude: float_column(df, 1, "latitude")?,
        value: float_column(df, 2, "value")?,
    })
}

fn float_column(df: &DataFrame, index: usize, label: &str) -> Result<Vec<f64>> {
    let column = df
        .get_columns()
        .get(index)
        .with_context(|| format!("Missing {} column (index {})", label, index))?;

    let cast = column
        .cast(&DataType::Float64)
        .with_context(|| format!("Column {} ({}) is not numeric", index, label))?;

    let values = cast
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect();

    Ok(values)
}
