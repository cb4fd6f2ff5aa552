//! CSV and Parquet readers and writers for candle tables.

use polars::prelude::*;
use std::fs;
use std::path::Path;

use super::provider::DataError;

/// Read a CSV file with a header row. Date and datetime columns are parsed.
pub fn read_csv(path: &Path) -> Result<DataFrame, DataError> {
    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_try_parse_dates(true)
        .finish()?
        .collect()?;
    Ok(df)
}

pub fn read_parquet(path: &Path) -> Result<DataFrame, DataError> {
    let file = fs::File::open(path)?;
    Ok(ParquetReader::new(file).finish()?)
}

/// Read a table, choosing the format from the file extension.
pub fn read_table(path: &Path) -> Result<DataFrame, DataError> {
    match extension(path).as_deref() {
        Some("csv") => read_csv(path),
        Some("parquet") => read_parquet(path),
        _ => Err(DataError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Write a table as CSV or Parquet, choosing the format from the extension.
pub fn write_table(df: &DataFrame, path: &Path) -> Result<(), DataError> {
    let format = extension(path);
    if !matches!(format.as_deref(), Some("csv") | Some("parquet")) {
        return Err(DataError::UnsupportedFormat(path.display().to_string()));
    }

    let file = fs::File::create(path)?;
    let mut df = df.clone();
    if format.as_deref() == Some("csv") {
        CsvWriter::new(file).include_header(true).finish(&mut df)?;
    } else {
        ParquetWriter::new(file).finish(&mut df)?;
    }
    Ok(())
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}
