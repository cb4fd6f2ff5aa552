//! Candle table contract.
//!
//! Required columns are matched case-insensitively so `Open`/`High` exports
//! load as-is. `timestamp` may be a `Date`, a `Datetime` of any unit, or
//! `Int64` epoch milliseconds; the price and volume columns may be any common
//! numeric type and are read as `f64`.

use polars::prelude::*;

use crate::domain::Candle;

pub const TIMESTAMP: &str = "timestamp";
pub const OPEN: &str = "open";
pub const HIGH: &str = "high";
pub const LOW: &str = "low";
pub const CLOSE: &str = "close";
pub const VOLUME: &str = "volume";

const NUMERIC_COLUMNS: [&str; 5] = [OPEN, HIGH, LOW, CLOSE, VOLUME];

/// Raw per-row values read from a candle table, nulls preserved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandleColumns {
    /// Epoch milliseconds.
    pub timestamp: Vec<Option<i64>>,
    pub open: Vec<Option<f64>>,
    pub high: Vec<Option<f64>>,
    pub low: Vec<Option<f64>>,
    pub close: Vec<Option<f64>>,
    pub volume: Vec<Option<f64>>,
}

impl CandleColumns {
    pub fn len(&self) -> usize {
        self.timestamp.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamp.is_empty()
    }
}

/// Expected schema for candle tables.
pub struct CandleSchema;

impl CandleSchema {
    /// The schema [`candles_to_frame`] writes.
    pub fn schema() -> Schema {
        Schema::from_iter(vec![
            Field::new(
                TIMESTAMP.into(),
                DataType::Datetime(TimeUnit::Milliseconds, None),
            ),
            Field::new(OPEN.into(), DataType::Float64),
            Field::new(HIGH.into(), DataType::Float64),
            Field::new(LOW.into(), DataType::Float64),
            Field::new(CLOSE.into(), DataType::Float64),
            Field::new(VOLUME.into(), DataType::Float64),
        ])
    }

    /// Check that every required column exists with an accepted type.
    pub fn validate(df: &DataFrame) -> Result<(), SchemaError> {
        let ts = find_column(df, TIMESTAMP)?;
        if !is_timestamp_type(ts.dtype()) {
            return Err(SchemaError::TypeMismatch {
                column: TIMESTAMP.to_string(),
                expected: "date, datetime or int64 epoch milliseconds",
                actual: ts.dtype().clone(),
            });
        }
        for name in NUMERIC_COLUMNS {
            let column = find_column(df, name)?;
            if !is_numeric_type(column.dtype()) {
                return Err(SchemaError::TypeMismatch {
                    column: name.to_string(),
                    expected: "numeric",
                    actual: column.dtype().clone(),
                });
            }
        }
        Ok(())
    }

    /// Validate the table and read its columns into plain vectors.
    pub fn read(df: &DataFrame) -> Result<CandleColumns, SchemaError> {
        Self::validate(df)?;

        let ts = find_column(df, TIMESTAMP)?;
        let ms = match ts.dtype() {
            DataType::Int64 => ts.clone(),
            DataType::Datetime(_, tz) => ts
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, tz.clone()))?
                .cast(&DataType::Int64)?,
            _ => ts
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
                .cast(&DataType::Int64)?,
        };
        let timestamp: Vec<Option<i64>> = ms.i64()?.into_iter().collect();

        Ok(CandleColumns {
            timestamp,
            open: read_f64(df, OPEN)?,
            high: read_f64(df, HIGH)?,
            low: read_f64(df, LOW)?,
            close: read_f64(df, CLOSE)?,
            volume: read_f64(df, VOLUME)?,
        })
    }
}

/// Build a candle table in the canonical schema.
pub fn candles_to_frame(candles: &[Candle]) -> PolarsResult<DataFrame> {
    let timestamps: Vec<i64> = candles
        .iter()
        .map(|c| c.timestamp.and_utc().timestamp_millis())
        .collect();
    let column = |f: fn(&Candle) -> f64| -> Vec<f64> { candles.iter().map(f).collect() };

    DataFrame::new(vec![
        Column::new(TIMESTAMP.into(), timestamps)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?,
        Column::new(OPEN.into(), column(|c| c.open)),
        Column::new(HIGH.into(), column(|c| c.high)),
        Column::new(LOW.into(), column(|c| c.low)),
        Column::new(CLOSE.into(), column(|c| c.close)),
        Column::new(VOLUME.into(), column(|c| c.volume)),
    ])
}

fn find_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, SchemaError> {
    df.get_columns()
        .iter()
        .find(|c| c.name().as_str().eq_ignore_ascii_case(name))
        .ok_or_else(|| SchemaError::MissingColumn(name.to_string()))
}

fn read_f64(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, SchemaError> {
    let column = find_column(df, name)?.cast(&DataType::Float64)?;
    Ok(column.f64()?.into_iter().collect())
}

fn is_timestamp_type(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Date | DataType::Datetime(_, _) | DataType::Int64
    )
}

fn is_numeric_type(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float64
            | DataType::Float32
            | DataType::Int64
            | DataType::Int32
            | DataType::UInt64
            | DataType::UInt32
    )
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("type mismatch in column {column}: expected {expected}, got {actual:?}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        actual: DataType,
    },

    #[error("read column: {0}")]
    Polars(#[from] PolarsError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> DataFrame {
        let timestamp = Column::new(TIMESTAMP.into(), &[1704153600000i64, 1704240000000])
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
            .unwrap();
        DataFrame::new(vec![
            timestamp,
            Column::new(OPEN.into(), &[100.0, 101.0]),
            Column::new(HIGH.into(), &[102.0, 103.0]),
            Column::new(LOW.into(), &[99.0, 100.0]),
            Column::new(CLOSE.into(), &[101.0, 102.0]),
            Column::new(VOLUME.into(), &[1000.0, 1200.0]),
        ])
        .unwrap()
    }

    #[test]
    fn schema_has_all_required_columns() {
        let schema = CandleSchema::schema();
        for name in [TIMESTAMP, OPEN, HIGH, LOW, CLOSE, VOLUME] {
            assert!(schema.contains(name), "missing {name}");
        }
    }

    #[test]
    fn validate_accepts_canonical_frame() {
        assert!(CandleSchema::validate(&sample()).is_ok());
    }

    #[test]
    fn read_converts_timestamp_to_millis() {
        let cols = CandleSchema::read(&sample()).unwrap();
        assert_eq!(cols.len(), 2);
        assert_eq!(cols.timestamp[0], Some(1704153600000));
        assert_eq!(cols.close[1], Some(102.0));
    }

    #[test]
    fn column_names_match_case_insensitively() {
        let df = df! {
            "Timestamp" => &[1i64, 2],
            "Open" => &[1.0, 2.0],
            "High" => &[1.5, 2.5],
            "Low" => &[0.5, 1.5],
            "Close" => &[1.0, 2.0],
            "Volume" => &[10i64, 20],
        }
        .unwrap();
        let cols = CandleSchema::read(&df).unwrap();
        assert_eq!(cols.timestamp, vec![Some(1), Some(2)]);
        assert_eq!(cols.volume, vec![Some(10.0), Some(20.0)]);
    }

    #[test]
    fn date_column_is_accepted() {
        let mut df = sample();
        let dates = Column::new(TIMESTAMP.into(), &[19724i32, 19725])
            .cast(&DataType::Date)
            .unwrap();
        df.with_column(dates).unwrap();
        let cols = CandleSchema::read(&df).unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp_millis();
        assert_eq!(cols.timestamp[0], Some(expected));
    }

    #[test]
    fn validate_rejects_missing_column() {
        let df = sample().drop(HIGH).unwrap();
        let err = CandleSchema::validate(&df).unwrap_err();
        assert!(matches!(err, SchemaError::MissingColumn(ref c) if c == HIGH));
    }

    #[test]
    fn validate_rejects_wrong_type() {
        let mut df = sample();
        df.with_column(Column::new(OPEN.into(), &["a", "b"])).unwrap();
        let err = CandleSchema::validate(&df).unwrap_err();
        assert!(matches!(err, SchemaError::TypeMismatch { .. }));
    }

    #[test]
    fn frame_round_trip_keeps_timestamps() {
        let cols = CandleSchema::read(&sample()).unwrap();
        let ts = chrono::DateTime::from_timestamp_millis(cols.timestamp[0].unwrap())
            .unwrap()
            .naive_utc();
        let candles = vec![Candle {
            timestamp: ts,
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            volume: 3.0,
        }];
        let frame = candles_to_frame(&candles).unwrap();
        for (name, dtype) in CandleSchema::schema().iter() {
            assert_eq!(frame.column(name.as_str()).unwrap().dtype(), dtype);
        }
        let back = CandleSchema::read(&frame).unwrap();
        assert_eq!(back.timestamp[0], cols.timestamp[0]);
    }
}
