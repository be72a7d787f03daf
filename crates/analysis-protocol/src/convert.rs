//! Decoding of raw raster values into user-facing result rows.
//!
//! Raster pixels store compact encodings: tree cover loss stores the year
//! as an offset from 2000, and GLAD alerts store the alert date as days
//! since 2015-01-01 plus a confirmation offset. Responses carry the
//! decoded forms under derived column names, reshaped from the engine's
//! column-oriented table into one object per group (csv-json style).

use chrono::{Duration, NaiveDate};
use serde_json::{Map, Value};

use geoprocessing::{ColumnValues, ResultTable};

/// Raster id of the tree cover loss layer.
pub const LOSS_RASTER_ID: &str = "loss";
/// Raster id of the GLAD alerts layer.
pub const GLAD_RASTER_ID: &str = "glad_alerts";

/// Loss pixel values are the loss year minus this base.
const LOSS_YEAR_BASE: i64 = 2000;
/// Confirmed GLAD alert values start at this offset.
pub const GLAD_CONFIRMED_OFFSET: f64 = 30_000.0;

fn glad_epoch() -> NaiveDate {
    // from_ymd_opt is only None for out-of-range dates.
    NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or_default()
}

/// Decode a loss pixel value into a calendar year.
pub fn loss_year(value: f64) -> i64 {
    value as i64 + LOSS_YEAR_BASE
}

/// Decode a confirmed GLAD alert value into its alert date.
///
/// Returns `None` for values below the confirmation offset, which do not
/// encode a date.
pub fn alert_date(value: f64) -> Option<NaiveDate> {
    if value < GLAD_CONFIRMED_OFFSET {
        return None;
    }
    let days = (value - GLAD_CONFIRMED_OFFSET) as i64;
    glad_epoch().checked_add_signed(Duration::days(days))
}

/// Encode an alert date into the raster's value space.
pub fn encode_alert_date(date: NaiveDate) -> f64 {
    GLAD_CONFIRMED_OFFSET + (date - glad_epoch()).num_days() as f64
}

/// Rewrite a result table for the response body: a list with one object
/// per group, where encoded columns carry decoded values under their
/// derived names and everything else passes through.
///
/// Key order within each row follows the table's column order.
pub fn decorate_result(result: &ResultTable) -> Value {
    let mut rows = Vec::with_capacity(result.num_groups());
    for index in 0..result.num_groups() {
        let mut row = Map::new();
        for (name, values) in result.iter() {
            match name {
                LOSS_RASTER_ID => {
                    row.insert(
                        "loss__year".to_string(),
                        loss_year(float_at(values, index)).into(),
                    );
                }
                GLAD_RASTER_ID => {
                    let date = match alert_date(float_at(values, index)) {
                        Some(d) => Value::String(d.format("%Y-%m-%d").to_string()),
                        None => Value::Null,
                    };
                    row.insert("alert__date".to_string(), date);
                }
                _ => {
                    row.insert(name.to_string(), value_at(values, index));
                }
            }
        }
        rows.push(Value::Object(row));
    }
    Value::Array(rows)
}

fn float_at(values: &ColumnValues, index: usize) -> f64 {
    match values {
        ColumnValues::Int(v) => v.get(index).copied().unwrap_or_default() as f64,
        ColumnValues::Float(v) => v.get(index).copied().unwrap_or_default(),
    }
}

fn value_at(values: &ColumnValues, index: usize) -> Value {
    match values {
        ColumnValues::Int(v) => v.get(index).copied().map(Value::from).unwrap_or(Value::Null),
        ColumnValues::Float(v) => v.get(index).copied().map(Value::from).unwrap_or(Value::Null),
    }
}
