//! SQL access for proposals, applications and the people they involve.
//!
//! Every query goes through an [`AnyPool`] and only uses portable SQL with `?`
//! placeholders, so the same code serves MySQL in production and SQLite in
//! development. List-valued columns are stored as JSON arrays in text columns
//! and dates as `YYYY-MM-DD` strings.

use chrono::NaiveDate;
use eyre::{Error, WrapErr};
use sqlx::AnyPool;
use sqlx::Row;
use sqlx::any::AnyRow;

mod applications;
mod directory;
mod proposals;

pub struct Store {
    pool: AnyPool,
}

impl Store {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }
}

fn get_date(row: &AnyRow, column: &str) -> Result<NaiveDate, Error> {
    let raw: String = row.try_get(column)?;
    raw.parse()
        .wrap_err_with(|| format!("invalid date {raw:?} in column {column}"))
}

fn get_list(row: &AnyRow, column: &str) -> Result<Vec<String>, Error> {
    let raw: String = row.try_get(column)?;
    serde_json::from_str(&raw).wrap_err_with(|| format!("invalid list {raw:?} in column {column}"))
}

fn encode_list(list: &[String]) -> Result<String, Error> {
    Ok(serde_json::to_string(list)?)
}

fn encode_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
