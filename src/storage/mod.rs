//! Relational storage for customer records
//!
//! Tables are written and read through a `sqlx` Any pool, so the same code
//! path serves PostgreSQL in deployment and SQLite in tests. The connection
//! string picks the driver.

use crate::error::{CreditScoreError, Result};
use polars::prelude::*;
use sqlx::any::{AnyPoolOptions, AnyRow};
use sqlx::{AnyPool, Column as _, Row};
use tracing::{debug, info};

/// Values of one frame column converted for binding
enum SqlColumn {
    Integer(Vec<Option<i64>>),
    Real(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl SqlColumn {
    fn sql_type(&self) -> &'static str {
        match self {
            SqlColumn::Integer(_) => "BIGINT",
            SqlColumn::Real(_) => "DOUBLE PRECISION",
            SqlColumn::Text(_) => "TEXT",
        }
    }

    fn from_series(series: &Series) -> Result<Self> {
        let dtype = series.dtype();
        if dtype.is_integer() || dtype.is_bool() {
            let cast = series.cast(&DataType::Int64)?;
            Ok(SqlColumn::Integer(cast.i64()?.into_iter().collect()))
        } else if dtype.is_float() {
            let cast = series.cast(&DataType::Float64)?;
            Ok(SqlColumn::Real(cast.f64()?.into_iter().collect()))
        } else {
            let cast = series.cast(&DataType::String)?;
            Ok(SqlColumn::Text(
                cast.str()?
                    .into_iter()
                    .map(|v| v.map(str::to_string))
                    .collect(),
            ))
        }
    }
}

/// A single decoded table cell
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Null,
    Number(f64),
    Text(String),
}

/// Quote an SQL identifier, doubling embedded quotes
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Customer table store backed by a relational database
#[derive(Clone)]
pub struct CustomerStore {
    pool: AnyPool,
}

impl CustomerStore {
    /// Connect to the database named by `database_url`.
    ///
    /// Accepts `postgres://`, `postgresql://` and `sqlite:` URLs. An in-memory
    /// SQLite database lives only as long as its single pooled connection.
    pub async fn connect(database_url: &str) -> Result<Self> {
        sqlx::any::install_default_drivers();

        let in_memory = database_url.contains(":memory:");
        let pool = AnyPoolOptions::new()
            .max_connections(if in_memory { 1 } else { 5 })
            .min_connections(if in_memory { 1 } else { 0 })
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(database_url)
            .await
            .map_err(|e| CreditScoreError::StorageError(format!("Failed to connect to database: {e}")))?;

        debug!(in_memory, "Database pool ready");
        Ok(Self { pool })
    }

    /// Replace `table` with the rows of `df`.
    ///
    /// Drop, create and insert run in one transaction; on failure the prior
    /// table is left as it was. Returns the number of inserted rows.
    pub async fn replace_table(&self, table: &str, df: &DataFrame) -> Result<usize> {
        if df.width() == 0 {
            return Err(CreditScoreError::EmptyDataset(
                "frame has no columns to store".to_string(),
            ));
        }

        let columns: Vec<(String, SqlColumn)> = df
            .get_columns()
            .iter()
            .map(|column| {
                let values = SqlColumn::from_series(column.as_materialized_series())?;
                Ok((column.name().to_string(), values))
            })
            .collect::<Result<_>>()?;

        let table_ident = quote_ident(table);
        let definitions: Vec<String> = columns
            .iter()
            .map(|(name, values)| format!("{} {}", quote_ident(name), values.sql_type()))
            .collect();
        let names: Vec<String> = columns.iter().map(|(name, _)| quote_ident(name)).collect();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${i}")).collect();

        let create_sql = format!("CREATE TABLE {} ({})", table_ident, definitions.join(", "));
        let insert_sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table_ident,
            names.join(", "),
            placeholders.join(", ")
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!("DROP TABLE IF EXISTS {table_ident}"))
            .execute(&mut *tx)
            .await
            .map_err(|e| CreditScoreError::StorageError(format!("Failed to drop table {table}: {e}")))?;
        sqlx::query(&create_sql)
            .execute(&mut *tx)
            .await
            .map_err(|e| CreditScoreError::StorageError(format!("Failed to create table {table}: {e}")))?;

        for row in 0..df.height() {
            let mut query = sqlx::query(&insert_sql);
            for (_, values) in &columns {
                query = match values {
                    SqlColumn::Integer(v) => query.bind(v[row]),
                    SqlColumn::Real(v) => query.bind(v[row]),
                    SqlColumn::Text(v) => query.bind(v[row].clone()),
                };
            }
            query
                .execute(&mut *tx)
                .await
                .map_err(|e| CreditScoreError::StorageError(format!("Failed to insert row {row}: {e}")))?;
        }

        tx.commit().await?;

        info!(table = %table, rows = df.height(), columns = columns.len(), "Table replaced");
        Ok(df.height())
    }

    /// Read the whole of `table` into a data frame.
    ///
    /// Columns whose non-null cells are all numeric become `Float64`; any
    /// column holding text becomes `String`. An empty table yields an empty
    /// frame.
    pub async fn read_table(&self, table: &str) -> Result<DataFrame> {
        let rows = sqlx::query(&format!("SELECT * FROM {}", quote_ident(table)))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| CreditScoreError::StorageError(format!("Failed to read table {table}: {e}")))?;

        let Some(first) = rows.first() else {
            return Ok(DataFrame::empty());
        };

        let names: Vec<String> = first.columns().iter().map(|c| c.name().to_string()).collect();
        let mut frame_columns = Vec::with_capacity(names.len());

        for (idx, name) in names.iter().enumerate() {
            let cells: Vec<Cell> = rows
                .iter()
                .map(|row| decode_cell(row, idx, name))
                .collect::<Result<_>>()?;
            frame_columns.push(cells_to_column(name, cells));
        }

        let df = DataFrame::new(frame_columns)?;
        debug!(table = %table, rows = df.height(), columns = df.width(), "Table read");
        Ok(df)
    }
}

fn decode_cell(row: &AnyRow, idx: usize, name: &str) -> Result<Cell> {
    if let Ok(value) = row.try_get::<Option<f64>, _>(idx) {
        return Ok(value.map_or(Cell::Null, Cell::Number));
    }
    if let Ok(value) = row.try_get::<Option<i64>, _>(idx) {
        return Ok(value.map_or(Cell::Null, |v| Cell::Number(v as f64)));
    }
    if let Ok(value) = row.try_get::<Option<i32>, _>(idx) {
        return Ok(value.map_or(Cell::Null, |v| Cell::Number(f64::from(v))));
    }
    if let Ok(value) = row.try_get::<Option<bool>, _>(idx) {
        return Ok(value.map_or(Cell::Null, |v| Cell::Number(if v { 1.0 } else { 0.0 })));
    }
    if let Ok(value) = row.try_get::<Option<String>, _>(idx) {
        return Ok(value.map_or(Cell::Null, Cell::Text));
    }
    Err(CreditScoreError::StorageError(format!(
        "Unsupported value type in column {name}"
    )))
}

fn cells_to_column(name: &str, cells: Vec<Cell>) -> Column {
    let has_text = cells.iter().any(|c| matches!(c, Cell::Text(_)));
    if has_text {
        let values: Vec<Option<String>> = cells
            .into_iter()
            .map(|c| match c {
                Cell::Null => None,
                Cell::Number(v) => Some(v.to_string()),
                Cell::Text(s) => Some(s),
            })
            .collect();
        Column::new(name.into(), values)
    } else {
        let values: Vec<Option<f64>> = cells
            .into_iter()
            .map(|c| match c {
                Cell::Number(v) => Some(v),
                _ => None,
            })
            .collect();
        Column::new(name.into(), values)
    }
}
