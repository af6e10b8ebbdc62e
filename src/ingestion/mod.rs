//! CSV ingestion into the customer table

use crate::config::PipelineConfig;
use crate::error::{CreditScoreError, Result};
use crate::storage::CustomerStore;
use polars::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Outcome of one import
#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub source: PathBuf,
    pub table: String,
    pub rows: usize,
    pub columns: usize,
    pub elapsed_secs: f64,
}

/// Load a CSV file with a header row, inferring column types from every row
pub fn load_csv(path: &Path) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(CreditScoreError::InputFileMissing(path.display().to_string()));
    }
    let file = File::open(path)?;

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .into_reader_with_file_handle(file)
        .finish()
        .map_err(|e| CreditScoreError::DataError(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Replace `table` in `store` with the contents of the CSV at `path`.
///
/// The file is read and parsed before the database is touched, so a missing
/// or malformed file leaves the table as it was.
pub async fn import_csv(store: &CustomerStore, path: &Path, table: &str) -> Result<ImportSummary> {
    let start = Instant::now();
    let df = load_csv(path)?;
    info!(path = %path.display(), rows = df.height(), columns = df.width(), "CSV loaded");

    let rows = store.replace_table(table, &df).await?;

    Ok(ImportSummary {
        source: path.to_path_buf(),
        table: table.to_string(),
        rows,
        columns: df.width(),
        elapsed_secs: start.elapsed().as_secs_f64(),
    })
}

/// Import the configured source file into the configured table
pub async fn import_customers(config: &PipelineConfig) -> Result<ImportSummary> {
    let path = config.source_csv.as_path();
    if !path.is_file() {
        return Err(CreditScoreError::InputFileMissing(path.display().to_string()));
    }

    let store = CustomerStore::connect(&config.database_url).await?;
    import_csv(&store, path, &config.customer_table).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_csv_infers_types() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "id_cliente,idade,profissao").unwrap();
        writeln!(file, "1,30.5,Medico").unwrap();
        writeln!(file, "2,,Advogado").unwrap();
        file.flush().unwrap();

        let df = load_csv(file.path()).unwrap();
        assert_eq!(df.shape(), (2, 3));
        assert!(df.column("idade").unwrap().dtype().is_float());
        assert_eq!(df.column("idade").unwrap().null_count(), 1);
        assert_eq!(df.column("profissao").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_missing_file() {
        let err = load_csv(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, CreditScoreError::InputFileMissing(_)));
    }

    #[tokio::test]
    async fn test_import_customers_missing_file_skips_database() {
        // The URL is unreachable; the file check must fail first.
        let config = PipelineConfig::default()
            .with_database_url("postgresql://nobody@127.0.0.1:1/none")
            .with_source_csv("/definitely/not/here.csv");

        let err = import_customers(&config).await.unwrap_err();
        assert!(matches!(err, CreditScoreError::InputFileMissing(_)));
    }
}
