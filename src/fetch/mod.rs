// src/fetch/mod.rs
//! Where the availability table comes from.

use reqwest::Client;
use std::path::{Path, PathBuf};
use tracing::{error, info, instrument, warn};

use crate::error::{Error, Result};
use crate::process::RawTable;

pub mod sheets;

pub use sheets::{SheetsAuth, SheetsSource};

/// A configured origin for the availability table.
#[derive(Debug, Clone)]
pub enum TableSource {
    Sheets(SheetsSource),
    /// A `.json` array of string arrays, or a `.csv` file.
    File(PathBuf),
    /// Nothing configured; always yields an empty table.
    Empty,
}

impl TableSource {
    #[instrument(level = "info", skip(self, client))]
    pub async fn fetch_availability_table(&self, client: &Client) -> Result<RawTable> {
        match self {
            TableSource::Sheets(src) => src.fetch(client).await,
            TableSource::File(path) => load_table_file(path).await,
            TableSource::Empty => Ok(RawTable::default()),
        }
    }

    /// Like [`Self::fetch_availability_table`], but a failure is logged
    /// and turned into an empty table.
    pub async fn fetch_or_empty(&self, client: &Client) -> RawTable {
        match self.fetch_availability_table(client).await {
            Ok(table) => {
                info!(rows = table.rows.len(), "availability table loaded");
                table
            }
            Err(e) => {
                error!(error = %e, "fetching availability failed; continuing with no data");
                RawTable::default()
            }
        }
    }
}

/// Read a table from disk, choosing the format by extension.
pub async fn load_table_file(path: &Path) -> Result<RawTable> {
    let bytes = tokio::fs::read(path).await?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "json" => {
            let cells: Vec<Vec<serde_json::Value>> = serde_json::from_slice(&bytes)?;
            Ok(cells_to_table(cells))
        }
        "csv" => parse_csv(&bytes),
        other => {
            warn!(path = %path.display(), "unrecognised table extension");
            Err(Error::DataSource(format!(
                "unsupported table file type {:?} for {}",
                other,
                path.display()
            )))
        }
    }
}

/// Every record, header included, with ragged rows allowed.
fn parse_csv(bytes: &[u8]) -> Result<RawTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(RawTable::new(rows))
}

/// Sheets may hand back numbers or booleans where a form answer looks like
/// one; everything becomes its text.
pub(crate) fn cells_to_table(cells: Vec<Vec<serde_json::Value>>) -> RawTable {
    let rows = cells
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| match cell {
                    serde_json::Value::String(s) => s,
                    serde_json::Value::Null => String::new(),
                    other => other.to_string(),
                })
                .collect()
        })
        .collect();
    RawTable::new(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn loads_json_table() -> Result<()> {
        let tmp = tempdir()?;
        let path = tmp.path().join("avail.json");
        fs::write(
            &path,
            r#"[["Your name","Can host","Stowaway"],["alice smith","yes","Wed October 2 2025"],["bob",null,7]]"#,
        )?;

        let table = TableSource::File(path)
            .fetch_availability_table(&Client::new())
            .await?;
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[2], vec!["bob", "", "7"]);
        Ok(())
    }

    #[tokio::test]
    async fn loads_ragged_csv_with_quoted_commas() -> Result<()> {
        let tmp = tempdir()?;
        let path = tmp.path().join("avail.CSV");
        fs::write(
            &path,
            "Your name,Can host,Stowaway,Citizen\n\
             alice smith,yes,\"Wed October 2 2025, Fri October 4 2025\",\n\
             bob jones\n",
        )?;

        let table = load_table_file(&path).await?;
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[1][2], "Wed October 2 2025, Fri October 4 2025");
        assert_eq!(table.rows[2], vec!["bob jones"]);
        Ok(())
    }

    #[tokio::test]
    async fn failures_degrade_to_empty_table() -> Result<()> {
        let tmp = tempdir()?;
        let client = Client::new();

        let missing = TableSource::File(tmp.path().join("nope.json"));
        assert!(missing.fetch_availability_table(&client).await.is_err());
        assert!(missing.fetch_or_empty(&client).await.is_empty());

        let garbage = tmp.path().join("bad.json");
        fs::write(&garbage, "{ not a table")?;
        assert!(TableSource::File(garbage).fetch_or_empty(&client).await.is_empty());

        let odd = tmp.path().join("table.xlsx");
        fs::write(&odd, "")?;
        assert!(matches!(
            load_table_file(&odd).await,
            Err(Error::DataSource(_))
        ));

        assert!(TableSource::Empty.fetch_or_empty(&client).await.is_empty());
        Ok(())
    }
}
