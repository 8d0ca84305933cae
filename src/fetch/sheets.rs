// src/fetch/sheets.rs
use base64::{engine::general_purpose::STANDARD, Engine as _};
use gcp_auth::{CustomServiceAccount, TokenProvider};
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use tracing::{debug, instrument};
use url::Url;

use super::cells_to_table;
use crate::error::{Error, Result};
use crate::process::RawTable;

pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets/";
pub const DEFAULT_RANGE: &str = "Avails!A1:Z1000";
pub const SHEETS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";

/// How requests to the Sheets values endpoint identify themselves.
#[derive(Clone, PartialEq, Eq)]
pub enum SheetsAuth {
    /// `?key=` query parameter; enough for link-shared sheets.
    ApiKey(String),
    /// OAuth bearer token obtained elsewhere.
    AccessToken(String),
    /// Service-account JSON key; a read-only token is minted per fetch.
    ServiceAccount(String),
    None,
}

impl SheetsAuth {
    /// Decode a base64 service-account key, the form it is kept in
    /// `GOOGLE_SHEETS_JSON_BASE64`.
    pub fn service_account_from_base64(encoded: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| Error::Auth(format!("decoding service account key: {}", e)))?;
        let json = String::from_utf8(bytes)
            .map_err(|e| Error::Auth(format!("service account key is not UTF-8: {}", e)))?;
        Ok(SheetsAuth::ServiceAccount(json))
    }
}

impl fmt::Debug for SheetsAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetsAuth::ApiKey(_) => f.write_str("ApiKey(..)"),
            SheetsAuth::AccessToken(_) => f.write_str("AccessToken(..)"),
            SheetsAuth::ServiceAccount(_) => f.write_str("ServiceAccount(..)"),
            SheetsAuth::None => f.write_str("None"),
        }
    }
}

async fn service_account_token(key_json: &str) -> Result<String> {
    let account = CustomServiceAccount::from_json(key_json)
        .map_err(|e| Error::Auth(format!("reading service account key: {}", e)))?;
    let token = account
        .token(&[SHEETS_READONLY_SCOPE])
        .await
        .map_err(|e| Error::Auth(format!("minting sheets token: {}", e)))?;
    debug!("service account token minted");
    Ok(token.as_str().to_string())
}

/// A read-only range of one spreadsheet.
#[derive(Debug, Clone)]
pub struct SheetsSource {
    pub sheet_id: String,
    pub range: String,
    pub auth: SheetsAuth,
    pub base_url: Url,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

impl SheetsSource {
    pub fn new(sheet_id: impl Into<String>, range: impl Into<String>, auth: SheetsAuth) -> Result<Self> {
        let base_url = Url::parse(SHEETS_API_BASE)
            .map_err(|e| Error::DataSource(format!("parsing {}: {}", SHEETS_API_BASE, e)))?;
        Ok(Self {
            sheet_id: sheet_id.into(),
            range: range.into(),
            auth,
            base_url,
        })
    }

    /// Point at a different API root; used by tests.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// `<base>/<sheet id>/values/<range>[?key=..]`
    pub fn values_url(&self) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::DataSource(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .push(&self.sheet_id)
            .push("values")
            .push(&self.range);
        if let SheetsAuth::ApiKey(key) = &self.auth {
            url.query_pairs_mut().append_pair("key", key);
        }
        Ok(url)
    }

    #[instrument(level = "info", skip(self, client), fields(sheet = %self.sheet_id, range = %self.range))]
    pub async fn fetch(&self, client: &Client) -> Result<RawTable> {
        let url = self.values_url()?;
        let req = match &self.auth {
            SheetsAuth::AccessToken(token) => client.get(url).bearer_auth(token),
            SheetsAuth::ServiceAccount(key) => {
                let token = service_account_token(key).await?;
                client.get(url).bearer_auth(token)
            }
            SheetsAuth::ApiKey(_) | SheetsAuth::None => client.get(url),
        };

        let body: ValueRange = req.send().await?.error_for_status()?.json().await?;
        debug!(rows = body.values.len(), "sheet values received");
        Ok(cells_to_table(body.values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use base64::Engine as _;
    use warp::Filter;

    #[test]
    fn builds_values_url_with_api_key() -> Result<()> {
        let src = SheetsSource::new("abc123", DEFAULT_RANGE, SheetsAuth::ApiKey("k".into()))?;
        assert_eq!(
            src.values_url()?.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc123/values/Avails!A1:Z1000?key=k"
        );
        Ok(())
    }

    #[test]
    fn token_auth_keeps_query_clean() -> Result<()> {
        let src = SheetsSource::new("abc123", "Sheet 1!A:D", SheetsAuth::AccessToken("t".into()))?;
        let url = src.values_url()?;
        assert!(url.query().is_none());
        assert!(url.path().ends_with("/abc123/values/Sheet%201!A:D"));
        Ok(())
    }

    #[test]
    fn decodes_base64_service_account_key() -> Result<()> {
        let key = r#"{"type":"service_account","client_email":"rota@example.iam.gserviceaccount.com"}"#;
        let encoded = STANDARD.encode(key);
        let auth = SheetsAuth::service_account_from_base64(&format!("{}\n", encoded))?;
        assert_eq!(auth, SheetsAuth::ServiceAccount(key.to_string()));
        assert_eq!(format!("{:?}", auth), "ServiceAccount(..)");

        assert!(matches!(
            SheetsAuth::service_account_from_base64("%%% not base64"),
            Err(Error::Auth(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn unreadable_service_account_key_fails_before_request() -> Result<()> {
        let src = SheetsSource::new(
            "abc",
            DEFAULT_RANGE,
            SheetsAuth::ServiceAccount("{ not a key".into()),
        )?;
        let url = src.values_url()?;
        assert!(url.query().is_none());
        assert!(matches!(src.fetch(&Client::new()).await, Err(Error::Auth(_))));
        Ok(())
    }

    #[tokio::test]
    async fn fetches_values_from_api() -> Result<()> {
        let route = warp::path!("v4" / "spreadsheets" / String / "values" / String).map(
            |_id: String, _range: String| {
                warp::reply::json(&serde_json::json!({
                    "range": "Avails!A1:Z1000",
                    "majorDimension": "ROWS",
                    "values": [
                        ["Your name", "Can host", "Stowaway Avail"],
                        ["alice smith", "yes", "Wed October 2 2025"],
                        ["bob jones"]
                    ]
                }))
            },
        );
        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let base = Url::parse(&format!("http://{}/v4/spreadsheets/", addr))?;
        let src = SheetsSource::new("abc", DEFAULT_RANGE, SheetsAuth::None)?.with_base_url(base);
        let table = src.fetch(&Client::new()).await?;

        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[1][2], "Wed October 2 2025");
        assert_eq!(table.rows[2], vec!["bob jones"]);
        Ok(())
    }

    #[tokio::test]
    async fn empty_range_has_no_values_field() -> Result<()> {
        let route = warp::any().map(|| warp::reply::json(&serde_json::json!({ "range": "A1:Z1" })));
        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let base = Url::parse(&format!("http://{}/", addr))?;
        let src = SheetsSource::new("abc", DEFAULT_RANGE, SheetsAuth::None)?.with_base_url(base);
        assert!(src.fetch(&Client::new()).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn http_errors_surface() -> Result<()> {
        let route = warp::any().map(|| {
            warp::reply::with_status("nope", warp::http::StatusCode::FORBIDDEN)
        });
        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let base = Url::parse(&format!("http://{}/", addr))?;
        let src = SheetsSource::new("abc", DEFAULT_RANGE, SheetsAuth::None)?.with_base_url(base);
        assert!(matches!(src.fetch(&Client::new()).await, Err(Error::Http(_))));
        Ok(())
    }
}
