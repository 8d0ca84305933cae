//! Runtime settings, from flags or the environment.

use clap::Args;
use std::path::PathBuf;
use tracing::warn;

use crate::error::Result;
use crate::fetch::{sheets::DEFAULT_RANGE, SheetsAuth, SheetsSource, TableSource};

#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Spreadsheet holding the availability form responses.
    #[arg(long, env = "SHEET_ID", global = true)]
    pub sheet_id: Option<String>,

    #[arg(long, env = "SHEET_RANGE", default_value = DEFAULT_RANGE, global = true)]
    pub sheet_range: String,

    #[arg(long, env = "GOOGLE_SHEETS_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "GOOGLE_SHEETS_ACCESS_TOKEN", hide_env_values = true, global = true)]
    pub access_token: Option<String>,

    /// Base64 of a service-account JSON key that can read the sheet.
    #[arg(long, env = "GOOGLE_SHEETS_JSON_BASE64", hide_env_values = true, global = true)]
    pub service_account: Option<String>,

    /// Read the table from a local .json or .csv file instead of the sheet.
    #[arg(long, env = "TABLE_FILE", global = true)]
    pub table_file: Option<PathBuf>,

    /// Where assignments and the selected month are kept.
    #[arg(long, env = "STATE_DIR", default_value = "state", global = true)]
    pub state_dir: PathBuf,

    #[arg(long, env = "PORT", default_value_t = 8080, global = true)]
    pub port: u16,
}

impl Config {
    /// Token, then service account, then API key.
    fn auth(&self) -> Result<SheetsAuth> {
        if let Some(token) = &self.access_token {
            return Ok(SheetsAuth::AccessToken(token.clone()));
        }
        if let Some(encoded) = &self.service_account {
            return SheetsAuth::service_account_from_base64(encoded);
        }
        Ok(match &self.api_key {
            Some(key) => SheetsAuth::ApiKey(key.clone()),
            None => SheetsAuth::None,
        })
    }

    /// A table file wins over the sheet; with neither, the table is empty.
    pub fn table_source(&self) -> Result<TableSource> {
        if let Some(path) = &self.table_file {
            return Ok(TableSource::File(path.clone()));
        }
        match &self.sheet_id {
            Some(id) => Ok(TableSource::Sheets(SheetsSource::new(
                id.clone(),
                self.sheet_range.clone(),
                self.auth()?,
            )?)),
            None => {
                warn!("no SHEET_ID or TABLE_FILE configured; availability will be empty");
                Ok(TableSource::Empty)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        config: Config,
    }

    fn bare() -> Config {
        Config {
            sheet_id: None,
            sheet_range: DEFAULT_RANGE.to_string(),
            api_key: None,
            access_token: None,
            service_account: None,
            table_file: None,
            state_dir: PathBuf::from("state"),
            port: 8080,
        }
    }

    fn sheet_auth(cfg: &Config) -> SheetsAuth {
        match cfg.table_source() {
            Ok(TableSource::Sheets(src)) => src.auth,
            other => panic!("unexpected source {:?}", other),
        }
    }

    #[test]
    fn flags_parse_into_config() {
        let cfg = Harness::parse_from([
            "show-rota",
            "--sheet-id",
            "abc",
            "--table-file",
            "avail.csv",
            "--state-dir",
            "/tmp/rota",
            "--port",
            "9000",
        ])
        .config;
        assert_eq!(cfg.sheet_id.as_deref(), Some("abc"));
        assert_eq!(cfg.state_dir, PathBuf::from("/tmp/rota"));
        assert_eq!(cfg.port, 9000);
    }

    #[test]
    fn table_file_wins() {
        let cfg = Config {
            sheet_id: Some("abc".into()),
            table_file: Some(PathBuf::from("avail.csv")),
            ..bare()
        };
        assert!(matches!(cfg.table_source(), Ok(TableSource::File(p)) if p == PathBuf::from("avail.csv")));
    }

    #[test]
    fn auth_precedence() {
        let key_json = r#"{"type":"service_account"}"#;
        let mut cfg = Config {
            sheet_id: Some("abc".into()),
            api_key: Some("k".into()),
            access_token: Some("t".into()),
            service_account: Some(STANDARD.encode(key_json)),
            ..bare()
        };
        assert_eq!(sheet_auth(&cfg), SheetsAuth::AccessToken("t".into()));

        cfg.access_token = None;
        assert_eq!(sheet_auth(&cfg), SheetsAuth::ServiceAccount(key_json.into()));

        cfg.service_account = None;
        assert_eq!(sheet_auth(&cfg), SheetsAuth::ApiKey("k".into()));

        cfg.api_key = None;
        assert_eq!(sheet_auth(&cfg), SheetsAuth::None);
    }

    #[test]
    fn bad_service_account_key_is_a_config_error() {
        let cfg = Config {
            sheet_id: Some("abc".into()),
            service_account: Some("not base64 !!".into()),
            ..bare()
        };
        assert!(matches!(cfg.table_source(), Err(crate::error::Error::Auth(_))));
    }

    #[test]
    fn nothing_configured_is_empty() {
        assert!(matches!(bare().table_source(), Ok(TableSource::Empty)));
    }
}
