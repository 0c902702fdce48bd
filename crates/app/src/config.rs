use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use storage::StorageBackend;

const DEFAULT_DB_URL: &str = "sqlite://spelling_bee.db";
const DEFAULT_LEARNERS: &str = "Kira,Sage,Test";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidStorage { raw: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidStorage { raw } => {
                write!(f, "invalid BEE_STORAGE value: {raw} (expected sqlite or memory)")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub storage: StorageBackend,
    /// Catalog JSON file; the bundled catalog when unset.
    pub catalog: Option<PathBuf>,
    pub data_dir: PathBuf,
    pub audio_dir: PathBuf,
    pub learners: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(5001);

        let host = std::env::var("HOST")
            .ok()
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)));

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let db_url = std::env::var("BEE_DB_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| DEFAULT_DB_URL.to_string(), normalize_sqlite_url);
        let storage = parse_storage(std::env::var("BEE_STORAGE").ok().as_deref(), db_url)?;

        let learners = parse_learners(
            &std::env::var("BEE_LEARNERS").unwrap_or_else(|_| DEFAULT_LEARNERS.to_string()),
        );

        Ok(Self {
            host,
            port,
            log_level,
            storage,
            catalog: std::env::var("BEE_CATALOG").ok().map(PathBuf::from),
            data_dir: std::env::var("BEE_DATA_DIR")
                .map_or_else(|_| PathBuf::from("mw_data"), PathBuf::from),
            audio_dir: std::env::var("BEE_AUDIO_DIR")
                .map_or_else(|_| PathBuf::from("audio"), PathBuf::from),
            learners,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Backend named by `BEE_STORAGE`; unset or blank means `SQLite` at `db_url`.
pub fn parse_storage(kind: Option<&str>, db_url: String) -> Result<StorageBackend, ConfigError> {
    match kind.map(str::trim) {
        None | Some("" | "sqlite") => Ok(StorageBackend::Sqlite { url: db_url }),
        Some("memory") => Ok(StorageBackend::Memory),
        Some(other) => Err(ConfigError::InvalidStorage {
            raw: other.to_string(),
        }),
    }
}

/// Comma-separated names, trimmed, blanks dropped.
pub fn parse_learners(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Absolute `sqlite://` URL for a path or `sqlite:` URL; memory URLs pass through.
pub fn normalize_sqlite_url(raw: String) -> String {
    if raw.starts_with("sqlite::memory:") || raw.starts_with("sqlite://") || raw.contains("mode=memory") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn learners_are_trimmed_and_blanks_dropped() {
        assert_eq!(parse_learners(" Kira, ,Sage,"), vec!["Kira", "Sage"]);
        assert!(parse_learners("").is_empty());
    }

    #[test]
    fn storage_kind_must_be_known() {
        let url = || "sqlite:///tmp/bee.db".to_string();
        assert_eq!(parse_storage(Some("memory"), url()), Ok(StorageBackend::Memory));
        assert_eq!(
            parse_storage(None, url()),
            Ok(StorageBackend::Sqlite { url: url() })
        );
        assert_eq!(
            parse_storage(Some("sqlite"), url()),
            Ok(StorageBackend::Sqlite { url: url() })
        );
        assert_eq!(
            parse_storage(Some("memroy"), url()),
            Err(ConfigError::InvalidStorage {
                raw: "memroy".into()
            })
        );
    }

    #[test]
    fn sqlite_urls_become_absolute() {
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/bee.db".into()),
            "sqlite:///tmp/bee.db"
        );
        assert_eq!(normalize_sqlite_url("/tmp/bee.db".into()), "sqlite:///tmp/bee.db");
        assert_eq!(
            normalize_sqlite_url("sqlite::memory:".into()),
            "sqlite::memory:"
        );
        assert!(normalize_sqlite_url("bee.db".into()).ends_with("/bee.db"));
    }
}
