//! Server configuration from environment variables.

use std::path::PathBuf;

use nephro_coach_database::db::DEFAULT_DB_PATH;

/// Default bind address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
/// Default listening port.
pub const DEFAULT_PORT: u16 = 5000;
/// Default directory for uploaded lab report PDFs.
pub const DEFAULT_UPLOAD_DIR: &str = "./uploads";

/// Runtime configuration for [`crate::run_server`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to (`BIND_ADDR`).
    pub bind_addr: String,
    /// Port to listen on (`PORT`).
    pub port: u16,
    /// `SQLite` database file (`DATABASE_PATH`).
    pub database_path: PathBuf,
    /// Directory uploaded PDFs are written to (`UPLOAD_DIR`).
    pub upload_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            database_path: PathBuf::from(DEFAULT_DB_PATH),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from the process environment, falling back
    /// to defaults for unset or unparseable values.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let port = lookup("PORT").map_or(defaults.port, |p| {
            p.parse().unwrap_or_else(|_| {
                log::warn!("Ignoring invalid PORT value '{p}'");
                defaults.port
            })
        });

        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port,
            database_path: lookup("DATABASE_PATH").map_or(defaults.database_path, PathBuf::from),
            upload_dir: lookup("UPLOAD_DIR").map_or(defaults.upload_dir, PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> ServerConfig {
        let vars: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(config(&[]), ServerConfig::default());
    }

    #[test]
    fn reads_every_variable() {
        let cfg = config(&[
            ("BIND_ADDR", "0.0.0.0"),
            ("PORT", "8081"),
            ("DATABASE_PATH", "/tmp/records.db"),
            ("UPLOAD_DIR", "/tmp/uploads"),
        ]);

        assert_eq!(cfg.bind_addr, "0.0.0.0");
        assert_eq!(cfg.port, 8081);
        assert_eq!(cfg.database_path, PathBuf::from("/tmp/records.db"));
        assert_eq!(cfg.upload_dir, PathBuf::from("/tmp/uploads"));
    }

    #[test]
    fn invalid_port_falls_back_to_default() {
        assert_eq!(config(&[("PORT", "http")]).port, DEFAULT_PORT);
    }
}
