//! Database credentials loaded from a `key=value` file.

use std::fmt;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{Result, StoreError};

/// Connection settings for the target store.
///
/// With the SQLite backend `database` is the database file path (or
/// `:memory:`); user, host and port only appear in diagnostics.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct DbCredentials {
    pub username: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: String,
}

impl DbCredentials {
    /// Credentials naming only a database.
    pub fn for_database(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Self::default()
        }
    }

    /// Reads and parses a credential file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::CredentialsNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                StoreError::CredentialsRead {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;
        Self::parse(&content, path)
    }

    /// Parses credential file content; `origin` is used in diagnostics.
    ///
    /// Recognized keys are `db_username`, `db_password`, `db_host`, `db_port`
    /// and `db_name`. Blank lines and `#` comments are skipped. Lines without
    /// `=` and unknown keys are logged and ignored.
    pub fn parse(content: &str, origin: &Path) -> Result<Self> {
        let mut credentials = Self::default();
        for (idx, raw_line) in content.lines().enumerate() {
            let line_number = idx + 1;
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                warn!(
                    file = %origin.display(),
                    line = line_number,
                    "Ignoring malformed credential line (expected key=value)"
                );
                continue;
            };
            let key = key.trim();
            let value = value.trim().to_string();
            match key {
                "db_username" => credentials.username = Some(value),
                "db_password" => credentials.password = Some(value),
                "db_host" => credentials.host = Some(value),
                "db_port" => {
                    let port = value.parse::<u16>().map_err(|_| StoreError::InvalidPort {
                        path: origin.to_path_buf(),
                        value: value.clone(),
                    })?;
                    credentials.port = Some(port);
                }
                "db_name" => credentials.database = value,
                other => warn!(
                    file = %origin.display(),
                    line = line_number,
                    key = other,
                    "Ignoring unrecognized credential key"
                ),
            }
        }

        if credentials.database.is_empty() {
            return Err(StoreError::MissingCredential {
                path: origin.to_path_buf(),
                key: "db_name",
            });
        }
        debug!(target_db = %credentials.target(), "Loaded database credentials");
        Ok(credentials)
    }

    /// `user@host:port/database`, without the password.
    pub fn target(&self) -> String {
        let mut out = String::new();
        if let Some(user) = &self.username {
            out.push_str(user);
            out.push('@');
        }
        if let Some(host) = &self.host {
            out.push_str(host);
            if let Some(port) = self.port {
                out.push_str(&format!(":{port}"));
            }
            out.push('/');
        }
        out.push_str(&self.database);
        out
    }
}

impl fmt::Debug for DbCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbCredentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
# target store
db_username=etl
db_password = s3cret
db_host=localhost
db_port=5432
db_name=homes.db
";

    #[test]
    fn parses_all_recognized_keys() {
        let creds = DbCredentials::parse(SAMPLE, Path::new("db_config.txt")).unwrap();
        assert_eq!(creds.username.as_deref(), Some("etl"));
        assert_eq!(creds.password.as_deref(), Some("s3cret"));
        assert_eq!(creds.host.as_deref(), Some("localhost"));
        assert_eq!(creds.port, Some(5432));
        assert_eq!(creds.database, "homes.db");
        assert_eq!(creds.target(), "etl@localhost:5432/homes.db");
    }

    #[test]
    fn debug_output_redacts_password() {
        let creds = DbCredentials::parse(SAMPLE, Path::new("db_config.txt")).unwrap();
        insta::assert_snapshot!(
            format!("{creds:?}"),
            @r#"DbCredentials { username: Some("etl"), password: Some("<redacted>"), host: Some("localhost"), port: Some(5432), database: "homes.db" }"#
        );
    }

    #[test]
    fn malformed_lines_and_unknown_keys_are_skipped() {
        let content = "db_name=homes.db\nthis line has no separator\ndb_schema=public\n\n";
        let creds = DbCredentials::parse(content, Path::new("db_config.txt")).unwrap();
        assert_eq!(creds, DbCredentials::for_database("homes.db"));
    }

    #[test]
    fn missing_database_name_is_fatal() {
        let result = DbCredentials::parse("db_host=localhost\n", Path::new("db_config.txt"));
        assert!(matches!(
            result,
            Err(StoreError::MissingCredential { key: "db_name", .. })
        ));
    }

    #[test]
    fn invalid_port_is_fatal() {
        let result = DbCredentials::parse("db_name=x\ndb_port=99999\n", Path::new("db_config.txt"));
        assert!(matches!(result, Err(StoreError::InvalidPort { .. })));
    }

    #[test]
    fn from_file_reads_disk() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "db_name=:memory:").unwrap();
        let creds = DbCredentials::from_file(file.path()).unwrap();
        assert_eq!(creds.database, ":memory:");
    }

    #[test]
    fn from_file_missing() {
        let result = DbCredentials::from_file(Path::new("/no/such/db_config.txt"));
        assert!(matches!(result, Err(StoreError::CredentialsNotFound { .. })));
    }
}
