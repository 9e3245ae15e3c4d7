//! Runtime configuration read from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_UPLOAD_DIR: &str = "./uploads";
const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Where incident photos are written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttachmentBackend {
    Local { upload_dir: PathBuf },
    Gcs { bucket: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub attachments: AttachmentBackend,
    pub frontend_url: String,
    pub max_upload_bytes: usize,
    pub strict_status_transitions: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let bind_addr = parse_or(get("BIND_ADDR"), "BIND_ADDR", DEFAULT_BIND_ADDR)?;

        let attachments = match get("ATTACHMENT_BACKEND")
            .unwrap_or_else(|| "local".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "local" => AttachmentBackend::Local {
                upload_dir: get("UPLOAD_DIR")
                    .unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string())
                    .into(),
            },
            "gcs" => AttachmentBackend::Gcs {
                bucket: get("GCS_BUCKET_NAME").ok_or(ConfigError::Missing("GCS_BUCKET_NAME"))?,
            },
            other => {
                return Err(ConfigError::Invalid {
                    key: "ATTACHMENT_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let frontend_url = get("FRONTEND_URL").unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string());

        let max_upload_bytes = match get("MAX_UPLOAD_BYTES") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "MAX_UPLOAD_BYTES",
                value: raw,
            })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let strict_status_transitions = match get("STRICT_STATUS_TRANSITIONS") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid {
                key: "STRICT_STATUS_TRANSITIONS",
                value: raw,
            })?,
            None => false,
        };

        Ok(Self {
            database_url,
            bind_addr,
            attachments,
            frontend_url,
            max_upload_bytes,
            strict_status_transitions,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    raw: Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError> {
    let raw = raw.unwrap_or_else(|| default.to_string());
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value: raw })
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let cfg = config(&[("DATABASE_URL", "postgres://localhost/crisis")]).unwrap();

        assert_eq!(cfg.database_url, "postgres://localhost/crisis");
        assert_eq!(cfg.bind_addr, "0.0.0.0:8000".parse::<SocketAddr>().unwrap());
        assert_eq!(
            cfg.attachments,
            AttachmentBackend::Local {
                upload_dir: PathBuf::from("./uploads")
            }
        );
        assert_eq!(cfg.frontend_url, "http://localhost:5173");
        assert_eq!(cfg.max_upload_bytes, 10 * 1024 * 1024);
        assert!(!cfg.strict_status_transitions);
    }

    #[test]
    fn database_url_is_required() {
        assert_eq!(config(&[]), Err(ConfigError::Missing("DATABASE_URL")));
        assert_eq!(
            config(&[("DATABASE_URL", "  ")]),
            Err(ConfigError::Missing("DATABASE_URL"))
        );
    }

    #[test]
    fn gcs_backend_needs_bucket() {
        let err = config(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("ATTACHMENT_BACKEND", "gcs"),
        ])
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing("GCS_BUCKET_NAME"));

        let cfg = config(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("ATTACHMENT_BACKEND", "GCS"),
            ("GCS_BUCKET_NAME", "relief-uploads"),
        ])
        .unwrap();
        assert_eq!(
            cfg.attachments,
            AttachmentBackend::Gcs {
                bucket: "relief-uploads".to_string()
            }
        );
    }

    #[rstest]
    #[case("BIND_ADDR", "not-an-addr")]
    #[case("ATTACHMENT_BACKEND", "s3")]
    #[case("MAX_UPLOAD_BYTES", "ten")]
    #[case("STRICT_STATUS_TRANSITIONS", "maybe")]
    fn rejects_invalid_values(#[case] key: &str, #[case] value: &str) {
        let err = config(&[("DATABASE_URL", "sqlite::memory:"), (key, value)]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }), "{key}={value}");
    }

    #[test]
    fn overrides_are_read() {
        let cfg = config(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("UPLOAD_DIR", "/var/lib/crisis/uploads"),
            ("FRONTEND_URL", "https://relief.example.org"),
            ("MAX_UPLOAD_BYTES", "2048"),
            ("STRICT_STATUS_TRANSITIONS", "true"),
        ])
        .unwrap();

        assert_eq!(cfg.bind_addr, "127.0.0.1:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(
            cfg.attachments,
            AttachmentBackend::Local {
                upload_dir: PathBuf::from("/var/lib/crisis/uploads")
            }
        );
        assert_eq!(cfg.frontend_url, "https://relief.example.org");
        assert_eq!(cfg.max_upload_bytes, 2048);
        assert!(cfg.strict_status_transitions);
    }
}
