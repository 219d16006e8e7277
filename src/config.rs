use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::AppError;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub observability: ObservabilityConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON array of courses, rewritten on every add
    pub catalog_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("course_catalog.json"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// `service.name` on every exported span
    pub service_name: String,
    /// OTLP/HTTP collector base URL, e.g. `http://localhost:4318`
    pub trace_endpoint: Option<String>,
    /// Also print finished spans as JSON lines on stdout
    pub console_exporter: bool,
    pub log_level: String,
    /// "json" or "pretty"
    pub log_format: String,
    pub batch_size: usize,
    pub flush_interval_ms: u64,
    pub export_timeout_ms: u64,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "course-catalog-service".to_string(),
            trace_endpoint: None,
            console_exporter: false,
            log_level: "info".to_string(),
            log_format: "json".to_string(),
            batch_size: 64,
            flush_interval_ms: 1000,
            export_timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "/metrics".to_string(),
        }
    }
}

/// Standard OpenTelemetry environment variables that override file config
#[derive(Debug, Clone, Default)]
pub struct OtelEnv {
    pub service_name: Option<String>,
    pub endpoint: Option<String>,
}

impl OtelEnv {
    pub fn from_env() -> Self {
        Self {
            service_name: non_empty_var("OTEL_SERVICE_NAME"),
            endpoint: non_empty_var("OTEL_EXPORTER_OTLP_ENDPOINT"),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Load configuration from `path` (optional), `COURSE_CATALOG_*` environment
/// variables and the `OTEL_*` overrides, in increasing priority.
pub fn load_config(path: &Path) -> Result<Config, AppError> {
    load_config_with(path, OtelEnv::from_env())
}

pub fn load_config_with(path: &Path, otel: OtelEnv) -> Result<Config, AppError> {
    let config = config::Config::builder()
        .add_source(
            config::File::from(path)
                .format(config::FileFormat::Toml)
                .required(false),
        )
        .add_source(
            config::Environment::with_prefix("COURSE_CATALOG")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("observability.service_name", otel.service_name)?
        .set_override_option("observability.trace_endpoint", otel.endpoint)?
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

pub fn validate_config(cfg: &Config) -> Result<(), AppError> {
    if cfg.server.port == 0 {
        return Err(AppError::Config("server.port must be non-zero".to_string()));
    }

    let obs = &cfg.observability;

    if obs.service_name.trim().is_empty() {
        return Err(AppError::Config(
            "observability.service_name cannot be empty".to_string(),
        ));
    }

    if !matches!(obs.log_format.as_str(), "json" | "pretty") {
        return Err(AppError::Config(format!(
            "observability.log_format must be 'json' or 'pretty', got '{}'",
            obs.log_format
        )));
    }

    if obs.batch_size == 0 {
        return Err(AppError::Config(
            "observability.batch_size must be at least 1".to_string(),
        ));
    }

    if obs.flush_interval_ms == 0 {
        return Err(AppError::Config(
            "observability.flush_interval_ms must be at least 1".to_string(),
        ));
    }

    if obs.export_timeout_ms == 0 {
        return Err(AppError::Config(
            "observability.export_timeout_ms must be at least 1".to_string(),
        ));
    }

    if let Some(endpoint) = &obs.trace_endpoint {
        let parsed = url::Url::parse(endpoint).map_err(|e| {
            AppError::Config(format!("Invalid trace_endpoint '{}': {}", endpoint, e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::Config(format!(
                "trace_endpoint must be an http(s) URL, got '{}'",
                endpoint
            )));
        }
    }

    if cfg.metrics.enabled && !cfg.metrics.endpoint.starts_with('/') {
        return Err(AppError::Config(format!(
            "metrics.endpoint must start with '/', got '{}'",
            cfg.metrics.endpoint
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_without_file() {
        let cfg = load_config_with(Path::new("does-not-exist.toml"), OtelEnv::default()).unwrap();

        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.storage.catalog_path, PathBuf::from("course_catalog.json"));
        assert_eq!(cfg.observability.service_name, "course-catalog-service");
        assert!(cfg.observability.trace_endpoint.is_none());
        assert!(cfg.metrics.enabled);
    }

    #[test]
    fn test_file_values_are_read() {
        let file = write_config(
            r#"
[server]
port = 8080

[observability]
trace_endpoint = "http://localhost:4318"
console_exporter = true
log_format = "pretty"
"#,
        );

        let cfg = load_config_with(file.path(), OtelEnv::default()).unwrap();

        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.observability.trace_endpoint.as_deref(), Some("http://localhost:4318"));
        assert!(cfg.observability.console_exporter);
        assert_eq!(cfg.observability.log_format, "pretty");
    }

    #[test]
    fn test_otel_env_overrides_file() {
        let file = write_config(
            r#"
[observability]
service_name = "from-file"
trace_endpoint = "http://file:4318"
"#,
        );

        let otel = OtelEnv {
            service_name: Some("from-env".to_string()),
            endpoint: Some("http://collector:4318".to_string()),
        };
        let cfg = load_config_with(file.path(), otel).unwrap();

        assert_eq!(cfg.observability.service_name, "from-env");
        assert_eq!(cfg.observability.trace_endpoint.as_deref(), Some("http://collector:4318"));
    }

    #[test]
    fn test_validate_rejects_bad_log_format() {
        let mut cfg = Config::default();
        cfg.observability.log_format = "xml".to_string();

        let result = validate_config(&cfg);
        assert!(result.unwrap_err().to_string().contains("log_format"));
    }

    #[test]
    fn test_validate_rejects_empty_service_name() {
        let mut cfg = Config::default();
        cfg.observability.service_name = "  ".to_string();

        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_port_and_batch() {
        let mut cfg = Config::default();
        cfg.server.port = 0;
        assert!(validate_config(&cfg).is_err());

        let mut cfg = Config::default();
        cfg.observability.batch_size = 0;
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_exporter_timings() {
        let mut cfg = Config::default();
        cfg.observability.flush_interval_ms = 0;
        assert!(validate_config(&cfg).is_err());

        let mut cfg = Config::default();
        cfg.observability.export_timeout_ms = 0;
        let result = validate_config(&cfg);
        assert!(result.unwrap_err().to_string().contains("export_timeout_ms"));
    }

    #[test]
    fn test_validate_trace_endpoint_scheme() {
        let mut cfg = Config::default();
        cfg.observability.trace_endpoint = Some("udp://localhost:6831".to_string());
        assert!(validate_config(&cfg).is_err());

        cfg.observability.trace_endpoint = Some("not a url".to_string());
        assert!(validate_config(&cfg).is_err());

        cfg.observability.trace_endpoint = Some("https://otel.example.com".to_string());
        assert!(validate_config(&cfg).is_ok());
    }
}
