use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub data: DataConfig,
    pub table: TableConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Dashboard persistence service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub user_id: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceKind {
    Fixture,
    Api,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub source: DataSourceKind,
    pub fixture_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    pub rows_per_page: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            api: ApiConfig {
                base_url: "http://localhost:8080".to_string(),
                user_id: "1".to_string(),
                timeout_secs: 30,
            },
            data: DataConfig {
                source: DataSourceKind::Fixture,
                fixture_path: "data/consumption.json".to_string(),
            },
            table: TableConfig { rows_per_page: 5 },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

/// `CHART_BUILDER_SERVER__PORT=4000` overrides `server.port`
fn env_source() -> Environment {
    Environment::with_prefix("CHART_BUILDER")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder =
            ConfigBuilder::builder().add_source(config::Config::try_from(&Config::default())?);

        if Path::new("config.yaml").exists() {
            builder = builder.add_source(File::with_name("config"));
        }

        builder = builder.add_source(env_source());

        builder.build()?.try_deserialize()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut builder =
            ConfigBuilder::builder().add_source(config::Config::try_from(&Config::default())?);

        if path.as_ref().exists() {
            builder = builder.add_source(File::from(path.as_ref()));
        }

        builder = builder.add_source(env_source());

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.api.user_id, "1");
        assert_eq!(config.data.source, DataSourceKind::Fixture);
        assert_eq!(config.table.rows_per_page, 5);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_load_from_yaml_file() {
        let yaml_content = r#"
server:
  host: "127.0.0.1"
  port: 4000
api:
  base_url: "http://dashboard.internal:9000"
  user_id: "42"
data:
  source: "api"
logging:
  level: "debug"
"#;

        let mut temp_file = NamedTempFile::with_suffix(".yaml").unwrap();
        temp_file.write_all(yaml_content.as_bytes()).unwrap();

        let config = Config::load_from_file(temp_file.path()).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.api.base_url, "http://dashboard.internal:9000");
        assert_eq!(config.api.user_id, "42");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.data.source, DataSourceKind::Api);
        assert_eq!(config.data.fixture_path, "data/consumption.json");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_config_builder_with_env() {
        let vars: config::Map<String, String> = [
            ("CHART_BUILDER_SERVER__PORT", "4100"),
            ("CHART_BUILDER_API__BASE_URL", "http://dashboard.env:9100"),
            ("CHART_BUILDER_DATA__SOURCE", "api"),
            ("CHART_BUILDER_TABLE__ROWS_PER_PAGE", "20"),
            ("OTHER_SERVER__PORT", "1"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config: Config = ConfigBuilder::builder()
            .add_source(config::Config::try_from(&Config::default()).unwrap())
            .add_source(env_source().source(Some(vars)))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 4100);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.api.base_url, "http://dashboard.env:9100");
        assert_eq!(config.data.source, DataSourceKind::Api);
        assert_eq!(config.table.rows_per_page, 20);
    }

    #[test]
    fn test_config_load_nonexistent_file() {
        let config = Config::load_from_file("nonexistent.yaml").unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.table.rows_per_page, 5);
    }
}
