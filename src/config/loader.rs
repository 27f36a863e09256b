//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::api;
use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::routing::{ConfigurationError, RouteMap, RouteTable};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
    Routes(ConfigurationError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
            ConfigError::Routes(e) => write!(f, "Route table error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigurationError> for ConfigError {
    fn from(e: ConfigurationError) -> Self {
        ConfigError::Routes(e)
    }
}

/// Load and validate configuration from a TOML file.
///
/// A relative `api.routes_file` is resolved against the config file's directory.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let mut config: ServiceConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    if let (Some(routes), Some(dir)) = (&config.api.routes_file, path.parent()) {
        if routes.is_relative() {
            config.api.routes_file = Some(dir.join(routes));
        }
    }

    Ok(config)
}

/// Load a route table from a TOML file.
pub fn load_route_table(path: &Path) -> Result<RouteTable, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// The route table a configuration selects: the file if one is named,
/// otherwise the built-in table for the configured API version.
pub fn route_table(config: &ServiceConfig) -> Result<RouteTable, ConfigError> {
    match &config.api.routes_file {
        Some(path) => load_route_table(path),
        None => Ok(api::urls(&config.api.version)),
    }
}

/// Select, expand and validate the route table.
pub fn build_route_map(config: &ServiceConfig) -> Result<RouteMap, ConfigError> {
    let table = route_table(config)?;
    Ok(RouteMap::build(&table)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "cloud-rest-{}-{}",
            name,
            uuid::Uuid::new_v4()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_valid_config() {
        let dir = scratch_dir("valid");
        let path = dir.join("service.toml");
        fs::write(
            &path,
            "[listener]\nbind_address = \"127.0.0.1:8000\"\n[api]\nversion = \"v2\"\nroutes_file = \"routes.toml\"\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.api.version, "v2");
        assert_eq!(config.api.routes_file, Some(dir.join("routes.toml")));
    }

    #[test]
    fn test_load_rejects_invalid_config() {
        let dir = scratch_dir("invalid");
        let path = dir.join("service.toml");
        fs::write(&path, "[timeouts]\nrequest_secs = 0\n").unwrap();

        match load_config(&path) {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors[0].field, "timeouts.request_secs")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_built_in_table_by_default() {
        let map = build_route_map(&ServiceConfig::default()).unwrap();
        assert!(!map.is_empty());
    }

    #[test]
    fn test_route_table_from_file() {
        let dir = scratch_dir("routes");
        let path = dir.join("routes.toml");
        fs::write(
            &path,
            r#"
[[root]]
pattern = "/"
endpoint = { handler = "ApplicationHandler", method = "index" }

[[mounts]]
kind = "group"
prefix = "/v9/compute"
handler = "ComputeHandler"

[[mounts.members]]
pattern = "/providers"
endpoint = "providers"
methods = ["GET"]

[[mounts.members]]
values = { objects = "nodes" }

[[mounts.members.template.rules]]
pattern = "/<string:provider>/$objects"
endpoint = "invoke_method"
defaults = { method_name = "list_$objects" }
"#,
        )
        .unwrap();

        let mut config = ServiceConfig::default();
        config.api.routes_file = Some(path);
        let map = build_route_map(&config).unwrap();
        let patterns: Vec<_> = map.rules().iter().map(|r| r.pattern().as_str()).collect();
        assert_eq!(
            patterns,
            vec!["/", "/v9/compute/providers", "/v9/compute/<string:provider>/nodes"]
        );
    }

    #[test]
    fn test_broken_route_file_is_route_error() {
        let dir = scratch_dir("broken");
        let path = dir.join("routes.toml");
        fs::write(
            &path,
            "[[root]]\npattern = \"/<int:id>\"\nendpoint = { handler = \"H\", method = \"m\" }\n",
        )
        .unwrap();

        let mut config = ServiceConfig::default();
        config.api.routes_file = Some(path);
        assert!(matches!(
            build_route_map(&config),
            Err(ConfigError::Routes(ConfigurationError::UnsupportedConverter { .. }))
        ));
    }
}
