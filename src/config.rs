use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::widget::controller::FailurePolicy;

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
    /// Reject responses whose row_count disagrees with the returned rows
    #[serde(default)]
    pub strict_row_count: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WidgetConfig {
    pub include_analysis: bool,
    pub use_cache: bool,
    pub on_failure: FailurePolicy,
    #[serde(default)]
    pub palette: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub service: ServiceConfig,
    pub web: WebConfig,
    pub widget: WidgetConfig,
}

#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Query service endpoint (POST target)
    #[arg(short, long)]
    pub endpoint: Option<String>,

    /// Ask one question, print the rendered result and exit
    #[arg(short, long, value_name = "QUESTION")]
    pub ask: Option<String>,

    /// Do not request the generated analysis
    #[arg(long)]
    pub no_analysis: bool,
}

impl AppConfig {
    pub fn new(args: &CliArgs) -> Result<Self, ConfigError> {
        // Start with the built-in defaults
        let defaults = AppConfig::default();
        let mut config_builder = Config::builder()
            .set_default("service.endpoint", defaults.service.endpoint)?
            .set_default("service.timeout_secs", defaults.service.timeout_secs as i64)?
            .set_default("service.strict_row_count", defaults.service.strict_row_count)?
            .set_default("web.host", defaults.web.host)?
            .set_default("web.port", i64::from(defaults.web.port))?
            .set_default("widget.include_analysis", defaults.widget.include_analysis)?
            .set_default("widget.use_cache", defaults.widget.use_cache)?
            .set_default("widget.on_failure", "clear")?;

        // Add configuration from file if specified
        if let Some(config_path) = &args.config {
            config_builder = config_builder.add_source(File::from(config_path.as_path()));
        } else {
            // Check for config in default locations
            let default_locations = vec![
                "config.toml",
                "config/config.toml",
                "/etc/query-widget/config.toml",
            ];

            for location in default_locations {
                if Path::new(location).exists() {
                    config_builder =
                        config_builder.add_source(File::new(location, config::FileFormat::Toml));
                    break;
                }
            }
        }

        // QUERY_WIDGET__SERVICE__ENDPOINT=... etc.
        config_builder =
            config_builder.add_source(Environment::with_prefix("QUERY_WIDGET").separator("__"));

        let mut config: AppConfig = config_builder.build()?.try_deserialize()?;

        // Override with command line args if provided
        if let Some(host) = &args.host {
            config.web.host = host.clone();
        }
        if let Some(port) = args.port {
            config.web.port = port;
        }
        if let Some(endpoint) = &args.endpoint {
            config.service.endpoint = endpoint.clone();
        }
        if args.no_analysis {
            config.widget.include_analysis = false;
        }

        Ok(config)
    }
}

// Default implementation
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                endpoint: "http://localhost:3000/api/query".to_string(),
                timeout_secs: 60,
                strict_row_count: false,
            },
            web: WebConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            widget: WidgetConfig {
                include_analysis: true,
                use_cache: true,
                on_failure: FailurePolicy::default(),
                palette: Vec::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn cli_flags_override_file_values() {
        let dir = std::env::temp_dir().join(format!("query-widget-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("widget.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r##"
[service]
endpoint = "http://analytics.internal/api/query"
timeout_secs = 15

[web]
port = 9000

[widget]
on_failure = "keep"
palette = ["#111111", "#222222"]
"##
        )
        .unwrap();

        let args = CliArgs {
            config: Some(path),
            port: Some(9100),
            no_analysis: true,
            ..CliArgs::default()
        };
        let config = AppConfig::new(&args).unwrap();

        assert_eq!(config.service.endpoint, "http://analytics.internal/api/query");
        assert_eq!(config.service.timeout_secs, 15);
        assert_eq!(config.web.host, "127.0.0.1");
        assert_eq!(config.web.port, 9100);
        assert_eq!(config.widget.on_failure, FailurePolicy::Keep);
        assert_eq!(config.widget.palette, ["#111111", "#222222"]);
        assert!(!config.widget.include_analysis);
        assert!(config.widget.use_cache);

        std::fs::remove_dir_all(&dir).ok();
    }
}
