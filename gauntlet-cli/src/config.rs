//! Configuration loading from gauntlet.toml
//!
//! Gauntlet configuration can be specified in a `gauntlet.toml` file in the project root.
//! The configuration is automatically discovered by walking up from the current directory.
//! Command-line flags take precedence over anything set here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up by [`GauntletConfig::discover`]
pub const CONFIG_FILE_NAME: &str = "gauntlet.toml";

/// Gauntlet configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GauntletConfig {
    /// Runner configuration
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Runner configuration for scheduled runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Number of iterations; each iteration runs every test at every parameter once
    #[serde(default)]
    pub iterations: Option<usize>,
    /// Parameter values handed to each test
    #[serde(default)]
    pub params: Option<Vec<f64>>,
    /// Worker-pool size (defaults to cores - 2, at least 1)
    #[serde(default)]
    pub jobs: Option<usize>,
    /// Draw a progress bar on the terminal
    #[serde(default = "default_progress")]
    pub progress: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            iterations: None,
            params: None,
            jobs: None,
            progress: default_progress(),
        }
    }
}

fn default_progress() -> bool {
    true
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format: "human" or "json"
    #[serde(default = "default_format")]
    pub format: String,
    /// Output directory for saved reports
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Save a JSON report into `directory` after each run
    #[serde(default)]
    pub save_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            directory: default_output_dir(),
            save_json: false,
        }
    }
}

fn default_format() -> String {
    "human".to_string()
}
fn default_output_dir() -> String {
    "target/gauntlet".to_string()
}

impl OutputConfig {
    /// Path of the saved JSON report for a run id
    pub fn report_path(&self, run_id: &str) -> PathBuf {
        Path::new(&self.directory).join(format!("gauntlet-{}.json", run_id))
    }
}

impl GauntletConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let dir = std::env::current_dir().ok()?;
        Self::discover_from(dir)
    }

    /// Walk up from `dir` looking for [`CONFIG_FILE_NAME`]
    pub fn discover_from(mut dir: PathBuf) -> Option<Self> {
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => Some(config),
                    Err(e) => {
                        tracing::warn!(
                            path = %config_path.display(),
                            error = %e,
                            "ignoring unreadable configuration"
                        );
                        None
                    }
                };
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# Gauntlet Configuration

[runner]
# Iterations per run (uncomment to override the suite's value)
# iterations = 10
# Parameter values passed to every test (uncomment to enable)
# params = [1.0, 10.0, 100.0]
# Worker threads (defaults to cores - 2, at least 1)
# jobs = 4
# Draw a progress bar while running
progress = true

[output]
# Default output format: human or json
format = "human"
# Directory for saved reports
directory = "target/gauntlet"
# Save a JSON report after each run
save_json = false
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GauntletConfig::default();
        assert_eq!(config.runner.iterations, None);
        assert!(config.runner.progress);
        assert_eq!(config.output.format, "human");
        assert_eq!(config.output.directory, "target/gauntlet");
        assert!(!config.output.save_json);
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [runner]
            iterations = 25
            params = [1.0, 2.5]
            jobs = 3

            [output]
            save_json = true
        "#;

        let config: GauntletConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.runner.iterations, Some(25));
        assert_eq!(config.runner.params, Some(vec![1.0, 2.5]));
        assert_eq!(config.runner.jobs, Some(3));
        assert!(config.output.save_json);
        // Defaults should still apply
        assert!(config.runner.progress);
        assert_eq!(config.output.format, "human");
    }

    #[test]
    fn test_default_toml_parses() {
        let default_toml = GauntletConfig::default_toml();
        let config: GauntletConfig = toml::from_str(&default_toml).unwrap();
        assert!(config.runner.progress);
        assert_eq!(config.runner.jobs, None);
        assert_eq!(config.output.directory, "target/gauntlet");
    }

    #[test]
    fn test_report_path() {
        let output = OutputConfig::default();
        assert_eq!(
            output.report_path("20240101120000"),
            Path::new("target/gauntlet").join("gauntlet-20240101120000.json")
        );
    }

    #[test]
    fn test_discover_from_walks_up() {
        let root = std::env::temp_dir().join(format!("gauntlet-config-{}", std::process::id()));
        let nested = root.join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.join(CONFIG_FILE_NAME), "[runner]\niterations = 7\n").unwrap();

        let config = GauntletConfig::discover_from(nested).unwrap();
        assert_eq!(config.runner.iterations, Some(7));

        std::fs::remove_dir_all(&root).unwrap();
    }
}
