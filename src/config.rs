//! Configuration management for musa.
//!
//! This module handles the layered configuration system with the following precedence:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. JSON config file
//! 4. Default values (lowest priority)

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Result, MusaError};

/// Command-line arguments for the musa tile server
#[derive(Parser, Debug)]
#[command(name = "musa")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Single-band raster holding the red band
    pub red: PathBuf,

    /// Single-band raster holding the near-infrared band
    pub nir: PathBuf,

    /// Raster bounds as "left,bottom,right,top"
    #[arg(short, long)]
    pub bounds: String,

    /// CRS of the raster (EPSG:<code>, a PROJ.4 string, or WKT)
    #[arg(long, default_value = "EPSG:4326")]
    pub crs: String,

    /// Host address to bind to [default: 127.0.0.1]
    #[arg(short = 'H', long, env = "MUSA_HOST")]
    pub host: Option<String>,

    /// Port to listen on [default: 8000]
    #[arg(short, long, env = "MUSA_PORT")]
    pub port: Option<u16>,

    /// Compute master ("local", "local[*]" or "local[N]")
    #[arg(short, long, env = "MUSA_MASTER")]
    pub master: Option<String>,

    /// Number of hash partitions used when re-tiling
    #[arg(long, env = "MUSA_PARTITIONS")]
    pub partitions: Option<usize>,

    /// Path to JSON configuration file
    #[arg(short, long, env = "MUSA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error) [default: info]
    #[arg(long, env = "MUSA_LOG_LEVEL")]
    pub log_level: Option<String>,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Compute context configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComputeConfig {
    /// Application name reported in logs and on the status page
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Execution master; only local execution is supported
    #[serde(default = "default_master")]
    pub master: String,

    /// Whether the status UI is mounted on the tile server
    #[serde(default = "default_ui_enabled")]
    pub ui_enabled: bool,
}

/// Tiling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TilingConfig {
    /// Tile edge length in pixels
    #[serde(default = "default_tile_size")]
    pub tile_size: usize,

    /// Number of hash partitions used when re-tiling
    #[serde(default = "default_partitions")]
    pub partitions: usize,

    /// Resampling method used when building pyramids
    #[serde(default = "default_resample_method")]
    pub resample_method: String,
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Directory that rendered images and histograms are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

/// Complete configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Compute context configuration
    #[serde(default)]
    pub compute: ComputeConfig,

    /// Tiling configuration
    #[serde(default)]
    pub tiling: TilingConfig,

    /// Display configuration
    #[serde(default)]
    pub display: DisplayConfig,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Config {
    /// Load configuration from all sources with proper precedence
    pub fn load() -> Result<(Self, Args)> {
        let args = Args::parse();
        let config = Self::from_args(&args)?;
        Ok((config, args))
    }

    /// Build the configuration for already parsed arguments.
    ///
    /// Only flags that were actually given (on the command line or through
    /// the environment) override the config file.
    pub fn from_args(args: &Args) -> Result<Self> {
        // Start with defaults
        let mut config = Config::default();

        // Load from JSON file if provided
        if let Some(config_path) = &args.config {
            let json_config = Self::load_from_file(config_path)?;
            config.merge(json_config);
        }

        // Override with command-line arguments
        if let Some(host) = &args.host {
            config.server.host = host.clone();
        }
        if let Some(port) = args.port {
            config.server.port = port;
        }
        if let Some(master) = &args.master {
            config.compute.master = master.clone();
        }
        if let Some(partitions) = args.partitions {
            config.tiling.partitions = partitions;
        }
        if let Some(log_level) = &args.log_level {
            config.log_level = log_level.clone();
        }

        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        self.server = other.server;
        self.compute = other.compute;
        self.tiling = other.tiling;
        self.display = other.display;
        self.log_level = other.log_level;
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            return Err(MusaError::Config {
                message: "Server host cannot be empty".to_string(),
            });
        }

        // 0 is not a valid port for users
        if self.server.port == 0 {
            return Err(MusaError::Config {
                message: "Server port cannot be 0".to_string(),
            });
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(MusaError::Config {
                    message: format!(
                        "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                        self.log_level
                    ),
                });
            }
        }

        crate::context::parse_master(&self.compute.master)?;

        self.tiling.validate()?;

        if self.display.output_dir.as_os_str().is_empty() {
            return Err(MusaError::Config {
                message: "Display output directory cannot be empty".to_string(),
            });
        }

        Ok(())
    }
}

impl TilingConfig {
    /// Check tile size, partition count and resample method
    pub fn validate(&self) -> Result<()> {
        let tile_size = self.tile_size;
        if !tile_size.is_power_of_two() || !(64..=1024).contains(&tile_size) {
            return Err(MusaError::Config {
                message: format!(
                    "Invalid tile size: {}. Must be a power of two between 64 and 1024",
                    tile_size
                ),
            });
        }

        if self.partitions == 0 {
            return Err(MusaError::Config {
                message: "Partition count cannot be 0".to_string(),
            });
        }

        match self.resample_method.as_str() {
            "nearest" | "bilinear" | "bicubic" => {}
            _ => {
                return Err(MusaError::Config {
                    message: format!(
                        "Invalid resample method: {}. Must be one of: nearest, bilinear, bicubic",
                        self.resample_method
                    ),
                });
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            compute: ComputeConfig::default(),
            tiling: TilingConfig::default(),
            display: DisplayConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            master: default_master(),
            ui_enabled: default_ui_enabled(),
        }
    }
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self {
            tile_size: default_tile_size(),
            partitions: default_partitions(),
            resample_method: default_resample_method(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

// Default value functions for serde
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_app_name() -> String {
    "musa".to_string()
}

fn default_master() -> String {
    "local[*]".to_string()
}

fn default_ui_enabled() -> bool {
    true
}

fn default_tile_size() -> usize {
    256
}

fn default_partitions() -> usize {
    40
}

fn default_resample_method() -> String {
    "bilinear".to_string()
}

fn default_output_dir() -> PathBuf {
    std::env::temp_dir().join("musa")
}

fn default_log_level() -> String {
    "info".to_string()
}
