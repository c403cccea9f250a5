//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::{Cli, CliResizeFilter};
use crate::config::{ResizeFilter, StageConfig};
use anyhow::{Context, Result};

/// Convert CLI arguments to a unified `StageConfig`
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build `StageConfig` from CLI arguments
    pub(crate) fn from_cli(cli: &Cli) -> Result<StageConfig> {
        let resize_filter = match cli.filter {
            CliResizeFilter::Nearest => ResizeFilter::Nearest,
            CliResizeFilter::Triangle => ResizeFilter::Triangle,
            CliResizeFilter::CatmullRom => ResizeFilter::CatmullRom,
            CliResizeFilter::Lanczos3 => ResizeFilter::Lanczos3,
        };

        StageConfig::builder()
            .product_dir(&cli.products)
            .background_dir(&cli.backgrounds)
            .output_dir(&cli.output)
            .model_dir(&cli.models)
            .foreground_label(cli.foreground_label)
            .resize_filter(resize_filter)
            .jpeg_quality(cli.jpeg_quality)
            .build()
            .context("Invalid configuration")
    }

    /// Validate CLI arguments for consistency
    pub(crate) fn validate_cli(cli: &Cli) -> Result<()> {
        if cli.jpeg_quality > 100 {
            anyhow::bail!("JPEG quality must be 0-100, got {}", cli.jpeg_quality);
        }
        for (name, path) in [
            ("--products", &cli.products),
            ("--backgrounds", &cli.backgrounds),
            ("--output", &cli.output),
            ("--models", &cli.models),
        ] {
            if path.as_os_str().is_empty() {
                anyhow::bail!("{} path must not be empty", name);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn create_test_cli() -> Cli {
        Cli {
            products: PathBuf::from("images/products"),
            backgrounds: PathBuf::from("images/backgrounds"),
            output: PathBuf::from("output"),
            models: PathBuf::from("models"),
            foreground_label: 1,
            filter: CliResizeFilter::Lanczos3,
            jpeg_quality: 90,
            verbose: 0,
        }
    }

    #[test]
    fn test_cli_config_conversion() {
        let cli = create_test_cli();
        let config = CliConfigBuilder::from_cli(&cli).unwrap();

        assert_eq!(config.product_dir, PathBuf::from("images/products"));
        assert_eq!(config.background_dir, PathBuf::from("images/backgrounds"));
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(config.model_dir, PathBuf::from("models"));
        assert_eq!(config.foreground_label, 1);
        assert_eq!(config.resize_filter, ResizeFilter::Lanczos3);
        assert_eq!(config.jpeg_quality, 90);
    }

    #[test]
    fn test_cli_filter_mapping() {
        let mut cli = create_test_cli();
        cli.filter = CliResizeFilter::Triangle;
        let config = CliConfigBuilder::from_cli(&cli).unwrap();
        assert_eq!(config.resize_filter, ResizeFilter::Triangle);
    }

    #[test]
    fn test_cli_validation() {
        let mut cli = create_test_cli();
        assert!(CliConfigBuilder::validate_cli(&cli).is_ok());

        cli.jpeg_quality = 101;
        assert!(CliConfigBuilder::validate_cli(&cli).is_err());

        cli.jpeg_quality = 90;
        cli.output = PathBuf::new();
        assert!(CliConfigBuilder::validate_cli(&cli).is_err());
    }
}
