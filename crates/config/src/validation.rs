//! Configuration validation
//!
//! Validates values serde cannot check on its own:
//! - Compressor thread count is at least 1
//! - Compressed suffix starts with a dot
//! - Program names are not empty

use crate::Config;
use crate::error::{ConfigError, Result};

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_compression(config)
}

fn validate_compression(config: &Config) -> Result<()> {
    let compression = &config.compression;

    if compression.threads == 0 {
        return Err(ConfigError::invalid_value(
            "compression",
            "threads",
            "must be at least 1",
        ));
    }

    if !compression.suffix.starts_with('.') || compression.suffix.len() < 2 {
        return Err(ConfigError::invalid_value(
            "compression",
            "suffix",
            format!("'{}' must start with '.' followed by an extension", compression.suffix),
        ));
    }

    for (field, program) in [
        ("compressor", &compression.compressor),
        ("copier", &compression.copier),
        ("decompressor", &compression.decompressor),
    ] {
        if program.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "compression",
                field,
                "program name cannot be empty",
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn invalid_field(toml: &str) -> &'static str {
        match Config::from_str(toml) {
            Err(ConfigError::InvalidValue { field, .. }) => field,
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_zero_threads() {
        assert_eq!(invalid_field("[compression]\nthreads = 0"), "threads");
    }

    #[test]
    fn test_suffix_without_dot() {
        assert_eq!(invalid_field("[compression]\nsuffix = \"xz\""), "suffix");
        assert_eq!(invalid_field("[compression]\nsuffix = \".\""), "suffix");
    }

    #[test]
    fn test_empty_programs() {
        assert_eq!(invalid_field("[compression]\ncompressor = \"\""), "compressor");
        assert_eq!(invalid_field("[compression]\ncopier = \" \""), "copier");
        assert_eq!(invalid_field("[compression]\ndecompressor = \"\""), "decompressor");
    }
}
