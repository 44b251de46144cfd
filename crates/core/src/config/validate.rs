use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - At least one verification job may run
/// - File templates are not empty
/// - Organizer destinations are absolute
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.verify.max_concurrent == 0 {
        return Err(ConfigError::ValidationError(
            "verify.max_concurrent must be at least 1".to_string(),
        ));
    }

    let naming = &config.naming;
    for (key, template) in [
        ("naming.series.file", &naming.series.file),
        ("naming.movie.file", &naming.movie.file),
        ("naming.music.file", &naming.music.file),
        ("naming.book.file", &naming.book.file),
    ] {
        if template.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                key
            )));
        }
    }

    for (media_type, root) in config.organizer.destinations.iter() {
        if !root.is_absolute() {
            return Err(ConfigError::ValidationError(format!(
                "organizer.destinations for {} must be an absolute path: {}",
                media_type,
                root.display()
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use std::net::IpAddr;
    use std::path::PathBuf;

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let config = Config {
            server: ServerConfig {
                host: "0.0.0.0".parse::<IpAddr>().unwrap(),
                port: 0,
            },
            ..Default::default()
        };
        let result = validate_config(&config);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_zero_concurrency_fails() {
        let mut config = Config::default();
        config.verify.max_concurrent = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_empty_file_template_fails() {
        let mut config = Config::default();
        config.naming.book.file = "  ".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("naming.book.file"));
    }

    #[test]
    fn test_validate_relative_destination_fails() {
        let mut config = Config::default();
        config.organizer.destinations.music = Some(PathBuf::from("music"));
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("music"));
    }
}
