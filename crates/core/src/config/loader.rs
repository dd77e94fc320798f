use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("INTAKE_").split("_"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    validate_config(&config)?;
    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    let config: Config =
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Reject configurations that would wedge the pipeline.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.orchestrator.max_parallel_extractions == 0 {
        return Err(ConfigError::Invalid(
            "orchestrator.max_parallel_extractions must be at least 1".to_string(),
        ));
    }
    if config.orchestrator.batch_max_concurrent == 0 {
        return Err(ConfigError::Invalid(
            "orchestrator.batch_max_concurrent must be at least 1".to_string(),
        ));
    }
    if config.orchestrator.waveform_buckets == 0 {
        return Err(ConfigError::Invalid(
            "orchestrator.waveform_buckets must be at least 1".to_string(),
        ));
    }

    for (name, endpoint) in [
        ("vision", &config.services.vision),
        ("ocr", &config.services.ocr),
        ("speech", &config.services.speech),
        ("document_parser", &config.services.document_parser),
    ] {
        if let Some(endpoint) = endpoint {
            if !endpoint.url.starts_with("http://") && !endpoint.url.starts_with("https://") {
                return Err(ConfigError::Invalid(format!(
                    "services.{}.url must be an http(s) URL",
                    name
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[orchestrator]
max_parallel_extractions = 2

[services.vision]
url = "http://localhost:7010"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.orchestrator.max_parallel_extractions, 2);
        assert_eq!(config.orchestrator.batch_max_concurrent, 3);
        assert_eq!(
            config.services.vision.as_ref().unwrap().url,
            "http://localhost:7010"
        );
        assert!(config.services.ocr.is_none());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.orchestrator.max_parallel_extractions, 4);
        assert_eq!(config.orchestrator.waveform_buckets, 100);
    }

    #[test]
    fn test_zero_permits_rejected() {
        let result = load_config_from_str("[orchestrator]\nmax_parallel_extractions = 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_non_http_endpoint_rejected() {
        let result = load_config_from_str("[services.ocr]\nurl = \"ftp://example\"\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[orchestrator]
batch_max_concurrent = 5

[services.speech]
url = "http://localhost:7020"
timeout_secs = 10
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.orchestrator.batch_max_concurrent, 5);
        assert_eq!(config.services.speech.as_ref().unwrap().timeout_secs, 10);
    }
}
