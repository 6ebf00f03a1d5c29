use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::export::DEFAULT_CAPTURE_SCALE;

const APP_DIR_NAME: &str = "resume-builder";

/// Application configuration loaded from environment variables.
/// Every variable is optional.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the snapshot file.
    pub storage_dir: PathBuf,
    /// Directory exported PDFs are written to.
    pub export_dir: PathBuf,
    /// TrueType font used for every template instead of the system fonts.
    pub font_path: Option<PathBuf>,
    pub capture_scale: f32,
    /// Require every skill entry to be non-empty.
    pub strict_skills: bool,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let capture_scale = match non_empty("RESUME_CAPTURE_SCALE") {
            Some(raw) => raw
                .trim()
                .parse::<f32>()
                .ok()
                .filter(|s| s.is_finite() && *s > 0.0)
                .with_context(|| {
                    format!("RESUME_CAPTURE_SCALE must be a positive number, got '{raw}'")
                })?,
            None => DEFAULT_CAPTURE_SCALE,
        };

        let strict_skills = match non_empty("RESUME_STRICT_SKILLS") {
            Some(raw) => parse_bool(&raw)
                .with_context(|| format!("RESUME_STRICT_SKILLS must be true or false, got '{raw}'"))?,
            None => false,
        };

        Ok(Config {
            storage_dir: non_empty("RESUME_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(default_storage_dir),
            export_dir: non_empty("RESUME_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            font_path: non_empty("RESUME_FONT_PATH").map(PathBuf::from),
            capture_scale,
            strict_skills,
            rust_log: non_empty("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn default_storage_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(format!(".{APP_DIR_NAME}")))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.export_dir, PathBuf::from("."));
        assert_eq!(config.capture_scale, 2.0);
        assert!(!config.strict_skills);
        assert!(config.font_path.is_none());
        assert_eq!(config.rust_log, "info");
        assert!(config.storage_dir.to_string_lossy().ends_with("resume-builder"));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("RESUME_STORAGE_DIR", "/tmp/store"),
            ("RESUME_EXPORT_DIR", "/tmp/out"),
            ("RESUME_FONT_PATH", "/fonts/Inter.ttf"),
            ("RESUME_CAPTURE_SCALE", "1.5"),
            ("RESUME_STRICT_SKILLS", "yes"),
            ("RUST_LOG", "debug"),
        ])
        .unwrap();
        assert_eq!(config.storage_dir, PathBuf::from("/tmp/store"));
        assert_eq!(config.export_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.font_path, Some(PathBuf::from("/fonts/Inter.ttf")));
        assert_eq!(config.capture_scale, 1.5);
        assert!(config.strict_skills);
        assert_eq!(config.rust_log, "debug");
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = config_from(&[("RESUME_EXPORT_DIR", "  "), ("RESUME_FONT_PATH", "")]).unwrap();
        assert_eq!(config.export_dir, PathBuf::from("."));
        assert!(config.font_path.is_none());
    }

    #[test]
    fn test_invalid_scale_is_rejected() {
        for bad in ["zero", "0", "-2", "NaN"] {
            let err = config_from(&[("RESUME_CAPTURE_SCALE", bad)]).unwrap_err();
            assert!(err.to_string().contains("RESUME_CAPTURE_SCALE"), "{bad}");
        }
    }

    #[test]
    fn test_invalid_bool_is_rejected() {
        assert!(config_from(&[("RESUME_STRICT_SKILLS", "maybe")]).is_err());
    }
}
