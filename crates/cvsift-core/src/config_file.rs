use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub api: Option<ApiConfig>,
    pub extraction: Option<ExtractionConfig>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub max_chars: Option<usize>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    pub csv_path: Option<String>,
    pub log_file: Option<String>,
}

/// Platform config directory path: `<config_dir>/cvsift/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cvsift").join("config.toml"))
}

/// Load config by cascading CWD `.cvsift.toml` over the platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(&PathBuf::from(".cvsift.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &PathBuf) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        api: Some(ApiConfig {
            api_key: pick(&overlay.api, &base.api, |a| a.api_key.clone()),
            base_url: pick(&overlay.api, &base.api, |a| a.base_url.clone()),
            model: pick(&overlay.api, &base.api, |a| a.model.clone()),
        }),
        extraction: Some(ExtractionConfig {
            max_chars: pick(&overlay.extraction, &base.extraction, |e| e.max_chars),
            max_tokens: pick(&overlay.extraction, &base.extraction, |e| e.max_tokens),
            temperature: pick(&overlay.extraction, &base.extraction, |e| e.temperature),
            request_timeout_secs: pick(&overlay.extraction, &base.extraction, |e| {
                e.request_timeout_secs
            }),
        }),
        output: Some(OutputConfig {
            csv_path: pick(&overlay.output, &base.output, |o| o.csv_path.clone()),
            log_file: pick(&overlay.output, &base.output, |o| o.log_file.clone()),
        }),
    }
}

fn pick<S, T>(overlay: &Option<S>, base: &Option<S>, get: impl Fn(&S) -> Option<T>) -> Option<T> {
    overlay
        .as_ref()
        .and_then(&get)
        .or_else(|| base.as_ref().and_then(&get))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_config() {
        let parsed: ConfigFile = toml::from_str(
            r#"
            [api]
            model = "deepseek-chat"
            "#,
        )
        .unwrap();
        assert_eq!(
            parsed.api.as_ref().unwrap().model.as_deref(),
            Some("deepseek-chat")
        );
        assert!(parsed.extraction.is_none());
    }

    #[test]
    fn overlay_wins_over_base() {
        let base: ConfigFile = toml::from_str(
            r#"
            [api]
            api_key = "base-key"
            model = "base-model"

            [extraction]
            max_chars = 1000
            "#,
        )
        .unwrap();
        let overlay: ConfigFile = toml::from_str(
            r#"
            [api]
            model = "overlay-model"
            "#,
        )
        .unwrap();

        let merged = merge(base, overlay);
        let api = merged.api.unwrap();
        assert_eq!(api.api_key.as_deref(), Some("base-key"));
        assert_eq!(api.model.as_deref(), Some("overlay-model"));
        assert_eq!(merged.extraction.unwrap().max_chars, Some(1000));
    }

    #[test]
    fn missing_file_yields_none() {
        assert!(load_from_path(&PathBuf::from("/nonexistent/cvsift.toml")).is_none());
    }
}
