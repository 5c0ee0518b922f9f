use serde::Serialize;
use thiserror::Error;

pub mod client;
pub mod config_file;
pub mod mock;
pub mod parse;
pub mod pipeline;
pub mod prompt;

// Re-export for convenience
pub use client::{ChatBackend, DeepSeekClient};
pub use pipeline::extract_folder;
pub use prompt::{DEFAULT_MAX_CHARS, EXTRACTION_PROMPT};

/// One row of structured output for one input CV file.
///
/// Every field except `filename` is optional; `None` renders as an empty CSV
/// cell. Field order here is the canonical CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CvRecord {
    pub filename: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub professional_summary: Option<String>,
    pub current_job_title: Option<String>,
    pub current_company: Option<String>,
    pub years_experience: Option<String>,
    pub education: Option<String>,
    pub institution: Option<String>,
}

impl CvRecord {
    /// The null-filled row emitted when a file fails extraction or the API
    /// call fails. Only `filename` is populated.
    pub fn empty(filename: &str) -> Self {
        Self {
            filename: filename.to_string(),
            name: None,
            email: None,
            phone: None,
            location: None,
            linkedin: None,
            github: None,
            professional_summary: None,
            current_job_title: None,
            current_company: None,
            years_experience: None,
            education: None,
            institution: None,
        }
    }

    /// Build a record from a parsed model reply.
    ///
    /// Lenient on scalar types: strings are kept, numbers are rendered
    /// (models often return `years_experience` as a number), null / missing /
    /// empty-string become `None`.
    pub fn from_value(filename: &str, value: &serde_json::Value) -> Self {
        Self {
            filename: filename.to_string(),
            name: field(value, "name"),
            email: field(value, "email"),
            phone: field(value, "phone"),
            location: field(value, "location"),
            linkedin: field(value, "linkedin"),
            github: field(value, "github"),
            professional_summary: field(value, "professional_summary"),
            current_job_title: field(value, "current_job_title"),
            current_company: field(value, "current_company"),
            years_experience: field(value, "years_experience"),
            education: field(value, "education"),
            institution: field(value, "institution"),
        }
    }
}

fn field(value: &serde_json::Value, key: &str) -> Option<String> {
    match &value[key] {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Summary statistics for a complete run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub total: usize,
    pub succeeded: usize,
    pub failed_extraction: usize,
    pub failed_api: usize,
}

/// Progress events emitted while processing a folder.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Processing {
        index: usize,
        total: usize,
        filename: String,
    },
    Extracted {
        index: usize,
        total: usize,
        filename: String,
        chars: usize,
        truncated: bool,
    },
    Succeeded {
        index: usize,
        total: usize,
        filename: String,
    },
    Failed {
        index: usize,
        total: usize,
        filename: String,
        message: String,
    },
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
    #[error("rate limited (429)")]
    RateLimited,
    #[error("model returned an empty reply")]
    EmptyReply,
    #[error("malformed model reply: {0}")]
    MalformedReply(String),
    #[error("text extraction error: {0}")]
    Ingest(#[from] cvsift_ingest::IngestError),
}

/// Configuration for one extraction run, resolved once at startup and passed
/// by reference. Defaults mirror the DeepSeek chat-completion endpoint.
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Ceiling on the number of CV text characters sent per request.
    pub max_text_chars: usize,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: client::DEEPSEEK_API_URL.to_string(),
            model: client::DEFAULT_MODEL.to_string(),
            max_tokens: 1024,
            temperature: 0.3,
            max_text_chars: DEFAULT_MAX_CHARS,
            request_timeout_secs: 60,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("max_text_chars", &self.max_text_chars)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod record_tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_record_has_only_filename() {
        let r = CvRecord::empty("cv.pdf");
        assert_eq!(r.filename, "cv.pdf");
        assert!(r.name.is_none());
        assert!(r.institution.is_none());
    }

    #[test]
    fn from_value_keeps_strings_and_renders_numbers() {
        let v = json!({
            "name": "Jane Doe",
            "email": "jane@example.com",
            "years_experience": 7,
            "github": null,
            "phone": ""
        });
        let r = CvRecord::from_value("cv.pdf", &v);
        assert_eq!(r.name.as_deref(), Some("Jane Doe"));
        assert_eq!(r.years_experience.as_deref(), Some("7"));
        assert!(r.github.is_none());
        assert!(r.phone.is_none());
        assert!(r.location.is_none());
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = Config {
            api_key: "sk-secret".into(),
            ..Config::default()
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("sk-secret"));
    }
}
