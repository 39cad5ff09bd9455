use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Single,
    Multiline,
}

impl LineStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineStyle::Single => "single",
            LineStyle::Multiline => "multiline",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Docker binary used for inspection and printed at the start of each command.
    pub docker: String,
    pub style: LineStyle,
    pub long_flags: bool,
    pub format: OutputFormat,
    /// Drop values the container inherited from its image.
    pub image_defaults: bool,
    pub keep_name: bool,
    /// Environment variable names never emitted.
    pub exclude_env: Vec<String>,
    /// Label key prefixes never emitted, e.g. `com.docker.compose.`.
    pub exclude_label_prefixes: Vec<String>,
    /// Log driver assumed to be the daemon default.
    pub default_log_driver: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            docker: "docker".to_string(),
            style: LineStyle::Single,
            long_flags: false,
            format: OutputFormat::Text,
            image_defaults: true,
            keep_name: true,
            exclude_env: Vec::new(),
            exclude_label_prefixes: Vec::new(),
            default_log_driver: "json-file".to_string(),
        }
    }
}
