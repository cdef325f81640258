//! Output configuration from TOML (`[output]` section)

use serde::{Deserialize, Serialize};

/// How outlines, chapters and book results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOutputFormat {
    /// Human-readable text (default)
    #[default]
    Text,
    /// JSON document
    Json,
}

/// `[output]` section. An unset `format` leaves the choice to `--output`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    pub format: Option<FileOutputFormat>,
    /// Colored text output; JSON is never colored.
    pub color: bool,
}

impl FileOutputConfig {
    pub fn format_or_default(&self) -> FileOutputFormat {
        self.format.unwrap_or_default()
    }
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
        }
    }
}
