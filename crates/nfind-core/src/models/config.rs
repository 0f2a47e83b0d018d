//! Configuration structures for the extraction and search pipeline.

use serde::{Deserialize, Serialize};

/// Main configuration for the nfind pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NfindConfig {
    /// OCR fallback configuration.
    pub ocr: OcrConfig,

    /// Search configuration.
    pub search: SearchConfig,
}

impl Default for NfindConfig {
    fn default() -> Self {
        Self {
            ocr: OcrConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

/// OCR fallback configuration for scanned PDFs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract language model used for recognition.
    pub language: String,

    /// Resolution for rasterizing PDF pages.
    pub dpi: u32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "por".to_string(),
            dpi: 300,
        }
    }
}

/// Search and snippet configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Characters of context kept on each side of a snippet match.
    pub context_chars: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { context_chars: 100 }
    }
}

impl NfindConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}
