//! OCR fallback driving pdftoppm and tesseract as subprocesses.

use std::path::Path;
use std::process::Command;

use tracing::{debug, warn};

use super::Result;
use crate::error::PdfError;
use crate::models::config::OcrConfig;

/// Check whether the OCR tools (pdftoppm and tesseract) are available.
pub fn is_ocr_available() -> bool {
    let pdftoppm = Command::new("pdftoppm").arg("-v").output().is_ok();
    let tesseract = Command::new("tesseract").arg("--version").output().is_ok();

    if !pdftoppm {
        debug!("pdftoppm not found - install poppler-utils for OCR support");
    }
    if !tesseract {
        debug!("tesseract not found - install tesseract-ocr for OCR support");
    }

    pdftoppm && tesseract
}

/// Rasterize every page of the PDF and recognize the page images in order.
///
/// All transient files live in one temporary directory that is removed
/// when this function returns, on every exit path.
pub fn ocr_pdf_bytes(data: &[u8], config: &OcrConfig) -> Result<String> {
    if !is_ocr_available() {
        return Err(PdfError::OcrUnavailable(
            "pdftoppm (poppler-utils) and tesseract-ocr must be installed".to_string(),
        ));
    }

    let temp_dir = tempfile::tempdir()?;
    let pdf_path = temp_dir.path().join("input.pdf");
    std::fs::write(&pdf_path, data)?;

    let output_prefix = temp_dir.path().join("page");
    let rasterized = Command::new("pdftoppm")
        .arg("-png")
        .arg("-r")
        .arg(config.dpi.to_string())
        .arg(&pdf_path)
        .arg(&output_prefix)
        .output()
        .map_err(|e| PdfError::Ocr(format!("failed to run pdftoppm: {}", e)))?;

    if !rasterized.status.success() {
        let stderr = String::from_utf8_lossy(&rasterized.stderr);
        return Err(PdfError::Ocr(format!("pdftoppm failed: {}", stderr)));
    }

    // pdftoppm numbers the pages, so a lexicographic sort restores page order.
    let mut page_images: Vec<_> = std::fs::read_dir(temp_dir.path())?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map(|ext| ext == "png").unwrap_or(false))
        .collect();
    page_images.sort();

    if page_images.is_empty() {
        return Err(PdfError::Ocr("pdftoppm produced no page images".to_string()));
    }

    debug!(
        "rasterized {} pages, running tesseract (lang={})",
        page_images.len(),
        config.language
    );

    let mut text = String::new();
    for (i, image_path) in page_images.iter().enumerate() {
        text.push_str(&recognize_page(image_path, &config.language, i + 1)?);
    }

    Ok(text)
}

fn recognize_page(image_path: &Path, language: &str, page: usize) -> Result<String> {
    let output = Command::new("tesseract")
        .arg(image_path)
        .arg("stdout")
        .arg("-l")
        .arg(language)
        .arg("--psm")
        .arg("1")
        .output()
        .map_err(|e| PdfError::Ocr(format!("failed to run tesseract on page {}: {}", page, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!("tesseract warning on page {}: {}", page, stderr);
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
