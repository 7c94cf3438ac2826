use image::{DynamicImage, ImageFormat};
use std::io::{Cursor, Write};
use std::process::{Command, Stdio};

use super::ExtractionError;

/// Recognizes text in a normalized (RGB, PNG-encoded) image.
pub trait OcrEngine: Send + Sync {
    /// Return the raw recognized text; callers trim it.
    fn recognize(&self, png: &[u8]) -> Result<String, ExtractionError>;
}

/// Decode arbitrary image bytes and re-encode them as an 8-bit RGB PNG.
pub fn normalize_image(bytes: &[u8]) -> Result<Vec<u8>, ExtractionError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|error| ExtractionError::UndecodableImage(error.to_string()))?;
    let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());

    let mut encoded = Cursor::new(Vec::new());
    rgb.write_to(&mut encoded, ImageFormat::Png)
        .map_err(|error| ExtractionError::UndecodableImage(error.to_string()))?;
    Ok(encoded.into_inner())
}

/// OCR engine that pipes the image through the `tesseract` executable.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    command: String,
    language: String,
}

impl TesseractEngine {
    /// Configure the executable path (or name on `PATH`) and language pack.
    pub fn new(command: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            language: language.into(),
        }
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, png: &[u8]) -> Result<String, ExtractionError> {
        let mut child = Command::new(&self.command)
            .args(["stdin", "stdout", "-l", &self.language])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|error| {
                ExtractionError::Ocr(format!("failed to launch {}: {error}", self.command))
            })?;

        // A process that exits before reading all input breaks the pipe; it must still be reaped
        // and its stderr carries the real cause.
        let write_result = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(png),
            None => Ok(()),
        };

        let output = child.wait_with_output().map_err(|error| {
            ExtractionError::Ocr(format!("failed to read {} output: {error}", self.command))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::Ocr(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }
        write_result.map_err(|error| {
            ExtractionError::Ocr(format!("failed to stream image to {}: {error}", self.command))
        })?;

        tracing::debug!(
            engine = %self.command,
            bytes = output.stdout.len(),
            "OCR completed"
        );
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
