//! Page capture records and screenshot verification.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ForgeError, ForgeResult};

/// What the browser collaborator reports after loading a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureRecord {
    pub screenshot_path: String,
    #[serde(default)]
    pub page_title: String,
    pub url: String,
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl CaptureRecord {
    pub fn from_json_str(json: &str) -> ForgeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Facts about a screenshot file on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenshotInfo {
    pub path: String,
    pub bytes: u64,
    /// `(width, height)` when the file is a decodable image.
    pub dimensions: Option<(u32, u32)>,
}

/// Check that a screenshot exists and read its size and dimensions.
pub fn verify_screenshot(path: &str) -> ForgeResult<ScreenshotInfo> {
    let file = Path::new(path);
    if !file.is_file() {
        return Err(ForgeError::ScreenshotNotFound(path.to_string()));
    }

    let bytes = std::fs::metadata(file)?.len();
    let dimensions = if is_supported_format(path) {
        match image::image_dimensions(file) {
            Ok(dims) => Some(dims),
            Err(e) => {
                tracing::warn!("Could not read dimensions of {path}: {e}");
                None
            }
        }
    } else {
        None
    };

    tracing::info!("Screenshot file verified: {bytes} bytes");
    Ok(ScreenshotInfo {
        path: path.to_string(),
        bytes,
        dimensions,
    })
}

/// File name for a page screenshot: `{host}_{path}_{YYYYmmdd_HHMMSS}.png`.
pub fn screenshot_file_name<Tz>(page_url: &str, taken_at: &chrono::DateTime<Tz>) -> ForgeResult<String>
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let parsed = url::Url::parse(page_url)?;
    let mut host = parsed.host_str().unwrap_or("").replace('.', "_");
    if let Some(port) = parsed.port() {
        host.push_str(&format!(":{port}"));
    }

    let path = parsed.path().trim_matches('/').replace('/', "_");
    let path = if path.is_empty() { "homepage".to_string() } else { path };

    Ok(format!("{host}_{path}_{}.png", taken_at.format("%Y%m%d_%H%M%S")))
}

/// Check if a file path points to a supported image format.
pub fn is_supported_format(path: &str) -> bool {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "webp" | "gif" | "bmp")
}
