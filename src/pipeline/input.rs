//! Input resolution: read the drawing payload from a file or stdin and
//! decode it into a [`DrawingInput`].
//!
//! The payload usually comes straight from a vision model, which sometimes
//! wraps the JSON in a ```` ```json ```` fence despite being told not to.
//! The fence is stripped before decoding.

use crate::error::ReportError;
use crate::model::DrawingInput;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;

/// `-` means "read standard input".
pub fn is_stdin(input: &str) -> bool {
    input == "-"
}

/// Read the raw payload text from a path or from stdin.
pub fn read_input(input: &str) -> Result<String, ReportError> {
    if is_stdin(input) {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| ReportError::MalformedInput {
                detail: format!("could not read standard input: {e}"),
            })?;
        debug!("Read {} bytes from stdin", buf.len());
        return Ok(buf);
    }

    let path = PathBuf::from(input);
    match std::fs::read_to_string(&path) {
        Ok(text) => {
            debug!("Read drawing data: {}", path.display());
            Ok(text)
        }
        Err(e) => Err(map_read_error(e, path)),
    }
}

/// Async variant of [`read_input`] for local files.
pub async fn read_input_async(input: &str) -> Result<String, ReportError> {
    if is_stdin(input) {
        let owned = input.to_string();
        return tokio::task::spawn_blocking(move || read_input(&owned))
            .await
            .map_err(|e| ReportError::Internal(format!("stdin reader failed: {e}")))?;
    }
    let path = PathBuf::from(input);
    match tokio::fs::read_to_string(&path).await {
        Ok(text) => {
            debug!("Read drawing data: {}", path.display());
            Ok(text)
        }
        Err(e) => Err(map_read_error(e, path)),
    }
}

fn map_read_error(e: std::io::Error, path: PathBuf) -> ReportError {
    match e.kind() {
        std::io::ErrorKind::NotFound => ReportError::FileNotFound { path },
        std::io::ErrorKind::PermissionDenied => ReportError::PermissionDenied { path },
        _ => ReportError::MalformedInput {
            detail: format!("could not read '{}': {e}", path.display()),
        },
    }
}

static RE_JSON_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:json|JSON)?\s*\n(.*?)\n?```\s*$").unwrap());

/// Decode the drawing payload. Missing `drawingNumber` or `dimensions`,
/// wrong types and invalid JSON all map to [`ReportError::MalformedInput`].
pub fn parse_drawing_json(text: &str) -> Result<DrawingInput, ReportError> {
    let trimmed = text.trim();
    let json = match RE_JSON_FENCE.captures(trimmed) {
        Some(caps) => caps.get(1).map_or("", |m| m.as_str()),
        None => trimmed,
    };
    serde_json::from_str(json).map_err(|e| ReportError::MalformedInput { detail: e.to_string() })
}
