//! Resume text extraction for uploads.
//!
//! PDFs go through `pdf-extract` on a blocking thread; anything else must be
//! UTF-8 text. The result is normalized and capped before it is sent upstream.

use bytes::Bytes;

use crate::errors::AppError;

/// Upper bound on characters forwarded to the analysis function.
pub const MAX_RESUME_CHARS: usize = 30_000;

pub async fn extract_resume_text(
    file_name: &str,
    content_type: Option<&str>,
    bytes: Bytes,
) -> Result<String, AppError> {
    let raw = if is_pdf(file_name, content_type, &bytes) {
        tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&bytes).map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| AppError::Internal(e.into()))?
        .map_err(|e| AppError::UnprocessableEntity(format!("Could not read PDF: {e}")))?
    } else {
        String::from_utf8(bytes.to_vec()).map_err(|_| {
            AppError::UnprocessableEntity("Resume must be a PDF or a UTF-8 text file".to_string())
        })?
    };

    let text = truncate_chars(normalize(&raw), MAX_RESUME_CHARS);
    if text.is_empty() {
        return Err(AppError::Validation(
            "No text could be extracted from the resume".to_string(),
        ));
    }
    Ok(text)
}

fn is_pdf(file_name: &str, content_type: Option<&str>, bytes: &[u8]) -> bool {
    content_type == Some("application/pdf")
        || file_name.to_ascii_lowercase().ends_with(".pdf")
        || bytes.starts_with(b"%PDF-")
}

/// Trims trailing whitespace per line and collapses runs of blank lines.
fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut blank_run = false;
    for line in raw.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run = true;
            continue;
        }
        if !out.is_empty() {
            out.push_str(if blank_run { "\n\n" } else { "\n" });
        }
        out.push_str(line);
        blank_run = false;
    }
    out
}

fn truncate_chars(mut text: String, max: usize) -> String {
    if let Some((idx, _)) = text.char_indices().nth(max) {
        text.truncate(idx);
    }
    text
}
