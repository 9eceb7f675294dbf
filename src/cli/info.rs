use crate::cli::read_text;
use crate::decoder::Decoder;
use crate::direction::{self, Direction, DirectionCounts};
use crate::error::Result;
use crate::html;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Bytes of payload shown in the hex preview
const PREVIEW_BYTES: usize = 32;

/// What `info` knows about a text file
#[derive(Debug, Clone, Serialize)]
pub struct InfoReport {
    pub file: String,
    pub size_bytes: usize,
    pub chars: usize,
    pub html: bool,
    pub tags: usize,
    pub unclosed_tags: Vec<String>,
    pub direction: Direction,
    pub counts: DirectionCounts,
    pub frame: Option<FrameReport>,
    /// Why no frame was read, when there is none
    pub frame_error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FrameReport {
    pub start: usize,
    pub end: usize,
    pub payload_bytes: usize,
    pub payload_preview: String,
    pub payload_sha256: String,
    pub correction_marks: usize,
    /// Direction of the text with the frame and its correction removed
    pub carrier_direction: Direction,
}

/// Gather an [`InfoReport`] for a file
pub fn inspect_file(path: &Path) -> Result<InfoReport> {
    let text = read_text(path)?;
    let mut report = inspect(&text);
    report.file = path.display().to_string();
    Ok(report)
}

/// Gather an [`InfoReport`] for in-memory text
pub fn inspect(text: &str) -> InfoReport {
    let is_html = html::is_html(text);
    let (tags, unclosed_tags) = if is_html {
        let doc = html::split(text);
        (doc.tags().count(), doc.unclosed)
    } else {
        (0, Vec::new())
    };

    let (frame, frame_error) = match Decoder::new().try_decode(text) {
        Ok(decoded) => {
            let trailing_end = text[decoded.span.end..]
                .char_indices()
                .nth(decoded.trailing_marks)
                .map_or(text.len(), |(i, _)| decoded.span.end + i);
            let carrier = format!("{}{}", &text[..decoded.span.start], &text[trailing_end..]);
            let preview = &decoded.payload[..decoded.payload.len().min(PREVIEW_BYTES)];
            let frame = FrameReport {
                start: decoded.span.start,
                end: decoded.span.end,
                payload_bytes: decoded.payload.len(),
                payload_preview: hex::encode(preview),
                payload_sha256: hex::encode(Sha256::digest(&decoded.payload)),
                correction_marks: decoded.trailing_marks,
                carrier_direction: direction::classify(&carrier),
            };
            (Some(frame), None)
        }
        Err(e) => (None, Some(e.to_string())),
    };

    let counts = direction::count(text);
    InfoReport {
        file: String::new(),
        size_bytes: text.len(),
        chars: text.chars().count(),
        html: is_html,
        tags,
        unclosed_tags,
        direction: counts.verdict(),
        counts,
        frame,
        frame_error,
    }
}

/// Display information about a text file
pub fn show_info(path: &Path, json: bool) -> Result<String> {
    let report = inspect_file(path)?;
    if json {
        let mut out = serde_json::to_string_pretty(&report)?;
        out.push('\n');
        return Ok(out);
    }
    Ok(render(&report))
}

fn render(report: &InfoReport) -> String {
    let mut output = String::new();

    output.push_str("Bidimark Text Information\n");
    output.push_str("=========================\n\n");

    output.push_str(&format!("File: {}\n", report.file));
    output.push_str(&format!("Size: {}\n", format_size(report.size_bytes as u64)));
    output.push_str(&format!("Characters: {}\n", report.chars));
    output.push_str(&format!("HTML: {}\n", if report.html { "yes" } else { "no" }));
    if report.html {
        output.push_str(&format!("  Tags: {}\n", report.tags));
        if !report.unclosed_tags.is_empty() {
            output.push_str(&format!("  Unclosed: {}\n", report.unclosed_tags.join(", ")));
        }
    }
    output.push('\n');

    let counts = &report.counts;
    output.push_str("Direction:\n");
    output.push_str(&format!("  Verdict: {}\n", report.direction));
    output.push_str(&format!("  LTR: {} chars + {} marks\n", counts.ltr_chars, counts.ltr_marks));
    output.push_str(&format!("  RTL: {} chars + {} marks\n", counts.rtl_chars, counts.rtl_marks));
    output.push_str(&format!("  Neutral: {} chars\n", counts.neutral_chars));
    output.push('\n');

    output.push_str("Frame:\n");
    match (&report.frame, &report.frame_error) {
        (Some(frame), _) => {
            output.push_str(&format!("  Bytes: {}..{}\n", frame.start, frame.end));
            output.push_str(&format!("  Payload: {}\n", format_size(frame.payload_bytes as u64)));
            if frame.payload_bytes > 0 {
                let ellipsis = if frame.payload_bytes > PREVIEW_BYTES { "..." } else { "" };
                output.push_str(&format!("  Preview: {}{}\n", frame.payload_preview, ellipsis));
                output.push_str(&format!("  SHA-256: {}\n", frame.payload_sha256));
            }
            output.push_str(&format!("  Correction marks: {}\n", frame.correction_marks));
            output.push_str(&format!("  Carrier direction: {}\n", frame.carrier_direction));
        }
        (None, Some(reason)) => output.push_str(&format!("  None ({})\n", reason)),
        (None, None) => output.push_str("  None\n"),
    }

    output
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
