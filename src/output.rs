//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Apply
//!
//! ```text
//! Exporting 2 images
//! 001 beach.jpg → out/beach.png (1200x800, 1.4 MB)
//! 002 dunes.jpg
//!     Failed: Failed to decode dunes.jpg: ...
//! Exported 1 image, 1 failed
//! ```
//!
//! ## Presets
//!
//! ```text
//! none      Original
//! noir      Noir
//!     brightness=-10 color_mode=grayscale contrast=50 vignette=50
//! ```
//!
//! ## Estimate
//!
//! ```text
//! beach.jpg (1200x800)
//!     PNG: 1.37 MB
//!     JPEG (92%): 212.4 KB
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::batch::{BatchEvent, BatchSummary};
use crate::imaging::{EncodeError, ExportFormat, Quality, format_bytes};
use crate::presets::Preset;
use crate::settings::SettingsPatch;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// apply
// ============================================================================

/// Format a single batch progress event as display lines.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Started { total } => vec![format!("Exporting {}", plural(*total, "image"))],
        BatchEvent::Exported {
            index,
            source,
            output,
            width,
            height,
            bytes,
        } => vec![format!(
            "{} {} → {} ({}x{}, {})",
            format_index(*index),
            file_label(source),
            output.display(),
            width,
            height,
            format_bytes(*bytes as u64)
        )],
        BatchEvent::Failed {
            index,
            source,
            error,
        } => vec![
            format!("{} {}", format_index(*index), file_label(source)),
            format!("{}Failed: {}", indent(1), error),
        ],
    }
}

pub fn format_batch_summary(summary: &BatchSummary) -> Vec<String> {
    let exported = plural(summary.written.len(), "image");
    if summary.failed == 0 {
        vec![format!("Exported {exported}")]
    } else {
        vec![format!("Exported {exported}, {} failed", summary.failed)]
    }
}

pub fn print_batch_summary(summary: &BatchSummary) {
    for line in format_batch_summary(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// presets
// ============================================================================

/// `key=value` pairs for every field a patch sets, sorted by key.
fn patch_summary(patch: &SettingsPatch) -> String {
    let Ok(serde_json::Value::Object(fields)) = serde_json::to_value(patch) else {
        return String::new();
    };
    let mut pairs: Vec<String> = fields
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| match v {
            serde_json::Value::String(s) => format!("{k}={s}"),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) => format!("{k}={f}"),
                None => format!("{k}={n}"),
            },
            other => format!("{k}={other}"),
        })
        .collect();
    pairs.sort();
    pairs.join(" ")
}

/// Preset table: key and label, then the fields each preset sets.
pub fn format_presets(presets: &[Preset]) -> Vec<String> {
    let width = presets.iter().map(|p| p.key.len()).max().unwrap_or(0);
    let mut lines = Vec::new();
    for preset in presets {
        lines.push(format!("{:<width$}  {}", preset.key, preset.label));
        let fields = patch_summary(&preset.patch);
        if !fields.is_empty() {
            lines.push(format!("{}{}", indent(1), fields));
        }
    }
    lines
}

/// Preset table as JSON: `[{ "key", "label", "settings": { only set fields } }]`.
pub fn format_presets_json(presets: &[Preset]) -> Result<String, serde_json::Error> {
    let mut entries = Vec::with_capacity(presets.len());
    for preset in presets {
        let mut settings = serde_json::to_value(&preset.patch)?;
        if let serde_json::Value::Object(map) = &mut settings {
            map.retain(|_, v| !v.is_null());
        }
        entries.push(serde_json::json!({
            "key": preset.key,
            "label": preset.label,
            "settings": settings,
        }));
    }
    serde_json::to_string_pretty(&entries)
}

pub fn print_presets(presets: &[Preset]) {
    for line in format_presets(presets) {
        println!("{}", line);
    }
}

// ============================================================================
// estimate
// ============================================================================

/// Estimated size per format for one source image.
pub fn format_estimates(
    source: &Path,
    dimensions: (u32, u32),
    quality: Quality,
    estimates: &[(ExportFormat, Result<usize, EncodeError>)],
) -> Vec<String> {
    let mut lines = vec![format!(
        "{} ({}x{})",
        file_label(source),
        dimensions.0,
        dimensions.1
    )];
    for (format, estimate) in estimates {
        let label = if format.is_lossy() {
            format!("{} ({}%)", format.label(), quality.percent())
        } else {
            format.label().to_string()
        };
        let value = match estimate {
            Ok(bytes) => format_bytes(*bytes as u64),
            Err(e) => format!("failed: {e}"),
        };
        lines.push(format!("{}{}: {}", indent(1), label, value));
    }
    lines
}

pub fn print_estimates(
    source: &Path,
    dimensions: (u32, u32),
    quality: Quality,
    estimates: &[(ExportFormat, Result<usize, EncodeError>)],
) {
    for line in format_estimates(source, dimensions, quality, estimates) {
        println!("{}", line);
    }
}
