//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! The header line of each block names the result (dimensions, filter,
//! output path). Supporting detail follows as indented `Key: value`
//! context lines so the output stays readable when several files are
//! processed in a row.
//!
//! # Output Format
//!
//! ## Resize
//!
//! ```text
//! photo.jpg 4000x3000 → 1000x750
//!     Output: resized_photo.jpg (jpeg, 182.4 KiB)
//!     Filter: lanczos3
//!     Orientation: normal
//!     Presubsample: 1/4
//!     Metadata: copied
//!     Elapsed: 412 ms
//! ```
//!
//! ## Info
//!
//! ```text
//! photo.jpg 3000x4000 (stored 4000x3000, rotate-90)
//!     Make: Canon
//!     Exif.ExposureTime: 1/250
//! ```
//!
//! `info --json` emits the same facts as a JSON document.
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::imaging::exif::Ifd;
use crate::imaging::{Orientation, ResizeError, ResizeFilter, ResizeReport, SourceInfo};
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn dims((w, h): (u32, u32)) -> String {
    format!("{w}x{h}")
}

/// Human-readable byte count.
fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KiB", "MiB", "GiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

// ============================================================================
// Resize
// ============================================================================

/// Format the outcome of a single file resize.
pub fn format_resize_report(report: &ResizeReport) -> Vec<String> {
    let plan = &report.plan;
    let mut lines = vec![format!(
        "{} {} \u{2192} {}",
        file_label(&report.source),
        dims(plan.oriented),
        dims(plan.target)
    )];
    let ctx = indent(1);

    lines.push(format!(
        "{ctx}Output: {} ({}, {})",
        report.output.display(),
        report.format.name(),
        format_bytes(report.bytes_written)
    ));
    if report.identity {
        lines.push(format!("{ctx}Unchanged: source copied"));
    } else {
        lines.push(format!("{ctx}Filter: {}", report.filter));
        lines.push(format!("{ctx}Orientation: {}", plan.orientation));
        if plan.subsample > 1 {
            lines.push(format!("{ctx}Presubsample: 1/{}", plan.subsample));
        }
        let metadata = if report.metadata_copied {
            "copied"
        } else {
            "not copied"
        };
        lines.push(format!("{ctx}Metadata: {metadata}"));
    }
    lines.push(format!("{ctx}Elapsed: {} ms", report.elapsed.as_millis()));
    lines
}

/// Print a resize report to stdout.
pub fn print_resize_report(report: &ResizeReport) {
    for line in format_resize_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Info
// ============================================================================

fn ifd_prefix(ifd: Ifd) -> &'static str {
    match ifd {
        Ifd::Primary => "",
        Ifd::Exif => "Exif.",
        Ifd::Gps => "GPS.",
    }
}

/// Format what is known about a source without decoding it.
pub fn format_info(info: &SourceInfo) -> Vec<String> {
    let header = if info.orientation != Orientation::Normal {
        format!(
            "{} {} (stored {}, {})",
            file_label(&info.path),
            dims(info.oriented),
            dims(info.stored),
            info.orientation
        )
    } else {
        format!(
            "{} {} ({})",
            file_label(&info.path),
            dims(info.oriented),
            info.orientation
        )
    };
    let mut lines = vec![header];
    if info.metadata.is_empty() {
        lines.push(format!("{}No EXIF metadata", indent(1)));
    }
    for field in &info.metadata {
        lines.push(format!(
            "{}{}{}: {}",
            indent(1),
            ifd_prefix(field.ifd),
            field.name,
            field.value
        ));
    }
    lines
}

/// Print source info to stdout.
pub fn print_info(info: &SourceInfo) {
    for line in format_info(info) {
        println!("{}", line);
    }
}

/// Source info as a pretty-printed JSON document, for scripts.
pub fn format_info_json(info: &SourceInfo) -> Result<String, serde_json::Error> {
    let metadata: serde_json::Map<String, serde_json::Value> = info
        .metadata
        .iter()
        .map(|f| {
            (
                format!("{}{}", ifd_prefix(f.ifd), f.name),
                serde_json::Value::String(f.value.clone()),
            )
        })
        .collect();
    serde_json::to_string_pretty(&serde_json::json!({
        "path": info.path.display().to_string(),
        "stored": { "width": info.stored.0, "height": info.stored.1 },
        "orientation": info.orientation.to_string(),
        "oriented": { "width": info.oriented.0, "height": info.oriented.1 },
        "metadata": metadata,
    }))
}

// ============================================================================
// Filters
// ============================================================================

/// One line per filter: code, name, description. Marks the default.
pub fn format_filters() -> Vec<String> {
    let width = ResizeFilter::ALL
        .iter()
        .map(|f| f.name().len())
        .max()
        .unwrap_or(0);
    ResizeFilter::ALL
        .iter()
        .map(|&f| {
            let marker = if f == ResizeFilter::default() {
                " (default)"
            } else {
                ""
            };
            format!(
                "{} {:<width$}  {}{}",
                f.code(),
                f.name(),
                f.description(),
                marker
            )
        })
        .collect()
}

/// Print the filter list to stdout.
pub fn print_filters() {
    for line in format_filters() {
        println!("{}", line);
    }
}

// ============================================================================
// Errors
// ============================================================================

/// One-line failure message naming the stage that failed.
pub fn format_error(source: &Path, err: &ResizeError) -> String {
    format!("{} failed ({}): {}", file_label(source), err.stage(), err)
}
