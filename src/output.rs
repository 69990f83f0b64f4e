//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Convert
//!
//! ```text
//! logo.png
//!     PNG → WebP
//!     64x64, 1830 bytes
//!     Output: logo.webp
//! ```
//!
//! ## Batch
//!
//! ```text
//! 001 icons/star.jpg → icons/star.webp
//!     JPEG 32x32, 912 bytes
//! 002 broken.png
//!     Error: failed to decode PNG input: ...
//!
//! Converted 1 file, 1 failed
//! ```
//!
//! ## Sniff
//!
//! ```text
//! Declared: image/png → PNG
//! Content: PNG
//! ```
//!
//! A payload that does not decode shows the error instead:
//!
//! ```text
//! Declared: image/png → PNG
//! Content: failed to decode base64 payload: ...
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::batch::BatchOutcome;
use crate::error::ConvertError;
use crate::imaging::SourceFormat;
use crate::pipeline::ConvertedImage;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

fn relative<'a>(path: &'a Path, root: &Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}

/// Size and dimensions detail line.
fn image_detail(image: &ConvertedImage) -> String {
    format!(
        "{}x{}, {} bytes",
        image.width,
        image.height,
        image.bytes.len()
    )
}

// ============================================================================
// Convert
// ============================================================================

/// Format a single conversion.
///
/// `output` is `None` when the data URL went to stdout.
pub fn format_conversion(source: &str, image: &ConvertedImage, output: Option<&Path>) -> Vec<String> {
    let mut lines = vec![
        source.to_string(),
        format!("{}{} → {}", indent(1), image.source_format, image.format),
        format!("{}{}", indent(1), image_detail(image)),
    ];
    if let Some(path) = output {
        lines.push(format!("{}Output: {}", indent(1), path.display()));
    }
    lines
}

pub fn print_conversion(source: &str, image: &ConvertedImage, output: Option<&Path>) {
    for line in format_conversion(source, image, output) {
        eprintln!("{}", line);
    }
}

// ============================================================================
// Batch
// ============================================================================

/// Format batch outcomes with paths shown relative to the input and output roots.
pub fn format_batch_outcomes(
    outcomes: &[BatchOutcome],
    input_root: &Path,
    output_root: &Path,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut failed = 0;

    for (i, outcome) in outcomes.iter().enumerate() {
        let source = relative(&outcome.job.source, input_root).display();
        match &outcome.result {
            Ok(image) => {
                let output = relative(&outcome.job.output, output_root).display();
                lines.push(format!("{} {} → {}", format_index(i + 1), source, output));
                lines.push(format!(
                    "{}{} {}",
                    indent(1),
                    image.source_format,
                    image_detail(image)
                ));
            }
            Err(err) => {
                failed += 1;
                lines.push(format!("{} {}", format_index(i + 1), source));
                lines.push(format!("{}Error: {}", indent(1), err));
            }
        }
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    let converted = outcomes.len() - failed;
    if failed == 0 {
        lines.push(format!("Converted {}", plural(converted, "file")));
    } else {
        lines.push(format!(
            "Converted {}, {} failed",
            plural(converted, "file"),
            failed
        ));
    }
    lines
}

pub fn print_batch_outcomes(outcomes: &[BatchOutcome], input_root: &Path, output_root: &Path) {
    for line in format_batch_outcomes(outcomes, input_root, output_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Sniff
// ============================================================================

/// Format what the declared header and the payload signature each say.
///
/// `content` is the signature match on the decoded payload, or the error
/// that kept the payload from decoding.
pub fn format_sniff(
    media_type: Option<&str>,
    declared: &Result<SourceFormat, ConvertError>,
    content: &Result<Option<SourceFormat>, ConvertError>,
) -> Vec<String> {
    let media_type = media_type.unwrap_or("(none)");
    let declared = match declared {
        Ok(format) => format!("Declared: {} → {}", media_type, format),
        Err(_) => format!("Declared: {} → unsupported", media_type),
    };
    let content = match content {
        Ok(Some(format)) => format!("Content: {}", format),
        Ok(None) => "Content: unrecognized".to_string(),
        Err(err) => format!("Content: {}", err),
    };
    vec![declared, content]
}

pub fn print_sniff(
    media_type: Option<&str>,
    declared: &Result<SourceFormat, ConvertError>,
    content: &Result<Option<SourceFormat>, ConvertError>,
) {
    for line in format_sniff(media_type, declared, content) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{BatchJob, FileError, InputKind};
    use crate::imaging::{DataUrl, OutputFormat, sniff, transcode};
    use std::path::PathBuf;

    fn converted(source_format: SourceFormat, width: u32, height: u32) -> ConvertedImage {
        ConvertedImage {
            source_format,
            format: OutputFormat::WebP,
            width,
            height,
            bytes: vec![0; 120],
        }
    }

    fn outcome(source: &str, result: Result<ConvertedImage, FileError>) -> BatchOutcome {
        let source = PathBuf::from("/in").join(source);
        BatchOutcome {
            job: BatchJob {
                output: PathBuf::from("/out")
                    .join(source.strip_prefix("/in").unwrap())
                    .with_extension("webp"),
                source,
                kind: InputKind::Raw(SourceFormat::Png),
            },
            result,
        }
    }

    #[test]
    fn format_index_pads_to_three_digits() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn conversion_with_output_path() {
        let lines = format_conversion(
            "logo.png",
            &converted(SourceFormat::Png, 64, 32),
            Some(Path::new("logo.webp")),
        );
        assert_eq!(
            lines,
            vec![
                "logo.png",
                "    PNG → WebP",
                "    64x32, 120 bytes",
                "    Output: logo.webp",
            ]
        );
    }

    #[test]
    fn conversion_to_stdout_has_no_output_line() {
        let lines = format_conversion("<stdin>", &converted(SourceFormat::Jpeg, 1, 1), None);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "    JPEG → WebP");
    }

    #[test]
    fn batch_lists_successes_and_failures() {
        let outcomes = vec![
            outcome("icons/star.jpg", Ok(converted(SourceFormat::Jpeg, 32, 32))),
            outcome(
                "broken.png",
                Err(FileError::Convert(ConvertError::Encode("boom".into()))),
            ),
        ];
        let lines = format_batch_outcomes(&outcomes, Path::new("/in"), Path::new("/out"));
        assert_eq!(lines[0], "001 icons/star.jpg → icons/star.webp");
        assert_eq!(lines[1], "    JPEG 32x32, 120 bytes");
        assert_eq!(lines[2], "002 broken.png");
        assert!(lines[3].starts_with("    Error: "));
        assert!(lines[3].contains("boom"));
        assert_eq!(lines.last().unwrap(), "Converted 1 file, 1 failed");
    }

    #[test]
    fn empty_batch_summary() {
        let lines = format_batch_outcomes(&[], Path::new("/in"), Path::new("/out"));
        assert_eq!(lines, vec!["Converted 0 files"]);
    }

    #[test]
    fn sniff_reports_both_views() {
        let lines = format_sniff(
            Some("image/jpeg"),
            &Ok(SourceFormat::Jpeg),
            &Ok(Some(SourceFormat::Png)),
        );
        assert_eq!(lines, vec!["Declared: image/jpeg → JPEG", "Content: PNG"]);

        let unsupported = Err(ConvertError::UnsupportedFormat {
            declared: "image/gif".into(),
        });
        let lines = format_sniff(Some("image/gif"), &unsupported, &Ok(None));
        assert_eq!(
            lines,
            vec!["Declared: image/gif → unsupported", "Content: unrecognized"]
        );
    }

    #[test]
    fn sniff_shows_payload_decode_error() {
        let text = DataUrl::from("data:image/png;base64,@@@@");
        let content = transcode::decode(&text).map(|bytes| sniff::detect(&bytes));
        let lines = format_sniff(text.media_type(), &sniff::classify(&text), &content);
        assert_eq!(lines[0], "Declared: image/png → PNG");
        assert!(
            lines[1].starts_with("Content: failed to decode base64 payload: "),
            "{}",
            lines[1]
        );
    }
}
