//! Directory batch conversion.
//!
//! Walks an input directory for `.png`, `.jpg`/`.jpeg`, `.webp` files and
//! `.txt` files holding a data URL, and converts each to a `.webp` file under
//! the output directory, mirroring the relative layout.
//!
//! ```text
//! input/                     output/
//! ├── logo.png          →    ├── logo.webp
//! ├── icons/                 ├── icons/
//! │   └── star.jpg      →    │   └── star.webp
//! └── avatar.txt        →    └── avatar.webp
//! ```
//!
//! Files are converted in parallel with rayon. Each file is an independent
//! conversion: one failure is recorded in its [`BatchOutcome`] and the rest
//! of the batch continues.

use crate::error::ConvertError;
use crate::imaging::{DataUrl, OutputFormat, ResizeSpec, SourceFormat, transcode};
use crate::pipeline::{ConvertedImage, Pipeline};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Input directory not found: {0}")]
    InputNotFound(PathBuf),
}

/// Why a single file failed.
#[derive(Error, Debug)]
pub enum FileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Convert(#[from] ConvertError),
}

/// How a batch input file encodes its image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Raw container bytes; the format comes from the extension.
    Raw(SourceFormat),
    /// A text file holding a data URL.
    DataUrlText,
}

/// One planned conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    pub source: PathBuf,
    pub output: PathBuf,
    pub kind: InputKind,
}

/// Result of one planned conversion.
#[derive(Debug)]
pub struct BatchOutcome {
    pub job: BatchJob,
    pub result: Result<ConvertedImage, FileError>,
}

fn input_kind(path: &Path) -> Option<InputKind> {
    let ext = path.extension()?.to_str()?;
    if ext.eq_ignore_ascii_case("txt") {
        return Some(InputKind::DataUrlText);
    }
    SourceFormat::from_extension(ext).map(InputKind::Raw)
}

/// Plan conversions for every supported file under `input_dir`.
///
/// Jobs are sorted by path. When two inputs share a stem (`a.png`, `a.jpg`)
/// the later one keeps its extension in the output name (`a.jpg.webp`).
pub fn plan_jobs(input_dir: &Path, output_dir: &Path) -> Result<Vec<BatchJob>, BatchError> {
    if !input_dir.is_dir() {
        return Err(BatchError::InputNotFound(input_dir.to_path_buf()));
    }

    let ext = OutputFormat::WebP.extension();
    let mut taken = HashSet::new();
    let mut jobs = Vec::new();

    for entry in WalkDir::new(input_dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let source = entry.path();
        let Some(kind) = input_kind(source) else {
            continue;
        };
        let relative = source.strip_prefix(input_dir).unwrap_or(source);

        let mut output = output_dir.join(relative).with_extension(ext);
        if !taken.insert(output.clone()) {
            let mut name = relative.as_os_str().to_os_string();
            name.push(".");
            name.push(ext);
            output = output_dir.join(name);
            taken.insert(output.clone());
        }

        jobs.push(BatchJob {
            source: source.to_path_buf(),
            output,
            kind,
        });
    }
    Ok(jobs)
}

fn read_input(job: &BatchJob) -> Result<DataUrl, FileError> {
    Ok(match job.kind {
        InputKind::Raw(format) => transcode::encode(&fs::read(&job.source)?, format.mime_type()),
        InputKind::DataUrlText => DataUrl::new(fs::read_to_string(&job.source)?),
    })
}

fn convert_job(
    pipeline: &Pipeline<'_>,
    job: &BatchJob,
    spec: Option<&ResizeSpec>,
) -> Result<ConvertedImage, FileError> {
    let input = read_input(job)?;
    let converted = pipeline.run(&input, spec)?;
    if let Some(parent) = job.output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&job.output, &converted.bytes)?;
    Ok(converted)
}

/// Convert every job in parallel on the current rayon pool.
///
/// Outcomes are returned in job order.
pub fn run_jobs(
    pipeline: &Pipeline<'_>,
    jobs: Vec<BatchJob>,
    spec: Option<&ResizeSpec>,
) -> Vec<BatchOutcome> {
    jobs.into_par_iter()
        .map(|job| {
            let result = convert_job(pipeline, &job, spec);
            if let Err(err) = &result {
                log::debug!("{}: {err}", job.source.display());
            }
            BatchOutcome { job, result }
        })
        .collect()
}

/// Plan and run a whole directory.
pub fn convert_dir(
    pipeline: &Pipeline<'_>,
    input_dir: &Path,
    output_dir: &Path,
    spec: Option<&ResizeSpec>,
) -> Result<Vec<BatchOutcome>, BatchError> {
    let jobs = plan_jobs(input_dir, output_dir)?;
    log::info!("converting {} files from {}", jobs.len(), input_dir.display());
    Ok(run_jobs(pipeline, jobs, spec))
}
