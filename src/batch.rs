//! Batch export for the command line.
//!
//! Decodes each input with the `image` crate, runs [`export`](crate::export::export)
//! on it, and writes the result to the output directory:
//!
//! ```text
//! shots/beach.jpg  ──decode──▶ Bitmap ──render + encode──▶ out/beach.png
//! shots/dunes.png  ──decode──▶ Bitmap ──render + encode──▶ out/dunes.png
//! ```
//!
//! ## Parallel Processing
//!
//! Files are processed in parallel using [rayon](https://docs.rs/rayon); one
//! file's pipeline still runs on a single thread. Progress is reported as
//! [`BatchEvent`]s over an optional channel so the CLI can print while work
//! continues. A failing file is reported and skipped; the rest of the batch
//! still runs.
//!
//! ## Output Names
//!
//! Outputs are named after the input stem. Inputs sharing a stem
//! (`a/beach.jpg`, `b/beach.png`) would land on the same file, so names are
//! assigned up front in input order and later duplicates get a numeric
//! suffix: `beach.png`, `beach-2.png`.

use crate::bitmap::Bitmap;
use crate::export::{ExportParams, download_name, export};
use crate::imaging::{EncodeError, ExportFormat};
use crate::settings::Settings;
use log::{info, warn};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("Encoding failed: {0}")]
    Encode(#[from] EncodeError),
    #[error("Refusing to overwrite source image: {0}")]
    WouldOverwrite(PathBuf),
}

/// Everything a batch needs besides the input list.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub settings: Settings,
    /// Export options. `filename` is replaced per input.
    pub params: ExportParams,
    pub out_dir: PathBuf,
}

/// Progress reported while a batch runs.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    Started {
        total: usize,
    },
    Exported {
        index: usize,
        source: PathBuf,
        output: PathBuf,
        width: u32,
        height: u32,
        bytes: usize,
    },
    Failed {
        index: usize,
        source: PathBuf,
        error: String,
    },
}

/// Outcome of [`run_batch`]: written files in input order, and how many failed.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub written: Vec<PathBuf>,
    pub failed: usize,
}

/// Number of worker threads for a `--jobs` request.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
pub fn effective_threads(jobs: Option<usize>) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    jobs.filter(|&n| n > 0)
        .map(|n| n.min(cores))
        .unwrap_or(cores)
}

/// Decode any format the `image` crate was built with into an RGBA bitmap.
pub fn load_bitmap(path: &Path) -> Result<Bitmap, BatchError> {
    let img = image::open(path).map_err(|source| BatchError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Bitmap::from_rgba_image(img.to_rgba8()))
}

/// A file written by [`export_file`].
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub bytes: usize,
}

/// Export one file into `job.out_dir`, named after its stem.
pub fn export_file(input: &Path, job: &BatchJob) -> Result<WrittenFile, BatchError> {
    let file_name = download_name(&input.to_string_lossy(), job.params.format);
    export_file_as(input, job, &file_name)
}

/// Export one file into `job.out_dir` under `file_name`.
pub fn export_file_as(
    input: &Path,
    job: &BatchJob,
    file_name: &str,
) -> Result<WrittenFile, BatchError> {
    let source = load_bitmap(input)?;
    let params = ExportParams {
        filename: input.to_string_lossy().into_owned(),
        ..job.params.clone()
    };
    let file = export(&source, &job.settings, &params)?;

    let output = job.out_dir.join(file_name);
    if same_file(input, &output) {
        return Err(BatchError::WouldOverwrite(output));
    }
    std::fs::create_dir_all(&job.out_dir)?;
    std::fs::write(&output, &file.bytes)?;
    Ok(WrittenFile {
        path: output,
        width: file.width,
        height: file.height,
        bytes: file.bytes.len(),
    })
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// One output file name per input, in input order, with no two alike.
///
/// Names are compared case-insensitively so outputs stay distinct on
/// case-folding filesystems.
pub fn output_names(inputs: &[PathBuf], format: ExportFormat) -> Vec<String> {
    let mut taken = HashSet::new();
    inputs
        .iter()
        .map(|input| {
            let name = download_name(&input.to_string_lossy(), format);
            let unique = if taken.contains(&name.to_lowercase()) {
                (2u32..)
                    .map(|n| numbered(&name, n))
                    .find(|candidate| !taken.contains(&candidate.to_lowercase()))
                    .unwrap_or(name)
            } else {
                name
            };
            taken.insert(unique.to_lowercase());
            unique
        })
        .collect()
}

/// `beach.png` → `beach-2.png`.
fn numbered(name: &str, n: u32) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}-{n}.{ext}"),
        None => format!("{name}-{n}"),
    }
}

/// Export every input in parallel. Per-file failures are counted, not fatal.
pub fn run_batch(
    inputs: &[PathBuf],
    job: &BatchJob,
    progress: Option<Sender<BatchEvent>>,
) -> BatchSummary {
    let send = |event: BatchEvent| {
        if let Some(tx) = &progress {
            tx.send(event).ok();
        }
    };
    send(BatchEvent::Started {
        total: inputs.len(),
    });

    let names = output_names(inputs, job.params.format);
    let results: Vec<Option<PathBuf>> = inputs
        .par_iter()
        .zip(names.par_iter())
        .enumerate()
        .map(|(i, (input, name))| {
            let index = i + 1;
            match export_file_as(input, job, name) {
                Ok(written) => {
                    info!("{} -> {}", input.display(), written.path.display());
                    send(BatchEvent::Exported {
                        index,
                        source: input.clone(),
                        output: written.path.clone(),
                        width: written.width,
                        height: written.height,
                        bytes: written.bytes,
                    });
                    Some(written.path)
                }
                Err(e) => {
                    warn!("{}: {e}", input.display());
                    send(BatchEvent::Failed {
                        index,
                        source: input.clone(),
                        error: e.to_string(),
                    });
                    None
                }
            }
        })
        .collect();

    let failed = results.iter().filter(|r| r.is_none()).count();
    BatchSummary {
        written: results.into_iter().flatten().collect(),
        failed,
    }
}
