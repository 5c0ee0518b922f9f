//! The sequential extraction pipeline.
//!
//! Files are processed one at a time: read and extract text, truncate, one
//! API call, parse the reply. Per-file failures are isolated: the run keeps
//! going and the failed file gets a null-filled row. Processing CVs strictly
//! one at a time keeps the tool under the remote API's rate limits.

use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;

use crate::{ChatBackend, Config, CoreError, CvRecord, ProgressEvent, RunStats, parse, prompt};

/// Process `files` in order, returning one [`CvRecord`] per attempted file.
///
/// Progress events are emitted via the callback. Cancellation is honored
/// between files; the records accumulated so far are returned.
pub async fn extract_folder(
    files: &[PathBuf],
    config: &Config,
    backend: &dyn ChatBackend,
    progress: impl Fn(ProgressEvent),
    cancel: CancellationToken,
) -> (Vec<CvRecord>, RunStats) {
    let total = files.len();
    let mut records = Vec::with_capacity(total);
    let mut stats = RunStats {
        total,
        ..RunStats::default()
    };

    for (index, path) in files.iter().enumerate() {
        if cancel.is_cancelled() {
            tracing::info!(
                completed = records.len(),
                total,
                "run cancelled, keeping completed records"
            );
            break;
        }

        let filename = file_name_of(path);
        progress(ProgressEvent::Processing {
            index,
            total,
            filename: filename.clone(),
        });

        match process_file(path, &filename, config, backend, &progress, index, total).await {
            Ok(record) => {
                stats.succeeded += 1;
                tracing::info!(file = %filename, "extracted");
                progress(ProgressEvent::Succeeded {
                    index,
                    total,
                    filename,
                });
                records.push(record);
            }
            Err(e) => {
                match e {
                    CoreError::Ingest(_) => stats.failed_extraction += 1,
                    _ => stats.failed_api += 1,
                }
                tracing::error!(file = %filename, error = %e, "extraction failed");
                progress(ProgressEvent::Failed {
                    index,
                    total,
                    filename: filename.clone(),
                    message: e.to_string(),
                });
                records.push(CvRecord::empty(&filename));
            }
        }
    }

    (records, stats)
}

async fn process_file(
    path: &Path,
    filename: &str,
    config: &Config,
    backend: &dyn ChatBackend,
    progress: &impl Fn(ProgressEvent),
    index: usize,
    total: usize,
) -> Result<CvRecord, CoreError> {
    let text = cvsift_ingest::extract_text(path)?;
    let chars = text.chars().count();
    let sent = cvsift_ingest::truncate_chars(&text, config.max_text_chars);

    progress(ProgressEvent::Extracted {
        index,
        total,
        filename: filename.to_string(),
        chars,
        truncated: chars > config.max_text_chars,
    });

    let user = prompt::build_user_message(filename, sent);
    let reply = backend.complete(prompt::EXTRACTION_PROMPT, &user).await?;
    parse::parse_record(&reply, filename)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
