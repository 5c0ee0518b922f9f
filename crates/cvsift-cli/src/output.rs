use std::io::Write;

use cvsift_core::{ProgressEvent, RunStats};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print a real-time progress event.
pub fn print_progress(
    w: &mut dyn Write,
    event: &ProgressEvent,
    color: ColorMode,
) -> std::io::Result<()> {
    match event {
        ProgressEvent::Processing {
            index,
            total,
            filename,
        } => {
            writeln!(w, "[{}/{}] Processing: {}", index + 1, total, filename)?;
        }
        ProgressEvent::Extracted {
            chars, truncated, ..
        } => {
            if *truncated {
                let msg = format!("      ({} chars extracted, truncated for API)", chars);
                if color.enabled() {
                    writeln!(w, "{}", msg.dimmed())?;
                } else {
                    writeln!(w, "{}", msg)?;
                }
            }
        }
        ProgressEvent::Succeeded {
            index,
            total,
            filename,
        } => {
            if color.enabled() {
                writeln!(
                    w,
                    "[{}/{}] -> {} {}",
                    index + 1,
                    total,
                    "✓".green(),
                    filename
                )?;
            } else {
                writeln!(w, "[{}/{}] -> ✓ {}", index + 1, total, filename)?;
            }
        }
        ProgressEvent::Failed {
            index,
            total,
            filename,
            message,
        } => {
            if color.enabled() {
                writeln!(
                    w,
                    "[{}/{}] -> {} {} ({})",
                    index + 1,
                    total,
                    "✗".red(),
                    filename,
                    message
                )?;
            } else {
                writeln!(
                    w,
                    "[{}/{}] -> ✗ {} ({})",
                    index + 1,
                    total,
                    filename,
                    message
                )?;
            }
        }
    }
    Ok(())
}

/// Print the end-of-run summary block.
pub fn print_summary(
    w: &mut dyn Write,
    stats: &RunStats,
    csv_path: &std::path::Path,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w)?;

    let extracted = format!(
        "✓ Successfully extracted data from {} of {} CVs",
        stats.succeeded, stats.total
    );
    if color.enabled() {
        writeln!(w, "{}", extracted.green())?;
    } else {
        writeln!(w, "{}", extracted)?;
    }

    let failed = stats.failed_extraction + stats.failed_api;
    if failed > 0 {
        let line = format!(
            "✗ {} files failed ({} unreadable, {} API errors); their rows are empty",
            failed, stats.failed_extraction, stats.failed_api
        );
        if color.enabled() {
            writeln!(w, "{}", line.red())?;
        } else {
            writeln!(w, "{}", line)?;
        }
    }

    writeln!(w, "✓ Results saved to: {}", csv_path.display())?;
    Ok(())
}
