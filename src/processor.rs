use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::Result;
use crate::filename::display_name;
use crate::metadata::MetadataTool;
use crate::prompt::{ask, Reply, DESCRIPTION_PROMPT};
use crate::scan::collect_files;

/// Result of handling a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Updated,
    Skipped(SkipReason),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The field already holds this value and overwrite mode is off
    AlreadySet(String),
    /// The operator entered nothing
    EmptyInput,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessingStats {
    pub total_files: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub interrupted: bool,
}

impl ProcessingStats {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Updated => self.updated += 1,
            Outcome::Skipped(_) => self.skipped += 1,
            Outcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Drives the preview / prompt / write loop over a folder
pub struct Processor<T: MetadataTool> {
    config: Config,
    tool: T,
    stats: ProcessingStats,
    cancelled: Arc<AtomicBool>,
}

impl<T: MetadataTool> Processor<T> {
    pub fn new(config: Config, tool: T) -> Self {
        Processor {
            config,
            tool,
            stats: ProcessingStats::default(),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share a cancellation flag (set from the Ctrl-C handler)
    pub fn with_cancel_flag(mut self, cancelled: Arc<AtomicBool>) -> Self {
        self.cancelled = cancelled;
        self
    }

    pub fn stats(&self) -> &ProcessingStats {
        &self.stats
    }

    pub fn tool(&self) -> &T {
        &self.tool
    }

    /// List the configured directory and describe every supported file in it.
    ///
    /// Fails only if the directory cannot be listed; per-file problems are
    /// reported to `out` and counted.
    pub fn process_directory<R: BufRead, W: Write>(
        &mut self,
        input: &mut R,
        out: &mut W,
    ) -> Result<()> {
        // Collect matching files upfront
        let files = collect_files(&self.config.directory, &self.config.extensions)?;

        if files.is_empty() {
            writeln!(
                out,
                "No supported files found in '{}'.",
                self.config.directory.display()
            )?;
            return Ok(());
        }

        self.print_banner(out)?;
        self.process_files(&files, input, out)?;
        self.print_summary(out)?;
        Ok(())
    }

    /// Run the loop over an already selected list of files
    pub fn process_files<R: BufRead, W: Write>(
        &mut self,
        files: &[PathBuf],
        input: &mut R,
        out: &mut W,
    ) -> Result<()> {
        self.stats.total_files += files.len();

        for path in files {
            // Stop before touching another file once the operator cancels
            let outcome = if self.cancelled.load(Ordering::SeqCst) {
                None
            } else {
                self.process_file(path, input, out)?
            };

            match outcome {
                Some(outcome) => {
                    self.report(path, &outcome, out)?;
                    self.stats.record(&outcome);
                }
                None => {
                    // Interrupted: earlier files stay written, the rest are untouched
                    writeln!(out)?;
                    writeln!(out, "Exiting...")?;
                    self.stats.interrupted = true;
                    break;
                }
            }
        }

        Ok(())
    }

    /// Handle one file. `None` means the operator ended input.
    fn process_file<R: BufRead, W: Write>(
        &mut self,
        path: &Path,
        input: &mut R,
        out: &mut W,
    ) -> Result<Option<Outcome>> {
        let name = display_name(path);
        let field = self.config.field.clone();

        // Check existing value unless we are overwriting
        if !self.config.overwrite {
            match self.tool.read_field(path, &field) {
                Ok(existing) => {
                    debug!("{} existing {}: {:?}", name, field, existing);
                    if !existing.is_empty() {
                        return Ok(Some(Outcome::Skipped(SkipReason::AlreadySet(existing))));
                    }
                }
                Err(e) => {
                    // Unreadable counts as empty, the operator still gets asked
                    warn!("Could not read {} from {}: {}", field, name, e);
                }
            }
        }

        // Preview, without waiting for the viewer
        writeln!(out)?;
        writeln!(out, "Opening: {}", name)?;
        if let Err(e) = self.tool.open_file(path) {
            warn!("Could not preview {}: {}", name, e);
        }

        // Prompt
        let description = match ask(input, out, DESCRIPTION_PROMPT)? {
            Reply::Interrupted => return Ok(None),
            Reply::Line(line) if line.is_empty() => {
                return Ok(Some(Outcome::Skipped(SkipReason::EmptyInput)));
            }
            Reply::Line(line) => line,
        };

        // Write and check exit status
        let outcome = match self.tool.write_field(path, &field, &description) {
            Ok(()) => Outcome::Updated,
            Err(e) => Outcome::Failed(e.to_string()),
        };
        Ok(Some(outcome))
    }

    fn report<W: Write>(&self, path: &Path, outcome: &Outcome, out: &mut W) -> Result<()> {
        let name = display_name(path);
        let field = &self.config.field;

        match outcome {
            Outcome::Updated => writeln!(out, "Updated {} for {}.", field, name)?,
            Outcome::Skipped(SkipReason::AlreadySet(existing)) => {
                writeln!(out)?;
                writeln!(out, "{} already has a {}, skipping.", name, field)?;
                writeln!(out, "    Existing {}: {}", field, existing)?;
            }
            Outcome::Skipped(SkipReason::EmptyInput) => writeln!(out, "Skipped.")?,
            Outcome::Failed(message) => writeln!(out, "Error updating {}: {}", name, message)?,
        }
        Ok(())
    }

    fn print_banner<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out)?;
        writeln!(
            out,
            "--- Preview & Describe EXIF v{} ---",
            env!("CARGO_PKG_VERSION")
        )?;
        writeln!(out, "Folder: {}", self.config.directory.display())?;
        writeln!(out, "EXIF field: {}", self.config.field)?;
        writeln!(out, "File types: {}", self.config.extensions_label())?;
        writeln!(
            out,
            "Skip files with existing {}: {}",
            self.config.field,
            if self.config.overwrite { "No (will overwrite)" } else { "Yes" }
        )?;
        writeln!(out)?;
        writeln!(out, "Press Enter without typing to skip a file.")?;
        Ok(())
    }

    fn print_summary<W: Write>(&self, out: &mut W) -> Result<()> {
        let stats = &self.stats;

        writeln!(out)?;
        writeln!(out, "=== SUMMARY ===")?;
        writeln!(out, "Files found: {}", stats.total_files)?;
        writeln!(out, "Updated: {}", stats.updated)?;
        writeln!(out, "Skipped: {}", stats.skipped)?;
        writeln!(out, "Failed: {}", stats.failed)?;
        if stats.interrupted {
            let untouched =
                stats.total_files - stats.updated - stats.skipped - stats.failed;
            writeln!(out, "Not reached (stopped early): {}", untouched)?;
        }
        writeln!(out)?;
        writeln!(out, "All done!")?;
        Ok(())
    }
}
