//! Progress reporting using indicatif.
//!
//! [`Progress`] implements both [`ProgressCallback`] for the scan pipeline
//! and [`DeleteProgressCallback`] for resolution, drawing bars on stderr.

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::actions::{DeleteError, DeleteProgressCallback, ResolveReport};
use crate::duplicates::Phase;

/// Progress callback for the duplicate finding pipeline.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts; `total` is 0 when unknown.
    fn on_phase_start(&self, phase: Phase, total: usize);

    /// Called for each item processed (`current` is 1-based).
    fn on_progress(&self, current: usize, path: &Path);

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: Phase);

    /// Called to update the progress message.
    fn on_message(&self, _message: &str) {}
}

/// Progress reporter drawing one bar per phase.
pub struct Progress {
    bar: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter; `quiet` hides every bar.
    ///
    /// ```
    /// use dupsweep::progress::Progress;
    ///
    /// let progress = Progress::new(true);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            quiet,
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn start(&self, total: usize, message: String) {
        if self.quiet {
            return;
        }

        let pb = if total == 0 {
            let pb = ProgressBar::new_spinner();
            pb.set_style(Self::spinner_style());
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        } else {
            let pb = ProgressBar::new(total as u64);
            pb.set_style(Self::bar_style());
            pb
        };
        pb.set_draw_target(ProgressDrawTarget::stderr());
        pb.set_message(message);

        if let Ok(mut slot) = self.bar.lock() {
            if let Some(old) = slot.replace(pb) {
                old.finish_and_clear();
            }
        }
    }

    fn update(&self, current: usize, path: &Path) {
        if self.quiet {
            return;
        }
        if let Ok(slot) = self.bar.lock() {
            if let Some(pb) = slot.as_ref() {
                pb.set_position(current as u64);
                pb.set_message(truncate_path(path, 30));
            }
        }
    }

    fn finish(&self, message: &str) {
        if self.quiet {
            return;
        }
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(pb) = slot.take() {
                pb.finish_with_message(message.to_string());
            }
        }
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: Phase, total: usize) {
        self.start(total, phase.to_string());
    }

    fn on_progress(&self, current: usize, path: &Path) {
        self.update(current, path);
    }

    fn on_phase_end(&self, phase: Phase) {
        self.finish(&format!("{} complete", phase));
    }

    fn on_message(&self, message: &str) {
        if self.quiet {
            return;
        }
        if let Ok(slot) = self.bar.lock() {
            if let Some(pb) = slot.as_ref() {
                pb.set_message(message.to_string());
            }
        }
    }
}

impl DeleteProgressCallback for Progress {
    fn on_before_delete(&self, path: &Path, index: usize, total: usize) {
        if index == 0 {
            self.start(total, Phase::Resolving.to_string());
        }
        self.update(index + 1, path);
    }

    fn on_delete_success(&self, _path: &Path, _size: u64) {}

    fn on_delete_failure(&self, path: &Path, error: &DeleteError) {
        if self.quiet {
            return;
        }
        if let Ok(slot) = self.bar.lock() {
            if let Some(pb) = slot.as_ref() {
                pb.println(format!("Failed to remove {}: {}", path.display(), error));
            }
        }
    }

    fn on_complete(&self, report: &ResolveReport) {
        self.finish(&report.summary());
    }
}

/// Truncate a path for display in the progress bar.
fn truncate_path(path: &Path, max_len: usize) -> String {
    let full = path.to_string_lossy();
    if full.chars().count() <= max_len {
        return full.into_owned();
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let count = file_name.chars().count();
    if count + 4 > max_len {
        let tail: String = file_name.chars().skip(count + 3 - max_len).collect();
        return format!("...{}", tail);
    }

    format!(".../{}", file_name)
}
