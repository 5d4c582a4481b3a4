//! Human-readable report.
//!
//! One block per duplicate group, then a summary:
//!
//! ```text
//! Group 1: 2 files, 5 B each
//!   md5#5d41..._sha256#2cf2...
//!   [keep]   /data/a.txt
//!   [remove] /data/b.txt
//!
//! 1 duplicate group(s), 1 redundant file(s)
//! Dry run: 1 file(s) would be removed, 5 B reclaimable
//! ```
//!
//! Colour is applied with `yansi`; callers disable it globally with
//! [`yansi::disable`].

use std::io::{self, Write};

use bytesize::ByteSize;
use yansi::Paint;

use crate::actions::{RemovalPlan, ResolveMode, ResolveReport};
use crate::duplicates::{DuplicateGroup, ScanSummary};

/// Text report writer.
pub struct TextOutput<'a> {
    groups: &'a [DuplicateGroup],
    summary: &'a ScanSummary,
    report: &'a ResolveReport,
}

impl<'a> TextOutput<'a> {
    /// Create a report over the results of one run.
    #[must_use]
    pub fn new(
        groups: &'a [DuplicateGroup],
        summary: &'a ScanSummary,
        report: &'a ResolveReport,
    ) -> Self {
        Self {
            groups,
            summary,
            report,
        }
    }

    fn plan_for(&self, group: &DuplicateGroup) -> Option<&'a RemovalPlan> {
        self.report
            .plans
            .iter()
            .find(|p| p.size == group.size && p.signature == group.signature)
    }

    /// Write the report.
    ///
    /// # Errors
    ///
    /// Returns any error from the writer.
    pub fn write_to<W: Write>(&self, mut w: W) -> io::Result<()> {
        if self.groups.is_empty() {
            writeln!(w, "{}", "No duplicates found.".green())?;
        }

        for (idx, group) in self.groups.iter().enumerate() {
            writeln!(
                w,
                "{} {} files, {} each",
                format!("Group {}:", idx + 1).bold(),
                group.len(),
                ByteSize::b(group.size)
            )?;
            writeln!(w, "  {}", group.signature.as_str().dim())?;

            match self.plan_for(group) {
                Some(plan) => {
                    writeln!(w, "  {} {}", "[keep]  ".green(), plan.keep.path.display())?;
                    for file in &plan.same_as_keep {
                        writeln!(w, "  {} {}", "[same]  ".dim(), file.path.display())?;
                    }
                    for file in &plan.remove {
                        writeln!(w, "  {} {}", "[remove]".red(), file.path.display())?;
                    }
                }
                None => {
                    for file in &group.files {
                        writeln!(w, "  {}", file.path.display())?;
                    }
                }
            }
            writeln!(w)?;
        }

        self.write_summary(&mut w)
    }

    fn write_summary<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(
            w,
            "Scanned {} file(s), {}",
            self.summary.total_files,
            self.summary.total_size_display()
        )?;
        writeln!(
            w,
            "{} duplicate group(s), {} redundant file(s)",
            self.summary.duplicate_groups, self.summary.duplicate_files
        )?;

        let line = match self.report.mode {
            ResolveMode::DryRun => format!(
                "Dry run: {} file(s) would be removed, {} reclaimable",
                self.report.candidate_count(),
                ByteSize::b(self.report.reclaimable_bytes())
            ),
            ResolveMode::Trash => format!(
                "Moved {} file(s) to trash, {} reclaimed",
                self.report.removed.len(),
                ByteSize::b(self.report.bytes_reclaimed)
            ),
            ResolveMode::Permanent => format!(
                "Deleted {} file(s), {} reclaimed",
                self.report.removed.len(),
                ByteSize::b(self.report.bytes_reclaimed)
            ),
        };
        writeln!(w, "{}", line.bold())?;

        let mut warnings = self.summary.warning_messages();
        warnings.extend(self.report.failures.iter().map(|f| f.error.to_string()));
        if !warnings.is_empty() {
            writeln!(w, "{}", format!("{} warning(s):", warnings.len()).yellow())?;
            for warning in warnings {
                writeln!(w, "  {}", warning)?;
            }
        }

        Ok(())
    }
}
