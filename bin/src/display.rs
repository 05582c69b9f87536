//! Display utilities and output formatting for the saleflow CLI.

use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use saleflow_lib::prelude::*;
use saleflow_lib::{DayObserver, DayOutcome};
use std::fmt::Write as _;
use std::time::Duration;

/// Formats an elapsed time as `1h 02m 03s`, `2m 05s` or `4.2s`.
pub(crate) fn format_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs >= 3600 {
        format!("{}h {:02}m {:02}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else if secs >= 60 {
        format!("{}m {:02}s", secs / 60, secs % 60)
    } else {
        format!("{:.1}s", elapsed.as_secs_f64())
    }
}

/// Multi-line summary printed at the end of a load.
pub(crate) fn run_summary(mode: RunMode, outcome: &RangeOutcome, elapsed: Duration) -> String {
    let metrics = &outcome.metrics;
    let mut out = String::new();

    let _ = writeln!(out, "Mode:        {mode}");
    let _ = writeln!(out, "Duration:    {}", format_duration(elapsed));
    let _ = writeln!(out, "Days:        {}", outcome.days);
    let _ = writeln!(out, "Processed:   {}", metrics.processed);
    let _ = writeln!(out, "Stored:      {}", metrics.stored);
    let _ = writeln!(out, "Rejected:    {}", metrics.errors);
    if let Some(rate) = metrics.quality_rate() {
        let _ = writeln!(out, "Quality:     {rate:.1}%");
    }
    if !outcome.failed_days.is_empty() {
        let days: Vec<String> = outcome.failed_days.iter().map(ToString::to_string).collect();
        let _ = writeln!(
            out,
            "Failed days: {} ({})",
            outcome.failed_days.len(),
            days.join(", ")
        );
    }

    out
}

/// Drives a progress bar from coordinator callbacks.
pub(crate) struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    pub(crate) fn new(quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new(0);
            if let Ok(style) = ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} days ({percent}%) {msg}",
            ) {
                pb.set_style(style.progress_chars("=>-"));
            }
            pb
        };
        Self { bar }
    }
}

impl DayObserver for ProgressObserver {
    fn on_start(&self, total_days: usize) {
        self.bar.set_length(total_days as u64);
    }

    fn on_day(&self, date: NaiveDate, result: &Result<DayOutcome>) {
        let status = match result {
            Ok(DayOutcome::Loaded { stored, .. }) => format!("{date}: {stored} stored"),
            Ok(DayOutcome::AllRejected { rejected }) => format!("{date}: {rejected} rejected"),
            Ok(DayOutcome::Empty) => format!("{date}: no sales"),
            Err(_) => format!("{date}: failed"),
        };
        self.bar.set_message(status);
        self.bar.inc(1);
    }

    fn on_finish(&self, outcome: &RangeOutcome) {
        self.bar.finish_with_message(format!(
            "{} stored, {} failed days",
            outcome.metrics.stored,
            outcome.failed_days.len()
        ));
    }
}
