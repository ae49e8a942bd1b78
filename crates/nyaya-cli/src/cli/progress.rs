//! Spinners for long-running backend calls.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Start a spinner with `message`, or a hidden bar when `quiet`.
///
/// Quiet mode keeps stdout clean for machine-readable output.
pub fn spinner(message: impl Into<String>, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
