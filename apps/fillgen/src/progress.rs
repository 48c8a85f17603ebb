//! Console progress bar for a generation run.

use std::time::Duration;

use fillgen_engine::ProgressEvent;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const TEMPLATE: &str =
    "{msg}\n[{elapsed_precise}] [{wide_bar:.cyan/blue}] {percent:>3}% {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";

/// Progress bar fed by engine progress events.
#[derive(Clone)]
pub struct GenerationProgress {
    bar: ProgressBar,
}

impl GenerationProgress {
    /// Creates a bar for `total_bytes`; hidden when `quiet`.
    pub fn new(total_bytes: u64, file_name: &str, quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::with_draw_target(Some(total_bytes), ProgressDrawTarget::hidden())
        } else {
            ProgressBar::new(total_bytes)
        };

        if let Ok(style) = ProgressStyle::default_bar().template(TEMPLATE) {
            bar.set_style(style.progress_chars("#>-"));
        }
        bar.set_message(format!("Generating: {file_name}"));
        bar.enable_steady_tick(Duration::from_millis(250));

        Self { bar }
    }

    /// Applies one engine event.
    pub fn update(&self, event: ProgressEvent) {
        self.bar.set_position(event.bytes_written);
    }

    /// Leaves the bar in place with a final message.
    pub fn finish_with_message(&self, msg: String) {
        self.bar.finish_with_message(msg);
    }

    /// Stops drawing without completing the bar.
    pub fn abandon_with_message(&self, msg: String) {
        self.bar.abandon_with_message(msg);
    }
}

/// Formats a duration as `2.5s`, `1m 30s` or `1h 1m`.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();

    if secs < 60 {
        format!("{}.{:01}s", secs, duration.subsec_millis() / 100)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}
