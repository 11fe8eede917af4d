//! Progress reporting support (requires `progress` feature)

use indicatif::{ProgressBar, ProgressStyle};

/// Create a default progress bar over resolved pairs
#[must_use]
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} entries ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    pb
}

/// Adapt a progress bar into a [`TransferOptions`](crate::TransferOptions)
/// progress callback.
pub fn progress_callback(pb: ProgressBar) -> impl Fn(u64, u64) + Send + Sync + 'static {
    move |done, total| {
        pb.set_length(total);
        pb.set_position(done);
    }
}
