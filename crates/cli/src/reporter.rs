//! Listener that prints each change notification

use dirwatch::DirectoryListener;
use owo_colors::OwoColorize;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Prints one line per notification and counts them
#[derive(Debug, Default)]
pub struct ChangeReporter {
    count: AtomicUsize,
}

impl ChangeReporter {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl DirectoryListener for ChangeReporter {
    fn on_dir_changed(&self, path: &Path) {
        let n = self.count.fetch_add(1, Ordering::SeqCst) + 1;
        println!(
            "{} {} {}",
            "changed".green().bold(),
            path.display(),
            format!("(#{})", n).dimmed()
        );
    }
}
