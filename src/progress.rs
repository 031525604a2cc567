//! Progress-callback trait for per-file batch events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::BatchConfigBuilder::progress_callback`] to receive
//! events as the batch processes each image. The CLI uses this to drive its
//! progress bar; library users can forward events anywhere they like.
//!
//! # Example
//!
//! ```rust
//! use scan2pdf::{BatchConfig, ConversionProgressCallback};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: Arc<AtomicUsize>,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_file_complete(&self, index: usize, total: usize, output: &Path) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}/{} -> {}", index, total, output.display());
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     completed: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = BatchConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the batch loop as it processes each image.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. `index` is 1-based.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once after discovery, before any file is processed.
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called just before the cleanup stage runs for a file.
    fn on_file_start(&self, index: usize, total_files: usize, input: &Path) {
        let _ = (index, total_files, input);
    }

    /// Called when a file produced its PDF.
    fn on_file_complete(&self, index: usize, total_files: usize, output: &Path) {
        let _ = (index, total_files, output);
    }

    /// Called when a file was left alone because its PDF already exists.
    fn on_file_skipped(&self, index: usize, total_files: usize, output: &Path) {
        let _ = (index, total_files, output);
    }

    /// Called when either stage failed for a file.
    fn on_file_error(&self, index: usize, total_files: usize, error: &str) {
        let _ = (index, total_files, error);
    }

    /// Called once after every file has been attempted.
    fn on_batch_complete(&self, total_files: usize, converted: usize) {
        let _ = (total_files, converted);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::BatchConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        skips: AtomicUsize,
        errors: AtomicUsize,
        batch_total: AtomicUsize,
        converted: AtomicUsize,
    }

    impl ConversionProgressCallback for TrackingCallback {
        fn on_batch_start(&self, total_files: usize) {
            self.batch_total.store(total_files, Ordering::SeqCst);
        }

        fn on_file_start(&self, _index: usize, _total: usize, _input: &Path) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_complete(&self, _index: usize, _total: usize, _output: &Path) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_skipped(&self, _index: usize, _total: usize, _output: &Path) {
            self.skips.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_error(&self, _index: usize, _total: usize, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_batch_complete(&self, _total: usize, converted: usize) {
            self.converted.store(converted, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_batch_start(2);
        cb.on_file_start(1, 2, Path::new("a.png"));
        cb.on_file_complete(1, 2, Path::new("a.pdf"));
        cb.on_file_skipped(2, 2, Path::new("b.pdf"));
        cb.on_file_error(2, 2, "boom");
        cb.on_batch_complete(2, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();

        tracker.on_batch_start(3);
        tracker.on_file_start(1, 3, Path::new("a.jpg"));
        tracker.on_file_complete(1, 3, Path::new("a.pdf"));
        tracker.on_file_start(2, 3, Path::new("b.jpg"));
        tracker.on_file_error(2, 3, "cleanup stage failed");
        tracker.on_file_skipped(3, 3, Path::new("c.pdf"));
        tracker.on_batch_complete(3, 1);

        assert_eq!(tracker.batch_total.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.skips.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.converted.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_batch_start(10);
        cb.on_file_start(1, 10, Path::new("scan.tif"));
    }
}
