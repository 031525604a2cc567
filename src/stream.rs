//! Streaming conversion API: emit files as they complete.
//!
//! Unlike the eager [`crate::convert::convert_directory`], which returns
//! only after the whole batch, [`convert_stream`] yields one item per image
//! as soon as that image is done. Files are still processed strictly one
//! at a time and in discovery order; a file is not started until the
//! previous item has been polled out of the stream.
//!
//! Per-file logging and progress callbacks fire exactly as in the eager
//! path. `on_batch_complete` does not, since the stream may be dropped
//! early; callers that drain it know when the batch ends.

use crate::config::BatchConfig;
use crate::convert::{convert_file, discover_in, report};
use crate::error::{FileError, Scan2PdfError};
use crate::output::{FileOutcome, FileResult};
use crate::resolve;
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::pin::Pin;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of per-file results.
///
/// Converted and skipped files arrive as `Ok`; failed files as `Err`.
pub type FileStream = Pin<Box<dyn Stream<Item = Result<FileResult, FileError>> + Send>>;

/// Convert a directory, streaming each file's result as it is ready.
///
/// # Returns
/// - `Ok(FileStream)`: one item per discovered image
/// - `Err(Scan2PdfError)`: setup failure (bad source, destination not creatable)
pub async fn convert_stream(
    source: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    config: &BatchConfig,
) -> Result<FileStream, Scan2PdfError> {
    let dirs = resolve::resolve_directories(source, dest)?;
    let images = discover_in(&dirs.source, config)?;
    info!(
        "Streaming conversion of {} images from {}",
        images.len(),
        dirs.source.display()
    );

    let total = images.len();
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let dest = dirs.dest;
    let config_clone = config.clone();

    let s = stream::iter(images.into_iter().enumerate()).then(move |(i, image)| {
        let dest = dest.clone();
        let cfg = config_clone.clone();
        async move {
            let index = i + 1;
            if let Some(ref cb) = cfg.progress_callback {
                cb.on_file_start(index, total, &image);
            }
            let mut result = convert_file(&image, &dest, &cfg).await;
            report(&cfg, index, total, &result);
            match std::mem::replace(&mut result.outcome, FileOutcome::Converted) {
                FileOutcome::Failed(err) => Err(err),
                outcome => {
                    result.outcome = outcome;
                    Ok(result)
                }
            }
        }
    });

    Ok(Box::pin(s))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stream_yields_one_item_per_image() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        for name in ["a.png", "b.jpg", "skip.txt"] {
            std::fs::write(src.path().join(name), b"x").unwrap();
        }
        let cfg = BatchConfig::builder()
            .cleanup_tool("true")
            .ocr_tool("true")
            .build()
            .unwrap();

        let items: Vec<_> = convert_stream(src.path(), dest.path(), &cfg)
            .await
            .unwrap()
            .collect()
            .await;

        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|r| r.is_ok()));
        let first = items[0].as_ref().unwrap();
        assert!(first.output.ends_with("a.pdf"));
    }

    #[tokio::test]
    async fn failures_arrive_as_err_items() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("bad.tif"), b"x").unwrap();
        let cfg = BatchConfig::builder()
            .cleanup_tool("false")
            .ocr_tool("true")
            .build()
            .unwrap();

        let mut s = convert_stream(src.path(), dest.path(), &cfg).await.unwrap();
        let item = s.next().await.unwrap();
        assert!(matches!(item, Err(FileError::CleanupFailed { .. })));
        assert!(s.next().await.is_none());
    }

    #[tokio::test]
    async fn progress_callback_fires_per_file() {
        use crate::progress::ConversionProgressCallback;
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        #[derive(Default)]
        struct Counter {
            started: AtomicUsize,
            ok: AtomicUsize,
            failed: AtomicUsize,
        }
        impl ConversionProgressCallback for Counter {
            fn on_file_start(&self, _: usize, _: usize, _: &Path) {
                self.started.fetch_add(1, Ordering::SeqCst);
            }
            fn on_file_complete(&self, _: usize, _: usize, _: &Path) {
                self.ok.fetch_add(1, Ordering::SeqCst);
            }
            fn on_file_error(&self, _: usize, _: usize, _: &str) {
                self.failed.fetch_add(1, Ordering::SeqCst);
            }
        }

        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        for name in ["a.png", "b.png"] {
            std::fs::write(src.path().join(name), b"x").unwrap();
        }
        let counter = Arc::new(Counter::default());
        let cfg = BatchConfig::builder()
            .cleanup_tool("true")
            .ocr_tool("false")
            .progress_callback(counter.clone())
            .build()
            .unwrap();

        let items: Vec<_> = convert_stream(src.path(), dest.path(), &cfg)
            .await
            .unwrap()
            .collect()
            .await;

        assert_eq!(items.len(), 2);
        assert_eq!(counter.started.load(Ordering::SeqCst), 2);
        assert_eq!(counter.ok.load(Ordering::SeqCst), 0);
        assert_eq!(counter.failed.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn missing_source_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let result = convert_stream(
            dir.path().join("missing"),
            dir.path().join("out"),
            &BatchConfig::default(),
        )
        .await;
        assert!(matches!(result, Err(Scan2PdfError::InvalidSourceDir { .. })));
        assert!(!dir.path().join("out").exists());
    }
}
