// Export Pipeline: capture a rendered surface, wrap it in a one-page PDF, deliver it.
// Only one export runs at a time; a second request while one is in flight is
// suppressed without capturing anything.

pub mod pdf;
pub mod sink;
pub mod surface;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use bytes::Bytes;
use regex::Regex;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

pub use sink::{DirectorySink, DownloadSink};
pub use surface::{RasterSurface, RenderSurface};

/// Default capture scale factor.
pub const DEFAULT_CAPTURE_SCALE: f32 = 2.0;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Capture failed: {0}")]
    Capture(String),

    #[error("PDF assembly failed: {0}")]
    Assembly(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),
}

#[derive(Debug, Clone)]
pub struct ExportReceipt {
    pub id: Uuid,
    pub filename: String,
    pub path: PathBuf,
    pub png_path: Option<PathBuf>,
    pub bytes: usize,
    pub image_width: u32,
    pub image_height: u32,
    pub page_width_pt: f64,
    pub page_height_pt: f64,
}

#[derive(Debug, Clone)]
pub enum ExportOutcome {
    Completed(ExportReceipt),
    /// Another export was already running; nothing was captured.
    Suppressed,
}

/// Derives the download filename from a full name.
///
/// `"  Jane   Doe "` becomes `Jane_Doe_resume.pdf`; an empty name gives `resume.pdf`.
pub fn export_filename(full_name: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let whitespace = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is a valid regex"));

    let stem = whitespace
        .replace_all(full_name.trim(), "_")
        .replace(['/', '\\'], "_");
    if stem.is_empty() {
        "resume.pdf".to_string()
    } else {
        format!("{stem}_resume.pdf")
    }
}

/// Holds the exporting flag for the lifetime of one export.
struct ExportingGuard<'a>(&'a AtomicBool);

impl<'a> ExportingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for ExportingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Cloning shares the exporting flag, so clones of one pipeline never export
/// concurrently.
#[derive(Clone)]
pub struct ExportPipeline {
    exporting: Arc<AtomicBool>,
    sink: Arc<dyn DownloadSink>,
    scale: f32,
    write_png: bool,
}

impl std::fmt::Debug for ExportPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportPipeline")
            .field("exporting", &self.is_exporting())
            .field("scale", &self.scale)
            .field("write_png", &self.write_png)
            .finish_non_exhaustive()
    }
}

impl ExportPipeline {
    pub fn new(sink: Arc<dyn DownloadSink>, scale: f32) -> Self {
        Self {
            exporting: Arc::new(AtomicBool::new(false)),
            sink,
            scale,
            write_png: false,
        }
    }

    /// Also deliver the captured image as a PNG next to the PDF.
    pub fn with_png(mut self, write_png: bool) -> Self {
        self.write_png = write_png;
        self
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting.load(Ordering::Acquire)
    }

    /// Runs one export. Failures are logged here and returned; nothing is written
    /// unless every stage succeeds.
    pub async fn export(
        &self,
        surface: &dyn RenderSurface,
        full_name: &str,
    ) -> Result<ExportOutcome, ExportError> {
        let Some(_guard) = ExportingGuard::acquire(&self.exporting) else {
            warn!("Export already in progress, ignoring request");
            return Ok(ExportOutcome::Suppressed);
        };

        let id = Uuid::new_v4();
        let filename = export_filename(full_name);
        info!(export_id = %id, filename = %filename, scale = self.scale, "Export started");

        match self.run(id, surface, filename).await {
            Ok(receipt) => {
                info!(
                    export_id = %id,
                    path = %receipt.path.display(),
                    bytes = receipt.bytes,
                    "Export finished"
                );
                Ok(ExportOutcome::Completed(receipt))
            }
            Err(e) => {
                error!(export_id = %id, error = %e, "Export failed");
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        id: Uuid,
        surface: &dyn RenderSurface,
        filename: String,
    ) -> Result<ExportReceipt, ExportError> {
        let image = surface.capture(self.scale).await?;
        let (page_width_pt, page_height_pt) = pdf::page_size_pt(image.width(), image.height());
        let title = filename.trim_end_matches(".pdf").replace('_', " ");
        let document = Bytes::from(pdf::assemble_pdf(&image, &title)?);

        // Encode the PNG before delivering anything so a failure writes no files.
        let png = if self.write_png {
            let encoded = image
                .to_png()
                .map_err(|e| ExportError::Assembly(format!("encoding PNG: {e:#}")))?;
            Some(Bytes::from(encoded))
        } else {
            None
        };

        let bytes = document.len();
        let path = self.sink.deliver(&filename, document).await?;
        let png_path = match png {
            Some(data) => {
                let png_name = format!("{}.png", filename.trim_end_matches(".pdf"));
                match self.sink.deliver(&png_name, data).await {
                    Ok(png_path) => Some(png_path),
                    Err(e) => {
                        // The PDF alone is not a finished export.
                        if let Err(discard_err) = self.sink.discard(&path).await {
                            warn!(
                                export_id = %id,
                                path = %path.display(),
                                error = %discard_err,
                                "Failed to remove PDF after PNG delivery failed"
                            );
                        }
                        return Err(e);
                    }
                }
            }
            None => None,
        };

        Ok(ExportReceipt {
            id,
            filename,
            path,
            png_path,
            bytes,
            image_width: image.width(),
            image_height: image.height(),
            page_width_pt,
            page_height_pt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use tempfile::TempDir;
    use tokio::sync::Notify;

    use crate::layout::RasterImage;
    use crate::render::tree::Color;

    /// Test surface that can block until released and counts captures.
    struct GatedSurface {
        captures: AtomicUsize,
        started: Notify,
        release: Notify,
        gated: bool,
        fail: bool,
    }

    impl GatedSurface {
        fn new(gated: bool, fail: bool) -> Self {
            Self {
                captures: AtomicUsize::new(0),
                started: Notify::new(),
                release: Notify::new(),
                gated,
                fail,
            }
        }
    }

    #[async_trait]
    impl RenderSurface for GatedSurface {
        async fn capture(&self, scale: f32) -> Result<RasterImage, ExportError> {
            self.captures.fetch_add(1, Ordering::SeqCst);
            if self.gated {
                self.started.notify_one();
                self.release.notified().await;
            }
            if self.fail {
                return Err(ExportError::Capture("surface went away".to_string()));
            }
            let w = (400.0 * scale) as u32;
            Ok(RasterImage::new(w, w * 2, Color::WHITE))
        }
    }

    fn pipeline(dir: &TempDir) -> ExportPipeline {
        ExportPipeline::new(Arc::new(DirectorySink::new(dir.path())), DEFAULT_CAPTURE_SCALE)
    }

    #[test]
    fn test_filename_from_name() {
        assert_eq!(export_filename("Jane Doe"), "Jane_Doe_resume.pdf");
        assert_eq!(export_filename("  Jane   Doe "), "Jane_Doe_resume.pdf");
        assert_eq!(export_filename("Ana\tMaria\nSilva"), "Ana_Maria_Silva_resume.pdf");
    }

    #[test]
    fn test_filename_for_empty_name() {
        assert_eq!(export_filename(""), "resume.pdf");
        assert_eq!(export_filename("   "), "resume.pdf");
    }

    #[test]
    fn test_filename_replaces_path_separators() {
        assert_eq!(export_filename("a/b\\c"), "a_b_c_resume.pdf");
        assert_eq!(export_filename("../etc"), ".._etc_resume.pdf");
    }

    #[tokio::test]
    async fn test_export_writes_pdf_with_page_geometry() {
        let dir = TempDir::new().unwrap();
        let surface = GatedSurface::new(false, false);
        let outcome = pipeline(&dir).export(&surface, "Jane Doe").await.unwrap();

        let ExportOutcome::Completed(receipt) = outcome else {
            panic!("expected a completed export");
        };
        assert_eq!(receipt.filename, "Jane_Doe_resume.pdf");
        assert_eq!(receipt.image_width, 800);
        assert!((receipt.page_height_pt - 2.0 * receipt.page_width_pt).abs() < 1e-6);
        let written = std::fs::read(dir.path().join("Jane_Doe_resume.pdf")).unwrap();
        assert!(written.starts_with(b"%PDF-1.4"));
        assert_eq!(written.len(), receipt.bytes);
        assert!(receipt.png_path.is_none());
    }

    #[tokio::test]
    async fn test_export_with_png_writes_both_files() {
        let dir = TempDir::new().unwrap();
        let surface = GatedSurface::new(false, false);
        let outcome = pipeline(&dir)
            .with_png(true)
            .export(&surface, "Jane Doe")
            .await
            .unwrap();
        let ExportOutcome::Completed(receipt) = outcome else {
            panic!("expected a completed export");
        };
        assert_eq!(receipt.png_path, Some(dir.path().join("Jane_Doe_resume.png")));
        assert!(dir.path().join("Jane_Doe_resume.png").exists());
    }

    #[tokio::test]
    async fn test_second_export_is_suppressed_while_first_runs() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline(&dir);
        let first = Arc::new(GatedSurface::new(true, false));

        let task = {
            let pipeline = pipeline.clone();
            let first = first.clone();
            tokio::spawn(async move { pipeline.export(first.as_ref(), "Jane Doe").await })
        };
        first.started.notified().await;
        assert!(pipeline.is_exporting());

        let second = GatedSurface::new(false, false);
        let outcome = pipeline.export(&second, "Jane Doe").await.unwrap();
        assert!(matches!(outcome, ExportOutcome::Suppressed));
        assert_eq!(second.captures.load(Ordering::SeqCst), 0);

        first.release.notify_one();
        let outcome = task.await.unwrap().unwrap();
        assert!(matches!(outcome, ExportOutcome::Completed(_)));
        assert!(!pipeline.is_exporting());
    }

    #[tokio::test]
    async fn test_failed_capture_writes_nothing_and_releases_guard() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline(&dir);

        let failing = GatedSurface::new(false, true);
        let err = pipeline.export(&failing, "Jane Doe").await.unwrap_err();
        assert!(matches!(err, ExportError::Capture(_)));
        assert!(!pipeline.is_exporting());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

        let working = GatedSurface::new(false, false);
        let outcome = pipeline.export(&working, "Jane Doe").await.unwrap();
        assert!(matches!(outcome, ExportOutcome::Completed(_)));
    }

    /// Writes into a directory but fails every delivery after the first.
    struct FlakySink {
        inner: DirectorySink,
        deliveries: AtomicUsize,
    }

    #[async_trait]
    impl DownloadSink for FlakySink {
        async fn deliver(&self, filename: &str, data: Bytes) -> Result<PathBuf, ExportError> {
            if self.deliveries.fetch_add(1, Ordering::SeqCst) > 0 {
                return Err(ExportError::Delivery("disk full".to_string()));
            }
            self.inner.deliver(filename, data).await
        }

        async fn discard(&self, path: &std::path::Path) -> Result<(), ExportError> {
            self.inner.discard(path).await
        }
    }

    #[tokio::test]
    async fn test_failed_png_delivery_removes_pdf() {
        let dir = TempDir::new().unwrap();
        let sink = Arc::new(FlakySink {
            inner: DirectorySink::new(dir.path()),
            deliveries: AtomicUsize::new(0),
        });
        let pipeline = ExportPipeline::new(sink.clone(), DEFAULT_CAPTURE_SCALE).with_png(true);

        let surface = GatedSurface::new(false, false);
        let err = pipeline.export(&surface, "Jane Doe").await.unwrap_err();
        assert!(matches!(err, ExportError::Delivery(_)));
        assert_eq!(sink.deliveries.load(Ordering::SeqCst), 2);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        assert!(!pipeline.is_exporting());
    }

    #[tokio::test]
    async fn test_empty_capture_is_an_assembly_error() {
        struct EmptySurface;

        #[async_trait]
        impl RenderSurface for EmptySurface {
            async fn capture(&self, _scale: f32) -> Result<RasterImage, ExportError> {
                Ok(RasterImage::new(0, 0, Color::WHITE))
            }
        }

        let dir = TempDir::new().unwrap();
        let err = pipeline(&dir).export(&EmptySurface, "Jane").await.unwrap_err();
        assert!(matches!(err, ExportError::Assembly(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
