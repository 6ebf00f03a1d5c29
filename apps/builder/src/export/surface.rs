//! Renderable surfaces the export pipeline can capture.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::export::ExportError;
use crate::layout::{rasterize, FontSet, RasterImage};
use crate::render::VisualTree;

/// Something that can be captured as a raster image. The pipeline knows nothing
/// about what is drawn.
#[async_trait]
pub trait RenderSurface: Send + Sync {
    async fn capture(&self, scale: f32) -> Result<RasterImage, ExportError>;
}

/// A rendered template painted by the raster layout.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    tree: Arc<VisualTree>,
    fonts: FontSet,
}

impl RasterSurface {
    pub fn new(tree: VisualTree, fonts: FontSet) -> Self {
        Self {
            tree: Arc::new(tree),
            fonts,
        }
    }
}

#[async_trait]
impl RenderSurface for RasterSurface {
    async fn capture(&self, scale: f32) -> Result<RasterImage, ExportError> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(ExportError::Capture(format!("invalid capture scale {scale}")));
        }
        let tree = self.tree.clone();
        let fonts = self.fonts.clone();

        // Painting is CPU-bound; keep it off the async workers.
        let image = tokio::task::spawn_blocking(move || {
            rasterize(&tree, fonts.face(tree.font), scale)
        })
        .await
        .map_err(|e| ExportError::Capture(format!("paint task failed: {e}")))?;

        debug!(
            width = image.width(),
            height = image.height(),
            scale,
            "Surface captured"
        );
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::ResumeDocument;
    use crate::render::{render_template, TemplateId};

    fn surface() -> RasterSurface {
        let mut doc = ResumeDocument::default();
        doc.personal_info.full_name = "Jane Doe".to_string();
        RasterSurface::new(render_template(&doc, TemplateId::Technical), FontSet::blocks())
    }

    #[tokio::test]
    async fn test_capture_at_double_scale() {
        let image = surface().capture(2.0).await.unwrap();
        assert_eq!(image.width(), 1600);
        assert!(image.height() > 0);
    }

    #[tokio::test]
    async fn test_capture_rejects_bad_scale() {
        assert!(matches!(
            surface().capture(0.0).await,
            Err(ExportError::Capture(_))
        ));
    }
}
