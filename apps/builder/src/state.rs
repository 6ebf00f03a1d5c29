use tracing::{info, warn};

use crate::config::Config;
use crate::export::{ExportError, ExportPipeline, RasterSurface};
use crate::form::FormStore;
use crate::layout::FontSet;
use crate::render::{render_template, TemplateId, VisualTree};
use crate::snapshot::SnapshotStore;
use crate::steps::StepController;
use crate::validation::{ValidationErrors, ValidationSchema};

/// Everything one editing session owns. Commands borrow it mutably one at a time;
/// only the export pipeline is shared with background tasks.
pub struct AppState {
    pub config: Config,
    pub form: FormStore,
    pub steps: StepController,
    pub snapshots: SnapshotStore,
    pub schema: ValidationSchema,
    pub template: TemplateId,
    pub exporter: ExportPipeline,
    /// `None` when no usable font was found; exports then fail with a capture error.
    pub fonts: Option<FontSet>,
    /// Errors from the last blocked advance or submit, shown inline until fixed.
    pub field_errors: ValidationErrors,
}

impl AppState {
    /// Builds the session, rehydrating the draft from the snapshot store when a
    /// readable snapshot exists.
    pub fn new(
        config: Config,
        snapshots: SnapshotStore,
        exporter: ExportPipeline,
        fonts: Option<FontSet>,
        template: TemplateId,
    ) -> Self {
        let mut form = FormStore::new();
        match snapshots.load() {
            Some(doc) => {
                info!(
                    name = %doc.personal_info.full_name,
                    experience = doc.experience.len(),
                    education = doc.education.len(),
                    "Restored saved resume"
                );
                form.reset_document(doc);
            }
            None => info!("Starting from a blank resume"),
        }

        let schema = ValidationSchema::new(config.strict_skills);
        Self {
            config,
            form,
            steps: StepController::new(),
            snapshots,
            schema,
            template,
            exporter,
            fonts,
            field_errors: ValidationErrors::new(),
        }
    }

    /// Loads fonts for the configured override path or the system, logging instead
    /// of failing so a session can still edit and preview without fonts.
    pub fn load_fonts(config: &Config) -> Option<FontSet> {
        match FontSet::system(config.font_path.as_ref()) {
            Ok(fonts) => Some(fonts),
            Err(e) => {
                warn!(error = %e, "No usable font, PDF export is unavailable");
                None
            }
        }
    }

    pub fn render(&self) -> VisualTree {
        render_template(self.form.document(), self.template)
    }

    /// The current draft rendered with the selected template, ready to capture.
    pub fn surface(&self) -> Result<RasterSurface, ExportError> {
        let fonts = self.fonts.clone().ok_or_else(|| {
            ExportError::Capture("no usable font; set RESUME_FONT_PATH".to_string())
        })?;
        Ok(RasterSurface::new(self.render(), fonts))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::PathBuf;
    use std::sync::Arc;

    use super::*;
    use crate::export::DirectorySink;
    use crate::snapshot::{MemoryStorage, StoragePort};

    pub fn test_config(export_dir: PathBuf) -> Config {
        Config {
            storage_dir: PathBuf::from("unused"),
            export_dir,
            font_path: None,
            capture_scale: 1.0,
            strict_skills: false,
            rust_log: "info".to_string(),
        }
    }

    pub fn test_state_with(storage: Box<dyn StoragePort>, export_dir: PathBuf) -> AppState {
        let config = test_config(export_dir.clone());
        let exporter = ExportPipeline::new(
            Arc::new(DirectorySink::new(export_dir)),
            config.capture_scale,
        );
        AppState::new(
            config,
            SnapshotStore::new(storage),
            exporter,
            Some(FontSet::blocks()),
            TemplateId::default(),
        )
    }

    pub fn test_state(export_dir: PathBuf) -> AppState {
        test_state_with(Box::new(MemoryStorage::new()), export_dir)
    }
}
