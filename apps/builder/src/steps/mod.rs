//! Step Controller — which of the four form steps is visible.
//!
//! # Navigation rules
//! - `select` (the tab strip) moves anywhere, including straight to `Preview`,
//!   without validating.
//! - `next` validates the fields of the current step and only advances when they
//!   pass. From `Education` it behaves like `submit`.
//! - `submit` ("Save and Preview") validates the whole document, persists it,
//!   then shows `Preview`. Nothing is persisted when validation fails.
//! - `back` moves one step towards `Personal`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::AppError;
use crate::models::resume::ResumeDocument;
use crate::snapshot::SnapshotStore;
use crate::validation::ValidationSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    Personal,
    Experience,
    Education,
    Preview,
}

impl Step {
    pub const ALL: [Step; 4] = [Step::Personal, Step::Experience, Step::Education, Step::Preview];

    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Personal => "personal",
            Step::Experience => "experience",
            Step::Education => "education",
            Step::Preview => "preview",
        }
    }

    /// Tab label as shown in the step strip.
    pub fn label(&self) -> &'static str {
        match self {
            Step::Personal => "Personal Info",
            Step::Experience => "Experience",
            Step::Education => "Education & Skills",
            Step::Preview => "Preview",
        }
    }

    fn following(&self) -> Option<Step> {
        match self {
            Step::Personal => Some(Step::Experience),
            Step::Experience => Some(Step::Education),
            Step::Education => Some(Step::Preview),
            Step::Preview => None,
        }
    }

    fn preceding(&self) -> Option<Step> {
        match self {
            Step::Personal => None,
            Step::Experience => Some(Step::Personal),
            Step::Education => Some(Step::Experience),
            Step::Preview => Some(Step::Education),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "personal" | "personal-info" => Ok(Step::Personal),
            "experience" | "work" => Ok(Step::Experience),
            "education" | "skills" => Ok(Step::Education),
            "preview" => Ok(Step::Preview),
            other => Err(format!(
                "unknown step '{other}' (expected personal, experience, education or preview)"
            )),
        }
    }
}

/// Result of a forward navigation attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// Moved to the contained step.
    Moved(Step),
    /// Validation blocked the move; the controller stayed put.
    Blocked(crate::validation::ValidationErrors),
    /// Already on the last step.
    Stayed,
}

#[derive(Debug, Clone, Default)]
pub struct StepController {
    current: Step,
}

impl StepController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Step {
        self.current
    }

    /// Tab selection. Never gated.
    pub fn select(&mut self, step: Step) {
        debug!(from = %self.current, to = %step, "Tab selected");
        self.current = step;
    }

    pub fn back(&mut self) -> Step {
        if let Some(prev) = self.current.preceding() {
            self.current = prev;
        }
        self.current
    }

    /// Validates the current step's fields, then advances. From `Education` the
    /// move into `Preview` goes through [`StepController::submit`].
    pub fn next(
        &mut self,
        doc: &ResumeDocument,
        schema: &ValidationSchema,
        snapshots: &SnapshotStore,
    ) -> Result<Advance, AppError> {
        if self.current == Step::Education {
            return match self.submit(doc, schema, snapshots) {
                Ok(step) => Ok(Advance::Moved(step)),
                Err(AppError::Validation(errors)) => Ok(Advance::Blocked(errors)),
                Err(e) => Err(e),
            };
        }

        let Some(target) = self.current.following() else {
            return Ok(Advance::Stayed);
        };

        let errors = schema.validate_step(doc, self.current);
        if !errors.is_empty() {
            debug!(step = %self.current, errors = errors.len(), "Step advance blocked");
            return Ok(Advance::Blocked(errors));
        }

        self.current = target;
        Ok(Advance::Moved(target))
    }

    /// Full-document validation, snapshot save, then `Preview`.
    pub fn submit(
        &mut self,
        doc: &ResumeDocument,
        schema: &ValidationSchema,
        snapshots: &SnapshotStore,
    ) -> Result<Step, AppError> {
        schema
            .validate(doc)
            .into_result()
            .map_err(AppError::Validation)?;

        snapshots.save(doc)?;
        info!(name = %doc.personal_info.full_name, "Resume submitted");
        self.current = Step::Preview;
        Ok(self.current)
    }
}
