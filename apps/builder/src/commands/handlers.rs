use anyhow::Context;
use tracing::{error, info};

use crate::commands::{Effect, ExportJob, Notice, Reply};
use crate::errors::AppError;
use crate::export::{ExportError, ExportOutcome};
use crate::form::Removal;
use crate::models::resume::{ListName, ResumeDocument};
use crate::render::TemplateId;
use crate::state::AppState;
use crate::steps::{Advance, Step};
use crate::validation::ValidationErrors;

const PERSONAL_FIELDS: [&str; 5] = ["fullName", "email", "phone", "location", "summary"];
const EXPERIENCE_FIELDS: [&str; 5] = ["company", "position", "startDate", "endDate", "description"];
const EDUCATION_FIELDS: [&str; 4] = ["institution", "degree", "fieldOfStudy", "graduationYear"];

fn error_lines(errors: &ValidationErrors) -> Vec<String> {
    errors
        .iter()
        .map(|(path, message)| format!("  ! {path}: {message}"))
        .collect()
}

/// Paths of every field shown on `step`, in display order.
fn step_paths(doc: &ResumeDocument, step: Step) -> Vec<String> {
    match step {
        Step::Personal => PERSONAL_FIELDS
            .iter()
            .map(|f| format!("personalInfo.{f}"))
            .collect(),
        Step::Experience => (0..doc.experience.len())
            .flat_map(|i| EXPERIENCE_FIELDS.iter().map(move |f| format!("experience.{i}.{f}")))
            .collect(),
        Step::Education => (0..doc.education.len())
            .flat_map(|i| EDUCATION_FIELDS.iter().map(move |f| format!("education.{i}.{f}")))
            .chain((0..doc.skills.len()).map(|i| format!("skills.{i}")))
            .collect(),
        Step::Preview => Vec::new(),
    }
}

fn step_strip(current: Step) -> String {
    Step::ALL
        .iter()
        .map(|s| {
            if *s == current {
                format!("[{}]", s.label())
            } else {
                s.label().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

/// Keeps only errors that still apply after an edit, without surfacing new ones.
fn refresh_errors(state: &mut AppState) {
    if state.field_errors.is_empty() {
        return;
    }
    let current = state.schema.validate(state.form.document());
    let mut kept = ValidationErrors::new();
    for (path, message) in current.iter() {
        if state.field_errors.contains(path) {
            kept.insert(path, message);
        }
    }
    state.field_errors = kept;
}

/// show — the draft as pretty JSON.
pub fn handle_show(state: &AppState) -> Result<Reply, AppError> {
    let json = serde_json::to_string_pretty(state.form.document())
        .context("Failed to serialize the draft")?;
    Ok(Reply::lines(json.lines().map(str::to_string).collect()))
}

/// step — the step strip plus the current step's fields and inline errors.
pub fn handle_step(state: &AppState) -> Reply {
    let step = state.steps.current();
    let mut lines = vec![step_strip(step)];

    if step == Step::Preview {
        lines.push(format!("Template: {}", state.template));
        lines.extend(state.render().to_outline().lines().map(str::to_string));
        return Reply::lines(lines);
    }

    let doc = state.form.document();
    for path in step_paths(doc, step) {
        let value = state.form.get_field(&path).unwrap_or_default();
        lines.push(format!("  {path} = {value:?}"));
        if let Some(message) = state.field_errors.get(&path) {
            lines.push(format!("    ! {message}"));
        }
    }
    Reply::lines(lines)
}

/// tab <step> — ungated jump.
pub fn handle_tab(state: &mut AppState, step: Step) -> Reply {
    state.steps.select(step);
    handle_step(state)
}

/// next — validate the current step, then advance. From education this submits.
pub fn handle_next(state: &mut AppState) -> Result<Reply, AppError> {
    let from = state.steps.current();
    let advance = state
        .steps
        .next(state.form.document(), &state.schema, &state.snapshots)?;

    match advance {
        Advance::Moved(step) if from == Step::Education && step == Step::Preview => {
            state.form.mark_saved();
            state.field_errors = ValidationErrors::new();
            Ok(handle_step(state).with_notice(Notice::SUBMITTED))
        }
        Advance::Moved(_) => {
            refresh_errors(state);
            Ok(handle_step(state))
        }
        Advance::Blocked(errors) => {
            let mut lines = vec![format!(
                "Please fix {} field(s) before continuing:",
                errors.len()
            )];
            lines.extend(error_lines(&errors));
            state.field_errors = errors;
            Ok(Reply::lines(lines))
        }
        Advance::Stayed => Ok(Reply::line("Already on the last step")),
    }
}

/// back — previous step.
pub fn handle_back(state: &mut AppState) -> Reply {
    state.steps.back();
    handle_step(state)
}

/// set <path> <value> — edit one field.
pub fn handle_set(state: &mut AppState, path: &str, value: String) -> Result<Reply, AppError> {
    state.form.set_field(path, value)?;
    refresh_errors(state);
    let stored = state.form.get_field(path)?;
    let mut lines = vec![format!("{path} = {stored:?}")];
    if let Some(message) = state.field_errors.get(path) {
        lines.push(format!("  ! {message}"));
    }
    Ok(Reply::lines(lines))
}

/// add <list> — append a blank entry.
pub fn handle_add(state: &mut AppState, list: ListName) -> Reply {
    let len = state.form.append_list_item(list);
    Reply::line(format!("Added {list}.{} ({len} total)", len - 1))
}

/// remove <list> <index> — drop an entry, never the last one.
pub fn handle_remove(state: &mut AppState, list: ListName, index: usize) -> Result<Reply, AppError> {
    match state.form.remove_list_item(list, index)? {
        Removal::Removed => {
            // Indices shifted; old errors would point at the wrong entries.
            refresh_errors(state);
            let len = state.form.document().list_len(list);
            Ok(Reply::line(format!("Removed {list}.{index} ({len} left)")))
        }
        Removal::KeptLast => Ok(Reply::line(format!(
            "{list} needs at least one entry; nothing removed"
        ))),
    }
}

/// validate — full check without saving or moving.
pub fn handle_validate(state: &mut AppState) -> Reply {
    let errors = state.schema.validate(state.form.document());
    if errors.is_empty() {
        state.field_errors = errors;
        return Reply::line("All fields are valid");
    }
    let mut lines = vec![format!("{} field(s) need attention:", errors.len())];
    lines.extend(error_lines(&errors));
    state.field_errors = errors;
    Reply::lines(lines)
}

/// save — persist the draft as is, valid or not.
pub fn handle_save(state: &mut AppState) -> Result<Reply, AppError> {
    state.snapshots.save(state.form.document())?;
    state.form.mark_saved();
    Ok(Reply::notice(Notice::SAVED))
}

/// submit — validate everything, save, open the preview.
pub fn handle_submit(state: &mut AppState) -> Result<Reply, AppError> {
    match state
        .steps
        .submit(state.form.document(), &state.schema, &state.snapshots)
    {
        Ok(_) => {
            state.form.mark_saved();
            state.field_errors = ValidationErrors::new();
            Ok(handle_step(state).with_notice(Notice::SUBMITTED))
        }
        Err(AppError::Validation(errors)) => {
            let mut lines = vec![format!(
                "Cannot submit, {} field(s) need attention:",
                errors.len()
            )];
            lines.extend(error_lines(&errors));
            state.field_errors = errors;
            Ok(Reply::lines(lines))
        }
        Err(e) => Err(e),
    }
}

/// template [id] — list templates, or select one. Unknown ids fall back to professional.
pub fn handle_template(state: &mut AppState, id: Option<&str>) -> Reply {
    match id {
        None => Reply::lines(template_lines(state.template)),
        Some(id) => {
            let template = TemplateId::resolve(id);
            state.template = template;
            info!(%template, "Template selected");
            if TemplateId::from_id(id).is_some() {
                Reply::line(format!("Template: {template}"))
            } else {
                Reply::line(format!("Unknown template '{id}', using {template}"))
            }
        }
    }
}

pub fn template_lines(current: TemplateId) -> Vec<String> {
    TemplateId::ALL
        .iter()
        .map(|t| {
            let marker = if *t == current { "*" } else { " " };
            format!("{marker} {:<13}{}", t.as_str(), t.description())
        })
        .collect()
}

/// preview — the rendered template as text.
pub fn handle_preview(state: &AppState) -> Reply {
    Reply::lines(state.render().to_outline().lines().map(str::to_string).collect())
}

/// export — hand a capture job to the session loop.
pub fn handle_export(state: &AppState) -> Reply {
    if state.exporter.is_exporting() {
        return Reply::line("A PDF is already being generated");
    }
    match state.surface() {
        Ok(surface) => Reply::notice(Notice::EXPORT_STARTED).with_effect(Effect::Export(ExportJob {
            surface,
            full_name: state.form.document().personal_info.full_name.clone(),
        })),
        Err(e) => {
            error!(error = %e, "Export could not start");
            Reply::notice(Notice::EXPORT_FAILED)
        }
    }
}

/// Reply for a finished background export.
pub fn export_finished(result: Result<ExportOutcome, ExportError>) -> Reply {
    match result {
        Ok(ExportOutcome::Completed(receipt)) => {
            let mut lines = vec![format!("Saved {}", receipt.path.display())];
            if let Some(png) = receipt.png_path {
                lines.push(format!("Saved {}", png.display()));
            }
            Reply::lines(lines).with_notice(Notice::EXPORT_FINISHED)
        }
        Ok(ExportOutcome::Suppressed) => Reply::line("A PDF is already being generated"),
        // The pipeline already logged the cause.
        Err(_) => Reply::notice(Notice::EXPORT_FAILED),
    }
}

/// quit — leave, warning about unsaved edits.
pub fn handle_quit(state: &AppState) -> Reply {
    let reply = if state.form.is_dirty() {
        Reply::line("Unsaved changes were not saved")
    } else {
        Reply::lines(Vec::new())
    };
    reply.with_effect(Effect::Quit)
}
