//! Form State Store — the single owner of the draft document during a session.
//!
//! All operations are synchronous and in-memory. Field values are not checked
//! here; the document may hold empty or invalid strings until validation runs.
//! List removal never takes a list below one item.

pub mod path;

use tracing::debug;

use crate::errors::AppError;
use crate::models::resume::{EducationEntry, ExperienceEntry, ListName, ResumeDocument};

pub use path::{EducationField, ExperienceField, FieldPath, PersonalField};

/// What a list removal did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Removed,
    /// The list had a single item, which was kept.
    KeptLast,
}

#[derive(Debug, Clone, Default)]
pub struct FormStore {
    doc: ResumeDocument,
    dirty: bool,
}

impl FormStore {
    /// A store holding the default (blank) document.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> &ResumeDocument {
        &self.doc
    }

    /// True when the document changed since the last [`FormStore::mark_saved`] or reset.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    pub fn get_field(&self, path: &str) -> Result<&str, AppError> {
        let path: FieldPath = path.parse()?;
        self.get(path)
    }

    pub fn get(&self, path: FieldPath) -> Result<&str, AppError> {
        let doc = &self.doc;
        let value = match path {
            FieldPath::Personal(field) => {
                let p = &doc.personal_info;
                match field {
                    PersonalField::FullName => &p.full_name,
                    PersonalField::Email => &p.email,
                    PersonalField::Phone => &p.phone,
                    PersonalField::Location => &p.location,
                    PersonalField::Summary => &p.summary,
                }
            }
            FieldPath::Experience { index, field } => {
                let e = doc
                    .experience
                    .get(index)
                    .ok_or_else(|| out_of_range(ListName::Experience, index, doc))?;
                match field {
                    ExperienceField::Company => &e.company,
                    ExperienceField::Position => &e.position,
                    ExperienceField::StartDate => &e.start_date,
                    ExperienceField::EndDate => &e.end_date,
                    ExperienceField::Description => &e.description,
                }
            }
            FieldPath::Education { index, field } => {
                let e = doc
                    .education
                    .get(index)
                    .ok_or_else(|| out_of_range(ListName::Education, index, doc))?;
                match field {
                    EducationField::Institution => &e.institution,
                    EducationField::Degree => &e.degree,
                    EducationField::FieldOfStudy => &e.field_of_study,
                    EducationField::GraduationYear => &e.graduation_year,
                }
            }
            FieldPath::Skill(index) => doc
                .skills
                .get(index)
                .ok_or_else(|| out_of_range(ListName::Skills, index, doc))?,
        };
        Ok(value.as_str())
    }

    /// Sets the string at `path` (e.g. `experience.0.company`).
    pub fn set_field(&mut self, path: &str, value: impl Into<String>) -> Result<(), AppError> {
        let path: FieldPath = path.parse()?;
        self.set(path, value)
    }

    pub fn set(&mut self, path: FieldPath, value: impl Into<String>) -> Result<(), AppError> {
        let slot = self.slot_mut(path)?;
        *slot = value.into();
        self.dirty = true;
        debug!(%path, "Field updated");
        Ok(())
    }

    fn slot_mut(&mut self, path: FieldPath) -> Result<&mut String, AppError> {
        if let Some((list, index)) = path.list() {
            let len = self.doc.list_len(list);
            if index >= len {
                return Err(AppError::IndexOutOfRange {
                    list: list.to_string(),
                    index,
                    len,
                });
            }
        }

        let doc = &mut self.doc;
        let slot = match path {
            FieldPath::Personal(field) => {
                let p = &mut doc.personal_info;
                match field {
                    PersonalField::FullName => &mut p.full_name,
                    PersonalField::Email => &mut p.email,
                    PersonalField::Phone => &mut p.phone,
                    PersonalField::Location => &mut p.location,
                    PersonalField::Summary => &mut p.summary,
                }
            }
            FieldPath::Experience { index, field } => {
                let e = &mut doc.experience[index];
                match field {
                    ExperienceField::Company => &mut e.company,
                    ExperienceField::Position => &mut e.position,
                    ExperienceField::StartDate => &mut e.start_date,
                    ExperienceField::EndDate => &mut e.end_date,
                    ExperienceField::Description => &mut e.description,
                }
            }
            FieldPath::Education { index, field } => {
                let e = &mut doc.education[index];
                match field {
                    EducationField::Institution => &mut e.institution,
                    EducationField::Degree => &mut e.degree,
                    EducationField::FieldOfStudy => &mut e.field_of_study,
                    EducationField::GraduationYear => &mut e.graduation_year,
                }
            }
            FieldPath::Skill(index) => &mut doc.skills[index],
        };
        Ok(slot)
    }

    /// Appends the list's blank item and returns the new length.
    pub fn append_list_item(&mut self, list: ListName) -> usize {
        match list {
            ListName::Experience => self.doc.experience.push(ExperienceEntry::default()),
            ListName::Education => self.doc.education.push(EducationEntry::default()),
            ListName::Skills => self.doc.skills.push(String::new()),
        }
        self.dirty = true;
        let len = self.doc.list_len(list);
        debug!(%list, len, "List item appended");
        len
    }

    /// Removes item `index`. A single-item list is left untouched.
    /// The index is checked before the one-item floor, so a bad index is always an error.
    pub fn remove_list_item(&mut self, list: ListName, index: usize) -> Result<Removal, AppError> {
        let len = self.doc.list_len(list);
        if index >= len {
            return Err(AppError::IndexOutOfRange {
                list: list.to_string(),
                index,
                len,
            });
        }
        if len <= 1 {
            debug!(%list, "Refusing to remove the last list item");
            return Ok(Removal::KeptLast);
        }

        match list {
            ListName::Experience => {
                self.doc.experience.remove(index);
            }
            ListName::Education => {
                self.doc.education.remove(index);
            }
            ListName::Skills => {
                self.doc.skills.remove(index);
            }
        }
        self.dirty = true;
        debug!(%list, index, len = len - 1, "List item removed");
        Ok(Removal::Removed)
    }

    /// Replaces the whole draft, e.g. with a rehydrated snapshot.
    pub fn reset_document(&mut self, mut doc: ResumeDocument) {
        doc.ensure_list_floor();
        self.doc = doc;
        self.dirty = false;
    }
}

fn out_of_range(list: ListName, index: usize, doc: &ResumeDocument) -> AppError {
    AppError::IndexOutOfRange {
        list: list.to_string(),
        index,
        len: doc.list_len(list),
    }
}
