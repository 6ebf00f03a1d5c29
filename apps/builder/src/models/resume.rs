use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Contact block and summary shown at the top of every template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonalInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExperienceEntry {
    pub company: String,
    pub position: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EducationEntry {
    pub institution: String,
    pub degree: String,
    pub field_of_study: String,
    pub graduation_year: String,
}

/// The draft résumé held by the form store for one editing session.
///
/// Every field carries `#[serde(default)]` so that a snapshot missing a
/// sub-object still deserializes; the list floor is re-established by
/// [`ResumeDocument::ensure_list_floor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResumeDocument {
    pub personal_info: PersonalInfo,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub skills: Vec<String>,
}

impl Default for ResumeDocument {
    fn default() -> Self {
        Self {
            personal_info: PersonalInfo::default(),
            experience: vec![ExperienceEntry::default()],
            education: vec![EducationEntry::default()],
            skills: vec![String::new()],
        }
    }
}

impl ResumeDocument {
    /// Pads every empty list with one default item. Returns true if anything changed.
    pub fn ensure_list_floor(&mut self) -> bool {
        let mut changed = false;
        if self.experience.is_empty() {
            self.experience.push(ExperienceEntry::default());
            changed = true;
        }
        if self.education.is_empty() {
            self.education.push(EducationEntry::default());
            changed = true;
        }
        if self.skills.is_empty() {
            self.skills.push(String::new());
            changed = true;
        }
        changed
    }

    pub fn list_len(&self, list: ListName) -> usize {
        match list {
            ListName::Experience => self.experience.len(),
            ListName::Education => self.education.len(),
            ListName::Skills => self.skills.len(),
        }
    }

    /// Position of the first experience entry, used as a tagline by some templates.
    pub fn headline(&self) -> &str {
        self.experience
            .first()
            .map(|e| e.position.as_str())
            .filter(|p| !p.is_empty())
            .unwrap_or("Professional")
    }
}

/// The three repeatable sections of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListName {
    Experience,
    Education,
    Skills,
}

impl ListName {
    pub const ALL: [ListName; 3] = [ListName::Experience, ListName::Education, ListName::Skills];

    pub fn as_str(&self) -> &'static str {
        match self {
            ListName::Experience => "experience",
            ListName::Education => "education",
            ListName::Skills => "skills",
        }
    }
}

impl fmt::Display for ListName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "experience" => Ok(ListName::Experience),
            "education" => Ok(ListName::Education),
            "skills" | "skill" => Ok(ListName::Skills),
            other => Err(format!(
                "unknown list '{other}' (expected experience, education or skills)"
            )),
        }
    }
}
