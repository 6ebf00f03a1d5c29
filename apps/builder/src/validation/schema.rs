use std::sync::OnceLock;

use regex::Regex;

use crate::models::resume::{EducationEntry, ExperienceEntry, PersonalInfo, ResumeDocument};
use crate::steps::Step;
use crate::validation::ValidationErrors;

/// A single constraint on a string field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// At least N characters (Unicode scalar values, not bytes).
    MinChars(usize),
    /// Standard `local@domain.tld` address.
    Email,
}

impl Rule {
    pub fn check(&self, value: &str) -> bool {
        match self {
            Rule::MinChars(n) => value.chars().count() >= *n,
            Rule::Email => is_valid_email(value),
        }
    }
}

/// Binds a rule and its message to one field of `T`.
pub struct FieldRule<T> {
    pub field: &'static str,
    pub get: fn(&T) -> &str,
    pub rule: Rule,
    pub message: &'static str,
}

const PERSONAL_RULES: &[FieldRule<PersonalInfo>] = &[
    FieldRule {
        field: "fullName",
        get: |p| &p.full_name,
        rule: Rule::MinChars(2),
        message: "Name is required",
    },
    FieldRule {
        field: "email",
        get: |p| &p.email,
        rule: Rule::Email,
        message: "Invalid email address",
    },
    FieldRule {
        field: "phone",
        get: |p| &p.phone,
        rule: Rule::MinChars(10),
        message: "Valid phone number is required",
    },
    FieldRule {
        field: "location",
        get: |p| &p.location,
        rule: Rule::MinChars(2),
        message: "Location is required",
    },
    FieldRule {
        field: "summary",
        get: |p| &p.summary,
        rule: Rule::MinChars(10),
        message: "Summary is required",
    },
];

const EXPERIENCE_RULES: &[FieldRule<ExperienceEntry>] = &[
    FieldRule {
        field: "company",
        get: |e| &e.company,
        rule: Rule::MinChars(1),
        message: "Company name is required",
    },
    FieldRule {
        field: "position",
        get: |e| &e.position,
        rule: Rule::MinChars(1),
        message: "Position is required",
    },
    FieldRule {
        field: "startDate",
        get: |e| &e.start_date,
        rule: Rule::MinChars(1),
        message: "Start date is required",
    },
    FieldRule {
        field: "endDate",
        get: |e| &e.end_date,
        rule: Rule::MinChars(1),
        message: "End date is required",
    },
    FieldRule {
        field: "description",
        get: |e| &e.description,
        rule: Rule::MinChars(1),
        message: "Description is required",
    },
];

const EDUCATION_RULES: &[FieldRule<EducationEntry>] = &[
    FieldRule {
        field: "institution",
        get: |e| &e.institution,
        rule: Rule::MinChars(1),
        message: "Institution name is required",
    },
    FieldRule {
        field: "degree",
        get: |e| &e.degree,
        rule: Rule::MinChars(1),
        message: "Degree is required",
    },
    FieldRule {
        field: "fieldOfStudy",
        get: |e| &e.field_of_study,
        rule: Rule::MinChars(1),
        message: "Field of study is required",
    },
    FieldRule {
        field: "graduationYear",
        get: |e| &e.graduation_year,
        rule: Rule::MinChars(1),
        message: "Graduation year is required",
    },
];

const EXPERIENCE_MIN_MESSAGE: &str = "At least one experience entry is required";
const EDUCATION_MIN_MESSAGE: &str = "At least one education entry is required";
const SKILLS_MIN_MESSAGE: &str = "At least one skill is required";
const SKILL_EMPTY_MESSAGE: &str = "Skill cannot be empty";

/// The résumé form's rule set.
///
/// With `strict_skills` off, skills are only checked for list length; individual
/// blank skills pass. With it on, every skill must be non-empty as well.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationSchema {
    pub strict_skills: bool,
}

impl ValidationSchema {
    pub fn new(strict_skills: bool) -> Self {
        Self { strict_skills }
    }

    /// Runs every rule against the document.
    pub fn validate(&self, doc: &ResumeDocument) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        self.check_personal(doc, &mut errors);
        self.check_experience(doc, &mut errors);
        self.check_education(doc, &mut errors);
        self.check_skills(doc, &mut errors);
        errors
    }

    /// Runs only the rules for the fields shown on `step`.
    pub fn validate_step(&self, doc: &ResumeDocument, step: Step) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        match step {
            Step::Personal => self.check_personal(doc, &mut errors),
            Step::Experience => self.check_experience(doc, &mut errors),
            Step::Education => {
                self.check_education(doc, &mut errors);
                self.check_skills(doc, &mut errors);
            }
            Step::Preview => {}
        }
        errors
    }

    fn check_personal(&self, doc: &ResumeDocument, errors: &mut ValidationErrors) {
        apply_rules("personalInfo", &doc.personal_info, PERSONAL_RULES, errors);
    }

    fn check_experience(&self, doc: &ResumeDocument, errors: &mut ValidationErrors) {
        if doc.experience.is_empty() {
            errors.insert("experience", EXPERIENCE_MIN_MESSAGE);
        }
        for (i, entry) in doc.experience.iter().enumerate() {
            apply_rules(&format!("experience.{i}"), entry, EXPERIENCE_RULES, errors);
        }
    }

    fn check_education(&self, doc: &ResumeDocument, errors: &mut ValidationErrors) {
        if doc.education.is_empty() {
            errors.insert("education", EDUCATION_MIN_MESSAGE);
        }
        for (i, entry) in doc.education.iter().enumerate() {
            apply_rules(&format!("education.{i}"), entry, EDUCATION_RULES, errors);
        }
    }

    fn check_skills(&self, doc: &ResumeDocument, errors: &mut ValidationErrors) {
        if doc.skills.is_empty() {
            errors.insert("skills", SKILLS_MIN_MESSAGE);
        }
        if self.strict_skills {
            for (i, skill) in doc.skills.iter().enumerate() {
                if skill.trim().is_empty() {
                    errors.insert(format!("skills.{i}"), SKILL_EMPTY_MESSAGE);
                }
            }
        }
    }
}

fn apply_rules<T>(prefix: &str, target: &T, rules: &[FieldRule<T>], errors: &mut ValidationErrors) {
    for rule in rules {
        if !rule.rule.check((rule.get)(target)) {
            errors.insert(format!("{prefix}.{}", rule.field), rule.message);
        }
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"(?i)^[a-z0-9_'+\-.]*[a-z0-9_+\-]@([a-z0-9][a-z0-9\-]*\.)+[a-z]{2,}$")
            .expect("email pattern is a valid regex")
    })
}

/// Email check in the style of common form libraries:
/// - no leading dot and no consecutive dots in the local part
/// - local part of letters, digits and `_ ' + - .`, not ending in `'` or `.`
/// - dotted domain labels followed by an alphabetic TLD of 2+ letters
pub fn is_valid_email(value: &str) -> bool {
    if value.starts_with('.') || value.contains("..") {
        return false;
    }
    email_regex().is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_document() -> ResumeDocument {
        ResumeDocument {
            personal_info: PersonalInfo {
                full_name: "Jane Doe".to_string(),
                email: "jane@example.com".to_string(),
                phone: "555-123-4567".to_string(),
                location: "Lisbon".to_string(),
                summary: "Backend engineer with a taste for storage systems.".to_string(),
            },
            experience: vec![ExperienceEntry {
                company: "Acme".to_string(),
                position: "Engineer".to_string(),
                start_date: "2019".to_string(),
                end_date: "Present".to_string(),
                description: "Built the billing pipeline.".to_string(),
            }],
            education: vec![EducationEntry {
                institution: "IST".to_string(),
                degree: "BSc".to_string(),
                field_of_study: "Computer Science".to_string(),
                graduation_year: "2018".to_string(),
            }],
            skills: vec!["Rust".to_string()],
        }
    }

    #[test]
    fn test_valid_document_has_no_errors() {
        assert!(ValidationSchema::default().validate(&valid_document()).is_empty());
    }

    #[test]
    fn test_default_document_fails_every_required_field() {
        let errors = ValidationSchema::default().validate(&ResumeDocument::default());
        assert_eq!(errors.get("personalInfo.fullName"), Some("Name is required"));
        assert_eq!(errors.get("personalInfo.email"), Some("Invalid email address"));
        assert!(errors.contains("experience.0.company"));
        assert!(errors.contains("education.0.graduationYear"));
        // 5 personal + 5 experience + 4 education; the blank skill passes.
        assert_eq!(errors.len(), 14);
    }

    #[test]
    fn test_bad_email_flags_only_that_field() {
        let mut doc = valid_document();
        doc.personal_info.email = "not-an-email".to_string();
        let errors = ValidationSchema::default().validate(&doc);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.paths().collect::<Vec<_>>(), vec!["personalInfo.email"]);
    }

    #[test]
    fn test_zero_experience_entries_flags_list_path() {
        let mut doc = valid_document();
        doc.experience.clear();
        let errors = ValidationSchema::default().validate(&doc);
        assert_eq!(
            errors.get("experience"),
            Some("At least one experience entry is required")
        );

        doc.experience.push(valid_document().experience[0].clone());
        assert!(ValidationSchema::default().validate(&doc).is_empty());
    }

    #[test]
    fn test_zero_education_and_skills() {
        let mut doc = valid_document();
        doc.education.clear();
        doc.skills.clear();
        let errors = ValidationSchema::default().validate(&doc);
        assert!(errors.contains("education"));
        assert_eq!(errors.get("skills"), Some("At least one skill is required"));
    }

    #[test]
    fn test_second_entry_errors_are_indexed() {
        let mut doc = valid_document();
        doc.experience.push(ExperienceEntry::default());
        let errors = ValidationSchema::default().validate(&doc);
        assert!(errors.contains("experience.1.position"));
        assert!(!errors.contains("experience.0.position"));
    }

    #[test]
    fn test_blank_skill_passes_by_default() {
        let mut doc = valid_document();
        doc.skills = vec![String::new()];
        assert!(ValidationSchema::default().validate(&doc).is_empty());
    }

    #[test]
    fn test_blank_skill_fails_in_strict_mode() {
        let mut doc = valid_document();
        doc.skills = vec!["Rust".to_string(), "  ".to_string()];
        let errors = ValidationSchema::new(true).validate(&doc);
        assert_eq!(errors.get("skills.1"), Some("Skill cannot be empty"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_min_chars_counts_characters_not_bytes() {
        assert!(Rule::MinChars(2).check("Zoë"));
        assert!(!Rule::MinChars(2).check("é"));
    }

    #[test]
    fn test_phone_length_boundary() {
        let mut doc = valid_document();
        doc.personal_info.phone = "123456789".to_string();
        assert!(ValidationSchema::default().validate(&doc).contains("personalInfo.phone"));
        doc.personal_info.phone = "1234567890".to_string();
        assert!(ValidationSchema::default().validate(&doc).is_empty());
    }

    #[test]
    fn test_step_scoped_validation() {
        let doc = ResumeDocument::default();
        let schema = ValidationSchema::default();

        let personal = schema.validate_step(&doc, Step::Personal);
        assert!(personal.paths().all(|p| p.starts_with("personalInfo.")));
        assert_eq!(personal.len(), 5);

        let experience = schema.validate_step(&doc, Step::Experience);
        assert!(experience.paths().all(|p| p.starts_with("experience")));

        let education = schema.validate_step(&doc, Step::Education);
        assert!(education.paths().all(|p| p.starts_with("education")));

        assert!(schema.validate_step(&doc, Step::Preview).is_empty());
    }

    #[test]
    fn test_email_accepts_common_addresses() {
        assert!(is_valid_email("jane@example.com"));
        assert!(is_valid_email("jane.doe+cv@mail.example.co.uk"));
        assert!(is_valid_email("o'neil@example.ie"));
        assert!(is_valid_email("JANE@EXAMPLE.COM"));
    }

    #[test]
    fn test_email_rejects_malformed_addresses() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("jane@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email(".jane@example.com"));
        assert!(!is_valid_email("jane..doe@example.com"));
        assert!(!is_valid_email("jane.@example.com"));
        assert!(!is_valid_email("jane@example"));
        assert!(!is_valid_email("jane@example.c"));
        assert!(!is_valid_email("jane doe@example.com"));
    }
}
