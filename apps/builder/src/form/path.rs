use std::fmt;
use std::str::FromStr;

use crate::errors::AppError;
use crate::models::resume::ListName;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonalField {
    FullName,
    Email,
    Phone,
    Location,
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperienceField {
    Company,
    Position,
    StartDate,
    EndDate,
    Description,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EducationField {
    Institution,
    Degree,
    FieldOfStudy,
    GraduationYear,
}

/// Address of one string in the draft document.
///
/// Textual form: `personalInfo.fullName`, `experience.0.company`,
/// `education.1.fieldOfStudy`, `skills.2`. Segment names are matched
/// case-insensitively and underscores are ignored, so `personal_info.full_name`
/// is accepted as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPath {
    Personal(PersonalField),
    Experience { index: usize, field: ExperienceField },
    Education { index: usize, field: EducationField },
    Skill(usize),
}

impl FieldPath {
    /// The list this path indexes into, if any.
    pub fn list(&self) -> Option<(ListName, usize)> {
        match self {
            FieldPath::Personal(_) => None,
            FieldPath::Experience { index, .. } => Some((ListName::Experience, *index)),
            FieldPath::Education { index, .. } => Some((ListName::Education, *index)),
            FieldPath::Skill(index) => Some((ListName::Skills, *index)),
        }
    }
}

fn normalize(segment: &str) -> String {
    segment
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

fn parse_index(raw: Option<&str>, path: &str) -> Result<usize, AppError> {
    raw.and_then(|s| s.parse::<usize>().ok())
        .ok_or_else(|| AppError::InvalidPath(path.to_string()))
}

impl FromStr for FieldPath {
    type Err = AppError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::InvalidPath(path.to_string());
        let mut segments = path.trim().split('.');
        let head = segments.next().map(normalize).unwrap_or_default();

        let parsed = match head.as_str() {
            "personalinfo" | "personal" => {
                let field = match segments.next().map(normalize).as_deref() {
                    Some("fullname") | Some("name") => PersonalField::FullName,
                    Some("email") => PersonalField::Email,
                    Some("phone") => PersonalField::Phone,
                    Some("location") => PersonalField::Location,
                    Some("summary") => PersonalField::Summary,
                    _ => return Err(invalid()),
                };
                FieldPath::Personal(field)
            }
            "experience" => {
                let index = parse_index(segments.next(), path)?;
                let field = match segments.next().map(normalize).as_deref() {
                    Some("company") => ExperienceField::Company,
                    Some("position") => ExperienceField::Position,
                    Some("startdate") => ExperienceField::StartDate,
                    Some("enddate") => ExperienceField::EndDate,
                    Some("description") => ExperienceField::Description,
                    _ => return Err(invalid()),
                };
                FieldPath::Experience { index, field }
            }
            "education" => {
                let index = parse_index(segments.next(), path)?;
                let field = match segments.next().map(normalize).as_deref() {
                    Some("institution") => EducationField::Institution,
                    Some("degree") => EducationField::Degree,
                    Some("fieldofstudy") => EducationField::FieldOfStudy,
                    Some("graduationyear") => EducationField::GraduationYear,
                    _ => return Err(invalid()),
                };
                FieldPath::Education { index, field }
            }
            "skills" => FieldPath::Skill(parse_index(segments.next(), path)?),
            _ => return Err(invalid()),
        };

        if segments.next().is_some() {
            return Err(invalid());
        }
        Ok(parsed)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::Personal(field) => {
                let name = match field {
                    PersonalField::FullName => "fullName",
                    PersonalField::Email => "email",
                    PersonalField::Phone => "phone",
                    PersonalField::Location => "location",
                    PersonalField::Summary => "summary",
                };
                write!(f, "personalInfo.{name}")
            }
            FieldPath::Experience { index, field } => {
                let name = match field {
                    ExperienceField::Company => "company",
                    ExperienceField::Position => "position",
                    ExperienceField::StartDate => "startDate",
                    ExperienceField::EndDate => "endDate",
                    ExperienceField::Description => "description",
                };
                write!(f, "experience.{index}.{name}")
            }
            FieldPath::Education { index, field } => {
                let name = match field {
                    EducationField::Institution => "institution",
                    EducationField::Degree => "degree",
                    EducationField::FieldOfStudy => "fieldOfStudy",
                    EducationField::GraduationYear => "graduationYear",
                };
                write!(f, "education.{index}.{name}")
            }
            FieldPath::Skill(index) => write!(f, "skills.{index}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_personal_paths() {
        assert_eq!(
            "personalInfo.fullName".parse::<FieldPath>().unwrap(),
            FieldPath::Personal(PersonalField::FullName)
        );
        assert_eq!(
            "personal_info.full_name".parse::<FieldPath>().unwrap(),
            FieldPath::Personal(PersonalField::FullName)
        );
        assert_eq!(
            "personalInfo.email".parse::<FieldPath>().unwrap(),
            FieldPath::Personal(PersonalField::Email)
        );
    }

    #[test]
    fn test_parse_list_paths() {
        assert_eq!(
            "experience.2.startDate".parse::<FieldPath>().unwrap(),
            FieldPath::Experience {
                index: 2,
                field: ExperienceField::StartDate
            }
        );
        assert_eq!(
            "education.0.fieldOfStudy".parse::<FieldPath>().unwrap(),
            FieldPath::Education {
                index: 0,
                field: EducationField::FieldOfStudy
            }
        );
        assert_eq!("skills.3".parse::<FieldPath>().unwrap(), FieldPath::Skill(3));
    }

    #[test]
    fn test_reject_bad_paths() {
        for bad in [
            "",
            "personalInfo",
            "personalInfo.age",
            "experience.company",
            "experience.-1.company",
            "skills",
            "skills.0.name",
            "projects.0.title",
        ] {
            assert!(
                matches!(bad.parse::<FieldPath>(), Err(AppError::InvalidPath(_))),
                "expected '{bad}' to be rejected"
            );
        }
    }

    #[test]
    fn test_display_uses_camel_case() {
        let path: FieldPath = "education.1.graduation_year".parse().unwrap();
        assert_eq!(path.to_string(), "education.1.graduationYear");
        assert_eq!(path.list(), Some((ListName::Education, 1)));
        assert_eq!(
            FieldPath::Personal(PersonalField::Summary).list(),
            None
        );
    }
}
