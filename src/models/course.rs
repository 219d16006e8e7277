use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::ValidationError;

/// Value stored when a course has no prerequisites
pub const NO_PREREQUISITES: &str = "None";

/// Fields a submission must carry, in form order
pub const REQUIRED_FIELDS: [&str; 8] = [
    "code",
    "name",
    "instructor",
    "semester",
    "schedule",
    "classroom",
    "grading",
    "description",
];

/// A catalog entry. Values are free text and never validated beyond presence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Lookup key; uniqueness is not enforced
    pub code: String,
    pub name: String,
    pub instructor: String,
    pub semester: String,
    pub schedule: String,
    pub classroom: String,
    #[serde(default = "default_prerequisites")]
    pub prerequisites: String,
    pub grading: String,
    pub description: String,
}

fn default_prerequisites() -> String {
    NO_PREREQUISITES.to_string()
}

impl Course {
    /// Build a course from submitted form fields
    ///
    /// A field is missing only when absent from the submission; empty values
    /// are accepted as-is.
    pub fn from_form(form: &HashMap<String, String>) -> Result<Self, ValidationError> {
        let field = |name: &'static str| {
            form.get(name)
                .cloned()
                .ok_or(ValidationError::MissingField(name))
        };

        Ok(Self {
            code: field("code")?,
            name: field("name")?,
            instructor: field("instructor")?,
            semester: field("semester")?,
            schedule: field("schedule")?,
            classroom: field("classroom")?,
            prerequisites: form
                .get("prerequisites")
                .cloned()
                .unwrap_or_else(default_prerequisites),
            grading: field("grading")?,
            description: field("description")?,
        })
    }
}

/// First course whose code matches
pub fn find_by_code<'a>(catalog: &'a [Course], code: &str) -> Option<&'a Course> {
    catalog.iter().find(|c| c.code == code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn full_form() -> HashMap<String, String> {
        form(&[
            ("code", "CS101"),
            ("name", "Intro"),
            ("instructor", "A"),
            ("semester", "Fall"),
            ("schedule", "MWF"),
            ("classroom", "R1"),
            ("grading", "A-F"),
            ("description", "d"),
        ])
    }

    #[test]
    fn test_from_form_defaults_prerequisites() {
        let course = Course::from_form(&full_form()).unwrap();
        assert_eq!(course.code, "CS101");
        assert_eq!(course.prerequisites, "None");
    }

    #[test]
    fn test_from_form_keeps_given_prerequisites() {
        let mut f = full_form();
        f.insert("prerequisites".to_string(), "CS100".to_string());

        let course = Course::from_form(&f).unwrap();
        assert_eq!(course.prerequisites, "CS100");
    }

    #[test]
    fn test_from_form_reports_missing_field() {
        for name in REQUIRED_FIELDS {
            let mut f = full_form();
            f.remove(name);
            assert_eq!(
                Course::from_form(&f),
                Err(ValidationError::MissingField(name))
            );
        }
    }

    #[test]
    fn test_from_form_accepts_empty_values() {
        let mut f = full_form();
        f.insert("instructor".to_string(), String::new());

        let course = Course::from_form(&f).unwrap();
        assert_eq!(course.instructor, "");
    }

    #[test]
    fn test_stored_record_without_prerequisites() {
        let json = r#"{"code":"CS1","name":"n","instructor":"i","semester":"s",
            "schedule":"x","classroom":"c","grading":"g","description":"d"}"#;
        let course: Course = serde_json::from_str(json).unwrap();
        assert_eq!(course.prerequisites, "None");
    }

    #[test]
    fn test_find_by_code_returns_first_match() {
        let mut first = Course::from_form(&full_form()).unwrap();
        first.name = "First".to_string();
        let mut second = first.clone();
        second.name = "Second".to_string();
        let catalog = vec![first, second];

        assert_eq!(find_by_code(&catalog, "CS101").map(|c| c.name.as_str()), Some("First"));
        assert!(find_by_code(&catalog, "ZZZ").is_none());
    }
}
