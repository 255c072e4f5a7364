use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub const DEFAULT_ACCENT_COLOR: &str = "#3b82f6";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateType {
    #[default]
    Classic,
    Modern,
    Minimal,
    Professional,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    #[serde(deserialize_with = "lenient_string")]
    pub full_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(deserialize_with = "lenient_string")]
    pub location: String,
    #[serde(deserialize_with = "lenient_string")]
    pub profession: String,
    #[serde(deserialize_with = "lenient_string")]
    pub linkedin: String,
    #[serde(deserialize_with = "lenient_string")]
    pub website: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Experience {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub company: String,
    #[serde(deserialize_with = "lenient_string")]
    pub location: String,
    #[serde(deserialize_with = "lenient_string")]
    pub start_date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub end_date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub degree: String,
    #[serde(deserialize_with = "lenient_string")]
    pub institution: String,
    #[serde(deserialize_with = "lenient_string")]
    pub location: String,
    #[serde(deserialize_with = "lenient_string")]
    pub graduation_year: String,
    #[serde(deserialize_with = "lenient_string")]
    pub gpa: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub url: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(deserialize_with = "lenient_string")]
    pub technologies: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Certification {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub issuer: String,
    #[serde(deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub credential_id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Language {
    #[serde(deserialize_with = "lenient_string")]
    pub language: String,
    #[serde(deserialize_with = "lenient_string")]
    pub proficiency: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reference {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub company: String,
    #[serde(deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: String,
}

/// One resume, always fully present: every field has a default, so a
/// snapshot missing `languages` (or anything else) reads it as empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeDocument {
    pub personal_info: PersonalInfo,
    pub summary: String,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub certifications: Vec<Certification>,
    pub languages: Vec<Language>,
    pub interests: Vec<String>,
    pub references: Vec<Reference>,
    pub references_available: bool,
    pub skills: Vec<String>,
    pub projects: Vec<Project>,
    pub target_industry: String,
    pub template: TemplateType,
    pub accent_color: String,
}

impl Default for ResumeDocument {
    fn default() -> Self {
        Self {
            personal_info: PersonalInfo::default(),
            summary: String::new(),
            experience: Vec::new(),
            education: Vec::new(),
            certifications: Vec::new(),
            languages: Vec::new(),
            interests: Vec::new(),
            references: Vec::new(),
            references_available: false,
            skills: Vec::new(),
            projects: Vec::new(),
            target_industry: String::new(),
            template: TemplateType::default(),
            accent_color: DEFAULT_ACCENT_COLOR.to_string(),
        }
    }
}

impl ResumeDocument {
    /// Gives every experience, education and project entry an id if it has none.
    pub fn assign_missing_ids(&mut self) {
        assign_ids(&mut self.experience);
        assign_ids(&mut self.education);
        assign_ids(&mut self.projects);
    }
}

/// Entries that carry a locally-unique id.
pub trait Identified {
    fn id_mut(&mut self) -> &mut String;

    fn ensure_id(&mut self) {
        let id = self.id_mut();
        if id.trim().is_empty() {
            *id = new_entry_id();
        }
    }
}

impl Identified for Experience {
    fn id_mut(&mut self) -> &mut String {
        &mut self.id
    }
}

impl Identified for Education {
    fn id_mut(&mut self) -> &mut String {
        &mut self.id
    }
}

impl Identified for Project {
    fn id_mut(&mut self) -> &mut String {
        &mut self.id
    }
}

pub fn assign_ids<T: Identified>(entries: &mut [T]) {
    for entry in entries {
        entry.ensure_id();
    }
}

pub fn new_entry_id() -> String {
    Uuid::new_v4().to_string()
}

/// Accepts strings, numbers and booleans as text, and `null` as empty.
/// Generated data often sends `"graduationYear": 2020` or `"gpa": 3.8`.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Null => Ok(String::new()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected text, found {other}"
        ))),
    }
}
