//! Field-wise overwrite merge of extracted patches.
//!
//! Each top-level field present in a patch replaces the document's field as a
//! whole: lists are swapped, not appended or deduplicated, and `personalInfo`
//! is swapped as one record. Absent fields are left alone. There is no way to
//! patch a single entry inside a list.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::extraction::ExtractedPatch;
use crate::models::resume::{
    assign_ids, Certification, Education, Experience, Language, PersonalInfo, Project, Reference,
    ResumeDocument, TemplateType,
};

/// `ResumeDocument` with every top-level field optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResumePatch {
    pub personal_info: Option<PersonalInfo>,
    pub summary: Option<String>,
    pub experience: Option<Vec<Experience>>,
    pub education: Option<Vec<Education>>,
    pub certifications: Option<Vec<Certification>>,
    pub languages: Option<Vec<Language>>,
    pub interests: Option<Vec<String>>,
    pub references: Option<Vec<Reference>>,
    pub references_available: Option<bool>,
    pub skills: Option<Vec<String>>,
    pub projects: Option<Vec<Project>>,
    pub target_industry: Option<String>,
    pub template: Option<TemplateType>,
    pub accent_color: Option<String>,
}

impl ResumePatch {
    /// Builds a typed patch from an extracted JSON object, one field at a time.
    ///
    /// A field whose value does not fit its type is dropped with a warning and
    /// the rest still apply. `null` stands for the field's empty default.
    /// Unknown keys are ignored.
    pub fn from_extracted(raw: ExtractedPatch) -> Self {
        let defaults = document_defaults();
        let mut patch = ResumePatch::default();

        for (key, value) in raw {
            let value = if value.is_null() {
                defaults.get(&key).cloned().unwrap_or(Value::Null)
            } else {
                value
            };

            match key.as_str() {
                "personalInfo" => patch.personal_info = convert(&key, value),
                "summary" => patch.summary = convert(&key, value),
                "experience" => patch.experience = convert(&key, value),
                "education" => patch.education = convert(&key, value),
                "certifications" => patch.certifications = convert(&key, value),
                "languages" => patch.languages = convert(&key, value),
                "interests" => patch.interests = convert(&key, value),
                "references" => patch.references = convert(&key, value),
                "referencesAvailable" => patch.references_available = convert(&key, value),
                "skills" => patch.skills = convert(&key, value),
                "projects" => patch.projects = convert(&key, value),
                "targetIndustry" => patch.target_industry = convert(&key, value),
                "template" => patch.template = convert(&key, value),
                "accentColor" => patch.accent_color = convert(&key, value),
                other => debug!("Ignoring unknown resume patch field '{other}'"),
            }
        }

        patch
    }

    pub fn is_empty(&self) -> bool {
        *self == ResumePatch::default()
    }
}

fn convert<T: DeserializeOwned>(key: &str, value: Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("Dropping resume patch field '{key}': {e}");
            None
        }
    }
}

fn document_defaults() -> Map<String, Value> {
    match serde_json::to_value(ResumeDocument::default()) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

impl ResumeDocument {
    /// Applies `patch` by field-wise overwrite and returns the names of the
    /// fields it replaced, in document order.
    pub fn apply_patch(&mut self, patch: ResumePatch) -> Vec<&'static str> {
        let mut applied = Vec::new();

        if let Some(v) = patch.personal_info {
            self.personal_info = v;
            applied.push("personalInfo");
        }
        if let Some(v) = patch.summary {
            self.summary = v;
            applied.push("summary");
        }
        if let Some(mut v) = patch.experience {
            assign_ids(&mut v);
            self.experience = v;
            applied.push("experience");
        }
        if let Some(mut v) = patch.education {
            assign_ids(&mut v);
            self.education = v;
            applied.push("education");
        }
        if let Some(v) = patch.certifications {
            self.certifications = v;
            applied.push("certifications");
        }
        if let Some(v) = patch.languages {
            self.languages = v;
            applied.push("languages");
        }
        if let Some(v) = patch.interests {
            self.interests = v;
            applied.push("interests");
        }
        if let Some(v) = patch.references {
            self.references = v;
            applied.push("references");
        }
        if let Some(v) = patch.references_available {
            self.references_available = v;
            applied.push("referencesAvailable");
        }
        if let Some(v) = patch.skills {
            self.skills = v;
            applied.push("skills");
        }
        if let Some(mut v) = patch.projects {
            assign_ids(&mut v);
            self.projects = v;
            applied.push("projects");
        }
        if let Some(v) = patch.target_industry {
            self.target_industry = v;
            applied.push("targetIndustry");
        }
        if let Some(v) = patch.template {
            self.template = v;
            applied.push("template");
        }
        if let Some(v) = patch.accent_color {
            self.accent_color = v;
            applied.push("accentColor");
        }

        applied
    }
}
