use serde::Deserialize;

use crate::errors::AppError;
use crate::models::resume::{
    Education, Experience, Identified, Project, ResumeDocument, TemplateType,
};

/// Sub-fields of `personalInfo` a form edit may set. Unset fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfoUpdate {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub profession: Option<String>,
    pub linkedin: Option<String>,
    pub website: Option<String>,
    pub photo: Option<String>,
}

/// An explicit edit to an owned document, as issued by the builder's form screens.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DocumentEdit {
    Load { resume: ResumeDocument },
    UpdatePersonalInfo { fields: PersonalInfoUpdate },
    UpdateSummary { summary: String },
    SetTemplate { template: TemplateType },
    SetAccentColor { accent_color: String },
    SetTargetIndustry { industry: String },
    AddExperience { entry: Experience },
    AddEducation { entry: Education },
    AddProject { entry: Project },
    AddSkill { skill: String },
    Reset,
}

impl ResumeDocument {
    pub fn apply_edit(&mut self, edit: DocumentEdit) -> Result<(), AppError> {
        match edit {
            DocumentEdit::Load { resume } => {
                *self = resume;
                self.assign_missing_ids();
            }
            DocumentEdit::UpdatePersonalInfo { fields } => {
                let info = &mut self.personal_info;
                set_if_some(&mut info.full_name, fields.full_name);
                set_if_some(&mut info.email, fields.email);
                set_if_some(&mut info.phone, fields.phone);
                set_if_some(&mut info.location, fields.location);
                set_if_some(&mut info.profession, fields.profession);
                set_if_some(&mut info.linkedin, fields.linkedin);
                set_if_some(&mut info.website, fields.website);
                if fields.photo.is_some() {
                    info.photo = fields.photo;
                }
            }
            DocumentEdit::UpdateSummary { summary } => self.summary = summary,
            DocumentEdit::SetTemplate { template } => self.template = template,
            DocumentEdit::SetAccentColor { accent_color } => self.accent_color = accent_color,
            DocumentEdit::SetTargetIndustry { industry } => self.target_industry = industry,
            DocumentEdit::AddExperience { mut entry } => {
                entry.ensure_id();
                self.experience.push(entry);
            }
            DocumentEdit::AddEducation { mut entry } => {
                entry.ensure_id();
                self.education.push(entry);
            }
            DocumentEdit::AddProject { mut entry } => {
                entry.ensure_id();
                self.projects.push(entry);
            }
            DocumentEdit::AddSkill { skill } => {
                let skill = skill.trim();
                if skill.is_empty() {
                    return Err(AppError::Validation("skill cannot be empty".to_string()));
                }
                self.skills.push(skill.to_string());
            }
            DocumentEdit::Reset => *self = ResumeDocument::default(),
        }
        Ok(())
    }
}

fn set_if_some(target: &mut String, value: Option<String>) {
    if let Some(v) = value {
        *target = v;
    }
}
