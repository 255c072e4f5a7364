//! Text enhancement: rewrites one resume passage through the generative backend.
//! Fail-soft: any backend problem hands the original text back.

pub mod handlers;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::extraction::strip_emphasis;
use crate::llm_client::prompts::enhance_prompt;
use crate::llm_client::{GenerationRequest, GenerativeBackend, Turn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnhanceKind {
    Summary,
    Experience,
    Skills,
}

impl EnhanceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnhanceKind::Summary => "summary",
            EnhanceKind::Experience => "experience",
            EnhanceKind::Skills => "skills",
        }
    }
}

/// Returns the enhanced passage, `**` removed and trimmed, or `content`
/// unchanged if the backend fails.
pub async fn enhance_text(
    backend: &dyn GenerativeBackend,
    kind: EnhanceKind,
    content: &str,
    profession: &str,
) -> String {
    let request = GenerationRequest {
        system: None,
        turns: vec![Turn::user(enhance_prompt(kind.as_str(), profession, content))],
        temperature: None,
    };

    match backend.generate(&request).await {
        Ok(text) => strip_emphasis(&text).trim().to_string(),
        Err(e) => {
            warn!("Enhance {} failed, returning original text: {e}", kind.as_str());
            content.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::mock::ScriptedBackend;

    #[tokio::test]
    async fn test_enhance_strips_bold_and_trims() {
        let backend = ScriptedBackend::replying("  **Led** a team of 5 engineers.\n");
        let text = enhance_text(&backend, EnhanceKind::Experience, "led team", "Engineer").await;
        assert_eq!(text, "Led a team of 5 engineers.");

        let request = &backend.requests()[0];
        assert!(request.system.is_none());
        assert_eq!(request.turns.len(), 1);
        assert!(request.turns[0]
            .text
            .starts_with("Enhance the following experience for a Engineer resume."));
    }

    #[tokio::test]
    async fn test_enhance_returns_original_on_failure() {
        let backend = ScriptedBackend::failing();
        let text = enhance_text(&backend, EnhanceKind::Summary, "I write code.", "Dev").await;
        assert_eq!(text, "I write code.");
    }

    #[test]
    fn test_kind_serde() {
        let kind: EnhanceKind = serde_json::from_str(r#""skills""#).unwrap();
        assert_eq!(kind, EnhanceKind::Skills);
    }
}
