// Prompt constants and prompt-building helpers.
// The chat instruction defines the RESUME_DATA block the extraction module reads.

/// Sampling temperature for conversational turns.
pub const CHAT_TEMPERATURE: f32 = 0.7;

/// System instruction for the chat builder.
pub const CHAT_SYSTEM_INSTRUCTION: &str = r#"You are ResumeAI Pro, an elite AI-powered resume building assistant.
Your goal is to extract resume information naturally from conversation.
Always acknowledge what the user shared, confirm the info briefly, and ask the next logical question.

DO NOT USE markdown formatting like **bold** or *italics* for emphasis in your text responses. Just use plain text.

When you extract new or updated resume information, you MUST include a hidden JSON data block at the end of your response like this:
<!--RESUME_DATA
{
  "personalInfo": { ... },
  "summary": "...",
  "experience": [ ... ],
  "education": [ ... ],
  "skills": [ ... ],
  "projects": [ ... ]
}
RESUME_DATA-->

Important:
- Experience, Education, and Projects entries should have a unique 'id'.
- If the user doesn't provide a specific field, leave it as an empty string or empty array.
- Follow the structure exactly.
- Keep the actual user-facing message warm and encouraging.
- Focus on quantifiable achievements.
- When building experience bullets, use action verbs and metrics."#;

/// Newest user turn: the message plus the current document snapshot.
pub fn chat_turn_text(message: &str, document_json: &str) -> String {
    format!("User message: {message}\n\nCurrent Resume Data: {document_json}")
}

pub const ENHANCE_PROMPT_TEMPLATE: &str = "Enhance the following {kind} for a {profession} resume.
Make it professional, impactful, and include metrics if appropriate.
Use strong action verbs.
Return only the enhanced text, no conversational filler and NO markdown bolding.

Content: {content}";

pub fn enhance_prompt(kind: &str, profession: &str, content: &str) -> String {
    ENHANCE_PROMPT_TEMPLATE
        .replace("{kind}", kind)
        .replace("{profession}", profession)
        .replace("{content}", content)
}
