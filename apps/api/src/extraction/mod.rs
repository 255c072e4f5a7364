// Extraction protocol: an assistant reply may carry one hidden JSON block that
// patches the resume. These functions split it into transcript text and data.
// Pure and stateless; ordering and retries belong to the conversation loop.

pub mod display;
pub mod protocol;

pub use display::{display_text, strip_emphasis};
pub use protocol::{extract_patch, strip_patch_for_display, ExtractedPatch};
