pub mod chat;
pub mod edit;
pub mod patch;
pub mod resume;
