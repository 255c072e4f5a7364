// Chat builder: sessions that own a resume document and its transcript, and
// the turn loop that feeds generative replies through the extraction protocol.

pub mod handlers;
pub mod session;
pub mod store;
