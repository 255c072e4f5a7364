use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::info;
use uuid::Uuid;

use crate::chat::session::ChatSession;
use crate::errors::AppError;
use crate::models::resume::ResumeDocument;

pub type SharedSession = Arc<Mutex<ChatSession>>;

/// In-memory builder sessions. Nothing survives a restart.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SharedSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session around `document` and returns its id.
    pub async fn create(&self, document: ResumeDocument) -> Uuid {
        let session = ChatSession::new(document);
        let id = session.id();
        self.sessions
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(session)));
        info!("Created builder session {id}");
        id
    }

    pub async fn get(&self, id: Uuid) -> Result<SharedSession, AppError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        match self.sessions.write().await.remove(&id) {
            Some(_) => {
                info!("Removed builder session {id}");
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Session {id} not found"))),
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Exclusive access for a mutation. Fails with `Conflict` instead of
    /// queueing when a turn is already running on the session.
    pub async fn acquire(&self, id: Uuid) -> Result<OwnedMutexGuard<ChatSession>, AppError> {
        let session = self.get(id).await?;
        session.try_lock_owned().map_err(|_| {
            AppError::Conflict(format!("Session {id} is busy with another request"))
        })
    }
}
