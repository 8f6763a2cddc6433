//! Application state shared across handlers

use waypoint_core::ChatBot;

use crate::store::{DocumentStore, StoreSession};

/// Shared application state, held behind `Arc` by the router
#[derive(Debug, Clone)]
pub struct AppState {
    pub session: StoreSession,
    pub chat: ChatBot,
}

impl AppState {
    pub fn new(session: StoreSession) -> Self {
        Self {
            session,
            chat: ChatBot::new(),
        }
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.session.store()
    }
}
