use std::sync::Arc;

use crate::alerts::AlertPipeline;
use crate::db::DbPool;
use crate::presence::PresenceStore;
use crate::ws::topics::TopicRouter;
use crate::ws::ConnectionRegistry;

/// Shared application state passed to all handlers via axum State extractor.
#[derive(Clone)]
pub struct AppState {
    /// SQLite connection wrapped in Arc<Mutex>
    pub db: DbPool,
    /// Live duplex sessions
    pub connections: ConnectionRegistry,
    /// Pole-code multicast membership
    pub topics: TopicRouter,
    /// In-memory presence authority
    pub presence: Arc<PresenceStore>,
    /// Disconnect alerting pipeline
    pub alerts: AlertPipeline,
}

impl AppState {
    pub fn new(db: DbPool) -> Self {
        let connections = ConnectionRegistry::new();
        let alerts = AlertPipeline::new(db.clone(), connections.clone());
        Self {
            db,
            connections,
            topics: TopicRouter::new(),
            presence: Arc::new(PresenceStore::new()),
            alerts,
        }
    }
}
