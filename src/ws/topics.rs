//! Topic membership for pole-scoped multicast.

use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;

use crate::presence::ConnectionId;

/// Multicast groups keyed by pole code. Joining is idempotent and a
/// connection may belong to any number of topics at once. The global scope
/// is not a topic: it is every registered connection (see
/// [`broadcast::to_all`](super::broadcast::to_all)).
#[derive(Clone, Default)]
pub struct TopicRouter {
    topics: Arc<DashMap<String, HashSet<ConnectionId>>>,
}

impl TopicRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&self, connection_id: &str, topic: &str) {
        self.topics
            .entry(topic.to_string())
            .or_default()
            .insert(connection_id.to_string());
    }

    /// Connections currently joined to a topic. Unknown topics are empty.
    pub fn members(&self, topic: &str) -> Vec<ConnectionId> {
        self.topics
            .get(topic)
            .map(|entry| entry.value().iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Drop a connection from every topic it joined; emptied topics are
    /// removed.
    pub fn leave_all(&self, connection_id: &str) {
        // Collect topic names first to avoid holding shard locks during removal.
        let topic_names: Vec<String> = self.topics.iter().map(|e| e.key().clone()).collect();

        for topic in topic_names {
            if let Some(mut entry) = self.topics.get_mut(&topic) {
                entry.value_mut().remove(connection_id);
                if entry.value().is_empty() {
                    drop(entry);
                    self.topics.remove(&topic);
                }
            }
        }
    }
}
