//! Event fan-out over live connections.
//!
//! No acknowledgment, no retry, no delivery guarantee: a send to a closed
//! or unknown connection is silently dropped.

use super::protocol::{self, Outbound};
use super::topics::TopicRouter;
use super::ConnectionRegistry;

/// Deliver an event to every registered connection (the global scope).
pub fn to_all(registry: &ConnectionRegistry, event: &Outbound) {
    let Some(msg) = protocol::encode(event) else {
        return;
    };
    for sender in registry.senders() {
        let _ = sender.send(msg.clone());
    }
}

/// Deliver an event to every connection joined to a topic.
pub fn to_topic(registry: &ConnectionRegistry, topics: &TopicRouter, topic: &str, event: &Outbound) {
    let Some(msg) = protocol::encode(event) else {
        return;
    };
    for connection_id in topics.members(topic) {
        if let Some(sender) = registry.sender(&connection_id) {
            let _ = sender.send(msg.clone());
        }
    }
}

/// Deliver an event to a single connection.
pub fn to_connection(registry: &ConnectionRegistry, connection_id: &str, event: &Outbound) {
    let Some(msg) = protocol::encode(event) else {
        return;
    };
    if let Some(sender) = registry.sender(connection_id) {
        let _ = sender.send(msg.clone());
    }
}
