//! Hierarchy events and observer lists

use crate::host::EntityHandle;
use crate::node::NodeId;
use serde::{Deserialize, Serialize};

/// Type of hierarchy event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorldEventType {
    /// Tracked point entered the node
    Enter,
    /// Tracked point left the node
    Exit,
    /// Node content was instantiated
    Load,
    /// Node content was returned to the pool
    Dispose,
    /// Rendering enabled
    GraphicsOn,
    /// Rendering disabled
    GraphicsOff,
    /// Simulation logic resumed (sectors only)
    LogicOn,
    /// Simulation logic paused (sectors only)
    LogicOff,
}

/// A hierarchy event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorldEvent {
    /// Type of event
    pub event_type: WorldEventType,
    /// The node the event is about
    pub node: NodeId,
}

impl WorldEvent {
    /// Create an event
    pub fn new(event_type: WorldEventType, node: impl Into<NodeId>) -> Self {
        Self {
            event_type,
            node: node.into(),
        }
    }

    /// Graphics switch event for the given state
    pub fn graphics(node: impl Into<NodeId>, enabled: bool) -> Self {
        let event_type = if enabled {
            WorldEventType::GraphicsOn
        } else {
            WorldEventType::GraphicsOff
        };
        Self::new(event_type, node)
    }

    /// Logic switch event for the given state
    pub fn logic(node: impl Into<NodeId>, enabled: bool) -> Self {
        let event_type = if enabled {
            WorldEventType::LogicOn
        } else {
            WorldEventType::LogicOff
        };
        Self::new(event_type, node)
    }

    /// Check if this is an enter event
    pub fn is_enter(&self) -> bool {
        self.event_type == WorldEventType::Enter
    }

    /// Check if this is an exit event
    pub fn is_exit(&self) -> bool {
        self.event_type == WorldEventType::Exit
    }
}

/// Callback observing every raised event
pub type WorldEventHandler = Box<dyn Fn(&WorldEvent) + Send + Sync>;

/// Pending events plus an optional observer
#[derive(Default)]
pub struct EventQueue {
    events: Vec<WorldEvent>,
    handler: Option<WorldEventHandler>,
}

impl EventQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise an event
    pub fn emit(&mut self, event: WorldEvent) {
        if let Some(ref handler) = self.handler {
            handler(&event);
        }
        self.events.push(event);
    }

    /// Install the observer
    pub fn set_handler(&mut self, handler: WorldEventHandler) {
        self.handler = Some(handler);
    }

    /// Events raised since the last drain
    pub fn pending(&self) -> &[WorldEvent] {
        &self.events
    }

    /// Take every pending event
    pub fn drain(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Observer list of entity handles
///
/// Container nodes fan switches out to every subscribed entity.
#[derive(Debug, Clone, Default)]
pub struct Broadcast {
    subscribers: Vec<EntityHandle>,
}

impl Broadcast {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe an entity (no duplicates)
    pub fn subscribe(&mut self, handle: EntityHandle) {
        if !self.subscribers.contains(&handle) {
            self.subscribers.push(handle);
        }
    }

    /// Unsubscribe an entity
    pub fn unsubscribe(&mut self, handle: EntityHandle) {
        self.subscribers.retain(|h| *h != handle);
    }

    /// Drop every subscriber
    pub fn clear(&mut self) {
        self.subscribers.clear();
    }

    /// Subscribed entities
    pub fn subscribers(&self) -> &[EntityHandle] {
        &self.subscribers
    }

    /// Number of subscribers
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Check if nobody is subscribed
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::LocationId;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_event_constructors() {
        let on = WorldEvent::graphics(LocationId(3), true);
        assert_eq!(on.event_type, WorldEventType::GraphicsOn);
        assert_eq!(on.node, NodeId::Location(LocationId(3)));

        let enter = WorldEvent::new(WorldEventType::Enter, LocationId(1));
        assert!(enter.is_enter());
        assert!(!enter.is_exit());
    }

    #[test]
    fn test_queue_handler_sees_every_event() {
        let seen = Arc::new(AtomicU32::new(0));
        let seen_clone = seen.clone();

        let mut queue = EventQueue::new();
        queue.set_handler(Box::new(move |_| {
            seen_clone.fetch_add(1, Ordering::SeqCst);
        }));
        queue.emit(WorldEvent::new(WorldEventType::Enter, LocationId(0)));
        queue.emit(WorldEvent::new(WorldEventType::Exit, LocationId(0)));

        assert_eq!(seen.load(Ordering::SeqCst), 2);
        assert_eq!(queue.drain().len(), 2);
        assert!(queue.pending().is_empty());
    }

    #[test]
    fn test_broadcast_subscription() {
        let mut broadcast = Broadcast::new();
        broadcast.subscribe(EntityHandle(1));
        broadcast.subscribe(EntityHandle(1));
        broadcast.subscribe(EntityHandle(2));
        assert_eq!(broadcast.len(), 2);

        broadcast.unsubscribe(EntityHandle(1));
        assert_eq!(broadcast.subscribers(), &[EntityHandle(2)]);

        broadcast.clear();
        assert!(broadcast.is_empty());
    }
}
