//! Game events and the observer list that delivers them
//!
//! Presentation, audio and UI layers subscribe to the session's bus
//! instead of reaching into the engine. Events are delivered in the order
//! the engine produced them, after the mutation that caused them is done.

use serde::{Deserialize, Serialize};

/// Everything the engine tells the outside world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A session was set up or restored
    GameStart {
        pairs_found: u32,
        total_pairs: u32,
        moves: u32,
    },
    /// A card turned face up
    CardFlip { index: usize },
    /// A two-card turn completed
    TurnFinished { moves: u32 },
    TilesMatch { pairs_found: u32, total_pairs: u32 },
    /// The two cards will turn back after `flip_back_delay` seconds
    TilesMismatch { flip_back_delay: f32 },
    /// All pairs found (announced after a short delay)
    LevelFinished,
    ScoreChanged { score: u32 },
    /// Combo streak of 2 or more
    ComboHit { combo: u32 },
    /// The reveal window at game start ended; input is accepted from now on
    PreviewFinished,
    /// Mismatched cards turned face down again
    CardsHidden { first: usize, second: usize },
    /// Matched cards left the board
    CardsRemoved { first: usize, second: usize },
}

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u32);

type Handler = Box<dyn FnMut(&GameEvent)>;

/// Ordered list of event observers
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<(SubscriberId, Handler)>,
    next_id: u32,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler; handlers run in registration order
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriberId
    where
        F: FnMut(&GameEvent) + 'static,
    {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(handler)));
        id
    }

    /// Remove a handler. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn publish(&mut self, event: &GameEvent) {
        for (_, handler) in self.subscribers.iter_mut() {
            handler(event);
        }
    }

    /// Publish a batch in order
    pub fn publish_all(&mut self, events: &[GameEvent]) {
        for event in events {
            self.publish(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_subscribe_and_publish_in_order() {
        let mut bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let first = log.clone();
        bus.subscribe(move |e| first.borrow_mut().push(("a", e.clone())));
        let second = log.clone();
        bus.subscribe(move |e| second.borrow_mut().push(("b", e.clone())));

        bus.publish_all(&[GameEvent::LevelFinished, GameEvent::ScoreChanged { score: 3 }]);

        let log = log.borrow();
        assert_eq!(log.len(), 4);
        assert_eq!(log[0], ("a", GameEvent::LevelFinished));
        assert_eq!(log[1], ("b", GameEvent::LevelFinished));
        assert_eq!(log[3], ("b", GameEvent::ScoreChanged { score: 3 }));
    }

    #[test]
    fn test_unsubscribe() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));
        let c = count.clone();
        let id = bus.subscribe(move |_| *c.borrow_mut() += 1);

        bus.publish(&GameEvent::LevelFinished);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(&GameEvent::LevelFinished);

        assert_eq!(*count.borrow(), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
