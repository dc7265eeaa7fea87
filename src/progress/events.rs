//! Progress events and the observer registry
//!
//! Delivery is synchronous and in-process. Observers registered after an event
//! was published never see it.

use serde::Serialize;

/// Events published by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ProgressEvent {
    #[serde(rename_all = "camelCase")]
    XpUpdated { xp: u64, level: u64 },
    #[serde(rename_all = "camelCase")]
    BadgeUnlocked { badge_id: String },
    #[serde(rename_all = "camelCase")]
    ModuleCompleted { module_id: String, level_up: bool },
}

impl ProgressEvent {
    /// Wire name of the event kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::XpUpdated { .. } => "xp-updated",
            Self::BadgeUnlocked { .. } => "badge-unlocked",
            Self::ModuleCompleted { .. } => "module-completed",
        }
    }
}

/// Anything that wants to hear about progress changes
pub trait ProgressObserver {
    fn on_event(&mut self, event: &ProgressEvent);
}

impl<F> ProgressObserver for F
where
    F: FnMut(&ProgressEvent),
{
    fn on_event(&mut self, event: &ProgressEvent) {
        self(event)
    }
}

/// Handle returned by [`EventNotifier::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Observer registry owned by one engine
#[derive(Default)]
pub struct EventNotifier {
    observers: Vec<(SubscriptionId, Box<dyn ProgressObserver>)>,
    next_id: u64,
}

impl EventNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: impl ProgressObserver + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns false if the subscription was already gone
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    /// Deliver to every observer in subscription order
    pub fn publish(&mut self, event: &ProgressEvent) {
        tracing::trace!(
            "[progress:events] {} -> {} observer(s)",
            event.kind(),
            self.observers.len()
        );
        for (_, observer) in &mut self.observers {
            observer.on_event(event);
        }
    }
}

impl std::fmt::Debug for EventNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventNotifier")
            .field("subscribers", &self.observers.len())
            .finish()
    }
}
