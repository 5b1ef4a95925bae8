//! Activity notifications owned by the application shell.
//!
//! The store does not emit anything; the shell emits an event after a store
//! call succeeds and whoever registered with the bus reacts to it.
use log::trace;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityEvent {
    Created { id: Uuid },
    Updated { id: Uuid },
    Deleted { id: Uuid },
    FavoriteToggled { id: Uuid, favorite: bool },
    /// An idea was turned into the prompt `prompt`
    Converted { idea: Uuid, prompt: Uuid },
    PlaceholdersFilled { id: Uuid, count: usize },
}

type Listener = Box<dyn FnMut(&ActivityEvent)>;

/// Listeners called in registration order for every emitted event.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Listener>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&ActivityEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn emit(&mut self, event: ActivityEvent) {
        trace!("Activity: {:?}", event);
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}
