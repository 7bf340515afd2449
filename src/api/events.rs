//! Session lifecycle events emitted by the HTTP layer

use tokio::sync::broadcast;

/// Capacity of the session event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Events the transport raises about the persisted session.
///
/// The client never navigates on its own; the application layer
/// subscribes and decides how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The access token was exchanged for a fresh one
    Refreshed,
    /// Refresh failed; persisted tokens have been removed
    Invalidated,
}

pub fn channel() -> (broadcast::Sender<SessionEvent>, broadcast::Receiver<SessionEvent>) {
    broadcast::channel(EVENT_CHANNEL_CAPACITY)
}
