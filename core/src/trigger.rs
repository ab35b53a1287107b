use crate::cursor::FetchCursor;

/// What to do when the list's sentinel becomes visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerAction {
    /// Request the next page.
    Fetch,
    /// A request is already in flight.
    Wait,
    /// Remote history is exhausted; the trigger is now disconnected.
    Disconnect,
}

/// Visibility-driven fetch trigger.
///
/// Receives the cursor value at the moment the sentinel becomes visible
/// rather than holding on to one, so it never acts on a stale snapshot.
#[derive(Debug, Clone)]
pub struct VisibilityTrigger {
    connected: bool,
}

impl Default for VisibilityTrigger {
    fn default() -> Self {
        Self { connected: true }
    }
}

impl VisibilityTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn on_visible(&mut self, cursor: &FetchCursor) -> TriggerAction {
        if !self.connected || !cursor.has_more() {
            self.connected = false;
            return TriggerAction::Disconnect;
        }
        if cursor.is_fetching() {
            return TriggerAction::Wait;
        }
        TriggerAction::Fetch
    }

    /// Re-arm after the history scope changes.
    pub fn reconnect(&mut self) {
        self.connected = true;
    }

    /// Stop reacting to visibility until [`reconnect`](Self::reconnect).
    pub fn disconnect(&mut self) {
        self.connected = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::PageOutcome;
    use crate::remote::TransferPage;

    #[test]
    fn fetch_wait_disconnect() {
        let mut trigger = VisibilityTrigger::new();
        let cursor = FetchCursor::new();
        assert_eq!(trigger.on_visible(&cursor), TriggerAction::Fetch);

        let (cursor, _) = cursor.begin();
        assert_eq!(trigger.on_visible(&cursor), TriggerAction::Wait);

        let cursor = cursor.complete(PageOutcome::Loaded(TransferPage {
            count: 3,
            transfers: Vec::new(),
        }));
        assert_eq!(trigger.on_visible(&cursor), TriggerAction::Disconnect);
        assert!(!trigger.is_connected());
    }

    #[test]
    fn stays_disconnected_until_reconnected() {
        let mut trigger = VisibilityTrigger::new();
        trigger.disconnect();
        assert_eq!(
            trigger.on_visible(&FetchCursor::new()),
            TriggerAction::Disconnect
        );
        trigger.reconnect();
        assert_eq!(trigger.on_visible(&FetchCursor::new()), TriggerAction::Fetch);
    }
}
