use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Identifies one `show` call, so a late dismissal cannot hide a newer message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MessageTicket(u64);

#[derive(Debug, Default)]
struct MessageState {
    text: String,
    visible: bool,
    generation: u64,
}

/// Transient user-facing notification: one current message and its visibility.
#[derive(Clone, Default)]
pub struct MessageCenter {
    state: Arc<Mutex<MessageState>>,
}

impl MessageCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current message and make it visible.
    pub fn show(&self, text: impl Into<String>) -> MessageTicket {
        let text = text.into();
        log::info!("💬 {}", text);

        if let Ok(mut state) = self.state.lock() {
            state.generation += 1;
            state.text = text;
            state.visible = true;
            MessageTicket(state.generation)
        } else {
            MessageTicket(0)
        }
    }

    /// Show a message and hide it after `duration`, unless replaced meanwhile.
    ///
    /// Must be called from within a tokio runtime.
    pub fn show_for(&self, text: impl Into<String>, duration: Duration) -> MessageTicket {
        let ticket = self.show(text);
        let center = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            center.dismiss(ticket);
        });
        ticket
    }

    /// Hide the message issued with `ticket`; returns false if a newer
    /// message has replaced it.
    pub fn dismiss(&self, ticket: MessageTicket) -> bool {
        if let Ok(mut state) = self.state.lock() {
            if state.generation == ticket.0 {
                state.visible = false;
                return true;
            }
        }
        false
    }

    /// Current message text, even if hidden.
    pub fn message(&self) -> String {
        self.state.lock().map(|state| state.text.clone()).unwrap_or_default()
    }

    /// Current message, only while visible.
    pub fn visible_message(&self) -> Option<String> {
        let state = self.state.lock().ok()?;
        state.visible.then(|| state.text.clone())
    }

    pub fn is_visible(&self) -> bool {
        self.state.lock().map(|state| state.visible).unwrap_or(false)
    }

    /// Set visibility explicitly.
    pub fn set_visible(&self, visible: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.visible = visible;
        }
    }

    /// Flip visibility.
    pub fn toggle_visible(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.visible = !state.visible;
        }
    }
}
