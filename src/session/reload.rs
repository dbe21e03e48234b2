//! Change notification for data views.
//!
//! Each topic carries a revision that only ever grows. Subscribers compare
//! the revision they last saw with the current one, so any number of bumps
//! between two observations still reads as "changed" and none are lost.

use tokio::sync::watch;

/// Kind of data a view depends on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topic {
    Lists,
    Tasks,
}

/// Process-wide reload signals, one revision counter per topic.
pub struct ReloadCoordinator {
    lists: watch::Sender<u64>,
    tasks: watch::Sender<u64>,
}

/// A view's handle on one topic.
pub struct ReloadSubscription {
    receiver: watch::Receiver<u64>,
}

impl ReloadCoordinator {
    pub fn new() -> Self {
        Self {
            lists: watch::Sender::new(0),
            tasks: watch::Sender::new(0),
        }
    }

    fn sender(&self, topic: Topic) -> &watch::Sender<u64> {
        match topic {
            Topic::Lists => &self.lists,
            Topic::Tasks => &self.tasks,
        }
    }

    /// Signal that data of `topic` changed; returns the new revision.
    pub fn bump(&self, topic: Topic) -> u64 {
        let mut revision = 0;
        self.sender(topic).send_modify(|value| {
            *value += 1;
            revision = *value;
        });
        log::debug!("🔁 {:?} revision {}", topic, revision);
        revision
    }

    /// Current revision of `topic`.
    pub fn revision(&self, topic: Topic) -> u64 {
        *self.sender(topic).borrow()
    }

    /// Subscribe to `topic`; the current revision counts as already seen.
    pub fn subscribe(&self, topic: Topic) -> ReloadSubscription {
        ReloadSubscription {
            receiver: self.sender(topic).subscribe(),
        }
    }
}

impl Default for ReloadCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ReloadSubscription {
    /// Whether a bump happened since the last observation.
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }

    /// Wait for the next bump and return the revision it produced.
    ///
    /// Returns immediately if a bump happened since the last call.
    pub async fn changed(&mut self) -> Option<u64> {
        self.receiver.changed().await.ok()?;
        Some(*self.receiver.borrow_and_update())
    }

    /// Latest revision, marking it as seen.
    pub fn observe(&mut self) -> u64 {
        *self.receiver.borrow_and_update()
    }
}
