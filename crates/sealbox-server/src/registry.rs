//! The mailbox registry: per-user FIFO message queues plus the public-key
//! directory, shared by every session task.
//!
//! One mutex guards both maps. They always hold the same key set — an entry
//! exists in either iff a live session holds that identity — and the coarse
//! lock keeps queue membership and pops atomic relative to concurrent sends
//! and receives on the same username.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use sealbox_core::Message;
use tracing::warn;

// ----------------------------------------------------------------------------
// Registry
// ----------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Inner {
    queues: HashMap<String, VecDeque<Message>>,
    keys: HashMap<String, String>,
}

/// Thread-safe mailbox registry. Passed explicitly (`Arc`) into every
/// session; there is no ambient global.
#[derive(Debug, Default)]
pub struct MailboxRegistry {
    inner: Mutex<Inner>,
}

impl MailboxRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty mailbox and a key-directory entry for `username`.
    /// The caller (the session login loop) guarantees the name is free.
    pub fn register_user(&self, username: &str, public_key: &str) {
        let mut inner = self.lock();
        inner.queues.insert(username.to_owned(), VecDeque::new());
        inner.keys.insert(username.to_owned(), public_key.to_owned());
    }

    /// Remove both entries for `username`. Absence should not happen given
    /// the session invariants; it is logged and ignored.
    pub fn unregister_user(&self, username: &str) {
        let mut inner = self.lock();
        if inner.queues.remove(username).is_none() {
            warn!(username, "unregister for a username that was not present");
        }
        inner.keys.remove(username);
    }

    /// Whether `username` has undelivered messages. May race benignly with a
    /// concurrent drain; callers tolerate a subsequent empty pop.
    pub fn has_pending(&self, username: &str) -> bool {
        self.lock()
            .queues
            .get(username)
            .is_some_and(|queue| !queue.is_empty())
    }

    /// Pop the oldest pending message for `username`, if any.
    pub fn drain_one(&self, username: &str) -> Option<Message> {
        self.lock()
            .queues
            .get_mut(username)
            .and_then(VecDeque::pop_front)
    }

    /// Snapshot of the registered usernames, sorted for stable output.
    pub fn list_usernames(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().queues.keys().cloned().collect();
        names.sort();
        names
    }

    /// Append a message (stamped with the current wall-clock time) to
    /// `receiver`'s queue. `false` if the receiver is not registered.
    pub fn send(&self, receiver: &str, sender: &str, ciphertext: &str) -> bool {
        let mut inner = self.lock();
        match inner.queues.get_mut(receiver) {
            Some(queue) => {
                queue.push_back(Message::new(sender, ciphertext));
                true
            }
            None => false,
        }
    }

    pub fn is_registered(&self, username: &str) -> bool {
        self.lock().queues.contains_key(username)
    }

    pub fn lookup_key(&self, username: &str) -> Option<String> {
        self.lock().keys.get(username).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Poisoning means a panic while holding the lock; nothing to salvage.
        self.inner.lock().expect("mailbox registry mutex poisoned")
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
