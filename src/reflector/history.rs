//! Session history media.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use tokio::sync::broadcast;

/// A browser-like session history.
///
/// `push_state` and `replace_state` never emit events; traversal does, the
/// way a browser fires `popstate` only on back/forward.
pub trait History: Send + Sync + fmt::Debug {
    fn location(&self) -> String;

    fn push_state(&self, url: &str);

    fn replace_state(&self, url: &str);

    /// Receives the new location after every traversal.
    fn subscribe(&self) -> broadcast::Receiver<String>;
}

#[derive(Debug)]
struct Stack {
    entries: Vec<String>,
    cursor: usize,
}

/// In-process history with back/forward traversal.
#[derive(Debug)]
pub struct MemoryHistory {
    stack: Mutex<Stack>,
    popstate: broadcast::Sender<String>,
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl MemoryHistory {
    pub fn new(initial: impl Into<String>) -> Self {
        let (popstate, _) = broadcast::channel(16);
        Self {
            stack: Mutex::new(Stack {
                entries: vec![initial.into()],
                cursor: 0,
            }),
            popstate,
        }
    }

    pub fn back(&self) -> bool {
        self.go(-1)
    }

    pub fn forward(&self) -> bool {
        self.go(1)
    }

    /// Move `delta` entries. Out-of-range moves are ignored and return false.
    pub fn go(&self, delta: isize) -> bool {
        let location = {
            let mut stack = self.stack.lock().unwrap_or_else(PoisonError::into_inner);
            let target = stack.cursor as isize + delta;
            if delta == 0 || target < 0 || target as usize >= stack.entries.len() {
                return false;
            }
            stack.cursor = target as usize;
            stack.entries[stack.cursor].clone()
        };
        tracing::trace!(location = %location, "history traversal");
        let _ = self.popstate.send(location);
        true
    }

    pub fn entries(&self) -> Vec<String> {
        self.stack
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .clone()
    }

    pub fn len(&self) -> usize {
        self.stack
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl History for MemoryHistory {
    fn location(&self) -> String {
        let stack = self.stack.lock().unwrap_or_else(PoisonError::into_inner);
        stack.entries[stack.cursor].clone()
    }

    fn push_state(&self, url: &str) {
        let mut stack = self.stack.lock().unwrap_or_else(PoisonError::into_inner);
        let keep = stack.cursor + 1;
        stack.entries.truncate(keep);
        stack.entries.push(url.to_string());
        stack.cursor = keep;
    }

    fn replace_state(&self, url: &str) {
        let mut stack = self.stack.lock().unwrap_or_else(PoisonError::into_inner);
        let cursor = stack.cursor;
        stack.entries[cursor] = url.to_string();
    }

    fn subscribe(&self) -> broadcast::Receiver<String> {
        self.popstate.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_replace_traverse() {
        let history = MemoryHistory::new("/");
        let mut events = history.subscribe();

        history.push_state("/a");
        history.push_state("/b");
        history.replace_state("/c");
        assert_eq!(history.entries(), vec!["/", "/a", "/c"]);
        assert!(events.try_recv().is_err());

        assert!(history.back());
        assert_eq!(history.location(), "/a");
        assert_eq!(events.try_recv().unwrap(), "/a");

        history.push_state("/d");
        assert_eq!(history.entries(), vec!["/", "/a", "/d"]);
        assert!(!history.forward());
        assert!(!history.go(-5));
    }
}
