//! Ordered set of registered sessions
//!
//! Not synchronized by itself; the router keeps it behind its single lock
//! together with the round-robin cursor and the pending replies.

use std::sync::Arc;

use crate::session::{Primary, SessionRef};

/// Registered sessions in registration order
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Vec<SessionRef>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a session
    ///
    /// Returns `false` and leaves the registry unchanged if the same session
    /// is already registered.
    pub fn add(&mut self, session: SessionRef) -> bool {
        if self.contains(&session) {
            return false;
        }
        self.sessions.push(session);
        true
    }

    /// Remove the entry for `session`, if present
    pub fn remove(&mut self, session: &Primary) -> bool {
        match self
            .sessions
            .iter()
            .position(|s| std::ptr::eq(Arc::as_ptr(s), session))
        {
            Some(index) => {
                self.sessions.remove(index);
                true
            }
            None => false,
        }
    }

    /// Drop every entry, returning how many were removed
    pub fn clear(&mut self) -> usize {
        let count = self.sessions.len();
        self.sessions.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SessionRef> {
        self.sessions.get(index)
    }

    pub fn contains(&self, session: &Primary) -> bool {
        self.sessions
            .iter()
            .any(|s| std::ptr::eq(Arc::as_ptr(s), session))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SessionRef> {
        self.sessions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;

    fn session() -> SessionRef {
        let addr: SocketAddr = "127.0.0.1:5000".parse().unwrap();
        Primary::channel(addr).0
    }

    #[test]
    fn test_add_keeps_order() {
        let mut registry = SessionRegistry::new();
        let a = session();
        let b = session();

        assert!(registry.add(a.clone()));
        assert!(registry.add(b.clone()));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(0).unwrap().id(), a.id());
        assert_eq!(registry.get(1).unwrap().id(), b.id());
    }

    #[test]
    fn test_duplicate_add_ignored() {
        let mut registry = SessionRegistry::new();
        let a = session();

        assert!(registry.add(a.clone()));
        assert!(!registry.add(a.clone()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut registry = SessionRegistry::new();
        let a = session();
        let b = session();
        registry.add(a.clone());
        registry.add(b.clone());

        assert!(registry.remove(&a));
        assert!(!registry.remove(&a));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&b));
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut registry = SessionRegistry::new();
        registry.add(session());

        assert!(!registry.remove(&session()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut registry = SessionRegistry::new();
        registry.add(session());
        registry.add(session());

        assert_eq!(registry.clear(), 2);
        assert!(registry.is_empty());
    }
}
