//! Round-robin cursor

/// Persistent index into the registry
///
/// The registry can shrink between uses, so the cursor is wrapped against the
/// current size every time it is read: an index past the end restarts at 0.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RoundRobinCursor {
    next: usize,
}

impl RoundRobinCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw position, possibly past the end of the registry
    pub fn position(&self) -> usize {
        self.next
    }

    /// Wrap against `len` and return the selected index
    ///
    /// An empty registry resets the cursor to 0 and selects nothing.
    pub fn wrap(&mut self, len: usize) -> Option<usize> {
        if self.next >= len {
            self.next = 0;
        }
        if self.next < len {
            Some(self.next)
        } else {
            None
        }
    }

    /// Index [`wrap`](Self::wrap) would select, without touching the cursor
    pub fn peek(&self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else if self.next >= len {
            Some(0)
        } else {
            Some(self.next)
        }
    }

    pub fn advance(&mut self) {
        self.next = self.next.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycles_in_order() {
        let mut cursor = RoundRobinCursor::new();
        let mut picks = Vec::new();

        for _ in 0..6 {
            picks.push(cursor.wrap(3).unwrap());
            cursor.advance();
        }

        assert_eq!(picks, vec![0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn test_empty_resets() {
        let mut cursor = RoundRobinCursor::new();
        cursor.advance();
        cursor.advance();

        assert_eq!(cursor.wrap(0), None);
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_shrunk_registry_wraps_to_start() {
        let mut cursor = RoundRobinCursor::new();
        cursor.advance();
        cursor.advance();

        // Three sessions shrank to two: index 2 is out of range.
        assert_eq!(cursor.wrap(2), Some(0));
    }

    #[test]
    fn test_registry_shrunk_by_two_restarts_at_zero() {
        let mut cursor = RoundRobinCursor::new();
        for _ in 0..3 {
            cursor.advance();
        }

        // Five sessions shrank to two: restart at 0 rather than 3 % 2.
        assert_eq!(cursor.peek(2), Some(0));
        assert_eq!(cursor.wrap(2), Some(0));
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_peek_does_not_mutate() {
        let mut cursor = RoundRobinCursor::new();
        for _ in 0..3 {
            cursor.advance();
        }

        assert_eq!(cursor.peek(2), Some(0));
        assert_eq!(cursor.peek(0), None);
        assert_eq!(cursor.peek(5), Some(3));
        assert_eq!(cursor.position(), 3);
    }
}
