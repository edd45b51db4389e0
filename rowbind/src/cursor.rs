//! Sequential parameter position of a statement

/// Tracks the next 1-based parameter index a sequential bind will use.
///
/// The position never drops below [`ParamCursor::FIRST`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamCursor {
    next: usize,
}

impl ParamCursor {
    /// SQLite numbers parameters from 1
    pub const FIRST: usize = 1;

    pub fn new() -> Self { Self { next: Self::FIRST } }

    /// The index the next sequential bind will use
    pub fn position(&self) -> usize { self.next }

    /// Returns the current position and moves past it
    pub fn advance(&mut self) -> usize {
        let current = self.next;
        self.next += 1;
        current
    }

    /// Continue sequential binding after `index`, as after a named bind resolved to it
    pub fn jump_past(&mut self, index: usize) { self.next = (index + 1).max(Self::FIRST) }

    /// Step back one position, clamped at [`ParamCursor::FIRST`]
    pub fn rewind(&mut self) { self.next = self.next.saturating_sub(1).max(Self::FIRST) }

    pub fn reset(&mut self) { self.next = Self::FIRST }
}

impl Default for ParamCursor {
    fn default() -> Self { Self::new() }
}
