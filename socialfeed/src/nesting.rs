// SPDX-License-Identifier: Apache-2.0

/// Deepest container nesting the reader accepts.
pub const MAX_DEPTH: u8 = 128;

/// Kind of an open JSON container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Object,
    Array,
}

/// Tracks the stack of open containers, one bit per level.
///
/// A set bit marks an object, a clear bit an array. The bucket is a `u128`,
/// so the counter is capped at [`MAX_DEPTH`]; deeper input is rejected by the
/// caller rather than silently wrapping.
#[derive(Debug, Clone, Default)]
pub struct NestingStack {
    bits: u128,
    depth: u8,
}

impl NestingStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a container, returning `false` if the depth limit is reached.
    pub fn push(&mut self, container: Container) -> bool {
        if self.depth >= MAX_DEPTH {
            return false;
        }
        self.bits = (self.bits << 1) | u128::from(container == Container::Object);
        self.depth += 1;
        true
    }

    /// Pops the innermost container.
    pub fn pop(&mut self) -> Option<Container> {
        let top = self.top()?;
        self.bits >>= 1;
        self.depth -= 1;
        Some(top)
    }

    /// Innermost open container, if any.
    pub fn top(&self) -> Option<Container> {
        if self.depth == 0 {
            return None;
        }
        if self.bits & 1 == 1 {
            Some(Container::Object)
        } else {
            Some(Container::Array)
        }
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn is_empty(&self) -> bool {
        self.depth == 0
    }
}
