//! The indentation stack and its serialized form.

use std::fmt;

/// Column widths of the currently open blocks, strictly increasing from
/// bottom to top. The implicit base level is width 0 and is never stored.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct IndentStack {
    widths: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("indentation state is truncated: expected {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },
    #[error("indentation state has {0} unexpected trailing bytes")]
    TrailingBytes(usize),
    #[error("indentation widths must strictly increase, but level {index} is {width}")]
    NotIncreasing { index: usize, width: u16 },
}

impl IndentStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// The width of the innermost open block, or 0 at the base level.
    pub fn top(&self) -> u16 {
        self.widths.last().copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    pub fn widths(&self) -> &[u16] {
        &self.widths
    }

    pub(crate) fn push(&mut self, width: u16) {
        debug_assert!(width > self.top());
        self.widths.push(width);
    }

    pub(crate) fn pop(&mut self) -> Option<u16> {
        self.widths.pop()
    }

    /// Encodes the stack as a little-endian `u16` count followed by one
    /// little-endian `u16` per level.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(2 + 2 * self.widths.len());
        buf.extend_from_slice(&(self.widths.len() as u16).to_le_bytes());
        for width in &self.widths {
            buf.extend_from_slice(&width.to_le_bytes());
        }
        buf
    }

    /// Decodes a blob produced by [`IndentStack::serialize`]. An empty blob
    /// is the empty stack.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, StateError> {
        if bytes.is_empty() {
            return Ok(Self::new());
        }

        let [lo, hi, rest @ ..] = bytes else {
            return Err(StateError::Truncated { expected: 2, found: bytes.len() });
        };

        let count = usize::from(u16::from_le_bytes([*lo, *hi]));
        let expected = 2 + 2 * count;
        if rest.len() < 2 * count {
            return Err(StateError::Truncated { expected, found: bytes.len() });
        }
        if rest.len() > 2 * count {
            return Err(StateError::TrailingBytes(rest.len() - 2 * count));
        }

        let mut stack = Self { widths: Vec::with_capacity(count) };
        for (index, chunk) in rest.chunks_exact(2).enumerate() {
            let width = u16::from_le_bytes([chunk[0], chunk[1]]);
            if width <= stack.top() {
                return Err(StateError::NotIncreasing { index, width });
            }
            stack.widths.push(width);
        }

        Ok(stack)
    }
}

impl fmt::Debug for IndentStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.widths).finish()
    }
}

/// Width of a run of leading whitespace. Every tab counts as `tab_width`
/// columns regardless of where it appears.
pub(crate) fn measure(indentation: &str, tab_width: u16) -> u16 {
    indentation.chars().fold(0u16, |width, c| match c {
        '\t' => width.saturating_add(tab_width),
        _ => width.saturating_add(1),
    })
}
