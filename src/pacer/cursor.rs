/// Round-robin position over a sequence of fixed, non-zero length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CyclicCursor {
    len: usize,
    position: usize,
}

impl CyclicCursor {
    /// Returns `None` for an empty sequence.
    pub fn new(len: usize) -> Option<Self> {
        if len == 0 {
            None
        } else {
            Some(CyclicCursor { len, position: 0 })
        }
    }

    /// Current index, then step forward, wrapping at the end.
    pub fn next_index(&mut self) -> usize {
        let index = self.position;
        self.position = (self.position + 1) % self.len;
        index
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.len
    }
}
