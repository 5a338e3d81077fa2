//! Fixed-capacity sample history.

use std::ops::Index;

/// Ring buffer where index `0` is the most recently pushed sample.
///
/// The capacity is fixed at construction; pushing onto a full buffer drops
/// the oldest sample. A zero-capacity buffer accepts pushes and stores
/// nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct CircularBuffer {
    data: Vec<f64>,
    front: usize,
}

impl CircularBuffer {
    /// Create a zero-filled buffer holding `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0.0; capacity],
            front: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn push_front(&mut self, value: f64) {
        let len = self.data.len();
        if len == 0 {
            return;
        }
        self.front = (self.front + len - 1) % len;
        self.data[self.front] = value;
    }

    /// Zero every slot in place.
    pub fn reset(&mut self) {
        self.data.fill(0.0);
        self.front = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.data.len()).map(move |i| self[i])
    }
}

impl Index<usize> for CircularBuffer {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        let len = self.data.len();
        assert!(index < len, "index {index} out of range for history of {len}");
        &self.data[(self.front + index) % len]
    }
}
