//! A one-shot builder that assembles a [`Vector`] without the per-append
//! overhead of replaying `push_back` one element at a time.
//!
//! `Builder` buffers raw elements and, on finalization, bulk-builds a
//! perfectly balanced tree directly from them (see
//! [`Vector::from_vec`](crate::vector::Vector::from_vec)) -- this is what
//! the spec's "builder output is guaranteed balanced except for the last
//! partial leaf" describes. Concatenating a whole `Vector` mid-build
//! finalizes whatever is buffered so far, concatenates it onto a running
//! accumulator via the same `O(log n)` structural `concat` the public API
//! uses, and resumes buffering fresh elements afterward.

use alloc::vec::Vec;
use core::mem;

use crate::vector::Vector;

/// Sequential builder for [`Vector`].
pub struct Builder<T: Clone> {
    accumulator: Option<Vector<T>>,
    buffer: Vec<T>,
}

impl<T: Clone> Builder<T> {
    /// An empty builder.
    pub fn new() -> Self {
        Builder {
            accumulator: None,
            buffer: Vec::new(),
        }
    }

    /// Appends a single element.
    pub fn add(&mut self, value: T) {
        self.buffer.push(value);
    }

    /// Appends every element of `iter`, in order.
    ///
    /// When `iter` comes from a [`Vector`], prefer
    /// [`add_vector`](Self::add_vector): it skips element-by-element replay
    /// in favor of the structural `O(log n)` concatenation.
    pub fn add_all<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.buffer.extend(iter);
    }

    /// Appends the contents of `vector` via structural concatenation rather
    /// than replaying its elements one by one.
    pub fn add_vector(&mut self, vector: &Vector<T>) {
        self.flush();
        self.accumulator = Some(match self.accumulator.take() {
            Some(acc) => acc.concat(vector),
            None => vector.clone(),
        });
    }

    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let built = Vector::from_vec(mem::take(&mut self.buffer));
        self.accumulator = Some(match self.accumulator.take() {
            Some(acc) => acc.concat(&built),
            None => built,
        });
    }

    /// Finalizes the builder into a [`Vector`], consuming it.
    pub fn result(mut self) -> Vector<T> {
        self.flush();
        self.accumulator.unwrap_or_default()
    }

    /// Discards everything added so far, resetting the builder to empty.
    pub fn clear(&mut self) {
        self.accumulator = None;
        self.buffer.clear();
    }
}

impl<T: Clone> Default for Builder<T> {
    fn default() -> Self {
        Builder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_add_matches_from_iter() {
        let mut b = Builder::new();
        for i in 0..100 {
            b.add(i);
        }
        let v = b.result();
        let expected: Vector<i32> = (0..100).collect();
        assert_eq!(v, expected);
    }

    #[test]
    fn add_vector_then_more_elements() {
        let first: Vector<i32> = (0..40).collect();
        let mut b = Builder::new();
        b.add_vector(&first);
        for i in 40..80 {
            b.add(i);
        }
        let v = b.result();
        let expected: Vector<i32> = (0..80).collect();
        assert_eq!(v, expected);
    }

    #[test]
    fn clear_resets_builder() {
        let mut b: Builder<i32> = Builder::new();
        b.add(1);
        b.add(2);
        b.clear();
        b.add(3);
        assert_eq!(b.result(), Vector::from_iter([3]));
    }
}
