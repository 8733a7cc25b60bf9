//! A persistent, immutable indexed sequence -- a Relaxed Radix Balanced
//! (RRB) vector with a branching factor of 32.
//!
//! [`Vector<T>`] gives effectively-constant-time random access, update,
//! append and prepend, and logarithmic-time concatenation, while every
//! operation structurally shares nodes with the vector it was derived from:
//! deriving a new version never mutates, and never invalidates, any other
//! live version.
//!
//! ```
//! use rrb_vector::Vector;
//!
//! let a: Vector<i32> = (0..1000).collect();
//! let b = a.update(500, -1);
//!
//! assert_eq!(a[500], 500);
//! assert_eq!(b[500], -1);
//! assert_eq!(a.len(), b.len());
//! ```
#![warn(clippy::unwrap_in_result, clippy::panic_in_result_fn)]
#![no_std]

#[cfg(any(test, feature = "std"))]
extern crate std;

extern crate alloc;

mod builder;
mod error;
mod iter;
mod trie;
mod vector;

pub use builder::Builder;
pub use error::RrbError;
pub use iter::{Iter, IterRev};
pub use vector::{IntoIter, Vector};
