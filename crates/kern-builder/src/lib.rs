//! Builder for kernel IR.
//!
//! `Context` is the mutation surface for producers: it opens and closes
//! functions, allocates registers, tuples, labels and immediates, and
//! appends instructions while keeping the block structure consistent.

#![no_std]

extern crate alloc;

mod context;

pub use context::Context;
