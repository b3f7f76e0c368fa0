//! Shared primitives for the wiregen code generator.
//!
//! Currently this is just [`Fingerprint`], the content hash used by the
//! build cache and the staging pipeline to decide whether a generated file
//! needs rewriting.

#![warn(missing_docs)]

mod hash;

pub use hash::Fingerprint;
