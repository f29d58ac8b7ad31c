//! Functional core of the hymnal data layer.
//!
//! Everything in this crate is either a plain data type or a pure function,
//! plus the async traits that describe the I/O seams (`DocumentStore`,
//! `KeyValueStore`, and the repositories). Concrete implementations live in
//! the `hymnal` crate.

pub mod access;
pub mod bible;
pub mod cache;
pub mod catalog;
pub mod favorites;
pub mod snapshot;
pub mod storage;
pub mod text;
