//! Cached data access for the LPMI hymnal.
//!
//! Songs, collections, the Bible text and per-user favorites are read from
//! a tree-structured remote store through a time-stamped local cache, and
//! gated by the session's role and premium status.

pub mod cache;
pub mod clock;
pub mod config;
pub mod context;
pub mod local;
pub mod remote;
pub mod services;
pub mod storage;
pub mod sync;

pub use config::Config;
pub use context::HymnalContext;
