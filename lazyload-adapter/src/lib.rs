//! Host-side utilities for the `lazyload` crate.
//!
//! The `lazyload` crate is UI-agnostic and only decides when a page should be fetched. This crate
//! provides small, framework-neutral pieces a host typically needs around it:
//!
//! - A deferred task queue that serves as the controller's scheduler
//! - A retained layout tree (blocks and scroll containers) for hosts without a layout engine
//! - A page feed that accumulates loaded items and tracks the barrier status
//!
//! This crate is intentionally framework-agnostic (no DOM/ratatui/egui bindings).
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod feed;
mod layout;
mod queue;

#[cfg(test)]
mod tests;

pub use feed::{BarrierStatus, Feed};
pub use layout::{Block, ScrollContainer};
pub use queue::{TaskQueue, deferred};
