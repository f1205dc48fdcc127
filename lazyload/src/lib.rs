//! A headless infinite-scroll load controller.
//!
//! For host-side utilities (task queue, layout tree, page feed), see the `lazyload-adapter`
//! crate.
//!
//! This crate decides *when* to fetch the next page of a paginated data source: it watches how
//! close a sentinel element is to the bottom of a scrollable viewport and sequences the page
//! loads so that at most one is in flight, teardown is safe while a load is outstanding, and
//! loader results (full page, short page, error) are applied deterministically.
//!
//! It is UI-agnostic. A host layer is expected to provide:
//! - a [`Viewport`] (scroll position, visible extent, scroll notifications)
//! - a sentinel [`Element`] positioned after the loaded content
//! - a [`PageLoader`] that fetches a page for an offset
//! - a [`Scheduler`] that runs deferred tasks after the current callback chain
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod controller;
mod error;
pub mod geometry;
mod loader;
mod options;
mod schedule;
mod slot;
mod state;
mod types;


pub use controller::{Controller, WeakController};
pub use error::{LoadError, StateError};
pub use geometry::{Element, ScrollHandler, Viewport};
pub use loader::{Completion, PageLoader};
pub use options::{
    ControllerOptions, ErrorCallback, LoadConfig, LoadedCallback, LoadingStartedCallback,
};
pub use schedule::{Scheduler, Task};
pub use slot::Slot;
pub use state::PaginationSnapshot;
pub use types::{Page, Phase, SubscriptionId};
