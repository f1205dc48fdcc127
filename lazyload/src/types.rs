use alloc::vec::Vec;

/// The lifecycle phase of a [`crate::Controller`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// Constructed or disabled: scroll notifications are not observed.
    #[default]
    Disabled,
    /// Enabled with no load outstanding.
    Idle,
    /// Enabled with exactly one loader invocation outstanding.
    Loading,
    /// Terminal.
    Destroyed,
}

impl Phase {
    pub fn is_enabled(self) -> bool {
        matches!(self, Self::Idle | Self::Loading)
    }
}

/// One page produced by a [`crate::PageLoader`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Page<T> {
    /// The pagination offset to request next; becomes the controller's offset.
    pub next_offset: u64,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(next_offset: u64, items: Vec<T>) -> Self {
        Self { next_offset, items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// A page shorter than `page_size` marks the end of the data source.
    pub fn is_full(&self, page_size: usize) -> bool {
        self.items.len() >= page_size
    }
}

/// Identifies a scroll-notification subscription on a [`crate::Viewport`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubscriptionId(pub u64);

/// Identifies one loader invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Ticket(pub(crate) u64);

/// What asked the controller to evaluate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Trigger {
    /// An explicit `trigger()`/`enable()` call.
    Manual,
    /// A viewport scroll notification.
    Scroll,
    /// The deferred re-trigger after a full page.
    Continuation,
}
