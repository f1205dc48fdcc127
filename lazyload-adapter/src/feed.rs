use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::{Ref, RefCell};
use core::fmt;

use lazyload::ControllerOptions;

/// What the sentinel ("barrier") at the end of a list should show.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BarrierStatus {
    /// Nothing loaded yet, or the data source is exhausted.
    #[default]
    Hidden,
    /// A page is being fetched.
    Loading,
    /// A full page arrived; more may follow.
    Continue,
    /// The last load failed; a manual trigger retries.
    Failed(String),
}

impl BarrierStatus {
    pub fn is_visible(&self) -> bool {
        !matches!(self, Self::Hidden)
    }
}

struct FeedState<T> {
    pages: Vec<Vec<T>>,
    status: BarrierStatus,
    offset: u64,
    finished: bool,
}

/// Accumulates loaded pages and tracks the barrier status of a paginated list.
///
/// This is the presentation-agnostic half of an infinite-scroll list component: bind it to a
/// controller's options and render from [`Feed::pages`] and [`Feed::status`].
///
/// Clones share the same state.
pub struct Feed<T> {
    state: Rc<RefCell<FeedState<T>>>,
}

impl<T: 'static> Feed<T> {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(FeedState {
                pages: Vec::new(),
                status: BarrierStatus::Hidden,
                offset: 0,
                finished: false,
            })),
        }
    }

    /// Installs the feed's callbacks on `options`.
    ///
    /// `on_loaded` is replaced: the feed takes ownership of the items. Existing
    /// `on_loading_started` and `on_error` callbacks still run, after the feed has updated.
    pub fn bind(&self, mut options: ControllerOptions<T>) -> ControllerOptions<T> {
        let page_size = options.config.effective_page_size();
        self.state.borrow_mut().offset = options.config.initial_offset;

        let started = Rc::clone(&self.state);
        let previous = options.on_loading_started.take();
        options = options.with_on_loading_started(move || {
            started.borrow_mut().status = BarrierStatus::Loading;
            if let Some(cb) = &previous {
                cb();
            }
        });

        let loaded = Rc::clone(&self.state);
        options = options.with_on_loaded(move |offset, items: Vec<T>| {
            let mut state = loaded.borrow_mut();
            let len = items.len();
            if len > 0 {
                state.offset = offset;
                state.pages.push(items);
            }
            if len < page_size {
                state.status = BarrierStatus::Hidden;
                state.finished = true;
            } else {
                state.status = BarrierStatus::Continue;
                state.finished = false;
            }
        });

        let failed = Rc::clone(&self.state);
        let previous = options.on_error.take();
        options.with_on_error(move |error| {
            failed.borrow_mut().status = BarrierStatus::Failed(error.to_string());
            if let Some(cb) = &previous {
                cb(error);
            }
        })
    }

    pub fn pages(&self) -> Ref<'_, [Vec<T>]> {
        Ref::map(self.state.borrow(), |state| state.pages.as_slice())
    }

    pub fn page_count(&self) -> usize {
        self.state.borrow().pages.len()
    }

    pub fn item_count(&self) -> usize {
        self.state.borrow().pages.iter().map(Vec::len).sum()
    }

    pub fn status(&self) -> BarrierStatus {
        self.state.borrow().status.clone()
    }

    /// The offset of the last non-empty page.
    pub fn offset(&self) -> u64 {
        self.state.borrow().offset
    }

    /// Whether a short page marked the end of the data source.
    pub fn is_finished(&self) -> bool {
        self.state.borrow().finished
    }

    /// Iterates over all loaded items in order.
    pub fn for_each_item(&self, mut f: impl FnMut(usize, &T)) {
        let state = self.state.borrow();
        for (index, item) in state.pages.iter().flatten().enumerate() {
            f(index, item);
        }
    }
}

impl<T: 'static> Default for Feed<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Feed<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T> fmt::Debug for Feed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Feed")
            .field("pages", &state.pages.len())
            .field("status", &state.status)
            .field("offset", &state.offset)
            .field("finished", &state.finished)
            .finish()
    }
}
