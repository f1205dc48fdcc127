use alloc::rc::Rc;
use alloc::vec::Vec;

use crate::slot::Slot;
use crate::{Element, LoadError, PageLoader, Scheduler, Viewport};

/// A callback fired right before the loader is invoked.
pub type LoadingStartedCallback = Rc<dyn Fn()>;

/// A callback fired with the new offset and the items of a successful page.
pub type LoadedCallback<T> = Rc<dyn Fn(u64, Vec<T>)>;

/// A callback fired when a load fails.
pub type ErrorCallback = Rc<dyn Fn(&LoadError)>;

/// Plain pagination settings.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LoadConfig {
    /// Items in a full page. A shorter page means the data source is exhausted.
    pub page_size: usize,
    /// How far past the visible area the sentinel may be and still trigger a pre-fetch.
    pub threshold: f64,
    /// The offset passed to the first load.
    pub initial_offset: u64,
}

impl LoadConfig {
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_initial_offset(mut self, initial_offset: u64) -> Self {
        self.initial_offset = initial_offset;
        self
    }

    /// `page_size` with `0` treated as `1`.
    pub fn effective_page_size(&self) -> usize {
        self.page_size.max(1)
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            threshold: 100.0,
            initial_offset: 0,
        }
    }
}

/// Configuration for [`crate::Controller`].
///
/// Closures are stored in `Rc`s, so cloning is cheap and clones share the same callbacks, loader,
/// scheduler and slots.
pub struct ControllerOptions<T: 'static> {
    pub config: LoadConfig,
    pub loader: Rc<dyn PageLoader<T>>,
    pub scheduler: Rc<dyn Scheduler>,
    /// The scroll container. May be attached after construction.
    pub viewport: Slot<dyn Viewport>,
    /// The sentinel ("barrier") element. May be attached after construction.
    pub sentinel: Slot<dyn Element>,
    pub on_loading_started: Option<LoadingStartedCallback>,
    pub on_loaded: Option<LoadedCallback<T>>,
    pub on_error: Option<ErrorCallback>,
}

impl<T: 'static> Clone for ControllerOptions<T> {
    fn clone(&self) -> Self {
        Self {
            config: self.config,
            loader: Rc::clone(&self.loader),
            scheduler: Rc::clone(&self.scheduler),
            viewport: self.viewport.clone(),
            sentinel: self.sentinel.clone(),
            on_loading_started: self.on_loading_started.clone(),
            on_loaded: self.on_loaded.clone(),
            on_error: self.on_error.clone(),
        }
    }
}

impl<T: 'static> ControllerOptions<T> {
    /// Creates options with default [`LoadConfig`], unattached slots and no callbacks.
    pub fn new(loader: impl PageLoader<T> + 'static, scheduler: impl Scheduler + 'static) -> Self {
        Self {
            config: LoadConfig::default(),
            loader: Rc::new(loader),
            scheduler: Rc::new(scheduler),
            viewport: Slot::new(),
            sentinel: Slot::new(),
            on_loading_started: None,
            on_loaded: None,
            on_error: None,
        }
    }

    pub fn with_config(mut self, config: LoadConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.config.page_size = page_size;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.config.threshold = threshold;
        self
    }

    pub fn with_initial_offset(mut self, initial_offset: u64) -> Self {
        self.config.initial_offset = initial_offset;
        self
    }

    pub fn with_viewport(mut self, viewport: Slot<dyn Viewport>) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_sentinel(mut self, sentinel: Slot<dyn Element>) -> Self {
        self.sentinel = sentinel;
        self
    }

    pub fn with_on_loading_started(mut self, f: impl Fn() + 'static) -> Self {
        self.on_loading_started = Some(Rc::new(f));
        self
    }

    pub fn with_on_loaded(mut self, f: impl Fn(u64, Vec<T>) + 'static) -> Self {
        self.on_loaded = Some(Rc::new(f));
        self
    }

    pub fn with_on_error(mut self, f: impl Fn(&LoadError) + 'static) -> Self {
        self.on_error = Some(Rc::new(f));
        self
    }
}

impl<T: 'static> core::fmt::Debug for ControllerOptions<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ControllerOptions")
            .field("config", &self.config)
            .field("viewport", &self.viewport)
            .field("sentinel", &self.sentinel)
            .field("on_loading_started", &self.on_loading_started.is_some())
            .field("on_loaded", &self.on_loaded.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish_non_exhaustive()
    }
}
