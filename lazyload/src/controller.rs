use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use crate::geometry::{self, ScrollHandler};
use crate::options::{ErrorCallback, LoadedCallback, LoadingStartedCallback};
use crate::slot::Slot;
use crate::state::{AfterLoad, PaginationState, Settle};
use crate::types::{Ticket, Trigger};
use crate::{
    Completion, ControllerOptions, Element, LoadError, Page, PageLoader, PaginationSnapshot,
    Phase, Scheduler, StateError, SubscriptionId, Viewport,
};

/// Decides when to fetch the next page of a paginated source.
///
/// The controller watches a sentinel element inside a scrollable viewport. Whenever it is asked to
/// evaluate (on `enable`, on every scroll notification while enabled, on `trigger`, and after each
/// full page) it checks whether the sentinel is within the configured threshold of the visible
/// area, and if so invokes the [`PageLoader`] with the current offset.
///
/// Guarantees:
/// - At most one loader invocation is outstanding at any time.
/// - The offset only moves forward, and only on a successful page.
/// - A result that arrives after `disable` or `destroy` is dropped without side effects.
/// - After a short page or an error, auto-loading stops until `trigger` is called.
/// - A panicking callback is logged and suppressed (with `feature = "std"`).
///
/// The type is single-threaded and cheap to clone: clones are handles to the same controller.
/// Use [`Controller::downgrade`] inside callbacks to avoid a reference cycle.
pub struct Controller<T: 'static> {
    inner: Rc<Inner<T>>,
}

/// A non-owning handle to a [`Controller`].
pub struct WeakController<T: 'static> {
    inner: Weak<Inner<T>>,
}

pub(crate) struct Inner<T: 'static> {
    this: Weak<Inner<T>>,
    state: RefCell<PaginationState>,
    page_size: usize,
    loader: RefCell<Rc<dyn PageLoader<T>>>,
    scheduler: Rc<dyn Scheduler>,
    viewport: Slot<dyn Viewport>,
    sentinel: Slot<dyn Element>,
    subscription: RefCell<Option<(Rc<dyn Viewport>, SubscriptionId)>>,
    viewport_watch: u64,
    // Set while the loader is being invoked; a completion dropped during that window may be
    // followed by an `Err` return, which takes precedence.
    invoking: Cell<Option<Ticket>>,
    abandoned: Cell<Option<Ticket>>,
    on_loading_started: Option<LoadingStartedCallback>,
    on_loaded: Option<LoadedCallback<T>>,
    on_error: Option<ErrorCallback>,
}

impl<T: 'static> Controller<T> {
    /// Creates a disabled controller. Nothing is observed or loaded until [`Self::enable`].
    pub fn new(options: ControllerOptions<T>) -> Self {
        let ControllerOptions {
            config,
            loader,
            scheduler,
            viewport,
            sentinel,
            on_loading_started,
            on_loaded,
            on_error,
        } = options;
        ldebug!(
            page_size = config.page_size,
            threshold = config.threshold,
            initial_offset = config.initial_offset,
            "Controller::new"
        );

        let inner = Rc::new_cyclic(|this: &Weak<Inner<T>>| {
            let watcher = this.clone();
            let viewport_watch = viewport.watch(Rc::new(move || {
                if let Some(inner) = watcher.upgrade() {
                    inner.viewport_changed();
                }
            }));
            Inner {
                this: this.clone(),
                state: RefCell::new(PaginationState::new(
                    config.initial_offset,
                    config.threshold,
                )),
                page_size: config.effective_page_size(),
                loader: RefCell::new(loader),
                scheduler,
                viewport,
                sentinel,
                subscription: RefCell::new(None),
                viewport_watch,
                invoking: Cell::new(None),
                abandoned: Cell::new(None),
                on_loading_started,
                on_loaded,
                on_error,
            }
        });
        Self { inner }
    }

    /// Starts observing scroll notifications and evaluates once.
    ///
    /// No-op when already enabled.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Destroyed`] after [`Self::destroy`].
    pub fn enable(&self) -> Result<(), StateError> {
        if !self.inner.state.borrow_mut().enable()? {
            return Ok(());
        }
        ldebug!("Controller::enable");
        self.inner.sync_subscription();
        self.inner.run(Trigger::Manual)
    }

    /// Stops observing scroll notifications.
    ///
    /// An outstanding load is not cancelled; its result is dropped when it arrives. No-op when
    /// already disabled.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Destroyed`] after [`Self::destroy`].
    pub fn disable(&self) -> Result<(), StateError> {
        if self.inner.state.borrow_mut().disable()? {
            ldebug!("Controller::disable");
            self.inner.unsubscribe();
        }
        Ok(())
    }

    /// Permanently tears the controller down. Repeated calls are no-ops.
    pub fn destroy(&self) {
        if self.inner.state.borrow_mut().destroy() {
            ldebug!("Controller::destroy");
            self.inner.unsubscribe();
        }
    }

    /// Evaluates the sentinel and loads the next page if it is near.
    ///
    /// This is also how auto-loading resumes after a short page or an error. No-op while disabled
    /// or while a load is outstanding.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Destroyed`] after [`Self::destroy`].
    pub fn trigger(&self) -> Result<(), StateError> {
        self.inner.run(Trigger::Manual)
    }

    /// Replaces the page loader. The next load uses it; an outstanding load is unaffected.
    pub fn set_loader(&self, loader: impl PageLoader<T> + 'static) {
        *self.inner.loader.borrow_mut() = Rc::new(loader);
    }

    pub fn phase(&self) -> Phase {
        self.inner.state.borrow().phase()
    }

    pub fn is_enabled(&self) -> bool {
        self.phase().is_enabled()
    }

    pub fn is_loading(&self) -> bool {
        self.phase() == Phase::Loading
    }

    /// Whether auto-loading stopped after a short page or an error.
    pub fn is_halted(&self) -> bool {
        self.inner.state.borrow().is_halted()
    }

    /// The offset the next load will request.
    pub fn offset(&self) -> u64 {
        self.inner.state.borrow().offset()
    }

    pub fn page_size(&self) -> usize {
        self.inner.page_size
    }

    pub fn threshold(&self) -> f64 {
        self.inner.state.borrow().threshold()
    }

    pub fn snapshot(&self) -> PaginationSnapshot {
        self.inner.state.borrow().snapshot()
    }

    /// The viewport slot. Attaching or swapping a viewport while enabled moves the scroll
    /// subscription to it.
    pub fn viewport(&self) -> &Slot<dyn Viewport> {
        &self.inner.viewport
    }

    pub fn sentinel(&self) -> &Slot<dyn Element> {
        &self.inner.sentinel
    }

    pub fn downgrade(&self) -> WeakController<T> {
        WeakController {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

impl<T: 'static> Clone for Controller<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: 'static> fmt::Debug for Controller<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("Controller")
            .field("phase", &state.phase())
            .field("offset", &state.offset())
            .field("halted", &state.is_halted())
            .field("page_size", &self.inner.page_size)
            .finish_non_exhaustive()
    }
}

impl<T: 'static> WeakController<T> {
    pub fn upgrade(&self) -> Option<Controller<T>> {
        self.inner.upgrade().map(|inner| Controller { inner })
    }
}

impl<T: 'static> Clone for WeakController<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: 'static> fmt::Debug for WeakController<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakController")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl<T: 'static> Inner<T> {
    /// Keeps the scroll subscription on whatever the viewport slot currently holds.
    fn sync_subscription(&self) {
        let current = self.viewport.get();
        let unchanged = match (&current, &*self.subscription.borrow()) {
            (Some(viewport), Some((subscribed, _))) => Rc::ptr_eq(viewport, subscribed),
            (None, None) => true,
            _ => false,
        };
        if !unchanged {
            self.unsubscribe();
        }
        let Some(viewport) = current else {
            lwarn!("viewport is not attached; scroll notifications are unavailable");
            return;
        };
        if unchanged {
            return;
        }
        let this = self.this.clone();
        let handler: ScrollHandler = Rc::new(move || {
            if let Some(inner) = this.upgrade() {
                inner.run_auto(Trigger::Scroll);
            }
        });
        let id = viewport.subscribe(handler);
        ltrace!(id = id.0, "subscribed to scroll notifications");
        *self.subscription.borrow_mut() = Some((viewport, id));
    }

    fn viewport_changed(&self) {
        if self.state.borrow().phase().is_enabled() {
            ltrace!(attached = self.viewport.is_attached(), "viewport slot changed");
            self.sync_subscription();
        }
    }

    fn unsubscribe(&self) {
        let subscription = self.subscription.borrow_mut().take();
        if let Some((viewport, id)) = subscription {
            ltrace!(id = id.0, "unsubscribed from scroll notifications");
            viewport.unsubscribe(id);
        }
    }

    fn run_auto(&self, trigger: Trigger) {
        if let Err(error) = self.run(trigger) {
            lwarn!(%error, ?trigger, "automatic trigger rejected");
        }
    }

    fn run(&self, trigger: Trigger) -> Result<(), StateError> {
        let threshold = {
            let state = self.state.borrow();
            if !state.admit(trigger)? {
                ltrace!(?trigger, phase = ?state.phase(), halted = state.is_halted(), "trigger skipped");
                return Ok(());
            }
            state.threshold()
        };

        let viewport = self.viewport.get();
        let sentinel = self.sentinel.get();
        if !geometry::should_load(viewport.as_deref(), sentinel.as_deref(), threshold) {
            ltrace!(?trigger, "sentinel is not near");
            return Ok(());
        }

        let (ticket, offset) = self.state.borrow_mut().begin_load();
        ldebug!(offset, ?trigger, "load started");
        if let Some(cb) = &self.on_loading_started {
            guarded("on_loading_started", || cb());
        }

        // The callback may have torn the controller down.
        if !self.state.borrow().phase().is_enabled() {
            ldebug!(offset, "controller disabled before the loader was invoked");
            self.state.borrow_mut().cancel_load(ticket);
            return Ok(());
        }

        self.invoke(ticket, offset);
        Ok(())
    }

    fn invoke(&self, ticket: Ticket, offset: u64) {
        let loader = Rc::clone(&self.loader.borrow());
        let done = Completion::new(self.this.clone(), ticket);

        let previous = self.invoking.replace(Some(ticket));
        let outcome = guarded("loader", || loader.load(offset, done));
        self.invoking.set(previous);

        let abandoned = self.abandoned.get() == Some(ticket);
        if abandoned {
            self.abandoned.set(None);
        }

        match outcome {
            Some(Ok(())) if abandoned => self.settle(ticket, Err(LoadError::Abandoned)),
            Some(Ok(())) => {}
            Some(Err(error)) => self.settle(ticket, Err(error)),
            None => self.settle(ticket, Err(LoadError::Panicked)),
        }
    }

    pub(crate) fn abandon(&self, ticket: Ticket) {
        if self.invoking.get() == Some(ticket) {
            self.abandoned.set(Some(ticket));
            return;
        }
        self.settle(ticket, Err(LoadError::Abandoned));
    }

    pub(crate) fn settle(&self, ticket: Ticket, result: Result<Page<T>, LoadError>) {
        let settle = self.state.borrow_mut().settle(ticket);
        match settle {
            Settle::Stale => {
                ltrace!(ticket = ticket.0, "ignoring a result for a load that is no longer outstanding");
                return;
            }
            Settle::Discarded => {
                ldebug!(ticket = ticket.0, "discarding a result: controller disabled or destroyed");
                return;
            }
            Settle::Apply => {}
        }

        match result {
            Err(error) => {
                self.state.borrow_mut().record_failure();
                lwarn!(%error, "load failed; auto-loading halted");
                if let Some(cb) = &self.on_error {
                    guarded("on_error", || cb(&error));
                }
            }
            Ok(page) => self.apply_page(page),
        }
    }

    fn apply_page(&self, page: Page<T>) {
        let (after, offset) = {
            let mut state = self.state.borrow_mut();
            let after = state.record_success(page.next_offset, page.is_full(self.page_size));
            (after, state.offset())
        };
        ldebug!(offset, len = page.len(), "page loaded");

        if let Some(cb) = &self.on_loaded {
            let items: Vec<T> = page.items;
            guarded("on_loaded", move || cb(offset, items));
        }

        if !self.state.borrow().phase().is_enabled() {
            ltrace!("controller disabled by on_loaded; not continuing");
            return;
        }
        if after == AfterLoad::Halt {
            ldebug!(page_size = self.page_size, "short page; auto-loading halted");
            return;
        }

        let this = self.this.clone();
        self.scheduler.schedule(Box::new(move || {
            if let Some(inner) = this.upgrade() {
                inner.run_auto(Trigger::Continuation);
            }
        }));
    }
}

impl<T: 'static> Drop for Inner<T> {
    fn drop(&mut self) {
        self.viewport.unwatch(self.viewport_watch);
        if let Some((viewport, id)) = self.subscription.get_mut().take() {
            viewport.unsubscribe(id);
        }
    }
}

/// Runs a user callback, logging and suppressing a panic.
#[cfg(feature = "std")]
#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn guarded<R>(callback: &'static str, f: impl FnOnce() -> R) -> Option<R> {
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
        Ok(value) => Some(value),
        Err(_) => {
            lerror!(callback, "callback panicked; panic suppressed");
            None
        }
    }
}

#[cfg(not(feature = "std"))]
#[allow(unused_variables)]
fn guarded<R>(callback: &'static str, f: impl FnOnce() -> R) -> Option<R> {
    Some(f())
}
