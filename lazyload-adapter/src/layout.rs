use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use lazyload::{Element, ScrollHandler, SubscriptionId, Viewport};

/// A retained, positioned block in a host layout tree.
///
/// Hosts that do not own a real layout engine (TUIs, simulations, tests) can describe the
/// sentinel and its containers with blocks and update offsets as content grows.
pub struct Block {
    offset_top: Cell<f64>,
    parent: Option<Rc<dyn Element>>,
}

impl Block {
    pub fn new(offset_top: f64, parent: Option<Rc<dyn Element>>) -> Rc<Self> {
        Rc::new(Self {
            offset_top: Cell::new(offset_top),
            parent,
        })
    }

    pub fn offset(&self) -> f64 {
        self.offset_top.get()
    }

    pub fn set_offset_top(&self, offset_top: f64) {
        self.offset_top.set(offset_top);
    }
}

impl Element for Block {
    fn offset_top(&self) -> Option<f64> {
        Some(self.offset_top.get())
    }

    fn offset_parent(&self) -> Option<&dyn Element> {
        self.parent.as_deref()
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("offset_top", &self.offset_top.get())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}

/// A scrollable container that fans scroll notifications out to its subscribers.
///
/// The scroll offset is clamped to `[0, content_extent - visible_extent]` once a content extent
/// is known; before that only the lower bound applies.
pub struct ScrollContainer {
    offset_top: Cell<f64>,
    parent: Option<Rc<dyn Element>>,
    root: bool,
    scroll: Cell<f64>,
    visible_extent: Cell<f64>,
    content_extent: Cell<Option<f64>>,
    handlers: RefCell<Vec<(SubscriptionId, ScrollHandler)>>,
    next_id: Cell<u64>,
}

impl ScrollContainer {
    pub fn new(offset_top: f64, parent: Option<Rc<dyn Element>>, visible_extent: f64) -> Rc<Self> {
        Rc::new(Self::build(offset_top, parent, false, visible_extent))
    }

    /// The unbounded root viewport. Its offset is always `0`.
    pub fn window(visible_extent: f64) -> Rc<Self> {
        Rc::new(Self::build(0.0, None, true, visible_extent))
    }

    fn build(
        offset_top: f64,
        parent: Option<Rc<dyn Element>>,
        root: bool,
        visible_extent: f64,
    ) -> Self {
        Self {
            offset_top: Cell::new(offset_top),
            parent,
            root,
            scroll: Cell::new(0.0),
            visible_extent: Cell::new(visible_extent.max(0.0)),
            content_extent: Cell::new(None),
            handlers: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll.get()
    }

    pub fn max_scroll_offset(&self) -> Option<f64> {
        self.content_extent
            .get()
            .map(|content| (content - self.visible_extent.get()).max(0.0))
    }

    pub fn clamp_scroll_offset(&self, offset: f64) -> f64 {
        let offset = offset.max(0.0);
        match self.max_scroll_offset() {
            Some(max) => offset.min(max),
            None => offset,
        }
    }

    /// Scrolls to `offset` (clamped) and notifies subscribers if the offset changed.
    ///
    /// Returns the applied offset.
    pub fn scroll_to(&self, offset: f64) -> f64 {
        let next = self.clamp_scroll_offset(offset);
        if next != self.scroll.get() {
            self.scroll.set(next);
            self.notify_scroll();
        }
        next
    }

    pub fn scroll_by(&self, delta: f64) -> f64 {
        self.scroll_to(self.scroll.get() + delta)
    }

    pub fn set_visible_extent(&self, visible_extent: f64) {
        self.visible_extent.set(visible_extent.max(0.0));
        self.scroll.set(self.clamp_scroll_offset(self.scroll.get()));
    }

    /// Sets the total size of the scrollable content. The current offset is re-clamped silently.
    pub fn set_content_extent(&self, content_extent: f64) {
        self.content_extent.set(Some(content_extent.max(0.0)));
        self.scroll.set(self.clamp_scroll_offset(self.scroll.get()));
    }

    pub fn set_offset_top(&self, offset_top: f64) {
        self.offset_top.set(offset_top);
    }

    /// Calls every subscribed handler.
    ///
    /// Handlers may subscribe or unsubscribe while being notified; the set notified is the one
    /// present when the call started.
    pub fn notify_scroll(&self) {
        let handlers: Vec<ScrollHandler> = self
            .handlers
            .borrow()
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();
        for handler in handlers {
            handler();
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.borrow().len()
    }
}

impl Element for ScrollContainer {
    fn offset_top(&self) -> Option<f64> {
        if self.root {
            return Some(0.0);
        }
        Some(self.offset_top.get())
    }

    fn offset_parent(&self) -> Option<&dyn Element> {
        self.parent.as_deref()
    }

    fn is_root(&self) -> bool {
        self.root
    }
}

impl Viewport for ScrollContainer {
    fn scroll_position(&self) -> Option<f64> {
        Some(self.scroll.get())
    }

    fn visible_extent(&self) -> Option<f64> {
        Some(self.visible_extent.get())
    }

    fn subscribe(&self, handler: ScrollHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0.wrapping_add(1));
        self.handlers.borrow_mut().push((id, handler));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.handlers.borrow_mut().retain(|(existing, _)| *existing != id);
    }
}

impl fmt::Debug for ScrollContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollContainer")
            .field("root", &self.root)
            .field("scroll", &self.scroll.get())
            .field("visible_extent", &self.visible_extent.get())
            .field("content_extent", &self.content_extent.get())
            .field("subscribers", &self.subscriber_count())
            .finish_non_exhaustive()
    }
}
