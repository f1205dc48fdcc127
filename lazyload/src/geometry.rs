//! Sentinel proximity math.
//!
//! Everything here is a pure function of what the host reports at call time. Nothing is cached:
//! layout and scroll state may change between two calls.
//!
//! Offsets are measured along the primary scroll axis, in whatever unit the host uses (pixels,
//! rows, cells). Unavailable or non-finite host values read as `0`.

use alloc::rc::Rc;

use crate::SubscriptionId;

/// A zero-argument scroll-notification handler.
pub type ScrollHandler = Rc<dyn Fn()>;

/// A positioned node in the host's layout tree.
pub trait Element {
    /// Offset of this element's leading edge from its positioning parent's.
    fn offset_top(&self) -> Option<f64>;

    /// The nearest positioning ancestor, or `None` at the top of the chain.
    fn offset_parent(&self) -> Option<&dyn Element>;

    /// Whether this is the unbounded root (a window). The root's offset is defined as `0`.
    fn is_root(&self) -> bool {
        false
    }
}

/// A scrollable element that the sentinel is observed in.
pub trait Viewport: Element {
    /// Current scroll offset along the primary axis.
    fn scroll_position(&self) -> Option<f64>;

    /// Visible size along the primary axis.
    fn visible_extent(&self) -> Option<f64>;

    fn subscribe(&self, handler: ScrollHandler) -> SubscriptionId;

    /// Removes a subscription. Unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);
}

enum Walk {
    /// The walk stopped at the requested ancestor.
    Reached(f64),
    /// The walk ran off the top of the chain.
    Exhausted(f64),
}

fn addr<T: ?Sized>(value: &T) -> *const () {
    (value as *const T).cast()
}

fn finite(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn walk<E: Element + ?Sized>(element: &E, stop: Option<*const ()>) -> Walk {
    if stop == Some(addr(element)) {
        return Walk::Reached(0.0);
    }
    if element.is_root() {
        return Walk::Exhausted(0.0);
    }

    let mut total = finite(element.offset_top());
    let mut next = element.offset_parent();
    while let Some(node) = next {
        if stop == Some(addr(node)) {
            return Walk::Reached(total);
        }
        if node.is_root() {
            break;
        }
        total += finite(node.offset_top());
        next = node.offset_parent();
    }
    Walk::Exhausted(total)
}

/// Sums the offsets along `element`'s chain of positioning ancestors, stopping before
/// `viewport`.
///
/// Returns `0` when `element` is the viewport itself or the unbounded root. If the viewport is
/// not on the chain, the sum runs to the top of the chain.
pub fn relative_offset<V, E>(viewport: &V, element: &E) -> f64
where
    V: Element + ?Sized,
    E: Element + ?Sized,
{
    match walk(element, Some(addr(viewport))) {
        Walk::Reached(total) | Walk::Exhausted(total) => total,
    }
}

/// Signed distance from the viewport's origin to `element`.
pub fn gap<V, E>(viewport: &V, element: &E) -> f64
where
    V: Element + ?Sized,
    E: Element + ?Sized,
{
    match walk(element, Some(addr(viewport))) {
        Walk::Reached(total) => total,
        // Not a positioning ancestor: measure both from the top of the document.
        Walk::Exhausted(total) => match walk(viewport, None) {
            Walk::Reached(base) | Walk::Exhausted(base) => total - base,
        },
    }
}

pub fn scroll_position<V: Viewport + ?Sized>(viewport: &V) -> f64 {
    finite(viewport.scroll_position())
}

pub fn visible_extent<V: Viewport + ?Sized>(viewport: &V) -> f64 {
    finite(viewport.visible_extent())
}

/// Whether the sentinel lies within `threshold` of the bottom edge of the viewport's visible
/// area: `gap < scroll + extent + threshold`. Equality is not near.
pub fn is_sentinel_near<V, E>(viewport: &V, sentinel: &E, threshold: f64) -> bool
where
    V: Viewport + ?Sized,
    E: Element + ?Sized,
{
    let gap = gap(viewport, sentinel);
    gap < scroll_position(viewport) + visible_extent(viewport) + threshold
}

/// [`is_sentinel_near`] for references that may not be attached yet.
///
/// Fails open: a missing viewport or sentinel reads as near.
pub fn should_load<V, E>(viewport: Option<&V>, sentinel: Option<&E>, threshold: f64) -> bool
where
    V: Viewport + ?Sized,
    E: Element + ?Sized,
{
    match (viewport, sentinel) {
        (Some(viewport), Some(sentinel)) => is_sentinel_near(viewport, sentinel, threshold),
        _ => true,
    }
}
