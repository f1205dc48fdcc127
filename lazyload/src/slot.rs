use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

type Watcher = Rc<dyn Fn()>;

struct Shared<T: ?Sized> {
    value: RefCell<Option<Rc<T>>>,
    watchers: RefCell<Vec<(u64, Watcher)>>,
    next_watcher: Cell<u64>,
}

/// A shared, re-attachable reference to a host object.
///
/// The controller reads the viewport and sentinel through slots, so a host can construct the
/// controller before its layout exists and attach (or swap) the objects later. Clones share the
/// same underlying cell. A controller notices `attach`/`detach` on its viewport slot and moves its
/// scroll subscription accordingly.
pub struct Slot<T: ?Sized> {
    shared: Rc<Shared<T>>,
}

impl<T: ?Sized> Slot<T> {
    /// Creates an unattached slot.
    pub fn new() -> Self {
        Self::from_value(None)
    }

    pub fn attached(value: Rc<T>) -> Self {
        Self::from_value(Some(value))
    }

    fn from_value(value: Option<Rc<T>>) -> Self {
        Self {
            shared: Rc::new(Shared {
                value: RefCell::new(value),
                watchers: RefCell::new(Vec::new()),
                next_watcher: Cell::new(0),
            }),
        }
    }

    /// Attaches `value`, returning the previously attached object.
    pub fn attach(&self, value: Rc<T>) -> Option<Rc<T>> {
        let previous = self.shared.value.borrow_mut().replace(value);
        self.changed();
        previous
    }

    pub fn detach(&self) -> Option<Rc<T>> {
        let previous = self.shared.value.borrow_mut().take();
        if previous.is_some() {
            self.changed();
        }
        previous
    }

    pub fn get(&self) -> Option<Rc<T>> {
        self.shared.value.borrow().clone()
    }

    pub fn is_attached(&self) -> bool {
        self.shared.value.borrow().is_some()
    }

    /// Registers `watcher` to run after every `attach` and every effective `detach`.
    pub(crate) fn watch(&self, watcher: Watcher) -> u64 {
        let id = self.shared.next_watcher.get();
        self.shared.next_watcher.set(id.wrapping_add(1));
        self.shared.watchers.borrow_mut().push((id, watcher));
        id
    }

    pub(crate) fn unwatch(&self, id: u64) {
        self.shared
            .watchers
            .borrow_mut()
            .retain(|(existing, _)| *existing != id);
    }

    fn changed(&self) {
        let watchers: Vec<Watcher> = self
            .shared
            .watchers
            .borrow()
            .iter()
            .map(|(_, watcher)| Rc::clone(watcher))
            .collect();
        for watcher in watchers {
            watcher();
        }
    }
}

impl<T: ?Sized> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T: ?Sized> Default for Slot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("attached", &self.is_attached())
            .field("watchers", &self.shared.watchers.borrow().len())
            .finish()
    }
}
