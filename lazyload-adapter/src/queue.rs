use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;

use lazyload::{Completion, LoadError, Page, PageLoader, Scheduler, Task};

/// A single-threaded deferred task queue.
///
/// This is the smallest event loop a host needs to drive a [`lazyload::Controller`]: the
/// controller schedules its continuations here, and the host calls [`TaskQueue::run_turn`] from
/// its own loop (a frame tick, an idle callback, a test).
///
/// Clones share the same queue.
#[derive(Clone, Default)]
pub struct TaskQueue {
    tasks: Rc<RefCell<VecDeque<Task>>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    pub fn push(&self, task: impl FnOnce() + 'static) {
        self.tasks.borrow_mut().push_back(Box::new(task));
    }

    /// Runs the tasks that were queued before this call.
    ///
    /// Tasks queued while the turn runs wait for the next turn. Returns the number of tasks run.
    pub fn run_turn(&self) -> usize {
        let due = self.tasks.borrow().len();
        let mut ran = 0;
        while ran < due {
            // A task may have drained the queue by running a nested turn.
            let Some(task) = self.tasks.borrow_mut().pop_front() else {
                break;
            };
            task();
            ran += 1;
        }
        ran
    }

    /// Runs turns until the queue is empty or `max_turns` turns have run.
    ///
    /// Returns the number of tasks run.
    pub fn run_until_idle(&self, max_turns: usize) -> usize {
        let mut ran = 0;
        for _ in 0..max_turns {
            if self.is_empty() {
                break;
            }
            ran += self.run_turn();
        }
        ran
    }
}

impl Scheduler for TaskQueue {
    fn schedule(&self, task: Task) {
        self.tasks.borrow_mut().push_back(task);
    }
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue")
            .field("len", &self.len())
            .finish()
    }
}

/// Adapts a blocking page fetch into a [`PageLoader`] that reports on the next queue turn.
///
/// Useful for simulations and tests, and for hosts whose data is local but should still arrive
/// asynchronously.
pub fn deferred<T, F>(queue: &TaskQueue, fetch: F) -> impl PageLoader<T> + 'static
where
    T: 'static,
    F: Fn(u64) -> Result<Page<T>, LoadError> + 'static,
{
    let queue = queue.clone();
    let fetch = Rc::new(fetch);
    move |offset: u64, done: Completion<T>| -> Result<(), LoadError> {
        let fetch = Rc::clone(&fetch);
        queue.push(move || done.complete(fetch(offset)));
        Ok(())
    }
}
