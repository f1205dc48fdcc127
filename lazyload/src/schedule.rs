use alloc::boxed::Box;

/// A deferred unit of work.
pub type Task = Box<dyn FnOnce()>;

/// Runs a task after the current callback chain has completed.
///
/// The controller uses this for the re-trigger that follows a full page, so whatever the
/// `on_loaded` consumer changes (including disabling the controller) is visible before the next
/// load decision. Any primitive works as long as the task never runs synchronously inside
/// `schedule`: a timer, a task queue, or an explicit event-loop tick.
pub trait Scheduler {
    fn schedule(&self, task: Task);
}

impl<F: Fn(Task)> Scheduler for F {
    fn schedule(&self, task: Task) {
        self(task)
    }
}
