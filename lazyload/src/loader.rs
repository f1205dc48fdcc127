use alloc::rc::Weak;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::controller::Inner;
use crate::types::Ticket;
use crate::{LoadError, Page};

/// Fetches one page of a paginated data source.
///
/// `load` must report through `done` exactly once, either before returning or later from the
/// host's event loop. Returning `Err` means the request was never issued; the controller then
/// reports that error instead. Timeouts are the loader's business.
pub trait PageLoader<T: 'static> {
    fn load(&self, offset: u64, done: Completion<T>) -> Result<(), LoadError>;
}

impl<T: 'static, F> PageLoader<T> for F
where
    F: Fn(u64, Completion<T>) -> Result<(), LoadError>,
{
    fn load(&self, offset: u64, done: Completion<T>) -> Result<(), LoadError> {
        self(offset, done)
    }
}

/// The exactly-once result channel handed to a [`PageLoader`].
///
/// Consuming methods make a second report impossible. Dropping the handle without reporting is
/// reported as [`LoadError::Abandoned`]. A result that arrives after the controller was disabled,
/// destroyed, or dropped is discarded.
pub struct Completion<T: 'static> {
    target: Weak<Inner<T>>,
    ticket: Ticket,
    reported: bool,
}

impl<T: 'static> Completion<T> {
    pub(crate) fn new(target: Weak<Inner<T>>, ticket: Ticket) -> Self {
        Self {
            target,
            ticket,
            reported: false,
        }
    }

    pub fn succeed(self, next_offset: u64, items: Vec<T>) {
        self.complete(Ok(Page::new(next_offset, items)));
    }

    pub fn fail(self, message: impl Into<String>) {
        self.complete(Err(LoadError::Failed(message.into())));
    }

    pub fn complete(mut self, result: Result<Page<T>, LoadError>) {
        self.reported = true;
        if let Some(inner) = self.target.upgrade() {
            inner.settle(self.ticket, result);
        }
    }
}

impl<T: 'static> Drop for Completion<T> {
    fn drop(&mut self) {
        if self.reported {
            return;
        }
        if let Some(inner) = self.target.upgrade() {
            inner.abandon(self.ticket);
        }
    }
}

impl<T: 'static> fmt::Debug for Completion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("ticket", &self.ticket.0)
            .field("reported", &self.reported)
            .finish_non_exhaustive()
    }
}
