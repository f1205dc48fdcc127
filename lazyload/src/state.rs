use crate::types::{Ticket, Trigger};
use crate::{Phase, StateError};

/// A lightweight, serializable snapshot of a controller's pagination state.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PaginationSnapshot {
    pub offset: u64,
    pub phase: Phase,
    /// Auto-loading stopped after a short page or an error; only a manual trigger resumes it.
    pub halted: bool,
}

/// How a loader result relates to the current state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Settle {
    /// Not the outstanding load (already settled, or cancelled).
    Stale,
    /// The controller was disabled or destroyed while the load was outstanding.
    Discarded,
    /// Apply the result; the phase is back to `Idle`.
    Apply,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AfterLoad {
    Continue,
    Halt,
}

/// The controller's pagination state machine.
///
/// Every method is one named transition. None of them call out to the host, so the controller can
/// release its borrow before invoking user code.
#[derive(Clone, Debug)]
pub(crate) struct PaginationState {
    offset: u64,
    phase: Phase,
    threshold: f64,
    halted: bool,
    // May outlive a disable: the loader still owes a result for it.
    outstanding: Option<Ticket>,
    next_ticket: u64,
}

impl PaginationState {
    pub(crate) fn new(offset: u64, threshold: f64) -> Self {
        Self {
            offset,
            phase: Phase::Disabled,
            threshold: if threshold.is_finite() {
                threshold.max(0.0)
            } else {
                0.0
            },
            halted: false,
            outstanding: None,
            next_ticket: 0,
        }
    }

    pub(crate) fn offset(&self) -> u64 {
        self.offset
    }

    pub(crate) fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn threshold(&self) -> f64 {
        self.threshold
    }

    pub(crate) fn is_halted(&self) -> bool {
        self.halted
    }

    pub(crate) fn snapshot(&self) -> PaginationSnapshot {
        PaginationSnapshot {
            offset: self.offset,
            phase: self.phase,
            halted: self.halted,
        }
    }

    /// `Disabled → Idle` (or `Loading`, if a load issued before a disable is still owed).
    ///
    /// Returns `true` when the phase changed; the caller then subscribes and seeds a trigger.
    pub(crate) fn enable(&mut self) -> Result<bool, StateError> {
        match self.phase {
            Phase::Destroyed => Err(StateError::Destroyed),
            Phase::Idle | Phase::Loading => Ok(false),
            Phase::Disabled => {
                self.phase = if self.outstanding.is_some() {
                    Phase::Loading
                } else {
                    Phase::Idle
                };
                self.halted = false;
                ltrace!(phase = ?self.phase, "PaginationState::enable");
                Ok(true)
            }
        }
    }

    /// `Idle | Loading → Disabled`. Returns `true` when the phase changed.
    pub(crate) fn disable(&mut self) -> Result<bool, StateError> {
        match self.phase {
            Phase::Destroyed => Err(StateError::Destroyed),
            Phase::Disabled => Ok(false),
            Phase::Idle | Phase::Loading => {
                self.phase = Phase::Disabled;
                ltrace!(outstanding = self.outstanding.is_some(), "PaginationState::disable");
                Ok(true)
            }
        }
    }

    /// Any phase `→ Destroyed`. Returns `true` when the phase changed.
    pub(crate) fn destroy(&mut self) -> bool {
        if self.phase == Phase::Destroyed {
            return false;
        }
        self.phase = Phase::Destroyed;
        ltrace!("PaginationState::destroy");
        true
    }

    /// Decides whether a trigger may evaluate geometry.
    ///
    /// Only a manual trigger on a destroyed controller is an error; scroll notifications and
    /// continuations that race a teardown are silently dropped.
    pub(crate) fn admit(&self, trigger: Trigger) -> Result<bool, StateError> {
        match self.phase {
            Phase::Destroyed if trigger == Trigger::Manual => Err(StateError::Destroyed),
            Phase::Destroyed | Phase::Disabled | Phase::Loading => Ok(false),
            Phase::Idle => Ok(trigger == Trigger::Manual || !self.halted),
        }
    }

    /// `Idle → Loading`. Returns the ticket for the new load and the offset to request.
    pub(crate) fn begin_load(&mut self) -> (Ticket, u64) {
        debug_assert_eq!(self.phase, Phase::Idle, "begin_load outside Idle");
        let ticket = Ticket(self.next_ticket);
        self.next_ticket = self.next_ticket.wrapping_add(1);
        self.outstanding = Some(ticket);
        self.phase = Phase::Loading;
        self.halted = false;
        (ticket, self.offset)
    }

    /// Drops a load that was started but never handed to the loader.
    pub(crate) fn cancel_load(&mut self, ticket: Ticket) {
        if self.outstanding == Some(ticket) {
            self.outstanding = None;
            if self.phase == Phase::Loading {
                self.phase = Phase::Idle;
            }
        }
    }

    /// Accepts a loader result for `ticket`. `Loading → Idle` when the result applies.
    pub(crate) fn settle(&mut self, ticket: Ticket) -> Settle {
        if self.outstanding != Some(ticket) {
            return Settle::Stale;
        }
        self.outstanding = None;
        if !self.phase.is_enabled() {
            return Settle::Discarded;
        }
        self.phase = Phase::Idle;
        Settle::Apply
    }

    /// Records a successful page. A page that is not `full` ends auto-loading.
    ///
    /// The offset never moves backwards; a regressing `next_offset` is ignored.
    pub(crate) fn record_success(&mut self, next_offset: u64, full: bool) -> AfterLoad {
        if next_offset >= self.offset {
            self.offset = next_offset;
        } else {
            lwarn!(
                current = self.offset,
                next = next_offset,
                "loader returned a smaller offset; keeping the current one"
            );
        }

        if full {
            AfterLoad::Continue
        } else {
            self.halted = true;
            AfterLoad::Halt
        }
    }

    pub(crate) fn record_failure(&mut self) {
        self.halted = true;
    }
}
