//! Deferred low-priority work.
//!
//! The host adapter only needs a way to say "run this when the frame has
//! spare time"; [`IdleScheduler`] is that seam and [`IdleQueue`] is the
//! in-process implementation the frame ticker drains.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use tracing::trace;

/// Work to run when the scheduler has idle time.
pub type IdleCallback = Box<dyn FnOnce(&Deadline)>;

/// Handle for cancelling a queued callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackId(u64);

/// Source of idle callbacks.
pub trait IdleScheduler {
    fn request_idle_callback(&self, callback: IdleCallback) -> CallbackId;

    /// Returns false when the callback already ran or was never queued.
    fn cancel_idle_callback(&self, id: CallbackId) -> bool;
}

/// Time budget handed to an idle callback.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    end: Option<Instant>,
}

impl Deadline {
    /// A budget that never runs out.
    pub fn unbounded() -> Self {
        Self { end: None }
    }

    /// A budget of `budget` from now. Budgets past the clock's range never
    /// run out.
    pub fn within(budget: Duration) -> Self {
        Self {
            end: Instant::now().checked_add(budget),
        }
    }

    /// A budget that is already spent.
    pub fn exhausted() -> Self {
        Self {
            end: Some(Instant::now()),
        }
    }

    pub fn time_remaining(&self) -> Duration {
        match self.end {
            Some(end) => end.saturating_duration_since(Instant::now()),
            None => Duration::MAX,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.time_remaining().is_zero()
    }
}

struct Queued {
    id: CallbackId,
    callback: IdleCallback,
}

#[derive(Default)]
struct QueueState {
    pending: VecDeque<Queued>,
    next_id: u64,
}

/// FIFO idle-callback queue with cancellation.
#[derive(Default)]
pub struct IdleQueue {
    state: RefCell<QueueState>,
}

impl IdleQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs callbacks queued before this call, in order, while `deadline`
    /// has time left. At least one callback runs if any is queued; callbacks
    /// queued while running wait for the next call. Returns how many ran.
    pub fn run(&self, deadline: &Deadline) -> usize {
        let boundary = CallbackId(self.state.borrow().next_id);
        let mut ran = 0;
        loop {
            if ran > 0 && deadline.is_expired() {
                break;
            }
            let next = {
                let mut state = self.state.borrow_mut();
                match state.pending.front() {
                    Some(queued) if queued.id < boundary => state.pending.pop_front(),
                    _ => None,
                }
            };
            let Some(queued) = next else {
                break;
            };
            trace!(id = queued.id.0, "idle callback");
            (queued.callback)(deadline);
            ran += 1;
        }
        ran
    }

    pub fn len(&self) -> usize {
        self.state.borrow().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IdleScheduler for IdleQueue {
    fn request_idle_callback(&self, callback: IdleCallback) -> CallbackId {
        let mut state = self.state.borrow_mut();
        let id = CallbackId(state.next_id);
        state.next_id += 1;
        state.pending.push_back(Queued { id, callback });
        id
    }

    fn cancel_idle_callback(&self, id: CallbackId) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.pending.len();
        state.pending.retain(|queued| queued.id != id);
        state.pending.len() != before
    }
}

impl fmt::Debug for IdleQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdleQueue").field("pending", &self.len()).finish()
    }
}
