//! Trailing-edge debounce for scroll bursts.
//!
//! The engine never owns a timer. Hosts either poll with [`Debouncer::take_due`]
//! from a clock tick, or arm their own timer for the configured wait and hand
//! the ticket back with [`Debouncer::take_ticket`] when it fires. A newer
//! schedule or a cancel invalidates every older ticket, so only the last
//! event in a burst runs.

use std::time::Duration;

use web_time::Instant;

/// Proof that a particular schedule call is being honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollTicket(pub u64);

#[derive(Debug, Clone)]
pub struct Debouncer {
    wait: Duration,
    generation: u64,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            generation: 0,
            deadline: None,
        }
    }

    pub fn set_wait(&mut self, wait: Duration) {
        self.wait = wait;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Push the deadline to `now + wait`, superseding any earlier schedule.
    pub fn schedule(&mut self, now: Instant) -> ScrollTicket {
        self.generation += 1;
        self.deadline = Some(now + self.wait);
        ScrollTicket(self.generation)
    }

    /// Consume the pending run if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Consume the pending run if `ticket` is the latest one issued.
    pub fn take_ticket(&mut self, ticket: ScrollTicket) -> bool {
        if ticket.0 == self.generation && self.deadline.is_some() {
            self.deadline = None;
            true
        } else {
            false
        }
    }

    /// Drop the pending run and invalidate outstanding tickets.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.deadline = None;
    }
}
