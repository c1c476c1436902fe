#![forbid(unsafe_code)]

//! Debounced recomputation slot.
//!
//! Resize events arrive in bursts while a window is dragged or a device is
//! rotated. [`Debouncer`] collapses a burst into one recomputation that runs a
//! fixed quiet period after the last event.
//!
//! # Invariant
//!
//! At most one task is pending. [`Debouncer::schedule`] always cancels the
//! previous task before arming the new one, and reports what it cancelled so
//! timer-driven hosts can clear their own timeout handle.
//!
//! # Driving
//!
//! - Deterministic hosts pass monotonic time to [`Debouncer::poll`].
//! - Timer-driven hosts arm one real timer per [`Scheduled`] and call
//!   [`Debouncer::fire`] with its generation when the timer expires; stale
//!   generations are ignored.

use core::time::Duration;

/// Event that may request a recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The viewport was resized.
    Resize,
    /// The page was shown; `persisted` is set when it came from the
    /// back/forward cache instead of a fresh load.
    PageShow { persisted: bool },
}

impl Trigger {
    /// Whether this trigger should schedule a recomputation.
    #[must_use]
    pub const fn requests_recompute(self) -> bool {
        match self {
            Self::Resize => true,
            Self::PageShow { persisted } => persisted,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Resize => "resize",
            Self::PageShow { .. } => "pageshow",
        }
    }
}

/// A scheduled recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTask {
    pub generation: u64,
    pub deadline: Duration,
}

/// Result of [`Debouncer::schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduled {
    /// The newly armed task.
    pub task: PendingTask,
    /// The task it replaced, if one was pending.
    pub cancelled: Option<PendingTask>,
    /// Quiet period until `task` is due.
    pub delay: Duration,
}

#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<PendingTask>,
    next_generation: u64,
    fired: u64,
}

impl Debouncer {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            next_generation: 0,
            fired: 0,
        }
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    #[must_use]
    pub const fn pending(&self) -> Option<PendingTask> {
        self.pending
    }

    /// Number of tasks that have come due.
    #[must_use]
    pub const fn fired_count(&self) -> u64 {
        self.fired
    }

    /// Cancel any pending task and arm a new one due at `now + delay`.
    pub fn schedule(&mut self, now: Duration) -> Scheduled {
        let cancelled = self.pending.take();
        self.next_generation = self.next_generation.wrapping_add(1);
        let task = PendingTask {
            generation: self.next_generation,
            deadline: now.saturating_add(self.delay),
        };
        self.pending = Some(task);
        Scheduled {
            task,
            cancelled,
            delay: self.delay,
        }
    }

    /// Cancel the pending task, if any.
    pub fn cancel(&mut self) -> Option<PendingTask> {
        self.pending.take()
    }

    /// Take the pending task if its deadline has passed.
    pub fn poll(&mut self, now: Duration) -> Option<PendingTask> {
        match self.pending {
            Some(task) if now >= task.deadline => self.complete(),
            _ => None,
        }
    }

    /// Take the pending task if it is `generation`, regardless of time.
    pub fn fire(&mut self, generation: u64) -> Option<PendingTask> {
        match self.pending {
            Some(task) if task.generation == generation => self.complete(),
            _ => None,
        }
    }

    fn complete(&mut self) -> Option<PendingTask> {
        let task = self.pending.take()?;
        self.fired += 1;
        Some(task)
    }
}
