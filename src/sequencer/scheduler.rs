//! Single-threaded timer queue.
//!
//! Every delay in a transition is a task on this queue. Nothing blocks the
//! caller: triggering a sequence only enqueues tasks, and the owner of the
//! scheduler (the TUI loop or a headless runner) drains them as they come
//! due. Tasks receive the scheduler so a step can enqueue its follow-up.

use super::clock::Clock;
use std::cell::Cell;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::rc::Rc;
use std::time::Duration;

/// A deferred step.
pub type Task = Box<dyn FnOnce(&mut Scheduler)>;

/// Identifies a scheduled task, in scheduling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// Shared flag that stops pending tasks from running.
///
/// Clones observe the same flag. Cancelling does not remove tasks from the
/// queue; they are dropped unrun when they come due.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

struct Entry {
    due: Duration,
    id: TaskId,
    token: Option<CancellationToken>,
    task: Task,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.id == other.id
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // BinaryHeap is a max-heap; invert so the earliest (then oldest) entry is on top.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Timer queue driven by a [`Clock`].
pub struct Scheduler {
    clock: Rc<dyn Clock>,
    queue: BinaryHeap<Entry>,
    next_id: u64,
}

impl Scheduler {
    /// Creates an empty scheduler reading time from `clock`.
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            queue: BinaryHeap::new(),
            next_id: 0,
        }
    }

    /// Current time on the scheduler's clock.
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// The clock this scheduler reads.
    pub fn clock(&self) -> Rc<dyn Clock> {
        Rc::clone(&self.clock)
    }

    /// Runs `task` once `delay` has elapsed from now.
    pub fn schedule(
        &mut self,
        delay: Duration,
        task: impl FnOnce(&mut Scheduler) + 'static,
    ) -> TaskId {
        self.push(delay, None, Box::new(task))
    }

    /// Like [`schedule`](Self::schedule), but the task is skipped if
    /// `token` has been cancelled by the time it comes due.
    pub fn schedule_with(
        &mut self,
        token: &CancellationToken,
        delay: Duration,
        task: impl FnOnce(&mut Scheduler) + 'static,
    ) -> TaskId {
        self.push(delay, Some(token.clone()), Box::new(task))
    }

    fn push(&mut self, delay: Duration, token: Option<CancellationToken>, task: Task) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.queue.push(Entry {
            due: self.clock.now() + delay,
            id,
            token,
            task,
        });
        id
    }

    /// When the earliest pending task is due, if any.
    pub fn next_due(&self) -> Option<Duration> {
        self.queue.peek().map(|entry| entry.due)
    }

    /// Number of tasks still queued, cancelled ones included.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Runs every task that is due now, in due order.
    ///
    /// The clock is read again before each task, so a follow-up enqueued
    /// with zero delay runs in the same call even when the clock moved
    /// while the previous task ran. Returns how many tasks ran.
    pub fn run_due(&mut self) -> usize {
        let mut ran = 0;
        while self
            .queue
            .peek()
            .is_some_and(|entry| entry.due <= self.clock.now())
        {
            if let Some(entry) = self.queue.pop() {
                if self.run_entry(entry) {
                    ran += 1;
                }
            }
        }
        ran
    }

    /// Runs tasks as they come due for `span`, then leaves the clock at the
    /// end of the span.
    pub fn run_for(&mut self, span: Duration) {
        let deadline = self.clock.now() + span;
        while let Some(due) = self.next_due() {
            if due > deadline {
                break;
            }
            self.clock.sleep_until(due);
            self.run_due();
        }
        self.clock.sleep_until(deadline);
    }

    /// Runs until the queue is empty, waiting on the clock between tasks.
    pub fn run_until_idle(&mut self) {
        while let Some(due) = self.next_due() {
            self.clock.sleep_until(due);
            self.run_due();
        }
    }

    fn run_entry(&mut self, entry: Entry) -> bool {
        if entry.token.as_ref().is_some_and(CancellationToken::is_cancelled) {
            tracing::debug!(task = ?entry.id, "skipping cancelled task");
            return false;
        }
        (entry.task)(self);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::clock::ManualClock;
    use std::cell::RefCell;

    fn scheduler() -> (Scheduler, ManualClock) {
        let clock = ManualClock::new();
        (Scheduler::new(Rc::new(clock.clone())), clock)
    }

    #[test]
    fn test_tasks_run_in_due_order() {
        let (mut scheduler, _clock) = scheduler();
        let log = Rc::new(RefCell::new(Vec::new()));

        for (delay, label) in [(300, "c"), (100, "a"), (200, "b")] {
            let log = Rc::clone(&log);
            scheduler.schedule(Duration::from_millis(delay), move |_| {
                log.borrow_mut().push(label)
            });
        }

        scheduler.run_until_idle();
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_ties_run_in_scheduling_order() {
        let (mut scheduler, _clock) = scheduler();
        let log = Rc::new(RefCell::new(Vec::new()));

        for label in ["first", "second", "third"] {
            let log = Rc::clone(&log);
            scheduler.schedule(Duration::from_millis(50), move |_| {
                log.borrow_mut().push(label)
            });
        }

        scheduler.run_until_idle();
        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_nothing_runs_before_due() {
        let (mut scheduler, clock) = scheduler();
        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);
        scheduler.schedule(Duration::from_millis(100), move |_| flag.set(true));

        clock.advance(Duration::from_millis(99));
        assert_eq!(scheduler.run_due(), 0);
        assert!(!ran.get());

        clock.advance(Duration::from_millis(1));
        assert_eq!(scheduler.run_due(), 1);
        assert!(ran.get());
    }

    #[test]
    fn test_task_can_schedule_follow_up() {
        let (mut scheduler, clock) = scheduler();
        let fired_at = Rc::new(Cell::new(None));
        let slot = Rc::clone(&fired_at);
        let follow_clock = clock.clone();

        scheduler.schedule(Duration::from_millis(1800), move |s| {
            s.schedule(Duration::from_millis(900), move |_| {
                slot.set(Some(follow_clock.now()))
            });
        });

        scheduler.run_until_idle();
        assert_eq!(fired_at.get(), Some(Duration::from_millis(2700)));
    }

    #[test]
    fn test_cancelled_tasks_are_skipped() {
        let (mut scheduler, _clock) = scheduler();
        let token = CancellationToken::new();
        let count = Rc::new(Cell::new(0));

        for _ in 0..3 {
            let count = Rc::clone(&count);
            scheduler.schedule_with(&token, Duration::from_millis(10), move |_| {
                count.set(count.get() + 1)
            });
        }
        let count_plain = Rc::clone(&count);
        scheduler.schedule(Duration::from_millis(10), move |_| {
            count_plain.set(count_plain.get() + 10)
        });

        token.cancel();
        scheduler.run_until_idle();
        assert_eq!(count.get(), 10);
        assert_eq!(scheduler.pending(), 0);
    }

    /// Moves forward by `step` every time it is read, like a wall clock
    /// during slow tasks.
    struct TickingClock {
        now: Cell<Duration>,
        step: Duration,
    }

    impl Clock for TickingClock {
        fn now(&self) -> Duration {
            let now = self.now.get();
            self.now.set(now + self.step);
            now
        }

        fn sleep_until(&self, deadline: Duration) {
            if deadline > self.now.get() {
                self.now.set(deadline);
            }
        }
    }

    #[test]
    fn test_zero_delay_follow_up_runs_in_same_call_on_moving_clock() {
        let clock = TickingClock {
            now: Cell::new(Duration::ZERO),
            step: Duration::from_millis(5),
        };
        let mut scheduler = Scheduler::new(Rc::new(clock));
        let log = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&log);
        scheduler.schedule(Duration::ZERO, move |s| {
            first.borrow_mut().push("step");
            let second = Rc::clone(&first);
            s.schedule(Duration::ZERO, move |_| second.borrow_mut().push("follow-up"));
        });

        assert_eq!(scheduler.run_due(), 2);
        assert_eq!(*log.borrow(), vec!["step", "follow-up"]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_run_for_stops_at_deadline() {
        let (mut scheduler, clock) = scheduler();
        let ran = Rc::new(Cell::new(0));
        for delay in [100, 500, 1000] {
            let ran = Rc::clone(&ran);
            scheduler.schedule(Duration::from_millis(delay), move |_| ran.set(ran.get() + 1));
        }

        scheduler.run_for(Duration::from_millis(600));
        assert_eq!(ran.get(), 2);
        assert_eq!(clock.now(), Duration::from_millis(600));
        assert_eq!(scheduler.next_due(), Some(Duration::from_millis(1000)));
    }
}
