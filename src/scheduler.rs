use std::cell::RefCell;
use std::rc::Rc;

use crate::runtime_state::{ScheduledTask, SchedulerState};
use crate::{Error, Result};

/// Opaque handle returned by a [`HostScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostHandle(pub u64);

pub type HostTask = Rc<dyn Fn()>;

/// The host's real timer facility.
///
/// Implementations must return from the scheduling calls immediately, must
/// never run `task` inside the scheduling call itself, and must not run a task
/// again once its handle has been cleared.
pub trait HostScheduler {
    fn set_timeout(&self, task: HostTask, delay_ms: i64) -> HostHandle;
    fn set_interval(&self, task: HostTask, delay_ms: i64) -> HostHandle;
    fn clear_timeout(&self, handle: HostHandle);
    fn clear_interval(&self, handle: HostHandle);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTimer {
    pub handle: HostHandle,
    pub due_at: i64,
    pub order: i64,
    pub interval_ms: Option<i64>,
}

/// Deterministic virtual-clock scheduler.
///
/// Time only moves when the host calls [`advance_time`](Self::advance_time),
/// [`advance_time_to`](Self::advance_time_to) or [`flush`](Self::flush).
/// Tasks due at the same instant run in registration order.
#[derive(Default)]
pub struct ManualScheduler {
    state: RefCell<SchedulerState>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> i64 {
        self.state.borrow().now_ms
    }

    pub fn set_timer_step_limit(&self, max_steps: usize) -> Result<()> {
        if max_steps == 0 {
            return Err(Error::Scheduler(
                "set_timer_step_limit requires at least 1 step".into(),
            ));
        }
        self.state.borrow_mut().timer_step_limit = max_steps;
        Ok(())
    }

    pub fn pending_timers(&self) -> Vec<PendingTimer> {
        let mut timers = self
            .state
            .borrow()
            .task_queue
            .iter()
            .map(|task| PendingTimer {
                handle: task.handle,
                due_at: task.due_at,
                order: task.order,
                interval_ms: task.interval_ms,
            })
            .collect::<Vec<_>>();
        timers.sort_by_key(|timer| (timer.due_at, timer.order));
        timers
    }

    /// Moves the clock forward and runs everything that became due.
    pub fn advance_time(&self, delta_ms: i64) -> Result<usize> {
        if delta_ms < 0 {
            return Err(Error::Scheduler(
                "advance_time requires non-negative milliseconds".into(),
            ));
        }
        {
            let mut state = self.state.borrow_mut();
            state.now_ms = state.now_ms.saturating_add(delta_ms);
        }
        self.run_due_timers()
    }

    pub fn advance_time_to(&self, target_ms: i64) -> Result<usize> {
        {
            let mut state = self.state.borrow_mut();
            if target_ms < state.now_ms {
                return Err(Error::Scheduler(format!(
                    "advance_time_to requires target >= now_ms (target={target_ms}, now_ms={})",
                    state.now_ms
                )));
            }
            state.now_ms = target_ms;
        }
        self.run_due_timers()
    }

    pub fn run_due_timers(&self) -> Result<usize> {
        let now_ms = self.now_ms();
        self.run_timer_queue(Some(now_ms), false)
    }

    /// Runs every pending task, jumping the clock to each due time.
    pub fn flush(&self) -> Result<usize> {
        self.run_timer_queue(None, true)
    }

    /// Runs the earliest task regardless of due time. Returns `false` when the
    /// queue is empty.
    pub fn run_next_timer(&self) -> bool {
        let task = {
            let mut state = self.state.borrow_mut();
            let Some(next_idx) = state.next_task_index(None) else {
                return false;
            };
            let task = state.task_queue.remove(next_idx);
            if task.due_at > state.now_ms {
                state.now_ms = task.due_at;
            }
            task
        };
        self.execute_task(task);
        true
    }

    fn run_timer_queue(&self, due_limit: Option<i64>, advance_clock: bool) -> Result<usize> {
        let mut steps = 0usize;
        loop {
            let task = {
                let mut state = self.state.borrow_mut();
                let Some(next_idx) = state.next_task_index(due_limit) else {
                    break;
                };
                steps += 1;
                if steps > state.timer_step_limit {
                    return Err(state.step_limit_error(steps, due_limit));
                }
                let task = state.task_queue.remove(next_idx);
                if advance_clock && task.due_at > state.now_ms {
                    state.now_ms = task.due_at;
                }
                task
            };
            self.execute_task(task);
        }
        Ok(steps)
    }

    fn execute_task(&self, task: ScheduledTask) {
        {
            let mut state = self.state.borrow_mut();
            state.running_handle = Some(task.handle);
            state.running_canceled = false;
        }

        // The queue borrow is released: the task may schedule or clear timers.
        (task.task)();

        let mut state = self.state.borrow_mut();
        let canceled = state.running_canceled;
        state.running_handle = None;
        state.running_canceled = false;

        if let Some(interval_ms) = task.interval_ms {
            if canceled {
                return;
            }
            let due_at = task.due_at.saturating_add(interval_ms);
            let order = state.allocate_task_order();
            state.task_queue.push(ScheduledTask {
                handle: task.handle,
                due_at,
                order,
                interval_ms: Some(interval_ms),
                task: task.task,
            });
        }
    }

    fn push_task(&self, task: HostTask, delay_ms: i64, repeating: bool) -> HostHandle {
        let mut state = self.state.borrow_mut();
        let delay_ms = delay_ms.max(0);
        let due_at = state.now_ms.saturating_add(delay_ms);
        let handle = state.allocate_handle();
        let order = state.allocate_task_order();
        state.task_queue.push(ScheduledTask {
            handle,
            due_at,
            order,
            interval_ms: repeating.then_some(delay_ms),
            task,
        });
        handle
    }
}

impl HostScheduler for ManualScheduler {
    fn set_timeout(&self, task: HostTask, delay_ms: i64) -> HostHandle {
        self.push_task(task, delay_ms, false)
    }

    fn set_interval(&self, task: HostTask, delay_ms: i64) -> HostHandle {
        self.push_task(task, delay_ms, true)
    }

    fn clear_timeout(&self, handle: HostHandle) {
        self.state.borrow_mut().remove(handle);
    }

    fn clear_interval(&self, handle: HostHandle) {
        self.state.borrow_mut().remove(handle);
    }
}
