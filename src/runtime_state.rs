use std::collections::VecDeque;

use crate::scheduler::{HostHandle, HostTask};
use crate::{Error, Result};

pub(crate) struct ScheduledTask {
    pub(crate) handle: HostHandle,
    pub(crate) due_at: i64,
    pub(crate) order: i64,
    pub(crate) interval_ms: Option<i64>,
    pub(crate) task: HostTask,
}

pub(crate) struct SchedulerState {
    pub(crate) task_queue: Vec<ScheduledTask>,
    pub(crate) now_ms: i64,
    pub(crate) timer_step_limit: usize,
    pub(crate) next_handle: u64,
    pub(crate) next_task_order: i64,
    pub(crate) running_handle: Option<HostHandle>,
    pub(crate) running_canceled: bool,
}

impl Default for SchedulerState {
    fn default() -> Self {
        Self {
            task_queue: Vec::new(),
            now_ms: 0,
            timer_step_limit: 10_000,
            next_handle: 1,
            next_task_order: 0,
            running_handle: None,
            running_canceled: false,
        }
    }
}

impl SchedulerState {
    pub(crate) fn allocate_handle(&mut self) -> HostHandle {
        let handle = HostHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    pub(crate) fn allocate_task_order(&mut self) -> i64 {
        let order = self.next_task_order;
        self.next_task_order += 1;
        order
    }

    pub(crate) fn next_task_index(&self, due_limit: Option<i64>) -> Option<usize> {
        self.task_queue
            .iter()
            .enumerate()
            .filter(|(_, task)| due_limit.is_none_or(|limit| task.due_at <= limit))
            .min_by_key(|(_, task)| (task.due_at, task.order))
            .map(|(idx, _)| idx)
    }

    /// Timeout and interval handles share one pool, so either clear call
    /// removes either kind.
    pub(crate) fn remove(&mut self, handle: HostHandle) -> usize {
        let before = self.task_queue.len();
        self.task_queue.retain(|task| task.handle != handle);
        if self.running_handle == Some(handle) {
            self.running_canceled = true;
        }
        before.saturating_sub(self.task_queue.len())
    }

    pub(crate) fn step_limit_error(&self, steps: usize, due_limit: Option<i64>) -> Error {
        let due_limit_desc = due_limit
            .map(|value| value.to_string())
            .unwrap_or_else(|| "none".into());

        let next_task_desc = self
            .next_task_index(due_limit)
            .and_then(|idx| self.task_queue.get(idx))
            .map(|task| {
                let interval_desc = task
                    .interval_ms
                    .map(|value| value.to_string())
                    .unwrap_or_else(|| "none".into());
                format!(
                    "handle={},due_at={},order={},interval_ms={}",
                    task.handle.0, task.due_at, task.order, interval_desc
                )
            })
            .unwrap_or_else(|| "none".into());

        Error::Scheduler(format!(
            "run exceeded max task steps (possible uncleared setInterval): limit={}, steps={steps}, now_ms={}, due_limit={due_limit_desc}, pending_tasks={}, next_task={next_task_desc}",
            self.timer_step_limit,
            self.now_ms,
            self.task_queue.len(),
        ))
    }
}

#[derive(Debug)]
pub(crate) struct TraceState {
    pub(crate) enabled: bool,
    pub(crate) timers: bool,
    pub(crate) logs: VecDeque<String>,
    pub(crate) log_limit: usize,
    pub(crate) to_stderr: bool,
}

impl Default for TraceState {
    fn default() -> Self {
        Self {
            enabled: false,
            timers: true,
            logs: VecDeque::new(),
            log_limit: 10_000,
            to_stderr: true,
        }
    }
}

impl TraceState {
    pub(crate) fn timer_line(&mut self, line: impl FnOnce() -> String) {
        if self.enabled && self.timers {
            self.push(line());
        }
    }

    pub(crate) fn line(&mut self, line: impl FnOnce() -> String) {
        if self.enabled {
            self.push(line());
        }
    }

    fn push(&mut self, line: String) {
        if self.to_stderr {
            eprintln!("{line}");
        }
        if self.logs.len() >= self.log_limit {
            self.logs.pop_front();
        }
        self.logs.push_back(line);
    }

    pub(crate) fn set_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::InvalidConfig(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.log_limit = max_entries;
        while self.logs.len() > self.log_limit {
            self.logs.pop_front();
        }
        Ok(())
    }
}
