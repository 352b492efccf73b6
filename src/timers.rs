use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use crate::runtime_state::TraceState;
use crate::scheduler::{HostHandle, HostScheduler, HostTask};
use crate::window::Window;
use crate::{Result, Value};

/// Per-window timer id, starting at 1.
pub type TimerId = i64;

/// Guest function invoked with the window as receiver and the extra
/// scheduling arguments.
pub type GuestCallback = Rc<dyn Fn(&Window, &[Value]) -> Result<()>>;

/// Evaluates deferred source text in a window's scope. Installed by the
/// sandbox bridge through [`crate::WindowConfig::with_evaluator`].
pub trait SourceEvaluator {
    fn evaluate(&self, window: &Window, source: &str) -> Result<Value>;
}

/// What `setTimeout` / `setInterval` received as their first argument.
#[derive(Clone)]
pub enum TimerHandler {
    Callback(GuestCallback),
    /// Non-callable input, kept as source text and evaluated at fire time.
    SourceText(String),
}

impl TimerHandler {
    pub fn callback(f: impl Fn(&Window, &[Value]) -> Result<()> + 'static) -> Self {
        Self::Callback(Rc::new(f))
    }

    pub fn source(text: impl Into<String>) -> Self {
        Self::SourceText(text.into())
    }
}

impl fmt::Debug for TimerHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callback(_) => f.write_str("Callback(..)"),
            Self::SourceText(text) => f.debug_tuple("SourceText").field(text).finish(),
        }
    }
}

type CancelFn = fn(&dyn HostScheduler, HostHandle);

fn cancel_timeout(scheduler: &dyn HostScheduler, handle: HostHandle) {
    scheduler.clear_timeout(handle);
}

fn cancel_interval(scheduler: &dyn HostScheduler, handle: HostHandle) {
    scheduler.clear_interval(handle);
}

struct TimerEntry {
    host_handle: HostHandle,
    cancel: CancelFn,
    /// `stop_all` epoch the entry was created in; ids restart after a reset.
    generation: u64,
}

#[derive(Default)]
struct TimerTable {
    entries: BTreeMap<TimerId, TimerEntry>,
    latest_timer_id: TimerId,
    generation: u64,
}

impl TimerTable {
    /// Decides whether a firing host task still belongs to a live entry.
    /// One-shot entries leave the table here, before their callback runs.
    fn claim_for_fire(&mut self, id: TimerId, generation: u64, repeating: bool) -> bool {
        let live = self
            .entries
            .get(&id)
            .is_some_and(|entry| entry.generation == generation);
        if live && !repeating {
            self.entries.remove(&id);
        }
        live
    }
}

// Deep guest recursion inside a timer gets a fresh stack segment instead of
// overflowing the host thread.
const STACK_RED_ZONE: usize = 256 * 1024;
const STACK_GROWTH: usize = 32 * 1024 * 1024;

/// `setTimeout` / `setInterval` bookkeeping for one window, delegating the
/// actual waiting to a [`HostScheduler`].
pub struct TimerMultiplexer {
    scheduler: Rc<dyn HostScheduler>,
    table: Rc<RefCell<TimerTable>>,
    trace: Rc<RefCell<TraceState>>,
}

impl TimerMultiplexer {
    pub(crate) fn new(scheduler: Rc<dyn HostScheduler>, trace: Rc<RefCell<TraceState>>) -> Self {
        Self {
            scheduler,
            table: Rc::default(),
            trace,
        }
    }

    /// Registers `handler` with the host scheduler and returns its id, or
    /// `None` when nothing was scheduled: the window's document is already
    /// released, or `handler` is source text and the window has no evaluator.
    pub(crate) fn schedule(
        &self,
        window: &Window,
        repeating: bool,
        handler: TimerHandler,
        delay_ms: i64,
        args: Vec<Value>,
    ) -> Option<TimerId> {
        if window.document().is_none() {
            return None;
        }
        let callback = match handler {
            TimerHandler::Callback(callback) => callback,
            TimerHandler::SourceText(source) => {
                let evaluator = window.evaluator()?;
                let callback: GuestCallback = Rc::new(move |window: &Window, _: &[Value]| {
                    evaluator.evaluate(window, &source).map(|_| ())
                });
                callback
            }
        };

        let (id, generation) = {
            let mut table = self.table.borrow_mut();
            table.latest_timer_id += 1;
            (table.latest_timer_id, table.generation)
        };

        let table = Rc::downgrade(&self.table);
        let trace = Rc::clone(&self.trace);
        let receiver = window.downgrade();
        let task: HostTask = Rc::new(move || {
            let Some(table) = Weak::upgrade(&table) else {
                return;
            };
            if !table
                .borrow_mut()
                .claim_for_fire(id, generation, repeating)
            {
                return;
            }
            let Some(window) = receiver.upgrade() else {
                return;
            };
            trace
                .borrow_mut()
                .timer_line(|| format!("[timer] run id={id}"));
            dispatch_guarded(&window, &callback, &args);
        });

        let (host_handle, cancel): (HostHandle, CancelFn) = if repeating {
            (self.scheduler.set_interval(task, delay_ms), cancel_interval)
        } else {
            (self.scheduler.set_timeout(task, delay_ms), cancel_timeout)
        };
        self.table.borrow_mut().entries.insert(
            id,
            TimerEntry {
                host_handle,
                cancel,
                generation,
            },
        );

        let kind = if repeating { "interval" } else { "timeout" };
        self.trace
            .borrow_mut()
            .timer_line(|| format!("[timer] schedule {kind} id={id} delay_ms={delay_ms}"));
        Some(id)
    }

    /// `clearTimeout` / `clearInterval`. Unknown and already-fired ids are
    /// ignored.
    pub fn cancel(&self, id: TimerId) {
        let entry = self.table.borrow_mut().entries.remove(&id);
        let removed = usize::from(entry.is_some());
        if let Some(entry) = entry {
            (entry.cancel)(self.scheduler.as_ref(), entry.host_handle);
        }
        self.trace
            .borrow_mut()
            .timer_line(|| format!("[timer] clear id={id} removed={removed}"));
    }

    /// Cancels every pending timer and restarts ids at 1.
    pub fn stop_all(&self) {
        let entries = {
            let mut table = self.table.borrow_mut();
            table.latest_timer_id = 0;
            table.generation += 1;
            std::mem::take(&mut table.entries)
        };
        for entry in entries.values() {
            (entry.cancel)(self.scheduler.as_ref(), entry.host_handle);
        }
        let cleared = entries.len();
        self.trace
            .borrow_mut()
            .timer_line(|| format!("[timer] stop_all cleared={cleared}"));
    }

    pub fn pending_count(&self) -> usize {
        self.table.borrow().entries.len()
    }

    pub fn pending_ids(&self) -> Vec<TimerId> {
        self.table.borrow().entries.keys().copied().collect()
    }
}

/// Runs one guest callback. Whatever it does wrong, an `Err` return or a
/// panic, ends here.
///
/// An `Err` return is the quiet fault channel: it is dropped without a trace
/// line or any output. A panic is caught as well, but the process panic hook
/// has already run by then, so with the default hook its message reaches
/// stderr. Bridges that need silent panics install their own hook.
fn dispatch_guarded(window: &Window, callback: &GuestCallback, args: &[Value]) {
    let _ = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || {
        panic::catch_unwind(AssertUnwindSafe(|| callback(window, args)))
    });
}
