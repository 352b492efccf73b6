//! Synthetic browser global context for guest scripts running outside a browser.
//!
//! A [`Window`] bundles the globals a third-party widget script usually probes:
//! identity accessors, a document stub, `navigator` / `screen` profiles,
//! origin-partitioned `localStorage` / `sessionStorage`, `setTimeout` /
//! `setInterval` over a host scheduler, and `atob` / `btoa`.
//!
//! ```
//! use std::rc::Rc;
//! use browser_globals::{ManualScheduler, OriginRegistry, Window, WindowConfig};
//!
//! let registry = OriginRegistry::new();
//! let scheduler = Rc::new(ManualScheduler::new());
//! let window = Window::new(&registry, WindowConfig::default(), scheduler.clone())?;
//! window.local_storage().set_item("seen", "1");
//! assert_eq!(window.btoa("foo").as_deref(), Some("Zm9v"));
//! # Ok::<(), browser_globals::Error>(())
//! ```

use std::error::Error as StdError;
use std::fmt;

pub mod base64;
mod origin;
mod profiles;
mod runtime_state;
mod runtime_values;
mod scheduler;
mod storage;
mod timers;
mod window;

pub use origin::{OriginRecord, OriginRegistry};
pub use profiles::{NavigatorProfile, ScreenProfile};
pub use runtime_values::Value;
pub use scheduler::{HostHandle, HostScheduler, HostTask, ManualScheduler, PendingTimer};
pub use storage::{StorageArea, StorageKind, StorageToken};
pub use timers::{GuestCallback, SourceEvaluator, TimerHandler, TimerId, TimerMultiplexer};
pub use window::{
    Body, BufferConstructor, Console, DEFAULT_ORIGIN, Document, Window, WindowConfig,
};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Guest-visible contract violation (arity, illegal invocation).
    TypeError(String),
    InvalidConfig(String),
    Scheduler(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeError(msg) => write!(f, "TypeError: {msg}"),
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::Scheduler(msg) => write!(f, "scheduler error: {msg}"),
        }
    }
}

impl StdError for Error {}

/// Builds the `Failed to execute ...: N argument(s) required` fault guest
/// feature detection looks for.
pub(crate) fn require_args(
    interface: &str,
    operation: &str,
    required: usize,
    args: &[crate::Value],
) -> Result<()> {
    if args.len() >= required {
        return Ok(());
    }
    let noun = if required == 1 { "argument" } else { "arguments" };
    Err(Error::TypeError(format!(
        "Failed to execute '{operation}' on '{interface}': {required} {noun} required, but only {} present.",
        args.len()
    )))
}
