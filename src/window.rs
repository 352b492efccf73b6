use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::base64;
use crate::origin::{OriginRecord, OriginRegistry};
use crate::profiles::{NavigatorProfile, ScreenProfile};
use crate::runtime_state::TraceState;
use crate::scheduler::HostScheduler;
use crate::storage::{StorageArea, StorageKind};
use crate::timers::{SourceEvaluator, TimerHandler, TimerId, TimerMultiplexer};
use crate::{Error, Result, Value, require_args};

/// Origin used when the host does not configure one.
pub const DEFAULT_ORIGIN: &str = "https://captcha/";

// Vertical space taken by tabs and the address bar.
const BROWSER_CHROME_HEIGHT: u32 = 71;

/// UI operations guest script may call; each is accepted and does nothing.
const NOOP_GLOBAL_FUNCTIONS: &[&str] = &[
    "alert",
    "blur",
    "focus",
    "moveBy",
    "moveTo",
    "open",
    "print",
    "resizeBy",
    "resizeTo",
    "scroll",
    "scrollBy",
    "scrollTo",
    "getComputedStyle",
    "captureEvents",
    "releaseEvents",
    "stop",
];

#[derive(Clone)]
pub struct WindowConfig {
    origin: String,
    navigator: NavigatorProfile,
    screen: ScreenProfile,
    evaluator: Option<Rc<dyn SourceEvaluator>>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ORIGIN)
    }
}

impl fmt::Debug for WindowConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowConfig")
            .field("origin", &self.origin)
            .field("navigator", &self.navigator)
            .field("screen", &self.screen)
            .field("evaluator", &self.evaluator.is_some())
            .finish()
    }
}

impl WindowConfig {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            navigator: NavigatorProfile::default(),
            screen: ScreenProfile::default(),
            evaluator: None,
        }
    }

    pub fn with_navigator(mut self, navigator: NavigatorProfile) -> Self {
        self.navigator = navigator;
        self
    }

    pub fn with_screen(mut self, screen: ScreenProfile) -> Self {
        self.screen = screen;
        self
    }

    /// Enables string handlers for `setTimeout` / `setInterval`.
    pub fn with_evaluator(mut self, evaluator: Rc<dyn SourceEvaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }
}

#[derive(Debug, Default)]
pub struct Body {
    inner_text: RefCell<String>,
    inner_html: RefCell<String>,
}

impl Body {
    pub fn inner_text(&self) -> String {
        self.inner_text.borrow().clone()
    }

    pub fn set_inner_text(&self, text: &str) {
        *self.inner_text.borrow_mut() = text.to_string();
    }

    pub fn inner_html(&self) -> String {
        self.inner_html.borrow().clone()
    }

    pub fn set_inner_html(&self, html: &str) {
        *self.inner_html.borrow_mut() = html.to_string();
    }
}

/// Document stub: an origin and a body with free-form text fields.
#[derive(Debug)]
pub struct Document {
    origin: String,
    body: Body,
}

impl Document {
    fn new(origin: &str) -> Self {
        Self {
            origin: origin.to_string(),
            body: Body::default(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// There is no element tree; every lookup yields `undefined`.
    pub fn get_element_by_id(&self, _id: &str) -> Value {
        Value::Undefined
    }
}

/// `console`: every method exists and does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct Console;

impl Console {
    pub const METHODS: &'static [&'static str] = &[
        "assert",
        "clear",
        "count",
        "countReset",
        "debug",
        "dir",
        "dirxml",
        "error",
        "group",
        "groupCollapsed",
        "groupEnd",
        "info",
        "log",
        "table",
        "time",
        "timeEnd",
        "trace",
        "warn",
    ];

    pub fn has_method(&self, method: &str) -> bool {
        Self::METHODS.contains(&method)
    }

    pub fn call(&self, method: &str, _args: &[Value]) -> Option<Value> {
        self.has_method(method).then_some(Value::Undefined)
    }
}

/// Binary buffer constructors the bridge exposes from the host engine as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferConstructor {
    ArrayBuffer,
    Int8Array,
    Uint8Array,
    Uint8ClampedArray,
    Int16Array,
    Uint16Array,
    Int32Array,
    Uint32Array,
    Float32Array,
    Float64Array,
}

impl BufferConstructor {
    pub const ALL: [BufferConstructor; 10] = [
        Self::ArrayBuffer,
        Self::Int8Array,
        Self::Uint8Array,
        Self::Uint8ClampedArray,
        Self::Int16Array,
        Self::Uint16Array,
        Self::Int32Array,
        Self::Uint32Array,
        Self::Float32Array,
        Self::Float64Array,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::ArrayBuffer => "ArrayBuffer",
            Self::Int8Array => "Int8Array",
            Self::Uint8Array => "Uint8Array",
            Self::Uint8ClampedArray => "Uint8ClampedArray",
            Self::Int16Array => "Int16Array",
            Self::Uint16Array => "Uint16Array",
            Self::Int32Array => "Int32Array",
            Self::Uint32Array => "Uint32Array",
            Self::Float32Array => "Float32Array",
            Self::Float64Array => "Float64Array",
        }
    }

    /// `None` for `ArrayBuffer`, which is not a typed view.
    pub fn bytes_per_element(&self) -> Option<usize> {
        match self {
            Self::ArrayBuffer => None,
            Self::Int8Array | Self::Uint8Array | Self::Uint8ClampedArray => Some(1),
            Self::Int16Array | Self::Uint16Array => Some(2),
            Self::Int32Array | Self::Uint32Array | Self::Float32Array => Some(4),
            Self::Float64Array => Some(8),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ctor| ctor.name() == name)
    }
}

struct WindowInner {
    origin: String,
    document: RefCell<Option<Rc<Document>>>,
    navigator: NavigatorProfile,
    screen: ScreenProfile,
    local_storage: StorageArea,
    session_storage: StorageArea,
    timers: TimerMultiplexer,
    console: Console,
    evaluator: Option<Rc<dyn SourceEvaluator>>,
    record: Weak<OriginRecord>,
    trace: Rc<RefCell<TraceState>>,
}

/// The synthetic global object.
///
/// Cloning is cheap and yields the same global: `self`, `window`, `top`,
/// `parent` and `frames` all return a handle equal to the receiver.
#[derive(Clone)]
pub struct Window(Rc<WindowInner>);

#[derive(Clone)]
pub(crate) struct WeakWindow(Weak<WindowInner>);

impl WeakWindow {
    pub(crate) fn upgrade(&self) -> Option<Window> {
        self.0.upgrade().map(Window)
    }
}

impl PartialEq for Window {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Window {}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("origin", &self.0.origin)
            .field("closed", &self.is_closed())
            .field("pending_timers", &self.0.timers.pending_count())
            .finish()
    }
}

impl Window {
    /// Builds a window and attaches it to `config.origin`'s record in
    /// `registry`, creating the record on first use.
    pub fn new(
        registry: &OriginRegistry,
        config: WindowConfig,
        scheduler: Rc<dyn HostScheduler>,
    ) -> Result<Self> {
        let WindowConfig {
            origin,
            navigator,
            screen,
            evaluator,
        } = config;
        if origin.is_empty() {
            return Err(Error::InvalidConfig("origin must not be empty".into()));
        }

        let record = registry.record(&origin);
        let local_storage = StorageArea::new(
            StorageKind::Local,
            registry.allocate_storage_token(),
            record.map(StorageKind::Local),
        );
        let session_storage = StorageArea::new(
            StorageKind::Session,
            registry.allocate_storage_token(),
            record.map(StorageKind::Session),
        );
        let trace = Rc::new(RefCell::new(TraceState::default()));

        let window = Self(Rc::new(WindowInner {
            document: RefCell::new(Some(Rc::new(Document::new(&origin)))),
            origin,
            navigator,
            screen,
            local_storage,
            session_storage,
            timers: TimerMultiplexer::new(scheduler, Rc::clone(&trace)),
            console: Console,
            evaluator,
            record: Rc::downgrade(&record),
            trace,
        }));
        record.attach_window(window.clone());
        Ok(window)
    }

    pub(crate) fn downgrade(&self) -> WeakWindow {
        WeakWindow(Rc::downgrade(&self.0))
    }

    pub(crate) fn evaluator(&self) -> Option<Rc<dyn SourceEvaluator>> {
        self.0.evaluator.clone()
    }

    pub fn origin(&self) -> &str {
        &self.0.origin
    }

    pub fn window(&self) -> Window {
        self.clone()
    }

    pub fn self_window(&self) -> Window {
        self.clone()
    }

    pub fn frames(&self) -> Window {
        self.clone()
    }

    pub fn top(&self) -> Window {
        self.clone()
    }

    pub fn parent(&self) -> Window {
        self.clone()
    }

    /// Number of nested browsing contexts; always 0.
    pub fn length(&self) -> usize {
        0
    }

    /// `None` once the window has been closed.
    pub fn document(&self) -> Option<Rc<Document>> {
        self.0.document.borrow().clone()
    }

    pub fn navigator(&self) -> &NavigatorProfile {
        &self.0.navigator
    }

    pub fn screen(&self) -> &ScreenProfile {
        &self.0.screen
    }

    pub fn local_storage(&self) -> &StorageArea {
        &self.0.local_storage
    }

    pub fn session_storage(&self) -> &StorageArea {
        &self.0.session_storage
    }

    pub fn console(&self) -> &Console {
        &self.0.console
    }

    pub fn timers(&self) -> &TimerMultiplexer {
        &self.0.timers
    }

    pub fn to_string_tag(&self) -> &'static str {
        "Window"
    }

    /// Every window sharing this origin, closed ones included.
    pub fn same_origin_windows(&self) -> Vec<Window> {
        self.0
            .record
            .upgrade()
            .map(|record| record.windows())
            .unwrap_or_default()
    }

    pub fn set_timeout(
        &self,
        handler: TimerHandler,
        delay_ms: i64,
        args: Vec<Value>,
    ) -> Option<TimerId> {
        self.0.timers.schedule(self, false, handler, delay_ms, args)
    }

    pub fn set_interval(
        &self,
        handler: TimerHandler,
        delay_ms: i64,
        args: Vec<Value>,
    ) -> Option<TimerId> {
        self.0.timers.schedule(self, true, handler, delay_ms, args)
    }

    pub fn clear_timeout(&self, id: TimerId) {
        self.0.timers.cancel(id);
    }

    pub fn clear_interval(&self, id: TimerId) {
        self.0.timers.cancel(id);
    }

    pub fn atob(&self, data: &str) -> Option<String> {
        base64::decode_base64_to_binary_string(data)
    }

    pub fn btoa(&self, data: &str) -> Option<String> {
        base64::encode_binary_string(data)
    }

    pub fn alert(&self, _message: &str) {}

    pub fn confirm(&self, _message: &str) -> bool {
        true
    }

    pub fn prompt(&self, _message: &str) -> String {
        String::new()
    }

    pub fn buffer_constructors(&self) -> &'static [BufferConstructor] {
        &BufferConstructor::ALL
    }

    pub fn is_closed(&self) -> bool {
        self.0.document.borrow().is_none()
    }

    /// Tears the context down: releases the document and stops every timer.
    /// Calling it again is harmless.
    ///
    /// The window stays in its origin's window list.
    pub fn close(&self) {
        // Single-context model: `length` is 0, there are no nested contexts
        // to close first.
        let released = self.0.document.borrow_mut().take().is_some();
        self.0.timers.stop_all();
        self.0.trace.borrow_mut().line(|| {
            format!(
                "[window] close origin={} released_document={released}",
                self.0.origin
            )
        });
    }

    /// Scalar window fields by guest name.
    pub fn property(&self, name: &str) -> Option<Value> {
        let screen = &self.0.screen;
        let value = match name {
            "name" | "status" => Value::String(String::new()),
            "origin" => Value::String(self.0.origin.clone()),
            "closed" => Value::Bool(self.is_closed()),
            "length" => Value::Number(self.length() as i64),
            "frameElement" => Value::Undefined,
            "devicePixelRatio" => Value::Number(1),
            "innerWidth" | "outerWidth" => Value::Number(i64::from(screen.width())),
            "innerHeight" => Value::Number(i64::from(
                screen.avail_height().saturating_sub(BROWSER_CHROME_HEIGHT),
            )),
            "outerHeight" => Value::Number(i64::from(screen.height())),
            "pageXOffset" | "pageYOffset" | "screenX" | "screenLeft" | "screenY"
            | "screenTop" | "scrollX" | "scrollY" => Value::Number(0),
            _ => return None,
        };
        Some(value)
    }

    /// Guest function call by name. Returns `Ok(None)` for names that are not
    /// window functions.
    ///
    /// `setTimeout` / `setInterval` only arrive here with a non-callable first
    /// argument, which takes the source-text path; callables go through
    /// [`Window::set_timeout`] / [`Window::set_interval`].
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Option<Value>> {
        let value = match name {
            "atob" => {
                require_args("Window", "atob", 1, args)?;
                self.atob(&args[0].as_string()).into()
            }
            "btoa" => {
                require_args("Window", "btoa", 1, args)?;
                self.btoa(&args[0].as_string()).into()
            }
            "confirm" => Value::Bool(true),
            "prompt" => Value::String(String::new()),
            "setTimeout" | "setInterval" => {
                require_args("Window", name, 1, args)?;
                let source = args[0].as_string();
                let delay_ms = args.get(1).map(Value::as_integer).unwrap_or(0);
                let extra = args.iter().skip(2).cloned().collect();
                let handler = TimerHandler::SourceText(source);
                let id = if name == "setTimeout" {
                    self.set_timeout(handler, delay_ms, extra)
                } else {
                    self.set_interval(handler, delay_ms, extra)
                };
                id.map(Value::Number).unwrap_or(Value::Undefined)
            }
            "clearTimeout" | "clearInterval" => {
                if let Some(id) = args.first() {
                    self.0.timers.cancel(id.as_integer());
                }
                Value::Undefined
            }
            "close" => {
                self.close();
                Value::Undefined
            }
            _ if NOOP_GLOBAL_FUNCTIONS.contains(&name) => Value::Undefined,
            _ => return Ok(None),
        };
        Ok(Some(value))
    }

    pub fn enable_trace(&self, enabled: bool) {
        self.0.trace.borrow_mut().enabled = enabled;
    }

    pub fn set_trace_timers(&self, enabled: bool) {
        self.0.trace.borrow_mut().timers = enabled;
    }

    pub fn set_trace_stderr(&self, enabled: bool) {
        self.0.trace.borrow_mut().to_stderr = enabled;
    }

    pub fn set_trace_log_limit(&self, max_entries: usize) -> Result<()> {
        self.0.trace.borrow_mut().set_log_limit(max_entries)
    }

    pub fn take_trace_logs(&self) -> Vec<String> {
        self.0.trace.borrow_mut().logs.drain(..).collect()
    }
}
