use super::*;

#[test]
fn identity_accessors_return_the_same_global() -> Result<()> {
    let registry = OriginRegistry::new();
    let (window, _) = window_with_scheduler(&registry, DEFAULT_ORIGIN)?;
    assert_eq!(window.window(), window);
    assert_eq!(window.self_window(), window);
    assert_eq!(window.frames(), window);
    assert_eq!(window.top(), window);
    assert_eq!(window.parent(), window);
    assert_eq!(window.length(), 0);
    assert_eq!(window.to_string_tag(), "Window");

    let (other, _) = window_with_scheduler(&registry, DEFAULT_ORIGIN)?;
    assert_ne!(other, window);
    Ok(())
}

#[test]
fn document_stub_has_origin_and_mutable_body() -> Result<()> {
    let registry = OriginRegistry::new();
    let (window, _) = window_with_scheduler(&registry, "https://widget.example/")?;
    let document = window.document().expect("document before close");
    assert_eq!(document.origin(), "https://widget.example/");
    assert_eq!(document.body().inner_text(), "");

    document.body().set_inner_text("hello");
    document.body().set_inner_html("<b>hi</b>");
    let again = window.document().expect("document before close");
    assert_eq!(again.body().inner_text(), "hello");
    assert_eq!(again.body().inner_html(), "<b>hi</b>");
    assert_eq!(again.get_element_by_id("checkbox"), Value::Undefined);
    Ok(())
}

#[test]
fn close_releases_document_and_stops_timers() -> Result<()> {
    let registry = OriginRegistry::new();
    let (window, scheduler) = window_with_scheduler(&registry, DEFAULT_ORIGIN)?;
    let log = Rc::new(RefCell::new(Vec::new()));
    window.set_timeout(recording(&log, "timeout"), 10, Vec::new());
    window.set_interval(recording(&log, "interval"), 5, Vec::new());
    let document = window.document().expect("document before close");

    window.close();
    assert!(window.is_closed());
    assert_eq!(window.document().map(|_| ()), None);
    assert_eq!(window.property("closed"), Some(Value::Bool(true)));
    assert_eq!(window.timers().pending_count(), 0);
    assert!(scheduler.pending_timers().is_empty());

    // A handle taken before close still works; the window just drops its own.
    assert_eq!(document.origin(), DEFAULT_ORIGIN);

    window.close();
    assert_eq!(window.call("close", &[])?, Some(Value::Undefined));
    assert_eq!(
        window.set_timeout(recording(&log, "late"), 0, Vec::new()),
        None
    );
    scheduler.flush()?;
    assert!(log.borrow().is_empty());
    Ok(())
}

#[test]
fn closed_window_keeps_storage_and_origin_membership() -> Result<()> {
    let registry = OriginRegistry::new();
    let (window, _) = window_with_scheduler(&registry, DEFAULT_ORIGIN)?;
    let (sibling, _) = window_with_scheduler(&registry, DEFAULT_ORIGIN)?;
    window.local_storage().set_item("kept", "yes");
    window.close();

    assert_eq!(sibling.same_origin_windows(), vec![window.clone(), sibling.clone()]);
    assert_eq!(sibling.local_storage().get_item("kept").as_deref(), Some("yes"));
    assert_eq!(window.local_storage().length(), 1);
    assert_eq!(window.atob("Zm9v").as_deref(), Some("foo"));
    Ok(())
}

#[test]
fn geometry_properties_derive_from_the_screen_profile() -> Result<()> {
    let registry = OriginRegistry::new();
    let (window, _) = window_with_scheduler(&registry, DEFAULT_ORIGIN)?;
    let expected = [
        ("innerWidth", 1920),
        ("innerHeight", 951),
        ("outerWidth", 1920),
        ("outerHeight", 1080),
        ("devicePixelRatio", 1),
        ("pageXOffset", 0),
        ("pageYOffset", 0),
        ("screenX", 0),
        ("screenLeft", 0),
        ("screenY", 0),
        ("screenTop", 0),
        ("scrollX", 0),
        ("scrollY", 0),
        ("length", 0),
    ];
    for (name, value) in expected {
        assert_eq!(window.property(name), Some(Value::Number(value)), "{name}");
    }
    assert_eq!(window.property("name"), Some(Value::from("")));
    assert_eq!(window.property("status"), Some(Value::from("")));
    assert_eq!(window.property("origin"), Some(Value::from(DEFAULT_ORIGIN)));
    assert_eq!(window.property("closed"), Some(Value::Bool(false)));
    assert_eq!(window.property("frameElement"), Some(Value::Undefined));
    assert_eq!(window.property("requestAnimationFrame"), None);
    Ok(())
}

#[test]
fn custom_screen_changes_window_geometry() -> Result<()> {
    let registry = OriginRegistry::new();
    let scheduler = Rc::new(ManualScheduler::new());
    let config = WindowConfig::default().with_screen(ScreenProfile::new(1280, 720, 1280, 680, 30));
    let window = Window::new(&registry, config, scheduler)?;
    assert_eq!(window.property("innerHeight"), Some(Value::Number(609)));
    assert_eq!(window.property("outerHeight"), Some(Value::Number(720)));
    assert_eq!(window.screen().pixel_depth(), 30);

    let tiny = ScreenProfile::new(10, 50, 20, 60, 8);
    assert_eq!((tiny.avail_width(), tiny.avail_height()), (10, 50));
    Ok(())
}

#[test]
fn ui_functions_are_accepted_and_ignored() -> Result<()> {
    let registry = OriginRegistry::new();
    let (window, _) = window_with_scheduler(&registry, DEFAULT_ORIGIN)?;
    for name in [
        "alert", "blur", "focus", "moveBy", "moveTo", "open", "print", "resizeBy", "resizeTo",
        "scroll", "scrollBy", "scrollTo", "getComputedStyle", "captureEvents", "releaseEvents",
        "stop",
    ] {
        assert_eq!(window.call(name, &[Value::Number(1)])?, Some(Value::Undefined), "{name}");
    }
    assert_eq!(window.call("confirm", &[])?, Some(Value::Bool(true)));
    assert_eq!(window.call("prompt", &[Value::from("?")])?, Some(Value::from("")));
    assert_eq!(window.call("fetch", &[])?, None);
    assert!(window.confirm("continue?"));
    assert_eq!(window.prompt("name?"), "");
    window.alert("ignored");
    assert!(!window.is_closed());
    Ok(())
}

#[test]
fn console_methods_are_silent() -> Result<()> {
    let registry = OriginRegistry::new();
    let (window, _) = window_with_scheduler(&registry, DEFAULT_ORIGIN)?;
    let console = window.console();
    for method in Console::METHODS {
        assert_eq!(console.call(method, &[Value::from("x")]), Some(Value::Undefined));
    }
    assert_eq!(Console::METHODS.len(), 18);
    assert!(console.has_method("log"));
    assert_eq!(console.call("profile", &[]), None);
    Ok(())
}

#[test]
fn buffer_constructors_are_exposed() -> Result<()> {
    let registry = OriginRegistry::new();
    let (window, _) = window_with_scheduler(&registry, DEFAULT_ORIGIN)?;
    let names: Vec<_> = window
        .buffer_constructors()
        .iter()
        .map(BufferConstructor::name)
        .collect();
    assert_eq!(
        names,
        vec![
            "ArrayBuffer",
            "Int8Array",
            "Uint8Array",
            "Uint8ClampedArray",
            "Int16Array",
            "Uint16Array",
            "Int32Array",
            "Uint32Array",
            "Float32Array",
            "Float64Array",
        ]
    );
    assert_eq!(
        BufferConstructor::from_name("Float64Array").and_then(|ctor| ctor.bytes_per_element()),
        Some(8)
    );
    assert_eq!(BufferConstructor::ArrayBuffer.bytes_per_element(), None);
    assert_eq!(BufferConstructor::from_name("BigInt64Array"), None);
    Ok(())
}

#[test]
fn navigator_defaults_describe_desktop_chrome() -> Result<()> {
    let registry = OriginRegistry::new();
    let (window, _) = window_with_scheduler(&registry, DEFAULT_ORIGIN)?;
    let navigator = window.navigator();
    assert_eq!(navigator.app_code_name(), "Mozilla");
    assert_eq!(navigator.app_name(), "Netscape");
    assert_eq!(navigator.user_agent(), format!("Mozilla/{}", navigator.app_version()));
    assert!(navigator.user_agent().contains("Chrome/106.0.0.0"));
    assert_eq!(navigator.platform(), "Win32");
    assert_eq!(navigator.product(), "Gecko");
    assert_eq!(navigator.product_sub(), "20030107");
    assert_eq!(navigator.vendor(), "Google Inc.");
    assert_eq!(navigator.vendor_sub(), "");
    assert_eq!(navigator.language(), "en-US");
    assert_eq!(navigator.languages(), ["en-US", "en"]);
    assert!(navigator.on_line());
    assert!(navigator.cookie_enabled());
    assert!(!navigator.java_enabled());
    assert_eq!(navigator.to_string_tag(), "Navigator");

    let screen = window.screen();
    assert_eq!((screen.width(), screen.height()), (1920, 1080));
    assert_eq!((screen.avail_width(), screen.avail_height()), (1920, 1022));
    assert_eq!((screen.color_depth(), screen.pixel_depth()), (24, 24));
    assert_eq!(screen.to_string_tag(), "Screen");
    Ok(())
}

#[test]
fn navigator_overrides_keep_agent_and_version_consistent() -> Result<()> {
    let registry = OriginRegistry::new();
    let scheduler = Rc::new(ManualScheduler::new());
    let navigator = NavigatorProfile::default()
        .with_user_agent("Mozilla/5.0 (X11; Linux x86_64) Firefox/118.0")
        .with_platform("Linux x86_64")
        .with_vendor("")
        .with_languages(&["de-DE", "de"])
        .with_hardware_concurrency(0);
    let config = WindowConfig::new("https://a.example/").with_navigator(navigator);
    let window = Window::new(&registry, config, scheduler)?;

    let navigator = window.navigator();
    assert_eq!(navigator.app_version(), "5.0 (X11; Linux x86_64) Firefox/118.0");
    assert_eq!(
        navigator.user_agent(),
        "Mozilla/5.0 (X11; Linux x86_64) Firefox/118.0"
    );
    assert_eq!(navigator.platform(), "Linux x86_64");
    assert_eq!(navigator.vendor(), "");
    assert_eq!(navigator.language(), "de-DE");
    assert_eq!(navigator.hardware_concurrency(), 1);
    Ok(())
}

#[test]
fn empty_origin_is_rejected() {
    let registry = OriginRegistry::new();
    let scheduler = Rc::new(ManualScheduler::new());
    match Window::new(&registry, WindowConfig::new(""), scheduler) {
        Err(Error::InvalidConfig(message)) => assert_eq!(message, "origin must not be empty"),
        other => panic!("expected invalid config, got: {other:?}"),
    }
    assert!(registry.is_empty());
}

#[test]
fn close_trace_line_reports_document_release() -> Result<()> {
    let registry = OriginRegistry::new();
    let (window, _) = window_with_scheduler(&registry, DEFAULT_ORIGIN)?;
    window.enable_trace(true);
    window.set_trace_stderr(false);
    window.set_trace_timers(false);
    window.close();
    window.close();
    assert_eq!(
        window.take_trace_logs(),
        vec![
            "[window] close origin=https://captcha/ released_document=true",
            "[window] close origin=https://captcha/ released_document=false",
        ]
    );
    assert!(window.take_trace_logs().is_empty());
    Ok(())
}

#[test]
fn trace_log_limit_keeps_the_newest_lines() -> Result<()> {
    let registry = OriginRegistry::new();
    let (window, _) = window_with_scheduler(&registry, DEFAULT_ORIGIN)?;
    window.enable_trace(true);
    window.set_trace_stderr(false);
    assert!(matches!(
        window.set_trace_log_limit(0),
        Err(Error::InvalidConfig(_))
    ));
    window.set_trace_log_limit(2)?;
    for delay in [1, 2, 3] {
        window.set_timeout(TimerHandler::callback(|_, _| Ok(())), delay, Vec::new());
    }
    assert_eq!(
        window.take_trace_logs(),
        vec![
            "[timer] schedule timeout id=2 delay_ms=2",
            "[timer] schedule timeout id=3 delay_ms=3",
        ]
    );
    Ok(())
}

#[test]
fn window_config_debug_hides_the_evaluator() {
    let config = WindowConfig::new("https://a.example/");
    let rendered = format!("{config:?}");
    assert!(rendered.contains("origin: \"https://a.example/\""));
    assert!(rendered.contains("evaluator: false"));
    assert_eq!(config.origin(), "https://a.example/");
}
