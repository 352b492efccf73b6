/// `navigator` fingerprint: a consistent Chrome-on-Windows desktop by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigatorProfile {
    app_version: String,
    platform: String,
    vendor: String,
    languages: Vec<String>,
    plugins: Vec<String>,
    mime_types: Vec<String>,
    hardware_concurrency: u32,
}

const DEFAULT_APP_VERSION: &str = "5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/106.0.0.0 Safari/537.36";

impl Default for NavigatorProfile {
    fn default() -> Self {
        Self {
            app_version: DEFAULT_APP_VERSION.to_string(),
            platform: "Win32".to_string(),
            vendor: "Google Inc.".to_string(),
            languages: vec!["en-US".to_string(), "en".to_string()],
            plugins: vec!["internal-pdf-viewer".to_string()],
            mime_types: vec!["application/pdf".to_string(), "text/pdf".to_string()],
            hardware_concurrency: 8,
        }
    }
}

impl NavigatorProfile {
    /// Replaces the user agent. `appVersion` is derived from it so both stay
    /// consistent: it is the agent with its `Mozilla/` prefix removed.
    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.app_version = user_agent
            .strip_prefix("Mozilla/")
            .unwrap_or(user_agent)
            .to_string();
        self
    }

    pub fn with_platform(mut self, platform: &str) -> Self {
        self.platform = platform.to_string();
        self
    }

    pub fn with_vendor(mut self, vendor: &str) -> Self {
        self.vendor = vendor.to_string();
        self
    }

    /// The first entry also becomes `navigator.language`; an empty list keeps
    /// the current languages.
    pub fn with_languages(mut self, languages: &[&str]) -> Self {
        if !languages.is_empty() {
            self.languages = languages.iter().map(|lang| lang.to_string()).collect();
        }
        self
    }

    pub fn with_hardware_concurrency(mut self, cores: u32) -> Self {
        self.hardware_concurrency = cores.max(1);
        self
    }

    pub fn app_code_name(&self) -> &str {
        "Mozilla"
    }

    pub fn app_name(&self) -> &str {
        "Netscape"
    }

    pub fn app_version(&self) -> &str {
        &self.app_version
    }

    pub fn user_agent(&self) -> String {
        format!("Mozilla/{}", self.app_version)
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn product(&self) -> &str {
        "Gecko"
    }

    pub fn product_sub(&self) -> &str {
        "20030107"
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    pub fn vendor_sub(&self) -> &str {
        ""
    }

    pub fn language(&self) -> &str {
        self.languages.first().map(String::as_str).unwrap_or("en-US")
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn on_line(&self) -> bool {
        true
    }

    /// A real boolean, as browsers report it.
    pub fn cookie_enabled(&self) -> bool {
        true
    }

    pub fn plugins(&self) -> &[String] {
        &self.plugins
    }

    pub fn mime_types(&self) -> &[String] {
        &self.mime_types
    }

    pub fn hardware_concurrency(&self) -> u32 {
        self.hardware_concurrency
    }

    pub fn java_enabled(&self) -> bool {
        false
    }

    pub fn to_string_tag(&self) -> &'static str {
        "Navigator"
    }
}

/// `screen` geometry. Defaults to a 1920x1080 display with a 58px taskbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenProfile {
    width: u32,
    height: u32,
    avail_width: u32,
    avail_height: u32,
    color_depth: u32,
}

impl Default for ScreenProfile {
    fn default() -> Self {
        Self::new(1920, 1080, 1920, 1022, 24)
    }
}

impl ScreenProfile {
    /// Available dimensions are clamped to the full ones.
    pub fn new(
        width: u32,
        height: u32,
        avail_width: u32,
        avail_height: u32,
        color_depth: u32,
    ) -> Self {
        Self {
            width,
            height,
            avail_width: avail_width.min(width),
            avail_height: avail_height.min(height),
            color_depth,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn avail_width(&self) -> u32 {
        self.avail_width
    }

    pub fn avail_height(&self) -> u32 {
        self.avail_height
    }

    pub fn color_depth(&self) -> u32 {
        self.color_depth
    }

    pub fn pixel_depth(&self) -> u32 {
        self.color_depth
    }

    pub fn to_string_tag(&self) -> &'static str {
        "Screen"
    }
}
