use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "rx-triage";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tesseract language pack used when the caller does not ask for one.
pub const DEFAULT_LANGUAGE_PACK: &str = "eng";

/// Upper bound for a single OCR engine invocation.
pub const DEFAULT_OCR_TIMEOUT_SECS: u64 = 30;

/// Environment variable pointing at an explicit tesseract binary.
pub const TESSERACT_PATH_ENV: &str = "TESSERACT_PATH";

/// Environment variable overriding the per-call OCR timeout (seconds).
pub const OCR_TIMEOUT_ENV: &str = "RX_TRIAGE_OCR_TIMEOUT_SECS";

/// Default install location of the Windows tesseract installer.
const WINDOWS_TESSERACT_PATH: &str = r"C:\Program Files\Tesseract-OCR\tesseract.exe";

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "rx_triage=debug,warn"
    } else {
        "rx_triage=info,warn"
    }
}

/// OCR runtime settings.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrSettings {
    /// Binary invoked for recognition and the version probe.
    pub tesseract_cmd: PathBuf,
    /// Per-call timeout. A call that exceeds it is killed and skipped.
    pub timeout: Duration,
    /// Language pack used when none is given per call.
    pub language_pack: String,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            tesseract_cmd: PathBuf::from("tesseract"),
            timeout: Duration::from_secs(DEFAULT_OCR_TIMEOUT_SECS),
            language_pack: DEFAULT_LANGUAGE_PACK.to_string(),
        }
    }
}

impl OcrSettings {
    /// Build settings from the process environment.
    ///
    /// Binary resolution order: `TESSERACT_PATH` (if the file exists), the
    /// Windows default install path (Windows only), then `tesseract` on `PATH`.
    pub fn from_env() -> Self {
        let env_cmd = std::env::var(TESSERACT_PATH_ENV).ok();
        let env_timeout = std::env::var(OCR_TIMEOUT_ENV).ok();
        Self::from_values(env_cmd.as_deref(), env_timeout.as_deref())
    }

    fn from_values(env_cmd: Option<&str>, env_timeout: Option<&str>) -> Self {
        let mut settings = Self::default();

        if let Some(cmd) = resolve_tesseract_cmd(env_cmd) {
            settings.tesseract_cmd = cmd;
        }

        match env_timeout.map(str::trim).map(str::parse::<u64>) {
            Some(Ok(secs)) if secs > 0 => settings.timeout = Duration::from_secs(secs),
            Some(_) => tracing::warn!(
                var = OCR_TIMEOUT_ENV,
                "Ignoring invalid OCR timeout, using {DEFAULT_OCR_TIMEOUT_SECS}s"
            ),
            None => {}
        }

        settings
    }

    pub fn with_tesseract_cmd(mut self, cmd: impl Into<PathBuf>) -> Self {
        self.tesseract_cmd = cmd.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_language_pack(mut self, pack: &str) -> Self {
        self.language_pack = pack.to_string();
        self
    }
}

fn resolve_tesseract_cmd(env_cmd: Option<&str>) -> Option<PathBuf> {
    if let Some(raw) = env_cmd.map(str::trim).filter(|s| !s.is_empty()) {
        let path = Path::new(raw);
        if path.exists() {
            return Some(path.to_path_buf());
        }
        tracing::warn!(path = raw, "{TESSERACT_PATH_ENV} does not exist, ignoring");
    }

    if cfg!(windows) {
        let default = Path::new(WINDOWS_TESSERACT_PATH);
        if default.exists() {
            return Some(default.to_path_buf());
        }
    }

    None
}

/// Check a tesseract language pack token such as `eng` or `eng+hin`.
pub fn is_valid_language_pack(pack: &str) -> bool {
    !pack.is_empty()
        && pack.split('+').all(|part| {
            !part.is_empty() && part.chars().all(|c| c.is_ascii_alphabetic() || c == '_')
        })
}
