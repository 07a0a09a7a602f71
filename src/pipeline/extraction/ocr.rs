use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use image::{DynamicImage, ImageOutputFormat};
use tracing::debug;

use super::types::{OcrConfig, OcrEngine};
use super::ExtractionError;
use crate::config::{is_valid_language_pack, OcrSettings};

/// How often a running tesseract child is checked for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Tesseract OCR engine driven through its command-line binary.
///
/// Each call writes the variant to a temporary PNG and runs
/// `tesseract <file> stdout -l <pack> <config args>`. Calls that exceed the
/// configured timeout are killed and reported as `ExtractionError::Timeout`.
pub struct TesseractCli {
    settings: OcrSettings,
}

impl TesseractCli {
    pub fn new(settings: OcrSettings) -> Self {
        Self { settings }
    }

    /// Resolve the binary and timeout from the environment.
    pub fn from_env() -> Self {
        Self::new(OcrSettings::from_env())
    }

    pub fn settings(&self) -> &OcrSettings {
        &self.settings
    }

    /// Language packs installed alongside the binary.
    pub fn list_languages(&self) -> Result<Vec<String>, ExtractionError> {
        let mut cmd = Command::new(&self.settings.tesseract_cmd);
        cmd.arg("--list-langs");
        let output = self.run(cmd)?;
        if !output.status.success() {
            return Err(ExtractionError::OcrProcessing(format!(
                "tesseract --list-langs failed: {}",
                output.stderr.trim()
            )));
        }

        // First line is the "List of available languages" banner.
        Ok(output
            .stdout
            .lines()
            .skip(1)
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Spawn `cmd`, capturing output into temp files so a chatty child can
    /// never block on a full pipe while we poll it.
    fn run(&self, mut cmd: Command) -> Result<CapturedOutput, ExtractionError> {
        let mut stdout_file = tempfile::tempfile()?;
        let mut stderr_file = tempfile::tempfile()?;

        cmd.stdin(Stdio::null())
            .stdout(Stdio::from(stdout_file.try_clone()?))
            .stderr(Stdio::from(stderr_file.try_clone()?));

        let mut child = cmd.spawn().map_err(|e| match e.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => ExtractionError::EngineUnavailable(
                format!("{}: {e}", self.settings.tesseract_cmd.display()),
            ),
            _ => ExtractionError::Io(e),
        })?;

        let status = wait_with_deadline(&mut child, self.settings.timeout)?;

        Ok(CapturedOutput {
            status,
            stdout: read_all(&mut stdout_file)?,
            stderr: read_all(&mut stderr_file)?,
        })
    }
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new(OcrSettings::default())
    }
}

impl OcrEngine for TesseractCli {
    fn version(&self) -> Result<String, ExtractionError> {
        let mut cmd = Command::new(&self.settings.tesseract_cmd);
        cmd.arg("--version");
        let output = match self.run(cmd) {
            Ok(output) => output,
            Err(ExtractionError::Timeout { after_ms }) => {
                return Err(ExtractionError::EngineUnavailable(format!(
                    "version probe timed out after {after_ms} ms"
                )))
            }
            Err(e) => return Err(e),
        };

        if !output.status.success() {
            return Err(ExtractionError::EngineUnavailable(format!(
                "tesseract --version exited with {}",
                output.status
            )));
        }

        // Older releases print the banner on stderr.
        output
            .stdout
            .lines()
            .chain(output.stderr.lines())
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                ExtractionError::EngineUnavailable("tesseract --version printed nothing".into())
            })
    }

    fn recognize(
        &self,
        image: &DynamicImage,
        language_pack: &str,
        config: &OcrConfig,
    ) -> Result<String, ExtractionError> {
        if !is_valid_language_pack(language_pack) {
            return Err(ExtractionError::InvalidLanguagePack(language_pack.to_string()));
        }

        let mut tmp = tempfile::Builder::new()
            .prefix("rx-triage-")
            .suffix(".png")
            .tempfile()?;
        image
            .write_to(&mut tmp, ImageOutputFormat::Png)
            .map_err(|e| ExtractionError::ImageProcessing(format!("PNG encoding failed: {e}")))?;

        let mut cmd = Command::new(&self.settings.tesseract_cmd);
        cmd.arg(tmp.path())
            .arg("stdout")
            .arg("-l")
            .arg(language_pack)
            .args(config.args());

        let output = self.run(cmd)?;
        if !output.status.success() {
            return Err(ExtractionError::OcrProcessing(format!(
                "tesseract exited with {}: {}",
                output.status,
                output.stderr.trim()
            )));
        }

        debug!(config = config.name, chars = output.stdout.len(), "tesseract call finished");
        Ok(output.stdout)
    }
}

/// The slice of `std::process::Child` the poll loop needs.
trait PollableChild {
    fn try_wait(&mut self) -> std::io::Result<Option<ExitStatus>>;
    fn kill(&mut self) -> std::io::Result<()>;
    fn wait(&mut self) -> std::io::Result<ExitStatus>;
}

impl PollableChild for Child {
    fn try_wait(&mut self) -> std::io::Result<Option<ExitStatus>> {
        Child::try_wait(self)
    }

    fn kill(&mut self) -> std::io::Result<()> {
        Child::kill(self)
    }

    fn wait(&mut self) -> std::io::Result<ExitStatus> {
        Child::wait(self)
    }
}

/// Poll `child` until it exits or `timeout` elapses. On timeout or a failed
/// poll the child is killed and reaped before returning.
fn wait_with_deadline<C: PollableChild>(
    child: &mut C,
    timeout: Duration,
) -> Result<ExitStatus, ExtractionError> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {}
            Err(e) => {
                reap(child);
                return Err(ExtractionError::Io(e));
            }
        }
        if Instant::now() >= deadline {
            reap(child);
            return Err(ExtractionError::Timeout {
                after_ms: timeout.as_millis() as u64,
            });
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn reap<C: PollableChild>(child: &mut C) {
    let _ = child.kill();
    let _ = child.wait();
}

struct CapturedOutput {
    status: ExitStatus,
    stdout: String,
    stderr: String,
}

fn read_all(file: &mut File) -> Result<String, ExtractionError> {
    file.seek(SeekFrom::Start(0))?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Mock OCR engine for unit testing without Tesseract.
///
/// Returns the same text for every call. `unavailable()` builds an engine
/// whose version probe fails.
pub struct MockOcrEngine {
    pub text: String,
    pub available: bool,
}

impl MockOcrEngine {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            available: true,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            text: String::new(),
            available: false,
        }
    }
}

impl OcrEngine for MockOcrEngine {
    fn version(&self) -> Result<String, ExtractionError> {
        if self.available {
            Ok("mock 1.0".into())
        } else {
            Err(ExtractionError::EngineUnavailable("mock engine disabled".into()))
        }
    }

    fn recognize(
        &self,
        _image: &DynamicImage,
        _language_pack: &str,
        _config: &OcrConfig,
    ) -> Result<String, ExtractionError> {
        if !self.available {
            return Err(ExtractionError::EngineUnavailable("mock engine disabled".into()));
        }
        Ok(self.text.clone())
    }
}
