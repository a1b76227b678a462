use std::io::{ErrorKind, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use image::GrayImage;
use tracing::debug;

use crate::config::PotraceOptions;
use crate::{VectorizeError, VectorizeResult};

use super::BitmapTracer;

const TOOL: &str = "potrace";
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Tracer backed by the external `potrace` binary.
#[derive(Debug, Clone, Default)]
pub struct PotraceTracer {
    options: PotraceOptions,
}

impl PotraceTracer {
    pub fn new(options: PotraceOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PotraceOptions {
        &self.options
    }

    fn unavailable(&self, reason: impl Into<String>) -> VectorizeError {
        VectorizeError::ToolUnavailable {
            tool: format!("{TOOL} ({})", self.options.binary.display()),
            reason: reason.into(),
        }
    }

    fn failed(&self, message: impl Into<String>) -> VectorizeError {
        VectorizeError::ToolInvocationFailed {
            tool: TOOL.to_string(),
            message: message.into(),
        }
    }

    fn spawn_error(&self, err: std::io::Error) -> VectorizeError {
        match err.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => self.unavailable(err.to_string()),
            _ => VectorizeError::Io(err),
        }
    }

    /// Run potrace on `input`, writing SVG to `output`, within the configured timeout.
    fn run(&self, input: &Path, output: &Path) -> VectorizeResult<()> {
        let mut child = Command::new(&self.options.binary)
            .arg(input)
            .arg("-s")
            .arg("-o")
            .arg(output)
            .arg("--opttolerance")
            .arg(self.options.opt_tolerance.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| self.spawn_error(err))?;

        let started = Instant::now();
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if started.elapsed() >= self.options.timeout {
                // the child may have exited between the poll and the kill
                let _ = child.kill();
                let _ = child.wait();
                return Err(self.failed(format!(
                    "timed out after {:.1}s",
                    self.options.timeout.as_secs_f64()
                )));
            }
            thread::sleep(POLL_INTERVAL);
        };

        let mut stderr = String::new();
        if let Some(mut pipe) = child.stderr.take() {
            pipe.read_to_string(&mut stderr)?;
        }
        debug!(?status, elapsed = ?started.elapsed(), "potrace finished");

        if !status.success() {
            let stderr = stderr.trim();
            let message = if stderr.is_empty() {
                format!("exited with {status}")
            } else {
                format!("exited with {status}: {stderr}")
            };
            return Err(self.failed(message));
        }
        Ok(())
    }
}

impl BitmapTracer for PotraceTracer {
    fn name(&self) -> &str {
        TOOL
    }

    fn check_available(&self) -> VectorizeResult<()> {
        let output = Command::new(&self.options.binary)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .map_err(|err| self.spawn_error(err))?;
        if !output.status.success() {
            return Err(self.unavailable(format!("`--version` exited with {}", output.status)));
        }
        Ok(())
    }

    fn trace(&self, bitmap: &GrayImage) -> VectorizeResult<String> {
        let workdir = tempfile::tempdir()?;
        let input = workdir.path().join("layer.pgm");
        let output = workdir.path().join("layer.svg");

        bitmap.save(&input)?;
        self.run(&input, &output)?;

        std::fs::read_to_string(&output).map_err(|err| match err.kind() {
            ErrorKind::NotFound => self.failed("no SVG output was written"),
            _ => VectorizeError::Io(err),
        })
    }
}
