//! Media capture backends.
//!
//! A backend is an external program asked to write one image to a given
//! path. Each invocation is a single best-effort attempt bounded by a
//! timeout; a non-zero exit, a spawn failure, a timeout or a missing output
//! file are all reported as [`CaptureError`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Placeholder replaced with the output path in command arguments.
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Which picture a backend produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureKind {
    Webcam,
    Screen,
}

impl CaptureKind {
    pub fn label(&self) -> &'static str {
        match self {
            CaptureKind::Webcam => "webcam",
            CaptureKind::Screen => "screen",
        }
    }

    /// File name for a capture triggered by `source` at `stamp`
    /// (`YYYYMMDD_HHMMSS`).
    pub fn file_name(&self, source: &str, stamp: &str) -> String {
        match self {
            CaptureKind::Webcam => format!("intrusion_{source}_{stamp}.jpg"),
            CaptureKind::Screen => format!("screenshot_{source}_{stamp}.png"),
        }
    }

    /// Fixed caption sent with the photo notification.
    pub fn photo_caption(&self) -> &'static str {
        match self {
            CaptureKind::Webcam => "📷 Webcam",
            CaptureKind::Screen => "🖥️ Screenshot",
        }
    }
}

/// A captured image on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureArtifact {
    pub kind: CaptureKind,
    pub path: PathBuf,
}

/// Capture errors.
#[derive(Debug)]
pub enum CaptureError {
    /// The program could not be started
    Spawn { program: String, message: String },
    /// The program exited unsuccessfully
    Failed { program: String, code: Option<i32> },
    /// The program did not finish in time and was killed
    TimedOut { program: String, timeout: Duration },
    /// The program succeeded but wrote nothing
    MissingOutput(PathBuf),
    /// Waiting on the program failed
    Io(String),
}

impl std::fmt::Display for CaptureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureError::Spawn { program, message } => {
                write!(f, "Could not start {program}: {message}")
            }
            CaptureError::Failed { program, code } => match code {
                Some(code) => write!(f, "{program} exited with status {code}"),
                None => write!(f, "{program} was terminated by a signal"),
            },
            CaptureError::TimedOut { program, timeout } => {
                write!(f, "{program} timed out after {}s", timeout.as_secs_f32())
            }
            CaptureError::MissingOutput(path) => {
                write!(f, "Capture produced no file at {}", path.display())
            }
            CaptureError::Io(msg) => write!(f, "Capture IO error: {msg}"),
        }
    }
}

impl std::error::Error for CaptureError {}

/// Something that can produce an image at a path.
pub trait CaptureBackend {
    fn kind(&self) -> CaptureKind;

    fn capture(&self, output: &Path) -> Result<CaptureArtifact, CaptureError>;
}

/// External program invocation, as stored in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureCommand {
    pub program: String,
    /// Arguments; `{output}` is replaced with the target path. If no
    /// argument contains it, the path is appended.
    pub args: Vec<String>,
}

impl CaptureCommand {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// `fswebcam <output>`
    pub fn webcam_default() -> Self {
        Self::new("fswebcam", &[OUTPUT_PLACEHOLDER])
    }

    /// `scrot <output>`
    pub fn screen_default() -> Self {
        Self::new("scrot", &[OUTPUT_PLACEHOLDER])
    }

    /// Arguments with the output path substituted.
    pub fn resolve_args(&self, output: &Path) -> Vec<String> {
        let output = output.display().to_string();
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|a| a.replace(OUTPUT_PLACEHOLDER, &output))
            .collect();
        if !self.args.iter().any(|a| a.contains(OUTPUT_PLACEHOLDER)) {
            args.push(output);
        }
        args
    }
}

/// Capture backend running an external command.
#[derive(Debug, Clone)]
pub struct CommandCapture {
    kind: CaptureKind,
    command: CaptureCommand,
    timeout: Duration,
}

impl CommandCapture {
    pub fn new(kind: CaptureKind, command: CaptureCommand, timeout: Duration) -> Self {
        Self {
            kind,
            command,
            timeout,
        }
    }

    pub fn command(&self) -> &CaptureCommand {
        &self.command
    }
}

impl CaptureBackend for CommandCapture {
    fn kind(&self) -> CaptureKind {
        self.kind
    }

    fn capture(&self, output: &Path) -> Result<CaptureArtifact, CaptureError> {
        let program = self.command.program.clone();
        let mut child = Command::new(&program)
            .args(self.command.resolve_args(output))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| CaptureError::Spawn {
                program: program.clone(),
                message: e.to_string(),
            })?;

        let start = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if start.elapsed() > self.timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(CaptureError::TimedOut {
                            program,
                            timeout: self.timeout,
                        });
                    }
                    std::thread::sleep(Duration::from_millis(50));
                }
                Err(e) => return Err(CaptureError::Io(e.to_string())),
            }
        };

        if !status.success() {
            return Err(CaptureError::Failed {
                program,
                code: status.code(),
            });
        }
        if !output.exists() {
            return Err(CaptureError::MissingOutput(output.to_path_buf()));
        }

        Ok(CaptureArtifact {
            kind: self.kind,
            path: output.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        assert_eq!(
            CaptureKind::Webcam.file_name("keyboard", "20240101_120000"),
            "intrusion_keyboard_20240101_120000.jpg"
        );
        assert_eq!(
            CaptureKind::Screen.file_name("mouse_move", "20240101_120000"),
            "screenshot_mouse_move_20240101_120000.png"
        );
    }

    #[test]
    fn test_resolve_args() {
        let path = Path::new("/tmp/out.jpg");

        let cmd = CaptureCommand::new("fswebcam", &["-r", "640x480", "{output}"]);
        assert_eq!(cmd.resolve_args(path), vec!["-r", "640x480", "/tmp/out.jpg"]);

        let cmd = CaptureCommand::new("grim", &["-t", "png"]);
        assert_eq!(cmd.resolve_args(path), vec!["-t", "png", "/tmp/out.jpg"]);

        let cmd = CaptureCommand::new("sh", &["-c", "cp x {output}"]);
        assert_eq!(cmd.resolve_args(path), vec!["-c", "cp x /tmp/out.jpg"]);
    }

    #[cfg(unix)]
    mod process {
        use super::*;

        fn run(command: CaptureCommand, timeout: Duration) -> (tempfile::TempDir, Result<CaptureArtifact, CaptureError>) {
            let dir = tempfile::tempdir().unwrap();
            let output = dir.path().join("shot.png");
            let backend = CommandCapture::new(CaptureKind::Screen, command, timeout);
            let result = backend.capture(&output);
            (dir, result)
        }

        #[test]
        fn test_successful_capture() {
            let cmd = CaptureCommand::new("sh", &["-c", "printf img > \"$0\"", "{output}"]);
            let (_dir, result) = run(cmd, Duration::from_secs(5));
            let artifact = result.unwrap();
            assert_eq!(artifact.kind, CaptureKind::Screen);
            assert!(artifact.path.exists());
        }

        #[test]
        fn test_nonzero_exit() {
            let cmd = CaptureCommand::new("sh", &["-c", "exit 3", "{output}"]);
            let (_dir, result) = run(cmd, Duration::from_secs(5));
            assert!(matches!(result, Err(CaptureError::Failed { code: Some(3), .. })));
        }

        #[test]
        fn test_missing_output() {
            let cmd = CaptureCommand::new("sh", &["-c", "true", "{output}"]);
            let (_dir, result) = run(cmd, Duration::from_secs(5));
            assert!(matches!(result, Err(CaptureError::MissingOutput(_))));
        }

        #[test]
        fn test_spawn_failure() {
            let cmd = CaptureCommand::new("definitely-not-a-capture-tool", &[]);
            let (_dir, result) = run(cmd, Duration::from_secs(5));
            assert!(matches!(result, Err(CaptureError::Spawn { .. })));
        }

        #[test]
        fn test_timeout_kills_process() {
            let cmd = CaptureCommand::new("sh", &["-c", "sleep 10", "{output}"]);
            let started = Instant::now();
            let (_dir, result) = run(cmd, Duration::from_millis(200));
            assert!(matches!(result, Err(CaptureError::TimedOut { .. })));
            assert!(started.elapsed() < Duration::from_secs(5));
        }
    }
}
