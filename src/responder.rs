//! Intrusion responder: capture, log, notify.
//!
//! Runs once per candidate accepted by the cooldown gate. The steps always
//! run in the same order and each one is isolated: a failed webcam capture
//! does not stop the screenshot, a failed text message does not stop the
//! photo uploads.

use crate::audit::SharedAuditLog;
use crate::capture::{CaptureArtifact, CaptureBackend};
use crate::core::{IntrusionEvent, IntrusionSource};
use crate::notify::Notifier;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Timestamp format used in captions.
pub const CAPTION_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp format embedded in capture file names.
pub const FILE_TIME_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Build the alert caption.
pub fn build_caption(source: IntrusionSource, at: DateTime<Local>, typed: &str) -> String {
    let mut caption = format!(
        "Intrusion via {} at {}",
        source,
        at.format(CAPTION_TIME_FORMAT)
    );
    if !typed.is_empty() {
        caption.push_str("\nTyped so far: ");
        caption.push_str(typed);
    }
    caption
}

/// Outcome of one response, for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseReport {
    pub caption: String,
    pub webcam: Option<PathBuf>,
    pub screen: Option<PathBuf>,
    pub text_sent: bool,
    pub photos_sent: usize,
}

/// Orchestrates the side effects of an accepted intrusion.
pub struct IntrusionResponder {
    output_dir: PathBuf,
    webcam: Box<dyn CaptureBackend>,
    screen: Box<dyn CaptureBackend>,
    notifier: Box<dyn Notifier>,
    audit: SharedAuditLog,
}

impl IntrusionResponder {
    pub fn new(
        output_dir: PathBuf,
        webcam: Box<dyn CaptureBackend>,
        screen: Box<dyn CaptureBackend>,
        notifier: Box<dyn Notifier>,
        audit: SharedAuditLog,
    ) -> Self {
        Self {
            output_dir,
            webcam,
            screen,
            notifier,
            audit,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Respond to an intrusion now.
    pub fn respond(&self, event: &IntrusionEvent) -> ResponseReport {
        self.respond_at(event, Local::now())
    }

    /// Respond to an intrusion observed at `at`.
    pub fn respond_at(&self, event: &IntrusionEvent, at: DateTime<Local>) -> ResponseReport {
        let stamp = at.format(FILE_TIME_FORMAT).to_string();
        let source = event.source.as_str();

        let webcam = self.capture(self.webcam.as_ref(), source, &stamp);
        let screen = self.capture(self.screen.as_ref(), source, &stamp);

        let caption = build_caption(event.source, at, &event.typed);

        if let Err(e) = self.audit.append_at(at, &caption) {
            warn!("Could not write audit log: {e}");
        }

        let text_sent = match self.notifier.send_text(&caption) {
            Ok(()) => true,
            Err(e) => {
                warn!("Text notification failed: {e}");
                self.audit.record_delivery_failure();
                false
            }
        };

        let mut photos_sent = 0;
        for artifact in webcam.iter().chain(screen.iter()) {
            match self
                .notifier
                .send_photo(&artifact.path, artifact.kind.photo_caption())
            {
                Ok(()) => photos_sent += 1,
                Err(e) => {
                    warn!("{} photo notification failed: {e}", artifact.kind.label());
                    self.audit.record_delivery_failure();
                }
            }
        }

        info!(
            source,
            text_sent,
            photos_sent,
            "Intrusion alert processed"
        );

        ResponseReport {
            caption,
            webcam: webcam.map(|a| a.path),
            screen: screen.map(|a| a.path),
            text_sent,
            photos_sent,
        }
    }

    fn capture(
        &self,
        backend: &dyn CaptureBackend,
        source: &str,
        stamp: &str,
    ) -> Option<CaptureArtifact> {
        let kind = backend.kind();
        let output = self.output_dir.join(kind.file_name(source, stamp));
        match backend.capture(&output) {
            Ok(artifact) => Some(artifact),
            Err(e) => {
                warn!("{} capture failed: {e}", kind.label());
                self.audit.record_capture_failure();
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 17, 22, 14, 3).unwrap()
    }

    #[test]
    fn test_caption_without_typed_text() {
        assert_eq!(
            build_caption(IntrusionSource::MouseMove, at(), ""),
            "Intrusion via mouse_move at 2024-05-17 22:14:03"
        );
    }

    #[test]
    fn test_caption_with_typed_text() {
        assert_eq!(
            build_caption(IntrusionSource::Keyboard, at(), "hi"),
            "Intrusion via keyboard at 2024-05-17 22:14:03\nTyped so far: hi"
        );
    }
}
