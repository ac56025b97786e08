//! Event loop routing source messages through the watcher.
//!
//! The dispatcher owns all mutable watcher state: the arming machine, the
//! cooldown gate and the table of live sources. Messages are handled one at
//! a time in arrival order, so no locking is involved.

use crate::audit::SharedAuditLog;
use crate::collector::{CollectorError, InputSource, SourceId, SourceMessage};
use crate::core::{classify, ArmState, ArmingMachine, CooldownGate, IntrusionSource};
use crate::responder::{IntrusionResponder, ResponseReport};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How often the loop checks the shutdown flag while idle.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct Dispatcher {
    sources: HashMap<SourceId, InputSource>,
    machine: ArmingMachine,
    gate: CooldownGate,
    responder: IntrusionResponder,
    audit: SharedAuditLog,
}

impl Dispatcher {
    pub fn new(
        sources: Vec<InputSource>,
        machine: ArmingMachine,
        gate: CooldownGate,
        responder: IntrusionResponder,
        audit: SharedAuditLog,
    ) -> Self {
        Self {
            sources: sources.into_iter().map(|s| (s.id, s)).collect(),
            machine,
            gate,
            responder,
            audit,
        }
    }

    pub fn machine(&self) -> &ArmingMachine {
        &self.machine
    }

    pub fn gate(&self) -> &CooldownGate {
        &self.gate
    }

    /// Number of sources still being read.
    pub fn active_sources(&self) -> usize {
        self.sources.len()
    }

    /// Handle one message using the current time.
    pub fn handle(&mut self, message: SourceMessage) -> Option<ResponseReport> {
        self.handle_at(message, Instant::now())
    }

    /// Handle one message as if it arrived at `now`.
    ///
    /// Returns the responder report when the message led to an alert.
    pub fn handle_at(&mut self, message: SourceMessage, now: Instant) -> Option<ResponseReport> {
        let event = match message {
            SourceMessage::Event(event) => event,
            SourceMessage::Lost { source, error } => {
                self.drop_source(source, error);
                return None;
            }
        };

        // Events from a dropped or unknown source are ignored.
        let roles = self.sources.get(&event.source)?.roles;

        let reaction = self.machine.handle(event.source, roles, classify(&event));

        if let Some(state) = reaction.indicator {
            println!(
                "NumLock = {}",
                if state == ArmState::Disarmed { "ON" } else { "OFF" }
            );
            info!(%state, "Indicator changed");
        }

        if let Some(entry) = reaction.audit_entry {
            if let Err(e) = self.audit.append(&entry) {
                warn!("Could not write audit log: {e}");
            }
        }

        let candidate = reaction.candidate?;
        match candidate.source {
            IntrusionSource::Keyboard => self.audit.record_key_press(),
            IntrusionSource::MouseClick => self.audit.record_mouse_click(),
            IntrusionSource::MouseMove => self.audit.record_mouse_move(),
        }
        self.audit.record_candidate();

        if !self.gate.try_accept(now) {
            self.audit.record_suppressed();
            debug!(
                source = candidate.source.as_str(),
                remaining_ms = self.gate.remaining(now).as_millis() as u64,
                "Candidate suppressed by cooldown"
            );
            return None;
        }

        self.audit.record_trigger();
        info!(source = candidate.source.as_str(), "Intrusion detected");
        Some(self.responder.respond(&candidate))
    }

    /// Process messages until `running` is cleared.
    pub fn run(&mut self, receiver: &Receiver<SourceMessage>, running: &AtomicBool) {
        while running.load(Ordering::SeqCst) {
            match receiver.recv_timeout(POLL_INTERVAL) {
                Ok(message) => {
                    self.handle(message);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    warn!("All input readers disconnected");
                    break;
                }
            }
        }
    }

    fn drop_source(&mut self, source: SourceId, error: String) {
        let err = CollectorError::DeviceRead {
            source,
            message: error,
        };
        match self.sources.remove(&source) {
            Some(removed) => {
                println!("[-] Device lost: {} ({})", removed.path, removed.name);
                warn!("{err}; continuing with {} source(s)", self.sources.len());
            }
            None => debug!("{err} (already dropped)"),
        }
        if self.sources.is_empty() {
            warn!("No input sources left to monitor");
        }
    }
}
