//! Linux implementation of event collection using evdev.
//!
//! Every relevant `/dev/input/event*` node gets its own reader thread. Readers
//! forward raw events into one bounded channel, which is the dispatcher's
//! wait-for-any primitive. Reading requires access to the input devices
//! (root or membership in the `input` group).

use crate::collector::types::{
    designate_indicator, Capabilities, CollectorConfig, CollectorError, EventKind, InputSource,
    RawEvent, SourceId, SourceMessage, SourceRoles,
};
use crossbeam_channel::{bounded, Receiver, Sender};
use evdev::{Device, EventType, Key, LedType};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// The Linux evdev collector.
pub struct EvdevCollector {
    sources: Vec<InputSource>,
    devices: Vec<(SourceId, Device)>,
    indicator: Option<SourceId>,
    indicator_on: bool,
    sender: Sender<SourceMessage>,
    receiver: Receiver<SourceMessage>,
    running: Arc<AtomicBool>,
    thread_handles: Vec<JoinHandle<()>>,
}

impl EvdevCollector {
    /// Enumerate input devices and classify them into sources.
    ///
    /// Devices that hold no role under the given configuration are skipped.
    pub fn discover(config: CollectorConfig) -> Result<Self, CollectorError> {
        let mut found: Vec<(std::path::PathBuf, Device)> = evdev::enumerate().collect();
        found.sort_by(|a, b| a.0.cmp(&b.0));

        let mut sources = Vec::new();
        let mut devices = Vec::new();
        for (path, device) in found {
            let roles = SourceRoles::from_capabilities(&probe_capabilities(&device)).masked(&config);
            if roles.is_empty() {
                continue;
            }
            let id = sources.len();
            sources.push(InputSource {
                id,
                path: path.display().to_string(),
                name: device.name().unwrap_or("unknown").to_string(),
                roles,
            });
            devices.push((id, device));
        }

        if sources.is_empty() {
            return Err(CollectorError::NoSources);
        }

        let indicator = designate_indicator(&sources);
        let indicator_on = indicator
            .and_then(|id| devices.iter().find(|(d, _)| *d == id))
            .map(|(_, device)| numlock_state(device))
            .unwrap_or(false);

        let (sender, receiver) = bounded(config.channel_capacity);

        Ok(Self {
            sources,
            devices,
            indicator,
            indicator_on,
            sender,
            receiver,
            running: Arc::new(AtomicBool::new(false)),
            thread_handles: Vec::new(),
        })
    }

    /// All enumerated sources.
    pub fn sources(&self) -> &[InputSource] {
        &self.sources
    }

    /// The designated indicator source, if any.
    pub fn indicator(&self) -> Option<SourceId> {
        self.indicator
    }

    /// NumLock state of the indicator at enumeration time.
    pub fn indicator_on(&self) -> bool {
        self.indicator_on
    }

    /// Start one reader thread per source.
    pub fn start(&mut self) -> Result<(), CollectorError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(CollectorError::AlreadyRunning);
        }
        self.running.store(true, Ordering::SeqCst);

        for (id, device) in self.devices.drain(..) {
            let sender = self.sender.clone();
            let running = self.running.clone();
            let handle = thread::Builder::new()
                .name(format!("input-source-{id}"))
                .spawn(move || read_loop(id, device, sender, running))
                .map_err(|e| CollectorError::DeviceRead {
                    source: id,
                    message: e.to_string(),
                })?;
            self.thread_handles.push(handle);
        }
        Ok(())
    }

    /// Stop forwarding events.
    ///
    /// Readers blocked in a device read exit after their next event; they
    /// are detached rather than joined.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.thread_handles.clear();
    }

    /// Check if the collector is currently running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get the receiver for source messages.
    pub fn receiver(&self) -> &Receiver<SourceMessage> {
        &self.receiver
    }
}

impl Drop for EvdevCollector {
    fn drop(&mut self) {
        self.stop();
    }
}

fn probe_capabilities(device: &Device) -> Capabilities {
    let keys = device.supported_keys();
    Capabilities {
        numlock_led: device
            .supported_leds()
            .map_or(false, |leds| leds.contains(LedType::LED_NUML)),
        key_a: keys.map_or(false, |k| k.contains(Key::KEY_A)),
        btn_left: keys.map_or(false, |k| k.contains(Key::BTN_LEFT)),
        relative_axes: device.supported_events().contains(EventType::RELATIVE),
    }
}

fn numlock_state(device: &Device) -> bool {
    match device.get_led_state() {
        Ok(leds) => leds.contains(LedType::LED_NUML),
        Err(e) => {
            warn!("Could not read NumLock state, assuming OFF: {e}");
            false
        }
    }
}

/// Drain whatever each read returns and forward it in order.
///
/// A read error ends the loop after reporting the source as lost.
fn read_loop(
    id: SourceId,
    mut device: Device,
    sender: Sender<SourceMessage>,
    running: Arc<AtomicBool>,
) {
    while running.load(Ordering::SeqCst) {
        let batch: Vec<RawEvent> = match device.fetch_events() {
            Ok(events) => events
                .map(|ev| {
                    RawEvent::new(
                        id,
                        EventKind::from_type(ev.event_type().0),
                        ev.code(),
                        ev.value(),
                    )
                })
                .collect(),
            Err(e) => {
                let _ = sender.send(SourceMessage::Lost {
                    source: id,
                    error: e.to_string(),
                });
                return;
            }
        };

        for event in batch {
            if sender.send(SourceMessage::Event(event)).is_err() {
                debug!(source = id, "Dispatcher gone, reader exiting");
                return;
            }
        }
    }
}
