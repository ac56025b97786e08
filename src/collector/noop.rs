//! Non-Linux (noop) implementation of event collection.
//!
//! This exists so the crate (and binary) can compile on targets without
//! evdev. Discovery always finds nothing.

use crate::collector::types::{
    CollectorConfig, CollectorError, InputSource, SourceId, SourceMessage,
};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A noop collector that never yields sources or events.
pub struct NoopCollector {
    _sender: Sender<SourceMessage>,
    receiver: Receiver<SourceMessage>,
    running: Arc<AtomicBool>,
}

impl NoopCollector {
    /// Always fails with [`CollectorError::NoSources`].
    pub fn discover(_config: CollectorConfig) -> Result<Self, CollectorError> {
        Err(CollectorError::NoSources)
    }

    /// Create an empty collector.
    pub fn empty() -> Self {
        let (sender, receiver) = bounded(1);
        Self {
            _sender: sender,
            receiver,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn sources(&self) -> &[InputSource] {
        &[]
    }

    pub fn indicator(&self) -> Option<SourceId> {
        None
    }

    pub fn indicator_on(&self) -> bool {
        false
    }

    pub fn start(&mut self) -> Result<(), CollectorError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(CollectorError::AlreadyRunning);
        }
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn receiver(&self) -> &Receiver<SourceMessage> {
        &self.receiver
    }
}
