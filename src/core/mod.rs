//! Core logic of the intrusion watcher.
//!
//! This module contains:
//! - Event classification and key symbol mapping
//! - The NumLock arming state machine and its typed-text buffer
//! - The global cooldown gate for intrusion triggers

pub mod arming;
pub mod classifier;
pub mod codes;
pub mod cooldown;
pub mod keymap;

// Re-export commonly used types
pub use arming::{ArmState, ArmingMachine, IntrusionEvent, IntrusionSource, Reaction};
pub use classifier::{classify, ClassifiedEvent};
pub use cooldown::{CooldownGate, DEFAULT_COOLDOWN};
pub use keymap::{symbol_for, BACKSPACE_TOKEN};
