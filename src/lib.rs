//! Captive-portal access point with an OLED marquee of collected sign-ups.

pub mod app;
pub mod blink;
#[cfg(target_os = "espidf")]
pub mod boards;
pub mod captive_portal;
pub mod config;
pub mod registry;
pub mod ui;

pub use app::{App, ConnectionCounters, ScrollState};
pub use registry::{CollectedEntry, EntryRegistry};
