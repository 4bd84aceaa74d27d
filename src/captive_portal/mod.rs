//! SoftAP captive portal
//!
//! Open access point, wildcard DNS and a four-route web form collecting
//! email/name pairs.

pub mod dns;
mod handlers;
mod html;
#[cfg(target_os = "espidf")]
mod server;
mod service;
pub mod storage;

use std::net::Ipv4Addr;

pub use dns::DnsResponder;
pub use handlers::{FormArgs, Reply, Router, Submission};
#[cfg(target_os = "espidf")]
pub use server::{start_portal, EspPortal};
pub use service::{AddUser, PortalService};
pub use storage::AssetStore;

/// Radio side of the access point as seen by the main loop.
pub trait AccessPoint {
    fn own_address(&self) -> Ipv4Addr;
    fn station_count(&self) -> anyhow::Result<usize>;
}
