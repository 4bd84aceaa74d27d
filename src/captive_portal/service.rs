use std::{
    io,
    net::{Ipv4Addr, SocketAddr},
    sync::mpsc::{Receiver, TryRecvError},
    time::Instant,
};

use super::{dns::DnsResponder, handlers::Submission};
use crate::{
    blink::BlinkTimer,
    config::{IndicatorPins, PortalConfig},
};

/// Receives every accepted form submission. Only one consumer exists.
pub trait AddUser {
    fn add_user(&mut self, email: String, name: String);
}

impl<F: FnMut(String, String)> AddUser for F {
    fn add_user(&mut self, email: String, name: String) {
        self(email, name)
    }
}

/// Portal state owned by the main loop.
///
/// The HTTP server answers clients on its own task and only forwards
/// submissions here, so the callback always runs inside [`PortalService::poll`].
pub struct PortalService {
    active: bool,
    ap_address: Ipv4Addr,
    pins: IndicatorPins,
    dns: DnsResponder,
    submissions: Receiver<Submission>,
    server_gone: bool,
    left_blink: BlinkTimer,
    right_blink: BlinkTimer,
}

impl PortalService {
    pub fn new(
        config: &PortalConfig,
        ap_address: Ipv4Addr,
        dns: DnsResponder,
        submissions: Receiver<Submission>,
        now: Instant,
    ) -> Self {
        let pins = config.pins;
        Self {
            active: true,
            ap_address,
            pins,
            dns,
            submissions,
            server_gone: false,
            left_blink: BlinkTimer::new(pins.left_flash, config.blink_interval, now),
            right_blink: BlinkTimer::new(pins.right_flash, config.blink_interval, now),
        }
    }

    /// Drains the DNS and HTTP work that is ready now, then returns.
    pub fn poll<S: AddUser>(&mut self, now: Instant, sink: &mut S) {
        if !self.active {
            return;
        }

        self.dns.process_pending();

        while !self.server_gone {
            match self.submissions.try_recv() {
                Ok(Submission { email, name }) => sink.add_user(email, name),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::warn!("HTTP server is gone, no more submissions");
                    self.server_gone = true;
                }
            }
        }

        for timer in [&mut self.left_blink, &mut self.right_blink] {
            if let Some(level) = timer.update(now) {
                log::debug!("Indicator pin {} -> {}", timer.pin(), level);
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn ap_address(&self) -> Ipv4Addr {
        self.ap_address
    }

    pub fn pins(&self) -> IndicatorPins {
        self.pins
    }

    pub fn dns_local_addr(&self) -> io::Result<SocketAddr> {
        self.dns.local_addr()
    }

    pub fn left_blink_mut(&mut self) -> &mut BlinkTimer {
        &mut self.left_blink
    }

    pub fn right_blink_mut(&mut self) -> &mut BlinkTimer {
        &mut self.right_blink
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::mpsc, time::Duration};

    use http::Method;

    use super::*;
    use crate::{
        captive_portal::{handlers::Router, storage::AssetStore},
        registry::EntryRegistry,
    };

    fn service() -> (PortalService, mpsc::Sender<Submission>) {
        let config = PortalConfig::default();
        let dns = DnsResponder::bind((Ipv4Addr::LOCALHOST, 0), config.ap_address).unwrap();
        let (tx, rx) = mpsc::channel();
        let service = PortalService::new(&config, config.ap_address, dns, rx, Instant::now());
        (service, tx)
    }

    #[test]
    fn starts_active_with_configured_pins() {
        let (service, _tx) = service();
        assert!(service.is_active());
        assert_eq!(service.pins(), IndicatorPins::new(1, 2, 3, 4));
        assert_eq!(service.ap_address(), Ipv4Addr::new(192, 168, 4, 1));
    }

    #[test]
    fn poll_without_work_calls_nothing() {
        let (mut service, _tx) = service();
        let mut calls = 0;
        service.poll(Instant::now(), &mut |_: String, _: String| calls += 1);
        assert_eq!(calls, 0);
    }

    #[test]
    fn submissions_from_router_reach_the_registry_in_order() {
        let (mut service, tx) = service();
        let router = Router::new(
            Ipv4Addr::new(192, 168, 4, 1),
            AssetStore::unavailable(),
            tx,
        );

        router.dispatch(&Method::POST, "/submit", b"email=a%40x.com&name=A");
        router.dispatch(&Method::POST, "/submit", b"email=b%40x.com");
        router.dispatch(&Method::POST, "/submit", b"name=C&email=c%40x.com");

        let mut registry = EntryRegistry::new();
        service.poll(Instant::now(), &mut |email: String, name: String| {
            registry.register(email, name)
        });

        assert_eq!(registry.scroll_text(), "a@x.com(A)   c@x.com(C)   ");
    }

    #[test]
    fn disconnected_server_does_not_stall_poll() {
        let (mut service, tx) = service();
        tx.send(Submission {
            email: "a@x.com".to_string(),
            name: "A".to_string(),
        })
        .unwrap();
        drop(tx);

        let mut seen = Vec::new();
        service.poll(Instant::now(), &mut |email: String, _: String| seen.push(email));
        service.poll(Instant::now(), &mut |email: String, _: String| seen.push(email));
        assert_eq!(seen, vec!["a@x.com".to_string()]);
    }

    #[test]
    fn blink_timers_are_idle_until_enabled() {
        let start = Instant::now();
        let (mut service, _tx) = service();
        let mut sink = |_: String, _: String| {};

        service.poll(start + Duration::from_secs(1), &mut sink);
        assert!(!service.left_blink_mut().level());
        assert!(!service.right_blink_mut().level());

        service.left_blink_mut().set_blinking(true);
        service.poll(start + Duration::from_secs(2), &mut sink);
        assert!(service.left_blink_mut().level());
        assert!(!service.right_blink_mut().level());
        assert_eq!(service.left_blink_mut().pin(), 1);
        assert_eq!(service.right_blink_mut().pin(), 2);
    }
}
