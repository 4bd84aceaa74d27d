use std::time::Instant;

use crate::{
    captive_portal::{AccessPoint, PortalService},
    registry::EntryRegistry,
    ui::{self, DisplayTargetDrive},
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionCounters {
    current: usize,
    total: usize,
}

impl ConnectionCounters {
    /// Folds a fresh station-count reading in. Departures never lower `total`.
    pub fn observe(&mut self, stations: usize) {
        if stations > self.current {
            self.total += stations - self.current;
        }
        self.current = stations;
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollState {
    cursor_x: i32,
    min_x: i32,
    width: i32,
}

impl ScrollState {
    pub fn new(width: i32) -> Self {
        Self {
            cursor_x: width,
            min_x: 0,
            width,
        }
    }

    pub fn set_min_x(&mut self, min_x: i32) {
        self.min_x = min_x;
    }

    pub fn advance(&mut self) {
        self.cursor_x -= 1;
        if self.cursor_x < self.min_x {
            self.cursor_x = self.width;
        }
    }

    pub fn cursor_x(&self) -> i32 {
        self.cursor_x
    }

    pub fn min_x(&self) -> i32 {
        self.min_x
    }
}

pub struct App<A, D> {
    portal: PortalService,
    access_point: A,
    display: D,
    registry: EntryRegistry,
    counters: ConnectionCounters,
    scroll: ScrollState,
}

impl<A: AccessPoint, D: DisplayTargetDrive> App<A, D> {
    pub fn new(portal: PortalService, access_point: A, display: D) -> Self {
        let scroll = ScrollState::new(display.width());
        Self {
            portal,
            access_point,
            display,
            registry: EntryRegistry::new(),
            counters: ConnectionCounters::default(),
            scroll,
        }
    }

    /// One pass of the main loop. Never waits for new work.
    pub fn step(&mut self, now: Instant) {
        let registry = &mut self.registry;
        let scroll = &mut self.scroll;
        self.portal.poll(now, &mut |email: String, name: String| {
            registry.register(email, name);
            scroll.set_min_x(registry.scroll_min_x());
        });

        match self.access_point.station_count() {
            Ok(stations) => self.counters.observe(stations),
            Err(e) => log::warn!("Failed to read station count: {:?}", e),
        }

        if let Err(e) = ui::render(
            &mut self.display,
            &self.counters,
            self.registry.scroll_text(),
            self.scroll.cursor_x(),
        ) {
            log::warn!("Failed to render frame: {:?}", e);
        }

        self.scroll.advance();
    }

    pub fn run(mut self) -> ! {
        log::info!(
            "Portal loop running, AP at {}",
            self.access_point.own_address()
        );
        loop {
            self.step(Instant::now());
        }
    }

    pub fn registry(&self) -> &EntryRegistry {
        &self.registry
    }

    pub fn counters(&self) -> &ConnectionCounters {
        &self.counters
    }

    pub fn scroll(&self) -> &ScrollState {
        &self.scroll
    }

    pub fn portal(&self) -> &PortalService {
        &self.portal
    }

    pub fn display(&self) -> &D {
        &self.display
    }
}

#[cfg(test)]
mod tests {
    use std::{
        cell::RefCell,
        collections::VecDeque,
        net::{Ipv4Addr, UdpSocket},
        sync::mpsc,
        time::Duration,
    };

    use super::*;
    use crate::{
        captive_portal::{DnsResponder, Submission},
        config::PortalConfig,
        ui::tests::FrameBuffer,
    };

    struct ScriptedAccessPoint {
        readings: RefCell<VecDeque<usize>>,
    }

    impl ScriptedAccessPoint {
        fn new(readings: &[usize]) -> Self {
            Self {
                readings: RefCell::new(readings.iter().copied().collect()),
            }
        }
    }

    impl AccessPoint for ScriptedAccessPoint {
        fn own_address(&self) -> Ipv4Addr {
            Ipv4Addr::new(192, 168, 4, 1)
        }

        fn station_count(&self) -> anyhow::Result<usize> {
            self.readings
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("radio unavailable"))
        }
    }

    fn app_with(
        readings: &[usize],
    ) -> (
        App<ScriptedAccessPoint, FrameBuffer>,
        mpsc::Sender<Submission>,
    ) {
        let config = PortalConfig::default();
        let dns = DnsResponder::bind((Ipv4Addr::LOCALHOST, 0), config.ap_address).unwrap();
        let (tx, rx) = mpsc::channel();
        let portal = PortalService::new(&config, config.ap_address, dns, rx, Instant::now());
        let app = App::new(portal, ScriptedAccessPoint::new(readings), FrameBuffer::new());
        (app, tx)
    }

    #[test]
    fn total_only_grows_by_positive_deltas() {
        let readings = [0, 2, 1, 1, 4, 0, 3];
        let mut counters = ConnectionCounters::default();
        let mut previous = 0;
        let mut expected_total = 0;

        for reading in readings {
            let before = counters.total();
            counters.observe(reading);
            expected_total += reading.saturating_sub(previous);
            previous = reading;

            assert!(counters.total() >= before);
            assert_eq!(counters.total(), expected_total);
            assert_eq!(counters.current(), reading);
        }
        assert_eq!(counters.total(), 8);
    }

    #[test]
    fn cursor_counts_down_then_wraps_on_strictly_less() {
        let mut scroll = ScrollState::new(128);
        scroll.set_min_x(-12);

        for n in 1..=140 {
            scroll.advance();
            assert_eq!(scroll.cursor_x(), 128 - n);
        }
        // exactly at the bound: no wrap yet
        assert_eq!(scroll.cursor_x(), -12);

        scroll.advance();
        assert_eq!(scroll.cursor_x(), 128);
    }

    #[test]
    fn cursor_stays_within_bounds() {
        let mut scroll = ScrollState::new(128);
        scroll.set_min_x(-30);
        for _ in 0..1_000 {
            scroll.advance();
            assert!(scroll.cursor_x() >= scroll.min_x());
            assert!(scroll.cursor_x() <= 128);
        }
    }

    #[test]
    fn empty_marquee_wraps_below_zero() {
        let mut scroll = ScrollState::new(128);
        for _ in 0..128 {
            scroll.advance();
        }
        assert_eq!(scroll.cursor_x(), 0);
        scroll.advance();
        assert_eq!(scroll.cursor_x(), 128);
    }

    #[test]
    fn step_polls_counts_renders_and_scrolls() {
        let (mut app, _tx) = app_with(&[1, 3, 2]);
        assert_eq!(app.scroll().cursor_x(), 128);

        app.step(Instant::now());
        app.step(Instant::now());
        app.step(Instant::now());

        assert_eq!(app.counters().current(), 2);
        assert_eq!(app.counters().total(), 3);
        assert_eq!(app.display().flushes, 3);
        assert_eq!(app.scroll().cursor_x(), 125);
    }

    #[test]
    fn radio_errors_keep_previous_counts() {
        let (mut app, _tx) = app_with(&[2]);
        app.step(Instant::now());
        app.step(Instant::now());

        assert_eq!(app.counters().current(), 2);
        assert_eq!(app.counters().total(), 2);
        assert_eq!(app.display().flushes, 2);
    }

    #[test]
    fn submissions_reach_the_marquee_on_the_next_step() {
        let (mut app, tx) = app_with(&[0, 0, 0]);
        for (email, name) in [("a@x.com", "A"), ("b@x.com", "B"), ("c@x.com", "C")] {
            tx.send(Submission {
                email: email.to_string(),
                name: name.to_string(),
            })
            .unwrap();
        }

        app.step(Instant::now());

        assert_eq!(
            app.registry().scroll_text(),
            "a@x.com(A)   b@x.com(B)   c@x.com(C)   "
        );
        assert_eq!(app.scroll().min_x(), -6 * 39);
        // rendered before the cursor moved, still off-panel
        assert_eq!(app.display().lit_in_rows(24..32), 0);
    }

    #[test]
    fn dns_is_answered_from_the_loop() {
        let (mut app, _tx) = app_with(&[0; 64]);
        let dns_addr = app.portal().dns_local_addr().unwrap();

        let client = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        client.set_nonblocking(true).unwrap();
        client
            .send_to(&crate::captive_portal::dns::tests::query("example.com", 1), dns_addr)
            .unwrap();

        let mut buf = [0u8; 512];
        for _ in 0..50 {
            app.step(Instant::now());
            if let Ok((len, _)) = client.recv_from(&mut buf) {
                assert_eq!(&buf[len - 4..len], &[192, 168, 4, 1]);
                return;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("no DNS answer");
    }
}
