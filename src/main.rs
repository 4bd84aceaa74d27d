#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    use captive_marquee::{
        boards,
        captive_portal,
        config::{DisplayConfig, PortalConfig},
        App,
    };
    use esp_idf_svc::eventloop::EspSystemEventLoop;

    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    let peripherals = esp_idf_svc::hal::prelude::Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;

    let display_config = DisplayConfig::default();
    let display = match boards::init_oled(
        peripherals.i2c0,
        peripherals.pins.gpio6,
        peripherals.pins.gpio7,
        &display_config,
    ) {
        Ok(display) => display,
        Err(e) => {
            log::error!("SSD1306 allocation failed: {:?}", e);
            halt();
        }
    };

    let config = PortalConfig::default();
    log::info!("SSID: {:?}", config.ssid);
    log_heap();

    let (access_point, portal) =
        captive_portal::start_portal(peripherals.modem, sysloop, &config)?;
    log_heap();

    App::new(portal, access_point, display).run()
}

/// Nothing to show without a panel; park here until reset.
#[cfg(target_os = "espidf")]
fn halt() -> ! {
    loop {
        std::thread::sleep(std::time::Duration::from_secs(1));
    }
}

#[cfg(target_os = "espidf")]
fn log_heap() {
    unsafe {
        use esp_idf_svc::sys::{heap_caps_get_free_size, MALLOC_CAP_INTERNAL};

        log::info!(
            "Free INTERNAL heap size: {}KB",
            heap_caps_get_free_size(MALLOC_CAP_INTERNAL) / 1024
        );
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    eprintln!("captive-marquee runs on ESP-IDF targets only; use `cargo test` for the host build");
}
