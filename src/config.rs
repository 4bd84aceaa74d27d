use std::{net::Ipv4Addr, time::Duration};

static DEFAULT_SSID: Option<&str> = std::option_env!("PORTAL_SSID");

/// Pin numbers handed to the portal at startup for the indicator lights.
///
/// They are kept with the portal state; nothing drives them yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorPins {
    pub left_flash: i32,
    pub right_flash: i32,
    pub lights: i32,
    pub interior: i32,
}

impl IndicatorPins {
    pub const fn new(left_flash: i32, right_flash: i32, lights: i32, interior: i32) -> Self {
        Self {
            left_flash,
            right_flash,
            lights,
            interior,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub ssid: String,
    pub ap_address: Ipv4Addr,
    pub ap_netmask: u8,
    pub max_connections: u16,
    /// Transmit power in dBm.
    pub tx_power_dbm: i8,
    pub dns_port: u16,
    pub http_port: u16,
    pub pins: IndicatorPins,
    pub blink_interval: Duration,
}

impl PortalConfig {
    /// The radio driver takes transmit power in 0.25 dBm steps.
    pub fn tx_power_quarter_dbm(&self) -> i8 {
        self.tx_power_dbm.saturating_mul(4)
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            ssid: DEFAULT_SSID.unwrap_or("__FREE_WiFi__").to_string(),
            ap_address: Ipv4Addr::new(192, 168, 4, 1),
            ap_netmask: 24,
            max_connections: 4,
            tx_power_dbm: 11,
            dns_port: 53,
            http_port: 80,
            pins: IndicatorPins::new(1, 2, 3, 4),
            blink_interval: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    pub i2c_address: u8,
    pub i2c_baudrate: u32,
    pub sda_pin: i32,
    pub scl_pin: i32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 128,
            height: 32,
            i2c_address: 0x3C,
            i2c_baudrate: 400_000,
            // 8/9 collide with the onboard LED
            sda_pin: 6,
            scl_pin: 7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_portal_matches_deployment() {
        let config = PortalConfig::default();
        if DEFAULT_SSID.is_none() {
            assert_eq!(config.ssid, "__FREE_WiFi__");
        }
        assert_eq!(config.ap_address, Ipv4Addr::new(192, 168, 4, 1));
        assert_eq!(config.dns_port, 53);
        assert_eq!(config.pins, IndicatorPins::new(1, 2, 3, 4));
        assert_eq!(config.blink_interval, Duration::from_millis(500));
    }

    #[test]
    fn tx_power_is_converted_to_quarter_steps() {
        let config = PortalConfig::default();
        assert_eq!(config.tx_power_quarter_dbm(), 44);
    }
}
