//! SoftAP bring-up and the ESP-IDF HTTP server

use std::{
    net::Ipv4Addr,
    sync::{mpsc, Arc},
    time::Instant,
};

use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::modem::Modem,
    http::{
        server::{Configuration, EspHttpConnection, EspHttpServer, Request},
        Method,
    },
    io::{Read, Write},
    ipv4::{self, Mask, Subnet},
    netif::{EspNetif, NetifConfiguration, NetifStack},
    sys::{esp, esp_wifi_ap_get_sta_list, esp_wifi_set_max_tx_power, wifi_sta_list_t},
    wifi::{
        AccessPointConfiguration, AuthMethod, BlockingWifi, Configuration as WifiConfig, EspWifi,
        WifiDriver,
    },
};

use super::{
    dns::DnsResponder,
    handlers::{self, Reply, Router},
    service::PortalService,
    storage::{self, AssetStore},
    AccessPoint,
};
use crate::config::PortalConfig;

const MAX_BODY_LEN: usize = 4096;
const SPIFFS_MAX_FILES: usize = 4;

const METHODS: [Method; 7] = [
    Method::Get,
    Method::Post,
    Method::Put,
    Method::Delete,
    Method::Head,
    Method::Options,
    Method::Patch,
];

/// Keeps the radio and HTTP server alive for as long as the portal runs.
pub struct EspPortal {
    wifi: BlockingWifi<EspWifi<'static>>,
    _server: EspHttpServer<'static>,
}

impl AccessPoint for EspPortal {
    fn own_address(&self) -> Ipv4Addr {
        match self.wifi.wifi().ap_netif().get_ip_info() {
            Ok(info) => info.ip,
            Err(e) => {
                log::warn!("Failed to read AP address: {:?}", e);
                Ipv4Addr::UNSPECIFIED
            }
        }
    }

    fn station_count(&self) -> anyhow::Result<usize> {
        let mut list = wifi_sta_list_t::default();
        esp!(unsafe { esp_wifi_ap_get_sta_list(&mut list) })?;
        Ok(list.num.max(0) as usize)
    }
}

/// Brings the portal up: AP-only radio, assets, DNS, HTTP routes.
pub fn start_portal(
    modem: Modem,
    sysloop: EspSystemEventLoop,
    config: &PortalConfig,
) -> anyhow::Result<(EspPortal, PortalService)> {
    let pins = config.pins;
    log::info!(
        "Indicator pins: left={} right={} lights={} interior={}",
        pins.left_flash,
        pins.right_flash,
        pins.lights,
        pins.interior
    );

    let assets = match storage::mount_spiffs(SPIFFS_MAX_FILES) {
        Ok(assets) => {
            log::info!("SPIFFS mounted");
            assets
        }
        Err(e) => {
            log::error!("An error has occurred while mounting SPIFFS: {:?}", e);
            AssetStore::unavailable()
        }
    };

    let wifi = start_ap(modem, sysloop, config)?;
    log::info!("SoftAP started: {}", config.ssid);

    esp!(unsafe { esp_wifi_set_max_tx_power(config.tx_power_quarter_dbm()) })?;
    log::info!("TX power set to {} dBm", config.tx_power_dbm);

    let ap_address = wifi.wifi().ap_netif().get_ip_info()?.ip;
    let dns = DnsResponder::bind((Ipv4Addr::UNSPECIFIED, config.dns_port), ap_address)?;

    let (tx, rx) = mpsc::channel();
    let router = Arc::new(Router::new(ap_address, assets, tx));
    let server = start_http_server(config, router)?;
    log::info!("HTTP server started on {}:{}", ap_address, config.http_port);

    let portal = PortalService::new(config, ap_address, dns, rx, Instant::now());

    Ok((
        EspPortal {
            wifi,
            _server: server,
        },
        portal,
    ))
}

fn start_ap(
    modem: Modem,
    sysloop: EspSystemEventLoop,
    config: &PortalConfig,
) -> anyhow::Result<BlockingWifi<EspWifi<'static>>> {
    // Clients must resolve through our wildcard responder, so the DHCP
    // lease names the portal itself as DNS server.
    let ap_netif_config = NetifConfiguration {
        ip_configuration: Some(ipv4::Configuration::Router(ipv4::RouterConfiguration {
            subnet: Subnet {
                gateway: config.ap_address,
                mask: Mask(config.ap_netmask),
            },
            dhcp_enabled: true,
            dns: Some(config.ap_address),
            secondary_dns: None,
        })),
        ..NetifConfiguration::wifi_default_router()
    };

    let ap_netif = EspNetif::new_with_conf(&ap_netif_config)?;
    let driver = WifiDriver::new(modem, sysloop.clone(), None)?;
    // No upstream network; the STA interface stays down
    let sta_netif = EspNetif::new(NetifStack::Sta)?;

    let mut wifi = BlockingWifi::wrap(EspWifi::wrap_all(driver, sta_netif, ap_netif)?, sysloop)?;

    let ap_config = AccessPointConfiguration {
        ssid: config
            .ssid
            .as_str()
            .try_into()
            .map_err(|_| anyhow::anyhow!("SSID too long: {}", config.ssid))?,
        ssid_hidden: false,
        channel: 1,
        auth_method: AuthMethod::None,
        max_connections: config.max_connections,
        ..Default::default()
    };

    // Open network so phones join without a prompt and hit the portal check
    wifi.set_configuration(&WifiConfig::AccessPoint(ap_config))?;
    wifi.start()?;

    Ok(wifi)
}

fn start_http_server(
    config: &PortalConfig,
    router: Arc<Router>,
) -> anyhow::Result<EspHttpServer<'static>> {
    let server_config = Configuration {
        http_port: config.http_port,
        stack_size: 8192,
        max_uri_handlers: METHODS.len(),
        uri_match_wildcard: true,
        ..Default::default()
    };

    let mut server = EspHttpServer::new(&server_config)?;

    // every request goes through the router, which owns the route table
    for method in METHODS {
        let router = router.clone();
        server.fn_handler::<anyhow::Error, _>("/*", method, move |req| serve(&router, req))?;
    }

    Ok(server)
}

fn to_http_method(method: Method) -> http::Method {
    match method {
        Method::Get => http::Method::GET,
        Method::Post => http::Method::POST,
        Method::Put => http::Method::PUT,
        Method::Delete => http::Method::DELETE,
        Method::Head => http::Method::HEAD,
        Method::Options => http::Method::OPTIONS,
        Method::Patch => http::Method::PATCH,
        _ => http::Method::TRACE,
    }
}

fn read_body(req: &mut Request<&mut EspHttpConnection<'_>>) -> anyhow::Result<Vec<u8>> {
    let mut body = Vec::new();
    let mut buf = [0u8; 512];
    while body.len() < MAX_BODY_LEN {
        let len = req.read(&mut buf)?;
        if len == 0 {
            break;
        }
        body.extend_from_slice(&buf[..len]);
    }
    body.truncate(MAX_BODY_LEN);
    Ok(body)
}

fn serve(router: &Router, mut req: Request<&mut EspHttpConnection<'_>>) -> anyhow::Result<()> {
    let method = to_http_method(req.method());
    let uri = req.uri().to_string();
    let body = read_body(&mut req)?;

    let reply = router.dispatch(&method, &uri, &body);

    let status = reply.status();
    let content_type = reply.content_type();
    let mut headers = vec![("Content-Type", content_type)];
    if let Some(location) = reply.location() {
        headers.push(("Location", location));
    }

    let mut resp = req.into_response(status.as_u16(), status.canonical_reason(), &headers)?;
    if !handlers::sends_body(&method) {
        return Ok(());
    }

    match &reply {
        Reply::Page(page) => resp.write_all(page.as_bytes())?,
        Reply::Text(_, message) => resp.write_all(message.as_bytes())?,
        Reply::Redirect(_) => {}
        Reply::Asset { file, .. } => {
            let mut file = file;
            let mut chunk = [0u8; 1024];
            loop {
                let len = std::io::Read::read(&mut file, &mut chunk)?;
                if len == 0 {
                    break;
                }
                resp.write_all(&chunk[..len])?;
            }
        }
    }

    Ok(())
}
