//! HTTP routing, independent of the server that carries the requests

use std::{fs::File, net::Ipv4Addr, sync::mpsc::Sender};

use http::{Method, StatusCode, Uri};

use super::{html, storage::AssetStore};

pub const IMAGE_PATH: &str = "/monkey.jpg";

/// A completed form submission, handed to the main loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub email: String,
    pub name: String,
}

pub enum Reply {
    Page(&'static str),
    Text(StatusCode, &'static str),
    Redirect(String),
    Asset {
        file: File,
        content_type: &'static str,
    },
}

impl Reply {
    pub fn status(&self) -> StatusCode {
        match self {
            Reply::Page(_) | Reply::Asset { .. } => StatusCode::OK,
            Reply::Text(status, _) => *status,
            Reply::Redirect(_) => StatusCode::FOUND,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Reply::Page(_) => "text/html",
            Reply::Text(..) | Reply::Redirect(_) => "text/plain",
            Reply::Asset { content_type, .. } => content_type,
        }
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            Reply::Redirect(location) => Some(location),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reply::Page(_) => write!(f, "Reply::Page"),
            Reply::Text(status, msg) => write!(f, "Reply::Text({}, {})", status, msg),
            Reply::Redirect(location) => write!(f, "Reply::Redirect({})", location),
            Reply::Asset { content_type, .. } => write!(f, "Reply::Asset({})", content_type),
        }
    }
}

/// HEAD replies carry the status line and headers only.
pub fn sends_body(method: &Method) -> bool {
    *method != Method::HEAD
}

fn url_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' => {
                let hex = s
                    .get(i + 1..i + 3)
                    .filter(|h| h.bytes().all(|b| b.is_ascii_hexdigit()))
                    .and_then(|h| u8::from_str_radix(h, 16).ok());
                match hex {
                    Some(byte) => {
                        out.push(byte);
                        i += 2;
                    }
                    None => out.push(b'%'),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// Named arguments from the query string followed by the urlencoded body.
#[derive(Debug, Default)]
pub struct FormArgs(Vec<(String, String)>);

impl FormArgs {
    pub fn parse(query: Option<&str>, body: &str) -> Self {
        let pairs = query
            .into_iter()
            .chain(std::iter::once(body))
            .flat_map(|part| part.split('&'))
            .filter(|param| !param.is_empty())
            .map(|param| {
                let (key, value) = param.split_once('=').unwrap_or((param, ""));
                (url_decode(key), url_decode(value))
            })
            .collect();
        Self(pairs)
    }

    /// First value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

pub struct Router {
    ap_address: Ipv4Addr,
    assets: AssetStore,
    submissions: Sender<Submission>,
}

impl Router {
    pub fn new(ap_address: Ipv4Addr, assets: AssetStore, submissions: Sender<Submission>) -> Self {
        Self {
            ap_address,
            assets,
            submissions,
        }
    }

    pub fn dispatch(&self, method: &Method, uri: &str, body: &[u8]) -> Reply {
        let Ok(uri) = uri.parse::<Uri>() else {
            log::debug!("Unparseable URI {:?}", uri);
            return self.handle_not_found();
        };
        log::debug!("{} {}", method, uri);

        match (method, uri.path()) {
            (_, "/") => Reply::Page(html::INDEX_HTML),
            (&Method::POST, "/submit") => {
                let body = String::from_utf8_lossy(body);
                self.handle_form_submit(&FormArgs::parse(uri.query(), &body))
            }
            (&Method::GET, IMAGE_PATH) => self.handle_image(),
            _ => self.handle_not_found(),
        }
    }

    fn handle_form_submit(&self, args: &FormArgs) -> Reply {
        let (Some(email), Some(name)) = (args.get("email"), args.get("name")) else {
            return Reply::Text(StatusCode::BAD_REQUEST, "Missing email or name");
        };

        log::info!("Form submitted: {}({})", email, name);
        let submission = Submission {
            email: email.to_string(),
            name: name.to_string(),
        };
        if let Err(e) = self.submissions.send(submission) {
            log::error!("Failed to forward submission: {:?}", e);
        }

        Reply::Page(html::THANK_YOU_HTML)
    }

    fn handle_image(&self) -> Reply {
        match self.assets.open(IMAGE_PATH) {
            Some(file) => Reply::Asset {
                file,
                content_type: "image/jpeg",
            },
            None => Reply::Text(StatusCode::NOT_FOUND, "Image not found"),
        }
    }

    fn handle_not_found(&self) -> Reply {
        Reply::Redirect(format!("http://{}/", self.ap_address))
    }
}
