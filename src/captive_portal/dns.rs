//! Wildcard DNS responder
//!
//! Every A/ANY question is answered with the portal address so phones and
//! laptops open the landing page.

use std::{
    io,
    net::{Ipv4Addr, SocketAddr, ToSocketAddrs, UdpSocket},
};

const HEADER_LEN: usize = 12;
const MAX_PACKET: usize = 512;
const ANSWER_TTL_SECS: u32 = 60;

const TYPE_A: u16 = 1;
const TYPE_ANY: u16 = 255;
const CLASS_IN: u16 = 1;
const CLASS_ANY: u16 = 255;

/// Queries answered per `process_pending` call.
pub const MAX_QUERIES_PER_POLL: usize = 8;

pub struct DnsResponder {
    socket: UdpSocket,
    answer: Ipv4Addr,
}

impl DnsResponder {
    pub fn bind<T: ToSocketAddrs>(addr: T, answer: Ipv4Addr) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        socket.set_nonblocking(true)?;
        log::info!(
            "DNS server listening on {} - answering * with {}",
            socket.local_addr()?,
            answer
        );
        Ok(Self { socket, answer })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Answers queries that are already queued on the socket, then returns.
    pub fn process_pending(&mut self) -> usize {
        let mut frame = [0u8; MAX_PACKET];
        let mut answered = 0;

        for _ in 0..MAX_QUERIES_PER_POLL {
            let (len, remote) = match self.socket.recv_from(&mut frame) {
                Ok(r) => r,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => {
                    log::warn!("DNS receive error: {:?}", e);
                    break;
                }
            };

            let Some(response) = build_response(&frame[..len], self.answer) else {
                log::debug!("Dropping malformed DNS packet from {}", remote);
                continue;
            };

            match self.socket.send_to(&response, remote) {
                Ok(_) => {
                    log::debug!("DNS query from {} answered with {}", remote, self.answer);
                    answered += 1;
                }
                Err(e) => log::warn!("DNS send error: {:?}", e),
            }
        }

        answered
    }
}

fn read_u16(buf: &[u8], pos: usize) -> Option<u16> {
    Some(u16::from_be_bytes([*buf.get(pos)?, *buf.get(pos + 1)?]))
}

/// End offset of the question section, or `None` if the name is malformed.
fn question_end(query: &[u8]) -> Option<usize> {
    let mut pos = HEADER_LEN;
    loop {
        let label = *query.get(pos)? as usize;
        if label == 0 {
            pos += 1;
            break;
        }
        // queries never carry compression pointers
        if label & 0xC0 != 0 {
            return None;
        }
        pos += 1 + label;
    }
    let end = pos + 4;
    (end <= query.len()).then_some(end)
}

/// Builds the reply for a single-question standard query.
pub fn build_response(query: &[u8], answer: Ipv4Addr) -> Option<Vec<u8>> {
    if query.len() < HEADER_LEN {
        return None;
    }

    let flags = query[2];
    let is_response = flags & 0x80 != 0;
    let opcode = (flags >> 3) & 0x0F;
    if is_response || opcode != 0 || read_u16(query, 4)? != 1 {
        return None;
    }

    let end = question_end(query)?;
    let qtype = read_u16(query, end - 4)?;
    let qclass = read_u16(query, end - 2)?;
    let has_answer =
        matches!(qtype, TYPE_A | TYPE_ANY) && matches!(qclass, CLASS_IN | CLASS_ANY);

    let mut response = Vec::with_capacity(end + 16);
    response.extend_from_slice(&query[..2]);
    // QR=1, AA=1, keep RD
    response.push(0x84 | (flags & 0x01));
    response.push(0x00);
    response.extend_from_slice(&1u16.to_be_bytes());
    response.extend_from_slice(&u16::from(has_answer).to_be_bytes());
    response.extend_from_slice(&[0, 0, 0, 0]);
    response.extend_from_slice(&query[HEADER_LEN..end]);

    if has_answer {
        // NAME: pointer to the question name
        response.extend_from_slice(&[0xC0, 0x0C]);
        response.extend_from_slice(&TYPE_A.to_be_bytes());
        response.extend_from_slice(&CLASS_IN.to_be_bytes());
        response.extend_from_slice(&ANSWER_TTL_SECS.to_be_bytes());
        response.extend_from_slice(&4u16.to_be_bytes());
        response.extend_from_slice(&answer.octets());
    }

    Some(response)
}
