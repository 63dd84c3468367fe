//! OSC transport: a UDP sink forwarding note batches to a synth.

use boing_core::{NoteBatch, NoteSink};
use rosc::{OscError, OscMessage, OscPacket, OscType};
use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use tracing::{debug, warn};

/// Default host of the listening synthesizer.
pub const DEFAULT_OSC_HOST: &str = "127.0.0.1";
/// Default port of the listening synthesizer (SuperCollider's language port).
pub const DEFAULT_OSC_PORT: u16 = 57120;

/// Encode an OSC message at `address` carrying one int32 argument per value.
pub fn encode_message(address: &str, values: &[i32]) -> Result<Vec<u8>, OscError> {
    let message = OscMessage {
        addr: address.to_string(),
        args: values.iter().copied().map(OscType::Int).collect(),
    };
    rosc::encoder::encode(&OscPacket::Message(message))
}

/// OSC address used for a population; the name selects the instrument.
#[must_use]
pub fn address_for(population: &str) -> String {
    format!("/{population}")
}

/// Sends every note batch as one OSC message over UDP.
#[derive(Debug)]
pub struct OscSink {
    socket: UdpSocket,
    target: SocketAddr,
}

impl OscSink {
    /// Bind an ephemeral local socket and resolve the synthesizer address.
    pub fn connect(host: &str, port: u16) -> io::Result<Self> {
        let target = (host, port).to_socket_addrs()?.next().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("no address found for {host}:{port}"),
            )
        })?;
        let bind_addr: SocketAddr = if target.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(bind_addr)?;
        Ok(Self { socket, target })
    }

    #[must_use]
    pub const fn target(&self) -> SocketAddr {
        self.target
    }
}

impl NoteSink for OscSink {
    fn emit(&mut self, batch: &NoteBatch) {
        if batch.population.is_empty() {
            return;
        }
        let packet = match encode_message(&address_for(&batch.population), &batch.pitches) {
            Ok(packet) => packet,
            Err(err) => {
                warn!(population = %batch.population, error = ?err, "failed to encode osc message");
                return;
            }
        };
        match self.socket.send_to(&packet, self.target) {
            Ok(sent) => debug!(population = %batch.population, bytes = sent, "osc message sent"),
            Err(err) => warn!(
                population = %batch.population,
                peer = %self.target,
                error = %err,
                "failed to send osc message"
            ),
        }
    }
}
