//! Datagram sinks.
//!
//! A sink takes one encoded statsd line and puts it on the wire (or, in tests,
//! into memory). One `send` is one datagram; sinks never buffer or retry.

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::net::UdpSocket;

#[async_trait]
pub trait MetricSink: Send + Sync {
    async fn send(&self, datagram: Bytes) -> io::Result<()>;
}

/// Connectionless UDP sink bound to an ephemeral local port.
#[derive(Debug)]
pub struct UdpSink {
    socket: UdpSocket,
    target: SocketAddr,
}

impl UdpSink {
    /// Resolve `host:port` and bind a socket of the matching address family.
    /// IPv4 results win over IPv6 ones (`localhost` may list `::1` first).
    pub async fn bind(host: &str, port: u16) -> io::Result<Self> {
        let target = prefer_ipv4(tokio::net::lookup_host((host, port)).await?)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::AddrNotAvailable,
                    format!("no address for {host}:{port}"),
                )
            })?;
        Self::bind_to(target).await
    }

    pub async fn bind_to(target: SocketAddr) -> io::Result<Self> {
        let local: SocketAddr = if target.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(local).await?;
        Ok(Self { socket, target })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

fn prefer_ipv4(addrs: impl IntoIterator<Item = SocketAddr>) -> Option<SocketAddr> {
    let mut first = None;
    for addr in addrs {
        if addr.is_ipv4() {
            return Some(addr);
        }
        first.get_or_insert(addr);
    }
    first
}

#[async_trait]
impl MetricSink for UdpSink {
    async fn send(&self, datagram: Bytes) -> io::Result<()> {
        let n = self.socket.send_to(&datagram, self.target).await?;
        if n != datagram.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("short datagram write: {n}/{}", datagram.len()),
            ));
        }
        Ok(())
    }
}

/// In-memory sink that records every datagram.
#[derive(Debug, Default)]
pub struct MemorySink {
    sent: Mutex<Vec<Bytes>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded datagrams as UTF-8 lines.
    pub fn lines(&self) -> Vec<String> {
        self.sent
            .lock()
            .map(|v| v.iter().map(|b| String::from_utf8_lossy(b).into_owned()).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.sent.lock().map(|v| v.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MetricSink for MemorySink {
    async fn send(&self, datagram: Bytes) -> io::Result<()> {
        self.sent
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "memory sink poisoned"))?
            .push(datagram);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn udp_sink_delivers_one_datagram() {
        let collector = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = collector.local_addr().unwrap();

        let sink = UdpSink::bind("127.0.0.1", addr.port()).await.unwrap();
        assert_eq!(sink.target(), addr);
        sink.send(Bytes::from_static(b"minecraft.kills:1|c")).await.unwrap();

        let mut buf = [0u8; 512];
        let (n, _) = collector.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"minecraft.kills:1|c");
    }

    #[test]
    fn ipv4_resolution_preferred() {
        let v6: SocketAddr = "[::1]:8125".parse().unwrap();
        let v4: SocketAddr = "127.0.0.1:8125".parse().unwrap();
        assert_eq!(prefer_ipv4([v6, v4]), Some(v4));
        assert_eq!(prefer_ipv4([v6]), Some(v6));
        assert_eq!(prefer_ipv4(Vec::<SocketAddr>::new()), None);
    }

    #[tokio::test]
    async fn memory_sink_records() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());
        sink.send(Bytes::from_static(b"a:1|g")).await.unwrap();
        sink.send(Bytes::from_static(b"b:2|g")).await.unwrap();
        assert_eq!(sink.lines(), ["a:1|g", "b:2|g"]);
    }
}
