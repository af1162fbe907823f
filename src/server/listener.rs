// Listener module
// Creates the TCP listener the server accepts connections on

use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::error::ServerError;

/// Pending connection queue length passed to `listen(2)`
const BACKLOG: i32 = 1024;

/// Create a `TcpListener` bound to `addr`
///
/// `SO_REUSEADDR` is set on unix so a restarted server can rebind while old
/// connections linger in `TIME_WAIT`. `SO_REUSEPORT` is never set: a second
/// process asking for a port that is already listening gets
/// [`ServerError::Bind`] instead of silently sharing it.
///
/// Must be called from within a Tokio runtime.
pub fn create_listener(addr: SocketAddr) -> Result<TcpListener, ServerError> {
    bind_socket(addr).map_err(|source| ServerError::Bind { addr, source })
}

fn bind_socket(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    #[cfg(unix)]
    socket.set_reuse_address(true)?;

    // Set non-blocking mode for async compatibility
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(BACKLOG)?;

    // Convert socket2::Socket to std::net::TcpListener, then to tokio::net::TcpListener
    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let listener = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn test_second_bind_on_same_port_fails() {
        let first = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = first.local_addr().unwrap();

        match create_listener(addr) {
            Err(ServerError::Bind { addr: failed, source }) => {
                assert_eq!(failed, addr);
                assert_eq!(source.kind(), std::io::ErrorKind::AddrInUse);
            }
            other => panic!("Expected bind failure, got {other:?}"),
        }
    }
}
