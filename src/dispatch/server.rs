//! Datagram dispatch server
//!
//! Owns one UDP socket and a dedicated receive thread. Datagrams are
//! processed serially within the loop; each one is decoded, routed
//! through the [`MessageHandler`] and answered with a best-effort
//! response to the originating address. The socket carries a read
//! timeout so `stop()` unblocks the loop within one timeout.

use std::net::UdpSocket;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{error, info, warn};

use crate::core::config::GatewayConfig;
use crate::core::types::Result;
use crate::dispatch::handler::MessageHandler;
use crate::fleet::store::FleetStore;

/// UDP command dispatcher with an explicit start/stop lifecycle.
pub struct DispatchServer {
    config: GatewayConfig,
    store: Arc<FleetStore>,
    running: Arc<RwLock<bool>>,
    thread_handle: Option<thread::JoinHandle<()>>,
    socket: Option<Arc<UdpSocket>>,
}

impl DispatchServer {
    pub fn new(config: GatewayConfig, store: Arc<FleetStore>) -> Self {
        Self {
            config,
            store,
            running: Arc::new(RwLock::new(false)),
            thread_handle: None,
            socket: None,
        }
    }

    /// Bind the socket and start the receive loop.
    ///
    /// Bind failure is fatal to this instance and propagated. Start on a
    /// running server is a no-op with a log notice.
    pub fn start(&mut self) -> Result<()> {
        if *self.running.read() {
            info!("[DISPATCH] Server is already running");
            return Ok(());
        }
        self.config.validate()?;

        let socket = Arc::new(UdpSocket::bind(&self.config.dispatch_bind_address)?);
        socket.set_read_timeout(Some(self.config.recv_timeout))?;

        info!(
            "[DISPATCH] Listening on {} and waiting for messages",
            socket.local_addr()?
        );

        *self.running.write() = true;
        let running = Arc::clone(&self.running);
        let loop_socket = Arc::clone(&socket);
        let handler = MessageHandler::new(Arc::clone(&self.store));
        let max_datagram = self.config.max_datagram_size;

        let handle = thread::spawn(move || {
            let mut buffer = vec![0u8; max_datagram];

            while *running.read() {
                let (length, peer) = match loop_socket.recv_from(&mut buffer) {
                    Ok(received) => received,
                    Err(err)
                        if err.kind() == std::io::ErrorKind::WouldBlock
                            || err.kind() == std::io::ErrorKind::TimedOut =>
                    {
                        // Receive timeout: just re-check the running flag
                        continue;
                    }
                    Err(err) => {
                        error!("[DISPATCH] Receive error: {}", err);
                        thread::sleep(Duration::from_millis(100));
                        continue;
                    }
                };

                let response = handler.handle(&buffer[..length], peer);

                // Best-effort send: a failed response is logged and
                // dropped, never retried.
                match loop_socket.send_to(response.as_bytes(), peer) {
                    Ok(_) => info!("[DISPATCH] {} sent to {}", response, peer),
                    Err(err) => warn!("[DISPATCH] Failed to respond to {}: {}", peer, err),
                }
            }

            info!("[DISPATCH] Receive loop exited");
        });

        self.socket = Some(socket);
        self.thread_handle = Some(handle);
        Ok(())
    }

    /// Stop the receive loop and release the socket. No-op when stopped.
    pub fn stop(&mut self) {
        if !*self.running.read() {
            return;
        }

        *self.running.write() = false;
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
        self.socket = None;
        info!("[DISPATCH] Server stopped");
    }

    /// Address the socket is bound to; None while stopped. With a port of
    /// 0 in the bind address this reports the kernel-assigned port.
    pub fn local_addr(&self) -> Option<std::net::SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }

    pub fn is_running(&self) -> bool {
        *self.running.read()
    }
}

impl Drop for DispatchServer {
    fn drop(&mut self) {
        self.stop();
    }
}
