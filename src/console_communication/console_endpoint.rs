use super::ground_messages;
use crate::{info, warn};
use prost::Message;
use std::io::{Cursor, ErrorKind};
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::net::tcp::{ReadHalf, WriteHalf};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::oneshot;

#[derive(Debug, Clone)]
pub enum ConsoleEvent {
    Connected,
    Disconnected,
    Message(ground_messages::UpstreamContent),
}

/// TCP endpoint for operator consoles.
///
/// Every frame in both directions is a big-endian `u32` length followed by one
/// protobuf message. Downstream frames are broadcast to all connected consoles.
pub(crate) struct ConsoleEndpoint {
    local_addr: SocketAddr,
    downstream_sender: broadcast::Sender<Option<Vec<u8>>>,
    upstream_event_receiver: broadcast::Receiver<ConsoleEvent>,
    close_oneshot_sender: Option<oneshot::Sender<()>>,
}

impl ConsoleEndpoint {
    const DOWNSTREAM_CAPACITY: usize = 64;
    const UPSTREAM_CAPACITY: usize = 16;
    const MAX_FRAME_LEN: u32 = 1 << 20;

    async fn handle_connection_rx(
        socket: &mut ReadHalf<'_>,
        upstream_event_sender: &broadcast::Sender<ConsoleEvent>,
    ) -> Result<(), std::io::Error> {
        loop {
            let length = socket.read_u32().await?;
            if length > Self::MAX_FRAME_LEN {
                return Err(std::io::Error::new(
                    ErrorKind::InvalidData,
                    format!("upstream frame of {length} bytes"),
                ));
            }

            let mut buffer = vec![0u8; length as usize];
            socket.read_exact(&mut buffer).await?;

            match ground_messages::Upstream::decode(&mut Cursor::new(buffer)) {
                Ok(ground_messages::Upstream { content: Some(content) }) => {
                    let _ = upstream_event_sender.send(ConsoleEvent::Message(content));
                }
                Ok(_) => warn!("Console sent an empty message."),
                Err(e) => warn!("Dropping undecodable console message: {e}"),
            }
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    async fn handle_connection_tx(
        socket: &mut WriteHalf<'_>,
        downstream_receiver: &mut broadcast::Receiver<Option<Vec<u8>>>,
    ) -> Result<(), std::io::Error> {
        loop {
            match downstream_receiver.recv().await {
                Ok(Some(message_buffer)) => {
                    socket.write_u32(message_buffer.len() as u32).await?;
                    socket.write_all(&message_buffer).await?;
                }
                Ok(None) | Err(RecvError::Closed) => break,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Console too slow, skipped {skipped} downstream messages.");
                }
            }
        }
        Ok(())
    }

    pub(crate) async fn bind(addr: SocketAddr) -> Result<Self, std::io::Error> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let downstream_sender = broadcast::Sender::new(Self::DOWNSTREAM_CAPACITY);
        let upstream_event_sender = broadcast::Sender::new(Self::UPSTREAM_CAPACITY);
        let (close_oneshot_sender, mut close_oneshot_receiver) = oneshot::channel();
        let inst = Self {
            local_addr,
            downstream_sender: downstream_sender.clone(),
            upstream_event_receiver: upstream_event_sender.subscribe(),
            close_oneshot_sender: Some(close_oneshot_sender),
        };
        info!("Console endpoint listening on {local_addr}.");

        tokio::spawn(async move {
            loop {
                let accept = tokio::select! {
                    accept = listener.accept() => accept,
                    _ = &mut close_oneshot_receiver => break
                };

                let Ok((mut socket, peer)) = accept else { break };
                info!("Console connected from {peer}.");
                let upstream_event_sender_local = upstream_event_sender.clone();
                let mut downstream_receiver = downstream_sender.subscribe();
                let _ = upstream_event_sender_local.send(ConsoleEvent::Connected);

                tokio::spawn(async move {
                    let (mut rx_socket, mut tx_socket) = socket.split();

                    let result = tokio::select! {
                        res = ConsoleEndpoint::handle_connection_tx(&mut tx_socket, &mut downstream_receiver) => res,
                        res = ConsoleEndpoint::handle_connection_rx(&mut rx_socket, &upstream_event_sender_local) => res
                    };

                    drop(downstream_receiver);
                    let _ = upstream_event_sender_local.send(ConsoleEvent::Disconnected);
                    match result {
                        Err(e)
                            if e.kind() == ErrorKind::UnexpectedEof
                                || e.kind() == ErrorKind::ConnectionReset
                                || e.kind() == ErrorKind::ConnectionAborted =>
                        {
                            info!("Console {peer} disconnected.");
                            return;
                        }
                        Err(e) => {
                            warn!("Closing connection to console due to {e:?}");
                        }
                        _ => {}
                    }
                    let _ = socket.shutdown().await;
                });
            }
        });
        Ok(inst)
    }

    pub(crate) fn local_addr(&self) -> SocketAddr { self.local_addr }

    pub(crate) fn send_downstream(&self, msg: ground_messages::DownstreamContent) {
        let _ = self.downstream_sender.send(Some(
            ground_messages::Downstream { content: Some(msg) }.encode_to_vec(),
        ));
    }

    pub(crate) fn is_console_connected(&self) -> bool {
        self.downstream_sender.receiver_count() > 0
    }

    pub(crate) fn upstream_event_receiver(&self) -> &broadcast::Receiver<ConsoleEvent> {
        &self.upstream_event_receiver
    }
}

impl Drop for ConsoleEndpoint {
    fn drop(&mut self) {
        if let Some(close) = self.close_oneshot_sender.take() {
            let _ = close.send(());
        }
        let _ = self.downstream_sender.send(None);
    }
}
