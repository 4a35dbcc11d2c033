use std::net::SocketAddr;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;

use super::proto;
use super::proto::unity_to_external_proto_server::{
    UnityToExternalProto, UnityToExternalProtoServer,
};
use crate::domain::EnvError;

/// Header status the editor sends on a healthy exchange.
const STATUS_OK: i32 = 200;
/// Header status signalling the counterpart is shutting down.
const STATUS_SHUTDOWN: i32 = 400;

/// Trainer-side half of the ML-Agents `Exchange` conversation.
///
/// The editor is the gRPC client: it calls `Exchange` with its latest output
/// and blocks until the trainer answers with the next input. [`recv`] and
/// [`send`] expose that conversation in protocol order; the bridge task keeps
/// exactly one editor call in flight.
///
/// [`recv`]: RpcCommunicator::recv
/// [`send`]: RpcCommunicator::send
#[derive(Debug)]
pub struct RpcCommunicator {
    local_addr: SocketAddr,
    from_editor: mpsc::Receiver<proto::UnityMessageProto>,
    to_editor: mpsc::Sender<proto::UnityMessageProto>,
    shutdown: Option<oneshot::Sender<()>>,
    server: Option<JoinHandle<()>>,
}

struct ExchangeBridge {
    to_session: mpsc::Sender<proto::UnityMessageProto>,
    from_session: Mutex<mpsc::Receiver<proto::UnityMessageProto>>,
}

#[tonic::async_trait]
impl UnityToExternalProto for ExchangeBridge {
    async fn exchange(
        &self,
        request: tonic::Request<proto::UnityMessageProto>,
    ) -> Result<tonic::Response<proto::UnityMessageProto>, tonic::Status> {
        if self.to_session.send(request.into_inner()).await.is_err() {
            return Err(tonic::Status::unavailable("probe session closed"));
        }
        // The editor drives strictly sequential exchanges; the lock only
        // guards against a misbehaving client calling concurrently.
        let mut replies = self.from_session.lock().await;
        match replies.recv().await {
            Some(reply) => Ok(tonic::Response::new(reply)),
            None => Err(tonic::Status::unavailable("probe session closed")),
        }
    }
}

impl RpcCommunicator {
    /// Claim the rendezvous port and start serving. A bind failure is the
    /// port/address-conflict category, reported as such.
    pub async fn bind(port: u16) -> Result<Self, EnvError> {
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .map_err(|e| EnvError::Address {
                port,
                reason: e.to_string(),
            })?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| EnvError::Setup(format!("rendezvous listener has no address: {e}")))?;

        let (to_session, from_editor) = mpsc::channel(1);
        let (to_editor, from_session) = mpsc::channel(1);
        let bridge = ExchangeBridge {
            to_session,
            from_session: Mutex::new(from_session),
        };
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            let served = Server::builder()
                .add_service(UnityToExternalProtoServer::new(bridge))
                .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = served {
                tracing::debug!(error = %e, "rendezvous server stopped");
            }
        });

        tracing::debug!(addr = %local_addr, "rendezvous listening");
        Ok(Self {
            local_addr,
            from_editor,
            to_editor,
            shutdown: Some(shutdown_tx),
            server: Some(server),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Wait for the editor's next message. A lapsed wait is the timeout
    /// category; a non-OK header means the editor side stopped.
    pub async fn recv(&mut self, wait: Duration) -> Result<proto::UnityMessageProto, EnvError> {
        let message = match tokio::time::timeout(wait, self.from_editor.recv()).await {
            Err(_) => return Err(EnvError::Timeout(wait.as_secs())),
            Ok(None) => return Err(EnvError::Rpc("editor conversation ended".into())),
            Ok(Some(message)) => message,
        };
        let status = message
            .header
            .as_ref()
            .map(|h| h.status)
            .unwrap_or(STATUS_OK);
        if status != STATUS_OK {
            return Err(EnvError::Rpc(format!(
                "Unity communicator stopped (status {status})"
            )));
        }
        Ok(message)
    }

    /// Answer the editor's pending `Exchange` call.
    pub async fn send(&mut self, message: proto::UnityMessageProto) -> Result<(), EnvError> {
        self.to_editor
            .send(message)
            .await
            .map_err(|_| EnvError::Rpc("editor conversation ended".into()))
    }

    /// Tell the editor to shut down and stop serving. Consumes the
    /// communicator so the channel halves drop and any in-flight exchange
    /// resolves before the server is awaited.
    pub async fn shutdown(mut self) {
        let _ = self
            .send(proto::UnityMessageProto {
                header: Some(proto::HeaderProto {
                    status: STATUS_SHUTDOWN,
                    message: String::new(),
                }),
                unity_output: None,
                unity_input: None,
            })
            .await;
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let handle = self.server.take();
        drop(self);
        if let Some(mut handle) = handle {
            // The editor may keep its connection open; don't wait on it forever.
            if tokio::time::timeout(Duration::from_secs(2), &mut handle)
                .await
                .is_err()
            {
                handle.abort();
            }
        }
    }
}

impl Drop for RpcCommunicator {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.server.take() {
            handle.abort();
        }
    }
}
