//! gRPC server for the Stash file service.
//!
//! Exposes a [`TransferService`] as `stash.file.v1.FileService`, together with
//! gRPC reflection so tools like `grpcurl` can discover it.
//!
//! # Usage
//!
//! ```ignore
//! use stash_rpc_server::GrpcServer;
//!
//! let server = GrpcServer::new("127.0.0.1:50051".parse()?, transfers);
//! tokio::spawn({
//!     let server = server.clone();
//!     async move { server.start().await }
//! });
//! // ...
//! server.stop()?;
//! ```

mod file;
mod status;

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use eyre::WrapErr;
use stash_rpc_proto::FILE_DESCRIPTOR_SET;
use stash_rpc_proto::file::file_service_server::FileServiceServer;
use stash_transfer::{FileStore, TransferService};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tracing::{info, warn};

pub use file::FileGrpcService;

/// gRPC server hosting the file service.
pub struct GrpcServer<S> {
    addr: SocketAddr,
    transfers: TransferService<S>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    running: AtomicBool,
}

impl<S: FileStore> GrpcServer<S> {
    /// Create a server that will listen on `addr`.
    pub fn new(addr: SocketAddr, transfers: TransferService<S>) -> Arc<Self> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Arc::new(Self {
            addr,
            transfers,
            shutdown_tx,
            shutdown_rx,
            running: AtomicBool::new(false),
        })
    }

    /// Bind the configured address and serve until [`stop`](Self::stop) is called.
    pub async fn start(&self) -> eyre::Result<()> {
        let listener = TcpListener::bind(self.addr)
            .await
            .wrap_err_with(|| format!("failed to bind gRPC server to {}", self.addr))?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until [`stop`](Self::stop) is called.
    ///
    /// In-flight calls are allowed to finish before this returns.
    pub async fn serve(&self, listener: TcpListener) -> eyre::Result<()> {
        let local_addr = listener.local_addr()?;

        let file_server =
            FileServiceServer::new(FileGrpcService::new(self.transfers.clone()));

        // Enable gRPC reflection for tools like grpcurl
        let reflection_service = tonic_reflection::server::Builder::configure()
            .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
            .build_v1()?;

        info!(
            addr = %local_addr,
            chunk_size = self.transfers.chunk_size(),
            "Starting gRPC server"
        );
        self.running.store(true, Ordering::SeqCst);

        let mut shutdown_rx = self.shutdown_rx.clone();

        let result = Server::builder()
            .add_service(file_server)
            .add_service(reflection_service)
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async move {
                let _ = shutdown_rx.wait_for(|stop| *stop).await;
            })
            .await;

        self.running.store(false, Ordering::SeqCst);

        match result {
            Ok(()) => {
                info!("gRPC server stopped");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "gRPC server error");
                Err(e.into())
            }
        }
    }

    /// Ask the server to stop accepting calls and drain in-flight ones.
    pub fn stop(&self) -> eyre::Result<()> {
        info!("Stopping gRPC server");
        self.shutdown_tx.send(true)?;
        Ok(())
    }

    /// Configured listen address.
    pub const fn address(&self) -> SocketAddr {
        self.addr
    }

    /// Whether the server is currently serving.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Transfer service behind the gRPC front.
    pub const fn transfers(&self) -> &TransferService<S> {
        &self.transfers
    }
}
