//! JSON-RPC Server
//!
//! Implements the JSON-RPC 2.0 server over TCP (localhost only).

use crate::handler::RpcHandler;
use crate::types::{ResultRequest, SearchRequest, SubmitRequest};
use formflux_core::application::{JobLifecycle, MovieSearch};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use std::sync::Arc;
use tracing::info;

const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 9630;

/// RPC Server Configuration
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    pub fn new(
        config: RpcServerConfig,
        lifecycle: Arc<JobLifecycle>,
        search: Arc<MovieSearch>,
    ) -> Self {
        Self {
            config,
            handler: Arc::new(RpcHandler::new(lifecycle, search)),
        }
    }

    /// Start the JSON-RPC server
    ///
    /// Security: Only binds to localhost by default (no external access)
    pub async fn start(self) -> Result<ServerHandle, String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        info!(
            host = %self.config.host,
            port = %self.config.port,
            "Starting JSON-RPC server"
        );

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to build server on {}: {}", addr, e))?;

        let mut module = RpcModule::new(());

        // Register methods
        let handler = self.handler.clone();
        module
            .register_async_method("doc.submit.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: SubmitRequest = params.parse()?;
                    handler.submit(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("doc.result.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: ResultRequest = params.parse()?;
                    handler.result(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("movies.search.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: SearchRequest = params.parse()?;
                    handler.movies_search(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        info!("JSON-RPC server started successfully");

        let handle = server.start(module);
        Ok(handle)
    }
}
