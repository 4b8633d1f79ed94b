// Server loop module
// Accepts connections until the shutdown future resolves

use std::future::Future;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use super::ServeOptions;
use crate::handler::SharedRouter;
use crate::logger;

/// Accept connections on `listener` and serve them with `router`.
///
/// Every connection runs on its own task. Once `shutdown` resolves no new
/// connections are accepted; connections already running finish on their own.
#[allow(clippy::ignored_unit_patterns)]
pub async fn serve<S>(listener: TcpListener, router: SharedRouter, options: ServeOptions, shutdown: S)
where
    S: Future<Output = ()>,
{
    let options = Arc::new(options);
    let active_connections = Arc::new(AtomicUsize::new(0));
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(
                            stream,
                            peer_addr,
                            &router,
                            &options,
                            &active_connections,
                        );
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            _ = &mut shutdown => {
                break;
            }
        }
    }
}
