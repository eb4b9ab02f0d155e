//! Connection dispatcher: accepts TCP connections and runs one session task
//! per client.
//!
//! The accept loop never waits on a session; each accepted stream is split
//! and handed to a fresh task in a [`JoinSet`], which doubles as the
//! live-session set. Finished sessions are reaped as they complete. There is
//! no graceful-shutdown signal; the loop runs until accept itself fails.

use std::sync::Arc;

use tokio::io::BufReader;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::error::Result;
use crate::registry::MailboxRegistry;
use crate::session::Session;

pub struct Dispatcher {
    listener: TcpListener,
    registry: Arc<MailboxRegistry>,
}

impl Dispatcher {
    pub fn new(listener: TcpListener, registry: Arc<MailboxRegistry>) -> Self {
        Self { listener, registry }
    }

    /// Accept connections until the listener fails. Session errors are
    /// logged and confined to their own task; they never unwind the accept
    /// loop or other sessions.
    pub async fn run(self) -> Result<()> {
        let mut sessions = JoinSet::new();
        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer_addr)) => {
                            info!(%peer_addr, "client connected");
                            let registry = Arc::clone(&self.registry);
                            sessions.spawn(async move {
                                let (read_half, write_half) = stream.into_split();
                                let session =
                                    Session::new(BufReader::new(read_half), write_half, registry);
                                if let Err(e) = session.run().await {
                                    warn!(%peer_addr, error = %e, "session ended with error");
                                }
                            });
                        }
                        Err(e) => {
                            error!(error = %e, "accept failed, shutting down");
                            return Err(e.into());
                        }
                    }
                }
                Some(finished) = sessions.join_next(), if !sessions.is_empty() => {
                    if let Err(e) = finished {
                        warn!(error = %e, "session task aborted");
                    }
                }
            }
        }
    }
}
