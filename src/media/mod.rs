use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::watch;

use crate::capture::FrameSource;
use crate::collaborators::SessionCredential;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// The real-time media session the recording rides on. Implementations
/// own the SDK and the camera track; the core only needs a connection
/// signal and a handle for grabbing the current video frame.
#[async_trait]
pub trait MediaSession: Send + Sync {
    /// Joins the room named in the credential. Resolving does not imply
    /// the session is connected yet; watch [`connection_state`] for that.
    ///
    /// [`connection_state`]: MediaSession::connection_state
    async fn connect(&self, credential: &SessionCredential) -> Result<()>;

    async fn disconnect(&self);

    fn connection_state(&self) -> watch::Receiver<ConnectionState>;

    fn frame_source(&self) -> Arc<dyn FrameSource>;
}
