// Pilot server: read frame -> classify -> answer with one decision byte
//
// One frame is in flight at a time, matching the client's blocking-read
// back-pressure. The session ends on the zero-length sentinel, after which
// no further payload is read from that direction.

use std::time::Instant;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info};

use super::client::SessionStats;
use super::perception::Perception;
use super::protocol;
use super::PilotError;

pub struct PilotServer<S, P> {
    stream: S,
    perception: P,
}

impl<S, P> PilotServer<S, P>
where
    S: AsyncRead + AsyncWrite + Unpin,
    P: Perception,
{
    pub fn new(stream: S, perception: P) -> Self {
        Self { stream, perception }
    }

    /// Serve one session to completion. Protocol and perception failures
    /// tear the session down; there is no reconnect.
    pub async fn run(mut self) -> Result<SessionStats, PilotError> {
        let started = Instant::now();
        let mut frames = 0u64;

        while let Some(payload) = protocol::read_frame(&mut self.stream).await? {
            debug!(len = payload.len(), "frame received");
            let class = self.perception.classify(&payload)?;
            protocol::write_decision(&mut self.stream, class).await?;
            frames += 1;
        }

        let stats = SessionStats {
            frames,
            elapsed: started.elapsed(),
        };
        info!(
            frames = stats.frames,
            elapsed_s = stats.elapsed.as_secs_f64(),
            fps = stats.fps(),
            "session closed by client"
        );
        Ok(stats)
    }
}
