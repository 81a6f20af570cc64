// Frame streaming runtime: the pilot client (camera side) and the pilot
// server (perception side), sharing one wire codec.

pub mod camera;
pub mod client;
pub mod perception;
pub mod protocol;
pub mod server;

pub use camera::{Camera, CameraError, ReplayCamera};
pub use client::{PilotClient, SessionStats};
pub use perception::{FixedPerception, Perception, PerceptionError};
pub use protocol::{Decision, ProtocolError};
pub use server::PilotServer;

/// Session-level failure: any collaborator or wire error tears the
/// session down. Restart is an operator action.
#[derive(Debug, thiserror::Error)]
pub enum PilotError {
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("camera error: {0}")]
    Camera(#[from] CameraError),

    #[error("perception error: {0}")]
    Perception(#[from] PerceptionError),
}
