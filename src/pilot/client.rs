// Pilot client: capture -> frame -> send -> wait for decision -> act
//
// The loop is deliberately sequential. Waiting for the decision byte before
// capturing the next frame bounds throughput to the perception round-trip,
// which guarantees the car never acts on a stale decision. Do not pipeline.

use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{info, warn};

use crate::drive::Car;

use super::camera::Camera;
use super::protocol::{self, Decision};
use super::PilotError;

/// Observational throughput numbers for one session. Not used for flow
/// control.
#[derive(Debug, Clone, Copy)]
pub struct SessionStats {
    pub frames: u64,
    pub elapsed: Duration,
}

impl SessionStats {
    pub fn fps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.frames as f64 / secs
        } else {
            0.0
        }
    }
}

pub struct PilotClient<S, C> {
    stream: S,
    camera: C,
    car: Car,
    speed: f32,
}

impl<S, C> PilotClient<S, C>
where
    S: AsyncRead + AsyncWrite + Unpin,
    C: Camera,
{
    pub fn new(stream: S, camera: C, car: Car, speed: f32) -> Self {
        Self {
            stream,
            camera,
            car,
            speed,
        }
    }

    /// Run the streaming session until the camera is exhausted, then send
    /// the end-of-session sentinel. Any wire or camera failure tears the
    /// session down; the connection is released on every exit path.
    pub async fn run(mut self) -> Result<SessionStats, PilotError> {
        let started = Instant::now();
        let mut frames = 0u64;

        while let Some(frame) = self.camera.capture()? {
            protocol::write_frame(&mut self.stream, &frame).await?;
            frames += 1;

            // Blocking suspension point: one frame in flight at a time.
            let byte = protocol::read_decision(&mut self.stream).await?;
            apply_decision(&mut self.car, byte, self.speed);
        }

        protocol::write_end_of_session(&mut self.stream).await?;
        self.car.stop();

        let stats = SessionStats {
            frames,
            elapsed: started.elapsed(),
        };
        info!(
            frames = stats.frames,
            elapsed_s = stats.elapsed.as_secs_f64(),
            fps = stats.fps(),
            "session complete"
        );
        Ok(stats)
    }
}

/// Map a decision byte onto a drive command. An unrecognized byte is
/// non-fatal: the car coasts on its previous actuation for this cycle.
fn apply_decision(car: &mut Car, byte: u8, speed: f32) {
    match Decision::from_byte(byte) {
        Some(Decision::Forward) => {
            info!("decision: forward");
            car.move_forward(speed);
        }
        Some(Decision::RotateLeft) => {
            info!("decision: rotate left");
            car.rotate_left(speed);
        }
        Some(Decision::RotateRight) => {
            info!("decision: rotate right");
            car.rotate_right(speed);
        }
        None => {
            warn!(byte, "unrecognized decision byte, coasting");
        }
    }
}
