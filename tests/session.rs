// End-to-end streaming sessions over an in-memory duplex stream.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use picar_pilot::config::CarConfig;
use picar_pilot::drive::{Car, TraceGpio};
use picar_pilot::pilot::{
    Camera, CameraError, Perception, PerceptionError, PilotClient, PilotError, PilotServer,
    ProtocolError,
};

struct ScriptedCamera {
    frames: VecDeque<Vec<u8>>,
}

impl Camera for ScriptedCamera {
    fn capture(&mut self) -> Result<Option<Vec<u8>>, CameraError> {
        Ok(self.frames.pop_front())
    }
}

// Records payload sizes and answers with classes 0, 1, 2, 0, ...
struct RecordingPerception {
    seen: Arc<Mutex<Vec<usize>>>,
    next_class: u8,
}

impl RecordingPerception {
    fn new(seen: Arc<Mutex<Vec<usize>>>) -> Self {
        Self {
            seen,
            next_class: 0,
        }
    }
}

impl Perception for RecordingPerception {
    fn classify(&mut self, image: &[u8]) -> Result<u8, PerceptionError> {
        self.seen.lock().unwrap().push(image.len());
        let class = self.next_class;
        self.next_class = (self.next_class + 1) % 3;
        Ok(class)
    }
}

fn test_car() -> Car {
    let mut gpio = TraceGpio;
    Car::new(&CarConfig::default(), &mut gpio).unwrap()
}

#[tokio::test]
async fn three_frames_then_clean_shutdown() {
    let (client_io, server_io) = tokio::io::duplex(64 * 1024);

    let camera = ScriptedCamera {
        frames: VecDeque::from(vec![vec![0xAA; 100], vec![0xBB; 12_345], vec![0xCC; 1]]),
    };
    let seen = Arc::new(Mutex::new(Vec::new()));

    let client = PilotClient::new(client_io, camera, test_car(), 4.0);
    let server = PilotServer::new(server_io, RecordingPerception::new(seen.clone()));

    let (client_stats, server_stats) = tokio::join!(client.run(), server.run());

    // Exactly one decision per frame, clean bilateral termination on the
    // sentinel, and the server never waits on a fourth payload.
    let client_stats = client_stats.unwrap();
    let server_stats = server_stats.unwrap();
    assert_eq!(client_stats.frames, 3);
    assert_eq!(server_stats.frames, 3);
    assert_eq!(*seen.lock().unwrap(), vec![100, 12_345, 1]);
}

#[tokio::test]
async fn connection_lost_mid_frame_is_fatal_to_the_server() {
    let (mut client_io, server_io) = tokio::io::duplex(1024);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let server = PilotServer::new(server_io, RecordingPerception::new(seen));

    let writer = tokio::spawn(async move {
        use tokio::io::AsyncWriteExt;
        client_io.write_u32_le(10).await.unwrap();
        client_io.write_all(&[1, 2, 3]).await.unwrap();
        // Dropping the stream here closes the connection mid-payload.
    });

    let (result, _) = tokio::join!(server.run(), writer);
    match result {
        Err(PilotError::Protocol(ProtocolError::ShortRead)) => {}
        other => panic!("expected a short-read protocol error, got {other:?}"),
    }
}

#[tokio::test]
async fn server_loss_surfaces_as_short_read_on_the_client() {
    let (client_io, mut server_io) = tokio::io::duplex(64 * 1024);

    let camera = ScriptedCamera {
        frames: VecDeque::from(vec![vec![1u8; 8], vec![2u8; 8]]),
    };
    let client = PilotClient::new(client_io, camera, test_car(), 4.0);

    let fake_server = tokio::spawn(async move {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        // Answer the first frame, then vanish before answering the second.
        let len = server_io.read_u32_le().await.unwrap();
        let mut payload = vec![0u8; len as usize];
        server_io.read_exact(&mut payload).await.unwrap();
        server_io.write_all(b"0").await.unwrap();
        let _ = server_io.read_u32_le().await.unwrap();
    });

    let (result, _) = tokio::join!(client.run(), fake_server);
    match result {
        Err(PilotError::Protocol(ProtocolError::ShortRead)) => {}
        other => panic!("expected a short-read protocol error, got {other:?}"),
    }
}
