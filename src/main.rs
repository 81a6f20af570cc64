use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use tokio::net::{TcpListener, TcpStream};
use tracing::info;
use tracing_subscriber::EnvFilter;

use picar_pilot::config::{
    CarConfig, DEFAULT_DRIVE_SPEED, DEFAULT_LISTEN_ADDR, TELEOP_INPUT_TIMEOUT,
    TELEOP_POLL_INTERVAL,
};
use picar_pilot::drive::{Car, TraceGpio};
use picar_pilot::pilot::{FixedPerception, PilotClient, PilotServer, ReplayCamera};

// Duty-cycle steps for keyboard driving
const TELEOP_SPEEDS: [f32; 3] = [4.0, 10.0, 20.0];

type Error = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser)]
#[command(name = "picar-pilot", about = "Remote-perception driving runtime")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Stream frames to the perception server and drive on its decisions
    Client {
        /// Perception server address, host:port
        #[arg(long)]
        server: String,

        /// Directory of pre-encoded frames to stream
        #[arg(long)]
        frames: PathBuf,

        /// Car configuration file (JSON); reference values if omitted
        #[arg(long)]
        config: Option<PathBuf>,

        /// Duty-cycle base value for drive commands
        #[arg(long, default_value_t = DEFAULT_DRIVE_SPEED)]
        speed: f32,
    },

    /// Accept one client session and answer each frame with a decision
    Serve {
        #[arg(long, default_value = DEFAULT_LISTEN_ADDR)]
        listen: String,

        /// Class index returned for every frame (stand-in for a model)
        #[arg(long, default_value_t = 0)]
        class: u8,
    },

    /// Drive the car from the keyboard
    Teleop {
        /// Car configuration file (JSON); reference values if omitted
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Run the scripted forward / rotate-left / rotate-right sequence
    DriveTest {
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, default_value_t = DEFAULT_DRIVE_SPEED)]
        speed: f32,
    },
}

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("picar-pilot error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Error> {
    match cli.command {
        Command::Client {
            server,
            frames,
            config,
            speed,
        } => {
            let car = load_car(config)?;
            let camera = ReplayCamera::open(&frames)?;
            info!("connecting to {}", server);
            let stream = TcpStream::connect(&server).await?;
            let stats = PilotClient::new(stream, camera, car, speed).run().await?;
            info!(
                "sent {} frames in {:.1}s at {:.2} fps",
                stats.frames,
                stats.elapsed.as_secs_f64(),
                stats.fps()
            );
        }

        Command::Serve { listen, class } => {
            let listener = TcpListener::bind(&listen).await?;
            info!("listening on {}", listen);

            // Single connection, single session; restart is an operator action.
            let (stream, addr) = listener.accept().await?;
            info!("client connected from {}", addr);
            let stats = PilotServer::new(stream, FixedPerception { class })
                .run()
                .await?;
            info!("served {} frames", stats.frames);
        }

        Command::Teleop { config } => {
            let car = load_car(config)?;
            enable_raw_mode()?;
            let result = run_teleop(car);
            disable_raw_mode()?;
            result?;
        }

        Command::DriveTest { config, speed } => {
            let car = load_car(config)?;
            run_drive_test(car, speed).await;
        }
    }

    Ok(())
}

fn load_car(config: Option<PathBuf>) -> Result<Car, Error> {
    let config = match config {
        Some(path) => CarConfig::load(&path)?,
        None => CarConfig::default(),
    };
    let mut gpio = TraceGpio;
    Ok(Car::new(&config, &mut gpio)?)
}

// Keyboard drive loop. Raw mode delivers no key-release events on most
// terminals, so input silence past the timeout counts as a release.
fn run_teleop(mut car: Car) -> std::io::Result<()> {
    info!("controls: arrows=forward/reverse/pivot, z/x=arc turn, space=stop, r/f=speed, q=quit");

    let mut speed_idx: usize = 0;
    let mut moving = false;
    let mut last_input = Instant::now();

    loop {
        if event::poll(TELEOP_POLL_INTERVAL)? {
            if let Event::Key(KeyEvent { code, kind, .. }) = event::read()? {
                let pressed = kind == KeyEventKind::Press || kind == KeyEventKind::Repeat;
                if !pressed {
                    continue;
                }
                let speed = TELEOP_SPEEDS[speed_idx];

                match code {
                    KeyCode::Up => {
                        car.move_forward(speed);
                        moving = true;
                        last_input = Instant::now();
                    }
                    KeyCode::Down => {
                        car.move_reverse(speed);
                        moving = true;
                        last_input = Instant::now();
                    }
                    KeyCode::Left => {
                        car.rotate_left(speed);
                        moving = true;
                        last_input = Instant::now();
                    }
                    KeyCode::Right => {
                        car.rotate_right(speed);
                        moving = true;
                        last_input = Instant::now();
                    }
                    KeyCode::Char('z') => {
                        car.turn_left(speed);
                        moving = true;
                        last_input = Instant::now();
                    }
                    KeyCode::Char('x') => {
                        car.turn_right(speed);
                        moving = true;
                        last_input = Instant::now();
                    }
                    KeyCode::Char(' ') => {
                        car.stop();
                        moving = false;
                    }
                    KeyCode::Char('r') => {
                        speed_idx = (speed_idx + 1).min(TELEOP_SPEEDS.len() - 1);
                        info!("speed: {}", TELEOP_SPEEDS[speed_idx]);
                    }
                    KeyCode::Char('f') => {
                        speed_idx = speed_idx.saturating_sub(1);
                        info!("speed: {}", TELEOP_SPEEDS[speed_idx]);
                    }
                    KeyCode::Char('q') => break,
                    _ => {}
                }
            }
        }

        if moving && last_input.elapsed() > TELEOP_INPUT_TIMEOUT {
            car.stop();
            moving = false;
        }
    }

    car.stop();
    Ok(())
}

// Scripted check that each motion command reaches the wheels.
async fn run_drive_test(mut car: Car, speed: f32) {
    let pause = std::time::Duration::from_secs(1);

    info!("forward");
    car.move_forward(speed);
    tokio::time::sleep(pause).await;

    info!("rotate left");
    car.rotate_left(speed);
    tokio::time::sleep(pause).await;

    info!("rotate right");
    car.rotate_right(speed);
    tokio::time::sleep(pause).await;

    info!("stop");
    car.stop();
}
