use chrono::Local;
use clap::Parser;
use env_logger::Target;
use frontend::arbiter::control::Control;
use frontend::arbiter::lobby::{Lobby, SessionConfig};
use frontend::line_stream::AsyncLineStream;
use frontend::protocol::{PeerMessage, Protocol};
use log::{info, warn, LevelFilter};
use smol::net::TcpStream as AsyncTcpStream;
use std::error::Error;
use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Parser)]
struct Arguments {
    #[arg(short, long, default_value_t = 1234)]
    port: u16,

    #[arg(short, long, default_value_t = 1000, help = "AI thinking delay in milliseconds")]
    delay: u64,

    #[arg(short, long, help = "seed the AI for reproducible matches")]
    seed: Option<u64>,

    #[arg(long, default_value = "log.txt")]
    log: PathBuf,

    #[arg(long, default_value_t = LevelFilter::Debug)]
    log_level: LevelFilter,
}

fn main() -> Result<(), Box<dyn Error>> {
    let arguments = Arguments::parse();

    let file = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(&arguments.log)?;

    env_logger::Builder::new()
        .filter_level(arguments.log_level)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{style}[{}] [{:5}]{style:#} {}",
                Local::now().format("%T%.3f"),
                record.level(),
                record.args(),
                style = buf.default_level_style(record.level()),
            )
        })
        .target(Target::Pipe(Box::new(std::io::BufWriter::new(file))))
        .target(Target::Stderr)
        .init();

    let config = SessionConfig {
        thinking_delay: Duration::from_millis(arguments.delay),
        seed: arguments.seed,
    };
    let address = format!("0.0.0.0:{}", arguments.port);
    let lobby: Arc<Mutex<Lobby>> = Lobby::new(config);

    let mut control = Control::new(lobby.clone());
    thread::spawn(move || control.begin());

    smol::block_on(serve(lobby, &address))
}

async fn serve(lobby: Arc<Mutex<Lobby>>, address: &str) -> Result<(), Box<dyn Error>> {
    let listener = smol::net::TcpListener::bind(address).await?;
    info!("server listening at {address}");

    loop {
        match listener.accept().await {
            Ok((stream, address)) => {
                info!("received incoming connection from {address}");
                smol::spawn(connect(lobby.clone(), stream, address)).detach();
            }
            Err(err) => warn!("failed to accept connection: {err}"),
        }
    }
}

async fn connect(lobby: Arc<Mutex<Lobby>>, stream: AsyncTcpStream, address: SocketAddr) {
    let stream = AsyncLineStream::new(stream);
    if let Err(err) = initialize_connection(lobby, stream, address).await {
        warn!("connection from {address} closed with error {err}");
    }
}

async fn initialize_connection(
    lobby: Arc<Mutex<Lobby>>,
    mut stream: AsyncLineStream,
    address: SocketAddr,
) -> Result<(), String> {
    let line = stream
        .read_line()
        .await
        .ok_or("disconnected before choosing a mode")?;

    let Some(PeerMessage::Mode { mode }) = Protocol::decode_peer(&line) else {
        return Err(format!("expected 'wait' or 'cpu', received {line:?}"));
    };

    info!("connection from {address} chose mode {mode:?}");
    let mut lobby = lobby.lock().map_err(|_| "lobby poisoned")?;
    lobby.join(address.to_string(), mode, stream);
    Ok(())
}
