use checkers::game::Game;
use checkers::ranker::Ranker;
use checkers::rules::MoveKind;
use clap::Parser;
use frontend::line_stream::LineStream;
use frontend::protocol::{Mode, PeerMessage, Protocol, ServerMessage};
use log::{debug, info, warn, LevelFilter};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::error::Error;
use std::net::{IpAddr, SocketAddr, TcpStream};

#[derive(Parser, Debug)]
struct Arguments {
    #[arg(short, long, default_value = "127.0.0.1")]
    ip: IpAddr,

    #[arg(short, long, default_value_t = 1234)]
    port: u16,

    #[arg(short, long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let arguments = Arguments::parse();

    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let stream = TcpStream::connect(SocketAddr::new(arguments.ip, arguments.port))?;
    let stream = LineStream::new(&stream);
    let write = |message| stream.write_line(Protocol::encode_peer(&message));

    write(PeerMessage::Mode { mode: Mode::Wait })?;

    let random = match arguments.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut random = Some(random);
    let mut ranker = None;
    let mut game = Game::opening();

    loop {
        let line = stream.read_line().ok_or("server closed the connection")?;
        let message = Protocol::decode_server(&line).ok_or_else(|| format!("unexpected line {line:?}"))?;

        match message {
            ServerMessage::Side { side } => {
                info!("playing as {side}");
                let random = random.take().ok_or("side assigned twice")?;
                ranker = Some(Ranker::new(side, random));
            }
            ServerMessage::Ping => {
                let ranker = ranker.as_mut().ok_or("prompted before a side was assigned")?;
                for entry in ranker.rank(game.board(), game.multi_jump()) {
                    debug!("candidate {entry}");
                }

                let mv = ranker.generate(game.board(), game.multi_jump());
                write(PeerMessage::Play { mv })?;
            }
            ServerMessage::Update {
                mv, kind: MoveKind::None, ..
            } => warn!("server rejected {mv}"),
            ServerMessage::Update { mv, .. } => {
                game.play(mv)
                    .map_err(|rejection| format!("board out of sync at {mv}: {rejection}"))?;
            }
            ServerMessage::End { outcome } => {
                info!("match over, {outcome}");
                print!("{game}");
                return Ok(());
            }
            ServerMessage::Chat { text } => info!("opponent says: {text}"),
        }
    }
}
