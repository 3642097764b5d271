use checkers::game::{Event, Game, Outcome};
use checkers::location::Move;
use checkers::piece::Side;
use checkers::rules::MoveKind;
use clap::{Parser, Subcommand};
use frontend::console::read_input;
use frontend::line_stream::LineStream;
use frontend::protocol::{Mode, PeerMessage, Protocol, ServerMessage};
use std::error::Error;
use std::net::{IpAddr, Shutdown, SocketAddr, TcpStream};
use std::sync::Mutex;
use std::thread;

#[derive(Parser, Debug)]
struct Arguments {
    #[arg(short, long, default_value = "127.0.0.1")]
    ip: IpAddr,

    #[arg(short, long, default_value_t = 1234)]
    port: u16,

    #[arg(long, help = "play against the AI instead of waiting for another peer")]
    cpu: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(alias = "p", about = "request a move, e.g. 'play 2 5 3 4'")]
    Play {
        from_column: i8,
        from_row: i8,
        to_column: i8,
        to_row: i8,
    },
    #[command(about = "send a line to the opponent")]
    Chat { text: Vec<String> },
    #[command(about = "show the board")]
    Board,
    #[command(about = "leave the match")]
    Quit,
}

/// Local mirror of the match, only ever advanced by server updates.
struct View {
    game: Game,
    side: Option<Side>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let arguments = Arguments::parse();

    let address = SocketAddr::new(arguments.ip, arguments.port);
    let stream = TcpStream::connect(address)?;
    let writer = LineStream::new(&stream);

    let mode = if arguments.cpu { Mode::Cpu } else { Mode::Wait };
    writer.write_line(Protocol::encode_peer(&PeerMessage::Mode { mode }))?;
    println!("connected to {address}, waiting for the match to start");

    let mut game = Game::opening();
    game.subscribe(|event| match event {
        Event::Played(played) => println!("{} played {} {}", played.side, played.mv, played.outcome.kind()),
        Event::Ended(outcome) => println!("{outcome}"),
    });
    let view = Mutex::new(View { game, side: None });

    thread::scope(|scope| -> Result<(), Box<dyn Error>> {
        scope.spawn(|| {
            match listen(&stream, &view) {
                Ok(outcome) => println!("match over - {}", describe(outcome, &view)),
                Err(err) => println!("disconnected - {err}"),
            }
            std::process::exit(0);
        });

        while let Some(command) = read_input::<Command>() {
            match command {
                Command::Play {
                    from_column,
                    from_row,
                    to_column,
                    to_row,
                } => {
                    let Some(mv) = Move::from_xy((from_column, from_row), (to_column, to_row)) else {
                        println!("coordinates must be between 0 and 7");
                        continue;
                    };
                    writer.write_line(Protocol::encode_peer(&PeerMessage::Play { mv }))?;
                }
                Command::Chat { text } => {
                    let text = text.join(" ");
                    writer.write_line(Protocol::encode_peer(&PeerMessage::Chat { text }))?;
                }
                Command::Board => match view.lock() {
                    Ok(view) => print!("{}", view.game),
                    Err(_) => return Err("view poisoned".into()),
                },
                Command::Quit => break,
            }
        }

        // unblocks the listening thread, which ends the process
        stream.shutdown(Shutdown::Both)?;
        Ok(())
    })
}

fn listen(stream: &TcpStream, view: &Mutex<View>) -> Result<Outcome, Box<dyn Error>> {
    let stream = LineStream::new(stream);

    loop {
        let line = stream.read_line().ok_or("server closed the connection")?;
        let Some(message) = Protocol::decode_server(&line) else {
            println!("unrecognized line from server: {line}");
            continue;
        };

        let mut view = view.lock().map_err(|_| "view poisoned")?;
        match message {
            ServerMessage::Side { side } => {
                println!("you play {side}");
                view.side = Some(side);
            }
            ServerMessage::Ping => {
                print!("{}", view.game);
                println!("your move");
            }
            ServerMessage::Update {
                mv, kind: MoveKind::None, ..
            } => println!("illegal move {mv}, try again"),
            ServerMessage::Update { mv, .. } => {
                if let Err(rejection) = view.game.play(mv) {
                    return Err(format!("board out of sync with the server at {mv}: {rejection}").into());
                }
            }
            ServerMessage::End { outcome } => return Ok(outcome),
            ServerMessage::Chat { text } => println!("opponent: {text}"),
        }
    }
}

fn describe(outcome: Outcome, view: &Mutex<View>) -> String {
    let side = view.lock().ok().and_then(|view| view.side);
    match (outcome.winner(), side) {
        (Some(winner), Some(side)) if winner == side => "you won".to_string(),
        (Some(_), Some(_)) => "you lost".to_string(),
        _ => outcome.to_string(),
    }
}
