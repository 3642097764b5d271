use crate::arbiter::lobby::Lobby;
use crate::console::read_input;
use clap::Subcommand;
use std::sync::{Arc, Mutex};

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "show the waiting peer, running sessions and results so far")]
    Status,
}

pub struct Control {
    lobby: Arc<Mutex<Lobby>>,
}

impl Control {
    pub fn new(lobby: Arc<Mutex<Lobby>>) -> Self {
        Self { lobby }
    }

    /// Serves operator commands from stdin until it closes.
    pub fn begin(&mut self) {
        while let Some(command) = read_input::<Command>() {
            match command {
                Command::Status => match self.report() {
                    Some(report) => print!("{report}"),
                    None => println!("lobby poisoned"),
                },
            }
        }
    }

    fn report(&self) -> Option<String> {
        let lobby = self.lobby.lock().ok()?;
        let status = lobby.status();

        let mut report = String::new();
        match lobby.waiting() {
            Some(name) => report.push_str(&format!("waiting: '{name}'\n")),
            None => report.push_str("waiting: none\n"),
        }
        report.push_str(&format!("running: {}\n", status.running));
        report.push_str(&format!("side 1 wins: {}\n", status.score.one));
        report.push_str(&format!("side 2 wins: {}\n", status.score.two));
        report.push_str(&format!("draws: {}\n", status.score.draw));
        report.push_str(&format!("abandoned: {}\n", status.abandoned));
        Some(report)
    }
}
