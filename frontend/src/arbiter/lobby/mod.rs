use crate::arbiter::lobby::seat::Seat;
use crate::arbiter::lobby::session::Session;
use crate::arbiter::lobby::status::Status;
use crate::line_stream::AsyncLineStream;
use crate::protocol::Mode;
use checkers::game::Game;
use checkers::piece::Side;
use checkers::ranker::Ranker;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

pub mod seat;
pub mod session;
pub mod status;

#[derive(Copy, Clone, Debug)]
pub struct SessionConfig {
    /// Pause before every AI move.
    pub thinking_delay: Duration,
    /// Fixed base seed for the AI, fresh entropy per session when unset.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            thinking_delay: Duration::from_millis(1000),
            seed: None,
        }
    }
}

/// Pairs incoming peers and keeps the tally of every session it started.
pub struct Lobby {
    this: Weak<Mutex<Self>>,
    config: SessionConfig,
    waiting: Option<(String, AsyncLineStream)>,
    started: u64,
    status: Status,
}

impl Lobby {
    pub fn new(config: SessionConfig) -> Arc<Mutex<Self>> {
        Arc::new_cyclic(|weak| {
            Mutex::new(Self {
                this: weak.clone(),
                config,
                waiting: None,
                started: 0,
                status: Status::new(),
            })
        })
    }

    pub fn join(&mut self, name: String, mode: Mode, stream: AsyncLineStream) {
        match mode {
            Mode::Cpu => {
                info!("'{name}' plays side one against the AI");
                let ranker = Ranker::new(Side::Two, self.random());
                self.start(format!("{name} vs. AI"), [Seat::Peer(stream), Seat::Robot(ranker)]);
            }
            Mode::Wait => match self.waiting.take() {
                None => {
                    info!("'{name}' waiting for an opponent");
                    self.waiting = Some((name, stream));
                    self.status.waiting = true;
                }
                Some((first, waiting)) => {
                    info!("pairing '{first}' as side one with '{name}' as side two");
                    self.status.waiting = false;
                    self.start(format!("{first} vs. {name}"), [Seat::Peer(waiting), Seat::Peer(stream)]);
                }
            },
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn waiting(&self) -> Option<&str> {
        self.waiting.as_ref().map(|(name, _)| name.as_str())
    }

    fn random(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(self.started)),
            None => StdRng::from_os_rng(),
        }
    }

    fn start(&mut self, name: String, seats: [Seat; 2]) {
        self.started += 1;
        self.status.running += 1;

        let session = Session::new(name, Game::opening(), seats, self.config.thinking_delay);
        let this = self.this.clone();

        smol::spawn(async move {
            let result = session.run().await;

            let Some(this) = this.upgrade() else {
                return;
            };
            if let Ok(mut lobby) = this.lock() {
                lobby.status.record(result);
                debug!("lobby status: {}", lobby.status);
            };
        })
        .detach();
    }
}
