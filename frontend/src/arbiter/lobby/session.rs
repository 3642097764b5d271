use crate::arbiter::lobby::seat::Seat;
use crate::protocol::{PeerMessage, Protocol, ServerMessage};
use checkers::game::{Game, Outcome};
use checkers::location::Move;
use checkers::piece::Side;
use log::{debug, info, trace, warn};
use smol::Timer;
use std::time::Duration;

/// A single match between two seats, driven to completion by [`Session::run`].
pub struct Session {
    name: String,
    game: Game,
    seats: [Seat; 2],
    thinking_delay: Duration,
}

impl Session {
    /// `seats` is indexed by side, side one first.
    pub fn new(name: String, game: Game, seats: [Seat; 2], thinking_delay: Duration) -> Self {
        Self {
            name,
            game,
            seats,
            thinking_delay,
        }
    }

    /// Plays until the game ends, or returns the side whose connection failed.
    pub async fn run(mut self) -> Result<Outcome, Side> {
        info!(
            "session '{}' starting with {} as side one and {} as side two",
            self.name,
            Self::describe(&self.seats[0]),
            Self::describe(&self.seats[1]),
        );

        let result = self.compete().await;
        match result {
            Ok(outcome) => info!("session '{}' concluded normally with {outcome}", self.name),
            Err(side) => warn!("session '{}' abandoned after {side} disconnected", self.name),
        }
        result
    }

    fn describe(seat: &Seat) -> &'static str {
        if seat.is_robot() {
            "the AI"
        } else {
            "a peer"
        }
    }

    async fn compete(&mut self) -> Result<Outcome, Side> {
        for side in [Side::One, Side::Two] {
            self.send(side, &ServerMessage::Side { side }).await?;
        }

        loop {
            if let Some(outcome) = self.game.outcome() {
                self.broadcast(&ServerMessage::End { outcome }).await?;
                return Ok(outcome);
            }

            let side = self.game.to_move();
            let mv = match &mut self.seats[side.index()] {
                Seat::Robot(ranker) => {
                    Timer::after(self.thinking_delay).await;
                    ranker.generate(self.game.board(), self.game.multi_jump())
                }
                Seat::Peer(_) => self.request(side).await?,
            };

            match self.game.play(mv) {
                Ok(played) => {
                    debug!(
                        "session '{}': {side} played {mv} {}{}",
                        self.name,
                        played.outcome.kind(),
                        if played.continues { ", jumping again" } else { "" }
                    );
                    self.broadcast(&ServerMessage::from_played(&played)).await?;
                }
                Err(rejection) => {
                    warn!("session '{}': {side} requested {mv}, rejected: {rejection}", self.name);
                    self.send(side, &ServerMessage::rejected(mv)).await?;
                }
            }
        }
    }

    /// Prompts `side` until it sends a well formed move, relaying chat from either seat meanwhile.
    async fn request(&mut self, side: Side) -> Result<Move, Side> {
        trace!("session '{}': prompting {side} for next move", self.name);
        self.send(side, &ServerMessage::Ping).await?;

        loop {
            let (from, line) = self.listen().await;
            let line = line.ok_or(from)?;

            match Protocol::decode_peer(&line) {
                Some(PeerMessage::Play { mv }) if from == side => return Ok(mv),
                Some(PeerMessage::Play { mv }) => {
                    warn!("session '{}': {from} requested {mv} out of turn, rejected", self.name);
                    self.send(from, &ServerMessage::rejected(mv)).await?;
                }
                Some(PeerMessage::Chat { text }) => self.forward(from, text).await?,
                Some(PeerMessage::Mode { .. }) | None => {
                    warn!("session '{}': malformed line from {from}: {line:?}", self.name);
                    if from == side {
                        self.send(side, &ServerMessage::Ping).await?;
                    }
                }
            }
        }
    }

    async fn forward(&mut self, from: Side, text: String) -> Result<(), Side> {
        let to = from.other();
        if self.seats[to.index()].is_robot() {
            debug!("session '{}': chat from {from} dropped: {text}", self.name);
            return Ok(());
        }
        self.send(to, &ServerMessage::Chat { text }).await
    }

    /// Next line from whichever seat speaks first.
    async fn listen(&mut self) -> (Side, Option<String>) {
        let [one, two] = &mut self.seats;
        smol::future::race(
            async move { (Side::One, one.recv().await) },
            async move { (Side::Two, two.recv().await) },
        )
        .await
    }

    async fn send(&mut self, side: Side, message: &ServerMessage) -> Result<(), Side> {
        self.seats[side.index()].send(side, message).await
    }

    async fn broadcast(&mut self, message: &ServerMessage) -> Result<(), Side> {
        let [one, two] = &mut self.seats;
        smol::future::try_zip(one.send(Side::One, message), two.send(Side::Two, message)).await?;
        Ok(())
    }
}
