use crate::line_stream::AsyncLineStream;
use crate::protocol::{Protocol, ServerMessage};
use checkers::piece::Side;
use checkers::ranker::Ranker;
use rand::rngs::StdRng;

/// One side of a session: a connected peer or the built-in AI.
pub enum Seat {
    Peer(AsyncLineStream),
    Robot(Ranker<StdRng>),
}

impl Seat {
    pub fn is_robot(&self) -> bool {
        matches!(self, Self::Robot(_))
    }

    /// Writes to a peer; the AI has no connection and takes nothing.
    pub(super) async fn send(&mut self, side: Side, message: &ServerMessage) -> Result<(), Side> {
        match self {
            Self::Peer(stream) => stream
                .write_line(Protocol::encode_server(message))
                .await
                .map_err(|_| side),
            Self::Robot(_) => Ok(()),
        }
    }

    /// `None` once the peer is gone. Never completes for the AI.
    pub(super) async fn recv(&mut self) -> Option<String> {
        match self {
            Self::Peer(stream) => stream.read_line().await,
            Self::Robot(_) => smol::future::pending().await,
        }
    }
}
