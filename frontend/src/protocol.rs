use checkers::game::{Outcome, Played};
use checkers::location::{Move, Square};
use checkers::piece::Side;
use checkers::rules::MoveKind;

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum ServerMessage {
    Side { side: Side },
    Ping,
    Update { mv: Move, kind: MoveKind, captured: Option<Square> },
    End { outcome: Outcome },
    Chat { text: String },
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Mode {
    Wait,
    Cpu,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum PeerMessage {
    Mode { mode: Mode },
    Play { mv: Move },
    Chat { text: String },
}

impl ServerMessage {
    pub fn from_played(played: &Played) -> Self {
        Self::Update {
            mv: played.mv,
            kind: played.outcome.kind(),
            captured: played.outcome.captured().map(|(square, _)| square),
        }
    }

    /// Echo of a request that was turned down.
    pub fn rejected(mv: Move) -> Self {
        Self::Update {
            mv,
            kind: MoveKind::None,
            captured: None,
        }
    }
}

pub struct Protocol;

impl Protocol {
    // coordinates every terminal line starts with
    const END_PREFIX: &'static str = "1 2 3 4";

    fn chat(line: &str) -> Option<String> {
        let line = line.trim();
        if line == "CHAT" {
            return Some(String::new());
        }
        line.strip_prefix("CHAT ").map(str::to_string)
    }

    pub fn decode_server(line: &str) -> Option<ServerMessage> {
        if let Some(text) = Protocol::chat(line) {
            return Some(ServerMessage::Chat { text });
        }

        let mut parts = line.split_whitespace().fuse();
        let all: Vec<&str> = line.split_whitespace().collect();

        let message = match all.as_slice() {
            ["PING"] => ServerMessage::Ping,
            [side] => ServerMessage::Side {
                side: Side::from_number(side.parse().ok()?)?,
            },
            [_, _, _, _, kind, ..] => {
                let mv = Move::from_parts(&mut parts)?;
                let _ = parts.next();

                let end = match *kind {
                    "END1" => Some(Outcome::Won(Side::One)),
                    "END2" => Some(Outcome::Won(Side::Two)),
                    "DRAW" => Some(Outcome::Draw),
                    _ => None,
                };
                if let Some(outcome) = end {
                    return Some(ServerMessage::End { outcome });
                }

                let kind = MoveKind::from_wire_name(kind)?;
                let captured = match kind {
                    MoveKind::Capture => {
                        let mut next = || -> Option<i8> { parts.next()?.parse().ok() };
                        Some(Square::from_xy(next()?, next()?)?)
                    }
                    _ => None,
                };
                ServerMessage::Update { mv, kind, captured }
            }
            _ => return None,
        };
        Some(message)
    }

    pub fn decode_peer(line: &str) -> Option<PeerMessage> {
        if let Some(text) = Protocol::chat(line) {
            return Some(PeerMessage::Chat { text });
        }

        let message = match line.trim() {
            "wait" => PeerMessage::Mode { mode: Mode::Wait },
            "cpu" => PeerMessage::Mode { mode: Mode::Cpu },
            line => PeerMessage::Play { mv: line.parse().ok()? },
        };
        Some(message)
    }

    pub fn encode_server(message: &ServerMessage) -> String {
        match message {
            ServerMessage::Side { side } => side.number().to_string(),
            ServerMessage::Ping => "PING".to_string(),
            ServerMessage::Update { mv, kind, captured } => match captured {
                Some(square) => format!("{mv} {kind} {square}"),
                None => format!("{mv} {kind}"),
            },
            ServerMessage::End { outcome } => {
                let code = match outcome {
                    Outcome::Won(Side::One) => "END1",
                    Outcome::Won(Side::Two) => "END2",
                    Outcome::Draw => "DRAW",
                };
                format!("{} {code}", Protocol::END_PREFIX)
            }
            ServerMessage::Chat { text } => format!("CHAT {text}"),
        }
    }

    pub fn encode_peer(message: &PeerMessage) -> String {
        match message {
            PeerMessage::Mode { mode: Mode::Wait } => "wait".to_string(),
            PeerMessage::Mode { mode: Mode::Cpu } => "cpu".to_string(),
            PeerMessage::Play { mv } => mv.to_string(),
            PeerMessage::Chat { text } => format!("CHAT {text}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkers::game::Game;

    fn mv(from: (i8, i8), to: (i8, i8)) -> Move {
        Move::from_xy(from, to).unwrap()
    }

    #[test]
    fn server_lines_match_the_wire_format() {
        let cases = [
            (ServerMessage::Side { side: Side::Two }, "2"),
            (ServerMessage::Ping, "PING"),
            (
                ServerMessage::Update {
                    mv: mv((2, 5), (3, 4)),
                    kind: MoveKind::Normal,
                    captured: None,
                },
                "2 5 3 4 NORMAL",
            ),
            (
                ServerMessage::Update {
                    mv: mv((1, 2), (3, 4)),
                    kind: MoveKind::Capture,
                    captured: Square::from_xy(2, 3),
                },
                "1 2 3 4 KILL 2 3",
            ),
            (ServerMessage::rejected(mv((1, 2), (1, 3))), "1 2 1 3 NONE"),
            (ServerMessage::End { outcome: Outcome::Won(Side::One) }, "1 2 3 4 END1"),
            (ServerMessage::End { outcome: Outcome::Won(Side::Two) }, "1 2 3 4 END2"),
            (ServerMessage::End { outcome: Outcome::Draw }, "1 2 3 4 DRAW"),
            (ServerMessage::Chat { text: "good luck".to_string() }, "CHAT good luck"),
        ];

        for (message, line) in cases {
            assert_eq!(Protocol::encode_server(&message), line);
            assert_eq!(Protocol::decode_server(line), Some(message));
        }
    }

    #[test]
    fn peer_lines_match_the_wire_format() {
        let cases = [
            (PeerMessage::Mode { mode: Mode::Wait }, "wait"),
            (PeerMessage::Mode { mode: Mode::Cpu }, "cpu"),
            (PeerMessage::Play { mv: mv((2, 5), (3, 4)) }, "2 5 3 4"),
            (PeerMessage::Chat { text: "hi there".to_string() }, "CHAT hi there"),
        ];

        for (message, line) in cases {
            assert_eq!(Protocol::encode_peer(&message), line);
            assert_eq!(Protocol::decode_peer(line), Some(message));
        }
    }

    #[test]
    fn played_moves_become_updates() {
        let mut game = Game::from_fen("8/8/8/8/2M5/1m6/8/8", Side::One).unwrap();
        let played = game.play(mv((1, 2), (3, 4))).unwrap();
        assert_eq!(Protocol::encode_server(&ServerMessage::from_played(&played)), "1 2 3 4 KILL 2 3");
    }

    #[test]
    fn malformed_peer_lines_are_rejected() {
        for line in ["", "2 5 3", "2 5 3 x", "2 5 3 8", "-1 0 0 0", "WAIT", "move 2 5 3 4"] {
            assert_eq!(Protocol::decode_peer(line), None, "{line:?}");
        }
        // trailing tokens after a complete request are ignored
        assert_eq!(
            Protocol::decode_peer("2 5 3 4 extra"),
            Some(PeerMessage::Play { mv: mv((2, 5), (3, 4)) })
        );
    }

    #[test]
    fn malformed_server_lines_are_rejected() {
        for line in ["", "3", "PONG", "1 2 3 4 JUMP", "1 2 3 4 KILL", "1 2 3 4 KILL 9 9", "1 2 3 NORMAL"] {
            assert_eq!(Protocol::decode_server(line), None, "{line:?}");
        }
    }

    #[test]
    fn empty_chat_survives_trimming() {
        let line = Protocol::encode_peer(&PeerMessage::Chat { text: String::new() });
        assert_eq!(Protocol::decode_peer(line.trim()), Some(PeerMessage::Chat { text: String::new() }));
    }
}
