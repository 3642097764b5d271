use checkers::game::Outcome;
use checkers::piece::Side;
use std::fmt::Display;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Status {
    pub score: Score,
    pub waiting: bool,
    pub running: u32,
    pub abandoned: u32,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Score {
    pub one: u32,
    pub two: u32,
    pub draw: u32,
}

impl Status {
    pub fn new() -> Self {
        Self {
            score: Score::new(),
            waiting: false,
            running: 0,
            abandoned: 0,
        }
    }

    /// Closes out one running session.
    pub fn record(&mut self, result: Result<Outcome, Side>) {
        self.running = self.running.saturating_sub(1);
        match result {
            Ok(outcome) => self.score.merge(&outcome.into()),
            Err(_) => self.abandoned += 1,
        }
    }

    pub fn finished(&self) -> u32 {
        self.score.total() + self.abandoned
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} running ({}) abandoned ({}) waiting ({})",
            self.score, self.running, self.abandoned, self.waiting as u32
        )
    }
}

impl Score {
    pub fn new() -> Self {
        Self { one: 0, two: 0, draw: 0 }
    }

    pub fn merge(&mut self, score: &Self) {
        self.one += score.one;
        self.two += score.two;
        self.draw += score.draw;
    }

    pub fn total(&self) -> u32 {
        self.one + self.two + self.draw
    }
}

impl From<Outcome> for Score {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Won(Side::One) => Self { one: 1, ..Self::new() },
            Outcome::Won(Side::Two) => Self { two: 1, ..Self::new() },
            Outcome::Draw => Self { draw: 1, ..Self::new() },
        }
    }
}

impl Default for Score {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "one({}) two({}) draw({})", self.one, self.two, self.draw)
    }
}
