//! The quiz game for GameBot.
//!
//! One host asks questions; everyone else races to answer them first.
//! A session starts with a lobby phase (react to join), then the host
//! drives rounds by direct message. Each round is a timed window in which
//! every actual player may submit exactly one answer; answers are ranked
//! by arrival and revealed when the round ends.
//!
//! # Key types
//!
//! - [`QuizzGame`] — the [`Game`](gamebot_session::Game) implementation:
//!   lobby, host semantics, event routing
//! - [`QuizzRound`] — one question/answer cycle: the answer engine
//! - [`QuizzConfig`] — tunables (answer category, round timeout, emoji)

mod game;
mod round;

pub use game::{GAME_TYPE, QuizzConfig, QuizzGame};
pub use round::{Answer, QuizzRound, RoundError};
