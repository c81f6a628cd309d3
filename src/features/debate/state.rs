//! Debate state and its transition rules
//!
//! The state is advanced one utterance at a time: [`DebateState::next_turn`]
//! says who speaks next and [`DebateState::record`] appends the utterance and
//! applies the phase transition. Character A always speaks before B, so the
//! history alternates A, B, A, B and is even at every phase boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::features::generation::AgentHandle;

/// Smallest round budget: one opening pair plus one closing pair
pub const MIN_ROUNDS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seat {
    A,
    B,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Opening,
    Debate,
    Closing,
    Complete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Opening => "opening",
            Phase::Debate => "debate",
            Phase::Closing => "closing",
            Phase::Complete => "complete",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Opening(Seat),
    Rebuttal(Seat),
    Closing(Seat),
}

impl Turn {
    pub fn seat(&self) -> Seat {
        match self {
            Turn::Opening(seat) | Turn::Rebuttal(seat) | Turn::Closing(seat) => *seat,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    pub seat: Seat,
    pub phase: Phase,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct DebateState {
    pub session_id: Uuid,
    pub prompt: String,
    pub character_a_id: String,
    pub character_b_id: String,
    pub context_a: String,
    pub context_b: String,
    pub agent_a: Option<AgentHandle>,
    pub agent_b: Option<AgentHandle>,
    pub history: Vec<Utterance>,
    pub current_round: u32,
    pub max_rounds: u32,
    pub phase: Phase,
    pub use_memory: bool,
    /// Set when a cancellation stopped the debate before `Complete`
    pub cancelled: bool,
}

impl DebateState {
    /// Fresh state in the opening phase. `max_rounds` below [`MIN_ROUNDS`] is raised to it.
    pub fn new(
        prompt: &str,
        character_a_id: &str,
        character_b_id: &str,
        context_a: String,
        context_b: String,
        max_rounds: u32,
        use_memory: bool,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            prompt: prompt.to_string(),
            character_a_id: character_a_id.to_string(),
            character_b_id: character_b_id.to_string(),
            context_a,
            context_b,
            agent_a: None,
            agent_b: None,
            history: Vec::new(),
            current_round: 0,
            max_rounds: max_rounds.max(MIN_ROUNDS),
            phase: Phase::Opening,
            use_memory,
            cancelled: false,
        }
    }

    /// The next speaker, or `None` once the debate is complete
    pub fn next_turn(&self) -> Option<Turn> {
        let seat = if self.history.len() % 2 == 0 {
            Seat::A
        } else {
            Seat::B
        };

        match self.phase {
            Phase::Opening => Some(Turn::Opening(seat)),
            Phase::Debate => Some(Turn::Rebuttal(seat)),
            Phase::Closing => Some(Turn::Closing(seat)),
            Phase::Complete => None,
        }
    }

    /// Append an utterance for `turn` and apply the resulting transition.
    ///
    /// The round counter only moves after B has spoken.
    pub fn record(&mut self, turn: Turn, content: String) {
        self.history.push(Utterance {
            seat: turn.seat(),
            phase: self.phase,
            content,
        });

        match turn {
            Turn::Opening(Seat::A) | Turn::Rebuttal(Seat::A) | Turn::Closing(Seat::A) => {}
            Turn::Opening(Seat::B) => {
                self.current_round = 1;
                self.phase = Phase::Debate;
                self.settle_debate_phase();
            }
            Turn::Rebuttal(Seat::B) => {
                self.current_round += 1;
                self.settle_debate_phase();
            }
            Turn::Closing(Seat::B) => {
                self.phase = Phase::Complete;
            }
        }
    }

    /// `max_rounds` is public, so the floor is enforced here as well as in `new`
    fn round_budget(&self) -> u32 {
        self.max_rounds.max(MIN_ROUNDS)
    }

    fn settle_debate_phase(&mut self) {
        if self.phase == Phase::Debate && self.current_round >= self.round_budget() - 1 {
            self.phase = Phase::Closing;
        }
    }

    /// Number of utterances a complete debate with this budget produces
    pub fn expected_len(&self) -> usize {
        2 * self.round_budget() as usize
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    pub fn character_id(&self, seat: Seat) -> &str {
        match seat {
            Seat::A => &self.character_a_id,
            Seat::B => &self.character_b_id,
        }
    }

    pub fn context(&self, seat: Seat) -> &str {
        match seat {
            Seat::A => &self.context_a,
            Seat::B => &self.context_b,
        }
    }

    pub fn agent(&self, seat: Seat) -> Option<&AgentHandle> {
        match seat {
            Seat::A => self.agent_a.as_ref(),
            Seat::B => self.agent_b.as_ref(),
        }
    }

    pub fn utterances(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(|u| u.content.as_str())
    }
}
