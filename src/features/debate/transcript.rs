//! Transcript rendering
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Incomplete marker for cancelled debates
//! - 1.0.0: Opening / rounds / closing sections

use super::state::{DebateState, Phase};

const RULE_WIDTH: usize = 80;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Render the debate as plain text. Pure: the output depends on `state` only.
///
/// For a complete debate of `L` utterances: `[0]`/`[1]` are the openings,
/// `[2..L-2]` the round pairs and `[L-2]`/`[L-1]` the closings. An
/// interrupted debate renders what exists, closing entries found by phase.
pub fn format_debate_output(state: &DebateState) -> String {
    let name_a = state.character_a_id.as_str();
    let name_b = state.character_b_id.as_str();
    let history = &state.history;
    let complete = state.is_complete() && history.len() >= 4;

    let mut lines = vec![
        format!("DEBATE: {}", state.prompt),
        format!("Participants: {name_a} vs {name_b}"),
        format!(
            "Memory Mode: {}",
            if state.use_memory { "Enabled" } else { "Disabled" }
        ),
    ];
    if !complete {
        lines.push(format!(
            "Status: INCOMPLETE (stopped during {} phase after {} of {} turns)",
            state.phase,
            history.len(),
            state.expected_len()
        ));
    }
    lines.push(rule());
    lines.push(String::new());

    let opening_end = history.len().min(2);
    if opening_end > 0 {
        lines.push("OPENING STATEMENTS:".to_string());
        for (i, utterance) in history[..opening_end].iter().enumerate() {
            let name = if i == 0 { name_a } else { name_b };
            lines.push(format!("\n{name}: {}", utterance.content));
        }
        lines.push(format!("\n{}\n", rule()));
    }

    let closing_start = if complete {
        history.len() - 2
    } else {
        history
            .iter()
            .position(|u| u.phase == Phase::Closing)
            .unwrap_or(history.len())
            .max(opening_end)
    };

    if complete || closing_start > opening_end {
        lines.push("DEBATE ROUNDS:".to_string());
        for (round, pair) in history[opening_end..closing_start].chunks(2).enumerate() {
            lines.push(format!("\nRound {}:", round + 1));
            lines.push(format!("{name_a}: {}", pair[0].content));
            if let Some(reply) = pair.get(1) {
                lines.push(format!("{name_b}: {}", reply.content));
            }
        }
        lines.push(format!("\n{}\n", rule()));
    }

    if closing_start < history.len() {
        lines.push("CLOSING STATEMENTS:".to_string());
        for (i, utterance) in history[closing_start..].iter().enumerate() {
            let name = if i == 0 { name_a } else { name_b };
            lines.push(format!("\n{name}: {}", utterance.content));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::debate::state::{Seat, Utterance};

    fn state_with(entries: &[(Seat, Phase, &str)], phase: Phase, max_rounds: u32) -> DebateState {
        let mut state = DebateState::new(
            "Should AI be regulated?",
            "Dr. Logic",
            "Ms. Firebrand",
            String::new(),
            String::new(),
            max_rounds,
            true,
        );
        state.history = entries
            .iter()
            .map(|(seat, phase, content)| Utterance {
                seat: *seat,
                phase: *phase,
                content: content.to_string(),
            })
            .collect();
        state.phase = phase;
        state
    }

    #[test]
    fn test_one_round_transcript() {
        let state = state_with(
            &[
                (Seat::A, Phase::Opening, "o_a"),
                (Seat::B, Phase::Opening, "o_b"),
                (Seat::A, Phase::Debate, "r1a"),
                (Seat::B, Phase::Debate, "r1b"),
                (Seat::A, Phase::Closing, "c_a"),
                (Seat::B, Phase::Closing, "c_b"),
            ],
            Phase::Complete,
            2,
        );

        let output = format_debate_output(&state);

        assert!(output.starts_with("DEBATE: Should AI be regulated?\n"));
        assert!(output.contains("Participants: Dr. Logic vs Ms. Firebrand"));
        assert!(output.contains("Memory Mode: Enabled"));
        assert!(!output.contains("INCOMPLETE"));
        assert_eq!(output.matches("Round ").count(), 1);
        assert!(output.contains("\nRound 1:\nDr. Logic: r1a\nMs. Firebrand: r1b\n"));
        assert!(output.contains("OPENING STATEMENTS:\n\nDr. Logic: o_a\n\nMs. Firebrand: o_b"));
        assert!(output.ends_with("CLOSING STATEMENTS:\n\nDr. Logic: c_a\n\nMs. Firebrand: c_b"));
    }

    #[test]
    fn test_no_rounds_renders_empty_section() {
        let state = state_with(
            &[
                (Seat::A, Phase::Opening, "o_a"),
                (Seat::B, Phase::Opening, "o_b"),
                (Seat::A, Phase::Closing, "c_a"),
                (Seat::B, Phase::Closing, "c_b"),
            ],
            Phase::Complete,
            2,
        );

        let output = format_debate_output(&state);

        assert!(output.contains("DEBATE ROUNDS:"));
        assert!(!output.contains("Round 1"));
        assert!(output.contains("OPENING STATEMENTS:"));
        assert!(output.contains("CLOSING STATEMENTS:\n\nDr. Logic: c_a"));
    }

    #[test]
    fn test_formatting_is_deterministic() {
        let state = state_with(
            &[
                (Seat::A, Phase::Opening, "o_a"),
                (Seat::B, Phase::Opening, "o_b"),
                (Seat::A, Phase::Closing, "c_a"),
                (Seat::B, Phase::Closing, "c_b"),
            ],
            Phase::Complete,
            2,
        );
        assert_eq!(format_debate_output(&state), format_debate_output(&state));
    }

    #[test]
    fn test_incomplete_mid_round() {
        let mut state = state_with(
            &[
                (Seat::A, Phase::Opening, "o_a"),
                (Seat::B, Phase::Opening, "o_b"),
                (Seat::A, Phase::Debate, "r1a"),
            ],
            Phase::Debate,
            4,
        );
        state.cancelled = true;

        let output = format_debate_output(&state);

        assert!(output.contains("Status: INCOMPLETE (stopped during debate phase after 3 of 8 turns)"));
        assert!(output.contains("\nRound 1:\nDr. Logic: r1a"));
        assert!(!output.contains("CLOSING STATEMENTS"));
    }

    #[test]
    fn test_incomplete_during_closing() {
        let state = state_with(
            &[
                (Seat::A, Phase::Opening, "o_a"),
                (Seat::B, Phase::Opening, "o_b"),
                (Seat::A, Phase::Closing, "c_a"),
            ],
            Phase::Closing,
            2,
        );

        let output = format_debate_output(&state);

        assert!(output.contains("INCOMPLETE"));
        assert!(!output.contains("DEBATE ROUNDS"));
        assert!(output.ends_with("CLOSING STATEMENTS:\n\nDr. Logic: c_a"));
    }

    #[test]
    fn test_cancelled_before_any_turn() {
        let state = state_with(&[], Phase::Opening, 3);
        let output = format_debate_output(&state);

        assert!(output.contains("INCOMPLETE (stopped during opening phase after 0 of 6 turns)"));
        assert!(!output.contains("OPENING STATEMENTS"));
    }
}
