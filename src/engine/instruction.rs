//! The typed block vocabulary and its validation rules
//!
//! Instructions are value types: each one carries its parameters as the raw
//! strings the palette editor produced. Parsing happens at the moment a
//! value is needed and is tolerant — malformed numeric text falls back to
//! the block type's documented default, never an error.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default step count for a Move block
pub const DEFAULT_MOVE_STEPS: i64 = 10;
/// Default angle for a Turn block
pub const DEFAULT_TURN_DEGREES: i64 = 30;
/// Default coordinate for a GoTo block
pub const DEFAULT_GOTO_COORD: i64 = 0;
/// Default pass count for a Repeat block
pub const DEFAULT_REPEAT_COUNT: i64 = 3;
/// Default text for a Say block
pub const DEFAULT_SAY_TEXT: &str = "Hello";
/// Default text for a Think block
pub const DEFAULT_THINK_TEXT: &str = "Hmm...";
/// Default display duration, in seconds, for Say and Think blocks
pub const DEFAULT_SPEECH_SECS: i64 = 2;

/// The tag of an instruction, without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstructionKind {
    /// Move forward along the current heading
    Move,
    /// Rotate in place
    Turn,
    /// Jump to an absolute position
    GoTo,
    /// Repeat the rest of the program
    Repeat,
    /// Show a speech bubble
    Say,
    /// Show a thought bubble
    Think,
}

impl fmt::Display for InstructionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstructionKind::Move => "move",
            InstructionKind::Turn => "turn",
            InstructionKind::GoTo => "goto",
            InstructionKind::Repeat => "repeat",
            InstructionKind::Say => "say",
            InstructionKind::Think => "think",
        };
        write!(f, "{}", name)
    }
}

/// One typed, parameterized unit of behavior in an actor's program
///
/// Mutating a field never changes the tag. Numeric fields hold "integer-like"
/// strings; they are coerced on edit and re-parsed (with the same fallback)
/// on execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    /// Move `steps` units along the current heading
    Move {
        /// Signed step count, integer-like string
        steps: String,
    },
    /// Add `degrees` to the heading
    Turn {
        /// Signed angle in degrees, integer-like string
        degrees: String,
    },
    /// Jump to the absolute position `(x, y)`, clamped to the canvas
    GoTo {
        /// Target x coordinate, integer-like string
        x: String,
        /// Target y coordinate, integer-like string
        y: String,
    },
    /// Repeat the rest of the program `count` times
    ///
    /// A Repeat block supplies only the pass count; it is not itself part of
    /// the loop body. Only the first Repeat in a program is honored.
    Repeat {
        /// Pass count, positive integer string
        count: String,
    },
    /// Show a speech bubble with `text` for `duration` seconds
    Say {
        /// Bubble text, free-form
        text: String,
        /// Display duration in seconds, integer-like string
        duration: String,
    },
    /// Show a thought bubble with `text` for `duration` seconds
    Think {
        /// Bubble text, free-form
        text: String,
        /// Display duration in seconds, integer-like string
        duration: String,
    },
}

/// An actor's ordered instruction sequence
pub type Program = Vec<Instruction>;

impl Instruction {
    /// Create a block of the given kind with its documented default fields
    pub fn default_for(kind: InstructionKind) -> Self {
        match kind {
            InstructionKind::Move => Instruction::Move {
                steps: DEFAULT_MOVE_STEPS.to_string(),
            },
            InstructionKind::Turn => Instruction::Turn {
                degrees: DEFAULT_TURN_DEGREES.to_string(),
            },
            InstructionKind::GoTo => Instruction::GoTo {
                x: DEFAULT_GOTO_COORD.to_string(),
                y: DEFAULT_GOTO_COORD.to_string(),
            },
            InstructionKind::Repeat => Instruction::Repeat {
                count: DEFAULT_REPEAT_COUNT.to_string(),
            },
            InstructionKind::Say => Instruction::Say {
                text: DEFAULT_SAY_TEXT.to_string(),
                duration: DEFAULT_SPEECH_SECS.to_string(),
            },
            InstructionKind::Think => Instruction::Think {
                text: DEFAULT_THINK_TEXT.to_string(),
                duration: DEFAULT_SPEECH_SECS.to_string(),
            },
        }
    }

    /// The tag of this instruction
    pub fn kind(&self) -> InstructionKind {
        match self {
            Instruction::Move { .. } => InstructionKind::Move,
            Instruction::Turn { .. } => InstructionKind::Turn,
            Instruction::GoTo { .. } => InstructionKind::GoTo,
            Instruction::Repeat { .. } => InstructionKind::Repeat,
            Instruction::Say { .. } => InstructionKind::Say,
            Instruction::Think { .. } => InstructionKind::Think,
        }
    }

    /// Whether this block displays a bubble when executed
    pub fn is_speech(&self) -> bool {
        matches!(self, Instruction::Say { .. } | Instruction::Think { .. })
    }

    /// Coerce and store user input for one field of this block
    ///
    /// Numeric fields are canonicalized through [`parse_int`] and fall back
    /// to the block type's default when parsing fails; text fields store the
    /// raw input. Field names that do not belong to the tag are ignored.
    pub fn set_field(&mut self, field: &str, raw: &str) {
        let kind = self.kind();
        match self {
            Instruction::Move { steps } if field == "steps" => {
                *steps = coerce_numeric(raw, DEFAULT_MOVE_STEPS);
            }
            Instruction::Turn { degrees } if field == "degrees" => {
                *degrees = coerce_numeric(raw, DEFAULT_TURN_DEGREES);
            }
            Instruction::GoTo { x, .. } if field == "x" => {
                *x = coerce_numeric(raw, DEFAULT_GOTO_COORD);
            }
            Instruction::GoTo { y, .. } if field == "y" => {
                *y = coerce_numeric(raw, DEFAULT_GOTO_COORD);
            }
            Instruction::Repeat { count } if field == "count" => {
                *count = coerce_numeric(raw, DEFAULT_REPEAT_COUNT);
            }
            Instruction::Say { text, .. } | Instruction::Think { text, .. }
                if field == "text" =>
            {
                *text = raw.to_string();
            }
            Instruction::Say { duration, .. } | Instruction::Think { duration, .. }
                if field == "duration" =>
            {
                *duration = coerce_numeric(raw, DEFAULT_SPEECH_SECS);
            }
            _ => {
                tracing::debug!(%kind, field, "ignoring edit to unknown field");
            }
        }
    }
}

/// Parse the leading signed integer of a string, if any
///
/// Mirrors the editor's lenient numeric handling: leading whitespace and an
/// optional sign are accepted, trailing garbage is dropped ("12abc" is 12),
/// and a string with no leading digits is `None`.
pub fn parse_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };

    let digits: &str = &rest[..rest
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(rest.len())];
    if digits.is_empty() {
        return None;
    }

    let mut value: i64 = 0;
    for c in digits.bytes() {
        value = value
            .saturating_mul(10)
            .saturating_add(i64::from(c - b'0'));
    }
    Some(if negative { -value } else { value })
}

/// Parse the leading signed integer of a string, falling back to a default
pub fn parse_int_or(raw: &str, default: i64) -> i64 {
    parse_int(raw).unwrap_or(default)
}

fn coerce_numeric(raw: &str, default: i64) -> String {
    parse_int_or(raw, default).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int_plain() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int("-7"), Some(-7));
        assert_eq!(parse_int("+13"), Some(13));
        assert_eq!(parse_int("  25"), Some(25));
    }

    #[test]
    fn test_parse_int_trailing_garbage() {
        assert_eq!(parse_int("12abc"), Some(12));
        assert_eq!(parse_int("10.5"), Some(10));
    }

    #[test]
    fn test_parse_int_failure() {
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("abc"), None);
        assert_eq!(parse_int("-"), None);
        assert_eq!(parse_int(".5"), None);
    }

    #[test]
    fn test_defaults_per_kind() {
        assert_eq!(
            Instruction::default_for(InstructionKind::Move),
            Instruction::Move {
                steps: "10".to_string()
            }
        );
        assert_eq!(
            Instruction::default_for(InstructionKind::Repeat),
            Instruction::Repeat {
                count: "3".to_string()
            }
        );
        assert_eq!(
            Instruction::default_for(InstructionKind::Say),
            Instruction::Say {
                text: "Hello".to_string(),
                duration: "2".to_string()
            }
        );
    }

    #[test]
    fn test_set_field_coerces_numeric() {
        let mut block = Instruction::default_for(InstructionKind::Move);
        block.set_field("steps", "  -25xyz");
        assert_eq!(
            block,
            Instruction::Move {
                steps: "-25".to_string()
            }
        );
    }

    #[test]
    fn test_set_field_falls_back_to_default() {
        let mut block = Instruction::default_for(InstructionKind::Turn);
        block.set_field("degrees", "ninety");
        assert_eq!(
            block,
            Instruction::Turn {
                degrees: "30".to_string()
            }
        );
    }

    #[test]
    fn test_set_field_text_is_free_form() {
        let mut block = Instruction::default_for(InstructionKind::Think);
        block.set_field("text", "42 is the answer");
        block.set_field("duration", "5");
        assert_eq!(
            block,
            Instruction::Think {
                text: "42 is the answer".to_string(),
                duration: "5".to_string()
            }
        );
    }

    #[test]
    fn test_set_field_unknown_field_is_ignored() {
        let mut block = Instruction::default_for(InstructionKind::Move);
        block.set_field("text", "not a move field");
        assert_eq!(
            block,
            Instruction::Move {
                steps: "10".to_string()
            }
        );
    }

    #[test]
    fn test_mutation_never_changes_tag() {
        let mut block = Instruction::default_for(InstructionKind::GoTo);
        block.set_field("x", "100");
        block.set_field("y", "-50");
        assert_eq!(block.kind(), InstructionKind::GoTo);
    }
}
