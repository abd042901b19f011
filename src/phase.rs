//! Phase model for the session state machine.
//!
//! The whole graph is one pure function over an enum, so every edge is
//! statically enumerable and the handlers stay free of routing logic.
//! Interview, Affirm and Plan are self-looping: they repeat until the
//! judge flips their gate, with no iteration cap.

use std::fmt;

use crate::session::InputMode;

/// One named step of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Intake,
    Interview,
    Analyze,
    Affirm,
    Plan,
    Close,
    Persist,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Intake => "intake",
            Phase::Interview => "interview",
            Phase::Analyze => "analyze",
            Phase::Affirm => "affirm",
            Phase::Plan => "plan",
            Phase::Close => "close",
            Phase::Persist => "persist",
            Phase::Done => "done",
        };
        write!(f, "{name}")
    }
}

/// Pick the next phase.
///
/// `gate` carries the judge's verdict for the gated phases and is ignored
/// everywhere else; `mode` only matters leaving intake. A gated phase with
/// no verdict repeats, which keeps the repeat-don't-terminate bias even if
/// a caller ever passes `None` where a verdict was expected.
pub fn transition(from: Phase, mode: InputMode, gate: Option<bool>) -> Phase {
    match (from, gate) {
        (Phase::Intake, _) => match mode {
            InputMode::Conversational => Phase::Interview,
            InputMode::SingleText | InputMode::DualText | InputMode::None => Phase::Analyze,
        },
        (Phase::Interview, Some(true)) => Phase::Analyze,
        (Phase::Interview, _) => Phase::Interview,
        (Phase::Analyze, _) => Phase::Affirm,
        (Phase::Affirm, Some(true)) => Phase::Plan,
        (Phase::Affirm, _) => Phase::Affirm,
        (Phase::Plan, Some(true)) => Phase::Close,
        (Phase::Plan, _) => Phase::Plan,
        (Phase::Close, _) => Phase::Persist,
        (Phase::Persist, _) => Phase::Done,
        (Phase::Done, _) => Phase::Done,
    }
}
