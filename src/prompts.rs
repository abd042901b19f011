//! Persona text and prompt templates for each phase.
//!
//! Everything the language backend sees is assembled here: the companion
//! persona, the per-phase instructions, and the fixed classifier suffixes
//! the judge appends to a transcript tail.

use crate::transcript::{Message, Transcript};

/// The companion persona, sent as the system instruction on every call.
pub const PERSONA: &str = r#"You are the user's oldest friend, winding down the day with them.
Speak casually and warmly, never formally. The user is tired from work or
study, so never tell them to push harder. Put recognition of what they did
and permission to rest ahead of everything else. Keep replies short enough
to be spoken aloud comfortably."#;

/// Fixed opener for the first interview visit.
pub const INTERVIEW_GREETING: &str = "Good evening. I couldn't find any notes \
from today, so tell me yourself: how did the day go?";

/// Spoken once the interview has gathered enough to move on.
pub const INTERVIEW_ACK: &str = "Alright, I think I've got the picture. \
Thanks for walking me through it.";

/// Stand-in recorded when the user submits an empty reply.
pub const SILENT_REPLY: &str = "(stays quiet)";

/// Follow-up question for an interview re-visit.
///
/// The judge decided the shared context is not yet enough, so ask one more
/// question grounded in what the user just said.
pub fn interview_followup(tail: &[Message]) -> String {
    format!(
        r#"The conversation so far:
{}
You need a little more detail before you can reflect the day back to them.
Ask exactly one gentle follow-up question about what they just said. Only
output the question."#,
        Transcript::render(tail)
    )
}

/// Analysis over a single day's notes or interview text.
pub fn analysis_single(text: &str) -> String {
    format!(
        r#"From the following text, pull out what got finished (wins) and
what is still open or weighing on them (loose ends).

Text:
{text}"#
    )
}

/// Comparative analysis of yesterday's notes against today's.
pub fn analysis_dual(prior_text: &str, text: &str) -> String {
    format!(
        r#"Compare these two sets of notes.

Yesterday's notes (what was planned):
{prior_text}

Today's notes (what happened):
{text}

1. Find items planned yesterday that are done or crossed off today and
   treat each one as a real win.
2. Credit anything that was merely started.
3. Gauge how tired the writer sounds."#
    )
}

/// First affirmation, built purely from the analysis.
pub fn affirm(summary: &str) -> String {
    format!(
        r#"Analysis of their day:
{summary}

Speak to what they accomplished. Rules:
1. Mention only what got done; never bring up what didn't.
2. If something planned yesterday was finished today, call that out
   specifically as following through.
3. Keep it warm and spoken-length."#
    )
}

/// Affirmation re-visit: the user pushed back or wanted more.
pub fn affirm_revisit(summary: &str, last_reply: &str) -> String {
    format!(
        r#"Analysis of their day:
{summary}

They just said: "{last_reply}"

They aren't settled yet. Respond to what they said directly, still only
crediting what got done, and keep it spoken-length."#
    )
}

/// First plan proposal: exactly one focus item for tomorrow.
pub fn plan(summary: &str) -> String {
    format!(
        r#"Analysis of their day:
{summary}

Open with something like "Alright, let's set up tomorrow." Then:
1. Propose the single thing worth doing tomorrow. Small is fine.
2. Tell them everything else can wait and they can put it down for tonight.
Only output what you would say aloud."#
    )
}

/// Plan re-proposal conditioned on the user's objection.
pub fn plan_revisit(summary: &str, last_reply: &str) -> String {
    format!(
        r#"Analysis of their day:
{summary}

Your last proposal didn't land. They said: "{last_reply}"

Propose a different single focus for tomorrow that answers their concern,
and again give them permission to drop the rest. Only output what you
would say aloud."#
    )
}

/// Short send-off spoken at closing. No gate, no reply expected.
pub const CLOSE_PROMPT: &str = "Send them off to sleep with one short, warm \
good-night line. A sentence or two at most.";

/// Classifier suffix: has enough been shared to reflect the day back?
pub const SUFFICIENCY_INSTRUCTION: &str = r#"Question: has the user shared
enough about their day for you to summarize its wins and loose ends?
Answer with exactly one word, YES or NO."#;

/// Classifier suffix: did the latest reply signal agreement?
pub const SENTIMENT_INSTRUCTION: &str = r#"Question: does the user's most
recent reply indicate agreement or satisfaction, rather than objection or
wanting something different?
Answer with exactly one word, YES or NO."#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::Role;

    #[test]
    fn followup_quotes_the_conversation() {
        let mut t = Transcript::new();
        t.push(Role::Agent, "how was today?");
        t.push(Role::Human, "rough, honestly");

        let prompt = interview_followup(t.tail(8));
        assert!(prompt.contains("[you] rough, honestly"));
        assert!(prompt.contains("one gentle follow-up question"));
    }

    #[test]
    fn analysis_dual_includes_both_texts() {
        let prompt = analysis_dual("- write draft", "- draft done");
        assert!(prompt.contains("- write draft"));
        assert!(prompt.contains("- draft done"));
        assert!(prompt.contains("Yesterday's notes"));
    }

    #[test]
    fn affirm_revisit_quotes_the_reply() {
        let prompt = affirm_revisit("wins: draft", "that's not what mattered");
        assert!(prompt.contains("that's not what mattered"));
        assert!(prompt.contains("wins: draft"));
    }

    #[test]
    fn plan_revisit_quotes_the_objection() {
        let prompt = plan_revisit("summary", "too ambitious");
        assert!(prompt.contains("too ambitious"));
        assert!(prompt.contains("different single focus"));
    }

    #[test]
    fn classifier_suffixes_demand_one_word() {
        assert!(SUFFICIENCY_INSTRUCTION.contains("YES or NO"));
        assert!(SENTIMENT_INSTRUCTION.contains("YES or NO"));
    }
}
