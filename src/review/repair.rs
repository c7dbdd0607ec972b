//! Repair rules applied when a draft scores below the rewrite threshold.
//!
//! Each rule is a pure `text -> text` function gated on its own check's
//! `passed` flag. Rules run in check order and each one sees the output
//! of the previous one.

use tracing::debug;

use crate::config::Vocabulary;
use crate::review::checks::{contains_any, extract_questions, is_question_addressed};
use crate::review::types::{CheckName, EmailMessage, QualityChecks};

const EMPATHY_OPENER: &str = "I'm sorry to hear about your experience. ";

const NEXT_STEPS: &str = "\n\nNext steps: I will follow up with you within 24 hours.";

/// What a repair rule may read besides the current text.
pub struct RepairContext<'a> {
    pub vocab: &'a Vocabulary,
    pub email: &'a EmailMessage,
}

type RepairRule = fn(&RepairContext<'_>, &str) -> String;

/// Checks that have a repair rule, in application order.
const RULES: [(CheckName, RepairRule); 5] = [
    (CheckName::GrammarSpelling, fix_spelling),
    (CheckName::ToneAppropriateness, soften_tone),
    (CheckName::ContentCompleteness, answer_missing_questions),
    (CheckName::Professionalism, ensure_professionalism),
    (CheckName::ActionClarity, add_next_steps),
];

/// Fold every applicable repair rule over `draft`.
pub fn repair(ctx: &RepairContext<'_>, draft: &str, checks: &QualityChecks) -> String {
    RULES
        .iter()
        .filter(|(name, _)| !checks.get(*name).passed)
        .fold(draft.to_string(), |text, (name, rule)| {
            let repaired = rule(ctx, &text);
            debug!(
                email_id = %ctx.email.id,
                check = name.as_str(),
                changed = repaired != text,
                "Applied repair rule"
            );
            repaired
        })
}

/// Replace known misspellings where their boundary allows.
///
/// Matching is literal, so capitalised misspellings are left alone.
pub fn fix_spelling(ctx: &RepairContext<'_>, text: &str) -> String {
    ctx.vocab
        .misspellings
        .iter()
        .fold(text.to_string(), |text, fix| fix.apply(&text))
}

/// Open with an apology unless the draft already shows empathy.
pub fn soften_tone(ctx: &RepairContext<'_>, text: &str) -> String {
    if contains_any(&text.to_lowercase(), &ctx.vocab.empathy_markers) {
        text.to_string()
    } else {
        format!("{EMPATHY_OPENER}{text}")
    }
}

/// Append a placeholder paragraph for every question still unaddressed.
///
/// Each appended paragraph quotes its question, so later questions that
/// share words with it count as addressed.
pub fn answer_missing_questions(ctx: &RepairContext<'_>, text: &str) -> String {
    extract_questions(&ctx.email.body)
        .into_iter()
        .fold(text.to_string(), |mut text, question| {
            if !is_question_addressed(&question, &text) {
                text.push_str(&format!(
                    "\n\nRegarding your question about \"{question}\", I'd like to add that..."
                ));
            }
            text
        })
}

/// Swap casual phrases for their replacements, in listed order.
pub fn ensure_professionalism(ctx: &RepairContext<'_>, text: &str) -> String {
    ctx.vocab
        .casual_phrases
        .iter()
        .fold(text.to_string(), |text, r| r.apply(&text))
}

/// Close with a follow-up commitment unless one is already there.
pub fn add_next_steps(ctx: &RepairContext<'_>, text: &str) -> String {
    if contains_any(&text.to_lowercase(), &ctx.vocab.action_markers) {
        text.to_string()
    } else {
        format!("{text}{NEXT_STEPS}")
    }
}
