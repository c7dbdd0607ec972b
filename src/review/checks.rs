//! The quality check battery.
//!
//! Every check is a pure function over already-lowercased text and the
//! injected [`Vocabulary`]. Matching is plain substring search: "teh"
//! also matches inside "tehran". That crudeness is deliberate.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::Vocabulary;
use crate::review::types::{CheckResult, QualityChecks, Sentiment};

/// Share of questions that must be addressed for completeness to pass.
const COMPLETENESS_PASS_RATIO: f64 = 0.8;

/// A run of non-terminator characters closed by a question mark.
static QUESTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^.!?]*\?").expect("question pattern is valid"));

/// Run all seven checks in evaluation order.
pub fn run_checks(vocab: &Vocabulary, body: &str, draft: &str) -> QualityChecks {
    let body_lower = body.to_lowercase();
    let draft_lower = draft.to_lowercase();

    QualityChecks {
        grammar_spelling: check_grammar_spelling(vocab, &draft_lower),
        tone_appropriateness: check_tone(vocab, &body_lower, &draft_lower),
        content_completeness: check_completeness(body, draft),
        brand_voice: check_brand_voice(vocab, &draft_lower),
        accuracy: check_accuracy(vocab, &draft_lower),
        professionalism: check_professionalism(vocab, &draft_lower),
        action_clarity: check_action_clarity(vocab, &draft_lower),
    }
}

/// `max(0, 1 - weight * count)`.
fn penalized(count: usize, weight: f64) -> f64 {
    (1.0 - count as f64 * weight).max(0.0)
}

fn matching<'a>(text: &str, phrases: impl IntoIterator<Item = &'a String>) -> Vec<&'a str> {
    phrases
        .into_iter()
        .map(String::as_str)
        .filter(|phrase| text.contains(phrase))
        .collect()
}

/// True if `text` contains any of `phrases`.
pub fn contains_any(text: &str, phrases: &[String]) -> bool {
    phrases.iter().any(|phrase| text.contains(phrase.as_str()))
}

pub fn check_grammar_spelling(vocab: &Vocabulary, draft_lower: &str) -> CheckResult {
    let found = matching(draft_lower, vocab.misspellings.iter().map(|m| &m.phrase));
    let issues: Vec<String> = found
        .iter()
        .map(|token| format!("Potential spelling error: {token}"))
        .collect();
    CheckResult::new(issues.is_empty(), penalized(found.len(), 0.2), issues)
}

pub fn check_tone(vocab: &Vocabulary, body_lower: &str, draft_lower: &str) -> CheckResult {
    let email_sentiment = analyze_sentiment(vocab, body_lower);
    let draft_sentiment = analyze_sentiment(vocab, draft_lower);

    match (email_sentiment, draft_sentiment) {
        (Sentiment::Negative, Sentiment::Positive) => CheckResult::pass(0.9),
        (Sentiment::Positive, Sentiment::Negative) => {
            CheckResult::fail(0.3, "Response tone does not match email sentiment")
        }
        _ => CheckResult::pass(0.8),
    }
}

pub fn check_completeness(body: &str, draft: &str) -> CheckResult {
    let questions = extract_questions(body);
    if questions.is_empty() {
        return CheckResult::pass(1.0);
    }

    let addressed = questions
        .iter()
        .filter(|q| is_question_addressed(q, draft))
        .count();
    let ratio = addressed as f64 / questions.len() as f64;

    if ratio >= COMPLETENESS_PASS_RATIO {
        CheckResult::pass(ratio)
    } else {
        CheckResult::fail(ratio, "Not all questions addressed")
    }
}

pub fn check_brand_voice(vocab: &Vocabulary, draft_lower: &str) -> CheckResult {
    let issues: Vec<String> = matching(draft_lower, &vocab.brand_violations)
        .into_iter()
        .map(|phrase| format!("Brand voice violation: {phrase}"))
        .collect();
    CheckResult::new(issues.is_empty(), penalized(issues.len(), 0.3), issues)
}

pub fn check_accuracy(vocab: &Vocabulary, draft_lower: &str) -> CheckResult {
    let issues: Vec<String> = vocab
        .risk_patterns
        .iter()
        .filter(|pattern| pattern.all_of.iter().all(|term| draft_lower.contains(term.as_str())))
        .map(|pattern| pattern.issue.clone())
        .collect();
    CheckResult::new(issues.is_empty(), penalized(issues.len(), 0.5), issues)
}

pub fn check_professionalism(vocab: &Vocabulary, draft_lower: &str) -> CheckResult {
    let issues: Vec<String> = matching(draft_lower, vocab.casual_phrases.iter().map(|r| &r.phrase))
        .into_iter()
        .map(|phrase| format!("Unprofessional phrase: {phrase}"))
        .collect();
    CheckResult::new(issues.is_empty(), penalized(issues.len(), 0.3), issues)
}

pub fn check_action_clarity(vocab: &Vocabulary, draft_lower: &str) -> CheckResult {
    if contains_any(draft_lower, &vocab.action_indicators) {
        CheckResult::pass(0.9)
    } else {
        CheckResult::fail(0.5, "No clear action items")
    }
}

/// Classify `text` by counting which sentiment words it contains.
///
/// Each listed word counts at most once, however often it appears.
pub fn analyze_sentiment(vocab: &Vocabulary, text: &str) -> Sentiment {
    let lower = text.to_lowercase();
    let positive = matching(&lower, &vocab.positive_words).len();
    let negative = matching(&lower, &vocab.negative_words).len();

    match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => Sentiment::Positive,
        std::cmp::Ordering::Less => Sentiment::Negative,
        std::cmp::Ordering::Equal => Sentiment::Neutral,
    }
}

/// Pull out question sentences, trimmed, in order, duplicates kept.
pub fn extract_questions(text: &str) -> Vec<String> {
    QUESTION_RE
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .filter(|q| !q.is_empty())
        .map(String::from)
        .collect()
}

/// A question counts as addressed when the response mentions any of its
/// words longer than three characters (punctuation included).
pub fn is_question_addressed(question: &str, response: &str) -> bool {
    let response_lower = response.to_lowercase();
    question
        .to_lowercase()
        .split_whitespace()
        .filter(|word| word.chars().count() > 3)
        .any(|word| response_lower.contains(word))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vocabulary {
        Vocabulary::default()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // ── grammar_spelling ────────────────────────────────────────────

    #[test]
    fn grammar_clean_draft_scores_full() {
        let result = check_grammar_spelling(&vocab(), "thanks for reaching out.");
        assert!(result.passed);
        assert_eq!(result.score, 1.0);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn grammar_score_drops_per_distinct_misspelling() {
        let tokens = ["teh", "recieve", "occured", "seperate", "definately"];
        for k in 1..=tokens.len() {
            let draft = tokens[..k].join(" and ");
            let result = check_grammar_spelling(&vocab(), &draft);
            assert!(!result.passed);
            assert!(approx(result.score, (1.0 - 0.2 * k as f64).max(0.0)), "k = {k}");
            assert_eq!(result.issues.len(), k);
        }
    }

    #[test]
    fn grammar_repeated_token_counts_once() {
        let result = check_grammar_spelling(&vocab(), "teh box and teh lid");
        assert!(approx(result.score, 0.8));
        assert_eq!(result.issues, vec!["Potential spelling error: teh"]);
    }

    #[test]
    fn grammar_matches_inside_words() {
        let result = check_grammar_spelling(&vocab(), "our office in tehran");
        assert!(!result.passed);
    }

    // ── sentiment / tone ────────────────────────────────────────────

    #[test]
    fn sentiment_counts_words_present() {
        let v = vocab();
        assert_eq!(analyze_sentiment(&v, "Great, thank you!"), Sentiment::Positive);
        assert_eq!(analyze_sentiment(&v, "This is TERRIBLE"), Sentiment::Negative);
        assert_eq!(analyze_sentiment(&v, "good but bad"), Sentiment::Neutral);
        assert_eq!(analyze_sentiment(&v, ""), Sentiment::Neutral);
    }

    #[test]
    fn sentiment_repeated_word_counts_once() {
        // "bad bad bad" is one negative hit against two positives.
        assert_eq!(
            analyze_sentiment(&vocab(), "bad bad bad, but good and great"),
            Sentiment::Positive
        );
    }

    #[test]
    fn tone_negative_email_positive_draft_rewarded() {
        let result = check_tone(&vocab(), "this is awful", "happy to help, great question");
        assert!(result.passed);
        assert!(approx(result.score, 0.9));
    }

    #[test]
    fn tone_positive_email_negative_draft_fails() {
        let result = check_tone(&vocab(), "great service", "terrible, awful");
        assert!(!result.passed);
        assert!(approx(result.score, 0.3));
        assert_eq!(result.issues, vec!["Response tone does not match email sentiment"]);
    }

    #[test]
    fn tone_other_combinations_neutral_score() {
        let v = vocab();
        for (body, draft) in [
            ("hello", "hello"),
            ("great", "great"),
            ("awful", "awful"),
            ("awful", "ok"),
            ("great", "ok"),
        ] {
            let result = check_tone(&v, body, draft);
            assert!(result.passed, "{body} / {draft}");
            assert!(approx(result.score, 0.8));
        }
    }

    // ── questions / completeness ────────────────────────────────────

    #[test]
    fn extract_questions_splits_on_terminators() {
        let questions =
            extract_questions("Is there a refund available? Also, when will it ship?");
        assert_eq!(
            questions,
            vec!["Is there a refund available?", "Also, when will it ship?"]
        );
    }

    #[test]
    fn extract_questions_skips_statements_and_keeps_duplicates() {
        let questions = extract_questions("I paid. Why? Really! Why?\n  ?");
        assert_eq!(questions, vec!["Why?", "Why?", "?"]);
    }

    #[test]
    fn extract_questions_none() {
        assert!(extract_questions("No questions here. Thanks!").is_empty());
        assert!(extract_questions("").is_empty());
    }

    #[test]
    fn addressed_requires_long_word_overlap() {
        assert!(is_question_addressed("When does it ship?", "We SHIP on Monday. Does that work"));
        assert!(!is_question_addressed("Can I pay?", "Yes you can pay"));
        // Trailing punctuation is part of the token.
        assert!(!is_question_addressed("Could it ship?", "it will ship soon"));
    }

    #[test]
    fn completeness_full_when_no_questions() {
        let result = check_completeness("Thanks, great service!", "anything");
        assert!(result.passed);
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn completeness_partial_fails() {
        let body = "When does the order arrive? Which carrier ships?";
        let result = check_completeness(body, "Your order arrives Tuesday");
        assert!(!result.passed);
        assert!(approx(result.score, 0.5));
        assert_eq!(result.issues, vec!["Not all questions addressed"]);
    }

    // ── brand / accuracy / professionalism / action ─────────────────

    #[test]
    fn brand_voice_violations() {
        let result = check_brand_voice(&vocab(), "this sounds robotic and overly formal");
        assert!(!result.passed);
        assert!(approx(result.score, 0.4));
        assert_eq!(result.issues.len(), 2);
    }

    #[test]
    fn accuracy_guarantee_needs_both_terms() {
        let v = vocab();
        assert!(check_accuracy(&v, "we guarantee delivery").passed);

        let result = check_accuracy(&v, "we guarantee our service with 24/7 support");
        assert!(!result.passed);
        assert_eq!(result.score, 0.0);
        assert_eq!(
            result.issues,
            vec![
                "Making service guarantees without authority",
                "Incorrect information about support hours"
            ]
        );
    }

    #[test]
    fn professionalism_requires_apostrophe_in_whats_up() {
        let result = check_professionalism(&vocab(), "lol hey guys whats up");
        assert!(!result.passed);
        assert!(approx(result.score, 0.4));
        assert_eq!(
            result.issues,
            vec!["Unprofessional phrase: lol", "Unprofessional phrase: hey guys"]
        );

        let result = check_professionalism(&vocab(), "what's up");
        assert!(!result.passed);
    }

    #[test]
    fn professionalism_score_floors_at_zero() {
        let result = check_professionalism(&vocab(), "lol omg hey guys what's up");
        assert_eq!(result.score, 0.0);
        assert_eq!(result.issues.len(), 4);
    }

    #[test]
    fn action_clarity_indicators() {
        let v = vocab();
        let result = check_action_clarity(&v, "next steps: reply to this email");
        assert!(result.passed);
        assert!(approx(result.score, 0.9));

        let result = check_action_clarity(&v, "thanks for writing");
        assert!(!result.passed);
        assert!(approx(result.score, 0.5));
        assert_eq!(result.issues, vec!["No clear action items"]);
    }

    #[test]
    fn run_checks_lowercases_draft() {
        let checks = run_checks(&vocab(), "hi", "LOL. PLEASE hold.");
        assert!(!checks.professionalism.passed);
        assert!(checks.action_clarity.passed);
    }

    #[test]
    fn alternate_vocabulary_changes_matches() {
        let mut v = vocab();
        v.brand_violations = vec!["synergy".into()];
        assert!(check_brand_voice(&v, "robotic").passed);
        assert!(!check_brand_voice(&v, "leverage synergy").passed);
    }
}
