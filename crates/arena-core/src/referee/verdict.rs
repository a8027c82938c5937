//! Strict parsing of the referee's verdict.
//!
//! The referee is asked for a JSON object, but models drift: code fences,
//! prose around the object, `"Agent A"` instead of `agent_a`, scores nested
//! under `scores`, `8.0`, `"8/10"`. All of that is accepted. When no JSON
//! object parses, a line-oriented text form is read instead:
//!
//! ```text
//! Agent A: correctness 8, clarity 7, usefulness 9
//! Agent B: correctness 9, clarity 9, usefulness 9
//! Winner: Agent B
//! ```
//!
//! Everything else is [`VerdictParse::Invalid`]: empty output, any of the six
//! scores missing or outside `0..=10`, or explicit choices that disagree.

use std::sync::LazyLock;

use arena_state::{AgentSlot, RefereeScores, ScoreCard, VerdictDecision};
use regex::Regex;
use serde_json::{Map, Value};

/// Keys (normalized) that carry the referee's explicit choice.
const CHOICE_KEYS: &[&str] = &[
    "chosenagent",
    "chosen",
    "choice",
    "winner",
    "preferred",
    "preferredagent",
    "verdict",
    "best",
    "betteranswer",
];

/// Keys (normalized) that carry the critique text.
const CRITIQUE_KEYS: &[&str] = &[
    "critique",
    "reasoning",
    "explanation",
    "rationale",
    "justification",
];

static AGENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bagent[\s_-]?([ab])\b").expect("AGENT_RE regex should compile")
});

static SCORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(correctness|clarity|usefulness)\b\s*[:=\-]?\s*(\d{1,3}(?:\.\d+)?)(?:\s*/\s*10\b)?",
    )
    .expect("SCORE_RE regex should compile")
});

static CHOICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^[\s*#>\-]*(?:final\s+)?(?:winner|chosen(?:[\s_-]agent)?|choice|preferred(?:[\s_-]agent)?|better\s+answer|best\s+answer|verdict)\**\s*[:=\-]\s*(.*)$",
    )
    .expect("CHOICE_RE regex should compile")
});

static CRITIQUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^[\s*#>\-]*(?:critique|reasoning|explanation|rationale|justification)\**\s*[:=\-]\s*(.+)$",
    )
    .expect("CRITIQUE_RE regex should compile")
});

/// A verdict that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedVerdict {
    pub scorecard: ScoreCard,
    pub chosen_agent: AgentSlot,
    pub decision: VerdictDecision,
    pub critique: String,
}

/// Outcome of [`parse_verdict`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerdictParse {
    Valid(ParsedVerdict),
    Invalid(String),
}

impl VerdictParse {
    pub fn is_valid(&self) -> bool {
        matches!(self, VerdictParse::Valid(_))
    }

    pub fn into_result(self) -> Result<ParsedVerdict, String> {
        match self {
            VerdictParse::Valid(v) => Ok(v),
            VerdictParse::Invalid(reason) => Err(reason),
        }
    }
}

/// Parse raw referee output.
pub fn parse_verdict(raw: &str) -> VerdictParse {
    let text = raw.trim();
    if text.is_empty() {
        return VerdictParse::Invalid("referee output is empty".to_string());
    }

    if let Some(object) = extract_json_object(text) {
        match collect_json(&object) {
            Ok(collected) if collected.has_scores() => return collected.finish(),
            Ok(_) => {}
            Err(reason) => return VerdictParse::Invalid(reason),
        }
    }

    match collect_text(text) {
        Ok(collected) if collected.has_scores() => collected.finish(),
        Ok(_) => VerdictParse::Invalid("no scores found in referee output".to_string()),
        Err(reason) => VerdictParse::Invalid(reason),
    }
}

/// Winner by score sum; equal sums go to Agent A.
pub fn fallback_choice(scorecard: &ScoreCard) -> AgentSlot {
    if scorecard.agent_b.total() > scorecard.agent_a.total() {
        AgentSlot::AgentB
    } else {
        AgentSlot::AgentA
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Criterion {
    Correctness,
    Clarity,
    Usefulness,
}

impl Criterion {
    const ALL: [Criterion; 3] = [
        Criterion::Correctness,
        Criterion::Clarity,
        Criterion::Usefulness,
    ];

    fn from_key(normalized: &str) -> Option<Self> {
        match normalized {
            "correctness" | "correct" | "accuracy" => Some(Criterion::Correctness),
            "clarity" | "clear" => Some(Criterion::Clarity),
            "usefulness" | "useful" | "helpfulness" => Some(Criterion::Usefulness),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Criterion::Correctness => "correctness",
            Criterion::Clarity => "clarity",
            Criterion::Usefulness => "usefulness",
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct PartialScores {
    correctness: Option<u8>,
    clarity: Option<u8>,
    usefulness: Option<u8>,
}

impl PartialScores {
    fn slot(&mut self, criterion: Criterion) -> &mut Option<u8> {
        match criterion {
            Criterion::Correctness => &mut self.correctness,
            Criterion::Clarity => &mut self.clarity,
            Criterion::Usefulness => &mut self.usefulness,
        }
    }

    fn is_empty(&self) -> bool {
        self.correctness.is_none() && self.clarity.is_none() && self.usefulness.is_none()
    }

    fn complete(mut self, agent: AgentSlot) -> Result<RefereeScores, String> {
        for criterion in Criterion::ALL {
            if self.slot(criterion).is_none() {
                return Err(format!("missing {} score for {agent}", criterion.as_str()));
            }
        }
        Ok(RefereeScores::new(
            self.correctness.unwrap_or_default(),
            self.clarity.unwrap_or_default(),
            self.usefulness.unwrap_or_default(),
        ))
    }
}

#[derive(Debug, Default)]
struct Collected {
    agent_a: PartialScores,
    agent_b: PartialScores,
    choices: Vec<AgentSlot>,
    critique: Option<String>,
}

impl Collected {
    fn scores_mut(&mut self, agent: AgentSlot) -> &mut PartialScores {
        match agent {
            AgentSlot::AgentA => &mut self.agent_a,
            AgentSlot::AgentB => &mut self.agent_b,
        }
    }

    fn set_score(
        &mut self,
        agent: AgentSlot,
        criterion: Criterion,
        value: u8,
    ) -> Result<(), String> {
        let slot = self.scores_mut(agent).slot(criterion);
        match *slot {
            Some(existing) if existing != value => Err(format!(
                "conflicting {} score for {agent}: {existing} and {value}",
                criterion.as_str()
            )),
            _ => {
                *slot = Some(value);
                Ok(())
            }
        }
    }

    fn set_critique(&mut self, text: &str) {
        let text = text.trim();
        if self.critique.is_none() && !text.is_empty() {
            self.critique = Some(text.to_string());
        }
    }

    fn has_scores(&self) -> bool {
        !self.agent_a.is_empty() || !self.agent_b.is_empty()
    }

    fn explicit_choice(&self) -> Result<Option<AgentSlot>, String> {
        let mut choice = None;
        for slot in &self.choices {
            match choice {
                None => choice = Some(*slot),
                Some(existing) if existing != *slot => {
                    return Err("referee named both agents as the winner".to_string());
                }
                Some(_) => {}
            }
        }
        Ok(choice)
    }

    fn finish(self) -> VerdictParse {
        let scorecard = match (
            self.agent_a.complete(AgentSlot::AgentA),
            self.agent_b.complete(AgentSlot::AgentB),
        ) {
            (Ok(agent_a), Ok(agent_b)) => ScoreCard { agent_a, agent_b },
            (Err(reason), _) | (_, Err(reason)) => return VerdictParse::Invalid(reason),
        };

        let (chosen_agent, decision) = match self.explicit_choice() {
            Ok(Some(slot)) => (slot, VerdictDecision::Explicit),
            Ok(None) => (fallback_choice(&scorecard), VerdictDecision::ScoreFallback),
            Err(reason) => return VerdictParse::Invalid(reason),
        };

        VerdictParse::Valid(ParsedVerdict {
            scorecard,
            chosen_agent,
            decision,
            critique: self.critique.unwrap_or_default(),
        })
    }
}

/// Lowercase ASCII alphanumerics only: `"Agent A"`, `agent_a`, `agentA` all become `agenta`.
fn normalize(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn slot_from_key(normalized: &str) -> Option<AgentSlot> {
    match normalized {
        "agenta" | "a" | "answera" => Some(AgentSlot::AgentA),
        "agentb" | "b" | "answerb" => Some(AgentSlot::AgentB),
        _ => None,
    }
}

fn slot_from_letter(letter: &str) -> Option<AgentSlot> {
    match letter {
        "a" | "A" => Some(AgentSlot::AgentA),
        "b" | "B" => Some(AgentSlot::AgentB),
        _ => None,
    }
}

/// Choice value such as `"agent_b"`, `"**B**."`, or `"Agent B is better"`.
///
/// A bare letter only counts when it is the whole value; inside a sentence
/// the agent must be named as `Agent X`. Values naming both agents are `None`.
fn slot_from_text(value: &str) -> Option<AgentSlot> {
    if let Some(slot) = slot_from_key(&normalize(value)) {
        return Some(slot);
    }
    let mut found = None;
    for cap in AGENT_RE.captures_iter(value) {
        let slot = slot_from_letter(&cap[1])?;
        match found {
            None => found = Some(slot),
            Some(existing) if existing != slot => return None,
            Some(_) => {}
        }
    }
    found
}

fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn collect_json(object: &Map<String, Value>) -> Result<Collected, String> {
    let mut collected = Collected::default();

    collect_json_agents(object, &mut collected)?;
    for (key, value) in object {
        let key = normalize(key);
        if key == "scores" {
            if let Value::Object(nested) = value {
                collect_json_agents(nested, &mut collected)?;
            }
        } else if CHOICE_KEYS.contains(&key.as_str()) {
            if let Some(slot) = value.as_str().and_then(slot_from_text) {
                collected.choices.push(slot);
            }
        } else if CRITIQUE_KEYS.contains(&key.as_str()) {
            if let Some(text) = value.as_str() {
                collected.set_critique(text);
            }
        }
    }

    Ok(collected)
}

fn collect_json_agents(map: &Map<String, Value>, collected: &mut Collected) -> Result<(), String> {
    for (key, value) in map {
        let Some(agent) = slot_from_key(&normalize(key)) else {
            continue;
        };
        let Value::Object(scores) = value else {
            continue;
        };
        collect_json_scores(agent, scores, collected)?;
        if let Some(Value::Object(nested)) = scores.get("scores") {
            collect_json_scores(agent, nested, collected)?;
        }
    }
    Ok(())
}

fn collect_json_scores(
    agent: AgentSlot,
    scores: &Map<String, Value>,
    collected: &mut Collected,
) -> Result<(), String> {
    for (key, value) in scores {
        if let Some(criterion) = Criterion::from_key(&normalize(key)) {
            let score = json_score(value)
                .map_err(|e| format!("{agent} {} score {e}", criterion.as_str()))?;
            collected.set_score(agent, criterion, score)?;
        }
    }
    Ok(())
}

fn json_score(value: &Value) -> Result<u8, String> {
    let number = match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| format!("{n} is not a number"))?,
        Value::String(s) => text_score(s)?,
        other => return Err(format!("{other} is not a number")),
    };
    to_score(number)
}

/// `"8"`, `"8.0"`, `"8/10"`.
fn text_score(text: &str) -> Result<f64, String> {
    let text = text.trim();
    let numerator = match text.split_once('/') {
        Some((num, denom)) if denom.trim() == "10" => num.trim(),
        Some(_) => return Err(format!("'{text}' is not out of 10")),
        None => text,
    };
    numerator
        .parse::<f64>()
        .map_err(|_| format!("'{text}' is not a number"))
}

fn to_score(value: f64) -> Result<u8, String> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(format!("{value} is not a whole number"));
    }
    if !(0.0..=f64::from(RefereeScores::MAX)).contains(&value) {
        return Err(format!("{value} is outside 0..=10"));
    }
    Ok(value as u8)
}

fn collect_text(text: &str) -> Result<Collected, String> {
    let mut collected = Collected::default();
    let mut current: Option<AgentSlot> = None;

    for line in text.lines() {
        if let Some(cap) = CHOICE_RE.captures(line) {
            // "a tie", "A and B are equal": no explicit choice.
            if let Some(slot) = slot_from_text(&cap[1]) {
                collected.choices.push(slot);
            }
            continue;
        }
        if let Some(cap) = CRITIQUE_RE.captures(line) {
            collected.set_critique(&cap[1]);
            continue;
        }

        // Agent mentions on this line, by position, so "Agent A: ... Agent B: ..."
        // attributes each score to the nearest preceding mention.
        let mentions: Vec<(usize, AgentSlot)> = AGENT_RE
            .captures_iter(line)
            .filter_map(|cap| {
                let start = cap.get(0)?.start();
                Some((start, slot_from_letter(&cap[1])?))
            })
            .collect();

        for cap in SCORE_RE.captures_iter(line) {
            let Some(whole) = cap.get(0) else {
                continue;
            };
            let agent = mentions
                .iter()
                .rev()
                .find(|(pos, _)| *pos < whole.start())
                .map(|(_, slot)| *slot)
                .or(current);
            let Some(agent) = agent else {
                continue;
            };
            let Some(criterion) = Criterion::from_key(&cap[1].to_ascii_lowercase()) else {
                continue;
            };
            let score = text_score(&cap[2])
                .and_then(to_score)
                .map_err(|e| format!("{agent} {} score {e}", criterion.as_str()))?;
            collected.set_score(agent, criterion, score)?;
        }

        if let Some((_, slot)) = mentions.last() {
            current = Some(*slot);
        }
    }

    Ok(collected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid(raw: &str) -> ParsedVerdict {
        match parse_verdict(raw) {
            VerdictParse::Valid(v) => v,
            VerdictParse::Invalid(reason) => panic!("expected valid verdict, got: {reason}"),
        }
    }

    fn invalid(raw: &str) -> String {
        match parse_verdict(raw) {
            VerdictParse::Valid(v) => panic!("expected invalid verdict, got: {v:?}"),
            VerdictParse::Invalid(reason) => reason,
        }
    }

    const CANONICAL: &str = r#"{
        "agent_a": {"correctness": 10, "clarity": 8, "usefulness": 7},
        "agent_b": {"correctness": 10, "clarity": 9, "usefulness": 7},
        "chosen_agent": "agent_b",
        "critique": "Both are correct; B is clearer."
    }"#;

    #[test]
    fn canonical_json() {
        let v = valid(CANONICAL);
        assert_eq!(v.chosen_agent, AgentSlot::AgentB);
        assert_eq!(v.decision, VerdictDecision::Explicit);
        assert_eq!(v.scorecard.agent_a, RefereeScores::new(10, 8, 7));
        assert_eq!(v.scorecard.agent_b, RefereeScores::new(10, 9, 7));
        assert_eq!(v.critique, "Both are correct; B is clearer.");
    }

    #[test]
    fn code_fence_and_prose_are_tolerated() {
        let raw = format!("Here is my evaluation:\n```json\n{CANONICAL}\n```\nThanks!");
        assert_eq!(valid(&raw).chosen_agent, AgentSlot::AgentB);
    }

    #[test]
    fn key_variants_and_nested_scores() {
        let raw = r#"{
            "Scores": {
                "Agent A": {"Correctness": 6, "Clarity": 6, "Usefulness": 6},
                "B": {"correctness": 9, "clarity": 9, "usefulness": 9}
            },
            "Winner": "Agent B",
            "Reasoning": "B is complete."
        }"#;
        let v = valid(raw);
        assert_eq!(v.chosen_agent, AgentSlot::AgentB);
        assert_eq!(v.scorecard.agent_b.total(), 27);
        assert_eq!(v.critique, "B is complete.");
    }

    #[test]
    fn numeric_forms_are_accepted() {
        let raw = r#"{
            "agent_a": {"correctness": 8.0, "clarity": "7", "usefulness": "9/10"},
            "agent_b": {"correctness": 5, "clarity": 5, "usefulness": 5},
            "chosen_agent": "A"
        }"#;
        let v = valid(raw);
        assert_eq!(v.scorecard.agent_a, RefereeScores::new(8, 7, 9));
        assert_eq!(v.chosen_agent, AgentSlot::AgentA);
    }

    #[test]
    fn fractional_score_is_rejected() {
        let raw = CANONICAL.replace("\"clarity\": 8", "\"clarity\": 8.5");
        assert!(invalid(&raw).contains("clarity"));
    }

    #[test]
    fn out_of_range_score_is_rejected() {
        let raw = CANONICAL.replace("\"usefulness\": 7,", "\"usefulness\": 11,");
        let raw = raw.replacen("\"usefulness\": 7}", "\"usefulness\": 11}", 1);
        let reason = invalid(&raw);
        assert!(reason.contains("outside"), "{reason}");
    }

    #[test]
    fn negative_score_is_rejected() {
        let raw = CANONICAL.replacen("\"correctness\": 10", "\"correctness\": -1", 1);
        assert!(invalid(&raw).contains("correctness"));
    }

    #[test]
    fn missing_score_is_rejected() {
        let raw = r#"{
            "agent_a": {"correctness": 8, "clarity": 7, "usefulness": 9},
            "agent_b": {"correctness": 8, "usefulness": 9},
            "chosen_agent": "agent_a"
        }"#;
        let reason = invalid(raw);
        assert!(reason.contains("clarity"));
        assert!(reason.contains("agent_b"));
    }

    #[test]
    fn empty_output_is_rejected() {
        assert!(invalid("   \n ").contains("empty"));
    }

    #[test]
    fn prose_without_scores_is_rejected() {
        assert!(!parse_verdict("I think both answers are fine.").is_valid());
    }

    #[test]
    fn conflicting_choices_are_rejected() {
        let raw = r#"{
            "agent_a": {"correctness": 8, "clarity": 7, "usefulness": 9},
            "agent_b": {"correctness": 8, "clarity": 7, "usefulness": 9},
            "chosen_agent": "agent_a",
            "winner": "agent_b"
        }"#;
        assert!(invalid(raw).contains("both agents"));
    }

    #[test]
    fn explicit_choice_beats_scores() {
        let raw = r#"{
            "agent_a": {"correctness": 10, "clarity": 10, "usefulness": 10},
            "agent_b": {"correctness": 1, "clarity": 1, "usefulness": 1},
            "chosen_agent": "agent_b"
        }"#;
        let v = valid(raw);
        assert_eq!(v.chosen_agent, AgentSlot::AgentB);
        assert_eq!(v.decision, VerdictDecision::Explicit);
    }

    #[test]
    fn missing_choice_uses_higher_sum() {
        let raw = r#"{
            "agent_a": {"correctness": 5, "clarity": 5, "usefulness": 5},
            "agent_b": {"correctness": 6, "clarity": 5, "usefulness": 5}
        }"#;
        let v = valid(raw);
        assert_eq!(v.chosen_agent, AgentSlot::AgentB);
        assert_eq!(v.decision, VerdictDecision::ScoreFallback);
    }

    #[test]
    fn tie_goes_to_agent_a() {
        let raw = r#"{
            "agent_a": {"correctness": 7, "clarity": 7, "usefulness": 7},
            "agent_b": {"correctness": 9, "clarity": 6, "usefulness": 6},
            "chosen_agent": "tie"
        }"#;
        for _ in 0..3 {
            let v = valid(raw);
            assert_eq!(v.chosen_agent, AgentSlot::AgentA);
            assert_eq!(v.decision, VerdictDecision::ScoreFallback);
        }
    }

    #[test]
    fn text_form_with_winner_line() {
        let raw = "Agent A: correctness 8, clarity 7, usefulness 9\n\
                   Agent B: correctness 9, clarity 9, usefulness 9\n\
                   Winner: Agent B\n\
                   Critique: B explains the steps.";
        let v = valid(raw);
        assert_eq!(v.chosen_agent, AgentSlot::AgentB);
        assert_eq!(v.decision, VerdictDecision::Explicit);
        assert_eq!(v.scorecard.agent_a, RefereeScores::new(8, 7, 9));
        assert_eq!(v.critique, "B explains the steps.");
    }

    #[test]
    fn text_form_with_headings_and_markdown() {
        let raw = "### Agent A\n\
                   - Correctness: 6/10\n\
                   - Clarity: 7/10\n\
                   - Usefulness: 6/10\n\
                   ### Agent B\n\
                   - Correctness: 6/10\n\
                   - Clarity: 7/10\n\
                   - Usefulness: 6/10\n\
                   **Winner:** A";
        let v = valid(raw);
        assert_eq!(v.chosen_agent, AgentSlot::AgentA);
        assert_eq!(v.scorecard.agent_b, RefereeScores::new(6, 7, 6));
    }

    #[test]
    fn text_form_both_agents_on_one_line() {
        let raw = "Agent A correctness 4 clarity 4 usefulness 4; Agent B correctness 9 clarity 8 usefulness 9";
        let v = valid(raw);
        assert_eq!(v.scorecard.agent_a, RefereeScores::new(4, 4, 4));
        assert_eq!(v.scorecard.agent_b, RefereeScores::new(9, 8, 9));
        assert_eq!(v.chosen_agent, AgentSlot::AgentB);
        assert_eq!(v.decision, VerdictDecision::ScoreFallback);
    }

    #[test]
    fn text_form_out_of_range_is_rejected() {
        let raw = "Agent A: correctness 80, clarity 7, usefulness 9\n\
                   Agent B: correctness 9, clarity 9, usefulness 9";
        assert!(invalid(raw).contains("correctness"));
    }

    #[test]
    fn broken_json_falls_back_to_text() {
        let raw = "{ this is not json }\n\
                   Agent A: correctness 8, clarity 8, usefulness 8\n\
                   Agent B: correctness 8, clarity 8, usefulness 8";
        let v = valid(raw);
        assert_eq!(v.chosen_agent, AgentSlot::AgentA);
    }

    #[test]
    fn text_choice_naming_no_agent_falls_back_to_scores() {
        for choice in [
            "Verdict: a tie on intent, but B is more complete",
            "Winner: a tie",
            "Verdict: A and B are equal",
            "Winner: B is better",
        ] {
            let raw = format!(
                "Agent A: correctness 5, clarity 5, usefulness 5\n\
                 Agent B: correctness 9, clarity 9, usefulness 9\n\
                 {choice}"
            );
            let v = valid(&raw);
            assert_eq!(v.chosen_agent, AgentSlot::AgentB, "{choice}");
            assert_eq!(v.decision, VerdictDecision::ScoreFallback, "{choice}");
        }
    }

    #[test]
    fn text_choice_bare_letter_with_punctuation() {
        let raw = "Agent A: correctness 9, clarity 9, usefulness 9\n\
                   Agent B: correctness 5, clarity 5, usefulness 5\n\
                   Winner: **B**.";
        let v = valid(raw);
        assert_eq!(v.chosen_agent, AgentSlot::AgentB);
        assert_eq!(v.decision, VerdictDecision::Explicit);
    }

    #[test]
    fn conflicting_scores_are_rejected() {
        let raw = r#"{
            "agent_a": {"correctness": 2, "clarity": 2, "usefulness": 2},
            "agent_b": {"correctness": 9, "clarity": 9, "usefulness": 9},
            "scores": {"agent_a": {"correctness": 10, "clarity": 10, "usefulness": 10}}
        }"#;
        let reason = invalid(raw);
        assert!(reason.contains("conflicting"), "{reason}");
        assert!(reason.contains("agent_a"), "{reason}");
    }

    #[test]
    fn repeated_identical_scores_are_accepted() {
        let raw = r#"{
            "agent_a": {"correctness": 6, "clarity": 6, "usefulness": 6},
            "agent_b": {"correctness": 9, "clarity": 9, "usefulness": 9},
            "scores": {"agent_b": {"correctness": 9}}
        }"#;
        assert_eq!(valid(raw).scorecard.agent_b, RefereeScores::new(9, 9, 9));
    }

    #[test]
    fn text_form_conflicting_scores_are_rejected() {
        let raw = "Agent A: correctness 8, clarity 7, usefulness 9\n\
                   Agent A: correctness 3\n\
                   Agent B: correctness 9, clarity 9, usefulness 9";
        assert!(invalid(raw).contains("conflicting correctness score for agent_a"));
    }

    #[test]
    fn choice_text_with_sentence() {
        assert_eq!(slot_from_text("Agent B is better"), Some(AgentSlot::AgentB));
        assert_eq!(slot_from_text("agent_a"), Some(AgentSlot::AgentA));
        assert_eq!(slot_from_text("Agent A and Agent B tie"), None);
        assert_eq!(slot_from_text("neither"), None);
    }
}
