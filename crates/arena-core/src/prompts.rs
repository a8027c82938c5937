//! Prompt builders for the three pipeline roles.

use arena_state::{AgentResult, AgentSlot};

use crate::client::Prompt;

const AGENT_SYSTEM: &str = "You are a helpful assistant. Answer the user's question \
accurately and concisely. Give the answer first, then a short explanation if useful.";

const REFEREE_SYSTEM: &str = "You are an impartial referee comparing two answers to the \
same question. Judge only correctness, clarity and usefulness. Do not favor an answer \
because of its position or its length.";

const ENHANCER_SYSTEM: &str = "You polish answers. Improve wording, structure and clarity \
of the answer you are given. Do not add new facts, claims or examples that are not \
already present. Reply with the improved answer only.";

/// Prompt sent to both agents.
pub fn agent_prompt(question: &str) -> Prompt {
    Prompt::user(question).with_system(AGENT_SYSTEM)
}

/// Evaluation prompt. Agent A is always listed before Agent B.
pub fn referee_prompt(question: &str, agent_a: &AgentResult, agent_b: &AgentResult) -> Prompt {
    let mut user = String::new();
    user.push_str("Question:\n");
    user.push_str(question);
    user.push_str("\n\n");
    for (slot, result) in AgentSlot::ALL.iter().zip([agent_a, agent_b]) {
        user.push_str(&format!("{}'s answer:\n{}\n\n", slot.label(), result.answer));
    }
    user.push_str(
        "Score each answer from 0 to 10 for correctness, clarity and usefulness, \
         then choose the better answer.\n\
         Respond with a single JSON object and nothing else, in this shape:\n\
         {\"agent_a\": {\"correctness\": 0, \"clarity\": 0, \"usefulness\": 0}, \
         \"agent_b\": {\"correctness\": 0, \"clarity\": 0, \"usefulness\": 0}, \
         \"chosen_agent\": \"agent_a\" or \"agent_b\", \
         \"critique\": \"one or two sentences\"}",
    );
    Prompt::user(user).with_system(REFEREE_SYSTEM)
}

/// Refinement prompt for the chosen answer.
pub fn enhancer_prompt(question: &str, chosen_answer: &str, critique: &str) -> Prompt {
    let mut user = format!("Question:\n{question}\n\nAnswer to improve:\n{chosen_answer}\n");
    if !critique.trim().is_empty() {
        user.push_str(&format!("\nReviewer notes:\n{critique}\n"));
    }
    user.push_str("\nRewrite the answer so it is clear and well structured, without new facts.");
    Prompt::user(user).with_system(ENHANCER_SYSTEM)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(answer: &str) -> AgentResult {
        AgentResult {
            model: "m".to_string(),
            answer: answer.to_string(),
            reasoning: answer.to_string(),
            raw_output: answer.to_string(),
        }
    }

    #[test]
    fn referee_prompt_lists_agent_a_first() {
        let prompt = referee_prompt("q", &result("zzz second"), &result("aaa first"));
        let a = prompt.user.find("Agent A's answer").unwrap();
        let b = prompt.user.find("Agent B's answer").unwrap();
        assert!(a < b);
        // Order follows slots, not content.
        assert!(prompt.user.find("zzz second").unwrap() < prompt.user.find("aaa first").unwrap());
    }

    #[test]
    fn referee_prompt_requests_json() {
        let prompt = referee_prompt("q", &result("a"), &result("b"));
        assert!(prompt.user.contains("JSON"));
        assert!(prompt.system.is_some());
    }

    #[test]
    fn enhancer_prompt_skips_empty_critique() {
        let prompt = enhancer_prompt("q", "4", "  ");
        assert!(!prompt.user.contains("Reviewer notes"));
        assert!(prompt.user.contains("4"));
    }
}
