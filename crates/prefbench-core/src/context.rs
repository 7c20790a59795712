//! Context-window trimming against an approximate token budget.
//!
//! The leading system message is pinned; everything after it is evicted
//! oldest-first until the estimated total fits. A lone system message that
//! exceeds the budget on its own is returned as-is.

use crate::message::Message;

/// Estimates how many tokens a piece of text costs.
pub trait TokenEstimator {
    fn estimate(&self, text: &str) -> usize;
}

/// Fixed characters-per-token ratio. Not a tokenizer.
#[derive(Debug, Clone, Copy)]
pub struct CharRatio {
    pub chars_per_token: usize,
}

impl Default for CharRatio {
    fn default() -> Self {
        Self { chars_per_token: 4 }
    }
}

impl TokenEstimator for CharRatio {
    fn estimate(&self, text: &str) -> usize {
        text.chars().count().div_ceil(self.chars_per_token.max(1))
    }
}

/// Estimated token cost of a text with the default ratio.
pub fn estimated_tokens(text: &str) -> usize {
    CharRatio::default().estimate(text)
}

/// Estimated token cost of a whole history.
pub fn total_tokens(messages: &[Message], estimator: &dyn TokenEstimator) -> usize {
    messages.iter().map(|m| estimator.estimate(&m.content)).sum()
}

/// Trim with the default 4-chars-per-token heuristic.
pub fn trim_to_budget(messages: &[Message], budget: usize) -> Vec<Message> {
    trim_with(messages, budget, &CharRatio::default())
}

pub fn trim_with(
    messages: &[Message],
    budget: usize,
    estimator: &dyn TokenEstimator,
) -> Vec<Message> {
    let (pinned, rest) = match messages.split_first() {
        Some((first, rest)) if first.is_system() => (Some(first), rest),
        _ => (None, messages),
    };

    let mut current = total_tokens(messages, estimator);
    let mut start = 0;
    while current > budget && start < rest.len() {
        current -= estimator.estimate(&rest[start].content);
        start += 1;
    }

    pinned
        .into_iter()
        .chain(rest[start..].iter())
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(tokens: usize) -> String {
        "x".repeat(tokens * 4)
    }

    fn history() -> Vec<Message> {
        vec![
            Message::system(text(10)),
            Message::user(text(20)),
            Message::assistant(text(30)),
            Message::user(text(40)),
        ]
    }

    #[test]
    fn test_estimated_tokens_rounds_up() {
        assert_eq!(estimated_tokens(""), 0);
        assert_eq!(estimated_tokens("abcd"), 1);
        assert_eq!(estimated_tokens("abcde"), 2);
        // chars, not bytes
        assert_eq!(estimated_tokens("éééé"), 1);
    }

    #[test]
    fn test_no_op_within_budget() {
        let messages = history();
        assert_eq!(trim_to_budget(&messages, 100), messages);
        assert_eq!(trim_to_budget(&messages, 1000), messages);
    }

    #[test]
    fn test_evicts_oldest_non_system_first() {
        let trimmed = trim_to_budget(&history(), 85);
        assert_eq!(trimmed.len(), 3);
        assert!(trimmed[0].is_system());
        assert_eq!(trimmed[1].content, text(30));
        assert_eq!(trimmed[2].content, text(40));
    }

    #[test]
    fn test_keeps_system_when_everything_else_evicted() {
        let trimmed = trim_to_budget(&history(), 5);
        assert_eq!(trimmed, vec![Message::system(text(10))]);
    }

    #[test]
    fn test_system_pinned_for_every_budget() {
        let messages = history();
        for budget in 0..=110 {
            let trimmed = trim_to_budget(&messages, budget);
            assert_eq!(trimmed[0], messages[0], "budget {budget}");
            let total = total_tokens(&trimmed, &CharRatio::default());
            assert!(total <= budget || trimmed.len() == 1, "budget {budget}");
        }
    }

    #[test]
    fn test_idempotent() {
        let messages = history();
        for budget in [0, 5, 45, 85, 95, 100, 500] {
            let once = trim_to_budget(&messages, budget);
            let twice = trim_to_budget(&once, budget);
            assert_eq!(once, twice, "budget {budget}");
        }
    }

    #[test]
    fn test_without_system_message_can_empty() {
        let messages = vec![Message::user(text(10)), Message::assistant(text(10))];
        assert!(trim_to_budget(&messages, 5).is_empty());
        assert_eq!(trim_to_budget(&messages, 10).len(), 1);
    }

    #[test]
    fn test_non_leading_system_is_not_pinned() {
        let messages = vec![Message::user(text(10)), Message::system(text(10))];
        assert_eq!(
            trim_to_budget(&messages, 10),
            vec![Message::system(text(10))]
        );
        assert!(trim_to_budget(&messages, 5).is_empty());
    }

    #[test]
    fn test_empty_history() {
        assert!(trim_to_budget(&[], 10).is_empty());
    }

    #[test]
    fn test_custom_estimator() {
        struct PerMessage;
        impl TokenEstimator for PerMessage {
            fn estimate(&self, _text: &str) -> usize {
                1
            }
        }
        let trimmed = trim_with(&history(), 2, &PerMessage);
        assert_eq!(trimmed.len(), 2);
        assert_eq!(trimmed[1].content, text(40));
    }
}
