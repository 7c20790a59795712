use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::judge::Verdict;
use crate::message::Message;
use crate::topic::{Preferences, Topic, TopicId};

/// What the judge step concluded for one topic, as written to the results file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JudgeDecision {
    #[serde(rename = "Full History")]
    FullHistory,
    #[serde(rename = "Summarized History")]
    SummarizedHistory,
    /// The judge answered without a usable letter.
    #[serde(rename = "No Verdict")]
    NoVerdict,
    /// At least one scenario answer is missing, so the judge was never asked.
    #[serde(rename = "Skipped (Responses Failed)")]
    Skipped,
}

impl JudgeDecision {
    pub fn from_verdict(verdict: Option<Verdict>) -> Self {
        match verdict {
            Some(Verdict::A) => Self::FullHistory,
            Some(Verdict::B) => Self::SummarizedHistory,
            None => Self::NoVerdict,
        }
    }

    pub fn outcome(self) -> Outcome {
        match self {
            Self::FullHistory => Outcome::FullHistory,
            Self::SummarizedHistory => Outcome::SummarizedHistory,
            Self::NoVerdict | Self::Skipped => Outcome::Tie,
        }
    }
}

impl fmt::Display for JudgeDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FullHistory => write!(f, "Full History"),
            Self::SummarizedHistory => write!(f, "Summarized History"),
            Self::NoVerdict => write!(f, "No Verdict"),
            Self::Skipped => write!(f, "Skipped (Responses Failed)"),
        }
    }
}

/// Tally bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    FullHistory,
    SummarizedHistory,
    Tie,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FullHistory => write!(f, "Full History"),
            Self::SummarizedHistory => write!(f, "Summarized History"),
            Self::Tie => write!(f, "Tie"),
        }
    }
}

/// Per-topic result. Built up stage by stage, then frozen into the results list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentRecord {
    pub topic_id: TopicId,
    pub topic_name: String,
    pub preferences: Preferences,
    pub initial_user_prompt: String,
    pub full_chat_history: Vec<Message>,
    pub summarization_prompt: String,
    pub generated_summary: Option<String>,
    pub follow_up_question: Option<String>,
    pub ai_response_full_history: Option<String>,
    pub ai_response_summarized_history: Option<String>,
    pub llm_judge_decision: Option<JudgeDecision>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ExperimentRecord {
    pub fn new(topic: &Topic, summarization_prompt: &str) -> Self {
        Self {
            topic_id: topic.id.clone(),
            topic_name: topic.name.clone(),
            preferences: topic.preferences.clone(),
            initial_user_prompt: topic.initial_user_prompt.clone(),
            full_chat_history: Vec::new(),
            summarization_prompt: summarization_prompt.to_string(),
            generated_summary: None,
            follow_up_question: None,
            ai_response_full_history: None,
            ai_response_summarized_history: None,
            llm_judge_decision: None,
            completed_at: None,
        }
    }

    /// Stamp the decision and completion time. Returns the tally bucket.
    pub fn finalize(&mut self, decision: JudgeDecision) -> Outcome {
        self.llm_judge_decision = Some(decision);
        self.completed_at = Some(Utc::now());
        decision.outcome()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WinRates {
    pub full_history: f64,
    pub summarized_history: f64,
    pub tie: f64,
}

/// Win/tie counts over recorded topics. Abandoned topics never reach it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinTally {
    #[serde(rename = "Full History")]
    pub full_history: usize,
    #[serde(rename = "Summarized History")]
    pub summarized_history: usize,
    #[serde(rename = "Tie")]
    pub tie: usize,
}

impl WinTally {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::FullHistory => self.full_history += 1,
            Outcome::SummarizedHistory => self.summarized_history += 1,
            Outcome::Tie => self.tie += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.full_history + self.summarized_history + self.tie
    }

    /// Percentages over the recorded total; all zero when nothing was recorded.
    pub fn rates(&self) -> WinRates {
        let total = self.total();
        if total == 0 {
            return WinRates::default();
        }
        let pct = |n: usize| (n as f64 / total as f64) * 100.0;
        WinRates {
            full_history: pct(self.full_history),
            summarized_history: pct(self.summarized_history),
            tie: pct(self.tie),
        }
    }

    /// Rebuild a tally from saved records. Records without a decision are ignored.
    pub fn from_records(records: &[ExperimentRecord]) -> Self {
        let mut tally = Self::default();
        for decision in records.iter().filter_map(|r| r.llm_judge_decision) {
            tally.record(decision.outcome());
        }
        tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topic::{ContentPreferences, StylisticPreferences};

    fn topic() -> Topic {
        Topic {
            id: TopicId::Number(1),
            name: "Hiking".into(),
            preferences: Preferences {
                content: ContentPreferences {
                    focus: "trail difficulty".into(),
                    dislikes_statement: "gear ads".into(),
                },
                stylistic: StylisticPreferences {
                    tone: "casual".into(),
                    format: "bullets".into(),
                },
            },
            initial_user_prompt: "Tell me about hiking trails".into(),
        }
    }

    #[test]
    fn test_decision_from_verdict() {
        assert_eq!(
            JudgeDecision::from_verdict(Some(Verdict::A)),
            JudgeDecision::FullHistory
        );
        assert_eq!(
            JudgeDecision::from_verdict(Some(Verdict::B)),
            JudgeDecision::SummarizedHistory
        );
        assert_eq!(JudgeDecision::from_verdict(None), JudgeDecision::NoVerdict);
        assert_eq!(JudgeDecision::NoVerdict.outcome(), Outcome::Tie);
        assert_eq!(JudgeDecision::Skipped.outcome(), Outcome::Tie);
    }

    #[test]
    fn test_decision_labels() {
        let json = serde_json::to_string(&JudgeDecision::Skipped).unwrap();
        assert_eq!(json, "\"Skipped (Responses Failed)\"");
        assert_eq!(JudgeDecision::FullHistory.to_string(), "Full History");
    }

    #[test]
    fn test_rates_zero_when_empty() {
        assert_eq!(WinTally::default().rates(), WinRates::default());
    }

    #[test]
    fn test_rates_sum_to_hundred() {
        let mut tally = WinTally::default();
        tally.record(Outcome::FullHistory);
        tally.record(Outcome::FullHistory);
        tally.record(Outcome::SummarizedHistory);
        tally.record(Outcome::Tie);
        tally.record(Outcome::Tie);
        tally.record(Outcome::Tie);
        let r = tally.rates();
        assert!((r.full_history + r.summarized_history + r.tie - 100.0).abs() < 1e-9);
        assert!((r.full_history - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_tally_serializes_with_labels() {
        let mut tally = WinTally::default();
        tally.record(Outcome::SummarizedHistory);
        let json = serde_json::to_string(&tally).unwrap();
        assert_eq!(json, r#"{"Full History":0,"Summarized History":1,"Tie":0}"#);
    }

    #[test]
    fn test_record_roundtrip_and_retally() {
        let mut full = ExperimentRecord::new(&topic(), "summarize");
        full.full_chat_history.push(Message::user("Tell me about hiking trails"));
        assert_eq!(full.finalize(JudgeDecision::FullHistory), Outcome::FullHistory);
        assert!(full.completed_at.is_some());

        let mut skipped = ExperimentRecord::new(&topic(), "summarize");
        skipped.finalize(JudgeDecision::Skipped);
        let pending = ExperimentRecord::new(&topic(), "summarize");

        let json = serde_json::to_string(&vec![full, skipped, pending]).unwrap();
        let back: Vec<ExperimentRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(back[0].full_chat_history.len(), 1);

        let tally = WinTally::from_records(&back);
        assert_eq!(tally.full_history, 1);
        assert_eq!(tally.tie, 1);
        assert_eq!(tally.total(), 2);
    }

    #[test]
    fn test_new_record_copies_topic() {
        let record = ExperimentRecord::new(&topic(), "summarize");
        assert_eq!(record.topic_name, "Hiking");
        assert_eq!(record.initial_user_prompt, "Tell me about hiking trails");
        assert!(record.llm_judge_decision.is_none());
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("completed_at").is_none());
        assert!(json["generated_summary"].is_null());
    }
}
