//! Full-history vs summarized-history experiment driver.
//!
//! Per topic: simulate N turns between the target assistant and a simulated
//! user, ask the simulated user for a probe question, answer it twice in
//! fresh conversations (once with the whole transcript, once with only a
//! summary), then let the simulated user judge the two answers.
//!
//! A topic either lands in the results with exactly one tally increment or
//! is abandoned and leaves no trace in the statistics.

use std::fmt;
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use prefbench_core::{
    parse_verdict, trim_to_budget, ChatModel, CompletionRequest, ExperimentRecord, JudgeDecision,
    Message, Outcome, Topic, WinTally,
};

use crate::config::Config;
use crate::prompts;
use crate::report::preview;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbandonReason {
    /// The target model failed on every turn.
    NoSuccessfulTurns,
    /// The simulated user produced no probe question.
    ProbeFailed,
}

impl fmt::Display for AbandonReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSuccessfulTurns => write!(f, "all target turns failed"),
            Self::ProbeFailed => write!(f, "probe question generation failed"),
        }
    }
}

#[derive(Debug)]
pub enum TopicRun {
    Recorded {
        record: Box<ExperimentRecord>,
        outcome: Outcome,
    },
    Abandoned(AbandonReason),
}

/// Both sides of a simulated dialogue after N turns.
#[derive(Debug, Default)]
pub struct Dialogue {
    /// What was actually said, starting with the initial user prompt.
    pub transcript: Vec<Message>,
    /// History as seen by the target assistant (with its system prompt).
    pub target_history: Vec<Message>,
    /// History as seen by the simulated user (with its system prompt).
    pub user_history: Vec<Message>,
    pub successful_turns: usize,
}

#[derive(Debug, Default)]
pub struct ExperimentSummary {
    pub results: Vec<ExperimentRecord>,
    pub tally: WinTally,
    pub abandoned: usize,
}

pub struct Experiment<'a, M: ChatModel + ?Sized> {
    model: &'a M,
    config: &'a Config,
}

impl<'a, M: ChatModel + ?Sized> Experiment<'a, M> {
    pub fn new(model: &'a M, config: &'a Config) -> Self {
        Self { model, config }
    }

    /// Process every topic in order. Abandoned topics are counted, not recorded.
    pub fn run(&self, topics: &[Topic]) -> ExperimentSummary {
        let mut summary = ExperimentSummary::default();

        for (i, topic) in topics.iter().enumerate() {
            info!(
                "=== topic {}/{}: {} ===",
                i + 1,
                topics.len(),
                topic.name
            );
            match self.run_topic(topic) {
                TopicRun::Recorded { record, outcome } => {
                    info!("judge decision for {}: {outcome}", topic.name);
                    summary.tally.record(outcome);
                    summary.results.push(*record);
                }
                TopicRun::Abandoned(reason) => {
                    warn!("skipping topic {}: {reason}", topic.name);
                    summary.abandoned += 1;
                }
            }

            if i + 1 < topics.len() {
                pause(self.config.delays.topic());
            }
        }

        info!(
            "experiment complete: {} recorded, {} abandoned",
            summary.results.len(),
            summary.abandoned
        );
        summary
    }

    pub fn run_topic(&self, topic: &Topic) -> TopicRun {
        let mut record = ExperimentRecord::new(topic, prompts::SUMMARIZATION_PROMPT);

        let dialogue = self.simulate(topic);
        record.full_chat_history = dialogue.transcript.clone();
        if dialogue.successful_turns == 0 {
            return TopicRun::Abandoned(AbandonReason::NoSuccessfulTurns);
        }

        let Some(probe) = self.probe_question(&dialogue.user_history) else {
            return TopicRun::Abandoned(AbandonReason::ProbeFailed);
        };
        info!("probe question: {}", preview(&probe, 100));
        record.follow_up_question = Some(probe.clone());

        // Full-history path
        let full_messages = trim_to_budget(
            &prompts::full_history_messages(topic, &dialogue.transcript, &probe),
            self.config.run.max_context_tokens,
        );
        let full_answer = self.ask(
            &self.config.models.target,
            full_messages,
            self.config.sampling.target,
        );
        log_answer("full history answer", full_answer.as_deref());
        record.ai_response_full_history = full_answer;

        // Summarized-history path
        let summary = self.summarize(&dialogue.transcript);
        log_answer("summary", summary.as_deref());
        record.generated_summary = summary;

        // A failed summary still gets an answer, from an explicit placeholder.
        let summary_text = record
            .generated_summary
            .as_deref()
            .unwrap_or(prompts::NO_SUMMARY);
        let summarized_answer = self.ask(
            &self.config.models.target,
            prompts::summarized_history_messages(topic, summary_text, &probe),
            self.config.sampling.target,
        );
        log_answer("summarized history answer", summarized_answer.as_deref());
        record.ai_response_summarized_history = summarized_answer;

        let decision = match (
            record.ai_response_full_history.as_deref(),
            record.ai_response_summarized_history.as_deref(),
        ) {
            (Some(full), Some(summarized)) => {
                self.judge(topic, &dialogue.user_history, full, summarized)
            }
            _ => {
                warn!("skipping judge for {}: an answer is missing", topic.name);
                JudgeDecision::Skipped
            }
        };

        let outcome = record.finalize(decision);
        TopicRun::Recorded {
            record: Box::new(record),
            outcome,
        }
    }

    /// Run the fixed-length dialogue. Never fails; check `successful_turns`.
    pub fn simulate(&self, topic: &Topic) -> Dialogue {
        let cfg = self.config;
        let turns = cfg.run.turns;
        let budget = cfg.run.max_context_tokens;

        let initial = Message::user(&topic.initial_user_prompt);
        let mut d = Dialogue {
            transcript: vec![initial.clone()],
            target_history: vec![prompts::target_system(topic), initial],
            user_history: vec![prompts::simulated_user_system(topic)],
            successful_turns: 0,
        };

        for turn in 1..=turns {
            let reply = self.ask(
                &cfg.models.target,
                trim_to_budget(&d.target_history, budget),
                cfg.sampling.target,
            );

            match reply {
                Some(reply) => {
                    info!("turn {turn}/{turns} assistant: {}", preview(&reply, 50));
                    d.successful_turns += 1;
                    let reply = Message::assistant(reply);
                    d.target_history.push(reply.clone());
                    d.transcript.push(reply.clone());
                    d.user_history.push(reply);

                    let mut request = d.user_history.clone();
                    request.push(Message::user(prompts::NEXT_TURN_INSTRUCTION));
                    let user_turn = self
                        .ask(&cfg.models.user, request, cfg.sampling.user)
                        .unwrap_or_else(|| {
                            warn!("turn {turn}/{turns}: simulated user failed, using fallback");
                            prompts::fallback_user_turn(topic)
                        });
                    info!("turn {turn}/{turns} user: {}", preview(&user_turn, 50));

                    let user_turn = Message::user(user_turn);
                    d.target_history.push(user_turn.clone());
                    d.transcript.push(user_turn.clone());
                    d.user_history.push(user_turn);
                }
                None => {
                    warn!("turn {turn}/{turns}: target model failed, no user turn generated");
                }
            }

            pause(cfg.delays.turn());
        }

        d
    }

    fn probe_question(&self, user_history: &[Message]) -> Option<String> {
        let mut request = user_history.to_vec();
        request.push(Message::user(prompts::PROBE_INSTRUCTION));
        self.ask(
            &self.config.models.user,
            request,
            self.config.sampling.probe,
        )
    }

    /// Compress the transcript into a statement of the user's preferences.
    pub fn summarize(&self, transcript: &[Message]) -> Option<String> {
        self.ask(
            &self.config.models.summarizer,
            prompts::summarizer_messages(transcript),
            self.config.sampling.summary,
        )
    }

    /// Forced A/B choice by the simulated user. A is the full-history answer.
    pub fn judge(
        &self,
        topic: &Topic,
        user_history: &[Message],
        answer_a: &str,
        answer_b: &str,
    ) -> JudgeDecision {
        let reply = self.ask(
            &self.config.models.user,
            prompts::judge_messages(topic, user_history, answer_a, answer_b),
            self.config.sampling.judge,
        );
        let verdict = reply.as_deref().and_then(parse_verdict);
        if verdict.is_none() {
            warn!(
                "judge gave no usable verdict: {:?}",
                reply.as_deref().map(|r| preview(r, 80))
            );
        }
        JudgeDecision::from_verdict(verdict)
    }

    fn ask(&self, model: &str, messages: Vec<Message>, temperature: f32) -> Option<String> {
        let request = CompletionRequest::new(
            model,
            messages,
            temperature,
            self.config.run.max_response_tokens,
        );
        self.model.complete(&request)
    }
}

fn log_answer(label: &str, text: Option<&str>) {
    match text {
        Some(t) => info!("{label}: {}", preview(t, 100)),
        None => warn!("{label}: failed"),
    }
}

fn pause(d: Duration) {
    if !d.is_zero() {
        thread::sleep(d);
    }
}
