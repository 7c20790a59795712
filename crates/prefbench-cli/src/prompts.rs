//! Prompt text for every call the experiment makes.
//!
//! The target assistant, the simulated user, the summarizer and the judge
//! each get their own system prompt. Turn-level instructions are appended
//! as one-off user messages and never stored in a history.

use prefbench_core::{render_transcript, Message, Topic};

/// Instruction prefixed to the flattened transcript when summarizing.
pub const SUMMARIZATION_PROMPT: &str = "\
Summarize the user's preferences (content, tone, format, dislikes) from the following \
conversation. Be concise and capture all key preferences:";

pub const SUMMARIZER_SYSTEM: &str =
    "You are a helpful assistant that summarizes user preferences from conversations.";

/// Asks the simulated user for its next turn.
pub const NEXT_TURN_INSTRUCTION: &str =
    "Generate your next turn as the user. Make it natural and incorporate preference feedback.";

/// Asks the simulated user for the probe question.
pub const PROBE_INSTRUCTION: &str = "\
Now, generate a single, concise final question that specifically tests the AI's understanding \
of your preferences based on our conversation. Respond with ONLY the question.";

pub fn target_system(topic: &Topic) -> Message {
    let p = &topic.preferences;
    Message::system(format!(
        "You are a helpful AI assistant specializing in {}. You learn user preferences over time. \
         The user prefers {}, dislikes {}, and likes a {} and {} approach.",
        topic.name,
        p.content.focus,
        p.content.dislikes_statement,
        p.stylistic.tone,
        p.stylistic.format
    ))
}

pub fn simulated_user_system(topic: &Topic) -> Message {
    Message::system(format!(
        "You are simulating a human user interacting with an AI assistant about {name}.\n\
         Your goal is to guide the conversation to reveal your preferences, and then ask a final \
         question that tests if the AI learned them.\n\
         Your preferences are:\n\
         {prefs}\n\n\
         For each turn, you will receive the AI's previous response. Your task is to generate a \
         follow-up question or statement that continues the conversation and subtly (or \
         explicitly) reinforces your preferences. Make your responses sound natural and \
         human-like.\n\
         The initial prompt you gave the AI was: '{initial}'\n\
         When asked for the final question, generate a single question that specifically tests \
         the AI's understanding of your preferences. Do NOT include any other text in your final \
         question response.",
        name = topic.name,
        prefs = topic.preferences.bullet_list(),
        initial = topic.initial_user_prompt,
    ))
}

/// Stands in for the summary when the summarizer fails.
pub const NO_SUMMARY: &str = "No summary available.";

/// Substitute user turn when the simulated user fails to answer.
pub fn fallback_user_turn(topic: &Topic) -> String {
    format!(
        "Continuing our discussion on {}. What else can you add?",
        topic.name
    )
}

/// Fresh conversation: generic system prompt, the whole transcript, then the probe.
pub fn full_history_messages(topic: &Topic, transcript: &[Message], probe: &str) -> Vec<Message> {
    let mut messages = Vec::with_capacity(transcript.len() + 2);
    messages.push(Message::system(format!(
        "You are a helpful AI assistant specializing in {}. You will be provided with a \
         conversation history and a follow-up question. Your task is to answer the follow-up \
         question based on the provided history, adhering to the user's preferences as learned \
         from the conversation.",
        topic.name
    )));
    messages.extend_from_slice(transcript);
    messages.push(Message::user(probe));
    messages
}

/// Fresh conversation carrying only the summary and the probe.
pub fn summarized_history_messages(topic: &Topic, summary: &str, probe: &str) -> Vec<Message> {
    vec![
        Message::system(format!(
            "You are a helpful AI assistant specializing in {}. You will be provided with a \
             summary of a conversation and a follow-up question. Your task is to answer the \
             follow-up question based on the provided summary, adhering to the user's \
             preferences as described in the summary.",
            topic.name
        )),
        Message::user(format!(
            "Based on the following summary of our conversation and my request:\n\n\
             Summary of my preferences: {summary}\n\n{probe}"
        )),
    ]
}

pub fn summarizer_messages(transcript: &[Message]) -> Vec<Message> {
    vec![
        Message::system(SUMMARIZER_SYSTEM),
        Message::user(format!(
            "{SUMMARIZATION_PROMPT}\n\n{}",
            render_transcript(transcript)
        )),
    ]
}

/// The simulated user's history with its system prompt swapped for the judge
/// instruction, plus both candidate answers. A is full history, B is summary.
pub fn judge_messages(
    topic: &Topic,
    user_history: &[Message],
    answer_a: &str,
    answer_b: &str,
) -> Vec<Message> {
    let system = Message::system(format!(
        "You are simulating a human user. You have just completed a conversation with an AI \
         assistant about {name}.\n\
         Your preferences for this conversation were:\n\
         {prefs}\n\n\
         You will now be presented with two responses (labeled A and B) to your final question. \
         Your task is to choose which response, A or B, better adheres to ALL of your stated \
         preferences and the preferences you conveyed throughout the conversation.\n\
         You MUST choose one; no ties are allowed. Respond with ONLY the letter 'A' or 'B'. Do \
         NOT include any other text or explanation.",
        name = topic.name,
        prefs = topic.preferences.bullet_list(),
    ));

    let mut messages = Vec::with_capacity(user_history.len() + 2);
    messages.push(system);
    match user_history.split_first() {
        Some((first, rest)) if first.is_system() => messages.extend_from_slice(rest),
        _ => messages.extend_from_slice(user_history),
    }
    messages.push(Message::user(format!(
        "Here are the two responses to your final question:\n\n\
         Response A:\n{answer_a}\n\n\
         Response B:\n{answer_b}\n\n\
         Which response (A or B) better adheres to your preferences? Respond with ONLY 'A' or 'B'."
    )));
    messages
}
