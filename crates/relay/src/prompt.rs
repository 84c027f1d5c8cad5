//! Paraphrase prompt construction.

use quill_common::{Language, LengthPreference, ParaphraseRequest, Tone};

use crate::provider::ChatMessage;

fn length_instruction(length: LengthPreference) -> &'static str {
    match length {
        LengthPreference::Shorter => "Make the text shorter than the original",
        LengthPreference::Similar => "Keep the text about the same length as the original",
        LengthPreference::Longer => "Make the text longer than the original",
    }
}

/// System instruction for one request's tone, language, and length.
pub fn system_prompt(tone: Tone, language: Language, length: LengthPreference) -> String {
    format!(
        "You are a professional paraphrasing assistant. Follow these guidelines:
- Ensure the result is grammatically correct. Correct any spelling and grammar mistakes and improve the sentence structure as needed
- Simplify language: replace complex words with simpler alternatives that keep the original meaning
- Vary sentence structure: mix short and long sentences and vary how sentences begin
- Keep the tone {tone}
- {length}
- Translate to {name} ({code}) if it differs from the source language
- Review for coherence: the rewritten text must flow logically and keep the original message
- Maintain technical accuracy
- Use active voice rather than passive voice
- Remove redundancies",
        tone = tone,
        length = length_instruction(length),
        name = language.name(),
        code = language.code(),
    )
}

/// The two messages sent upstream: the instruction, then the raw user text.
pub fn build_messages(request: &ParaphraseRequest) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(system_prompt(
            request.tone,
            request.target_language,
            request.length_preference,
        )),
        ChatMessage::user(request.text.clone()),
    ]
}
