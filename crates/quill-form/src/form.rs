//! Form controller: input, options, verification, and the submit flow.

use quill_common::constants::{MAX_WORDS, messages};
use quill_common::{Language, LengthPreference, ParaphraseRequest, Tone, word_count};

use crate::api::RelayApi;
use crate::captcha::CaptchaWidget;

pub const CAPTCHA_REQUIRED: &str = "Please complete the CAPTCHA verification";
pub const EMPTY_INPUT: &str = "Please enter some text to paraphrase";

/// Outcome of a submit attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Refused locally; no request was sent
    Blocked(String),
    Paraphrased(String),
    /// Relay or transport failure, message as shown in the banner
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct FormController {
    input: String,
    output: String,
    input_words: usize,
    output_words: usize,
    tone: Tone,
    language: Language,
    length: LengthPreference,
    verified: bool,
    error: Option<String>,
    loading: bool,
    max_words: usize,
    captcha: CaptchaWidget,
}

impl FormController {
    pub fn new() -> Self {
        Self::with_captcha(CaptchaWidget::new())
    }

    pub fn with_captcha(captcha: CaptchaWidget) -> Self {
        Self {
            input: String::new(),
            output: String::new(),
            input_words: 0,
            output_words: 0,
            tone: Tone::default(),
            language: Language::default(),
            length: LengthPreference::default(),
            verified: false,
            error: None,
            loading: false,
            max_words: MAX_WORDS,
            captcha,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn input_words(&self) -> usize {
        self.input_words
    }

    pub fn output_words(&self) -> usize {
        self.output_words
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_verified(&self) -> bool {
        self.verified
    }

    pub fn captcha(&self) -> &CaptchaWidget {
        &self.captcha
    }

    fn over_limit(&self) -> bool {
        self.input_words > self.max_words
    }

    /// Replace the input. Over the ceiling the limit banner is raised, otherwise
    /// any banner is cleared. Text is always accepted.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
        self.input_words = word_count(&self.input);
        self.error = if self.over_limit() {
            Some(messages::word_limit(self.max_words))
        } else {
            None
        };
    }

    pub fn set_tone(&mut self, tone: Tone) {
        self.tone = tone;
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn set_length(&mut self, length: LengthPreference) {
        self.length = length;
    }

    fn set_verified(&mut self, verified: bool) {
        self.verified = verified;
    }

    /// Type into the CAPTCHA box; an empty entry leaves the flag alone.
    pub fn enter_captcha(&mut self, entry: &str) -> Option<bool> {
        let outcome = self.captcha.attempt(entry);
        if let Some(verified) = outcome {
            self.set_verified(verified);
        }
        outcome
    }

    pub fn refresh_captcha(&mut self) {
        let verified = self.captcha.refresh();
        self.set_verified(verified);
    }

    pub fn can_submit(&self) -> bool {
        !self.input.trim().is_empty() && !self.loading && !self.over_limit() && self.verified
    }

    /// Request built from the current form values
    pub fn request(&self) -> ParaphraseRequest {
        ParaphraseRequest {
            text: self.input.clone(),
            target_language: self.language,
            tone: self.tone,
            length_preference: self.length,
        }
    }

    fn blocked_reason(&self) -> Option<String> {
        if !self.verified {
            Some(CAPTCHA_REQUIRED.to_string())
        } else if self.over_limit() {
            Some(messages::word_limit(self.max_words))
        } else if self.input.trim().is_empty() {
            Some(EMPTY_INPUT.to_string())
        } else {
            None
        }
    }

    /// Validate locally, then call the relay at most once.
    pub async fn submit<R: RelayApi + ?Sized>(&mut self, relay: &R) -> Submission {
        if let Some(reason) = self.blocked_reason() {
            self.error = Some(reason.clone());
            return Submission::Blocked(reason);
        }

        self.error = None;
        self.output.clear();
        self.output_words = 0;
        self.loading = true;

        let request = self.request();
        let result = relay.paraphrase(&request).await;
        self.loading = false;

        match result {
            Ok(text) => {
                self.output_words = word_count(&text);
                self.output = text.clone();
                tracing::debug!(words = self.output_words, "Paraphrase received");
                Submission::Paraphrased(text)
            }
            Err(e) => {
                let message = e.to_string();
                tracing::debug!(error = ?e, "Paraphrase failed");
                self.error = Some(message.clone());
                Submission::Failed(message)
            }
        }
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Back to a blank form with a fresh challenge; options are kept.
    pub fn reset(&mut self) {
        self.input.clear();
        self.output.clear();
        self.input_words = 0;
        self.output_words = 0;
        self.error = None;
        self.refresh_captcha();
    }
}

impl Default for FormController {
    fn default() -> Self {
        Self::new()
    }
}
