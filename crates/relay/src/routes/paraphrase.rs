//! Paraphrase endpoint: validate, forward, relay.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;
use std::time::Instant;

use crate::error::ApiError;
use crate::prompt;
use crate::state::AppState;
use quill_common::constants::messages;
use quill_common::{
    Language, LengthPreference, ParaphraseRequest, ParaphraseResponse, RelayError, Tone,
    word_count,
};

/// Request body as received, before any field is trusted
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingRequest {
    text: Option<String>,
    target_language: Option<String>,
    tone: Option<String>,
    length_preference: Option<String>,
}

impl IncomingRequest {
    /// Checks presence, option values, and the word ceiling.
    pub fn validate(self, max_words: usize) -> Result<ParaphraseRequest, RelayError> {
        fn present(field: Option<String>) -> Option<String> {
            field.filter(|value| !value.trim().is_empty())
        }

        let (Some(text), Some(language), Some(tone), Some(length)) = (
            present(self.text),
            present(self.target_language),
            present(self.tone),
            present(self.length_preference),
        ) else {
            return Err(RelayError::InvalidRequest(messages::MISSING_FIELDS.to_string()));
        };

        let invalid = |e: quill_common::UnknownOption| RelayError::InvalidRequest(e.to_string());
        let target_language = language.parse::<Language>().map_err(invalid)?;
        let tone = tone.parse::<Tone>().map_err(invalid)?;
        let length_preference = length.parse::<LengthPreference>().map_err(invalid)?;

        if word_count(&text) > max_words {
            return Err(RelayError::InvalidRequest(messages::word_limit(max_words)));
        }

        Ok(ParaphraseRequest {
            text,
            target_language,
            tone,
            length_preference,
        })
    }
}

/// `POST /api/paraphrase`
pub async fn paraphrase(
    State(state): State<AppState>,
    payload: Result<Json<IncomingRequest>, JsonRejection>,
) -> Result<Json<ParaphraseResponse>, ApiError> {
    relay(&state, payload)
        .await
        .map(Json)
        .map_err(|e| ApiError::new(e, state.config.environment))
}

async fn relay(
    state: &AppState,
    payload: Result<Json<IncomingRequest>, JsonRejection>,
) -> Result<ParaphraseResponse, RelayError> {
    let Json(incoming) = payload.map_err(|r| RelayError::InvalidRequest(r.body_text()))?;
    let request = incoming.validate(state.config.max_words)?;

    let api_key = state
        .config
        .openai_api_key
        .as_ref()
        .ok_or_else(|| RelayError::Configuration(messages::NO_CREDENTIAL.to_string()))?;

    let started = Instant::now();
    let completion = state
        .provider
        .complete(api_key.expose(), &prompt::build_messages(&request))
        .await?;
    let paraphrased_text = completion.trim().to_string();

    tracing::info!(
        tone = %request.tone,
        language = %request.target_language,
        length = %request.length_preference,
        input_words = word_count(&request.text),
        output_words = word_count(&paraphrased_text),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Paraphrase completed"
    );

    Ok(ParaphraseResponse { paraphrased_text })
}
