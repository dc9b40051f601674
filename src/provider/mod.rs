//! Outbound LLM provider calls for gates that escalate to a semantic
//! judge (e.g. disambiguating a borderline bias finding).
//!
//! Compiled only with the `llm-provider` feature. Every gate in
//! [`crate::gates`] must remain fully correct with this feature off —
//! this module only adds an optional, circuit-breaker-guarded
//! escalation path, never a required one.

use std::time::Duration;

use async_openai::config::OpenAIConfig;
use async_openai::types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs};
use async_openai::Client;
use rand::Rng;

use crate::audit::{event, AuditLog};
use crate::error::{Error, Result};
use crate::resilience::CircuitBreaker;

const BASE_BACKOFF_MS: u64 = 500;
const BACKOFF_FACTOR: u32 = 2;
const MAX_ATTEMPTS: u32 = 3;
const JITTER_FRACTION: f64 = 0.25;

/// Text response from a provider call.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    /// Raw text returned by the model.
    pub text: String,
    /// Name of the provider that served the call.
    pub provider: String,
}

/// Per-call overrides for a provider request.
#[derive(Debug, Clone)]
pub struct ProviderOptions {
    /// Model identifier, e.g. `"gpt-4o-mini"`.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
        }
    }
}

/// Routes escalation calls to a configured provider, guarded by a
/// circuit breaker and retried with jittered exponential backoff.
pub struct ProviderRouter {
    client: Client<OpenAIConfig>,
    breaker: CircuitBreaker,
    audit: AuditLog,
}

impl ProviderRouter {
    /// Builds a router using `api_key` for the underlying client and the
    /// given circuit breaker thresholds.
    #[must_use]
    pub fn new(api_key: &str, cb_failure_threshold: u32, cb_timeout_s: u64, cb_success_threshold: u32) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        Self {
            client: Client::with_config(config),
            breaker: CircuitBreaker::new(cb_failure_threshold, cb_timeout_s, cb_success_threshold),
            audit: AuditLog::new(crate::audit::DEFAULT_CAPACITY),
        }
    }

    /// The circuit-open/circuit-closed audit trail for this router's
    /// breaker, distinct from the engine's own audit log.
    #[must_use]
    pub const fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Calls `provider_name` with `prompt`, retrying transient failures
    /// up to [`MAX_ATTEMPTS`] times with jittered exponential backoff.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CircuitOpen`] immediately if the breaker for
    /// `provider_name` is open, or the last attempt's error after
    /// exhausting retries.
    pub async fn call(&self, provider_name: &str, prompt: &str, options: &ProviderOptions) -> Result<ProviderResponse> {
        if !self.breaker.allow(provider_name) {
            return Err(Error::CircuitOpen {
                dependency: provider_name.to_string(),
            });
        }

        let mut last_err = None;
        for attempt in 0..MAX_ATTEMPTS {
            match self.try_call(prompt, options).await {
                Ok(text) => {
                    if self.breaker.record_success(provider_name).is_some() {
                        self.audit.record(event::circuit_closed(provider_name));
                    }
                    return Ok(ProviderResponse {
                        text,
                        provider: provider_name.to_string(),
                    });
                }
                Err(err) => {
                    last_err = Some(err);
                    if attempt + 1 < MAX_ATTEMPTS {
                        tokio::time::sleep(backoff_delay(attempt)).await;
                    }
                }
            }
        }

        if self.breaker.record_failure(provider_name).is_some() {
            self.audit.record(event::circuit_opened(provider_name));
        }
        Err(last_err.unwrap_or(Error::Internal("provider call failed with no recorded error".to_string())))
    }

    async fn try_call(&self, prompt: &str, options: &ProviderOptions) -> Result<String> {
        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| Error::Internal(e.to_string()))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&options.model)
            .temperature(options.temperature)
            .messages(vec![message.into()])
            .build()
            .map_err(|e| Error::Internal(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| Error::Internal(e.to_string()))?;

        response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| Error::Internal("provider returned no choices".to_string()))
    }
}

/// Computes the jittered exponential backoff delay for retry `attempt`
/// (zero-indexed).
fn backoff_delay(attempt: u32) -> Duration {
    let base = BASE_BACKOFF_MS * u64::from(BACKOFF_FACTOR.pow(attempt));
    let jitter_range = (base as f64 * JITTER_FRACTION) as i64;
    let jitter = rand::thread_rng().gen_range(-jitter_range..=jitter_range);
    let delay_ms = (base as i64 + jitter).max(0);
    Duration::from_millis(delay_ms as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_delay_grows_with_attempt() {
        let first = backoff_delay(0).as_millis();
        let second = backoff_delay(1).as_millis();
        assert!(first <= 625);
        assert!(second >= 625);
    }

    #[test]
    fn test_provider_options_default_model() {
        let options = ProviderOptions::default();
        assert_eq!(options.model, "gpt-4o-mini");
    }

    #[test]
    fn test_router_audits_circuit_open_without_a_live_call() {
        // Exercises the same transition-signalled recording `call` uses,
        // without requiring a live API key or network access.
        let router = ProviderRouter::new("test-key", 1, 30, 1);
        assert!(router.breaker.record_failure("fca-llm").is_some());
        router.audit.record(event::circuit_opened("fca-llm"));
        assert_eq!(router.audit().snapshot().len(), 1);
    }
}
