//! Client for the external rule validation service.
//!
//! Candidate rules from pattern analysis can be sent to a reasoning service
//! that approves or rejects each one. The service is optional; without it,
//! validation reports that it is disabled.

use std::time::Duration;

use async_trait::async_trait;
use galley_core::rules::RuleCandidate;
use galley_core::types::DbId;
use serde::{Deserialize, Serialize};

use crate::config::RuleValidatorConfig;

/// HTTP request timeout for one validation call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RuleValidatorError {
    /// Network, DNS, timeout or body decoding failure.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Rule validator returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Candidate as sent to the validator.
#[derive(Debug, Clone, Serialize)]
pub struct CandidatePayload {
    pub main_recipe_id: DbId,
    pub rule_type: &'static str,
    pub target_recipe_name: String,
    pub confidence: f64,
    pub description: String,
}

impl From<&RuleCandidate> for CandidatePayload {
    fn from(c: &RuleCandidate) -> Self {
        Self {
            main_recipe_id: c.main_recipe_id,
            rule_type: c.rule_type.as_str(),
            target_recipe_name: c.target_recipe_name.clone(),
            confidence: c.confidence,
            description: c.description.clone(),
        }
    }
}

/// The validator's decision on one candidate.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RuleVerdict {
    pub main_recipe_id: DbId,
    pub rule_type: String,
    pub target_recipe_name: String,
    pub approved: bool,
    /// Validator's own confidence; the candidate's is used when absent.
    pub confidence: Option<f64>,
    pub reason: Option<String>,
}

impl RuleVerdict {
    /// Whether this verdict is about `candidate`.
    pub fn matches(&self, candidate: &RuleCandidate) -> bool {
        self.main_recipe_id == candidate.main_recipe_id
            && self.rule_type == candidate.rule_type.as_str()
            && self
                .target_recipe_name
                .eq_ignore_ascii_case(&candidate.target_recipe_name)
    }
}

#[derive(Debug, Serialize)]
struct ValidationRequest<'a> {
    candidates: &'a [CandidatePayload],
}

#[derive(Debug, Deserialize)]
struct ValidationResponse {
    verdicts: Vec<RuleVerdict>,
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Reviews candidate rules.
#[async_trait]
pub trait RuleValidator: Send + Sync {
    async fn validate(
        &self,
        candidates: &[RuleCandidate],
    ) -> Result<Vec<RuleVerdict>, RuleValidatorError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// [`RuleValidator`] backed by a JSON-over-HTTP endpoint.
///
/// Posts `{ "candidates": [...] }` and expects `{ "verdicts": [...] }`.
pub struct HttpRuleValidator {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl HttpRuleValidator {
    pub fn new(config: &RuleValidatorConfig) -> Result<Self, RuleValidatorError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl RuleValidator for HttpRuleValidator {
    async fn validate(
        &self,
        candidates: &[RuleCandidate],
    ) -> Result<Vec<RuleVerdict>, RuleValidatorError> {
        let payload: Vec<CandidatePayload> = candidates.iter().map(Into::into).collect();

        let mut request = self.client.post(&self.url).json(&ValidationRequest {
            candidates: &payload,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(RuleValidatorError::HttpStatus(response.status().as_u16()));
        }

        let body: ValidationResponse = response.json().await?;
        tracing::debug!(
            candidates = candidates.len(),
            verdicts = body.verdicts.len(),
            "Rule validator responded"
        );
        Ok(body.verdicts)
    }
}
