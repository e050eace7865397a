//! Stage Processor — one prompt/response exchange of the pipeline.
//!
//! Builds the stage prompt from the description, hints, and accumulated
//! context, invokes the model once, and parses the response. A response that
//! fails structured parsing is NOT an error: it becomes a degraded result
//! with a fixed low confidence so the pipeline can continue on a best-effort
//! basis.

use std::sync::Arc;
use std::time::Instant;

use serde_json::{json, Value};
use thiserror::Error;
use tracing::warn;

use crate::llm_client::ModelClient;
use crate::pipeline::context::StageContext;
use crate::pipeline::prompts;

/// Confidence assigned to a result that failed structured parsing.
pub const DEGRADED_CONFIDENCE: f64 = 0.3;

/// Error marker stored in a degraded result.
pub const PARSE_FAILURE_ERROR: &str = "Failed to parse agent response";

/// The message surfaced to end users when the provider reports a quota or
/// rate-limit condition.
pub const RETRY_LATER_MESSAGE: &str = "The AI service is temporarily over capacity. \
    Please try again in a few moments, or contact support if this persists.";

/// The four sequential pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Intake,
    Technical,
    Estimation,
    Summary,
}

impl StageKind {
    pub fn agent_name(&self) -> &'static str {
        match self {
            StageKind::Intake => "Project Intake Agent",
            StageKind::Technical => "Technical Analyst Agent",
            StageKind::Estimation => "Feasibility & Estimation Agent",
            StageKind::Summary => "Summary Agent",
        }
    }

    /// Key under which this stage's result appears in later stages' context
    /// and in the stored record.
    pub fn context_key(&self) -> &'static str {
        match self {
            StageKind::Intake => "intake_analysis",
            StageKind::Technical => "technical_analysis",
            StageKind::Estimation => "estimation_analysis",
            StageKind::Summary => "summary_analysis",
        }
    }

    /// Heading used when this stage's result is rendered into a prompt.
    pub fn context_label(&self) -> &'static str {
        match self {
            StageKind::Intake => "Intake Analysis Context",
            StageKind::Technical => "Technical Analysis Context",
            StageKind::Estimation => "Estimation Analysis Context",
            StageKind::Summary => "Summary Context",
        }
    }

    fn system_prompt(&self) -> &'static str {
        match self {
            StageKind::Intake => prompts::INTAKE_SYSTEM,
            StageKind::Technical => prompts::TECHNICAL_SYSTEM,
            StageKind::Estimation => prompts::ESTIMATION_SYSTEM,
            StageKind::Summary => prompts::SUMMARY_SYSTEM,
        }
    }

    fn instruction(&self) -> &'static str {
        match self {
            StageKind::Intake => prompts::INTAKE_INSTRUCTION,
            StageKind::Technical => prompts::TECHNICAL_INSTRUCTION,
            StageKind::Estimation => prompts::ESTIMATION_INSTRUCTION,
            StageKind::Summary => prompts::SUMMARY_INSTRUCTION,
        }
    }
}

/// Errors that abort a stage (and with it the whole analysis). Parse
/// failures are not represented here — they degrade instead.
#[derive(Debug, Error)]
pub enum StageError {
    /// Provider quota/rate-limit condition; the message is already
    /// user-facing and must be surfaced verbatim.
    #[error("{0}")]
    RateLimited(String),

    /// Any other model invocation failure (unreachable, auth, transport).
    #[error("{0}")]
    Model(String),
}

/// What a stage produced: the parsed structured object, or the raw text kept
/// as a fallback payload when parsing failed.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome {
    Parsed(Value),
    Degraded { error: String, raw_response: String },
}

#[derive(Debug, Clone)]
pub struct StageResult {
    pub outcome: StageOutcome,
    /// Heuristic thoroughness score in 0..1, not a calibrated metric.
    pub confidence: f64,
    /// Wall-clock seconds spent in the model call.
    pub processing_time: f64,
}

impl StageResult {
    pub fn is_degraded(&self) -> bool {
        matches!(self.outcome, StageOutcome::Degraded { .. })
    }

    /// Flattens the result to its wire shape: the parsed fields (or the
    /// error marker and raw text) merged with the agent metadata.
    pub fn to_value(&self, stage: StageKind) -> Value {
        let mut map = match &self.outcome {
            StageOutcome::Parsed(value) => value.as_object().cloned().unwrap_or_default(),
            StageOutcome::Degraded {
                error,
                raw_response,
            } => {
                let mut m = serde_json::Map::new();
                m.insert("error".to_string(), json!(error));
                m.insert("raw_response".to_string(), json!(raw_response));
                m
            }
        };
        map.insert("agent_name".to_string(), json!(stage.agent_name()));
        map.insert("confidence".to_string(), json!(self.confidence));
        map.insert("processing_time".to_string(), json!(self.processing_time));
        Value::Object(map)
    }
}

pub struct StageProcessor {
    kind: StageKind,
    model: Arc<dyn ModelClient>,
}

impl StageProcessor {
    pub fn new(kind: StageKind, model: Arc<dyn ModelClient>) -> Self {
        Self { kind, model }
    }

    /// Runs the stage once. `historical_data` is rendered as an extra prompt
    /// section (the coordinator supplies it for the estimation stage only).
    pub async fn run(
        &self,
        description: &str,
        context: &StageContext,
        historical_data: Option<&Value>,
    ) -> Result<StageResult, StageError> {
        let user_prompt = self.build_user_prompt(description, context, historical_data);

        let start = Instant::now();
        let raw = self
            .model
            .invoke(self.kind.system_prompt(), &user_prompt)
            .await
            .map_err(|e| classify_invocation_failure(&e.to_string()))?;
        let processing_time = start.elapsed().as_secs_f64();

        let stripped = strip_json_fences(&raw);

        match serde_json::from_str::<Value>(stripped) {
            Ok(value) if value.is_object() => {
                let confidence = calculate_confidence(&value);
                Ok(StageResult {
                    outcome: StageOutcome::Parsed(value),
                    confidence,
                    processing_time,
                })
            }
            _ => {
                warn!(
                    "{} returned unparseable output; continuing with degraded result",
                    self.kind.agent_name()
                );
                Ok(StageResult {
                    outcome: StageOutcome::Degraded {
                        error: PARSE_FAILURE_ERROR.to_string(),
                        raw_response: stripped.to_string(),
                    },
                    confidence: DEGRADED_CONFIDENCE,
                    processing_time,
                })
            }
        }
    }

    fn build_user_prompt(
        &self,
        description: &str,
        context: &StageContext,
        historical_data: Option<&Value>,
    ) -> String {
        let hints = serde_json::to_string_pretty(context.hints())
            .unwrap_or_else(|_| "{}".to_string());

        let historical_section = historical_data
            .map(|data| {
                format!(
                    "{}:\n{}\n\n",
                    prompts::HISTORICAL_SECTION_LABEL,
                    serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string())
                )
            })
            .unwrap_or_default();

        prompts::USER_PROMPT_TEMPLATE
            .replace("{description}", description)
            .replace("{hints}", &hints)
            .replace("{context_sections}", &context.render_sections())
            .replace("{historical_section}", &historical_section)
            .replace("{instruction}", self.kind.instruction())
    }
}

/// Maps a model invocation failure to the stage error taxonomy: quota and
/// rate-limit conditions become the fixed user-facing retry message,
/// everything else propagates as-is.
fn classify_invocation_failure(text: &str) -> StageError {
    let lowered = text.to_lowercase();
    if lowered.contains("429") || lowered.contains("quota") || lowered.contains("rate limit") {
        StageError::RateLimited(RETRY_LATER_MESSAGE.to_string())
    } else {
        StageError::Model(text.to_string())
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Heuristic confidence for a successfully parsed result: the mean of a
/// length signal, a specificity signal, and a risk-awareness signal computed
/// over the serialized result. An approximate proxy for thoroughness, not a
/// calibrated metric — the constants are fixed tunables.
fn calculate_confidence(analysis: &Value) -> f64 {
    let serialized = serde_json::to_string_pretty(analysis)
        .unwrap_or_default()
        .to_lowercase();

    let detail_level = (serialized.split_whitespace().count() as f64 / 100.0).min(1.0);
    let specificity = if serialized.contains("specific") {
        0.8
    } else {
        0.6
    };
    let risk_awareness = if serialized.contains("risk") { 0.9 } else { 0.7 };

    (detail_level + specificity + risk_awareness) / 3.0
}
