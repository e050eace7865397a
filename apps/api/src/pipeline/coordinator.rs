//! Pipeline Coordinator — runs the four analysis stages in dependency order,
//! enriches the estimated team with roster matches, and owns the analysis
//! state machine (processing → completed | failed).
//!
//! One coordinator invocation handles one analysis end-to-end; `submit`
//! dispatches each analysis onto its own background task so the request path
//! returns immediately. Stages never run concurrently within one analysis —
//! stage N's prompt requires stage N−1's output.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::history::HistoricalDataIndex;
use crate::llm_client::ModelClient;
use crate::matching::RoleMatcher;
use crate::models::analysis::{AnalysisRecord, ProjectSubmission};
use crate::pipeline::calibration::{build_historical_context, extract_required_skills};
use crate::pipeline::context::StageContext;
use crate::pipeline::stage::{StageError, StageKind, StageProcessor, StageResult};
use crate::store::{AnalysisStore, AnalysisUpdate};

/// Per-stage confidence weights, in stage order. Later stages weigh more;
/// the list is truncated to however many confidences are present.
const CONFIDENCE_WEIGHTS: [f64; 4] = [1.0, 1.2, 1.5, 1.3];

/// Overall confidence when no stage produced one.
const DEFAULT_CONFIDENCE: f64 = 0.5;

pub struct PipelineCoordinator {
    model: Arc<dyn ModelClient>,
    history: Arc<HistoricalDataIndex>,
    matcher: Arc<dyn RoleMatcher>,
    store: Arc<dyn AnalysisStore>,
}

impl PipelineCoordinator {
    pub fn new(
        model: Arc<dyn ModelClient>,
        history: Arc<HistoricalDataIndex>,
        matcher: Arc<dyn RoleMatcher>,
        store: Arc<dyn AnalysisStore>,
    ) -> Self {
        Self {
            model,
            history,
            matcher,
            store,
        }
    }

    /// Accepts a submission: creates the record with status `processing` and
    /// fires the analysis on a background task. Returns the id immediately;
    /// callers poll for completion.
    pub async fn submit(self: &Arc<Self>, submission: ProjectSubmission) -> Uuid {
        let analysis_id = Uuid::new_v4();
        self.store
            .create(AnalysisRecord::new(analysis_id, &submission.description))
            .await;

        let coordinator = Arc::clone(self);
        tokio::spawn(async move {
            coordinator.run_analysis(analysis_id, submission).await;
        });

        analysis_id
    }

    async fn run_analysis(&self, analysis_id: Uuid, submission: ProjectSubmission) {
        info!(
            "Starting analysis {analysis_id} for: {}...",
            submission.description.chars().take(100).collect::<String>()
        );

        match self.run_pipeline(&submission).await {
            Ok(update) => {
                if let Err(e) = self.store.update(analysis_id, update).await {
                    error!("Failed to persist completed analysis {analysis_id}: {e}");
                    return;
                }
                info!("Analysis {analysis_id} completed successfully");
            }
            Err(stage_error) => {
                // Quota messages are already user-friendly and pass through
                // verbatim; everything else gets the generic prefix.
                let message = match stage_error {
                    StageError::RateLimited(msg) => msg,
                    other => format!("Analysis failed: {other}"),
                };
                error!("Error in analysis {analysis_id}: {message}");
                if let Err(e) = self
                    .store
                    .update(analysis_id, AnalysisUpdate::failed(message))
                    .await
                {
                    error!("Failed to persist failed analysis {analysis_id}: {e}");
                }
            }
        }
    }

    /// Runs the four stages strictly sequentially, with employee matching
    /// between estimation and summary, and assembles the completed-record
    /// update.
    async fn run_pipeline(
        &self,
        submission: &ProjectSubmission,
    ) -> Result<AnalysisUpdate, StageError> {
        let description = &submission.description;
        let mut context = StageContext::new(submission.hints_json());
        let mut confidences: Vec<f64> = Vec::new();

        // Stage 1: intake.
        info!("Running intake stage...");
        let intake = self.run_stage(StageKind::Intake, description, &context, None).await?;
        confidences.push(intake.confidence);
        let intake_value = intake.to_value(StageKind::Intake);
        context.push(StageKind::Intake, intake_value.clone());

        // Stage 2: technical, with the intake result in context.
        info!("Running technical stage...");
        let technical = self
            .run_stage(StageKind::Technical, description, &context, None)
            .await?;
        confidences.push(technical.confidence);
        let technical_value = technical.to_value(StageKind::Technical);
        context.push(StageKind::Technical, technical_value.clone());

        // Stage 3: estimation, calibrated against the historical snapshot.
        info!("Running estimation stage...");
        let historical = build_historical_context(&self.history, &intake_value, &technical_value);
        let estimation = self
            .run_stage(StageKind::Estimation, description, &context, Some(&historical))
            .await?;
        confidences.push(estimation.confidence);
        let mut estimation_value = estimation.to_value(StageKind::Estimation);
        if !estimation.is_degraded() {
            if let Some(obj) = estimation_value.as_object_mut() {
                obj.insert("historical_insights".to_string(), historical);
            }
        }

        // Stage 3.5: best-effort employee matching. Failure here is never
        // fatal — the composition is simply left unmatched.
        self.enrich_team_composition(&mut estimation_value, &technical_value);
        context.push(StageKind::Estimation, estimation_value.clone());

        // Stage 4: summary over everything.
        info!("Running summary stage...");
        let summary = self
            .run_stage(StageKind::Summary, description, &context, None)
            .await?;
        confidences.push(summary.confidence);
        let summary_value = summary.to_value(StageKind::Summary);

        let overall_confidence = aggregate_confidence(&confidences);

        Ok(build_completed_update(
            intake_value,
            technical_value,
            estimation_value,
            summary_value,
            overall_confidence,
        ))
    }

    async fn run_stage(
        &self,
        kind: StageKind,
        description: &str,
        context: &StageContext,
        historical: Option<&Value>,
    ) -> Result<StageResult, StageError> {
        StageProcessor::new(kind, Arc::clone(&self.model))
            .run(description, context, historical)
            .await
    }

    /// Replaces `team_composition` with the matcher-enriched version when
    /// both a composition and a roster are available. Any matcher failure is
    /// logged and swallowed.
    fn enrich_team_composition(&self, estimation_value: &mut Value, technical_value: &Value) {
        info!("Matching employees to required roles...");
        let team: Vec<Value> = match estimation_value
            .get("team_composition")
            .and_then(Value::as_array)
        {
            Some(roles) if !roles.is_empty() => roles.clone(),
            _ => {
                warn!("No team_composition in estimation result; skipping employee matching");
                return;
            }
        };

        let required_skills = extract_required_skills(technical_value);
        match self.matcher.enrich(team, &required_skills) {
            Ok(enriched) => {
                if let Some(obj) = estimation_value.as_object_mut() {
                    obj.insert("team_composition".to_string(), json!(enriched));
                }
            }
            Err(e) => {
                error!("Employee matching failed: {e}. Continuing without employee recommendations.");
            }
        }
    }
}

/// Weighted average of the stage confidences, truncated to however many are
/// present, clamped to 1.0. Defaults when no stage reported one.
pub fn aggregate_confidence(confidences: &[f64]) -> f64 {
    if confidences.is_empty() {
        return DEFAULT_CONFIDENCE;
    }

    let weights = &CONFIDENCE_WEIGHTS[..confidences.len().min(CONFIDENCE_WEIGHTS.len())];
    let weighted_sum: f64 = confidences.iter().zip(weights).map(|(c, w)| c * w).sum();
    let total_weight: f64 = weights.iter().sum();

    (weighted_sum / total_weight).min(1.0)
}

/// Assembles the completed-record update: full stage outputs plus the flat
/// convenience fields clients read directly.
fn build_completed_update(
    intake: Value,
    technical: Value,
    estimation: Value,
    summary: Value,
    overall_confidence: f64,
) -> AnalysisUpdate {
    AnalysisUpdate {
        status: Some(crate::models::analysis::AnalysisStatus::Completed),
        completed_at: Some(Utc::now()),
        executive_summary: summary
            .get("executive_summary")
            .and_then(|s| s.get("project_overview"))
            .and_then(Value::as_str)
            .map(str::to_string),
        tech_stack: technical.get("recommended_tech_stack").cloned(),
        team_composition: estimation.get("team_composition").cloned(),
        timeline_breakdown: estimation.get("timeline_breakdown").cloned(),
        cost_estimate: estimation.get("cost_breakdown").cloned(),
        risks_and_dependencies: summary.get("major_risks").cloned(),
        overall_confidence: Some(overall_confidence),
        intake_analysis: Some(intake),
        technical_analysis: Some(technical),
        estimation_analysis: Some(estimation),
        summary_analysis: Some(summary),
        error: None,
    }
}
