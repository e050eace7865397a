//! Analysis Store — keyed storage for analysis records.
//!
//! Exactly one writer (the pipeline coordinator) mutates a given id, and
//! concurrent analyses use disjoint ids, so a single in-process map behind a
//! lock satisfies the contract. Swapping in a persistent backend only
//! requires implementing `AnalysisStore`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::analysis::{AnalysisRecord, AnalysisStatus};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Analysis {0} not found")]
    NotFound(Uuid),
}

/// Field updates applied atomically in one status transition.
/// Unset fields are left untouched; `updated_at` is bumped on every apply.
#[derive(Debug, Default)]
pub struct AnalysisUpdate {
    pub status: Option<AnalysisStatus>,
    pub completed_at: Option<chrono::DateTime<Utc>>,
    pub intake_analysis: Option<Value>,
    pub technical_analysis: Option<Value>,
    pub estimation_analysis: Option<Value>,
    pub summary_analysis: Option<Value>,
    pub executive_summary: Option<String>,
    pub tech_stack: Option<Value>,
    pub team_composition: Option<Value>,
    pub timeline_breakdown: Option<Value>,
    pub cost_estimate: Option<Value>,
    pub risks_and_dependencies: Option<Value>,
    pub overall_confidence: Option<f64>,
    pub error: Option<String>,
}

impl AnalysisUpdate {
    /// A transition to `failed` carrying the captured message.
    pub fn failed(message: String) -> Self {
        Self {
            status: Some(AnalysisStatus::Failed),
            error: Some(message),
            ..Default::default()
        }
    }
}

#[async_trait]
pub trait AnalysisStore: Send + Sync {
    async fn create(&self, record: AnalysisRecord);
    async fn get(&self, id: Uuid) -> Option<AnalysisRecord>;
    async fn update(&self, id: Uuid, update: AnalysisUpdate) -> Result<(), StoreError>;
}

/// Default in-process backend: a map behind an async RwLock.
#[derive(Default)]
pub struct InMemoryAnalysisStore {
    records: RwLock<HashMap<Uuid, AnalysisRecord>>,
}

impl InMemoryAnalysisStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AnalysisStore for InMemoryAnalysisStore {
    async fn create(&self, record: AnalysisRecord) {
        self.records
            .write()
            .await
            .insert(record.analysis_id, record);
    }

    async fn get(&self, id: Uuid) -> Option<AnalysisRecord> {
        self.records.read().await.get(&id).cloned()
    }

    async fn update(&self, id: Uuid, update: AnalysisUpdate) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let record = records.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        if let Some(status) = update.status {
            record.status = status;
        }
        if update.completed_at.is_some() {
            record.completed_at = update.completed_at;
        }
        if update.intake_analysis.is_some() {
            record.intake_analysis = update.intake_analysis;
        }
        if update.technical_analysis.is_some() {
            record.technical_analysis = update.technical_analysis;
        }
        if update.estimation_analysis.is_some() {
            record.estimation_analysis = update.estimation_analysis;
        }
        if update.summary_analysis.is_some() {
            record.summary_analysis = update.summary_analysis;
        }
        if update.executive_summary.is_some() {
            record.executive_summary = update.executive_summary;
        }
        if update.tech_stack.is_some() {
            record.tech_stack = update.tech_stack;
        }
        if update.team_composition.is_some() {
            record.team_composition = update.team_composition;
        }
        if update.timeline_breakdown.is_some() {
            record.timeline_breakdown = update.timeline_breakdown;
        }
        if update.cost_estimate.is_some() {
            record.cost_estimate = update.cost_estimate;
        }
        if update.risks_and_dependencies.is_some() {
            record.risks_and_dependencies = update.risks_and_dependencies;
        }
        if update.overall_confidence.is_some() {
            record.overall_confidence = update.overall_confidence;
        }
        if update.error.is_some() {
            record.error = update.error;
        }

        record.updated_at = Utc::now();
        Ok(())
    }
}
