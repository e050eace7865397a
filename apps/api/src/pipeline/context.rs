//! Stage context — accumulated prior-stage outputs threaded through the
//! pipeline.
//!
//! Append-only by construction: a stage receives the context, and the
//! coordinator pushes that stage's result afterwards, so stage N can only
//! ever see stages < N, in stage order.

use serde_json::Value;

use crate::pipeline::stage::StageKind;

#[derive(Debug, Clone)]
pub struct StageContext {
    hints: Value,
    sections: Vec<(StageKind, Value)>,
}

impl StageContext {
    pub fn new(hints: Value) -> Self {
        Self {
            hints,
            sections: Vec::new(),
        }
    }

    /// Submission hints rendered into every stage prompt.
    pub fn hints(&self) -> &Value {
        &self.hints
    }

    /// Appends a completed stage's result. Each stage appears at most once.
    pub fn push(&mut self, stage: StageKind, result: Value) {
        debug_assert!(
            !self.sections.iter().any(|(s, _)| *s == stage),
            "stage result pushed twice"
        );
        self.sections.push((stage, result));
    }

    pub fn sections(&self) -> &[(StageKind, Value)] {
        &self.sections
    }

    pub fn get(&self, stage: StageKind) -> Option<&Value> {
        self.sections
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, v)| v)
    }

    /// Renders the accumulated sections as labeled blocks for a stage prompt,
    /// in stage order.
    pub fn render_sections(&self) -> String {
        let mut out = String::new();
        for (stage, value) in &self.sections {
            let body = serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string());
            out.push_str(&format!("{}:\n{}\n\n", stage.context_label(), body));
        }
        out
    }
}
