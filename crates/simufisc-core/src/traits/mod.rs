//! Traits decoupling the engine from its collaborators.
//!
//! The engine consumes immutable patterns and companies from a
//! [`PatternStore`] and emits to a [`ProgressSink`] and a [`ResultSink`];
//! how those are backed is not the engine's concern. An in-memory store
//! is provided for embedding and tests.

use std::collections::HashMap;

use crate::error::{EngineError, EngineResult};
use crate::models::{Company, Pattern, ProgressEvent, SimulationResults};

/// Read-only source of companies and their recurring patterns.
pub trait PatternStore {
    /// Revenue patterns configured for a company.
    fn list_revenue_patterns(&self, company_id: &str) -> EngineResult<Vec<Pattern>>;

    /// Expense patterns configured for a company.
    fn list_expense_patterns(&self, company_id: &str) -> EngineResult<Vec<Pattern>>;

    /// Look up a company by id.
    fn get_company(&self, id: &str) -> EngineResult<Company>;
}

/// Receiver of progress events during a run.
///
/// Sinks are fire-and-forget: a failing sink is logged and never aborts
/// the simulation.
pub trait ProgressSink: Send {
    fn publish(&mut self, event: &ProgressEvent) -> EngineResult<()>;
}

/// Receiver of the final results value.
pub trait ResultSink: Send {
    fn persist(&mut self, results: &SimulationResults) -> EngineResult<()>;
}

/// In-memory [`PatternStore`] backed by hash maps.
#[derive(Debug, Default)]
pub struct InMemoryPatternStore {
    companies: HashMap<String, Company>,
    revenue: HashMap<String, Vec<Pattern>>,
    expense: HashMap<String, Vec<Pattern>>,
}

impl InMemoryPatternStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_company(&mut self, company: Company) {
        self.companies.insert(company.id.clone(), company);
    }

    /// Register a pattern for a company, routed on its kind.
    pub fn insert_pattern(&mut self, company_id: &str, pattern: Pattern) {
        let bucket = if pattern.is_revenue() {
            self.revenue.entry(company_id.to_string()).or_default()
        } else {
            self.expense.entry(company_id.to_string()).or_default()
        };
        bucket.push(pattern);
    }
}

impl PatternStore for InMemoryPatternStore {
    fn list_revenue_patterns(&self, company_id: &str) -> EngineResult<Vec<Pattern>> {
        Ok(self.revenue.get(company_id).cloned().unwrap_or_default())
    }

    fn list_expense_patterns(&self, company_id: &str) -> EngineResult<Vec<Pattern>> {
        Ok(self.expense.get(company_id).cloned().unwrap_or_default())
    }

    fn get_company(&self, id: &str) -> EngineResult<Company> {
        self.companies
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("company", id))
    }
}
