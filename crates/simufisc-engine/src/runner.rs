//! Simulation orchestration: validate, expand, aggregate, check, emit.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, info, warn};
use uuid::Uuid;

use simufisc_core::calendar::fiscal_month_order;
use simufisc_core::error::{EngineError, EngineResult};
use simufisc_core::models::{
    round_cents, Account, Company, FiscalConfig, Frequency, IndicativeTaxes, Occurrence, Pattern,
    ProgressSnapshot, RunMetadata, SimulationResults, SimulationStatus, DAYS_MASK_MAX,
};
use simufisc_core::streaming::CancelToken;
use simufisc_core::traits::{PatternStore, ResultSink};

use crate::expander::PatternExpander;
use crate::invariants;
use crate::ledger::LedgerAggregator;
use crate::progress::{ProgressBroadcaster, DEFAULT_HEARTBEAT_INTERVAL};

/// Lowest accepted simulation year.
pub const MIN_YEAR: i32 = 2020;
/// Highest accepted simulation year.
pub const MAX_YEAR: i32 = 2030;
/// Maximum combined revenue + expense pattern count per run.
pub const MAX_PATTERNS: usize = 100;
/// Version stamped into result metadata.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Soft per-run latency target; breaching it logs a warning.
const SOFT_TARGET: Duration = Duration::from_millis(200);

/// Indicative social-contribution rate applied to monthly net revenue in
/// progress snapshots. Not an authoritative liability computation.
const URSSAF_ESTIMATE_RATE: Decimal = dec!(0.45);

/// Per-run options.
pub struct RunnerOptions {
    /// Identifier for the run; a UUID is generated when absent.
    pub simulation_id: Option<String>,
    /// Broadcaster receiving progress snapshots; a private one is created
    /// when absent.
    pub progress: Option<Arc<ProgressBroadcaster>>,
    /// Sink receiving the final results. Failures are logged, not fatal.
    pub result_sink: Option<Box<dyn ResultSink>>,
    /// Cancellation signal, checked between fiscal-month steps.
    pub cancel: Option<CancelToken>,
    /// Wall-clock interval between heartbeat events.
    pub heartbeat_interval: Duration,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            simulation_id: None,
            progress: None,
            result_sink: None,
            cancel: None,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
        }
    }
}

/// Entry point executing one simulation run end to end.
#[derive(Debug, Default)]
pub struct SimulationRunner;

impl SimulationRunner {
    pub fn new() -> Self {
        Self
    }

    /// Run a simulation for inputs fetched from a store.
    pub fn run_for_company(
        &self,
        store: &dyn PatternStore,
        company_id: &str,
        config: &FiscalConfig,
        options: RunnerOptions,
    ) -> EngineResult<SimulationResults> {
        let company = store.get_company(company_id)?;
        let revenue = store.list_revenue_patterns(company_id)?;
        let expense = store.list_expense_patterns(company_id)?;
        self.run(config, &company, &revenue, &expense, options)
    }

    /// Run a simulation over explicit pattern lists.
    ///
    /// Validation failures return before any state is created. Later
    /// failures emit a terminal `failed` snapshot, discard the ledger,
    /// and return the typed error; no partial results are ever visible.
    pub fn run(
        &self,
        config: &FiscalConfig,
        company: &Company,
        revenue_patterns: &[Pattern],
        expense_patterns: &[Pattern],
        mut options: RunnerOptions,
    ) -> EngineResult<SimulationResults> {
        validate_inputs(config, company, revenue_patterns, expense_patterns)?;

        let simulation_id = options
            .simulation_id
            .take()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let broadcaster = options
            .progress
            .clone()
            .unwrap_or_else(|| Arc::new(ProgressBroadcaster::new(simulation_id.clone())));
        let cancel = options.cancel.clone().unwrap_or_default();
        let _heartbeat = broadcaster.start_heartbeat(options.heartbeat_interval);
        let started = Instant::now();

        info!(
            simulation = %simulation_id,
            company = %company.id,
            year = config.year,
            fiscal_start = config.fiscal_start_month,
            "starting simulation run"
        );

        // Inputs accepted; expansion begins.
        broadcaster.publish(self.snapshot(&simulation_id, 10));

        let expander = PatternExpander::new(config.year, company.holiday_region);
        let mut occurrences: Vec<Occurrence> = Vec::new();
        for pattern in revenue_patterns.iter().chain(expense_patterns) {
            occurrences.extend(expander.expand(pattern));
        }
        occurrences.sort_by(|a, b| a.date.cmp(&b.date));
        let total_occurrences = occurrences.len();
        debug!(simulation = %simulation_id, occurrences = total_occurrences, "patterns expanded");

        let mut by_month: Vec<Vec<Occurrence>> = vec![Vec::new(); 12];
        for occurrence in occurrences {
            by_month[occurrence.month_index()].push(occurrence);
        }

        let mut ledger = LedgerAggregator::new(config);
        broadcaster.publish(self.snapshot(&simulation_id, 20));

        let order = fiscal_month_order(config.fiscal_start_month);
        for (step, month) in order.into_iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(self.fail(&broadcaster, &simulation_id, EngineError::Cancelled));
            }
            for occurrence in &by_month[month as usize - 1] {
                ledger.apply(occurrence);
            }

            let revenue_net = ledger.month_revenue_net(month);
            let expense_net = ledger.month_expense_net(month);
            let partial = ledger.partial_closing(month);
            let taxes = IndicativeTaxes {
                tva: partial
                    .get(&Account::Vat)
                    .copied()
                    .unwrap_or_default()
                    .abs(),
                urssaf: round_cents(revenue_net * URSSAF_ESTIMATE_RATE),
                net_cash_flow: revenue_net - expense_net,
            };
            // 20 at the seed, 80 once the last fiscal month has landed.
            let progress = 20 + 5 * (step as u8 + 1);
            broadcaster.publish(
                self.snapshot(&simulation_id, progress)
                    .with_month(month)
                    .with_balances(partial)
                    .with_taxes(taxes),
            );
        }

        ledger.roll_forward();
        broadcaster.publish(self.snapshot(&simulation_id, 85));
        let monthly_totals = ledger.monthly_summaries();
        broadcaster.publish(self.snapshot(&simulation_id, 90));
        let overall_totals = ledger.overall_summary(&monthly_totals);
        broadcaster.publish(self.snapshot(&simulation_id, 95));

        let elapsed = started.elapsed();
        let results = SimulationResults {
            year: config.year,
            fiscal_start_month: config.fiscal_start_month,
            monthly_balances: ledger.monthly_balances(),
            monthly_totals,
            overall_totals,
            metadata: RunMetadata {
                total_occurrences,
                processing_time_ms: elapsed.as_millis() as u64,
                engine_version: ENGINE_VERSION.to_string(),
            },
        };

        if let Err(error) = invariants::check(config, &results) {
            return Err(self.fail(&broadcaster, &simulation_id, error));
        }

        if elapsed > SOFT_TARGET {
            warn!(
                simulation = %simulation_id,
                elapsed_ms = elapsed.as_millis() as u64,
                "run exceeded the soft latency target"
            );
        }

        if let Some(sink) = options.result_sink.as_mut() {
            if let Err(error) = sink.persist(&results) {
                warn!(simulation = %simulation_id, %error, "result sink rejected results");
            }
        }

        broadcaster.publish(
            ProgressSnapshot::new(&simulation_id, SimulationStatus::Completed, 100)
                .with_month(order[11]),
        );
        info!(
            simulation = %simulation_id,
            occurrences = total_occurrences,
            elapsed_ms = elapsed.as_millis() as u64,
            "simulation completed"
        );
        Ok(results)
    }

    fn snapshot(&self, simulation_id: &str, progress: u8) -> ProgressSnapshot {
        ProgressSnapshot::new(simulation_id, SimulationStatus::Running, progress)
    }

    /// Emit the terminal `failed` snapshot and hand the error back.
    fn fail(
        &self,
        broadcaster: &ProgressBroadcaster,
        simulation_id: &str,
        error: EngineError,
    ) -> EngineError {
        let progress = broadcaster
            .latest_snapshot()
            .map(|s| s.progress)
            .unwrap_or(0);
        let message = match &error {
            EngineError::Cancelled => "cancelled".to_string(),
            other => other.to_string(),
        };
        warn!(simulation = %simulation_id, %error, "simulation failed");
        broadcaster.publish(
            ProgressSnapshot::new(simulation_id, SimulationStatus::Failed, progress)
                .with_message(message),
        );
        error
    }
}

/// Convenience wrapper around [`SimulationRunner::run`].
pub fn run_simulation(
    config: &FiscalConfig,
    company: &Company,
    revenue_patterns: &[Pattern],
    expense_patterns: &[Pattern],
    options: RunnerOptions,
) -> EngineResult<SimulationResults> {
    SimulationRunner::new().run(config, company, revenue_patterns, expense_patterns, options)
}

fn validate_inputs(
    config: &FiscalConfig,
    company: &Company,
    revenue_patterns: &[Pattern],
    expense_patterns: &[Pattern],
) -> EngineResult<()> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&config.year) {
        return Err(EngineError::validation(format!(
            "year {} out of range [{MIN_YEAR}, {MAX_YEAR}]",
            config.year
        )));
    }
    if !(1..=12).contains(&config.fiscal_start_month) {
        return Err(EngineError::validation(format!(
            "fiscal start month {} out of range [1, 12]",
            config.fiscal_start_month
        )));
    }

    let identity = [
        ("id", &company.id),
        ("user_id", &company.user_id),
        ("legal_form", &company.legal_form),
        ("activity_sector", &company.activity_sector),
        ("capital", &company.capital),
        ("bank_partner", &company.bank_partner),
    ];
    for (field, value) in identity {
        if value.trim().is_empty() {
            return Err(EngineError::validation(format!(
                "company field {field} must not be empty"
            )));
        }
    }

    let total = revenue_patterns.len() + expense_patterns.len();
    if total > MAX_PATTERNS {
        return Err(EngineError::validation(format!(
            "{total} patterns exceed the limit of {MAX_PATTERNS}"
        )));
    }

    for pattern in revenue_patterns.iter().chain(expense_patterns) {
        validate_pattern(pattern)?;
    }
    Ok(())
}

fn validate_pattern(pattern: &Pattern) -> EngineResult<()> {
    if pattern.amount <= Decimal::ZERO {
        return Err(EngineError::validation(format!(
            "pattern {}: amount must be positive",
            pattern.id
        )));
    }
    if !(1..=12).contains(&pattern.start_month) {
        return Err(EngineError::validation(format!(
            "pattern {}: start month {} out of range [1, 12]",
            pattern.id, pattern.start_month
        )));
    }
    if pattern.frequency == Frequency::Daily {
        match pattern.days_mask {
            None => {
                return Err(EngineError::validation(format!(
                    "daily pattern {}: days_mask is required",
                    pattern.id
                )));
            }
            Some(mask) if mask > DAYS_MASK_MAX => {
                return Err(EngineError::validation(format!(
                    "daily pattern {}: days_mask {mask} out of range [0, {DAYS_MASK_MAX}]",
                    pattern.id
                )));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use simufisc_core::models::{ExpenseCategory, VatRate};

    fn company() -> Company {
        Company::new("c-1", "u-1", "Boulangerie Martin").with_profile(
            "SARL",
            "commerce",
            "10000",
            "Crédit Agricole",
        )
    }

    fn sales() -> Pattern {
        Pattern::revenue(
            "p-1",
            "Ventes",
            dec!(1200),
            Frequency::Monthly,
            1,
            VatRate::Standard,
        )
    }

    #[test]
    fn validation_rejects_out_of_range_year() {
        let config = FiscalConfig::new(2031, 1);
        let err = run_simulation(&config, &company(), &[sales()], &[], RunnerOptions::default())
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert!(err.to_string().contains("year"));
    }

    #[test]
    fn validation_rejects_incomplete_company() {
        let config = FiscalConfig::new(2024, 1);
        let mut company = company();
        company.bank_partner = String::new();
        let err = run_simulation(&config, &company, &[sales()], &[], RunnerOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("bank_partner"));
    }

    #[test]
    fn validation_rejects_pattern_flood() {
        let config = FiscalConfig::new(2024, 1);
        let patterns: Vec<Pattern> = (0..=MAX_PATTERNS)
            .map(|i| {
                Pattern::revenue(
                    format!("p-{i}"),
                    "Ventes",
                    dec!(100),
                    Frequency::Monthly,
                    1,
                    VatRate::Standard,
                )
            })
            .collect();
        let err = run_simulation(&config, &company(), &patterns, &[], RunnerOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("limit"));
    }

    #[test]
    fn validation_rejects_daily_without_mask() {
        let config = FiscalConfig::new(2024, 1);
        let mut pattern = sales();
        pattern.frequency = Frequency::Daily;
        let err = run_simulation(&config, &company(), &[pattern], &[], RunnerOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("days_mask"));
    }

    #[test]
    fn validation_rejects_non_positive_amount() {
        let config = FiscalConfig::new(2024, 1);
        let mut pattern = sales();
        pattern.amount = Decimal::ZERO;
        assert!(
            run_simulation(&config, &company(), &[pattern], &[], RunnerOptions::default())
                .is_err()
        );
    }

    #[test]
    fn run_produces_sorted_results_and_metadata() {
        let config = FiscalConfig::new(2024, 4).with_balance(Account::Operating, dec!(1000));
        let results = run_simulation(
            &config,
            &company(),
            &[sales()],
            &[Pattern::expense(
                "p-2",
                "Loyer",
                dec!(600),
                Frequency::Monthly,
                1,
                ExpenseCategory::Rent,
                true,
            )],
            RunnerOptions::default(),
        )
        .unwrap();

        assert_eq!(results.monthly_totals[0].month, 4);
        assert_eq!(results.monthly_totals[11].month, 3);
        assert_eq!(results.monthly_balances.len(), 48);
        assert_eq!(results.metadata.total_occurrences, 24);
        assert_eq!(results.metadata.engine_version, ENGINE_VERSION);
    }

    #[test]
    fn cancellation_stops_the_run() {
        let config = FiscalConfig::new(2024, 1);
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = run_simulation(
            &config,
            &company(),
            &[sales()],
            &[],
            RunnerOptions {
                cancel: Some(cancel),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Cancelled));
    }

    #[test]
    fn cancellation_emits_failed_snapshot() {
        let config = FiscalConfig::new(2024, 1);
        let broadcaster = Arc::new(ProgressBroadcaster::new("sim-cancel"));
        let cancel = CancelToken::new();
        cancel.cancel();
        let subscription = broadcaster.subscribe();
        let _ = run_simulation(
            &config,
            &company(),
            &[sales()],
            &[],
            RunnerOptions {
                simulation_id: Some("sim-cancel".into()),
                progress: Some(Arc::clone(&broadcaster)),
                cancel: Some(cancel),
                ..Default::default()
            },
        );

        let events: Vec<_> = subscription.collect();
        assert!(matches!(
            events.last().unwrap(),
            simufisc_core::models::ProgressEvent::Error { message } if message == "cancelled"
        ));
        let latest = broadcaster.latest_snapshot().unwrap();
        assert_eq!(latest.status, SimulationStatus::Failed);
    }
}
