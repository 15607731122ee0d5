//! Ranking and tracking runs
//!
//! A pipeline run has two independent halves. The ranking run joins sales
//! and reviews, scores the joined rows and orders shops by predicted sales;
//! its result is advisory and any failure leaves it empty. The tracking run
//! aggregates the orders of one product per shop, splits them into quick and
//! normal legs and simulates a shipment timeline per leg. A leg that cannot
//! be simulated is reported and skipped without affecting the others.

use std::fmt;
use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use crate::algorithm::features::{TableColumns, build_features};
use crate::algorithm::ranking::{collapse_per_shop, rank};
use crate::algorithm::scoring::{DemandScorer, Scorer};
use crate::algorithm::splitting::{PolicyNotice, split};
use crate::algorithm::{aggregate, select_orders};
use crate::config::{PipelineConfig, QuickOrderConfig, SimulationConfig};
use crate::error::{Error, Result};
use crate::models::{
    AggregatedOrder, RankedEntry, RawOrder, SimulatedShipment, SubOrder, TrackingEvent,
    TrackingLog,
};
use crate::utils::arrow::combine_batches;
use crate::utils::logging::{create_progress_bar, finish_progress_bar};
use crate::utils::normalize::ShopNameMapping;

/// Rank shops by the scorer's predicted sales
///
/// Joined rows are collapsed to one score per shop before ranking.
///
/// # Errors
/// Returns [`Error::EmptyJoin`] if no shop appears in both tables and
/// [`Error::ModelLoad`] if the features do not fit the scorer
pub fn rank_stores(
    sales: &RecordBatch,
    reviews: &RecordBatch,
    scorer: &dyn Scorer,
    columns: &TableColumns,
) -> Result<Vec<RankedEntry>> {
    let features = build_features(sales, reviews, columns)?;
    let scores = scorer.score(&features.features)?;
    let (shop_ids, scores) = collapse_per_shop(&features.shop_ids, &scores);
    rank(&shop_ids, &scores)
}

/// Ranking run result; empty with the cause when ranking failed
#[derive(Debug, Default)]
pub struct RankingOutcome {
    /// Shops, best first
    pub ranking: Vec<RankedEntry>,
    /// Why no ranking was produced
    pub error: Option<Error>,
}

impl RankingOutcome {
    /// Whether a ranking was produced
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of a tracking run that found orders to ship
#[derive(Debug, Default)]
pub struct TrackingReport {
    /// One order per shop, sorted by shop
    pub aggregated: Vec<AggregatedOrder>,
    /// Simulated legs in aggregation order, quick leg first per shop
    pub shipments: Vec<SimulatedShipment>,
    /// Quick order requests that fell back to normal shipping
    pub notices: Vec<PolicyNotice>,
    /// Legs that could not be simulated
    pub rejected: Vec<Error>,
}

impl TrackingReport {
    /// Consolidated tracking log of all simulated legs
    #[must_use]
    pub fn log(&self) -> TrackingLog {
        self.shipments
            .iter()
            .flat_map(|shipment| shipment.events.iter().copied())
            .collect()
    }

    /// Total number of tracking events
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.shipments.iter().map(|shipment| shipment.events.len()).sum()
    }
}

impl fmt::Display for TrackingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tracking Summary:")?;
        writeln!(f, "  Shops: {}", self.aggregated.len())?;
        writeln!(f, "  Shipped Legs: {}", self.shipments.len())?;
        writeln!(f, "  Events: {}", self.event_count())?;
        for shipment in &self.shipments {
            if let Some(delivered) = shipment.delivered_at() {
                writeln!(
                    f,
                    "    {}: {} units, {}, delivered {delivered} ({}h)",
                    shipment.sub_order.shop_id,
                    shipment.sub_order.quantity,
                    shipment.sub_order.kind,
                    shipment.transit_hours()
                )?;
            }
        }
        for notice in &self.notices {
            writeln!(f, "  Notice: {notice}")?;
        }
        for error in &self.rejected {
            writeln!(f, "  Rejected: {error}")?;
        }
        Ok(())
    }
}

/// Tracking run result
#[derive(Debug)]
pub enum TrackingOutcome {
    /// No order of the product could be scheduled
    NoValidOrders {
        /// Product that was requested
        product: String,
    },
    /// Orders were aggregated and simulated
    Tracked(TrackingReport),
}

impl TrackingOutcome {
    /// The report, if orders were tracked
    #[must_use]
    pub const fn report(&self) -> Option<&TrackingReport> {
        match self {
            Self::Tracked(report) => Some(report),
            Self::NoValidOrders { .. } => None,
        }
    }
}

/// Select, aggregate, split and simulate the orders of one product
///
/// # Errors
/// Returns [`Error::Config`] if the simulation thread pool cannot be built
pub fn track_orders(
    orders: &[RawOrder],
    product_name: &str,
    quick: &QuickOrderConfig,
    simulation: &SimulationConfig,
) -> Result<TrackingOutcome> {
    let selected = select_orders(orders, product_name);
    if selected.is_empty() {
        log::warn!("No valid orders found for product '{product_name}'");
        return Ok(TrackingOutcome::NoValidOrders {
            product: product_name.to_string(),
        });
    }
    log::info!(
        "Selected {} of {} orders for product '{product_name}'",
        selected.len(),
        orders.len()
    );

    let aggregated = aggregate(selected);
    track_aggregated(aggregated, quick, simulation).map(TrackingOutcome::Tracked)
}

/// Split and simulate already aggregated orders
///
/// Orders are not re-validated here: a missing date or non-positive quantity
/// surfaces as a rejected [`Error::InvalidSubOrder`] in the report.
///
/// # Errors
/// Returns [`Error::Config`] if the simulation thread pool cannot be built
pub fn track_aggregated(
    aggregated: Vec<AggregatedOrder>,
    quick: &QuickOrderConfig,
    simulation: &SimulationConfig,
) -> Result<TrackingReport> {
    let mut legs = Vec::with_capacity(aggregated.len() * 2);
    let mut notices = Vec::new();
    for order in &aggregated {
        let outcome = split(order, quick.quantity_for(&order.shop_id), quick.enabled);
        legs.extend(outcome.legs);
        notices.extend(outcome.notice);
    }

    let results = simulate_legs(&legs, simulation)?;

    let mut shipments = Vec::with_capacity(legs.len());
    let mut rejected = Vec::new();
    for (sub_order, result) in legs.into_iter().zip(results) {
        match result {
            Ok(events) => shipments.push(SimulatedShipment { sub_order, events }),
            Err(error) => {
                log::warn!("Skipping sub-order: {error}");
                rejected.push(error);
            }
        }
    }

    log::info!(
        "Simulated {} of {} legs for {} shops",
        shipments.len(),
        shipments.len() + rejected.len(),
        aggregated.len()
    );
    Ok(TrackingReport {
        aggregated,
        shipments,
        notices,
        rejected,
    })
}

/// Random sources for `count` legs, in leg order
///
/// With a seed, a generator seeded once draws one seed per leg before any leg
/// is simulated, so the outcome does not depend on which thread simulates
/// which leg. Without a seed every leg uses OS entropy.
#[must_use]
pub fn leg_rngs(seed: Option<u64>, count: usize) -> Vec<StdRng> {
    match seed {
        Some(seed) => {
            let mut seeds = StdRng::seed_from_u64(seed);
            (0..count)
                .map(|_| StdRng::seed_from_u64(seeds.random()))
                .collect()
        }
        None => (0..count).map(|_| StdRng::from_os_rng()).collect(),
    }
}

fn simulate_legs(
    legs: &[SubOrder],
    config: &SimulationConfig,
) -> Result<Vec<Result<Vec<TrackingEvent>>>> {
    let simulator = config.simulator();
    let progress = create_progress_bar(
        legs.len() as u64,
        Some("Simulating shipments"),
        config.show_progress,
    );

    let rngs = leg_rngs(config.seed, legs.len());

    let simulate_leg = |(leg, mut rng): (&SubOrder, StdRng)| {
        let result = simulator.simulate(leg, &mut rng);
        progress.inc(1);
        result
    };

    let results: Vec<Result<Vec<TrackingEvent>>> = if config.parallel && legs.len() > 1 {
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.thread_count())
            .build()
            .map_err(|e| Error::Config(format!("Failed to build simulation thread pool: {e}")))?;
        pool.install(|| legs.par_iter().zip(rngs).map(simulate_leg).collect())
    } else {
        legs.iter().zip(rngs).map(simulate_leg).collect()
    };

    finish_progress_bar(&progress, Some("Simulation complete"));
    Ok(results)
}

/// Everything a run consumes, already loaded
///
/// Sales and reviews keep their load errors: they only disable the ranking.
#[derive(Debug)]
pub struct PipelineInputs {
    /// Sales table batches
    pub sales: Result<Vec<RecordBatch>>,
    /// Review table batches
    pub reviews: Result<Vec<RecordBatch>>,
    /// Order rows
    pub orders: Vec<RawOrder>,
}

/// Result of a full run
#[derive(Debug)]
pub struct PipelineReport {
    /// Advisory store ranking
    pub ranking: RankingOutcome,
    /// Shipment tracking
    pub tracking: TrackingOutcome,
}

/// A configured pipeline with an optionally injected scorer
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    scorer: Option<Arc<dyn Scorer>>,
}

impl Pipeline {
    /// Create a pipeline that loads its scorer from the configured model file
    #[must_use]
    pub const fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            scorer: None,
        }
    }

    /// Use `scorer` instead of loading one
    #[must_use]
    pub fn with_scorer(mut self, scorer: Arc<dyn Scorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    /// Configuration of this pipeline
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn scorer(&self) -> Result<Arc<dyn Scorer>> {
        match &self.scorer {
            Some(scorer) => Ok(Arc::clone(scorer)),
            None => Ok(Arc::new(DemandScorer::load(
                &self.config.paths.model,
                self.config.scorer.hidden_size,
            )?)),
        }
    }

    /// Run the ranking half; failures yield an empty ranking with the cause
    pub fn rank(
        &self,
        sales: Result<&[RecordBatch]>,
        reviews: Result<&[RecordBatch]>,
    ) -> RankingOutcome {
        match self.try_rank(sales, reviews) {
            Ok(ranking) => {
                log::info!("Ranked {} shops", ranking.len());
                RankingOutcome {
                    ranking,
                    error: None,
                }
            }
            Err(error) => {
                if error.is_ranking_error() {
                    log::warn!("Store ranking skipped: {error}");
                } else {
                    log::error!("Store ranking failed: {error}");
                }
                RankingOutcome {
                    ranking: Vec::new(),
                    error: Some(error),
                }
            }
        }
    }

    fn try_rank(
        &self,
        sales: Result<&[RecordBatch]>,
        reviews: Result<&[RecordBatch]>,
    ) -> Result<Vec<RankedEntry>> {
        let sales = combine_batches(sales?)?
            .ok_or_else(|| Error::data_source("Sales table has no rows"))?;
        let reviews = combine_batches(reviews?)?
            .ok_or_else(|| Error::data_source("Review table has no rows"))?;
        let scorer = self.scorer()?;

        let names = self.config.shop_name_mapping();
        Ok(display_names(
            rank_stores(&sales, &reviews, scorer.as_ref(), &self.config.table_columns)?,
            &names,
        ))
    }

    /// Run the tracking half
    pub fn track(&self, orders: &[RawOrder]) -> Result<TrackingOutcome> {
        track_orders(
            orders,
            &self.config.product_name,
            &self.config.quick_orders,
            &self.config.simulation,
        )
    }

    /// Run ranking, then tracking
    ///
    /// # Errors
    /// Only tracking failures are returned; ranking failures are recorded in
    /// the report
    pub fn run(&self, inputs: &PipelineInputs) -> Result<PipelineReport> {
        let ranking = self.rank(
            inputs.sales.as_deref().map_err(clone_load_error),
            inputs.reviews.as_deref().map_err(clone_load_error),
        );
        let tracking = self.track(&inputs.orders)?;
        Ok(PipelineReport { ranking, tracking })
    }
}

fn display_names(ranking: Vec<RankedEntry>, names: &ShopNameMapping) -> Vec<RankedEntry> {
    if names.is_empty() {
        return ranking;
    }
    ranking
        .into_iter()
        .map(|entry| RankedEntry::new(names.rename(&entry.shop_id), entry.score))
        .collect()
}

/// Load errors are owned by the inputs; the ranking keeps its own copy
fn clone_load_error(error: &Error) -> Error {
    match error {
        Error::DataSource { path, message } => Error::DataSource {
            path: path.clone(),
            message: message.clone(),
        },
        other => Error::data_source(other.to_string()),
    }
}
