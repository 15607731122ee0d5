//! Configuration for a pipeline run.
//!
//! Every section has defaults, so a JSON file only needs the values that
//! differ. [`PipelineConfig::from_file`] reads such a file and validates it.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::algorithm::features::TableColumns;
use crate::algorithm::scoring::DEFAULT_HIDDEN_SIZE;
use crate::algorithm::shipment::{ShipmentSimulator, TransitProfile};
use crate::error::util::safe_read_to_string;
use crate::error::{Error, Result};
use crate::utils::dates::DateFormatConfig;
use crate::utils::normalize::ShopNameMapping;

/// Input and output locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Per-shop sales table
    pub sales: PathBuf,
    /// Per-shop review table
    pub reviews: PathBuf,
    /// Pending product orders
    pub orders: PathBuf,
    /// Scorer parameters
    pub model: PathBuf,
    /// Tracking log destination
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            sales: PathBuf::from("shop_sale.csv"),
            reviews: PathBuf::from("shop_reviews.csv"),
            orders: PathBuf::from("orders.csv"),
            model: PathBuf::from("ranking_model.json"),
            output: PathBuf::from("demand_data.csv"),
        }
    }
}

/// Column names of the order table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderColumns {
    /// Product being ordered
    pub product_name: String,
    /// Ordering shop
    pub shop: String,
    /// Order date as text
    pub order_date: String,
    /// Ordered quantity
    pub quantity: String,
}

impl Default for OrderColumns {
    fn default() -> Self {
        Self {
            product_name: "Product Name".to_string(),
            shop: "Shop".to_string(),
            order_date: "Order Date".to_string(),
            quantity: "Order Quantity".to_string(),
        }
    }
}

/// Scorer shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// Width of the hidden layer
    pub hidden_size: usize,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            hidden_size: DEFAULT_HIDDEN_SIZE,
        }
    }
}

/// Quick order policy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuickOrderConfig {
    /// Whether orders may be split into a quick leg
    pub enabled: bool,
    /// Quick quantity requested for shops without an override
    pub requested_quantity: i64,
    /// Quick quantity per shop, keyed by display identifier
    pub per_shop: BTreeMap<String, i64>,
}

impl QuickOrderConfig {
    /// Quick quantity requested for `shop_id`
    #[must_use]
    pub fn quantity_for(&self, shop_id: &str) -> i64 {
        self.per_shop
            .get(shop_id)
            .copied()
            .unwrap_or(self.requested_quantity)
    }
}

/// Shipment simulation settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Transit profile of quick legs
    pub quick: TransitProfile,
    /// Transit profile of normal legs
    pub normal: TransitProfile,
    /// Seed for reproducible runs; OS entropy when absent
    pub seed: Option<u64>,
    /// Simulate legs on a thread pool
    pub parallel: bool,
    /// Pool size; the number of CPUs when absent
    pub threads: Option<usize>,
    /// Show a progress bar while simulating
    pub show_progress: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            quick: TransitProfile::QUICK,
            normal: TransitProfile::NORMAL,
            seed: None,
            parallel: true,
            threads: None,
            show_progress: false,
        }
    }
}

impl SimulationConfig {
    /// Simulator for the configured profiles
    #[must_use]
    pub const fn simulator(&self) -> ShipmentSimulator {
        ShipmentSimulator::new(self.quick, self.normal)
    }

    /// Number of worker threads to use
    #[must_use]
    pub fn thread_count(&self) -> usize {
        self.threads.unwrap_or_else(num_cpus::get).max(1)
    }
}

/// Complete configuration of a pipeline run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Product whose orders are tracked
    pub product_name: String,
    /// Input and output locations
    pub paths: PathsConfig,
    /// Column roles of the sales and review tables
    pub table_columns: TableColumns,
    /// Column names of the order table
    pub order_columns: OrderColumns,
    /// Scorer shape
    pub scorer: ScorerConfig,
    /// Quick order policy
    pub quick_orders: QuickOrderConfig,
    /// Shipment simulation settings
    pub simulation: SimulationConfig,
    /// Raw order shop identifier to display identifier
    pub shop_names: BTreeMap<String, String>,
    /// Accepted order date formats
    pub date_formats: DateFormatConfig,
}

impl PipelineConfig {
    /// Create a builder starting from the defaults
    #[must_use]
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }

    /// Load and validate a JSON configuration file
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the file is unreadable, malformed or
    /// invalid
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = safe_read_to_string(path, "loading configuration")
            .map_err(|e| Error::Config(e.to_string()))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values that defaults cannot guarantee
    ///
    /// # Errors
    /// Returns [`Error::Config`] naming the first invalid setting
    pub fn validate(&self) -> Result<()> {
        self.simulation.quick.validate()?;
        self.simulation.normal.validate()?;

        if self.scorer.hidden_size == 0 {
            return Err(Error::Config("scorer.hidden_size must be positive".to_string()));
        }
        if self.simulation.threads == Some(0) {
            return Err(Error::Config(
                "simulation.threads must be positive when set".to_string(),
            ));
        }
        if self.table_columns.shop_id.is_empty() || self.table_columns.sales_total.is_empty() {
            return Err(Error::Config(
                "table_columns.shop_id and table_columns.sales_total must be set".to_string(),
            ));
        }
        if self.product_name.trim().is_empty() {
            log::warn!("No product_name configured; the tracking run will find no orders");
        }
        Ok(())
    }

    /// Display names applied to order shops and the ranking
    #[must_use]
    pub fn shop_name_mapping(&self) -> ShopNameMapping {
        ShopNameMapping::new(self.shop_names.clone())
    }
}

impl fmt::Display for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pipeline Configuration:")?;
        writeln!(f, "  Product: {}", self.product_name)?;
        writeln!(f, "  Sales: {}", self.paths.sales.display())?;
        writeln!(f, "  Reviews: {}", self.paths.reviews.display())?;
        writeln!(f, "  Orders: {}", self.paths.orders.display())?;
        writeln!(f, "  Model: {}", self.paths.model.display())?;
        writeln!(f, "  Output: {}", self.paths.output.display())?;
        writeln!(f, "  Quick Orders: {}", self.quick_orders.enabled)?;
        if let Some(seed) = self.simulation.seed {
            writeln!(f, "  Seed: {seed}")?;
        }
        if self.simulation.parallel {
            writeln!(f, "  Threads: {}", self.simulation.thread_count())?;
        }
        Ok(())
    }
}

/// Builder for constructing a pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl Default for PipelineConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineConfigBuilder {
    /// Create a new builder with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    /// Set the tracked product
    #[must_use]
    pub fn product_name(mut self, product_name: impl Into<String>) -> Self {
        self.config.product_name = product_name.into();
        self
    }

    /// Set the input and output locations
    #[must_use]
    pub fn paths(mut self, paths: PathsConfig) -> Self {
        self.config.paths = paths;
        self
    }

    /// Set the sales and review column roles
    #[must_use]
    pub fn table_columns(mut self, columns: TableColumns) -> Self {
        self.config.table_columns = columns;
        self
    }

    /// Set the hidden layer width of the scorer
    #[must_use]
    pub const fn hidden_size(mut self, hidden_size: usize) -> Self {
        self.config.scorer.hidden_size = hidden_size;
        self
    }

    /// Enable quick orders with a default requested quantity
    #[must_use]
    pub const fn quick_orders(mut self, requested_quantity: i64) -> Self {
        self.config.quick_orders.enabled = true;
        self.config.quick_orders.requested_quantity = requested_quantity;
        self
    }

    /// Request a quick quantity for one shop
    #[must_use]
    pub fn quick_quantity_for(mut self, shop_id: impl Into<String>, quantity: i64) -> Self {
        self.config.quick_orders.enabled = true;
        self.config.quick_orders.per_shop.insert(shop_id.into(), quantity);
        self
    }

    /// Set the random seed
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.config.simulation.seed = Some(seed);
        self
    }

    /// Set whether to simulate in parallel
    #[must_use]
    pub const fn parallel(mut self, parallel: bool) -> Self {
        self.config.simulation.parallel = parallel;
        self
    }

    /// Set the worker thread count
    #[must_use]
    pub const fn threads(mut self, threads: usize) -> Self {
        self.config.simulation.threads = Some(threads);
        self
    }

    /// Add a display name for a raw shop identifier
    #[must_use]
    pub fn shop_name(mut self, raw: impl Into<String>, display: impl Into<String>) -> Self {
        self.config.shop_names.insert(raw.into(), display.into());
        self
    }

    /// Build the configuration
    #[must_use]
    pub fn build(self) -> PipelineConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        std::fs::write(
            &path,
            r#"{
                "product_name": "Laptop",
                "quick_orders": { "enabled": true, "per_shop": { "Shop_B": 2 } },
                "simulation": { "seed": 7, "quick": { "mean_hours": 24.0, "std_dev_hours": 6.0 } },
                "shop_names": { "shop1": "Shop_B" }
            }"#,
        )
        .unwrap();

        let config = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(config.product_name, "Laptop");
        assert_eq!(config.paths, PathsConfig::default());
        assert_eq!(config.scorer.hidden_size, 64);
        assert_eq!(config.quick_orders.quantity_for("Shop_B"), 2);
        assert_eq!(config.quick_orders.quantity_for("Shop_A"), 0);
        assert_eq!(config.simulation.seed, Some(7));
        assert_eq!(config.simulation.quick, TransitProfile::new(24.0, 6.0));
        assert_eq!(config.simulation.normal, TransitProfile::NORMAL);
        assert_eq!(config.shop_name_mapping().rename("shop1"), "Shop_B");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let config = PipelineConfig::builder().hidden_size(0).build();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = PipelineConfig::builder().threads(0).build();
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.simulation.normal = TransitProfile::new(120.0, -1.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_and_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            PipelineConfig::from_file(&dir.path().join("absent.json")),
            Err(Error::Config(_))
        ));

        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ \"product_name\": 3 }").unwrap();
        assert!(matches!(PipelineConfig::from_file(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_builder() {
        let config = PipelineConfig::builder()
            .product_name("Laptop")
            .quick_quantity_for("Shop_A", 3)
            .seed(11)
            .parallel(false)
            .shop_name("shop3", "Shop_A")
            .build();
        assert!(config.quick_orders.enabled);
        assert_eq!(config.quick_orders.quantity_for("Shop_A"), 3);
        assert!(!config.simulation.parallel);
        assert!(config.to_string().contains("Seed: 11"));
    }
}
