use std::path::{Path, PathBuf};

use shop_logistics::config::PathsConfig;
use shop_logistics::utils::test::{visitor_model, write_text};
use shop_logistics::Result;

/// Hidden layer width used by the test model
pub const TEST_HIDDEN_SIZE: usize = 4;

pub const SALES_CSV: &str = "Shop_ID,Month,Total_Sales_Amount,Visitors\n\
    Shop A,2024-01,1200.5,10\n\
    Shop B,2024-01,800.0,4\n\
    Shop C,2024-01,300.0,1\n";

pub const REVIEWS_CSV: &str = "Shop_ID,Review ID,Review Text,Rating\n\
    Shop_A,1,great,5\n\
    Shop_B,2,ok,3\n\
    Shop_C,3,slow,1\n";

pub const ORDERS_CSV: &str = "Product Name,Shop,Order Date,Order Quantity\n\
    Laptop,shop1,2024-01-05,3\n\
    Laptop,shop1,2024-01-07,2\n\
    Laptop,shop2,2024-01-06,4\n\
    Phone,shop3,2024-01-05,9\n\
    Laptop,shop3,,6\n";

/// Write a complete set of input files into `dir`
pub fn write_inputs(dir: &Path) -> Result<PathsConfig> {
    let paths = PathsConfig {
        sales: dir.join("shop_sale.csv"),
        reviews: dir.join("shop_reviews.csv"),
        orders: dir.join("orders.csv"),
        model: dir.join("ranking_model.json"),
        output: dir.join("demand_data.csv"),
    };
    write_text(&paths.sales, SALES_CSV)?;
    write_text(&paths.reviews, REVIEWS_CSV)?;
    write_text(&paths.orders, ORDERS_CSV)?;
    visitor_model(TEST_HIDDEN_SIZE).save(&paths.model)?;
    Ok(paths)
}

/// A path inside `dir` that does not exist
#[must_use]
pub fn missing_file(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("missing_{name}"))
}
