use std::path::PathBuf;

/// Locations of the pipeline inputs and outputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Customer reference CSV (`customer_id`, `loyalty_score`).
    pub customers_location: PathBuf,
    /// Product reference CSV (`product_id`, `product_category`).
    pub products_location: PathBuf,
    /// Directory whose subdirectories each hold a `transactions.json`.
    pub transactions_location: PathBuf,
    /// Directory receiving the `Week_<date>.json` reports.
    pub output_location: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            customers_location: PathBuf::from("./input_data/starter/customers.csv"),
            products_location: PathBuf::from("./input_data/starter/products.csv"),
            transactions_location: PathBuf::from("./input_data/starter/transactions/"),
            output_location: PathBuf::from("./output_data/outputs/"),
        }
    }
}

impl PipelineConfig {
    /// Replace each location that is `Some`, keeping the current value otherwise.
    pub fn with_overrides(
        self,
        customers_location: Option<PathBuf>,
        products_location: Option<PathBuf>,
        transactions_location: Option<PathBuf>,
        output_location: Option<PathBuf>,
    ) -> Self {
        Self {
            customers_location: customers_location.unwrap_or(self.customers_location),
            products_location: products_location.unwrap_or(self.products_location),
            transactions_location: transactions_location.unwrap_or(self.transactions_location),
            output_location: output_location.unwrap_or(self.output_location),
        }
    }
}
