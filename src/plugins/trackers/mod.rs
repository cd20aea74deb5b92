// Value tracker implementations
pub mod price;

pub use price::PriceTracker;
