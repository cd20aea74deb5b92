pub mod error;
pub mod links;
pub mod logging;
