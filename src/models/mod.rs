pub mod entry;
pub mod evaluation;
pub mod seen_record;
pub mod watch;

// Re-exports for convenience
pub use entry::*;
pub use evaluation::*;
pub use seen_record::*;
pub use watch::*;

/// Human form of an amount: whole numbers without decimals, everything else
/// with two.
pub fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}
