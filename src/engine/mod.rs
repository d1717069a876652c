mod aggregate;
mod median;
mod pipeline;
mod prorate;
mod reconcile;
mod weights;

pub use aggregate::aggregate;
pub use median::{median_from_brackets, Bracket};
pub use pipeline::{run_family, FamilyOutput};
pub use prorate::prorate;
pub use reconcile::{reconcile, Reconciliation, ReconciliationRow};
pub use weights::normalized_weights;
