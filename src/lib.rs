#![doc = "Areal-weighted reapportionment of census demographics onto election precincts"]
pub mod cli;
pub mod commands;

mod config;
mod engine;
mod geometry;
mod io;
mod layer;
mod types;

#[doc(inline)]
pub use config::{
    BracketBound, Category, DerivedTotal, FamilyConfig, FamilyRun, LayerConfig, MedianConfig,
    Rounding, RunConfig,
};

#[doc(inline)]
pub use engine::{
    aggregate, median_from_brackets, normalized_weights, prorate, reconcile, run_family, Bracket,
    FamilyOutput, Reconciliation, ReconciliationRow,
};

#[doc(inline)]
pub use geometry::{assign, assign_with_tolerance, Assignment, Geometries};

#[doc(inline)]
pub use layer::Layer;

#[doc(inline)]
pub use types::{CoordinateSystemMismatch, UnitId};

#[doc(inline)]
pub use io::{read_layer, write_layer_geojson, write_reconciliation_csv, PropertyColumn};
