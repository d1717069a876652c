mod csv;
mod geojson;
mod shape;

pub use csv::write_reconciliation_csv;
pub use geojson::{write_layer_geojson, PropertyColumn};
pub use shape::read_layer;
