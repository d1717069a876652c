use std::{fs::File, io::BufWriter, path::Path};

use anyhow::{Context, Result};
use geo::MultiPolygon;
use serde_json::{json, Map, Value};

use crate::layer::Layer;

/// One output property column, borrowed from whoever computed it.
#[derive(Debug, Clone, Copy)]
pub enum PropertyColumn<'a> {
    Numeric(&'a str, &'a [f64]),
    /// Numeric with explicit undefined cells (written as JSON null).
    OptionalNumeric(&'a str, &'a [Option<f64>]),
    Text(&'a str, &'a [String]),
}

impl PropertyColumn<'_> {
    fn name(&self) -> &str {
        match self {
            PropertyColumn::Numeric(name, _)
            | PropertyColumn::OptionalNumeric(name, _)
            | PropertyColumn::Text(name, _) => name,
        }
    }

    fn value_at(&self, idx: usize) -> Value {
        match self {
            PropertyColumn::Numeric(_, values) => number_value(values[idx]),
            PropertyColumn::OptionalNumeric(_, values) => {
                values[idx].map_or(Value::Null, number_value)
            }
            PropertyColumn::Text(_, values) => Value::String(values[idx].clone()),
        }
    }
}

/// Integral values serialize as JSON integers so count columns round-trip
/// without a trailing `.0`.
fn number_value(value: f64) -> Value {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 9e15 {
        json!(value as i64)
    } else {
        json!(value)
    }
}

/// Write a layer and the given property columns as a GeoJSON
/// FeatureCollection. The layer's unit ids are always written under `"id"`.
pub fn write_layer_geojson(
    layer: &Layer,
    properties: &[PropertyColumn<'_>],
    path: &Path,
) -> Result<()> {
    let features: Vec<Value> = layer
        .geoms()
        .shapes()
        .iter()
        .enumerate()
        .map(|(idx, shape)| {
            let mut props = Map::new();
            props.insert("id".to_string(), Value::String(layer.ids()[idx].to_string()));
            for column in properties {
                props.insert(column.name().to_string(), column.value_at(idx));
            }
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": multipolygon_coords(shape),
                },
                "properties": props,
            })
        })
        .collect();

    let feature_collection = json!({
        "type": "FeatureCollection",
        "features": features,
    });

    let file = File::create(path)
        .with_context(|| format!("failed to create GeoJSON file: {}", path.display()))?;
    serde_json::to_writer(BufWriter::new(file), &feature_collection)
        .with_context(|| format!("failed to write GeoJSON to {}", path.display()))
}

/// GeoJSON MultiPolygon coordinates: per polygon, exterior ring first and
/// then the interior rings.
fn multipolygon_coords(shape: &MultiPolygon<f64>) -> Value {
    let polygons: Vec<Value> = shape
        .0
        .iter()
        .map(|polygon| {
            let mut rings = Vec::with_capacity(1 + polygon.interiors().len());
            rings.push(ring_coords(polygon.exterior()));
            for interior in polygon.interiors() {
                rings.push(ring_coords(interior));
            }
            json!(rings)
        })
        .collect();
    json!(polygons)
}

fn ring_coords(ring: &geo::LineString<f64>) -> Value {
    let coords: Vec<Vec<f64>> = ring.coords().map(|c| vec![c.x, c.y]).collect();
    json!(coords)
}
