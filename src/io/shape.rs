use std::{collections::BTreeMap, sync::Arc};

use anyhow::{bail, Context, Result};
use shapefile::{dbase::FieldValue, Polygon, PolygonRing, Reader, Shape};

use crate::{config::LayerConfig, geometry::Geometries, layer::Layer, types::UnitId};

/// Read a polygon shapefile into a [`Layer`].
///
/// Every numeric attribute becomes an `f64` column (missing cells become 0);
/// every character attribute becomes a text column. The CRS is taken from the
/// configuration, not sniffed from the `.prj` file.
pub fn read_layer(name: &str, config: &LayerConfig) -> Result<Layer> {
    let mut reader = Reader::from_path(&config.path)
        .with_context(|| format!("failed to open shapefile: {}", config.path.display()))?;

    let mut ids: Vec<UnitId> = Vec::new();
    let mut shapes = Vec::new();
    let mut numeric: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    let mut text: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for (row, result) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) = result
            .with_context(|| format!("layer {name:?}: error reading shape+record at row {row}"))?;

        shapes.push(match shape {
            Shape::Polygon(polygon) => shp_to_geo(&polygon),
            Shape::NullShape => geo::MultiPolygon(vec![]),
            _ => bail!("layer {name:?}: row {row} is not a polygon"),
        });

        let id: UnitId = match record.get(&config.id_field) {
            Some(FieldValue::Character(Some(s))) => Arc::from(s.trim()),
            Some(FieldValue::Numeric(Some(n))) => Arc::from(n.to_string().as_str()),
            _ => bail!(
                "layer {name:?}: row {row} is missing id field {:?}",
                config.id_field
            ),
        };
        ids.push(id);

        for (field, value) in record {
            match value {
                FieldValue::Numeric(n) => {
                    numeric.entry(field).or_default().push(n.unwrap_or(0.0))
                }
                FieldValue::Float(f) => {
                    numeric.entry(field).or_default().push(f.unwrap_or(0.0) as f64)
                }
                FieldValue::Integer(i) => numeric.entry(field).or_default().push(i as f64),
                FieldValue::Double(d) => numeric.entry(field).or_default().push(d),
                FieldValue::Currency(c) => numeric.entry(field).or_default().push(c),
                FieldValue::Character(s) => {
                    text.entry(field).or_default().push(s.unwrap_or_default())
                }
                // Logical/date fields carry nothing the engine consumes.
                _ => {}
            }
        }
    }

    let geoms = Geometries::new(shapes, Some(config.epsg));
    let mut layer = Layer::new(name, ids, geoms)?;
    for (field, values) in numeric {
        layer.set_column(&field, values)?;
    }
    for (field, values) in text {
        layer.set_label_column(&field, values)?;
    }
    Ok(layer)
}

/// Convert a shapefile polygon (flat ring list, exterior rings followed by
/// their holes) into a `geo::MultiPolygon`.
fn shp_to_geo(polygon: &Polygon) -> geo::MultiPolygon<f64> {
    /// Ensure first and last are the same for geo::LineString coords
    fn ensure_closed(coords: &mut Vec<geo::Coord<f64>>) {
        if !coords.is_empty() && coords[0] != coords[coords.len() - 1] {
            coords.push(coords[0]);
        }
    }

    fn to_line_string(points: &[shapefile::Point]) -> geo::LineString<f64> {
        let mut coords: Vec<geo::Coord<f64>> =
            points.iter().map(|point| geo::Coord { x: point.x, y: point.y }).collect();
        ensure_closed(&mut coords);
        geo::LineString(coords)
    }

    let mut polygons: Vec<geo::Polygon<f64>> = Vec::new();
    let mut current_exterior: Option<geo::LineString<f64>> = None;
    let mut current_holes: Vec<geo::LineString<f64>> = Vec::new();

    for ring in polygon.rings() {
        match ring {
            PolygonRing::Outer(points) => {
                // flush previous polygon
                if let Some(exterior) = current_exterior.take() {
                    polygons.push(geo::Polygon::new(exterior, std::mem::take(&mut current_holes)));
                }
                current_exterior = Some(to_line_string(points));
            }
            PolygonRing::Inner(points) => current_holes.push(to_line_string(points)),
        }
    }
    if let Some(exterior) = current_exterior {
        polygons.push(geo::Polygon::new(exterior, current_holes));
    }

    geo::MultiPolygon(polygons)
}
