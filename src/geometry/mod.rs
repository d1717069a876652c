mod assign;
pub(crate) mod proj;

use geo::{BoundingRect, MultiPolygon, Rect};
use rstar::{RTree, RTreeObject, AABB};

pub use assign::{assign, assign_with_tolerance, Assignment, DEFAULT_AREA_TOLERANCE};

#[derive(Debug, Clone)]
pub(crate) struct BoundingBox {
    idx: usize, // Index of corresponding MultiPolygon in shapes
    bbox: Rect<f64>,
}

impl BoundingBox {
    fn new(idx: usize, bbox: Rect<f64>) -> Self {
        Self { idx, bbox }
    }

    #[inline]
    pub(crate) fn idx(&self) -> usize {
        self.idx
    }
}

impl RTreeObject for BoundingBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}

/// A collection of MultiPolygons with a spatial index and a known CRS.
#[derive(Debug, Clone)]
pub struct Geometries {
    shapes: Vec<MultiPolygon<f64>>,
    rtree: RTree<BoundingBox>,
    epsg: Option<u32>, // EPSG code, if known
}

impl Geometries {
    /// Construct a Geometries object from a vector of MultiPolygons.
    /// Degenerate shapes without a bounding rectangle are kept in `shapes`
    /// (indices stay aligned with the caller's units) but never become
    /// spatial-query candidates.
    pub fn new(polygons: Vec<MultiPolygon<f64>>, epsg: Option<u32>) -> Self {
        Self {
            rtree: RTree::bulk_load(
                polygons
                    .iter()
                    .enumerate()
                    .filter_map(|(i, polygon)| {
                        polygon.bounding_rect().map(|rect| BoundingBox::new(i, rect))
                    })
                    .collect(),
            ),
            shapes: polygons,
            epsg,
        }
    }

    /// Get the number of MultiPolygons.
    #[inline]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Check if there are no MultiPolygons.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Get a reference to the list of MultiPolygons.
    #[inline]
    pub fn shapes(&self) -> &[MultiPolygon<f64>] {
        &self.shapes
    }

    /// Get the EPSG code, if known.
    #[inline]
    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    /// Query the R-tree for bounding boxes intersecting the given envelope.
    #[inline]
    pub(crate) fn query(&self, envelope: &AABB<[f64; 2]>) -> impl Iterator<Item = &BoundingBox> {
        self.rtree.locate_in_envelope_intersecting(envelope)
    }

    /// Reproject all shapes into another CRS, producing a new collection.
    /// Errors if either EPSG code has no registered PROJ.4 definition.
    pub fn reprojected(&self, to_epsg: u32) -> anyhow::Result<Geometries> {
        let from_epsg = match self.epsg {
            Some(code) => code,
            None => anyhow::bail!("cannot reproject a geometry collection with unknown CRS"),
        };
        if from_epsg == to_epsg {
            return Ok(self.clone());
        }
        let shapes = proj::reproject(&self.shapes, from_epsg, to_epsg)?;
        Ok(Geometries::new(shapes, Some(to_epsg)))
    }
}
