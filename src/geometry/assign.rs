use anyhow::Result;
use geo::{Area, BooleanOps, BoundingRect};
use rstar::AABB;

use crate::types::CoordinateSystemMismatch;

use super::Geometries;

/// Intersection area (in squared CRS units) below which an overlap is treated
/// as a floating-point or topological sliver rather than a real containment.
pub const DEFAULT_AREA_TOLERANCE: f64 = 1e-6;

/// Mapping from each fine unit to the container it predominantly overlaps,
/// or `None` where no container overlaps it. Computed once per layer pair
/// and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Assignment {
    parents: Vec<Option<u32>>,
    num_containers: usize,
}

impl Assignment {
    /// Build an assignment directly from a parent vector.
    /// Useful for synthetic fixtures and for callers that already know the
    /// nesting relationship from attribute data.
    pub fn from_parents(parents: Vec<Option<u32>>, num_containers: usize) -> Self {
        debug_assert!(parents
            .iter()
            .flatten()
            .all(|&p| (p as usize) < num_containers));
        Self { parents, num_containers }
    }

    /// Number of fine units covered by this assignment.
    #[inline]
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Number of containers on the coarse side, including empty ones.
    #[inline]
    pub fn num_containers(&self) -> usize {
        self.num_containers
    }

    /// Container index of a fine unit, or `None` if unassigned.
    #[inline]
    pub fn parent(&self, fine: usize) -> Option<u32> {
        self.parents[fine]
    }

    /// Iterate parents in fine-unit order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = Option<u32>> + '_ {
        self.parents.iter().copied()
    }
}

/// Assign every fine geometry to the container it shares the most area with.
///
/// Fails with [`CoordinateSystemMismatch`] when both layers carry EPSG codes
/// and they differ; layers with an unknown CRS are assumed pre-validated by
/// the caller.
pub fn assign(fine: &Geometries, containers: &Geometries) -> Result<Assignment> {
    assign_with_tolerance(fine, containers, DEFAULT_AREA_TOLERANCE)
}

/// [`assign`] with an explicit sliver tolerance. A fine unit whose total
/// overlap with every candidate container stays at or below `tolerance`
/// is left unassigned.
///
/// Deterministic: candidates are visited in container input order (never
/// R-tree iteration order) and exact area ties keep the earliest container.
pub fn assign_with_tolerance(
    fine: &Geometries,
    containers: &Geometries,
    tolerance: f64,
) -> Result<Assignment> {
    if let (Some(fine_epsg), Some(container_epsg)) = (fine.epsg(), containers.epsg()) {
        if fine_epsg != container_epsg {
            return Err(CoordinateSystemMismatch { fine_epsg, container_epsg }.into());
        }
    }

    let mut parents = Vec::with_capacity(fine.len());

    for shape in fine.shapes() {
        let Some(rect) = shape.bounding_rect() else {
            parents.push(None);
            continue;
        };
        let search = AABB::from_corners(rect.min().into(), rect.max().into());

        let mut candidates: Vec<usize> = containers.query(&search).map(|bb| bb.idx()).collect();
        candidates.sort_unstable();

        let mut best: Option<(usize, f64)> = None;
        for idx in candidates {
            let overlap = shape.intersection(&containers.shapes()[idx]).unsigned_area();
            if overlap <= tolerance {
                continue;
            }
            // Strict > keeps the earliest container on exact ties.
            if best.map_or(true, |(_, area)| overlap > area) {
                best = Some((idx, overlap));
            }
        }

        parents.push(best.map(|(idx, _)| idx as u32));
    }

    Ok(Assignment { parents, num_containers: containers.len() })
}
