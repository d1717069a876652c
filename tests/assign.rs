// Integration tests for spatial assignment: maximal-overlap winner, sliver
// tolerance, tie-breaking, unassigned units, and CRS checking.

use geo::{Coord, MultiPolygon, Rect};
use precinctor::{assign, assign_with_tolerance, CoordinateSystemMismatch, Geometries};

fn square(x0: f64, y0: f64, width: f64, height: f64) -> MultiPolygon<f64> {
    MultiPolygon(vec![Rect::new(
        Coord { x: x0, y: y0 },
        Coord { x: x0 + width, y: y0 + height },
    )
    .to_polygon()])
}

fn unit_grid() -> Geometries {
    Geometries::new(
        vec![
            square(0.0, 0.0, 1.0, 1.0),
            square(1.0, 0.0, 1.0, 1.0),
            square(0.0, 1.0, 1.0, 1.0),
            square(1.0, 1.0, 1.0, 1.0),
        ],
        None,
    )
}

#[test]
fn nested_units_assign_to_their_container() {
    let containers = Geometries::new(
        vec![square(0.0, 0.0, 1.0, 2.0), square(1.0, 0.0, 1.0, 2.0)],
        None,
    );
    let assignment = assign(&unit_grid(), &containers).unwrap();

    let parents: Vec<_> = assignment.iter().collect();
    assert_eq!(parents, vec![Some(0), Some(1), Some(0), Some(1)]);
    assert_eq!(assignment.num_containers(), 2);
}

#[test]
fn straddling_unit_goes_to_the_larger_overlap() {
    // One fine square sitting 70/30 across the two containers.
    let fine = Geometries::new(vec![square(0.3, 0.0, 1.0, 1.0)], None);
    let containers = Geometries::new(
        vec![square(0.0, 0.0, 1.0, 2.0), square(1.0, 0.0, 1.0, 2.0)],
        None,
    );
    let assignment = assign(&fine, &containers).unwrap();
    assert_eq!(assignment.parent(0), Some(0));

    // Shifted so 70% lies in the second container.
    let fine = Geometries::new(vec![square(0.7, 0.0, 1.0, 1.0)], None);
    let assignment = assign(&fine, &containers).unwrap();
    assert_eq!(assignment.parent(0), Some(1));
}

#[test]
fn exact_tie_prefers_the_earlier_container() {
    let fine = Geometries::new(vec![square(0.5, 0.0, 1.0, 1.0)], None);
    let containers = Geometries::new(
        vec![square(0.0, 0.0, 1.0, 2.0), square(1.0, 0.0, 1.0, 2.0)],
        None,
    );
    let assignment = assign(&fine, &containers).unwrap();
    assert_eq!(assignment.parent(0), Some(0));
}

#[test]
fn disjoint_unit_stays_unassigned() {
    let fine = Geometries::new(
        vec![square(0.0, 0.0, 1.0, 1.0), square(10.0, 10.0, 1.0, 1.0)],
        None,
    );
    let containers = Geometries::new(vec![square(0.0, 0.0, 2.0, 2.0)], None);
    let assignment = assign(&fine, &containers).unwrap();
    assert_eq!(assignment.parent(0), Some(0));
    assert_eq!(assignment.parent(1), None);
}

#[test]
fn overlap_below_tolerance_counts_as_a_sliver() {
    // 0.001 x 1 overlap strip, area 1e-3.
    let fine = Geometries::new(vec![square(0.999, 0.0, 1.0, 1.0)], None);
    let containers = Geometries::new(vec![square(0.0, 0.0, 1.0, 1.0)], None);

    let assignment = assign_with_tolerance(&fine, &containers, 1e-2).unwrap();
    assert_eq!(assignment.parent(0), None);

    let assignment = assign_with_tolerance(&fine, &containers, 1e-6).unwrap();
    assert_eq!(assignment.parent(0), Some(0));
}

#[test]
fn mismatched_crs_fails_fast() {
    let fine = Geometries::new(vec![square(0.0, 0.0, 1.0, 1.0)], Some(5070));
    let containers = Geometries::new(vec![square(0.0, 0.0, 2.0, 2.0)], Some(4326));

    let err = assign(&fine, &containers).unwrap_err();
    let mismatch = err.downcast_ref::<CoordinateSystemMismatch>().unwrap();
    assert_eq!(mismatch.fine_epsg, 5070);
    assert_eq!(mismatch.container_epsg, 4326);
}

#[test]
fn assignment_is_deterministic_across_runs() {
    let containers = Geometries::new(
        vec![
            square(0.0, 0.0, 1.5, 2.0),
            square(0.5, 0.0, 1.5, 2.0),
            square(1.0, 0.0, 1.0, 2.0),
        ],
        None,
    );
    let first: Vec<_> = assign(&unit_grid(), &containers).unwrap().iter().collect();
    for _ in 0..10 {
        let again: Vec<_> = assign(&unit_grid(), &containers).unwrap().iter().collect();
        assert_eq!(first, again);
    }
}
