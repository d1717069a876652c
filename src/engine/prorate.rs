use crate::geometry::Assignment;

/// Distribute per-container source values down to fine units by normalized
/// weight. Pre-rounding, each container's value is conserved: the sum of its
/// units' shares equals the container value whenever its weights sum to 1.
///
/// Unassigned units and units in zero-weight containers receive 0, never a
/// missing value that could poison downstream sums.
pub fn prorate(assignment: &Assignment, source_values: &[f64], weights: &[f64]) -> Vec<f64> {
    debug_assert_eq!(assignment.num_containers(), source_values.len());
    debug_assert_eq!(assignment.len(), weights.len());

    assignment
        .iter()
        .enumerate()
        .map(|(unit, parent)| match parent {
            Some(p) => source_values[p as usize] * weights[unit],
            None => 0.0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::normalized_weights;

    #[test]
    fn conserves_container_mass_before_rounding() {
        let assignment = Assignment::from_parents(vec![Some(0), Some(0), Some(1), Some(1)], 2);
        let weights = normalized_weights(&assignment, &[1.0, 3.0, 2.0, 2.0]);
        let values = prorate(&assignment, &[100.0, 200.0], &weights);

        assert!((values[0] + values[1] - 100.0).abs() < 1e-9);
        assert!((values[2] + values[3] - 200.0).abs() < 1e-9);
        assert_eq!(values[0], 25.0);
    }

    #[test]
    fn unassigned_units_receive_zero() {
        let assignment = Assignment::from_parents(vec![Some(0), None], 1);
        let values = prorate(&assignment, &[50.0], &[1.0, 0.0]);
        assert_eq!(values, vec![50.0, 0.0]);
    }
}
