use crate::geometry::Assignment;

/// Normalize a per-fine-unit covariate within each container.
///
/// For every container the covariate is summed over its assigned fine units;
/// each unit's weight is its covariate divided by that sum. A zero sum or an
/// unassigned unit yields a weight of 0, never a NaN. Whenever a container's
/// sum is positive, its weights add up to exactly 1.
pub fn normalized_weights(assignment: &Assignment, covariate: &[f64]) -> Vec<f64> {
    debug_assert_eq!(assignment.len(), covariate.len());

    let mut sums = vec![0.0; assignment.num_containers()];
    for (unit, parent) in assignment.iter().enumerate() {
        if let Some(p) = parent {
            sums[p as usize] += covariate[unit];
        }
    }

    assignment
        .iter()
        .enumerate()
        .map(|(unit, parent)| match parent {
            Some(p) if sums[p as usize] > 0.0 => covariate[unit] / sums[p as usize],
            _ => 0.0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_containers() -> Assignment {
        Assignment::from_parents(vec![Some(0), Some(0), Some(1), Some(1), None], 2)
    }

    #[test]
    fn weights_sum_to_one_per_container() {
        let weights = normalized_weights(&two_containers(), &[3.0, 1.0, 5.0, 5.0, 7.0]);
        assert!((weights[0] + weights[1] - 1.0).abs() < 1e-12);
        assert!((weights[2] + weights[3] - 1.0).abs() < 1e-12);
        assert_eq!(weights[0], 0.75);
    }

    #[test]
    fn zero_covariate_container_yields_zero_weights() {
        let weights = normalized_weights(&two_containers(), &[0.0, 0.0, 2.0, 6.0, 1.0]);
        assert_eq!(&weights[..2], &[0.0, 0.0]);
        assert_eq!(weights[2], 0.25);
    }

    #[test]
    fn unassigned_units_get_zero_weight() {
        let weights = normalized_weights(&two_containers(), &[1.0, 1.0, 1.0, 1.0, 100.0]);
        assert_eq!(weights[4], 0.0);
    }
}
