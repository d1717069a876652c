use crate::geometry::Assignment;

/// Sum fine-unit values grouped by assigned container.
///
/// The result covers every container of the assignment, including ones with
/// no assigned fine units (sum 0). Units assigned `None` contribute nowhere.
pub fn aggregate(assignment: &Assignment, fine_values: &[f64]) -> Vec<f64> {
    debug_assert_eq!(assignment.len(), fine_values.len());

    let mut sums = vec![0.0; assignment.num_containers()];
    for (unit, parent) in assignment.iter().enumerate() {
        if let Some(p) = parent {
            sums[p as usize] += fine_values[unit];
        }
    }
    sums
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_containers_report_zero_not_absence() {
        let assignment = Assignment::from_parents(vec![Some(0), Some(0), None], 3);
        let sums = aggregate(&assignment, &[4.0, 6.0, 99.0]);
        assert_eq!(sums, vec![10.0, 0.0, 0.0]);
    }
}
