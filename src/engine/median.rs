/// One ordered bracket with resolved bounds. The open-ended top bracket must
/// be given a synthetic upper bound by the caller before reaching here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub lower: f64,
    pub upper: f64,
}

/// Estimate the median of the continuous distribution implied by per-bracket
/// counts: walk the cumulative count to the 50th-percentile position, then
/// interpolate linearly within the bracket that reaches it.
///
/// Conventions, chosen once and kept:
/// - a non-positive total yields `None` (undefined, not zero and not an error);
/// - a zero-count bracket that nonetheless contains the median position
///   (the running total had already reached it) yields that bracket's lower
///   bound, so the boundary case of consecutive empty brackets is stable.
pub fn median_from_brackets(counts: &[f64], brackets: &[Bracket]) -> Option<f64> {
    debug_assert_eq!(counts.len(), brackets.len());

    let total: f64 = counts.iter().sum();
    if total <= 0.0 {
        return None;
    }

    let median_position = total / 2.0;
    let mut cumulative = 0.0;

    for (count, bracket) in counts.iter().zip(brackets) {
        let previous = cumulative;
        cumulative += count;

        if cumulative >= median_position {
            if *count <= 0.0 {
                return Some(bracket.lower);
            }
            let position_in_bracket = (median_position - previous) / count;
            return Some(bracket.lower + (bracket.upper - bracket.lower) * position_in_bracket);
        }
    }

    // Numerically unreachable when counts and brackets are consistent.
    brackets.last().map(|bracket| bracket.upper)
}
