/// One attribute's source-vs-target comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationRow {
    pub attribute: String,
    pub source_sum: f64,
    pub target_sum: f64,
    pub difference: f64,
    /// `None` when the source sum is zero; a percentage otherwise.
    pub percent_difference: Option<f64>,
}

/// Per-family accuracy diagnostic: how far the reapportioned target sums
/// drifted from the source sums. Descriptive output only; large differences
/// are a warning signal for the caller, never a failure condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub family: String,
    pub rows: Vec<ReconciliationRow>,
}

impl Reconciliation {
    /// Signed difference summed over every attribute in the family.
    pub fn total_difference(&self) -> f64 {
        self.rows.iter().map(|row| row.difference).sum()
    }
}

/// Build a reconciliation table from (attribute, source_sum, target_sum)
/// triples. Pure function of its input: running it twice over the same
/// aggregated output yields identical reports.
pub fn reconcile<'a, I>(family: &str, triples: I) -> Reconciliation
where
    I: IntoIterator<Item = (&'a str, f64, f64)>,
{
    let rows = triples
        .into_iter()
        .map(|(attribute, source_sum, target_sum)| {
            let difference = target_sum - source_sum;
            let percent_difference =
                (source_sum != 0.0).then(|| 100.0 * difference / source_sum);
            ReconciliationRow {
                attribute: attribute.to_string(),
                source_sum,
                target_sum,
                difference,
                percent_difference,
            }
        })
        .collect();

    Reconciliation { family: family.to_string(), rows }
}
