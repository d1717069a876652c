use std::collections::BTreeMap;

use anyhow::{ensure, Result};
use log::{debug, warn};

use crate::{
    config::{FamilyConfig, MedianConfig},
    geometry::Assignment,
    layer::Layer,
};

use super::{
    aggregate, median_from_brackets, normalized_weights, prorate, reconcile, Bracket,
    Reconciliation,
};

/// Target-geography columns produced by one attribute family, plus
/// diagnostics. The pipeline never mutates its input layers; everything it
/// computes comes back through this struct.
#[derive(Debug, Clone)]
pub struct FamilyOutput {
    /// Base-category and derived-total columns, in configuration order.
    pub columns: Vec<(String, Vec<f64>)>,
    /// Estimated medians when the family configures them; `None` per unit
    /// where the total count is not positive.
    pub medians: Option<(String, Vec<Option<f64>>)>,
    pub reconciliation: Reconciliation,
}

/// Run one attribute family end to end: prorate each base category from the
/// source containers down to the fine units, aggregate the rounded values up
/// to the target containers, rebuild derived totals from components on both
/// sides, and reconcile target against source.
///
/// A category whose source or covariate columns are missing is skipped with
/// a warning; the rest of the family still runs. Derived totals and medians
/// that depend on a skipped category are skipped the same way.
pub fn run_family(
    family: &FamilyConfig,
    fine: &Layer,
    source: &Layer,
    to_source: &Assignment,
    to_target: &Assignment,
) -> Result<FamilyOutput> {
    ensure!(
        to_source.len() == fine.len() && to_target.len() == fine.len(),
        "family {:?}: assignments cover {} and {} units but layer {:?} has {}",
        family.name,
        to_source.len(),
        to_target.len(),
        fine.name(),
        fine.len()
    );
    ensure!(
        to_source.num_containers() == source.len(),
        "family {:?}: source assignment has {} containers but layer {:?} has {}",
        family.name,
        to_source.num_containers(),
        source.name(),
        source.len()
    );

    let num_targets = to_target.num_containers();
    let mut columns: Vec<(String, Vec<f64>)> = Vec::new();
    let mut column_index: BTreeMap<String, usize> = BTreeMap::new();
    let mut source_sums: BTreeMap<String, f64> = BTreeMap::new();

    for category in &family.categories {
        let source_values = match source.sum_columns(&category.source) {
            Ok(values) => values,
            Err(err) => {
                warn!("family {}: skipping category {}: {err}", family.name, category.name);
                continue;
            }
        };
        let covariate = match fine.sum_columns(&category.covariate) {
            Ok(values) => values,
            Err(err) => {
                warn!("family {}: skipping category {}: {err}", family.name, category.name);
                continue;
            }
        };

        let weights = normalized_weights(to_source, &covariate);
        let fine_values: Vec<f64> = prorate(to_source, &source_values, &weights)
            .into_iter()
            .map(|value| family.rounding.apply(value))
            .collect();
        let target_values = aggregate(to_target, &fine_values);

        debug!(
            "family {}: category {} prorated across {} units",
            family.name,
            category.name,
            fine.len()
        );

        source_sums.insert(category.name.clone(), source_values.iter().sum());
        column_index.insert(category.name.clone(), columns.len());
        columns.push((category.name.clone(), target_values));
    }

    for derived in &family.derived {
        let mut target_values = vec![0.0; num_targets];
        let mut source_sum = 0.0;
        let mut missing = None;

        for component in &derived.components {
            match column_index.get(component) {
                Some(&i) => {
                    for (acc, value) in target_values.iter_mut().zip(&columns[i].1) {
                        *acc += value;
                    }
                    source_sum += source_sums[component.as_str()];
                }
                None => {
                    missing = Some(component);
                    break;
                }
            }
        }

        if let Some(component) = missing {
            warn!(
                "family {}: skipping derived total {}: component {} was not computed",
                family.name, derived.name, component
            );
            continue;
        }

        source_sums.insert(derived.name.clone(), source_sum);
        column_index.insert(derived.name.clone(), columns.len());
        columns.push((derived.name.clone(), target_values));
    }

    let mut medians = None;
    if let Some(config) = &family.median {
        match median_inputs(config, &columns, &column_index) {
            Some((bracket_columns, brackets)) => {
                let values = (0..num_targets)
                    .map(|unit| {
                        let counts: Vec<f64> =
                            bracket_columns.iter().map(|column| column[unit]).collect();
                        median_from_brackets(&counts, &brackets)
                    })
                    .collect();
                medians = Some((config.name.clone(), values));
            }
            None => warn!(
                "family {}: skipping median {}: bracket column was not computed",
                family.name, config.name
            ),
        }
    }

    let reconciliation = reconcile(
        &family.name,
        columns.iter().map(|(name, values)| {
            (name.as_str(), source_sums[name.as_str()], values.iter().sum())
        }),
    );

    Ok(FamilyOutput { columns, medians, reconciliation })
}

/// Resolve each configured bracket to its target column and bounds.
/// `None` when any bracket's category column is absent.
fn median_inputs<'a>(
    config: &MedianConfig,
    columns: &'a [(String, Vec<f64>)],
    column_index: &BTreeMap<String, usize>,
) -> Option<(Vec<&'a [f64]>, Vec<Bracket>)> {
    let mut bracket_columns = Vec::with_capacity(config.brackets.len());
    let mut brackets = Vec::with_capacity(config.brackets.len());

    for bound in &config.brackets {
        let &i = column_index.get(&bound.category)?;
        bracket_columns.push(columns[i].1.as_slice());
        brackets.push(Bracket {
            lower: bound.lower,
            upper: bound.upper.unwrap_or(config.top_bracket_ceiling),
        });
    }

    Some((bracket_columns, brackets))
}
