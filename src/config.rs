use std::{
    collections::BTreeSet,
    fs::File,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Rounding policy, applied once at the fine-unit level before aggregation
/// so error never compounds across levels. Rounding is half-to-even,
/// matching the banker's rounding of the upstream data preparation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
    /// Whole numbers, for population and household counts.
    Count,
    /// Two decimal places, for currency amounts.
    Currency,
    /// Leave prorated values unrounded.
    None,
}

impl Rounding {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Rounding::Count => value.round_ties_even(),
            Rounding::Currency => (value * 100.0).round_ties_even() / 100.0,
            Rounding::None => value,
        }
    }
}

/// One base category of an attribute family. Base categories are the only
/// values ever prorated; totals are rebuilt from them afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    /// Output column name at the block and precinct level.
    pub name: String,
    /// Column(s) on the source-container layer holding the value to
    /// redistribute; summed element-wise when more than one.
    pub source: Vec<String>,
    /// Covariate column(s) on the fine layer; summed element-wise when more
    /// than one (e.g. a merged category approximated from two older ones).
    pub covariate: Vec<String>,
}

/// A total or subtotal recomputed as a sum of other columns after
/// aggregation. Never prorated directly, so total always equals the sum of
/// its parts at the target geography.
#[derive(Debug, Clone, Deserialize)]
pub struct DerivedTotal {
    pub name: String,
    /// Component column names: base categories or previously derived totals.
    pub components: Vec<String>,
}

/// Median estimation settings for a family of ordered brackets.
#[derive(Debug, Clone, Deserialize)]
pub struct MedianConfig {
    /// Output column name for the estimated median.
    pub name: String,
    /// Brackets in ascending order; each names a base category of the family.
    pub brackets: Vec<BracketBound>,
    /// Synthetic upper bound for the open-ended top bracket.
    pub top_bracket_ceiling: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BracketBound {
    /// Base-category name holding this bracket's count.
    pub category: String,
    pub lower: f64,
    /// Absent on the open-ended top bracket; the ceiling applies instead.
    #[serde(default)]
    pub upper: Option<f64>,
}

/// A named group of mutually exclusive, collectively exhaustive base
/// categories, plus the totals derived from them.
#[derive(Debug, Clone, Deserialize)]
pub struct FamilyConfig {
    pub name: String,
    pub categories: Vec<Category>,
    #[serde(default)]
    pub derived: Vec<DerivedTotal>,
    pub rounding: Rounding,
    #[serde(default)]
    pub median: Option<MedianConfig>,
}

impl FamilyConfig {
    /// Structural checks that don't need data: non-empty categories, unique
    /// output names, derived components resolvable in declaration order,
    /// bracket bounds ascending.
    pub fn validate(&self) -> Result<()> {
        if self.categories.is_empty() {
            bail!("family {:?} has no base categories", self.name);
        }

        let mut known: BTreeSet<&str> = BTreeSet::new();
        for category in &self.categories {
            if !known.insert(&category.name) {
                bail!("family {:?}: duplicate category {:?}", self.name, category.name);
            }
            if category.source.is_empty() || category.covariate.is_empty() {
                bail!(
                    "family {:?}: category {:?} needs at least one source and one covariate column",
                    self.name,
                    category.name
                );
            }
        }

        for derived in &self.derived {
            for component in &derived.components {
                if !known.contains(component.as_str()) {
                    bail!(
                        "family {:?}: derived total {:?} references unknown column {:?}",
                        self.name,
                        derived.name,
                        component
                    );
                }
            }
            if !known.insert(&derived.name) {
                bail!("family {:?}: duplicate derived total {:?}", self.name, derived.name);
            }
        }

        if let Some(median) = &self.median {
            let categories: BTreeSet<&str> =
                self.categories.iter().map(|c| c.name.as_str()).collect();
            let mut previous_lower = f64::NEG_INFINITY;
            for (i, bracket) in median.brackets.iter().enumerate() {
                if !categories.contains(bracket.category.as_str()) {
                    bail!(
                        "family {:?}: median bracket {:?} is not a base category",
                        self.name,
                        bracket.category
                    );
                }
                if bracket.lower <= previous_lower {
                    bail!("family {:?}: median brackets must ascend", self.name);
                }
                if let Some(upper) = bracket.upper {
                    if upper <= bracket.lower {
                        bail!(
                            "family {:?}: bracket {:?} has upper bound <= lower bound",
                            self.name,
                            bracket.category
                        );
                    }
                } else if i + 1 != median.brackets.len() {
                    bail!(
                        "family {:?}: only the top bracket may omit an upper bound",
                        self.name
                    );
                }
                previous_lower = bracket.lower;
            }
            if median.top_bracket_ceiling <= previous_lower {
                bail!(
                    "family {:?}: top bracket ceiling must exceed the last lower bound",
                    self.name
                );
            }
        }

        Ok(())
    }
}

/// One input geometry file for the driver.
#[derive(Debug, Clone, Deserialize)]
pub struct LayerConfig {
    pub path: PathBuf,
    /// Attribute column holding each unit's unique identifier.
    pub id_field: String,
    /// EPSG code of the file's CRS.
    pub epsg: u32,
}

/// One attribute family together with the source layer it redistributes.
#[derive(Debug, Clone, Deserialize)]
pub struct FamilyRun {
    pub source: LayerConfig,
    #[serde(flatten)]
    pub family: FamilyConfig,
}

fn default_working_epsg() -> u32 {
    5070 // CONUS Albers equal-area; areal weights need a projected CRS
}

fn default_output_epsg() -> u32 {
    4326
}

/// Full per-run configuration: layers, families, and output shaping.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    /// Projected CRS every layer is brought into before assignment.
    #[serde(default = "default_working_epsg")]
    pub working_epsg: u32,
    /// Geographic CRS of the published precinct file.
    #[serde(default = "default_output_epsg")]
    pub output_epsg: u32,
    pub blocks: LayerConfig,
    pub precincts: LayerConfig,
    pub families: Vec<FamilyRun>,
    /// Precinct columns carried through to the output unchanged.
    #[serde(default)]
    pub keep_fields: Vec<String>,
    /// Regex over precinct column names to carry through (election results).
    #[serde(default)]
    pub keep_pattern: Option<String>,
}

impl RunConfig {
    /// Read and validate a JSON run configuration.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open run config: {}", path.display()))?;
        let config: RunConfig = serde_json::from_reader(file)
            .with_context(|| format!("failed to parse run config: {}", path.display()))?;
        for run in &config.families {
            run.family.validate()?;
        }
        if let Some(pattern) = &config.keep_pattern {
            regex::Regex::new(pattern)
                .with_context(|| format!("invalid keep_pattern regex: {pattern:?}"))?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn family(derived: Vec<DerivedTotal>) -> FamilyConfig {
        FamilyConfig {
            name: "race".into(),
            categories: vec![
                Category {
                    name: "HSP_POP".into(),
                    source: vec!["HSP_POP23".into()],
                    covariate: vec!["HSP_POP20".into()],
                },
                Category {
                    name: "WHT_POP".into(),
                    source: vec!["WHT_POP23".into()],
                    covariate: vec!["WHT_POP20".into()],
                },
            ],
            derived,
            rounding: Rounding::Count,
            median: None,
        }
    }

    #[test]
    fn rounding_count_is_half_to_even() {
        assert_eq!(Rounding::Count.apply(0.5), 0.0);
        assert_eq!(Rounding::Count.apply(1.5), 2.0);
        assert_eq!(Rounding::Count.apply(2.5), 2.0);
        assert_eq!(Rounding::Count.apply(-0.5), -0.0);
    }

    #[test]
    fn rounding_currency_keeps_two_decimals() {
        assert_eq!(Rounding::Currency.apply(10.234), 10.23);
        assert_eq!(Rounding::Currency.apply(10.235), 10.24);
        assert_eq!(Rounding::None.apply(10.234), 10.234);
    }

    #[test]
    fn derived_total_may_build_on_earlier_derived() {
        let config = family(vec![
            DerivedTotal { name: "NHSP_POP".into(), components: vec!["WHT_POP".into()] },
            DerivedTotal {
                name: "TOT_POP".into(),
                components: vec!["HSP_POP".into(), "NHSP_POP".into()],
            },
        ]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn derived_total_rejects_unknown_component() {
        let config = family(vec![DerivedTotal {
            name: "TOT_POP".into(),
            components: vec!["MISSING".into()],
        }]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn median_brackets_must_ascend() {
        let mut config = family(vec![]);
        config.median = Some(MedianConfig {
            name: "MEDN_INC".into(),
            brackets: vec![
                BracketBound { category: "HSP_POP".into(), lower: 10_000.0, upper: Some(20_000.0) },
                BracketBound { category: "WHT_POP".into(), lower: 5_000.0, upper: None },
            ],
            top_bracket_ceiling: 300_000.0,
        });
        assert!(config.validate().is_err());
    }
}
