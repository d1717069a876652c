use std::collections::BTreeMap;

use ahash::AHashMap;
use anyhow::{anyhow, bail, Result};

use crate::{geometry::Geometries, types::UnitId};

/// A single reporting-unit layer: geometries plus a column store of per-unit
/// attributes, keyed by stable unit id. Columns are immutable once set;
/// pipeline stages return new columns rather than rewriting existing ones.
#[derive(Debug, Clone)]
pub struct Layer {
    name: String,
    ids: Vec<UnitId>,
    index: AHashMap<UnitId, u32>, // Map between unit ids and contiguous indices.
    geoms: Geometries,
    columns: BTreeMap<String, Vec<f64>>,
    labels: BTreeMap<String, Vec<String>>, // Non-numeric passthrough columns.
}

impl Layer {
    /// Build a layer from parallel id and geometry vectors.
    /// Errors on length mismatch or duplicate ids.
    pub fn new(name: &str, ids: Vec<UnitId>, geoms: Geometries) -> Result<Self> {
        if ids.len() != geoms.len() {
            bail!(
                "layer {name:?}: {} ids for {} geometries",
                ids.len(),
                geoms.len()
            );
        }

        let mut index = AHashMap::with_capacity(ids.len());
        for (i, id) in ids.iter().enumerate() {
            if index.insert(id.clone(), i as u32).is_some() {
                bail!("layer {name:?}: duplicate unit id {id:?}");
            }
        }

        Ok(Self {
            name: name.to_string(),
            ids,
            index,
            geoms,
            columns: BTreeMap::new(),
            labels: BTreeMap::new(),
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of units in the layer.
    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[inline]
    pub fn ids(&self) -> &[UnitId] {
        &self.ids
    }

    #[inline]
    pub fn geoms(&self) -> &Geometries {
        &self.geoms
    }

    /// Contiguous index of a unit id, if present.
    #[inline]
    pub fn index_of(&self, id: &str) -> Option<u32> {
        self.index.get(id).copied()
    }

    /// Numeric column by name.
    #[inline]
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Numeric column by name, or an error naming the layer and column.
    pub fn require_column(&self, name: &str) -> Result<&[f64]> {
        self.column(name)
            .ok_or_else(|| anyhow!("layer {:?} has no column {name:?}", self.name))
    }

    /// Names of all numeric columns, in sorted order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// All numeric columns as (name, values) pairs, in sorted name order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.columns.iter().map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// All text columns as (name, values) pairs, in sorted name order.
    pub fn labels(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.labels.iter().map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Text column by name (identifiers, candidate names, and the like).
    #[inline]
    pub fn label_column(&self, name: &str) -> Option<&[String]> {
        self.labels.get(name).map(Vec::as_slice)
    }

    /// Names of all text columns, in sorted order.
    pub fn label_names(&self) -> impl Iterator<Item = &str> {
        self.labels.keys().map(String::as_str)
    }

    /// Attach a numeric column. Errors on length mismatch; replaces any
    /// column already stored under `name`.
    pub fn set_column(&mut self, name: &str, values: Vec<f64>) -> Result<()> {
        if values.len() != self.len() {
            bail!(
                "layer {:?}: column {name:?} has {} values for {} units",
                self.name,
                values.len(),
                self.len()
            );
        }
        self.columns.insert(name.to_string(), values);
        Ok(())
    }

    /// Attach a text column. Errors on length mismatch.
    pub fn set_label_column(&mut self, name: &str, values: Vec<String>) -> Result<()> {
        if values.len() != self.len() {
            bail!(
                "layer {:?}: label column {name:?} has {} values for {} units",
                self.name,
                values.len(),
                self.len()
            );
        }
        self.labels.insert(name.to_string(), values);
        Ok(())
    }

    /// Element-wise sum of one or more numeric columns. This is how composite
    /// covariates are formed when no single column matches a category.
    pub fn sum_columns(&self, names: &[String]) -> Result<Vec<f64>> {
        let mut out = vec![0.0; self.len()];
        for name in names {
            let column = self.require_column(name)?;
            for (acc, value) in out.iter_mut().zip(column) {
                *acc += value;
            }
        }
        Ok(out)
    }

    /// Layer-wide sum of a single numeric column.
    pub fn column_sum(&self, name: &str) -> Result<f64> {
        Ok(self.require_column(name)?.iter().sum())
    }

    /// Copy of this layer with geometries reprojected into another CRS.
    /// Attribute columns are carried over unchanged.
    pub fn reprojected(&self, to_epsg: u32) -> Result<Layer> {
        let mut layer = self.clone();
        layer.geoms = self.geoms.reprojected(to_epsg)?;
        Ok(layer)
    }
}
