use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use log::info;
use regex::Regex;

use crate::cli::{Cli, ProrateArgs};
use crate::config::RunConfig;
use crate::engine::run_family;
use crate::geometry::assign;
use crate::io::{read_layer, write_layer_geojson, write_reconciliation_csv, PropertyColumn};

/// Full driver run: load layers, reproject into the working CRS, run every
/// configured attribute family, write reconciliation CSVs and the published
/// precinct GeoJSON.
pub fn run(_cli: &Cli, args: &ProrateArgs) -> Result<()> {
    let config = RunConfig::from_path(&args.config)?;
    ensure_dir_exists(&args.out)?;

    let outfile = args.out.join("precinct_all_pop.geojson");
    if outfile.exists() && !args.force {
        bail!("output {} already exists (use --force to overwrite)", outfile.display());
    }

    info!("reading block layer from {}", config.blocks.path.display());
    let blocks = read_layer("blocks", &config.blocks)?.reprojected(config.working_epsg)?;
    info!("reading precinct layer from {}", config.precincts.path.display());
    let precincts = read_layer("precincts", &config.precincts)?.reprojected(config.working_epsg)?;

    info!("assigning {} blocks to {} precincts", blocks.len(), precincts.len());
    let to_precincts = assign(blocks.geoms(), precincts.geoms())?;

    let mut outputs = Vec::new();
    for family_run in &config.families {
        let family = &family_run.family;
        info!(
            "family {}: reading source layer from {}",
            family.name,
            family_run.source.path.display()
        );
        let source =
            read_layer(&family.name, &family_run.source)?.reprojected(config.working_epsg)?;
        info!("family {}: assigning {} blocks to {} source units", family.name, blocks.len(), source.len());
        let to_source = assign(blocks.geoms(), source.geoms())?;

        let output = run_family(family, &blocks, &source, &to_source, &to_precincts)?;

        let report_path = args.out.join(format!("{}_comparison.csv", family.name));
        write_reconciliation_csv(&output.reconciliation, &report_path)?;
        info!(
            "family {}: total difference {:+} across {} attributes -> {}",
            family.name,
            output.reconciliation.total_difference(),
            output.reconciliation.rows.len(),
            report_path.display()
        );

        outputs.push(output);
    }

    // Publishable copy of the precinct layer in the output (geographic) CRS.
    let published = precincts.reprojected(config.output_epsg)?;

    let keep_pattern = config
        .keep_pattern
        .as_deref()
        .map(Regex::new)
        .transpose()
        .context("invalid keep_pattern regex")?;

    let mut properties: Vec<PropertyColumn> = Vec::new();
    for (name, values) in published.labels() {
        if keep_column(name, &config.keep_fields, keep_pattern.as_ref()) {
            properties.push(PropertyColumn::Text(name, values));
        }
    }
    for (name, values) in published.columns() {
        if keep_column(name, &config.keep_fields, keep_pattern.as_ref()) {
            properties.push(PropertyColumn::Numeric(name, values));
        }
    }
    for output in &outputs {
        for (name, values) in &output.columns {
            properties.push(PropertyColumn::Numeric(name.as_str(), values.as_slice()));
        }
        if let Some((name, values)) = &output.medians {
            properties.push(PropertyColumn::OptionalNumeric(name.as_str(), values.as_slice()));
        }
    }

    write_layer_geojson(&published, &properties, &outfile)?;
    info!("wrote {} precincts -> {}", published.len(), outfile.display());

    Ok(())
}

/// A precinct column passes through to the output when it is named outright
/// or matches the election-result pattern.
fn keep_column(name: &str, keep_fields: &[String], pattern: Option<&Regex>) -> bool {
    keep_fields.iter().any(|field| field == name)
        || pattern.is_some_and(|re| re.is_match(name))
}

/// Create the directory if it doesn't exist; error if a non-directory exists there.
fn ensure_dir_exists(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            bail!("path exists but is not a directory: {}", path.display());
        }
    } else {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory {}", path.display()))?;
    }
    Ok(())
}
