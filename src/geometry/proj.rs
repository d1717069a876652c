use anyhow::{anyhow, bail, Context, Result};
use geo::{Coord, MapCoords, MultiPolygon};
use proj4rs::{proj::Proj as Proj4, transform::transform};

/// PROJ.4 definition for an EPSG code, plus whether the CRS is geographic
/// (lon/lat in degrees) rather than projected (meters).
fn proj4_def(epsg: u32) -> Result<(&'static str, bool)> {
    Ok(match epsg {
        // Geographic CRSs used for published interchange files.
        4326 => ("+proj=longlat +datum=WGS84 +no_defs +type=crs", true),
        4269 => ("+proj=longlat +datum=NAD83 +no_defs +type=crs", true),
        // CONUS Albers equal-area, the working CRS for areal computation.
        5070 => (
            "+proj=aea +lat_0=23 +lon_0=-96 +lat_1=29.5 +lat_2=45.5 +x_0=0 +y_0=0 \
             +datum=NAD83 +units=m +no_defs +type=crs",
            false,
        ),
        _ => bail!("no PROJ.4 definition registered for EPSG:{epsg}"),
    })
}

/// Reproject shapes between two registered CRSs.
/// Geographic coordinates cross the proj4rs boundary in radians.
pub(crate) fn reproject(
    shapes: &[MultiPolygon<f64>],
    from_epsg: u32,
    to_epsg: u32,
) -> Result<Vec<MultiPolygon<f64>>> {
    if from_epsg == to_epsg {
        return Ok(shapes.to_vec());
    }

    let (from_def, from_geographic) = proj4_def(from_epsg)?;
    let (to_def, to_geographic) = proj4_def(to_epsg)?;

    let from = Proj4::from_proj_string(from_def)
        .with_context(|| anyhow!("failed to build source PROJ.4: {from_def}"))?;
    let to = Proj4::from_proj_string(to_def)
        .with_context(|| anyhow!("failed to build target PROJ.4: {to_def}"))?;

    shapes
        .iter()
        .map(|shape| {
            shape.try_map_coords(|coord: Coord<f64>| {
                let mut point = if from_geographic {
                    (coord.x.to_radians(), coord.y.to_radians(), 0.0)
                } else {
                    (coord.x, coord.y, 0.0)
                };
                transform(&from, &to, &mut point)
                    .map_err(|e| anyhow!("EPSG:{from_epsg} -> EPSG:{to_epsg} transform failed: {e}"))?;
                let (x, y) = if to_geographic {
                    (point.0.to_degrees(), point.1.to_degrees())
                } else {
                    (point.0, point.1)
                };
                Ok(Coord { x, y })
            })
        })
        .collect()
}
