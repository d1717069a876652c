use std::{fmt, sync::Arc};

/// Stable key for a reporting unit.
/// Keep the original GEOID text (with leading zeros) but avoid repeated owned Strings.
pub type UnitId = Arc<str>;

/// Two layers entering a spatial operation carry different coordinate
/// reference systems. The engine never reprojects silently; the caller is
/// responsible for bringing all layers into one projected CRS first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateSystemMismatch {
    pub fine_epsg: u32,
    pub container_epsg: u32,
}

impl fmt::Display for CoordinateSystemMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "coordinate system mismatch: fine units are EPSG:{} but containers are EPSG:{}",
            self.fine_epsg, self.container_epsg
        )
    }
}

impl std::error::Error for CoordinateSystemMismatch {}
