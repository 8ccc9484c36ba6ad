//! Coordinate reference systems and pointwise coordinate transforms.
//!
//! A [`Crs`] is parsed from an `EPSG:<code>` identifier, a PROJ.4 string, or a
//! WKT definition, and can always be exported as a PROJ.4 string. EPSG
//! definitions come from the `crs-definitions` tables. [`CoordTransformer`] wraps `proj4rs` and takes care of the
//! degree/radian conversion for geographic systems.

use proj4rs::proj::Proj;
use proj4rs::transform::transform;
use std::fmt;
use std::str::FromStr;

use crate::error::{MusaError, Result};
use crate::wkt::wkt_to_proj4;

/// Web Mercator (Spherical Mercator), the projection of the global tile layout
pub const EPSG_WEB_MERCATOR: u32 = 3857;
/// WGS84 geographic longitude/latitude
pub const EPSG_WGS84: u32 = 4326;

/// A coordinate reference system descriptor
#[derive(Debug, Clone, PartialEq)]
pub enum Crs {
    /// A system identified by its EPSG code
    Epsg(u32),
    /// A system given directly as a PROJ.4 string
    Proj4(String),
}

impl Crs {
    /// Web Mercator (EPSG:3857)
    pub fn web_mercator() -> Self {
        Crs::Epsg(EPSG_WEB_MERCATOR)
    }

    /// WGS84 longitude/latitude (EPSG:4326)
    pub fn wgs84() -> Self {
        Crs::Epsg(EPSG_WGS84)
    }

    /// Build a CRS from a WKT definition.
    ///
    /// A known outermost EPSG authority wins; for both WKT1
    /// (`AUTHORITY["EPSG","5070"]`) and WKT2 (`ID["EPSG",5070]`) it is the
    /// last one in the text. Otherwise the WKT1 projection and its parameters
    /// are converted to PROJ.4 directly.
    pub fn from_wkt(wkt: &str) -> Result<Self> {
        if let Some(code) = last_epsg_authority(wkt) {
            if epsg_to_proj4(code).is_some() {
                return Ok(Crs::Epsg(code));
            }
        }
        wkt_to_proj4(wkt).map(Crs::Proj4)
    }

    /// The EPSG code, when the CRS was given as one
    pub fn epsg(&self) -> Option<u32> {
        match self {
            Crs::Epsg(code) => Some(*code),
            Crs::Proj4(_) => None,
        }
    }

    /// Export this CRS as a PROJ.4 string
    pub fn to_proj4(&self) -> Result<String> {
        match self {
            Crs::Epsg(code) => epsg_to_proj4(*code).ok_or_else(|| MusaError::InvalidCrs {
                message: format!("EPSG:{} is not supported", code),
            }),
            Crs::Proj4(definition) => {
                if definition.trim().starts_with('+') {
                    Ok(definition.trim().to_string())
                } else {
                    Err(MusaError::InvalidCrs {
                        message: format!("Not a PROJ.4 string: {}", definition),
                    })
                }
            }
        }
    }

    /// Whether coordinates in this CRS are longitude/latitude degrees
    pub fn is_geographic(&self) -> Result<bool> {
        Ok(is_geographic_proj4(&self.to_proj4()?))
    }
}

impl FromStr for Crs {
    type Err = MusaError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(code) = s
            .strip_prefix("EPSG:")
            .or_else(|| s.strip_prefix("epsg:"))
        {
            let code = code.parse::<u32>().map_err(|_| MusaError::InvalidCrs {
                message: format!("Invalid EPSG code: {}", code),
            })?;
            let crs = Crs::Epsg(code);
            crs.to_proj4()?;
            return Ok(crs);
        }

        if s.starts_with('+') {
            return Ok(Crs::Proj4(s.to_string()));
        }

        if s.contains('[') {
            return Crs::from_wkt(s);
        }

        Err(MusaError::InvalidCrs {
            message: format!("Unrecognized CRS definition: {}", s),
        })
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Crs::Epsg(code) => write!(f, "EPSG:{}", code),
            Crs::Proj4(definition) => write!(f, "{}", definition),
        }
    }
}

/// Look up the PROJ.4 definition for an EPSG code.
///
/// The two systems the tile layout depends on are pinned; everything else is
/// read from `crs-definitions`, minus the `+type=crs` marker.
pub fn epsg_to_proj4(code: u32) -> Option<String> {
    match code {
        EPSG_WGS84 => Some("+proj=longlat +datum=WGS84 +no_defs".to_string()),
        EPSG_WEB_MERCATOR | 900913 => Some(
            "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +no_defs"
                .to_string(),
        ),
        _ => {
            let def = crs_definitions::from_code(u16::try_from(code).ok()?)?;
            let definition: Vec<&str> = def
                .proj4
                .split_whitespace()
                .filter(|token| *token != "+type=crs")
                .collect();
            Some(definition.join(" "))
        }
    }
}

fn is_geographic_proj4(definition: &str) -> bool {
    definition.split_whitespace().any(|token| {
        matches!(
            token,
            "+proj=longlat" | "+proj=latlong" | "+proj=lonlat" | "+proj=latlon"
        )
    })
}

fn last_epsg_authority(wkt: &str) -> Option<u32> {
    let upper = wkt.to_uppercase();
    let mut found = None;

    for marker in ["AUTHORITY[\"EPSG\",", "ID[\"EPSG\","] {
        let mut search_from = 0;
        while let Some(pos) = upper[search_from..].find(marker) {
            let start = search_from + pos + marker.len();
            let digits: String = upper[start..]
                .trim_start_matches(|c: char| c == '"' || c.is_whitespace())
                .chars()
                .take_while(char::is_ascii_digit)
                .collect();
            if let Ok(code) = digits.parse::<u32>() {
                match found {
                    Some((at, _)) if at > start => {}
                    _ => found = Some((start, code)),
                }
            }
            search_from = start;
        }
    }

    found.map(|(_, code)| code)
}

/// Transforms coordinates from one CRS to another.
pub struct CoordTransformer {
    source: Crs,
    target: Crs,
    projections: Option<(Proj, Proj)>,
    source_is_geographic: bool,
    target_is_geographic: bool,
}

impl fmt::Debug for CoordTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoordTransformer")
            .field("source", &self.source)
            .field("target", &self.target)
            .field("identity", &self.projections.is_none())
            .finish_non_exhaustive()
    }
}

impl CoordTransformer {
    /// Create a transformer between two coordinate systems
    pub fn new(source: &Crs, target: &Crs) -> Result<Self> {
        let source_str = source.to_proj4()?;
        let target_str = target.to_proj4()?;

        let projections = if source_str == target_str {
            None
        } else {
            let source_proj =
                Proj::from_proj_string(&source_str).map_err(|e| MusaError::Projection {
                    message: format!("Invalid source projection {}: {:?}", source, e),
                })?;
            let target_proj =
                Proj::from_proj_string(&target_str).map_err(|e| MusaError::Projection {
                    message: format!("Invalid target projection {}: {:?}", target, e),
                })?;
            Some((source_proj, target_proj))
        };

        Ok(Self {
            source: source.clone(),
            target: target.clone(),
            projections,
            source_is_geographic: is_geographic_proj4(&source_str),
            target_is_geographic: is_geographic_proj4(&target_str),
        })
    }

    pub fn source(&self) -> &Crs {
        &self.source
    }

    pub fn target(&self) -> &Crs {
        &self.target
    }

    /// Whether source and target resolve to the same projection
    pub fn is_identity(&self) -> bool {
        self.projections.is_none()
    }

    /// Transform a single coordinate pair
    pub fn transform(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let Some((source_proj, target_proj)) = &self.projections else {
            return Ok((x, y));
        };

        let mut point = if self.source_is_geographic {
            (x.to_radians(), y.to_radians(), 0.0)
        } else {
            (x, y, 0.0)
        };

        transform(source_proj, target_proj, &mut point).map_err(|e| MusaError::Projection {
            message: format!(
                "Failed to transform ({}, {}) from {} to {}: {:?}",
                x, y, self.source, self.target, e
            ),
        })?;

        let (out_x, out_y) = if self.target_is_geographic {
            (point.0.to_degrees(), point.1.to_degrees())
        } else {
            (point.0, point.1)
        };

        if !out_x.is_finite() || !out_y.is_finite() {
            return Err(MusaError::Projection {
                message: format!(
                    "Transform of ({}, {}) from {} to {} is not finite",
                    x, y, self.source, self.target
                ),
            });
        }

        Ok((out_x, out_y))
    }
}
