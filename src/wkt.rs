//! WKT1 coordinate system definitions to PROJ.4.
//!
//! Covers `GEOGCS` and `PROJCS` in both the OGC and the ESRI dialect, for the
//! projection methods `proj4rs` implements. Projected linear units other than
//! metres are carried as `+to_meter`, with false easting/northing converted to
//! metres as PROJ.4 expects.

use std::collections::HashMap;

use crate::error::{MusaError, Result};

const MAX_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Text(String),
    Number(f64),
    Node(Node),
}

#[derive(Debug, Clone, PartialEq)]
struct Node {
    keyword: String,
    values: Vec<Value>,
}

impl Node {
    fn children<'a, 'k>(&'a self, keyword: &'k str) -> impl Iterator<Item = &'a Node> + 'k
    where
        'a: 'k,
    {
        self.values.iter().filter_map(move |v| match v {
            Value::Node(node) if node.keyword.eq_ignore_ascii_case(keyword) => Some(node),
            _ => None,
        })
    }

    fn child(&self, keyword: &str) -> Option<&Node> {
        self.children(keyword).next()
    }

    fn require(&self, keyword: &str) -> Result<&Node> {
        self.child(keyword)
            .ok_or_else(|| invalid(format!("{} has no {}", self.keyword, keyword)))
    }

    fn name(&self) -> Option<&str> {
        self.values.iter().find_map(|v| match v {
            Value::Text(text) => Some(text.as_str()),
            _ => None,
        })
    }

    fn numbers(&self) -> Vec<f64> {
        self.values
            .iter()
            .filter_map(|v| match v {
                Value::Number(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    fn number(&self, index: usize) -> Result<f64> {
        self.numbers()
            .get(index)
            .copied()
            .ok_or_else(|| invalid(format!("{} is missing a numeric value", self.keyword)))
    }
}

fn invalid(message: String) -> MusaError {
    MusaError::InvalidCrs { message }
}

struct Parser<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}
    }

    fn identifier(&mut self) -> String {
        let mut ident = String::new();
        while let Some(c) = self.chars.next_if(|c| c.is_ascii_alphanumeric() || *c == '_') {
            ident.push(c);
        }
        ident
    }

    fn node(&mut self, depth: usize) -> Result<Node> {
        if depth > MAX_DEPTH {
            return Err(invalid("WKT nests too deeply".to_string()));
        }
        self.skip_whitespace();
        let keyword = self.identifier();
        if keyword.is_empty() {
            return Err(invalid("Expected a WKT keyword".to_string()));
        }
        self.skip_whitespace();
        match self.chars.next() {
            Some('[') | Some('(') => {}
            _ => return Err(invalid(format!("Expected '[' after {}", keyword))),
        }

        let mut values = Vec::new();
        loop {
            self.skip_whitespace();
            values.push(self.value(depth)?);
            self.skip_whitespace();
            match self.chars.next() {
                Some(',') => continue,
                Some(']') | Some(')') => break,
                _ => return Err(invalid(format!("Unterminated {} node", keyword))),
            }
        }
        Ok(Node { keyword, values })
    }

    fn value(&mut self, depth: usize) -> Result<Value> {
        match self.chars.peek().copied() {
            Some('"') => {
                self.chars.next();
                let mut text = String::new();
                loop {
                    match self.chars.next() {
                        Some('"') if self.chars.next_if_eq(&'"').is_some() => text.push('"'),
                        Some('"') => break,
                        Some(c) => text.push(c),
                        None => return Err(invalid("Unterminated WKT string".to_string())),
                    }
                }
                Ok(Value::Text(text))
            }
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => {
                let mut literal = String::new();
                while let Some(c) = self
                    .chars
                    .next_if(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'))
                {
                    literal.push(c);
                }
                literal
                    .parse()
                    .map(Value::Number)
                    .map_err(|_| invalid(format!("Invalid WKT number: {}", literal)))
            }
            Some(c) if c.is_ascii_alphabetic() => {
                // Either a nested node or a bare enumeration such as `ellipsoidal`
                let mut lookahead = self.chars.clone();
                while lookahead.next_if(|c| c.is_ascii_alphanumeric() || *c == '_').is_some() {}
                while lookahead.next_if(|c| c.is_whitespace()).is_some() {}
                if matches!(lookahead.peek(), Some('[') | Some('(')) {
                    self.node(depth + 1).map(Value::Node)
                } else {
                    Ok(Value::Text(self.identifier()))
                }
            }
            _ => Err(invalid("Unexpected character in WKT".to_string())),
        }
    }
}

fn parse(wkt: &str) -> Result<Node> {
    let mut parser = Parser::new(wkt);
    let node = parser.node(0)?;
    parser.skip_whitespace();
    if parser.chars.next().is_some() {
        return Err(invalid("Trailing characters after WKT definition".to_string()));
    }
    Ok(node)
}

/// Lowercase with everything but letters and digits removed
fn normalize(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn datum_terms(geogcs: &Node) -> Result<String> {
    let datum = geogcs.require("DATUM")?;
    // ESRI prefixes datum names with "D_"
    let raw = datum.name().unwrap_or_default();
    let name = normalize(raw.strip_prefix("D_").unwrap_or(raw));

    let mut terms = match name.as_str() {
        "wgs1984" | "worldgeodeticsystem1984" => "+datum=WGS84".to_string(),
        "northamerican1983" | "northamericandatum1983" => "+datum=NAD83".to_string(),
        _ => {
            let spheroid = datum
                .child("SPHEROID")
                .or_else(|| datum.child("ELLIPSOID"))
                .ok_or_else(|| invalid("DATUM has no SPHEROID".to_string()))?;
            let a = spheroid.number(0)?;
            let rf = spheroid.number(1)?;
            let mut terms = if rf == 0.0 {
                format!("+a={} +b={}", a, a)
            } else {
                format!("+a={} +rf={}", a, rf)
            };
            if let Some(towgs84) = datum.child("TOWGS84") {
                let shifts: Vec<String> = towgs84.numbers().iter().map(f64::to_string).collect();
                terms.push_str(&format!(" +towgs84={}", shifts.join(",")));
            }
            terms
        }
    };

    if let Some(primem) = geogcs.child("PRIMEM") {
        let pm = primem.number(0)?;
        if pm != 0.0 {
            terms.push_str(&format!(" +pm={}", pm));
        }
    }
    Ok(terms)
}

struct Parameters(HashMap<String, f64>);

impl Parameters {
    fn from_node(projcs: &Node) -> Result<Self> {
        let mut params = HashMap::new();
        for param in projcs.children("PARAMETER") {
            let name = param
                .name()
                .ok_or_else(|| invalid("PARAMETER without a name".to_string()))?;
            params.insert(normalize(name), param.number(0)?);
        }
        Ok(Self(params))
    }

    fn get(&self, names: &[&str]) -> Option<f64> {
        names.iter().find_map(|name| self.0.get(*name).copied())
    }

    fn or(&self, names: &[&str], default: f64) -> f64 {
        self.get(names).unwrap_or(default)
    }
}

const CENTRAL_MERIDIAN: &[&str] = &[
    "centralmeridian",
    "longitudeofcenter",
    "longitudeoforigin",
    "longitudeofnaturalorigin",
];
const LATITUDE_OF_ORIGIN: &[&str] = &[
    "latitudeoforigin",
    "latitudeofcenter",
    "latitudeofnaturalorigin",
];
const SCALE_FACTOR: &[&str] = &["scalefactor", "scalefactoratnaturalorigin"];
const PARALLEL_1: &[&str] = &["standardparallel1", "latitudeof1ststandardparallel"];
const PARALLEL_2: &[&str] = &["standardparallel2", "latitudeof2ndstandardparallel"];

fn projection_terms(method: &str, params: &Parameters) -> Result<String> {
    let lon_0 = params.or(CENTRAL_MERIDIAN, 0.0);
    let lat_0 = params.or(LATITUDE_OF_ORIGIN, 0.0);
    let k = params.or(SCALE_FACTOR, 1.0);

    let terms = match normalize(method).as_str() {
        "albers" | "albersconicequalarea" => {
            let lat_1 = params
                .get(PARALLEL_1)
                .ok_or_else(|| invalid("Albers without standard parallels".to_string()))?;
            let lat_2 = params.or(PARALLEL_2, lat_1);
            format!(
                "+proj=aea +lat_1={} +lat_2={} +lat_0={} +lon_0={}",
                lat_1, lat_2, lat_0, lon_0
            )
        }
        "transversemercator" | "gausskruger" => {
            format!("+proj=tmerc +lat_0={} +lon_0={} +k_0={}", lat_0, lon_0, k)
        }
        "lambertconformalconic1sp" => {
            format!("+proj=lcc +lat_1={} +lat_0={} +lon_0={} +k_0={}", lat_0, lat_0, lon_0, k)
        }
        "lambertconformalconic" | "lambertconformalconic2sp" => {
            let lat_1 = params.or(PARALLEL_1, lat_0);
            let lat_2 = params.or(PARALLEL_2, lat_1);
            format!(
                "+proj=lcc +lat_1={} +lat_2={} +lat_0={} +lon_0={} +k_0={}",
                lat_1, lat_2, lat_0, lon_0, k
            )
        }
        "mercator" | "mercator1sp" | "mercator2sp" => match params.get(PARALLEL_1) {
            Some(lat_ts) => format!("+proj=merc +lat_ts={} +lon_0={}", lat_ts, lon_0),
            None => format!("+proj=merc +lon_0={} +k={}", lon_0, k),
        },
        "lambertazimuthalequalarea" => format!("+proj=laea +lat_0={} +lon_0={}", lat_0, lon_0),
        "equirectangular" | "equidistantcylindrical" | "platecarree" => format!(
            "+proj=eqc +lat_ts={} +lat_0={} +lon_0={}",
            params.or(PARALLEL_1, 0.0),
            lat_0,
            lon_0
        ),
        name @ ("polarstereographic" | "stereographicnorthpole" | "stereographicsouthpole") => {
            let lat_ts = params.or(PARALLEL_1, lat_0);
            let south = name == "stereographicsouthpole"
                || (name == "polarstereographic" && lat_ts < 0.0);
            let pole = if south { -90.0 } else { 90.0 };
            let mut terms = format!("+proj=stere +lat_0={} +lon_0={}", pole, lon_0);
            match params.get(SCALE_FACTOR) {
                Some(k) if lat_ts.abs() == 90.0 || params.get(PARALLEL_1).is_none() => {
                    terms.push_str(&format!(" +k_0={}", k))
                }
                _ => terms.push_str(&format!(" +lat_ts={}", lat_ts)),
            }
            terms
        }
        "obliquestereographic" | "doublestereographic" => {
            format!("+proj=sterea +lat_0={} +lon_0={} +k={}", lat_0, lon_0, k)
        }
        _ => return Err(invalid(format!("Unsupported WKT projection: {}", method))),
    };
    Ok(terms)
}

/// Convert a WKT1 `GEOGCS` or `PROJCS` definition to a PROJ.4 string
pub fn wkt_to_proj4(wkt: &str) -> Result<String> {
    let root = parse(wkt.trim())?;

    match root.keyword.to_ascii_uppercase().as_str() {
        "GEOGCS" => Ok(format!("+proj=longlat {} +no_defs", datum_terms(&root)?)),
        "PROJCS" => {
            let geogcs = root.require("GEOGCS")?;
            let method = root
                .require("PROJECTION")?
                .name()
                .ok_or_else(|| invalid("PROJECTION without a name".to_string()))?;
            let params = Parameters::from_node(&root)?;
            let to_meter = match root.child("UNIT") {
                Some(unit) => unit.number(0)?,
                None => 1.0,
            };

            if normalize(method) == "mercatorauxiliarysphere" {
                return Ok(format!(
                    "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0={} +x_0={} +y_0={} +k=1 +units=m +no_defs",
                    params.or(CENTRAL_MERIDIAN, 0.0),
                    params.or(&["falseeasting"], 0.0) * to_meter,
                    params.or(&["falsenorthing"], 0.0) * to_meter,
                ));
            }

            let units = if (to_meter - 1.0).abs() < 1e-12 {
                "+units=m".to_string()
            } else {
                format!("+to_meter={}", to_meter)
            };
            Ok(format!(
                "{} +x_0={} +y_0={} {} {} +no_defs",
                projection_terms(method, &params)?,
                params.or(&["falseeasting"], 0.0) * to_meter,
                params.or(&["falsenorthing"], 0.0) * to_meter,
                datum_terms(geogcs)?,
                units
            ))
        }
        other => Err(invalid(format!("Unsupported WKT root {} without an EPSG authority", other))),
    }
}
