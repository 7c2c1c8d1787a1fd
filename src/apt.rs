use std::io;
use std::path::Path;

use geo::{point, Point};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    data_lines, read_to_string,
    tokens::{tokenise, FieldError, Tokens},
    ErrorPolicy,
};

const AIRPORT_ROW: &str = "1";
const RUNWAY_ROW: &str = "100";

const AIRPORT_FIELDS: usize = 6;
const RUNWAY_FIELDS: usize = 20;

#[derive(Error, Debug, PartialEq)]
pub enum AptLineError {
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error("runway defined before any airport")]
    NoOpenAirport,
}

#[derive(Error, Debug)]
pub enum AptError {
    #[error("failed to parse apt.dat line {line_number}: {source}")]
    Line {
        line_number: usize,
        source: AptLineError,
    },
    #[error("failed to read apt.dat: {0}")]
    FileRead(#[from] io::Error),
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Runway {
    pub start: Point,
    pub end: Point,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Airport {
    pub icao: String,
    pub name: String,
    pub runways: Vec<Runway>,
}

/// A single recognised line of apt.dat.
#[derive(Clone, Debug, PartialEq)]
pub enum AptLine {
    Airport(Airport),
    Runway(Runway),
}

fn parse_point(tokens: &Tokens, lat_idx: usize) -> Result<Point, FieldError> {
    let lat = tokens.parse_field(lat_idx, "runway end latitude")?;
    let lng = tokens.parse_field(lat_idx + 1, "runway end longitude")?;
    Ok(point! { x: lng, y: lat })
}

impl AptLine {
    /// Returns `None` for row codes other than land airports and runways.
    pub fn parse(line: &str) -> Result<Option<Self>, FieldError> {
        let tokens = tokenise(line);
        match tokens.first().map(String::as_str) {
            Some(AIRPORT_ROW) => {
                tokens.require(AIRPORT_FIELDS)?;
                // only the first word of the airport name is kept
                Ok(Some(Self::Airport(Airport {
                    icao: tokens.field(4)?.to_string(),
                    name: tokens.field(5)?.to_string(),
                    runways: vec![],
                })))
            }
            Some(RUNWAY_ROW) => {
                tokens.require(RUNWAY_FIELDS)?;
                Ok(Some(Self::Runway(Runway {
                    start: parse_point(&tokens, 9)?,
                    end: parse_point(&tokens, 18)?,
                })))
            }
            _ => Ok(None),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct AptDat {
    pub airports: Vec<Airport>,
}

pub type AptResult = Result<AptDat, AptError>;

fn starts_airport(line: &str) -> bool {
    line.split_whitespace().next() == Some(AIRPORT_ROW)
}

fn apply_line(
    airports: &mut Vec<Airport>,
    open_airport: &mut Option<usize>,
    line: &str,
) -> Result<(), AptLineError> {
    if starts_airport(line) {
        *open_airport = None;
    }

    match AptLine::parse(line)? {
        Some(AptLine::Airport(airport)) => {
            airports.push(airport);
            *open_airport = Some(airports.len() - 1);
        }
        Some(AptLine::Runway(runway)) => {
            open_airport
                .and_then(|idx| airports.get_mut(idx))
                .ok_or(AptLineError::NoOpenAirport)?
                .runways
                .push(runway);
        }
        None => (),
    }

    Ok(())
}

impl AptDat {
    /// Parses apt.dat, aborting on the first malformed line.
    pub fn parse(content: &[u8]) -> AptResult {
        Self::parse_with(content, ErrorPolicy::Abort)
    }

    pub fn parse_with(content: &[u8], policy: ErrorPolicy) -> AptResult {
        let contents = read_to_string(content)?;
        let mut airports = vec![];
        let mut open_airport = None;

        for (line_number, line) in data_lines(&contents, 0) {
            if let Err(source) = apply_line(&mut airports, &mut open_airport, line) {
                match policy {
                    ErrorPolicy::Abort => {
                        return Err(AptError::Line {
                            line_number,
                            source,
                        })
                    }
                    ErrorPolicy::SkipLine => {
                        warn!("skipping apt.dat line {line_number} ({line}): {source}");
                    }
                }
            }
        }

        debug!("parsed {} airports", airports.len());
        Ok(Self { airports })
    }

    pub fn from_path(path: &Path) -> AptResult {
        Self::parse(&fs_err::read(path)?)
    }

    pub fn from_path_with(path: &Path, policy: ErrorPolicy) -> AptResult {
        Self::parse_with(&fs_err::read(path)?, policy)
    }
}
