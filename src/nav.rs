use std::fmt::Display;
use std::io;
use std::path::Path;

use bevy_reflect::Reflect;
use geo::{point, Point};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};
use uom::si::angle::degree;
use uom::si::f64::{Angle, Length};
use uom::si::length::nautical_mile;

use crate::{
    data_lines,
    decca::{build_decca_chains, DeccaChain, DeccaError, DeccaRole},
    read_to_string,
    tokens::{to_upper, tokenise, FieldError},
    ErrorPolicy,
};

const MIN_FIELDS: usize = 9;
const HEADER_LINES: usize = 2;
const DECCA: &str = "DECCA";

#[derive(Error, Debug, PartialEq)]
pub enum NavAidError {
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error("needs Master|Red|Green|Purple after 'Decca': {line}")]
    MissingChainRole { line: String },
}

#[derive(Error, Debug)]
pub enum EarthNavError {
    #[error("failed to parse earth_nav.dat line {line_number}: {source}")]
    Line {
        line_number: usize,
        source: NavAidError,
    },
    #[error("failed to read earth_nav.dat: {0}")]
    FileRead(#[from] io::Error),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect, Serialize)]
pub enum NavAidType {
    Ndb,
    Vor,
    Localizer,
    Glideslope,
    OuterMarker,
    MiddleMarker,
    InnerMarker,
    Dme,
    DeccaMaster,
    DeccaRed,
    DeccaGreen,
    DeccaPurple,
    Other,
    #[default]
    Invalid,
}

impl NavAidType {
    pub fn is_marker(self) -> bool {
        matches!(
            self,
            Self::OuterMarker | Self::MiddleMarker | Self::InnerMarker
        )
    }

    pub fn decca_role(self) -> Option<DeccaRole> {
        match self {
            Self::DeccaMaster => Some(DeccaRole::Master),
            Self::DeccaRed => Some(DeccaRole::Red),
            Self::DeccaGreen => Some(DeccaRole::Green),
            Self::DeccaPurple => Some(DeccaRole::Purple),
            _ => None,
        }
    }
}

impl From<DeccaRole> for NavAidType {
    fn from(role: DeccaRole) -> Self {
        match role {
            DeccaRole::Master => Self::DeccaMaster,
            DeccaRole::Red => Self::DeccaRed,
            DeccaRole::Green => Self::DeccaGreen,
            DeccaRole::Purple => Self::DeccaPurple,
        }
    }
}

impl Display for NavAidType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Ndb => "NDB",
            Self::Vor => "VOR",
            Self::Localizer => "LOC",
            Self::Glideslope => "GS",
            Self::OuterMarker => "OM",
            Self::MiddleMarker => "MM",
            Self::InnerMarker => "IM",
            Self::Dme => "DME",
            Self::DeccaMaster => "DECCA MASTER",
            Self::DeccaRed => "DECCA RED",
            Self::DeccaGreen => "DECCA GREEN",
            Self::DeccaPurple => "DECCA PURPLE",
            Self::Other => "OTHER",
            Self::Invalid => "INVALID",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive)]
enum RowCode {
    Ndb = 2,
    Vor = 3,
    Localizer = 4,
    PairedLocalizer = 5,
    Glideslope = 6,
    OuterMarker = 7,
    MiddleMarker = 8,
    InnerMarker = 9,
    PairedDme = 12,
    Dme = 13,
}

/// Maps a row code to its navaid type and whether the facility is standalone.
pub fn row_code_type(code: i64) -> (NavAidType, bool) {
    match RowCode::from_i64(code) {
        Some(RowCode::Ndb) => (NavAidType::Ndb, true),
        Some(RowCode::Vor) => (NavAidType::Vor, true),
        Some(RowCode::Localizer) => (NavAidType::Localizer, true),
        Some(RowCode::PairedLocalizer) => (NavAidType::Localizer, false),
        Some(RowCode::Glideslope) => (NavAidType::Glideslope, false),
        Some(RowCode::OuterMarker) => (NavAidType::OuterMarker, true),
        Some(RowCode::MiddleMarker) => (NavAidType::MiddleMarker, true),
        Some(RowCode::InnerMarker) => (NavAidType::InnerMarker, true),
        Some(RowCode::PairedDme) => (NavAidType::Dme, false),
        Some(RowCode::Dme) => (NavAidType::Dme, true),
        None => (NavAidType::Other, true),
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct NavAid {
    pub navaid_type: NavAidType,
    pub position: Point,
    pub elevation_ft: i32,
    /// VOR, localizer, glideslope and DME frequencies are stored in tenths in earth_nav.dat
    pub frequency_khz: f32,
    // TODO parse range and bearing once their field positions are confirmed against the format
    pub service_range: Length,
    pub bearing_true: Angle,
    pub ident: String,
    pub name: String,
    pub standalone: bool,
}

impl Default for NavAid {
    fn default() -> Self {
        Self {
            navaid_type: NavAidType::Invalid,
            position: point! { x: 0., y: 0. },
            elevation_ft: 0,
            frequency_khz: 0.,
            service_range: Length::new::<nautical_mile>(0.),
            bearing_true: Angle::new::<degree>(0.),
            ident: String::new(),
            name: String::new(),
            standalone: true,
        }
    }
}

impl NavAid {
    pub fn parse(line: &str) -> Result<Self, NavAidError> {
        let tokens = tokenise(line);
        tokens.require(MIN_FIELDS)?;

        let (mut navaid_type, standalone) = row_code_type(tokens.parse_field(0, "row code")?);
        let lat = tokens.parse_field(1, "latitude")?;
        let lng = tokens.parse_field(2, "longitude")?;
        let elevation_ft = tokens.parse_field(3, "elevation")?;

        let frequency_khz = if navaid_type.is_marker() {
            0.
        } else {
            let frequency = tokens.parse_field::<i32>(4, "frequency")? as f32;
            if navaid_type == NavAidType::Ndb {
                frequency
            } else {
                frequency * 10.
            }
        };

        if to_upper(tokens.field(8)?) == DECCA {
            let role = tokens
                .get(9)
                .ok_or_else(|| NavAidError::MissingChainRole {
                    line: line.to_string(),
                })?;
            match DeccaRole::parse(role) {
                Some(role) => navaid_type = role.into(),
                None => warn!("unknown Decca chain role {role}, keeping {navaid_type}"),
            }
        }

        Ok(Self {
            navaid_type,
            position: point! { x: lng, y: lat },
            elevation_ft,
            frequency_khz,
            ident: tokens.field(7)?.to_string(),
            name: tokens.detokenise(8),
            standalone,
            ..Self::default()
        })
    }

    /// `false` only for default constructed navaids, never for parsed ones.
    pub fn is_valid(&self) -> bool {
        self.navaid_type != NavAidType::Invalid
    }
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct EarthNavDat {
    pub navaids: Vec<NavAid>,
}

pub type EarthNavResult = Result<EarthNavDat, EarthNavError>;

impl EarthNavDat {
    /// Parses earth_nav.dat, logging and skipping malformed lines.
    pub fn parse(content: &[u8]) -> EarthNavResult {
        Self::parse_with(content, ErrorPolicy::SkipLine)
    }

    pub fn parse_with(content: &[u8], policy: ErrorPolicy) -> EarthNavResult {
        let contents = read_to_string(content)?;
        let mut navaids = vec![];

        for (line_number, line) in data_lines(&contents, HEADER_LINES) {
            match NavAid::parse(line) {
                Ok(navaid) => navaids.push(navaid),
                Err(source) => match policy {
                    ErrorPolicy::Abort => {
                        return Err(EarthNavError::Line {
                            line_number,
                            source,
                        })
                    }
                    ErrorPolicy::SkipLine => {
                        warn!("skipping earth_nav.dat line {line_number}: {source}");
                    }
                },
            }
        }

        debug!("parsed {} navaids", navaids.len());
        Ok(Self { navaids })
    }

    pub fn from_path(path: &Path) -> EarthNavResult {
        Self::parse(&fs_err::read(path)?)
    }

    pub fn from_path_with(path: &Path, policy: ErrorPolicy) -> EarthNavResult {
        Self::parse_with(&fs_err::read(path)?, policy)
    }

    pub fn of_type(&self, navaid_type: NavAidType) -> impl Iterator<Item = &NavAid> {
        self.navaids
            .iter()
            .filter(move |navaid| navaid.navaid_type == navaid_type)
    }

    pub fn decca_chains(&self) -> Result<Vec<DeccaChain>, DeccaError> {
        build_decca_chains(&self.navaids, ErrorPolicy::Abort)
    }
}
