use std::{io, path::Path};

use bevy_reflect::Reflect;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

pub mod apt;
pub mod decca;
pub mod nav;
pub mod tokens;

use apt::{Airport, AptDat, AptError};
use decca::{DeccaChain, DeccaError};
use nav::{EarthNavDat, EarthNavError, NavAid};

pub const DEFAULT_APT_DAT: &str = "apt.dat";
pub const DEFAULT_NAV_DAT: &str = "earth_nav.dat";

const TERMINATOR: &str = "99";

/// What a reader does with a line (or record) that fails to parse.
#[derive(Clone, Copy, Debug, Default, Reflect, Serialize, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Return the first error.
    #[default]
    Abort,
    /// Log the error and carry on with the next line.
    SkipLine,
}

fn read_to_string(contents: &[u8]) -> Result<String, io::Error> {
    String::from_utf8(contents.to_vec()).or_else(|_| {
        let (string, _, errors) = encoding_rs::WINDOWS_1252.decode(contents);
        if errors {
            warn!("errors while decoding win-1252");
        }
        Ok(string.to_string())
    })
}

/// Non-blank lines with their 1-based line numbers, after the header and up to the terminator.
fn data_lines(contents: &str, header_lines: usize) -> impl Iterator<Item = (usize, &str)> {
    contents
        .lines()
        .enumerate()
        .skip(header_lines)
        .take_while(|(_, line)| *line != TERMINATOR)
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| (idx + 1, line))
}

#[derive(Error, Debug)]
pub enum NavDataError {
    #[error("apt.dat: {0}")]
    Apt(#[from] AptError),
    #[error("earth_nav.dat: {0}")]
    EarthNav(#[from] EarthNavError),
    #[error("Decca chains: {0}")]
    Decca(#[from] DeccaError),
}

pub type NavDataResult = Result<NavData, NavDataError>;

/// Airports, navaids and Decca chains of one X-Plane navigation data set.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct NavData {
    pub airports: Vec<Airport>,
    pub navaids: Vec<NavAid>,
    pub decca_chains: Vec<DeccaChain>,
}

impl NavData {
    pub fn from_dir(dir: &Path) -> NavDataResult {
        Self::from_paths(&dir.join(DEFAULT_APT_DAT), &dir.join(DEFAULT_NAV_DAT))
    }

    pub fn from_paths(apt_path: &Path, nav_path: &Path) -> NavDataResult {
        let AptDat { airports } = AptDat::from_path(apt_path)?;
        let earth_nav = EarthNavDat::from_path(nav_path)?;
        let decca_chains = earth_nav.decca_chains()?;

        debug!(
            "loaded {} airports, {} navaids, {} Decca chains",
            airports.len(),
            earth_nav.navaids.len(),
            decca_chains.len()
        );

        Ok(Self {
            airports,
            navaids: earth_nav.navaids,
            decca_chains,
        })
    }
}
