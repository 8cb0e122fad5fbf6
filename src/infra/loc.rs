use crate::domain::{LineRecord, ParseError, parse_loc_table};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadLocError {
    #[error("failed to read loc table {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse loc table {path}: {source}")]
    Parse { path: String, source: ParseError },
}

/// Flag > `LOCDASH_LOC` > `loc.csv` in the working directory.
pub fn resolve_loc_path(flag: Option<PathBuf>) -> PathBuf {
    if let Some(path) = flag {
        return path;
    }
    if let Some(path) = std::env::var_os("LOCDASH_LOC") {
        return PathBuf::from(path);
    }
    PathBuf::from("loc.csv")
}

pub fn load_loc_table(path: &Path) -> Result<Vec<LineRecord>, LoadLocError> {
    let text = fs::read_to_string(path).map_err(|source| LoadLocError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_loc_table(&text).map_err(|source| LoadLocError::Parse {
        path: path.display().to_string(),
        source,
    })
}
