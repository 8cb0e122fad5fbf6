use crate::domain::Project;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadProjectsError {
    #[error("failed to read projects file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse projects file {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

/// Flag > `LOCDASH_PROJECTS` > `projects.json` in the working directory.
pub fn resolve_projects_path(flag: Option<PathBuf>) -> PathBuf {
    if let Some(path) = flag {
        return path;
    }
    if let Some(path) = std::env::var_os("LOCDASH_PROJECTS") {
        return PathBuf::from(path);
    }
    PathBuf::from("projects.json")
}

/// The file must hold a JSON array of project objects.
pub fn load_projects(path: &Path) -> Result<Vec<Project>, LoadProjectsError> {
    let text = fs::read_to_string(path).map_err(|source| LoadProjectsError::Read {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| LoadProjectsError::Json {
        path: path.display().to_string(),
        source,
    })
}
