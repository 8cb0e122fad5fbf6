use crate::domain::GithubProfile;
use std::time::Duration;
use thiserror::Error;
use ureq::Agent;

#[derive(Debug, Error)]
pub enum FetchProfileError {
    #[error("github request failed: {0}")]
    Http(#[from] ureq::Error),
}

/// Flag > `LOCDASH_GITHUB_USER`. With neither set the profile panel stays
/// unconfigured instead of guessing an identity.
pub fn resolve_github_user(flag: Option<String>) -> Option<String> {
    flag.or_else(|| std::env::var("LOCDASH_GITHUB_USER").ok())
        .filter(|login| !login.trim().is_empty())
}

/// Flag > `LOCDASH_REMOTE`. Used to derive per-commit web URLs.
pub fn resolve_remote_base(flag: Option<String>) -> Option<String> {
    flag.or_else(|| std::env::var("LOCDASH_REMOTE").ok())
        .filter(|base| !base.trim().is_empty())
}

/// Fetches the public profile for one login. Non-2xx statuses surface as
/// `ureq::Error`, so a 404 lands in the same fallback path as a network
/// failure or a malformed body.
pub fn fetch_github_profile(login: &str) -> Result<GithubProfile, FetchProfileError> {
    let agent: Agent = Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(10)))
        .build()
        .new_agent();

    let url = format!("https://api.github.com/users/{login}");
    let mut response = agent
        .get(&url)
        .header("User-Agent", concat!("locdash/", env!("CARGO_PKG_VERSION")))
        .header("Accept", "application/vnd.github+json")
        .call()?;
    let profile: GithubProfile = response.body_mut().read_json()?;
    Ok(profile)
}
