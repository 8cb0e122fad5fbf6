use crate::domain::{language_breakdown, summarize_commits};
use crate::infra::{
    LoadLocError, load_loc_table, resolve_loc_path, resolve_remote_base,
};
use std::path::PathBuf;
use thiserror::Error;
use time::format_description::well_known::Rfc3339;

/// What the process was asked to do, decided before any terminal setup.
#[derive(Clone, Debug, PartialEq)]
pub enum CliInvocation {
    PrintHelp,
    PrintVersion,
    Tui(TuiArgs),
    Command(CliCommand),
}

/// Flags for the interactive dashboard. Unset values fall back to the
/// environment and then to defaults during resolution.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TuiArgs {
    pub loc: Option<PathBuf>,
    pub projects: Option<PathBuf>,
    pub user: Option<String>,
    pub remote: Option<String>,
}

/// One-shot subcommands that print and exit, for piping into other tools.
#[derive(Clone, Debug, PartialEq)]
pub enum CliCommand {
    Stats {
        loc: Option<PathBuf>,
        json: bool,
    },
    Commits {
        loc: Option<PathBuf>,
        remote: Option<String>,
        limit: Option<usize>,
        offset: usize,
        json: bool,
    },
    Breakdown {
        loc: Option<PathBuf>,
    },
}

#[derive(Debug, Error, PartialEq)]
pub enum CliParseError {
    #[error("unknown subcommand: {0}")]
    UnknownSubcommand(String),
    #[error("unknown flag: {0}")]
    UnknownFlag(String),
    #[error("flag {0} requires a value")]
    MissingFlagValue(String),
    #[error("invalid value for {flag}: {value}")]
    InvalidFlagValue { flag: String, value: String },
    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),
}

pub fn parse_invocation(args: &[String]) -> Result<CliInvocation, CliParseError> {
    if args
        .iter()
        .any(|arg| arg == "--help" || arg == "-h" || arg == "help")
    {
        return Ok(CliInvocation::PrintHelp);
    }
    if args.iter().any(|arg| arg == "--version" || arg == "-V") {
        return Ok(CliInvocation::PrintVersion);
    }

    match args.first().map(String::as_str) {
        Some("stats") => parse_stats(&args[1..]),
        Some("commits") => parse_commits(&args[1..]),
        Some("breakdown") => parse_breakdown(&args[1..]),
        Some(first) if !first.starts_with('-') => {
            Err(CliParseError::UnknownSubcommand(first.to_string()))
        }
        _ => parse_tui(args),
    }
}

fn parse_tui(args: &[String]) -> Result<CliInvocation, CliParseError> {
    let mut parsed = TuiArgs::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--loc" => parsed.loc = Some(PathBuf::from(flag_value(arg, iter.next())?)),
            "--projects" => {
                parsed.projects = Some(PathBuf::from(flag_value(arg, iter.next())?));
            }
            "--user" => parsed.user = Some(flag_value(arg, iter.next())?),
            "--remote" => parsed.remote = Some(flag_value(arg, iter.next())?),
            other if other.starts_with('-') => {
                return Err(CliParseError::UnknownFlag(other.to_string()));
            }
            other => return Err(CliParseError::UnexpectedArgument(other.to_string())),
        }
    }
    Ok(CliInvocation::Tui(parsed))
}

fn parse_stats(args: &[String]) -> Result<CliInvocation, CliParseError> {
    let mut loc = None;
    let mut json = false;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--loc" => loc = Some(PathBuf::from(flag_value(arg, iter.next())?)),
            "--json" => json = true,
            other if other.starts_with('-') => {
                return Err(CliParseError::UnknownFlag(other.to_string()));
            }
            other => return Err(CliParseError::UnexpectedArgument(other.to_string())),
        }
    }
    Ok(CliInvocation::Command(CliCommand::Stats { loc, json }))
}

fn parse_commits(args: &[String]) -> Result<CliInvocation, CliParseError> {
    let mut loc = None;
    let mut remote = None;
    let mut limit = None;
    let mut offset = 0;
    let mut json = false;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--loc" => loc = Some(PathBuf::from(flag_value(arg, iter.next())?)),
            "--remote" => remote = Some(flag_value(arg, iter.next())?),
            "--limit" => {
                let value = flag_value(arg, iter.next())?;
                limit = Some(parse_count(arg, value)?);
            }
            "--offset" => {
                let value = flag_value(arg, iter.next())?;
                offset = parse_count(arg, value)?;
            }
            "--json" => json = true,
            other if other.starts_with('-') => {
                return Err(CliParseError::UnknownFlag(other.to_string()));
            }
            other => return Err(CliParseError::UnexpectedArgument(other.to_string())),
        }
    }
    Ok(CliInvocation::Command(CliCommand::Commits {
        loc,
        remote,
        limit,
        offset,
        json,
    }))
}

fn parse_count(flag: &str, value: String) -> Result<usize, CliParseError> {
    value.parse().map_err(|_| CliParseError::InvalidFlagValue {
        flag: flag.to_string(),
        value,
    })
}

fn parse_breakdown(args: &[String]) -> Result<CliInvocation, CliParseError> {
    let mut loc = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--loc" => loc = Some(PathBuf::from(flag_value(arg, iter.next())?)),
            other if other.starts_with('-') => {
                return Err(CliParseError::UnknownFlag(other.to_string()));
            }
            other => return Err(CliParseError::UnexpectedArgument(other.to_string())),
        }
    }
    Ok(CliInvocation::Command(CliCommand::Breakdown { loc }))
}

fn flag_value(flag: &str, value: Option<&String>) -> Result<String, CliParseError> {
    value
        .cloned()
        .ok_or_else(|| CliParseError::MissingFlagValue(flag.to_string()))
}

#[derive(Debug, Error)]
pub enum CliRunError {
    #[error(transparent)]
    Load(#[from] LoadLocError),
    #[error("could not encode JSON output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not format timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
}

pub fn run(command: CliCommand) -> Result<(), CliRunError> {
    match command {
        CliCommand::Stats { loc, json } => run_stats(loc, json),
        CliCommand::Commits {
            loc,
            remote,
            limit,
            offset,
            json,
        } => run_commits(loc, remote, limit, offset, json),
        CliCommand::Breakdown { loc } => run_breakdown(loc),
    }
}

fn run_stats(loc: Option<PathBuf>, json: bool) -> Result<(), CliRunError> {
    let path = resolve_loc_path(loc);
    let records = load_loc_table(&path)?;
    let commits = summarize_commits(&records, None);
    let stats = crate::domain::compute_loc_stats(&records, &commits);
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }
    println!("commits\t{}", stats.commits);
    println!("files\t{}", stats.files);
    println!("total_lines\t{}", stats.total_lines);
    println!("max_depth\t{}", stats.max_depth);
    println!("longest_line\t{}", stats.longest_line);
    println!("max_file_lines\t{}", stats.max_file_lines);
    Ok(())
}

fn run_commits(
    loc: Option<PathBuf>,
    remote: Option<String>,
    limit: Option<usize>,
    offset: usize,
    json: bool,
) -> Result<(), CliRunError> {
    let path = resolve_loc_path(loc);
    let records = load_loc_table(&path)?;
    let remote = resolve_remote_base(remote);
    let commits = summarize_commits(&records, remote.as_deref());
    let start = offset.min(commits.len());
    let end = match limit {
        Some(limit) => (start + limit).min(commits.len()),
        None => commits.len(),
    };
    let shown = &commits[start..end];
    if json {
        println!("{}", serde_json::to_string_pretty(shown)?);
        return Ok(());
    }
    for commit in shown {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            commit.id,
            commit.author,
            commit.datetime.format(&Rfc3339)?,
            commit.total_lines,
            commit.url.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

fn run_breakdown(loc: Option<PathBuf>) -> Result<(), CliRunError> {
    let path = resolve_loc_path(loc);
    let records = load_loc_table(&path)?;
    let commits = summarize_commits(&records, None);
    let all: Vec<usize> = (0..commits.len()).collect();
    for share in language_breakdown(&commits, &all) {
        println!(
            "{}\t{}\t{}",
            share.language,
            share.lines,
            share.percent_label()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|part| part.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_the_dashboard() {
        let invocation = parse_invocation(&args(&[])).expect("parse");
        assert_eq!(invocation, CliInvocation::Tui(TuiArgs::default()));
    }

    #[test]
    fn tui_flags_are_collected() {
        let invocation = parse_invocation(&args(&[
            "--loc",
            "data/loc.csv",
            "--user",
            "octocat",
            "--remote",
            "https://github.com/octocat/site",
        ]))
        .expect("parse");
        let CliInvocation::Tui(parsed) = invocation else {
            panic!("expected tui invocation");
        };
        assert_eq!(parsed.loc, Some(PathBuf::from("data/loc.csv")));
        assert_eq!(parsed.user.as_deref(), Some("octocat"));
        assert_eq!(
            parsed.remote.as_deref(),
            Some("https://github.com/octocat/site")
        );
    }

    #[test]
    fn commits_subcommand_parses_limit_and_json() {
        let invocation = parse_invocation(&args(&[
            "commits", "--limit", "5", "--offset", "10", "--json",
        ]))
        .expect("parse");
        assert_eq!(
            invocation,
            CliInvocation::Command(CliCommand::Commits {
                loc: None,
                remote: None,
                limit: Some(5),
                offset: 10,
                json: true,
            })
        );
    }

    #[test]
    fn bad_limit_is_rejected_with_the_offending_value() {
        let error = parse_invocation(&args(&["commits", "--limit", "many"])).unwrap_err();
        assert_eq!(
            error,
            CliParseError::InvalidFlagValue {
                flag: "--limit".to_string(),
                value: "many".to_string(),
            }
        );
    }

    #[test]
    fn missing_flag_value_and_unknown_flag_are_rejected() {
        assert_eq!(
            parse_invocation(&args(&["stats", "--loc"])).unwrap_err(),
            CliParseError::MissingFlagValue("--loc".to_string())
        );
        assert_eq!(
            parse_invocation(&args(&["stats", "--format"])).unwrap_err(),
            CliParseError::UnknownFlag("--format".to_string())
        );
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        assert_eq!(
            parse_invocation(&args(&["serve"])).unwrap_err(),
            CliParseError::UnknownSubcommand("serve".to_string())
        );
    }

    #[test]
    fn help_wins_over_everything_else() {
        assert_eq!(
            parse_invocation(&args(&["commits", "--help"])).expect("parse"),
            CliInvocation::PrintHelp
        );
    }
}
