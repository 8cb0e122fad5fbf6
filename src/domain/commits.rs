use crate::domain::{CommitSummary, LineRecord, LocStats};
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// Fractional hour-of-day of a timestamp, in [0, 24).
pub fn hour_frac(datetime: OffsetDateTime) -> f64 {
    f64::from(datetime.hour()) + f64::from(datetime.minute()) / 60.0
}

pub fn commit_url(remote_base: &str, id: &str) -> String {
    format!("{}/commit/{id}", remote_base.trim_end_matches('/'))
}

/// Groups line records into one summary per commit id, preserving the
/// first-seen order of commits. Author and timestamps come from the group's
/// first record; every record of a commit shares them by construction of the
/// source log.
pub fn summarize_commits(records: &[LineRecord], remote_base: Option<&str>) -> Vec<CommitSummary> {
    let mut summaries: Vec<CommitSummary> = Vec::new();
    let mut positions: BTreeMap<&str, usize> = BTreeMap::new();

    for record in records {
        match positions.get(record.commit.as_str()) {
            Some(&position) => {
                let summary = &mut summaries[position];
                summary.total_lines += 1;
                summary.lines.push(record.clone());
            }
            None => {
                positions.insert(record.commit.as_str(), summaries.len());
                summaries.push(CommitSummary {
                    id: record.commit.clone(),
                    url: remote_base.map(|base| commit_url(base, &record.commit)),
                    author: record.author.clone(),
                    datetime: record.datetime,
                    hour_frac: hour_frac(record.datetime),
                    total_lines: 1,
                    lines: vec![record.clone()],
                });
            }
        }
    }

    summaries
}

/// Scalar statistics for the summary panel. All zero on an empty table.
pub fn compute_loc_stats(records: &[LineRecord], commits: &[CommitSummary]) -> LocStats {
    let mut files: BTreeMap<&str, u32> = BTreeMap::new();
    let mut max_depth = 0u32;
    let mut longest_line = 0u32;

    for record in records {
        let max_line = files.entry(record.file.as_str()).or_insert(0);
        *max_line = (*max_line).max(record.line);
        max_depth = max_depth.max(record.depth);
        longest_line = longest_line.max(record.length);
    }

    LocStats {
        commits: commits.len(),
        files: files.len(),
        total_lines: records.len(),
        max_depth,
        longest_line,
        max_file_lines: files.values().copied().max().unwrap_or(0),
    }
}
