use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// One changed source line from the loc table. Immutable once loaded.
#[derive(Clone, Debug, PartialEq)]
pub struct LineRecord {
    pub file: String,
    pub line: u32,
    pub depth: u32,
    pub length: u32,
    pub date: String,
    pub author: String,
    pub time: String,
    pub timezone: String,
    pub language: String,
    pub commit: String,
    /// Full commit timestamp, used for x-axis placement.
    pub datetime: OffsetDateTime,
    /// Midnight of the commit's local date, in the authored timezone.
    pub day_start: OffsetDateTime,
}

/// Aggregated per-commit view derived from its line records.
///
/// `lines` is owned but carries `#[serde(skip)]`: the group is reachable in
/// memory yet excluded from JSON export, so `commits --json` stays one
/// summary object per commit.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CommitSummary {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub author: String,
    #[serde(serialize_with = "serialize_rfc3339")]
    pub datetime: OffsetDateTime,
    pub hour_frac: f64,
    pub total_lines: usize,
    #[serde(skip)]
    pub lines: Vec<LineRecord>,
}

fn serialize_rfc3339<S: Serializer>(
    datetime: &OffsetDateTime,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let text = datetime
        .format(&Rfc3339)
        .map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&text)
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct LocStats {
    pub commits: usize,
    pub files: usize,
    pub total_lines: usize,
    pub max_depth: u32,
    pub longest_line: u32,
    pub max_file_lines: u32,
}

/// One project card from the projects JSON. Unknown fields are retained so
/// the search filter can match on them, like the original listing does.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Project {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub year: Option<serde_json::Value>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Project {
    pub fn year_label(&self) -> Option<String> {
        let year = self.year.as_ref()?;
        let text = match year {
            serde_json::Value::String(value) => value.trim().to_string(),
            other => other.to_string(),
        };
        if text.is_empty() { None } else { Some(text) }
    }

    /// Lowercased concatenation of every field value, matching the
    /// `Object.values(p).join('\n')` haystack of the original search.
    pub fn haystack(&self) -> String {
        let mut parts = vec![
            self.title.clone(),
            self.image.clone(),
            self.description.clone(),
        ];
        if let Some(year) = self.year_label() {
            parts.push(year);
        }
        if let Some(url) = &self.url {
            parts.push(url.clone());
        }
        for value in self.extra.values() {
            match value {
                serde_json::Value::String(text) => parts.push(text.clone()),
                other => parts.push(other.to_string()),
            }
        }
        parts.join("\n").to_lowercase()
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct GithubProfile {
    pub login: String,
    pub name: Option<String>,
    pub html_url: String,
    pub avatar_url: String,
    pub public_repos: u64,
    pub public_gists: u64,
    pub followers: u64,
    pub following: u64,
}

impl GithubProfile {
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.login,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_summary_json_excludes_line_group() {
        let summary = CommitSummary {
            id: "abc123".to_string(),
            url: Some("https://example.com/repo/commit/abc123".to_string()),
            author: "Ada".to_string(),
            datetime: OffsetDateTime::UNIX_EPOCH,
            hour_frac: 0.0,
            total_lines: 2,
            lines: vec![],
        };
        let json = serde_json::to_value(&summary).expect("serialize");
        assert_eq!(json["id"], "abc123");
        assert_eq!(json["total_lines"], 2);
        assert_eq!(json["datetime"], "1970-01-01T00:00:00Z");
        assert!(json.get("lines").is_none());
    }

    #[test]
    fn project_haystack_covers_extra_fields() {
        let project: Project = serde_json::from_str(
            r#"{"title":"Viz","description":"Charts","year":2024,"tags":["Rust","TUI"]}"#,
        )
        .expect("project");
        let haystack = project.haystack();
        assert!(haystack.contains("viz"));
        assert!(haystack.contains("2024"));
        assert!(haystack.contains("rust"));
    }

    #[test]
    fn profile_falls_back_to_login_without_name() {
        let profile: GithubProfile = serde_json::from_str(
            r#"{"login":"octocat","name":null,"html_url":"h","avatar_url":"a",
                "public_repos":8,"public_gists":2,"followers":3,"following":4}"#,
        )
        .expect("profile");
        assert_eq!(profile.display_name(), "octocat");
    }
}
