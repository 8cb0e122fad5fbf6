use crate::domain::{CommitSummary, ScatterGeometry};

/// Rectangular brush selection in plot pixels. Corners are normalized on
/// construction; bounds are inclusive on membership tests.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectionRect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl SelectionRect {
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Self {
        Self {
            x0: a.0.min(b.0),
            y0: a.1.min(b.1),
            x1: a.0.max(b.0),
            y1: a.1.max(b.1),
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.x0 <= x && x <= self.x1 && self.y0 <= y && y <= self.y1
    }

    /// A zero-area rectangle is a click, which clears the brush.
    pub fn is_empty(&self) -> bool {
        self.x0 == self.x1 || self.y0 == self.y1
    }
}

/// Membership is decided against the already-plotted positions, never by
/// inverting the rectangle back into the data domain.
pub fn is_commit_selected(
    selection: Option<SelectionRect>,
    geometry: &ScatterGeometry,
    commit: &CommitSummary,
) -> bool {
    let Some(rect) = selection else {
        return false;
    };
    let (x, y) = geometry.position(commit);
    rect.contains(x, y)
}

/// Indices of the selected commits. Recomputed on every brush event, never
/// cached across renders.
pub fn selected_commit_indices(
    selection: Option<SelectionRect>,
    geometry: Option<&ScatterGeometry>,
    commits: &[CommitSummary],
) -> Vec<usize> {
    let Some(geometry) = geometry else {
        return Vec::new();
    };
    commits
        .iter()
        .enumerate()
        .filter(|(_, commit)| is_commit_selected(selection, geometry, commit))
        .map(|(index, _)| index)
        .collect()
}

pub fn selection_count_label(selected: usize) -> String {
    if selected == 0 {
        "No commits selected".to_string()
    } else {
        format!("{selected} commits selected")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LanguageShare {
    pub language: String,
    pub lines: usize,
    pub percent: f64,
}

impl LanguageShare {
    /// One-decimal percentage, e.g. "37.5%".
    pub fn percent_label(&self) -> String {
        format!("{:.1}%", self.percent)
    }
}

/// Flattens the selected commits' line records and groups them by file-type
/// classification, in first-encounter order. Empty when nothing is selected.
pub fn language_breakdown(commits: &[CommitSummary], selected: &[usize]) -> Vec<LanguageShare> {
    let mut shares: Vec<LanguageShare> = Vec::new();
    let mut total = 0usize;

    for &index in selected {
        let Some(commit) = commits.get(index) else {
            continue;
        };
        for line in &commit.lines {
            total += 1;
            match shares
                .iter_mut()
                .find(|share| share.language == line.language)
            {
                Some(share) => share.lines += 1,
                None => shares.push(LanguageShare {
                    language: line.language.clone(),
                    lines: 1,
                    percent: 0.0,
                }),
            }
        }
    }

    if total > 0 {
        for share in &mut shares {
            share.percent = share.lines as f64 / total as f64 * 100.0;
        }
    }
    shares
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{parse_loc_table, summarize_commits};

    const HEADER: &str = "file,line,depth,length,date,author,time,timezone,type,commit,datetime";

    /// Commit A at hour 9.5 with 10 lines (7 js, 3 css); commit B at hour
    /// 14.0 with 5 js lines.
    fn two_commit_fixture() -> Vec<CommitSummary> {
        let mut text = String::from(HEADER);
        for line in 1..=7 {
            text.push_str(&format!(
                "\napp.js,{line},0,1,2025-05-14,Ada,09:30,-0700,js,A,2025-05-14T09:30:00-07:00"
            ));
        }
        for line in 1..=3 {
            text.push_str(&format!(
                "\nstyle.css,{line},0,1,2025-05-14,Ada,09:30,-0700,css,A,2025-05-14T09:30:00-07:00"
            ));
        }
        for line in 1..=5 {
            text.push_str(&format!(
                "\napp.js,{line},0,1,2025-05-16,Ada,14:00,-0700,js,B,2025-05-16T14:00:00-07:00"
            ));
        }
        summarize_commits(&parse_loc_table(&text).expect("fixture"), None)
    }

    fn rect_around(geometry: &ScatterGeometry, commit: &CommitSummary, pad: f64) -> SelectionRect {
        let (x, y) = geometry.position(commit);
        SelectionRect::from_corners((x - pad, y - pad), (x + pad, y + pad))
    }

    #[test]
    fn rectangle_normalizes_and_tests_inclusively() {
        let rect = SelectionRect::from_corners((10.0, 20.0), (5.0, 2.0));
        assert_eq!(
            rect,
            SelectionRect {
                x0: 5.0,
                y0: 2.0,
                x1: 10.0,
                y1: 20.0
            }
        );
        assert!(rect.contains(5.0, 2.0));
        assert!(rect.contains(10.0, 20.0));
        assert!(!rect.contains(10.1, 20.0));
        assert!(SelectionRect::from_corners((3.0, 3.0), (3.0, 9.0)).is_empty());
    }

    #[test]
    fn selecting_only_commit_a_reports_its_breakdown() {
        let commits = two_commit_fixture();
        let geometry = ScatterGeometry::new(&commits).expect("geometry");
        let rect = rect_around(&geometry, &commits[0], 4.0);

        let selected = selected_commit_indices(Some(rect), Some(&geometry), &commits);
        assert_eq!(selected, vec![0]);
        assert_eq!(selection_count_label(selected.len()), "1 commits selected");

        let breakdown = language_breakdown(&commits, &selected);
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].language, "js");
        assert_eq!(breakdown[0].lines, 7);
        assert_eq!(breakdown[0].percent_label(), "70.0%");
        assert_eq!(breakdown[1].language, "css");
        assert_eq!(breakdown[1].lines, 3);
        assert_eq!(breakdown[1].percent_label(), "30.0%");
    }

    #[test]
    fn no_selection_reports_no_commits_and_empty_breakdown() {
        let commits = two_commit_fixture();
        let geometry = ScatterGeometry::new(&commits).expect("geometry");
        let selected = selected_commit_indices(None, Some(&geometry), &commits);
        assert!(selected.is_empty());
        assert_eq!(selection_count_label(0), "No commits selected");
        assert!(language_breakdown(&commits, &selected).is_empty());
    }

    #[test]
    fn enlarging_the_rectangle_never_shrinks_the_selection() {
        let commits = two_commit_fixture();
        let geometry = ScatterGeometry::new(&commits).expect("geometry");

        let mut previous = 0usize;
        for pad in [1.0, 50.0, 200.0, 600.0, 1200.0] {
            let rect = rect_around(&geometry, &commits[0], pad);
            let count = selected_commit_indices(Some(rect), Some(&geometry), &commits).len();
            assert!(count >= previous, "selection shrank at pad {pad}");
            previous = count;
        }
        assert_eq!(previous, commits.len());
    }

    #[test]
    fn breakdown_percentages_sum_to_one_hundred() {
        let commits = two_commit_fixture();
        let geometry = ScatterGeometry::new(&commits).expect("geometry");
        let rect = SelectionRect::from_corners((0.0, 0.0), (1000.0, 600.0));
        let selected = selected_commit_indices(Some(rect), Some(&geometry), &commits);
        assert_eq!(selected.len(), commits.len());

        let breakdown = language_breakdown(&commits, &selected);
        let total: f64 = breakdown.iter().map(|share| share.percent).sum();
        assert!((total - 100.0).abs() < 0.1);
    }

    #[test]
    fn missing_geometry_selects_nothing() {
        let commits = two_commit_fixture();
        let rect = SelectionRect::from_corners((0.0, 0.0), (1000.0, 600.0));
        assert!(selected_commit_indices(Some(rect), None, &commits).is_empty());
    }
}
