use crate::domain::Project;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct YearCount {
    pub year: String,
    pub count: usize,
}

/// Per-year project counts for the year chart, ascending by year. Projects
/// without a year are left out; the chart always reflects the full set, not
/// the filtered listing.
pub fn rollup_by_year(projects: &[Project]) -> Vec<YearCount> {
    let mut rolled: Vec<YearCount> = Vec::new();
    for project in projects {
        let Some(year) = project.year_label() else {
            continue;
        };
        match rolled.iter_mut().find(|entry| entry.year == year) {
            Some(entry) => entry.count += 1,
            None => rolled.push(YearCount { year, count: 1 }),
        }
    }
    rolled.sort_by(|a, b| match (year_key(&a.year), year_key(&b.year)) {
        (Some(a_key), Some(b_key)) => a_key.cmp(&b_key),
        _ => a.year.cmp(&b.year),
    });
    rolled
}

fn year_key(year: &str) -> Option<i64> {
    year.trim().parse::<i64>().ok()
}

/// Indices of projects matching the live query and the optional year
/// filter. The query matches case-insensitively over every field value; the
/// two filters compose.
pub fn filter_projects(projects: &[Project], query: &str, year: Option<&str>) -> Vec<usize> {
    let needle = query.trim().to_lowercase();
    projects
        .iter()
        .enumerate()
        .filter(|(_, project)| {
            if !needle.is_empty() && !project.haystack().contains(&needle) {
                return false;
            }
            match year {
                Some(year) => project.year_label().as_deref() == Some(year),
                None => true,
            }
        })
        .map(|(index, _)| index)
        .collect()
}

pub fn project_title_label(count: usize) -> String {
    if count == 1 {
        "1 Project".to_string()
    } else {
        format!("{count} Projects")
    }
}
