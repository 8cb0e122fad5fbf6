mod mouse;

use crate::domain::{
    CommitSummary, GithubProfile, LanguageShare, LineRecord, LocStats, Project, SelectionRect,
    YearCount, compute_loc_stats, filter_projects, rollup_by_year, selected_commit_indices,
    summarize_commits,
};
use crate::infra::{FetchProfileError, load_loc_table, load_projects};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use std::path::PathBuf;
use thiserror::Error;

pub use mouse::{CommitsPanels, ProjectsPanels, commits_panels, projects_panels};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Resolved configuration for one run: where the data lives and which
/// identity to show. All optional pieces degrade to a panel message.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub loc_path: PathBuf,
    pub projects_path: PathBuf,
    pub github_user: Option<String>,
    pub remote_base: Option<String>,
}

/// Loaded datasets plus per-feature load errors. A failed source disables
/// only its own panel; the rest of the dashboard keeps working.
#[derive(Clone, Debug)]
pub struct AppData {
    pub config: AppConfig,
    pub records: Vec<LineRecord>,
    pub commits: Vec<CommitSummary>,
    pub stats: LocStats,
    pub loc_error: Option<String>,
    pub projects: Vec<Project>,
    pub projects_error: Option<String>,
}

pub fn load_app_data(config: AppConfig) -> AppData {
    let (records, loc_error) = match load_loc_table(&config.loc_path) {
        Ok(records) => (records, None),
        Err(error) => (Vec::new(), Some(error.to_string())),
    };
    let commits = summarize_commits(&records, config.remote_base.as_deref());
    let stats = compute_loc_stats(&records, &commits);

    let (projects, projects_error) = match load_projects(&config.projects_path) {
        Ok(projects) => (projects, None),
        Err(error) => (Vec::new(), Some(error.to_string())),
    };

    AppData {
        config,
        records,
        commits,
        stats,
        loc_error,
        projects,
        projects_error,
    }
}

pub const PROFILE_FALLBACK_TEXT: &str = "Could not load GitHub data.";

#[derive(Clone, Debug)]
pub enum ProfileState {
    Unconfigured,
    Loading,
    Loaded(Box<GithubProfile>),
    Failed,
}

impl ProfileState {
    /// Every fetch failure collapses to `Failed`, which renders only the
    /// fallback text; the error itself is never surfaced.
    pub fn from_fetch(result: Result<GithubProfile, FetchProfileError>) -> Self {
        match result {
            Ok(profile) => Self::Loaded(Box::new(profile)),
            Err(_) => Self::Failed,
        }
    }
}

#[derive(Clone, Debug)]
pub enum View {
    Commits(CommitsView),
    Projects(ProjectsView),
    Profile,
}

impl View {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Commits(_) => "Commits",
            Self::Projects(_) => "Projects",
            Self::Profile => "Profile",
        }
    }
}

/// Scatter view state. The selection set and breakdown are derived state,
/// recomputed from the rectangle on every brush event.
#[derive(Clone, Debug, Default)]
pub struct CommitsView {
    /// Anchor corner of an in-progress drag, in plot pixels.
    pub brush_origin: Option<(f64, f64)>,
    pub selection: Option<SelectionRect>,
    pub selected: Vec<usize>,
    pub breakdown: Vec<LanguageShare>,
    pub hovered: Option<usize>,
    /// Last pointer cell, for tooltip placement.
    pub pointer: Option<(u16, u16)>,
}

#[derive(Clone, Debug)]
pub struct ProjectsView {
    pub query: String,
    pub selected_year: Option<String>,
    pub filtered_indices: Vec<usize>,
    pub selected: usize,
    pub years: Vec<YearCount>,
    pub legend_cursor: usize,
}

impl ProjectsView {
    pub fn new(projects: &[Project]) -> Self {
        Self {
            query: String::new(),
            selected_year: None,
            filtered_indices: (0..projects.len()).collect(),
            selected: 0,
            years: rollup_by_year(projects),
            legend_cursor: 0,
        }
    }

    fn refilter(&mut self, projects: &[Project]) {
        self.filtered_indices =
            filter_projects(projects, &self.query, self.selected_year.as_deref());
        self.selected = self
            .selected
            .min(self.filtered_indices.len().saturating_sub(1));
    }
}

#[derive(Clone, Debug)]
pub struct AppModel {
    pub data: AppData,
    pub profile: ProfileState,
    pub view: View,
    pub terminal_size: (u16, u16),
    pub notice: Option<String>,
    pub help_open: bool,
}

impl AppModel {
    pub fn new(data: AppData) -> Self {
        Self {
            data,
            profile: ProfileState::Unconfigured,
            view: View::Commits(CommitsView::default()),
            terminal_size: (0, 0),
            notice: None,
            help_open: false,
        }
    }

    pub fn with_terminal_size(mut self, width: u16, height: u16) -> Self {
        self.terminal_size = (width, height);
        self
    }

    pub fn with_notice(mut self, notice: Option<String>) -> Self {
        self.notice = notice;
        self
    }

    /// Swaps in freshly loaded data, keeping the current view and whatever
    /// filter state still applies. Brush selections reset; the plotted
    /// positions they referred to no longer exist.
    pub fn with_data(mut self, data: AppData) -> Self {
        self.view = match self.view {
            View::Commits(_) => View::Commits(CommitsView::default()),
            View::Projects(view) => {
                let mut next = ProjectsView::new(&data.projects);
                next.query = view.query;
                next.selected_year = view
                    .selected_year
                    .filter(|year| next.years.iter().any(|entry| entry.year == *year));
                next.refilter(&data.projects);
                View::Projects(next)
            }
            View::Profile => View::Profile,
        };
        self.data = data;
        self
    }
}

#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Paste(String),
    Mouse(MouseEvent),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AppCommand {
    None,
    Quit,
    Reload,
}

pub fn update(model: AppModel, event: AppEvent) -> (AppModel, AppCommand) {
    match event {
        AppEvent::Key(key) => update_on_key(model, key),
        AppEvent::Paste(text) => update_on_paste(model, text),
        AppEvent::Mouse(mouse) => mouse::update_on_mouse(model, mouse),
    }
}

/// Re-derives the selection set and breakdown from the current rectangle.
/// Called on every brush event; nothing is cached across renders.
pub(crate) fn refresh_commit_selection(view: &mut CommitsView, commits: &[CommitSummary]) {
    let geometry = crate::domain::ScatterGeometry::new(commits);
    view.selected = selected_commit_indices(view.selection, geometry.as_ref(), commits);
    view.breakdown = crate::domain::language_breakdown(commits, &view.selected);
}

fn update_on_key(model: AppModel, key: KeyEvent) -> (AppModel, AppCommand) {
    let mut model = model;
    model.notice = None;

    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
    {
        return (model, AppCommand::Quit);
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('r') {
        return (model, AppCommand::Reload);
    }

    if key.code == KeyCode::F(1) {
        model.help_open = !model.help_open;
        return (model, AppCommand::None);
    }
    if model.help_open {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
            model.help_open = false;
        }
        return (model, AppCommand::None);
    }

    let command_modifier = key.modifiers.contains(KeyModifiers::CONTROL)
        || key.modifiers.contains(KeyModifiers::SUPER)
        || key.modifiers.contains(KeyModifiers::META);

    if command_modifier {
        match key.code {
            KeyCode::Char('1') => {
                model.view = View::Commits(CommitsView::default());
                return (model, AppCommand::None);
            }
            KeyCode::Char('2') => {
                model.view = View::Projects(ProjectsView::new(&model.data.projects));
                return (model, AppCommand::None);
            }
            KeyCode::Char('3') => {
                model.view = View::Profile;
                return (model, AppCommand::None);
            }
            _ => {}
        }
    }

    match key.code {
        KeyCode::Tab => {
            model.view = match model.view {
                View::Commits(_) => View::Projects(ProjectsView::new(&model.data.projects)),
                View::Projects(_) => View::Profile,
                View::Profile => View::Commits(CommitsView::default()),
            };
            return (model, AppCommand::None);
        }
        KeyCode::BackTab => {
            model.view = match model.view {
                View::Commits(_) => View::Profile,
                View::Projects(_) => View::Commits(CommitsView::default()),
                View::Profile => View::Projects(ProjectsView::new(&model.data.projects)),
            };
            return (model, AppCommand::None);
        }
        _ => {}
    }

    match model.view {
        View::Commits(mut view) => {
            if key.code == KeyCode::Esc {
                view.brush_origin = None;
                view.selection = None;
                view.hovered = None;
                refresh_commit_selection(&mut view, &model.data.commits);
            }
            model.view = View::Commits(view);
            (model, AppCommand::None)
        }
        View::Projects(mut view) => {
            match key.code {
                KeyCode::Esc => {
                    if !view.query.is_empty() {
                        view.query.clear();
                    } else {
                        view.selected_year = None;
                    }
                    view.refilter(&model.data.projects);
                }
                KeyCode::Backspace => {
                    view.query.pop();
                    view.refilter(&model.data.projects);
                }
                KeyCode::Up => {
                    view.selected = view.selected.saturating_sub(1);
                }
                KeyCode::Down => {
                    view.selected = (view.selected + 1)
                        .min(view.filtered_indices.len().saturating_sub(1));
                }
                KeyCode::Left => {
                    view.legend_cursor = view.legend_cursor.saturating_sub(1);
                }
                KeyCode::Right => {
                    view.legend_cursor =
                        (view.legend_cursor + 1).min(view.years.len().saturating_sub(1));
                }
                KeyCode::Enter => {
                    let cursor = view.legend_cursor;
                    toggle_year_at(&mut view, cursor, &model.data.projects);
                }
                KeyCode::Char(character) if !command_modifier => {
                    view.query.push(character);
                    view.refilter(&model.data.projects);
                }
                _ => {}
            }
            model.view = View::Projects(view);
            (model, AppCommand::None)
        }
        View::Profile => (model, AppCommand::None),
    }
}

/// Toggles the year filter on the legend entry at `index`; picking the
/// active year again clears the filter, like clicking the same pie slice.
pub(crate) fn toggle_year_at(view: &mut ProjectsView, index: usize, projects: &[Project]) {
    let Some(entry) = view.years.get(index) else {
        return;
    };
    if view.selected_year.as_deref() == Some(entry.year.as_str()) {
        view.selected_year = None;
    } else {
        view.selected_year = Some(entry.year.clone());
    }
    view.legend_cursor = index;
    view.refilter(projects);
}

fn update_on_paste(model: AppModel, text: String) -> (AppModel, AppCommand) {
    let mut model = model;
    if let View::Projects(mut view) = model.view {
        for character in text.chars() {
            let character = match character {
                '\n' | '\r' | '\t' => ' ',
                other => other,
            };
            view.query.push(character);
        }
        view.refilter(&model.data.projects);
        model.view = View::Projects(view);
    }
    (model, AppCommand::None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parse_loc_table;
    use crossterm::event::KeyEventKind;
    use std::path::PathBuf;

    const HEADER: &str = "file,line,depth,length,date,author,time,timezone,type,commit,datetime";

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: crossterm::event::KeyEventState::NONE,
        }
    }

    fn model_with_projects(json: &str) -> AppModel {
        let projects: Vec<Project> = serde_json::from_str(json).expect("projects");
        let config = AppConfig {
            loc_path: PathBuf::from("loc.csv"),
            projects_path: PathBuf::from("projects.json"),
            github_user: None,
            remote_base: None,
        };
        let mut model = AppModel::new(AppData {
            config,
            records: Vec::new(),
            commits: Vec::new(),
            stats: LocStats::default(),
            loc_error: None,
            projects: projects.clone(),
            projects_error: None,
        });
        model.view = View::Projects(ProjectsView::new(&projects));
        model.terminal_size = (120, 40);
        model
    }

    const PROJECTS: &str = r#"[
        {"title":"Pathfinder","description":"Maze solver","year":2024},
        {"title":"Loc Dashboard","description":"Commit charts","year":2025},
        {"title":"Old Site","description":"First portfolio","year":2024}
    ]"#;

    #[test]
    fn typing_filters_the_listing_live() {
        let model = model_with_projects(PROJECTS);
        let (model, _) = update(model, AppEvent::Key(key(KeyCode::Char('m'))));
        let (model, _) = update(model, AppEvent::Key(key(KeyCode::Char('a'))));
        let (model, _) = update(model, AppEvent::Key(key(KeyCode::Char('z'))));
        let View::Projects(view) = &model.view else {
            panic!("expected projects view");
        };
        assert_eq!(view.query, "maz");
        assert_eq!(view.filtered_indices, vec![0]);
    }

    #[test]
    fn year_toggle_filters_and_untoggles() {
        let model = model_with_projects(PROJECTS);
        let (model, _) = update(model, AppEvent::Key(key(KeyCode::Enter)));
        let View::Projects(view) = &model.view else {
            panic!("expected projects view");
        };
        assert_eq!(view.selected_year.as_deref(), Some("2024"));
        assert_eq!(view.filtered_indices, vec![0, 2]);

        let model = {
            let mut model = model_with_projects(PROJECTS);
            model.view = View::Projects(view.clone());
            model
        };
        let (model, _) = update(model, AppEvent::Key(key(KeyCode::Enter)));
        let View::Projects(view) = &model.view else {
            panic!("expected projects view");
        };
        assert_eq!(view.selected_year, None);
        assert_eq!(view.filtered_indices.len(), 3);
    }

    #[test]
    fn escape_clears_query_before_year_filter() {
        let mut model = model_with_projects(PROJECTS);
        if let View::Projects(view) = &mut model.view {
            view.query = "maze".to_string();
            view.selected_year = Some("2024".to_string());
            view.refilter(&model.data.projects.clone());
        }
        let (model, _) = update(model, AppEvent::Key(key(KeyCode::Esc)));
        let View::Projects(view) = &model.view else {
            panic!("expected projects view");
        };
        assert!(view.query.is_empty());
        assert_eq!(view.selected_year.as_deref(), Some("2024"));

        let (model, _) = update(model, AppEvent::Key(key(KeyCode::Esc)));
        let View::Projects(view) = &model.view else {
            panic!("expected projects view");
        };
        assert_eq!(view.selected_year, None);
    }

    #[test]
    fn ctrl_q_quits_and_ctrl_r_reloads() {
        let model = model_with_projects(PROJECTS);
        let quit = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: crossterm::event::KeyEventState::NONE,
        };
        let (_, command) = update(model.clone(), AppEvent::Key(quit));
        assert_eq!(command, AppCommand::Quit);

        let reload = KeyEvent {
            code: KeyCode::Char('r'),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: crossterm::event::KeyEventState::NONE,
        };
        let (_, command) = update(model, AppEvent::Key(reload));
        assert_eq!(command, AppCommand::Reload);
    }

    #[test]
    fn failed_profile_fetch_collapses_to_the_failed_state() {
        let error = FetchProfileError::Http(ureq::Error::StatusCode(404));
        assert!(matches!(
            ProfileState::from_fetch(Err(error)),
            ProfileState::Failed
        ));
    }

    #[test]
    fn successful_profile_fetch_keeps_the_body() {
        let profile: GithubProfile = serde_json::from_str(
            r#"{"login":"octocat","name":null,"html_url":"https://github.com/octocat",
                "avatar_url":"https://avatars.githubusercontent.com/u/1",
                "public_repos":8,"public_gists":2,"followers":3,"following":4}"#,
        )
        .expect("profile");
        let state = ProfileState::from_fetch(Ok(profile));
        let ProfileState::Loaded(loaded) = state else {
            panic!("expected loaded profile");
        };
        assert_eq!(loaded.display_name(), "octocat");
    }

    #[test]
    fn refresh_selection_covers_whole_plot_rectangle() {
        let mut text = String::from(HEADER);
        text.push_str(
            "\na.js,1,0,1,2025-05-14,Ada,09:30,-0700,js,c1,2025-05-14T09:30:00-07:00",
        );
        text.push_str(
            "\nb.js,1,0,1,2025-05-15,Ada,14:00,-0700,js,c2,2025-05-15T14:00:00-07:00",
        );
        let records = parse_loc_table(&text).expect("records");
        let commits = summarize_commits(&records, None);

        let mut view = CommitsView {
            selection: Some(SelectionRect::from_corners((0.0, 0.0), (1000.0, 600.0))),
            ..CommitsView::default()
        };
        refresh_commit_selection(&mut view, &commits);
        assert_eq!(view.selected, vec![0, 1]);
        assert_eq!(view.breakdown.len(), 1);
        assert_eq!(view.breakdown[0].lines, 2);
    }
}
