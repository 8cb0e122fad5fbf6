use crate::app::{
    AppModel, CommitsView, PROFILE_FALLBACK_TEXT, ProfileState, ProjectsView, View,
    commits_panels, projects_panels,
};
use crate::domain::{
    CommitSummary, PLOT_HEIGHT, PLOT_WIDTH, ScatterGeometry, day_label, descending_size_order,
    hour_label, project_title_label, selection_count_label, HOUR_TICKS,
};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Circle, Line as CanvasLine, Rectangle};
use ratatui::widgets::{
    BarChart, Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap,
};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use unicode_width::UnicodeWidthStr;

pub const PROJECTS_ERROR_TEXT: &str = "Error loading projects.";

const DOT_COLOR: Color = Color::Cyan;
const SELECTED_COLOR: Color = Color::Yellow;
const HOVER_COLOR: Color = Color::White;
const GRID_COLOR: Color = Color::DarkGray;
const ACCENT: Color = Color::Yellow;

pub fn render(frame: &mut Frame, model: &AppModel) {
    let area = frame.area();
    if area.width < 20 || area.height < 10 {
        frame.render_widget(
            Paragraph::new("Terminal too small.").style(Style::default().fg(Color::Red)),
            area,
        );
        return;
    }

    render_tabs(frame, model, Rect::new(area.x, area.y, area.width, 1));

    match &model.view {
        View::Commits(view) => render_commits(frame, model, view),
        View::Projects(view) => render_projects(frame, model, view),
        View::Profile => render_profile(frame, model),
    }

    render_footer(
        frame,
        model,
        Rect::new(area.x, area.y + area.height - 1, area.width, 1),
    );

    if model.help_open {
        render_help_overlay(frame, area);
    }
    if let View::Commits(view) = &model.view {
        render_tooltip(frame, model, view, area);
    }
}

fn render_tabs(frame: &mut Frame, model: &AppModel, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (index, label) in ["Commits", "Projects", "Profile"].iter().enumerate() {
        if index > 0 {
            spans.push(Span::styled(" │ ", Style::default().fg(GRID_COLOR)));
        }
        let active = model.view.label() == *label;
        let style = if active {
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!("{}:{label}", index + 1), style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_footer(frame: &mut Frame, model: &AppModel, area: Rect) {
    let line = if let Some(notice) = &model.notice {
        Line::from(Span::styled(
            format!(" {notice}"),
            Style::default().fg(ACCENT),
        ))
    } else {
        Line::from(Span::styled(
            " Tab switch view · drag to brush · Ctrl+R reload · F1 help · Ctrl+Q quit",
            Style::default().fg(GRID_COLOR),
        ))
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_commits(frame: &mut Frame, model: &AppModel, view: &CommitsView) {
    let Some(panels) = commits_panels(model.terminal_size) else {
        return;
    };
    render_stats(frame, model, panels.stats);
    render_scatter(frame, model, view, panels.chart);
    render_selection(frame, model, view, panels.selection);
}

fn render_stats(frame: &mut Frame, model: &AppModel, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Summary ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(error) = &model.data.loc_error {
        frame.render_widget(
            Paragraph::new(error.as_str())
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true }),
            inner,
        );
        return;
    }

    let stats = &model.data.stats;
    let pairs: [(&str, String); 6] = [
        ("Commits", stats.commits.to_string()),
        ("Files", stats.files.to_string()),
        ("Total lines", stats.total_lines.to_string()),
        ("Max depth", stats.max_depth.to_string()),
        ("Longest line", stats.longest_line.to_string()),
        ("Max file lines", stats.max_file_lines.to_string()),
    ];
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 6); 6])
        .split(inner);
    for (column, (label, value)) in columns.iter().zip(pairs) {
        let lines = vec![
            Line::from(Span::styled(label, Style::default().fg(GRID_COLOR))),
            Line::from(Span::styled(
                value,
                Style::default().add_modifier(Modifier::BOLD),
            )),
        ];
        frame.render_widget(Paragraph::new(lines), *column);
    }
}

fn render_scatter(frame: &mut Frame, model: &AppModel, view: &CommitsView, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Commits by time of day ");
    let commits = &model.data.commits;
    let Some(geometry) = ScatterGeometry::new(commits) else {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(
            Paragraph::new("No commits to plot.").style(Style::default().fg(GRID_COLOR)),
            inner,
        );
        return;
    };

    let order = descending_size_order(commits);
    let selected = &view.selected;
    let hovered = view.hovered;
    let selection = view.selection;

    let canvas = Canvas::default()
        .block(block)
        .marker(symbols::Marker::Braille)
        .x_bounds([0.0, PLOT_WIDTH])
        .y_bounds([0.0, PLOT_HEIGHT])
        .paint(move |ctx| {
            for hour in HOUR_TICKS {
                let py = geometry.y.position(f64::from(hour));
                let cy = PLOT_HEIGHT - py;
                ctx.draw(&CanvasLine {
                    x1: geometry.frame.left,
                    y1: cy,
                    x2: geometry.frame.right,
                    y2: cy,
                    color: GRID_COLOR,
                });
                ctx.print(
                    0.0,
                    cy,
                    Span::styled(hour_label(hour), Style::default().fg(GRID_COLOR)),
                );
            }
            for tick in geometry.x.day_ticks(2) {
                let px = geometry.x.position(tick);
                ctx.print(
                    px - 20.0,
                    10.0,
                    Span::styled(day_label(tick), Style::default().fg(GRID_COLOR)),
                );
            }

            ctx.layer();
            for index in &order {
                let commit = &commits[*index];
                let (px, py) = geometry.position(commit);
                let color = if hovered == Some(*index) {
                    HOVER_COLOR
                } else if selected.contains(index) {
                    SELECTED_COLOR
                } else {
                    DOT_COLOR
                };
                ctx.draw(&Circle {
                    x: px,
                    y: PLOT_HEIGHT - py,
                    radius: geometry.radius(commit),
                    color,
                });
            }

            if let Some(rect) = selection {
                ctx.layer();
                ctx.draw(&Rectangle {
                    x: rect.x0,
                    y: PLOT_HEIGHT - rect.y1,
                    width: rect.x1 - rect.x0,
                    height: rect.y1 - rect.y0,
                    color: ACCENT,
                });
            }
        });
    frame.render_widget(canvas, area);
}

fn render_selection(frame: &mut Frame, model: &AppModel, view: &CommitsView, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Selection ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![Line::from(Span::styled(
        selection_count_label(view.selected.len()),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    if model.data.commits.is_empty() {
        lines.push(Line::from(Span::styled(
            "Load a change log to see commits here.",
            Style::default().fg(GRID_COLOR),
        )));
    }
    for share in &view.breakdown {
        lines.push(Line::from(vec![
            Span::styled(share.language.clone(), Style::default().fg(DOT_COLOR)),
            Span::raw(format!(
                ": {} lines ({})",
                share.lines,
                share.percent_label()
            )),
        ]));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

const TOOLTIP_DATE: &[BorrowedFormatItem<'_>] = format_description!(
    "[weekday repr:long], [month repr:long] [day padding:none], [year] [hour repr:12 padding:none]:[minute] [period]"
);

fn tooltip_lines(commit: &CommitSummary) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        commit.id.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    if let Some(url) = &commit.url {
        lines.push(Line::from(Span::styled(
            url.clone(),
            Style::default().fg(DOT_COLOR),
        )));
    }
    if let Ok(date) = commit.datetime.format(TOOLTIP_DATE) {
        lines.push(Line::from(date));
    }
    lines.push(Line::from(Span::styled(
        format!("{} lines", commit.total_lines),
        Style::default().fg(GRID_COLOR),
    )));
    lines
}

/// Floating commit details next to the pointer, shifted one cell right and
/// down so the pointer never covers its own tooltip, clamped to the screen.
fn render_tooltip(frame: &mut Frame, model: &AppModel, view: &CommitsView, area: Rect) {
    let (Some(index), Some((column, row))) = (view.hovered, view.pointer) else {
        return;
    };
    let Some(commit) = model.data.commits.get(index) else {
        return;
    };

    let lines = tooltip_lines(commit);
    let width = lines
        .iter()
        .map(|line| {
            line.spans
                .iter()
                .map(|span| span.content.width())
                .sum::<usize>()
        })
        .max()
        .unwrap_or(0) as u16
        + 4;
    let height = lines.len() as u16 + 2;
    let width = width.min(area.width);
    let height = height.min(area.height);

    let x = (column + 1).min(area.width.saturating_sub(width));
    let y = (row + 1).min(area.height.saturating_sub(height));
    let rect = Rect::new(x, y, width, height);

    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL)),
        rect,
    );
}

fn render_projects(frame: &mut Frame, model: &AppModel, view: &ProjectsView) {
    let Some(panels) = projects_panels(model.terminal_size) else {
        return;
    };

    let search = if view.query.is_empty() {
        Paragraph::new(Span::styled(
            "Type to filter projects…",
            Style::default().fg(GRID_COLOR),
        ))
    } else {
        Paragraph::new(view.query.as_str())
    };
    frame.render_widget(
        search.block(Block::default().borders(Borders::ALL).title(" Search ")),
        panels.search,
    );

    render_project_list(frame, model, view, panels.list);
    render_year_chart(frame, view, panels.chart);
    render_year_legend(frame, view, panels.legend);
}

fn render_project_list(frame: &mut Frame, model: &AppModel, view: &ProjectsView, area: Rect) {
    let title = format!(" {} ", project_title_label(view.filtered_indices.len()));
    let block = Block::default().borders(Borders::ALL).title(title);

    if model.data.projects_error.is_some() {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(
            Paragraph::new(PROJECTS_ERROR_TEXT).style(Style::default().fg(Color::Red)),
            inner,
        );
        return;
    }
    if model.data.projects.is_empty() {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(
            Paragraph::new("No projects yet — check back soon!")
                .style(Style::default().fg(GRID_COLOR)),
            inner,
        );
        return;
    }

    let items: Vec<ListItem> = view
        .filtered_indices
        .iter()
        .filter_map(|index| model.data.projects.get(*index))
        .map(|project| {
            let mut spans = vec![Span::styled(
                project.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )];
            if let Some(year) = project.year_label() {
                spans.push(Span::styled(
                    format!("  {year}"),
                    Style::default().fg(GRID_COLOR),
                ));
            }
            if !project.description.is_empty() {
                spans.push(Span::raw(format!("  {}", project.description)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !view.filtered_indices.is_empty() {
        state.select(Some(view.selected));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_year_chart(frame: &mut Frame, view: &ProjectsView, area: Rect) {
    let data: Vec<(&str, u64)> = view
        .years
        .iter()
        .map(|entry| (entry.year.as_str(), entry.count as u64))
        .collect();
    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(" By year "))
        .data(&data)
        .bar_width(6)
        .bar_gap(1)
        .bar_style(Style::default().fg(DOT_COLOR))
        .value_style(Style::default().fg(Color::Black).bg(DOT_COLOR));
    frame.render_widget(chart, area);
}

fn render_year_legend(frame: &mut Frame, view: &ProjectsView, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Years ")
        .title_bottom(Line::from(Span::styled(
            " ←/→ + Enter filter ",
            Style::default().fg(GRID_COLOR),
        )));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = view
        .years
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let active = view.selected_year.as_deref() == Some(entry.year.as_str());
            let mut style = if active {
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            if index == view.legend_cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }
            let marker = if active { "●" } else { "○" };
            Line::from(Span::styled(
                format!("{marker} {}  {}", entry.year, entry.count),
                style,
            ))
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_profile(frame: &mut Frame, model: &AppModel) {
    let area = frame.area();
    let content = Rect::new(area.x, area.y + 1, area.width, area.height - 2);
    let block = Block::default().borders(Borders::ALL).title(" GitHub ");
    let inner = block.inner(content);
    frame.render_widget(block, content);

    let lines = match &model.profile {
        ProfileState::Unconfigured => vec![Line::from(Span::styled(
            "No GitHub user configured. Pass --user or set LOCDASH_GITHUB_USER.",
            Style::default().fg(GRID_COLOR),
        ))],
        ProfileState::Loading => vec![Line::from(Span::styled(
            "Loading GitHub profile…",
            Style::default().fg(GRID_COLOR),
        ))],
        ProfileState::Failed => vec![Line::from(Span::styled(
            PROFILE_FALLBACK_TEXT,
            Style::default().fg(Color::Red),
        ))],
        ProfileState::Loaded(profile) => {
            let mut lines = vec![
                Line::from(Span::styled(
                    profile.display_name().to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!("@{}", profile.login),
                    Style::default().fg(GRID_COLOR),
                )),
                Line::from(Span::styled(
                    profile.html_url.clone(),
                    Style::default().fg(DOT_COLOR),
                )),
                Line::default(),
            ];
            for (label, value) in [
                ("Public repos", profile.public_repos),
                ("Public gists", profile.public_gists),
                ("Followers", profile.followers),
                ("Following", profile.following),
            ] {
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("{label:<14}"),
                        Style::default().fg(GRID_COLOR),
                    ),
                    Span::styled(
                        value.to_string(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ]));
            }
            lines
        }
    };
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let width = 52.min(area.width);
    let height = 14.min(area.height);
    let rect = Rect::new(
        (area.width - width) / 2,
        (area.height - height) / 2,
        width,
        height,
    );
    frame.render_widget(Clear, rect);

    let rows: [(&str, &str); 10] = [
        ("Tab / Shift+Tab", "cycle views"),
        ("Ctrl+1/2/3", "jump to a view"),
        ("drag", "brush commits"),
        ("click", "clear the brush"),
        ("type", "filter projects"),
        ("↑/↓", "move in the project list"),
        ("←/→ + Enter", "toggle a year filter"),
        ("Esc", "clear query, filter, or brush"),
        ("Ctrl+R", "reload data files"),
        ("Ctrl+Q", "quit"),
    ];
    let lines: Vec<Line> = rows
        .iter()
        .map(|(keys, action)| {
            Line::from(vec![
                Span::styled(
                    format!("{keys:<16}"),
                    Style::default().fg(ACCENT),
                ),
                Span::raw(*action),
            ])
        })
        .collect();
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Help ")),
        rect,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{AppConfig, AppData, AppModel, ProjectsView};
    use crate::domain::LocStats;
    use crate::infra::FetchProfileError;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::path::PathBuf;

    fn empty_model() -> AppModel {
        let config = AppConfig {
            loc_path: PathBuf::from("loc.csv"),
            projects_path: PathBuf::from("projects.json"),
            github_user: None,
            remote_base: None,
        };
        AppModel::new(AppData {
            config,
            records: Vec::new(),
            commits: Vec::new(),
            stats: LocStats::default(),
            loc_error: None,
            projects: Vec::new(),
            projects_error: None,
        })
        .with_terminal_size(80, 24)
    }

    fn rendered_text(model: &AppModel) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).expect("terminal");
        terminal.draw(|frame| render(frame, model)).expect("draw");
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn failed_profile_fetch_renders_the_fallback_text() {
        let mut model = empty_model();
        model.profile =
            ProfileState::from_fetch(Err(FetchProfileError::Http(ureq::Error::StatusCode(404))));
        model.view = View::Profile;
        assert!(rendered_text(&model).contains(PROFILE_FALLBACK_TEXT));
    }

    #[test]
    fn projects_load_failure_renders_the_short_message() {
        let mut model = empty_model();
        model.data.projects_error = Some("failed to read projects file x: oh no".to_string());
        model.view = View::Projects(ProjectsView::new(&model.data.projects.clone()));
        let text = rendered_text(&model);
        assert!(text.contains(PROJECTS_ERROR_TEXT));
        assert!(!text.contains("oh no"));
    }
}
