use crate::app::{AppCommand, AppModel, CommitsView, View, refresh_commit_selection, toggle_year_at};
use crate::domain::{
    CommitSummary, PLOT_HEIGHT, PLOT_WIDTH, PlotFrame, ScatterGeometry, SelectionRect,
};
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Panel geometry for the commits view, shared by rendering and mouse
/// hit-testing so the two can never disagree about where the chart is.
#[derive(Clone, Copy, Debug)]
pub struct CommitsPanels {
    pub stats: Rect,
    pub chart: Rect,
    pub selection: Rect,
}

#[derive(Clone, Copy, Debug)]
pub struct ProjectsPanels {
    pub search: Rect,
    pub list: Rect,
    pub chart: Rect,
    pub legend: Rect,
}

fn content_area(terminal_size: (u16, u16)) -> Option<Rect> {
    let (width, height) = terminal_size;
    // One row of tabs above, one footer row below.
    if width < 20 || height < 10 {
        return None;
    }
    Some(Rect::new(0, 1, width, height - 2))
}

pub fn commits_panels(terminal_size: (u16, u16)) -> Option<CommitsPanels> {
    let content = content_area(terminal_size)?;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(10),
            Constraint::Length(8),
        ])
        .split(content);
    Some(CommitsPanels {
        stats: rows[0],
        chart: rows[1],
        selection: rows[2],
    })
}

pub fn projects_panels(terminal_size: (u16, u16)) -> Option<ProjectsPanels> {
    let content = content_area(terminal_size)?;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(8)])
        .split(content);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(58), Constraint::Percentage(42)])
        .split(rows[1]);
    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(8)])
        .split(columns[1]);
    Some(ProjectsPanels {
        search: rows[0],
        list: columns[0],
        chart: side[0],
        legend: side[1],
    })
}

fn rect_contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x
        && column < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}

/// Interior of a bordered block, or `None` when the borders leave no room.
fn inner_rect(rect: Rect) -> Option<Rect> {
    if rect.width <= 2 || rect.height <= 2 {
        return None;
    }
    Some(Rect::new(
        rect.x + 1,
        rect.y + 1,
        rect.width - 2,
        rect.height - 2,
    ))
}

/// Maps a terminal cell inside the chart interior to plot pixels, sampling
/// at the cell's center so adjacent cells land on distinct coordinates.
fn cell_to_plot(inner: Rect, column: u16, row: u16) -> Option<(f64, f64)> {
    if !rect_contains(inner, column, row) {
        return None;
    }
    let x = (f64::from(column - inner.x) + 0.5) / f64::from(inner.width) * PLOT_WIDTH;
    let y = (f64::from(row - inner.y) + 0.5) / f64::from(inner.height) * PLOT_HEIGHT;
    Some((x, y))
}

/// Picks the commit under the pointer. Smaller dots win ties so a dot
/// drawn on top of a bigger one stays reachable.
fn hover_target(
    commits: &[CommitSummary],
    geometry: &ScatterGeometry,
    point: (f64, f64),
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, commit) in commits.iter().enumerate() {
        let (cx, cy) = geometry.position(commit);
        let radius = geometry.radius(commit);
        let dx = point.0 - cx;
        let dy = point.1 - cy;
        if dx * dx + dy * dy > radius * radius {
            continue;
        }
        let replace = match best {
            Some((_, best_radius)) => radius <= best_radius,
            None => true,
        };
        if replace {
            best = Some((index, radius));
        }
    }
    best.map(|(index, _)| index)
}

pub(crate) fn update_on_mouse(model: AppModel, mouse: MouseEvent) -> (AppModel, AppCommand) {
    let mut model = model;
    match model.view {
        View::Commits(view) => {
            let view = commits_on_mouse(view, &model.data.commits, model.terminal_size, mouse);
            model.view = View::Commits(view);
        }
        View::Projects(mut view) => {
            let panels = projects_panels(model.terminal_size);
            match mouse.kind {
                MouseEventKind::ScrollUp => {
                    view.selected = view.selected.saturating_sub(1);
                }
                MouseEventKind::ScrollDown => {
                    view.selected = (view.selected + 1)
                        .min(view.filtered_indices.len().saturating_sub(1));
                }
                MouseEventKind::Down(MouseButton::Left) => {
                    if let Some(panels) = panels
                        && let Some(inner) = inner_rect(panels.legend)
                        && rect_contains(inner, mouse.column, mouse.row)
                    {
                        let index = usize::from(mouse.row - inner.y);
                        let projects = model.data.projects.clone();
                        toggle_year_at(&mut view, index, &projects);
                    }
                }
                _ => {}
            }
            model.view = View::Projects(view);
        }
        View::Profile => {}
    }
    (model, AppCommand::None)
}

fn commits_on_mouse(
    mut view: CommitsView,
    commits: &[CommitSummary],
    terminal_size: (u16, u16),
    mouse: MouseEvent,
) -> CommitsView {
    let Some(panels) = commits_panels(terminal_size) else {
        return view;
    };
    let Some(inner) = inner_rect(panels.chart) else {
        return view;
    };
    let frame = PlotFrame::new();
    let point = cell_to_plot(inner, mouse.column, mouse.row);
    // Brush corners are pinned to the usable band; drags into the margins
    // extend the rectangle only up to the band's edge.
    let brush_point = point.map(|point| frame.clamp(point));

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(point) = brush_point {
                view.brush_origin = Some(point);
                view.selection = Some(SelectionRect::from_corners(point, point));
                view.hovered = None;
                refresh_commit_selection(&mut view, commits);
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if let (Some(origin), Some(point)) = (view.brush_origin, brush_point) {
                view.selection = Some(SelectionRect::from_corners(origin, point));
                view.hovered = None;
                refresh_commit_selection(&mut view, commits);
            }
        }
        MouseEventKind::Up(MouseButton::Left) => {
            if let Some(origin) = view.brush_origin.take() {
                let rect = brush_point
                    .map(|point| SelectionRect::from_corners(origin, point))
                    .or(view.selection);
                // A click without a drag clears the brush, same as an
                // empty rectangle.
                view.selection = rect.filter(|rect| !rect.is_empty());
                refresh_commit_selection(&mut view, commits);
            }
        }
        MouseEventKind::Moved => {
            view.pointer = Some((mouse.column, mouse.row));
            view.hovered = match (point, ScatterGeometry::new(commits)) {
                (Some(point), Some(geometry)) if frame.contains(point.0, point.1) => {
                    hover_target(commits, &geometry, point)
                }
                _ => None,
            };
        }
        _ => {}
    }
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{AppConfig, AppData, AppEvent, update};
    use crate::domain::{compute_loc_stats, parse_loc_table, summarize_commits};
    use crossterm::event::KeyModifiers;
    use std::path::PathBuf;

    const HEADER: &str = "file,line,depth,length,date,author,time,timezone,type,commit,datetime";

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn commits_model() -> AppModel {
        let mut text = String::from(HEADER);
        text.push_str(
            "\na.js,1,0,1,2025-05-14,Ada,09:30,-0700,js,c1,2025-05-14T09:30:00-07:00",
        );
        text.push_str(
            "\nb.js,1,0,1,2025-05-15,Ada,14:00,-0700,js,c2,2025-05-15T14:00:00-07:00",
        );
        let records = parse_loc_table(&text).expect("records");
        let commits = summarize_commits(&records, None);
        let stats = compute_loc_stats(&records, &commits);
        let config = AppConfig {
            loc_path: PathBuf::from("loc.csv"),
            projects_path: PathBuf::from("projects.json"),
            github_user: None,
            remote_base: None,
        };
        AppModel::new(AppData {
            config,
            records,
            commits,
            stats,
            loc_error: None,
            projects: Vec::new(),
            projects_error: None,
        })
        .with_terminal_size(120, 40)
    }

    #[test]
    fn panels_share_the_content_area_without_overlap() {
        let panels = commits_panels((120, 40)).expect("panels");
        assert_eq!(panels.stats.y, 1);
        assert_eq!(panels.chart.y, panels.stats.y + panels.stats.height);
        assert_eq!(panels.selection.y, panels.chart.y + panels.chart.height);
        assert_eq!(
            panels.selection.y + panels.selection.height,
            40 - 1,
            "footer row stays free"
        );
    }

    #[test]
    fn tiny_terminals_yield_no_panels() {
        assert!(commits_panels((10, 5)).is_none());
        assert!(projects_panels((10, 5)).is_none());
    }

    #[test]
    fn drag_across_the_chart_selects_commits() {
        let model = commits_model();
        let panels = commits_panels(model.terminal_size).expect("panels");
        let inner = inner_rect(panels.chart).expect("inner");
        let left = (inner.x, inner.y);
        let right = (
            inner.x + inner.width - 1,
            inner.y + inner.height - 1,
        );

        let (model, _) = update(
            model,
            AppEvent::Mouse(mouse(MouseEventKind::Down(MouseButton::Left), left.0, left.1)),
        );
        let (model, _) = update(
            model,
            AppEvent::Mouse(mouse(
                MouseEventKind::Drag(MouseButton::Left),
                right.0,
                right.1,
            )),
        );
        let (model, _) = update(
            model,
            AppEvent::Mouse(mouse(MouseEventKind::Up(MouseButton::Left), right.0, right.1)),
        );

        let View::Commits(view) = &model.view else {
            panic!("expected commits view");
        };
        assert!(view.selection.is_some());
        assert_eq!(view.selected, vec![0, 1]);
    }

    #[test]
    fn brush_corners_are_pinned_to_the_usable_band() {
        let model = commits_model();
        let panels = commits_panels(model.terminal_size).expect("panels");
        let inner = inner_rect(panels.chart).expect("inner");

        let (model, _) = update(
            model,
            AppEvent::Mouse(mouse(MouseEventKind::Down(MouseButton::Left), inner.x, inner.y)),
        );
        let (model, _) = update(
            model,
            AppEvent::Mouse(mouse(
                MouseEventKind::Drag(MouseButton::Left),
                inner.x + inner.width - 1,
                inner.y + inner.height - 1,
            )),
        );

        let View::Commits(view) = &model.view else {
            panic!("expected commits view");
        };
        let rect = view.selection.expect("selection");
        let frame = PlotFrame::new();
        assert!(rect.x0 >= frame.left && rect.x1 <= frame.right);
        assert!(rect.y0 >= frame.top && rect.y1 <= frame.bottom);
    }

    #[test]
    fn click_without_drag_clears_the_selection() {
        let model = commits_model();
        let panels = commits_panels(model.terminal_size).expect("panels");
        let inner = inner_rect(panels.chart).expect("inner");
        let cell = (inner.x + inner.width / 2, inner.y + inner.height / 2);

        let (model, _) = update(
            model,
            AppEvent::Mouse(mouse(MouseEventKind::Down(MouseButton::Left), cell.0, cell.1)),
        );
        let (model, _) = update(
            model,
            AppEvent::Mouse(mouse(MouseEventKind::Up(MouseButton::Left), cell.0, cell.1)),
        );

        let View::Commits(view) = &model.view else {
            panic!("expected commits view");
        };
        assert!(view.selection.is_none());
        assert!(view.selected.is_empty());
    }

    #[test]
    fn moving_over_a_dot_sets_the_hover_target() {
        let model = commits_model();
        let panels = commits_panels(model.terminal_size).expect("panels");
        let inner = inner_rect(panels.chart).expect("inner");
        let geometry = ScatterGeometry::new(&model.data.commits).expect("geometry");
        let (px, py) = geometry.position(&model.data.commits[0]);
        let column = inner.x + (px / PLOT_WIDTH * f64::from(inner.width)) as u16;
        let row = inner.y + (py / PLOT_HEIGHT * f64::from(inner.height)) as u16;

        let (model, _) = update(
            model,
            AppEvent::Mouse(mouse(MouseEventKind::Moved, column, row)),
        );
        let View::Commits(view) = &model.view else {
            panic!("expected commits view");
        };
        assert_eq!(view.hovered, Some(0));
        assert_eq!(view.pointer, Some((column, row)));
    }
}
