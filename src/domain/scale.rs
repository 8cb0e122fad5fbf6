use crate::domain::CommitSummary;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Duration, OffsetDateTime, Time};

/// Virtual pixel frame of the scatter plot. The terminal maps into this
/// space at the UI boundary, so plotted positions, brush rectangles, and
/// radii all share one coordinate system. Y grows downward, as on a screen.
pub const PLOT_WIDTH: f64 = 1000.0;
pub const PLOT_HEIGHT: f64 = 600.0;

pub const MARGIN_TOP: f64 = 10.0;
pub const MARGIN_RIGHT: f64 = 10.0;
pub const MARGIN_BOTTOM: f64 = 40.0;
pub const MARGIN_LEFT: f64 = 50.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlotFrame {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl PlotFrame {
    pub fn new() -> Self {
        Self {
            left: MARGIN_LEFT,
            right: PLOT_WIDTH - MARGIN_RIGHT,
            top: MARGIN_TOP,
            bottom: PLOT_HEIGHT - MARGIN_BOTTOM,
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }

    /// Clamps a point into the usable band, so drags that wander into the
    /// margins pin the brush to the band's edge.
    pub fn clamp(&self, point: (f64, f64)) -> (f64, f64) {
        (
            point.0.clamp(self.left, self.right),
            point.1.clamp(self.top, self.bottom),
        )
    }
}

impl Default for PlotFrame {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps a timestamp domain, niced to whole days, onto a horizontal band.
#[derive(Clone, Debug)]
pub struct TimeScale {
    start: OffsetDateTime,
    end: OffsetDateTime,
    r0: f64,
    r1: f64,
}

impl TimeScale {
    pub fn new(extent: (OffsetDateTime, OffsetDateTime), range: (f64, f64)) -> Self {
        let start = floor_to_day(extent.0);
        let mut end = ceil_to_day(extent.1);
        if end <= start {
            end = start + Duration::days(1);
        }
        Self {
            start,
            end,
            r0: range.0,
            r1: range.1,
        }
    }

    pub fn position(&self, value: OffsetDateTime) -> f64 {
        let span = (self.end - self.start).as_seconds_f64();
        let offset = (value - self.start).as_seconds_f64();
        self.r0 + offset / span * (self.r1 - self.r0)
    }

    /// Tick timestamps every `step` days across the niced domain, inclusive.
    pub fn day_ticks(&self, step: i64) -> Vec<OffsetDateTime> {
        let mut ticks = Vec::new();
        let mut tick = self.start;
        while tick <= self.end {
            ticks.push(tick);
            tick += Duration::days(step.max(1));
        }
        ticks
    }

    pub fn domain(&self) -> (OffsetDateTime, OffsetDateTime) {
        (self.start, self.end)
    }
}

fn floor_to_day(value: OffsetDateTime) -> OffsetDateTime {
    value.replace_time(Time::MIDNIGHT)
}

fn ceil_to_day(value: OffsetDateTime) -> OffsetDateTime {
    let floored = floor_to_day(value);
    if floored == value {
        value
    } else {
        floored + Duration::days(1)
    }
}

const DAY_LABEL: &[BorrowedFormatItem<'_>] = format_description!("[month repr:short] [day]");

/// "Mon DD" tick label, e.g. "May 14".
pub fn day_label(tick: OffsetDateTime) -> String {
    tick.format(DAY_LABEL).unwrap_or_default()
}

pub const HOUR_TICKS: [u8; 5] = [0, 6, 12, 18, 24];

/// Zero-padded "HH:00" tick label.
pub fn hour_label(hour: u8) -> String {
    format!("{hour:02}:00")
}

#[derive(Clone, Copy, Debug)]
pub struct LinearScale {
    d0: f64,
    d1: f64,
    r0: f64,
    r1: f64,
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            d0: domain.0,
            d1: domain.1,
            r0: range.0,
            r1: range.1,
        }
    }

    pub fn position(&self, value: f64) -> f64 {
        if self.d1 == self.d0 {
            return (self.r0 + self.r1) / 2.0;
        }
        self.r0 + (value - self.d0) / (self.d1 - self.d0) * (self.r1 - self.r0)
    }
}

/// Square-root scale for circle radii. A zero min or max in the domain is
/// replaced by 1 so a degenerate domain still yields a usable radius.
#[derive(Clone, Copy, Debug)]
pub struct SqrtScale {
    d0: f64,
    d1: f64,
    r0: f64,
    r1: f64,
}

impl SqrtScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        let d0 = if domain.0 == 0.0 { 1.0 } else { domain.0 };
        let d1 = if domain.1 == 0.0 { 1.0 } else { domain.1 };
        Self {
            d0: d0.sqrt(),
            d1: d1.sqrt(),
            r0: range.0,
            r1: range.1,
        }
    }

    pub fn position(&self, value: f64) -> f64 {
        if self.d1 == self.d0 {
            return (self.r0 + self.r1) / 2.0;
        }
        self.r0 + (value.sqrt() - self.d0) / (self.d1 - self.d0) * (self.r1 - self.r0)
    }
}

pub const RADIUS_RANGE: (f64, f64) = (3.0, 18.0);

/// The three scatter scales plus the frame, built from the full commit set.
/// Returns `None` for an empty set; nothing is plotted and no domain math
/// runs in that case.
#[derive(Clone, Debug)]
pub struct ScatterGeometry {
    pub frame: PlotFrame,
    pub x: TimeScale,
    pub y: LinearScale,
    pub r: SqrtScale,
}

impl ScatterGeometry {
    pub fn new(commits: &[CommitSummary]) -> Option<Self> {
        let first = commits.first()?;
        let mut min_dt = first.datetime;
        let mut max_dt = first.datetime;
        let mut min_lines = first.total_lines;
        let mut max_lines = first.total_lines;
        for commit in commits {
            min_dt = min_dt.min(commit.datetime);
            max_dt = max_dt.max(commit.datetime);
            min_lines = min_lines.min(commit.total_lines);
            max_lines = max_lines.max(commit.total_lines);
        }

        let frame = PlotFrame::new();
        Some(Self {
            x: TimeScale::new((min_dt, max_dt), (frame.left, frame.right)),
            // Hour 0 sits at the bottom of the band, hour 24 at the top.
            y: LinearScale::new((0.0, 24.0), (frame.bottom, frame.top)),
            r: SqrtScale::new((min_lines as f64, max_lines as f64), RADIUS_RANGE),
            frame,
        })
    }

    /// Plotted position of one commit in frame pixels.
    pub fn position(&self, commit: &CommitSummary) -> (f64, f64) {
        (
            self.x.position(commit.datetime),
            self.y.position(commit.hour_frac),
        )
    }

    pub fn radius(&self, commit: &CommitSummary) -> f64 {
        self.r.position(commit.total_lines as f64)
    }
}

/// Indices in descending total-lines order, so large circles draw first and
/// small ones stay on top for hovering.
pub fn descending_size_order(commits: &[CommitSummary]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..commits.len()).collect();
    order.sort_by(|&a, &b| commits[b].total_lines.cmp(&commits[a].total_lines));
    order
}
