use crate::app::MenuItem;
use laliga_api::{CURRENT_SEASON, SEASONS, SeasonSnapshot, TeamStanding};
use std::cmp::Ordering;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Season selection + loaded data
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct SeasonState {
    /// Index into `SEASONS` (newest first).
    pub index: usize,
    pub snapshot: Option<Arc<SeasonSnapshot>>,
    pub error: Option<String>,
}

impl Default for SeasonState {
    fn default() -> Self {
        Self::starting_at(CURRENT_SEASON)
    }
}

impl SeasonState {
    /// Unknown labels fall back to the current season.
    pub fn starting_at(label: &str) -> Self {
        let index = SEASONS
            .iter()
            .position(|s| *s == label)
            .or_else(|| SEASONS.iter().position(|s| *s == CURRENT_SEASON))
            .unwrap_or(0);
        Self { index, snapshot: None, error: None }
    }

    pub fn label(&self) -> &'static str {
        SEASONS[self.index.min(SEASONS.len() - 1)]
    }

    /// Step towards older seasons. Returns the new label when it changed.
    pub fn older(&mut self) -> Option<&'static str> {
        if self.index + 1 >= SEASONS.len() {
            return None;
        }
        self.index += 1;
        self.reset();
        Some(self.label())
    }

    pub fn newer(&mut self) -> Option<&'static str> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        self.reset();
        Some(self.label())
    }

    fn reset(&mut self) {
        self.snapshot = None;
        self.error = None;
    }

    /// Only the response for the season on screen is kept.
    pub fn accept(&mut self, label: &str, snapshot: Arc<SeasonSnapshot>) -> bool {
        if label != self.label() {
            return false;
        }
        self.snapshot = Some(snapshot);
        self.error = None;
        true
    }

    pub fn fail(&mut self, label: &str, message: String) -> bool {
        if label != self.label() {
            return false;
        }
        self.error = Some(message);
        true
    }

    pub fn is_loading(&self) -> bool {
        self.snapshot.is_none() && self.error.is_none()
    }
}

// ---------------------------------------------------------------------------
// Standings table view: search, placeholder filter, sort, selection
// ---------------------------------------------------------------------------

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum SortColumn {
    #[default]
    Position,
    Team,
    Played,
    Wins,
    Draws,
    Losses,
    GoalsFor,
    GoalsAgainst,
    GoalDifference,
    Points,
}

impl SortColumn {
    pub const ALL: [SortColumn; 10] = [
        SortColumn::Position,
        SortColumn::Team,
        SortColumn::Played,
        SortColumn::Wins,
        SortColumn::Draws,
        SortColumn::Losses,
        SortColumn::GoalsFor,
        SortColumn::GoalsAgainst,
        SortColumn::GoalDifference,
        SortColumn::Points,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            SortColumn::Position => "#",
            SortColumn::Team => "Team",
            SortColumn::Played => "P",
            SortColumn::Wins => "W",
            SortColumn::Draws => "D",
            SortColumn::Losses => "L",
            SortColumn::GoalsFor => "GF",
            SortColumn::GoalsAgainst => "GA",
            SortColumn::GoalDifference => "GD",
            SortColumn::Points => "Pts",
        }
    }

    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|c| c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    fn compare(&self, a: &TeamStanding, b: &TeamStanding) -> Ordering {
        match self {
            SortColumn::Position => a.position.cmp(&b.position),
            SortColumn::Team => a.name.cmp(&b.name),
            SortColumn::Played => a.played.cmp(&b.played),
            SortColumn::Wins => a.wins.cmp(&b.wins),
            SortColumn::Draws => a.draws.cmp(&b.draws),
            SortColumn::Losses => a.losses.cmp(&b.losses),
            SortColumn::GoalsFor => a.goals_for.cmp(&b.goals_for),
            SortColumn::GoalsAgainst => a.goals_against.cmp(&b.goals_against),
            SortColumn::GoalDifference => a.goal_difference().cmp(&b.goal_difference()),
            SortColumn::Points => a.points.cmp(&b.points),
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flip(&self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn indicator(&self) -> char {
        match self {
            SortDirection::Ascending => '▲',
            SortDirection::Descending => '▼',
        }
    }
}

#[derive(Debug, Default)]
pub struct StandingsView {
    pub search: String,
    pub searching: bool,
    pub hide_placeholders: bool,
    pub sort: SortColumn,
    pub direction: SortDirection,
    pub selected: usize,
}

impl StandingsView {
    /// Rows after search and placeholder filtering, in display order. The
    /// sort is stable, so ties keep table order.
    pub fn visible_rows<'a>(&self, table: &'a [TeamStanding]) -> Vec<&'a TeamStanding> {
        let needle = self.search.to_lowercase();
        let mut rows: Vec<&TeamStanding> = table
            .iter()
            .filter(|row| needle.is_empty() || row.name.to_lowercase().contains(&needle))
            .filter(|row| !(self.hide_placeholders && row.placeholder))
            .collect();
        rows.sort_by(|a, b| {
            let ord = self.sort.compare(a, b);
            match self.direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });
        rows
    }

    pub fn selected_row<'a>(&self, table: &'a [TeamStanding]) -> Option<&'a TeamStanding> {
        self.visible_rows(table).get(self.selected).copied()
    }

    /// Choosing the active column again flips direction; a new column starts
    /// ascending.
    pub fn sort_by(&mut self, column: SortColumn) {
        if self.sort == column {
            self.direction = self.direction.flip();
        } else {
            self.sort = column;
            self.direction = SortDirection::Ascending;
        }
    }

    pub fn cycle_sort(&mut self) {
        self.sort_by(self.sort.next());
    }

    pub fn flip_direction(&mut self) {
        self.sort_by(self.sort);
    }

    pub fn toggle_placeholders(&mut self) {
        self.hide_placeholders = !self.hide_placeholders;
        self.selected = 0;
    }

    pub fn select_next(&mut self, visible: usize) {
        if self.selected + 1 < visible {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn clamp_selection(&mut self, visible: usize) {
        self.selected = self.selected.min(visible.saturating_sub(1));
    }

    pub fn start_search(&mut self) {
        self.searching = true;
    }

    pub fn push_search(&mut self, c: char) {
        self.search.push(c);
        self.selected = 0;
    }

    pub fn pop_search(&mut self) {
        self.search.pop();
        self.selected = 0;
    }

    pub fn end_search(&mut self) {
        self.searching = false;
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
        self.searching = false;
        self.selected = 0;
    }
}

// ---------------------------------------------------------------------------
// Matches + team detail
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MatchesState {
    pub scroll_offset: u16,
}

#[derive(Debug, Default)]
pub struct TeamDetailState {
    pub team_id: Option<String>,
    pub scroll_offset: u16,
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub season: SeasonState,
    pub standings: StandingsView,
    pub matches: MatchesState,
    pub team: TeamDetailState,
}

impl AppState {
    pub fn new(initial_season: &str) -> Self {
        Self {
            season: SeasonState::starting_at(initial_season),
            ..Self::default()
        }
    }
}
