use crate::state::app_settings::AppSettings;
use crate::state::app_state::AppState;
use laliga_api::{SeasonSnapshot, TeamStanding};
use std::sync::Arc;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum MenuItem {
    #[default]
    Standings,
    Matches,
    Team,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        let app = Self {
            state: AppState::new(&settings.initial_season),
            settings,
        };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    pub fn season_label(&self) -> &'static str {
        self.state.season.label()
    }

    pub fn snapshot(&self) -> Option<&SeasonSnapshot> {
        self.state.season.snapshot.as_deref()
    }

    // -----------------------------------------------------------------------
    // Network responses, applied from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_season_loaded(&mut self, label: &str, snapshot: Arc<SeasonSnapshot>) {
        if self.state.season.accept(label, snapshot) {
            let visible = self.visible_row_count();
            self.state.standings.clamp_selection(visible);
        }
    }

    pub fn on_load_error(&mut self, label: &str, message: String) {
        self.state.season.fail(label, message);
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    // -----------------------------------------------------------------------
    // Season selection: returns the label to load when it changed
    // -----------------------------------------------------------------------

    pub fn older_season(&mut self) -> Option<String> {
        let label = self.state.season.older()?;
        self.on_season_changed();
        Some(label.to_string())
    }

    pub fn newer_season(&mut self) -> Option<String> {
        let label = self.state.season.newer()?;
        self.on_season_changed();
        Some(label.to_string())
    }

    /// Clear the current data so the view shows loading until the reload lands.
    pub fn reload_season(&mut self) -> String {
        self.state.season.snapshot = None;
        self.state.season.error = None;
        self.season_label().to_string()
    }

    fn on_season_changed(&mut self) {
        self.state.standings.selected = 0;
        self.state.matches.scroll_offset = 0;
        self.state.team.scroll_offset = 0;
    }

    // -----------------------------------------------------------------------
    // Standings table
    // -----------------------------------------------------------------------

    pub fn visible_rows(&self) -> Vec<&TeamStanding> {
        match self.snapshot() {
            Some(snapshot) => self.state.standings.visible_rows(&snapshot.table),
            None => Vec::new(),
        }
    }

    fn visible_row_count(&self) -> usize {
        self.visible_rows().len()
    }

    pub fn select_next_row(&mut self) {
        let visible = self.visible_row_count();
        self.state.standings.select_next(visible);
    }

    pub fn select_prev_row(&mut self) {
        self.state.standings.select_prev();
    }

    /// Open the team detail tab for the highlighted row.
    pub fn open_selected_team(&mut self) {
        let Some(team_id) = self
            .snapshot()
            .and_then(|s| self.state.standings.selected_row(&s.table))
            .map(|row| row.team_id.clone())
        else {
            return;
        };
        if self.state.team.team_id.as_deref() != Some(team_id.as_str()) {
            self.state.team.scroll_offset = 0;
        }
        self.state.team.team_id = Some(team_id);
        self.update_tab(MenuItem::Team);
    }

    pub fn selected_team(&self) -> Option<&TeamStanding> {
        let team_id = self.state.team.team_id.as_deref()?;
        self.snapshot()?.team(team_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App {
            settings: AppSettings::default(),
            state: AppState::new("2024-2025"),
        }
    }

    fn snapshot(season: &str) -> Arc<SeasonSnapshot> {
        let table = ["81", "86", "78"]
            .iter()
            .enumerate()
            .map(|(i, id)| TeamStanding {
                team_id: id.to_string(),
                name: format!("Team {id}"),
                position: i as u32 + 1,
                ..Default::default()
            })
            .collect();
        Arc::new(SeasonSnapshot { season: season.into(), table, ..Default::default() })
    }

    #[test]
    fn enter_opens_the_highlighted_team() {
        let mut app = app();
        app.on_season_loaded("2024-2025", snapshot("2024-2025"));
        app.select_next_row();
        app.open_selected_team();
        assert_eq!(app.state.active_tab, MenuItem::Team);
        assert_eq!(app.selected_team().map(|t| t.team_id.as_str()), Some("86"));
    }

    #[test]
    fn season_change_drops_data_until_loaded() {
        let mut app = app();
        app.on_season_loaded("2024-2025", snapshot("2024-2025"));
        app.select_next_row();
        assert_eq!(app.older_season().as_deref(), Some("2023-2024"));
        assert!(app.snapshot().is_none());
        assert_eq!(app.state.standings.selected, 0);

        // A late answer for the season we left is dropped.
        app.on_season_loaded("2024-2025", snapshot("2024-2025"));
        assert!(app.snapshot().is_none());
        app.on_load_error("2023-2024", "offline".into());
        assert_eq!(app.state.season.error.as_deref(), Some("offline"));
    }

    #[test]
    fn help_returns_to_previous_tab() {
        let mut app = app();
        app.update_tab(MenuItem::Matches);
        app.update_tab(MenuItem::Help);
        app.exit_help();
        assert_eq!(app.state.active_tab, MenuItem::Matches);
    }
}
