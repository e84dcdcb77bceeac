use crate::app::{App, MenuItem};
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;

    // Search input swallows everything except Ctrl-C.
    if guard.state.standings.searching {
        match (key_event.code, key_event.modifiers) {
            (Char('c'), KeyModifiers::CONTROL) => {
                crate::cleanup_terminal();
                std::process::exit(0);
            }
            (Char(c), _) => guard.state.standings.push_search(c),
            (KeyCode::Backspace, _) => guard.state.standings.pop_search(),
            (KeyCode::Enter, _) => guard.state.standings.end_search(),
            (KeyCode::Esc, _) => guard.state.standings.clear_search(),
            _ => {}
        }
        return;
    }

    let mut request = None;

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Tab switching
        (_, Char('1'), _) => guard.update_tab(MenuItem::Standings),
        (_, Char('2'), _) => guard.update_tab(MenuItem::Matches),
        (_, Char('3'), _) => guard.update_tab(MenuItem::Team),
        (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),

        // Season selection
        (_, Char('['), _) => {
            request = guard
                .older_season()
                .map(|label| NetworkRequest::LoadSeason { label });
        }
        (_, Char(']'), _) => {
            request = guard
                .newer_season()
                .map(|label| NetworkRequest::LoadSeason { label });
        }
        (_, Char('R'), _) => {
            let label = guard.reload_season();
            request = Some(NetworkRequest::ReloadSeason { label });
        }

        // Standings table
        (MenuItem::Standings, Char('/'), _) => guard.state.standings.start_search(),
        (MenuItem::Standings, KeyCode::Esc, _) => guard.state.standings.clear_search(),
        (MenuItem::Standings, Char('p'), _) => guard.state.standings.toggle_placeholders(),
        (MenuItem::Standings, Char('s'), _) => guard.state.standings.cycle_sort(),
        (MenuItem::Standings, Char('S'), _) => guard.state.standings.flip_direction(),
        (MenuItem::Standings, Char('j') | KeyCode::Down, _) => guard.select_next_row(),
        (MenuItem::Standings, Char('k') | KeyCode::Up, _) => guard.select_prev_row(),
        (MenuItem::Standings, KeyCode::Enter, _) => guard.open_selected_team(),

        // Matches list
        (MenuItem::Matches, Char('j') | KeyCode::Down, _) => {
            guard.state.matches.scroll_offset = guard.state.matches.scroll_offset.saturating_add(1);
        }
        (MenuItem::Matches, Char('k') | KeyCode::Up, _) => {
            guard.state.matches.scroll_offset = guard.state.matches.scroll_offset.saturating_sub(1);
        }

        // Team detail
        (MenuItem::Team, Char('j') | KeyCode::Down, _) => {
            guard.state.team.scroll_offset = guard.state.team.scroll_offset.saturating_add(1);
        }
        (MenuItem::Team, Char('k') | KeyCode::Up, _) => {
            guard.state.team.scroll_offset = guard.state.team.scroll_offset.saturating_sub(1);
        }
        (MenuItem::Team, KeyCode::Esc, _) => guard.update_tab(MenuItem::Standings),

        // Global
        (_, Char('f'), _) => guard.toggle_full_screen(),
        (_, Char('"'), _) => guard.toggle_show_logs(),

        _ => {}
    }

    drop(guard);
    if let Some(request) = request {
        let _ = network_requests.send(request).await;
    }
}
