use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use laliga_api::SeasonSnapshot;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    LoadSeason { label: String },
    /// Drop the memoized load first, then load again.
    ReloadSeason { label: String },
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    SeasonLoaded { label: String, snapshot: Arc<SeasonSnapshot> },
    Error { label: String, message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
}
