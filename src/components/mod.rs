pub mod goals_trend;
pub mod league_table;
pub mod theme;
