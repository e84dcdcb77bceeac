//! Standings normalization: every table handed to the UI is complete and
//! consistently ranked.

use crate::TeamStanding;
use crate::reference::REFERENCE_ROSTER;
use log::debug;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Tables with at least this many rows are treated as real and never padded.
pub const COMPLETE_TABLE_MIN: usize = 18;

/// Padding never grows a table past this size.
pub const MAX_TABLE_SIZE: usize = 20;

/// Guarantee a complete, correctly ranked table. Never fails.
///
/// Complete tables (>= [`COMPLETE_TABLE_MIN`] rows) are sorted by their
/// reported positions and only re-ranked when those positions are not exactly
/// `1..=N`. Shorter tables are padded with placeholder rows from the
/// reference roster (up to [`MAX_TABLE_SIZE`]) and then ranked. A roster club
/// counts as present when a row carries either its roster id or its
/// football-data.org id, so a real "86" row is never joined by a synthetic
/// "rm".
pub fn normalize(table: Vec<TeamStanding>) -> Vec<TeamStanding> {
    if table.len() >= COMPLETE_TABLE_MIN {
        let mut sorted = table;
        sorted.sort_by_key(|row| row.position);
        if !positions_consistent(&sorted) {
            debug!("re-ranking table with inconsistent positions");
            rank(&mut sorted);
        }
        return sorted;
    }

    let mut completed = table;
    let present: HashSet<String> = completed.iter().map(|row| row.team_id.clone()).collect();
    for reference in REFERENCE_ROSTER.iter() {
        if completed.len() >= MAX_TABLE_SIZE {
            break;
        }
        // A real row may carry the provider id rather than the roster id.
        let already_present = present.contains(reference.team_id)
            || reference.provider_id.is_some_and(|id| present.contains(id));
        if !already_present {
            completed.push(TeamStanding::placeholder(reference.team_id, reference.name));
        }
    }
    debug!("padded incomplete table to {} rows", completed.len());
    rank(&mut completed);
    completed
}

/// Sort by points desc, goal difference desc, name asc, then assign
/// positions `1..=N`.
pub fn rank(table: &mut [TeamStanding]) {
    table.sort_by(compare_rows);
    for (idx, row) in table.iter_mut().enumerate() {
        row.position = idx as u32 + 1;
    }
}

fn compare_rows(a: &TeamStanding, b: &TeamStanding) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.computed_goal_difference().cmp(&a.computed_goal_difference()))
        .then_with(|| a.name.cmp(&b.name))
}

/// True when row `i` holds position `i + 1` for every row.
pub fn positions_consistent(table: &[TeamStanding]) -> bool {
    table
        .iter()
        .enumerate()
        .all(|(idx, row)| row.position as usize == idx + 1)
}
