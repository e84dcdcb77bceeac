use laliga_api::GoalsTrendPoint;
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::widgets::Widget;

use crate::components::theme::{Palette, style};

/// Goals scored (bars above the axis) and conceded (below) per matchday.
pub struct GoalsTrend<'a> {
    pub points: &'a [GoalsTrendPoint],
}

impl Widget for GoalsTrend<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 3 || area.width == 0 {
            return;
        }
        if self.points.is_empty() {
            buf.set_string(area.x, area.y, "No played matches yet", style(Palette::Dim));
            return;
        }

        let half = (area.height - 1) / 2;
        let axis_y = area.y + half;
        let max = self
            .points
            .iter()
            .map(|p| p.goals_for.max(p.goals_against))
            .max()
            .unwrap_or(0)
            .max(1);

        for x in area.x..area.x + area.width {
            buf.set_string(x, axis_y, "─", style(Palette::Dim));
        }

        // Most recent matchdays when the area is narrower than the season.
        let skip = self.points.len().saturating_sub(area.width as usize);
        for (i, point) in self.points.iter().skip(skip).enumerate() {
            let x = area.x + i as u16;
            let up = bar_height(point.goals_for, max, half);
            for dy in 1..=up {
                buf.set_string(x, axis_y - dy, "█", style(Palette::Win));
            }
            let down = bar_height(point.goals_against, max, half);
            for dy in 1..=down {
                if axis_y + dy < area.y + area.height {
                    buf.set_string(x, axis_y + dy, "█", style(Palette::Loss));
                }
            }
        }
    }
}

/// Scaled bar length, at least one cell for any non-zero value.
fn bar_height(goals: u32, max: u32, rows: u16) -> u16 {
    if goals == 0 || rows == 0 {
        return 0;
    }
    let scaled = (goals as u64 * rows as u64).div_ceil(max as u64) as u16;
    scaled.clamp(1, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bars_scale_to_available_rows() {
        assert_eq!(bar_height(0, 4, 5), 0);
        assert_eq!(bar_height(4, 4, 5), 5);
        assert_eq!(bar_height(1, 4, 5), 2);
        assert_eq!(bar_height(1, 10, 3), 1);
    }

    #[test]
    fn scored_above_conceded_below() {
        let points = [
            GoalsTrendPoint { matchday: 1, goals_for: 2, goals_against: 0 },
            GoalsTrendPoint { matchday: 2, goals_for: 0, goals_against: 2 },
        ];
        let area = Rect::new(0, 0, 4, 7);
        let mut buf = Buffer::empty(area);
        GoalsTrend { points: &points }.render(area, &mut buf);

        // Axis on row 3.
        assert_eq!(buf[(0, 3)].symbol(), "─");
        assert_eq!(buf[(0, 2)].symbol(), "█");
        assert_eq!(buf[(0, 4)].symbol(), " ");
        assert_eq!(buf[(1, 2)].symbol(), " ");
        assert_eq!(buf[(1, 4)].symbol(), "█");
    }
}
