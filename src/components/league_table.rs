use laliga_api::TeamStanding;
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::widgets::Widget;

use crate::components::theme::{Palette, style};
use crate::state::app_state::{SortColumn, SortDirection};

/// Width of every numeric column, including its leading space.
const NUM_W: u16 = 5;
const FORM_W: u16 = 7;
/// Everything except the team name.
const FIXED_W: u16 = NUM_W * 9 + FORM_W;

/// The standings grid. Rows arrive already filtered and sorted.
pub struct LeagueTable<'a> {
    pub rows: &'a [&'a TeamStanding],
    pub selected: usize,
    pub sort: SortColumn,
    pub direction: SortDirection,
}

impl LeagueTable<'_> {
    /// First row index to draw so the selection stays on screen.
    fn offset(&self, body_height: usize) -> usize {
        if body_height == 0 {
            return 0;
        }
        (self.selected + 1).saturating_sub(body_height)
    }

    fn header_label(&self, column: SortColumn) -> String {
        if column == self.sort {
            format!("{}{}", column.header(), self.direction.indicator())
        } else {
            column.header().to_string()
        }
    }
}

impl Widget for LeagueTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 2 || area.width < FIXED_W / 2 {
            return;
        }
        let name_w = area.width.saturating_sub(FIXED_W).max(8);

        let header: Vec<String> = SortColumn::ALL.iter().map(|c| self.header_label(*c)).collect();
        let mut cells: Vec<String> = header;
        cells.push("Form".to_string());
        draw_row(&cells, area.x, area.y, area.width, name_w, style(Palette::Header), buf);

        let body_height = (area.height - 1) as usize;
        let offset = self.offset(body_height);
        for (i, row) in self.rows.iter().enumerate().skip(offset).take(body_height) {
            let y = area.y + 1 + (i - offset) as u16;
            let row_style = if i == self.selected {
                style(Palette::Selected)
            } else if row.placeholder {
                style(Palette::Dim)
            } else {
                style(Palette::Text)
            };
            draw_row(&row_cells(row), area.x, y, area.width, name_w, row_style, buf);
        }
    }
}

fn row_cells(row: &TeamStanding) -> Vec<String> {
    vec![
        row.position.to_string(),
        row.name.clone(),
        row.played.to_string(),
        row.wins.to_string(),
        row.draws.to_string(),
        row.losses.to_string(),
        row.goals_for.to_string(),
        row.goals_against.to_string(),
        format!("{:+}", row.goal_difference()),
        row.points.to_string(),
        row.form.clone().unwrap_or_default().replace(',', ""),
    ]
}

fn draw_row(
    cells: &[String],
    x: u16,
    y: u16,
    width: u16,
    name_w: u16,
    row_style: tui::style::Style,
    buf: &mut Buffer,
) {
    let right = x + width;
    // Paint the full width so the selection bar is continuous.
    buf.set_string(x, y, " ".repeat(width as usize), row_style);

    let mut cx = x;
    for (idx, text) in cells.iter().enumerate() {
        if cx >= right {
            break;
        }
        let (w, left_align) = match idx {
            1 => (name_w, true),
            10 => (FORM_W, true),
            _ => (NUM_W, false),
        };
        let w = w.min(right - cx);
        let clipped = clip(text, w.saturating_sub(1) as usize);
        let text_w = clipped.chars().count() as u16;
        let tx = if left_align {
            cx + 1
        } else {
            cx + w.saturating_sub(text_w)
        };
        buf.set_string(tx, y, &clipped, row_style);
        cx += w;
    }
}

fn clip(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
