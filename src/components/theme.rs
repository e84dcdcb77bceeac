use tui::style::{Color, Modifier, Style};

/// Named colours shared by the custom widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    Header,
    Text,
    Dim,
    Selected,
    Win,
    Draw,
    Loss,
}

pub fn style(color: Palette) -> Style {
    match color {
        Palette::Header => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        Palette::Text => Style::default().fg(Color::White),
        Palette::Dim => Style::default().fg(Color::Indexed(240)),
        Palette::Selected => Style::default()
            .fg(Color::Black)
            .bg(Color::Rgb(238, 135, 51))
            .add_modifier(Modifier::BOLD),
        Palette::Win => Style::default().fg(Color::Green),
        Palette::Draw => Style::default().fg(Color::Gray),
        Palette::Loss => Style::default().fg(Color::Red),
    }
}
