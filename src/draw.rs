use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph, Tabs};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::goals_trend::GoalsTrend;
use crate::components::league_table::LeagueTable;
use crate::components::theme::{Palette, style};
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;
use laliga_api::crest::svg_fallback;
use laliga_api::{FormResult, Match, SeasonSnapshot, TeamStanding};

static TABS: &[&str; 3] = &["Standings", "Matches", "Team"];

const FORM_LENGTH: usize = 5;
const TREND_HEIGHT: u16 = 9;

const HELP_TEXT: &str = "\
Tabs        1 Standings   2 Matches   3 Team   ? help   Esc back
Seasons     [ older   ] newer   R reload from source
Standings   j/k or ↑/↓ move   Enter team detail   / search   Esc clear search
            s next sort column   S flip direction   p hide/show padded rows
Matches     j/k scroll
Team        j/k scroll   Esc back to standings
Global      f full screen   \" log pane   q or Ctrl-C quit";

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        match app.state.active_tab {
            MenuItem::Standings => draw_standings(f, layout.main, app),
            MenuItem::Matches => draw_matches(f, layout.main, app),
            MenuItem::Team => draw_team(f, layout.main, app),
            MenuItem::Help => draw_help(f, layout.main),
        }

        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });
    if let Err(e) = result {
        log::error!("draw failed: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Standings => 0,
        MenuItem::Matches => 1,
        MenuItem::Team => 2,
        MenuItem::Help => 0,
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new(format!("{}  Help: ? ", app.season_label()))
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

/// Shared "nothing to show yet" body: the load error, or a loading note.
fn draw_season_status(f: &mut Frame, area: Rect, app: &App) {
    let season = &app.state.season;
    let (msg, color) = match season.error.as_deref() {
        Some(err) if !season.is_loading() => (
            format!("{err}\n\nPress R to retry, [ or ] to pick another season"),
            Color::Red,
        ),
        _ => (format!("Loading season {}...", app.season_label()), Color::DarkGray),
    };
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(color))
            .alignment(Alignment::Center),
        area,
    );
}

fn draw_standings(f: &mut Frame, area: Rect, app: &App) {
    let title = format!(" LaLiga {} ", app.season_label());
    let block = default_border(Color::White).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(snapshot) = app.snapshot() else {
        draw_season_status(f, inner, app);
        return;
    };

    let [header, table] =
        Layout::vertical([Constraint::Length(2), Constraint::Fill(1)]).areas(inner);

    let view = &app.state.standings;
    let mut status = vec![Span::styled(
        format!("{} ", snapshot_caption(snapshot)),
        Style::default().fg(Color::Gray),
    )];
    if view.searching || !view.search.is_empty() {
        let cursor = if view.searching { "_" } else { "" };
        status.push(Span::styled(
            format!(" search: {}{cursor} ", view.search),
            Style::default().fg(Color::Yellow),
        ));
    }
    if view.hide_placeholders {
        status.push(Span::styled(" padded rows hidden ", style(Palette::Dim)));
    }
    let legend = Line::from(Span::styled(
        "j/k move  Enter detail  / search  s/S sort  p padded rows  [/] season",
        style(Palette::Dim),
    ));
    f.render_widget(Paragraph::new(vec![Line::from(status), legend]), header);

    let rows = app.visible_rows();
    if rows.is_empty() {
        f.render_widget(
            Paragraph::new("No teams match the current filters").style(style(Palette::Dim)),
            table,
        );
        return;
    }
    f.render_widget(
        LeagueTable {
            rows: &rows,
            selected: view.selected,
            sort: view.sort,
            direction: view.direction,
        },
        table,
    );
}

fn snapshot_caption(snapshot: &SeasonSnapshot) -> String {
    let competition = snapshot
        .competition
        .as_ref()
        .and_then(|c| c.name.clone())
        .unwrap_or_else(|| "Primera Division".to_string());
    if snapshot.generated_at.is_empty() {
        competition
    } else {
        format!("{competition} | updated {}", snapshot.generated_at)
    }
}

fn draw_matches(f: &mut Frame, area: Rect, app: &App) {
    let title = format!(" Matches {} ", app.season_label());
    let block = default_border(Color::White).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(snapshot) = app.snapshot() else {
        draw_season_status(f, inner, app);
        return;
    };
    if snapshot.matches.is_empty() {
        f.render_widget(
            Paragraph::new("No fixtures published for this season").style(style(Palette::Dim)),
            inner,
        );
        return;
    }

    let mut matches: Vec<&Match> = snapshot.matches.iter().collect();
    matches.sort_by_key(|m| (m.matchday, m.utc_date));

    let mut lines = Vec::with_capacity(matches.len() + 40);
    let mut current_day = None;
    for m in matches {
        if current_day != Some(m.matchday) {
            if current_day.is_some() {
                lines.push(Line::from(""));
            }
            current_day = Some(m.matchday);
            lines.push(Line::from(Span::styled(
                matchday_title(m.matchday),
                style(Palette::Header),
            )));
        }
        lines.push(Line::from(format_match(m)));
    }

    f.render_widget(
        Paragraph::new(lines).scroll((app.state.matches.scroll_offset, 0)),
        inner,
    );
}

fn matchday_title(matchday: u32) -> String {
    if matchday == 0 {
        "Unscheduled".to_string()
    } else {
        format!("Matchday {matchday}")
    }
}

fn format_match(m: &Match) -> String {
    let date = m
        .utc_date
        .map(|d| d.format("%d %b %H:%M").to_string())
        .unwrap_or_else(|| "TBD".to_string());
    let score = match m.score.full_time.pair() {
        Some((home, away)) => format!("{home} - {away}"),
        None => "  v  ".to_string(),
    };
    format!(
        "{date:<12} {:>24} {score:^7} {:<24} {}",
        m.home_team,
        m.away_team,
        m.status.label()
    )
}

fn draw_team(f: &mut Frame, area: Rect, app: &App) {
    let Some(snapshot) = app.snapshot() else {
        let block = default_border(Color::White).title(" Team ");
        let inner = block.inner(area);
        f.render_widget(block, area);
        draw_season_status(f, inner, app);
        return;
    };
    let Some(team) = app.selected_team() else {
        draw_placeholder(f, area, "Select a team in Standings and press Enter");
        return;
    };

    let block = default_border(Color::White).title(format!(" {} ", team.name));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [summary, trend, fixtures] = Layout::vertical([
        Constraint::Length(6),
        Constraint::Length(TREND_HEIGHT),
        Constraint::Fill(1),
    ])
    .areas(inner);

    f.render_widget(Paragraph::new(team_summary(snapshot, team)), summary);

    let trend_block = default_border(Color::DarkGray).title(" Goals for / against ");
    let trend_inner = trend_block.inner(trend);
    f.render_widget(trend_block, trend);
    let points = snapshot.goals_trend(&team.team_id);
    f.render_widget(GoalsTrend { points: &points }, trend_inner);

    let lines: Vec<Line> = snapshot
        .team_matches(&team.team_id)
        .into_iter()
        .map(|m| {
            let text = format!("{:>3} {}", m.matchday, format_match(m));
            match m.result_for(&team.team_id) {
                Some(result) => Line::from(Span::styled(text, form_style(result))),
                None => Line::from(Span::styled(text, style(Palette::Dim))),
            }
        })
        .collect();
    f.render_widget(
        Paragraph::new(lines).scroll((app.state.team.scroll_offset, 0)),
        fixtures,
    );
}

fn team_summary<'a>(snapshot: &SeasonSnapshot, team: &TeamStanding) -> Vec<Line<'a>> {
    let mut form: Vec<Span> = vec![Span::raw("Form  ")];
    let recent = snapshot.recent_form(&team.team_id, FORM_LENGTH);
    if recent.is_empty() {
        form.push(Span::styled("no results yet", style(Palette::Dim)));
    }
    for result in recent {
        form.push(Span::styled(format!("{} ", result.symbol()), form_style(result)));
    }

    let crest = team.crest.clone().unwrap_or_default();
    let mut crest_line = format!("Crest {crest}");
    if let Some(fallback) = svg_fallback(&crest) {
        crest_line.push_str(&format!("  (svg: {fallback})"));
    }

    let mut lines = vec![
        Line::from(format!(
            "#{}  {} pts  P {}  W {}  D {}  L {}",
            team.position, team.points, team.played, team.wins, team.draws, team.losses
        )),
        Line::from(format!(
            "Goals {}:{}  GD {:+}",
            team.goals_for,
            team.goals_against,
            team.goal_difference()
        )),
        Line::from(form),
        Line::from(Span::styled(crest_line, style(Palette::Dim))),
    ];
    if team.placeholder {
        lines.push(Line::from(Span::styled(
            "No data from the source for this team this season",
            style(Palette::Dim),
        )));
    }
    lines
}

fn form_style(result: FormResult) -> Style {
    match result {
        FormResult::Win => style(Palette::Win),
        FormResult::Draw => style(Palette::Draw),
        FormResult::Loss => style(Palette::Loss),
    }
}

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::DarkGray).title(" Help ");
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(Paragraph::new(HELP_TEXT), inner);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let widget = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Cyan));
    f.render_widget(widget, area);
}

fn draw_placeholder(f: &mut Frame, area: Rect, msg: &str) {
    let block = default_border(Color::DarkGray);
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        inner,
    );
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(22), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}
