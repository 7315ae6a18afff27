use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Gauge, Paragraph, Wrap};

use super::grid;
use super::mode::TuiState;
use crate::shared::{AudioStatus, DisplayState};

const HELP: &str = "1-6 moods  0 neutral  l tape  s stop  a ambient  [ ] volume  m mute  \
                    b boot  c click  h hover  k key  f flip  i insert  e eject  p power  \
                    d delete  y success  x error  g busy  n static  ? help  Esc quit";

pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState, ts: &TuiState, blink_on: bool) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // lcd screen
            Constraint::Length(3), // ambient volume
            Constraint::Min(7),    // sequencer lanes
            Constraint::Length(if ts.show_help { 4 } else { 1 }),
        ])
        .split(area);

    draw_screen(frame, sections[0], state, blink_on);
    draw_volume(frame, sections[1], state);
    draw_lanes(frame, sections[2], state);
    draw_footer(frame, sections[3], ts);
}

fn status_color(status: &AudioStatus) -> Color {
    match status {
        AudioStatus::Running => Color::Green,
        AudioStatus::Suspended => Color::Yellow,
        AudioStatus::NotStarted => Color::Gray,
        AudioStatus::Unavailable => Color::Red,
    }
}

fn draw_screen(frame: &mut Frame, area: Rect, state: &DisplayState, blink_on: bool) {
    let tape = match (state.looping, state.mood) {
        (true, Some(mood)) => mood.label().to_uppercase(),
        _ => String::from("--"),
    };
    // the record light blinks while a tape is rolling
    let reel = if state.looping && blink_on { "●" } else { "○" };

    let top = Line::from(vec![
        Span::styled(format!("{reel} TAPE {tape}"), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("   "),
        Span::styled(state.status.label(), Style::default().fg(status_color(&state.status))),
        Span::raw(if state.muted { "   MUTE" } else { "" }),
        Span::raw(if state.ambient { "   AMBIENT" } else { "" }),
    ]);
    let bottom = Line::from(vec![
        Span::styled(state.display_text.clone(), Style::default().fg(Color::Cyan)),
        Span::raw(format!(
            "   timers {}  nodes {}",
            state.pending_timers, state.live_nodes
        )),
    ]);

    let screen = Paragraph::new(vec![top, bottom]).block(Block::bordered().title(" tapedeck "));
    frame.render_widget(screen, area);
}

fn draw_volume(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let gauge = Gauge::default()
        .block(Block::bordered().title(" ambient "))
        .gauge_style(Style::default().fg(Color::Magenta))
        .ratio(state.ambient_volume.clamp(0.0, 1.0) as f64);
    frame.render_widget(gauge, area);
}

fn draw_lanes(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let block = Block::bordered().title(" tracks ");
    let inner = block.inner(area);
    frame.render_widget(block, area);
    grid::draw_lanes(frame, inner, &state.lanes);
}

fn draw_footer(frame: &mut Frame, area: Rect, ts: &TuiState) {
    let text = if ts.show_help { HELP } else { "? help  Esc quit" };
    let footer = Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, area);
}
