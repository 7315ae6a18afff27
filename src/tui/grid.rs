use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Paragraph};

use crate::shared::Lane;

const MAX_CELLS: usize = 32;
const LABEL_WIDTH: u16 = 8;
const COUNT_WIDTH: u16 = 7;

// the step that is sounding right now, one behind the next to play
fn current_step(lane: &Lane) -> Option<usize> {
    let pos = lane.position?;
    (lane.steps > 0).then(|| (pos + lane.steps - 1) % lane.steps)
}

// long tracks are shown a page at a time, the page holding the current step
fn visible_window(lane: &Lane) -> (usize, usize) {
    let cells = lane.steps.min(MAX_CELLS);
    let page_start = current_step(lane).map_or(0, |cur| cur / MAX_CELLS * MAX_CELLS);
    (page_start, cells.min(lane.steps - page_start))
}

pub fn draw_lanes(frame: &mut Frame, area: Rect, lanes: &[Lane]) {
    if lanes.is_empty() {
        return;
    }
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(1); lanes.len()])
        .split(area);

    for (lane, row_area) in lanes.iter().zip(rows.iter()) {
        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(LABEL_WIDTH),
                Constraint::Min(1),
                Constraint::Length(COUNT_WIDTH),
            ])
            .split(*row_area);
        frame.render_widget(
            Paragraph::new(lane.label).style(Style::default().fg(Color::Gray)),
            halves[0],
        );
        frame.render_widget(
            Paragraph::new(format!("{:>6}", lane.played)).style(Style::default().fg(Color::DarkGray)),
            halves[2],
        );

        let (start, count) = visible_window(lane);
        if count == 0 {
            continue;
        }
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, count as u32); count])
            .split(halves[1]);
        let current = current_step(lane);

        for (offset, cell_area) in cells.iter().enumerate() {
            let lit = current == Some(start + offset);
            let style = if lit {
                Style::default().bg(Color::Magenta)
            } else {
                Style::default().bg(Color::DarkGray)
            };
            // leave a one-column gap so cells read as separate steps
            let inner = Rect { width: cell_area.width.saturating_sub(1), ..*cell_area };
            frame.render_widget(Block::default().style(style), inner);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lane(steps: usize, position: Option<usize>) -> Lane {
        Lane { label: "melody", steps, position, played: 0 }
    }

    #[test]
    fn test_current_step_trails_position() {
        assert_eq!(current_step(&lane(4, Some(1))), Some(0));
        assert_eq!(current_step(&lane(4, Some(0))), Some(3));
        assert_eq!(current_step(&lane(4, None)), None);
    }

    #[test]
    fn test_long_lanes_page() {
        assert_eq!(visible_window(&lane(8, Some(3))), (0, 8));
        assert_eq!(visible_window(&lane(63, Some(40))), (32, 31));
        assert_eq!(visible_window(&lane(63, Some(5))), (0, 32));
    }
}
