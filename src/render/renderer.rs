use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use super::theme::Theme;
use crate::game::{GridWorld, Position};

/// Everything drawn on the training screen
pub struct BatchView<'a> {
    pub worlds: &'a [GridWorld],
    pub high_scores: &'a [u32],
    pub record: u32,
    pub episodes: u64,
    pub epsilon: f64,
    pub states: usize,
}

/// Everything drawn on the demo screen
pub struct DemoView<'a> {
    pub world: &'a GridWorld,
    pub episodes: u64,
    pub best_score: u32,
    pub paused: bool,
    pub speed: &'a str,
}

pub struct Renderer {
    theme: Theme,
}

impl Renderer {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Draw every environment of a training batch in a grid of boards
    pub fn render_batch(&self, frame: &mut Frame, view: &BatchView) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Header
                Constraint::Min(0),    // Boards
                Constraint::Length(1), // Footer
            ])
            .split(frame.area());

        frame.render_widget(self.batch_header(view), chunks[0]);

        let columns = batch_columns(view.worlds.len());
        let rows = view.worlds.len().div_ceil(columns).max(1);
        let row_areas = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Ratio(1, rows as u32); rows])
            .split(chunks[1]);

        for (row, row_area) in row_areas.iter().enumerate() {
            let cells = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Ratio(1, columns as u32); columns])
                .split(*row_area);

            for (col, cell) in cells.iter().enumerate() {
                let idx = row * columns + col;
                let Some(world) = view.worlds.get(idx) else {
                    break;
                };
                let high = view.high_scores.get(idx).copied().unwrap_or(0);
                let title = format!(" {} H:{} ", world.score(), high);
                frame.render_widget(self.board(world, &title), *cell);
            }
        }

        frame.render_widget(self.footer("STOP & SAVE"), chunks[2]);
    }

    /// Draw a single board with score and playback state
    pub fn render_demo(&self, frame: &mut Frame, view: &DemoView) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Board
                Constraint::Length(1), // Footer
            ])
            .split(frame.area());

        frame.render_widget(self.demo_header(view), chunks[0]);
        frame.render_widget(self.board(view.world, " Demo "), chunks[1]);
        frame.render_widget(self.footer("QUIT"), chunks[2]);
    }

    fn board(&self, world: &GridWorld, title: &str) -> Paragraph<'_> {
        Paragraph::new(self.board_lines(world))
            .style(Style::default().bg(self.theme.background))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(self.theme.grid))
                    .title(Span::styled(title.to_string(), self.theme.value_style())),
            )
            .alignment(Alignment::Center)
    }

    /// One line per grid row, two columns per cell
    pub fn board_lines(&self, world: &GridWorld) -> Vec<Line<'static>> {
        let head = world.head();
        let food = world.food();

        (0..world.height() as i32)
            .map(|y| {
                let spans: Vec<Span> = (0..world.width() as i32)
                    .map(|x| {
                        let pos = Position::new(x, y);
                        if pos == head {
                            Span::styled(self.theme.head_glyph, self.theme.head_style())
                        } else if world.snake().contains(pos) {
                            Span::styled(
                                self.theme.body_glyph,
                                Style::default().fg(self.theme.snake_body),
                            )
                        } else if pos == food {
                            Span::styled(
                                self.theme.food_glyph,
                                Style::default()
                                    .fg(self.theme.food)
                                    .add_modifier(Modifier::BOLD),
                            )
                        } else {
                            Span::styled(
                                self.theme.empty_glyph,
                                Style::default().fg(self.theme.grid),
                            )
                        }
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }

    fn batch_header(&self, view: &BatchView) -> Paragraph<'_> {
        let text = Line::from(vec![
            Span::styled("Episodes: ", self.theme.label_style()),
            Span::styled(view.episodes.to_string(), self.theme.value_style()),
            Span::raw("    "),
            Span::styled("Record: ", self.theme.label_style()),
            Span::styled(view.record.to_string(), self.theme.value_style()),
            Span::raw("    "),
            Span::styled("Epsilon: ", self.theme.label_style()),
            Span::styled(format!("{:.2}", view.epsilon), self.theme.value_style()),
            Span::raw("    "),
            Span::styled("States: ", self.theme.label_style()),
            Span::styled(view.states.to_string(), self.theme.value_style()),
        ]);

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn demo_header(&self, view: &DemoView) -> Paragraph<'_> {
        let mut spans = vec![
            Span::styled("SCORE: ", self.theme.label_style()),
            Span::styled(view.world.score().to_string(), self.theme.value_style()),
            Span::raw("    "),
            Span::styled("Best: ", self.theme.label_style()),
            Span::styled(view.best_score.to_string(), self.theme.value_style()),
            Span::raw("    "),
            Span::styled("Episodes: ", self.theme.label_style()),
            Span::styled(view.episodes.to_string(), self.theme.value_style()),
            Span::raw("    "),
            Span::styled("Speed: ", self.theme.label_style()),
            Span::styled(view.speed.to_string(), self.theme.value_style()),
        ];
        if view.paused {
            spans.push(Span::raw("    "));
            spans.push(Span::styled(
                "PAUSED",
                Style::default()
                    .fg(self.theme.stop)
                    .add_modifier(Modifier::BOLD),
            ));
        }

        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::BOTTOM))
    }

    fn footer(&self, stop_label: &str) -> Paragraph<'_> {
        let text = Line::from(vec![
            Span::styled(
                format!("[Q] {stop_label}"),
                Style::default()
                    .fg(self.theme.stop)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" | Space pause | 1-4 speed", Style::default().fg(self.theme.text_dim)),
        ]);

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

/// Boards per row for a batch of `n`, as close to square as possible
fn batch_columns(n: usize) -> usize {
    let mut columns = 1;
    while columns * columns < n {
        columns += 1;
    }
    columns
}
