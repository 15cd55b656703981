use crate::models::BlockKind;
use crate::timer::{BlockTimer, Phase};
use crate::utils::{format_clock, format_duration};
use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph},
    Frame, Terminal,
};
use std::io;
use std::time::Duration as StdDuration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    TogglePause,
    Skip,
    Advance,
    Reset,
    EndSession,
    Quit,
}

pub fn action_for_key(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Char('s') => Some(Action::Start),
        KeyCode::Char('p') | KeyCode::Char(' ') => Some(Action::TogglePause),
        KeyCode::Char('n') => Some(Action::Skip),
        KeyCode::Char('a') | KeyCode::Enter => Some(Action::Advance),
        KeyCode::Char('r') => Some(Action::Reset),
        KeyCode::Char('e') => Some(Action::EndSession),
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        _ => None,
    }
}

/// Applies one user action. Returns `false` when the TUI should exit.
pub fn apply_action(timer: &mut BlockTimer, action: Action, now: DateTime<Utc>) -> bool {
    match action {
        Action::Start => {
            timer.start(now);
        }
        Action::TogglePause => {
            if timer.phase() == Phase::Paused {
                timer.resume(now);
            } else {
                timer.pause(now);
            }
        }
        Action::Skip => {
            timer.skip();
        }
        Action::Advance => {
            timer.advance();
        }
        Action::Reset => {
            timer.reset();
        }
        Action::EndSession => timer.end_session(),
        Action::Quit => return false,
    }
    true
}

pub fn run_tui(timer: &mut BlockTimer, refresh: StdDuration) -> Result<()> {
    // setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_loop(&mut terminal, timer, refresh);

    // restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    res
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    timer: &mut BlockTimer,
    refresh: StdDuration,
) -> Result<()> {
    loop {
        // Expiry is only noticed here, once per refresh
        timer.tick(Utc::now());
        terminal.draw(|f| draw(f, timer))?;

        if event::poll(refresh)? {
            if let Event::Key(key) = event::read()? {
                if let Some(action) = action_for_key(key.code) {
                    if !apply_action(timer, action, Utc::now()) {
                        return Ok(());
                    }
                }
            }
        }
    }
}

pub fn draw(frame: &mut Frame, timer: &BlockTimer) {
    let now = Utc::now();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Body
            Constraint::Length(3), // Footer
        ])
        .split(frame.size());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    draw_header(frame, chunks[0], timer);
    draw_countdown(frame, body[0], timer, now);
    draw_schedule(frame, body[1], timer);
    draw_footer(frame, chunks[2]);
}

fn phase_span(phase: Phase) -> Span<'static> {
    let (text, color) = match phase {
        Phase::Idle => ("READY", Color::Cyan),
        Phase::Running => ("RUNNING", Color::Green),
        Phase::Paused => ("PAUSED", Color::Yellow),
        Phase::Expired => ("TIME'S UP", Color::Magenta),
        Phase::Complete => ("PLAN COMPLETE", Color::Blue),
    };
    Span::styled(text, Style::default().fg(color).add_modifier(Modifier::BOLD))
}

fn block_color(kind: BlockKind) -> Color {
    match kind {
        BlockKind::Work => Color::Green,
        BlockKind::Break => Color::Yellow,
    }
}

fn draw_header(frame: &mut Frame, area: Rect, timer: &BlockTimer) {
    let plan = timer.plan();
    let spans = vec![
        Span::styled(
            " Studyflow ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        phase_span(timer.phase()),
        Span::raw(" | "),
        Span::raw(Local::now().format("%H:%M:%S").to_string()),
        Span::raw(" | Plan: "),
        Span::styled(
            format_duration(plan.actual_total_seconds as i64),
            Style::default().fg(Color::Magenta),
        ),
        Span::raw(format!(
            " | Next session in {:.1}h",
            plan.next_session_delay_hours
        )),
    ];

    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn draw_countdown(frame: &mut Frame, area: Rect, timer: &BlockTimer, now: DateTime<Utc>) {
    let outer = Block::default()
        .title(" CURRENT BLOCK ")
        .borders(Borders::ALL);
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(inner);

    let (title, color) = match timer.current_block() {
        Some(block) => (
            format!(
                "{} {} of {}",
                block.kind.label(),
                block.sequence_index + 1,
                timer.plan().len()
            ),
            block_color(block.kind),
        ),
        None => ("All blocks done".to_string(), Color::Blue),
    };
    frame.render_widget(
        Paragraph::new(Span::styled(
            title,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        rows[0],
    );

    frame.render_widget(
        Paragraph::new(Span::styled(
            format_clock(timer.remaining_seconds(now)),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        rows[1],
    );

    let block_ratio = timer.block_progress(now).clamp(0.0, 1.0);
    frame.render_widget(
        Gauge::default()
            .block(Block::default().title(" Block ").borders(Borders::ALL))
            .gauge_style(Style::default().fg(color))
            .ratio(block_ratio),
        rows[2],
    );

    let plan_ratio = timer.plan_progress(now).clamp(0.0, 1.0);
    frame.render_widget(
        Gauge::default()
            .block(Block::default().title(" Plan ").borders(Borders::ALL))
            .gauge_style(Style::default().fg(Color::Cyan))
            .ratio(plan_ratio),
        rows[3],
    );

    let hint = match timer.phase() {
        Phase::Idle => "Press 's' to start this block.",
        Phase::Running => "Stay focused. 'p' pauses, 'n' skips.",
        Phase::Paused => "Paused. Press 'p' to resume.",
        Phase::Expired => "Block finished. Press 'a' to move on.",
        Phase::Complete => "Well done! Press 'e' to start over or 'q' to quit.",
    };
    frame.render_widget(
        Paragraph::new(hint).alignment(Alignment::Center),
        rows[4],
    );
}

fn draw_schedule(frame: &mut Frame, area: Rect, timer: &BlockTimer) {
    let active = timer.active_index();
    let items: Vec<ListItem> = timer
        .plan()
        .blocks
        .iter()
        .map(|block| {
            let marker = if block.sequence_index == active {
                "> "
            } else if block.sequence_index < active {
                "x "
            } else {
                "  "
            };
            let mut style = Style::default().fg(block_color(block.kind));
            if block.sequence_index == active {
                style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
            } else if block.sequence_index < active {
                style = style.add_modifier(Modifier::DIM);
            }
            ListItem::new(Line::from(vec![
                Span::raw(marker),
                Span::styled(
                    format!(
                        "{:>2}. {:<5} {}",
                        block.sequence_index + 1,
                        block.kind.label(),
                        format_duration(block.duration_seconds as i64)
                    ),
                    style,
                ),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(Span::styled(
                " SCHEDULE ",
                Style::default().add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL),
    );
    frame.render_widget(list, area);
}

fn draw_footer(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(
        "'s' start | 'p' pause/resume | 'n' skip | 'a' advance | 'r' reset | 'e' end session | 'q' quit",
    )
    .block(Block::default().borders(Borders::ALL))
    .alignment(Alignment::Center);
    frame.render_widget(help, area);
}
