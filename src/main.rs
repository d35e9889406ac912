use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap};

use season_radar::catalog;
use season_radar::config::AppConfig;
use season_radar::dataset::{self, Table};
use season_radar::error::NoticeLevel;
use season_radar::logging;
use season_radar::radar_canvas::RadarCanvas;
use season_radar::session::{Notice, Section, SessionConfig};
use season_radar::state::{AppState, Focus};

#[derive(Debug, Parser)]
#[command(name = "season_radar", about = "Radar charts over season-level player metrics")]
struct Cli {
    /// Season metrics CSV (defaults to all-player-seasons-metrics.csv)
    #[arg(long)]
    data: Option<PathBuf>,
    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Two players, no position templates
    #[arg(long)]
    compact: bool,
    #[arg(long)]
    max_players: Option<usize>,
    #[arg(long)]
    no_template: bool,
}

struct App {
    state: AppState,
    table: &'static Table,
    should_quit: bool,
}

impl App {
    fn new(config: SessionConfig, table: &'static Table) -> Self {
        let mut state = AppState::new(config, table);
        state.push_log(
            NoticeLevel::Info,
            format!(
                "Loaded {} rows, {} players",
                table.row_count(),
                state.player_names.len()
            ),
        );
        Self {
            state,
            table,
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.search_active {
            match key.code {
                KeyCode::Esc | KeyCode::Enter => self.state.search_active = false,
                KeyCode::Backspace => self.state.search_pop(),
                KeyCode::Char(ch) => self.state.search_push(ch),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => self.state.help_overlay = false,
            KeyCode::Tab => self.state.cycle_chart_tab(),
            KeyCode::Char('f') => self.state.cycle_focus_next(),
            KeyCode::Char('F') | KeyCode::BackTab => self.state.cycle_focus_prev(),
            KeyCode::Char('1') => self.state.focus = Focus::Players,
            KeyCode::Char('2') if self.state.config.enable_template_mode => {
                self.state.focus = Focus::Role
            }
            KeyCode::Char('3') => self.state.focus = Focus::Metrics,
            KeyCode::Char('4') => self.state.focus = Focus::Charts,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('l') | KeyCode::Right => match self.state.focus {
                Focus::Role => self.state.cycle_role_next(),
                _ => self.state.cycle_chart_tab(),
            },
            KeyCode::Char('h') | KeyCode::Left => match self.state.focus {
                Focus::Role => self.state.cycle_role_prev(),
                _ => self.state.cycle_chart_tab(),
            },
            KeyCode::Char(' ') | KeyCode::Enter => self.state.toggle_current(),
            KeyCode::Char('x') => self.state.clear_selection(),
            KeyCode::Char('/') => {
                self.state.focus = Focus::Players;
                self.state.search_active = true;
            }
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut cfg = AppConfig::resolve(cli.config.as_deref())?;
    if let Some(path) = cli.data {
        cfg.data_path = path;
    }
    if cli.compact {
        cfg.session = SessionConfig::compact();
    }
    if let Some(max) = cli.max_players {
        cfg.session.max_players = max;
    }
    if cli.no_template {
        cfg.session.enable_template_mode = false;
    }
    cfg.session = cfg.session.normalized();

    if let Some(path) = cfg.log_path() {
        logging::init_file(&path);
    }

    // Load before touching the terminal so a bad file reports cleanly.
    let table = dataset::load(&cfg.data_path)
        .with_context(|| format!("cannot start without {}", cfg.data_path.display()))?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(cfg.session, table);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    loop_outcome(res)
}

/// Surface a failed event loop only once the terminal is back to normal.
fn loop_outcome(res: io::Result<()>) -> Result<()> {
    res.context("dashboard terminal error")
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        if app.state.dirty {
            app.state.recompute(app.table);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(2),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(36), Constraint::Min(40)])
        .split(chunks[1]);
    render_pickers(frame, body[0], &app.state);
    render_charts(frame, body[1], &app.state);

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let role = if state.config.enable_template_mode {
        state.current_role().unwrap_or("-")
    } else {
        "off"
    };
    let line1 = format!(
        "  /\\   SEASON RADAR | Players {}/{} | Role: {} | Metrics {}/{}",
        state.request.players.len(),
        state.request.players.max(),
        role,
        state.request.metrics.len(),
        state.request.metrics.max(),
    );
    let line2 = " /__\\".to_string();
    format!("{line1}\n{line2}")
}

fn footer_text(state: &AppState) -> String {
    if state.search_active {
        return format!("Search: {}_   Enter/Esc done | Backspace delete", state.search);
    }
    "f Focus | j/k Move | Space Toggle | ←/→ Role | Tab Chart | / Search | x Clear | ? Help | q Quit"
        .to_string()
}

fn focus_block(title: String, focused: bool) -> Block<'static> {
    let style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(style)
}

fn render_pickers(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut constraints = vec![Constraint::Percentage(50)];
    if state.config.enable_template_mode {
        constraints.push(Constraint::Length(3));
    }
    constraints.push(Constraint::Min(4));
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let players = state.filtered_players();
    let player_title = if state.search.is_empty() {
        format!("Players (max {})", state.request.players.max())
    } else {
        format!("Players /{}", state.search)
    };
    let player_lines: Vec<(String, bool)> = players
        .iter()
        .map(|name| (name.to_string(), state.request.players.contains(name)))
        .collect();
    render_pick_list(
        frame,
        parts[0],
        focus_block(player_title, state.focus == Focus::Players),
        &player_lines,
        state.player_cursor,
        state.focus == Focus::Players,
    );

    let mut next = 1;
    if state.config.enable_template_mode {
        let role = Paragraph::new(format!("◀ {} ▶", state.current_role().unwrap_or("-")))
            .block(focus_block("Role".to_string(), state.focus == Focus::Role));
        frame.render_widget(role, parts[next]);
        next += 1;
    }

    let metric_lines: Vec<(String, bool)> = state
        .metric_keys
        .iter()
        .map(|key| {
            (
                catalog::display_label(key).to_string(),
                state.request.metrics.contains(key),
            )
        })
        .collect();
    render_pick_list(
        frame,
        parts[next],
        focus_block(
            format!("Metrics (3-{})", state.request.metrics.max()),
            state.focus == Focus::Metrics,
        ),
        &metric_lines,
        state.metric_cursor,
        state.focus == Focus::Metrics,
    );
}

fn render_pick_list(
    frame: &mut Frame,
    area: Rect,
    block: Block<'static>,
    items: &[(String, bool)],
    cursor: usize,
    focused: bool,
) {
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 {
        return;
    }
    if items.is_empty() {
        let empty = Paragraph::new("Nothing to pick").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let (start, end) = visible_range(cursor, items.len(), inner.height as usize);
    let lines: Vec<Line> = items[start..end]
        .iter()
        .enumerate()
        .map(|(i, (label, picked))| {
            let idx = start + i;
            let mark = if *picked { "[x] " } else { "[ ] " };
            let style = if focused && idx == cursor {
                Style::default().fg(Color::White).bg(Color::DarkGray)
            } else if *picked {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::styled(format!("{mark}{label}"), style)
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_charts(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = focus_block("Charts".to_string(), state.focus == Focus::Charts);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut sections = vec![Section::Category];
    if state.config.enable_template_mode {
        sections.push(Section::Template);
    }
    sections.push(Section::Custom);
    let selected = sections
        .iter()
        .position(|s| *s == state.chart_tab)
        .unwrap_or(0);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);
    let tabs = Tabs::new(sections.iter().map(|s| section_label(*s)).collect::<Vec<_>>())
        .select(selected)
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, parts[0]);

    if !state.preamble.is_empty() {
        let text: Vec<Line> = state.preamble.iter().map(notice_line).collect();
        frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), parts[1]);
        return;
    }

    let Some(panel) = state.current_panel() else {
        let empty = Paragraph::new("Nothing to show yet").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, parts[1]);
        return;
    };

    let notice_rows = panel.notices.len().min(3) as u16;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(notice_rows), Constraint::Min(1)])
        .split(parts[1]);
    if notice_rows > 0 {
        let text: Vec<Line> = panel.notices.iter().map(notice_line).collect();
        frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), rows[0]);
    }

    match &panel.chart {
        Some(chart) => {
            let widget = RadarCanvas::new(chart).block(
                Block::default()
                    .title(chart.title.clone())
                    .borders(Borders::ALL),
            );
            frame.render_widget(widget, rows[1]);
        }
        None => {
            let block = Block::default()
                .title(panel.heading.clone())
                .borders(Borders::ALL);
            frame.render_widget(block, rows[1]);
        }
    }
}

fn notice_line(notice: &Notice) -> Line<'static> {
    let style = match notice.level {
        NoticeLevel::Info => Style::default().fg(Color::Blue),
        NoticeLevel::Warning => Style::default().fg(Color::Yellow),
        NoticeLevel::Error => Style::default().fg(Color::Red),
    };
    Line::styled(notice.message.clone(), style)
}

fn section_label(section: Section) -> &'static str {
    match section {
        Section::Category => "Category",
        Section::Template => "Template",
        Section::Custom => "Custom",
    }
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }
    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Season Radar - Help",
        "",
        "Global:",
        "  f / F        Cycle focus (1-4 jump to a pane)",
        "  j/k or ↑/↓   Move",
        "  Space/Enter  Toggle player or metric",
        "  h/l or ←/→   Change role (Role) or chart",
        "  Tab          Next chart: Category / Template / Custom",
        "  /            Search players",
        "  x            Clear players (or metrics)",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Charts use a fixed 0-100 scale.",
        "Template and custom charts show percentiles across all player-seasons.",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
