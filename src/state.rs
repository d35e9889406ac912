use std::collections::VecDeque;

use chrono::Local;

use crate::catalog;
use crate::dataset::Table;
use crate::error::NoticeLevel;
use crate::radar::RadarChart;
use crate::session::{self, Notice, Presenter, Section, SessionConfig, SessionRequest};

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Players,
    Role,
    Metrics,
    Charts,
}

/// One chart section as the dashboard shows it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPanel {
    pub heading: String,
    pub notices: Vec<Notice>,
    pub chart: Option<RadarChart>,
}

/// Collects presenter calls into panels. Notices that arrive before any
/// heading block the whole session and land in `preamble`.
#[derive(Debug, Clone, Default)]
pub struct PanelCollector {
    pub preamble: Vec<Notice>,
    pub panels: Vec<ChartPanel>,
}

impl Presenter for PanelCollector {
    fn heading(&mut self, text: &str) {
        self.panels.push(ChartPanel {
            heading: text.to_string(),
            notices: Vec::new(),
            chart: None,
        });
    }

    fn notice(&mut self, notice: &Notice) {
        match self.panels.last_mut() {
            Some(panel) => panel.notices.push(notice.clone()),
            None => self.preamble.push(notice.clone()),
        }
    }

    fn chart(&mut self, chart: &RadarChart) {
        if let Some(panel) = self.panels.last_mut() {
            panel.chart = Some(chart.clone());
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: SessionConfig,
    pub focus: Focus,
    pub chart_tab: Section,
    pub player_names: Vec<String>,
    pub metric_keys: Vec<String>,
    pub player_cursor: usize,
    pub metric_cursor: usize,
    pub role_index: usize,
    pub request: SessionRequest,
    pub search: String,
    pub search_active: bool,
    pub preamble: Vec<Notice>,
    pub panels: Vec<ChartPanel>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub dirty: bool,
}

impl AppState {
    pub fn new(config: SessionConfig, table: &Table) -> Self {
        let mut request = SessionRequest::new(&config);
        if config.enable_template_mode {
            request.role = catalog::role_names().next().map(str::to_string);
        }
        Self {
            config,
            focus: Focus::Players,
            chart_tab: Section::Category,
            player_names: table.player_names().into_iter().map(str::to_string).collect(),
            metric_keys: catalog::raw_metric_columns(table)
                .into_iter()
                .map(str::to_string)
                .collect(),
            player_cursor: 0,
            metric_cursor: 0,
            role_index: 0,
            request,
            search: String::new(),
            search_active: false,
            preamble: Vec::new(),
            panels: Vec::new(),
            logs: VecDeque::with_capacity(MAX_LOGS),
            help_overlay: false,
            dirty: true,
        }
    }

    pub fn filtered_players(&self) -> Vec<&str> {
        let query = self.search.trim().to_lowercase();
        self.player_names
            .iter()
            .map(String::as_str)
            .filter(|name| query.is_empty() || name.to_lowercase().contains(&query))
            .collect()
    }

    pub fn current_role(&self) -> Option<&'static str> {
        catalog::role_names().nth(self.role_index)
    }

    pub fn current_panel(&self) -> Option<&ChartPanel> {
        let heading = self.chart_tab.heading();
        self.panels.iter().find(|p| p.heading == heading)
    }

    pub fn cycle_focus_next(&mut self) {
        self.focus = match self.focus {
            Focus::Players if self.config.enable_template_mode => Focus::Role,
            Focus::Players | Focus::Role => Focus::Metrics,
            Focus::Metrics => Focus::Charts,
            Focus::Charts => Focus::Players,
        };
    }

    pub fn cycle_focus_prev(&mut self) {
        self.focus = match self.focus {
            Focus::Players => Focus::Charts,
            Focus::Role => Focus::Players,
            Focus::Metrics if self.config.enable_template_mode => Focus::Role,
            Focus::Metrics => Focus::Players,
            Focus::Charts => Focus::Metrics,
        };
    }

    pub fn cycle_chart_tab(&mut self) {
        self.chart_tab = match self.chart_tab {
            Section::Category if self.config.enable_template_mode => Section::Template,
            Section::Category | Section::Template => Section::Custom,
            Section::Custom => Section::Category,
        };
    }

    pub fn select_next(&mut self) {
        match self.focus {
            Focus::Players => {
                let total = self.filtered_players().len();
                self.player_cursor = wrap_next(self.player_cursor, total);
            }
            Focus::Metrics => {
                self.metric_cursor = wrap_next(self.metric_cursor, self.metric_keys.len());
            }
            Focus::Role => self.cycle_role_next(),
            Focus::Charts => self.cycle_chart_tab(),
        }
    }

    pub fn select_prev(&mut self) {
        match self.focus {
            Focus::Players => {
                let total = self.filtered_players().len();
                self.player_cursor = wrap_prev(self.player_cursor, total);
            }
            Focus::Metrics => {
                self.metric_cursor = wrap_prev(self.metric_cursor, self.metric_keys.len());
            }
            Focus::Role => self.cycle_role_prev(),
            Focus::Charts => self.cycle_chart_tab(),
        }
    }

    pub fn cycle_role_next(&mut self) {
        let total = catalog::position_templates().len();
        self.set_role(wrap_next(self.role_index, total));
    }

    pub fn cycle_role_prev(&mut self) {
        let total = catalog::position_templates().len();
        self.set_role(wrap_prev(self.role_index, total));
    }

    fn set_role(&mut self, index: usize) {
        self.role_index = index;
        self.request.role = self.current_role().map(str::to_string);
        self.dirty = true;
    }

    /// Space on the focused list. Over-limit picks are refused, not truncated.
    pub fn toggle_current(&mut self) {
        match self.focus {
            Focus::Players => {
                let Some(name) = self
                    .filtered_players()
                    .get(self.player_cursor)
                    .map(|n| n.to_string())
                else {
                    return;
                };
                match self.request.players.toggle(&name) {
                    Ok(true) => self.push_log(NoticeLevel::Info, format!("Selected {name}")),
                    Ok(false) => self.push_log(NoticeLevel::Info, format!("Removed {name}")),
                    Err(err) => self.push_log(NoticeLevel::Warning, err.to_string()),
                }
                self.dirty = true;
            }
            Focus::Metrics => {
                let Some(key) = self.metric_keys.get(self.metric_cursor).cloned() else {
                    return;
                };
                match self.request.metrics.toggle(&key) {
                    Ok(_) => self.dirty = true,
                    Err(err) => self.push_log(NoticeLevel::Warning, err.to_string()),
                }
            }
            Focus::Role | Focus::Charts => {}
        }
    }

    pub fn clear_selection(&mut self) {
        match self.focus {
            Focus::Metrics => self.request.metrics.clear(),
            _ => self.request.players.clear(),
        }
        self.dirty = true;
    }

    pub fn search_push(&mut self, ch: char) {
        self.search.push(ch);
        self.player_cursor = 0;
    }

    pub fn search_pop(&mut self) {
        self.search.pop();
        self.player_cursor = 0;
    }

    /// Rebuild every chart section from the current picks.
    pub fn recompute(&mut self, table: &Table) {
        let mut collector = PanelCollector::default();
        session::present(table, &self.config, &self.request, &mut collector);
        let notices: Vec<Notice> = collector
            .preamble
            .iter()
            .chain(collector.panels.iter().flat_map(|p| p.notices.iter()))
            .filter(|n| n.level != NoticeLevel::Info)
            .cloned()
            .collect();
        for notice in notices {
            self.push_log(notice.level, notice.message);
        }
        self.preamble = collector.preamble;
        self.panels = collector.panels;
        self.dirty = false;
    }

    pub fn push_log(&mut self, level: NoticeLevel, msg: impl Into<String>) {
        let tag = match level {
            NoticeLevel::Info => "INFO",
            NoticeLevel::Warning => "WARN",
            NoticeLevel::Error => "ERROR",
        };
        let stamp = Local::now().format("%H:%M:%S");
        self.logs
            .push_back(format!("{stamp} [{tag}] {}", msg.into()));
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

fn wrap_next(current: usize, total: usize) -> usize {
    if total == 0 {
        return 0;
    }
    (current + 1) % total
}

fn wrap_prev(current: usize, total: usize) -> usize {
    if total == 0 {
        return 0;
    }
    if current == 0 { total - 1 } else { current - 1 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset;

    fn table() -> Table {
        let csv = "player_name,cat.a,cat.b,cat.c,player_season_xa_90\n\
                   Ana,80,40,60,0.2\nBen,20,90,50,0.1\nCleo,55,55,55,0.3\nDan,10,10,10,0.0\n";
        dataset::parse_table(csv.as_bytes(), "inline").unwrap()
    }

    #[test]
    fn fourth_player_is_refused_and_logged() {
        let table = table();
        let mut state = AppState::new(SessionConfig::full(), &table);
        for _ in 0..4 {
            state.toggle_current();
            state.select_next();
        }
        assert_eq!(state.request.players.names(), ["Ana", "Ben", "Cleo"]);
        assert!(state.logs.back().unwrap().contains("[WARN]"));
    }

    #[test]
    fn compact_focus_skips_role() {
        let table = table();
        let mut state = AppState::new(SessionConfig::compact(), &table);
        state.cycle_focus_next();
        assert_eq!(state.focus, Focus::Metrics);
        state.cycle_chart_tab();
        assert_eq!(state.chart_tab, Section::Custom);
        assert_eq!(state.request.role, None);
    }

    #[test]
    fn recompute_fills_panels() {
        let table = table();
        let mut state = AppState::new(SessionConfig::full(), &table);
        state.recompute(&table);
        assert_eq!(state.preamble.len(), 1);
        assert!(state.panels.is_empty());

        state.toggle_current();
        state.recompute(&table);
        assert!(state.preamble.is_empty());
        let panel = state.current_panel().unwrap();
        assert_eq!(panel.heading, "Radar: Category Scores");
        assert_eq!(panel.chart.as_ref().unwrap().polygon_count(), 1);
        assert!(!state.dirty);
    }

    #[test]
    fn search_filters_case_insensitively() {
        let table = table();
        let mut state = AppState::new(SessionConfig::full(), &table);
        state.search_push('C');
        state.search_push('L');
        assert_eq!(state.filtered_players(), vec!["Cleo"]);
        state.search_pop();
        assert_eq!(state.filtered_players(), vec!["Cleo"]);
        state.search_pop();
        assert_eq!(state.filtered_players().len(), 4);
    }

    #[test]
    fn console_keeps_the_newest_lines() {
        let table = table();
        let mut state = AppState::new(SessionConfig::full(), &table);
        for i in 0..(MAX_LOGS + 5) {
            state.push_log(NoticeLevel::Info, format!("line {i}"));
        }
        assert_eq!(state.logs.len(), MAX_LOGS);
        assert!(state.logs.front().unwrap().ends_with("line 5"));
    }
}
