use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog;
use crate::dataset::Table;
use crate::error::{NoticeLevel, RadarError, Result};
use crate::percentile;
use crate::radar::{self, AxisSpec, MIN_AXES, RadarChart};

pub const MAX_PLAYERS_LIMIT: usize = 3;
pub const MAX_CUSTOM_METRICS: usize = 15;

pub const CATEGORY_HEADING: &str = "Radar: Category Scores";
pub const TEMPLATE_HEADING: &str = "Radar: Template by Position Role";
pub const CUSTOM_HEADING: &str = "Radar: Custom Metrics";

const CATEGORY_TITLE: &str = "Category Scores";
const CUSTOM_TITLE: &str = "User-Defined Metrics (0–100 percentiles)";

/// Knobs that distinguish the two dashboard variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub max_players: usize,
    pub enable_template_mode: bool,
    pub max_custom_metrics: usize,
    pub min_axes: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::full()
    }
}

impl SessionConfig {
    /// Three players, all three chart sections.
    pub fn full() -> Self {
        Self {
            max_players: 3,
            enable_template_mode: true,
            max_custom_metrics: MAX_CUSTOM_METRICS,
            min_axes: MIN_AXES,
        }
    }

    /// Two players, no position templates.
    pub fn compact() -> Self {
        Self {
            max_players: 2,
            enable_template_mode: false,
            ..Self::full()
        }
    }

    /// Clamp every limit into the range the charts can honour.
    pub fn normalized(self) -> Self {
        let max_custom_metrics = self.max_custom_metrics.clamp(MIN_AXES, MAX_CUSTOM_METRICS);
        Self {
            max_players: self.max_players.clamp(1, MAX_PLAYERS_LIMIT),
            enable_template_mode: self.enable_template_mode,
            max_custom_metrics,
            min_axes: self.min_axes.clamp(MIN_AXES, max_custom_metrics),
        }
    }
}

/// Ordered, duplicate-free list of names with a hard upper bound.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BoundedPicks {
    items: Vec<String>,
    max: usize,
}

impl BoundedPicks {
    fn contains(&self, item: &str) -> bool {
        self.items.iter().any(|i| i == item)
    }

    /// `Ok(true)` when added, `Ok(false)` when removed, `Err(len + 1)` when full.
    fn toggle(&mut self, item: &str) -> std::result::Result<bool, usize> {
        if let Some(pos) = self.items.iter().position(|i| i == item) {
            self.items.remove(pos);
            return Ok(false);
        }
        if self.items.len() >= self.max {
            return Err(self.items.len() + 1);
        }
        self.items.push(item.to_string());
        Ok(true)
    }

    fn collect<I, S>(items: I, max: usize) -> std::result::Result<Self, usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut picks = Self {
            items: Vec::new(),
            max,
        };
        for item in items {
            let item = item.as_ref();
            if picks.contains(item) {
                continue;
            }
            if picks.items.len() >= max {
                return Err(picks.items.len() + 1);
            }
            picks.items.push(item.to_string());
        }
        Ok(picks)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSelection(BoundedPicks);

impl PlayerSelection {
    pub fn new(config: &SessionConfig) -> Self {
        Self(BoundedPicks {
            items: Vec::new(),
            max: config.max_players,
        })
    }

    /// Refuses (rather than truncates) a list longer than the configured maximum.
    pub fn from_names<I, S>(names: I, config: &SessionConfig) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        BoundedPicks::collect(names, config.max_players)
            .map(Self)
            .map_err(|got| RadarError::TooManyPlayers {
                got,
                max: config.max_players,
            })
    }

    pub fn toggle(&mut self, name: &str) -> Result<bool> {
        let max = self.0.max;
        self.0
            .toggle(name)
            .map_err(|got| RadarError::TooManyPlayers { got, max })
    }

    pub fn names(&self) -> &[String] {
        &self.0.items
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn len(&self) -> usize {
        self.0.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.items.is_empty()
    }

    pub fn max(&self) -> usize {
        self.0.max
    }

    pub fn clear(&mut self) {
        self.0.items.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSelection(BoundedPicks);

impl MetricSelection {
    pub fn new(config: &SessionConfig) -> Self {
        Self(BoundedPicks {
            items: Vec::new(),
            max: config.max_custom_metrics,
        })
    }

    /// A 16th metric is rejected here so it can never reach the normalizer.
    pub fn from_keys<I, S>(keys: I, config: &SessionConfig) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        BoundedPicks::collect(keys, config.max_custom_metrics)
            .map(Self)
            .map_err(|got| RadarError::TooManyMetrics {
                got,
                max: config.max_custom_metrics,
            })
    }

    pub fn toggle(&mut self, key: &str) -> Result<bool> {
        let max = self.0.max;
        self.0
            .toggle(key)
            .map_err(|got| RadarError::TooManyMetrics { got, max })
    }

    pub fn keys(&self) -> &[String] {
        &self.0.items
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    pub fn len(&self) -> usize {
        self.0.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.items.is_empty()
    }

    pub fn max(&self) -> usize {
        self.0.max
    }

    pub fn clear(&mut self) {
        self.0.items.clear();
    }
}

/// What the user has picked for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRequest {
    pub players: PlayerSelection,
    /// `None` falls back to the first template, like an untouched select box.
    pub role: Option<String>,
    pub metrics: MetricSelection,
}

impl SessionRequest {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            players: PlayerSelection::new(config),
            role: None,
            metrics: MetricSelection::new(config),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Category,
    Template,
    Custom,
}

impl Section {
    pub fn heading(self) -> &'static str {
        match self {
            Section::Category => CATEGORY_HEADING,
            Section::Template => TEMPLATE_HEADING,
            Section::Custom => CUSTOM_HEADING,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}

impl From<&RadarError> for Notice {
    fn from(err: &RadarError) -> Self {
        Self {
            level: err.notice_level(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionOutcome {
    Chart(RadarChart),
    Notice(Notice),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionReport {
    pub section: Section,
    /// Side notes that do not block the chart (e.g. dropped template labels).
    pub notes: Vec<Notice>,
    pub outcome: SectionOutcome,
}

impl SectionReport {
    fn chart(section: Section, chart: RadarChart) -> Self {
        Self {
            section,
            notes: Vec::new(),
            outcome: SectionOutcome::Chart(chart),
        }
    }

    fn notice(section: Section, notice: Notice) -> Self {
        Self {
            section,
            notes: Vec::new(),
            outcome: SectionOutcome::Notice(notice),
        }
    }

    fn from_result(section: Section, result: Result<RadarChart>) -> Self {
        match result {
            Ok(chart) => Self::chart(section, chart),
            Err(err) => Self::notice(section, Notice::from(&err)),
        }
    }

    pub fn chart_ref(&self) -> Option<&RadarChart> {
        match &self.outcome {
            SectionOutcome::Chart(chart) => Some(chart),
            SectionOutcome::Notice(_) => None,
        }
    }
}

/// Fire-and-forget display capabilities supplied by the hosting UI.
pub trait Presenter {
    fn heading(&mut self, text: &str);
    fn notice(&mut self, notice: &Notice);
    fn chart(&mut self, chart: &RadarChart);
}

pub fn category_section(table: &Table, players: &PlayerSelection) -> SectionReport {
    let columns: Vec<AxisSpec> = catalog::category_columns(table)
        .into_iter()
        .map(|key| AxisSpec::new(key, key))
        .collect();
    if columns.is_empty() {
        return SectionReport::notice(
            Section::Category,
            Notice::from(&RadarError::NoCategoryColumns),
        );
    }
    SectionReport::from_result(
        Section::Category,
        radar::render(players.names(), &columns, CATEGORY_TITLE, table),
    )
}

pub fn template_section(
    table: &Table,
    players: &PlayerSelection,
    role: Option<&str>,
) -> SectionReport {
    let role = match role {
        Some(role) => role,
        None => match catalog::role_names().next() {
            Some(first) => first,
            None => {
                return SectionReport::notice(
                    Section::Template,
                    Notice::warning("No position templates defined"),
                );
            }
        },
    };
    let resolved = match catalog::resolve_template(role, table) {
        Ok(resolved) => resolved,
        Err(err) => return SectionReport::notice(Section::Template, Notice::from(&err)),
    };
    let notes = if resolved.missing.is_empty() {
        Vec::new()
    } else {
        vec![Notice::warning(format!(
            "Metrics not available in this dataset: {}",
            resolved.missing.join(", ")
        ))]
    };

    let title = format!("{} Template Metrics", resolved.role_name);
    let result = if resolved.columns.len() < MIN_AXES {
        Err(RadarError::InsufficientAxes {
            got: resolved.columns.len(),
            min: MIN_AXES,
        })
    } else {
        let keys: Vec<&str> = resolved.columns.iter().map(|c| c.key.as_str()).collect();
        percentile::normalize(table, &keys)
            .and_then(|ranked| radar::render(players.names(), &resolved.columns, &title, &ranked))
    };

    let mut report = SectionReport::from_result(Section::Template, result);
    report.notes = notes;
    report
}

pub fn custom_section(
    table: &Table,
    players: &PlayerSelection,
    metrics: &MetricSelection,
    config: &SessionConfig,
) -> SectionReport {
    if metrics.is_empty() {
        return SectionReport::notice(
            Section::Custom,
            Notice::info("Select individual metrics to build a custom radar."),
        );
    }
    if metrics.len() < config.min_axes {
        return SectionReport::notice(
            Section::Custom,
            Notice::warning(format!(
                "Please select at least {} metrics for the radar chart.",
                config.min_axes
            )),
        );
    }
    if metrics.len() > config.max_custom_metrics {
        return SectionReport::notice(
            Section::Custom,
            Notice::from(&RadarError::TooManyMetrics {
                got: metrics.len(),
                max: config.max_custom_metrics,
            }),
        );
    }

    let columns: Vec<AxisSpec> = metrics
        .keys()
        .iter()
        .map(|key| AxisSpec::from_key(key))
        .collect();
    let result = percentile::normalize(table, metrics.keys())
        .and_then(|ranked| radar::render(players.names(), &columns, CUSTOM_TITLE, &ranked));
    SectionReport::from_result(Section::Custom, result)
}

/// Build every enabled chart section. No players blocks the whole session.
pub fn run(
    table: &Table,
    config: &SessionConfig,
    request: &SessionRequest,
) -> Result<Vec<SectionReport>> {
    if request.players.is_empty() {
        return Err(RadarError::NoPlayersSelected);
    }
    if request.players.len() > config.max_players {
        return Err(RadarError::TooManyPlayers {
            got: request.players.len(),
            max: config.max_players,
        });
    }

    let mut reports = Vec::with_capacity(3);
    reports.push(category_section(table, &request.players));
    if config.enable_template_mode {
        reports.push(template_section(
            table,
            &request.players,
            request.role.as_deref(),
        ));
    }
    reports.push(custom_section(
        table,
        &request.players,
        &request.metrics,
        config,
    ));
    debug!(sections = reports.len(), "session charts built");
    Ok(reports)
}

/// Run a session and hand every heading, notice and chart to `presenter`.
pub fn present<P: Presenter + ?Sized>(
    table: &Table,
    config: &SessionConfig,
    request: &SessionRequest,
    presenter: &mut P,
) {
    let reports = match run(table, config, request) {
        Ok(reports) => reports,
        Err(err) => {
            presenter.notice(&Notice::from(&err));
            return;
        }
    };
    for report in &reports {
        presenter.heading(report.section.heading());
        for note in &report.notes {
            presenter.notice(note);
        }
        match &report.outcome {
            SectionOutcome::Chart(chart) => presenter.chart(chart),
            SectionOutcome::Notice(notice) => presenter.notice(notice),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_past_the_limit_is_refused() {
        let cfg = SessionConfig::compact();
        let mut players = PlayerSelection::new(&cfg);
        assert_eq!(players.toggle("A"), Ok(true));
        assert_eq!(players.toggle("B"), Ok(true));
        assert_eq!(
            players.toggle("C"),
            Err(RadarError::TooManyPlayers { got: 3, max: 2 })
        );
        assert_eq!(players.toggle("A"), Ok(false));
        assert_eq!(players.names(), &["B".to_string()]);
    }

    #[test]
    fn duplicates_do_not_count_against_the_limit() {
        let cfg = SessionConfig::compact();
        let players = PlayerSelection::from_names(["A", "A", "B"], &cfg).expect("two distinct");
        assert_eq!(players.len(), 2);
    }

    #[test]
    fn config_is_clamped() {
        let cfg = SessionConfig {
            max_players: 9,
            enable_template_mode: true,
            max_custom_metrics: 40,
            min_axes: 1,
        }
        .normalized();
        assert_eq!(cfg.max_players, 3);
        assert_eq!(cfg.max_custom_metrics, 15);
        assert_eq!(cfg.min_axes, 3);
    }

    #[test]
    fn min_axes_never_exceeds_the_metric_limit() {
        let cfg = SessionConfig {
            min_axes: 20,
            ..SessionConfig::full()
        }
        .normalized();
        assert_eq!(cfg.max_custom_metrics, 15);
        assert_eq!(cfg.min_axes, 15);

        let tight = SessionConfig {
            max_custom_metrics: 4,
            min_axes: 9,
            ..SessionConfig::full()
        }
        .normalized();
        assert_eq!(tight.min_axes, 4);
    }

    #[test]
    fn sixteenth_metric_toggle_is_refused() {
        let cfg = SessionConfig::full();
        let mut metrics = MetricSelection::new(&cfg);
        for i in 0..15 {
            assert_eq!(metrics.toggle(&format!("player_season_m{i}")), Ok(true));
        }
        assert_eq!(
            metrics.toggle("player_season_m15"),
            Err(RadarError::TooManyMetrics { got: 16, max: 15 })
        );
        assert_eq!(metrics.len(), 15);
        assert!(!metrics.contains("player_season_m15"));
    }
}
