use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;

use season_radar::catalog;
use season_radar::config::AppConfig;
use season_radar::dataset;
use season_radar::error::NoticeLevel;
use season_radar::logging;
use season_radar::radar::RadarChart;
use season_radar::session::{
    self, MetricSelection, Notice, PlayerSelection, Presenter, SessionConfig, SessionRequest,
};

#[derive(Debug, Parser)]
#[command(
    name = "radar_report",
    about = "Print the radar chart values for a set of players"
)]
struct Cli {
    /// Player names separated by ';'
    #[arg(long, value_delimiter = ';')]
    players: Vec<String>,
    #[arg(long)]
    role: Option<String>,
    /// Raw metric keys separated by ','
    #[arg(long, value_delimiter = ',')]
    metrics: Vec<String>,
    #[arg(long)]
    data: Option<PathBuf>,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    compact: bool,
    /// Print the position templates and exit
    #[arg(long)]
    list_roles: bool,
    /// Print the dataset's raw metric keys and exit
    #[arg(long)]
    list_metrics: bool,
    /// Write the resolved settings as JSON and exit
    #[arg(long)]
    save_config: Option<PathBuf>,
}

/// Writes each section to stdout as plain text.
#[derive(Default)]
struct TextPresenter {
    charts: usize,
    errors: usize,
}

impl Presenter for TextPresenter {
    fn heading(&mut self, text: &str) {
        println!();
        println!("== {text} ==");
    }

    fn notice(&mut self, notice: &Notice) {
        let tag = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warn",
            NoticeLevel::Error => {
                self.errors += 1;
                "error"
            }
        };
        println!("[{tag}] {}", notice.message);
    }

    fn chart(&mut self, chart: &RadarChart) {
        self.charts += 1;
        print!("{}", chart_table(chart));
    }
}

fn chart_table(chart: &RadarChart) -> String {
    let label_width = chart
        .axes
        .iter()
        .map(|axis| axis.label.chars().count())
        .max()
        .unwrap_or(0)
        .max(6);
    let col_width = chart
        .series
        .iter()
        .map(|s| s.player.chars().count())
        .max()
        .unwrap_or(0)
        .max(6);

    let mut out = format!("{}\n", chart.title);
    out.push_str(&format!("{:<label_width$}", "metric"));
    for series in &chart.series {
        out.push_str(&format!("  {:>col_width$}", series.player));
    }
    out.push('\n');

    for (i, axis) in chart.axes.iter().enumerate() {
        out.push_str(&format!("{:<label_width$}", axis.label));
        for series in &chart.series {
            let cell = series
                .points
                .get(i)
                .and_then(|p| p.value)
                .map(|v| format!("{v:.1}"))
                .unwrap_or_else(|| "-".to_string());
            out.push_str(&format!("  {cell:>col_width$}"));
        }
        out.push('\n');
    }
    if chart.series.is_empty() {
        out.push_str("(no selected player found in the dataset)\n");
    }
    out
}

fn main() -> Result<()> {
    logging::init_stderr();
    let cli = Cli::parse();

    if cli.list_roles {
        for template in catalog::position_templates() {
            println!(
                "{} ({} metrics): {}",
                template.role_name,
                template.ordered_metrics.len(),
                template.ordered_metrics.join(", ")
            );
        }
        return Ok(());
    }

    let mut cfg = AppConfig::resolve(cli.config.as_deref())?;
    if let Some(path) = cli.data {
        cfg.data_path = path;
    }
    if cli.compact {
        cfg.session = SessionConfig::compact();
    }
    if let Some(path) = cli.save_config {
        cfg.save_file(&path)?;
        println!("wrote {}", path.display());
        return Ok(());
    }

    let table = dataset::load(&cfg.data_path)
        .with_context(|| format!("load {}", cfg.data_path.display()))?;

    if cli.list_metrics {
        for key in catalog::raw_metric_columns(table) {
            println!("{key}\t{}", catalog::display_label(key));
        }
        return Ok(());
    }

    let names: Vec<&str> = cli
        .players
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .collect();
    let keys: Vec<&str> = cli
        .metrics
        .iter()
        .map(|key| key.trim())
        .filter(|key| !key.is_empty())
        .collect();

    let request = SessionRequest {
        players: PlayerSelection::from_names(names, &cfg.session)?,
        role: cli.role,
        metrics: MetricSelection::from_keys(keys, &cfg.session)?,
    };

    let mut out = TextPresenter::default();
    session::present(table, &cfg.session, &request, &mut out);
    if out.charts == 0 && out.errors > 0 {
        return Err(anyhow!("no chart could be drawn"));
    }
    Ok(())
}
