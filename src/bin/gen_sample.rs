use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use season_radar::catalog::RENAMES;
use season_radar::dataset::DEFAULT_DATA_FILE;

const FIRST_NAMES: &[&str] = &[
    "Aaron", "Bruno", "Carlos", "Dani", "Emil", "Felix", "Goran", "Hugo", "Ivan", "Jonas",
    "Kai", "Luca", "Mateo", "Nico", "Oscar", "Pablo", "Rafa", "Sami", "Theo", "Yann",
];
const LAST_NAMES: &[&str] = &[
    "Alves", "Berg", "Costa", "Dalot", "Eriksen", "Ferreira", "Gomez", "Hansen", "Ito",
    "Jensen", "Kovac", "Lopez", "Moreau", "Novak", "Ortega", "Petrov", "Quinn", "Rossi",
    "Silva", "Weber",
];
const TEAMS: &[&str] = &[
    "Northbridge", "Redhaven", "Lakeside", "Eastport", "Millwater", "Stonegate",
];
const SEASONS: &[&str] = &["2021/2022", "2022/2023", "2023/2024"];
const CATEGORY_COLUMNS: &[&str] = &[
    "cat.attacking",
    "cat.chance_creation",
    "cat.passing",
    "cat.dribbling",
    "cat.defending",
    "cat.aerial",
];

#[derive(Debug, Parser)]
#[command(name = "gen_sample", about = "Write a synthetic player-season metrics CSV")]
struct Cli {
    #[arg(long, default_value = DEFAULT_DATA_FILE)]
    out: PathBuf,
    #[arg(long, default_value_t = 120)]
    rows: usize,
    /// Share of metric cells left empty
    #[arg(long, default_value_t = 0.05)]
    null_rate: f64,
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let null_rate = cli.null_rate.clamp(0.0, 1.0);

    let mut writer = csv::Writer::from_path(&cli.out)
        .with_context(|| format!("create {}", cli.out.display()))?;

    let mut header = vec!["player_name", "team_name", "season_name"];
    header.extend_from_slice(CATEGORY_COLUMNS);
    header.extend(RENAMES.iter().map(|(key, _)| *key));
    writer.write_record(&header)?;

    let name_count = FIRST_NAMES.len() * LAST_NAMES.len();
    for row in 0..cli.rows {
        let slot = row % name_count;
        let name = format!(
            "{} {}",
            FIRST_NAMES[slot % FIRST_NAMES.len()],
            LAST_NAMES[(slot / FIRST_NAMES.len()) % LAST_NAMES.len()]
        );
        let mut record = vec![
            name,
            TEAMS[rng.gen_range(0..TEAMS.len())].to_string(),
            SEASONS[(row / name_count) % SEASONS.len()].to_string(),
        ];
        for _ in CATEGORY_COLUMNS {
            record.push(metric_cell(&mut rng, null_rate, 100.0));
        }
        for (key, _) in RENAMES {
            record.push(metric_cell(&mut rng, null_rate, metric_scale(key)));
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    println!("wrote {} rows to {}", cli.rows, cli.out.display());
    Ok(())
}

fn metric_cell(rng: &mut StdRng, null_rate: f64, scale: f64) -> String {
    if rng.gen_bool(null_rate) {
        return String::new();
    }
    format!("{:.3}", rng.gen_range(0.0..scale))
}

/// Rough magnitude per metric family so percentiles have something to rank.
fn metric_scale(key: &str) -> f64 {
    if key.ends_with("_ratio") || key.ends_with("_perc") {
        1.0
    } else if key.contains("appearances") {
        38.0
    } else if key.contains("minutes") {
        3400.0
    } else {
        5.0
    }
}
