use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use season_radar::catalog::{self, RENAMES};
use season_radar::dataset::{self, Table};
use season_radar::percentile::normalize;
use season_radar::radar::{self, AxisSpec};

const ROWS: usize = 3000;

fn synthetic_csv(rows: usize) -> String {
    let mut out = String::from("player_name,team_name,cat.attacking,cat.defending,cat.passing");
    for (key, _) in RENAMES {
        out.push(',');
        out.push_str(key);
    }
    out.push('\n');
    for row in 0..rows {
        out.push_str(&format!("Player {row},Team {}", row % 20));
        for c in 0..3 {
            out.push_str(&format!(",{}", (row * 37 + c * 11) % 101));
        }
        for (c, _) in RENAMES.iter().enumerate() {
            if (row + c) % 23 == 0 {
                out.push(',');
            } else {
                let value = ((row * 7919 + c * 104729) % 1000) as f64 / 100.0;
                out.push_str(&format!(",{value:.3}"));
            }
        }
        out.push('\n');
    }
    out
}

fn synthetic_table() -> Table {
    let csv = synthetic_csv(ROWS);
    dataset::parse_table(csv.as_bytes(), "bench").expect("synthetic csv parses")
}

fn bench_parse_table(c: &mut Criterion) {
    let csv = synthetic_csv(ROWS);
    c.bench_function("parse_table", |b| {
        b.iter(|| {
            let table = dataset::parse_table(black_box(csv.as_bytes()), "bench").unwrap();
            black_box(table.row_count());
        })
    });
}

fn bench_normalize_template(c: &mut Criterion) {
    let table = synthetic_table();
    let resolved = catalog::resolve_template("ST (Striker)", &table).unwrap();
    let keys: Vec<&str> = resolved.columns.iter().map(|c| c.key.as_str()).collect();
    c.bench_function("normalize_template", |b| {
        b.iter(|| {
            let ranked = normalize(black_box(&table), black_box(&keys[..])).unwrap();
            black_box(ranked.row_count());
        })
    });
}

fn bench_render_custom(c: &mut Criterion) {
    let table = synthetic_table();
    let columns: Vec<AxisSpec> = RENAMES
        .iter()
        .take(15)
        .map(|(key, _)| AxisSpec::from_key(key))
        .collect();
    let players = ["Player 10", "Player 1500", "Player 2999"];
    c.bench_function("render_custom", |b| {
        b.iter(|| {
            let chart = radar::render(black_box(&players[..]), &columns, "bench", &table).unwrap();
            black_box(chart.polygon_count());
        })
    });
}

criterion_group!(
    perf,
    bench_parse_table,
    bench_normalize_template,
    bench_render_custom
);
criterion_main!(perf);
