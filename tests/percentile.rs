use std::path::PathBuf;

use season_radar::dataset::{self, Table};
use season_radar::error::RadarError;
use season_radar::percentile::{normalize, percentile_ranks};

fn fixture_table() -> Table {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("player_seasons.csv");
    dataset::read_table(&path).expect("fixture should parse")
}

fn close(a: Option<f64>, b: f64) -> bool {
    a.is_some_and(|a| (a - b).abs() < 0.05)
}

#[test]
fn three_distinct_values_rank_to_thirds() {
    let ranks = percentile_ranks(&[Some(10.0), Some(20.0), Some(30.0)]);
    assert!(close(ranks[0], 33.3));
    assert!(close(ranks[1], 66.7));
    assert!(close(ranks[2], 100.0));
}

#[test]
fn normalize_keeps_rows_and_untouched_columns() {
    let table = fixture_table();
    let ranked = normalize(&table, &["player_season_np_xg_90", "player_season_xa_90"])
        .expect("numeric columns");

    assert_eq!(ranked.row_count(), table.row_count());
    assert_eq!(ranked.player_names(), table.player_names());
    assert_eq!(
        ranked.numeric("player_season_key_passes_90"),
        table.numeric("player_season_key_passes_90")
    );
    assert_eq!(ranked.numeric("cat.passing"), table.numeric("cat.passing"));
    // Source table is left alone.
    assert_eq!(table.value(0, "player_season_np_xg_90"), Some(0.52));
}

#[test]
fn normalized_values_are_monotone_in_the_raw_values() {
    let table = fixture_table();
    let key = "player_season_key_passes_90";
    let ranked = normalize(&table, &[key]).expect("numeric column");

    let raw = table.numeric(key).expect("numeric");
    let pct = ranked.numeric(key).expect("numeric");
    for i in 0..raw.len() {
        for j in 0..raw.len() {
            let (Some(ri), Some(rj), Some(pi), Some(pj)) = (raw[i], raw[j], pct[i], pct[j]) else {
                continue;
            };
            if ri < rj {
                assert!(pi < pj, "row {i} vs {j}");
            }
            assert!(pi > 0.0 && pi <= 100.0);
        }
    }
}

#[test]
fn nulls_are_excluded_from_the_denominator() {
    let table = fixture_table();
    let key = "player_season_npg_90";
    let ranked = normalize(&table, &[key]).expect("numeric column");
    let eli = ranked.find_player("Eli Novak").expect("row present");
    assert_eq!(eli.value(key), None);
    // Four non-null values: the top one is 100, the bottom one 25.
    let ana = ranked.find_player("Ana Costa").expect("row present");
    let dario = ranked.find_player("Dario Rossi").expect("row present");
    assert!(close(ana.value(key), 100.0));
    assert!(close(dario.value(key), 25.0));
}

#[test]
fn ranking_an_already_scaled_column_changes_it() {
    let csv = "player_name,cat.overall\nA,10\nB,50\nC,55\nD,90\n";
    let table = dataset::parse_table(csv.as_bytes(), "inline").expect("valid csv");
    let ranked = normalize(&table, &["cat.overall"]).expect("numeric column");
    let values: Vec<f64> = ranked
        .numeric("cat.overall")
        .expect("numeric")
        .iter()
        .flatten()
        .copied()
        .collect();
    assert_eq!(values, vec![25.0, 50.0, 75.0, 100.0]);
    assert_ne!(ranked.numeric("cat.overall"), table.numeric("cat.overall"));
}

#[test]
fn unknown_and_text_columns_are_refused() {
    let table = fixture_table();
    assert_eq!(
        normalize(&table, &["player_season_nope"]).unwrap_err(),
        RadarError::UnknownColumn("player_season_nope".to_string())
    );
    assert_eq!(
        normalize(&table, &["team_name"]).unwrap_err(),
        RadarError::NonNumericColumn("team_name".to_string())
    );
}
