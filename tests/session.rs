use std::path::PathBuf;

use season_radar::dataset::{self, Table};
use season_radar::error::{NoticeLevel, RadarError};
use season_radar::session::{
    self, MetricSelection, PlayerSelection, Section, SectionOutcome, SessionConfig,
    SessionRequest,
};
use season_radar::state::PanelCollector;

fn fixture_table() -> Table {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("player_seasons.csv");
    dataset::read_table(&path).expect("fixture should parse")
}

fn request(config: &SessionConfig, players: &[&str], metrics: &[&str]) -> SessionRequest {
    SessionRequest {
        players: PlayerSelection::from_names(players, config).expect("within limit"),
        role: None,
        metrics: MetricSelection::from_keys(metrics, config).expect("within limit"),
    }
}

#[test]
fn no_players_blocks_every_section() {
    let table = fixture_table();
    let config = SessionConfig::full();
    let req = request(&config, &[], &[]);
    assert_eq!(
        session::run(&table, &config, &req).unwrap_err(),
        RadarError::NoPlayersSelected
    );

    let mut out = PanelCollector::default();
    session::present(&table, &config, &req, &mut out);
    assert!(out.panels.is_empty());
    assert_eq!(out.preamble.len(), 1);
    assert_eq!(
        out.preamble[0].message,
        "Please select at least one player to show radar plots."
    );
}

#[test]
fn sixteen_metrics_are_refused() {
    let config = SessionConfig::full();
    let keys: Vec<String> = (0..16).map(|i| format!("player_season_m{i}")).collect();
    let err = MetricSelection::from_keys(&keys, &config).unwrap_err();
    assert_eq!(err, RadarError::TooManyMetrics { got: 16, max: 15 });
}

#[test]
fn full_session_builds_three_sections_in_order() {
    let table = fixture_table();
    let config = SessionConfig::full();
    let mut req = request(
        &config,
        &["Ana Costa", "Ben Okafor"],
        &[
            "player_season_xa_90",
            "player_season_key_passes_90",
            "player_season_padj_tackles_90",
        ],
    );
    req.role = Some("CF (Centre Forward)".to_string());
    let reports = session::run(&table, &config, &req).expect("players selected");
    let sections: Vec<Section> = reports.iter().map(|r| r.section).collect();
    assert_eq!(
        sections,
        vec![Section::Category, Section::Template, Section::Custom]
    );
    for report in &reports {
        let chart = report.chart_ref().expect("chart for every section");
        assert_eq!(chart.polygon_count(), 2);
    }
    let custom = reports[2].chart_ref().expect("custom chart");
    assert_eq!(custom.title, "User-Defined Metrics (0–100 percentiles)");
    assert_eq!(custom.axis_labels(), vec!["xA", "Key Passes", "Tackles"]);
}

#[test]
fn compact_session_has_no_template_section() {
    let table = fixture_table();
    let config = SessionConfig::compact();
    let req = request(&config, &["Cleo Martin"], &[]);
    let reports = session::run(&table, &config, &req).expect("players selected");
    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(|r| r.section != Section::Template));
    match &reports[1].outcome {
        SectionOutcome::Notice(notice) => {
            assert_eq!(notice.level, NoticeLevel::Info);
            assert_eq!(
                notice.message,
                "Select individual metrics to build a custom radar."
            );
        }
        SectionOutcome::Chart(_) => panic!("no metrics picked"),
    }
}

#[test]
fn compact_session_refuses_a_third_player() {
    let config = SessionConfig::compact();
    let err =
        PlayerSelection::from_names(["Ana Costa", "Ben Okafor", "Cleo Martin"], &config)
            .unwrap_err();
    assert_eq!(err, RadarError::TooManyPlayers { got: 3, max: 2 });
}

#[test]
fn two_custom_metrics_ask_for_more() {
    let table = fixture_table();
    let config = SessionConfig::full();
    let req = request(
        &config,
        &["Ana Costa"],
        &["player_season_xa_90", "player_season_key_passes_90"],
    );
    let reports = session::run(&table, &config, &req).expect("players selected");
    let custom = reports.last().expect("custom section");
    match &custom.outcome {
        SectionOutcome::Notice(notice) => assert_eq!(
            notice.message,
            "Please select at least 3 metrics for the radar chart."
        ),
        SectionOutcome::Chart(_) => panic!("two metrics cannot make a chart"),
    }
}

#[test]
fn missing_category_columns_is_informational() {
    let csv = "player_name,player_season_xa_90\nAna,0.2\n";
    let table = dataset::parse_table(csv.as_bytes(), "inline").expect("valid csv");
    let config = SessionConfig::compact();
    let req = request(&config, &["Ana"], &[]);
    let reports = session::run(&table, &config, &req).expect("players selected");
    match &reports[0].outcome {
        SectionOutcome::Notice(notice) => {
            assert_eq!(notice.level, NoticeLevel::Info);
            assert_eq!(notice.message, "No columns found starting with 'cat.'");
        }
        SectionOutcome::Chart(_) => panic!("no category columns"),
    }
}

#[test]
fn goalkeeper_template_notes_unmapped_label() {
    let table = fixture_table();
    let config = SessionConfig::full();
    let mut req = request(&config, &["Ana Costa"], &[]);
    req.role = Some("GK (Goalkeeper)".to_string());
    let reports = session::run(&table, &config, &req).expect("players selected");
    let template = &reports[1];
    assert_eq!(template.section, Section::Template);
    assert!(
        template
            .notes
            .iter()
            .any(|n| n.level == NoticeLevel::Warning && n.message.contains("Long Balls"))
    );
}

#[test]
fn unknown_role_is_a_section_notice() {
    let table = fixture_table();
    let config = SessionConfig::full();
    let mut req = request(&config, &["Ana Costa"], &[]);
    req.role = Some("Sweeper".to_string());
    let reports = session::run(&table, &config, &req).expect("players selected");
    assert!(reports[0].chart_ref().is_some());
    assert!(matches!(reports[1].outcome, SectionOutcome::Notice(_)));
}

#[test]
fn presenter_sees_headings_in_section_order() {
    let table = fixture_table();
    let config = SessionConfig::full();
    let req = request(&config, &["Dario Rossi"], &[]);
    let mut out = PanelCollector::default();
    session::present(&table, &config, &req, &mut out);

    let headings: Vec<&str> = out.panels.iter().map(|p| p.heading.as_str()).collect();
    assert_eq!(
        headings,
        vec![
            "Radar: Category Scores",
            "Radar: Template by Position Role",
            "Radar: Custom Metrics"
        ]
    );
    assert!(out.panels[0].chart.is_some());
}
