use tracing::warn;

use crate::dataset::{ColumnKind, Table};
use crate::error::{RadarError, Result};
use crate::radar::AxisSpec;

/// Pre-aggregated 0-100 category scores.
pub const CATEGORY_PREFIX: &str = "cat.";
/// Per-90 and ratio statistics on their own scales.
pub const RAW_METRIC_PREFIX: &str = "player_season_";

/// Storage key -> human label. Only used to resolve position templates and to
/// label raw metric axes.
pub static RENAMES: &[(&str, &str)] = &[
    ("player_season_appearances", "Games Played"),
    ("player_season_ot_shots_faced_ratio", "Shots Against on Target Ratio"),
    ("player_season_gsaa_ratio", "Goals Saved Above Average Ratio"),
    ("player_season_save_ratio", "Save Ratio"),
    ("player_season_np_optimal_gk_dlength", "Ideal Distance from Goal Line"),
    ("player_season_clcaa", "Claimables Collected Above Average"),
    ("player_season_aerial_ratio", "Aerial Ratio"),
    ("player_season_defensive_actions_90", "Defensive Actions"),
    ("player_season_ball_recoveries_90", "Recoveries"),
    ("player_season_padj_interceptions_90", "Interceptions"),
    ("player_season_blocks_per_shot", "Blocks per Shot"),
    ("player_season_dribbled_past_90_inverse", "Dribbled Past"),
    ("player_season_fouls_90_inverse", "Fouls"),
    ("player_season_deep_progressions_90", "Deep Progressions"),
    ("player_season_deep_completions_90", "Deep Completions"),
    ("player_season_long_ball_ratio", "Long Ball Ratio"),
    ("player_season_pressured_passing_ratio", "Pressured Passing Ratio"),
    ("player_season_passing_ratio", "Passing Ratio"),
    ("player_season_np_xg_90", "nPK xG"),
    ("player_season_np_shots_90", "nPK Shots"),
    ("player_season_padj_tackles_90", "Tackles"),
    ("player_season_challenge_ratio", "Tackle Ratio"),
    ("player_season_crosses_90", "Crosses"),
    ("player_season_crossing_ratio", "Crossing Ratio"),
    ("player_season_key_passes_90", "Key Passes"),
    ("player_season_xa_90", "xA"),
    ("player_season_dribble_ratio", "Dribble Ratio"),
    ("player_season_op_f3_passes_90", "OP Passes into Final Third"),
    ("player_season_sp_xa_90", "Set Piece xA"),
    ("player_season_padj_pressures_90", "Pressures"),
    ("player_season_pressure_regains_90", "Pressure Regains"),
    ("player_season_shot_on_target_ratio", "Shots on Target Ratio"),
    ("player_season_conversion_ratio", "Goal Conversion Ratio"),
    ("player_season_npxgxa_90", "nPK xG + xA"),
    ("player_season_dribbles_90", "Dribbles"),
    ("player_season_fouls_won_90", "Fouls Won"),
    ("player_season_touches_inside_box_90", "Touches Inside Box"),
    ("player_season_npg_90", "nPK Goals"),
    ("player_season_turnovers_90_inverse", "Turnovers"),
    ("player_season_op_passes_into_box_90", "OP Passes into Box"),
    ("player_season_aerial_wins_90", "Aerial Duels Won"),
];

/// A curated, ordered list of display labels for one playing position.
/// Order is the vertex order of the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionTemplate {
    pub role_name: &'static str,
    pub ordered_metrics: &'static [&'static str],
}

pub static POSITION_TEMPLATES: &[PositionTemplate] = &[
    PositionTemplate {
        role_name: "CB (Centre Back)",
        ordered_metrics: &[
            "Games Played",
            "Aerial Ratio",
            "Defensive Actions",
            "Recoveries",
            "Interceptions",
            "Blocks per Shot",
            "Dribbled Past",
            "Fouls",
            "Deep Progressions",
            "Deep Completions",
            "Long Ball Ratio",
            "Passing Ratio",
            "Pressured Passing Ratio",
            "nPK xG",
            "nPK Shots",
        ],
    },
    PositionTemplate {
        role_name: "FB (Full Back)",
        ordered_metrics: &[
            "Games Played",
            "Interceptions",
            "Recoveries",
            "Blocks per Shot",
            "Tackles",
            "Tackle Ratio",
            "Dribbled Past",
            "Fouls",
            "Aerial Ratio",
            "Deep Progressions",
            "Deep Completions",
            "Crosses",
            "Crossing Ratio",
            "Key Passes",
            "xA",
            "Dribble Ratio",
            "OP Passes into Final Third",
        ],
    },
    PositionTemplate {
        role_name: "WM (Wide Midfielder)",
        ordered_metrics: &[
            "Games Played",
            "Tackles",
            "Tackle Ratio",
            "Pressures",
            "Pressure Regains",
            "Deep Progressions",
            "Crosses",
            "Crossing Ratio",
            "OP Passes into Final Third",
            "Key Passes",
            "xA",
            "Dribbles",
            "Dribble Ratio",
            "Touches Inside Box",
            "Fouls Won",
            "nPK Shots",
            "Shots on Target Ratio",
            "Goal Conversion Ratio",
            "nPK xG",
            "nPK xG + xA",
        ],
    },
    PositionTemplate {
        role_name: "CMD (Central Mid Defensive)",
        ordered_metrics: &[
            "Games Played",
            "Aerial Ratio",
            "Defensive Actions",
            "Recoveries",
            "Interceptions",
            "Tackles",
            "Tackle Ratio",
            "Fouls",
            "Dribble Ratio",
            "Deep Progressions",
            "Deep Completions",
            "Long Ball Ratio",
            "Passing Ratio",
            "Pressured Passing Ratio",
            "OP Passes into Final Third",
            "Key Passes",
            "xA",
            "Set Piece xA",
        ],
    },
    PositionTemplate {
        role_name: "CMA (Central Mid Attacking)",
        ordered_metrics: &[
            "Games Played",
            "Aerial Ratio",
            "Defensive Actions",
            "Interceptions",
            "Tackles",
            "Tackle Ratio",
            "Deep Progressions",
            "OP Passes into Final Third",
            "Key Passes",
            "xA",
            "Fouls Won",
            "Dribbles",
            "Dribble Ratio",
            "nPK Shots",
            "Shots on Target Ratio",
            "Goal Conversion Ratio",
            "nPK xG + xA",
            "Set Piece xA",
        ],
    },
    PositionTemplate {
        role_name: "CF (Centre Forward)",
        ordered_metrics: &[
            "nPK xG",
            "nPK Goals",
            "Shots on Target Ratio",
            "Aerial Duels Won",
        ],
    },
    PositionTemplate {
        role_name: "ST (Striker)",
        ordered_metrics: &[
            "Games Played",
            "nPK Shots",
            "Shots on Target Ratio",
            "nPK Goals",
            "nPK xG",
            "Goal Conversion Ratio",
            "Dribble Ratio",
            "Touches Inside Box",
            "Turnovers",
            "Fouls Won",
            "OP Passes into Box",
            "xA",
            "Aerial Duels Won",
            "Aerial Ratio",
            "Tackles",
            "Pressures",
            "Pressure Regains",
        ],
    },
    PositionTemplate {
        role_name: "GK (Goalkeeper)",
        ordered_metrics: &[
            "Games Played",
            "Shots Against on Target Ratio",
            "Goals Saved Above Average Ratio",
            "Save Ratio",
            "Ideal Distance from Goal Line",
            "Claimables Collected Above Average",
            "Pressured Passing Ratio",
            "Passing Ratio",
            "Deep Progressions",
            "Long Balls",
            "Long Ball Ratio",
        ],
    },
];

pub fn category_columns(table: &Table) -> Vec<&str> {
    table.keys_of_kind(ColumnKind::Category)
}

pub fn raw_metric_columns(table: &Table) -> Vec<&str> {
    table.keys_of_kind(ColumnKind::Raw)
}

/// Mapped label, or the key itself when the rename table has no entry.
pub fn display_label(key: &str) -> &str {
    RENAMES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, label)| *label)
        .unwrap_or(key)
}

pub fn label_to_key(label: &str) -> Option<&'static str> {
    RENAMES
        .iter()
        .find(|(_, l)| *l == label)
        .map(|(key, _)| *key)
}

pub fn position_templates() -> &'static [PositionTemplate] {
    POSITION_TEMPLATES
}

pub fn template(role_name: &str) -> Option<&'static PositionTemplate> {
    POSITION_TEMPLATES.iter().find(|t| t.role_name == role_name)
}

pub fn role_names() -> impl Iterator<Item = &'static str> {
    POSITION_TEMPLATES.iter().map(|t| t.role_name)
}

/// A template whose labels have been mapped back onto table columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTemplate {
    pub role_name: &'static str,
    pub columns: Vec<AxisSpec>,
    /// Labels with no rename entry or no matching numeric column in the table.
    pub missing: Vec<&'static str>,
}

pub fn resolve_template(role_name: &str, table: &Table) -> Result<ResolvedTemplate> {
    let template =
        template(role_name).ok_or_else(|| RadarError::UnknownRole(role_name.to_string()))?;

    let mut columns = Vec::with_capacity(template.ordered_metrics.len());
    let mut missing = Vec::new();
    for label in template.ordered_metrics {
        match label_to_key(label) {
            Some(key) if table.numeric(key).is_some() => {
                columns.push(AxisSpec::new(key, *label));
            }
            _ => missing.push(*label),
        }
    }
    if !missing.is_empty() {
        warn!(
            role = template.role_name,
            missing = ?missing,
            "template labels without a dataset column"
        );
    }

    Ok(ResolvedTemplate {
        role_name: template.role_name,
        columns,
        missing,
    })
}
