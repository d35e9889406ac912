use std::f64::consts::TAU;

use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog;
use crate::dataset::Table;
use crate::error::{RadarError, Result};

pub const RADIAL_MAX: f64 = 100.0;
pub const RADIAL_TICKS: [f64; 5] = [20.0, 40.0, 60.0, 80.0, 100.0];
pub const MIN_AXES: usize = 3;

/// One requested axis: the storage key to read and the label to print.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AxisSpec {
    pub key: String,
    pub label: String,
}

impl AxisSpec {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }

    pub fn from_key(key: &str) -> Self {
        Self::new(key, catalog::display_label(key))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarAxis {
    pub key: String,
    pub label: String,
    /// Radians, 0 at the top, increasing clockwise.
    pub angle: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RadarPoint {
    pub angle: f64,
    pub value: Option<f64>,
}

impl RadarPoint {
    /// Position on a unit-radius chart, clipped to [0, max]. `None` for a gap.
    pub fn unit_xy(&self, max: f64) -> Option<(f64, f64)> {
        self.value.map(|v| polar_to_unit_xy(self.angle, v, max))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarSeries {
    pub player: String,
    /// Position of the player in the selection; drives colour so a player keeps
    /// the same identity across charts even when another one is skipped.
    pub slot: usize,
    /// Closed polygon: the first vertex is repeated at the end.
    pub points: Vec<RadarPoint>,
}

impl RadarSeries {
    pub fn vertex_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    pub fn values(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.points[..self.vertex_count()].iter().map(|p| p.value)
    }
}

/// Renderable spider chart. Display is left to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarChart {
    pub title: String,
    pub axes: Vec<RadarAxis>,
    pub series: Vec<RadarSeries>,
    pub radial_max: f64,
    pub ticks: Vec<f64>,
}

impl RadarChart {
    pub fn polygon_count(&self) -> usize {
        self.series.len()
    }

    pub fn axis_labels(&self) -> Vec<&str> {
        self.axes.iter().map(|a| a.label.as_str()).collect()
    }
}

/// `n` angles spaced `2π / n` apart, starting at 0.
pub fn axis_angles(n: usize) -> Vec<f64> {
    (0..n).map(|i| TAU * i as f64 / n as f64).collect()
}

/// Angle 0 sits at the top and angles run clockwise, so x uses sin and y cos.
pub fn polar_to_unit_xy(angle: f64, value: f64, max: f64) -> (f64, f64) {
    let r = if max > 0.0 {
        (value / max).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (r * angle.sin(), r * angle.cos())
}

pub fn render<S: AsRef<str>>(
    players: &[S],
    columns: &[AxisSpec],
    title: &str,
    table: &Table,
) -> Result<RadarChart> {
    if columns.len() < MIN_AXES {
        return Err(RadarError::InsufficientAxes {
            got: columns.len(),
            min: MIN_AXES,
        });
    }
    for axis in columns {
        match table.column(&axis.key) {
            None => return Err(RadarError::UnknownColumn(axis.key.clone())),
            Some(c) if c.numeric().is_none() => {
                return Err(RadarError::NonNumericColumn(axis.key.clone()));
            }
            Some(_) => {}
        }
    }

    let angles = axis_angles(columns.len());
    let axes: Vec<RadarAxis> = columns
        .iter()
        .zip(&angles)
        .map(|(spec, angle)| RadarAxis {
            key: spec.key.clone(),
            label: spec.label.clone(),
            angle: *angle,
        })
        .collect();

    let mut series = Vec::with_capacity(players.len());
    for (slot, player) in players.iter().enumerate() {
        let player = player.as_ref();
        let Some(row) = table.find_player(player) else {
            // Exact-match miss; name formatting differences are not reconciled.
            warn!(player, "selected player not found in table, skipping");
            continue;
        };
        let mut points: Vec<RadarPoint> = axes
            .iter()
            .map(|axis| RadarPoint {
                angle: axis.angle,
                value: row.value(&axis.key),
            })
            .collect();
        if let Some(first) = points.first().copied() {
            points.push(first);
        }
        series.push(RadarSeries {
            player: player.to_string(),
            slot,
            points,
        });
    }

    debug!(
        title,
        axes = axes.len(),
        polygons = series.len(),
        "radar chart built"
    );

    Ok(RadarChart {
        title: title.to_string(),
        axes,
        series,
        radial_max: RADIAL_MAX,
        ticks: RADIAL_TICKS.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_axis_points_up_and_second_turns_clockwise() {
        let angles = axis_angles(4);
        let (x0, y0) = polar_to_unit_xy(angles[0], 100.0, 100.0);
        assert!(x0.abs() < 1e-9 && (y0 - 1.0).abs() < 1e-9);
        let (x1, y1) = polar_to_unit_xy(angles[1], 100.0, 100.0);
        assert!((x1 - 1.0).abs() < 1e-9 && y1.abs() < 1e-9);
    }

    #[test]
    fn values_outside_scale_are_clipped() {
        let (_, y) = polar_to_unit_xy(0.0, 250.0, 100.0);
        assert!((y - 1.0).abs() < 1e-9);
        let (_, y) = polar_to_unit_xy(0.0, -5.0, 100.0);
        assert_eq!(y, 0.0);
    }
}
