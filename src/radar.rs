// Radar polygons: the four-metric summary view of a matchup.
//
// Pure data transform. Each team's metric values become a closed polygon of
// (angle, value) vertices over evenly spaced axes; the chart widget decides
// how to project and scale them. Missing or non-numeric metric values fail
// the radar view only, never the comparison it accompanies.

use std::f64::consts::TAU;

use thiserror::Error;

use crate::matchup::TeamRecord;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum RadarError {
    #[error("team `{team}` has no `{dataset}` row to build a radar from")]
    DatasetMissing { team: String, dataset: String },

    #[error("field `{field}` is missing for team `{team}`")]
    FieldMissing { team: String, field: String },

    #[error("field `{field}` is not numeric for team `{team}`")]
    NotNumeric { team: String, field: String },
}

// ---------------------------------------------------------------------------
// Shapes
// ---------------------------------------------------------------------------

/// One team's closed polygon: `(angle, value)` pairs with the first vertex
/// repeated at angle TAU to close the loop.
#[derive(Debug, Clone, PartialEq)]
pub struct RadarShape {
    pub team: String,
    pub points: Vec<(f64, f64)>,
}

/// Both teams' polygons plus the shared axis labels, in metric order.
#[derive(Debug, Clone, PartialEq)]
pub struct RadarPair {
    pub axes: Vec<String>,
    pub shapes: [RadarShape; 2],
}

/// Build one team's polygon from its row in the given dataset.
pub fn build_shape(
    record: &TeamRecord,
    dataset: &str,
    metrics: &[String],
) -> Result<RadarShape, RadarError> {
    let entry = record
        .get(dataset)
        .ok_or_else(|| RadarError::DatasetMissing {
            team: record.team.clone(),
            dataset: dataset.to_string(),
        })?;

    let step = TAU / metrics.len() as f64;
    let mut points = Vec::with_capacity(metrics.len() + 1);

    for (i, metric) in metrics.iter().enumerate() {
        let value = match entry.row.get(metric) {
            None => {
                return Err(RadarError::FieldMissing {
                    team: record.team.clone(),
                    field: metric.clone(),
                })
            }
            Some(v) if v.is_missing() => {
                return Err(RadarError::FieldMissing {
                    team: record.team.clone(),
                    field: metric.clone(),
                })
            }
            Some(v) => v.as_number().ok_or_else(|| RadarError::NotNumeric {
                team: record.team.clone(),
                field: metric.clone(),
            })?,
        };
        points.push((i as f64 * step, value));
    }

    // Close the loop: same value as the first vertex, one full turn later.
    if let Some(&(_, first_value)) = points.first() {
        points.push((TAU, first_value));
    }

    Ok(RadarShape {
        team: record.team.clone(),
        points,
    })
}

/// Build the matched pair of polygons for a two-team radar view.
pub fn build_matchup_radar(
    record_a: &TeamRecord,
    record_b: &TeamRecord,
    dataset: &str,
    metrics: &[String],
) -> Result<RadarPair, RadarError> {
    let shape_a = build_shape(record_a, dataset, metrics)?;
    let shape_b = build_shape(record_b, dataset, metrics)?;
    Ok(RadarPair {
        axes: metrics.to_vec(),
        shapes: [shape_a, shape_b],
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
