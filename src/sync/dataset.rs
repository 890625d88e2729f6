//! Dataset generation: `/plot-system` request and response schema.
//!
//! The backend simulates one of a fixed set of dynamical systems and returns
//! the output trajectory `Y` as rows of floats. Rows are validated here, at
//! the boundary, so the rest of the crate only sees well-formed `(x, y)`
//! points.

#[cfg(test)]
#[path = "dataset_test.rs"]
mod dataset_test;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::SyncError;

/// Simulated systems the backend knows how to generate data for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DynamicalSystem {
    VanDerPol,
    LorenzSystem,
    Pendulum,
    DoublePendulum,
    LotkaVolterra,
}

impl DynamicalSystem {
    pub const ALL: [Self; 5] =
        [Self::VanDerPol, Self::LorenzSystem, Self::Pendulum, Self::DoublePendulum, Self::LotkaVolterra];

    /// Name as the backend spells it.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::VanDerPol => "VanDerPol",
            Self::LorenzSystem => "LorenzSystem",
            Self::Pendulum => "Pendulum",
            Self::DoublePendulum => "DoublePendulum",
            Self::LotkaVolterra => "LotkaVolterra",
        }
    }
}

impl std::fmt::Display for DynamicalSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DynamicalSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|system| system.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown dynamical system: {s}"))
    }
}

/// Body of `POST /plot-system`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotRequest {
    /// Id the backend files the dataset under; becomes the block's instance id.
    pub id: String,
    pub system: DynamicalSystem,
    pub num_simulations: u32,
}

impl PlotRequest {
    /// # Errors
    ///
    /// Returns `InvalidRequest` if `num_simulations` is zero.
    pub fn new(id: impl Into<String>, system: DynamicalSystem, num_simulations: u32) -> Result<Self, SyncError> {
        if num_simulations == 0 {
            return Err(SyncError::InvalidRequest("numSimulations must be positive".into()));
        }
        Ok(Self { id: id.into(), system, num_simulations })
    }
}

/// Validated trajectory returned by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSeries {
    /// First two output channels of every simulated step.
    pub points: Vec<(f64, f64)>,
    /// State dimension reported by the backend, when present.
    pub nx: Option<u32>,
}

#[derive(Deserialize)]
struct PlotResponse {
    #[serde(rename = "Y_data")]
    y_data: YData,
    #[serde(default)]
    nx: Option<u32>,
}

#[derive(Deserialize)]
struct YData {
    #[serde(rename = "Y")]
    y: Vec<Vec<f64>>,
}

/// Parse and validate a `/plot-system` response body.
///
/// # Errors
///
/// Returns `InvalidResponse` if the body is not the expected JSON shape or a
/// row has fewer than two columns.
pub fn parse_plot_response(body: &str) -> Result<DatasetSeries, SyncError> {
    let response: PlotResponse =
        serde_json::from_str(body).map_err(|e| SyncError::InvalidResponse(e.to_string()))?;

    let points = response
        .y_data
        .y
        .iter()
        .enumerate()
        .map(|(i, row)| match row.as_slice() {
            [x, y, ..] => Ok((*x, *y)),
            _ => Err(SyncError::InvalidResponse(format!("Y row {i} has {} columns, expected at least 2", row.len()))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DatasetSeries { points, nx: response.nx })
}
