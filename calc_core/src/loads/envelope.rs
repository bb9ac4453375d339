//! Internal-force diagrams sampled at stations along the beam
//!
//! Analysis exports list stations in ascending `x`. A station repeated once
//! marks a discontinuity over a support: the first row is the limit coming
//! from the left span, the second the limit going into the right span. On
//! load that pair is tagged [`StationSide::Left`] / [`StationSide::Right`]
//! and the two rows are kept apart for every later lookup.
//!
//! # Example
//!
//! ```
//! use calc_core::loads::{DeterministicCase, DeterministicRow, Station, StationSide};
//!
//! let rows = vec![
//!     DeterministicRow { x: 0.0, v: -9.0, m: 0.0 },
//!     DeterministicRow { x: 6.0, v: 15.0, m: -19.0 },
//!     DeterministicRow { x: 6.0, v: -15.0, m: -19.0 },
//!     DeterministicRow { x: 12.0, v: 9.0, m: 0.0 },
//! ];
//! let dead = DeterministicCase::from_rows("DEAD", rows).unwrap();
//!
//! assert_eq!(dead.points()[1].station.side, StationSide::Left);
//! let right = dead.value_at(Station::right(6.0)).unwrap();
//! assert_eq!(right.v_kn, -15.0);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{ensure_finite, CalcError, CalcResult};

/// Two stations closer than this (m) are the same station
pub const STATION_TOLERANCE_M: f64 = 1e-9;

/// Which one-sided limit a station stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StationSide {
    /// Continuous point, no jump
    #[default]
    Single,
    /// Limit from the left (end of the previous span)
    Left,
    /// Limit from the right (start of the next span)
    Right,
}

/// A position along the beam
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub x_m: f64,
    #[serde(default)]
    pub side: StationSide,
}

impl Station {
    pub fn new(x_m: f64) -> Self {
        Station { x_m, side: StationSide::Single }
    }

    pub fn left(x_m: f64) -> Self {
        Station { x_m, side: StationSide::Left }
    }

    pub fn right(x_m: f64) -> Self {
        Station { x_m, side: StationSide::Right }
    }

    /// Same position (within [`STATION_TOLERANCE_M`]), any side
    pub fn same_x(&self, other: &Station) -> bool {
        (self.x_m - other.x_m).abs() <= STATION_TOLERANCE_M
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.side {
            StationSide::Single => write!(f, "x = {:.2} m", self.x_m),
            StationSide::Left => write!(f, "x = {:.2} m (left)", self.x_m),
            StationSide::Right => write!(f, "x = {:.2} m (right)", self.x_m),
        }
    }
}

/// Linear interpolation between two samples
pub trait Lerp: Copy {
    fn lerp(&self, other: &Self, t: f64) -> Self;
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Shear and moment of a deterministic case
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ForcePair {
    pub v_kn: f64,
    pub m_knm: f64,
}

impl Lerp for ForcePair {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        ForcePair {
            v_kn: lerp(self.v_kn, other.v_kn, t),
            m_knm: lerp(self.m_knm, other.m_knm, t),
        }
    }
}

/// Bounding shear and moment of an envelope or combination
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ForceBounds {
    pub m_max_knm: f64,
    pub m_min_knm: f64,
    pub v_max_kn: f64,
    pub v_min_kn: f64,
}

impl ForceBounds {
    /// `max(|M_max|, |M_min|)`
    pub fn max_abs_moment(&self) -> f64 {
        self.m_max_knm.abs().max(self.m_min_knm.abs())
    }

    /// `max(|V_max|, |V_min|)`
    pub fn max_abs_shear(&self) -> f64 {
        self.v_max_kn.abs().max(self.v_min_kn.abs())
    }

    /// `| |M_max| - |M_min| |`
    pub fn moment_range(&self) -> f64 {
        (self.m_max_knm.abs() - self.m_min_knm.abs()).abs()
    }
}

impl Lerp for ForceBounds {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        ForceBounds {
            m_max_knm: lerp(self.m_max_knm, other.m_max_knm, t),
            m_min_knm: lerp(self.m_min_knm, other.m_min_knm, t),
            v_max_kn: lerp(self.v_max_kn, other.v_max_kn, t),
            v_min_kn: lerp(self.v_min_kn, other.v_min_kn, t),
        }
    }
}

/// Values of one case at one station
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StationValue<T> {
    pub station: Station,
    pub values: T,
}

/// One exported row of a deterministic case
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeterministicRow {
    pub x: f64,
    #[serde(rename = "V")]
    pub v: f64,
    #[serde(rename = "M")]
    pub m: f64,
}

/// One exported row of an envelope
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeRow {
    pub x: f64,
    #[serde(rename = "V_max")]
    pub v_max: f64,
    #[serde(rename = "V_min")]
    pub v_min: f64,
    #[serde(rename = "M_max")]
    pub m_max: f64,
    #[serde(rename = "M_min")]
    pub m_min: f64,
}

/// Tag an ascending station list, pairing repeated positions as left/right.
fn tag_stations(case: &str, xs: &[f64]) -> CalcResult<Vec<Station>> {
    let mut stations: Vec<Station> = Vec::with_capacity(xs.len());
    for &x in xs {
        ensure_finite("x", x)?;
        if let Some(prev) = stations.last_mut() {
            let same = (x - prev.x_m).abs() <= STATION_TOLERANCE_M;
            if !same && x < prev.x_m {
                return Err(CalcError::invalid_input(
                    format!("{case}.x"),
                    x.to_string(),
                    format!("Stations must be ascending (previous x = {})", prev.x_m),
                ));
            }
            if same {
                if prev.side != StationSide::Single {
                    return Err(CalcError::invalid_input(
                        format!("{case}.x"),
                        x.to_string(),
                        "A station may appear at most twice",
                    ));
                }
                prev.side = StationSide::Left;
                let prev_x = prev.x_m;
                stations.push(Station::right(prev_x));
                continue;
            }
        }
        stations.push(Station::new(x));
    }
    Ok(stations)
}

/// Value of a sampled case at `station`.
///
/// An exact position returns the stored row, choosing the one-sided row at a
/// jump (a `Single` query on a jump reads the left limit). Positions between
/// samples are interpolated from the nearest rows on each side, so a jump is
/// never averaged.
fn value_at<T: Lerp>(case: &str, points: &[StationValue<T>], station: Station) -> CalcResult<T> {
    ensure_finite("x_m", station.x_m)?;

    let mut exact = points.iter().filter(|p| p.station.same_x(&station));
    if let Some(first) = exact.next() {
        return Ok(match (station.side, exact.next()) {
            (StationSide::Right, Some(second)) => second.values,
            _ => first.values,
        });
    }

    let upper = points.iter().position(|p| p.station.x_m > station.x_m);
    match upper {
        Some(j) if j > 0 => {
            let a = &points[j - 1];
            let b = &points[j];
            let t = (station.x_m - a.station.x_m) / (b.station.x_m - a.station.x_m);
            Ok(a.values.lerp(&b.values, t))
        }
        _ => Err(CalcError::invalid_input(
            format!("{case}.x"),
            station.x_m.to_string(),
            "Station outside the range of the load case",
        )),
    }
}

/// Deterministic case (self-weight, rail): one `V` and `M` per station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DeterministicRow>", into = "Vec<DeterministicRow>")]
pub struct DeterministicCase {
    points: Vec<StationValue<ForcePair>>,
}

impl DeterministicCase {
    pub fn from_rows(case: &str, rows: Vec<DeterministicRow>) -> CalcResult<Self> {
        let xs: Vec<f64> = rows.iter().map(|r| r.x).collect();
        let stations = tag_stations(case, &xs)?;
        let points = stations
            .into_iter()
            .zip(rows)
            .map(|(station, r)| {
                ensure_finite("V", r.v)?;
                ensure_finite("M", r.m)?;
                Ok(StationValue {
                    station,
                    values: ForcePair { v_kn: r.v, m_knm: r.m },
                })
            })
            .collect::<CalcResult<Vec<_>>>()?;
        Ok(DeterministicCase { points })
    }

    pub fn points(&self) -> &[StationValue<ForcePair>] {
        &self.points
    }

    pub fn stations(&self) -> Vec<Station> {
        self.points.iter().map(|p| p.station).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn value_at(&self, station: Station) -> CalcResult<ForcePair> {
        value_at("deterministic", &self.points, station)
    }

    /// First and last station positions (m)
    pub fn x_range(&self) -> Option<(f64, f64)> {
        Some((self.points.first()?.station.x_m, self.points.last()?.station.x_m))
    }
}

impl TryFrom<Vec<DeterministicRow>> for DeterministicCase {
    type Error = CalcError;

    fn try_from(rows: Vec<DeterministicRow>) -> Result<Self, Self::Error> {
        DeterministicCase::from_rows("deterministic", rows)
    }
}

impl From<DeterministicCase> for Vec<DeterministicRow> {
    fn from(case: DeterministicCase) -> Self {
        case.points
            .iter()
            .map(|p| DeterministicRow {
                x: p.station.x_m,
                v: p.values.v_kn,
                m: p.values.m_knm,
            })
            .collect()
    }
}

/// Enveloping case: bounds of `V` and `M` per station
///
/// Used for the moving-load envelope and for every combination built from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<EnvelopeRow>", into = "Vec<EnvelopeRow>")]
pub struct EnvelopeCase {
    points: Vec<StationValue<ForceBounds>>,
}

impl EnvelopeCase {
    pub fn from_rows(case: &str, rows: Vec<EnvelopeRow>) -> CalcResult<Self> {
        let xs: Vec<f64> = rows.iter().map(|r| r.x).collect();
        let stations = tag_stations(case, &xs)?;
        let points = stations
            .into_iter()
            .zip(rows)
            .map(|(station, r)| {
                for (field, value) in [("V_max", r.v_max), ("V_min", r.v_min), ("M_max", r.m_max), ("M_min", r.m_min)] {
                    ensure_finite(field, value)?;
                }
                Ok(StationValue {
                    station,
                    values: ForceBounds {
                        m_max_knm: r.m_max,
                        m_min_knm: r.m_min,
                        v_max_kn: r.v_max,
                        v_min_kn: r.v_min,
                    },
                })
            })
            .collect::<CalcResult<Vec<_>>>()?;
        Ok(EnvelopeCase { points })
    }

    /// Envelope over already-tagged stations
    pub(crate) fn from_points(points: Vec<StationValue<ForceBounds>>) -> Self {
        EnvelopeCase { points }
    }

    pub fn points(&self) -> &[StationValue<ForceBounds>] {
        &self.points
    }

    pub fn stations(&self) -> Vec<Station> {
        self.points.iter().map(|p| p.station).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn value_at(&self, station: Station) -> CalcResult<ForceBounds> {
        value_at("envelope", &self.points, station)
    }

    pub fn x_range(&self) -> Option<(f64, f64)> {
        Some((self.points.first()?.station.x_m, self.points.last()?.station.x_m))
    }

    /// Samples inside one span as `(x from the span start, bounds)`.
    ///
    /// At a shared support only the limit belonging to this span is kept:
    /// the right-hand row at the start, the left-hand row at the end.
    pub fn span_series(&self, span: &Span) -> Vec<(f64, ForceBounds)> {
        let tol = STATION_TOLERANCE_M;
        self.points
            .iter()
            .filter(|p| {
                let x = p.station.x_m;
                if x < span.start_m - tol || x > span.end_m + tol {
                    return false;
                }
                let at_start = (x - span.start_m).abs() <= tol;
                let at_end = (x - span.end_m).abs() <= tol;
                !(at_start && p.station.side == StationSide::Left)
                    && !(at_end && p.station.side == StationSide::Right)
            })
            .map(|p| ((p.station.x_m - span.start_m).max(0.0), p.values))
            .collect()
    }
}

impl TryFrom<Vec<EnvelopeRow>> for EnvelopeCase {
    type Error = CalcError;

    fn try_from(rows: Vec<EnvelopeRow>) -> Result<Self, Self::Error> {
        EnvelopeCase::from_rows("envelope", rows)
    }
}

impl From<EnvelopeCase> for Vec<EnvelopeRow> {
    fn from(case: EnvelopeCase) -> Self {
        case.points
            .iter()
            .map(|p| EnvelopeRow {
                x: p.station.x_m,
                v_max: p.values.v_max_kn,
                v_min: p.values.v_min_kn,
                m_max: p.values.m_max_knm,
                m_min: p.values.m_min_knm,
            })
            .collect()
    }
}

/// One span (frame) of the continuous beam
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub label: String,
    pub start_m: f64,
    pub end_m: f64,
}

impl Span {
    pub fn new(label: impl Into<String>, start_m: f64, end_m: f64) -> CalcResult<Self> {
        let span = Span {
            label: label.into(),
            start_m,
            end_m,
        };
        span.validate()?;
        Ok(span)
    }

    pub fn validate(&self) -> CalcResult<()> {
        ensure_finite("start_m", self.start_m)?;
        ensure_finite("end_m", self.end_m)?;
        if self.end_m <= self.start_m {
            return Err(CalcError::invalid_input(
                "end_m",
                self.end_m.to_string(),
                format!("Span '{}' must end after it starts ({} m)", self.label, self.start_m),
            ));
        }
        Ok(())
    }

    pub fn length_m(&self) -> f64 {
        self.end_m - self.start_m
    }

    pub fn contains(&self, x_m: f64) -> bool {
        x_m >= self.start_m - STATION_TOLERANCE_M && x_m <= self.end_m + STATION_TOLERANCE_M
    }
}
