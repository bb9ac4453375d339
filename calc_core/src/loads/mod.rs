//! Load cases, combinations and critical sections
//!
//! The frame analysis supplies three cases along the beam: self-weight
//! (`DEAD`), rail (`TRILHO`) and the moving-load envelope (`ENV_MOVEL`).
//! This module combines them into the ultimate, fatigue and service
//! combinations and extracts the sections to verify.
//!
//! # Overview
//!
//! - [`LoadCaseId`] - identifiers of input cases and combinations
//! - [`DeterministicCase`] / [`EnvelopeCase`] - diagrams sampled at tagged stations
//! - [`LoadCombination`] / [`CombinationSettings`] - partial factors and ψ
//! - [`LoadStore`] - the three input cases plus the spans of the beam
//! - [`find_critical_sections`] - governing stations of the combinations
//!
//! # Example
//!
//! ```
//! use calc_core::loads::{CombinationSettings, LoadCaseId, LoadStore, Station};
//!
//! let store = LoadStore::sample().unwrap();
//! let elu = store.combined(LoadCaseId::Elu, &CombinationSettings::default()).unwrap();
//!
//! // The support moment is read from the left limit of the repeated station
//! let support = elu.value_at(Station::left(6.0)).unwrap();
//! assert!(support.m_min_knm < -130.0);
//! ```

pub mod combinations;
pub mod critical;
pub mod envelope;
pub mod load_types;

pub use combinations::{combine, nbr6118_combinations, CombinationSettings, DynamicCoefficients, LoadCombination};
pub use critical::{find_critical_sections, pinned_sections, CriticalSection, PinnedSection, SectionId};
pub use envelope::{
    DeterministicCase, DeterministicRow, EnvelopeCase, EnvelopeRow, ForceBounds, ForcePair, Span, Station,
    StationSide, StationValue,
};
pub use load_types::LoadCaseId;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use envelope::STATION_TOLERANCE_M;

/// Data of one load case as returned by a [`LoadCaseSource`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "rows")]
pub enum LoadCaseData {
    Deterministic(DeterministicCase),
    Envelope(EnvelopeCase),
}

impl LoadCaseData {
    pub fn stations(&self) -> Vec<Station> {
        match self {
            LoadCaseData::Deterministic(c) => c.stations(),
            LoadCaseData::Envelope(c) => c.stations(),
        }
    }

    pub fn as_envelope(&self) -> Option<&EnvelopeCase> {
        match self {
            LoadCaseData::Envelope(c) => Some(c),
            LoadCaseData::Deterministic(_) => None,
        }
    }
}

/// Anything that can hand out load cases by identifier
pub trait LoadCaseSource {
    fn load_case(&self, id: LoadCaseId) -> CalcResult<LoadCaseData>;
}

/// The three input cases of a beam and its spans
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadStore {
    pub spans: Vec<Span>,
    #[serde(rename = "DEAD")]
    pub dead: DeterministicCase,
    #[serde(rename = "TRILHO")]
    pub trilho: DeterministicCase,
    #[serde(rename = "ENV_MOVEL")]
    pub mobile: EnvelopeCase,
}

/// Headline values of the ultimate combination
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeSummary {
    pub total_length_m: f64,
    pub span_count: usize,
    pub max_m_max_knm: f64,
    pub min_m_min_knm: f64,
    pub max_abs_v_kn: f64,
}

static SAMPLE_BEAM: Lazy<CalcResult<LoadStore>> = Lazy::new(|| {
    let store: LoadStore = serde_json::from_str(include_str!("../../data/sample_beam.json"))?;
    store.validate()?;
    Ok(store)
});

impl LoadStore {
    pub fn new(spans: Vec<Span>, dead: DeterministicCase, trilho: DeterministicCase, mobile: EnvelopeCase) -> CalcResult<Self> {
        let store = LoadStore {
            spans,
            dead,
            trilho,
            mobile,
        };
        store.validate()?;
        Ok(store)
    }

    /// Two-span rail beam (2 × 6 m) used in examples and tests
    pub fn sample() -> CalcResult<LoadStore> {
        SAMPLE_BEAM.clone()
    }

    /// Spans must be contiguous and cover every station of the moving load.
    pub fn validate(&self) -> CalcResult<()> {
        if self.spans.is_empty() {
            return Err(CalcError::missing_field("spans"));
        }
        for span in &self.spans {
            span.validate()?;
        }
        for pair in self.spans.windows(2) {
            if (pair[1].start_m - pair[0].end_m).abs() > STATION_TOLERANCE_M {
                return Err(CalcError::invalid_input(
                    "spans",
                    format!("{} / {}", pair[0].label, pair[1].label),
                    "Spans must be contiguous",
                ));
            }
        }
        if self.mobile.is_empty() {
            return Err(CalcError::missing_field(LoadCaseId::EnvMovel.code()));
        }
        let (start, end) = self.extent();
        if let Some((lo, hi)) = self.mobile.x_range() {
            if lo < start - STATION_TOLERANCE_M || hi > end + STATION_TOLERANCE_M {
                return Err(CalcError::invalid_input(
                    LoadCaseId::EnvMovel.code(),
                    format!("[{lo}, {hi}]"),
                    format!("Stations outside the beam [{start}, {end}]"),
                ));
            }
        }
        let stations = self.mobile.stations();
        for span in &self.spans {
            for x in [span.start_m, span.end_m] {
                if !stations.iter().any(|s| (s.x_m - x).abs() <= STATION_TOLERANCE_M) {
                    return Err(CalcError::invalid_input(
                        LoadCaseId::EnvMovel.code(),
                        x.to_string(),
                        format!("No station at the support of span '{}'", span.label),
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    fn extent(&self) -> (f64, f64) {
        let start = self.spans.first().map_or(0.0, |s| s.start_m);
        let end = self.spans.last().map_or(0.0, |s| s.end_m);
        (start, end)
    }

    pub fn total_length_m(&self) -> f64 {
        let (start, end) = self.extent();
        end - start
    }

    /// One combination over the stations of the moving-load envelope
    pub fn combined(&self, kind: LoadCaseId, settings: &CombinationSettings) -> CalcResult<EnvelopeCase> {
        settings.validate()?;
        let combo = settings.combination(kind)?;
        combine(&combo, &settings.dynamic, &self.dead, &self.trilho, &self.mobile)
    }

    /// Bind combination settings so the store can serve combinations too
    pub fn with_settings<'a>(&'a self, settings: &'a CombinationSettings) -> CombinedLoads<'a> {
        CombinedLoads { store: self, settings }
    }

    pub fn summary(&self, settings: &CombinationSettings) -> CalcResult<EnvelopeSummary> {
        let elu = self.combined(LoadCaseId::Elu, settings)?;
        let values = elu.points().iter().map(|p| p.values);
        let mut summary = EnvelopeSummary {
            total_length_m: self.total_length_m(),
            span_count: self.spans.len(),
            max_m_max_knm: f64::NEG_INFINITY,
            min_m_min_knm: f64::INFINITY,
            max_abs_v_kn: 0.0,
        };
        for v in values {
            summary.max_m_max_knm = summary.max_m_max_knm.max(v.m_max_knm);
            summary.min_m_min_knm = summary.min_m_min_knm.min(v.m_min_knm);
            summary.max_abs_v_kn = summary.max_abs_v_kn.max(v.max_abs_shear());
        }
        Ok(summary)
    }
}

/// A [`LoadStore`] together with the settings used to build combinations
#[derive(Debug, Clone, Copy)]
pub struct CombinedLoads<'a> {
    store: &'a LoadStore,
    settings: &'a CombinationSettings,
}

impl LoadCaseSource for CombinedLoads<'_> {
    fn load_case(&self, id: LoadCaseId) -> CalcResult<LoadCaseData> {
        match id {
            LoadCaseId::Dead => Ok(LoadCaseData::Deterministic(self.store.dead.clone())),
            LoadCaseId::Trilho => Ok(LoadCaseData::Deterministic(self.store.trilho.clone())),
            LoadCaseId::EnvMovel => Ok(LoadCaseData::Envelope(self.store.mobile.clone())),
            combo => self.store.combined(combo, self.settings).map(LoadCaseData::Envelope),
        }
    }
}

impl LoadCaseSource for LoadStore {
    fn load_case(&self, id: LoadCaseId) -> CalcResult<LoadCaseData> {
        let settings = CombinationSettings::default();
        self.with_settings(&settings).load_case(id)
    }
}
