//! Critical sections of a combined envelope
//!
//! Three global sections are extracted automatically:
//!
//! - flexure: largest `max(|M_max|, |M_min|)` of the ultimate combination
//! - shear: largest `max(|V_max|, |V_min|)` of the ultimate combination
//! - fatigue: largest `| |M_max| - |M_min| |` of the fatigue combination
//!
//! Ties keep the first station. Users may pin further sections at any
//! station inside the beam.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::envelope::{EnvelopeCase, ForceBounds, Station, StationSide, StationValue};
use crate::errors::CalcResult;

/// Identifier of a critical section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionId {
    #[serde(rename = "global-flex")]
    GlobalFlexure,
    #[serde(rename = "global-shear")]
    GlobalShear,
    #[serde(rename = "global-fatigue")]
    GlobalFatigue,
    #[serde(rename = "pinned")]
    Pinned(Uuid),
}

impl SectionId {
    pub fn is_global(&self) -> bool {
        !matches!(self, SectionId::Pinned(_))
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionId::GlobalFlexure => write!(f, "global-flex"),
            SectionId::GlobalShear => write!(f, "global-shear"),
            SectionId::GlobalFatigue => write!(f, "global-fatigue"),
            SectionId::Pinned(id) => write!(f, "pinned-{}", id),
        }
    }
}

/// A section chosen for verification, with the bounds of the envelope it
/// was taken from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalSection {
    pub id: SectionId,
    pub label: String,
    pub station: Station,
    pub forces: ForceBounds,
}

/// A user-chosen section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinnedSection {
    pub id: Uuid,
    pub label: String,
    pub x_m: f64,
    /// Side to read at a support; ignored elsewhere
    #[serde(default)]
    pub side: StationSide,
}

impl PinnedSection {
    pub fn new(label: impl Into<String>, x_m: f64) -> Self {
        PinnedSection {
            id: Uuid::new_v4(),
            label: label.into(),
            x_m,
            side: StationSide::Single,
        }
    }

    pub fn with_side(mut self, side: StationSide) -> Self {
        self.side = side;
        self
    }

    pub fn station(&self) -> Station {
        Station {
            x_m: self.x_m,
            side: self.side,
        }
    }
}

/// First sample with the largest `measure`
fn pick_max<F>(envelope: &EnvelopeCase, measure: F) -> Option<&StationValue<ForceBounds>>
where
    F: Fn(&ForceBounds) -> f64,
{
    let mut best: Option<(&StationValue<ForceBounds>, f64)> = None;
    for p in envelope.points() {
        let value = measure(&p.values);
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((p, value)),
        }
    }
    best.map(|(p, _)| p)
}

fn section_at(id: SectionId, label: &str, p: &StationValue<ForceBounds>) -> CriticalSection {
    CriticalSection {
        id,
        label: label.to_string(),
        station: p.station,
        forces: p.values,
    }
}

/// Global critical sections (flexure, shear and, when given, fatigue).
///
/// An empty ultimate envelope yields no sections.
pub fn find_critical_sections(uls: &EnvelopeCase, fatigue: Option<&EnvelopeCase>) -> Vec<CriticalSection> {
    let mut sections = Vec::new();
    let Some(flex) = pick_max(uls, ForceBounds::max_abs_moment) else {
        return sections;
    };
    sections.push(section_at(SectionId::GlobalFlexure, "Global critical - flexure", flex));

    if let Some(shear) = pick_max(uls, ForceBounds::max_abs_shear) {
        sections.push(section_at(SectionId::GlobalShear, "Global critical - shear", shear));
    }

    if let Some(fad) = fatigue {
        if let Some(fat) = pick_max(fad, ForceBounds::moment_range) {
            sections.push(section_at(SectionId::GlobalFatigue, "Global critical - fatigue", fat));
        }
    }

    for s in &sections {
        log::debug!("critical section {} at {}", s.id, s.station);
    }
    sections
}

/// Sections pinned by the user, read from `envelope`
pub fn pinned_sections(pins: &[PinnedSection], envelope: &EnvelopeCase) -> CalcResult<Vec<CriticalSection>> {
    pins.iter()
        .map(|pin| {
            Ok(CriticalSection {
                id: SectionId::Pinned(pin.id),
                label: pin.label.clone(),
                station: pin.station(),
                forces: envelope.value_at(pin.station())?,
            })
        })
        .collect()
}
