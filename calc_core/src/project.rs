//! # Project Data Structures
//!
//! The `Project` struct is the root container for all verification data.
//! Projects serialize to `.rcp` files as human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! Project
//! ├── meta: ProjectMetadata (version, engineer, job info, timestamps)
//! ├── settings: GlobalSettings (design code, default materials and factors)
//! └── items: HashMap<Uuid, CalculationItem> (beams and single sections)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use calc_core::project::Project;
//!
//! let project = Project::new("Ana Engenheira", "26-017", "Porto Norte");
//!
//! // Serialize to JSON (see file_io for atomic saves)
//! let json = serde_json::to_string_pretty(&project).unwrap();
//! assert!(json.contains("NBR 6118:2023"));
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculations::beam_check::BeamCheckInput;
use crate::calculations::CalculationItem;
use crate::errors::CalcResult;
use crate::loads::CombinationSettings;
use crate::materials::MaterialSpec;

/// Current schema version for .rcp files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Design code the verifications follow
pub const DESIGN_CODE: &str = "NBR 6118:2023";

/// Root project container.
///
/// Items are stored in a flat UUID-keyed map; use [`Project::items_by_label`]
/// for a stable presentation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub meta: ProjectMetadata,
    pub settings: GlobalSettings,
    pub items: HashMap<Uuid, CalculationItem>,
}

impl Project {
    /// Create a new empty project.
    ///
    /// # Example
    ///
    /// ```rust
    /// use calc_core::project::Project;
    ///
    /// let project = Project::new("John Doe", "26-001", "Client Corp");
    /// assert_eq!(project.meta.engineer, "John Doe");
    /// assert_eq!(project.item_count(), 0);
    /// ```
    pub fn new(engineer: impl Into<String>, job_id: impl Into<String>, client: impl Into<String>) -> Self {
        let now = Utc::now();
        Project {
            meta: ProjectMetadata {
                version: SCHEMA_VERSION.to_string(),
                engineer: engineer.into(),
                job_id: job_id.into(),
                client: client.into(),
                created: now,
                modified: now,
            },
            settings: GlobalSettings::default(),
            items: HashMap::new(),
        }
    }

    /// A project holding the built-in two-span rail beam
    pub fn sample() -> CalcResult<Self> {
        let mut project = Project::new("", "SAMPLE", "");
        project.add_item(CalculationItem::Beam(BeamCheckInput::sample()?));
        Ok(project)
    }

    /// Add a calculation item; returns the UUID assigned to it.
    ///
    /// # Example
    ///
    /// ```rust
    /// use calc_core::project::Project;
    /// use calc_core::calculations::{BeamCheckInput, CalculationItem};
    ///
    /// let mut project = Project::new("Engineer", "26-001", "Client");
    /// let id = project.add_item(CalculationItem::Beam(BeamCheckInput::sample().unwrap()));
    /// assert!(project.items.contains_key(&id));
    /// ```
    pub fn add_item(&mut self, item: CalculationItem) -> Uuid {
        let id = Uuid::new_v4();
        self.items.insert(id, item);
        self.touch();
        id
    }

    /// Remove a calculation item by UUID.
    pub fn remove_item(&mut self, id: &Uuid) -> Option<CalculationItem> {
        let item = self.items.remove(id);
        if item.is_some() {
            self.touch();
        }
        item
    }

    pub fn get_item(&self, id: &Uuid) -> Option<&CalculationItem> {
        self.items.get(id)
    }

    /// Mutable access; marks the project as modified when the item exists.
    pub fn get_item_mut(&mut self, id: &Uuid) -> Option<&mut CalculationItem> {
        if self.items.contains_key(id) {
            self.meta.modified = Utc::now();
            self.items.get_mut(id)
        } else {
            None
        }
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Items sorted by label, then id
    pub fn items_by_label(&self) -> Vec<(&Uuid, &CalculationItem)> {
        let mut items: Vec<_> = self.items.iter().collect();
        items.sort_by(|(ia, a), (ib, b)| a.label().cmp(b.label()).then(ia.cmp(ib)));
        items
    }
}

impl Default for Project {
    fn default() -> Self {
        Project::new("", "", "")
    }
}

/// Project metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,
    pub engineer: String,
    pub job_id: String,
    pub client: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// Global project settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalSettings {
    /// Design code (e.g. "NBR 6118:2023")
    pub code: String,

    /// Materials offered for new items
    pub default_materials: MaterialSpec,

    /// Combination factors offered for new beams
    pub default_combinations: CombinationSettings,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        GlobalSettings {
            code: DESIGN_CODE.to_string(),
            default_materials: MaterialSpec::default(),
            default_combinations: CombinationSettings::default(),
        }
    }
}
