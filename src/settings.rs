//! Persisted user settings: material efficiency overrides and collapse toggles
//!
//! Stored as a JSON document:
//!
//! ```json
//! {
//!   "materialEfficiencyMap": { "11543": 10 },
//!   "toggles": [true, false, false, true, true, true]
//! }
//! ```
//!
//! Efficiency values are percentages in `[0, 10]`.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::SettingsError;
use crate::models::{Toggles, TypeId};
use crate::tree::MaterialEfficiency;

pub const MAX_EFFICIENCY_PERCENT: f64 = 10.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default, deserialize_with = "null_as_default")]
    material_efficiency_map: BTreeMap<TypeId, f64>,
    #[serde(default = "Toggles::loaded_default", deserialize_with = "null_as_loaded_toggles")]
    toggles: Toggles,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_loaded_toggles<'de, D>(deserializer: D) -> Result<Toggles, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Toggles>::deserialize(deserializer)?.unwrap_or_else(Toggles::loaded_default))
}

fn clamp_percent(type_id: TypeId, percent: f64) -> f64 {
    let clamped = if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, MAX_EFFICIENCY_PERCENT)
    };
    if clamped != percent {
        warn!("material efficiency {percent} for type {type_id} clamped to {clamped}");
    }
    clamped
}

impl Settings {
    /// Read settings from `path`.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read settings from `path`, or defaults if the file does not exist yet.
    pub fn load_or_default(path: &Path) -> Result<Self, SettingsError> {
        match Self::load(path) {
            Err(SettingsError::Read { source, .. }) if source.kind() == ErrorKind::NotFound => {
                info!("no settings at {}, using defaults", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Settings = serde_json::from_str(text)?;
        for (type_id, percent) in settings.material_efficiency_map.iter_mut() {
            *percent = clamp_percent(*type_id, *percent);
        }
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let text = self.to_json()?;
        fs::write(path, text).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn toggles(&self) -> &Toggles {
        &self.toggles
    }

    pub fn set_toggle(&mut self, index: usize, value: bool) -> Result<(), SettingsError> {
        if self.toggles.set(index, value) {
            Ok(())
        } else {
            Err(SettingsError::ToggleIndex(index))
        }
    }

    /// Configured percentage for `type_id`, if any.
    pub fn material_efficiency_percent(&self, type_id: TypeId) -> Option<f64> {
        self.material_efficiency_map.get(&type_id).copied()
    }

    /// Store a percentage for `type_id`, clamped to `[0, 10]`. Returns the stored value.
    pub fn set_material_efficiency(&mut self, type_id: TypeId, percent: f64) -> f64 {
        let clamped = clamp_percent(type_id, percent);
        self.material_efficiency_map.insert(type_id, clamped);
        clamped
    }

    pub fn clear_material_efficiency(&mut self, type_id: TypeId) -> bool {
        self.material_efficiency_map.remove(&type_id).is_some()
    }

    pub fn material_efficiencies(&self) -> impl Iterator<Item = (TypeId, f64)> + '_ {
        self.material_efficiency_map
            .iter()
            .map(|(type_id, percent)| (*type_id, *percent))
    }
}

impl MaterialEfficiency for Settings {
    fn efficiency(&self, type_id: TypeId) -> f64 {
        self.material_efficiency_percent(type_id)
            .map_or(0.0, |percent| percent / 100.0)
    }
}
