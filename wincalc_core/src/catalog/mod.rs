//! # Product Catalog
//!
//! Read-only reference tables of frame profiles and glazing units. The
//! built-in tables are created once per process and shared; a custom
//! [`Catalog`] can be built for other product ranges.
//!
//! Windows never hold a reference into the catalog. They copy the id and the
//! display name at calculation time, so editing or replacing a catalog does
//! not change any recorded window.
//!
//! ## Example
//!
//! ```rust
//! use wincalc_core::catalog::Catalog;
//!
//! let catalog = Catalog::builtin();
//! let profile = catalog.profile("veka-softline-82").unwrap();
//! assert_eq!(profile.visible_face_width_mm, 110.0);
//!
//! assert!(catalog.glazing("no-such-glass").is_err());
//! ```

pub mod glazing;
pub mod profiles;

pub use glazing::GlazingUnit;
pub use profiles::FrameProfile;

use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

static BUILTIN: Lazy<Catalog> = Lazy::new(|| Catalog {
    profiles: profiles::builtin_profiles(),
    glazing: glazing::builtin_glazing(),
});

/// Ordered lists of frame profiles and glazing units, keyed by id.
///
/// The lists are small (tens of entries), so lookups are linear scans that
/// keep the catalog order for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    profiles: Vec<FrameProfile>,
    glazing: Vec<GlazingUnit>,
}

impl Catalog {
    /// The built-in product range.
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    /// Build a custom catalog. Ids must be unique within each list.
    pub fn new(profiles: Vec<FrameProfile>, glazing: Vec<GlazingUnit>) -> CalcResult<Self> {
        ensure_unique("profile", profiles.iter().map(|p| p.id.as_str()))?;
        ensure_unique("glazing", glazing.iter().map(|g| g.id.as_str()))?;
        Ok(Catalog { profiles, glazing })
    }

    /// All frame profiles in catalog order
    pub fn profiles(&self) -> &[FrameProfile] {
        &self.profiles
    }

    /// All glazing units in catalog order
    pub fn glazing_units(&self) -> &[GlazingUnit] {
        &self.glazing
    }

    /// Look up a frame profile by id.
    pub fn profile(&self, id: &str) -> CalcResult<&FrameProfile> {
        self.profiles
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| CalcError::catalog_not_found("profile", id))
    }

    /// Look up a glazing unit by id.
    pub fn glazing(&self, id: &str) -> CalcResult<&GlazingUnit> {
        self.glazing
            .iter()
            .find(|g| g.id == id)
            .ok_or_else(|| CalcError::catalog_not_found("glazing", id))
    }

    /// First profile in the list, used as the preselected choice
    pub fn default_profile(&self) -> Option<&FrameProfile> {
        self.profiles.first()
    }

    /// First glazing unit in the list, used as the preselected choice
    pub fn default_glazing(&self) -> Option<&GlazingUnit> {
        self.glazing.first()
    }
}

fn ensure_unique<'a>(kind: &str, ids: impl Iterator<Item = &'a str>) -> CalcResult<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CalcError::invalid_input(
                format!("{kind}.id"),
                id,
                "Catalog ids must be unique",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_sizes() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.profiles().len(), 9);
        assert_eq!(catalog.glazing_units().len(), 5);
    }

    #[test]
    fn test_builtin_ids_unique() {
        let catalog = Catalog::builtin();
        let rebuilt = Catalog::new(
            catalog.profiles().to_vec(),
            catalog.glazing_units().to_vec(),
        );
        assert!(rebuilt.is_ok());
    }

    #[test]
    fn test_lookup_by_id() {
        let catalog = Catalog::builtin();

        let profile = catalog.profile("salamander-bluevolution-92").unwrap();
        assert_eq!(profile.frame_u_value, 1.0);
        assert_eq!(profile.visible_face_width_mm, 110.0);
        assert_eq!(profile.price_per_m2, 160.0);

        let glazing = catalog.glazing("double-chamber").unwrap();
        assert_eq!(glazing.center_of_glass_u_value, 0.8);
        assert_eq!(glazing.edge_thermal_bridge, 0.04);
        assert_eq!(glazing.price_per_m2, 75.0);
    }

    #[test]
    fn test_lookup_miss() {
        let catalog = Catalog::builtin();
        let err = catalog.profile("unknown").unwrap_err();
        assert_eq!(err.error_code(), "CATALOG_NOT_FOUND");
        assert!(catalog.glazing("unknown").is_err());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let profiles = vec![
            FrameProfile::new("p", "P one", 1.0, 100.0, 100.0),
            FrameProfile::new("p", "P two", 1.2, 90.0, 90.0),
        ];
        let result = Catalog::new(profiles, Vec::new());
        assert!(matches!(result, Err(CalcError::InvalidInput { .. })));
    }

    #[test]
    fn test_defaults_are_first_entries() {
        let catalog = Catalog::builtin();
        assert_eq!(
            catalog.default_profile().map(|p| p.id.as_str()),
            Some("salamander-bluevolution-92")
        );
        assert_eq!(
            catalog.default_glazing().map(|g| g.id.as_str()),
            Some("single-chamber")
        );

        let empty = Catalog::new(Vec::new(), Vec::new()).unwrap();
        assert!(empty.default_profile().is_none());
    }
}
