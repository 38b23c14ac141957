//! Insulated glazing units
//!
//! Ug is the center-of-glass value; psi is the linear thermal bridge of the
//! edge seal (warm-edge spacer values). Prices are per m² of visible glass.

use serde::{Deserialize, Serialize};

/// An insulated glazing unit build-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlazingUnit {
    /// Unique catalog key
    pub id: String,

    /// Display name (build-up in mm, e.g. "4-16-4")
    pub name: String,

    /// Center-of-glass heat-transfer coefficient Ug (W/m²K)
    pub center_of_glass_u_value: f64,

    /// Edge-seal linear thermal transmittance psi (W/mK)
    pub edge_thermal_bridge: f64,

    /// Price per m² of glass area
    pub price_per_m2: f64,
}

impl GlazingUnit {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        center_of_glass_u_value: f64,
        edge_thermal_bridge: f64,
        price_per_m2: f64,
    ) -> Self {
        GlazingUnit {
            id: id.into(),
            name: name.into(),
            center_of_glass_u_value,
            edge_thermal_bridge,
            price_per_m2,
        }
    }
}

pub(crate) fn builtin_glazing() -> Vec<GlazingUnit> {
    vec![
        GlazingUnit::new("single-chamber", "Single chamber 4-16-4", 1.1, 0.05, 50.0),
        GlazingUnit::new("double-chamber", "Double chamber 4-16-4-16-4", 0.8, 0.04, 75.0),
        GlazingUnit::new("triple-chamber", "Triple chamber 4-18-4-18-4", 0.65, 0.04, 90.0),
        GlazingUnit::new("triple-chamber-low-e", "Triple chamber (Ar + Low-E)", 0.5, 0.04, 110.0),
        GlazingUnit::new("triple-chamber-xenon", "Triple chamber (Xe)", 0.4, 0.04, 130.0),
    ]
}
