//! # Pricing Settings
//!
//! The fixed constants of the calculation engine, grouped so they can be
//! overridden from a TOML file for another market or price list. Every field
//! defaults to the built-in constant, so a settings file only needs the
//! values it changes:
//!
//! ```toml
//! energy_price_per_kwh = 0.32
//! installation_price_per_m2 = 95.0
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Smallest accepted window width or height (mm)
pub const MIN_WINDOW_DIMENSION_MM: f64 = 400.0;
/// Fixed hardware surcharge per window (fittings, handle)
pub const HARDWARE_SURCHARGE: f64 = 40.0;
/// Installation charge per m² of window area
pub const INSTALLATION_PRICE_PER_M2: f64 = 80.0;
/// Regional heating factor in kKh/a (thousand Kelvin-hours per year)
pub const HEATING_FACTOR_KKH: f64 = 75.0;
/// Uw of the reference window being replaced (1980s double glazing)
pub const REFERENCE_OLD_WINDOW_UW: f64 = 2.8;
/// Energy price per kWh (gas/oil average)
pub const ENERGY_PRICE_PER_KWH: f64 = 0.15;
/// Highest Uw that still qualifies for the retrofit subsidy
pub const SUBSIDY_UW_THRESHOLD: f64 = 0.95;
/// Share of the total price paid out as subsidy
pub const SUBSIDY_RATE: f64 = 0.15;

/// Engine constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingSettings {
    pub min_window_dimension_mm: f64,
    pub hardware_surcharge: f64,
    pub installation_price_per_m2: f64,
    pub heating_factor_kkh: f64,
    pub reference_old_window_uw: f64,
    pub energy_price_per_kwh: f64,
    pub subsidy_uw_threshold: f64,
    pub subsidy_rate: f64,
}

impl Default for PricingSettings {
    fn default() -> Self {
        PricingSettings {
            min_window_dimension_mm: MIN_WINDOW_DIMENSION_MM,
            hardware_surcharge: HARDWARE_SURCHARGE,
            installation_price_per_m2: INSTALLATION_PRICE_PER_M2,
            heating_factor_kkh: HEATING_FACTOR_KKH,
            reference_old_window_uw: REFERENCE_OLD_WINDOW_UW,
            energy_price_per_kwh: ENERGY_PRICE_PER_KWH,
            subsidy_uw_threshold: SUBSIDY_UW_THRESHOLD,
            subsidy_rate: SUBSIDY_RATE,
        }
    }
}

impl PricingSettings {
    /// Parse settings from TOML text.
    pub fn from_toml(text: &str) -> CalcResult<Self> {
        let settings: PricingSettings = toml::from_str(text).map_err(CalcError::serialization)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Render as TOML (e.g. to write a starter settings file).
    pub fn to_toml(&self) -> CalcResult<String> {
        toml::to_string_pretty(self).map_err(CalcError::serialization)
    }

    /// Reject values that make the formulas meaningless.
    pub fn validate(&self) -> CalcResult<()> {
        let non_negative = [
            ("min_window_dimension_mm", self.min_window_dimension_mm),
            ("hardware_surcharge", self.hardware_surcharge),
            ("installation_price_per_m2", self.installation_price_per_m2),
            ("heating_factor_kkh", self.heating_factor_kkh),
            ("reference_old_window_uw", self.reference_old_window_uw),
            ("energy_price_per_kwh", self.energy_price_per_kwh),
            ("subsidy_uw_threshold", self.subsidy_uw_threshold),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(CalcError::invalid_input(
                    field,
                    value.to_string(),
                    "Must be a finite, non-negative number",
                ));
            }
        }
        if !(0.0..=1.0).contains(&self.subsidy_rate) {
            return Err(CalcError::invalid_input(
                "subsidy_rate",
                self.subsidy_rate.to_string(),
                "Subsidy rate is a fraction between 0 and 1",
            ));
        }
        Ok(())
    }
}

/// Load settings from a TOML file. A missing file yields the defaults.
pub fn load_settings(path: &Path) -> CalcResult<PricingSettings> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no settings file, using defaults");
        return Ok(PricingSettings::default());
    }
    let text = fs::read_to_string(path)
        .map_err(|e| CalcError::file_error("read settings", path.display().to_string(), e.to_string()))?;
    PricingSettings::from_toml(&text)
}
