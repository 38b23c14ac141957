//! # Window Calculation
//!
//! Converts window dimensions plus a frame profile and a glazing unit into the
//! thermal rating, price, subsidy eligibility and estimated annual saving.
//!
//! ## Method
//!
//! 1. Reject windows under the minimum size, then subtract the frame face on
//!    each side to get the visible glass. No glass left means the profile is
//!    wider than the window.
//! 2. Uw is the area-weighted combination of glass, frame and glass-edge
//!    losses (EN ISO 10077-1 decomposition):
//!
//!    `Uw = (Ag·Ug + Af·Uf + Lg·psi) / Aw`, rounded to 2 decimals.
//! 3. Price is frame material + glass + a fixed hardware surcharge +
//!    installation per m² of window.
//! 4. Annual heat loss is approximated as `U · A · heating factor`. The saving
//!    is the loss difference against a reference old window, priced per kWh.
//!    It is not floored at zero.
//! 5. A window qualifies for the subsidy when `Uw <= threshold` (inclusive).
//!
//! ## Example
//!
//! ```rust
//! use wincalc_core::calculations::window::compute_window_stats;
//! use wincalc_core::catalog::Catalog;
//!
//! let catalog = Catalog::builtin();
//! let profile = catalog.profile("salamander-bluevolution-92").unwrap();
//! let glazing = catalog.glazing("triple-chamber-xenon").unwrap();
//!
//! let stats = compute_window_stats(1200.0, 1400.0, profile, glazing).unwrap();
//! assert_eq!(stats.uw, 0.69);
//! assert!(stats.is_subsidy_eligible);
//!
//! let too_small = compute_window_stats(300.0, 1400.0, profile, glazing);
//! assert!(too_small.is_err());
//! ```

use serde::{Deserialize, Serialize};

use crate::catalog::{FrameProfile, GlazingUnit};
use crate::errors::WindowError;
use crate::settings::PricingSettings;
use crate::units::{round_half_up, round_to, Meters, Millimeters, SquareMeters};

/// Visible glass and frame decomposition of one window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowGeometry {
    /// Overall window area Aw
    pub window_area: SquareMeters,
    /// Visible glass width
    pub glass_width: Meters,
    /// Visible glass height
    pub glass_height: Meters,
    /// Visible glass area Ag
    pub glass_area: SquareMeters,
    /// Frame area Af = Aw - Ag
    pub frame_area: SquareMeters,
    /// Glass edge length Lg
    pub glass_perimeter: Meters,
}

/// Derive the glass/frame split for a window. Fails when the frame faces
/// leave no glass in either direction.
pub fn window_geometry(
    width_mm: f64,
    height_mm: f64,
    face_width_mm: f64,
) -> Result<WindowGeometry, WindowError> {
    let width: Meters = Millimeters(width_mm).into();
    let height: Meters = Millimeters(height_mm).into();
    let face: Meters = Millimeters(face_width_mm).into();

    let glass_width = width - face.scale(2.0);
    let glass_height = height - face.scale(2.0);

    if glass_width.0.is_nan() || glass_height.0.is_nan() || glass_width.0 <= 0.0 || glass_height.0 <= 0.0 {
        return Err(WindowError::ProfileWiderThanWindow {
            width_mm,
            height_mm,
            face_width_mm,
        });
    }

    let window_area = width * height;
    let glass_area = glass_width * glass_height;

    Ok(WindowGeometry {
        window_area,
        glass_width,
        glass_height,
        glass_area,
        frame_area: window_area - glass_area,
        glass_perimeter: (glass_width + glass_height).scale(2.0),
    })
}

/// Derived figures for one valid window.
///
/// Only a successful calculation produces this type; a rejected geometry is a
/// [`WindowError`] and carries no numbers at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowStats {
    /// Overall heat-transfer coefficient Uw (W/m²K), 2 decimals
    pub uw: f64,

    /// Window area (m²), 2 decimals
    pub area_m2: f64,

    /// Material + hardware + installation, whole currency units
    pub total_price: f64,

    /// Estimated heat loss through this window (kWh/yr)
    pub annual_heat_loss_kwh: f64,

    /// Energy cost saved against the reference old window (currency/yr).
    /// Negative when the new window is worse than the reference.
    pub annual_savings: f64,

    /// Uw at or below the subsidy threshold
    pub is_subsidy_eligible: bool,

    /// Subsidy amount, zero when not eligible
    pub subsidy_amount: f64,
}

impl WindowStats {
    /// Price after subsidy
    pub fn net_price(&self) -> f64 {
        self.total_price - self.subsidy_amount
    }
}

/// Calculate a window with the built-in pricing constants.
pub fn compute_window_stats(
    width_mm: f64,
    height_mm: f64,
    profile: &FrameProfile,
    glazing: &GlazingUnit,
) -> Result<WindowStats, WindowError> {
    compute_window_stats_with(&PricingSettings::default(), width_mm, height_mm, profile, glazing)
}

/// Calculate a window with explicit pricing settings.
pub fn compute_window_stats_with(
    settings: &PricingSettings,
    width_mm: f64,
    height_mm: f64,
    profile: &FrameProfile,
    glazing: &GlazingUnit,
) -> Result<WindowStats, WindowError> {
    let min_mm = settings.min_window_dimension_mm;
    if !width_mm.is_finite() || !height_mm.is_finite() || width_mm < min_mm || height_mm < min_mm {
        return Err(WindowError::TooSmall {
            width_mm,
            height_mm,
            min_mm,
        });
    }

    let geometry = window_geometry(width_mm, height_mm, profile.visible_face_width_mm)?;
    let area_w = geometry.window_area.value();
    let area_g = geometry.glass_area.value();
    let area_f = geometry.frame_area.value();

    // === Thermal ===
    let heat_flow = area_g * glazing.center_of_glass_u_value
        + area_f * profile.frame_u_value
        + geometry.glass_perimeter.value() * glazing.edge_thermal_bridge;
    let uw = round_to(heat_flow / area_w, 2);

    // === Price ===
    let material_price = area_f * profile.price_per_m2 + area_g * glazing.price_per_m2;
    let installation_price = area_w * settings.installation_price_per_m2;
    let total_price = round_half_up(material_price + settings.hardware_surcharge + installation_price);

    // === Energy ===
    // Q [kWh/a] = U [W/m²K] * A [m²] * F [kKh/a]
    let heat_loss_new = uw * area_w * settings.heating_factor_kkh;
    let heat_loss_old = settings.reference_old_window_uw * area_w * settings.heating_factor_kkh;
    let annual_savings = round_half_up((heat_loss_old - heat_loss_new) * settings.energy_price_per_kwh);

    // === Subsidy ===
    let is_subsidy_eligible = uw <= settings.subsidy_uw_threshold;
    let subsidy_amount = if is_subsidy_eligible {
        round_half_up(total_price * settings.subsidy_rate)
    } else {
        0.0
    };

    Ok(WindowStats {
        uw,
        area_m2: round_to(area_w, 2),
        total_price,
        annual_heat_loss_kwh: round_half_up(heat_loss_new),
        annual_savings,
        is_subsidy_eligible,
        subsidy_amount,
    })
}

/// Flat, always-populated view of a calculation outcome.
///
/// This is the shape shown to users and written as JSON: a valid report has
/// every figure and no message; an invalid one has every figure zeroed, both
/// flags false and a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationReport {
    pub overall_u_value: f64,
    pub area: f64,
    pub total_price: f64,
    pub annual_heat_loss: f64,
    pub annual_savings: f64,
    pub is_subsidy_eligible: bool,
    pub subsidy_amount: f64,
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl CalculationReport {
    fn invalid(message: String) -> Self {
        CalculationReport {
            overall_u_value: 0.0,
            area: 0.0,
            total_price: 0.0,
            annual_heat_loss: 0.0,
            annual_savings: 0.0,
            is_subsidy_eligible: false,
            subsidy_amount: 0.0,
            is_valid: false,
            error_message: Some(message),
        }
    }
}

impl From<&WindowStats> for CalculationReport {
    fn from(stats: &WindowStats) -> Self {
        CalculationReport {
            overall_u_value: stats.uw,
            area: stats.area_m2,
            total_price: stats.total_price,
            annual_heat_loss: stats.annual_heat_loss_kwh,
            annual_savings: stats.annual_savings,
            is_subsidy_eligible: stats.is_subsidy_eligible,
            subsidy_amount: stats.subsidy_amount,
            is_valid: true,
            error_message: None,
        }
    }
}

impl From<&Result<WindowStats, WindowError>> for CalculationReport {
    fn from(outcome: &Result<WindowStats, WindowError>) -> Self {
        match outcome {
            Ok(stats) => stats.into(),
            Err(err) => CalculationReport::invalid(err.to_string()),
        }
    }
}
