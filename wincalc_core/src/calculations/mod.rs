//! # Window Calculations
//!
//! The calculation engine. Every entry point is a pure function:
//!
//! - [`window::compute_window_stats`] - resolved profile + glazing in,
//!   `Result<WindowStats, WindowError>` out
//! - [`compute_by_id`] - same, but resolves catalog ids first
//!
//! A rejected geometry is an ordinary `Err(WindowError)`, not a failure of the
//! program. [`CalculationReport`] flattens either outcome for display.

pub mod window;

pub use window::{
    compute_window_stats, compute_window_stats_with, window_geometry, CalculationReport,
    WindowGeometry, WindowStats,
};

use crate::catalog::{Catalog, FrameProfile, GlazingUnit};
use crate::errors::CalcResult;
use crate::settings::PricingSettings;

/// A successful calculation together with the catalog entries it used.
#[derive(Debug, Clone)]
pub struct ResolvedCalculation<'a> {
    pub profile: &'a FrameProfile,
    pub glazing: &'a GlazingUnit,
    pub stats: WindowStats,
}

/// Resolve `profile_id` and `glazing_id` against the catalog, then run the engine.
///
/// Catalog misses are reported as `CalcError::CatalogNotFound` before any
/// geometry is looked at; a rejected geometry becomes `CalcError::InvalidWindow`.
///
/// ```rust
/// use wincalc_core::calculations::compute_by_id;
/// use wincalc_core::catalog::Catalog;
/// use wincalc_core::settings::PricingSettings;
///
/// let resolved = compute_by_id(
///     Catalog::builtin(),
///     &PricingSettings::default(),
///     1200.0,
///     1400.0,
///     "veka-softline-82",
///     "triple-chamber",
/// )
/// .unwrap();
/// assert_eq!(resolved.profile.name, "VEKA Softline 82");
/// ```
pub fn compute_by_id<'a>(
    catalog: &'a Catalog,
    settings: &PricingSettings,
    width_mm: f64,
    height_mm: f64,
    profile_id: &str,
    glazing_id: &str,
) -> CalcResult<ResolvedCalculation<'a>> {
    let profile = catalog.profile(profile_id)?;
    let glazing = catalog.glazing(glazing_id)?;
    let stats = compute_window_stats_with(settings, width_mm, height_mm, profile, glazing)?;
    Ok(ResolvedCalculation {
        profile,
        glazing,
        stats,
    })
}
