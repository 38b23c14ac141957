//! # wincalc_core - Window Replacement Pricing Engine
//!
//! `wincalc_core` prices window-replacement jobs: pick a frame profile and a
//! glazing unit, enter the window size, and get the thermal rating (Uw), the
//! installed price, subsidy eligibility and an estimate of the yearly energy
//! saving. Windows are grouped into rooms and rooms into projects; totals are
//! always derived, never stored.
//!
//! ## Design Philosophy
//!
//! - **Stateless engine**: the calculation is a pure function of geometry and
//!   two catalog entries
//! - **JSON-First**: all records implement Serialize/Deserialize
//! - **Rich Errors**: a rejected geometry is a typed `WindowError`, not a
//!   string or a panic
//!
//! ## Quick Start
//!
//! ```rust
//! use wincalc_core::catalog::Catalog;
//! use wincalc_core::ids::UuidGenerator;
//! use wincalc_core::project::{Project, WindowRequest};
//! use wincalc_core::settings::PricingSettings;
//!
//! let catalog = Catalog::builtin();
//! let settings = PricingSettings::default();
//! let mut ids = UuidGenerator;
//!
//! let mut project = Project::new("Miller house", &mut ids);
//! let room = project.add_room("Living room", 24.0, 2.7, &mut ids).unwrap();
//!
//! let request = WindowRequest {
//!     width_mm: 1200.0,
//!     height_mm: 1400.0,
//!     profile: catalog.profile("salamander-bluevolution-92").unwrap(),
//!     glazing: catalog.glazing("double-chamber").unwrap(),
//! };
//! project.add_window(&room, &request, &settings, &mut ids).unwrap();
//!
//! assert_eq!(project.total_cost(), 345.0);
//! ```
//!
//! ## Modules
//!
//! - [`catalog`] - Frame profiles and glazing units
//! - [`calculations`] - The window calculation engine
//! - [`project`] - Project / room / window records and aggregation
//! - [`quote`] - Flat line items for export
//! - [`pdf`] - Offer documents rendered with Typst
//! - [`file_io`] - JSON project store with atomic saves and locking
//! - [`settings`] - Pricing constants, optionally loaded from TOML
//! - [`ids`] - Identifier generation
//! - [`units`] - Type-safe unit wrappers and rounding
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod catalog;
pub mod errors;
pub mod file_io;
pub mod ids;
pub mod pdf;
pub mod project;
pub mod quote;
pub mod settings;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use calculations::{compute_window_stats, CalculationReport, WindowStats};
pub use catalog::{Catalog, FrameProfile, GlazingUnit};
pub use errors::{CalcError, CalcResult, WindowError};
pub use file_io::{FileLock, ProjectStore};
pub use project::{Project, Room, Window};
pub use quote::{Quote, QuoteBuilder, QuoteLine};
pub use settings::PricingSettings;
