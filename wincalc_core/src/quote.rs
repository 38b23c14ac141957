//! # Quotes
//!
//! The flat, denormalized line-item list handed to document export. A quote
//! comes from one of two places:
//!
//! - [`QuoteBuilder`] - quick pricing without a project: each added line is
//!   calculated immediately, rejected geometry never becomes a line
//! - [`Quote::from_project`] - a project's windows, with identical
//!   configurations merged into one line
//!
//! ## Example
//!
//! ```rust
//! use wincalc_core::catalog::Catalog;
//! use wincalc_core::quote::QuoteBuilder;
//! use wincalc_core::settings::PricingSettings;
//!
//! let catalog = Catalog::builtin();
//! let profile = catalog.profile("veka-softline-82").unwrap();
//! let glazing = catalog.glazing("double-chamber").unwrap();
//!
//! let mut builder = QuoteBuilder::new(PricingSettings::default());
//! builder.add(1200.0, 1400.0, 3, profile, glazing).unwrap();
//! assert!(builder.add(200.0, 1400.0, 1, profile, glazing).is_err());
//!
//! let quote = builder.build();
//! assert_eq!(quote.lines.len(), 1);
//! assert_eq!(quote.grand_total, quote.lines[0].price_per_unit * 3.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::catalog::{FrameProfile, GlazingUnit};
use crate::errors::CalcResult;
use crate::project::{Project, Window, WindowRequest};
use crate::settings::PricingSettings;
use crate::units::round_to;

/// One row of an exported quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteLine {
    /// Width (mm)
    pub width: f64,
    /// Height (mm)
    pub height: f64,
    pub quantity: u32,
    pub profile_name: String,
    pub glazing_name: String,
    pub price_per_unit: f64,
    /// `price_per_unit * quantity`
    pub total_price: f64,
}

impl QuoteLine {
    fn from_window(window: &Window) -> Self {
        QuoteLine {
            width: window.width,
            height: window.height,
            quantity: 1,
            profile_name: window.profile_name.clone(),
            glazing_name: window.glazing_name.clone(),
            price_per_unit: window.price,
            total_price: window.price,
        }
    }

    /// Area of one unit (m², 2 decimals, as the engine reports it)
    pub fn unit_area_m2(&self) -> f64 {
        round_to(self.width * self.height / 1_000_000.0, 2)
    }

    /// Combined area of all units on this line (m²)
    pub fn total_area_m2(&self) -> f64 {
        self.unit_area_m2() * f64::from(self.quantity)
    }

    /// Same display names and unit price as `window`
    fn accepts(&self, window: &Window) -> bool {
        self.profile_name == window.profile_name
            && self.glazing_name == window.glazing_name
            && self.price_per_unit == window.price
    }
}

/// Line items plus the grand total.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub lines: Vec<QuoteLine>,
    pub grand_total: f64,
}

impl Quote {
    fn from_lines(lines: Vec<QuoteLine>) -> Self {
        let grand_total = lines.iter().map(|l| l.total_price).sum();
        Quote { lines, grand_total }
    }

    /// Flatten a project into quote lines.
    ///
    /// Windows with the same size, profile, glazing and recorded price become
    /// one line with the combined quantity, ordered by first appearance (room
    /// order, then window order). Windows priced under different settings stay
    /// on separate lines, so `price_per_unit * quantity == total_price` holds
    /// for every line.
    pub fn from_project(project: &Project) -> Self {
        let mut groups: Vec<(&Window, QuoteLine)> = Vec::new();

        for window in project.windows() {
            let existing = groups
                .iter()
                .position(|(first, line)| first.same_configuration(window) && line.accepts(window));
            match existing {
                Some(index) => {
                    let line = &mut groups[index].1;
                    line.quantity += 1;
                    line.total_price += window.price;
                }
                None => groups.push((window, QuoteLine::from_window(window))),
            }
        }

        Quote::from_lines(groups.into_iter().map(|(_, line)| line).collect())
    }

    /// Number of units across all lines
    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Window area across all lines (m²)
    pub fn total_area_m2(&self) -> f64 {
        self.lines.iter().map(QuoteLine::total_area_m2).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Accumulates priced lines outside of any project.
#[derive(Debug, Clone, Default)]
pub struct QuoteBuilder {
    settings: PricingSettings,
    lines: Vec<QuoteLine>,
}

impl QuoteBuilder {
    pub fn new(settings: PricingSettings) -> Self {
        QuoteBuilder {
            settings,
            lines: Vec::new(),
        }
    }

    /// Price one configuration and append it. A quantity of zero counts as one.
    pub fn add(
        &mut self,
        width_mm: f64,
        height_mm: f64,
        quantity: u32,
        profile: &FrameProfile,
        glazing: &GlazingUnit,
    ) -> CalcResult<&QuoteLine> {
        let request = WindowRequest {
            width_mm,
            height_mm,
            profile,
            glazing,
        };
        let stats = request.calculate(&self.settings)?;
        let quantity = quantity.max(1);

        let index = self.lines.len();
        self.lines.push(QuoteLine {
            width: width_mm,
            height: height_mm,
            quantity,
            profile_name: profile.name.clone(),
            glazing_name: glazing.name.clone(),
            price_per_unit: stats.total_price,
            total_price: stats.total_price * f64::from(quantity),
        });
        Ok(&self.lines[index])
    }

    /// Remove the line at `index`. Out-of-range indices are ignored.
    pub fn remove(&mut self, index: usize) -> Option<QuoteLine> {
        (index < self.lines.len()).then(|| self.lines.remove(index))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[QuoteLine] {
        &self.lines
    }

    pub fn grand_total(&self) -> f64 {
        self.lines.iter().map(|l| l.total_price).sum()
    }

    pub fn build(&self) -> Quote {
        Quote::from_lines(self.lines.clone())
    }
}
