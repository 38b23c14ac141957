//! # Project Data Structures
//!
//! A `Project` is the root of a priced window-replacement job. It owns its
//! rooms, each room owns its windows, and nothing is shared between parents.
//!
//! ## Structure
//!
//! ```text
//! Project (id, name, createdAt, updatedAt)
//! └── rooms: Vec<Room> (name, floor area, ceiling height)
//!     └── windows: Vec<Window> (size, profile/glazing snapshot, figures)
//! ```
//!
//! A `Window` is a snapshot taken from a successful calculation: it records
//! the profile and glazing by id *and* display name, plus the figures the
//! engine produced. Catalog changes never touch recorded windows. Editing a
//! window replaces it with a fresh snapshot.
//!
//! Project totals are always recomputed from the windows; nothing aggregate is
//! stored.
//!
//! ## Example
//!
//! ```rust
//! use wincalc_core::catalog::Catalog;
//! use wincalc_core::ids::UuidGenerator;
//! use wincalc_core::project::{Project, WindowRequest};
//! use wincalc_core::settings::PricingSettings;
//!
//! let mut ids = UuidGenerator;
//! let mut project = Project::new("Miller house", &mut ids);
//! let room_id = project.add_room("Living room", 24.0, 2.7, &mut ids).unwrap();
//!
//! let catalog = Catalog::builtin();
//! let request = WindowRequest {
//!     width_mm: 1200.0,
//!     height_mm: 1400.0,
//!     profile: catalog.profile("veka-softline-82").unwrap(),
//!     glazing: catalog.glazing("triple-chamber").unwrap(),
//! };
//! project
//!     .add_window(&room_id, &request, &PricingSettings::default(), &mut ids)
//!     .unwrap();
//!
//! assert!(project.total_cost() > 0.0);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calculations::{compute_window_stats_with, WindowStats};
use crate::catalog::{FrameProfile, GlazingUnit};
use crate::errors::{CalcError, CalcResult};
use crate::ids::IdGenerator;
use crate::settings::PricingSettings;

/// Ceiling height preset for new rooms (m)
pub const DEFAULT_ROOM_HEIGHT_M: f64 = 2.7;

/// Inputs for one window calculation inside a project.
#[derive(Debug, Clone, Copy)]
pub struct WindowRequest<'a> {
    pub width_mm: f64,
    pub height_mm: f64,
    pub profile: &'a FrameProfile,
    pub glazing: &'a GlazingUnit,
}

impl WindowRequest<'_> {
    /// Run the engine for this request.
    pub fn calculate(&self, settings: &PricingSettings) -> CalcResult<WindowStats> {
        Ok(compute_window_stats_with(
            settings,
            self.width_mm,
            self.height_mm,
            self.profile,
            self.glazing,
        )?)
    }
}

/// A priced window, frozen at the moment it was calculated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Window {
    pub id: String,

    /// Width (mm)
    pub width: f64,

    /// Height (mm)
    pub height: f64,

    pub profile_id: String,
    /// Profile name at calculation time
    pub profile_name: String,

    pub glazing_id: String,
    /// Glazing name at calculation time
    pub glazing_name: String,

    /// Overall Uw (W/m²K)
    pub uw: f64,

    /// Total price
    pub price: f64,

    #[serde(rename = "isBafa")]
    pub is_subsidy_eligible: bool,

    #[serde(default)]
    pub subsidy: f64,

    /// Annual savings (currency/yr)
    #[serde(default)]
    pub savings: f64,

    /// Annual heat loss (kWh/yr)
    #[serde(default)]
    pub heat_loss: f64,
}

impl Window {
    /// Snapshot a successful calculation.
    pub fn from_stats(id: String, request: &WindowRequest<'_>, stats: &WindowStats) -> Self {
        Window {
            id,
            width: request.width_mm,
            height: request.height_mm,
            profile_id: request.profile.id.clone(),
            profile_name: request.profile.name.clone(),
            glazing_id: request.glazing.id.clone(),
            glazing_name: request.glazing.name.clone(),
            uw: stats.uw,
            price: stats.total_price,
            is_subsidy_eligible: stats.is_subsidy_eligible,
            subsidy: stats.subsidy_amount,
            savings: stats.annual_savings,
            heat_loss: stats.annual_heat_loss_kwh,
        }
    }

    /// Window area from the recorded dimensions (m²)
    pub fn area_m2(&self) -> f64 {
        self.width * self.height / 1_000_000.0
    }

    /// Same size, profile and glazing (ignores id and figures)
    pub fn same_configuration(&self, other: &Window) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.profile_id == other.profile_id
            && self.glazing_id == other.glazing_id
    }
}

/// A room and the windows priced for it.
///
/// `area` is the floor area as entered. It is informational and is never
/// checked against the windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,

    pub name: String,

    /// Floor area (m²)
    #[serde(rename = "area")]
    pub area_m2: f64,

    /// Ceiling height (m)
    #[serde(rename = "height")]
    pub height_m: f64,

    /// Windows in insertion order
    #[serde(default)]
    pub windows: Vec<Window>,
}

impl Room {
    pub fn window(&self, window_id: &str) -> Option<&Window> {
        self.windows.iter().find(|w| w.id == window_id)
    }

    pub fn total_price(&self) -> f64 {
        self.windows.iter().map(|w| w.price).sum()
    }

    pub fn total_subsidy(&self) -> f64 {
        self.windows.iter().map(|w| w.subsidy).sum()
    }

    pub fn total_savings(&self) -> f64 {
        self.windows.iter().map(|w| w.savings).sum()
    }

    /// Combined window area (m²)
    pub fn window_area_m2(&self) -> f64 {
        self.windows.iter().map(Window::area_m2).sum()
    }
}

/// Project-wide figures, derived on demand.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectTotals {
    pub total_cost: f64,
    pub total_subsidy: f64,
    /// Cost after subsidy
    pub net_cost: f64,
    pub annual_savings: f64,
    pub window_count: usize,
    pub window_area_m2: f64,
}

/// Root project container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,

    pub name: String,

    pub created_at: DateTime<Utc>,

    /// Advanced on every mutation and again when the store persists an update
    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub rooms: Vec<Room>,
}

impl Project {
    /// Create a new empty project with a fresh id.
    pub fn new(name: impl Into<String>, ids: &mut impl IdGenerator) -> Self {
        let now = Utc::now();
        Project {
            id: ids.next_id(),
            name: name.into(),
            created_at: now,
            updated_at: now,
            rooms: Vec::new(),
        }
    }

    /// Move `updated_at` forward to the current time. Never moves it back.
    pub fn touch(&mut self) {
        self.updated_at = self.updated_at.max(Utc::now());
    }

    pub fn room(&self, room_id: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == room_id)
    }

    fn room_mut(&mut self, room_id: &str) -> CalcResult<&mut Room> {
        self.rooms
            .iter_mut()
            .find(|r| r.id == room_id)
            .ok_or_else(|| CalcError::room_not_found(room_id))
    }

    /// Add an empty room and return its id.
    ///
    /// The name must not be blank and the floor area must be positive.
    pub fn add_room(
        &mut self,
        name: impl Into<String>,
        area_m2: f64,
        height_m: f64,
        ids: &mut impl IdGenerator,
    ) -> CalcResult<String> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CalcError::invalid_input("name", name, "Room name must not be blank"));
        }
        if !area_m2.is_finite() || area_m2 <= 0.0 {
            return Err(CalcError::invalid_input(
                "area",
                area_m2.to_string(),
                "Room area must be greater than zero",
            ));
        }
        if !height_m.is_finite() || height_m <= 0.0 {
            return Err(CalcError::invalid_input(
                "height",
                height_m.to_string(),
                "Room height must be greater than zero",
            ));
        }

        let id = ids.next_id();
        self.rooms.push(Room {
            id: id.clone(),
            name,
            area_m2,
            height_m,
            windows: Vec::new(),
        });
        self.touch();
        Ok(id)
    }

    /// Remove a room and all its windows. Unknown ids are a no-op.
    pub fn remove_room(&mut self, room_id: &str) -> Option<Room> {
        let index = self.rooms.iter().position(|r| r.id == room_id)?;
        let room = self.rooms.remove(index);
        self.touch();
        Some(room)
    }

    /// Calculate a window and append it to a room.
    ///
    /// Nothing is inserted when the room does not exist or the engine rejects
    /// the geometry.
    pub fn add_window(
        &mut self,
        room_id: &str,
        request: &WindowRequest<'_>,
        settings: &PricingSettings,
        ids: &mut impl IdGenerator,
    ) -> CalcResult<&Window> {
        // A missing room is reported before the geometry is looked at
        if self.room(room_id).is_none() {
            return Err(CalcError::room_not_found(room_id));
        }
        let stats = request.calculate(settings)?;
        let window = Window::from_stats(ids.next_id(), request, &stats);

        self.touch();
        let room = self.room_mut(room_id)?;
        let index = room.windows.len();
        room.windows.push(window);
        Ok(&room.windows[index])
    }

    /// Replace a window with a freshly calculated one at the same position.
    ///
    /// Returns the old window. On any error the room is left unchanged.
    pub fn replace_window(
        &mut self,
        room_id: &str,
        window_id: &str,
        request: &WindowRequest<'_>,
        settings: &PricingSettings,
        ids: &mut impl IdGenerator,
    ) -> CalcResult<Window> {
        let index = self
            .room_mut(room_id)?
            .windows
            .iter()
            .position(|w| w.id == window_id)
            .ok_or_else(|| CalcError::window_not_found(room_id, window_id))?;
        let stats = request.calculate(settings)?;
        let replacement = Window::from_stats(ids.next_id(), request, &stats);

        let room = self.room_mut(room_id)?;
        let old = std::mem::replace(&mut room.windows[index], replacement);
        self.touch();
        Ok(old)
    }

    /// Remove a window from a room. Unknown ids are a no-op.
    pub fn remove_window(&mut self, room_id: &str, window_id: &str) -> Option<Window> {
        let room = self.room_mut(room_id).ok()?;
        let index = room.windows.iter().position(|w| w.id == window_id)?;
        let window = room.windows.remove(index);
        self.touch();
        Some(window)
    }

    /// All windows across all rooms, room by room
    pub fn windows(&self) -> impl Iterator<Item = &Window> {
        self.rooms.iter().flat_map(|r| r.windows.iter())
    }

    pub fn window_count(&self) -> usize {
        self.rooms.iter().map(|r| r.windows.len()).sum()
    }

    /// Sum of all window prices
    pub fn total_cost(&self) -> f64 {
        self.rooms.iter().map(Room::total_price).sum()
    }

    /// Sum of all window subsidies
    pub fn total_subsidy(&self) -> f64 {
        self.rooms.iter().map(Room::total_subsidy).sum()
    }

    pub fn totals(&self) -> ProjectTotals {
        let total_cost = self.total_cost();
        let total_subsidy = self.total_subsidy();
        ProjectTotals {
            total_cost,
            total_subsidy,
            net_cost: total_cost - total_subsidy,
            annual_savings: self.rooms.iter().map(Room::total_savings).sum(),
            window_count: self.window_count(),
            window_area_m2: self.rooms.iter().map(Room::window_area_m2).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::ids::SequentialIds;

    fn request<'a>(width_mm: f64, height_mm: f64, profile_id: &str, glazing_id: &str) -> WindowRequest<'a> {
        let catalog = Catalog::builtin();
        WindowRequest {
            width_mm,
            height_mm,
            profile: catalog.profile(profile_id).unwrap(),
            glazing: catalog.glazing(glazing_id).unwrap(),
        }
    }

    fn project_with_room() -> (Project, String, SequentialIds) {
        let mut ids = SequentialIds::new("id");
        let mut project = Project::new("Test project", &mut ids);
        let room_id = project.add_room("Kitchen", 12.5, DEFAULT_ROOM_HEIGHT_M, &mut ids).unwrap();
        (project, room_id, ids)
    }

    #[test]
    fn test_project_creation() {
        let mut ids = SequentialIds::new("p");
        let project = Project::new("Miller house", &mut ids);
        assert_eq!(project.id, "p-1");
        assert_eq!(project.name, "Miller house");
        assert!(project.rooms.is_empty());
        assert_eq!(project.created_at, project.updated_at);
        assert_eq!(project.total_cost(), 0.0);
    }

    #[test]
    fn test_add_room_validation() {
        let mut ids = SequentialIds::new("id");
        let mut project = Project::new("P", &mut ids);

        assert!(project.add_room("   ", 10.0, 2.5, &mut ids).is_err());
        assert!(project.add_room("Bedroom", 0.0, 2.5, &mut ids).is_err());
        assert!(project.add_room("Bedroom", -3.0, 2.5, &mut ids).is_err());
        assert!(project.add_room("Bedroom", f64::NAN, 2.5, &mut ids).is_err());
        assert!(project.add_room("Bedroom", 10.0, 0.0, &mut ids).is_err());
        assert!(project.rooms.is_empty());

        let id = project.add_room("Bedroom", 10.0, 2.5, &mut ids).unwrap();
        assert_eq!(project.room(&id).unwrap().name, "Bedroom");
    }

    #[test]
    fn test_add_window_snapshots_stats() {
        let (mut project, room_id, mut ids) = project_with_room();
        let req = request(1200.0, 1400.0, "salamander-bluevolution-92", "triple-chamber-xenon");

        let window = project
            .add_window(&room_id, &req, &PricingSettings::default(), &mut ids)
            .unwrap()
            .clone();

        assert_eq!(window.profile_name, "Salamander bluEvolution 92");
        assert_eq!(window.glazing_name, "Triple chamber (Xe)");
        assert_eq!(window.uw, 0.69);
        assert_eq!(window.price, 409.0);
        assert!(window.is_subsidy_eligible);
        assert_eq!(window.subsidy, 61.0);
        assert_eq!(window.savings, 40.0);
        assert_eq!(window.heat_loss, 87.0);
        assert_eq!(project.room(&room_id).unwrap().windows.len(), 1);
    }

    #[test]
    fn test_failed_calculation_inserts_nothing() {
        let (mut project, room_id, mut ids) = project_with_room();
        let before = project.updated_at;
        let req = request(300.0, 1400.0, "veka-whs", "single-chamber");

        let result = project.add_window(&room_id, &req, &PricingSettings::default(), &mut ids);
        assert!(matches!(result, Err(CalcError::InvalidWindow(_))));
        assert_eq!(project.window_count(), 0);
        assert_eq!(project.updated_at, before);
    }

    #[test]
    fn test_add_window_unknown_room() {
        let (mut project, _room_id, mut ids) = project_with_room();
        let req = request(1200.0, 1400.0, "veka-whs", "single-chamber");
        let result = project.add_window("nope", &req, &PricingSettings::default(), &mut ids);
        assert!(matches!(result, Err(CalcError::RoomNotFound { .. })));
    }

    #[test]
    fn test_remove_is_noop_for_unknown_ids() {
        let (mut project, room_id, mut ids) = project_with_room();
        let req = request(1200.0, 1400.0, "veka-whs", "single-chamber");
        project.add_window(&room_id, &req, &PricingSettings::default(), &mut ids).unwrap();
        let before = project.clone();

        assert!(project.remove_window(&room_id, "missing").is_none());
        assert!(project.remove_window("missing", "missing").is_none());
        assert!(project.remove_room("missing").is_none());
        assert_eq!(project, before);
    }

    #[test]
    fn test_remove_window_and_room() {
        let (mut project, room_id, mut ids) = project_with_room();
        let req = request(1200.0, 1400.0, "veka-whs", "single-chamber");
        let window_id = project
            .add_window(&room_id, &req, &PricingSettings::default(), &mut ids)
            .unwrap()
            .id
            .clone();

        let removed = project.remove_window(&room_id, &window_id).unwrap();
        assert_eq!(removed.id, window_id);
        assert_eq!(project.window_count(), 0);

        let room = project.remove_room(&room_id).unwrap();
        assert_eq!(room.name, "Kitchen");
        assert!(project.rooms.is_empty());
    }

    #[test]
    fn test_readding_reproduces_figures() {
        let (mut project, room_id, mut ids) = project_with_room();
        let req = request(1500.0, 1250.0, "veka-alphaline", "triple-chamber-low-e");
        let settings = PricingSettings::default();

        let first = project.add_window(&room_id, &req, &settings, &mut ids).unwrap().clone();
        project.remove_window(&room_id, &first.id);
        let second = project.add_window(&room_id, &req, &settings, &mut ids).unwrap().clone();

        assert_ne!(first.id, second.id);
        assert!(first.same_configuration(&second));
        assert_eq!(first.uw, second.uw);
        assert_eq!(first.price, second.price);
        assert_eq!(first.subsidy, second.subsidy);
        assert_eq!(first.savings, second.savings);
        assert_eq!(first.heat_loss, second.heat_loss);
    }

    #[test]
    fn test_replace_window_keeps_position() {
        let (mut project, room_id, mut ids) = project_with_room();
        let settings = PricingSettings::default();
        let a = request(1000.0, 1000.0, "veka-whs", "single-chamber");
        let b = request(800.0, 1200.0, "veka-whs", "single-chamber");
        let first = project.add_window(&room_id, &a, &settings, &mut ids).unwrap().id.clone();
        let second = project.add_window(&room_id, &b, &settings, &mut ids).unwrap().id.clone();

        let bigger = request(2000.0, 1500.0, "salamander-bauline-80", "triple-chamber");
        let old = project.replace_window(&room_id, &first, &bigger, &settings, &mut ids).unwrap();
        assert_eq!(old.id, first);

        let windows = &project.room(&room_id).unwrap().windows;
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].width, 2000.0);
        assert_ne!(windows[0].id, first);
        assert_eq!(windows[1].id, second);
    }

    #[test]
    fn test_replace_window_failure_leaves_room_unchanged() {
        let (mut project, room_id, mut ids) = project_with_room();
        let settings = PricingSettings::default();
        let a = request(1000.0, 1000.0, "veka-whs", "single-chamber");
        let id = project.add_window(&room_id, &a, &settings, &mut ids).unwrap().id.clone();
        let before = project.clone();

        let bad = request(100.0, 1000.0, "veka-whs", "single-chamber");
        assert!(project.replace_window(&room_id, &id, &bad, &settings, &mut ids).is_err());
        let missing = project.replace_window(&room_id, "missing", &a, &settings, &mut ids);
        assert!(matches!(missing, Err(CalcError::WindowNotFound { .. })));
        assert_eq!(project, before);
    }

    #[test]
    fn test_totals_are_order_independent() {
        let settings = PricingSettings::default();
        let configs = [
            (1200.0, 1400.0, "salamander-bluevolution-92", "triple-chamber-xenon"),
            (900.0, 1100.0, "veka-euroline", "double-chamber"),
            (2000.0, 2200.0, "veka-alphaline", "triple-chamber-low-e"),
            (600.0, 600.0, "salamander-design-2d", "single-chamber"),
        ];

        let build = |order: &[usize]| {
            let mut ids = SequentialIds::new("x");
            let mut project = Project::new("P", &mut ids);
            let room_a = project.add_room("A", 10.0, 2.5, &mut ids).unwrap();
            let room_b = project.add_room("B", 20.0, 2.5, &mut ids).unwrap();
            for (n, &i) in order.iter().enumerate() {
                let (w, h, p, g) = configs[i];
                let room = if n % 2 == 0 { &room_a } else { &room_b };
                project.add_window(room, &request(w, h, p, g), &settings, &mut ids).unwrap();
            }
            project.totals()
        };

        let forward = build(&[0, 1, 2, 3]);
        let reversed = build(&[3, 2, 1, 0]);
        assert_eq!(forward.total_cost, reversed.total_cost);
        assert_eq!(forward.total_subsidy, reversed.total_subsidy);
        assert_eq!(forward.window_count, 4);
        assert_eq!(forward.net_cost, forward.total_cost - forward.total_subsidy);
    }

    #[test]
    fn test_total_cost_is_sum_of_window_prices() {
        let (mut project, room_id, mut ids) = project_with_room();
        let settings = PricingSettings::default();
        let other_room = project.add_room("Hall", 8.0, 2.5, &mut ids).unwrap();
        project
            .add_window(&room_id, &request(1200.0, 1400.0, "salamander-bluevolution-92", "double-chamber"), &settings, &mut ids)
            .unwrap();
        project
            .add_window(&other_room, &request(1200.0, 1400.0, "salamander-bluevolution-92", "triple-chamber-xenon"), &settings, &mut ids)
            .unwrap();

        assert_eq!(project.total_cost(), 345.0 + 409.0);
        assert_eq!(project.total_subsidy(), 61.0);
        let totals = project.totals();
        assert_eq!(totals.annual_savings, 35.0 + 40.0);
        assert!((totals.window_area_m2 - 3.36).abs() < 1e-9);
    }

    #[test]
    fn test_room_area_not_checked_against_windows() {
        let mut ids = SequentialIds::new("id");
        let mut project = Project::new("P", &mut ids);
        let room_id = project.add_room("Closet", 1.0, 2.5, &mut ids).unwrap();
        let req = request(3000.0, 2500.0, "veka-whs", "single-chamber");
        assert!(project.add_window(&room_id, &req, &PricingSettings::default(), &mut ids).is_ok());
        assert!(project.room(&room_id).unwrap().window_area_m2() > 1.0);
    }

    #[test]
    fn test_touch_is_monotonic() {
        let (mut project, _room_id, _ids) = project_with_room();
        let future = Utc::now() + chrono::Duration::hours(1);
        project.updated_at = future;
        project.touch();
        assert_eq!(project.updated_at, future);
    }

    #[test]
    fn test_stored_record_format() {
        let (mut project, room_id, mut ids) = project_with_room();
        let req = request(1200.0, 1400.0, "salamander-bluevolution-92", "double-chamber");
        project.add_window(&room_id, &req, &PricingSettings::default(), &mut ids).unwrap();

        let json = serde_json::to_string(&project).unwrap();
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"updatedAt\""));
        assert!(json.contains("\"profileName\":\"Salamander bluEvolution 92\""));
        assert!(json.contains("\"isBafa\":false"));
        assert!(json.contains("\"heatLoss\":122.0"));
        assert!(json.contains("\"area\":12.5"));

        let roundtrip: Project = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, project);
    }

    #[test]
    fn test_reads_record_without_optional_window_fields() {
        let json = r#"{
            "id": "p1",
            "name": "Legacy",
            "createdAt": "2025-01-10T09:00:00.000Z",
            "updatedAt": "2025-01-11T09:00:00.000Z",
            "rooms": [{
                "id": "r1", "name": "Bath", "area": 6, "height": 2.5,
                "windows": [{
                    "id": "w1", "width": 800, "height": 900,
                    "profileId": "veka-whs", "profileName": "VEKA WHS",
                    "glazingId": "single-chamber", "glazingName": "Single chamber 4-16-4",
                    "uw": 1.41, "price": 190, "isBafa": false
                }]
            }]
        }"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.total_cost(), 190.0);
        assert_eq!(project.total_subsidy(), 0.0);
    }
}
