//! Map viewport, markers and the selected-property popup.
//!
//! The map library sits behind [`MapRenderer`]; [`MarkerRegistry`] owns every
//! handle it hands out.

pub mod markers;

use std::time::Duration;

use crate::models::{BBox, LngLat, Property, PropertyId};

pub use markers::MarkerRegistry;

/// Viewport fit parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    /// Padding in pixels on every side
    pub padding: u32,
    pub max_zoom: f64,
    /// Animation length; zero jumps
    pub duration: Duration,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            padding: 50,
            max_zoom: 15.0,
            duration: Duration::from_millis(1000),
        }
    }
}

/// Operations the core needs from a map library.
pub trait MapRenderer {
    type Marker;
    type Popup;

    fn create_marker(
        &mut self,
        id: PropertyId,
        position: LngLat,
        label: &str,
        selected: bool,
    ) -> Self::Marker;

    /// Restyle in place; the marker keeps its position.
    fn set_marker_selected(&mut self, marker: &mut Self::Marker, selected: bool);

    fn remove_marker(&mut self, marker: Self::Marker);

    fn open_popup(&mut self, property: &Property) -> Self::Popup;

    fn close_popup(&mut self, popup: Self::Popup);

    fn fit_bounds(&mut self, bbox: &BBox, options: &FitOptions);
}
