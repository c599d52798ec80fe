use std::collections::HashMap;

use tracing::debug;

use super::{FitOptions, MapRenderer};
use crate::models::{BBox, LngLat, Property, PropertyId};
use crate::utils::format::marker_label;

struct MarkerEntry<M> {
    handle: M,
    position: LngLat,
    label: String,
    property: Property,
}

/// One marker per located property plus at most one popup, for the selected id.
pub struct MarkerRegistry<R: MapRenderer> {
    renderer: R,
    markers: HashMap<PropertyId, MarkerEntry<R::Marker>>,
    selected: Option<PropertyId>,
    popup: Option<R::Popup>,
    fitted: Option<BBox>,
    fit_options: FitOptions,
}

impl<R: MapRenderer> MarkerRegistry<R> {
    pub fn new(renderer: R) -> Self {
        Self::with_fit_options(renderer, FitOptions::default())
    }

    pub fn with_fit_options(renderer: R, fit_options: FitOptions) -> Self {
        Self {
            renderer,
            markers: HashMap::new(),
            selected: None,
            popup: None,
            fitted: None,
            fit_options,
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn selected(&self) -> Option<PropertyId> {
        self.selected
    }

    pub fn has_popup(&self) -> bool {
        self.popup.is_some()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn has_marker(&self, id: PropertyId) -> bool {
        self.markers.contains_key(&id)
    }

    /// Bring markers in line with `properties`. Unchanged markers are kept;
    /// a marker is recreated only when its position or label changed.
    pub fn sync_properties(&mut self, properties: &[Property]) {
        let mut next: HashMap<PropertyId, (&Property, LngLat)> = HashMap::new();
        for property in properties {
            if let Some(position) = property.lng_lat() {
                next.insert(property.id, (property, position));
            }
        }

        let gone: Vec<PropertyId> = self
            .markers
            .keys()
            .filter(|id| !next.contains_key(id))
            .copied()
            .collect();
        for id in gone {
            if let Some(entry) = self.markers.remove(&id) {
                self.renderer.remove_marker(entry.handle);
            }
        }

        for (id, (property, position)) in next {
            let label = marker_label(property.rent);
            if let Some(entry) = self.markers.get_mut(&id) {
                if entry.position == position && entry.label == label {
                    entry.property = property.clone();
                    continue;
                }
            }

            if let Some(old) = self.markers.remove(&id) {
                self.renderer.remove_marker(old.handle);
            }
            let selected = self.selected == Some(id);
            let handle = self.renderer.create_marker(id, position, &label, selected);
            self.markers.insert(
                id,
                MarkerEntry {
                    handle,
                    position,
                    label,
                    property: property.clone(),
                },
            );
        }

        if let Some(id) = self.selected {
            if !self.markers.contains_key(&id) {
                debug!("Selected property {} left the result set", id);
                self.selected = None;
                self.close_current_popup();
            }
        }
    }

    /// Select `id` and show its popup. The new popup opens before the old one
    /// closes. Returns false if there is no marker for `id`.
    pub fn select(&mut self, id: PropertyId) -> bool {
        if self.selected == Some(id) {
            return true;
        }
        let Some(entry) = self.markers.get_mut(&id) else {
            return false;
        };

        self.renderer.set_marker_selected(&mut entry.handle, true);
        let popup = self.renderer.open_popup(&entry.property);

        if let Some(previous) = self.selected.replace(id) {
            if let Some(entry) = self.markers.get_mut(&previous) {
                self.renderer.set_marker_selected(&mut entry.handle, false);
            }
        }
        if let Some(old) = self.popup.replace(popup) {
            self.renderer.close_popup(old);
        }
        true
    }

    /// Background click on the map.
    pub fn on_map_click(&mut self) {
        self.close_popup();
    }

    /// Close the popup and clear the selection.
    pub fn close_popup(&mut self) {
        if let Some(id) = self.selected.take() {
            if let Some(entry) = self.markers.get_mut(&id) {
                self.renderer.set_marker_selected(&mut entry.handle, false);
            }
        }
        self.close_current_popup();
    }

    fn close_current_popup(&mut self) {
        if let Some(popup) = self.popup.take() {
            self.renderer.close_popup(popup);
        }
    }

    /// Fit the viewport to the committed bbox if it changed since the last fit.
    pub fn sync_viewport(&mut self, bbox: Option<&BBox>) -> bool {
        let Some(bbox) = bbox else {
            return false;
        };
        if self.fitted.as_ref() == Some(bbox) {
            return false;
        }

        self.renderer.fit_bounds(bbox, &self.fit_options);
        self.fitted = Some(*bbox);
        true
    }

    /// Destroy every marker and the popup.
    pub fn clear(&mut self) {
        self.close_current_popup();
        self.selected = None;
        for (_, entry) in self.markers.drain() {
            self.renderer.remove_marker(entry.handle);
        }
    }
}

impl<R: MapRenderer> Drop for MarkerRegistry<R> {
    fn drop(&mut self) {
        self.clear();
    }
}
