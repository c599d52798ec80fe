//! Translation of UI search state into the backend filter shape.

use tracing::{debug, warn};

use super::filter::SearchFilter;
use crate::catalog::{self, Category};
use crate::models::{PropertyTypeFilter, RentBuyMode, SearchFilters, ALL_SUBCATEGORIES};
use crate::utils::bbox_for_location;

/// Compose the backend filter for `filters` under `mode`.
///
/// Location precedence is `withinId`, then the explicit bbox, then a static
/// city bbox for the location name, then a plain city-name match. Prices are
/// forwarded in euros.
pub fn compose(filters: &SearchFilters, mode: RentBuyMode) -> SearchFilter {
    let mut backend = SearchFilter {
        rent_type: Some(vec![mode]),
        show_price_on_request: Some(true),
        ..SearchFilter::default()
    };

    apply_location(filters, &mut backend);

    if let Some(property_type) = &filters.property_type {
        apply_property_type(property_type, &mut backend);
    }

    if let Some(price) = &filters.price_range {
        backend.rent_min = Some(price.min);
        backend.rent_max = Some(price.max);
    }

    backend
}

/// Composed filter without price bounds, used for the price histogram.
pub fn histogram_filter(filters: &SearchFilters, mode: RentBuyMode) -> SearchFilter {
    compose(filters, mode).without_price()
}

fn apply_location(filters: &SearchFilters, backend: &mut SearchFilter) {
    if let Some(location) = &filters.location_data {
        if let Some(ids) = location.within_ids() {
            backend.within_id = Some(ids.to_vec());
            return;
        }
        if let Some(bbox) = location.bbox {
            backend.bbox = Some(bbox);
            return;
        }
    }

    if filters.location.is_empty() {
        return;
    }

    match bbox_for_location(&filters.location) {
        Some(bbox) => backend.bbox = Some(bbox),
        None => {
            debug!("No static bbox for '{}', using city match", filters.location);
            backend.city = Some(filters.location.clone());
        }
    }
}

fn apply_property_type(property_type: &PropertyTypeFilter, backend: &mut SearchFilter) {
    let Some(category) = catalog::find_category(&property_type.category_id) else {
        warn!(
            "Unknown category '{}', no type constraint applied",
            property_type.category_id
        );
        return;
    };

    backend.r#type = Some(vec![category.type_id]);

    let sub_types = subtype_selection(category, &property_type.subcategories);
    if !sub_types.is_empty() {
        backend.sub_type = Some(sub_types);
    }
}

/// Backend subtype ids for a subcategory selection.
///
/// `"all"` (or nothing picked) expands to the category's full subtype list.
fn subtype_selection(category: &Category, selected: &[String]) -> Vec<u32> {
    let wants_all = selected.is_empty()
        || selected.iter().any(|id| id == ALL_SUBCATEGORIES);

    if wants_all {
        return category.subtype_ids();
    }

    let mut ids = Vec::new();
    for subcategory_id in selected {
        match category
            .subcategory(subcategory_id)
            .and_then(|sub| sub.sub_type_id)
        {
            Some(id) if !ids.contains(&id) => ids.push(id),
            Some(_) => {}
            None => warn!(
                "Subcategory '{}' not in category '{}'",
                subcategory_id, category.id
            ),
        }
    }
    ids
}
