use crate::catalog::{self, Category};
use crate::models::{PropertyTypeFilter, ALL_SUBCATEGORIES};
use crate::store::{FilterUpdate, SearchStore};

/// What a category interaction committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryChoice {
    /// Text for the search bar; always the category name
    pub label: String,
    pub filter: PropertyTypeFilter,
    /// Whether the category popover should close
    pub close: bool,
}

/// Selection set after toggling `subcategory_id`. Never empty: clearing the
/// last entry, or unchecking "all", falls back to `["all"]`.
pub fn next_subcategory_selection(
    current: &[String],
    subcategory_id: &str,
    checked: bool,
) -> Vec<String> {
    if subcategory_id == ALL_SUBCATEGORIES {
        return vec![ALL_SUBCATEGORIES.to_string()];
    }

    let mut next: Vec<String> = if checked {
        current
            .iter()
            .filter(|id| id.as_str() != ALL_SUBCATEGORIES && id.as_str() != subcategory_id)
            .cloned()
            .chain(std::iter::once(subcategory_id.to_string()))
            .collect()
    } else {
        current
            .iter()
            .filter(|id| id.as_str() != subcategory_id)
            .cloned()
            .collect()
    };

    if next.is_empty() {
        next.push(ALL_SUBCATEGORIES.to_string());
    }
    next
}

/// Category picker backed by the store's in-progress selection.
#[derive(Debug, Clone)]
pub struct CategorySelection {
    store: SearchStore,
}

impl CategorySelection {
    pub fn new(store: SearchStore) -> Self {
        Self { store }
    }

    /// Stored category, or the first catalogue entry when none is picked.
    pub fn selected_category(&self) -> &'static Category {
        self.store
            .read(|state| state.selected_category_id.clone())
            .and_then(|id| catalog::find_category(&id))
            .unwrap_or_else(catalog::default_category)
    }

    pub fn selected_subcategories(&self) -> Vec<String> {
        self.store.read(|state| state.selected_subcategories.clone())
    }

    fn commit(&self, category: &Category, subcategories: Vec<String>, close: bool) -> CategoryChoice {
        self.store
            .set_selected_category(Some(category.id.to_string()), subcategories.clone());

        let filter = PropertyTypeFilter {
            category_id: category.id.to_string(),
            category_name: category.name.to_string(),
            subcategories,
        };
        self.store
            .update_filter(FilterUpdate::PropertyType(Some(filter.clone())));
        if close {
            self.store.close_dropdown();
        }

        CategoryChoice {
            label: category.name.to_string(),
            filter,
            close,
        }
    }

    /// Pick a category. One without subcategories is committed and closes the
    /// popover; otherwise the selection resets to "all" and the popover stays open.
    pub fn click_category(&self, category: &Category) -> CategoryChoice {
        if category.has_subcategories {
            self.commit(category, vec![ALL_SUBCATEGORIES.to_string()], false)
        } else {
            self.commit(category, Vec::new(), true)
        }
    }

    pub fn toggle_subcategory(&self, subcategory_id: &str, checked: bool) -> CategoryChoice {
        let category = self.selected_category();
        let next =
            next_subcategory_selection(&self.selected_subcategories(), subcategory_id, checked);
        self.commit(category, next, false)
    }

    pub fn is_subcategory_selected(&self, subcategory_id: &str) -> bool {
        self.store.read(|state| {
            state
                .selected_subcategories
                .iter()
                .any(|id| id == subcategory_id)
        })
    }

    /// Display names of the picked subcategories, or `["all"]`.
    pub fn selected_subcategory_names(&self) -> Vec<String> {
        let selected = self.selected_subcategories();
        if selected.iter().any(|id| id == ALL_SUBCATEGORIES) {
            return vec![ALL_SUBCATEGORIES.to_string()];
        }

        let category = self.selected_category();
        selected
            .iter()
            .filter_map(|id| category.subcategory(id))
            .map(|sub| sub.name.to_string())
            .collect()
    }
}
