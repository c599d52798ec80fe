//! Popover interactions that turn user picks into committed filters.

pub mod category;
pub mod district;
pub mod location;
pub mod price;
pub mod typeahead;

pub use category::{next_subcategory_selection, CategoryChoice, CategorySelection};
pub use district::DistrictSelection;
pub use location::LocationSelection;
pub use price::{PriceBounds, PricePicker};
pub use typeahead::{Debouncer, Key, LocationPick, LocationSearch};
