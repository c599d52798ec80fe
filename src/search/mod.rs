pub mod compose;
pub mod facets;
pub mod filter;
pub mod pagination;

#[cfg(test)]
pub(crate) mod testing;

pub use compose::{compose, histogram_filter};
pub use facets::FacetQueries;
pub use filter::{Paging, SearchFilter, SearchInput, SearchSort, SortOrder};
pub use pagination::{PropertyAccumulator, PropertySearch, SearchStatus, SearchView, PAGE_SIZE};
