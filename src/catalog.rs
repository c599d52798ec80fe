//! Static property taxonomy: UI categories mapped to backend type/subtype ids.

use crate::models::ALL_SUBCATEGORIES;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subcategory {
    pub id: &'static str,
    pub name: &'static str,
    pub count: u32,
    /// `None` only for the "all" row.
    pub sub_type_id: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
    pub count: u32,
    pub type_id: u32,
    pub has_subcategories: bool,
    pub subcategories: &'static [Subcategory],
}

impl Category {
    pub fn subcategory(&self, id: &str) -> Option<&'static Subcategory> {
        self.subcategories.iter().find(|sub| sub.id == id)
    }

    /// Every backend subtype id of this category, deduplicated, catalogue order.
    pub fn subtype_ids(&self) -> Vec<u32> {
        let mut ids = Vec::new();
        for sub_type_id in self
            .subcategories
            .iter()
            .filter(|sub| sub.id != ALL_SUBCATEGORIES)
            .filter_map(|sub| sub.sub_type_id)
        {
            if !ids.contains(&sub_type_id) {
                ids.push(sub_type_id);
            }
        }
        ids
    }
}

const fn all(name: &'static str, count: u32) -> Subcategory {
    Subcategory {
        id: ALL_SUBCATEGORIES,
        name,
        count,
        sub_type_id: None,
    }
}

const fn sub(id: &'static str, name: &'static str, count: u32, sub_type_id: u32) -> Subcategory {
    Subcategory {
        id,
        name,
        count,
        sub_type_id: Some(sub_type_id),
    }
}

pub const CATEGORIES: &[Category] = &[
    Category {
        id: "apartments",
        name: "Apartments",
        count: 9547,
        type_id: 2,
        has_subcategories: true,
        subcategories: &[
            all("All Subcategories", 9547),
            sub("wohnung", "Wohnung", 234, 47),
            sub("penthouse", "Penthouse", 159, 49),
            sub("genossenschaftswohnung", "Genossenschaftswohnung", 987, 50),
            sub("maisonette", "Maisonette", 857, 51),
            sub("loft-studio", "Loft/Studio", 147, 52),
            sub("dachgeschoss", "Dachgeschoss", 395, 53),
            sub("souterrain", "Souterrain", 753, 55),
            sub("erdgeschoss", "Erdgeschoß", 42, 54),
            sub("dachgeschoss-2", "Dachgeschoss", 468, 103),
            sub("sonstige-wohnungen", "Sonstige Wohnungen", 684, 200),
        ],
    },
    Category {
        id: "houses",
        name: "Houses",
        count: 8275,
        type_id: 3,
        has_subcategories: true,
        subcategories: &[
            all("Select All", 8275),
            sub("townhouse", "Townhouse", 987, 3),
            sub("single-family-house", "Single Family House", 2345, 8),
            sub("multi-family-house", "Multi-Family House", 1876, 9),
            sub("farmhouse", "Farmhouse", 654, 6),
            sub("villa", "Villa", 432, 7),
            sub("shell-construction", "Shell Construction", 747, 10),
            sub("other-house", "Other House", 432, 200),
        ],
    },
    Category {
        id: "short-term",
        name: "Short-Term Rental",
        count: 6392,
        type_id: 0,
        has_subcategories: false,
        subcategories: &[],
    },
    Category {
        id: "new-developments",
        name: "New Developments",
        count: 7529,
        type_id: 12,
        has_subcategories: false,
        subcategories: &[],
    },
    Category {
        id: "rooms",
        name: "Rooms/Co-Living",
        count: 1853,
        type_id: 1,
        has_subcategories: false,
        subcategories: &[],
    },
    Category {
        id: "office",
        name: "Office",
        count: 3012,
        type_id: 20,
        has_subcategories: true,
        subcategories: &[
            all("Select All", 3012),
            sub("other-office", "Other Office", 456, 7),
            sub("office-practice", "Office/Practice", 1234, 7),
            sub("office-center", "Office Center", 567, 7),
            sub("loft-studio", "Loft/Studio", 234, 7),
            sub("coworking-space", "Coworking Space", 321, 7),
            sub("shared-office", "Shared Office", 200, 7),
        ],
    },
    Category {
        id: "commercial",
        name: "Commercial Properties",
        count: 4960,
        type_id: 5,
        has_subcategories: true,
        subcategories: &[
            all("Select All", 4960),
            sub("gastronomy-restaurant", "Gastronomy/Restaurant", 876, 8),
            sub("agriculture-forestry", "Agriculture/Forestry", 543, 13),
            sub("shop-retail-space", "Shop/Retail Space", 1234, 8),
            sub("hotels-guesthouses", "Hotels/Guesthouses", 654, 8),
            sub("warehouse-storage-hall", "Warehouse/Storage Hall", 789, 9),
            sub("exhibition-space", "Exhibition Space", 321, 8),
            sub("commercial-property", "Commercial Property", 543, 8),
        ],
    },
    Category {
        id: "holiday-homes",
        name: "Holiday Homes",
        count: 2638,
        type_id: 11,
        has_subcategories: false,
        subcategories: &[],
    },
    Category {
        id: "plots",
        name: "Plots",
        count: 3012,
        type_id: 4,
        has_subcategories: true,
        subcategories: &[
            all("Select All", 3012),
            sub("agricultural-land", "Agricultural Land", 543, 72),
            sub("building-plot", "Building Plot", 876, 201),
            sub("forest-land", "Forest Land", 234, 73),
            sub("commercial-plot", "Commercial Plot", 543, 202),
            sub("industrial-plot", "Industrial Plot", 125, 203),
            sub("other-plot", "Other Plot", 234, 200),
        ],
    },
    Category {
        id: "parking",
        name: "Parking",
        count: 3741,
        type_id: 13,
        has_subcategories: true,
        subcategories: &[
            all("Select All", 3741),
            sub("single-garage", "Single Garage", 987, 153),
            sub("parking-space", "Parking Space", 1234, 155),
            sub("carport", "Carport", 456, 156),
            sub("double-garage", "Double Garage", 543, 154),
            sub("underground-garage", "Underground Garage", 321, 157),
            sub("underground-parking-space", "Underground Parking Space", 100, 158),
            sub(
                "parking-space-charging-station",
                "Parking Space with Charging Station",
                100,
                159,
            ),
        ],
    },
    Category {
        id: "investment",
        name: "Investment Properties",
        count: 5086,
        type_id: 21,
        has_subcategories: true,
        subcategories: &[
            all("Select All", 5086),
            sub("investment-property", "Investment Property", 2543, 114),
            sub("development-property", "Development Property", 1543, 115),
            sub("project-development", "Project Development", 1000, 116),
        ],
    },
];

pub fn find_category(id: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|category| category.id == id)
}

/// Category shown when nothing has been picked yet.
pub fn default_category() -> &'static Category {
    &CATEGORIES[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_has_unique_id() {
        for (index, category) in CATEGORIES.iter().enumerate() {
            assert!(
                CATEGORIES[index + 1..]
                    .iter()
                    .all(|other| other.id != category.id),
                "duplicate category id {}",
                category.id
            );
        }
    }

    #[test]
    fn subcategory_flag_matches_rows() {
        for category in CATEGORIES {
            assert_eq!(
                category.has_subcategories,
                !category.subcategories.is_empty(),
                "{}",
                category.id
            );
            if category.has_subcategories {
                assert_eq!(category.subcategories[0].id, ALL_SUBCATEGORIES);
            }
        }
    }

    #[test]
    fn houses_expand_to_every_subtype() {
        let houses = find_category("houses").unwrap();
        assert_eq!(houses.type_id, 3);
        assert_eq!(houses.subtype_ids(), vec![3, 8, 9, 6, 7, 10, 200]);
    }

    #[test]
    fn office_subtypes_are_deduplicated() {
        assert_eq!(find_category("office").unwrap().subtype_ids(), vec![7]);
        assert!(find_category("rooms").unwrap().subtype_ids().is_empty());
    }
}
