use crate::models::{PriceRangeFilter, UiMode};
use crate::store::{FilterUpdate, SearchStore};

/// Slider limits for one mode, in euros.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBounds {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl PriceBounds {
    pub fn for_mode(mode: UiMode) -> Self {
        match mode {
            UiMode::Rent | UiMode::Ai => Self {
                min: 400.0,
                max: 20_000.0,
                step: 100.0,
            },
            UiMode::Buy => Self {
                min: 10_000.0,
                max: 2_000_000.0,
                step: 10_000.0,
            },
        }
    }

    fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Thousands separated with dots, e.g. `1.250`.
fn grouped(value: f64) -> String {
    let digits = format!("{:.0}", value.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    if value < 0.0 {
        out.insert(0, '-');
    }
    out
}

/// Slider label: full amounts for rent, abbreviated for buy.
pub fn format_slider_price(mode: UiMode, price: f64) -> String {
    match mode {
        UiMode::Rent | UiMode::Ai => format!("€{}", grouped(price)),
        UiMode::Buy if price >= 1_000_000.0 => format!("€{:.1}M", price / 1_000_000.0),
        UiMode::Buy if price >= 1_000.0 => format!("€{:.0}K", price / 1_000.0),
        UiMode::Buy => format!("€{}", grouped(price)),
    }
}

/// Working range of the price popover; committed only on [`PricePicker::apply`].
#[derive(Debug, Clone)]
pub struct PricePicker {
    store: SearchStore,
    mode: UiMode,
    range: (f64, f64),
}

impl PricePicker {
    pub fn new(store: SearchStore, mode: UiMode) -> Self {
        let mut picker = Self {
            store,
            mode,
            range: (0.0, 0.0),
        };
        picker.sync();
        picker
    }

    /// Reload the working range from the committed filter, or the full bounds.
    pub fn sync(&mut self) {
        let bounds = self.bounds();
        self.range = self
            .store
            .read(|state| state.filters.price_range.as_ref().map(|p| (p.min, p.max)))
            .unwrap_or((bounds.min, bounds.max));
    }

    pub fn set_mode(&mut self, mode: UiMode) {
        if self.mode != mode {
            self.mode = mode;
            self.sync();
        }
    }

    pub fn mode(&self) -> UiMode {
        self.mode
    }

    pub fn bounds(&self) -> PriceBounds {
        PriceBounds::for_mode(self.mode)
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Move the slider handles; values are kept inside the bounds and ordered.
    pub fn change(&mut self, min: f64, max: f64) {
        let bounds = self.bounds();
        let (low, high) = if min <= max { (min, max) } else { (max, min) };
        self.range = (bounds.clamp(low), bounds.clamp(high));
    }

    /// Commit the working range as the price filter.
    pub fn apply(&self) -> PriceRangeFilter {
        let filter = PriceRangeFilter::eur(self.range.0, self.range.1);
        self.store
            .update_filter(FilterUpdate::PriceRange(Some(filter.clone())));
        filter
    }

    pub fn format(&self, price: f64) -> String {
        format_slider_price(self.mode, price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RentBuyMode;
    use crate::search::compose;
    use rstest::rstest;

    #[rstest]
    #[case(UiMode::Rent, 1250.0, "€1.250")]
    #[case(UiMode::Ai, 400.0, "€400")]
    #[case(UiMode::Buy, 350_000.0, "€350K")]
    #[case(UiMode::Buy, 1_500_000.0, "€1.5M")]
    #[case(UiMode::Rent, 20_000.0, "€20.000")]
    fn slider_labels(#[case] mode: UiMode, #[case] price: f64, #[case] expected: &str) {
        assert_eq!(format_slider_price(mode, price), expected);
    }

    #[test]
    fn starts_at_full_bounds() {
        let picker = PricePicker::new(SearchStore::new(), UiMode::Buy);
        assert_eq!(picker.range(), (10_000.0, 2_000_000.0));
    }

    #[test]
    fn apply_commits_euros_verbatim() {
        let store = SearchStore::new();
        let mut picker = PricePicker::new(store.clone(), UiMode::Rent);
        picker.change(500.0, 1500.0);
        let filter = picker.apply();

        assert_eq!(filter.currency, "EUR");
        assert_eq!(store.filters().price_range, Some(filter));

        let backend = compose(&store.filters(), RentBuyMode::Rent);
        assert_eq!(backend.rent_min, Some(500.0));
        assert_eq!(backend.rent_max, Some(1500.0));
    }

    #[test]
    fn change_clamps_and_orders() {
        let mut picker = PricePicker::new(SearchStore::new(), UiMode::Rent);
        picker.change(50_000.0, 100.0);
        assert_eq!(picker.range(), (400.0, 20_000.0));
    }

    #[test]
    fn mode_switch_resets_to_new_bounds() {
        let mut picker = PricePicker::new(SearchStore::new(), UiMode::Rent);
        picker.change(600.0, 900.0);
        picker.set_mode(UiMode::Buy);
        assert_eq!(picker.range(), (10_000.0, 2_000_000.0));
    }
}
