//! Display formatting for listing cards, popups and markers. Prices are whole euros.

pub const PRICE_ON_REQUEST: &str = "Price on request";

/// Plain amount in Austrian notation: comma decimals, no grouping.
fn de_at_amount(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded:.2}")
            .trim_end_matches('0')
            .replace('.', ",")
    }
}

/// `€1.25M`, `€12K`, `€950`; missing or zero prices are "on request".
pub fn format_price(euros: Option<f64>) -> String {
    let euros = match euros {
        Some(value) if value != 0.0 => value,
        _ => return PRICE_ON_REQUEST.to_string(),
    };

    if euros >= 1_000_000.0 {
        format!("€{:.2}M", euros / 1_000_000.0)
    } else if euros >= 1_000.0 {
        format!("€{:.0}K", euros / 1_000.0)
    } else {
        format!("€{}", de_at_amount(euros))
    }
}

/// Short price label drawn on a map marker.
pub fn marker_label(rent: Option<f64>) -> String {
    match rent {
        Some(rent) => format!("€{}", de_at_amount(rent)),
        None => "€ –".to_string(),
    }
}

pub fn format_price_per_sqm(rent_per: &[Option<f64>]) -> String {
    let Some(min) = rent_per.first().copied().flatten() else {
        return String::new();
    };
    let max = match rent_per.get(1).copied().flatten() {
        Some(max) if max != 0.0 => max,
        _ => min,
    };

    if min == max {
        format!("€{min:.0}/m²")
    } else {
        format!("€{min:.0}-{max:.0}/m²")
    }
}

pub fn format_size(size: Option<f64>) -> String {
    match size {
        Some(size) if size != 0.0 => format!("{size:.0} m²"),
        _ => String::new(),
    }
}

pub fn format_rooms(rooms: Option<f64>) -> String {
    match rooms {
        Some(rooms) if rooms == 1.0 => "1 Room".to_string(),
        Some(rooms) if rooms != 0.0 => format!("{rooms} Rooms"),
        _ => String::new(),
    }
}

pub fn format_floor(floor: Option<i32>) -> String {
    match floor {
        None => String::new(),
        Some(0) => "Ground Floor".to_string(),
        Some(floor) => format!("Floor {floor}"),
    }
}

pub fn format_address(address: &str, city: &str, zip: &str) -> String {
    format!("{address}, {zip} {city}")
}

/// `SEMI_DETACHED_HOUSE` -> `Semi Detached House`.
pub fn property_type_display(sub_type: &str) -> String {
    sub_type
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
