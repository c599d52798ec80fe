use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use estate_scout::catalog;
use estate_scout::client::SearchApi;
use estate_scout::models::{Property, UiMode};
use estate_scout::search::{FacetQueries, PropertySearch, SearchStatus};
use estate_scout::selection::{CategorySelection, LocationSelection, PricePicker};
use estate_scout::store::{ModeStore, SearchStore};
use estate_scout::utils::format::{
    format_address, format_floor, format_price, format_price_per_sqm, format_rooms, format_size,
};
use estate_scout::utils::location::{bbox_from_radius, format_bbox};
use estate_scout::utils::center_for_location;
use estate_scout::Config;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Search marketplace listings from the command line
#[derive(Debug, Parser)]
#[command(name = "estate-scout", version)]
struct Cli {
    #[command(flatten)]
    config: Config,

    /// Place to search in, e.g. "Vienna" or "Graz"
    #[arg(long, default_value = "Vienna")]
    location: String,

    /// Search within this many km of the city center instead of the whole city
    #[arg(long, value_name = "km")]
    radius_km: Option<f64>,

    /// Category id, e.g. "apartments" or "houses"
    #[arg(long)]
    category: Option<String>,

    /// Subcategory id; repeat to pick several
    #[arg(long = "subcategory", value_name = "id")]
    subcategories: Vec<String>,

    #[arg(long)]
    min_price: Option<f64>,

    #[arg(long)]
    max_price: Option<f64>,

    /// rent, buy or ai
    #[arg(long, default_value = "rent")]
    mode: UiMode,

    /// Number of result pages to load
    #[arg(long, default_value_t = 1)]
    pages: u32,

    /// Only print the number of matches and the price distribution
    #[arg(long)]
    count_only: bool,

    /// Write the accumulated listings to this JSON file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Also write each listing to `<dir>/<id>.json`
    #[arg(long, value_name = "dir")]
    raw_dir: Option<PathBuf>,
}

fn apply_filters(cli: &Cli, store: &SearchStore, mode: UiMode) -> Result<()> {
    let locations = LocationSelection::new(store.clone());
    let center = center_for_location(&cli.location);
    match (cli.radius_km, center) {
        (Some(radius_km), Some(center)) => {
            let bbox = bbox_from_radius(center, radius_km);
            locations.select_location_with_bbox(&cli.location, bbox, Some(center));
        }
        (Some(_), None) => bail!("No known center for '{}'", cli.location),
        (None, _) if cli.location.eq_ignore_ascii_case("vienna") => {
            locations.select_default_vienna()
        }
        (None, _) => locations.select_location(&cli.location),
    }
    if let Some(bbox) = store.filters().display_bbox() {
        info!("📍 {} ({})", cli.location, format_bbox(bbox));
    }

    if let Some(category_id) = &cli.category {
        let Some(category) = catalog::find_category(category_id) else {
            bail!("Unknown category '{}'", category_id);
        };
        let categories = CategorySelection::new(store.clone());
        categories.click_category(category);
        for subcategory in &cli.subcategories {
            if category.subcategory(subcategory).is_none() {
                warn!("'{}' is not a subcategory of {}", subcategory, category.name);
                continue;
            }
            categories.toggle_subcategory(subcategory, true);
        }
    }

    if cli.min_price.is_some() || cli.max_price.is_some() {
        let mut picker = PricePicker::new(store.clone(), mode);
        let bounds = picker.bounds();
        picker.change(
            cli.min_price.unwrap_or(bounds.min),
            cli.max_price.unwrap_or(bounds.max),
        );
        picker.apply();
    }

    Ok(())
}

fn print_property(index: usize, property: &Property) {
    let title = property.title.as_deref().unwrap_or("Untitled listing");
    println!("{}. {} ({})", index + 1, title, format_price(property.rent));

    let address = format_address(
        property.address.as_deref().unwrap_or_default(),
        property.city.as_deref().unwrap_or_default(),
        property.zip.as_deref().unwrap_or_default(),
    );
    if !address.is_empty() {
        println!("   {}", address);
    }

    let details: Vec<String> = [
        format_size(property.size),
        format_rooms(property.rooms),
        format_floor(property.floor),
        format_price_per_sqm(&property.rent_per),
    ]
    .into_iter()
    .filter(|detail| !detail.is_empty())
    .collect();
    if !details.is_empty() {
        println!("   {}", details.join(" · "));
    }
    if let Some(photo) = property.first_photo() {
        println!("   Photo: {}", photo);
    }
    println!("   ID: {}", property.id);
    println!();
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let client = cli
        .config
        .search_client()
        .context("Failed to create HTTP client")?;
    info!("🏠 Estate Scout - {} search", client.source_name());

    let store = SearchStore::new();
    let modes = ModeStore::new(cli.mode);
    apply_filters(&cli, &store, modes.mode())?;

    let api: Arc<dyn SearchApi> = Arc::new(client);
    if cli.count_only {
        let facets = FacetQueries::new(Arc::clone(&api), store.clone());
        let filters = store.filters();
        let count = facets.refresh_count(&filters, modes.api_mode()).await?;
        facets.refresh_histogram(&filters, modes.api_mode()).await?;
        println!("{} listings match", count);
        if let Some(histogram) = facets.histogram() {
            if let (Some(min), Some(max)) = histogram.range {
                println!(
                    "Prices from {} to {} across {} buckets",
                    format_price(Some(min)),
                    format_price(Some(max)),
                    histogram.histogram.len()
                );
            }
        }
        return Ok(());
    }

    let mut search = PropertySearch::new(api);
    search.set_query(&store.filters(), modes.api_mode());
    store.set_searching(true);
    search.load_pages(cli.pages).await;
    store.set_searching(false);

    match search.status() {
        SearchStatus::Disabled => bail!("No location given"),
        SearchStatus::Failed => {
            let message = search.view().error.unwrap_or_default();
            bail!("Search failed: {}", message);
        }
        SearchStatus::Empty => {
            info!("No listings match \"{}\"", store.filters().location);
            return Ok(());
        }
        SearchStatus::Loading | SearchStatus::Ready => {}
    }

    if let Some(error) = search.error() {
        warn!("Stopped paging early: {}", error);
    }

    let pagination = search.pagination();
    info!(
        "✅ Loaded {} of {} listings (page {}/{})",
        search.properties().len(),
        pagination.total,
        pagination.page,
        pagination.total_pages
    );

    for (i, property) in search.properties().iter().enumerate() {
        print_property(i, property);
    }

    if let Some(path) = &cli.output {
        let json = serde_json::to_string_pretty(search.properties())?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("💾 Saved {} listings to {}", search.properties().len(), path.display());
    }

    if let Some(dir) = &cli.raw_dir {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        for property in search.properties() {
            let path = dir.join(format!("{}.json", property.id));
            let json = serde_json::to_string_pretty(property)?;
            tokio::fs::write(&path, json).await?;
        }
        info!("💾 Saved {} individual listing files to {}", search.properties().len(), dir.display());
    }

    Ok(())
}
