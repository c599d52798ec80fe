pub mod lystio;
pub mod mapbox;
pub mod traits;
pub mod wire;

pub use lystio::LystioClient;
pub use mapbox::{session_token, MapboxGeocoder};
pub use traits::{Geocoder, LocationApi, SearchApi};
