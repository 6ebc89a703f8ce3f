use crate::error::{AlertsError, AlertsErrorExt};
use crate::model::Location;
use dayqhi_domain::config::GeocoderConfig;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

/// Client for a Nominatim-compatible `/search` endpoint.
#[derive(Debug, Clone)]
pub struct Geocoder {
    client: reqwest::Client,
    search_url: String,
}

impl Geocoder {
    /// # Errors
    /// Fails if the HTTP client cannot be built.
    pub fn new(config: &GeocoderConfig) -> Result<Self, AlertsError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_seconds.max(1)))
            .build()
            .context("Building geocoder client")?;

        Ok(Self { client, search_url: format!("{}/search", config.url.trim_end_matches('/')) })
    }

    /// Resolves `address` to the coordinates of the best match.
    ///
    /// # Errors
    /// * [`AlertsError::NoGeocodingResult`] when nothing matches.
    /// * [`AlertsError::Geocoder`] on transport or HTTP status failures.
    /// * [`AlertsError::GeocoderResponse`] when the coordinates cannot be parsed.
    #[instrument(skip(self))]
    pub async fn locate(&self, address: &str) -> Result<Location, AlertsError> {
        let places: Vec<Place> = self
            .client
            .get(&self.search_url)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .context("Requesting geocoder")?
            .error_for_status()
            .context("Geocoder returned an error status")?
            .json()
            .await
            .context("Decoding geocoder response")?;

        let place = places.into_iter().next().ok_or_else(|| AlertsError::NoGeocodingResult {
            message: format!("No geolocation data found for address: {address}").into(),
            context: None,
        })?;

        let location =
            Location { latitude: coordinate(&place.lat)?, longitude: coordinate(&place.lon)? };
        debug!(latitude = location.latitude, longitude = location.longitude, "Address resolved");

        location.validate().map_err(|e| AlertsError::GeocoderResponse {
            message: e.to_string().into(),
            context: None,
        })
    }
}

fn coordinate(raw: &str) -> Result<f64, AlertsError> {
    raw.trim().parse::<f64>().map_err(|e| AlertsError::GeocoderResponse {
        message: format!("Unparsable coordinate '{raw}': {e}").into(),
        context: None,
    })
}
