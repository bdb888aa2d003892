//! geocode.rs — one-shot place-name resolution at startup.
//!
//! External collaborator shim: a Nominatim-style lookup over HTTP, plus a
//! literal `"lat,lon"` shortcut so tests and fixed deployments skip the
//! network entirely.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::geo::Coordinate;

#[derive(Debug, Deserialize)]
struct GeocodeHit {
    lat: String,
    lon: String,
    display_name: String,
}

fn parse_literal(place: &str) -> Option<Coordinate> {
    let (lat, lon) = place.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lon: f64 = lon.trim().parse().ok()?;
    Some(Coordinate::new(lat, lon))
}

/// Resolve a human-readable place to a coordinate and a display name.
pub async fn resolve(place: &str) -> Result<(Coordinate, String)> {
    if let Some(pos) = parse_literal(place) {
        return Ok((pos, place.to_string()));
    }

    let endpoint = std::env::var("GEOCODER_URL")
        .unwrap_or_else(|_| "https://nominatim.openstreetmap.org/search".into());
    let client = reqwest::Client::builder()
        .user_agent("spawn-sentry/0.1")
        .timeout(std::time::Duration::from_secs(10))
        .build()?;
    let hits: Vec<GeocodeHit> = client
        .get(&endpoint)
        .query(&[("q", place), ("format", "json"), ("limit", "1")])
        .send()
        .await
        .context("geocoder request")?
        .error_for_status()
        .context("geocoder non-2xx")?
        .json()
        .await
        .context("geocoder response decode")?;

    let hit = hits
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("no geocoder result for {place:?}"))?;
    let lat: f64 = hit.lat.parse().context("geocoder latitude")?;
    let lon: f64 = hit.lon.parse().context("geocoder longitude")?;
    Ok((Coordinate::new(lat, lon), hit.display_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_lat_lon_skips_the_network() {
        let pos = parse_literal("40.7128, -74.0060").unwrap();
        assert!((pos.latitude - 40.7128).abs() < 1e-9);
        assert!((pos.longitude + 74.0060).abs() < 1e-9);
        assert!(parse_literal("Philadelphia, PA").is_none());
        assert!(parse_literal("nowhere").is_none());
    }
}
