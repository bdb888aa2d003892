//! lookup.rs — the spawn lookup capability and its HTTP-backed adapter.
//!
//! The core only sees the `SpawnLookup` trait; the map service's wire shape is
//! contained here. Calls are serialized by the scheduler (one outstanding
//! request at a time) to respect the remote rate limits.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use crate::geo::Coordinate;
use crate::spawn::RawObservation;

#[derive(Debug, Error)]
pub enum LookupError {
    /// Network/timeout/throttling: this cell yields nothing this cycle.
    #[error("transient lookup failure at ({lat:.5}, {lon:.5}): {reason}")]
    Transient { lat: f64, lon: f64, reason: String },
    /// Credentials rejected: aborts the whole run, no retry loop.
    #[error("authentication rejected by map service: {0}")]
    AuthRejected(String),
}

#[async_trait]
pub trait SpawnLookup {
    /// One remote round-trip: zero or more raw observations near `cell`.
    async fn lookup(&self, cell: Coordinate) -> Result<Vec<RawObservation>, LookupError>;
}

/// Raw record as the map service sends it. Validated into a `RawObservation`
/// before anything downstream touches it.
#[derive(Debug, Deserialize)]
struct WireObservation {
    encounter_id: String,
    spawn_point_id: String,
    pokemon_id: u32,
    pokemon_name: String,
    latitude: f64,
    longitude: f64,
    /// Unix millis, as the service reports it.
    disappear_time_ms: i64,
}

impl WireObservation {
    fn validate(self) -> Result<RawObservation, String> {
        let position = Coordinate::new(self.latitude, self.longitude);
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return Err(format!(
                "non-finite position for encounter {}",
                self.encounter_id
            ));
        }
        let disappear_time: DateTime<Utc> = Utc
            .timestamp_millis_opt(self.disappear_time_ms)
            .single()
            .ok_or_else(|| {
                format!(
                    "bad disappear_time {} for encounter {}",
                    self.disappear_time_ms, self.encounter_id
                )
            })?;
        if self.pokemon_name.is_empty() {
            return Err(format!("empty species name for encounter {}", self.encounter_id));
        }
        Ok(RawObservation {
            // Species + spawn point + encounter token: stable per spawn instance,
            // never species alone.
            identity: format!(
                "{}:{}:{}",
                self.pokemon_id, self.spawn_point_id, self.encounter_id
            ),
            species_id: self.pokemon_id,
            species_name: self.pokemon_name,
            position,
            disappear_time,
        })
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

/// Reqwest-backed adapter for the remote map API.
pub struct MapClient {
    base_url: String,
    auth_service: String,
    username: String,
    password: String,
    token: Option<String>,
    client: Client,
}

impl MapClient {
    pub fn new(base_url: String, auth_service: String, username: String, password: String) -> Self {
        Self {
            base_url,
            auth_service,
            username,
            password,
            token: None,
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Authenticate once per run. A 401/403 is fatal; anything else is a
    /// transient network condition the caller may surface as it sees fit.
    pub async fn login(&mut self) -> Result<(), LookupError> {
        let url = format!("{}/login", self.base_url);
        let body = serde_json::json!({
            "auth_service": self.auth_service,
            "username": self.username,
            "password": self.password,
        });
        let rsp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LookupError::Transient {
                lat: 0.0,
                lon: 0.0,
                reason: format!("login request failed: {e}"),
            })?;

        if rsp.status() == StatusCode::UNAUTHORIZED || rsp.status() == StatusCode::FORBIDDEN {
            return Err(LookupError::AuthRejected(format!(
                "{} for user {}",
                rsp.status(),
                self.username
            )));
        }
        let rsp = rsp.error_for_status().map_err(|e| LookupError::Transient {
            lat: 0.0,
            lon: 0.0,
            reason: format!("login HTTP error: {e}"),
        })?;
        let login: LoginResponse = rsp.json().await.map_err(|e| LookupError::Transient {
            lat: 0.0,
            lon: 0.0,
            reason: format!("login response decode: {e}"),
        })?;
        self.token = Some(login.token);
        Ok(())
    }
}

#[async_trait]
impl SpawnLookup for MapClient {
    async fn lookup(&self, cell: Coordinate) -> Result<Vec<RawObservation>, LookupError> {
        let transient = |reason: String| LookupError::Transient {
            lat: cell.latitude,
            lon: cell.longitude,
            reason,
        };

        let token = self
            .token
            .as_deref()
            .ok_or_else(|| LookupError::AuthRejected("lookup before login".into()))?;

        let url = format!("{}/map", self.base_url);
        let rsp = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[
                ("lat", cell.latitude.to_string()),
                ("lon", cell.longitude.to_string()),
            ])
            .send()
            .await
            .map_err(|e| transient(format!("request failed: {e}")))?;

        if rsp.status() == StatusCode::UNAUTHORIZED || rsp.status() == StatusCode::FORBIDDEN {
            return Err(LookupError::AuthRejected(rsp.status().to_string()));
        }
        let rsp = rsp
            .error_for_status()
            .map_err(|e| transient(format!("HTTP error: {e}")))?;

        let wire: Vec<WireObservation> = rsp
            .json()
            .await
            .map_err(|e| transient(format!("response decode: {e}")))?;

        let mut out = Vec::with_capacity(wire.len());
        for w in wire {
            match w.validate() {
                Ok(obs) => out.push(obs),
                Err(reason) => {
                    tracing::warn!(
                        lat = cell.latitude,
                        lon = cell.longitude,
                        %reason,
                        "dropping malformed observation"
                    );
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_observation_validates_into_raw() {
        let w = WireObservation {
            encounter_id: "e1".into(),
            spawn_point_id: "sp9".into(),
            pokemon_id: 149,
            pokemon_name: "Dragonite".into(),
            latitude: 40.0,
            longitude: -75.0,
            disappear_time_ms: 1_700_000_000_000,
        };
        let obs = w.validate().unwrap();
        assert_eq!(obs.identity, "149:sp9:e1");
        assert_eq!(obs.species_name, "Dragonite");
        assert_eq!(obs.disappear_time.timestamp(), 1_700_000_000);
    }

    #[test]
    fn malformed_records_are_rejected() {
        let w = WireObservation {
            encounter_id: "e2".into(),
            spawn_point_id: "sp1".into(),
            pokemon_id: 16,
            pokemon_name: String::new(),
            latitude: 40.0,
            longitude: -75.0,
            disappear_time_ms: 0,
        };
        assert!(w.validate().is_err());

        let w = WireObservation {
            encounter_id: "e3".into(),
            spawn_point_id: "sp1".into(),
            pokemon_id: 16,
            pokemon_name: "Pidgey".into(),
            latitude: f64::NAN,
            longitude: -75.0,
            disappear_time_ms: 1_700_000_000_000,
        };
        assert!(w.validate().is_err());
    }
}
