//! Station catalog: the set of playable stations for one run.
//!
//! Two JSON sources are consulted in order (custom, then default).  The first
//! one that yields at least one usable station is used on its own; sources
//! are never merged.  Each entry is either a bare URL or an object carrying a
//! `url` field:
//!
//! ```json
//! {
//!   "fip":  "https://icecast.radiofrance.fr/fip-hifi.aac",
//!   "nts1": { "url": "https://stream-relay-geo.ntslive.net/stream", "display_name": "NTS 1" }
//! }
//! ```
use serde_json::Value;
use std::path::Path;
use tracing::{debug, error, info, warn};

use crate::protocol::Station;

#[derive(Debug, Clone, Default)]
pub struct StationCatalog {
    stations: Vec<Station>,
}

impl StationCatalog {
    pub fn new(stations: Vec<Station>) -> Self {
        Self { stations }
    }

    /// Build the catalog from the custom source, falling back to the default
    /// source only when the custom one is missing, unreadable or empty.
    pub fn load(custom: &Path, default: &Path) -> Self {
        let custom_stations = load_stations_from_json(custom);
        if !custom_stations.is_empty() {
            info!(
                "Using {} custom stations from {:?} (default list ignored)",
                custom_stations.len(),
                custom
            );
            return Self::new(custom_stations);
        }

        let default_stations = load_stations_from_json(default);
        info!(
            "No custom stations, using {} default stations from {:?}",
            default_stations.len(),
            default
        );
        if default_stations.is_empty() {
            warn!("No stations loaded, check the station files");
        }
        Self::new(default_stations)
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Station names in file order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.stations.iter().map(|s| s.name.as_str())
    }

    pub fn get(&self, idx: usize) -> Option<&Station> {
        self.stations.get(idx)
    }

    pub fn first(&self) -> Option<&Station> {
        self.stations.first()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.stations.iter().position(|s| s.name == name)
    }

    pub fn url(&self, name: &str) -> Option<&str> {
        self.stations
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.url.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }
}

/// Read one station file.  A missing or invalid file yields no stations.
pub fn load_stations_from_json(path: &Path) -> Vec<Station> {
    if !path.exists() {
        debug!("Station file not found: {:?}", path);
        return Vec::new();
    }
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            error!("Error reading {:?}: {}", path, e);
            return Vec::new();
        }
    };
    match parse_stations_from_json_str(&content) {
        Ok(stations) => stations,
        Err(e) => {
            error!("Invalid JSON in {:?}: {}", path, e);
            Vec::new()
        }
    }
}

/// Parse a station document.  Malformed entries are skipped with a warning;
/// only a document that is not a JSON object at all is an error.
pub fn parse_stations_from_json_str(content: &str) -> Result<Vec<Station>, serde_json::Error> {
    let doc: serde_json::Map<String, Value> = serde_json::from_str(content)?;
    let stations = doc
        .into_iter()
        .filter_map(|(name, value)| match station_url(&value) {
            Some(url) => Some(Station {
                name,
                url: url.to_string(),
            }),
            None => {
                warn!("Invalid station format for '{}': {}", name, value);
                None
            }
        })
        .collect();
    Ok(stations)
}

fn station_url(value: &Value) -> Option<&str> {
    let url = match value {
        Value::String(url) => url.as_str(),
        Value::Object(record) => record.get("url")?.as_str()?,
        _ => return None,
    };
    let url = url.trim();
    (!url.is_empty()).then_some(url)
}
