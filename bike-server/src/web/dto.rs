//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::definitions::ResolvedDefinition;
use crate::domain::{BoundingBox, Network, Station};
use crate::geo::Coordinate;

/// A configured provider.
#[derive(Debug, Serialize)]
pub struct ProviderInfo {
    pub id: String,
    pub name: String,

    /// Backend implementing the provider
    pub backend: String,

    /// Display metadata from the definition file
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl ProviderInfo {
    pub fn from_definition(definition: ResolvedDefinition) -> Self {
        let backend = definition.backend_kind().to_string();
        Self {
            id: definition.id,
            name: definition.definition.name,
            backend,
            metadata: definition.definition.metadata,
        }
    }
}

/// Response listing providers.
#[derive(Debug, Serialize)]
pub struct ProvidersResponse {
    pub providers: Vec<ProviderInfo>,

    /// Id of the provider used when none is chosen
    pub default: String,
}

/// Provider to resolve; the default provider when absent.
#[derive(Debug, Default, Deserialize)]
pub struct ProviderQuery {
    pub id: Option<String>,
}

/// The provider that will serve a request.
#[derive(Debug, Serialize)]
pub struct ResolvedProviderResponse {
    /// Id asked for, after defaulting
    pub requested: String,
    pub id: String,
    pub name: String,

    /// Whether the requested provider failed and the default was used
    pub fallback: bool,
}

/// Optional origin for distance ordering.
#[derive(Debug, Default, Deserialize)]
pub struct OriginQuery {
    /// Longitude
    pub x: Option<f64>,

    /// Latitude
    pub y: Option<f64>,
}

impl OriginQuery {
    /// The origin, if both coordinates were given.
    pub fn origin(&self) -> Option<Coordinate> {
        match (self.x, self.y) {
            (Some(x), Some(y)) => Some(Coordinate::new(x, y)),
            _ => None,
        }
    }
}

/// Response listing networks.
#[derive(Debug, Serialize)]
pub struct NetworksResponse {
    pub networks: Vec<Network>,
}

/// Bounding box and limit for station queries.
///
/// The box is all-or-nothing: either every bound is given or none is.
#[derive(Debug, Default, Deserialize)]
pub struct BoundsQuery {
    pub xmin: Option<f64>,
    pub xmax: Option<f64>,
    pub ymin: Option<f64>,
    pub ymax: Option<f64>,

    /// Maximum stations to return, capped by the server's limit
    pub limit: Option<usize>,
}

impl BoundsQuery {
    /// The requested box, `None` for no bounds, or an error for partial bounds.
    pub fn bbox(&self) -> Result<Option<BoundingBox>, String> {
        match (self.xmin, self.xmax, self.ymin, self.ymax) {
            (None, None, None, None) => Ok(None),
            (Some(xmin), Some(xmax), Some(ymin), Some(ymax)) => {
                Ok(Some(BoundingBox::new(xmin, xmax, ymin, ymax)))
            }
            _ => Err("bounding box needs all of xmin, xmax, ymin and ymax".to_string()),
        }
    }

    /// The requested limit, capped at `max`.
    pub fn limit(&self, max: usize) -> usize {
        self.limit.map_or(max, |limit| limit.min(max))
    }
}

/// Response listing stations of one network.
#[derive(Debug, Serialize)]
pub struct StationsResponse {
    pub provider: String,
    pub network: String,
    pub stations: Vec<Station>,
}

/// Center of a network's cached stations; both fields null when nothing is cached.
#[derive(Debug, PartialEq, Serialize)]
pub struct CenterResponse {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl From<Option<Coordinate>> for CenterResponse {
    fn from(center: Option<Coordinate>) -> Self {
        Self {
            x: center.map(|c| c.x),
            y: center.map(|c| c.y),
        }
    }
}

/// Number of cached stations in a box.
#[derive(Debug, Serialize)]
pub struct TotalResponse {
    pub total: usize,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
