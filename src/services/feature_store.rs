use crate::error::{AppError, Result};
use geojson::{FeatureCollection, GeoJson};
use std::path::Path;
use std::sync::Arc;

/// The building's feature collection, loaded once at startup and shared
/// read-only between requests.
#[derive(Debug, Clone)]
pub struct FeatureStore {
    collection: Arc<FeatureCollection>,
}

impl FeatureStore {
    pub fn new(collection: FeatureCollection) -> Self {
        FeatureStore {
            collection: Arc::new(collection),
        }
    }

    pub fn empty() -> Self {
        FeatureStore::new(FeatureCollection {
            bbox: None,
            features: Vec::new(),
            foreign_members: None,
        })
    }

    /// Read a GeoJSON file. A bare Feature is wrapped in a collection.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::FeatureData(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let store = Self::parse(&raw)?;

        tracing::info!(
            path = %path.display(),
            features = store.len(),
            "Loaded feature collection"
        );
        Ok(store)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let geojson: GeoJson = raw
            .parse()
            .map_err(|e| AppError::FeatureData(format!("Invalid GeoJSON: {}", e)))?;

        let collection = match geojson {
            GeoJson::FeatureCollection(fc) => fc,
            GeoJson::Feature(feature) => FeatureCollection {
                bbox: None,
                features: vec![feature],
                foreign_members: None,
            },
            GeoJson::Geometry(_) => {
                return Err(AppError::FeatureData(
                    "Expected a Feature or FeatureCollection, found a bare geometry".to_string(),
                ))
            }
        };
        Ok(FeatureStore::new(collection))
    }

    pub fn collection(&self) -> Arc<FeatureCollection> {
        Arc::clone(&self.collection)
    }

    pub fn len(&self) -> usize {
        self.collection.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.features.is_empty()
    }
}

impl Default for FeatureStore {
    fn default() -> Self {
        FeatureStore::empty()
    }
}
