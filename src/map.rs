//! Typed model of what the external map loader hands the core: named tile
//! layers (grids of tile ids with coordinates) and named object layers
//! (positioned rectangles with string-keyed property bags). The demo data
//! ships as RON, but nothing here depends on the on-disk format beyond
//! `MapSource::load`.

use crate::errors::{MapDataError, MapDataResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

// Layer names every map must provide. Validation fails fast naming the
// first one missing.
pub const TILE_LAYERS: [&str; 2] = ["Terrain", "Terrain Top"];
pub const OBJECT_LAYERS: [&str; 7] = [
    "Water",
    "Coast",
    "Objects",
    "Collisions",
    "Monsters",
    "Entities",
    "Transition",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilePlacement {
    pub col: u32,
    pub row: u32,
    /// Tile id within the map's tileset; opaque to the core
    pub tile_id: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TileLayer {
    pub tiles: Vec<TilePlacement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Str(String),
    Int(i64),
    Float(f32),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapObject {
    #[serde(default)]
    pub name: Option<String>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub properties: HashMap<String, PropertyValue>,
}

impl MapObject {
    fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("({}, {})", self.x, self.y))
    }

    /// Required string property; absence or wrong type is fatal.
    pub fn property_str(&self, layer: &str, property: &str) -> MapDataResult<&str> {
        match self.properties.get(property) {
            Some(PropertyValue::Str(value)) => Ok(value),
            Some(_) => Err(MapDataError::PropertyType {
                layer: layer.to_string(),
                object: self.label(),
                property: property.to_string(),
                expected: "string",
            }),
            None => Err(MapDataError::MissingProperty {
                layer: layer.to_string(),
                object: self.label(),
                property: property.to_string(),
            }),
        }
    }

    /// Required integer property; absence or wrong type is fatal.
    pub fn property_int(&self, layer: &str, property: &str) -> MapDataResult<i64> {
        match self.properties.get(property) {
            Some(PropertyValue::Int(value)) => Ok(*value),
            Some(_) => Err(MapDataError::PropertyType {
                layer: layer.to_string(),
                object: self.label(),
                property: property.to_string(),
                expected: "integer",
            }),
            None => Err(MapDataError::MissingProperty {
                layer: layer.to_string(),
                object: self.label(),
                property: property.to_string(),
            }),
        }
    }

    /// Optional float property with a fallback.
    pub fn property_float_or(&self, property: &str, default: f32) -> f32 {
        match self.properties.get(property) {
            Some(PropertyValue::Float(value)) => *value,
            Some(PropertyValue::Int(value)) => *value as f32,
            _ => default,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObjectLayer {
    pub objects: Vec<MapObject>,
}

/// One loaded map: everything the world setup pass consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSource {
    pub name: String,
    pub tile_layers: HashMap<String, TileLayer>,
    pub object_layers: HashMap<String, ObjectLayer>,
}

impl MapSource {
    /// Load a single map file.
    pub fn load(path: &Path) -> MapDataResult<MapSource> {
        let content = fs::read_to_string(path)
            .map_err(|e| MapDataError::MalformedData(format!("{}: {}", path.display(), e)))?;
        let source: MapSource =
            ron::from_str(&content).map_err(|e| MapDataError::MalformedData(e.to_string()))?;
        source.validate()?;
        Ok(source)
    }

    /// Load every `.ron` map under `data/maps/`, keyed by map id (file stem).
    pub fn load_all(data_path: &Path) -> MapDataResult<HashMap<String, MapSource>> {
        let maps_dir = data_path.join("maps");
        let entries = fs::read_dir(&maps_dir)
            .map_err(|e| MapDataError::MalformedData(format!("{}: {}", maps_dir.display(), e)))?;

        let mut maps = HashMap::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| MapDataError::MalformedData(e.to_string()))?;
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("ron") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    maps.insert(stem.to_string(), MapSource::load(&path)?);
                }
            }
        }
        Ok(maps)
    }

    /// Check that every required layer exists. The game cannot render an
    /// incomplete map, so the first gap aborts setup.
    pub fn validate(&self) -> MapDataResult<()> {
        for layer in TILE_LAYERS {
            if !self.tile_layers.contains_key(layer) {
                return Err(MapDataError::MissingTileLayer {
                    map: self.name.clone(),
                    layer: layer.to_string(),
                });
            }
        }
        for layer in OBJECT_LAYERS {
            if !self.object_layers.contains_key(layer) {
                return Err(MapDataError::MissingObjectLayer {
                    map: self.name.clone(),
                    layer: layer.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn tile_layer(&self, layer: &str) -> MapDataResult<&TileLayer> {
        self.tile_layers
            .get(layer)
            .ok_or_else(|| MapDataError::MissingTileLayer {
                map: self.name.clone(),
                layer: layer.to_string(),
            })
    }

    pub fn object_layer(&self, layer: &str) -> MapDataResult<&ObjectLayer> {
        self.object_layers
            .get(layer)
            .ok_or_else(|| MapDataError::MissingObjectLayer {
                map: self.name.clone(),
                layer: layer.to_string(),
            })
    }
}
