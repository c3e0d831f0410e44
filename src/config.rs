// src/config.rs

use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::document::Coord;
use crate::error::MapError;

/// Editor settings. Every field is optional in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Grid extent; valid cells are `0..grid_rows` x `0..grid_cols`.
    pub grid_rows: i32,
    pub grid_cols: i32,
    /// Prefix of generated tile ids (`tile1`, `tile2`, ...).
    pub tile_id_prefix: String,
    pub door_id_prefix: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_rows: 100,
            grid_cols: 100,
            tile_id_prefix: "tile".to_string(),
            door_id_prefix: "door".to_string(),
        }
    }
}

impl EditorConfig {
    /// Reads a JSON config file. Missing keys take their default values.
    pub fn load(path: &Path) -> Result<Self, MapError> {
        let text = fs::read_to_string(path)?;
        let config: EditorConfig = serde_json::from_str(&text)?;
        config.validate()?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// `load` when a path is given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, MapError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// The grid needs at least one row and one column.
    pub fn validate(&self) -> Result<(), MapError> {
        for (field, extent) in [("grid_rows", self.grid_rows), ("grid_cols", self.grid_cols)] {
            if extent <= 0 {
                return Err(MapError::InvalidField {
                    field: field.to_string(),
                    reason: format!("must be positive, got {}", extent),
                });
            }
        }
        Ok(())
    }

    pub fn in_bounds(&self, coord: Coord) -> bool {
        (0..self.grid_rows).contains(&coord.row) && (0..self.grid_cols).contains(&coord.col)
    }

    pub fn check_bounds(&self, coord: Coord) -> Result<(), MapError> {
        if self.in_bounds(coord) {
            Ok(())
        } else {
            Err(MapError::OutOfBounds(coord))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tgmap.json");
        fs::write(&path, r#"{"grid_rows": 20, "door_id_prefix": "gate"}"#).unwrap();

        let config = EditorConfig::load(&path).unwrap();
        assert_eq!(config.grid_rows, 20);
        assert_eq!(config.grid_cols, 100);
        assert_eq!(config.tile_id_prefix, "tile");
        assert_eq!(config.door_id_prefix, "gate");
    }

    #[test]
    fn test_non_positive_extent_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tgmap.json");
        fs::write(&path, r#"{"grid_cols": 0}"#).unwrap();
        assert!(matches!(
            EditorConfig::load(&path),
            Err(MapError::InvalidField { field, .. }) if field == "grid_cols"
        ));

        fs::write(&path, r#"{"grid_rows": -4}"#).unwrap();
        assert!(matches!(
            EditorConfig::load(&path),
            Err(MapError::InvalidField { field, .. }) if field == "grid_rows"
        ));
        assert!(EditorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_bounds_exclude_negatives_and_extent() {
        let config = EditorConfig::default();
        assert!(config.in_bounds(Coord::new(0, 0)));
        assert!(config.in_bounds(Coord::new(99, 99)));
        assert!(!config.in_bounds(Coord::new(-1, 0)));
        assert!(!config.in_bounds(Coord::new(0, 100)));
        assert!(matches!(
            config.check_bounds(Coord::new(100, 0)),
            Err(MapError::OutOfBounds(_))
        ));
    }

    #[test]
    fn test_missing_config_file_is_io_error() {
        let err = EditorConfig::load(Path::new("/nonexistent/tgmap.json")).unwrap_err();
        assert!(matches!(err, MapError::Io(_)));
        assert_eq!(EditorConfig::load_or_default(None).unwrap(), EditorConfig::default());
    }
}
