// src/map/mod.rs
pub mod direction;
pub mod door;
pub mod graph;
pub mod records;
pub mod registry;
pub mod tile;

pub use direction::Direction;
pub use door::{Door, DoorKind};
pub use graph::TileGraph;
pub use records::{build, crawl, DoorRecord, LinkRecord, TileRecord, OBJECT_MODEL_VERSION};
pub use registry::{IdOwner, IdRegistry};
pub use tile::{Link, Tile, TileAttributes, TileKey};
