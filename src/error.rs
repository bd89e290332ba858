use thiserror::Error;

/// failure to move a geometry between coordinate reference systems
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    #[error("unknown coordinate reference system '{0}'")]
    UnknownCrs(String),
    #[error("cannot reproject an empty geometry")]
    EmptyGeometry,
    #[error("projection produced non-finite coordinate ({x}, {y})")]
    NonFinite { x: f64, y: f64 },
}

/// a structurally broken AIS row (missing timestamp, id or position)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("unrecognized timestamp '{0}'")]
    BadTimestamp(String),
}

/// a tile descriptor we can't produce labels for
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TileError {
    #[error("tile {tile_id}: invalid footprint ({reason})")]
    InvalidFootprint { tile_id: String, reason: String },
    #[error("tile {tile_id}: unrecognized timestamp '{value}'")]
    BadTimestamp { tile_id: String, value: String },
    #[error("tile {tile_id}: missing property '{property}'")]
    MissingProperty {
        tile_id: String,
        property: &'static str,
    },
    #[error("tile {tile_id}: acquisition ends before it starts")]
    InvalidWindow { tile_id: String },
    #[error("tile {tile_id}: unsupported footprint geometry {kind}")]
    UnsupportedGeometry { tile_id: String, kind: String },
    #[error("tile id '{0}' can't be used as a file name")]
    InvalidTileId(String),
    #[error("tile {0}: listed more than once in the catalog")]
    DuplicateTileId(String),
}
