//! Error types for vector tile to `GeoJSON` conversion.

/// Errors that can occur while decoding a vector tile into `GeoJSON`.
///
/// Any of these fails the whole tile. Features are never skipped.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum TranscodeError {
    /// The bytes are not a valid vector tile protobuf message.
    #[error("Unable to decode vector tile: {0}")]
    InvalidProtobuf(String),

    /// A feature declares a geometry type other than point, linestring or polygon.
    #[error("Feature {1} of layer {0} has unknown geometry type {2}")]
    UnknownGeometryType(String, usize, i32),

    /// A geometry command id is not `MoveTo`, `LineTo` or `ClosePath`.
    #[error("Unknown geometry command {0}")]
    UnknownCommand(u32),

    /// A geometry command is missing some of its parameters.
    #[error("Geometry command {0} is missing parameters")]
    TruncatedGeometry(u32),

    /// A `LineTo` command appears before any `MoveTo`.
    #[error("Geometry starts with a LineTo command")]
    LineToWithoutMoveTo,

    /// Geometry coordinates grow beyond what can be represented.
    #[error("Geometry coordinates overflow")]
    CoordinateOverflow,

    /// Feature tags are not a list of key and value index pairs within the layer tables.
    #[error("Feature {1} of layer {0} has invalid tags")]
    InvalidTags(String, usize),

    /// The resulting document could not be serialized.
    #[error("Unable to serialize GeoJSON: {0}")]
    SerializationError(#[from] serde_json::Error),
}
