//! Error types shared by the noise filter crates

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A frame violates the uniform `(x, y, z, intensity)` layout or carries non-finite values.
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    /// Wire message whose sizes or offsets do not agree with its payload.
    #[error("Malformed point cloud: {0}")]
    MalformedCloud(String),

    #[error("Point cloud has no field named {0:?}")]
    MissingField(String),

    #[error("Field {field:?} has unsupported datatype {datatype}")]
    UnsupportedDatatype { field: String, datatype: u8 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
