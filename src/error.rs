use thiserror::Error;

/// Errors raised while loading a [`PhysicsConfig`](crate::config::PhysicsConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors raised by world setup. Play-time queries never fail.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    #[error("spatial index has already been built")]
    IndexAlreadyBuilt,

    #[error("cannot register a {category} after the spatial index was built")]
    Sealed { category: &'static str },
}

/// Returned by an [`Inventory`](crate::collab::Inventory) that cannot pay for an ability.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("out of {item}")]
    OutOfStock { item: String },
}
