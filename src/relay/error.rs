use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RelayError {
    #[error("no relay nodes available")]
    NoRelayNodes,
    #[error("no relay path found")]
    NoPath,
    #[error("node index {0} is outside the relay graph")]
    UnknownNode(usize),
    #[error("unknown location: {0}")]
    UnknownLocation(String),
}
