pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("source and sink are the same vertex ({vertex})")]
    SourceIsSink { vertex: usize },

    #[error("method {name} is not defined")]
    UnknownMethod { name: String },

    /// Source and sink fell into the same contracted component, so the
    /// compressed instance has no flow problem to solve. Recoverable: retry
    /// with fresh randomness or a lower sampling probability.
    #[error("source and sink collapsed into one vertex during compression")]
    DegenerateCompression,

    /// Flow translation produced more flow than an edge can carry, beyond
    /// rounding slack. This indicates a solver bug, not bad input.
    #[error("translated flow {flow} exceeds capacity {cap} on edge {edge}")]
    TranslationOverflow { edge: usize, flow: f64, cap: f64 },
}
