use thiserror::Error;

/// Recoverable evaluator errors. Parameter validation failures and
/// shape/domain violations inside the arithmetic kernels are programmer
/// errors and panic instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid parameters: {0}")]
    Parameter(String),

    #[error("operand in the wrong domain: {0}")]
    Domain(String),

    #[error("shape mismatch: {0}")]
    Shape(String),

    #[error("cannot rescale: {0}")]
    Precision(String),

    #[error("missing rotation key for galois element {0}")]
    MissingKey(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
