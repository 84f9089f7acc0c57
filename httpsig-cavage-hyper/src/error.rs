use httpsig_cavage::prelude::HttpSigError;
use thiserror::Error;

/// Result type for http signature for hyper
pub type HyperSigResult<T> = std::result::Result<T, HyperSigError>;

/// Error type for http signature for hyper
#[derive(Error, Debug)]
pub enum HyperSigError {
  /// Http body error
  #[error("Http body error: {0}")]
  HttpBodyError(String),

  /// Inherited from HttpSigError
  #[error("HttpSigError: {0}")]
  HttpSigError(#[from] HttpSigError),
}
