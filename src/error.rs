// Copyright 2016 oauth-sign Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use thiserror::Error;

/// Result type with this crate's [`Error`] as the default error.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while building or signing a request.
#[derive(Debug, Error)]
pub enum Error {
    /// A field the signature depends on was never set.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    /// The HTTP method is not one of GET, POST, PUT, DELETE or HEAD.
    #[error("method must be GET, POST, DELETE, PUT, or HEAD (got `{0}`)")]
    UnsupportedMethod(String),
    /// Query mode was requested together with request body parameters.
    #[error("query mode doesn't work with extra POST parameters")]
    ModeConflict,
    /// The operating system's random source could not produce a nonce.
    #[error("random source unavailable: {0}")]
    RandomSource(#[from] rand::Error),
    /// The rendered header is not a valid HTTP header value.
    #[error("invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),
}
