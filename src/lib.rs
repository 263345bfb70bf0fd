// Copyright 2016 oauth-sign Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! OAuth 1.0a request signing with HMAC-SHA1 ([RFC 5849]).
//!
//! Given consumer and token credentials, an HTTP method, a URL and the
//! request parameters, this crate produces the signed `Authorization`
//! header value or, alternatively, the protocol parameters as a query-string
//! suffix. It does not send anything over the network.
//!
//! ```
//! use oauth_sign::Token;
//!
//! let consumer = Token::new("key", "secret");
//! let (header, body) = oauth_sign::authorization_header(
//!     "POST",
//!     "https://api.example.com/1/statuses/update.json",
//!     &consumer,
//!     None,
//!     &["status=Hello"],
//! )?;
//! assert!(header.starts_with("OAuth oauth_consumer_key=\"key\""));
//! assert_eq!("status=Hello", body);
//! # Ok::<(), oauth_sign::Error>(())
//! ```
//!
//! [RFC 5849]: https://tools.ietf.org/html/rfc5849

#![warn(
    bad_style,
    missing_docs,
    unused,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]

mod encode;
mod error;
mod param;
mod signer;

pub use crate::encode::percent_encode;
pub use crate::error::{Error, Result};
pub use crate::param::{body_params, join_query, split_query, strip_query, Parameter, Token};
pub use crate::signer::{
    parse_method, signature, signature_base, signing_key, OutputMode, Signer, OAUTH_VERSION,
    SIGNATURE_METHOD,
};

/// Everything needed for one signing operation.
#[derive(Clone, Debug)]
pub struct SignRequest<'a> {
    /// Render a query-string suffix instead of a header value.
    pub query_mode: bool,
    /// Write the signature base string to standard error.
    pub show_signature_base: bool,
    /// Consumer key and secret.
    pub consumer: Token<'a>,
    /// Token and token secret; empty strings when there is no token yet.
    pub token: Token<'a>,
    /// HTTP method, any ASCII case.
    pub method: &'a str,
    /// Request URL, optionally with a query string.
    pub url: &'a str,
    /// Request (body) parameters as `name=value` strings.
    pub params: &'a [String],
}

/// Sign a request in one go, returning the header value or the query suffix.
pub fn sign(request: &SignRequest<'_>) -> Result<String> {
    if request.query_mode && !request.params.is_empty() {
        return Err(Error::ModeConflict);
    }
    let mut signer = Signer::new();
    let _ = signer
        .set_query_mode(request.query_mode)
        .set_show_signature_base(request.show_signature_base)
        .set_consumer(&request.consumer)
        .set_token_credentials(&request.token)
        .set_base_url(request.url)
        .set_request_params(request.params)
        .set_http_method(request.method)?;
    signer.output()
}

/// Build the `Authorization` header value for a request, along with the
/// request body made of `other_param`.
pub fn authorization_header<S: AsRef<str>>(
    method: &str,
    uri: &str,
    consumer: &Token<'_>,
    token: Option<&Token<'_>>,
    other_param: &[S],
) -> Result<(String, String)> {
    let mut signer = Signer::new();
    let _ = signer
        .set_consumer(consumer)
        .set_base_url(uri)
        .set_request_params(other_param)
        .set_http_method(method)?;
    if let Some(token) = token {
        let _ = signer.set_token_credentials(token);
    }
    let header = signer.authorization_header()?;
    Ok((header, signer.body()))
}
