// Copyright 2016 oauth-sign Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Request parameters and their normalization (RFC 5849 section 3.4.1.3).

use crate::encode::{self, percent_encode};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

/// A credential pair: consumer key and secret, or token and token secret.
#[derive(Clone, Debug)]
pub struct Token<'a> {
    /// The public identifier (`oauth_consumer_key` or `oauth_token`).
    pub key: Cow<'a, str>,
    /// The shared secret used in the signing key.
    pub secret: Cow<'a, str>,
}

impl<'a> Token<'a> {
    /// Create a new token from a key and a secret.
    pub fn new<K, S>(key: K, secret: S) -> Token<'a>
    where
        K: Into<Cow<'a, str>>,
        S: Into<Cow<'a, str>>,
    {
        Token {
            key: key.into(),
            secret: secret.into(),
        }
    }
}

/// A name/value pair together with its percent-encoded forms.
///
/// The encoded forms are computed once in the constructor and never change,
/// so they cannot drift from the raw values.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    name: String,
    value: String,
    encoded_name: String,
    encoded_value: String,
}

impl Parameter {
    /// Create a parameter from raw (unencoded) name and value.
    pub fn new<N, V>(name: N, value: V) -> Parameter
    where
        N: Into<String>,
        V: Into<String>,
    {
        let name = name.into();
        let value = value.into();
        let encoded_name = percent_encode(&name);
        let encoded_value = percent_encode(&value);
        Parameter {
            name,
            value,
            encoded_name,
            encoded_value,
        }
    }

    /// Parse a caller-supplied `name=value` string.
    ///
    /// Splits on the first `=`; without one the value is empty. No decoding
    /// is applied.
    pub fn parse(pair: &str) -> Parameter {
        match pair.split_once('=') {
            Some((name, value)) => Parameter::new(name, value),
            None => Parameter::new(pair, ""),
        }
    }

    /// The raw name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The percent-encoded name.
    pub fn encoded_name(&self) -> &str {
        &self.encoded_name
    }

    /// The percent-encoded value.
    pub fn encoded_value(&self) -> &str {
        &self.encoded_value
    }

    /// Orders by encoded name, then encoded value, byte-wise.
    pub fn canonical_cmp(&self, other: &Parameter) -> Ordering {
        self.encoded_name
            .cmp(&other.encoded_name)
            .then_with(|| self.encoded_value.cmp(&other.encoded_value))
    }

    /// `encoded_name=encoded_value`
    pub(crate) fn to_pair(&self) -> String {
        format!("{}={}", self.encoded_name, self.encoded_value)
    }

    /// `encoded_name="encoded_value"`
    pub(crate) fn to_quoted(&self) -> String {
        format!("{}=\"{}\"", self.encoded_name, self.encoded_value)
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Parameter")
            .field(&self.name)
            .field(&self.value)
            .finish()
    }
}

/// Returns `url` with everything from the first `?` removed.
pub fn strip_query(url: &str) -> &str {
    match url.find('?') {
        Some(pos) => &url[..pos],
        None => url,
    }
}

/// Returns `true` if `url` carries a query string.
pub(crate) fn has_query(url: &str) -> bool {
    url.contains('?')
}

/// Collect the parameters of the query string of `url`, decoded.
///
/// A URL without `?` has no query parameters.
pub fn split_query(url: &str) -> Vec<Parameter> {
    match url.split_once('?') {
        Some((_, query)) => encode::parse_query(query)
            .map(|(k, v)| Parameter::new(k, v))
            .collect(),
        None => Vec::new(),
    }
}

/// Collect caller-supplied `name=value` strings as body parameters.
pub fn body_params<I, S>(params: I) -> Vec<Parameter>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    params
        .into_iter()
        .map(|p| Parameter::parse(p.as_ref()))
        .collect()
}

/// Normalize parameters into the canonical parameter string.
///
/// Parameters are sorted by encoded name, then encoded value, and joined as
/// `name=value` pairs separated by `&`. The result is not encoded again
/// here; the signature base does that.
pub fn join_query<'a, I>(params: I) -> String
where
    I: IntoIterator<Item = &'a Parameter>,
{
    let mut params = params.into_iter().collect::<Vec<_>>();
    params.sort_by(|a, b| a.canonical_cmp(b));
    params
        .iter()
        .map(|p| p.to_pair())
        .collect::<Vec<_>>()
        .join("&")
}
