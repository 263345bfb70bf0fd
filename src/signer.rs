// Copyright 2016 oauth-sign Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The request descriptor and the signing pipeline.

use crate::encode::percent_encode;
use crate::error::{Error, Result};
use crate::param::{self, Parameter, Token};
use http::header::HeaderValue;
use http::Method;
use log::{debug, error, trace};
use rand::rngs::OsRng;
use rand::RngCore;
use ring::hmac;
use std::fmt;
use time::OffsetDateTime;

/// Value of `oauth_signature_method`.
pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";
/// Value of `oauth_version`.
pub const OAUTH_VERSION: &str = "1.0";

const NONCE_BYTES: usize = 32;

/// Where the protocol parameters end up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// An `Authorization: OAuth ...` header value.
    #[default]
    Header,
    /// A query-string suffix to append to the request URL.
    Query,
}

/// Parse and validate an HTTP method, ignoring ASCII case.
///
/// Only GET, POST, PUT, DELETE and HEAD are accepted.
pub fn parse_method(method: &str) -> Result<Method> {
    match method.to_ascii_uppercase().as_str() {
        "GET" => Ok(Method::GET),
        "POST" => Ok(Method::POST),
        "PUT" => Ok(Method::PUT),
        "DELETE" => Ok(Method::DELETE),
        "HEAD" => Ok(Method::HEAD),
        _ => Err(Error::UnsupportedMethod(method.to_owned())),
    }
}

/// Build the signature base string (RFC 5849 section 3.4.1.1).
///
/// `url` may still carry its query string; it is dropped here. `normalized`
/// is the output of [`param::join_query`] and gets encoded a second time.
pub fn signature_base(method: &Method, url: &str, normalized: &str) -> String {
    format!(
        "{}&{}&{}",
        method.as_str().to_ascii_uppercase(),
        percent_encode(param::strip_query(url)),
        percent_encode(normalized)
    )
}

/// Build the HMAC key from the two secrets.
///
/// An empty token secret still leaves the trailing `&`.
pub fn signing_key(consumer_secret: &str, token_secret: &str) -> String {
    format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    )
}

fn hmac_sha1(key: &[u8], data: &[u8]) -> hmac::Tag {
    let key = hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, key);
    hmac::sign(&key, data)
}

/// Compute `oauth_signature`: HMAC-SHA1 of `base` under `key`, Base64 encoded.
pub fn signature(base: &str, key: &str) -> String {
    base64::encode(hmac_sha1(key.as_bytes(), base.as_bytes()).as_ref())
}

fn generate_nonce() -> Result<String> {
    let mut bytes = [0u8; NONCE_BYTES];
    if let Err(e) = OsRng.try_fill_bytes(&mut bytes) {
        error!("The random generator is proving difficult: {}", e);
        return Err(e.into());
    }
    let nonce = base64::encode(bytes)
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>();
    trace!("generated nonce {}", nonce);
    Ok(nonce)
}

fn generate_timestamp() -> String {
    let timestamp = OffsetDateTime::now_utc().unix_timestamp().to_string();
    trace!("generated timestamp {}", timestamp);
    timestamp
}

fn header(protocol: &[Parameter]) -> String {
    let pairs = protocol
        .iter()
        .map(Parameter::to_quoted)
        .collect::<Vec<_>>();
    format!("OAuth {}", pairs.join(", "))
}

fn body(params: &[Parameter]) -> String {
    params
        .iter()
        .map(Parameter::to_pair)
        .collect::<Vec<_>>()
        .join("&")
}

fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Output of one run of the pipeline.
#[derive(Clone, Debug)]
struct Signed {
    signature_base: String,
    /// Protocol parameters including `oauth_signature`, sorted by name.
    protocol: Vec<Parameter>,
}

impl Signed {
    fn get(&self, name: &str) -> Option<&str> {
        self.protocol
            .iter()
            .find(|p| p.name() == name)
            .map(Parameter::value)
    }
}

/// An OAuth 1.0a request descriptor.
///
/// Collect the request with the setters, then ask for the
/// [`authorization_header`](Signer::authorization_header), the
/// [`query_suffix`](Signer::query_suffix) or the
/// [`curl_command`](Signer::curl_command). The first of these runs the
/// signing pipeline, drawing a nonce and a timestamp unless fixed ones were
/// set; later calls reuse that result. Any setter discards it, so the next
/// call signs again from scratch.
///
/// ```
/// use oauth_sign::Signer;
///
/// let mut signer = Signer::new();
/// signer
///     .set_consumer_key("dpf43f3p2l4k3l03")
///     .set_consumer_secret("kd94hf93k423kf44")
///     .set_token("nnch734d00sl2jdk")
///     .set_token_secret("pfkkdhi9sl3r4s00")
///     .set_base_url("http://photos.example.net/photos?file=vacation.jpg&size=original")
///     .set_nonce("kllo9940pd9333jh")
///     .set_timestamp("1191242096");
/// signer.set_http_method("GET")?;
///
/// assert_eq!(Some("tR3+Ty81lMeYAr/Fid0kMTYa/WM="), signer.sign()?.signature());
/// # Ok::<(), oauth_sign::Error>(())
/// ```
#[derive(Clone, Default)]
pub struct Signer {
    consumer_key: Option<Parameter>,
    consumer_secret: Option<String>,
    token: Option<Parameter>,
    token_secret: String,
    http_method: Option<Method>,
    base_url: Option<String>,
    request_params: Vec<Parameter>,
    mode: OutputMode,
    show_signature_base: bool,
    nonce: Option<String>,
    timestamp: Option<String>,
    signed: Option<Signed>,
}

impl Signer {
    /// Create an empty, unsigned request descriptor.
    pub fn new() -> Signer {
        Signer::default()
    }

    fn invalidate(&mut self) {
        if self.signed.take().is_some() {
            trace!("request changed, dropping signature");
        }
    }

    /// Set `oauth_consumer_key`. An empty key is left out of the request.
    pub fn set_consumer_key<S: Into<String>>(&mut self, key: S) -> &mut Self {
        self.consumer_key = Some(Parameter::new("oauth_consumer_key", key));
        self.invalidate();
        self
    }

    /// Set the consumer secret.
    pub fn set_consumer_secret<S: Into<String>>(&mut self, secret: S) -> &mut Self {
        self.consumer_secret = Some(secret.into());
        self.invalidate();
        self
    }

    /// Set consumer key and secret at once.
    pub fn set_consumer(&mut self, consumer: &Token<'_>) -> &mut Self {
        self.set_consumer_key(&*consumer.key)
            .set_consumer_secret(&*consumer.secret)
    }

    /// Set `oauth_token`. An empty token is left out of the request, as when
    /// asking for a request token.
    pub fn set_token<S: Into<String>>(&mut self, token: S) -> &mut Self {
        self.token = Some(Parameter::new("oauth_token", token));
        self.invalidate();
        self
    }

    /// Set the token secret. Defaults to empty.
    pub fn set_token_secret<S: Into<String>>(&mut self, secret: S) -> &mut Self {
        self.token_secret = secret.into();
        self.invalidate();
        self
    }

    /// Set token and token secret at once.
    pub fn set_token_credentials(&mut self, token: &Token<'_>) -> &mut Self {
        self.set_token(&*token.key)
            .set_token_secret(&*token.secret)
    }

    /// Set the HTTP method. See [`parse_method`] for what is accepted.
    pub fn set_http_method(&mut self, method: &str) -> Result<&mut Self> {
        let method = parse_method(method)?;
        self.http_method = Some(method);
        self.invalidate();
        Ok(self)
    }

    /// Set the request URL. A query string, if present, is signed as well.
    pub fn set_base_url<S: Into<String>>(&mut self, url: S) -> &mut Self {
        self.base_url = Some(url.into());
        self.invalidate();
        self
    }

    /// Replace the request (body) parameters with `name=value` strings.
    pub fn set_request_params<I, S>(&mut self, params: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.request_params = param::body_params(params);
        self.invalidate();
        self
    }

    /// Choose between header and query-string output.
    pub fn set_query_mode(&mut self, query_mode: bool) -> &mut Self {
        self.mode = if query_mode {
            OutputMode::Query
        } else {
            OutputMode::Header
        };
        self.invalidate();
        self
    }

    /// Write the signature base string to standard error whenever it is
    /// computed.
    pub fn set_show_signature_base(&mut self, show: bool) -> &mut Self {
        self.show_signature_base = show;
        self
    }

    /// Use a fixed `oauth_nonce` instead of a random one.
    pub fn set_nonce<S: Into<String>>(&mut self, nonce: S) -> &mut Self {
        self.nonce = Some(nonce.into());
        self.invalidate();
        self
    }

    /// Use a fixed `oauth_timestamp` instead of the current time.
    pub fn set_timestamp<S: Into<String>>(&mut self, timestamp: S) -> &mut Self {
        self.timestamp = Some(timestamp.into());
        self.invalidate();
        self
    }

    /// The consumer key, if set.
    pub fn consumer_key(&self) -> Option<&str> {
        self.consumer_key.as_ref().map(Parameter::value)
    }

    /// The consumer secret, if set.
    pub fn consumer_secret(&self) -> Option<&str> {
        self.consumer_secret.as_deref()
    }

    /// The token, if set.
    pub fn token(&self) -> Option<&str> {
        self.token.as_ref().map(Parameter::value)
    }

    /// The token secret.
    pub fn token_secret(&self) -> &str {
        &self.token_secret
    }

    /// The HTTP method, if set.
    pub fn http_method(&self) -> Option<&Method> {
        self.http_method.as_ref()
    }

    /// The request URL as given, query string included.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// The request parameters as `name=value` strings.
    pub fn request_params(&self) -> Vec<String> {
        self.request_params
            .iter()
            .map(|p| format!("{}={}", p.name(), p.value()))
            .collect()
    }

    /// The request parameters.
    pub fn params(&self) -> &[Parameter] {
        &self.request_params
    }

    /// The request parameters encoded as a form body, in the order given.
    pub fn body(&self) -> String {
        body(&self.request_params)
    }

    /// The output mode.
    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// `oauth_nonce` of the current signature, `None` while unsigned.
    pub fn nonce(&self) -> Option<&str> {
        self.signed.as_ref().and_then(|s| s.get("oauth_nonce"))
    }

    /// `oauth_timestamp` of the current signature, `None` while unsigned.
    pub fn timestamp(&self) -> Option<&str> {
        self.signed.as_ref().and_then(|s| s.get("oauth_timestamp"))
    }

    /// `oauth_signature`, `None` while unsigned.
    pub fn signature(&self) -> Option<&str> {
        self.signed.as_ref().and_then(|s| s.get("oauth_signature"))
    }

    /// Returns `true` if a signature for the current state is available.
    pub fn is_signed(&self) -> bool {
        self.signed.is_some()
    }

    /// Protocol parameters other than `oauth_signature`, sorted by name.
    fn protocol_params(&self, nonce: String, timestamp: String) -> Vec<Parameter> {
        let mut protocol = Vec::with_capacity(7);
        if let Some(key) = self.consumer_key.as_ref().filter(|p| !p.value().is_empty()) {
            protocol.push(key.clone());
        }
        protocol.push(Parameter::new("oauth_nonce", nonce));
        protocol.push(Parameter::new("oauth_signature_method", SIGNATURE_METHOD));
        protocol.push(Parameter::new("oauth_timestamp", timestamp));
        if let Some(token) = self.token.as_ref().filter(|p| !p.value().is_empty()) {
            protocol.push(token.clone());
        }
        protocol.push(Parameter::new("oauth_version", OAUTH_VERSION));
        protocol
    }

    fn run(&self) -> Result<Signed> {
        if self.mode == OutputMode::Query && !self.request_params.is_empty() {
            return Err(Error::ModeConflict);
        }
        if self.consumer_key.is_none() {
            return Err(Error::MissingField("consumer_key"));
        }
        let consumer_secret = self
            .consumer_secret
            .as_deref()
            .ok_or(Error::MissingField("consumer_secret"))?;
        let method = self
            .http_method
            .as_ref()
            .ok_or(Error::MissingField("http_method"))?;
        let url = self
            .base_url
            .as_deref()
            .ok_or(Error::MissingField("base_url"))?;

        let nonce = match &self.nonce {
            Some(nonce) => nonce.clone(),
            None => generate_nonce()?,
        };
        let timestamp = match &self.timestamp {
            Some(timestamp) => timestamp.clone(),
            None => generate_timestamp(),
        };
        let mut protocol = self.protocol_params(nonce, timestamp);

        let query = param::split_query(url);
        let normalized = param::join_query(
            query
                .iter()
                .chain(&self.request_params)
                .chain(&protocol),
        );
        let signature_base = signature_base(method, url, &normalized);
        debug!("Signature base string: {}", signature_base);
        if self.show_signature_base {
            eprintln!("{}", signature_base);
        }

        let key = signing_key(consumer_secret, &self.token_secret);
        let sign = signature(&signature_base, &key);
        let at = protocol
            .iter()
            .position(|p| p.name() > "oauth_signature")
            .unwrap_or(protocol.len());
        protocol.insert(at, Parameter::new("oauth_signature", sign));

        Ok(Signed {
            signature_base,
            protocol,
        })
    }

    fn signed(&mut self) -> Result<&Signed> {
        let signed = match self.signed.take() {
            Some(signed) => signed,
            None => self.run()?,
        };
        let signed: &Signed = self.signed.insert(signed);
        Ok(signed)
    }

    /// Run the pipeline if the current state is not signed yet.
    pub fn sign(&mut self) -> Result<&mut Self> {
        let _ = self.signed()?;
        Ok(self)
    }

    /// The signature base string the signature is computed over.
    pub fn signature_base(&mut self) -> Result<String> {
        Ok(self.signed()?.signature_base.clone())
    }

    /// The `Authorization` header value: `OAuth oauth_consumer_key="...", ...`.
    pub fn authorization_header(&mut self) -> Result<String> {
        let header = header(&self.signed()?.protocol);
        debug!("Authorization header: Authorization: {}", header);
        Ok(header)
    }

    /// The `Authorization` header value, marked sensitive.
    pub fn authorization_header_value(&mut self) -> Result<HeaderValue> {
        let mut value = HeaderValue::from_str(&self.authorization_header()?)?;
        value.set_sensitive(true);
        Ok(value)
    }

    /// The protocol parameters as a query-string suffix, starting with `?`,
    /// or `&` if the URL already has a query string.
    pub fn query_suffix(&mut self) -> Result<String> {
        let has_query = self.base_url.as_deref().map_or(false, param::has_query);
        let signed = self.signed()?;
        let prefix = if has_query { '&' } else { '?' };
        Ok(format!("{}{}", prefix, body(&signed.protocol)))
    }

    /// The header value or the query suffix, depending on the output mode.
    pub fn output(&mut self) -> Result<String> {
        match self.mode {
            OutputMode::Header => self.authorization_header(),
            OutputMode::Query => self.query_suffix(),
        }
    }

    /// A `curl` command line that would send this request. Nothing is run.
    pub fn curl_command(&mut self) -> Result<String> {
        let output = self.output()?;
        let method = self
            .http_method
            .as_ref()
            .map_or("", Method::as_str);
        let url = self.base_url.as_deref().unwrap_or_default();

        let mut command = format!("curl --request {}", shell_quote(method));
        match self.mode {
            OutputMode::Header => {
                command.push_str(" --url ");
                command.push_str(&shell_quote(url));
                if !self.request_params.is_empty() {
                    command.push_str(" --data ");
                    command.push_str(&shell_quote(&self.body()));
                }
                command.push_str(" --header ");
                command.push_str(&shell_quote(&format!("Authorization: {}", output)));
            }
            OutputMode::Query => {
                command.push_str(" --url ");
                command.push_str(&shell_quote(&format!("{}{}", url, output)));
            }
        }
        Ok(command)
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("consumer_key", &self.consumer_key())
            .field("token", &self.token())
            .field("http_method", &self.http_method)
            .field("base_url", &self.base_url)
            .field("request_params", &self.request_params)
            .field("mode", &self.mode)
            .field("signed", &self.is_signed())
            .finish_non_exhaustive()
    }
}
