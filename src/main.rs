// Copyright 2016 oauth-sign Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Sign an OAuth request from the command line.
//!
//! Prints the `Authorization` header value (or, with `-q`, a query-string
//! suffix) for the given credentials, method, URL and parameters.

#![warn(
    bad_style,
    unused,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]

use clap::error::ErrorKind;
use clap::Parser;
use log::{debug, LevelFilter};
use oauth_sign::{parse_method, Error, Signer, Token};
use simple_logger::SimpleLogger;
use std::fmt;
use std::process::ExitCode;

const PROGRAM: &str = env!("CARGO_BIN_NAME");

// sysexits.h
const EX_USAGE: u8 = 64;
const EX_SOFTWARE: u8 = 70;

#[derive(Debug, Parser)]
#[command(version, about = "Sign an OAuth 1.0a request with HMAC-SHA1")]
struct Cli {
    /// Print the protocol parameters as a query string instead of a header
    #[arg(short = 'q')]
    query_mode: bool,
    /// Print the signature base string to standard error
    #[arg(short = 'b')]
    show_signature_base: bool,
    /// Print a curl command line for the request
    #[arg(short = 'c', long = "curl")]
    curl: bool,
    consumer_key: String,
    consumer_key_secret: String,
    /// Empty when there is no token yet
    token: String,
    token_secret: String,
    /// GET, POST, PUT, DELETE or HEAD
    method: String,
    url: String,
    /// Request parameters as name=value
    #[arg(allow_hyphen_values = true)]
    params: Vec<String>,
}

/// Why the command could not produce its output.
#[derive(Debug)]
enum Failure {
    Usage(&'static str),
    Signing(Error),
}

impl Failure {
    fn exit_code(&self) -> u8 {
        match self {
            Failure::Usage(_) => EX_USAGE,
            Failure::Signing(_) => EX_SOFTWARE,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Usage(message) => f.write_str(message),
            Failure::Signing(e) => write!(f, "signing failed: {}", e),
        }
    }
}

fn run(cli: Cli) -> Result<String, Failure> {
    debug!("signing {} {}", cli.method, cli.url);

    if cli.query_mode && !cli.params.is_empty() {
        return Err(Failure::Usage("-q doesn't work with extra POST parameters"));
    }
    if parse_method(&cli.method).is_err() {
        return Err(Failure::Usage("method must be GET, POST, DELETE, PUT, or HEAD"));
    }

    let mut signer = Signer::new();
    let _ = signer
        .set_consumer(&Token::new(cli.consumer_key, cli.consumer_key_secret))
        .set_token_credentials(&Token::new(cli.token, cli.token_secret))
        .set_base_url(cli.url)
        .set_request_params(&cli.params)
        .set_query_mode(cli.query_mode)
        .set_show_signature_base(cli.show_signature_base);

    signer
        .set_http_method(&cli.method)
        .and_then(|signer| {
            if cli.curl {
                signer.curl_command()
            } else {
                signer.output()
            }
        })
        .map_err(Failure::Signing)
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(EX_USAGE),
            };
        }
    };

    if let Err(e) = SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .env()
        .init()
    {
        eprintln!("{}: could not set up logging: {}", PROGRAM, e);
    }

    match run(cli) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(failure) => {
            eprintln!("{}: {}", PROGRAM, failure);
            ExitCode::from(failure.exit_code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{run, Cli, Failure, EX_SOFTWARE, EX_USAGE};
    use clap::Parser;
    use oauth_sign::Error;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("oauth_sign").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn query_mode_with_params_is_usage_error() {
        let failure = run(cli(&["-q", "key", "secret", "", "", "POST", "http://example.com/", "a=1"]))
            .unwrap_err();
        assert!(matches!(failure, Failure::Usage(_)));
        assert_eq!(EX_USAGE, failure.exit_code());
    }

    #[test]
    fn unknown_method_is_usage_error() {
        let failure = run(cli(&["key", "secret", "", "", "PATCH", "http://example.com/"])).unwrap_err();
        assert!(matches!(failure, Failure::Usage(_)));
        assert_eq!(EX_USAGE, failure.exit_code());
    }

    #[test]
    fn signing_failure_is_software_error() {
        assert_eq!(EX_SOFTWARE, Failure::Signing(Error::ModeConflict).exit_code());
    }

    #[test]
    fn prints_header() {
        let output = run(cli(&["key", "secret", "token", "tsecret", "get", "http://example.com/?a=1"])).unwrap();
        assert!(output.starts_with("OAuth oauth_consumer_key=\"key\", oauth_nonce=\""));
        assert!(output.contains("oauth_token=\"token\""));
    }

    #[test]
    fn prints_query_suffix() {
        let output = run(cli(&["-q", "key", "secret", "", "", "GET", "http://example.com/?a=1"])).unwrap();
        assert!(output.starts_with("&oauth_consumer_key=key&oauth_nonce="));
    }

    #[test]
    fn prints_curl_command() {
        let output = run(cli(&["--curl", "key", "secret", "", "", "POST", "http://example.com/", "x=1"]))
            .unwrap();
        assert!(output.starts_with("curl --request 'POST' --url 'http://example.com/' --data 'x=1' --header 'Authorization: OAuth "));
    }
}
