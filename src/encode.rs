// Copyright 2016 oauth-sign Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Percent-encoding as required by RFC 5849 section 3.6.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

/// Everything except the RFC 3986 unreserved characters
/// (`ALPHA / DIGIT / "-" / "." / "_" / "~"`).
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encodes `s` byte-wise over its UTF-8 representation.
///
/// Unreserved characters pass through, every other byte becomes an
/// uppercase `%XX` triplet.
pub fn percent_encode(s: &str) -> String {
    percent_encoding::utf8_percent_encode(s, OAUTH_ENCODE_SET).to_string()
}

fn form_decode(s: &str) -> String {
    percent_encoding::percent_decode_str(&s.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

/// Splits a raw query string into `(name, value)` pairs in order of
/// appearance, decoding `%XX` and `+` (form conventions).
///
/// Every `&`-separated piece yields a pair, empty pieces included; a piece
/// without `=` yields an empty value. Invalid UTF-8 in the decoded bytes is
/// replaced with U+FFFD.
pub(crate) fn parse_query(query: &str) -> impl Iterator<Item = (String, String)> + '_ {
    query.split('&').map(|piece| match piece.split_once('=') {
        Some((name, value)) => (form_decode(name), form_decode(value)),
        None => (form_decode(piece), String::new()),
    })
}

#[cfg(test)]
mod tests {
    use super::{parse_query, percent_encode};

    const UNRESERVED: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

    #[test]
    fn unreserved_passes_through() {
        assert_eq!(UNRESERVED, percent_encode(UNRESERVED));
    }

    #[test]
    fn reserved_is_uppercase_hex() {
        assert_eq!("Hello%20Ladies%20%2B%20Gentlemen%2C", percent_encode("Hello Ladies + Gentlemen,"));
        assert_eq!("%21%2A%27%28%29%3B%3A%40%26%3D%24%2F%3F%23%5B%5D", percent_encode("!*'();:@&=$/?#[]"));
        assert_eq!("%25", percent_encode("%"));
    }

    #[test]
    fn multibyte_is_encoded_per_byte() {
        assert_eq!("%E2%98%83", percent_encode("\u{2603}"));
        assert_eq!("caf%C3%A9", percent_encode("café"));
    }

    #[test]
    fn encoded_output_is_unreserved_or_triplet() {
        let input: String = (1u8..=0x7f).map(char::from).chain("é☃".chars()).collect();
        let encoded = percent_encode(&input);
        let bytes = encoded.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'%' {
                assert!(bytes[i + 1..i + 3]
                    .iter()
                    .all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(b)));
                i += 3;
            } else {
                assert!(UNRESERVED.as_bytes().contains(&bytes[i]));
                i += 1;
            }
        }
    }

    #[test]
    fn query_pairs() {
        let pairs: Vec<_> = parse_query("b5=%3D%253D&a3=a&c%40=&a2=r%20b&flag&&q=a+b%2Bc").collect();
        assert_eq!(
            vec![
                ("b5".to_owned(), "=%3D".to_owned()),
                ("a3".to_owned(), "a".to_owned()),
                ("c@".to_owned(), "".to_owned()),
                ("a2".to_owned(), "r b".to_owned()),
                ("flag".to_owned(), "".to_owned()),
                ("".to_owned(), "".to_owned()),
                ("q".to_owned(), "a b+c".to_owned()),
            ],
            pairs
        );
    }

    #[test]
    fn empty_query_is_one_empty_pair() {
        let pairs: Vec<_> = parse_query("").collect();
        assert_eq!(vec![("".to_owned(), "".to_owned())], pairs);
    }

    #[test]
    fn value_keeps_later_equals() {
        let pairs: Vec<_> = parse_query("b5==%3D").collect();
        assert_eq!(vec![("b5".to_owned(), "==".to_owned())], pairs);
    }
}
