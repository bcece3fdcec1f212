//! Text armoring for sealed payloads
//!
//! Sealed bytes are carried as standard-alphabet base64 with `=` padding.
//! The armored form has no header, version marker, or line breaks: a file
//! is an artifact only by convention.

use crate::error::{ErrorCategory, ErrorKind, Result, SealfileError};
use base64::{Engine, engine::general_purpose::STANDARD};

/// Wrap bytes in armor, returning the armored string
pub fn wrap(body: &[u8]) -> String {
    STANDARD.encode(body)
}

/// Unwrap an armored string, returning the original bytes
///
/// Decoding is strict: URL-safe characters, whitespace, missing or excess
/// padding are all rejected.
pub fn unwrap(armored: &str) -> Result<Vec<u8>> {
    STANDARD.decode(armored).map_err(|e| {
        SealfileError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::MalformedEncoding,
            "base64 decoding failed",
            e,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_bytes() {
        let armored = wrap(b"");
        assert_eq!(armored, "");
        assert!(unwrap(&armored).unwrap().is_empty());
    }

    #[test]
    fn test_simple_string() {
        let armored = wrap(b"test");
        assert_eq!(armored, "dGVzdA==");
        assert_eq!(unwrap(&armored).unwrap(), b"test");
    }

    #[test]
    fn test_all_byte_values() {
        let bytes: Vec<u8> = (0..=255).collect();
        let armored = wrap(&bytes);

        assert_eq!(
            armored,
            "AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8gISIjJCUmJygpKissLS4vMDEyMzQ1Njc4OTo7PD0+P0BBQkNERUZHSElKS0xNTk9QUVJTVFVWV1hZWltcXV5fYGFiY2RlZmdoaWprbG1ub3BxcnN0dXZ3eHl6e3x9fn+AgYKDhIWGh4iJiouMjY6PkJGSk5SVlpeYmZqbnJ2en6ChoqOkpaanqKmqq6ytrq+wsbKztLW2t7i5uru8vb6/wMHCw8TFxsfIycrLzM3Oz9DR0tPU1dbX2Nna29zd3t/g4eLj5OXm5+jp6uvs7e7v8PHy8/T19vf4+fr7/P3+/w=="
        );

        assert_eq!(unwrap(&armored).unwrap(), bytes);
    }

    #[test]
    fn test_not_base64() {
        let err = unwrap("not-base64!!").expect_err("expected malformed encoding");
        assert_eq!(err.kind, Some(ErrorKind::MalformedEncoding));
        assert_eq!(err.category, ErrorCategory::User);
    }

    #[test]
    fn test_decoder_error_reported_once() {
        let err = unwrap("not-base64!!").expect_err("expected malformed encoding");
        let cause = std::error::Error::source(&err)
            .expect("decoder error kept as source")
            .to_string();
        let chain = err.chain_message();
        assert!(chain.starts_with("base64 decoding failed: "));
        assert_eq!(chain.matches(cause.as_str()).count(), 1);
    }

    #[test]
    fn test_url_safe_alphabet_rejected() {
        // "-_" are the URL-safe stand-ins for "+/".
        let err = unwrap("-_-_").expect_err("expected malformed encoding");
        assert_eq!(err.kind, Some(ErrorKind::MalformedEncoding));
    }

    #[test]
    fn test_missing_padding_rejected() {
        let err = unwrap("dGVzdA").expect_err("expected malformed encoding");
        assert_eq!(err.kind, Some(ErrorKind::MalformedEncoding));
    }

    #[test]
    fn test_bad_length_rejected() {
        let err = unwrap("dGVzd").expect_err("expected malformed encoding");
        assert_eq!(err.kind, Some(ErrorKind::MalformedEncoding));
    }

    #[test]
    fn test_embedded_newline_rejected() {
        let err = unwrap("dGVz\ndA==").expect_err("expected malformed encoding");
        assert_eq!(err.kind, Some(ErrorKind::MalformedEncoding));
    }

    #[test]
    fn test_no_whitespace() {
        let armored = wrap(&vec![0x5Au8; 4096]);

        assert!(!armored.contains(' '));
        assert!(!armored.contains('\n'));
        assert!(!armored.contains('\t'));
    }
}
