//! JSON embedding
//!
//! The page bootstraps the viewer with `var diffState = <literal>;`. The
//! literal is the stored JSON written with `", "` and `": "` separators, and
//! with `<`, `>`, `&`, U+2028 and U+2029 escaped inside strings so it can
//! neither close the script element nor break a JS string literal. The
//! escapes are plain JSON `\uXXXX` sequences, so the text still parses back
//! to the same value.

use std::io;

use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};

use crate::errors::{DiffError, Result};

/// Literal embedded when there is no saved state: the JSON string `""`
pub const EMPTY_STATE_LITERAL: &str = "\"\"";

/// serde_json formatter producing the embedded literal
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbedFormatter;

impl Formatter for EmbedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (i, c) in fragment.char_indices() {
            let escaped: &[u8] = match c {
                '<' => b"\\u003c",
                '>' => b"\\u003e",
                '&' => b"\\u0026",
                '\u{2028}' => b"\\u2028",
                '\u{2029}' => b"\\u2029",
                _ => continue,
            };
            writer.write_all(fragment[start..i].as_bytes())?;
            writer.write_all(escaped)?;
            start = i + c.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

/// Serialize a value into its embedded literal
///
/// # Errors
///
/// Returns `Serialization` if serde_json fails.
pub fn embed_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, EmbedFormatter);
    value
        .serialize(&mut ser)
        .map_err(|e| DiffError::Serialization {
            reason: e.to_string(),
        })?;
    String::from_utf8(buf).map_err(|e| DiffError::Serialization {
        reason: e.to_string(),
    })
}
