//! Value codecs shared by behaviors: text escaping, lists, structured
//! fields, quoted-printable with charsets, and base64.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use encoding_rs::Encoding;
use vobject_core::constants::DEFAULT_CHARSET;
use vobject_core::types::Format;

use super::DecodeContext;
use crate::rfc::build::{escape_text, split_unescaped, unescape_text};
use crate::rfc::core::ContentLine;

/// Whether the line declares quoted-printable, in either spelling.
#[must_use]
pub fn is_quoted_printable(line: &ContentLine) -> bool {
    line.param_values("ENCODING")
        .iter()
        .any(|v| v.eq_ignore_ascii_case("QUOTED-PRINTABLE"))
        || line
            .singletons
            .iter()
            .any(|s| s.eq_ignore_ascii_case("QUOTED-PRINTABLE"))
}

/// Whether the line declares base64 (`ENCODING=B`, `ENCODING=BASE64` or a
/// bare `BASE64`).
#[must_use]
pub fn is_base64(line: &ContentLine) -> bool {
    line.param_values("ENCODING")
        .iter()
        .any(|v| v.eq_ignore_ascii_case("B") || v.eq_ignore_ascii_case("BASE64"))
        || line.singletons.iter().any(|s| s.eq_ignore_ascii_case("BASE64"))
}

/// Drops the parameters that described a transfer encoding.
pub fn clear_transfer_encoding(line: &mut ContentLine) {
    line.remove_param("ENCODING");
    line.remove_param("CHARSET");
    line.remove_singleton("QUOTED-PRINTABLE");
    line.remove_singleton("BASE64");
}

/// Decodes quoted-printable text, then converts the bytes from `charset`
/// (default ISO-8859-1).
///
/// ## Errors
/// Returns a description if the charset label is unknown or a byte
/// sequence is malformed in it.
pub fn decode_quoted_printable(raw: &str, charset: Option<&str>) -> Result<String, String> {
    let bytes = raw.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'=' {
            let hex = bytes
                .get(i + 1..i + 3)
                .filter(|pair| pair.iter().all(u8::is_ascii_hexdigit))
                .and_then(|pair| std::str::from_utf8(pair).ok())
                .and_then(|s| u8::from_str_radix(s, 16).ok());
            if let Some(byte) = hex {
                decoded.push(byte);
                i += 3;
                continue;
            }
            // Soft break left over from CRLF input
            if bytes.get(i + 1..i + 3) == Some(&b"\r\n"[..]) {
                i += 3;
                continue;
            }
        }
        decoded.push(bytes[i]);
        i += 1;
    }

    let label = charset.unwrap_or(DEFAULT_CHARSET);
    let encoding = Encoding::for_label(label.as_bytes())
        .ok_or_else(|| format!("unknown charset {label:?}"))?;
    let (text, _, had_errors) = encoding.decode(&decoded);
    if had_errors {
        return Err(format!("bytes are not valid {}", encoding.name()));
    }
    Ok(text.into_owned())
}

/// Decodes base64, ignoring embedded whitespace.
///
/// ## Errors
/// Returns a description of the first invalid symbol.
pub fn decode_base64(raw: &str) -> Result<Vec<u8>, String> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD.decode(compact).map_err(|e| e.to_string())
}

/// Encodes bytes and marks the line the way `format` expects.
pub fn encode_base64(line: &mut ContentLine, bytes: &[u8], format: Format) -> String {
    clear_transfer_encoding(line);
    line.set_param("ENCODING", vec![format.base64_marker().to_string()]);
    if format == Format::ICalendar {
        line.set_param("VALUE", vec!["BINARY".to_string()]);
    }
    STANDARD.encode(bytes)
}

/// Unescapes a TEXT value.
///
/// Legacy quoted-printable producers only escape semicolons; with that
/// workaround on, nothing else is unescaped.
#[must_use]
pub fn unescape(raw: &str, ctx: DecodeContext) -> String {
    if ctx.from_quoted_printable && ctx.compat.legacy_escaped_semicolons {
        raw.replace("\\;", ";")
    } else {
        unescape_text(raw)
    }
}

/// Splits an escaped list on `sep` and unescapes each item.
#[must_use]
pub fn split_list(raw: &str, sep: char, ctx: DecodeContext) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    split_unescaped(raw, sep)
        .into_iter()
        .map(|item| unescape(item, ctx))
        .collect()
}

/// Escapes each item and joins them with `sep`.
#[must_use]
pub fn join_list<S: AsRef<str>>(items: &[S], sep: char) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(sep);
        }
        out.push_str(&escape_text(item.as_ref()));
    }
    out
}

/// Splits a structured value into `;` fields of `,` items.
#[must_use]
pub fn split_structured(raw: &str, ctx: DecodeContext) -> Vec<Vec<String>> {
    split_unescaped(raw, ';')
        .into_iter()
        .map(|field| split_list(field, ',', ctx))
        .collect()
}

/// Inverse of [`split_structured`].
#[must_use]
pub fn join_structured(fields: &[&[String]]) -> String {
    fields
        .iter()
        .map(|field| join_list(field, ','))
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::parse::CompatFlags;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn quoted_printable_latin1_default() {
        assert_eq!(decode_quoted_printable("Caf=E9 =3D ok", None).unwrap(), "Café = ok");
    }

    #[test]
    fn quoted_printable_with_charset() {
        assert_eq!(
            decode_quoted_printable("Gr=C3=BC=C3=9Fe", Some("utf-8")).unwrap(),
            "Grüße"
        );
        assert!(decode_quoted_printable("x", Some("no-such-charset")).is_err());
    }

    #[test]
    fn quoted_printable_keeps_stray_equals() {
        assert_eq!(decode_quoted_printable("a=zz", None).unwrap(), "a=zz");
    }

    #[test]
    fn base64_ignores_whitespace() {
        assert_eq!(decode_base64("aGVs\n bG8=").unwrap(), b"hello");
        assert!(decode_base64("***").is_err());
    }

    #[test]
    fn encode_marks_format() {
        let mut line = ContentLine::raw("PHOTO", "");
        line.add_singleton("BASE64");
        let encoded = encode_base64(&mut line, b"hello", Format::VCard);
        assert_eq!(encoded, "aGVsbG8=");
        assert_eq!(line.param_value("ENCODING"), Some("B"));
        assert!(line.singletons.is_empty());

        let mut attach = ContentLine::raw("ATTACH", "");
        encode_base64(&mut attach, b"x", Format::ICalendar);
        assert_eq!(attach.param_value("ENCODING"), Some("BASE64"));
        assert_eq!(attach.param_value("VALUE"), Some("BINARY"));
    }

    #[test]
    fn legacy_semicolons_only_when_enabled() {
        let legacy = DecodeContext {
            compat: CompatFlags {
                legacy_escaped_semicolons: true,
                ..CompatFlags::default()
            },
            from_quoted_printable: true,
        };
        assert_eq!(unescape("a\\;b\\nc", legacy), "a;b\\nc");
        assert_eq!(unescape("a\\;b\\nc", DecodeContext::default()), "a;b\nc");
    }

    #[test]
    fn lists_round_trip() {
        let items = strings(&["Random category", "Other, category"]);
        let joined = join_list(&items, ',');
        assert_eq!(joined, "Random category,Other\\, category");
        assert_eq!(split_list(&joined, ',', DecodeContext::default()), items);
        assert!(split_list("", ',', DecodeContext::default()).is_empty());
    }

    #[test]
    fn structured_fields() {
        let fields = split_structured(";;Reeperbahn 116;Hamburg;;20359;", DecodeContext::default());
        assert_eq!(fields.len(), 7);
        assert!(fields[0].is_empty());
        assert_eq!(fields[2], ["Reeperbahn 116"]);
        let refs: Vec<&[String]> = fields.iter().map(Vec::as_slice).collect();
        assert_eq!(join_structured(&refs), ";;Reeperbahn 116;Hamburg;;20359;");
    }
}
