//! Encoding detection and transcoding of delimited text using chardetng and `encoding_rs`.

use std::borrow::Cow;

use chardetng::EncodingDetector;
use simdutf8::basic::from_utf8;

/// Returns true if `data` is valid UTF-8 (SIMD validation).
pub fn is_utf8(data: &[u8]) -> bool {
    from_utf8(data).is_ok()
}

/// Skip the UTF-8 BOM (EF BB BF) if present and return the remaining data.
pub fn skip_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data)
}

/// The text of an export, decoded to UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText<'a> {
    pub text: Cow<'a, str>,
    /// Name of the source encoding, e.g. `UTF-8` or `windows-1252`.
    pub encoding: &'static str,
}

impl DecodedText<'_> {
    /// Returns true if the input was not UTF-8 and had to be converted.
    pub fn was_transcoded(&self) -> bool {
        self.encoding != encoding_rs::UTF_8.name()
    }
}

/// Decode raw export bytes to UTF-8 text.
///
/// A UTF-8 BOM is dropped. UTF-16 input is recognized by its BOM, valid
/// UTF-8 is borrowed as-is, and anything else is transcoded from the
/// encoding chardetng guesses (Windows-125x, ISO-8859-x, GBK, Shift_JIS...).
pub fn decode(data: &[u8]) -> DecodedText<'_> {
    let data = skip_bom(data);

    // chardetng does not recognize UTF-16, so check its BOMs first.
    if let Some((encoding, _)) = encoding_rs::Encoding::for_bom(data) {
        if encoding != encoding_rs::UTF_8 {
            let (decoded, _, _) = encoding.decode(data);
            return DecodedText {
                text: Cow::Owned(decoded.into_owned()),
                encoding: encoding.name(),
            };
        }
    }

    if let Ok(text) = from_utf8(data) {
        return DecodedText {
            text: Cow::Borrowed(text),
            encoding: encoding_rs::UTF_8.name(),
        };
    }

    let mut detector = EncodingDetector::new();
    detector.feed(data, true);
    let encoding = detector.guess(None, true);

    let (decoded, _, had_errors) = encoding.decode(data);
    if had_errors {
        tracing::warn!(
            encoding = encoding.name(),
            "input contains byte sequences invalid in the guessed encoding"
        );
    }

    DecodedText {
        text: Cow::Owned(decoded.into_owned()),
        encoding: encoding.name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_utf8() {
        assert!(is_utf8(b"Customer ID,Email"));
        assert!(is_utf8("Société,Ciudad,東京".as_bytes()));
        // Latin-1 "José"
        assert!(!is_utf8(b"Jos\xe9"));
    }

    #[test]
    fn test_skip_bom() {
        assert_eq!(skip_bom(b"\xEF\xBB\xBFEmail"), b"Email");
        assert_eq!(skip_bom(b"Email"), b"Email");
    }

    #[test]
    fn test_decode_utf8_is_borrowed() {
        let decoded = decode(b"email,age\n");
        assert!(matches!(decoded.text, Cow::Borrowed(_)));
        assert!(!decoded.was_transcoded());

        let decoded = decode(&[0xEF, 0xBB, 0xBF, b'i', b'd']);
        assert_eq!(decoded.text, "id");
    }

    #[test]
    fn test_decode_utf16_le() {
        let data: &[u8] = &[0xFF, 0xFE, b'i', 0x00, b'd', 0x00];
        let decoded = decode(data);
        assert!(decoded.was_transcoded());
        assert_eq!(decoded.encoding, "UTF-16LE");
        assert_eq!(decoded.text, "id");
    }

    #[test]
    fn test_decode_windows1251() {
        // "Привет" in Windows-1251
        let data: &[u8] = &[0xCF, 0xF0, 0xE8, 0xE2, 0xE5, 0xF2];
        let decoded = decode(data);
        assert!(decoded.was_transcoded());
        assert!(is_utf8(decoded.text.as_bytes()));
    }
}
