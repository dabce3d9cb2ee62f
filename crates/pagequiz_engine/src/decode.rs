use chardetng::EncodingDetector;
use encoding_rs::Encoding;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPage {
    pub html: String,
    pub encoding_label: String,
}

/// Decodes page bytes to UTF-8, choosing the encoding by BOM, then the
/// Content-Type charset, then a chardetng guess. Undecodable sequences
/// become U+FFFD; a page with a few bad bytes is still worth a quiz.
pub fn decode_page(bytes: &[u8], content_type: Option<&str>) -> DecodedPage {
    let encoding = Encoding::for_bom(bytes)
        .map(|(encoding, _)| encoding)
        .or_else(|| {
            content_type
                .and_then(charset_param)
                .and_then(|label| Encoding::for_label(label.as_bytes()))
        })
        .unwrap_or_else(|| {
            let mut detector = EncodingDetector::new();
            detector.feed(bytes, true);
            detector.guess(None, true)
        });

    let (text, used, _had_errors) = encoding.decode(bytes);
    DecodedPage {
        html: text.into_owned(),
        encoding_label: used.name().to_string(),
    }
}

fn charset_param(content_type: &str) -> Option<&str> {
    content_type.split(';').find_map(|part| {
        let (name, value) = part.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(['"', '\''].as_ref()))
    })
}

#[cfg(test)]
mod tests {
    use super::{charset_param, decode_page};

    #[test]
    fn charset_param_is_case_insensitive() {
        assert_eq!(charset_param("text/html; Charset=\"utf-8\""), Some("utf-8"));
        assert_eq!(charset_param("text/html"), None);
    }

    #[test]
    fn header_charset_wins_over_detection() {
        let decoded = decode_page(b"caf\xe9", Some("text/html; charset=ISO-8859-1"));
        assert_eq!(decoded.html, "café");
    }

    #[test]
    fn bom_is_honoured_and_stripped() {
        let decoded = decode_page(b"\xEF\xBB\xBFhello", Some("text/html"));
        assert_eq!(decoded.html, "hello");
        assert_eq!(decoded.encoding_label, "UTF-8");
    }

    #[test]
    fn invalid_bytes_are_replaced() {
        let decoded = decode_page(b"ok \xFF", Some("text/html; charset=utf-8"));
        assert_eq!(decoded.html, "ok \u{FFFD}");
    }
}
