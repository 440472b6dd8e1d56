use icu::normalizer::ComposingNormalizer;

/// Canonical form for visible text on both sides of a fingerprint match.
///
/// Document-model text and text extracted from parsed XML must go through the
/// same instance, otherwise fingerprints silently diverge.
pub struct TextNormalizer {
    nfc: Option<ComposingNormalizer>,
}

impl TextNormalizer {
    pub fn new(normalize_unicode: bool) -> Self {
        Self {
            nfc: normalize_unicode.then(ComposingNormalizer::new_nfc),
        }
    }

    /// NFC (when enabled), then every whitespace run collapsed to a single
    /// space, then trimmed.
    pub fn normalize(&self, text: &str) -> String {
        let composed;
        let source = match &self.nfc {
            Some(nfc) => {
                composed = nfc.normalize(text);
                composed.as_str()
            }
            None => text,
        };
        collapse_whitespace(source)
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new(true)
    }
}

pub fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for word in s.split_whitespace() {
        if !result.is_empty() {
            result.push(' ');
        }
        result.push_str(word);
    }
    result
}

/// Characters that may not appear in aliases and tags.
pub const XML_RESERVED: [char; 5] = ['<', '>', '&', '"', '\''];

pub fn contains_xml_reserved(s: &str) -> bool {
    s.contains(XML_RESERVED)
}

pub fn escape_xml_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

pub fn escape_xml_attr(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}

/// Quote `value` as an XPath string literal.
///
/// Values holding only one kind of quote are wrapped in the other kind. A
/// value holding both is split on `'` and rebuilt with `concat()`, so no
/// input can terminate the literal early.
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    if !value.contains('"') {
        return format!("\"{value}\"");
    }

    let parts: Vec<String> = value
        .split('\'')
        .map(|segment| format!("'{segment}'"))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapse_whitespace_trims_and_joins() {
        assert_eq!(collapse_whitespace("  a \t b\n\nc  "), "a b c");
        assert_eq!(collapse_whitespace("   "), "");
    }

    #[test]
    fn normalizer_composes_decomposed_text() {
        let normalizer = TextNormalizer::new(true);
        // "e" + combining acute accent
        assert_eq!(normalizer.normalize("Caf\u{0065}\u{0301}"), "Caf\u{00E9}");
    }

    #[test]
    fn normalizer_without_unicode_keeps_code_points() {
        let normalizer = TextNormalizer::new(false);
        assert_eq!(normalizer.normalize(" e\u{0301} "), "e\u{0301}");
    }

    #[test]
    fn reserved_characters_detected() {
        assert!(contains_xml_reserved("a<b"));
        assert!(contains_xml_reserved("it's"));
        assert!(!contains_xml_reserved("plain_tag-1.0"));
    }

    #[test]
    fn xpath_literal_quoting() {
        assert_eq!(xpath_literal("plain"), "'plain'");
        assert_eq!(xpath_literal("it's"), "\"it's\"");
        assert_eq!(xpath_literal("say \"hi\""), "'say \"hi\"'");
        assert_eq!(
            xpath_literal("it's \"x\""),
            "concat('it', \"'\", 's \"x\"')"
        );
    }

    #[test]
    fn test_escape_xml_attr() {
        assert_eq!(escape_xml_attr("a\"b&c"), "a&quot;b&amp;c");
        assert_eq!(escape_xml_text("<tag>"), "&lt;tag&gt;");
    }
}
