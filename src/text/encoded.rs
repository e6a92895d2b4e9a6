
use tendril;

const TEXT_CHARS: &[char] = &['&', '<', '>'];
const ATTRIBUTE_VALUE_CHARS: &[char] = &['"'];

fn encode_char(chr: char) -> &'static str {
    match chr {
        '&' => "&amp;",
        '<' => "&lt;",
        '>' => "&gt;",
        '"' => "&quot;",
        _ => "",
    }
}

fn encode_str_optional(mut input: &str, chars: &[char]) -> Option<tendril::StrTendril> {
    if input.find(chars).is_none() {
        return None;
    }
    let mut tendril = tendril::StrTendril::new();
    'parts: while !input.is_empty() {
        let len = match input.find(chars) {
            Some(pos) => pos,
            None => input.len(),
        };
        tendril.push_slice(&input[..len]);
        input = &input[len..];
        let chr = match input.chars().next() {
            None => break 'parts,
            Some(chr) => chr,
        };
        tendril.push_slice(encode_char(chr));
        input = &input[chr.len_utf8()..];
    }
    Some(tendril)
}

/// Escape content that is inserted as text.
pub(crate) fn escape_text(input: &str) -> tendril::StrTendril {
    encode_str_optional(input, TEXT_CHARS)
        .unwrap_or_else(|| tendril::StrTendril::from_slice(input))
}

/// Escape an attribute value that will be wrapped in double quotes.
pub(crate) fn escape_attribute_value(input: &str) -> tendril::StrTendril {
    encode_str_optional(input, ATTRIBUTE_VALUE_CHARS)
        .unwrap_or_else(|| tendril::StrTendril::from_slice(input))
}
