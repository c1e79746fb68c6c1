// Markup helpers: text flattening and anchor scanning.
// Deliberately naive; they only need to survive the standings pages.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static SCRIPT_STYLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)\s*>").unwrap());
static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(?:#([0-9]{1,7})|#[xX]([0-9a-fA-F]{1,6})|([a-zA-Z]{2,8}));").unwrap()
});
static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static ANCHOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*?\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))[^>]*>(.*?)</a\s*>"#)
        .unwrap()
});

/// Turns a fetched page into flat, whitespace-normalised text.
pub trait MarkupText: Send + Sync {
    fn text(&self, markup: &str) -> String;
}

/// Default flattener: drops scripts, styles, comments and tags, decodes a
/// handful of entities and collapses whitespace. Tags become a single space.
#[derive(Clone, Copy, Debug, Default)]
pub struct StripTags;

impl MarkupText for StripTags {
    fn text(&self, markup: &str) -> String {
        let no_script = SCRIPT_STYLE.replace_all(markup, " ");
        let no_comment = COMMENT.replace_all(&no_script, " ");
        let mut out = String::with_capacity(no_comment.len());
        let mut in_tag = false;
        for ch in no_comment.chars() {
            match ch {
                '<' => {
                    in_tag = true;
                    out.push(' ');
                }
                '>' if in_tag => in_tag = false,
                _ if !in_tag => out.push(ch),
                _ => {}
            }
        }
        normalize_ws(&decode_entities(&out))
    }
}

/// `<a href=..>text</a>` with the visible text flattened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Anchor {
    pub href: String,
    pub text: String,
}

/// All anchors with an href, in document order.
pub fn anchors(markup: &str) -> Vec<Anchor> {
    ANCHOR
        .captures_iter(markup)
        .filter_map(|c| {
            let href = c.get(1).or_else(|| c.get(2)).or_else(|| c.get(3))?.as_str();
            let inner = c.get(4).map(|m| m.as_str()).unwrap_or("");
            Some(Anchor {
                href: decode_entities(href),
                text: StripTags.text(inner),
            })
        })
        .collect()
}

fn named_entity(name: &str) -> Option<char> {
    let ch = match name {
        "nbsp" => ' ',
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "eacute" => 'é',
        "Eacute" => 'É',
        "egrave" => 'è',
        "aacute" => 'á',
        "iacute" => 'í',
        "oacute" => 'ó',
        "uacute" => 'ú',
        "auml" => 'ä',
        "ouml" => 'ö',
        "uuml" => 'ü',
        "ntilde" => 'ñ',
        "hellip" => '…',
        _ => return None,
    };
    Some(ch)
}

/// Decode decimal, hex and common named entities in one pass, so `&amp;lt;`
/// yields `&lt;`. Unknown or invalid entities are left as written.
pub fn decode_entities(s: &str) -> String {
    ENTITY
        .replace_all(s, |c: &Captures<'_>| {
            let decoded = if let Some(dec) = c.get(1) {
                dec.as_str().parse::<u32>().ok().and_then(char::from_u32)
            } else if let Some(hex) = c.get(2) {
                u32::from_str_radix(hex.as_str(), 16).ok().and_then(char::from_u32)
            } else {
                c.get(3).and_then(|n| named_entity(n.as_str()))
            };
            match decoded {
                Some(ch) => ch.to_string(),
                None => c[0].to_string(),
            }
        })
        .into_owned()
}

/// Collapse runs of whitespace into one space and trim.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_collapses_whitespace() {
        let html = "<html><head><style>td{color:red}</style></head>\n<body><table><tr><td>307</td>\
                    <td>Gholdengo&nbsp;Lunatone</td><td>14.52%</td></tr></table>\
                    <script>var x = '<b>';</script></body></html>";
        assert_eq!(StripTags.text(html), "307 Gholdengo Lunatone 14.52%");
    }

    #[test]
    fn cells_do_not_glue_together() {
        assert_eq!(StripTags.text("<td>12</td><td>Alpha</td>"), "12 Alpha");
    }

    #[test]
    fn numeric_and_named_entities_decode() {
        assert_eq!(decode_entities("Flab&#233;b&#xE9; &amp; Pok&eacute;mon"), "Flabébé & Pokémon");
        assert_eq!(decode_entities("N&#39;s Zoroark"), "N's Zoroark");
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
        assert_eq!(decode_entities("&bogus; &#xD800; &#99999999;"), "&bogus; &#xD800; &#99999999;");
        assert_eq!(StripTags.text("<td>Flab&#xe9;b&#233;&#160;Box</td>"), "Flabébé Box");
    }

    #[test]
    fn anchors_handle_quotes_and_nested_markup() {
        let html = r#"<a class="x" href="/0046/decks/abc"><span>Dragapult</span> ex</a>
                      <a href='/0046/decks'>Decks</a><a name="top">no href</a>"#;
        let found = anchors(html);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].href, "/0046/decks/abc");
        assert_eq!(found[0].text, "Dragapult ex");
        assert_eq!(found[1].text, "Decks");
    }
}
