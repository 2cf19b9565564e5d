//! HTML fragment tokenizer.
//!
//! Small and forgiving: enough to round-trip the price markup storefronts
//! emit. Text is kept raw (entities are not decoded) so that serializing a
//! parsed fragment reproduces the entity spelling the engine matches on.
//!
//! ```text
//! <span class="price">75 <b>SAR</b></span>
//!  -> Start(span, [class=price]) Text("75 ") Start(b) Text("SAR") End(b) End(span)
//! ```

pub(crate) const VOID_ELEMENTS: &[&str] =
    &["area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr"];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Start { tag: String, attrs: Vec<(String, Option<String>)>, self_closing: bool },
    End { tag: String },
    Text(String),
    Comment(String),
}

pub(crate) fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

pub(crate) fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut pos = 0;

    while let Some(offset) = input[pos..].find('<') {
        let lt = pos + offset;
        let rest = &input[lt..];

        let Some((token, len)) = read_markup(rest) else {
            pos = lt + 1;
            continue;
        };

        if lt > text_start {
            tokens.push(Token::Text(input[text_start..lt].to_string()));
        }
        pos = lt + len;

        // Raw-text bodies run up to the matching close tag, markup or not.
        if let Token::Start { tag, self_closing: false, .. } = &token {
            if RAW_TEXT_ELEMENTS.contains(&tag.as_str()) {
                let close = format!("</{tag}");
                let body_end = find_ascii_ci(&input[pos..], &close).map_or(input.len(), |i| pos + i);
                let tag = tag.clone();
                tokens.push(token);
                if body_end > pos {
                    tokens.push(Token::Text(input[pos..body_end].to_string()));
                }
                pos = body_end;
                if let Some(close_tag) = regex!(r"^</[A-Za-z]+\s*>").find(&input[pos..]) {
                    pos += close_tag.end();
                    tokens.push(Token::End { tag });
                }
                text_start = pos;
                continue;
            }
        }

        tokens.push(token);
        text_start = pos;
    }

    if text_start < input.len() {
        tokens.push(Token::Text(input[text_start..].to_string()));
    }
    tokens
}

/// Try to read a comment, start tag or end tag at the start of `rest`.
fn read_markup(rest: &str) -> Option<(Token, usize)> {
    if let Some(body) = rest.strip_prefix("<!--") {
        let end = body.find("-->")?;
        return Some((Token::Comment(body[..end].to_string()), 4 + end + 3));
    }

    if let Some(caps) = regex!(r"^</([A-Za-z][A-Za-z0-9-]*)\s*>").captures(rest) {
        let whole = caps.get(0)?;
        return Some((Token::End { tag: caps[1].to_ascii_lowercase() }, whole.end()));
    }

    let caps = regex!(
        r#"^<([A-Za-z][A-Za-z0-9-]*)((?:\s+[^\s/>"'=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'=<>`]+))?)*)\s*(/?)>"#
    )
    .captures(rest)?;
    let whole = caps.get(0)?;
    let attrs = caps.get(2).map_or(Vec::new(), |m| parse_attrs(m.as_str()));
    Some((
        Token::Start { tag: caps[1].to_ascii_lowercase(), attrs, self_closing: !caps[3].is_empty() },
        whole.end(),
    ))
}

fn parse_attrs(raw: &str) -> Vec<(String, Option<String>)> {
    regex!(r#"([^\s/>"'=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .captures_iter(raw)
        .map(|caps| {
            let value = caps.get(2).or_else(|| caps.get(3)).or_else(|| caps.get(4)).map(|m| m.as_str().to_string());
            (caps[1].to_ascii_lowercase(), value)
        })
        .collect()
}

fn find_ascii_ci(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    haystack.as_bytes().windows(needle.len()).position(|w| w.eq_ignore_ascii_case(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(tag: &str, attrs: &[(&str, Option<&str>)]) -> Token {
        Token::Start {
            tag: tag.into(),
            attrs: attrs.iter().map(|(k, v)| (k.to_string(), v.map(str::to_string))).collect(),
            self_closing: false,
        }
    }

    #[test]
    fn tokenizes_elements_and_text() {
        let tokens = tokenize(r#"<span class="price">75 <b>SAR</b></span>"#);
        assert_eq!(
            tokens,
            vec![
                start("span", &[("class", Some("price"))]),
                Token::Text("75 ".into()),
                start("b", &[]),
                Token::Text("SAR".into()),
                Token::End { tag: "b".into() },
                Token::End { tag: "span".into() },
            ]
        );
    }

    #[test]
    fn attribute_forms() {
        let tokens = tokenize(r#"<input type=text value='a b' disabled data-x="1">"#);
        assert_eq!(
            tokens,
            vec![start(
                "input",
                &[("type", Some("text")), ("value", Some("a b")), ("disabled", None), ("data-x", Some("1"))]
            )]
        );
    }

    #[test]
    fn comments_raw_text_and_stray_brackets() {
        let tokens = tokenize("1 < 2<!-- SAR --><script>if (a<b) {}</script>");
        assert_eq!(
            tokens,
            vec![
                Token::Text("1 < 2".into()),
                Token::Comment(" SAR ".into()),
                start("script", &[]),
                Token::Text("if (a<b) {}".into()),
                Token::End { tag: "script".into() },
            ]
        );
    }

    #[test]
    fn self_closing_is_flagged() {
        let tokens = tokenize("<br/>");
        assert_eq!(tokens, vec![Token::Start { tag: "br".into(), attrs: vec![], self_closing: true }]);
    }
}
