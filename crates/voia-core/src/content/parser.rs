//! Tolerant HTML reader for stored entry content.
//!
//! Understands the markup the journal editor writes: paragraphs (empty ones
//! included), `h1`-`h6`, `ul`/`ol` with `li`, `blockquote`, `pre`, `hr`,
//! `img`, `br` and the `strong`, `em`, `s` and `code` marks with their
//! legacy spellings. Nested lists and quotes are flattened one level. Other
//! tags are dropped and their text kept; other block-level tags end the
//! current paragraph. Malformed markup never fails.

use std::sync::OnceLock;

use regex::Regex;

use super::document::{Block, Line, Marks};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Open { name: String, attrs: String },
    Close { name: String },
    Text(String),
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)<!--.*?-->|<(/?)([A-Za-z][A-Za-z0-9]*)([^>]*)>")
            .expect("Invalid regex")
    })
}

fn attr_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)([a-z][a-z0-9-]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
            .expect("Invalid regex")
    })
}

fn tokenize(markup: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut cursor = 0;
    for captures in tag_pattern().captures_iter(markup) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        if whole.start() > cursor {
            tokens.push(Token::Text(decode_entities(&markup[cursor..whole.start()])));
        }
        cursor = whole.end();

        let Some(name) = captures.get(2) else {
            // comment
            continue;
        };
        let name = name.as_str().to_ascii_lowercase();
        let closing = captures.get(1).is_some_and(|slash| !slash.as_str().is_empty());
        if closing {
            tokens.push(Token::Close { name });
        } else {
            let attrs = captures
                .get(3)
                .map_or_else(String::new, |attrs| attrs.as_str().to_string());
            tokens.push(Token::Open { name, attrs });
        }
    }
    if cursor < markup.len() {
        tokens.push(Token::Text(decode_entities(&markup[cursor..])));
    }
    tokens
}

fn attribute(attrs: &str, wanted: &str) -> Option<String> {
    attr_pattern().captures_iter(attrs).find_map(|captures| {
        let name = captures.get(1)?.as_str();
        if !name.eq_ignore_ascii_case(wanted) {
            return None;
        }
        let value = captures
            .get(2)
            .or_else(|| captures.get(3))
            .or_else(|| captures.get(4))?;
        Some(decode_entities(value.as_str()))
    })
}

fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let decoded = tail.find(';').filter(|end| *end <= 10).and_then(|end| {
            let entity = &tail[1..end];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            }?;
            Some((ch, end + 1))
        });
        match decoded {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

const BLOCK_TAGS: [&str; 4] = ["div", "section", "article", "figure"];

const SKIPPED_CONTENT_TAGS: [&str; 2] = ["script", "style"];

fn heading_level(name: &str) -> Option<u8> {
    let level = name.strip_prefix('h')?.parse().ok()?;
    (1..=6).contains(&level).then_some(level)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextKind {
    Paragraph,
    Heading(u8),
}

/// The paragraph or heading being filled. `explicit` blocks came from a tag
/// and are kept even when empty.
struct OpenText {
    kind: TextKind,
    line: Line,
    explicit: bool,
}

struct OpenList {
    ordered: bool,
    start: u32,
    items: Vec<Line>,
    depth: usize,
}

#[derive(Default)]
struct Builder {
    blocks: Vec<Block>,
    quote: Option<Vec<Block>>,
    text_block: Option<OpenText>,
    list: Option<OpenList>,
    item: Option<Line>,
    code_block: Option<String>,
    bold: usize,
    italic: usize,
    strike: usize,
    code: usize,
    skipping: Option<String>,
}

impl Builder {
    fn marks(&self) -> Marks {
        Marks {
            bold: self.bold > 0,
            italic: self.italic > 0,
            strike: self.strike > 0,
            code: self.code > 0,
        }
    }

    fn emit(&mut self, block: Block) {
        match self.quote.as_mut() {
            Some(quoted) => quoted.push(block),
            None => self.blocks.push(block),
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(code) = self.code_block.as_mut() {
            code.push_str(text);
            return;
        }
        let marks = self.marks();
        if let Some(item) = self.item.as_mut() {
            item.push(text, marks);
            return;
        }
        if self.list.is_some() {
            // Whitespace between list items.
            if text.trim().is_empty() {
                return;
            }
            self.open_item();
            if let Some(item) = self.item.as_mut() {
                item.push(text, marks);
            }
            return;
        }
        if let Some(open) = self.text_block.as_mut() {
            if open.explicit || !open.line.is_empty() || !text.trim().is_empty() {
                open.line.push(text, marks);
            }
            return;
        }
        if text.trim().is_empty() {
            return;
        }
        let mut line = Line::new();
        line.push(text, marks);
        self.text_block = Some(OpenText {
            kind: TextKind::Paragraph,
            line,
            explicit: false,
        });
    }

    fn start_text_block(&mut self, kind: TextKind) {
        self.close_list();
        self.flush_text_block();
        self.text_block = Some(OpenText {
            kind,
            line: Line::new(),
            explicit: true,
        });
    }

    fn flush_text_block(&mut self) {
        let Some(open) = self.text_block.take() else {
            return;
        };
        if !open.explicit && open.line.is_empty() {
            return;
        }
        let block = match open.kind {
            TextKind::Paragraph => Block::Paragraph(open.line),
            TextKind::Heading(level) => Block::Heading {
                level,
                line: open.line,
            },
        };
        self.emit(block);
    }

    fn open_list(&mut self, ordered: bool, attrs: &str) {
        if let Some(list) = self.list.as_mut() {
            list.depth += 1;
            return;
        }
        self.flush_text_block();
        let start = attribute(attrs, "start")
            .and_then(|start| start.trim().parse().ok())
            .unwrap_or(1);
        self.list = Some(OpenList {
            ordered,
            start,
            items: Vec::new(),
            depth: 1,
        });
    }

    fn open_item(&mut self) {
        self.close_item();
        if self.list.is_none() {
            self.open_list(false, "");
        }
        self.item = Some(Line::new());
    }

    fn close_item(&mut self) {
        if let Some(item) = self.item.take() {
            if let Some(list) = self.list.as_mut() {
                list.items.push(item);
            }
        }
    }

    fn end_list(&mut self) {
        let nested = self.list.as_mut().is_some_and(|list| {
            list.depth -= 1;
            list.depth > 0
        });
        if !nested {
            self.close_list();
        }
    }

    fn close_list(&mut self) {
        self.close_item();
        let Some(list) = self.list.take() else {
            return;
        };
        if list.items.is_empty() {
            return;
        }
        let block = if list.ordered {
            Block::OrderedList {
                start: list.start,
                items: list.items,
            }
        } else {
            Block::BulletList(list.items)
        };
        self.emit(block);
    }

    fn open_quote(&mut self) {
        self.close_list();
        self.flush_text_block();
        if self.quote.is_none() {
            self.quote = Some(Vec::new());
        }
    }

    fn close_quote(&mut self) {
        self.close_list();
        self.flush_text_block();
        if let Some(quoted) = self.quote.take() {
            self.blocks.push(Block::Blockquote(quoted));
        }
    }

    fn close_code_block(&mut self) {
        if let Some(code) = self.code_block.take() {
            self.emit(Block::CodeBlock(code));
        }
    }

    fn image(&mut self, attrs: &str) {
        let Some(src) = attribute(attrs, "src").filter(|src| !src.trim().is_empty()) else {
            return;
        };
        self.close_list();
        // An image alone in its paragraph replaces it.
        if self
            .text_block
            .as_ref()
            .is_some_and(|open| open.line.is_empty())
        {
            self.text_block = None;
        }
        self.flush_text_block();
        self.emit(Block::Image {
            src: src.trim().to_string(),
            alt: attribute(attrs, "alt").filter(|alt| !alt.is_empty()),
        });
    }

    fn open(&mut self, name: &str, attrs: &str) {
        if self.code_block.is_some() {
            if name == "br" {
                self.text("\n");
            }
            return;
        }
        match name {
            "p" if self.item.is_none() => self.start_text_block(TextKind::Paragraph),
            "ul" => self.open_list(false, attrs),
            "ol" => self.open_list(true, attrs),
            "li" => self.open_item(),
            "blockquote" => self.open_quote(),
            "pre" => {
                self.close_list();
                self.flush_text_block();
                self.code_block = Some(String::new());
            }
            "hr" => {
                self.close_list();
                self.flush_text_block();
                self.emit(Block::Rule);
            }
            "strong" | "b" => self.bold += 1,
            "em" | "i" => self.italic += 1,
            "s" | "strike" | "del" => self.strike += 1,
            "code" => self.code += 1,
            "br" => self.text("\n"),
            "img" => self.image(attrs),
            name if SKIPPED_CONTENT_TAGS.contains(&name) => {
                self.skipping = Some(name.to_string());
            }
            name => {
                if let Some(level) = heading_level(name) {
                    self.start_text_block(TextKind::Heading(level));
                } else if BLOCK_TAGS.contains(&name) {
                    self.close_list();
                    self.flush_text_block();
                }
            }
        }
    }

    fn close(&mut self, name: &str) {
        if self.code_block.is_some() {
            if name == "pre" {
                self.close_code_block();
            }
            return;
        }
        match name {
            "p" if self.item.is_none() => self.flush_text_block(),
            "ul" | "ol" => self.end_list(),
            "li" => self.close_item(),
            "blockquote" => self.close_quote(),
            "strong" | "b" => self.bold = self.bold.saturating_sub(1),
            "em" | "i" => self.italic = self.italic.saturating_sub(1),
            "s" | "strike" | "del" => self.strike = self.strike.saturating_sub(1),
            "code" => self.code = self.code.saturating_sub(1),
            name if heading_level(name).is_some() || BLOCK_TAGS.contains(&name) => {
                self.flush_text_block();
            }
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Block> {
        self.close_code_block();
        self.close_quote();
        self.close_list();
        self.flush_text_block();
        self.blocks
    }
}

pub(super) fn parse_blocks(markup: &str) -> Vec<Block> {
    let mut builder = Builder::default();
    for token in tokenize(markup) {
        if let Some(skipped) = builder.skipping.as_deref() {
            if matches!(&token, Token::Close { name } if name == skipped) {
                builder.skipping = None;
            }
            continue;
        }
        match token {
            Token::Open { name, attrs } => builder.open(&name, &attrs),
            Token::Close { name } => builder.close(&name),
            Token::Text(text) => builder.text(&text),
        }
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn decodes_named_and_numeric_entities() {
        assert_eq!(decode_entities("a &amp; b &lt;3 &#39;x&#x27;"), "a & b <3 'x'");
        assert_eq!(decode_entities("fish & chips"), "fish & chips");
        assert_eq!(decode_entities("&unknown;"), "&unknown;");
    }

    #[test]
    fn reads_quoted_and_bare_attributes() {
        assert_eq!(
            attribute(r#" src="https://x.test/a.jpg" alt='hi'"#, "src").as_deref(),
            Some("https://x.test/a.jpg")
        );
        assert_eq!(attribute(" SRC=https://x.test/b.png", "src").as_deref(), Some("https://x.test/b.png"));
        assert_eq!(attribute(" alt='hi'", "src"), None);
    }

    #[test]
    fn tokenizes_tags_text_and_comments() {
        let tokens = tokenize("<P class=\"x\">hi<!-- note --></p>");
        assert_eq!(
            tokens,
            vec![
                Token::Open {
                    name: "p".to_string(),
                    attrs: " class=\"x\"".to_string()
                },
                Token::Text("hi".to_string()),
                Token::Close {
                    name: "p".to_string()
                },
            ]
        );
    }

    #[test]
    fn bare_text_becomes_paragraph() {
        assert_eq!(
            parse_blocks("just words"),
            vec![Block::Paragraph(Line::from("just words"))]
        );
    }

    #[test]
    fn list_items_without_paragraphs() {
        assert_eq!(
            parse_blocks("<ul><li>one</li><li>two</ul>"),
            vec![Block::BulletList(vec![Line::from("one"), Line::from("two")])]
        );
        assert_eq!(
            parse_blocks("<ol start=\"4\"><li>four</li></ol>"),
            vec![Block::OrderedList {
                start: 4,
                items: vec![Line::from("four")]
            }]
        );
    }

    #[test]
    fn unknown_tags_keep_text_and_scripts_are_dropped() {
        assert_eq!(
            parse_blocks("<p><span>kept</span> <u>too</u></p><script>alert(1)</script><div>Title</div>"),
            vec![
                Block::Paragraph(Line::from("kept too")),
                Block::Paragraph(Line::from("Title")),
            ]
        );
    }

    #[test]
    fn empty_paragraphs_are_kept_but_stray_whitespace_is_not() {
        assert_eq!(
            parse_blocks("<p>a</p><p></p>\n<p>b</p>"),
            vec![
                Block::Paragraph(Line::from("a")),
                Block::Paragraph(Line::new()),
                Block::Paragraph(Line::from("b")),
            ]
        );
    }

    #[test]
    fn headings_quotes_and_strike_are_modelled() {
        assert_eq!(
            parse_blocks("<h2>Psalm</h2><blockquote><p>q</p><ul><li><p>i</p></li></ul></blockquote><p><s>x</s></p>"),
            vec![
                Block::Heading {
                    level: 2,
                    line: Line::from("Psalm")
                },
                Block::Blockquote(vec![
                    Block::Paragraph(Line::from("q")),
                    Block::BulletList(vec![Line::from("i")]),
                ]),
                Block::Paragraph({
                    let mut line = Line::new();
                    line.push(
                        "x",
                        Marks {
                            strike: true,
                            ..Marks::PLAIN
                        },
                    );
                    line
                }),
            ]
        );
    }

    #[test]
    fn code_block_keeps_whitespace_and_markup_text() {
        assert_eq!(
            parse_blocks("<pre><code>fn main() {\n    a &lt; b\n}</code></pre>"),
            vec![Block::CodeBlock("fn main() {\n    a < b\n}".to_string())]
        );
    }

    #[test]
    fn nested_lists_flatten_into_the_outer_list() {
        assert_eq!(
            parse_blocks("<ul><li><p>a</p><ul><li><p>b</p></li></ul></li><li><p>c</p></li></ul><p>after</p>"),
            vec![
                Block::BulletList(vec![Line::from("a"), Line::from("b"), Line::from("c")]),
                Block::Paragraph(Line::from("after")),
            ]
        );
    }

    #[test]
    fn image_alone_in_paragraph_replaces_it() {
        assert_eq!(
            parse_blocks("<p><img src=\"https://x.test/a.jpg\"></p>"),
            vec![Block::Image {
                src: "https://x.test/a.jpg".to_string(),
                alt: None
            }]
        );
    }

    #[test]
    fn image_without_src_is_ignored() {
        assert!(parse_blocks("<img alt=\"nothing\">").is_empty());
    }
}
