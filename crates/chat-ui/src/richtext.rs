//! Display bridge from rendered HTML fragments to egui-friendly blocks.
//!
//! The markdown renderer emits a small, closed tag vocabulary (p, h1–h3,
//! ol/ul/li, pre/code, strong, em, code, a, br). The canvas cannot take HTML
//! directly, so this walks the fragment once and produces block/span
//! structures the chat panel can paint. Unknown tags are dropped; their
//! interior text is kept.

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayBlock {
    Paragraph(Vec<InlineSpan>),
    Heading { level: u8, spans: Vec<InlineSpan> },
    CodeBlock(String),
    /// A list item; `ordinal` is set inside ordered lists.
    ListItem {
        ordinal: Option<usize>,
        spans: Vec<InlineSpan>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct InlineSpan {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
    pub link: Option<String>,
}

/// Parse one rendered fragment into display blocks.
pub fn parse_fragment(html: &str) -> Vec<DisplayBlock> {
    let mut ctx = ParseContext::new();
    let mut rest = html;

    while !rest.is_empty() {
        let Some(open) = rest.find('<') else {
            ctx.text(rest);
            break;
        };
        if open > 0 {
            ctx.text(&rest[..open]);
        }
        rest = &rest[open..];

        // A fenced block: capture the raw interior verbatim.
        if let Some(inner) = rest.strip_prefix("<pre><code>") {
            match inner.find("</code></pre>") {
                Some(end) => {
                    ctx.code_block(&inner[..end]);
                    rest = &inner[end + "</code></pre>".len()..];
                    continue;
                }
                None => {
                    ctx.text(rest);
                    break;
                }
            }
        }

        let Some(close) = rest.find('>') else {
            ctx.text(rest);
            break;
        };
        let tag = &rest[1..close];
        rest = &rest[close + 1..];
        ctx.tag(tag);
    }

    ctx.finish()
}

struct ParseContext {
    blocks: Vec<DisplayBlock>,
    spans: Vec<InlineSpan>,
    kind: BlockKind,
    bold: bool,
    italic: bool,
    code: bool,
    link: Option<String>,
    // Some(count) while inside an ordered list
    ordered: Option<usize>,
}

#[derive(Clone, Copy)]
enum BlockKind {
    Paragraph,
    Heading(u8),
    Item(Option<usize>),
}

impl ParseContext {
    fn new() -> Self {
        Self {
            blocks: Vec::new(),
            spans: Vec::new(),
            kind: BlockKind::Paragraph,
            bold: false,
            italic: false,
            code: false,
            link: None,
            ordered: None,
        }
    }

    fn text(&mut self, raw: &str) {
        if raw.is_empty() {
            return;
        }
        self.spans.push(InlineSpan {
            text: unescape(raw),
            bold: self.bold,
            italic: self.italic,
            code: self.code,
            link: self.link.clone(),
        });
    }

    fn code_block(&mut self, raw: &str) {
        self.flush();
        self.blocks.push(DisplayBlock::CodeBlock(unescape(raw)));
    }

    fn tag(&mut self, tag: &str) {
        match tag {
            "p" => {
                self.flush();
                self.kind = BlockKind::Paragraph;
            }
            "/p" => self.flush(),
            "h1" | "h2" | "h3" => {
                self.flush();
                let level = tag.as_bytes()[1] - b'0';
                self.kind = BlockKind::Heading(level);
            }
            "/h1" | "/h2" | "/h3" => {
                self.flush();
                self.kind = BlockKind::Paragraph;
            }
            "ol" => self.ordered = Some(0),
            "/ol" => self.ordered = None,
            "ul" | "/ul" => {}
            "li" => {
                self.flush();
                if let Some(count) = self.ordered.as_mut() {
                    *count += 1;
                }
                self.kind = BlockKind::Item(self.ordered);
            }
            "/li" => {
                self.flush();
                self.kind = BlockKind::Paragraph;
            }
            "strong" => self.bold = true,
            "/strong" => self.bold = false,
            "em" => self.italic = true,
            "/em" => self.italic = false,
            "code" => self.code = true,
            "/code" => self.code = false,
            "/a" => self.link = None,
            "br" | "br/" | "br /" => self.text("\n"),
            _ if tag.starts_with("a ") => {
                self.link = extract_href(tag);
            }
            _ => {
                log::debug!("ignoring unknown tag in fragment: <{}>", tag);
            }
        }
    }

    fn flush(&mut self) {
        if self.spans.is_empty() {
            return;
        }
        let spans = std::mem::take(&mut self.spans);
        let block = match self.kind {
            BlockKind::Paragraph => DisplayBlock::Paragraph(spans),
            BlockKind::Heading(level) => DisplayBlock::Heading { level, spans },
            BlockKind::Item(ordinal) => DisplayBlock::ListItem { ordinal, spans },
        };
        self.blocks.push(block);
    }

    fn finish(mut self) -> Vec<DisplayBlock> {
        self.flush();
        self.blocks
    }
}

fn extract_href(tag: &str) -> Option<String> {
    let start = tag.find("href=\"")? + "href=\"".len();
    let end = tag[start..].find('"')? + start;
    Some(unescape(&tag[start..end]))
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
