//! Markdown-to-HTML rendering for model output.
//!
//! Pure function over the raw message text. The transformation order matters:
//! escaping runs first, and code interiors are lifted out into placeholder
//! tokens so later rules never re-match text already emitted as HTML.
//! The tag vocabulary is deliberately small: p, h1–h3, ol/ul/li, pre/code,
//! strong, em, a, code.

/// Pending-state placeholder the UI shows while an assistant message is
/// empty and in-flight. Passed through unchanged so the indicator is never
/// wrapped in markup.
pub const THINKING_PLACEHOLDER: &str = "Thinking...";

// Sentinels for lifted code regions. Control characters cannot appear in
// escaped text, so the tokens never collide with content.
const FENCED_MARK: char = '\u{1}';
const INLINE_MARK: char = '\u{2}';

/// Render raw message text to an HTML fragment.
pub fn render(input: &str) -> String {
    if input.is_empty() || input == THINKING_PLACEHOLDER {
        return input.to_string();
    }

    let text = escape_html(input);
    let text = apply_links(&text);

    let mut fenced = Vec::new();
    let text = extract_fenced(&text, &mut fenced);
    let mut inline = Vec::new();
    let text = extract_inline_code(&text, &mut inline);

    let text = apply_delimited(&text, "**", "<strong>", "</strong>");
    let text = apply_delimited(&text, "*", "<em>", "</em>");

    let body = structure_lines(&text);
    let html = finalize_paragraphs(&body);
    restore_tokens(html, &fenced, &inline)
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// `[text](url)` → anchor opening in a new context.
fn apply_links(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('[') {
        let Some(close) = rest[open..].find(']').map(|i| open + i) else {
            break;
        };
        if !rest[close + 1..].starts_with('(') {
            out.push_str(&rest[..close + 1]);
            rest = &rest[close + 1..];
            continue;
        }
        let Some(paren) = rest[close + 2..].find(')').map(|i| close + 2 + i) else {
            break;
        };

        let label = &rest[open + 1..close];
        let url = &rest[close + 2..paren];
        out.push_str(&rest[..open]);
        out.push_str(&format!(
            "<a href=\"{url}\" target=\"_blank\" rel=\"noopener noreferrer\">{label}</a>"
        ));
        rest = &rest[paren + 1..];
    }

    out.push_str(rest);
    out
}

/// Lift triple-backtick blocks out of the text. Interiors were already
/// escaped by the global pass and must not be touched by any later rule.
fn extract_fenced(text: &str, blocks: &mut Vec<String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find("```") {
        let Some(close) = rest[open + 3..].find("```").map(|i| open + 3 + i) else {
            break;
        };

        let inner = &rest[open + 3..close];
        let inner = inner.strip_prefix('\n').unwrap_or(inner);
        let inner = inner.strip_suffix('\n').unwrap_or(inner);

        out.push_str(&rest[..open]);
        out.push(FENCED_MARK);
        out.push_str(&blocks.len().to_string());
        out.push(FENCED_MARK);
        blocks.push(format!("<pre><code>{inner}</code></pre>"));

        rest = &rest[close + 3..];
    }

    out.push_str(rest);
    out
}

/// Lift single-backtick spans, so emphasis never fires inside code.
fn extract_inline_code(text: &str, spans: &mut Vec<String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('`') {
        let Some(close) = rest[open + 1..].find('`').map(|i| open + 1 + i) else {
            break;
        };
        let inner = &rest[open + 1..close];
        if inner.is_empty() || inner.contains('\n') {
            out.push_str(&rest[..open + 1]);
            rest = &rest[open + 1..];
            continue;
        }

        out.push_str(&rest[..open]);
        out.push(INLINE_MARK);
        out.push_str(&spans.len().to_string());
        out.push(INLINE_MARK);
        spans.push(format!("<code>{inner}</code>"));

        rest = &rest[close + 1..];
    }

    out.push_str(rest);
    out
}

/// Replace `delim`-wrapped spans with an HTML tag pair. Spans never cross
/// line boundaries; an unpaired or empty delimiter stays literal.
fn apply_delimited(text: &str, delim: &str, open_tag: &str, close_tag: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find(delim) {
        let after = open + delim.len();
        let inner_end = rest[after..].find(delim).map(|i| after + i);
        match inner_end {
            Some(close) if close > after && !rest[after..close].contains('\n') => {
                out.push_str(&rest[..open]);
                out.push_str(open_tag);
                out.push_str(&rest[after..close]);
                out.push_str(close_tag);
                rest = &rest[close + delim.len()..];
            }
            _ => {
                out.push_str(&rest[..after]);
                rest = &rest[after..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Line-by-line block structuring: headings, list runs, paragraph breaks.
/// List tags open and close exactly once per contiguous run; plain lines are
/// space-joined into the current paragraph.
fn structure_lines(text: &str) -> String {
    let mut out = String::new();
    let mut in_ol = false;
    let mut in_ul = false;
    let mut in_paragraph = false;

    for line in text.split('\n') {
        if let Some((level, rest)) = heading_line(line) {
            close_lists(&mut out, &mut in_ol, &mut in_ul);
            in_paragraph = false;
            out.push_str(&format!("<h{level}>{rest}</h{level}>"));
        } else if let Some(item) = ordered_item(line) {
            if in_ul {
                out.push_str("</ul>");
                in_ul = false;
            }
            if !in_ol {
                out.push_str("<ol>");
                in_ol = true;
            }
            in_paragraph = false;
            out.push_str(&format!("<li>{item}</li>"));
        } else if let Some(item) = unordered_item(line) {
            if in_ol {
                out.push_str("</ol>");
                in_ol = false;
            }
            if !in_ul {
                out.push_str("<ul>");
                in_ul = true;
            }
            in_paragraph = false;
            out.push_str(&format!("<li>{item}</li>"));
        } else if line.trim().is_empty() {
            close_lists(&mut out, &mut in_ol, &mut in_ul);
            in_paragraph = false;
            out.push_str("</p><p>");
        } else {
            close_lists(&mut out, &mut in_ol, &mut in_ul);
            if in_paragraph {
                out.push(' ');
            }
            out.push_str(line);
            in_paragraph = true;
        }
    }

    close_lists(&mut out, &mut in_ol, &mut in_ul);
    out
}

fn close_lists(out: &mut String, in_ol: &mut bool, in_ul: &mut bool) {
    if *in_ol {
        out.push_str("</ol>");
        *in_ol = false;
    }
    if *in_ul {
        out.push_str("</ul>");
        *in_ul = false;
    }
}

fn heading_line(line: &str) -> Option<(usize, &str)> {
    for (prefix, level) in [("### ", 3), ("## ", 2), ("# ", 1)] {
        if let Some(rest) = line.strip_prefix(prefix) {
            return Some((level, rest));
        }
    }
    None
}

fn ordered_item(line: &str) -> Option<&str> {
    let digits = line.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    line[digits..].strip_prefix(". ")
}

fn unordered_item(line: &str) -> Option<&str> {
    line.strip_prefix("- ").or_else(|| line.strip_prefix("* "))
}

/// Wrap the body in paragraph tags, drop empty paragraphs, and un-wrap
/// paragraphs that solely contain a heading, a list, or a lifted code block.
fn finalize_paragraphs(body: &str) -> String {
    let mut out = String::new();

    for segment in body.split("</p><p>") {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        if is_sole_block(segment) {
            out.push_str(segment);
        } else {
            out.push_str("<p>");
            out.push_str(segment);
            out.push_str("</p>");
        }
    }

    out
}

fn is_sole_block(segment: &str) -> bool {
    for (open, close) in [
        ("<h1>", "</h1>"),
        ("<h2>", "</h2>"),
        ("<h3>", "</h3>"),
        ("<ol>", "</ol>"),
        ("<ul>", "</ul>"),
    ] {
        if segment.starts_with(open)
            && segment.ends_with(close)
            && segment.matches(close).count() == 1
        {
            return true;
        }
    }

    // A lone fenced-code token (becomes <pre> on restore).
    let mut chars = segment.chars();
    if chars.next() == Some(FENCED_MARK)
        && segment.ends_with(FENCED_MARK)
        && segment.len() > 2
        && segment[1..segment.len() - 1]
            .chars()
            .all(|c| c.is_ascii_digit())
    {
        return true;
    }

    false
}

fn restore_tokens(html: String, fenced: &[String], inline: &[String]) -> String {
    let mut html = html;
    for (i, block) in fenced.iter().enumerate() {
        html = html.replace(&format!("{FENCED_MARK}{i}{FENCED_MARK}"), block);
    }
    for (i, span) in inline.iter().enumerate() {
        html = html.replace(&format!("{INLINE_MARK}{i}{INLINE_MARK}"), span);
    }
    html
}
