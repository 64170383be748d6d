//! Lightweight markup to display tree conversion for report text.

/// Pure conversion from formatted text to a display tree.
pub trait MarkupRenderer: Send + Sync {
    fn render(&self, source: &str) -> DisplayTree;
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisplayTree {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, content: Vec<Inline> },
    Paragraph(Vec<Inline>),
    ListItem { marker: ListMarker, content: Vec<Inline> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMarker {
    Bullet,
    Ordered(u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Strong(String),
    Emphasis(String),
    Code(String),
}

impl Inline {
    fn text(&self) -> &str {
        match self {
            Self::Text(text) | Self::Strong(text) | Self::Emphasis(text) | Self::Code(text) => text,
        }
    }
}

impl DisplayTree {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Flattens the tree to terminal text, one block per line.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|block| match block {
                Block::Heading { content, .. } | Block::Paragraph(content) => inline_text(content),
                Block::ListItem {
                    marker: ListMarker::Bullet,
                    content,
                } => format!("  - {}", inline_text(content)),
                Block::ListItem {
                    marker: ListMarker::Ordered(n),
                    content,
                } => format!("  {n}. {}", inline_text(content)),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn inline_text(content: &[Inline]) -> String {
    content.iter().map(Inline::text).collect()
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LightMarkup;

impl MarkupRenderer for LightMarkup {
    fn render(&self, source: &str) -> DisplayTree {
        let mut blocks = Vec::new();
        let mut paragraph: Vec<&str> = Vec::new();

        for line in source.lines() {
            let line = line.trim();
            if line.is_empty() {
                flush_paragraph(&mut paragraph, &mut blocks);
                continue;
            }
            if let Some((level, text)) = parse_heading(line) {
                flush_paragraph(&mut paragraph, &mut blocks);
                blocks.push(Block::Heading {
                    level,
                    content: parse_inline(text),
                });
                continue;
            }
            if let Some((marker, text)) = parse_list_item(line) {
                flush_paragraph(&mut paragraph, &mut blocks);
                blocks.push(Block::ListItem {
                    marker,
                    content: parse_inline(text),
                });
                continue;
            }
            paragraph.push(line);
        }
        flush_paragraph(&mut paragraph, &mut blocks);

        DisplayTree { blocks }
    }
}

fn flush_paragraph(lines: &mut Vec<&str>, blocks: &mut Vec<Block>) {
    if lines.is_empty() {
        return;
    }
    let joined = lines.join(" ");
    blocks.push(Block::Paragraph(parse_inline(&joined)));
    lines.clear();
}

fn parse_heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.bytes().take_while(|b| *b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &line[hashes..];
    if rest.is_empty() {
        return Some((hashes as u8, ""));
    }
    rest.starts_with(' ').then(|| (hashes as u8, rest.trim()))
}

fn parse_list_item(line: &str) -> Option<(ListMarker, &str)> {
    for bullet in ["- ", "* ", "+ "] {
        if let Some(text) = line.strip_prefix(bullet) {
            return Some((ListMarker::Bullet, text.trim()));
        }
    }

    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let text = line[digits..].strip_prefix(". ")?;
    let number = line[..digits].parse().ok()?;
    Some((ListMarker::Ordered(number), text.trim()))
}

const DELIMITERS: [(&str, fn(String) -> Inline); 5] = [
    ("**", Inline::Strong),
    ("__", Inline::Strong),
    ("`", Inline::Code),
    ("*", Inline::Emphasis),
    ("_", Inline::Emphasis),
];

fn parse_inline(text: &str) -> Vec<Inline> {
    let mut out = Vec::new();
    let mut plain = String::new();
    let mut rest = text;

    while !rest.is_empty() {
        // Underscores inside words (snake_case) stay literal.
        let at_word_boundary = plain.chars().last().map_or(true, |c| !c.is_alphanumeric());
        if let Some((inline, consumed)) = match_delimited(rest, at_word_boundary) {
            if !plain.is_empty() {
                out.push(Inline::Text(std::mem::take(&mut plain)));
            }
            out.push(inline);
            rest = &rest[consumed..];
            continue;
        }

        let mut chars = rest.chars();
        if let Some(ch) = chars.next() {
            plain.push(ch);
        }
        rest = chars.as_str();
    }

    if !plain.is_empty() {
        out.push(Inline::Text(plain));
    }
    out
}

fn match_delimited(rest: &str, at_word_boundary: bool) -> Option<(Inline, usize)> {
    for (delim, make) in DELIMITERS {
        let underscore = delim.starts_with('_');
        if underscore && !at_word_boundary {
            continue;
        }
        let Some(after) = rest.strip_prefix(delim) else {
            continue;
        };
        // Emphasis and strong must hug their content: `2 * 3 * 4` is arithmetic.
        let flanked = delim != "`";
        if flanked && after.starts_with(char::is_whitespace) {
            continue;
        }
        let close = after.match_indices(delim).map(|(at, _)| at).find(|&end| {
            end > 0
                && !(flanked && after[..end].ends_with(char::is_whitespace))
                && !(underscore
                    && after[end + delim.len()..]
                        .chars()
                        .next()
                        .is_some_and(char::is_alphanumeric))
        });
        let Some(end) = close else {
            continue;
        };
        return Some((make(after[..end].to_string()), delim.len() * 2 + end));
    }
    None
}
