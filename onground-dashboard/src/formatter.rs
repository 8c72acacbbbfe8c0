//! Chat message formatting
//!
//! Agent replies use a small markdown dialect (`**bold**`, `*italic*`, bullet
//! and numbered lists). This module turns that text into a block model that
//! the terminal renders with styles, and into the equivalent markup string.
//!
//! Passes run in a fixed order: bold first, so the italic pass never eats a
//! `**` pair, then italic, then a line-by-line structural pass. No escaping is
//! performed; text is carried through as-is.

use regex::Regex;
use std::sync::OnceLock;

fn bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*").expect("bold pattern"))
}

fn bullet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[*\-•]\s+").expect("bullet pattern"))
}

fn numbered_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]+\.\s+").expect("numbered pattern"))
}

fn caps_colon_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z\s]+:").expect("heading pattern"))
}

fn bold_caps_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\*\*[A-Z]").expect("heading pattern"))
}

const STRONG_OPEN: &str = "<strong>";
const STRONG_CLOSE: &str = "</strong>";
const EM_OPEN: &str = "<em>";
const EM_CLOSE: &str = "</em>";

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Char(char),
    Tag(&'static str),
}

impl Token {
    fn is(&self, c: char) -> bool {
        matches!(self, Token::Char(ch) if *ch == c)
    }
}

/// Inline content of one paragraph or list item.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InlineText {
    tokens: Vec<Token>,
}

/// A run of text sharing the same emphasis.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledRun {
    pub text: String,
    pub strong: bool,
    pub emphasis: bool,
}

impl InlineText {
    /// Markup form, tags included.
    pub fn markup(&self) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            match token {
                Token::Char(c) => out.push(*c),
                Token::Tag(tag) => out.push_str(tag),
            }
        }
        out
    }

    /// Text with emphasis resolved into flat runs.
    pub fn runs(&self) -> Vec<StyledRun> {
        let mut runs: Vec<StyledRun> = Vec::new();
        let mut strong = 0usize;
        let mut emphasis = 0usize;

        for token in &self.tokens {
            match token {
                Token::Tag(STRONG_OPEN) => strong += 1,
                Token::Tag(STRONG_CLOSE) => strong = strong.saturating_sub(1),
                Token::Tag(EM_OPEN) => emphasis += 1,
                Token::Tag(EM_CLOSE) => emphasis = emphasis.saturating_sub(1),
                Token::Tag(_) => {}
                Token::Char(c) => {
                    let (is_strong, is_em) = (strong > 0, emphasis > 0);
                    match runs.last_mut() {
                        Some(run) if run.strong == is_strong && run.emphasis == is_em => {
                            run.text.push(*c);
                        }
                        _ => runs.push(StyledRun {
                            text: c.to_string(),
                            strong: is_strong,
                            emphasis: is_em,
                        }),
                    }
                }
            }
        }

        runs
    }
}

/// One structural element of a formatted message.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph { heading: bool, content: InlineText },
    List { ordered: bool, items: Vec<InlineText> },
    Break,
}

/// A chat message after formatting.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormattedMessage {
    pub blocks: Vec<Block>,
}

impl FormattedMessage {
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Self::default();
        }

        let tokens = apply_italic(apply_bold(text));
        let mut blocks = Vec::new();
        let mut open_list: Option<(bool, Vec<InlineText>)> = None;

        for raw_line in tokens.split(|t| t.is('\n')) {
            let line = trim_tokens(raw_line);
            let markup = InlineText { tokens: line.to_vec() }.markup();

            let list_item = bullet_re()
                .find(&markup)
                .map(|m| (false, m))
                .or_else(|| numbered_re().find(&markup).map(|m| (true, m)));

            if let Some((ordered, prefix)) = list_item {
                let skip = prefix.as_str().chars().count();
                let item = InlineText {
                    tokens: line[skip..].to_vec(),
                };
                // A block keeps the tag of the line that opened it.
                open_list
                    .get_or_insert_with(|| (ordered, Vec::new()))
                    .1
                    .push(item);
                continue;
            }

            if let Some((ordered, items)) = open_list.take() {
                blocks.push(Block::List { ordered, items });
            }

            if line.is_empty() {
                blocks.push(Block::Break);
            } else {
                blocks.push(Block::Paragraph {
                    heading: is_heading(&markup),
                    content: InlineText {
                        tokens: line.to_vec(),
                    },
                });
            }
        }

        if let Some((ordered, items)) = open_list {
            blocks.push(Block::List { ordered, items });
        }

        Self { blocks }
    }

    pub fn to_markup(&self) -> String {
        let mut lines = Vec::new();
        for block in &self.blocks {
            match block {
                Block::Paragraph { heading: true, content } => {
                    lines.push(format!("<p><strong>{}</strong></p>", content.markup()));
                }
                Block::Paragraph { heading: false, content } => {
                    lines.push(format!("<p>{}</p>", content.markup()));
                }
                Block::List { ordered, items } => {
                    lines.push(if *ordered { "<ol>" } else { "<ul>" }.to_string());
                    for item in items {
                        lines.push(format!("<li>{}</li>", item.markup()));
                    }
                    lines.push(if *ordered { "</ol>" } else { "</ul>" }.to_string());
                }
                Block::Break => lines.push("<br>".to_string()),
            }
        }
        lines.join("\n")
    }
}

/// Format agent text into markup.
pub fn format_message_text(text: &str) -> String {
    FormattedMessage::parse(text).to_markup()
}

fn is_heading(markup: &str) -> bool {
    caps_colon_re().is_match(markup)
        || bold_caps_re().is_match(markup)
        || markup == markup.to_uppercase()
}

fn apply_bold(text: &str) -> Vec<Token> {
    let mut out = Vec::with_capacity(text.len());
    let mut last = 0;

    for caps in bold_re().captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.extend(text[last..whole.start()].chars().map(Token::Char));
        out.push(Token::Tag(STRONG_OPEN));
        out.extend(inner.as_str().chars().map(Token::Char));
        out.push(Token::Tag(STRONG_CLOSE));
        last = whole.end();
    }

    out.extend(text[last..].chars().map(Token::Char));
    out
}

/// A single `*` whose neighbours are not `*`.
fn is_lone_star(tokens: &[Token], idx: usize) -> bool {
    let star_at = |i: Option<usize>| i.and_then(|i| tokens.get(i)).is_some_and(|t| t.is('*'));
    tokens[idx].is('*') && !star_at(idx.checked_sub(1)) && !star_at(Some(idx + 1))
}

fn italic_close(tokens: &[Token], open: usize) -> Option<usize> {
    if !is_lone_star(tokens, open) {
        return None;
    }
    for j in open + 1..tokens.len() {
        if tokens[j].is('\n') {
            return None;
        }
        if j >= open + 2 && is_lone_star(tokens, j) {
            return Some(j);
        }
    }
    None
}

fn apply_italic(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;

    while i < tokens.len() {
        match italic_close(&tokens, i) {
            Some(close) => {
                out.push(Token::Tag(EM_OPEN));
                out.extend_from_slice(&tokens[i + 1..close]);
                out.push(Token::Tag(EM_CLOSE));
                i = close + 1;
            }
            None => {
                out.push(tokens[i].clone());
                i += 1;
            }
        }
    }

    out
}

fn trim_tokens(line: &[Token]) -> &[Token] {
    let blank = |t: &Token| matches!(t, Token::Char(c) if c.is_whitespace());
    let start = line.iter().position(|t| !blank(t)).unwrap_or(line.len());
    let end = line.iter().rposition(|t| !blank(t)).map_or(start, |i| i + 1);
    &line[start..end]
}
