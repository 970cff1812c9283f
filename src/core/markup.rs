//! Rich-text block model and its markup form
//!
//! Document content is stored as a small HTML subset. This module parses
//! that markup into discrete blocks of styled characters, which is what the
//! editor surface manipulates, and serializes blocks back into canonical
//! markup. Anything outside the subset is dropped but its text is kept.

use std::sync::OnceLock;

use regex_lite::Regex;

/// Inline character styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Marks {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

/// A character with its inline styling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyledChar {
    pub ch: char,
    pub marks: Marks,
}

/// Block-level element kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    /// Heading level 1-6
    Heading(u8),
    ListItem {
        ordered: bool,
    },
    Image {
        src: String,
        alt: String,
    },
}

/// One block of content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    /// Inline content; always empty for images
    pub chars: Vec<StyledChar>,
}

impl Block {
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            chars: Vec::new(),
        }
    }

    pub fn paragraph() -> Self {
        Self::new(BlockKind::Paragraph)
    }

    /// Block holding `text` with uniform marks
    #[cfg(test)]
    pub fn with_text(kind: BlockKind, text: &str, marks: Marks) -> Self {
        Self {
            kind,
            chars: text.chars().map(|ch| StyledChar { ch, marks }).collect(),
        }
    }

    /// Plain text without styling
    pub fn text(&self) -> String {
        self.chars.iter().map(|c| c.ch).collect()
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Whether the block carries editable text
    pub fn is_text(&self) -> bool {
        !matches!(self.kind, BlockKind::Image { .. })
    }
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<!--.*?-->|<(/?)([A-Za-z][A-Za-z0-9]*)([^>]*)>")
            .expect("tag pattern is valid")
    })
}

fn attr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>/]+))"#)
            .expect("attribute pattern is valid")
    })
}

fn attribute(attrs: &str, name: &str) -> Option<String> {
    attr_regex().captures_iter(attrs).find_map(|cap| {
        let key = cap.get(1)?.as_str();
        if !key.eq_ignore_ascii_case(name) {
            return None;
        }
        let value = cap
            .get(2)
            .or_else(|| cap.get(3))
            .or_else(|| cap.get(4))
            .map(|m| m.as_str())
            .unwrap_or_default();
        Some(decode_entities(value))
    })
}

/// Incremental parser state
#[derive(Default)]
struct Builder {
    blocks: Vec<Block>,
    current: Option<Block>,
    bold: u32,
    italic: u32,
    underline: u32,
    lists: Vec<bool>,
    /// Inside an `li`, where paragraphs are inline content
    in_item: bool,
}

impl Builder {
    fn marks(&self) -> Marks {
        Marks {
            bold: self.bold > 0,
            italic: self.italic > 0,
            underline: self.underline > 0,
        }
    }

    /// Start a new block, dropping the open one if it holds nothing
    fn open(&mut self, kind: BlockKind) {
        if let Some(block) = self.current.take() {
            if !block.is_empty() {
                self.push(block);
            }
        }
        self.current = Some(Block::new(kind));
    }

    /// Close the open block, keeping it even when empty
    fn close(&mut self) {
        if let Some(block) = self.current.take() {
            self.push(block);
        }
    }

    /// Close the open block only if it holds text
    fn flush(&mut self) {
        if let Some(block) = self.current.take() {
            if !block.is_empty() {
                self.push(block);
            }
        }
    }

    fn push(&mut self, mut block: Block) {
        // A trailing <br> does not render as an extra line
        if block.chars.last().is_some_and(|c| c.ch == '\n') {
            block.chars.pop();
        }
        self.blocks.push(block);
    }

    fn push_char(&mut self, ch: char) {
        let marks = self.marks();
        self.current
            .get_or_insert_with(Block::paragraph)
            .chars
            .push(StyledChar { ch, marks });
    }

    fn text(&mut self, raw: &str) {
        let decoded = decode_entities(raw);
        if self.current.is_none() && decoded.trim().is_empty() {
            return;
        }
        for ch in decoded.chars() {
            let ch = if matches!(ch, '\n' | '\r' | '\t') { ' ' } else { ch };
            self.push_char(ch);
        }
    }

    /// Paragraph opening inside a list item: a line break between texts
    fn item_paragraph(&mut self) {
        let needs_break = self
            .current
            .as_ref()
            .and_then(|b| b.chars.last())
            .is_some_and(|c| c.ch != '\n');
        if needs_break {
            self.push_char('\n');
        }
    }

    fn tag(&mut self, closing: bool, name: &str, attrs: &str) {
        let name = name.to_ascii_lowercase();
        match (closing, name.as_str()) {
            (false, "p" | "div") if self.in_item => self.item_paragraph(),
            (true, "p" | "div") if self.in_item => {}
            (false, "p" | "div") => self.open(BlockKind::Paragraph),
            (false, "h1" | "h2" | "h3" | "h4" | "h5" | "h6") => {
                let level = name[1..].parse().unwrap_or(1);
                self.open(BlockKind::Heading(level));
            }
            (false, "li") => {
                let ordered = self.lists.last().copied().unwrap_or(false);
                self.open(BlockKind::ListItem { ordered });
                self.in_item = true;
            }
            (true, "li") => {
                self.in_item = false;
                self.close();
            }
            (true, "p" | "div" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6") => self.close(),
            (false, "ul" | "ol") => {
                self.flush();
                self.lists.push(name == "ol");
            }
            (true, "ul" | "ol") => {
                self.in_item = false;
                self.flush();
                self.lists.pop();
            }
            (false, "b" | "strong") => self.bold += 1,
            (true, "b" | "strong") => self.bold = self.bold.saturating_sub(1),
            (false, "i" | "em") => self.italic += 1,
            (true, "i" | "em") => self.italic = self.italic.saturating_sub(1),
            (false, "u") => self.underline += 1,
            (true, "u") => self.underline = self.underline.saturating_sub(1),
            (false, "br") => self.push_char('\n'),
            (false, "img") => {
                self.flush();
                self.blocks.push(Block::new(BlockKind::Image {
                    src: attribute(attrs, "src").unwrap_or_default(),
                    alt: attribute(attrs, "alt").unwrap_or_default(),
                }));
            }
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush();
        self.blocks
    }
}

/// Parse markup into blocks
pub fn parse(markup: &str) -> Vec<Block> {
    let mut builder = Builder::default();
    let mut last = 0;

    for cap in tag_regex().captures_iter(markup) {
        let Some(whole) = cap.get(0) else { continue };
        builder.text(&markup[last..whole.start()]);
        last = whole.end();

        // Comments have no tag name
        let Some(name) = cap.get(2) else { continue };
        let closing = cap.get(1).is_some_and(|m| !m.as_str().is_empty());
        let attrs = cap.get(3).map(|m| m.as_str()).unwrap_or_default();
        builder.tag(closing, name.as_str(), attrs);
    }
    builder.text(&markup[last..]);

    builder.finish()
}

/// Serialize blocks into canonical markup
pub fn serialize(blocks: &[Block]) -> String {
    let mut out = String::new();
    let mut open_list: Option<bool> = None;

    for block in blocks {
        let list = match block.kind {
            BlockKind::ListItem { ordered } => Some(ordered),
            _ => None,
        };
        if open_list != list {
            if let Some(ordered) = open_list {
                out.push_str(if ordered { "</ol>" } else { "</ul>" });
            }
            if let Some(ordered) = list {
                out.push_str(if ordered { "<ol>" } else { "<ul>" });
            }
            open_list = list;
        }

        match &block.kind {
            BlockKind::Paragraph => {
                out.push_str("<p>");
                if block.is_empty() {
                    out.push_str("<br>");
                } else {
                    write_inline(&mut out, &block.chars);
                }
                out.push_str("</p>");
            }
            BlockKind::Heading(level) => {
                out.push_str(&format!("<h{level}>"));
                write_inline(&mut out, &block.chars);
                out.push_str(&format!("</h{level}>"));
            }
            BlockKind::ListItem { .. } => {
                out.push_str("<li>");
                write_inline(&mut out, &block.chars);
                out.push_str("</li>");
            }
            BlockKind::Image { src, alt } => {
                out.push_str(&format!(
                    "<img src=\"{}\" alt=\"{}\">",
                    escape_attr(src),
                    escape_attr(alt)
                ));
            }
        }
    }

    if let Some(ordered) = open_list {
        out.push_str(if ordered { "</ol>" } else { "</ul>" });
    }
    out
}

fn write_inline(out: &mut String, chars: &[StyledChar]) {
    let mut start = 0;
    while start < chars.len() {
        let marks = chars[start].marks;
        let end = chars[start..]
            .iter()
            .position(|c| c.marks != marks)
            .map_or(chars.len(), |n| start + n);

        if marks.bold {
            out.push_str("<b>");
        }
        if marks.italic {
            out.push_str("<i>");
        }
        if marks.underline {
            out.push_str("<u>");
        }
        for c in &chars[start..end] {
            match c.ch {
                '\n' => out.push_str("<br>"),
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                ch => out.push(ch),
            }
        }
        if marks.underline {
            out.push_str("</u>");
        }
        if marks.italic {
            out.push_str("</i>");
        }
        if marks.bold {
            out.push_str("</b>");
        }
        start = end;
    }
}

/// Escape text for use inside element content
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

/// Decode the named and numeric character references the editor emits
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').filter(|&end| end <= 10).and_then(|end| {
            let entity = &tail[1..end];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" | "#39" => Some('\''),
                "nbsp" => Some(' '),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|ch| (ch, end))
        });

        match decoded {
            Some((ch, end)) => {
                out.push(ch);
                rest = &tail[end + 1..];
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

#[cfg(test)]
mod tests {
    use super::*;

    const BOLD: Marks = Marks {
        bold: true,
        italic: false,
        underline: false,
    };

    #[test]
    fn test_parse_seed_content() {
        let blocks = parse("<h1>Acme Corp Proje Teklifi</h1><p>Giriş ve amaçlar...</p>");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].kind, BlockKind::Heading(1));
        assert_eq!(blocks[0].text(), "Acme Corp Proje Teklifi");
        assert_eq!(blocks[1].kind, BlockKind::Paragraph);
        assert_eq!(blocks[1].text(), "Giriş ve amaçlar...");
    }

    #[test]
    fn test_paragraphs_inside_list_items_stay_in_the_item() {
        let blocks = parse("<ul><li><p>item</p></li><li>a<p>b</p><div>c</div></li></ul><p>son</p>");
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].kind, BlockKind::ListItem { ordered: false });
        assert_eq!(blocks[0].text(), "item");
        assert_eq!(blocks[1].kind, BlockKind::ListItem { ordered: false });
        assert_eq!(blocks[1].text(), "a\nb\nc");
        assert_eq!(blocks[2].kind, BlockKind::Paragraph);
        assert_eq!(
            serialize(&blocks),
            "<ul><li>item</li><li>a<br>b<br>c</li></ul><p>son</p>"
        );
    }

    #[test]
    fn test_parse_inline_marks() {
        let blocks = parse("<p>a<b>b<i>c</i></b><u>d</u></p>");
        let marks: Vec<_> = blocks[0].chars.iter().map(|c| c.marks).collect();
        assert!(!marks[0].bold);
        assert_eq!(marks[1], BOLD);
        assert!(marks[2].bold && marks[2].italic);
        assert!(marks[3].underline && !marks[3].bold);
    }

    #[test]
    fn test_parse_lists_and_images() {
        let markup = r#"<ul><li>bir</li><li>iki</li></ul><ol><li>üç</li></ol><img src="data:image/png;base64,AAA" class="w-full" alt="Yüklenen Görsel" /><div><br></div>"#;
        let blocks = parse(markup);
        assert_eq!(blocks.len(), 5);
        assert_eq!(blocks[0].kind, BlockKind::ListItem { ordered: false });
        assert_eq!(blocks[2].kind, BlockKind::ListItem { ordered: true });
        assert_eq!(
            blocks[3].kind,
            BlockKind::Image {
                src: "data:image/png;base64,AAA".to_string(),
                alt: "Yüklenen Görsel".to_string(),
            }
        );
        assert_eq!(blocks[4], Block::paragraph());
    }

    #[test]
    fn test_loose_text_and_unknown_tags() {
        let blocks = parse("merhaba <span>dünya</span><p>x</p>\n  ");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text(), "merhaba dünya");
        assert_eq!(blocks[1].text(), "x");
        assert!(parse("").is_empty());
    }

    #[test]
    fn test_entities() {
        assert_eq!(decode_entities("a &amp; b &lt;c&gt; &#39;d&#x27; &unknown;"), "a & b <c> 'd' &unknown;");
        let blocks = parse("<p>1 &lt; 2</p>");
        assert_eq!(blocks[0].text(), "1 < 2");
    }

    #[test]
    fn test_serialize_canonical() {
        let mut item = Block::with_text(BlockKind::ListItem { ordered: false }, "x<y", Marks::default());
        item.chars[0].marks = BOLD;
        let blocks = vec![
            Block::with_text(BlockKind::Heading(2), "Başlık", Marks::default()),
            item,
            Block::with_text(BlockKind::ListItem { ordered: false }, "ikinci", Marks::default()),
            Block::paragraph(),
        ];
        let markup = serialize(&blocks);
        assert_eq!(
            markup,
            "<h2>Başlık</h2><ul><li><b>x</b>&lt;y</li><li>ikinci</li></ul><p><br></p>"
        );
        assert_eq!(parse(&markup), blocks);
    }

    #[test]
    fn test_line_breaks_survive() {
        let blocks = parse("<p>a<br>b<br></p>");
        assert_eq!(blocks[0].text(), "a\nb");
        assert_eq!(serialize(&blocks), "<p>a<br>b</p>");
    }
}
