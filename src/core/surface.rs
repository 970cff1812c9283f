//! Editable rich-text surface
//!
//! `FormatSurface` is the capability the editor session and the toolbar
//! depend on: query the formatting at the cursor, apply a format, insert
//! markup. `MarkupSurface` implements it over the block model from
//! [`super::markup`], with a caret/selection addressed by block index and
//! character offset.

use super::markup::{self, Block, BlockKind, Marks, StyledChar};

/// Position between two characters of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Caret {
    pub block: usize,
    /// Character offset inside the block
    pub offset: usize,
}

impl Caret {
    pub fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }
}

/// Selection between an anchor and the moving head
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: Caret,
    pub head: Caret,
}

impl Selection {
    pub fn collapsed(at: Caret) -> Self {
        Self {
            anchor: at,
            head: at,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    pub fn start(&self) -> Caret {
        self.anchor.min(self.head)
    }

    pub fn end(&self) -> Caret {
        self.anchor.max(self.head)
    }
}

/// Block-level style a selection can be set to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStyle {
    Paragraph,
    Heading(u8),
}

/// Formatting action triggered from the toolbar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatCommand {
    Bold,
    Italic,
    Underline,
    UnorderedList,
    Block(BlockStyle),
}

/// Formatting flags at the current selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormatState {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub unordered_list: bool,
    pub heading1: bool,
    pub heading2: bool,
}

impl FormatState {
    /// Whether the toolbar button for `command` should be highlighted
    pub fn is_active(&self, command: FormatCommand) -> bool {
        match command {
            FormatCommand::Bold => self.bold,
            FormatCommand::Italic => self.italic,
            FormatCommand::Underline => self.underline,
            FormatCommand::UnorderedList => self.unordered_list,
            FormatCommand::Block(BlockStyle::Heading(1)) => self.heading1,
            FormatCommand::Block(BlockStyle::Heading(2)) => self.heading2,
            FormatCommand::Block(_) => false,
        }
    }
}

/// Capability interface over a rich-text editing widget
pub trait FormatSurface {
    /// Formatting at the current selection; read-only
    fn query_format_state(&self) -> FormatState;

    /// Apply `command` to the current selection or insertion point
    fn apply_format(&mut self, command: FormatCommand);

    /// Whether the surface has a cursor or selection
    fn has_cursor(&self) -> bool;

    /// Insert a markup fragment at the cursor, replacing any selection
    fn insert_markup(&mut self, fragment: &str);

    /// Append a markup fragment at the end of the content
    fn append_markup(&mut self, fragment: &str);

    /// Current content as markup
    fn markup(&self) -> String;

    /// Replace the whole content; clears the cursor
    fn load_markup(&mut self, markup: &str);
}

/// Block-model implementation of [`FormatSurface`]
#[derive(Debug, Clone)]
pub struct MarkupSurface {
    blocks: Vec<Block>,
    selection: Option<Selection>,
    /// Marks for the next typed characters at a collapsed caret
    pending: Option<Marks>,
}

impl Default for MarkupSurface {
    fn default() -> Self {
        Self {
            blocks: vec![Block::paragraph()],
            selection: None,
            pending: None,
        }
    }
}

impl MarkupSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_markup(markup: &str) -> Self {
        let mut surface = Self::new();
        surface.load_markup(markup);
        surface
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Moving end of the selection
    pub fn caret(&self) -> Option<Caret> {
        self.selection.map(|s| s.head)
    }

    /// Collapse the selection to `at`
    pub fn set_caret(&mut self, at: Caret) {
        self.selection = Some(Selection::collapsed(self.clamp(at)));
        self.pending = None;
    }

    pub fn select(&mut self, anchor: Caret, head: Caret) {
        self.selection = Some(Selection {
            anchor: self.clamp(anchor),
            head: self.clamp(head),
        });
        self.pending = None;
    }

    /// Drop the cursor, e.g. when the surface loses focus
    pub fn clear_cursor(&mut self) {
        self.selection = None;
        self.pending = None;
    }

    /// Caret at the very end of the content
    pub fn end(&self) -> Caret {
        let block = self.blocks.len() - 1;
        Caret::new(block, self.blocks[block].len())
    }

    fn clamp(&self, at: Caret) -> Caret {
        let block = at.block.min(self.blocks.len() - 1);
        Caret::new(block, at.offset.min(self.blocks[block].len()))
    }

    fn marks_at(&self, at: Caret) -> Marks {
        let chars = &self.blocks[at.block].chars;
        if at.offset > 0 {
            chars[at.offset - 1].marks
        } else {
            chars.first().map(|c| c.marks).unwrap_or_default()
        }
    }

    fn typing_marks(&self, at: Caret) -> Marks {
        self.pending.unwrap_or_else(|| self.marks_at(at))
    }

    /// Every character covered by a selection, as (block, index) pairs
    fn selected_chars(&self, sel: Selection) -> Vec<(usize, usize)> {
        let (start, end) = (sel.start(), sel.end());
        let mut out = Vec::new();
        for block in start.block..=end.block {
            let len = self.blocks[block].len();
            let from = if block == start.block { start.offset } else { 0 };
            let to = if block == end.block { end.offset } else { len };
            out.extend((from..to.min(len)).map(|i| (block, i)));
        }
        out
    }

    fn selected_text_blocks(&self, sel: Selection) -> Vec<usize> {
        (sel.start().block..=sel.end().block)
            .filter(|&b| self.blocks[b].is_text())
            .collect()
    }

    /// Replace the text of one block after an edit, keeping the styling of
    /// untouched characters. New characters take the typing marks.
    pub fn replace_block_text(&mut self, block: usize, text: &str, caret_offset: usize) {
        if block >= self.blocks.len() || !self.blocks[block].is_text() {
            return;
        }

        let old: Vec<char> = self.blocks[block].chars.iter().map(|c| c.ch).collect();
        let new: Vec<char> = text.chars().collect();

        let prefix = old.iter().zip(&new).take_while(|(a, b)| a == b).count();
        let max_suffix = old.len().min(new.len()) - prefix;
        let suffix = old
            .iter()
            .rev()
            .zip(new.iter().rev())
            .take(max_suffix)
            .take_while(|(a, b)| a == b)
            .count();

        let marks = self.typing_marks(Caret::new(block, prefix));
        let inserted: Vec<StyledChar> = new[prefix..new.len() - suffix]
            .iter()
            .map(|&ch| StyledChar { ch, marks })
            .collect();
        let typed = !inserted.is_empty();

        self.blocks[block]
            .chars
            .splice(prefix..old.len() - suffix, inserted);

        let pending = if typed { None } else { self.pending };
        self.set_caret(Caret::new(block, caret_offset));
        self.pending = pending;
    }

    /// Delete the selected range; returns whether anything changed
    pub fn delete_selection(&mut self) -> bool {
        let Some(sel) = self.selection.filter(|s| !s.is_collapsed()) else {
            return false;
        };
        let (start, end) = (sel.start(), sel.end());

        if start.block == end.block {
            self.blocks[start.block]
                .chars
                .drain(start.offset..end.offset);
        } else {
            let tail = self.blocks[end.block].chars.split_off(end.offset);
            let first = &mut self.blocks[start.block];
            first.chars.truncate(start.offset);
            first.chars.extend(tail);
            self.blocks.drain(start.block + 1..=end.block);
        }

        self.set_caret(start);
        true
    }

    /// Split the block at the caret (Enter)
    pub fn split_block(&mut self) {
        self.delete_selection();
        let Some(at) = self.caret() else { return };
        let pending = self.pending;

        let current = &mut self.blocks[at.block];
        let next_kind = match current.kind.clone() {
            BlockKind::Image { .. } => None,
            BlockKind::ListItem { .. } if current.is_empty() => {
                // Enter on an empty item leaves the list
                current.kind = BlockKind::Paragraph;
                return;
            }
            BlockKind::ListItem { ordered } => Some(BlockKind::ListItem { ordered }),
            BlockKind::Paragraph | BlockKind::Heading(_) => Some(BlockKind::Paragraph),
        };
        let next = match next_kind {
            Some(kind) => Block {
                kind,
                chars: current.chars.split_off(at.offset),
            },
            None => Block::paragraph(),
        };

        self.blocks.insert(at.block + 1, next);
        self.set_caret(Caret::new(at.block + 1, 0));
        self.pending = pending;
    }

    /// Backspace at the start of a block; returns whether anything changed
    pub fn merge_backward(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        let Some(at) = self.caret() else { return false };
        if at.offset > 0 {
            return false;
        }

        // A selected image is removed itself
        if !self.blocks[at.block].is_text() {
            self.blocks.remove(at.block);
            if self.blocks.is_empty() {
                self.blocks.push(Block::paragraph());
            }
            let caret = match at.block.checked_sub(1) {
                Some(prev) => Caret::new(prev, self.blocks[prev].len()),
                None => Caret::new(0, 0),
            };
            self.set_caret(caret);
            return true;
        }

        if self.blocks[at.block].kind != BlockKind::Paragraph {
            self.blocks[at.block].kind = BlockKind::Paragraph;
            return true;
        }
        if at.block == 0 {
            return false;
        }

        let prev = at.block - 1;
        if !self.blocks[prev].is_text() {
            self.blocks.remove(prev);
            self.set_caret(Caret::new(prev, 0));
            return true;
        }

        let current = self.blocks.remove(at.block);
        let join_at = self.blocks[prev].len();
        self.blocks[prev].chars.extend(current.chars);
        self.set_caret(Caret::new(prev, join_at));
        true
    }

    fn toggle_mark(&mut self, sel: Selection, get: fn(&Marks) -> bool, set: fn(&mut Marks, bool)) {
        if sel.is_collapsed() {
            let mut marks = self.typing_marks(sel.head);
            let value = !get(&marks);
            set(&mut marks, value);
            self.pending = Some(marks);
            return;
        }

        let chars = self.selected_chars(sel);
        let all_set = !chars.is_empty()
            && chars
                .iter()
                .all(|&(b, i)| get(&self.blocks[b].chars[i].marks));
        for (b, i) in chars {
            set(&mut self.blocks[b].chars[i].marks, !all_set);
        }
    }

    fn insert_blocks_at_caret(&mut self, incoming: Vec<Block>) {
        self.delete_selection();
        let Some(at) = self.caret() else { return };
        let count = incoming.len();

        let insert_at = if !self.blocks[at.block].is_text() {
            at.block + 1
        } else {
            let current = &mut self.blocks[at.block];
            let tail = Block {
                kind: current.kind.clone(),
                chars: current.chars.split_off(at.offset),
            };
            if !tail.is_empty() {
                self.blocks.insert(at.block + 1, tail);
            }
            if self.blocks[at.block].is_empty() {
                self.blocks.remove(at.block);
                at.block
            } else {
                at.block + 1
            }
        };

        let last = insert_at + count - 1;
        self.blocks.splice(insert_at..insert_at, incoming);
        self.set_caret(Caret::new(last, self.blocks[last].len()));
    }
}

impl FormatSurface for MarkupSurface {
    fn query_format_state(&self) -> FormatState {
        let Some(sel) = self.selection else {
            return FormatState::default();
        };

        let start = sel.start();
        let kind = &self.blocks[start.block].kind;
        let mut state = FormatState {
            unordered_list: *kind == BlockKind::ListItem { ordered: false },
            heading1: *kind == BlockKind::Heading(1),
            heading2: *kind == BlockKind::Heading(2),
            ..FormatState::default()
        };

        if sel.is_collapsed() {
            let marks = self.typing_marks(sel.head);
            state.bold = marks.bold;
            state.italic = marks.italic;
            state.underline = marks.underline;
        } else {
            let chars = self.selected_chars(sel);
            let all = |get: fn(&Marks) -> bool| {
                !chars.is_empty()
                    && chars
                        .iter()
                        .all(|&(b, i)| get(&self.blocks[b].chars[i].marks))
            };
            state.bold = all(|m| m.bold);
            state.italic = all(|m| m.italic);
            state.underline = all(|m| m.underline);
        }
        state
    }

    fn apply_format(&mut self, command: FormatCommand) {
        let Some(sel) = self.selection else {
            tracing::debug!("Ignoring {:?} without a cursor", command);
            return;
        };

        match command {
            FormatCommand::Bold => self.toggle_mark(sel, |m| m.bold, |m, v| m.bold = v),
            FormatCommand::Italic => self.toggle_mark(sel, |m| m.italic, |m, v| m.italic = v),
            FormatCommand::Underline => {
                self.toggle_mark(sel, |m| m.underline, |m, v| m.underline = v)
            }
            FormatCommand::UnorderedList => {
                let blocks = self.selected_text_blocks(sel);
                let all_listed = !blocks.is_empty()
                    && blocks.iter().all(|&b| {
                        self.blocks[b].kind == BlockKind::ListItem { ordered: false }
                    });
                let kind = if all_listed {
                    BlockKind::Paragraph
                } else {
                    BlockKind::ListItem { ordered: false }
                };
                for b in blocks {
                    self.blocks[b].kind = kind.clone();
                }
            }
            FormatCommand::Block(style) => {
                let kind = match style {
                    BlockStyle::Paragraph => BlockKind::Paragraph,
                    BlockStyle::Heading(level) => BlockKind::Heading(level.clamp(1, 6)),
                };
                for b in self.selected_text_blocks(sel) {
                    self.blocks[b].kind = kind.clone();
                }
            }
        }
    }

    fn has_cursor(&self) -> bool {
        self.selection.is_some()
    }

    fn insert_markup(&mut self, fragment: &str) {
        let incoming = markup::parse(fragment);
        if incoming.is_empty() {
            return;
        }
        if self.selection.is_none() {
            self.blocks.extend(incoming);
            return;
        }
        self.insert_blocks_at_caret(incoming);
    }

    fn append_markup(&mut self, fragment: &str) {
        self.blocks.extend(markup::parse(fragment));
    }

    fn markup(&self) -> String {
        markup::serialize(&self.blocks)
    }

    fn load_markup(&mut self, markup: &str) {
        self.blocks = markup::parse(markup);
        if self.blocks.is_empty() {
            self.blocks.push(Block::paragraph());
        }
        self.clear_cursor();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface(markup: &str) -> MarkupSurface {
        MarkupSurface::from_markup(markup)
    }

    #[test]
    fn test_no_cursor_means_no_flags_and_no_changes() {
        let mut s = surface("<h1>Başlık</h1>");
        assert_eq!(s.query_format_state(), FormatState::default());
        s.apply_format(FormatCommand::Bold);
        assert_eq!(s.markup(), "<h1>Başlık</h1>");
    }

    #[test]
    fn test_block_flags_follow_caret() {
        let mut s = surface("<h1>a</h1><h2>b</h2><ul><li>c</li></ul><p>d</p>");
        s.set_caret(Caret::new(0, 1));
        assert!(s.query_format_state().heading1);
        s.set_caret(Caret::new(1, 0));
        assert!(s.query_format_state().heading2);
        s.set_caret(Caret::new(2, 1));
        let state = s.query_format_state();
        assert!(state.unordered_list && !state.heading1 && !state.heading2);
        s.set_caret(Caret::new(3, 1));
        assert_eq!(s.query_format_state(), FormatState::default());
    }

    #[test]
    fn test_caret_reads_marks_of_previous_char() {
        let mut s = surface("<p>a<b>bc</b>d</p>");
        s.set_caret(Caret::new(0, 2));
        assert!(s.query_format_state().bold);
        s.set_caret(Caret::new(0, 1));
        assert!(!s.query_format_state().bold);
        s.set_caret(Caret::new(0, 4));
        assert!(!s.query_format_state().bold);
    }

    #[test]
    fn test_toggle_bold_on_selection() {
        let mut s = surface("<p>merhaba dünya</p>");
        s.select(Caret::new(0, 0), Caret::new(0, 7));
        s.apply_format(FormatCommand::Bold);
        assert_eq!(s.markup(), "<p><b>merhaba</b> dünya</p>");
        assert!(s.query_format_state().bold);

        s.apply_format(FormatCommand::Bold);
        assert_eq!(s.markup(), "<p>merhaba dünya</p>");
        assert!(!s.query_format_state().bold);
    }

    #[test]
    fn test_partial_selection_sets_mark_everywhere() {
        let mut s = surface("<p><i>ab</i>cd</p>");
        s.select(Caret::new(0, 4), Caret::new(0, 0));
        assert!(!s.query_format_state().italic);
        s.apply_format(FormatCommand::Italic);
        assert_eq!(s.markup(), "<p><i>abcd</i></p>");
    }

    #[test]
    fn test_collapsed_toggle_sets_typing_marks() {
        let mut s = surface("<p>ab</p>");
        s.set_caret(Caret::new(0, 2));
        s.apply_format(FormatCommand::Underline);
        assert!(s.query_format_state().underline);
        assert_eq!(s.markup(), "<p>ab</p>");

        s.replace_block_text(0, "abc", 3);
        assert_eq!(s.markup(), "<p>ab<u>c</u></p>");
        assert!(s.query_format_state().underline);
    }

    #[test]
    fn test_replace_block_text_keeps_styling() {
        let mut s = surface("<p><b>ab</b>cd</p>");
        s.set_caret(Caret::new(0, 3));
        s.replace_block_text(0, "abcXd", 4);
        assert_eq!(s.markup(), "<p><b>ab</b>cXd</p>");

        s.replace_block_text(0, "abXd", 2);
        assert_eq!(s.markup(), "<p><b>ab</b>Xd</p>");
        assert_eq!(s.caret(), Some(Caret::new(0, 2)));

        // Typing right after bold text continues it
        s.replace_block_text(0, "abYXd", 3);
        assert_eq!(s.markup(), "<p><b>abY</b>Xd</p>");
    }

    #[test]
    fn test_list_toggle() {
        let mut s = surface("<p>a</p><p>b</p>");
        s.select(Caret::new(0, 0), Caret::new(1, 1));
        s.apply_format(FormatCommand::UnorderedList);
        assert_eq!(s.markup(), "<ul><li>a</li><li>b</li></ul>");
        assert!(s.query_format_state().unordered_list);

        s.apply_format(FormatCommand::UnorderedList);
        assert_eq!(s.markup(), "<p>a</p><p>b</p>");
    }

    #[test]
    fn test_block_style_sets_heading() {
        let mut s = surface("<p>a</p>");
        s.set_caret(Caret::new(0, 0));
        s.apply_format(FormatCommand::Block(BlockStyle::Heading(2)));
        assert_eq!(s.markup(), "<h2>a</h2>");
        s.apply_format(FormatCommand::Block(BlockStyle::Heading(1)));
        assert!(s.query_format_state().heading1);
        s.apply_format(FormatCommand::Block(BlockStyle::Paragraph));
        assert_eq!(s.markup(), "<p>a</p>");
    }

    #[test]
    fn test_insert_markup_splits_at_caret() {
        let mut s = surface("<p>başson</p>");
        s.set_caret(Caret::new(0, 3));
        s.insert_markup("<p>orta</p>");
        assert_eq!(s.markup(), "<p>baş</p><p>orta</p><p>son</p>");
        assert_eq!(s.caret(), Some(Caret::new(1, 4)));
    }

    #[test]
    fn test_insert_markup_replaces_empty_block() {
        let mut s = surface("<p>a</p><p><br></p>");
        s.set_caret(Caret::new(1, 0));
        s.insert_markup(r#"<img src="x.png" alt="Yüklenen Görsel"><div><br></div>"#);
        assert_eq!(
            s.markup(),
            r#"<p>a</p><img src="x.png" alt="Yüklenen Görsel"><p><br></p>"#
        );
        assert_eq!(s.caret(), Some(Caret::new(2, 0)));
    }

    #[test]
    fn test_insert_without_cursor_appends() {
        let mut s = surface("<p>a</p>");
        s.insert_markup("<p>b</p>");
        assert_eq!(s.markup(), "<p>a</p><p>b</p>");
        assert!(!s.has_cursor());
    }

    #[test]
    fn test_insert_replaces_selection() {
        let mut s = surface("<p>abcd</p>");
        s.select(Caret::new(0, 1), Caret::new(0, 3));
        s.insert_markup("<p>X</p>");
        assert_eq!(s.markup(), "<p>a</p><p>X</p><p>d</p>");
    }

    #[test]
    fn test_split_and_merge() {
        let mut s = surface("<h1>abcd</h1>");
        s.set_caret(Caret::new(0, 2));
        s.split_block();
        assert_eq!(s.markup(), "<h1>ab</h1><p>cd</p>");
        assert_eq!(s.caret(), Some(Caret::new(1, 0)));

        assert!(s.merge_backward());
        assert_eq!(s.markup(), "<h1>abcd</h1>");
        assert_eq!(s.caret(), Some(Caret::new(0, 2)));
    }

    #[test]
    fn test_enter_on_empty_list_item_leaves_list() {
        let mut s = surface("<ul><li>a</li><li></li></ul>");
        s.set_caret(Caret::new(1, 0));
        s.split_block();
        assert_eq!(s.markup(), "<ul><li>a</li></ul><p><br></p>");
    }

    #[test]
    fn test_backspace_unlists_before_merging() {
        let mut s = surface("<p>a</p><ul><li>b</li></ul>");
        s.set_caret(Caret::new(1, 0));
        assert!(s.merge_backward());
        assert_eq!(s.markup(), "<p>a</p><p>b</p>");
        assert!(s.merge_backward());
        assert_eq!(s.markup(), "<p>ab</p>");
        s.set_caret(Caret::new(0, 0));
        assert!(!s.merge_backward());
    }

    #[test]
    fn test_backspace_on_image_removes_that_image() {
        let mut s = surface(r#"<p>a</p><img src="one.png" alt=""><img src="two.png" alt=""><p>b</p>"#);
        s.set_caret(Caret::new(2, 0));
        assert!(s.merge_backward());
        assert_eq!(s.markup(), r#"<p>a</p><img src="one.png" alt=""><p>b</p>"#);
        assert_eq!(s.caret(), Some(Caret::new(1, 0)));
    }

    #[test]
    fn test_backspace_on_leading_image() {
        let mut s = surface(r#"<img src="one.png" alt=""><p>b</p>"#);
        s.set_caret(Caret::new(0, 0));
        assert!(s.merge_backward());
        assert_eq!(s.markup(), "<p>b</p>");
        assert_eq!(s.caret(), Some(Caret::new(0, 0)));

        // The only block gives way to an empty paragraph
        let mut s = surface(r#"<img src="one.png" alt="">"#);
        s.set_caret(Caret::new(0, 0));
        assert!(s.merge_backward());
        assert_eq!(s.markup(), "<p><br></p>");
    }

    #[test]
    fn test_backspace_after_image_removes_it() {
        let mut s = surface(r#"<p>a</p><img src="one.png" alt=""><p>b</p>"#);
        s.set_caret(Caret::new(2, 0));
        assert!(s.merge_backward());
        assert_eq!(s.markup(), "<p>a</p><p>b</p>");
        assert_eq!(s.caret(), Some(Caret::new(1, 0)));
    }

    #[test]
    fn test_delete_across_blocks() {
        let mut s = surface("<p>abc</p><p>def</p><p>ghi</p>");
        s.select(Caret::new(0, 1), Caret::new(2, 2));
        assert!(s.delete_selection());
        assert_eq!(s.markup(), "<p>ai</p>");
        assert_eq!(s.caret(), Some(Caret::new(0, 1)));
    }

    #[test]
    fn test_load_empty_markup_keeps_one_block() {
        let s = surface("");
        assert_eq!(s.blocks().len(), 1);
        assert_eq!(s.end(), Caret::new(0, 0));
    }
}
