//! Rich-text editor screen
//!
//! The block holding the caret is an editable `TextEdit`; every other block
//! is rendered. Typing is spliced into the block model, Enter splits the
//! block and Backspace at the start of a block merges it backward, so the
//! surface stays the single source of truth for content and selection.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use eframe::egui::{
    self,
    text::{CCursor, CCursorRange},
    Color32, FontId, Key, Modifiers, RichText,
};

use super::blocks::{block_marks, encode_data_url, render_block, styled_job, EditorFont, ImageCache};
use super::dialogs::{ExportDialog, ExportDialogAction, GenerateDialog};
use super::toast::Toasts;
use crate::app::{DocflowApp, Route};
use crate::core::error::TaskError;
use crate::core::markup::{Block, BlockKind};
use crate::core::session::{DocumentRoute, EditorSession, Redirect, SessionState};
use crate::core::store::DocumentStore;
use crate::core::surface::{BlockStyle, Caret, FormatCommand, Selection};
use crate::core::toolbar::SurfaceEvent;

const TASK_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Editor state for one open document
pub struct EditorScreen {
    pub session: EditorSession,
    pub generate: GenerateDialog,
    pub export: ExportDialog,
    images: ImageCache,
    /// Push the model selection into the active `TextEdit` and focus it
    focus_pending: bool,
}

impl EditorScreen {
    pub fn new(session: EditorSession) -> Self {
        Self {
            session,
            generate: GenerateDialog::default(),
            export: ExportDialog::default(),
            images: ImageCache::default(),
            focus_pending: false,
        }
    }

    /// Cancel anything still running for this document
    pub fn close(&mut self) {
        self.generate.close();
        self.export.close();
    }

    /// Apply finished generation and export results
    fn poll_tasks(&mut self, toasts: &mut Toasts) {
        if let Some(result) = self.generate.poll() {
            match result {
                Ok(text) => {
                    let notice = self.session.insert_generated_text(&text);
                    toasts.info(notice);
                }
                Err(TaskError::Cancelled) => {}
                Err(e) => {
                    tracing::warn!("Text generation failed: {}", e);
                    toasts.error("İçerik oluşturulamadı.");
                }
            }
        }

        if let Some(result) = self.export.poll() {
            match result {
                Ok(receipt) => {
                    tracing::info!(
                        "Exported {} ({} bytes) as {}",
                        receipt.file_name,
                        receipt.bytes,
                        receipt.format.label()
                    );
                    toasts.info(receipt.message);
                }
                Err(TaskError::Cancelled) => {}
                Err(e) => {
                    tracing::warn!("Export failed: {}", e);
                    toasts.error("Dışa aktarma başarısız oldu.");
                }
            }
        }
    }

    fn is_busy(&self) -> bool {
        self.generate.is_busy() || self.export.is_busy()
    }

    /// Save the session. The first save of a new document re-addresses
    /// the route at its permanent id.
    fn save(&mut self, store: &mut DocumentStore, toasts: &mut Toasts, route: &mut Route, announce: bool) {
        match self.session.save(store) {
            Ok(outcome) => {
                if let Some(Redirect::ToDocument(id)) = outcome.redirect {
                    *route = Route::Editor(DocumentRoute::Existing(id));
                }
                if announce {
                    toasts.info(outcome.notice);
                }
            }
            Err(e) => {
                tracing::error!("Failed to save document: {}", e);
                toasts.error(e.user_message());
            }
        }
    }

    fn insert_image_from(&mut self, path: &Path, toasts: &mut Toasts) {
        match load_image(path) {
            Ok(url) => {
                self.session.insert_image(&url);
                self.focus_pending = true;
            }
            Err(e) => {
                tracing::warn!("Failed to insert image: {:#}", e);
                toasts.error("Görsel yüklenemedi.");
            }
        }
    }
}

/// Read an image file into a data URL
fn load_image(path: &Path) -> Result<String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read image: {}", path.display()))?;
    encode_data_url(&bytes, ext)
        .ok_or_else(|| anyhow::anyhow!("Unsupported image type: {}", path.display()))
}

fn key_released(input: &egui::InputState) -> bool {
    input
        .events
        .iter()
        .any(|e| matches!(e, egui::Event::Key { pressed: false, .. }))
}

/// Editor toolbar buttons in display order
fn toolbar_buttons() -> [(FormatCommand, RichText, &'static str); 6] {
    [
        (FormatCommand::Bold, RichText::new("B").strong(), "Kalın"),
        (FormatCommand::Italic, RichText::new("I").italics(), "İtalik"),
        (FormatCommand::Underline, RichText::new("U").underline(), "Altı çizili"),
        (
            FormatCommand::Block(BlockStyle::Heading(1)),
            RichText::new("H1").strong(),
            "Başlık 1",
        ),
        (
            FormatCommand::Block(BlockStyle::Heading(2)),
            RichText::new("H2").strong(),
            "Başlık 2",
        ),
        (FormatCommand::UnorderedList, RichText::new("☰"), "Madde işaretli liste"),
    ]
}

/// Header actions collected during the frame
#[derive(Default)]
struct HeaderActions {
    back: bool,
    save: bool,
}

pub struct EditorPanel;

impl EditorPanel {
    pub fn show(ctx: &egui::Context, app: &mut DocflowApp) {
        let DocflowApp {
            editor,
            store,
            toasts,
            runner,
            generator,
            exporter,
            preferences,
            config,
            route,
            pending_route,
            ..
        } = app;

        let Some(screen) = editor.as_mut() else {
            *pending_route = Some(Route::Dashboard);
            return;
        };

        screen.poll_tasks(toasts);
        if screen.is_busy() {
            ctx.request_repaint_after(TASK_POLL_INTERVAL);
        }

        let mut actions = HeaderActions::default();

        // Handle keyboard shortcuts
        ctx.input(|i| {
            if i.modifiers.ctrl && i.key_pressed(Key::S) {
                actions.save = true;
            }
        });

        if preferences.auto_save {
            let interval = config.editor.auto_save_interval();
            if screen.session.auto_save_due(Instant::now(), interval) {
                tracing::debug!("Auto-saving document {}", screen.session.id());
                screen.save(store, toasts, route, false);
            } else if screen.session.is_dirty() {
                ctx.request_repaint_after(interval);
            }
        }

        egui::TopBottomPanel::top("editor_header").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                if ui.button("←").on_hover_text("Geri").clicked() {
                    actions.back = true;
                }
                let marker = if screen.session.is_dirty() { " •" } else { "" };
                ui.label(
                    RichText::new(format!("{}{}", screen.session.display_title(), marker)).strong(),
                );
                if screen.session.state() == SessionState::Saved {
                    ui.label(RichText::new("Kaydedildi").weak().small());
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("💾 Kaydet").clicked() {
                        actions.save = true;
                    }
                    if ui.button("📤 Dışa Aktar").clicked() {
                        screen.export.open();
                    }
                    if ui.button("✨ AI").on_hover_text("AI Asistanına Sor").clicked() {
                        screen.generate.open();
                    }
                });
            });
            ui.add_space(6.0);
        });

        egui::TopBottomPanel::top("editor_toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                Self::show_toolbar(ui, screen, toasts);
            });
        });

        let font = EditorFont::from_preferences(preferences);
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .id_salt("editor_scroll")
                .show(ui, |ui| {
                    ui.set_min_width(ui.available_width());

                    let mut title = screen.session.title().to_string();
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut title)
                            .hint_text("Başlık Girin")
                            .font(FontId::proportional(font.size + 14.0))
                            .frame(false)
                            .desired_width(f32::INFINITY),
                    );
                    if response.changed() {
                        screen.session.set_title(title);
                    }
                    ui.separator();

                    Self::show_blocks(ui, screen, &font);
                });
        });

        screen.generate.show(ctx, runner, generator);
        if let Some(ExportDialogAction::Start) = screen.export.show(ctx) {
            let source = screen.session.export_source();
            screen.export.start(runner, exporter.clone(), source);
        }

        if actions.save {
            screen.save(store, toasts, route, true);
        }
        if actions.back {
            *pending_route = Some(Route::Dashboard);
        }
    }

    fn show_toolbar(ui: &mut egui::Ui, screen: &mut EditorScreen, toasts: &mut Toasts) {
        let flags = screen.session.format_state();

        for (command, text, hint) in toolbar_buttons() {
            let active = flags.is_active(command);
            if ui.selectable_label(active, text).on_hover_text(hint).clicked() {
                // Headings toggle back to a paragraph
                let command = match command {
                    FormatCommand::Block(BlockStyle::Heading(_)) if active => {
                        FormatCommand::Block(BlockStyle::Paragraph)
                    }
                    other => other,
                };
                screen.session.apply_format(command);
                screen.focus_pending = true;
            }
        }

        ui.separator();
        if ui.button("🖼").on_hover_text("Görsel ekle").clicked() {
            let picked = rfd::FileDialog::new()
                .add_filter("Görsel", &["png", "jpg", "jpeg", "gif", "webp", "bmp"])
                .pick_file();
            if let Some(path) = picked {
                screen.insert_image_from(&path, toasts);
            }
        }
    }

    fn show_blocks(ui: &mut egui::Ui, screen: &mut EditorScreen, font: &EditorFont) {
        let active = screen.session.surface().caret().map(|c| c.block);
        let block_count = screen.session.surface().blocks().len();
        let mut clicked = None;
        let mut ordinal = 0;

        for idx in 0..block_count {
            let Some(block) = screen.session.surface().blocks().get(idx).cloned() else {
                break;
            };
            ordinal = match block.kind {
                BlockKind::ListItem { ordered: true } => ordinal + 1,
                _ => 0,
            };

            let mut restructured = false;
            ui.push_id(idx, |ui| {
                if active == Some(idx) && block.is_text() {
                    restructured = Self::show_active_block(ui, screen, idx, &block, font, ordinal);
                    return;
                }

                let inner = egui::Frame::new()
                    .inner_margin(egui::Margin::symmetric(4, 2))
                    .show(ui, |ui| {
                        render_block(ui, &block, ordinal, font, &mut screen.images);
                    });
                let rect = inner.response.rect;
                let response = ui.interact(rect, ui.id().with("block"), egui::Sense::click());

                if active == Some(idx) {
                    // Selected image
                    ui.painter().rect_stroke(
                        rect,
                        egui::CornerRadius::same(4),
                        egui::Stroke::new(2.0, Color32::from_rgb(37, 99, 235)),
                        egui::StrokeKind::Outside,
                    );
                    restructured = Self::handle_image_keys(ui, screen);
                } else if response.hovered() {
                    ui.painter().rect_stroke(
                        rect,
                        egui::CornerRadius::same(4),
                        egui::Stroke::new(1.0, Color32::from_rgba_unmultiplied(100, 100, 100, 50)),
                        egui::StrokeKind::Outside,
                    );
                }

                if response.clicked() {
                    clicked = Some(Caret::new(idx, block.len()));
                }
            });

            // The block list changed under us; draw the rest next frame
            if restructured {
                ui.ctx().request_repaint();
                break;
            }
        }

        // Space below the content puts the caret at the end
        let (rect, response) = ui.allocate_exact_size(
            egui::vec2(ui.available_width(), ui.available_height().max(80.0)),
            egui::Sense::click(),
        );
        if response.clicked() {
            clicked = Some(screen.session.surface().end());
        }
        if response.hovered() {
            ui.painter().rect_stroke(
                rect,
                egui::CornerRadius::same(4),
                egui::Stroke::new(1.0, Color32::from_rgba_unmultiplied(100, 100, 100, 30)),
                egui::StrokeKind::Outside,
            );
        }

        if let Some(at) = clicked {
            screen
                .session
                .navigate(SurfaceEvent::Click, |surface| surface.set_caret(at));
            screen.focus_pending = true;
        }
    }

    /// Edit the block under the caret. Returns true when the block list was
    /// restructured (split or merge).
    fn show_active_block(
        ui: &mut egui::Ui,
        screen: &mut EditorScreen,
        idx: usize,
        block: &Block,
        font: &EditorFont,
        ordinal: usize,
    ) -> bool {
        let id = ui.id().with("active_block");
        let selection = screen.session.surface().selection();

        if ui.memory(|m| m.has_focus(id)) {
            let at_start = selection.is_some_and(|s| s.is_collapsed() && s.head.offset == 0);
            let (enter, backspace) = ui.input_mut(|i| {
                let enter = i.consume_key(Modifiers::NONE, Key::Enter);
                let backspace = at_start && i.consume_key(Modifiers::NONE, Key::Backspace);
                (enter, backspace)
            });

            if enter {
                screen.session.edit(|surface| surface.split_block());
                screen.focus_pending = true;
                return true;
            }
            if backspace && screen.session.edit(|surface| surface.merge_backward()) {
                screen.focus_pending = true;
                return true;
            }
        }

        if screen.focus_pending {
            let mut state = egui::text_edit::TextEditState::load(ui.ctx(), id).unwrap_or_default();
            if let Some(sel) = selection.filter(|s| s.anchor.block == idx && s.head.block == idx) {
                state.cursor.set_char_range(Some(CCursorRange::two(
                    CCursor::new(sel.anchor.offset),
                    CCursor::new(sel.head.offset),
                )));
            }
            state.store(ui.ctx(), id);
        }

        let marks = block_marks(block);
        let font_id = font.font_id(&block.kind);
        let heading = matches!(block.kind, BlockKind::Heading(_));
        let mut layouter = |ui: &egui::Ui, text: &dyn egui::TextBuffer, wrap_width: f32| {
            let job = styled_job(ui, text.as_str(), &marks, &font_id, heading, wrap_width);
            ui.fonts(|f| f.layout_job(job))
        };

        let mut text = block.text();
        let output = ui
            .horizontal(|ui| {
                if let BlockKind::ListItem { ordered } = block.kind {
                    ui.add_space(16.0);
                    let marker = if ordered {
                        format!("{ordinal}.")
                    } else {
                        "•".to_string()
                    };
                    ui.label(RichText::new(marker).font(font_id.clone()).weak());
                }
                egui::TextEdit::multiline(&mut text)
                    .id(id)
                    .frame(false)
                    .desired_rows(1)
                    .desired_width(f32::INFINITY)
                    .layouter(&mut layouter)
                    .show(ui)
            })
            .inner;

        if screen.focus_pending {
            output.response.request_focus();
            screen.focus_pending = false;
        }

        let cursor = output.cursor_range;
        if output.response.changed() {
            let caret = cursor.map_or_else(|| text.chars().count(), |c| c.primary.index);
            screen
                .session
                .edit(|surface| surface.replace_block_text(idx, &text, caret));
        } else if let Some(range) = cursor.filter(|_| output.response.has_focus()) {
            let anchor = Caret::new(idx, range.secondary.index);
            let head = Caret::new(idx, range.primary.index);
            if selection != Some(Selection { anchor, head }) {
                screen.session.navigate(SurfaceEvent::SelectionChange, |surface| {
                    if anchor == head {
                        surface.set_caret(head);
                    } else {
                        surface.select(anchor, head);
                    }
                });
            }
        }

        // Toolbar re-reads after focus, pointer release and key release
        let response = &output.response;
        if response.gained_focus() {
            screen.session.navigate(SurfaceEvent::Focus, |_| ());
        } else if response.hovered() && ui.input(|i| i.pointer.any_released()) {
            screen.session.navigate(SurfaceEvent::PointerUp, |_| ());
        } else if response.has_focus() && ui.input(key_released) {
            screen.session.navigate(SurfaceEvent::KeyUp, |_| ());
        }

        false
    }

    /// Enter adds a paragraph after a selected image; Backspace removes it
    fn handle_image_keys(ui: &mut egui::Ui, screen: &mut EditorScreen) -> bool {
        if ui.memory(|m| m.focused().is_some()) {
            return false;
        }
        let (enter, delete) = ui.input_mut(|i| {
            let enter = i.consume_key(Modifiers::NONE, Key::Enter);
            let delete = i.consume_key(Modifiers::NONE, Key::Backspace)
                || i.consume_key(Modifiers::NONE, Key::Delete);
            (enter, delete)
        });

        if enter {
            screen.session.edit(|surface| surface.split_block());
            screen.focus_pending = true;
            return true;
        }
        if delete && screen.session.edit(|surface| surface.merge_backward()) {
            screen.focus_pending = true;
            return true;
        }
        false
    }
}
