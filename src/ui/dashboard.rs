//! Document list with search and category filters

use eframe::egui::{self, Color32, RichText};

use crate::app::{DocflowApp, Route};
use crate::core::document::{Document, DocumentKind};
use crate::core::filter::{filter_documents, FilterCategory};
use crate::core::session::DocumentRoute;

const CARD_WIDTH: f32 = 220.0;
const THUMBNAIL_HEIGHT: f32 = 120.0;

/// Dashboard state kept between frames
#[derive(Debug, Default)]
pub struct DashboardState {
    /// Collection as loaded when the dashboard was entered
    pub documents: Vec<Document>,
    pub search: String,
    pub category: FilterCategory,
}

/// Glyph standing in for a document without a thumbnail
fn kind_icon(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Doc => "📄",
        DocumentKind::Sheet => "📊",
        DocumentKind::Slide => "📽",
        DocumentKind::Pdf => "📕",
        DocumentKind::Folder => "📁",
    }
}

pub struct DashboardPanel;

impl DashboardPanel {
    pub fn show(ctx: &egui::Context, app: &mut DocflowApp) {
        egui::TopBottomPanel::top("dashboard_header").show(ctx, |ui| {
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.label(RichText::new("Tekrar Hoş Geldin,").weak());
                    ui.heading(RichText::new("Belgelerim").strong());
                });
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("⚙ Ayarlar").clicked() {
                        app.request_route(Route::Settings);
                    }
                });
            });
            ui.add_space(8.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            Self::show_search(ui, &mut app.dashboard);
            ui.add_space(8.0);
            Self::show_categories(ui, &mut app.dashboard);
            ui.add_space(12.0);
            ui.label(RichText::new("Son Belgeler").strong().size(18.0));
            ui.add_space(8.0);

            let state = &app.dashboard;
            let visible = filter_documents(&state.documents, &state.search, state.category);
            let mut opened = None;

            egui::ScrollArea::vertical()
                .id_salt("dashboard_scroll")
                .show(ui, |ui| {
                    if visible.is_empty() {
                        ui.vertical_centered(|ui| {
                            ui.add_space(40.0);
                            ui.label(RichText::new("🙁").size(40.0));
                            ui.label(RichText::new("Belge bulunamadı.").weak());
                        });
                        return;
                    }

                    ui.horizontal_wrapped(|ui| {
                        ui.spacing_mut().item_spacing = egui::vec2(16.0, 16.0);
                        for doc in &visible {
                            if Self::show_card(ui, doc).clicked() {
                                opened = Some(doc.id.clone());
                            }
                        }
                    });
                });

            if let Some(id) = opened {
                app.request_route(Route::Editor(DocumentRoute::Existing(id)));
            }

            // New document button pinned to the bottom right
            let rect = ui.max_rect();
            let button_rect = egui::Rect::from_min_size(
                rect.right_bottom() - egui::vec2(160.0, 56.0),
                egui::vec2(148.0, 44.0),
            );
            let new_button = egui::Button::new(RichText::new("＋ Yeni Belge").strong().size(16.0))
                .fill(Color32::from_rgb(37, 99, 235))
                .corner_radius(egui::CornerRadius::same(22));
            if ui.put(button_rect, new_button).clicked() {
                app.request_route(Route::Editor(DocumentRoute::New));
            }
        });
    }

    fn show_search(ui: &mut egui::Ui, state: &mut DashboardState) {
        ui.horizontal(|ui| {
            ui.label("🔍");
            ui.add(
                egui::TextEdit::singleline(&mut state.search)
                    .hint_text("Belgelerinizi Arayın...")
                    .desired_width(ui.available_width() - 40.0),
            );
            if !state.search.is_empty() && ui.small_button("✕").clicked() {
                state.search.clear();
            }
        });
    }

    fn show_categories(ui: &mut egui::Ui, state: &mut DashboardState) {
        ui.horizontal(|ui| {
            for category in FilterCategory::ALL {
                let text = RichText::new(category.label()).strong();
                if ui.selectable_label(state.category == category, text).clicked() {
                    state.category = category;
                }
            }
        });
    }

    fn show_card(ui: &mut egui::Ui, doc: &Document) -> egui::Response {
        let inner = egui::Frame::group(ui.style())
            .corner_radius(egui::CornerRadius::same(12))
            .inner_margin(egui::Margin::same(10))
            .show(ui, |ui| {
                ui.set_width(CARD_WIDTH);
                ui.vertical(|ui| {
                    let size = egui::vec2(CARD_WIDTH, THUMBNAIL_HEIGHT);
                    match &doc.thumbnail {
                        Some(url) => {
                            ui.add(
                                egui::Image::from_uri(url.clone())
                                    .fit_to_exact_size(size)
                                    .corner_radius(egui::CornerRadius::same(8)),
                            );
                        }
                        None => {
                            ui.allocate_ui(size, |ui| {
                                ui.centered_and_justified(|ui| {
                                    ui.label(RichText::new(kind_icon(doc.kind)).size(48.0));
                                });
                            });
                        }
                    }

                    ui.add_space(6.0);
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(kind_icon(doc.kind)).size(14.0));
                        ui.add(
                            egui::Label::new(RichText::new(doc.display_title()).strong())
                                .truncate()
                                .selectable(false),
                        );
                    });
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(doc.modified_label()).weak().small());
                        if doc.is_shared() {
                            ui.label(RichText::new("👥 Paylaşılan").weak().small());
                        }
                    });
                });
            });

        ui.interact(
            inner.response.rect,
            ui.id().with(("document_card", &doc.id)),
            egui::Sense::click(),
        )
        .on_hover_cursor(egui::CursorIcon::PointingHand)
    }
}

