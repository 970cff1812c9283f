//! Preferences screen

use eframe::egui::{self, RichText};

use crate::app::{DocflowApp, Route};
use crate::core::markup::BlockKind;
use crate::core::preferences::{FontFamily, Preferences, Theme, FONT_SIZE_RANGE};
use crate::ui::blocks::EditorFont;

/// Preferences being edited; only the theme applies before saving
#[derive(Debug, Clone, Copy)]
pub struct SettingsState {
    pub draft: Preferences,
}

impl SettingsState {
    pub fn new(current: Preferences) -> Self {
        Self { draft: current }
    }
}

pub struct SettingsPanel;

impl SettingsPanel {
    pub fn show(ctx: &egui::Context, app: &mut DocflowApp) {
        egui::TopBottomPanel::top("settings_header").show(ctx, |ui| {
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("←").on_hover_text("Geri").clicked() {
                    app.request_route(Route::Dashboard);
                }
                ui.heading(RichText::new("Ayarlar").strong());
            });
            ui.add_space(8.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .id_salt("settings_scroll")
                .show(ui, |ui| {
                    ui.set_max_width(640.0);
                    ui.label(
                        RichText::new(
                            "Görünümü, yazı tiplerini ve çalışma tercihlerinizi buradan yönetebilirsiniz.",
                        )
                        .weak(),
                    );
                    ui.add_space(16.0);

                    if let Some(theme) = Self::show_theme(ui, app.settings.draft.theme) {
                        Self::change_theme(ctx, app, theme);
                    }
                    ui.add_space(16.0);
                    Self::show_editor_section(ui, &mut app.settings.draft);
                    ui.add_space(16.0);

                    ui.label(RichText::new("GENEL").small().strong().weak());
                    egui::Frame::group(ui.style()).show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        ui.checkbox(&mut app.settings.draft.auto_save, "Otomatik Kaydet");
                        ui.label(
                            RichText::new("Açık belgelerdeki değişiklikler düzenli aralıklarla kaydedilir.")
                                .weak()
                                .small(),
                        );
                    });

                    ui.add_space(24.0);
                    let save = egui::Button::new(RichText::new("Ayarları Kaydet").strong())
                        .min_size(egui::vec2(ui.available_width(), 40.0));
                    if ui.add(save).clicked() {
                        Self::save(app);
                    }
                });
        });
    }

    fn show_theme(ui: &mut egui::Ui, current: Theme) -> Option<Theme> {
        let mut chosen = None;
        ui.label(RichText::new("GÖRÜNÜM").small().strong().weak());
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new("Tema Seçimi").strong());
            ui.horizontal(|ui| {
                for theme in Theme::ALL {
                    let icon = match theme {
                        Theme::Light => "☀",
                        Theme::Dark => "🌙",
                        Theme::System => "🖥",
                    };
                    let text = RichText::new(format!("{icon} {}", theme.label())).strong();
                    if ui.selectable_label(current == theme, text).clicked() && current != theme {
                        chosen = Some(theme);
                    }
                }
            });
        });
        chosen
    }

    fn show_editor_section(ui: &mut egui::Ui, draft: &mut Preferences) {
        ui.label(RichText::new("EDİTÖR").small().strong().weak());
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_width(ui.available_width());

            ui.label(RichText::new("Yazı Tipi").strong());
            egui::ComboBox::from_id_salt("font_family")
                .selected_text(draft.font_family.label())
                .show_ui(ui, |ui| {
                    for family in FontFamily::ALL {
                        ui.selectable_value(&mut draft.font_family, family, family.label());
                    }
                });

            ui.separator();
            ui.label(RichText::new("Yazı Boyutu").strong());
            ui.add(egui::Slider::new(&mut draft.font_size, FONT_SIZE_RANGE).suffix(" px"));

            let font = EditorFont::from_preferences(draft);
            ui.label(
                RichText::new("Örnek metin: Hızlı kahverengi tilki")
                    .font(font.font_id(&BlockKind::Paragraph)),
            );
        });
    }

    /// The theme applies and persists immediately
    fn change_theme(ctx: &egui::Context, app: &mut DocflowApp, theme: Theme) {
        app.settings.draft.theme = theme;
        app.preferences.theme = theme;
        if let Err(e) = app.preferences.save_theme(&mut *app.prefs_storage) {
            tracing::error!("Failed to save theme: {}", e);
            app.toasts.error("Tema kaydedilemedi.");
        }
        app.apply_theme(ctx);
    }

    fn save(app: &mut DocflowApp) {
        let draft = app.settings.draft;
        match draft.save(&mut *app.prefs_storage) {
            Ok(()) => {
                app.preferences = draft;
                app.request_route(Route::Dashboard);
            }
            Err(e) => {
                tracing::error!("Failed to save preferences: {}", e);
                app.toasts.error("Ayarlar kaydedilemedi.");
            }
        }
    }
}
