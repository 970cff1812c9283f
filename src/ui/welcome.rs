//! First screen shown on launch

use eframe::egui::{self, RichText};

use crate::app::{DocflowApp, Route};
use crate::core::session::DocumentRoute;

pub struct WelcomePanel;

impl WelcomePanel {
    pub fn show(ctx: &egui::Context, app: &mut DocflowApp) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(60.0);
                ui.label(RichText::new("📄").size(48.0));
                ui.add_space(12.0);
                ui.heading(RichText::new("Uygulamaya Hoş Geldiniz").size(32.0).strong());
                ui.add_space(8.0);
                ui.label(
                    "Modern ve güçlü araçlarla belgelerinizi yönetmeye, düzenlemeye ve paylaşmaya hemen başlayın.",
                );
                ui.add_space(24.0);

                ui.set_max_width(420.0);
                if Self::feature_card(
                    ui,
                    "📝",
                    "Yeni Bir Belge Oluşturun",
                    "Temiz bir sayfada düşüncelerinizi özgürce yazmaya başlayın.",
                )
                .clicked()
                {
                    app.request_route(Route::Editor(DocumentRoute::New));
                }
                Self::feature_card(
                    ui,
                    "✨",
                    "AI Destekli Özetler Alın",
                    "Yapay zeka asistanı ile uzun metinleri saniyeler içinde özetleyin.",
                );
                Self::feature_card(
                    ui,
                    "📤",
                    "Belgelerinizi Dışa Aktarın",
                    "Belgelerinizi PDF, DOCX veya HTML olarak paylaşın.",
                );

                ui.add_space(24.0);
                let start = egui::Button::new(RichText::new("Hemen Başlayın  →").size(18.0).strong())
                    .min_size(egui::vec2(240.0, 44.0));
                if ui.add(start).clicked() {
                    app.request_route(Route::Dashboard);
                }
            });
        });
    }

    fn feature_card(ui: &mut egui::Ui, icon: &str, title: &str, body: &str) -> egui::Response {
        let inner = egui::Frame::group(ui.style())
            .corner_radius(egui::CornerRadius::same(12))
            .inner_margin(egui::Margin::same(12))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.horizontal(|ui| {
                    ui.label(RichText::new(icon).size(24.0));
                    ui.vertical(|ui| {
                        ui.label(RichText::new(title).strong().size(16.0));
                        ui.label(RichText::new(body).weak());
                    });
                });
            });
        ui.add_space(8.0);
        ui.interact(inner.response.rect, ui.id().with(title), egui::Sense::click())
    }
}
