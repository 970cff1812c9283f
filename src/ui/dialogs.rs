//! Generation and export dialogs
//!
//! Both dialogs run their work through the task runner and are polled by
//! the editor every frame. Closing a dialog cancels its pending task.

use std::sync::Arc;

use eframe::egui::{self, Button, RichText};

use crate::core::assist::{submit_generation, GenerationRequest, QuickCommand, TextGenerator};
use crate::core::error::TaskError;
use crate::core::export::{submit_export, ExportFormat, ExportReceipt, ExportRequest, ExportSource, Exporter};
use crate::core::tasks::{TaskHandle, TaskRunner};

/// Prompt dialog for the text generator
#[derive(Debug, Default)]
pub struct GenerateDialog {
    pub visible: bool,
    pub prompt: String,
    task: Option<TaskHandle<String>>,
}

impl GenerateDialog {
    pub fn open(&mut self) {
        self.visible = true;
    }

    pub fn is_busy(&self) -> bool {
        self.task.is_some()
    }

    /// Close the dialog, cancelling a running generation
    pub fn close(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel();
        }
        self.visible = false;
        self.prompt.clear();
    }

    /// Start generating from the current prompt; blank prompts are ignored
    pub fn start(&mut self, runner: &TaskRunner, generator: Arc<dyn TextGenerator>) -> bool {
        if self.is_busy() {
            return false;
        }
        match GenerationRequest::new(self.prompt.clone()) {
            Some(request) => {
                self.task = Some(submit_generation(runner, generator, request));
                true
            }
            None => false,
        }
    }

    /// Finished generation, if any. Success closes the dialog.
    pub fn poll(&mut self) -> Option<Result<String, TaskError>> {
        let result = self.task.as_mut()?.try_take()?;
        self.task = None;
        if result.is_ok() {
            self.close();
        }
        Some(result)
    }

    pub fn show(&mut self, ctx: &egui::Context, runner: &TaskRunner, generator: &Arc<dyn TextGenerator>) {
        if !self.visible {
            return;
        }

        let busy = self.is_busy();
        let mut close = false;
        let mut start = false;

        egui::Window::new("AI Asistanına Sor")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(
                    "İçerik oluşturmak, metinleri özetlemek veya düzenlemek için yapay zekadan yardım alın.",
                );
                ui.add_space(8.0);
                ui.add_enabled(
                    !busy,
                    egui::TextEdit::multiline(&mut self.prompt)
                        .hint_text("Metninizi buraya girin veya ne yapmak istediğinizi yazın...")
                        .desired_rows(4)
                        .desired_width(f32::INFINITY),
                );

                ui.add_space(8.0);
                ui.label(RichText::new("Hızlı Komutlar").small().strong());
                ui.horizontal_wrapped(|ui| {
                    for command in QuickCommand::ALL {
                        if ui.add_enabled(!busy, Button::new(command.label())).clicked() {
                            self.prompt = command.prompt().to_string();
                        }
                    }
                });

                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("İptal").clicked() {
                        close = true;
                    }
                    let ready = !busy && GenerationRequest::new(self.prompt.as_str()).is_some();
                    let label = if busy { "Oluşturuluyor..." } else { "Oluştur" };
                    if ui.add_enabled(ready, Button::new(label)).clicked() {
                        start = true;
                    }
                    if busy {
                        ui.spinner();
                    }
                });
            });

        if close {
            self.close();
        } else if start {
            self.start(runner, generator.clone());
        }
    }
}

/// Format picker for the exporter
#[derive(Debug, Default)]
pub struct ExportDialog {
    pub visible: bool,
    pub format: ExportFormat,
    task: Option<TaskHandle<ExportReceipt>>,
}

/// What the export dialog asks of its host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportDialogAction {
    /// Export the document in the selected format
    Start,
}

impl ExportDialog {
    pub fn open(&mut self) {
        self.visible = true;
    }

    pub fn is_busy(&self) -> bool {
        self.task.is_some()
    }

    pub fn close(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel();
        }
        self.visible = false;
    }

    pub fn start(&mut self, runner: &TaskRunner, exporter: Arc<dyn Exporter>, source: ExportSource) {
        if self.is_busy() {
            return;
        }
        let request = ExportRequest {
            format: self.format,
            source,
        };
        self.task = Some(submit_export(runner, exporter, request));
    }

    /// Finished export, if any. Success closes the dialog.
    pub fn poll(&mut self) -> Option<Result<ExportReceipt, TaskError>> {
        let result = self.task.as_mut()?.try_take()?;
        self.task = None;
        if result.is_ok() {
            self.close();
        }
        Some(result)
    }

    pub fn show(&mut self, ctx: &egui::Context) -> Option<ExportDialogAction> {
        if !self.visible {
            return None;
        }

        let busy = self.is_busy();
        let mut close = false;
        let mut action = None;

        egui::Window::new("Belgeyi Dışa Aktar")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_BOTTOM, [0.0, -24.0])
            .show(ctx, |ui| {
                ui.label("Belgenizi kaydetmek için uygun bir format seçin.");
                ui.add_space(8.0);
                ui.add_enabled_ui(!busy, |ui| {
                    ui.horizontal(|ui| {
                        for format in ExportFormat::ALL {
                            let text = RichText::new(format.label()).strong();
                            if ui.selectable_label(self.format == format, text).clicked() {
                                self.format = format;
                            }
                        }
                    });
                });

                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("İptal").clicked() {
                        close = true;
                    }
                    let label = if busy { "Dışa aktarılıyor..." } else { "Dışa Aktar" };
                    if ui.add_enabled(!busy, Button::new(label)).clicked() {
                        action = Some(ExportDialogAction::Start);
                    }
                    if busy {
                        ui.spinner();
                    }
                });
            });

        if close {
            self.close();
            return None;
        }
        action
    }
}
