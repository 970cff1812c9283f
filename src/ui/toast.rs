//! Transient notification shown at the bottom of the window

use std::time::{Duration, Instant};

use eframe::egui::{self, Color32, RichText};

const TOAST_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    message: String,
    kind: ToastKind,
    shown_at: Instant,
}

/// Holds at most one toast; a new one replaces the old
#[derive(Debug, Default)]
pub struct Toasts {
    current: Option<Toast>,
}

impl Toasts {
    pub fn info(&mut self, message: impl Into<String>) {
        self.push(message.into(), ToastKind::Info);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(message.into(), ToastKind::Error);
    }

    fn push(&mut self, message: String, kind: ToastKind) {
        self.current = Some(Toast {
            message,
            kind,
            shown_at: Instant::now(),
        });
    }

    /// Message and kind of the toast still visible at `now`
    pub fn visible(&self, now: Instant) -> Option<(&str, ToastKind)> {
        self.current
            .as_ref()
            .filter(|t| now.saturating_duration_since(t.shown_at) < TOAST_DURATION)
            .map(|t| (t.message.as_str(), t.kind))
    }

    pub fn show(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        let Some((message, kind)) = self.visible(now) else {
            self.current = None;
            return;
        };

        let fill = match kind {
            ToastKind::Info => Color32::from_rgb(40, 40, 48),
            ToastKind::Error => Color32::from_rgb(150, 40, 40),
        };

        egui::Area::new(egui::Id::new("toast"))
            .anchor(egui::Align2::CENTER_BOTTOM, [0.0, -32.0])
            .order(egui::Order::Foreground)
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::new()
                    .fill(fill)
                    .corner_radius(egui::CornerRadius::same(16))
                    .inner_margin(egui::Margin::symmetric(16, 10))
                    .show(ui, |ui| {
                        ui.label(RichText::new(message).color(Color32::WHITE));
                    });
            });

        ctx.request_repaint_after(Duration::from_millis(250));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_toast_wins_and_expires() {
        let mut toasts = Toasts::default();
        assert!(toasts.visible(Instant::now()).is_none());

        toasts.info("Belge kaydedildi!");
        toasts.error("Depolama alanı dolu, belge kaydedilemedi.");
        let now = Instant::now();
        assert_eq!(
            toasts.visible(now),
            Some(("Depolama alanı dolu, belge kaydedilemedi.", ToastKind::Error))
        );
        assert!(toasts.visible(now + TOAST_DURATION).is_none());
    }
}
