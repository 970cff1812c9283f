//! Block rendering for the rich-text editor
//!
//! Inactive blocks are drawn from their styled characters; the block under
//! the caret reuses the same layout through a `TextEdit` layouter so marks
//! stay visible while typing.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine};
use eframe::egui::{self, text::LayoutJob, Color32, FontId, RichText, Stroke, TextFormat, Ui};

use crate::core::markup::{Block, BlockKind, Marks};
use crate::core::preferences::{FontFamily, Preferences};

/// Base font of the editor, taken from the preferences
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorFont {
    pub size: f32,
    pub family: FontFamily,
}

impl EditorFont {
    pub fn from_preferences(prefs: &Preferences) -> Self {
        Self {
            size: f32::from(prefs.font_size),
            family: prefs.font_family,
        }
    }

    pub fn font_id(&self, kind: &BlockKind) -> FontId {
        let size = match kind {
            BlockKind::Heading(1) => self.size + 12.0,
            BlockKind::Heading(2) => self.size + 8.0,
            BlockKind::Heading(3) => self.size + 4.0,
            BlockKind::Heading(_) => self.size + 2.0,
            _ => self.size,
        };
        // Serif has no bundled face and renders proportional
        let family = match self.family {
            FontFamily::Monospace => egui::FontFamily::Monospace,
            FontFamily::Inter | FontFamily::Serif => egui::FontFamily::Proportional,
        };
        FontId::new(size, family)
    }
}

/// Lay out `text` with one entry of `marks` per character.
/// Characters past the end of `marks` are unstyled.
pub fn styled_job(
    ui: &Ui,
    text: &str,
    marks: &[Marks],
    font: &FontId,
    heading: bool,
    wrap_width: f32,
) -> LayoutJob {
    let visuals = ui.visuals();
    let normal = visuals.text_color();
    let strong = visuals.strong_text_color();
    let format = |m: Marks| {
        let color = if m.bold || heading { strong } else { normal };
        TextFormat {
            font_id: font.clone(),
            color,
            italics: m.italic,
            underline: if m.underline {
                Stroke::new(1.0, color)
            } else {
                Stroke::NONE
            },
            ..Default::default()
        }
    };

    let mut job = LayoutJob::default();
    job.wrap.max_width = wrap_width;

    let mut run = String::new();
    let mut run_marks = Marks::default();
    for (i, ch) in text.chars().enumerate() {
        let m = marks.get(i).copied().unwrap_or_default();
        if m != run_marks && !run.is_empty() {
            job.append(&run, 0.0, format(run_marks));
            run.clear();
        }
        run_marks = m;
        run.push(ch);
    }
    if !run.is_empty() || job.sections.is_empty() {
        job.append(&run, 0.0, format(run_marks));
    }
    job
}

/// Marks of every character in a block
pub fn block_marks(block: &Block) -> Vec<Marks> {
    block.chars.iter().map(|c| c.marks).collect()
}

/// Draw a block that is not being edited
pub fn render_block(
    ui: &mut Ui,
    block: &Block,
    ordinal: usize,
    font: &EditorFont,
    images: &mut ImageCache,
) {
    match &block.kind {
        BlockKind::Image { src, alt } => render_image(ui, src, alt, images),
        BlockKind::ListItem { ordered } => {
            ui.horizontal(|ui| {
                ui.add_space(16.0);
                let marker = if *ordered {
                    format!("{ordinal}.")
                } else {
                    "•".to_string()
                };
                ui.label(
                    RichText::new(marker)
                        .font(font.font_id(&block.kind))
                        .color(Color32::from_rgb(150, 150, 150)),
                );
                render_text(ui, block, font);
            });
        }
        BlockKind::Paragraph | BlockKind::Heading(_) => render_text(ui, block, font),
    }
}

fn render_text(ui: &mut Ui, block: &Block, font: &EditorFont) {
    let heading = matches!(block.kind, BlockKind::Heading(_));
    let job = styled_job(
        ui,
        &block.text(),
        &block_marks(block),
        &font.font_id(&block.kind),
        heading,
        ui.available_width(),
    );
    ui.add(egui::Label::new(job).selectable(false));
}

/// Draw an image reference; data URLs are decoded once and cached
pub fn render_image(ui: &mut Ui, src: &str, alt: &str, images: &mut ImageCache) {
    let max_size = egui::vec2(ui.available_width().min(480.0), 320.0);

    let response = if src.starts_with("data:") {
        match images.get(src) {
            Some((uri, bytes)) => ui.add(
                egui::Image::from_bytes(uri, egui::load::Bytes::Shared(bytes)).max_size(max_size),
            ),
            None => ui.label(RichText::new(format!("🖼 {alt}")).italics()),
        }
    } else {
        ui.add(egui::Image::from_uri(src.to_string()).max_size(max_size))
    };

    if !alt.is_empty() {
        response.on_hover_text(alt);
    }
}

/// Decoded image payloads keyed by a hash of their data URL
#[derive(Debug, Default)]
pub struct ImageCache {
    decoded: HashMap<u64, Option<(String, Arc<[u8]>)>>,
}

impl ImageCache {
    /// Loader URI and bytes for a data URL, or `None` if it does not decode
    pub fn get(&mut self, src: &str) -> Option<(String, Arc<[u8]>)> {
        let mut hasher = DefaultHasher::new();
        src.hash(&mut hasher);
        let key = hasher.finish();

        self.decoded
            .entry(key)
            .or_insert_with(|| {
                let decoded = decode_data_url(src);
                if decoded.is_none() {
                    tracing::warn!("Could not decode embedded image");
                }
                decoded.map(|(ext, bytes)| (format!("bytes://docflow/{key:x}.{ext}"), bytes.into()))
            })
            .clone()
    }
}

pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// Embed image bytes as a base64 data URL
pub fn encode_data_url(bytes: &[u8], ext: &str) -> Option<String> {
    let mime = mime_for_extension(ext)?;
    Some(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}

/// File extension and bytes of a base64 image data URL
pub fn decode_data_url(src: &str) -> Option<(String, Vec<u8>)> {
    let (meta, payload) = src.strip_prefix("data:")?.split_once(',')?;
    let subtype = meta.strip_suffix(";base64")?.strip_prefix("image/")?;
    let ext = match subtype {
        "jpeg" => "jpg",
        "svg+xml" => "svg",
        other => other,
    };
    let bytes = STANDARD.decode(payload.trim()).ok()?;
    Some((ext.to_string(), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_decoding() {
        let url = encode_data_url(&[0x89, b'P', b'N', b'G'], "PNG").unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(
            decode_data_url(&url),
            Some(("png".to_string(), vec![0x89, b'P', b'N', b'G']))
        );

        let jpeg = encode_data_url(b"jpeg", "jpeg").unwrap();
        assert_eq!(decode_data_url(&jpeg).unwrap().0, "jpg");
    }

    #[test]
    fn test_rejects_non_image_data() {
        assert!(encode_data_url(b"x", "txt").is_none());
        assert!(decode_data_url("data:text/plain;base64,eA==").is_none());
        assert!(decode_data_url("data:image/png,raw").is_none());
        assert!(decode_data_url("https://example.com/a.png").is_none());
        assert!(decode_data_url("data:image/png;base64,***").is_none());
    }

    #[test]
    fn test_image_cache_reuses_entries() {
        let mut cache = ImageCache::default();
        let url = encode_data_url(b"gif-bytes", "gif").unwrap();
        let (uri, bytes) = cache.get(&url).unwrap();
        assert!(uri.starts_with("bytes://docflow/") && uri.ends_with(".gif"));
        assert_eq!(&*bytes, b"gif-bytes");
        assert_eq!(cache.get(&url).unwrap().0, uri);
        assert!(cache.get("data:image/png;base64,***").is_none());
    }

    #[test]
    fn test_heading_fonts_scale_from_base() {
        let font = EditorFont {
            size: 16.0,
            family: FontFamily::Monospace,
        };
        assert_eq!(font.font_id(&BlockKind::Heading(1)).size, 28.0);
        assert_eq!(font.font_id(&BlockKind::Paragraph).size, 16.0);
        assert_eq!(
            font.font_id(&BlockKind::Paragraph).family,
            egui::FontFamily::Monospace
        );
    }
}
