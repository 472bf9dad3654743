//! PDF output for composed documents
//!
//! Layout is top-left origin in millimeters; PDF user space is bottom-left
//! origin in points. Every coordinate goes through [`PdfPage`] for the flip.

use crate::assets::AssetCache;
use crate::compose::{ComposedDocument, ComposedPage};
use crate::constants::{BEZIER_CIRCLE_FACTOR, HELVETICA_CHAR_WIDTH_RATIO, STAR_INNER_RATIO, mm_to_pt};
use crate::layout::Rect;
use crate::theme::{Fill, Rgb, Stroke};
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::{BTreeMap, BTreeSet};

use super::DrawCommand;

const FONT_NAME: &str = "F1";

/// Render a composed document to PDF bytes
pub fn write_pdf(doc: &ComposedDocument, assets: &AssetCache, title: &str) -> Result<Vec<u8>> {
    let mut output = build_pdf(doc, assets, title)?;
    let mut bytes = Vec::new();
    output.save_to(&mut bytes)?;
    Ok(bytes)
}

/// Build the lopdf document without serializing it
pub fn build_pdf(doc: &ComposedDocument, assets: &AssetCache, title: &str) -> Result<Document> {
    if doc.pages.is_empty() {
        return Err(BingoError::NoGrids);
    }

    let mut output = Document::with_version("1.7");
    let pages_tree_id = output.new_object_id();

    let font_id = output.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
        ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
    ]));

    let images = embed_images(&mut output, doc, assets);
    let states = add_alpha_states(&mut output, doc);

    let page_height = doc.page_height_mm;
    let mut page_refs = Vec::new();
    for page in &doc.pages {
        let page_id = render_page(
            &mut output,
            page,
            PdfPage {
                width_mm: doc.page_width_mm,
                height_mm: page_height,
            },
            pages_tree_id,
            font_id,
            &images,
            &states,
        )?;
        page_refs.push(Object::Reference(page_id));
    }

    let count = page_refs.len() as i64;
    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(page_refs)),
        ("Count", Object::Integer(count)),
    ]);
    output
        .objects
        .insert(pages_tree_id, Object::Dictionary(pages_dict));

    let catalog_id = output.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_tree_id)),
    ]));
    output.trailer.set("Root", catalog_id);

    let info_id = output.add_object(Dictionary::from_iter(vec![
        ("Title", Object::string_literal(encode_win_ansi(title))),
        ("Producer", Object::string_literal("bingo-cards")),
    ]));
    output.trailer.set("Info", info_id);

    Ok(output)
}

/// Embedded image XObject, shared by every page that draws it
struct ImageXObject {
    name: String,
    id: ObjectId,
}

/// One XObject per distinct non-empty source
fn embed_images(
    output: &mut Document,
    doc: &ComposedDocument,
    assets: &AssetCache,
) -> BTreeMap<SourceRef, ImageXObject> {
    let mut images = BTreeMap::new();

    for command in doc.commands() {
        let DrawCommand::Image { source, .. } = command else {
            continue;
        };
        if images.contains_key(source) {
            continue;
        }
        let Some(asset) = assets.get(source).filter(|a| !a.is_empty()) else {
            log::warn!("Image {} is not in the asset cache; skipping", source);
            continue;
        };

        let dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"XObject".to_vec())),
            ("Subtype", Object::Name(b"Image".to_vec())),
            ("Width", Object::Integer(asset.width as i64)),
            ("Height", Object::Integer(asset.height as i64)),
            ("ColorSpace", Object::Name(b"DeviceRGB".to_vec())),
            ("BitsPerComponent", Object::Integer(8)),
            ("Filter", Object::Name(b"DCTDecode".to_vec())),
        ]);
        // Already JPEG; never re-deflate
        let stream = Stream::new(dict, asset.bytes().to_vec()).with_compression(false);
        let id = output.add_object(stream);
        let name = format!("Im{}", images.len());
        images.insert(source.clone(), ImageXObject { name, id });
    }

    images
}

/// ExtGState per distinct translucent fill alpha, keyed by the alpha's bits
fn add_alpha_states(output: &mut Document, doc: &ComposedDocument) -> BTreeMap<u32, (String, ObjectId)> {
    let alphas: BTreeSet<u32> = doc
        .commands()
        .filter_map(|command| match command {
            DrawCommand::Shape {
                fill: Some(fill), ..
            } if fill.alpha < 1.0 => Some(fill.alpha.to_bits()),
            _ => None,
        })
        .collect();

    alphas
        .into_iter()
        .enumerate()
        .map(|(i, bits)| {
            let id = output.add_object(Dictionary::from_iter(vec![
                ("Type", Object::Name(b"ExtGState".to_vec())),
                ("ca", Object::Real(f32::from_bits(bits))),
            ]));
            (bits, (format!("GS{}", i), id))
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn render_page(
    output: &mut Document,
    page: &ComposedPage,
    geometry: PdfPage,
    parent_pages_id: ObjectId,
    font_id: ObjectId,
    images: &BTreeMap<SourceRef, ImageXObject>,
    states: &BTreeMap<u32, (String, ObjectId)>,
) -> Result<ObjectId> {
    let mut page_dict = Dictionary::new();
    page_dict.set("Type", Object::Name(b"Page".to_vec()));
    page_dict.set("Parent", Object::Reference(parent_pages_id));
    page_dict.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(mm_to_pt(geometry.width_mm)),
            Object::Real(mm_to_pt(geometry.height_mm)),
        ]),
    );

    let mut ops = String::new();
    let mut xobjects = Dictionary::new();
    let mut ext_states = Dictionary::new();
    let mut uses_font = false;

    for command in page.commands() {
        match command {
            DrawCommand::Shape {
                rect,
                corner_radius,
                fill,
                stroke,
            } => {
                let state = fill
                    .filter(|f| f.alpha < 1.0)
                    .and_then(|f| states.get(&f.alpha.to_bits()));
                if let Some((name, id)) = state {
                    ext_states.set(name.as_bytes(), Object::Reference(*id));
                }
                ops.push_str(&geometry.shape(
                    rect,
                    *corner_radius,
                    fill.as_ref(),
                    stroke.as_ref(),
                    state.map(|(name, _)| name.as_str()),
                ));
            }
            DrawCommand::Image { rect, source } => {
                // Missing XObjects were logged while embedding
                if let Some(image) = images.get(source) {
                    xobjects.set(image.name.as_bytes(), Object::Reference(image.id));
                    ops.push_str(&geometry.image(rect, &image.name));
                }
            }
            DrawCommand::Star {
                center_x,
                center_y,
                outer_radius,
                color,
            } => ops.push_str(&geometry.star(*center_x, *center_y, *outer_radius, *color)),
            DrawCommand::Text {
                text,
                center_x,
                baseline_y,
                font_size_pt,
                color,
            } => {
                uses_font = true;
                ops.push_str(&geometry.text(text, *center_x, *baseline_y, *font_size_pt, *color));
            }
        }
    }

    let mut resources = Dictionary::new();
    if !xobjects.is_empty() {
        resources.set("XObject", Object::Dictionary(xobjects));
    }
    if !ext_states.is_empty() {
        resources.set("ExtGState", Object::Dictionary(ext_states));
    }
    if uses_font {
        let mut fonts = Dictionary::new();
        fonts.set(FONT_NAME, Object::Reference(font_id));
        resources.set("Font", Object::Dictionary(fonts));
    }

    let content_id = output.add_object(Stream::new(Dictionary::new(), ops.into_bytes()));
    page_dict.set("Contents", Object::Reference(content_id));
    page_dict.set("Resources", Object::Dictionary(resources));

    Ok(output.add_object(page_dict))
}

/// Coordinate conversion for one page
#[derive(Debug, Clone, Copy)]
struct PdfPage {
    width_mm: f32,
    height_mm: f32,
}

impl PdfPage {
    fn x(&self, x_mm: f32) -> f32 {
        mm_to_pt(x_mm)
    }

    fn y(&self, y_mm: f32) -> f32 {
        mm_to_pt(self.height_mm - y_mm)
    }

    /// Bottom-left corner and size of `rect` in points
    fn rect(&self, rect: &Rect) -> (f32, f32, f32, f32) {
        (
            self.x(rect.x),
            self.y(rect.bottom()),
            mm_to_pt(rect.width),
            mm_to_pt(rect.height),
        )
    }

    fn shape(
        &self,
        rect: &Rect,
        corner_radius: f32,
        fill: Option<&Fill>,
        stroke: Option<&Stroke>,
        alpha_state: Option<&str>,
    ) -> String {
        let paint = match (fill, stroke) {
            (Some(_), Some(_)) => "B",
            (Some(_), None) => "f",
            (None, Some(_)) => "S",
            (None, None) => return String::new(),
        };

        let mut ops = String::from("q\n");
        if let Some(name) = alpha_state {
            ops.push_str(&format!("/{} gs\n", name));
        }
        if let Some(fill) = fill {
            let (r, g, b) = fill.color.unit();
            ops.push_str(&format!("{} {} {} rg\n", r, g, b));
        }
        if let Some(stroke) = stroke {
            let (r, g, b) = stroke.color.unit();
            ops.push_str(&format!("{} {} {} RG\n", r, g, b));
            ops.push_str(&format!("{} w\n", mm_to_pt(stroke.width_mm)));
        }

        let (x, y, w, h) = self.rect(rect);
        if corner_radius > 0.0 {
            ops.push_str(&rounded_rect_path(x, y, w, h, mm_to_pt(corner_radius)));
        } else {
            ops.push_str(&format!("{} {} {} {} re\n", x, y, w, h));
        }
        ops.push_str(paint);
        ops.push_str("\nQ\n");
        ops
    }

    fn image(&self, rect: &Rect, name: &str) -> String {
        let (x, y, w, h) = self.rect(rect);
        format!("q {} 0 0 {} {} {} cm /{} Do Q\n", w, h, x, y, name)
    }

    fn star(&self, center_x: f32, center_y: f32, outer_radius: f32, color: Rgb) -> String {
        let inner_radius = outer_radius * STAR_INNER_RATIO;
        let (r, g, b) = color.unit();
        let mut ops = format!("q\n{} {} {} rg\n", r, g, b);

        // Ten vertices alternating outer/inner, first point straight up
        for k in 0..10 {
            let radius = if k % 2 == 0 { outer_radius } else { inner_radius };
            let angle = -std::f32::consts::FRAC_PI_2 + k as f32 * std::f32::consts::PI / 5.0;
            let px = self.x(center_x + radius * angle.cos());
            let py = self.y(center_y + radius * angle.sin());
            let op = if k == 0 { "m" } else { "l" };
            ops.push_str(&format!("{} {} {}\n", px, py, op));
        }
        ops.push_str("h f\nQ\n");
        ops
    }

    fn text(&self, text: &str, center_x: f32, baseline_y: f32, font_size_pt: f32, color: Rgb) -> String {
        let encoded = encode_win_ansi(text);
        let text_width = encoded.len() as f32 * font_size_pt * HELVETICA_CHAR_WIDTH_RATIO;
        let x = self.x(center_x) - text_width / 2.0;
        let y = self.y(baseline_y);
        let (r, g, b) = color.unit();

        format!(
            "q BT /{} {} Tf {} {} {} rg {} {} Td <{}> Tj ET Q\n",
            FONT_NAME,
            font_size_pt,
            r,
            g,
            b,
            x,
            y,
            hex(&encoded)
        )
    }
}

/// Closed rounded rectangle path; `x`, `y` is the bottom-left corner
fn rounded_rect_path(x: f32, y: f32, w: f32, h: f32, radius: f32) -> String {
    let r = radius.min(w / 2.0).min(h / 2.0);
    let k = r * BEZIER_CIRCLE_FACTOR;
    let (right, top) = (x + w, y + h);

    let mut ops = String::new();
    ops.push_str(&format!("{} {} m\n", x + r, y));
    ops.push_str(&format!("{} {} l\n", right - r, y));
    ops.push_str(&format!(
        "{} {} {} {} {} {} c\n",
        right - r + k,
        y,
        right,
        y + r - k,
        right,
        y + r
    ));
    ops.push_str(&format!("{} {} l\n", right, top - r));
    ops.push_str(&format!(
        "{} {} {} {} {} {} c\n",
        right,
        top - r + k,
        right - r + k,
        top,
        right - r,
        top
    ));
    ops.push_str(&format!("{} {} l\n", x + r, top));
    ops.push_str(&format!(
        "{} {} {} {} {} {} c\n",
        x + r - k,
        top,
        x,
        top - r + k,
        x,
        top - r
    ));
    ops.push_str(&format!("{} {} l\n", x, y + r));
    ops.push_str(&format!(
        "{} {} {} {} {} {} c\n",
        x,
        y + r - k,
        x + r - k,
        y,
        x + r,
        y
    ));
    ops.push_str("h\n");
    ops
}

/// Characters WinAnsiEncoding places in 0x80..=0x9F
const WIN_ANSI_HIGH: [(char, u8); 27] = [
    ('€', 0x80),
    ('‚', 0x82),
    ('ƒ', 0x83),
    ('„', 0x84),
    ('…', 0x85),
    ('†', 0x86),
    ('‡', 0x87),
    ('ˆ', 0x88),
    ('‰', 0x89),
    ('Š', 0x8A),
    ('‹', 0x8B),
    ('Œ', 0x8C),
    ('Ž', 0x8E),
    ('\u{2018}', 0x91),
    ('\u{2019}', 0x92),
    ('\u{201C}', 0x93),
    ('\u{201D}', 0x94),
    ('•', 0x95),
    ('\u{2013}', 0x96),
    ('\u{2014}', 0x97),
    ('˜', 0x98),
    ('™', 0x99),
    ('š', 0x9A),
    ('›', 0x9B),
    ('œ', 0x9C),
    ('ž', 0x9E),
    ('Ÿ', 0x9F),
];

/// Encode text for a WinAnsi Type1 font; unmappable characters become '?'
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            code @ (0x20..=0x7E | 0xA0..=0xFF) => code as u8,
            _ => WIN_ANSI_HIGH
                .iter()
                .find(|(mapped, _)| *mapped == c)
                .map_or(b'?', |(_, code)| *code),
        })
        .collect()
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::ComposedPage;

    fn page() -> PdfPage {
        PdfPage {
            width_mm: 210.0,
            height_mm: 297.0,
        }
    }

    #[test]
    fn test_win_ansi_keeps_latin1() {
        assert_eq!(encode_win_ansi("Noël 2024!"), b"No\xEBl 2024!".to_vec());
        assert_eq!(encode_win_ansi("a⭐b"), b"a?b".to_vec());
        assert_eq!(hex(&encode_win_ansi("Né")), "4EE9");
    }

    #[test]
    fn test_win_ansi_maps_typographic_punctuation() {
        assert_eq!(
            encode_win_ansi("Ann\u{2019}s \u{201C}Party\u{201D} \u{2013} 5\u{20AC}\u{2026}"),
            b"Ann\x92s \x93Party\x94 \x96 5\x80\x85".to_vec()
        );
        assert_eq!(encode_win_ansi("Œuvre™"), b"\x8Cuvre\x99".to_vec());
    }

    #[test]
    fn test_y_axis_is_flipped() {
        let (x, y, w, h) = page().rect(&Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(x, 0.0);
        assert!((y - mm_to_pt(287.0)).abs() < 1e-3);
        assert!((w - mm_to_pt(10.0)).abs() < 1e-3);
        assert!((h - mm_to_pt(10.0)).abs() < 1e-3);
    }

    #[test]
    fn test_rounded_shape_uses_curves() {
        let fill = Fill {
            color: Rgb::WHITE,
            alpha: 0.95,
        };
        let ops = page().shape(&Rect::new(10.0, 10.0, 20.0, 20.0), 2.0, Some(&fill), None, Some("GS0"));

        assert!(ops.contains("/GS0 gs"));
        assert_eq!(ops.matches(" c\n").count(), 4);
        assert!(ops.trim_end().ends_with("f\nQ"));

        let square = page().shape(&Rect::new(10.0, 10.0, 20.0, 20.0), 0.0, None, None, None);
        assert!(square.is_empty());
    }

    #[test]
    fn test_star_has_ten_vertices() {
        let ops = page().star(50.0, 50.0, 4.0, Rgb::new(250, 204, 21));
        assert_eq!(ops.matches(" m\n").count(), 1);
        assert_eq!(ops.matches(" l\n").count(), 9);
        assert!(ops.contains("h f"));
    }

    #[test]
    fn test_empty_document_is_rejected() {
        let doc = ComposedDocument {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            pages: Vec::new(),
        };
        assert!(matches!(
            build_pdf(&doc, &AssetCache::new(), "x"),
            Err(BingoError::NoGrids)
        ));
    }

    #[test]
    fn test_text_only_page_round_trips() {
        let doc = ComposedDocument {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            pages: vec![ComposedPage {
                index: 0,
                background: vec![DrawCommand::Text {
                    text: "Card 1".to_string(),
                    center_x: 105.0,
                    baseline_y: 16.0,
                    font_size_pt: 14.0,
                    color: Rgb::new(31, 41, 55),
                }],
                cards: Vec::new(),
            }],
        };

        let bytes = write_pdf(&doc, &AssetCache::new(), "Noël").unwrap();
        let loaded = Document::load_mem(&bytes).unwrap();
        assert_eq!(loaded.get_pages().len(), 1);
    }
}
