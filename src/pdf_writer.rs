use anyhow::{anyhow, Result};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tracing::debug;

use crate::config::PdfSettings;
use crate::fonts::BuiltinFont;
use crate::layout::Page;

const FONT_RESOURCE: &str = "F1";

fn real(value: f32) -> Object {
    Object::Real(value.into())
}

fn page_operations(page: &Page, settings: &PdfSettings) -> Vec<Operation> {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        // Graphics state does not carry over between pages.
        Operation::new(
            "Tf",
            vec![FONT_RESOURCE.into(), real(settings.font_size_pt)],
        ),
    ];

    for line in &page.lines {
        operations.push(Operation::new(
            "Tm",
            vec![
                Object::Integer(1),
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(1),
                real(line.x),
                real(line.y),
            ],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(BuiltinFont::encode(&line.text))],
        ));
    }

    operations.push(Operation::new("ET", vec![]));
    operations
}

/// Builds a PDF document with one page per laid out `Page`.
///
/// An empty page list still yields a single blank page so the output is a
/// valid PDF.
pub fn render(pages: &[Page], settings: &PdfSettings, title: &str) -> Result<Document> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => settings.font.pdf_name(),
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            FONT_RESOURCE => font_id,
        },
    });

    let blank = [Page::default()];
    let pages = if pages.is_empty() { &blank[..] } else { pages };

    let mut kids = Vec::with_capacity(pages.len());
    for page in pages {
        let content = Content {
            operations: page_operations(page, settings),
        };
        let encoded = content
            .encode()
            .map_err(|e| anyhow!("Failed to encode page content: {}", e))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let page_count = kids.len() as i64;
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            real(settings.page_width_pt()),
            real(settings.page_height_pt()),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(BuiltinFont::encode(title)),
        "Producer" => Object::string_literal("novel2book"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    debug!("Rendered \"{}\" with {} pages", title, page_count);
    Ok(doc)
}

/// Serialises the document produced by [`render`].
pub fn render_to_vec(pages: &[Page], settings: &PdfSettings, title: &str) -> Result<Vec<u8>> {
    let mut doc = render(pages, settings, title)?;
    let mut data = Vec::new();
    doc.save_to(&mut data)
        .map_err(|e| anyhow!("Failed to serialize PDF \"{}\": {}", title, e))?;
    Ok(data)
}
