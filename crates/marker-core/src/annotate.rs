//! Burn markers into PDF pages

use crate::download::{Downloader, PDF_MIME_TYPE};
use crate::error::MarkerError;
use crate::marker::{marker_operations, marker_primitives};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use marker_types::{AnnotationSet, LabelSettings};
use tracing::{debug, error, info, warn};

/// Name used when a rendered PDF is downloaded without an explicit filename.
pub const DEFAULT_PDF_FILENAME: &str = "annotated.pdf";

/// Resource name of the Helvetica font used for labels.
pub const MARKER_FONT: &str = "PdfMarkerHelv";

/// Guards against cycles in malformed page trees.
const MAX_TREE_DEPTH: usize = 64;

/// Draw every annotation onto its page and return the new PDF bytes.
///
/// Pages are 1-indexed and match the keys of `annotations`; pages without
/// entries are left untouched, and entries for pages the document does not
/// have are ignored. The input bytes are never modified.
pub fn render_annotations(
    document_bytes: &[u8],
    annotations: &AnnotationSet,
    settings: &LabelSettings,
) -> Result<Vec<u8>, MarkerError> {
    let mut doc = Document::load_mem(document_bytes).map_err(|e| {
        error!(error = %e, "failed to load PDF");
        MarkerError::DocumentLoad(e.to_string())
    })?;

    let pages: Vec<(u32, ObjectId)> = doc.get_pages().into_iter().collect();
    let page_count = pages.len() as u32;

    for (page_num, _) in annotations.iter() {
        if page_num > page_count {
            debug!(page = page_num, page_count, "ignoring annotations past the last page");
        }
    }

    let mut font_id = None;
    let mut drawn = 0usize;

    for (page_num, page_id) in pages {
        let page_annotations = annotations.page(page_num);
        if page_annotations.is_empty() {
            continue;
        }

        let height = page_height(&doc, page_id)?;
        debug!(page = page_num, height, markers = page_annotations.len(), "drawing markers");

        let mut operations = Vec::new();
        for annotation in page_annotations {
            let label = settings.label_for(annotation);
            let primitives =
                marker_primitives(annotation.x, annotation.y, height, &label, settings);
            let marker_ops = marker_operations(&primitives, MARKER_FONT).map_err(|e| {
                error!(page = page_num, error = %e, "failed to draw marker");
                e
            })?;
            operations.extend(marker_ops);
        }

        let font = *font_id.get_or_insert_with(|| doc.add_object(helvetica()));
        attach_font(&mut doc, page_id, font)?;
        append_page_content(&mut doc, page_id, operations)?;
        drawn += page_annotations.len();
    }

    let mut output = Vec::new();
    doc.save_to(&mut output).map_err(|e| {
        error!(error = %e, "failed to save PDF");
        MarkerError::DocumentSave(e.to_string())
    })?;

    info!(markers = drawn, bytes = output.len(), "rendered annotated PDF");
    Ok(output)
}

/// Hand a rendered PDF to the downloader, named `annotated.pdf` unless given.
pub fn download_pdf(
    pdf_bytes: &[u8],
    filename: Option<&str>,
    downloader: &dyn Downloader,
) -> Result<(), MarkerError> {
    let filename = filename.unwrap_or(DEFAULT_PDF_FILENAME);
    downloader.download(pdf_bytes, filename, PDF_MIME_TYPE)?;
    Ok(())
}

fn helvetica() -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Page height from the (possibly inherited) MediaBox.
fn page_height(doc: &Document, page_id: ObjectId) -> Result<f64, MarkerError> {
    let media_box = inherited_attribute(doc, page_id, b"MediaBox")
        .ok_or_else(|| MarkerError::Operation(format!("page {:?} has no MediaBox", page_id)))?;

    let values: Vec<f64> = match resolve(doc, &media_box) {
        Object::Array(items) => items
            .iter()
            .filter_map(|item| number(resolve(doc, item)))
            .collect(),
        _ => Vec::new(),
    };

    match values[..] {
        [_, lly, _, ury] => Ok(ury - lly),
        _ => Err(MarkerError::Operation(format!(
            "page {:?} has a malformed MediaBox",
            page_id
        ))),
    }
}

/// Look up a page attribute, walking up the page tree for inherited values.
fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = Some(page_id);

    for _ in 0..MAX_TREE_DEPTH {
        let dict = doc.get_dictionary(current?).ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value.clone());
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok();
    }

    None
}

fn resolve<'a>(doc: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(object),
        _ => object,
    }
}

fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(v) => Some(*v as f64),
        Object::Real(v) => Some(*v as f64),
        _ => None,
    }
}

/// Register the marker font in the page's own resource dictionary.
///
/// Resources are copied onto the page rather than edited in place, since a
/// referenced or inherited dictionary may be shared with other pages.
fn attach_font(
    doc: &mut Document,
    page_id: ObjectId,
    font_id: ObjectId,
) -> Result<(), MarkerError> {
    let mut resources = match inherited_attribute(doc, page_id, b"Resources") {
        Some(obj) => match resolve(doc, &obj) {
            Object::Dictionary(dict) => dict.clone(),
            _ => Dictionary::new(),
        },
        None => Dictionary::new(),
    };

    let mut fonts = match resources.get(b"Font") {
        Ok(obj) => match resolve(doc, obj) {
            Object::Dictionary(dict) => dict.clone(),
            _ => Dictionary::new(),
        },
        Err(_) => Dictionary::new(),
    };
    fonts.set(MARKER_FONT, Object::Reference(font_id));
    resources.set("Font", Object::Dictionary(fonts));

    page_dict_mut(doc, page_id)?.set("Resources", Object::Dictionary(resources));
    Ok(())
}

/// Append the marker operations after the page's existing content.
///
/// Existing content is bracketed by `q`/`Q` so any graphics state it leaves
/// behind does not affect the markers.
fn append_page_content(
    doc: &mut Document,
    page_id: ObjectId,
    operations: Vec<Operation>,
) -> Result<(), MarkerError> {
    let existing = match page_dict_mut(doc, page_id)?.get(b"Contents") {
        Ok(contents) => contents.clone(),
        Err(_) => Object::Null,
    };
    let existing = content_streams(doc, &existing);

    let mut marker_ops = Vec::with_capacity(operations.len() + 1);
    if !existing.is_empty() {
        marker_ops.push(Operation::new("Q", vec![]));
    }
    marker_ops.extend(operations);

    let encoded = Content {
        operations: marker_ops,
    }
    .encode()
    .map_err(|e| MarkerError::Operation(format!("Failed to encode markers: {}", e)))?;
    let marker_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

    let contents = if existing.is_empty() {
        vec![Object::Reference(marker_id)]
    } else {
        let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let mut contents = Vec::with_capacity(existing.len() + 2);
        contents.push(Object::Reference(save_id));
        contents.extend(existing);
        contents.push(Object::Reference(marker_id));
        contents
    };

    page_dict_mut(doc, page_id)?.set("Contents", Object::Array(contents));
    Ok(())
}

/// Stream references making up a page's `/Contents`.
///
/// `/Contents` may be a stream reference, an array of them, or a reference
/// to such an array.
fn content_streams(doc: &Document, contents: &Object) -> Vec<Object> {
    match contents {
        Object::Array(items) => items.clone(),
        Object::Reference(id) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            Ok(Object::Stream(_)) => vec![Object::Reference(*id)],
            _ => {
                warn!(contents = ?id, "page contents reference is not a stream");
                Vec::new()
            }
        },
        _ => Vec::new(),
    }
}

fn page_dict_mut(doc: &mut Document, page_id: ObjectId) -> Result<&mut Dictionary, MarkerError> {
    doc.get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| MarkerError::Operation(format!("page {:?}: {}", page_id, e)))
}
