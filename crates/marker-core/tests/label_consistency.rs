//! The CSV export and the PDF renderer must agree on every label.

use lopdf::content::Content;
use lopdf::{dictionary, Document, Object};
use marker_core::export::csv_rows;
use marker_core::marker::WIN_ANSI_HIGH;
use marker_core::{marker_primitives, render_annotations, Primitive};
use marker_types::{Annotation, AnnotationSet, BorderStyle, LabelSettings};
use proptest::prelude::*;

fn blank_pdf(num_pages: u32) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let page_ids: Vec<Object> = (0..num_pages)
        .map(|_| {
            Object::Reference(doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => Object::Reference(pages_id),
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }))
        })
        .collect();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => num_pages as i64,
            "Kids" => page_ids,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// WinAnsi bytes back to text.
fn decode_win_ansi(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| {
            WIN_ANSI_HIGH
                .iter()
                .find(|(b, _)| b == byte)
                .map(|(_, c)| *c)
                .unwrap_or(*byte as char)
        })
        .collect()
}

/// Labels drawn with `Tj`, in page then drawing order.
fn drawn_labels(pdf: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(pdf).unwrap();
    let mut labels = Vec::new();
    for (_, page_id) in doc.get_pages() {
        let content = doc.get_page_content(page_id).unwrap();
        for op in Content::decode(&content).unwrap().operations {
            if op.operator == "Tj" {
                if let Object::String(bytes, _) = &op.operands[0] {
                    labels.push(decode_win_ansi(bytes));
                }
            }
        }
    }
    labels
}

fn exported_labels(set: &AnnotationSet, settings: &LabelSettings) -> Vec<String> {
    csv_rows(set, settings)
        .into_iter()
        .skip(1)
        .map(|row| row[1].clone())
        .collect()
}

fn style_strategy() -> impl Strategy<Value = BorderStyle> {
    prop_oneof![
        Just(BorderStyle::Circle),
        Just(BorderStyle::Rect),
        Just(BorderStyle::None)
    ]
}

#[test]
fn rendered_pdf_labels_match_csv_labels() {
    let settings = LabelSettings {
        start_number: 100,
        increment: 10,
        prefix: "P-".to_string(),
        suffix: "#".to_string(),
        font_size: 10.0,
        border_style: BorderStyle::Rect,
    };
    let mut set = AnnotationSet::new();
    set.push(2, Annotation::new(50.0, 60.0, BorderStyle::Circle, 4));
    set.push(1, Annotation::new(10.0, 20.0, BorderStyle::Rect, 0));
    set.push(1, Annotation::new(30.0, 40.0, BorderStyle::None, 0));

    let pdf = render_annotations(&blank_pdf(2), &set, &settings).unwrap();

    assert_eq!(drawn_labels(&pdf), exported_labels(&set, &settings));
    assert_eq!(drawn_labels(&pdf), vec!["P-100#", "P-100#", "P-140#"]);
}

#[test]
fn win_ansi_punctuation_is_drawn_as_exported() {
    let settings = LabelSettings {
        prefix: "No–".to_string(),
        suffix: "€".to_string(),
        border_style: BorderStyle::Circle,
        ..Default::default()
    };
    let mut set = AnnotationSet::new();
    set.push(1, Annotation::new(10.0, 20.0, BorderStyle::Circle, 0));
    set.push(1, Annotation::new(30.0, 40.0, BorderStyle::Circle, 1));

    let pdf = render_annotations(&blank_pdf(1), &set, &settings).unwrap();

    assert_eq!(drawn_labels(&pdf), vec!["No–1€", "No–2€"]);
    assert_eq!(drawn_labels(&pdf), exported_labels(&set, &settings));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: the text primitive carries exactly the exported label
    #[test]
    fn primitive_text_matches_exported_label(
        start in -1000i64..1000,
        increment in -50i64..50,
        prefix in "[A-Za-z(é–—“”‘’€…•]{0,3}",
        suffix in "[A-Za-z)ü™Œ]{0,3}",
        style in style_strategy(),
        numbers in prop::collection::vec(0i64..200, 1..10),
    ) {
        let settings = LabelSettings {
            start_number: start,
            increment,
            prefix,
            suffix,
            font_size: 12.0,
            border_style: style,
        };
        let set: AnnotationSet = std::iter::once((
            1u32,
            numbers
                .iter()
                .map(|n| Annotation::new(5.0, 5.0, style, *n))
                .collect::<Vec<_>>(),
        ))
        .collect();

        let rendered: Vec<String> = set
            .page(1)
            .iter()
            .map(|ann| {
                let label = settings.label_for(ann);
                marker_primitives(ann.x, ann.y, 792.0, &label, &settings)
                    .into_iter()
                    .find_map(|p| match p {
                        Primitive::Text { text, .. } => Some(text),
                        _ => None,
                    })
                    .unwrap()
            })
            .collect();

        prop_assert_eq!(rendered, exported_labels(&set, &settings));
    }

    /// Property: the labels burned into the PDF are the exported ones
    #[test]
    fn burned_labels_match_exported_labels(
        prefix in "[A-Z–€“”]{0,2}",
        start in 0i64..500,
        increment in 1i64..5,
        numbers in prop::collection::vec(0i64..100, 0..6),
        style in style_strategy(),
    ) {
        let settings = LabelSettings {
            start_number: start,
            increment,
            prefix,
            border_style: style,
            ..Default::default()
        };
        let mut set = AnnotationSet::new();
        for (i, n) in numbers.iter().enumerate() {
            set.push(1 + (i as u32 % 2), Annotation::new(100.0, 100.0, style, *n));
        }

        let pdf = render_annotations(&blank_pdf(2), &set, &settings).unwrap();
        prop_assert_eq!(drawn_labels(&pdf), exported_labels(&set, &settings));
    }
}
