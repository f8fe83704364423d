//! End-to-end tests over PDFs generated in memory.

use std::collections::BTreeSet;
use std::str::FromStr;

use frais_core::{
    Category, ExpensePipeline, PageStatus, PdfExtractor, PdfProcessor, PdfType, RejectionReason,
    ReportBuilder,
};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;

/// Build a PDF with one page per entry; `None` pages carry no text.
fn build_pdf(pages: &[Option<&str>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids = Vec::new();
    for text in pages {
        let operations = match text {
            Some(text) => vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
            // A filled rectangle stands in for a scanned image.
            None => vec![
                Operation::new("re", vec![72.into(), 72.into(), 400.into(), 600.into()]),
                Operation::new("f", vec![]),
            ],
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut data = Vec::new();
    doc.save_to(&mut data).unwrap();
    data
}

#[test]
fn test_three_page_document() {
    let data = build_pdf(&[Some("Prix 10.00"), None, Some("Prix 10.00")]);
    let result = ExpensePipeline::new().process_pdf(&data).unwrap();

    assert_eq!(result.page_count(), 3);
    assert_eq!(result.total_sum, Decimal::from_str("10.00").unwrap());
    assert_eq!(result.missing_pages, Vec::<u32>::new());
    assert_eq!(result.image_pages, vec![2]);
    assert_eq!(result.duplicate_pages, vec![3]);
    assert_eq!(result.document_kind(), PdfType::Hybrid);

    let statuses: Vec<PageStatus> = result.page_records.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![PageStatus::Ok, PageStatus::NeedsReview, PageStatus::NeedsReview]
    );
    assert_eq!(
        result.page_records[1].rejection_reason,
        Some(RejectionReason::ImageContent)
    );
    assert_eq!(
        result.page_records[2].rejection_reason,
        Some(RejectionReason::DuplicatePage)
    );
}

#[test]
fn test_extractor_reports_pages() {
    let data = build_pdf(&[Some("Uber Total 23,90"), None]);
    let extractor = PdfExtractor::from_bytes(&data).unwrap();

    assert_eq!(extractor.page_count(), 2);
    assert_eq!(extractor.extract_page_text(2).unwrap(), None);
    let text = extractor.extract_page_text(1).unwrap().unwrap();
    assert!(text.contains("Uber"));
    assert!(extractor.extract_page_text(3).is_err());
}

#[test]
fn test_rerun_is_identical() {
    let data = build_pdf(&[Some("SNCF Prix 45,00"), Some("Uber Total 12,30"), None]);
    let pipeline = ExpensePipeline::new();
    let builder = ReportBuilder::new();

    let first = builder.build(&pipeline.process_pdf(&data).unwrap());
    let second = builder.build(&pipeline.process_pdf(&data).unwrap());

    assert_eq!(first.total_sum, second.total_sum);
    assert_eq!(first.to_csv().unwrap(), second.to_csv().unwrap());
}

#[test]
fn test_csv_round_trip() {
    let data = build_pdf(&[
        Some("Uber Total 12,30"),
        Some("Parking Indigo"),
        None,
        Some("Uber Total 12,30"),
    ]);
    let report = ReportBuilder::new().build(&ExpensePipeline::new().process_pdf(&data).unwrap());
    let csv_text = report.to_csv().unwrap();

    let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
    let header: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
    assert_eq!(
        header,
        vec!["Page", "Amount", "Status", "RejectionReason", "Category", "Duplicate"]
    );

    let parsed: BTreeSet<(u32, String, String)> = reader
        .records()
        .map(|r| r.unwrap())
        .map(|r| (r[0].parse().unwrap(), r[2].to_string(), r[4].to_string()))
        .collect();
    let expected: BTreeSet<(u32, String, String)> = report
        .rows
        .iter()
        .map(|row| (row.page, row.status.to_string(), row.category.to_string()))
        .collect();

    assert_eq!(parsed.len(), report.rows.len());
    assert_eq!(parsed, expected);
    assert!(expected.contains(&(2, "NeedsReview".to_string(), Category::Parking.to_string())));
}

#[test]
fn test_unreadable_document() {
    let err = ExpensePipeline::new()
        .process_pdf(b"this is not a pdf at all")
        .unwrap_err();
    assert!(err.is_unreadable_document());
}
