//! End-to-end tests for the KFX build pipeline.
//!
//! Every test builds a small book, serializes it and reads the container
//! back with the crate's test helpers.

use std::collections::BTreeSet;

use kfxbuild::book::SectionSummary;
use kfxbuild::kfx::ion::IonValue;
use kfxbuild::kfx::navigation::APPROXIMATE_PAGE_LIST;
use kfxbuild::kfx::symbols::{CONTAINER_FRAGMENT_TYPES, sym};
use kfxbuild::kfx::test_helpers::{entity_body, entity_ids, parse_entity_ion, parse_kfx_container};
use kfxbuild::{
    BookSummary, BuildOutput, KfxBookBuilder, KfxConfig, LandmarkInfo, PositionItem, ResourceInfo,
    TocEntry,
};
use tempfile::TempDir;

fn sample_book() -> BookSummary {
    BookSummary::new("The Pipeline")
        .with_author("First Author")
        .with_author("Second Author")
        .with_language("en-GB")
        .with_document_id("urn:uuid:5d0c9a4e-pipeline")
        .with_section(SectionSummary::new("c0").with_resource("cover.jpg"))
        .with_section(SectionSummary::new("c1").with_resource("fig.png"))
        .with_section(SectionSummary::new("c2"))
        .with_resource(
            "cover.jpg",
            ResourceInfo::new("image/jpeg", 1200, 1600)
                .with_location("images/cover.jpg")
                .with_data(vec![0xFF, 0xD8, 0xFF, 0xE0]),
        )
        .with_resource(
            "fig.png",
            ResourceInfo::new("image/png", 320, 200).with_data(b"\x89PNG\r\n".to_vec()),
        )
}

fn sample_toc() -> Vec<TocEntry> {
    vec![
        TocEntry::new("Cover", 1000),
        TocEntry::new("Part One", 1001)
            .with_child(TocEntry::new("Chapter 1", 1002))
            .with_child(TocEntry::new("Chapter 2", 1003)),
        TocEntry::new("Colophon", 1004),
    ]
}

fn sample_positions() -> Vec<PositionItem> {
    vec![
        PositionItem::new(1000, 1),
        PositionItem::new(1001, 3000),
        PositionItem::new(1002, 2000),
    ]
}

fn build(book: &BookSummary, toc: &[TocEntry], positions: &[PositionItem]) -> BuildOutput {
    let config = KfxConfig::default()
        .with_page_size(2300)
        .with_landmarks(LandmarkInfo {
            cover_eid: 1000,
            toc_eid: 1004,
            toc_label: String::new(),
            start_eid: 1001,
        });
    KfxBookBuilder::new(book)
        .with_toc(toc)
        .with_positions(positions)
        .with_config(config)
        .build()
        .unwrap()
}

#[test]
fn test_output_is_deterministic() {
    let book = sample_book();
    let toc = sample_toc();
    let positions = sample_positions();

    let first = build(&book, &toc, &positions).to_bytes().unwrap();
    let second = build(&book, &toc, &positions).to_bytes().unwrap();
    assert_eq!(first, second);
    assert_eq!(&first[0..4], b"CONT");
}

#[test]
fn test_write_kfx_matches_to_bytes() {
    let book = sample_book();
    let output = build(&book, &sample_toc(), &sample_positions());

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("book.kfx");
    output.write_kfx(&path).unwrap();

    let on_disk = std::fs::read(&path).unwrap();
    assert_eq!(on_disk, output.to_bytes().unwrap());
}

#[test]
fn test_container_id_follows_document_id() {
    let book = sample_book();
    let a = build(&book, &[], &[]);
    let b = build(&book.clone().with_document_id("another"), &[], &[]);

    assert!(a.container_id.starts_with("CR!"));
    assert_eq!(a.container_id.len(), 31);
    assert_ne!(a.container_id, b.container_id);
}

#[test]
fn test_entity_map_lists_every_fragment() {
    let book = sample_book();
    let output = build(&book, &sample_toc(), &sample_positions());
    let entities = parse_kfx_container(&output.to_bytes().unwrap());

    let map = parse_entity_ion(&entities[&sym::CONTAINER_ENTITY_MAP][0].1).unwrap();
    let containers = map.get(sym::CONTAINER_LIST).and_then(IonValue::as_list).unwrap();
    assert_eq!(containers.len(), 1);
    assert_eq!(
        containers[0].get(sym::ID).and_then(IonValue::as_string),
        Some(output.container_id.as_str())
    );

    let listed: BTreeSet<u32> = containers[0]
        .get(sym::CONTAINS)
        .and_then(IonValue::as_list)
        .unwrap()
        .iter()
        .filter_map(IonValue::as_symbol)
        .collect();
    let expected: BTreeSet<u32> = output
        .graph
        .all()
        .iter()
        .filter(|f| !CONTAINER_FRAGMENT_TYPES.contains(&f.ftype))
        .filter(|f| f.ftype != sym::CONTAINER_ENTITY_MAP)
        .map(|f| output.symtab.id_of(&f.id_name()).unwrap())
        .collect();
    assert_eq!(listed, expected);
}

#[test]
fn test_entity_map_dependencies() {
    let book = sample_book();
    let output = build(&book, &[], &[]);
    let entities = parse_kfx_container(&output.to_bytes().unwrap());
    let map = parse_entity_ion(&entities[&sym::CONTAINER_ENTITY_MAP][0].1).unwrap();
    let deps = map.get(sym::ENTITY_DEPENDENCIES).and_then(IonValue::as_list).unwrap();

    let id = |name: &str| output.symtab.id_of(name).unwrap();
    let symbols = |dep: &IonValue, field| -> Vec<u32> {
        dep.get(field)
            .and_then(IonValue::as_list)
            .map(|l| l.iter().filter_map(IonValue::as_symbol).collect())
            .unwrap_or_default()
    };

    // Three sections, then two resources with raw media
    assert_eq!(deps.len(), 5);
    assert_eq!(deps[0].get(sym::ID).and_then(IonValue::as_symbol), Some(id("c0")));
    assert_eq!(symbols(&deps[0], sym::MANDATORY_DEPENDENCIES), vec![id("e1")]);
    assert_eq!(symbols(&deps[1], sym::MANDATORY_DEPENDENCIES), vec![id("e2")]);
    assert!(symbols(&deps[2], sym::MANDATORY_DEPENDENCIES).is_empty());

    assert_eq!(deps[3].get(sym::ID).and_then(IonValue::as_symbol), Some(id("e1")));
    assert_eq!(
        symbols(&deps[3], sym::OPTIONAL_DEPENDENCIES),
        vec![id("images/cover.jpg")]
    );
    assert_eq!(
        symbols(&deps[4], sym::OPTIONAL_DEPENDENCIES),
        vec![id("resource/rsrc2")]
    );
}

#[test]
fn test_raw_media_payloads() {
    let book = sample_book();
    let output = build(&book, &[], &[]);
    let entities = parse_kfx_container(&output.to_bytes().unwrap());

    let raw = &entities[&sym::RAW_MEDIA];
    assert_eq!(
        entity_ids(&entities, sym::RAW_MEDIA),
        vec![
            output.symtab.id_of("images/cover.jpg").unwrap(),
            output.symtab.id_of("resource/rsrc2").unwrap(),
        ]
    );
    assert_eq!(entity_body(&raw[0].1), Some(&[0xFF, 0xD8, 0xFF, 0xE0][..]));
    assert_eq!(entity_body(&raw[1].1), Some(&b"\x89PNG\r\n"[..]));
}

#[test]
fn test_navigation_container_order() {
    let book = sample_book();
    let output = build(&book, &sample_toc(), &sample_positions());
    let entities = parse_kfx_container(&output.to_bytes().unwrap());

    let nav = parse_entity_ion(&entities[&sym::BOOK_NAVIGATION][0].1).unwrap();
    let reading_orders = nav.as_list().unwrap();
    assert_eq!(reading_orders.len(), 1);
    assert_eq!(
        reading_orders[0].get(sym::READING_ORDER_NAME),
        Some(&IonValue::Symbol(sym::DEFAULT))
    );

    let containers = reading_orders[0]
        .get(sym::NAV_CONTAINERS)
        .and_then(IonValue::as_list)
        .unwrap();
    let kinds: Vec<_> = containers
        .iter()
        .map(|c| c.get(sym::NAV_TYPE).and_then(IonValue::as_symbol).unwrap())
        .collect();
    assert_eq!(kinds, vec![sym::TOC, sym::LANDMARKS, sym::PAGE_LIST]);
    assert!(containers.iter().all(|c| c.annotations() == [sym::NAV_CONTAINER]));

    // TOC keeps its hierarchy
    let toc = containers[0].get(sym::ENTRIES).and_then(IonValue::as_list).unwrap();
    assert_eq!(toc.len(), 3);
    let part = &toc[1];
    assert_eq!(part.get(sym::ENTRIES).and_then(IonValue::as_list).map(<[_]>::len), Some(2));

    // Landmarks: cover, toc, start
    let landmarks = containers[1].get(sym::ENTRIES).and_then(IonValue::as_list).unwrap();
    let types: Vec<_> = landmarks
        .iter()
        .map(|l| l.get(sym::LANDMARK_TYPE).and_then(IonValue::as_symbol).unwrap())
        .collect();
    assert_eq!(types, vec![sym::COVER_PAGE, sym::TOC, sym::SRL]);
}

#[test]
fn test_page_list_targets() {
    let book = sample_book();
    let output = build(&book, &sample_toc(), &sample_positions());
    let nav = output.graph.get_root(sym::BOOK_NAVIGATION).unwrap();
    let containers = nav.value.as_list().unwrap()[0]
        .get(sym::NAV_CONTAINERS)
        .and_then(IonValue::as_list)
        .unwrap();
    let page_list = &containers[2];

    assert_eq!(
        page_list.get(sym::NAV_CONTAINER_NAME).and_then(IonValue::as_symbol_name),
        Some(APPROXIMATE_PAGE_LIST)
    );

    // 1 + 3000 + 2000 runes at 2300 per page
    let targets: Vec<(String, i64, i64)> = page_list
        .get(sym::ENTRIES)
        .and_then(IonValue::as_list)
        .unwrap()
        .iter()
        .map(|unit| {
            let label = unit
                .get(sym::REPRESENTATION)
                .and_then(|r| r.get(sym::LABEL))
                .and_then(IonValue::as_string)
                .unwrap()
                .to_string();
            let target = unit.get(sym::TARGET_POSITION).unwrap();
            (
                label,
                target.get(sym::ID).and_then(IonValue::as_int).unwrap(),
                target.get(sym::OFFSET).and_then(IonValue::as_int).unwrap(),
            )
        })
        .collect();
    assert_eq!(
        targets,
        vec![
            ("1".to_string(), 1000, 0),
            ("2".to_string(), 1001, 2299),
            ("3".to_string(), 1002, 1599),
        ]
    );
}

#[test]
fn test_no_page_list_without_page_size() {
    let book = sample_book();
    let positions = sample_positions();
    let output = KfxBookBuilder::new(&book)
        .with_positions(&positions)
        .build()
        .unwrap();

    assert!(!output.symtab.contains(APPROXIMATE_PAGE_LIST));
    let nav = output.graph.get_root(sym::BOOK_NAVIGATION).unwrap();
    let containers = nav.value.as_list().unwrap()[0]
        .get(sym::NAV_CONTAINERS)
        .and_then(IonValue::as_list)
        .unwrap();
    assert_eq!(containers.len(), 1);
}

#[test]
fn test_unsupported_resource_is_skipped() {
    let book = sample_book().with_resource(
        "font.otf",
        ResourceInfo::new("font/otf", 0, 0).with_data(vec![0; 8]),
    );
    let output = build(&book, &[], &[]);

    assert_eq!(
        output.warnings,
        vec!["unsupported resource format: font.otf (font/otf)"]
    );
    assert_eq!(output.graph.get_by_type(sym::EXTERNAL_RESOURCE).len(), 2);
    assert_eq!(output.graph.get_by_type(sym::RAW_MEDIA).len(), 2);
}
