//! Navigation structures for KFX (TOC, landmarks, approximate page list).
//!
//! The `$389` book navigation root holds one entry per reading order, each
//! carrying an ordered list of nav containers: the TOC first, then landmarks
//! when any are set, then the approximate page list when page tracking is on.

use crate::book::{PositionItem, TocEntry};
use crate::config::LandmarkInfo;
use crate::kfx::fragment::Fragment;
use crate::kfx::ion::{IonValue, StructBuilder};
use crate::kfx::symbols::sym;

/// Local symbol naming the approximate page list container.
pub const APPROXIMATE_PAGE_LIST: &str = "APPROXIMATE_PAGE_LIST";

const COVER_LABEL: &str = "cover-nav-unit";
const DEFAULT_TOC_LABEL: &str = "Table of Contents";
const START_LABEL: &str = "Start";

/// An approximate page start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageEntry {
    /// 1-based page number
    pub page_number: usize,
    /// Element the page starts in
    pub eid: i64,
    /// Offset within that element's content, in runes
    pub offset: i64,
}

/// Build the `$389` book navigation fragment.
pub fn build_book_navigation(
    toc: &[TocEntry],
    start_eid: i64,
    positions: &[PositionItem],
    page_size: usize,
    landmarks: &LandmarkInfo,
) -> Fragment {
    let mut nav_containers = vec![nav_container(
        sym::TOC,
        build_nav_entries(toc, start_eid),
    )];

    if let Some(landmarks) = build_landmarks_container(landmarks) {
        nav_containers.push(landmarks);
    }

    let pages = calculate_approximate_pages(positions, page_size);
    if !pages.is_empty() {
        let container = IonValue::structure()
            .set_symbol(sym::NAV_TYPE, sym::PAGE_LIST)
            .set_symbol_name(sym::NAV_CONTAINER_NAME, APPROXIMATE_PAGE_LIST)
            .set_list(sym::ENTRIES, build_page_list_entries(&pages));
        nav_containers.push(IonValue::annotated(sym::NAV_CONTAINER, container.build()));
    }

    let reading_order_nav = IonValue::structure()
        .set_symbol(sym::READING_ORDER_NAME, sym::DEFAULT)
        .set_list(sym::NAV_CONTAINERS, nav_containers)
        .build();

    Fragment::root(sym::BOOK_NAVIGATION, IonValue::List(vec![reading_order_nav]))
}

/// Recursively build nav units, preserving TOC hierarchy via nested `$247`
/// entries.
///
/// An entry excluded from the TOC is transparent: its included descendants
/// take its place in the parent list, in order. Entries without a target
/// element (`first_eid <= 0`) point at `start_eid`.
pub fn build_nav_entries(entries: &[TocEntry], start_eid: i64) -> Vec<IonValue> {
    let mut nav_entries = Vec::new();

    for entry in entries {
        if !entry.include_in_toc {
            nav_entries.extend(build_nav_entries(&entry.children, start_eid));
            continue;
        }

        let eid = if entry.first_eid > 0 {
            entry.first_eid
        } else {
            start_eid
        };
        let target = IonValue::structure().set_int(sym::ID, eid);
        let mut unit = nav_unit(&entry.title, target);

        let children = build_nav_entries(&entry.children, start_eid);
        if !children.is_empty() {
            unit = unit.set_list(sym::ENTRIES, children);
        }

        nav_entries.push(IonValue::annotated(sym::NAV_UNIT, unit.build()));
    }

    nav_entries
}

/// Build the landmarks container: cover, then TOC, then start reading
/// location, one entry per set EID. `None` when no landmark is set.
pub fn build_landmarks_container(landmarks: &LandmarkInfo) -> Option<IonValue> {
    let mut entries = Vec::with_capacity(3);

    if landmarks.cover_eid > 0 {
        entries.push(landmark_entry(sym::COVER_PAGE, COVER_LABEL, landmarks.cover_eid));
    }
    if landmarks.toc_eid > 0 {
        let label = match landmarks.toc_label.as_str() {
            "" => DEFAULT_TOC_LABEL,
            l => l,
        };
        entries.push(landmark_entry(sym::TOC, label, landmarks.toc_eid));
    }
    if landmarks.start_eid > 0 {
        entries.push(landmark_entry(sym::SRL, START_LABEL, landmarks.start_eid));
    }

    if entries.is_empty() {
        return None;
    }
    Some(nav_container(sym::LANDMARKS, entries))
}

/// Split the linear reading order into pages of `page_size` runes.
///
/// The fill level carries across items, so a page may start in one element
/// and end in the next. Items of length `<= 0` count as one rune.
pub fn calculate_approximate_pages(items: &[PositionItem], page_size: usize) -> Vec<PageEntry> {
    if items.is_empty() || page_size == 0 {
        return Vec::new();
    }
    let page_size = i64::try_from(page_size).unwrap_or(i64::MAX);

    let mut pages = Vec::new();
    let mut page_number = 1;
    let mut runes_in_page: i64 = 0;

    for item in items {
        let item_len = item.length.max(1);
        let mut consumed: i64 = 0;

        while consumed < item_len {
            if runes_in_page == 0 {
                pages.push(PageEntry {
                    page_number,
                    eid: item.eid,
                    offset: consumed,
                });
            }

            let remaining = item_len - consumed;
            let needed = page_size - runes_in_page;
            if remaining >= needed {
                consumed += needed;
                runes_in_page = 0;
                page_number += 1;
            } else {
                consumed += remaining;
                runes_in_page += remaining;
            }
        }
    }

    pages
}

/// Nav units for the page list: label is the page number, target is
/// `{$143: offset, $155: eid}`.
pub fn build_page_list_entries(pages: &[PageEntry]) -> Vec<IonValue> {
    pages
        .iter()
        .map(|page| {
            let target = IonValue::structure()
                .set_int(sym::OFFSET, page.offset)
                .set_int(sym::ID, page.eid);
            IonValue::annotated(
                sym::NAV_UNIT,
                nav_unit(&page.page_number.to_string(), target).build(),
            )
        })
        .collect()
}

/// `$391::{$235: nav_type, $247: entries}`
fn nav_container(nav_type: u32, entries: Vec<IonValue>) -> IonValue {
    IonValue::annotated(
        sym::NAV_CONTAINER,
        IonValue::structure()
            .set_symbol(sym::NAV_TYPE, nav_type)
            .set_list(sym::ENTRIES, entries)
            .build(),
    )
}

/// `{$241: {$244: label}, $246: target}`; the representation is omitted for
/// an empty label.
fn nav_unit(label: &str, target: StructBuilder) -> StructBuilder {
    let mut unit = IonValue::structure();
    if !label.is_empty() {
        unit = unit.set_struct(
            sym::REPRESENTATION,
            IonValue::structure().set_str(sym::LABEL, label),
        );
    }
    unit.set_struct(sym::TARGET_POSITION, target)
}

/// `{$238: type, $241: {$244: label}, $246: {$143: 0, $155: eid}}`
fn landmark_entry(landmark_type: u32, label: &str, eid: i64) -> IonValue {
    let target = IonValue::structure()
        .set_int(sym::OFFSET, 0)
        .set_int(sym::ID, eid);
    let mut entry = IonValue::structure().set_symbol(sym::LANDMARK_TYPE, landmark_type);
    entry = entry.set_struct(
        sym::REPRESENTATION,
        IonValue::structure().set_str(sym::LABEL, label),
    );
    IonValue::annotated(
        sym::NAV_UNIT,
        entry.set_struct(sym::TARGET_POSITION, target).build(),
    )
}
