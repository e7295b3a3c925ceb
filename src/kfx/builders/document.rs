//! Document-level structure: `$538` document data, reading orders, `$258`
//! metadata, `$260` sections and the `$395` resource path.

use crate::kfx::ion::{Decimal, IonValue};
use crate::kfx::symbols::{SymbolId, sym};

/// Reading orders: a single default order listing the sections verbatim.
///
/// `[{$178: $351, $170: [section symbols]}]`
pub fn build_reading_orders<S: AsRef<str>>(section_names: &[S]) -> Vec<IonValue> {
    let sections = section_names
        .iter()
        .map(|name| IonValue::SymbolByName(name.as_ref().to_string()))
        .collect();

    vec![
        IonValue::structure()
            .set_symbol(sym::READING_ORDER_NAME, sym::DEFAULT)
            .set_list(sym::SECTIONS, sections)
            .build(),
    ]
}

/// `$538` document data: layout defaults, `max_id` and the reading orders.
pub fn build_document_data(reading_orders: Vec<IonValue>, max_id: SymbolId) -> IonValue {
    IonValue::structure()
        .set(sym::FONT_SIZE, dimension(Decimal::new(1, 0), sym::UNIT_EM))
        .set(sym::LINE_HEIGHT, dimension(Decimal::new(12, -1), sym::UNIT_EM))
        .set_symbol(sym::COLUMN_COUNT, sym::AUTO)
        .set_symbol(sym::DIRECTION, sym::LTR)
        .set_symbol(sym::SELECTION, sym::ENABLED)
        .set_symbol(sym::SPACING_PERCENT_BASE, sym::WIDTH)
        .set_symbol(sym::WRITING_MODE, sym::HORIZONTAL_TB)
        .set_int(sym::MAX_ID, i64::from(max_id))
        .set_list(sym::READING_ORDERS, reading_orders)
        .build()
}

/// `$258` metadata: the reading orders again, for older readers.
///
/// Empty when the book has no sections.
pub fn build_metadata(reading_orders: Vec<IonValue>, has_sections: bool) -> IonValue {
    let mut metadata = IonValue::structure();
    if has_sections {
        metadata = metadata.set_list(sym::READING_ORDERS, reading_orders);
    }
    metadata.build()
}

/// `$260` section: `{$174: name, $141: []}`.
pub fn build_section(section_name: &str) -> IonValue {
    IonValue::structure()
        .set_symbol_name(sym::SECTION_NAME, section_name)
        .set_list(sym::PAGE_TEMPLATES, Vec::new())
        .build()
}

/// `$395` resource path: `{$247: []}`.
pub fn build_resource_path() -> IonValue {
    IonValue::structure()
        .set_list(sym::ENTRIES, Vec::new())
        .build()
}

/// `{$307: value, $306: unit}`
pub(crate) fn dimension(value: Decimal, unit: SymbolId) -> IonValue {
    IonValue::structure()
        .set_decimal(sym::VALUE, value)
        .set_symbol(sym::UNIT, unit)
        .build()
}
