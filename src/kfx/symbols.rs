//! KFX symbol definitions and local symbol table management.
//!
//! Symbols below [`LOCAL_MIN_ID`] come from the `YJ_symbols` shared table
//! (version 10) that every KFX reader has baked in. Anything at or above it is
//! document-local and must be declared in the container's `$ion_symbol_table`.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::kfx::ion::IonValue;

/// A symbol ID. System symbols and document-local symbols share one id space.
pub type SymbolId = u32;

/// Local symbol IDs start here (after the YJ_symbols shared table).
pub const LOCAL_MIN_ID: SymbolId = 860;

/// Name of the shared table imported by every container.
pub const SHARED_TABLE_NAME: &str = "YJ_symbols";

/// Version of the shared table imported by every container.
pub const SHARED_TABLE_VERSION: i64 = 10;

// =============================================================================
// YJ_SYMBOLS - Shared symbol table (subset used by the fragment builders)
// =============================================================================

/// Symbol IDs from the Ion system table and the YJ_symbols shared table.
pub mod sym {
    use super::SymbolId;

    // Ion system symbols
    pub const ION_SYMBOL_TABLE: SymbolId = 3; // $3 - $ion_symbol_table
    pub const NAME: SymbolId = 4; // $4 - name
    pub const VERSION: SymbolId = 5; // $5 - version
    pub const IMPORTS: SymbolId = 6; // $6 - imports
    pub const SYMBOLS: SymbolId = 7; // $7 - symbols
    pub const MAX_ID: SymbolId = 8; // $8 - max_id

    // ==========================================================================
    // STYLE PROPERTIES
    // ==========================================================================
    pub const LANGUAGE: SymbolId = 10; // $10 - language
    pub const FONT_FAMILY: SymbolId = 11; // $11 - font_family
    pub const FONT_STYLE: SymbolId = 12; // $12 - font_style
    pub const FONT_WEIGHT: SymbolId = 13; // $13 - font_weight
    pub const FONT_SIZE: SymbolId = 16; // $16 - font_size
    pub const TEXT_COLOR: SymbolId = 19; // $19 - text_color (ARGB integer)
    pub const UNDERLINE: SymbolId = 23; // $23 - underline
    pub const STRIKETHROUGH: SymbolId = 27; // $27 - strikethrough
    pub const BASELINE_SHIFT: SymbolId = 31; // $31 - baseline_shift
    pub const LETTERSPACING: SymbolId = 32; // $32 - letterspacing
    pub const TEXT_ALIGNMENT: SymbolId = 34; // $34 - text_alignment
    pub const TEXT_INDENT: SymbolId = 36; // $36 - text_indent
    pub const LINE_HEIGHT: SymbolId = 42; // $42 - line_height
    pub const BASELINE_STYLE: SymbolId = 44; // $44 - baseline_style
    pub const MARGIN_TOP: SymbolId = 47; // $47 - margin_top
    pub const MARGIN_LEFT: SymbolId = 48; // $48 - margin_left
    pub const MARGIN_BOTTOM: SymbolId = 49; // $49 - margin_bottom
    pub const MARGIN_RIGHT: SymbolId = 50; // $50 - margin_right
    pub const PADDING: SymbolId = 51; // $51 - padding
    pub const PADDING_TOP: SymbolId = 52; // $52 - padding_top
    pub const PADDING_LEFT: SymbolId = 53; // $53 - padding_left
    pub const PADDING_BOTTOM: SymbolId = 54; // $54 - padding_bottom
    pub const PADDING_RIGHT: SymbolId = 55; // $55 - padding_right
    pub const WIDTH: SymbolId = 56; // $56 - width
    pub const HEIGHT: SymbolId = 57; // $57 - height
    pub const TOP: SymbolId = 58; // $58 - top
    pub const LEFT: SymbolId = 59; // $59 - left
    pub const BOTTOM: SymbolId = 60; // $60 - bottom
    pub const RIGHT: SymbolId = 61; // $61 - right
    pub const MIN_HEIGHT: SymbolId = 62; // $62 - min_height
    pub const FILL_COLOR: SymbolId = 70; // $70 - fill_color
    pub const BORDER_COLOR: SymbolId = 83; // $83 - border_color
    pub const BORDER_STYLE: SymbolId = 88; // $88 - border_style
    pub const BORDER_WEIGHT: SymbolId = 93; // $93 - border_weight
    pub const COLUMN_COUNT: SymbolId = 112; // $112 - column_count
    pub const KEEP_FIRST: SymbolId = 131; // $131 - first (keep together)
    pub const KEEP_LAST: SymbolId = 132; // $132 - last (keep together)
    pub const FLOAT: SymbolId = 140; // $140 - float
    pub const SIZING_BOUNDS: SymbolId = 546; // $546 - sizing_bounds
    pub const BOX_ALIGN: SymbolId = 580; // $580 - box_align
    pub const RENDER: SymbolId = 601; // $601 - render
    pub const LAYOUT_HINTS: SymbolId = 761; // $761 - layout_hints

    // ==========================================================================
    // UNITS ($306 values)
    // ==========================================================================
    pub const UNIT: SymbolId = 306; // $306 - unit field in value struct
    pub const VALUE: SymbolId = 307; // $307 - value field in value struct
    pub const UNIT_EM: SymbolId = 308; // $308 - em
    pub const UNIT_EX: SymbolId = 309; // $309 - ex
    pub const UNIT_RATIO: SymbolId = 310; // $310 - lh / ratio multiplier
    pub const UNIT_PERCENT: SymbolId = 314; // $314 - percent
    pub const UNIT_CM: SymbolId = 315; // $315 - cm
    pub const UNIT_MM: SymbolId = 316; // $316 - mm
    pub const UNIT_IN: SymbolId = 317; // $317 - in
    pub const UNIT_PT: SymbolId = 318; // $318 - pt
    pub const UNIT_PX: SymbolId = 319; // $319 - px
    pub const UNIT_REM: SymbolId = 505; // $505 - rem

    // ==========================================================================
    // ENUM VALUES
    // ==========================================================================
    pub const CENTER: SymbolId = 320; // $320 - center
    pub const JUSTIFY: SymbolId = 321; // $321 - justify
    pub const SOLID: SymbolId = 328; // $328 - solid
    pub const DASHED: SymbolId = 330; // $330 - dashed
    pub const DOTTED: SymbolId = 331; // $331 - dotted
    pub const NONE: SymbolId = 349; // $349 - none
    pub const NORMAL: SymbolId = 350; // $350 - normal
    pub const DEFAULT: SymbolId = 351; // $351 - default (reading order name)
    pub const ALWAYS: SymbolId = 352; // $352 - always
    pub const AVOID: SymbolId = 353; // $353 - avoid
    pub const BOLD: SymbolId = 361; // $361 - bold
    pub const SEMIBOLD: SymbolId = 362; // $362 - semibold
    pub const LIGHT: SymbolId = 363; // $363 - light
    pub const MEDIUM: SymbolId = 364; // $364 - medium
    pub const SUPERSCRIPT: SymbolId = 370; // $370 - superscript
    pub const SUBSCRIPT: SymbolId = 371; // $371 - subscript
    pub const LTR: SymbolId = 376; // $376 - ltr
    pub const ITALIC: SymbolId = 382; // $382 - italic
    pub const AUTO: SymbolId = 383; // $383 - auto
    pub const ENABLED: SymbolId = 441; // $441 - enabled
    pub const HORIZONTAL_TB: SymbolId = 557; // $557 - horizontal_tb
    pub const BLOCK: SymbolId = 602; // $602 - block
    pub const START: SymbolId = 680; // $680 - start
    pub const END: SymbolId = 681; // $681 - end
    pub const TREAT_AS_TITLE: SymbolId = 760; // $760 - treat_as_title

    // ==========================================================================
    // FRAGMENT STRUCTURE
    // ==========================================================================
    pub const PAGE_TEMPLATES: SymbolId = 141; // $141 - section page templates
    pub const OFFSET: SymbolId = 143; // $143 - offset within element
    pub const ID: SymbolId = 155; // $155 - id / EID
    pub const STYLE: SymbolId = 157; // $157 - style fragment type
    pub const FORMAT: SymbolId = 161; // $161 - format
    pub const MIME: SymbolId = 162; // $162 - MIME type string
    pub const EXTERNAL_RESOURCE: SymbolId = 164; // $164 - external resource fragment type
    pub const LOCATION: SymbolId = 165; // $165 - resource location
    pub const READING_ORDERS: SymbolId = 169; // $169 - reading orders list
    pub const SECTIONS: SymbolId = 170; // $170 - list of sections
    pub const STYLE_NAME: SymbolId = 173; // $173 - style name
    pub const SECTION_NAME: SymbolId = 174; // $174 - section name
    pub const RESOURCE_NAME: SymbolId = 175; // $175 - external resource name
    pub const READING_ORDER_NAME: SymbolId = 178; // $178 - reading order name
    pub const CONTAINS: SymbolId = 181; // $181 - contained fragment ids
    pub const DIRECTION: SymbolId = 192; // $192 - text direction
    pub const METADATA: SymbolId = 258; // $258 - metadata fragment type
    pub const STORYLINE: SymbolId = 259; // $259 - storyline fragment type
    pub const SECTION: SymbolId = 260; // $260 - section fragment type
    pub const POSITION_MAP: SymbolId = 264; // $264 - position map
    pub const POSITION_ID_MAP: SymbolId = 265; // $265 - position id map
    pub const CONTAINER: SymbolId = 270; // $270 - container info fragment type
    pub const PNG: SymbolId = 284; // $284 - PNG image format
    pub const JPG: SymbolId = 285; // $285 - JPEG image format
    pub const GIF: SymbolId = 286; // $286 - GIF image format
    pub const CONTENT_BOUNDS: SymbolId = 377; // $377 - content_bounds
    pub const SELECTION: SymbolId = 436; // $436 - selection
    pub const SPACING_PERCENT_BASE: SymbolId = 477; // $477 - spacing_percent_base
    pub const DOCUMENT_DATA: SymbolId = 538; // $538 - document data fragment type
    pub const LOCATION_MAP: SymbolId = 550; // $550 - location map fragment type
    pub const WRITING_MODE: SymbolId = 560; // $560 - writing_mode

    // ==========================================================================
    // NAVIGATION
    // ==========================================================================
    pub const TOC: SymbolId = 212; // $212 - toc nav type / landmark
    pub const COVER_PAGE: SymbolId = 233; // $233 - cover_page landmark
    pub const NAV_TYPE: SymbolId = 235; // $235 - nav_type
    pub const LANDMARKS: SymbolId = 236; // $236 - landmarks nav type
    pub const PAGE_LIST: SymbolId = 237; // $237 - page_list nav type
    pub const LANDMARK_TYPE: SymbolId = 238; // $238 - landmark_type
    pub const NAV_CONTAINER_NAME: SymbolId = 239; // $239 - nav_container_name
    pub const REPRESENTATION: SymbolId = 241; // $241 - representation
    pub const LABEL: SymbolId = 244; // $244 - label
    pub const TARGET_POSITION: SymbolId = 246; // $246 - target_position
    pub const ENTRIES: SymbolId = 247; // $247 - entries
    pub const BOOK_NAVIGATION: SymbolId = 389; // $389 - book navigation fragment type
    pub const NAV_CONTAINER: SymbolId = 391; // $391 - nav_container annotation
    pub const NAV_CONTAINERS: SymbolId = 392; // $392 - nav_containers list
    pub const NAV_UNIT: SymbolId = 393; // $393 - nav_unit annotation
    pub const RESOURCE_PATH: SymbolId = 395; // $395 - resource path fragment type
    pub const SRL: SymbolId = 396; // $396 - start reading location landmark

    // ==========================================================================
    // ENTITY MAP
    // ==========================================================================
    pub const CONTAINER_LIST: SymbolId = 252; // $252 - container list
    pub const ENTITY_DEPENDENCIES: SymbolId = 253; // $253 - entity dependencies
    pub const MANDATORY_DEPENDENCIES: SymbolId = 254; // $254 - mandatory dependencies
    pub const OPTIONAL_DEPENDENCIES: SymbolId = 255; // $255 - optional dependencies
    pub const CONTAINER_ENTITY_MAP: SymbolId = 419; // $419 - container entity map

    // ==========================================================================
    // CONTAINER HEADER
    // ==========================================================================
    pub const CONTAINER_ID: SymbolId = 409; // $409 - container ID string
    pub const COMPRESSION_TYPE: SymbolId = 410; // $410 - compression type
    pub const DRM_SCHEME: SymbolId = 411; // $411 - DRM scheme
    pub const CHUNK_SIZE: SymbolId = 412; // $412 - chunk size
    pub const INDEX_TABLE_OFFSET: SymbolId = 413; // $413 - index table offset
    pub const INDEX_TABLE_LENGTH: SymbolId = 414; // $414 - index table length
    pub const SYMBOL_TABLE_OFFSET: SymbolId = 415; // $415 - doc symbols offset
    pub const SYMBOL_TABLE_LENGTH: SymbolId = 416; // $416 - doc symbols length
    pub const RAW_MEDIA: SymbolId = 417; // $417 - raw media fragment type
    pub const RAW_FONT: SymbolId = 418; // $418 - raw font fragment type
    pub const FC_OFFSET: SymbolId = 594; // $594 - format capabilities offset
    pub const FC_LENGTH: SymbolId = 595; // $595 - format capabilities length

    // ==========================================================================
    // METADATA
    // ==========================================================================
    pub const RESOURCE_WIDTH: SymbolId = 422; // $422 - resource width in pixels
    pub const RESOURCE_HEIGHT: SymbolId = 423; // $423 - resource height in pixels
    pub const COVER_IMAGE: SymbolId = 424; // $424 - cover_image
    pub const BOOK_METADATA: SymbolId = 490; // $490 - book metadata fragment type
    pub const CATEGORISED_METADATA: SymbolId = 491; // $491 - categorised metadata list
    pub const KEY: SymbolId = 492; // $492 - metadata/feature key
    pub const CATEGORY: SymbolId = 495; // $495 - metadata group name
    pub const CONTENT_FEATURES: SymbolId = 585; // $585 - content features fragment type
    pub const NAMESPACE: SymbolId = 586; // $586 - feature namespace
    pub const MAJOR_VERSION: SymbolId = 587; // $587 - major version
    pub const MINOR_VERSION: SymbolId = 588; // $588 - minor version
    pub const VERSION_INFO: SymbolId = 589; // $589 - version info struct
    pub const FEATURES: SymbolId = 590; // $590 - feature list
    pub const FORMAT_CAPABILITIES: SymbolId = 593; // $593 - format capabilities fragment type
}

/// Fragment types that are singletons: their fragment id is their type.
pub const ROOT_FRAGMENT_TYPES: &[SymbolId] = &[
    sym::METADATA,
    sym::POSITION_MAP,
    sym::POSITION_ID_MAP,
    sym::CONTAINER,
    sym::BOOK_NAVIGATION,
    sym::RESOURCE_PATH,
    sym::CONTAINER_ENTITY_MAP,
    sym::BOOK_METADATA,
    sym::DOCUMENT_DATA,
    sym::LOCATION_MAP,
    sym::CONTENT_FEATURES,
    sym::FORMAT_CAPABILITIES,
];

/// Fragment types whose payload is raw bytes rather than Ion.
pub const RAW_FRAGMENT_TYPES: &[SymbolId] = &[sym::RAW_MEDIA, sym::RAW_FONT];

/// Fragment types that describe the physical container and are written into
/// its header rather than as entities.
pub const CONTAINER_FRAGMENT_TYPES: &[SymbolId] = &[sym::CONTAINER, sym::FORMAT_CAPABILITIES];

/// Whether `ftype` is a singleton (root) fragment type.
pub fn is_root_type(ftype: SymbolId) -> bool {
    ROOT_FRAGMENT_TYPES.contains(&ftype)
}

/// Well-known names, sorted by id, for the system symbols this crate uses.
static SYSTEM_NAMES: &[(SymbolId, &str)] = &[
    (1, "$ion"),
    (2, "$ion_1_0"),
    (3, "$ion_symbol_table"),
    (4, "name"),
    (5, "version"),
    (6, "imports"),
    (7, "symbols"),
    (8, "max_id"),
    (9, "$ion_shared_symbol_table"),
    (10, "language"),
    (11, "font_family"),
    (12, "font_style"),
    (13, "font_weight"),
    (16, "font_size"),
    (19, "text_color"),
    (23, "underline"),
    (27, "strikethrough"),
    (31, "baseline_shift"),
    (32, "letterspacing"),
    (34, "text_alignment"),
    (36, "text_indent"),
    (42, "line_height"),
    (44, "baseline_style"),
    (47, "margin_top"),
    (48, "margin_left"),
    (49, "margin_bottom"),
    (50, "margin_right"),
    (51, "padding"),
    (52, "padding_top"),
    (53, "padding_left"),
    (54, "padding_bottom"),
    (55, "padding_right"),
    (56, "width"),
    (57, "height"),
    (58, "top"),
    (59, "left"),
    (60, "bottom"),
    (61, "right"),
    (62, "min_height"),
    (70, "fill_color"),
    (83, "border_color"),
    (88, "border_style"),
    (93, "border_weight"),
    (112, "column_count"),
    (131, "first"),
    (132, "last"),
    (140, "float"),
    (141, "page_templates"),
    (143, "offset"),
    (155, "id"),
    (157, "style"),
    (161, "format"),
    (162, "mime"),
    (164, "external_resource"),
    (165, "location"),
    (169, "reading_orders"),
    (170, "sections"),
    (173, "style_name"),
    (174, "section_name"),
    (175, "resource_name"),
    (178, "reading_order_name"),
    (181, "contains"),
    (192, "direction"),
    (212, "toc"),
    (233, "cover_page"),
    (235, "nav_type"),
    (236, "landmarks"),
    (237, "page_list"),
    (238, "landmark_type"),
    (239, "nav_container_name"),
    (241, "representation"),
    (244, "label"),
    (246, "target_position"),
    (247, "entries"),
    (252, "container_list"),
    (253, "entity_dependencies"),
    (254, "mandatory_dependencies"),
    (255, "optional_dependencies"),
    (258, "metadata"),
    (259, "storyline"),
    (260, "section"),
    (264, "position_map"),
    (265, "position_id_map"),
    (270, "container"),
    (284, "png"),
    (285, "jpg"),
    (286, "gif"),
    (306, "unit"),
    (307, "value"),
    (308, "em"),
    (309, "ex"),
    (310, "lh"),
    (314, "percent"),
    (315, "cm"),
    (316, "mm"),
    (317, "in"),
    (318, "pt"),
    (319, "px"),
    (320, "center"),
    (321, "justify"),
    (328, "solid"),
    (330, "dashed"),
    (331, "dotted"),
    (349, "none"),
    (350, "normal"),
    (351, "default"),
    (352, "always"),
    (353, "avoid"),
    (361, "bold"),
    (362, "semibold"),
    (363, "light"),
    (364, "medium"),
    (370, "superscript"),
    (371, "subscript"),
    (376, "ltr"),
    (377, "content_bounds"),
    (382, "italic"),
    (383, "auto"),
    (389, "book_navigation"),
    (391, "nav_container"),
    (392, "nav_containers"),
    (393, "nav_unit"),
    (395, "resource_path"),
    (396, "srl"),
    (409, "bcContId"),
    (410, "bcComprType"),
    (411, "bcDRMScheme"),
    (412, "bcChunkSize"),
    (413, "bcIndexTabOffset"),
    (414, "bcIndexTabLength"),
    (415, "bcDocSymbolOffset"),
    (416, "bcDocSymbolLength"),
    (417, "bcRawMedia"),
    (418, "bcRawFont"),
    (419, "container_entity_map"),
    (422, "resource_width"),
    (423, "resource_height"),
    (424, "cover_image"),
    (436, "selection"),
    (441, "enabled"),
    (477, "spacing_percent_base"),
    (490, "book_metadata"),
    (491, "categorised_metadata"),
    (492, "key"),
    (495, "category"),
    (505, "rem"),
    (538, "document_data"),
    (546, "sizing_bounds"),
    (550, "location_map"),
    (557, "horizontal_tb"),
    (560, "writing_mode"),
    (580, "box_align"),
    (585, "content_features"),
    (586, "namespace"),
    (587, "major_version"),
    (588, "minor_version"),
    (589, "version_info"),
    (590, "features"),
    (593, "format_capabilities"),
    (594, "bcFCapabilitiesOffset"),
    (595, "bcFCapabilitiesLength"),
    (601, "render"),
    (602, "block"),
    (680, "start"),
    (681, "end"),
    (760, "treat_as_title"),
    (761, "layout_hints"),
];

/// Look up a system symbol's well-known name.
pub fn system_symbol_name(id: SymbolId) -> Option<&'static str> {
    SYSTEM_NAMES
        .binary_search_by_key(&id, |(sid, _)| *sid)
        .ok()
        .map(|idx| SYSTEM_NAMES[idx].1)
}

fn parse_dollar_id(name: &str) -> Option<SymbolId> {
    let digits = name.strip_prefix('$')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

// =============================================================================
// Local Symbol Table
// =============================================================================

/// Append-only table of document-local symbols.
///
/// Names are stored in an arena; a name's id is `base + index`. A table built
/// with [`LocalSymbolTable::from_max_id`] declares a capacity without knowing
/// any of the names below it, and appends new names after that capacity.
#[derive(Debug, Clone)]
pub struct LocalSymbolTable {
    /// Local symbol names in id order
    names: Vec<String>,
    /// Map from symbol name to ID
    index: HashMap<String, SymbolId>,
    /// ID of `names[0]`
    base: SymbolId,
}

impl Default for LocalSymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalSymbolTable {
    pub fn new() -> Self {
        Self {
            names: Vec::new(),
            index: HashMap::new(),
            base: LOCAL_MIN_ID,
        }
    }

    /// Build a table that only declares its highest id.
    ///
    /// Local ids up to `max_id` are considered allocated but have no names.
    pub fn from_max_id(max_id: SymbolId) -> Self {
        Self {
            names: Vec::new(),
            index: HashMap::new(),
            base: max_id.saturating_add(1).max(LOCAL_MIN_ID),
        }
    }

    /// Resolve a name to its symbol id.
    ///
    /// System symbols are only addressed as `$N`; their well-known names are
    /// ordinary local names here, so a class called `center` gets its own id.
    /// `$N` resolves for any id the table declares. Any other name must have
    /// been registered first.
    pub fn id_of(&self, name: &str) -> Result<SymbolId> {
        if let Some(&id) = self.index.get(name) {
            return Ok(id);
        }
        if let Some(id) = parse_dollar_id(name)
            && id <= self.max_id()
        {
            return Ok(id);
        }
        Err(Error::UnknownSymbol(name.to_string()))
    }

    /// Look up the name of a symbol id.
    ///
    /// Returns `None` for unknown system ids and for local ids declared only
    /// through [`LocalSymbolTable::from_max_id`].
    pub fn name_of(&self, id: SymbolId) -> Option<&str> {
        if id < LOCAL_MIN_ID {
            return system_symbol_name(id);
        }
        let idx = id.checked_sub(self.base)? as usize;
        self.names.get(idx).map(String::as_str)
    }

    /// Register a name, returning its id. Registering an existing name (or a
    /// declared `$N`) returns the existing id.
    pub fn register(&mut self, name: &str) -> SymbolId {
        if let Ok(id) = self.id_of(name) {
            return id;
        }
        let id = self.base + self.names.len() as SymbolId;
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), id);
        id
    }

    /// Check whether a name resolves without registering it.
    pub fn contains(&self, name: &str) -> bool {
        self.id_of(name).is_ok()
    }

    /// Highest symbol id this table declares.
    pub fn max_id(&self) -> SymbolId {
        self.base + self.names.len() as SymbolId - 1
    }

    /// Number of named local symbols.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Named local symbols in id order.
    pub fn local_symbols(&self) -> &[String] {
        &self.names
    }

    /// Build the `$ion_symbol_table` struct importing YJ_symbols.
    ///
    /// Ids declared without names are written as nulls so later names keep
    /// their positions.
    pub fn to_ion(&self) -> IonValue {
        let import = IonValue::structure()
            .set_str(sym::NAME, SHARED_TABLE_NAME)
            .set_int(sym::VERSION, SHARED_TABLE_VERSION)
            .set_int(sym::MAX_ID, i64::from(LOCAL_MIN_ID - 1))
            .build();

        let unnamed = (self.base - LOCAL_MIN_ID) as usize;
        let mut symbols = Vec::with_capacity(unnamed + self.names.len());
        symbols.extend(std::iter::repeat_n(IonValue::Null, unnamed));
        symbols.extend(self.names.iter().map(|s| IonValue::String(s.clone())));

        let mut table = IonValue::structure().set_list(sym::IMPORTS, vec![import]);
        if !symbols.is_empty() {
            table = table.set_list(sym::SYMBOLS, symbols);
        }
        table.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_idempotent() {
        let mut symtab = LocalSymbolTable::new();

        let id1 = symtab.register("section-1");
        let id2 = symtab.register("section-2");
        assert_eq!(id1, LOCAL_MIN_ID);
        assert_eq!(id2, id1 + 1);

        assert_eq!(symtab.register("section-1"), id1);
        assert_eq!(symtab.len(), 2);
        assert_eq!(symtab.max_id(), id2);
    }

    #[test]
    fn test_system_symbols_resolve_by_id() {
        let mut symtab = LocalSymbolTable::new();
        assert_eq!(symtab.id_of("$260").unwrap(), 260);
        assert_eq!(symtab.register("$389"), sym::BOOK_NAVIGATION);
        assert!(symtab.is_empty());
        assert_eq!(symtab.name_of(sym::STYLE_NAME), Some("style_name"));
    }

    #[test]
    fn test_system_names_are_local() {
        let mut symtab = LocalSymbolTable::new();
        assert!(symtab.id_of("section").is_err());
        assert!(!symtab.contains("center"));

        let center = symtab.register("center");
        let section = symtab.register("section");
        assert_eq!(center, LOCAL_MIN_ID);
        assert_eq!(section, LOCAL_MIN_ID + 1);
        assert_eq!(symtab.id_of("center").unwrap(), center);
        assert_eq!(symtab.name_of(center), Some("center"));
        assert_eq!(symtab.name_of(sym::CENTER), Some("center"));
        assert_eq!(symtab.local_symbols(), &["center".to_string(), "section".to_string()]);
    }

    #[test]
    fn test_unknown_symbol() {
        let symtab = LocalSymbolTable::new();
        match symtab.id_of("chapter-9") {
            Err(Error::UnknownSymbol(name)) => assert_eq!(name, "chapter-9"),
            other => panic!("expected UnknownSymbol, got {other:?}"),
        }
        assert!(symtab.id_of("$900").is_err());
    }

    #[test]
    fn test_name_of_local() {
        let mut symtab = LocalSymbolTable::new();
        let id = symtab.register("c0");
        assert_eq!(symtab.name_of(id), Some("c0"));
        assert_eq!(symtab.name_of(id + 1), None);
    }

    #[test]
    fn test_from_max_id() {
        let mut symtab = LocalSymbolTable::from_max_id(900);
        assert_eq!(symtab.max_id(), 900);
        assert!(symtab.is_empty());
        assert_eq!(symtab.name_of(870), None);
        assert_eq!(symtab.id_of("$870").unwrap(), 870);
        assert!(matches!(symtab.id_of("$901"), Err(Error::UnknownSymbol(_))));
        assert!(matches!(symtab.id_of("center"), Err(Error::UnknownSymbol(_))));

        let id = symtab.register("late");
        assert_eq!(id, 901);
        assert_eq!(symtab.name_of(901), Some("late"));
        assert_eq!(symtab.max_id(), 901);
    }

    #[test]
    fn test_from_small_max_id() {
        // A count inside the shared range declares no local ids at all.
        let symtab = LocalSymbolTable::from_max_id(100);
        assert_eq!(symtab.max_id(), LOCAL_MIN_ID - 1);
    }

    #[test]
    fn test_to_ion_placeholders() {
        let mut symtab = LocalSymbolTable::from_max_id(LOCAL_MIN_ID + 1);
        symtab.register("a");
        let ion = symtab.to_ion();
        let symbols = ion.get(sym::SYMBOLS).and_then(|v| v.as_list()).unwrap();
        assert_eq!(symbols.len(), 3);
        assert!(matches!(symbols[0], IonValue::Null));
        assert_eq!(symbols[2].as_string(), Some("a"));

        let imports = ion.get(sym::IMPORTS).and_then(|v| v.as_list()).unwrap();
        assert_eq!(
            imports[0].get(sym::NAME).and_then(|v| v.as_string()),
            Some(SHARED_TABLE_NAME)
        );
        assert_eq!(
            imports[0].get(sym::MAX_ID).and_then(|v| v.as_int()),
            Some(859)
        );
    }
}
