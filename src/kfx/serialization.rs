//! KFX container serialization.
//!
//! Writes a [`FragmentGraph`] as a single CONT container. Symbol names are
//! resolved through the document's [`LocalSymbolTable`], so every name a
//! fragment references must be registered before serializing.

use super::fragment::{Fragment, FragmentGraph};
use super::ion::{IonValue, IonWriter};
use super::symbols::{CONTAINER_FRAGMENT_TYPES, LocalSymbolTable, SymbolId, sym};
use crate::error::Result;

/// Serialized entity ready for container output.
#[derive(Debug, Clone)]
pub struct SerializedEntity {
    /// Entity ID (fragment ID symbol)
    pub id: u32,
    /// Entity type (fragment type symbol)
    pub entity_type: u32,
    /// Serialized data (ENTY-wrapped)
    pub data: Vec<u8>,
}

/// Container magic bytes.
const CONTAINER_MAGIC: &[u8; 4] = b"CONT";

/// Entity magic bytes.
const ENTITY_MAGIC: &[u8; 4] = b"ENTY";

/// Header is 18 bytes: magic(4) + version(2) + header_len(4) + ci_offset(4) + ci_len(4)
const HEADER_SIZE: usize = 18;

/// ENTY header: magic(4) + version(2) + header_len(4)
const ENTITY_HEADER_SIZE: usize = 10;

const CHUNK_SIZE: i64 = 4096;

/// Serialize a whole fragment graph into container bytes.
///
/// Container info and format capabilities fragments go into the container
/// header; every other fragment becomes an entity, in graph order.
pub fn serialize_graph(
    graph: &FragmentGraph,
    symtab: &LocalSymbolTable,
    container_id: &str,
    application_name: &str,
) -> Result<Vec<u8>> {
    let mut entities = Vec::with_capacity(graph.len());
    for fragment in graph.all() {
        if CONTAINER_FRAGMENT_TYPES.contains(&fragment.ftype) {
            continue;
        }
        entities.push(SerializedEntity {
            id: entity_id(fragment, symtab)?,
            entity_type: fragment.ftype,
            data: serialize_fragment(fragment, symtab)?,
        });
    }

    let symtab_ion = serialize_annotated_ion(sym::ION_SYMBOL_TABLE, &symtab.to_ion(), None)?;
    let format_caps_ion = match graph.get_root(sym::FORMAT_CAPABILITIES) {
        Some(caps) => serialize_annotated_ion(sym::FORMAT_CAPABILITIES, &caps.value, Some(symtab))?,
        None => Vec::new(),
    };

    tracing::debug!(
        entities = entities.len(),
        local_symbols = symtab.len(),
        container_id,
        "serializing container"
    );
    serialize_container(
        container_id,
        &entities,
        &symtab_ion,
        &format_caps_ion,
        application_name,
    )
}

/// Roots are addressed by their type; named fragments by their symbol.
fn entity_id(fragment: &Fragment, symtab: &LocalSymbolTable) -> Result<SymbolId> {
    match &fragment.fid_name {
        Some(name) => symtab.id_of(name),
        None => Ok(fragment.fid),
    }
}

/// Serialize a complete KFX container.
///
/// Container layout:
/// - Header: CONT magic + version + header_len + ci_offset + ci_len
/// - Entity table (indexed by $413/$414)
/// - Doc symbols ION (indexed by $415/$416)
/// - Format capabilities ION (indexed by $594/$595)
/// - Container info ION
/// - kfxgen_info JSON
/// - Entity payloads (after header_len)
pub fn serialize_container(
    container_id: &str,
    entities: &[SerializedEntity],
    symtab_ion: &[u8],
    format_caps_ion: &[u8],
    application_name: &str,
) -> Result<Vec<u8>> {
    // Build entity table and calculate payload offsets
    let mut entity_table = Vec::with_capacity(entities.len() * 24);
    let mut entity_data = Vec::new();

    for entity in entities {
        entity_table.extend_from_slice(&entity.id.to_le_bytes());
        entity_table.extend_from_slice(&entity.entity_type.to_le_bytes());
        entity_table.extend_from_slice(&(entity_data.len() as u64).to_le_bytes());
        entity_table.extend_from_slice(&(entity.data.len() as u64).to_le_bytes());
        entity_data.extend_from_slice(&entity.data);
    }

    let payload_sha1 = sha1_smol::Sha1::from(&entity_data).hexdigest();

    // Offsets within the header section (after the 18-byte fixed header)
    let entity_table_offset = HEADER_SIZE;
    let symtab_offset = entity_table_offset + entity_table.len();
    let format_caps_offset = symtab_offset + symtab_ion.len();

    let mut info = IonValue::structure()
        .set_str(sym::CONTAINER_ID, container_id)
        .set_int(sym::COMPRESSION_TYPE, 0)
        .set_int(sym::DRM_SCHEME, 0)
        .set_int(sym::CHUNK_SIZE, CHUNK_SIZE)
        .set_int(sym::INDEX_TABLE_OFFSET, entity_table_offset as i64)
        .set_int(sym::INDEX_TABLE_LENGTH, entity_table.len() as i64)
        .set_int(sym::SYMBOL_TABLE_OFFSET, symtab_offset as i64)
        .set_int(sym::SYMBOL_TABLE_LENGTH, symtab_ion.len() as i64);

    // Only include format capabilities offset if we have them
    if !format_caps_ion.is_empty() {
        info = info
            .set_int(sym::FC_OFFSET, format_caps_offset as i64)
            .set_int(sym::FC_LENGTH, format_caps_ion.len() as i64);
    }

    let mut ion_writer = IonWriter::new();
    ion_writer.write_bvm();
    ion_writer.write_value(&info.build())?;
    let container_info_data = ion_writer.into_bytes();

    let container_info_offset = format_caps_offset + format_caps_ion.len();

    let kfxgen_info = format!(
        r#"[{{key:kfxgen_package_version,value:{}}},{{key:kfxgen_application_version,value:{}}},{{key:kfxgen_payload_sha1,value:{}}},{{key:kfxgen_acr,value:{}}}]"#,
        env!("CARGO_PKG_VERSION"),
        application_name,
        payload_sha1,
        container_id
    );

    let header_len = container_info_offset + container_info_data.len() + kfxgen_info.len();

    let mut output = Vec::with_capacity(header_len + entity_data.len());

    // Fixed header (18 bytes)
    output.extend_from_slice(CONTAINER_MAGIC);
    output.extend_from_slice(&2u16.to_le_bytes()); // version
    output.extend_from_slice(&(header_len as u32).to_le_bytes());
    output.extend_from_slice(&(container_info_offset as u32).to_le_bytes());
    output.extend_from_slice(&(container_info_data.len() as u32).to_le_bytes());

    output.extend_from_slice(&entity_table);
    output.extend_from_slice(symtab_ion);
    output.extend_from_slice(format_caps_ion);
    output.extend_from_slice(&container_info_data);
    output.extend_from_slice(kfxgen_info.as_bytes());

    // Entity payloads (after header)
    output.extend_from_slice(&entity_data);

    Ok(output)
}

/// Entity header ION: `{$410: 0, $411: 0}`
fn entity_header() -> Result<Vec<u8>> {
    let header = IonValue::structure()
        .set_int(sym::COMPRESSION_TYPE, 0)
        .set_int(sym::DRM_SCHEME, 0)
        .build();
    let mut writer = IonWriter::new();
    writer.write_bvm();
    writer.write_value(&header)?;
    Ok(writer.into_bytes())
}

fn wrap_entity(header_ion: &[u8], body: &[u8]) -> Vec<u8> {
    let header_len = ENTITY_HEADER_SIZE + header_ion.len();

    let mut data = Vec::with_capacity(header_len + body.len());
    data.extend_from_slice(ENTITY_MAGIC);
    data.extend_from_slice(&1u16.to_le_bytes()); // version
    data.extend_from_slice(&(header_len as u32).to_le_bytes());
    data.extend_from_slice(header_ion);
    data.extend_from_slice(body);
    data
}

/// Create entity data with ENTY header for Ion content.
pub fn create_entity_data(value: &IonValue, symbols: Option<&LocalSymbolTable>) -> Result<Vec<u8>> {
    let mut content_writer = match symbols {
        Some(symbols) => IonWriter::with_symbols(symbols),
        None => IonWriter::new(),
    };
    content_writer.write_bvm();
    content_writer.write_value(value)?;
    Ok(wrap_entity(&entity_header()?, &content_writer.into_bytes()))
}

/// Create raw media entity data (for images, fonts).
/// Raw media stores bytes directly without Ion encoding.
pub fn create_raw_media_data(raw_bytes: &[u8]) -> Result<Vec<u8>> {
    Ok(wrap_entity(&entity_header()?, raw_bytes))
}

/// Serialize an annotated Ion value (for $ion_symbol_table and $593).
pub fn serialize_annotated_ion(
    annotation: SymbolId,
    value: &IonValue,
    symbols: Option<&LocalSymbolTable>,
) -> Result<Vec<u8>> {
    let annotated = IonValue::annotated(annotation, value.clone());
    let mut writer = match symbols {
        Some(symbols) => IonWriter::with_symbols(symbols),
        None => IonWriter::new(),
    };
    writer.write_bvm();
    writer.write_value(&annotated)?;
    Ok(writer.into_bytes())
}

/// Serialize a fragment to entity data.
pub fn serialize_fragment(fragment: &Fragment, symtab: &LocalSymbolTable) -> Result<Vec<u8>> {
    match &fragment.value {
        IonValue::Raw(bytes) => create_raw_media_data(bytes),
        value => create_entity_data(value, Some(symtab)),
    }
}

/// Derive a container id from the document id.
///
/// `CR!` followed by 28 characters of `[0-9A-Z]`; the same document id always
/// gives the same container id.
pub fn container_id_for(document_id: &str) -> String {
    const CHARS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    let digest = sha1_smol::Sha1::from(document_id).digest().bytes();

    let mut id = String::with_capacity(31);
    id.push_str("CR!");
    for i in 0..28 {
        let byte = digest[i % digest.len()].wrapping_add((i / digest.len()) as u8);
        id.push(char::from(CHARS[usize::from(byte) % CHARS.len()]));
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kfx::test_helpers::{parse_entity_ion, parse_kfx_container};

    #[test]
    fn test_container_id_format() {
        let id = container_id_for("urn:uuid:1234");
        assert!(id.starts_with("CR!"));
        assert_eq!(id.len(), 31); // CR! + 28 chars

        let suffix = &id[3..];
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()),
            "Container ID should only contain uppercase alphanumeric: {}",
            id
        );
        assert_eq!(id, container_id_for("urn:uuid:1234"));
        assert_ne!(id, container_id_for("urn:uuid:1235"));
    }

    #[test]
    fn test_create_entity_data() {
        let value = IonValue::structure().set_str(sym::LOCATION, "Test").build();
        let data = create_entity_data(&value, None).unwrap();

        // Should start with ENTY magic
        assert_eq!(&data[..4], b"ENTY");
        // Version should be 1
        assert_eq!(u16::from_le_bytes([data[4], data[5]]), 1);
        assert_eq!(parse_entity_ion(&data), Some(value));
    }

    #[test]
    fn test_create_raw_media_data() {
        let raw = vec![0xFF, 0xD8, 0xFF, 0xE0]; // JPEG header
        let data = create_raw_media_data(&raw).unwrap();

        assert_eq!(&data[..4], b"ENTY");
        assert!(data.ends_with(&raw));
    }

    #[test]
    fn test_serialize_annotated_ion() {
        let value = IonValue::List(vec![IonValue::String("symbol1".into())]);
        let data = serialize_annotated_ion(sym::ION_SYMBOL_TABLE, &value, None).unwrap();

        // Should start with Ion BVM
        assert_eq!(&data[..4], &[0xe0, 0x01, 0x00, 0xea]);
    }

    #[test]
    fn test_unregistered_name_fails() {
        let value = IonValue::structure()
            .set_symbol_name(sym::SECTION_NAME, "c0")
            .build();
        let symtab = LocalSymbolTable::new();
        assert!(create_entity_data(&value, Some(&symtab)).is_err());
    }

    #[test]
    fn test_serialize_graph() {
        let mut symtab = LocalSymbolTable::new();
        let c0 = symtab.register("c0");

        let mut graph = FragmentGraph::new();
        graph
            .add(Fragment::named(
                sym::SECTION,
                "c0",
                IonValue::structure()
                    .set_symbol_name(sym::SECTION_NAME, "c0")
                    .build(),
            ))
            .unwrap();
        graph
            .add(Fragment::root(
                sym::RESOURCE_PATH,
                IonValue::structure().set_list(sym::ENTRIES, vec![]).build(),
            ))
            .unwrap();
        graph
            .add(Fragment::root(
                sym::FORMAT_CAPABILITIES,
                IonValue::List(vec![]),
            ))
            .unwrap();

        let data = serialize_graph(&graph, &symtab, "CR!TEST", "kfxbuild").unwrap();
        assert_eq!(&data[..4], b"CONT");

        let entities = parse_kfx_container(&data);
        assert!(!entities.contains_key(&sym::FORMAT_CAPABILITIES));
        let sections = &entities[&sym::SECTION];
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].0, c0);
        let section = parse_entity_ion(&sections[0].1).unwrap();
        assert_eq!(section.get(sym::SECTION_NAME), Some(&IonValue::Symbol(c0)));
        assert_eq!(entities[&sym::RESOURCE_PATH][0].0, sym::RESOURCE_PATH);

        let text = String::from_utf8_lossy(&data);
        assert!(text.contains("kfxgen_acr,value:CR!TEST"));
        assert!(text.contains("kfxgen_application_version,value:kfxbuild"));
    }
}
