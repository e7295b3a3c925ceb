//! Test helpers for KFX parsing.
//!
//! These utilities are used by both unit tests and integration tests
//! for verifying KFX container structure.

use std::collections::HashMap;

use super::ion::{IonParser, IonValue};

const ION_MAGIC: [u8; 4] = [0xE0, 0x01, 0x00, 0xEA];

fn read_u32(data: &[u8], pos: usize) -> Option<u32> {
    Some(u32::from_le_bytes(data.get(pos..pos + 4)?.try_into().ok()?))
}

fn read_u64(data: &[u8], pos: usize) -> Option<u64> {
    Some(u64::from_le_bytes(data.get(pos..pos + 8)?.try_into().ok()?))
}

/// Parse KFX container and extract entities by type.
/// Returns map of entity_type -> [(id, payload)]
pub fn parse_kfx_container(data: &[u8]) -> HashMap<u32, Vec<(u32, Vec<u8>)>> {
    let mut entities: HashMap<u32, Vec<(u32, Vec<u8>)>> = HashMap::new();
    if data.len() < 18 || &data[0..4] != b"CONT" {
        return entities;
    }
    let Some(header_len) = read_u32(data, 6) else {
        return entities;
    };
    let header_len = header_len as usize;

    let mut pos = 18;
    while pos + 24 <= data.len() && data[pos..pos + 4] != ION_MAGIC {
        let (Some(id), Some(etype), Some(offset), Some(length)) = (
            read_u32(data, pos),
            read_u32(data, pos + 4),
            read_u64(data, pos + 8),
            read_u64(data, pos + 16),
        ) else {
            break;
        };

        let start = header_len + offset as usize;
        if let Some(payload) = data.get(start..start + length as usize) {
            entities.entry(etype).or_default().push((id, payload.to_vec()));
        }
        pos += 24;
    }
    entities
}

/// Entity ids of one type, in container order.
pub fn entity_ids(entities: &HashMap<u32, Vec<(u32, Vec<u8>)>>, etype: u32) -> Vec<u32> {
    entities
        .get(&etype)
        .map(|list| list.iter().map(|(id, _)| *id).collect())
        .unwrap_or_default()
}

/// Parse entity payload to ION (skips ENTY header)
pub fn parse_entity_ion(payload: &[u8]) -> Option<IonValue> {
    if payload.len() < 10 || &payload[0..4] != b"ENTY" {
        return None;
    }
    let header_len = read_u32(payload, 6)? as usize;
    if header_len >= payload.len() {
        return None;
    }
    IonParser::new(&payload[header_len..]).parse().ok()
}

/// Raw bytes of an entity payload (skips ENTY header)
pub fn entity_body(payload: &[u8]) -> Option<&[u8]> {
    if payload.len() < 10 || &payload[0..4] != b"ENTY" {
        return None;
    }
    let header_len = read_u32(payload, 6)? as usize;
    payload.get(header_len..)
}
