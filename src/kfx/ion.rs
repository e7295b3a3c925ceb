//! Structured values and the Amazon Ion binary profile used by KFX.
//!
//! [`IonValue`] is the closed set of value shapes a fragment can carry.
//! [`StructBuilder`] composes structs keyed by well-known symbols, keeping
//! insertion order so serialized bytes are reproducible. [`IonWriter`] and
//! [`IonParser`] implement the small part of Ion binary that KFX needs.
//!
//! Reference: <https://amazon-ion.github.io/ion-docs/docs/binary.html>

use std::fmt;
use std::io;

use crate::error::{Error, Result};
use crate::kfx::symbols::{LocalSymbolTable, SymbolId};

/// Ion binary version marker (BVM)
pub const ION_MAGIC: [u8; 4] = [0xe0, 0x01, 0x00, 0xea];

/// Ion type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum IonType {
    Null = 0,
    Bool = 1,
    PosInt = 2,
    NegInt = 3,
    Float = 4,
    Decimal = 5,
    Timestamp = 6,
    Symbol = 7,
    String = 8,
    Clob = 9,
    Blob = 10,
    List = 11,
    Sexp = 12,
    Struct = 13,
    Annotation = 14,
}

impl IonType {
    fn from_nibble(n: u8) -> Option<Self> {
        match n {
            0 => Some(IonType::Null),
            1 => Some(IonType::Bool),
            2 => Some(IonType::PosInt),
            3 => Some(IonType::NegInt),
            4 => Some(IonType::Float),
            5 => Some(IonType::Decimal),
            6 => Some(IonType::Timestamp),
            7 => Some(IonType::Symbol),
            8 => Some(IonType::String),
            9 => Some(IonType::Clob),
            10 => Some(IonType::Blob),
            11 => Some(IonType::List),
            12 => Some(IonType::Sexp),
            13 => Some(IonType::Struct),
            14 => Some(IonType::Annotation),
            _ => None, // Reserved (15)
        }
    }
}

// ============================================================================
// Decimal
// ============================================================================

/// An exact decimal: `coefficient * 10^exponent`.
///
/// KFX layout values such as a 1.2 line height are Ion decimals, not floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decimal {
    pub coefficient: i64,
    pub exponent: i32,
}

impl Decimal {
    pub const fn new(coefficient: i64, exponent: i32) -> Self {
        Self {
            coefficient,
            exponent,
        }
    }

    /// Convert from a float using its shortest round-trip decimal form.
    ///
    /// Non-finite inputs become zero.
    pub fn from_f64(value: f64) -> Self {
        if !value.is_finite() || value == 0.0 {
            return Self::new(0, 0);
        }
        let text = format!("{value}");
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.as_str()),
        };
        let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
        let frac_part = frac_part.trim_end_matches('0');
        let joined = format!("{int_part}{frac_part}");

        match joined.parse::<i64>() {
            Ok(magnitude) => {
                let mut decimal = Self::new(
                    if negative { -magnitude } else { magnitude },
                    -(frac_part.len() as i32),
                );
                decimal.normalize();
                decimal
            }
            // Too many significant digits for i64: keep the integral part.
            Err(_) => Self::new(value.round() as i64, 0),
        }
    }

    /// Strip trailing zeros from the coefficient of an integral value.
    fn normalize(&mut self) {
        while self.coefficient != 0 && self.coefficient % 10 == 0 && self.exponent < 0 {
            self.coefficient /= 10;
            self.exponent += 1;
        }
    }

    pub fn to_f64(self) -> f64 {
        self.coefficient as f64 * 10f64.powi(self.exponent)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.coefficient, self.exponent)
    }
}

impl From<f64> for Decimal {
    fn from(value: f64) -> Self {
        Decimal::from_f64(value)
    }
}

// ============================================================================
// Values
// ============================================================================

/// A structured value.
///
/// Symbols are stored as raw IDs; `SymbolByName` holds a local symbol name
/// that is resolved against a [`LocalSymbolTable`] when written. Structs keep
/// their fields as `(symbol_id, value)` pairs in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub enum IonValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    /// Symbol ID (system or document-local)
    Symbol(SymbolId),
    /// Symbol referenced by name, pending resolution
    SymbolByName(String),
    String(String),
    Blob(Vec<u8>),
    /// Opaque bytes. Stored verbatim as a fragment payload, written as a blob
    /// when nested inside another value.
    Raw(Vec<u8>),
    List(Vec<IonValue>),
    /// Struct fields as (symbol_id, value) pairs in insertion order
    Struct(Vec<(SymbolId, IonValue)>),
    /// Annotated value: (annotation symbol IDs, inner value)
    Annotated(Vec<SymbolId>, Box<IonValue>),
}

impl IonValue {
    /// Start building a struct.
    pub fn structure() -> StructBuilder {
        StructBuilder::new()
    }

    /// Wrap a value in a single annotation.
    pub fn annotated(annotation: SymbolId, value: IonValue) -> Self {
        IonValue::Annotated(vec![annotation], Box::new(value))
    }

    /// Get as string if this is a String value.
    #[inline]
    pub fn as_string(&self) -> Option<&str> {
        match self {
            IonValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as i64 if this is an Int value.
    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            IonValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            IonValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            IonValue::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    /// Get as symbol ID if this is a Symbol value.
    #[inline]
    pub fn as_symbol(&self) -> Option<SymbolId> {
        match self {
            IonValue::Symbol(id) => Some(*id),
            _ => None,
        }
    }

    /// Get the pending name if this is a SymbolByName value.
    #[inline]
    pub fn as_symbol_name(&self) -> Option<&str> {
        match self {
            IonValue::SymbolByName(name) => Some(name),
            _ => None,
        }
    }

    /// Get as list if this is a List value.
    #[inline]
    pub fn as_list(&self) -> Option<&[IonValue]> {
        match self {
            IonValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get struct fields if this is a Struct value.
    #[inline]
    pub fn as_struct(&self) -> Option<&[(SymbolId, IonValue)]> {
        match self {
            IonValue::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    #[inline]
    pub fn as_raw(&self) -> Option<&[u8]> {
        match self {
            IonValue::Raw(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Get field from struct by symbol ID. O(n) scan - optimal for small structs.
    #[inline]
    pub fn get(&self, symbol_id: SymbolId) -> Option<&IonValue> {
        self.unwrap_annotated()
            .as_struct()?
            .iter()
            .find(|(k, _)| *k == symbol_id)
            .map(|(_, v)| v)
    }

    /// Annotations on this value, outermost first.
    pub fn annotations(&self) -> &[SymbolId] {
        match self {
            IonValue::Annotated(annotations, _) => annotations,
            _ => &[],
        }
    }

    /// Unwrap annotated value to get inner value.
    pub fn unwrap_annotated(&self) -> &IonValue {
        match self {
            IonValue::Annotated(_, inner) => inner.unwrap_annotated(),
            other => other,
        }
    }

    /// Visit every `SymbolByName` reference in this value, depth first.
    pub fn for_each_symbol_name<'a>(&'a self, visit: &mut impl FnMut(&'a str)) {
        match self {
            IonValue::SymbolByName(name) => visit(name),
            IonValue::List(items) => {
                for item in items {
                    item.for_each_symbol_name(visit);
                }
            }
            IonValue::Struct(fields) => {
                for (_, value) in fields {
                    value.for_each_symbol_name(visit);
                }
            }
            IonValue::Annotated(_, inner) => inner.for_each_symbol_name(visit),
            IonValue::Null
            | IonValue::Bool(_)
            | IonValue::Int(_)
            | IonValue::Float(_)
            | IonValue::Decimal(_)
            | IonValue::Symbol(_)
            | IonValue::String(_)
            | IonValue::Blob(_)
            | IonValue::Raw(_) => {}
        }
    }
}

impl From<&str> for IonValue {
    fn from(s: &str) -> Self {
        IonValue::String(s.to_string())
    }
}

impl From<String> for IonValue {
    fn from(s: String) -> Self {
        IonValue::String(s)
    }
}

impl From<i64> for IonValue {
    fn from(n: i64) -> Self {
        IonValue::Int(n)
    }
}

impl From<bool> for IonValue {
    fn from(b: bool) -> Self {
        IonValue::Bool(b)
    }
}

impl From<Decimal> for IonValue {
    fn from(d: Decimal) -> Self {
        IonValue::Decimal(d)
    }
}

impl From<Vec<IonValue>> for IonValue {
    fn from(items: Vec<IonValue>) -> Self {
        IonValue::List(items)
    }
}

impl From<StructBuilder> for IonValue {
    fn from(builder: StructBuilder) -> Self {
        builder.build()
    }
}

// ============================================================================
// Struct Builder
// ============================================================================

/// Fluent builder for struct values.
///
/// Setting a key that is already present overwrites its value in place, so
/// field order is the order keys were first set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructBuilder {
    fields: Vec<(SymbolId, IonValue)>,
}

impl StructBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: SymbolId, value: impl Into<IonValue>) -> Self {
        self.insert(key, value.into());
        self
    }

    pub fn set_str(self, key: SymbolId, value: impl Into<String>) -> Self {
        self.set(key, IonValue::String(value.into()))
    }

    pub fn set_int(self, key: SymbolId, value: i64) -> Self {
        self.set(key, IonValue::Int(value))
    }

    pub fn set_bool(self, key: SymbolId, value: bool) -> Self {
        self.set(key, IonValue::Bool(value))
    }

    pub fn set_decimal(self, key: SymbolId, value: Decimal) -> Self {
        self.set(key, IonValue::Decimal(value))
    }

    pub fn set_symbol(self, key: SymbolId, value: SymbolId) -> Self {
        self.set(key, IonValue::Symbol(value))
    }

    pub fn set_symbol_name(self, key: SymbolId, name: impl Into<String>) -> Self {
        self.set(key, IonValue::SymbolByName(name.into()))
    }

    pub fn set_list(self, key: SymbolId, items: Vec<IonValue>) -> Self {
        self.set(key, IonValue::List(items))
    }

    pub fn set_struct(self, key: SymbolId, value: StructBuilder) -> Self {
        self.set(key, value.build())
    }

    /// In-place variant of [`StructBuilder::set`].
    pub fn insert(&mut self, key: SymbolId, value: IonValue) {
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: SymbolId) -> Option<&IonValue> {
        self.fields.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn has_key(&self, key: SymbolId) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: SymbolId) -> Option<IonValue> {
        let idx = self.fields.iter().position(|(k, _)| *k == key)?;
        Some(self.fields.remove(idx).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.fields.iter().map(|(k, _)| *k)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn build(self) -> IonValue {
        IonValue::Struct(self.fields)
    }
}

// ============================================================================
// Writer
// ============================================================================

/// Ion binary writer.
///
/// `SymbolByName` values are resolved through the attached symbol table;
/// writing one without a table, or with a table that lacks the name, fails
/// with [`Error::UnknownSymbol`]. With a table attached, a symbol id past its
/// `max_id` fails with [`Error::UnknownSymbolId`].
#[derive(Debug, Default)]
pub struct IonWriter<'a> {
    buf: Vec<u8>,
    symbols: Option<&'a LocalSymbolTable>,
}

impl<'a> IonWriter<'a> {
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            symbols: None,
        }
    }

    /// Create a writer that resolves symbol names through `symbols`.
    pub fn with_symbols(symbols: &'a LocalSymbolTable) -> Self {
        Self {
            buf: Vec::new(),
            symbols: Some(symbols),
        }
    }

    /// Write the binary version marker.
    pub fn write_bvm(&mut self) {
        self.buf.extend_from_slice(&ION_MAGIC);
    }

    /// Write one top-level value.
    pub fn write_value(&mut self, value: &IonValue) -> Result<()> {
        let mut out = Vec::new();
        self.encode(value, &mut out)?;
        self.buf.extend_from_slice(&out);
        Ok(())
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    fn encode(&self, value: &IonValue, out: &mut Vec<u8>) -> Result<()> {
        match value {
            IonValue::Null => out.push(0x0f),
            IonValue::Bool(b) => out.push(0x10 | u8::from(*b)),
            IonValue::Int(n) => {
                let magnitude = uint_bytes(n.unsigned_abs());
                let code = if *n < 0 { IonType::NegInt } else { IonType::PosInt };
                write_header(out, code, magnitude.len());
                out.extend_from_slice(&magnitude);
            }
            IonValue::Float(f) => {
                if *f == 0.0 && f.is_sign_positive() {
                    write_header(out, IonType::Float, 0);
                } else {
                    write_header(out, IonType::Float, 8);
                    out.extend_from_slice(&f.to_be_bytes());
                }
            }
            IonValue::Decimal(d) => {
                if d.coefficient == 0 && d.exponent == 0 {
                    write_header(out, IonType::Decimal, 0);
                } else {
                    let mut body = Vec::new();
                    write_varint(&mut body, i64::from(d.exponent));
                    if d.coefficient != 0 {
                        body.extend_from_slice(&signed_int_bytes(d.coefficient));
                    }
                    write_header(out, IonType::Decimal, body.len());
                    out.extend_from_slice(&body);
                }
            }
            IonValue::Symbol(id) => {
                self.check_id(*id)?;
                self.encode_symbol(*id, out);
            }
            IonValue::SymbolByName(name) => {
                let id = self.resolve(name)?;
                self.encode_symbol(id, out);
            }
            IonValue::String(s) => {
                write_header(out, IonType::String, s.len());
                out.extend_from_slice(s.as_bytes());
            }
            IonValue::Blob(bytes) | IonValue::Raw(bytes) => {
                write_header(out, IonType::Blob, bytes.len());
                out.extend_from_slice(bytes);
            }
            IonValue::List(items) => {
                let mut body = Vec::new();
                for item in items {
                    self.encode(item, &mut body)?;
                }
                write_header(out, IonType::List, body.len());
                out.extend_from_slice(&body);
            }
            IonValue::Struct(fields) => {
                let mut body = Vec::new();
                for (key, field) in fields {
                    write_varuint(&mut body, u64::from(*key));
                    self.encode(field, &mut body)?;
                }
                write_header(out, IonType::Struct, body.len());
                out.extend_from_slice(&body);
            }
            IonValue::Annotated(annotations, inner) => {
                let mut ann = Vec::new();
                for annotation in annotations {
                    write_varuint(&mut ann, u64::from(*annotation));
                }
                let mut body = Vec::new();
                write_varuint(&mut body, ann.len() as u64);
                body.extend_from_slice(&ann);
                self.encode(inner, &mut body)?;
                write_header(out, IonType::Annotation, body.len());
                out.extend_from_slice(&body);
            }
        }
        Ok(())
    }

    fn encode_symbol(&self, id: SymbolId, out: &mut Vec<u8>) {
        let bytes = uint_bytes(u64::from(id));
        write_header(out, IonType::Symbol, bytes.len());
        out.extend_from_slice(&bytes);
    }

    /// With a table attached, a symbol id must be one the table declares.
    fn check_id(&self, id: SymbolId) -> Result<()> {
        match self.symbols {
            Some(symbols) if id > symbols.max_id() => Err(Error::UnknownSymbolId(id)),
            _ => Ok(()),
        }
    }

    fn resolve(&self, name: &str) -> Result<SymbolId> {
        match self.symbols {
            Some(symbols) => symbols.id_of(name),
            None => Err(Error::UnknownSymbol(name.to_string())),
        }
    }
}

/// Serialize a single value with a leading BVM.
pub fn to_binary(value: &IonValue, symbols: Option<&LocalSymbolTable>) -> Result<Vec<u8>> {
    let mut writer = match symbols {
        Some(symbols) => IonWriter::with_symbols(symbols),
        None => IonWriter::new(),
    };
    writer.write_bvm();
    writer.write_value(value)?;
    Ok(writer.into_bytes())
}

fn write_header(out: &mut Vec<u8>, code: IonType, len: usize) {
    let type_bits = (code as u8) << 4;
    if len < 14 {
        out.push(type_bits | len as u8);
    } else {
        out.push(type_bits | 14);
        write_varuint(out, len as u64);
    }
}

/// Write a VarUInt (7 bits per byte, MSB set on last byte).
fn write_varuint(out: &mut Vec<u8>, mut value: u64) {
    let mut groups = vec![(value & 0x7f) as u8 | 0x80];
    value >>= 7;
    while value > 0 {
        groups.push((value & 0x7f) as u8);
        value >>= 7;
    }
    out.extend(groups.iter().rev());
}

/// Write a VarInt (sign in bit 6 of the first byte, MSB set on last byte).
fn write_varint(out: &mut Vec<u8>, value: i64) {
    let mut magnitude = value.unsigned_abs();
    let mut groups = vec![(magnitude & 0x7f) as u8];
    magnitude >>= 7;
    while magnitude > 0 {
        groups.push((magnitude & 0x7f) as u8);
        magnitude >>= 7;
    }
    // The leading byte only has six magnitude bits.
    if groups.last().is_some_and(|b| b & 0x40 != 0) {
        groups.push(0);
    }
    groups.reverse();
    if value < 0 {
        groups[0] |= 0x40;
    }
    if let Some(last) = groups.last_mut() {
        *last |= 0x80;
    }
    out.extend_from_slice(&groups);
}

/// Minimal big-endian bytes of an unsigned integer (empty for zero).
fn uint_bytes(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    bytes[skip..].to_vec()
}

/// Sign-and-magnitude big-endian bytes of a non-zero integer.
fn signed_int_bytes(value: i64) -> Vec<u8> {
    let mut bytes = uint_bytes(value.unsigned_abs());
    if bytes.first().is_some_and(|b| b & 0x80 != 0) {
        bytes.insert(0, 0);
    }
    if value < 0 {
        bytes[0] |= 0x80;
    }
    bytes
}

// ============================================================================
// Parser
// ============================================================================

/// Ion binary parser.
pub struct IonParser<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> IonParser<'a> {
    /// Create a new parser for the given data.
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Parse Ion data starting with the BVM marker.
    pub fn parse(&mut self) -> io::Result<IonValue> {
        if self.data.len() < 4 || self.data[..4] != ION_MAGIC {
            return Err(invalid("not Ion data (missing BVM)"));
        }
        self.pos = 4;
        self.parse_value()
    }

    /// Parse a single Ion value at current position.
    fn parse_value(&mut self) -> io::Result<IonValue> {
        if self.pos >= self.data.len() {
            return Ok(IonValue::Null);
        }

        let type_byte = self.data[self.pos];
        self.pos += 1;

        let type_code = type_byte >> 4;
        let length_code = type_byte & 0x0f;

        // Null is encoded as length_code 15 for any type
        if length_code == 15 {
            return Ok(IonValue::Null);
        }

        let ion_type = match IonType::from_nibble(type_code) {
            Some(t) => t,
            None => return Ok(IonValue::Null), // Reserved type
        };

        if ion_type == IonType::Bool {
            return Ok(IonValue::Bool(length_code != 0));
        }

        // Get actual length; a struct with length code 1 is a sorted struct
        // whose length follows as a VarUInt.
        let length = if length_code == 14 || (ion_type == IonType::Struct && length_code == 1) {
            self.read_varuint()? as usize
        } else {
            length_code as usize
        };

        match ion_type {
            IonType::Null => {
                // Type 0 with length > 0 is a NOP pad, skip the bytes
                self.read_bytes(length)?;
                Ok(IonValue::Null)
            }

            IonType::Bool => Ok(IonValue::Bool(length_code != 0)),

            IonType::PosInt => {
                let value = self.read_uint(length)?;
                if value > i64::MAX as u64 {
                    return Err(invalid("positive integer too large for i64"));
                }
                Ok(IonValue::Int(value as i64))
            }

            IonType::NegInt => {
                let value = self.read_uint(length)?;
                // i64::MIN has magnitude 2^63, which fits in u64 but not as positive i64.
                if value > (i64::MAX as u64) + 1 {
                    return Err(invalid("negative integer too large for i64"));
                }
                Ok(IonValue::Int((value as i64).wrapping_neg()))
            }

            IonType::Float => {
                let value = match length {
                    0 => 0.0, // Positive zero
                    4 => f32::from_be_bytes(self.read_array()?) as f64,
                    8 => f64::from_be_bytes(self.read_array()?),
                    _ => return Err(invalid("invalid float length")),
                };
                Ok(IonValue::Float(value))
            }

            IonType::Decimal => {
                if length == 0 {
                    return Ok(IonValue::Decimal(Decimal::new(0, 0)));
                }
                let end = self.pos + length;
                let exponent = self.read_varint()?;
                if self.pos > end {
                    return Err(invalid("decimal exponent overruns value"));
                }
                let coefficient = self.read_signed_int(end - self.pos)?;
                let exponent =
                    i32::try_from(exponent).map_err(|_| invalid("decimal exponent too large"))?;
                Ok(IonValue::Decimal(Decimal::new(coefficient, exponent)))
            }

            IonType::Timestamp => {
                // Skip - not used in KFX fragments
                self.read_bytes(length)?;
                Ok(IonValue::Null)
            }

            IonType::Symbol => {
                let symbol_id = self.read_uint(length)?;
                let symbol_id =
                    SymbolId::try_from(symbol_id).map_err(|_| invalid("symbol ID too large"))?;
                Ok(IonValue::Symbol(symbol_id))
            }

            IonType::String => {
                let bytes = self.read_bytes(length)?;
                let s = String::from_utf8_lossy(bytes).into_owned();
                Ok(IonValue::String(s))
            }

            IonType::Blob | IonType::Clob => {
                let bytes = self.read_bytes(length)?.to_vec();
                Ok(IonValue::Blob(bytes))
            }

            IonType::List | IonType::Sexp => {
                let end = self.pos + length;
                let mut items = Vec::new();
                while self.pos < end {
                    items.push(self.parse_value()?);
                }
                Ok(IonValue::List(items))
            }

            IonType::Struct => {
                let end = self.pos + length;
                let mut fields = Vec::new();
                while self.pos < end {
                    let field_name = self.read_varuint()?;
                    let value = self.parse_value()?;
                    fields.push((field_name, value));
                }
                Ok(IonValue::Struct(fields))
            }

            IonType::Annotation => {
                let end = self.pos + length;

                let ann_len = self.read_varuint()? as usize;
                let ann_end = self.pos + ann_len;

                let mut annotations = Vec::new();
                while self.pos < ann_end {
                    annotations.push(self.read_varuint()?);
                }

                let inner = if self.pos < end {
                    self.parse_value()?
                } else {
                    IonValue::Null
                };

                Ok(IonValue::Annotated(annotations, Box::new(inner)))
            }
        }
    }

    /// Read bytes from current position.
    #[inline]
    fn read_bytes(&mut self, len: usize) -> io::Result<&'a [u8]> {
        if self.pos + len > self.data.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "unexpected end of data",
            ));
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    #[inline]
    fn read_array<const N: usize>(&mut self) -> io::Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    #[inline]
    fn next_byte(&mut self) -> io::Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Read a VarUInt (7 bits per byte, MSB set on last byte).
    #[inline]
    fn read_varuint(&mut self) -> io::Result<u32> {
        let mut result: u32 = 0;
        loop {
            let byte = self.next_byte()?;
            result = (result << 7) | (byte & 0x7f) as u32;
            if byte & 0x80 != 0 {
                return Ok(result);
            }
        }
    }

    /// Read a VarInt (sign in bit 6 of the first byte).
    fn read_varint(&mut self) -> io::Result<i64> {
        let first = self.next_byte()?;
        let negative = first & 0x40 != 0;
        let mut magnitude = i64::from(first & 0x3f);
        let mut byte = first;
        while byte & 0x80 == 0 {
            byte = self.next_byte()?;
            magnitude = (magnitude << 7) | i64::from(byte & 0x7f);
        }
        Ok(if negative { -magnitude } else { magnitude })
    }

    /// Read unsigned integer (big-endian, up to 8 bytes).
    #[inline]
    fn read_uint(&mut self, len: usize) -> io::Result<u64> {
        if len == 0 {
            return Ok(0);
        }
        if len > 8 {
            return Err(invalid("integer too large (> 8 bytes)"));
        }
        let bytes = self.read_bytes(len)?;
        let mut result: u64 = 0;
        for &b in bytes {
            result = (result << 8) | b as u64;
        }
        Ok(result)
    }

    /// Read a sign-and-magnitude integer of `len` bytes.
    fn read_signed_int(&mut self, len: usize) -> io::Result<i64> {
        if len == 0 {
            return Ok(0);
        }
        if len > 8 {
            return Err(invalid("integer too large (> 8 bytes)"));
        }
        let bytes = self.read_bytes(len)?;
        let negative = bytes[0] & 0x80 != 0;
        let mut magnitude: u64 = u64::from(bytes[0] & 0x7f);
        for &b in &bytes[1..] {
            magnitude = (magnitude << 8) | u64::from(b);
        }
        let magnitude = i64::try_from(magnitude).map_err(|_| invalid("integer too large"))?;
        Ok(if negative { -magnitude } else { magnitude })
    }
}

fn invalid(msg: &'static str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}
