//! KFX (KF10) fragment encoding.
//!
//! A KFX book is a set of Ion-encoded fragments packed into a `CONT`
//! container. This module builds those fragments for one book and
//! serializes them.
//!
//! ## Module structure
//!
//! - `ion` - Amazon Ion values plus a binary writer and reader
//! - `symbols` - system symbol catalog and the document-local symbol table
//! - `fragment` - fragments and the graph that holds them
//! - `builders` - pure builders for the document-level fragments
//! - `navigation` - TOC, landmarks and approximate page list
//! - `style` - CSS rule to KFX style compilation
//! - `style_registry` - named styles and pseudo-element content
//! - `builder` - [`KfxBookBuilder`], the pipeline tying the above together
//! - `serialization` - `CONT`/`ENTY` container serialization

pub mod builder;
pub mod builders;
pub mod fragment;
pub mod ion;
pub mod navigation;
pub mod serialization;
pub mod style;
pub mod style_registry;
pub mod symbols;
pub mod test_helpers;

pub use builder::{BuildOutput, KfxBookBuilder};
pub use fragment::{Fragment, FragmentGraph};
pub use ion::{Decimal, IonValue, StructBuilder};
pub use navigation::{PageEntry, calculate_approximate_pages};
pub use serialization::{container_id_for, serialize_graph};
pub use style::{Style, StyleValue};
pub use style_registry::{PseudoContent, StyleRegistry};
pub use symbols::{LocalSymbolTable, SymbolId, sym};
