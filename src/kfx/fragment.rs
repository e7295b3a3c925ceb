//! KFX fragment representation and the per-document fragment graph.
//!
//! A fragment is the fundamental unit of KFX content. Root fragments are
//! singletons whose id is their own type; every other fragment is addressed
//! by a name that becomes a local symbol when the container is written.

use std::collections::HashMap;

use super::ion::IonValue;
use super::symbols::{RAW_FRAGMENT_TYPES, SymbolId};
use crate::error::{Error, Result};

/// A KFX fragment - the fundamental unit of KFX content.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// Fragment type (symbol ID like $260, $164, etc.)
    pub ftype: SymbolId,
    /// Fragment ID; equals `ftype` for root fragments and is 0 otherwise
    pub fid: SymbolId,
    /// Fragment name for non-root fragments, resolved to a symbol on write
    pub fid_name: Option<String>,
    /// The payload: structured data, or `IonValue::Raw` for media
    pub value: IonValue,
}

impl Fragment {
    /// Create a root (singleton) fragment.
    pub fn root(ftype: SymbolId, value: IonValue) -> Self {
        Self {
            ftype,
            fid: ftype,
            fid_name: None,
            value,
        }
    }

    /// Create a named, non-root fragment.
    pub fn named(ftype: SymbolId, name: impl Into<String>, value: IonValue) -> Self {
        Self {
            ftype,
            fid: 0,
            fid_name: Some(name.into()),
            value,
        }
    }

    /// Create a named fragment with raw binary data (images, fonts).
    pub fn raw(ftype: SymbolId, name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::named(ftype, name, IonValue::Raw(bytes))
    }

    /// Check if this is a root (singleton) fragment.
    pub fn is_root(&self) -> bool {
        self.fid != 0
    }

    /// Check if this fragment carries raw bytes instead of Ion.
    pub fn is_raw(&self) -> bool {
        matches!(self.value, IonValue::Raw(_)) || RAW_FRAGMENT_TYPES.contains(&self.ftype)
    }

    /// Name used to address this fragment: its `fid_name`, or `$N` for roots.
    pub fn id_name(&self) -> String {
        match &self.fid_name {
            Some(name) => name.clone(),
            None => format!("${}", self.fid),
        }
    }
}

/// Insertion-ordered collection of the fragments of one document.
///
/// At most one root fragment per type, and at most one non-root fragment per
/// `(type, name)` pair.
#[derive(Debug, Clone, Default)]
pub struct FragmentGraph {
    fragments: Vec<Fragment>,
    /// Root type -> index
    roots: HashMap<SymbolId, usize>,
    /// (type, name) -> index
    named: HashMap<(SymbolId, String), usize>,
}

impl FragmentGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment.
    ///
    /// Fails with [`Error::DuplicateRootFragment`] when a root of the same type
    /// is already present, and with [`Error::DuplicateFragment`] when a
    /// non-root fragment of the same type and name is.
    pub fn add(&mut self, fragment: Fragment) -> Result<()> {
        let idx = self.fragments.len();
        if fragment.is_root() {
            if self.roots.contains_key(&fragment.ftype) {
                return Err(Error::DuplicateRootFragment {
                    ftype: fragment.ftype,
                });
            }
            self.roots.insert(fragment.ftype, idx);
        } else {
            let key = (fragment.ftype, fragment.id_name());
            if self.named.contains_key(&key) {
                return Err(Error::DuplicateFragment {
                    ftype: key.0,
                    name: key.1,
                });
            }
            self.named.insert(key, idx);
        }
        self.fragments.push(fragment);
        Ok(())
    }

    /// Look up a non-root fragment by type and name.
    pub fn get(&self, ftype: SymbolId, name: &str) -> Option<&Fragment> {
        self.named
            .get(&(ftype, name.to_string()))
            .map(|&idx| &self.fragments[idx])
    }

    /// All fragments of a type, in insertion order.
    pub fn get_by_type(&self, ftype: SymbolId) -> Vec<&Fragment> {
        self.fragments.iter().filter(|f| f.ftype == ftype).collect()
    }

    /// The singleton root of a type, if present.
    pub fn get_root(&self, ftype: SymbolId) -> Option<&Fragment> {
        self.roots.get(&ftype).map(|&idx| &self.fragments[idx])
    }

    /// Every fragment, in insertion order.
    pub fn all(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Remove a non-root fragment (or a root, with `name` of `$N`).
    pub fn remove(&mut self, ftype: SymbolId, name: &str) -> Option<Fragment> {
        let idx = self
            .fragments
            .iter()
            .position(|f| f.ftype == ftype && f.id_name() == name)?;
        let removed = self.fragments.remove(idx);
        self.reindex();
        Some(removed)
    }

    /// Distinct fragment types present, sorted.
    pub fn types(&self) -> Vec<SymbolId> {
        let mut types: Vec<SymbolId> = self.fragments.iter().map(|f| f.ftype).collect();
        types.sort_unstable();
        types.dedup();
        types
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    fn reindex(&mut self) {
        self.roots.clear();
        self.named.clear();
        for (idx, fragment) in self.fragments.iter().enumerate() {
            if fragment.is_root() {
                self.roots.insert(fragment.ftype, idx);
            } else {
                self.named.insert((fragment.ftype, fragment.id_name()), idx);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kfx::symbols::sym;

    #[test]
    fn test_fragment_root() {
        let frag = Fragment::root(sym::METADATA, IonValue::Null);
        assert!(frag.is_root());
        assert_eq!(frag.fid, frag.ftype);
        assert_eq!(frag.id_name(), "$258");
    }

    #[test]
    fn test_fragment_named() {
        let frag = Fragment::named(sym::SECTION, "c0", IonValue::Null);
        assert_eq!(frag.fid, 0);
        assert!(!frag.is_root());
        assert!(!frag.is_raw());
        assert_eq!(frag.id_name(), "c0");
    }

    #[test]
    fn test_fragment_raw() {
        let data = vec![0xFF, 0xD8, 0xFF, 0xE0]; // JPEG header
        let frag = Fragment::raw(sym::RAW_MEDIA, "resource/rsrc1", data.clone());
        assert!(frag.is_raw());
        assert_eq!(frag.value.as_raw(), Some(data.as_slice()));
    }

    #[test]
    fn test_duplicate_root_rejected() {
        let mut graph = FragmentGraph::new();
        graph
            .add(Fragment::root(sym::BOOK_NAVIGATION, IonValue::List(vec![])))
            .unwrap();
        let err = graph
            .add(Fragment::root(sym::BOOK_NAVIGATION, IonValue::List(vec![])))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateRootFragment { ftype } if ftype == sym::BOOK_NAVIGATION
        ));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_named_fragments_share_type() {
        let mut graph = FragmentGraph::new();
        for name in ["s1", "s2", "s3"] {
            graph
                .add(Fragment::named(sym::STYLE, name, IonValue::Null))
                .unwrap();
        }
        let styles = graph.get_by_type(sym::STYLE);
        assert_eq!(styles.len(), 3);
        assert_eq!(styles[1].fid_name.as_deref(), Some("s2"));
        assert!(graph.get(sym::STYLE, "s3").is_some());
        assert!(graph.get_root(sym::STYLE).is_none());

        let err = graph
            .add(Fragment::named(sym::STYLE, "s1", IonValue::Null))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateFragment { name, .. } if name == "s1"));
    }

    #[test]
    fn test_all_preserves_insertion_order() {
        let mut graph = FragmentGraph::new();
        graph
            .add(Fragment::root(sym::DOCUMENT_DATA, IonValue::Null))
            .unwrap();
        graph
            .add(Fragment::named(sym::SECTION, "c0", IonValue::Null))
            .unwrap();
        graph
            .add(Fragment::root(sym::METADATA, IonValue::Null))
            .unwrap();

        let order: Vec<_> = graph.all().iter().map(|f| f.ftype).collect();
        assert_eq!(order, vec![sym::DOCUMENT_DATA, sym::SECTION, sym::METADATA]);
        assert_eq!(
            graph.types(),
            vec![sym::METADATA, sym::SECTION, sym::DOCUMENT_DATA]
        );
    }

    #[test]
    fn test_remove_then_readd() {
        let mut graph = FragmentGraph::new();
        graph
            .add(Fragment::named(sym::SECTION, "c0", IonValue::Null))
            .unwrap();
        graph
            .add(Fragment::root(sym::METADATA, IonValue::Null))
            .unwrap();

        assert!(graph.remove(sym::SECTION, "c0").is_some());
        assert!(graph.get(sym::SECTION, "c0").is_none());
        assert!(graph.get_root(sym::METADATA).is_some());

        graph
            .add(Fragment::named(sym::SECTION, "c0", IonValue::Int(1)))
            .unwrap();
        assert_eq!(
            graph.get(sym::SECTION, "c0").map(|f| &f.value),
            Some(&IonValue::Int(1))
        );
    }
}
