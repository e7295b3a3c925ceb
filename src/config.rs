//! Format-level configuration for a KFX build.

/// Configuration knobs that are not part of the book itself.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(default))]
pub struct KfxConfig {
    /// Runes per approximate page; 0 disables the page list.
    pub page_size: usize,
    /// Version carried by the reflow-section-size conversion feature.
    pub reflow_section_size: i64,
    /// Landmark targets.
    pub landmarks: LandmarkInfo,
    /// Application name written into the container's kfxgen info.
    pub application_name: String,
}

impl Default for KfxConfig {
    fn default() -> Self {
        Self {
            page_size: 0,
            reflow_section_size: 1,
            landmarks: LandmarkInfo::default(),
            application_name: env!("CARGO_PKG_NAME").to_string(),
        }
    }
}

impl KfxConfig {
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_landmarks(mut self, landmarks: LandmarkInfo) -> Self {
        self.landmarks = landmarks;
        self
    }
}

/// Element ids of the landmark triad. Zero means absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(default))]
pub struct LandmarkInfo {
    pub cover_eid: i64,
    pub toc_eid: i64,
    /// Label of the TOC landmark; "Table of Contents" when empty
    pub toc_label: String,
    pub start_eid: i64,
}

impl LandmarkInfo {
    /// True when no landmark is set.
    pub fn is_empty(&self) -> bool {
        self.cover_eid <= 0 && self.toc_eid <= 0 && self.start_eid <= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = KfxConfig::default();
        assert_eq!(cfg.page_size, 0);
        assert_eq!(cfg.reflow_section_size, 1);
        assert_eq!(cfg.application_name, "kfxbuild");
        assert!(cfg.landmarks.is_empty());
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_partial_json() {
        let cfg: KfxConfig =
            serde_json::from_str(r#"{"page_size": 1000, "landmarks": {"toc_eid": 7}}"#).unwrap();
        assert_eq!(cfg.page_size, 1000);
        assert_eq!(cfg.reflow_section_size, 1);
        assert_eq!(cfg.landmarks.toc_eid, 7);
        assert!(!cfg.landmarks.is_empty());
    }
}
