//! KFX book builder - assembles the fragment graph for one book.
//!
//! A single top-to-bottom pass:
//! 1. register every document-local symbol (sections, resources, styles,
//!    page list) so `max_id` is known up front
//! 2. document data, reading orders, metadata
//! 3. sections, external resources and raw media
//! 4. navigation and styles
//! 5. conversion features, format capabilities, resource path, book metadata
//! 6. the container entity map, listing everything above
//!
//! The builders it calls are pure; this is the only layer that owns the
//! [`FragmentGraph`] and the [`LocalSymbolTable`].

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::book::{BookSummary, PositionItem, ResourceInfo, TocEntry};
use crate::config::KfxConfig;
use crate::css::Stylesheet;
use crate::error::Result;

use super::builders::{
    BookMetadataInput, EntityDependency, build_book_metadata, build_content_features,
    build_document_data, build_entity_map, build_external_resource, build_format_capabilities,
    build_metadata, build_reading_orders, build_resource_path, build_section, image_format_symbol,
    resource_location, resource_name,
};
use super::fragment::{Fragment, FragmentGraph};
use super::navigation::{APPROXIMATE_PAGE_LIST, build_book_navigation};
use super::serialization::{container_id_for, serialize_graph};
use super::style_registry::StyleRegistry;
use super::symbols::{CONTAINER_FRAGMENT_TYPES, LocalSymbolTable, SymbolId, sym};

/// Everything a build produces.
#[derive(Debug)]
pub struct BuildOutput {
    pub graph: FragmentGraph,
    pub symtab: LocalSymbolTable,
    /// Non-fatal problems: skipped CSS, unsupported resources
    pub warnings: Vec<String>,
    pub container_id: String,
    pub application_name: String,
}

impl BuildOutput {
    /// Serialize the graph into container bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serialize_graph(
            &self.graph,
            &self.symtab,
            &self.container_id,
            &self.application_name,
        )
    }

    /// Serialize the graph and write it to `path`.
    pub fn write_kfx(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = self.to_bytes()?;
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&data)?;
        writer.flush()?;
        Ok(())
    }
}

/// A resource that will be emitted.
struct PlannedResource<'a> {
    source_id: &'a str,
    name: String,
    location: String,
    format: SymbolId,
    info: &'a ResourceInfo,
}

/// Builder for the fragment graph of one book.
pub struct KfxBookBuilder<'a> {
    book: &'a BookSummary,
    toc: &'a [TocEntry],
    positions: &'a [PositionItem],
    stylesheet: Option<&'a Stylesheet>,
    config: KfxConfig,

    graph: FragmentGraph,
    symtab: LocalSymbolTable,
    warnings: Vec<String>,
    container_id: String,
    resources: Vec<PlannedResource<'a>>,
}

impl<'a> KfxBookBuilder<'a> {
    pub fn new(book: &'a BookSummary) -> Self {
        Self {
            book,
            toc: &[],
            positions: &[],
            stylesheet: None,
            config: KfxConfig::default(),
            graph: FragmentGraph::new(),
            symtab: LocalSymbolTable::new(),
            warnings: Vec::new(),
            container_id: container_id_for(&book.document_id),
            resources: Vec::new(),
        }
    }

    pub fn with_toc(mut self, toc: &'a [TocEntry]) -> Self {
        self.toc = toc;
        self
    }

    pub fn with_positions(mut self, positions: &'a [PositionItem]) -> Self {
        self.positions = positions;
        self
    }

    pub fn with_stylesheet(mut self, stylesheet: &'a Stylesheet) -> Self {
        self.stylesheet = Some(stylesheet);
        self
    }

    pub fn with_config(mut self, config: KfxConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the pipeline.
    pub fn build(mut self) -> Result<BuildOutput> {
        let registry = match self.stylesheet {
            Some(sheet) => {
                let (registry, warnings) = StyleRegistry::from_stylesheet(sheet);
                self.warnings.extend(warnings);
                registry
            }
            None => StyleRegistry::new(),
        };

        self.plan_resources();
        self.register_symbols(&registry);

        self.add_document_data()?;
        self.add_sections()?;
        self.add_resources()?;
        self.add_navigation()?;
        self.add_styles(&registry)?;
        self.add_content_features()?;
        self.add_format_capabilities()?;
        self.add_resource_path()?;
        self.add_book_metadata()?;
        self.add_container_entity_map()?;

        self.verify_symbols()?;

        tracing::info!(
            fragments = self.graph.len(),
            local_symbols = self.symtab.len(),
            warnings = self.warnings.len(),
            "built KFX fragment graph"
        );

        Ok(BuildOutput {
            graph: self.graph,
            symtab: self.symtab,
            warnings: self.warnings,
            container_id: self.container_id,
            application_name: self.config.application_name,
        })
    }

    /// Pick names and locations for every resource with a supported format.
    fn plan_resources(&mut self) {
        let book = self.book;
        let mut idx = 0;
        for (source_id, info) in &book.resources {
            let Some(format) = image_format_symbol(&info.mime) else {
                let warning = format!("unsupported resource format: {source_id} ({})", info.mime);
                tracing::warn!("{warning}");
                self.warnings.push(warning);
                continue;
            };
            idx += 1;
            let location = info
                .location
                .clone()
                .unwrap_or_else(|| resource_location(idx));
            self.resources.push(PlannedResource {
                source_id,
                name: resource_name(idx),
                location,
                format,
                info,
            });
        }
    }

    fn resource_name_for(&self, source_id: &str) -> Option<&str> {
        self.resources
            .iter()
            .find(|r| r.source_id == source_id)
            .map(|r| r.name.as_str())
    }

    fn has_page_list(&self) -> bool {
        self.config.page_size > 0 && !self.positions.is_empty()
    }

    /// Register every local name before any fragment references it.
    fn register_symbols(&mut self, registry: &StyleRegistry) {
        for section in &self.book.sections {
            self.symtab.register(&section.name);
        }
        for resource in &self.resources {
            self.symtab.register(&resource.name);
            if resource.info.data.is_some() {
                self.symtab.register(&resource.location);
            }
        }
        for (name, _) in registry.styles() {
            self.symtab.register(name);
        }
        if self.has_page_list() {
            self.symtab.register(APPROXIMATE_PAGE_LIST);
        }
        tracing::debug!(
            local_symbols = self.symtab.len(),
            max_id = self.symtab.max_id(),
            "registered local symbols"
        );
    }

    fn section_names(&self) -> Vec<&str> {
        self.book.section_names()
    }

    fn add_document_data(&mut self) -> Result<()> {
        let reading_orders = build_reading_orders(&self.section_names());
        let has_sections = !self.book.sections.is_empty();

        let document_data = build_document_data(reading_orders.clone(), self.symtab.max_id());
        self.graph
            .add(Fragment::root(sym::DOCUMENT_DATA, document_data))?;
        self.graph.add(Fragment::root(
            sym::METADATA,
            build_metadata(reading_orders, has_sections),
        ))
    }

    fn add_sections(&mut self) -> Result<()> {
        for section in &self.book.sections {
            self.graph.add(Fragment::named(
                sym::SECTION,
                section.name.as_str(),
                build_section(&section.name),
            ))?;
        }
        Ok(())
    }

    fn add_resources(&mut self) -> Result<()> {
        for resource in &self.resources {
            let info = resource.info;
            let value = build_external_resource(
                &resource.name,
                &resource.location,
                resource.format,
                &info.mime,
                info.width,
                info.height,
            );
            self.graph.add(Fragment::named(
                sym::EXTERNAL_RESOURCE,
                resource.name.as_str(),
                value,
            ))?;

            if let Some(data) = &info.data {
                self.graph.add(Fragment::raw(
                    sym::RAW_MEDIA,
                    resource.location.as_str(),
                    data.clone(),
                ))?;
            }
        }
        Ok(())
    }

    fn add_navigation(&mut self) -> Result<()> {
        let start_eid = match self.config.landmarks.start_eid {
            eid if eid > 0 => eid,
            _ => self.positions.first().map_or(0, |p| p.eid),
        };
        let page_size = if self.has_page_list() {
            self.config.page_size
        } else {
            0
        };
        self.graph.add(build_book_navigation(
            self.toc,
            start_eid,
            self.positions,
            page_size,
            &self.config.landmarks,
        ))
    }

    fn add_styles(&mut self, registry: &StyleRegistry) -> Result<()> {
        for fragment in registry.to_fragments() {
            self.graph.add(fragment)?;
        }
        Ok(())
    }

    fn add_content_features(&mut self) -> Result<()> {
        self.graph.add(Fragment::root(
            sym::CONTENT_FEATURES,
            build_content_features(self.config.reflow_section_size),
        ))
    }

    fn add_format_capabilities(&mut self) -> Result<()> {
        self.graph.add(Fragment::root(
            sym::FORMAT_CAPABILITIES,
            build_format_capabilities(),
        ))
    }

    fn add_resource_path(&mut self) -> Result<()> {
        self.graph
            .add(Fragment::root(sym::RESOURCE_PATH, build_resource_path()))
    }

    fn add_book_metadata(&mut self) -> Result<()> {
        let cover = self
            .book
            .cover_resource
            .as_deref()
            .and_then(|id| self.resource_name_for(id));
        if self.book.cover_resource.is_some() && cover.is_none() {
            tracing::warn!(cover = ?self.book.cover_resource, "cover resource was not emitted");
        }

        let input = BookMetadataInput {
            title: &self.book.title,
            authors: &self.book.authors,
            language: &self.book.language,
            description: &self.book.description,
            document_id: &self.book.document_id,
            container_id: &self.container_id,
            cover_resource: cover,
            application_name: &self.config.application_name,
        };
        let metadata = build_book_metadata(&input);
        self.graph
            .add(Fragment::root(sym::BOOK_METADATA, metadata))
    }

    /// Section -> resources and resource -> raw media dependencies.
    fn entity_dependencies(&self) -> Vec<EntityDependency> {
        let mut dependencies = Vec::new();
        for section in &self.book.sections {
            let mut mandatory = Vec::new();
            for source_id in &section.resources {
                match self.resource_name_for(source_id) {
                    Some(name) => {
                        if !mandatory.iter().any(|n| n == name) {
                            mandatory.push(name.to_string());
                        }
                    }
                    None => tracing::debug!(
                        section = %section.name,
                        resource = %source_id,
                        "section references a resource that was not emitted"
                    ),
                }
            }
            dependencies.push(EntityDependency {
                fragment: section.name.clone(),
                mandatory,
                optional: Vec::new(),
            });
        }
        for resource in &self.resources {
            if resource.info.data.is_some() {
                dependencies.push(EntityDependency {
                    fragment: resource.name.clone(),
                    mandatory: Vec::new(),
                    optional: vec![resource.location.clone()],
                });
            }
        }
        dependencies
    }

    fn add_container_entity_map(&mut self) -> Result<()> {
        let fragment_ids: Vec<String> = self
            .graph
            .all()
            .iter()
            .filter(|f| !CONTAINER_FRAGMENT_TYPES.contains(&f.ftype))
            .map(Fragment::id_name)
            .collect();
        let dependencies = self.entity_dependencies();

        let map = build_entity_map(&self.container_id, &fragment_ids, &dependencies);
        self.graph
            .add(Fragment::root(sym::CONTAINER_ENTITY_MAP, map))
    }

    /// Every name a fragment is addressed by or references must resolve.
    fn verify_symbols(&self) -> Result<()> {
        for fragment in self.graph.all() {
            if let Some(name) = &fragment.fid_name {
                self.symtab.id_of(name)?;
            }
            let mut names = Vec::new();
            fragment.value.for_each_symbol_name(&mut |name| names.push(name));
            for name in names {
                self.symtab.id_of(name)?;
            }
        }
        Ok(())
    }
}
