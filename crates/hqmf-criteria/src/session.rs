//! Parse session: one document's registries and the build → patch → export flow

use crate::{
    builder::DataCriteriaBuilder,
    grouper::split_variable,
    models::ExportedDataCriteria,
    occurrence::OccurrenceRegistry,
    patch::{PatchRegistry, PatchStats},
    registry::{CriteriaRegistry, Registries},
    xml::Element,
    Result,
};
use tracing::{debug, info};

/// Drives extraction of every data criteria entry of one document
///
/// Entries must be added in document order: occurrence letters and
/// references resolve against the entries added before them.
pub struct ParseSession<'a> {
    registries: &'a Registries,
    references: CriteriaRegistry,
    occurrences: OccurrenceRegistry,
}

impl<'a> ParseSession<'a> {
    pub fn new(registries: &'a Registries) -> Self {
        Self {
            registries,
            references: CriteriaRegistry::new(),
            occurrences: OccurrenceRegistry::new(),
        }
    }

    /// Build and register one entry
    pub fn add_entry(&mut self, entry: &Element) -> Result<()> {
        self.add(entry, false)
    }

    /// Build and register an entry from the source data criteria list
    pub fn add_source_entry(&mut self, entry: &Element) -> Result<()> {
        self.add(entry, true)
    }

    fn add(&mut self, entry: &Element, source: bool) -> Result<()> {
        let builder = DataCriteriaBuilder::new(self.registries);
        let mut criteria = builder.build(entry, &self.references, &mut self.occurrences)?;
        criteria.is_source_data_criteria = source;

        for entity in split_variable(criteria, &self.references).into_entities() {
            let id = entity.id.clone();
            if self.references.register(entity) {
                debug!("Registered {}", id);
            }
        }
        Ok(())
    }

    /// Add every entry of every `dataCriteriaSection` in the document
    ///
    /// Returns the number of entries read.
    pub fn parse_document(&mut self, document: &Element) -> Result<usize> {
        let mut count = 0;
        for section in document.descendants_named("dataCriteriaSection") {
            for entry in section.children_named("entry") {
                self.add_entry(entry)?;
                count += 1;
            }
        }
        info!(
            "Read {} data criteria entries into {} criteria",
            count,
            self.references.len()
        );
        Ok(count)
    }

    /// Run the cross-reference patch pass over every registered criteria
    pub fn patch(&mut self) -> Result<PatchStats> {
        PatchRegistry::with_defaults().apply_all(&mut self.references)
    }

    /// Export every registered criteria in registration order
    pub fn export(&self) -> Vec<ExportedDataCriteria> {
        self.references.iter().map(|criteria| criteria.export()).collect()
    }

    /// Patch, then export
    pub fn finish(mut self) -> Result<Vec<ExportedDataCriteria>> {
        self.patch()?;
        Ok(self.export())
    }

    pub fn references(&self) -> &CriteriaRegistry {
        &self.references
    }

    pub fn occurrences(&self) -> &OccurrenceRegistry {
        &self.occurrences
    }
}
