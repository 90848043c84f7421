//! Component front end
//!
//! Component files are parsed by a front end outside this crate. The
//! importer calls it once per component, the first time the component's
//! descriptor is dereferenced.

use std::path::Path;

use tessera_types::TypeId;

use crate::error::FrontEndError;
use crate::importer::Importer;

/// Fills a deferred descriptor from its component file
pub trait ComponentFrontEnd {
    /// Populate `target` from `file`.
    ///
    /// The importer is available for resolving the component's own imports.
    /// Identity fields written here are reset by the importer afterwards.
    fn populate(
        &self,
        importer: &mut Importer,
        file: &Path,
        target: TypeId,
    ) -> Result<(), FrontEndError>;
}

/// Front end that leaves descriptors empty
#[derive(Debug, Clone, Copy, Default)]
pub struct NullFrontEnd;

impl ComponentFrontEnd for NullFrontEnd {
    fn populate(&self, _: &mut Importer, _: &Path, _: TypeId) -> Result<(), FrontEndError> {
        Ok(())
    }
}
