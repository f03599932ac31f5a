//! Decides under which distribution variants a page or version is listed.

use crate::model::Submodule;
use crate::source::ReferenceKind;

/// The parts of a page that matter for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocShape {
    /// A markdown guide.
    Guide,
    /// A generated API-reference entry.
    Reference {
        kind: Option<ReferenceKind>,
        is_fp_fn: bool,
    },
}

/// Submodules a page is listed under. Never empty.
pub fn page_submodules(fp_available_for_version: bool, shape: DocShape) -> Vec<Submodule> {
    if !fp_available_for_version {
        return vec![Submodule::Default];
    }

    match shape {
        DocShape::Guide => vec![Submodule::Default, Submodule::FP],
        DocShape::Reference {
            kind: Some(ReferenceKind::Typedef),
            ..
        } => vec![Submodule::Default, Submodule::FP],
        DocShape::Reference { is_fp_fn: true, .. } => vec![Submodule::FP],
        DocShape::Reference { .. } => vec![Submodule::Default],
    }
}

/// Submodules a version is listed under.
pub fn version_submodules(fp_available: bool) -> Vec<Submodule> {
    if fp_available {
        vec![Submodule::Default, Submodule::FP]
    } else {
        vec![Submodule::Default]
    }
}
