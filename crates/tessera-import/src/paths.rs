//! Module directory probing
//!
//! A module `A.B.C` requested at version `2.1` may live in any of
//! `A/B/C.2.1`, `A/B.2.1/C`, `A.2.1/B/C`, the same with `.2`, or plain
//! `A/B/C` below an import path. Candidates are produced most specific
//! first, each version form across all import paths before the next form.

use std::path::PathBuf;

use tessera_types::Revision;

/// Relative directories grouped by version form, most specific form first
fn version_forms(module: &str, version: Revision) -> Vec<Vec<String>> {
    let parts: Vec<&str> = module.split('.').filter(|part| !part.is_empty()).collect();
    if parts.is_empty() {
        return Vec::new();
    }

    let mut suffixes = Vec::new();
    if let (Some(major), Some(minor)) = (version.major(), version.minor()) {
        suffixes.push(format!(".{}.{}", major, minor));
    }
    if let Some(major) = version.major() {
        suffixes.push(format!(".{}", major));
    }

    let mut forms = Vec::new();
    for suffix in &suffixes {
        let mut form = Vec::with_capacity(parts.len());
        for split in (0..parts.len()).rev() {
            let mut directory = parts[..=split].join("/");
            directory.push_str(suffix);
            if split + 1 < parts.len() {
                directory.push('/');
                directory.push_str(&parts[split + 1..].join("/"));
            }
            form.push(directory);
        }
        forms.push(form);
    }
    forms.push(vec![parts.join("/")]);
    forms
}

/// Relative directories a module may live in, most specific first
pub fn module_directories(module: &str, version: Revision) -> Vec<String> {
    version_forms(module, version).concat()
}

/// Candidate module directories below every import path
pub fn candidate_directories(
    import_paths: &[PathBuf],
    module: &str,
    version: Revision,
) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    for form in version_forms(module, version) {
        for base in import_paths {
            candidates.extend(form.iter().map(|directory| base.join(directory)));
        }
    }
    candidates
}
