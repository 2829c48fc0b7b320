//! Persona catalog loading.

use std::path::Path;

use adplace_models::{Persona, PersonaCatalogFile};
use tracing::{info, warn};

/// Persona definitions in file order.
#[derive(Debug, Clone, Default)]
pub struct PersonaCatalog {
    personas: Vec<Persona>,
}

impl PersonaCatalog {
    pub fn new(personas: Vec<Persona>) -> Self {
        Self { personas }
    }

    /// Load `{"personas": [...]}` from disk.
    ///
    /// A missing or malformed file yields an empty catalog and a warning,
    /// so the service still starts and reports zero personas.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Persona catalog not readable");
                return Self::default();
            }
        };

        match serde_json::from_str::<PersonaCatalogFile>(&raw) {
            Ok(file) => {
                info!(path = %path.display(), personas = file.personas.len(), "Loaded persona catalog");
                Self::new(file.personas)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Persona catalog is not valid JSON");
                Self::default()
            }
        }
    }

    pub fn personas(&self) -> &[Persona] {
        &self.personas
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }

    /// Distinct categories, first appearance first.
    pub fn categories(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for p in &self.personas {
            if !out.contains(&p.category.as_str()) {
                out.push(&p.category);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_catalog() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"personas": [
                {{"name": "Casual Viewer", "category": "general", "motto": "Just vibes"}},
                {{"name": "Stats Nerd", "category": "sports", "evaluation_focus": ["numbers"]}},
                {{"name": "Die-hard Fan", "category": "sports"}}
            ]}}"#
        )
        .unwrap();

        let catalog = PersonaCatalog::load(file.path());
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.personas()[1].evaluation_focus, vec!["numbers"]);
        assert_eq!(catalog.personas()[2].output_tone, "neutral");
        assert_eq!(catalog.categories(), vec!["general", "sports"]);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let catalog = PersonaCatalog::load("/nonexistent/persona_categories.json");
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_malformed_file_is_empty() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(PersonaCatalog::load(file.path()).is_empty());
    }

    #[test]
    fn test_missing_key_is_empty() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"other": []}}"#).unwrap();
        assert!(PersonaCatalog::load(file.path()).is_empty());
    }
}
