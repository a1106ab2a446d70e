use rand::seq::SliceRandom;

/// Portraits used as swap targets when no catalog is configured.
pub const DEFAULT_CATALOG: [&str; 3] = [
    "https://upload.wikimedia.org/wikipedia/commons/thumb/c/c2/Portraits_of_Andrea_del_Sarto.jpg/800px-Portraits_of_Andrea_del_Sarto.jpg",
    "https://images.unsplash.com/photo-1500648767791-00dcc994a43e",
    "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d",
];

/// Picks the reference image a user's face is swapped onto.
pub trait ReferenceSelector: Send + Sync {
    fn select_reference(&self) -> String;
}

/// Uniform random pick from a fixed catalog. Holds no state between calls.
#[derive(Debug, Clone)]
pub struct CatalogSelector {
    catalog: Vec<String>,
}

impl CatalogSelector {
    /// Build a selector over `catalog`, or [`DEFAULT_CATALOG`] if it is empty.
    pub fn new(catalog: Vec<String>) -> Self {
        if catalog.is_empty() {
            return Self::default();
        }
        Self { catalog }
    }

    pub fn catalog(&self) -> &[String] {
        &self.catalog
    }
}

impl Default for CatalogSelector {
    fn default() -> Self {
        Self {
            catalog: DEFAULT_CATALOG.iter().map(|url| url.to_string()).collect(),
        }
    }
}

impl ReferenceSelector for CatalogSelector {
    fn select_reference(&self) -> String {
        self.catalog
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_else(|| DEFAULT_CATALOG[0].to_string())
    }
}
