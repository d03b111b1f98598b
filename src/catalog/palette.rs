use super::operation::{Operation, Role};
use ahash::AHashMap;
use serde::Serialize;

/// One toolbox category with the block kinds it offers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaletteCategory {
    pub name: String,
    pub colour: u16,
    pub kinds: Vec<String>,
}

/// The toolbox projection of a catalog.
///
/// Categories appear in the order their first operation was registered; only
/// operations that create blocks are listed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Palette {
    pub categories: Vec<PaletteCategory>,
}

impl Palette {
    pub fn from_operations(operations: &[Box<dyn Operation>]) -> Self {
        let mut categories: Vec<PaletteCategory> = Vec::new();
        let mut index: AHashMap<&'static str, usize> = AHashMap::new();

        for op in operations {
            if op.role() != Role::Statement {
                continue;
            }
            let category = op.category();
            let slot = *index.entry(category.name).or_insert_with(|| {
                categories.push(PaletteCategory {
                    name: category.name.to_string(),
                    colour: category.colour,
                    kinds: Vec::new(),
                });
                categories.len() - 1
            });
            categories[slot].kinds.push(op.kind().to_string());
        }

        Self { categories }
    }

    pub fn category(&self, name: &str) -> Option<&PaletteCategory> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// The category a kind is listed under.
    pub fn category_of(&self, kind: &str) -> Option<&PaletteCategory> {
        self.categories
            .iter()
            .find(|c| c.kinds.iter().any(|k| k == kind))
    }
}
