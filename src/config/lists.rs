//! Crafting list definitions and the legacy list migration.

use serde::{Deserialize, Serialize};

/// One recipe/quantity entry of a crafting list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    /// Recipe id.
    pub id: u32,
    /// Number of crafts requested.
    pub quantity: u32,
    /// Craft this entry as a single quick synthesis.
    #[serde(default)]
    pub quick_synth: bool,
}

/// Batch of recipes crafted in order by Lists mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CraftingList {
    pub id: u32,
    pub name: String,
    /// Repair equipment before a craft when it is worn down.
    pub repair: bool,
    /// Condition threshold (percent) under which to repair.
    pub repair_percent: u8,
    pub materia: bool,
    pub skip_if_enough: bool,
    pub recipes: Vec<ListItem>,
}

/// Per-item option of the legacy list format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyItemOption {
    pub id: u32,
    #[serde(default)]
    pub quick_synth: bool,
}

/// Legacy list format: one vector entry per craft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyCraftingList {
    pub id: u32,
    pub name: String,
    pub repair: bool,
    pub repair_percent: u8,
    pub materia: bool,
    pub skip_if_enough: bool,
    pub add_as_quick_synth: bool,
    pub items: Vec<u32>,
    pub item_options: Vec<LegacyItemOption>,
}

impl LegacyCraftingList {
    /// Converts to the current format.
    ///
    /// Items keep their first-appearance order; duplicates collapse into the quantity.
    pub fn convert(&self) -> CraftingList {
        let mut recipes: Vec<ListItem> = Vec::new();
        for &item in &self.items {
            if let Some(existing) = recipes.iter_mut().find(|r| r.id == item) {
                existing.quantity += 1;
                continue;
            }
            let quick_synth = self
                .item_options
                .iter()
                .find(|o| o.id == item)
                .map_or(self.add_as_quick_synth, |o| o.quick_synth);
            recipes.push(ListItem {
                id: item,
                quantity: 1,
                quick_synth,
            });
        }

        CraftingList {
            id: self.id,
            name: self.name.clone(),
            repair: self.repair,
            repair_percent: self.repair_percent,
            materia: self.materia,
            skip_if_enough: self.skip_if_enough,
            recipes,
        }
    }
}

/// Named macro reference (the solver itself lives outside the core).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacroEntry {
    pub id: u32,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_collapses_duplicates_in_order() {
        let legacy = LegacyCraftingList {
            id: 4,
            name: "gear".into(),
            items: vec![10, 20, 10, 30, 10],
            item_options: vec![LegacyItemOption {
                id: 20,
                quick_synth: true,
            }],
            ..LegacyCraftingList::default()
        };

        let list = legacy.convert();
        assert_eq!(list.id, 4);
        assert_eq!(
            list.recipes,
            vec![
                ListItem { id: 10, quantity: 3, quick_synth: false },
                ListItem { id: 20, quantity: 1, quick_synth: true },
                ListItem { id: 30, quantity: 1, quick_synth: false },
            ]
        );
    }
}
