use std::collections::HashMap;

use crate::iso::{AssetId, AssetKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetCategory {
    Furniture(AssetKind),
    FloorSkin,
    WallSkin,
}

impl AssetCategory {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "floor" => Some(Self::FloorSkin),
            "wall" => Some(Self::WallSkin),
            other => AssetKind::parse(other).map(Self::Furniture),
        }
    }

    pub fn placeable_kind(self) -> Option<AssetKind> {
        match self {
            Self::Furniture(kind) => Some(kind),
            Self::FloorSkin | Self::WallSkin => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDefinition {
    pub id: AssetId,
    pub name: String,
    pub description: String,
    pub category: AssetCategory,
    pub price: u32,
    pub sprite_sheet: String,
}

/// Read-only asset catalog in declaration order.
#[derive(Debug, Default, Clone)]
pub struct AssetCatalog {
    assets: Vec<AssetDefinition>,
    index_by_id: HashMap<AssetId, usize>,
}

impl AssetCatalog {
    /// Later definitions with an id already seen replace the earlier one in place.
    pub fn from_definitions(definitions: Vec<AssetDefinition>) -> Self {
        let mut assets = Vec::<AssetDefinition>::with_capacity(definitions.len());
        let mut index_by_id = HashMap::with_capacity(definitions.len());
        for def in definitions {
            match index_by_id.get(&def.id) {
                Some(&index) => assets[index] = def,
                None => {
                    index_by_id.insert(def.id.clone(), assets.len());
                    assets.push(def);
                }
            }
        }
        Self {
            assets,
            index_by_id,
        }
    }

    pub fn get(&self, id: &AssetId) -> Option<&AssetDefinition> {
        self.index_by_id.get(id).map(|&index| &self.assets[index])
    }

    pub fn kind_of(&self, id: &AssetId) -> Option<AssetKind> {
        self.get(id).and_then(|def| def.category.placeable_kind())
    }

    pub fn assets(&self) -> &[AssetDefinition] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn placeable(&self) -> impl Iterator<Item = &AssetDefinition> {
        self.assets
            .iter()
            .filter(|def| def.category.placeable_kind().is_some())
    }

    pub fn floor_skins(&self) -> impl Iterator<Item = &AssetDefinition> {
        self.assets
            .iter()
            .filter(|def| def.category == AssetCategory::FloorSkin)
    }

    pub fn wall_skins(&self) -> impl Iterator<Item = &AssetDefinition> {
        self.assets
            .iter()
            .filter(|def| def.category == AssetCategory::WallSkin)
    }

    /// Next id in `ids` after `current`, wrapping. `step` of -1 walks backwards.
    pub fn cycle<'a>(
        ids: impl Iterator<Item = &'a AssetDefinition>,
        current: Option<&AssetId>,
        step: i32,
    ) -> Option<AssetId> {
        let ids: Vec<&AssetId> = ids.map(|def| &def.id).collect();
        if ids.is_empty() {
            return None;
        }
        let len = ids.len() as i64;
        let next = match current.and_then(|id| ids.iter().position(|candidate| *candidate == id)) {
            Some(index) => (index as i64 + step as i64).rem_euclid(len),
            None if step < 0 => len - 1,
            None => 0,
        };
        Some(ids[next as usize].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(id: &str, category: AssetCategory) -> AssetDefinition {
        AssetDefinition {
            id: AssetId::new(id),
            name: id.to_string(),
            description: String::new(),
            category,
            price: 10,
            sprite_sheet: format!("furniture/{id}"),
        }
    }

    #[test]
    fn category_parses_furniture_and_skins() {
        assert_eq!(AssetCategory::parse("floor"), Some(AssetCategory::FloorSkin));
        assert_eq!(AssetCategory::parse("wall"), Some(AssetCategory::WallSkin));
        assert_eq!(
            AssetCategory::parse("surface item"),
            Some(AssetCategory::Furniture(AssetKind::SurfaceItem))
        );
        assert_eq!(AssetCategory::parse("ceiling"), None);
    }

    #[test]
    fn kind_of_resolves_only_placeable_assets() {
        let catalog = AssetCatalog::from_definitions(vec![
            def("table", AssetCategory::Furniture(AssetKind::FloorItem)),
            def("oak_floor", AssetCategory::FloorSkin),
        ]);
        assert_eq!(catalog.kind_of(&AssetId::new("table")), Some(AssetKind::FloorItem));
        assert_eq!(catalog.kind_of(&AssetId::new("oak_floor")), None);
        assert_eq!(catalog.kind_of(&AssetId::new("missing")), None);
    }

    #[test]
    fn redefinition_replaces_in_place() {
        let mut replacement = def("table", AssetCategory::Furniture(AssetKind::FloorItem));
        replacement.price = 99;
        let catalog = AssetCatalog::from_definitions(vec![
            def("table", AssetCategory::Furniture(AssetKind::FloorItem)),
            def("chair", AssetCategory::Furniture(AssetKind::NonTopFloorItem)),
            replacement,
        ]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.assets()[0].price, 99);
        assert_eq!(catalog.assets()[1].id, AssetId::new("chair"));
    }

    #[test]
    fn cycle_wraps_both_directions() {
        let catalog = AssetCatalog::from_definitions(vec![
            def("a", AssetCategory::Furniture(AssetKind::FloorItem)),
            def("skin", AssetCategory::FloorSkin),
            def("b", AssetCategory::Furniture(AssetKind::WallItem)),
        ]);
        let a = AssetId::new("a");
        let b = AssetId::new("b");
        assert_eq!(AssetCatalog::cycle(catalog.placeable(), None, 1), Some(a.clone()));
        assert_eq!(AssetCatalog::cycle(catalog.placeable(), None, -1), Some(b.clone()));
        assert_eq!(AssetCatalog::cycle(catalog.placeable(), Some(&a), 1), Some(b.clone()));
        assert_eq!(AssetCatalog::cycle(catalog.placeable(), Some(&b), 1), Some(a.clone()));
        assert_eq!(AssetCatalog::cycle(catalog.placeable(), Some(&a), -1), Some(b));
        assert_eq!(AssetCatalog::cycle(catalog.wall_skins(), None, 1), None);
    }
}
