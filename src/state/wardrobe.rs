//! Per-player clothing lists tracked by the strip game.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::state::game::Gender;

/// One wardrobe entry. Permanent entries can never be removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClothingItem {
    /// Identifier unique within the wardrobe.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Whether the entry is protected from removal.
    pub is_permanent: bool,
}

impl ClothingItem {
    fn preset(id: &str, name: &str, is_permanent: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_permanent,
        }
    }
}

/// Direction of a reorder during setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Shift {
    /// Towards the front (removed earlier).
    Up,
    /// Towards the back (removed later).
    Down,
}

/// Rejected wardrobe edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WardrobeError {
    #[error("no item at position {0}")]
    OutOfRange(usize),
    #[error("item `{0}` is permanent and cannot be deleted")]
    Permanent(String),
    #[error("item name cannot be empty")]
    EmptyName,
}

/// Ordered clothing list; removal always takes the first non-permanent entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(transparent)]
pub struct Wardrobe {
    items: Vec<ClothingItem>,
}

impl Wardrobe {
    /// Default list for a player of the given gender.
    pub fn preset(gender: Gender) -> Self {
        let items = match gender {
            Gender::Male => vec![
                ClothingItem::preset("m1", "Watch", false),
                ClothingItem::preset("m2", "Shirt", false),
                ClothingItem::preset("m3", "Pants", false),
                ClothingItem::preset("m4", "Socks", false),
                ClothingItem::preset("m5", "Underwear", true),
            ],
            Gender::Female => vec![
                ClothingItem::preset("f1", "Earrings", false),
                ClothingItem::preset("f2", "Bra", true),
                ClothingItem::preset("f3", "Top", false),
                ClothingItem::preset("f4", "Skirt", false),
                ClothingItem::preset("f5", "Stockings", false),
                ClothingItem::preset("f6", "Panties", true),
            ],
        };
        Self { items }
    }

    /// Entries in removal order.
    pub fn items(&self) -> &[ClothingItem] {
        &self.items
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the list holds nothing.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of entries that can still be removed.
    pub fn removable(&self) -> usize {
        self.items.iter().filter(|item| !item.is_permanent).count()
    }

    /// Swap the entry at `index` with its neighbour. Moving past either end is a no-op.
    pub fn shift(&mut self, index: usize, direction: Shift) -> Result<(), WardrobeError> {
        if index >= self.items.len() {
            return Err(WardrobeError::OutOfRange(index));
        }
        let target = match direction {
            Shift::Up => index.checked_sub(1),
            Shift::Down => Some(index + 1).filter(|next| *next < self.items.len()),
        };
        if let Some(target) = target {
            self.items.swap(index, target);
        }
        Ok(())
    }

    /// Delete a non-permanent entry during setup.
    pub fn delete(&mut self, index: usize) -> Result<ClothingItem, WardrobeError> {
        let item = self
            .items
            .get(index)
            .ok_or(WardrobeError::OutOfRange(index))?;
        if item.is_permanent {
            return Err(WardrobeError::Permanent(item.name.clone()));
        }
        Ok(self.items.remove(index))
    }

    /// Append a custom entry ahead of the trailing permanent block.
    pub fn add(&mut self, name: &str) -> Result<&ClothingItem, WardrobeError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WardrobeError::EmptyName);
        }
        let permanent = self.items.iter().filter(|item| item.is_permanent).count();
        let position = self.items.len().saturating_sub(permanent);
        self.items.insert(
            position,
            ClothingItem {
                id: format!("custom-{}", Uuid::new_v4().simple()),
                name: name.to_string(),
                is_permanent: false,
            },
        );
        Ok(&self.items[position])
    }

    /// Remove up to `count` entries, first non-permanent ones first.
    pub fn strip(&mut self, count: usize) -> Vec<ClothingItem> {
        let mut removed = Vec::with_capacity(count);
        while removed.len() < count {
            let Some(position) = self.items.iter().position(|item| !item.is_permanent) else {
                break;
            };
            removed.push(self.items.remove(position));
        }
        removed
    }
}
