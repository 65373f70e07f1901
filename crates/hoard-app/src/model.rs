// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ids::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variant {
    Items,
    Weapons,
}

impl Variant {
    pub const ALL: [Self; 2] = [Self::Items, Self::Weapons];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Items => "items",
            Self::Weapons => "weapons",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "items" => Some(Self::Items),
            "weapons" => Some(Self::Weapons),
            _ => None,
        }
    }

    pub const fn table_name(self) -> &'static str {
        match self {
            Self::Items => "inventory",
            Self::Weapons => "weapons",
        }
    }

    pub const fn list_title(self) -> &'static str {
        match self {
            Self::Items => "Inventory",
            Self::Weapons => "Weapon List",
        }
    }

    pub const fn detail_title(self) -> &'static str {
        match self {
            Self::Items => "Item Details",
            Self::Weapons => "Weapon Details",
        }
    }

    pub const fn field_specs(self) -> &'static [FieldSpec] {
        match self {
            Self::Items => &ITEM_FIELD_SPECS,
            Self::Weapons => &WEAPON_FIELD_SPECS,
        }
    }

    pub const fn list_actions(self) -> &'static [ListAction] {
        match self {
            Self::Items => &[
                ListAction::Add,
                ListAction::Edit,
                ListAction::Increment,
                ListAction::Decrement,
                ListAction::Delete,
                ListAction::Quit,
            ],
            Self::Weapons => &[
                ListAction::Add,
                ListAction::Edit,
                ListAction::Export,
                ListAction::Delete,
                ListAction::Quit,
            ],
        }
    }

    pub fn supports(self, action: ListAction) -> bool {
        self.list_actions().contains(&action)
    }
}

/// One labeled entry in a detail form. `key` matches the table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub multiline: bool,
}

impl FieldSpec {
    const fn line(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            multiline: false,
        }
    }
}

pub const ITEM_FIELD_SPECS: [FieldSpec; 4] = [
    FieldSpec::line("name", "Name"),
    FieldSpec::line("price", "Price"),
    FieldSpec::line("charges", "Charges"),
    FieldSpec::line("quantity", "Quantity"),
];

pub const WEAPON_FIELD_SPECS: [FieldSpec; 10] = [
    FieldSpec::line("name", "Name"),
    FieldSpec::line("weight", "Weight"),
    FieldSpec::line("modifiers", "Modifiers"),
    FieldSpec::line("range", "Range"),
    FieldSpec::line("damage", "Damage"),
    FieldSpec::line("damageType", "Damage Type"),
    FieldSpec::line("price", "Price"),
    FieldSpec::line("rarity", "Rarity"),
    FieldSpec::line("properties", "Properties"),
    FieldSpec {
        key: "description",
        label: "Description",
        multiline: true,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListAction {
    Add,
    Edit,
    Increment,
    Decrement,
    Export,
    Delete,
    Quit,
}

impl ListAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Add => "Add",
            Self::Edit => "Edit",
            Self::Increment => "+1",
            Self::Decrement => "-1",
            Self::Export => "Export",
            Self::Delete => "Delete",
            Self::Quit => "Quit",
        }
    }

    pub const fn key_hint(self) -> &'static str {
        match self {
            Self::Add => "a",
            Self::Edit => "e",
            Self::Increment => "+",
            Self::Decrement => "-",
            Self::Export => "x",
            Self::Delete => "d",
            Self::Quit => "q",
        }
    }

    /// Actions that operate on the highlighted row.
    pub const fn needs_selection(self) -> bool {
        matches!(
            self,
            Self::Edit | Self::Increment | Self::Decrement | Self::Export | Self::Delete
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuantityDelta {
    Increment,
    Decrement,
}

impl QuantityDelta {
    pub const fn sql_operator(self) -> &'static str {
        match self {
            Self::Increment => "+",
            Self::Decrement => "-",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemFields {
    pub name: String,
    pub price: String,
    pub charges: String,
    pub quantity: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    #[serde(flatten)]
    pub fields: ItemFields,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeaponFields {
    pub name: String,
    pub weight: String,
    pub modifiers: String,
    pub damage: String,
    pub range: String,
    #[serde(rename = "damageType")]
    pub damage_type: String,
    pub price: String,
    pub rarity: String,
    pub properties: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    pub id: WeaponId,
    #[serde(flatten)]
    pub fields: WeaponFields,
}

/// Reduced (label, id) projection used to populate the list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub id: i64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReceipt {
    pub records: usize,
    pub json_path: PathBuf,
    pub report_path: PathBuf,
}
