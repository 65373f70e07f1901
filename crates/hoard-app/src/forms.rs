// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};

use crate::{FieldSpec, ItemFields, Variant, WeaponFields};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPayload {
    Item(ItemFields),
    Weapon(WeaponFields),
}

impl FormPayload {
    pub fn blank_for(variant: Variant) -> Self {
        match variant {
            Variant::Items => Self::Item(ItemFields::default()),
            Variant::Weapons => Self::Weapon(WeaponFields::default()),
        }
    }

    pub fn variant(&self) -> Variant {
        match self {
            Self::Item(_) => Variant::Items,
            Self::Weapon(_) => Variant::Weapons,
        }
    }

    pub fn field_specs(&self) -> &'static [FieldSpec] {
        self.variant().field_specs()
    }

    /// Value of the field at `index` in form order.
    pub fn value(&self, index: usize) -> Option<&str> {
        let value = match self {
            Self::Item(fields) => match index {
                0 => &fields.name,
                1 => &fields.price,
                2 => &fields.charges,
                3 => &fields.quantity,
                _ => return None,
            },
            Self::Weapon(fields) => match index {
                0 => &fields.name,
                1 => &fields.weight,
                2 => &fields.modifiers,
                3 => &fields.range,
                4 => &fields.damage,
                5 => &fields.damage_type,
                6 => &fields.price,
                7 => &fields.rarity,
                8 => &fields.properties,
                9 => &fields.description,
                _ => return None,
            },
        };
        Some(value.as_str())
    }

    pub fn value_mut(&mut self, index: usize) -> Option<&mut String> {
        let value = match self {
            Self::Item(fields) => match index {
                0 => &mut fields.name,
                1 => &mut fields.price,
                2 => &mut fields.charges,
                3 => &mut fields.quantity,
                _ => return None,
            },
            Self::Weapon(fields) => match index {
                0 => &mut fields.name,
                1 => &mut fields.weight,
                2 => &mut fields.modifiers,
                3 => &mut fields.range,
                4 => &mut fields.damage,
                5 => &mut fields.damage_type,
                6 => &mut fields.price,
                7 => &mut fields.rarity,
                8 => &mut fields.properties,
                9 => &mut fields.description,
                _ => return None,
            },
        };
        Some(value)
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Item(fields) => fields.validate(),
            Self::Weapon(fields) => fields.validate(),
        }
    }
}

impl ItemFields {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("item name is required -- enter a name and retry");
        }
        let quantity = self.quantity.trim();
        if !quantity.is_empty() && quantity.parse::<i64>().is_err() {
            bail!("item quantity must be a whole number, got {quantity:?}");
        }
        Ok(())
    }
}

impl WeaponFields {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("weapon name is required -- enter a name and retry");
        }
        Ok(())
    }
}
