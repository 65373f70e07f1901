// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use hoard_app::{SummaryRow, Weapon, WeaponFields, WeaponId};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;

const TABLE: &str = "weapons";
const REQUIRED_COLUMNS: [&str; 11] = [
    "id",
    "name",
    "weight",
    "modifiers",
    "damage",
    "range",
    "damageType",
    "price",
    "rarity",
    "properties",
    "description",
];

const SELECT_WEAPON: &str = r#"
    SELECT
      id,
      COALESCE(name, ''),
      COALESCE(weight, ''),
      COALESCE(modifiers, ''),
      COALESCE(damage, ''),
      COALESCE("range", ''),
      COALESCE(damageType, ''),
      COALESCE(price, ''),
      COALESCE(rarity, ''),
      COALESCE(properties, ''),
      COALESCE(description, '')
    FROM weapons
"#;

struct DemoWeapon {
    name: &'static str,
    weight: &'static str,
    damage: &'static str,
    range: &'static str,
    damage_type: &'static str,
    price: &'static str,
    properties: &'static str,
    description: &'static str,
}

const DEMO_WEAPONS: [DemoWeapon; 4] = [
    DemoWeapon {
        name: "Dagger",
        weight: "1",
        damage: "1d4",
        range: "20/60",
        damage_type: "piercing",
        price: "2gp",
        properties: "finesse, light, thrown",
        description: "A simple blade.\nEasy to conceal.",
    },
    DemoWeapon {
        name: "Longsword",
        weight: "3",
        damage: "1d8",
        range: "",
        damage_type: "slashing",
        price: "15gp",
        properties: "versatile (1d10)",
        description: "A knight's companion.",
    },
    DemoWeapon {
        name: "Shortbow",
        weight: "2",
        damage: "1d6",
        range: "80/320",
        damage_type: "piercing",
        price: "25gp",
        properties: "ammunition, two-handed",
        description: "Yew, strung with gut.",
    },
    DemoWeapon {
        name: "Warhammer",
        weight: "2",
        damage: "1d8",
        range: "",
        damage_type: "bludgeoning",
        price: "15gp",
        properties: "versatile (1d10)",
        description: "Dwarven make.\n  Runes along the haft.",
    },
];

/// Record store for the weapons table plus the transient selection cursor.
pub struct WeaponStore {
    conn: Connection,
    current: Option<WeaponId>,
}

impl WeaponStore {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            conn: super::open_connection(path)?,
            current: None,
        })
    }

    pub fn open_memory() -> Result<Self> {
        Ok(Self {
            conn: super::open_memory_connection()?,
            current: None,
        })
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    pub fn bootstrap(&self) -> Result<()> {
        super::ensure_table(
            &self.conn,
            TABLE,
            include_str!("sql/weapons.sql"),
            &REQUIRED_COLUMNS,
        )
    }

    pub fn add(&self, fields: &WeaponFields) -> Result<WeaponId> {
        self.conn
            .execute(
                r#"
                INSERT INTO weapons (
                  name, weight, modifiers, damage, "range", damageType,
                  price, rarity, properties, description
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
                params![
                    fields.name,
                    fields.weight,
                    fields.modifiers,
                    fields.damage,
                    fields.range,
                    fields.damage_type,
                    fields.price,
                    fields.rarity,
                    fields.properties,
                    fields.description,
                ],
            )
            .context("insert weapon")?;
        let id = WeaponId::new(self.conn.last_insert_rowid());
        tracing::debug!(id = id.get(), name = %fields.name, "weapon added");
        Ok(id)
    }

    pub fn summary(&self) -> Result<Vec<SummaryRow>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, COALESCE(name, '') FROM weapons ORDER BY id ASC")
            .context("prepare weapon summary query")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(SummaryRow {
                    id: row.get(0)?,
                    label: row.get(1)?,
                })
            })
            .context("query weapon summary")?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect weapon summary")
    }

    pub fn get(&self, weapon_id: WeaponId) -> Result<Option<Weapon>> {
        self.conn
            .query_row(
                &format!("{SELECT_WEAPON} WHERE id = ?"),
                params![weapon_id.get()],
                weapon_from_row,
            )
            .optional()
            .with_context(|| format!("load weapon {}", weapon_id.get()))
    }

    pub fn current_id(&self) -> Option<WeaponId> {
        self.current
    }

    pub fn current(&self) -> Result<Option<Weapon>> {
        match self.current {
            Some(weapon_id) => self.get(weapon_id),
            None => Ok(None),
        }
    }

    pub fn set_current(&mut self, weapon_id: Option<WeaponId>) {
        self.current = weapon_id;
    }

    pub fn upsert_current(&mut self, fields: &WeaponFields) -> Result<WeaponId> {
        let Some(weapon_id) = self.current else {
            return self.add(fields);
        };

        let rows_affected = self
            .conn
            .execute(
                r#"
                UPDATE weapons
                SET
                  name = ?,
                  weight = ?,
                  modifiers = ?,
                  damage = ?,
                  "range" = ?,
                  damageType = ?,
                  price = ?,
                  rarity = ?,
                  properties = ?,
                  description = ?
                WHERE id = ?
                "#,
                params![
                    fields.name,
                    fields.weight,
                    fields.modifiers,
                    fields.damage,
                    fields.range,
                    fields.damage_type,
                    fields.price,
                    fields.rarity,
                    fields.properties,
                    fields.description,
                    weapon_id.get(),
                ],
            )
            .with_context(|| format!("update weapon {}", weapon_id.get()))?;
        if rows_affected == 0 {
            bail!(
                "weapon {} no longer exists -- reload the list and retry",
                weapon_id.get()
            );
        }
        tracing::debug!(id = weapon_id.get(), "weapon updated");
        Ok(weapon_id)
    }

    pub fn delete(&mut self, weapon_id: WeaponId) -> Result<()> {
        if self.current == Some(weapon_id) {
            self.current = None;
        }
        self.conn
            .execute("DELETE FROM weapons WHERE id = ?", params![weapon_id.get()])
            .with_context(|| format!("delete weapon {}", weapon_id.get()))?;
        tracing::debug!(id = weapon_id.get(), "weapon deleted");
        Ok(())
    }

    /// Every weapon in insertion order, for serialization by the caller.
    pub fn export_all(&self) -> Result<Vec<Weapon>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_WEAPON} ORDER BY id ASC"))
            .context("prepare weapons export query")?;
        let rows = stmt
            .query_map([], weapon_from_row)
            .context("query weapons for export")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect weapons for export")
    }

    pub fn count(&self) -> Result<usize> {
        super::count_rows(&self.conn, TABLE)
    }

    pub fn seed_demo_data(&self) -> Result<()> {
        for demo in DEMO_WEAPONS {
            self.add(&WeaponFields {
                name: demo.name.to_owned(),
                weight: demo.weight.to_owned(),
                modifiers: String::new(),
                damage: demo.damage.to_owned(),
                range: demo.range.to_owned(),
                damage_type: demo.damage_type.to_owned(),
                price: demo.price.to_owned(),
                rarity: "common".to_owned(),
                properties: demo.properties.to_owned(),
                description: demo.description.to_owned(),
            })
            .with_context(|| format!("seed demo weapon {}", demo.name))?;
        }
        Ok(())
    }
}

fn weapon_from_row(row: &Row<'_>) -> rusqlite::Result<Weapon> {
    Ok(Weapon {
        id: WeaponId::new(row.get(0)?),
        fields: WeaponFields {
            name: row.get(1)?,
            weight: row.get(2)?,
            modifiers: row.get(3)?,
            damage: row.get(4)?,
            range: row.get(5)?,
            damage_type: row.get(6)?,
            price: row.get(7)?,
            rarity: row.get(8)?,
            properties: row.get(9)?,
            description: row.get(10)?,
        },
    })
}
