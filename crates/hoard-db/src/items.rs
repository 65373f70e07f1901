// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use hoard_app::{Item, ItemFields, ItemId, QuantityDelta, SummaryRow};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;

const TABLE: &str = "inventory";
const REQUIRED_COLUMNS: [&str; 5] = ["id", "name", "price", "charges", "quantity"];

const SELECT_ITEM: &str = "
    SELECT
      id,
      COALESCE(name, ''),
      COALESCE(price, ''),
      COALESCE(charges, ''),
      COALESCE(quantity, '')
    FROM inventory
";

const DEMO_ITEMS: [(&str, &str, &str, &str); 5] = [
    ("Potion of Healing", "50gp", "1", "3"),
    ("Wand of Magic Missiles", "8000gp", "7", "1"),
    ("Hempen Rope (50 ft)", "1gp", "", "2"),
    ("Torch", "1cp", "", "10"),
    ("Bag of Holding", "4000gp", "", "1"),
];

/// Record store for the generic inventory table plus the transient
/// selection cursor used by the detail view.
pub struct ItemStore {
    conn: Connection,
    current: Option<ItemId>,
}

impl ItemStore {
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
            include_str!("sql/inventory.sql"),
            &REQUIRED_COLUMNS,
        )
    }

    pub fn add(&self, fields: &ItemFields) -> Result<ItemId> {
        self.conn
            .execute(
                "
                INSERT INTO inventory (name, price, charges, quantity)
                VALUES (?, ?, ?, ?)
                ",
                params![fields.name, fields.price, fields.charges, fields.quantity],
            )
            .context("insert item")?;
        let id = ItemId::new(self.conn.last_insert_rowid());
        tracing::debug!(id = id.get(), name = %fields.name, "item added");
        Ok(id)
    }

    pub fn summary(&self) -> Result<Vec<SummaryRow>> {
        let mut stmt = self
            .conn
            .prepare(
                "
                SELECT id, COALESCE(name, '') || ' -- ' || COALESCE(quantity, '')
                FROM inventory
                ORDER BY id ASC
                ",
            )
            .context("prepare item summary query")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(SummaryRow {
                    id: row.get(0)?,
                    label: row.get(1)?,
                })
            })
            .context("query item summary")?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect item summary")
    }

    pub fn get(&self, item_id: ItemId) -> Result<Option<Item>> {
        self.conn
            .query_row(
                &format!("{SELECT_ITEM} WHERE id = ?"),
                params![item_id.get()],
                item_from_row,
            )
            .optional()
            .with_context(|| format!("load item {}", item_id.get()))
    }

    pub fn current_id(&self) -> Option<ItemId> {
        self.current
    }

    pub fn current(&self) -> Result<Option<Item>> {
        match self.current {
            Some(item_id) => self.get(item_id),
            None => Ok(None),
        }
    }

    pub fn set_current(&mut self, item_id: Option<ItemId>) {
        self.current = item_id;
    }

    /// Saves through the cursor: insert when unset, full overwrite otherwise.
    pub fn upsert_current(&mut self, fields: &ItemFields) -> Result<ItemId> {
        let Some(item_id) = self.current else {
            return self.add(fields);
        };

        let rows_affected = self
            .conn
            .execute(
                "
                UPDATE inventory
                SET name = ?, price = ?, charges = ?, quantity = ?
                WHERE id = ?
                ",
                params![
                    fields.name,
                    fields.price,
                    fields.charges,
                    fields.quantity,
                    item_id.get(),
                ],
            )
            .with_context(|| format!("update item {}", item_id.get()))?;
        if rows_affected == 0 {
            bail!(
                "item {} no longer exists -- reload the list and retry",
                item_id.get()
            );
        }
        tracing::debug!(id = item_id.get(), "item updated");
        Ok(item_id)
    }

    pub fn increment_quantity(&self, item_id: ItemId) -> Result<()> {
        self.adjust_quantity(item_id, QuantityDelta::Increment)
    }

    pub fn decrement_quantity(&self, item_id: ItemId) -> Result<()> {
        self.adjust_quantity(item_id, QuantityDelta::Decrement)
    }

    /// In-store arithmetic; no floor, so quantities may go negative.
    pub fn adjust_quantity(&self, item_id: ItemId, delta: QuantityDelta) -> Result<()> {
        let sql = format!(
            "UPDATE inventory SET quantity = quantity {} 1 WHERE id = ?",
            delta.sql_operator()
        );
        self.conn
            .execute(&sql, params![item_id.get()])
            .with_context(|| format!("adjust quantity for item {}", item_id.get()))?;
        tracing::debug!(id = item_id.get(), ?delta, "item quantity adjusted");
        Ok(())
    }

    pub fn delete(&mut self, item_id: ItemId) -> Result<()> {
        if self.current == Some(item_id) {
            self.current = None;
        }
        self.conn
            .execute("DELETE FROM inventory WHERE id = ?", params![item_id.get()])
            .with_context(|| format!("delete item {}", item_id.get()))?;
        tracing::debug!(id = item_id.get(), "item deleted");
        Ok(())
    }

    pub fn list(&self) -> Result<Vec<Item>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_ITEM} ORDER BY id ASC"))
            .context("prepare items query")?;
        let rows = stmt.query_map([], item_from_row).context("query items")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect items")
    }

    pub fn count(&self) -> Result<usize> {
        super::count_rows(&self.conn, TABLE)
    }

    pub fn seed_demo_data(&self) -> Result<()> {
        for (name, price, charges, quantity) in DEMO_ITEMS {
            self.add(&ItemFields {
                name: name.to_owned(),
                price: price.to_owned(),
                charges: charges.to_owned(),
                quantity: quantity.to_owned(),
            })
            .with_context(|| format!("seed demo item {name}"))?;
        }
        Ok(())
    }
}

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<Item> {
    Ok(Item {
        id: ItemId::new(row.get(0)?),
        fields: ItemFields {
            name: row.get(1)?,
            price: row.get(2)?,
            charges: row.get(3)?,
            quantity: row.get(4)?,
        },
    })
}
