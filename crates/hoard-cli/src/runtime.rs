// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use hoard_app::{
    EditTarget, ExportReceipt, FormPayload, ItemId, QuantityDelta, SummaryRow, Variant, Weapon,
    WeaponId,
};
use hoard_db::{ItemStore, WeaponStore};
use hoard_tui::{AppRuntime, DetailLoad};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSettings {
    pub dir: PathBuf,
    pub json_file: String,
    pub report_file: String,
}

impl ExportSettings {
    pub fn json_path(&self) -> PathBuf {
        self.dir.join(&self.json_file)
    }

    pub fn report_path(&self) -> PathBuf {
        self.dir.join(&self.report_file)
    }
}

pub struct ItemRuntime<'a> {
    store: &'a mut ItemStore,
}

impl<'a> ItemRuntime<'a> {
    pub fn new(store: &'a mut ItemStore) -> Self {
        Self { store }
    }
}

impl AppRuntime for ItemRuntime<'_> {
    fn variant(&self) -> Variant {
        Variant::Items
    }

    fn load_summary(&mut self) -> Result<Vec<SummaryRow>> {
        self.store.set_current(None);
        self.store.summary()
    }

    fn open_detail(&mut self, target: EditTarget) -> Result<DetailLoad> {
        let item = match target.id() {
            Some(id) => self.store.get(ItemId::new(id))?,
            None => None,
        };
        let Some(item) = item else {
            if let Some(id) = target.id() {
                tracing::info!(id, "item vanished before edit; opening blank form");
            }
            self.store.set_current(None);
            return Ok(DetailLoad {
                target: EditTarget::Create,
                payload: FormPayload::blank_for(Variant::Items),
            });
        };
        self.store.set_current(Some(item.id));
        Ok(DetailLoad {
            target: EditTarget::Existing(item.id.get()),
            payload: FormPayload::Item(item.fields),
        })
    }

    fn save_detail(&mut self, payload: &FormPayload) -> Result<i64> {
        let FormPayload::Item(fields) = payload else {
            bail!(
                "expected an item form, got a {} form",
                payload.variant().as_str()
            );
        };
        payload.validate()?;
        let mut fields = fields.clone();
        fields.quantity = fields.quantity.trim().to_owned();
        Ok(self.store.upsert_current(&fields)?.get())
    }

    fn adjust_quantity(&mut self, id: i64, delta: QuantityDelta) -> Result<()> {
        self.store.adjust_quantity(ItemId::new(id), delta)
    }

    fn delete_record(&mut self, id: i64) -> Result<()> {
        self.store.set_current(None);
        self.store.delete(ItemId::new(id))
    }

    fn export_records(&mut self) -> Result<ExportReceipt> {
        bail!("export is only available for weapons -- run hoard-weapons")
    }
}

pub struct WeaponRuntime<'a> {
    store: &'a mut WeaponStore,
    export: ExportSettings,
}

impl<'a> WeaponRuntime<'a> {
    pub fn new(store: &'a mut WeaponStore, export: ExportSettings) -> Self {
        Self { store, export }
    }
}

impl AppRuntime for WeaponRuntime<'_> {
    fn variant(&self) -> Variant {
        Variant::Weapons
    }

    fn load_summary(&mut self) -> Result<Vec<SummaryRow>> {
        self.store.set_current(None);
        self.store.summary()
    }

    fn open_detail(&mut self, target: EditTarget) -> Result<DetailLoad> {
        let weapon = match target.id() {
            Some(id) => self.store.get(WeaponId::new(id))?,
            None => None,
        };
        let Some(weapon) = weapon else {
            if let Some(id) = target.id() {
                tracing::info!(id, "weapon vanished before edit; opening blank form");
            }
            self.store.set_current(None);
            return Ok(DetailLoad {
                target: EditTarget::Create,
                payload: FormPayload::blank_for(Variant::Weapons),
            });
        };
        self.store.set_current(Some(weapon.id));
        Ok(DetailLoad {
            target: EditTarget::Existing(weapon.id.get()),
            payload: FormPayload::Weapon(weapon.fields),
        })
    }

    fn save_detail(&mut self, payload: &FormPayload) -> Result<i64> {
        let FormPayload::Weapon(fields) = payload else {
            bail!(
                "expected a weapon form, got an {} form",
                payload.variant().as_str()
            );
        };
        payload.validate()?;
        Ok(self.store.upsert_current(fields)?.get())
    }

    fn adjust_quantity(&mut self, _id: i64, _delta: QuantityDelta) -> Result<()> {
        bail!("weapons have no quantity -- use hoard-items for counted gear")
    }

    fn delete_record(&mut self, id: i64) -> Result<()> {
        self.store.set_current(None);
        self.store.delete(WeaponId::new(id))
    }

    fn export_records(&mut self) -> Result<ExportReceipt> {
        let weapons = self.store.export_all()?;
        write_export(&self.export, &weapons)
    }
}

fn write_export(settings: &ExportSettings, weapons: &[Weapon]) -> Result<ExportReceipt> {
    fs::create_dir_all(&settings.dir)
        .with_context(|| format!("create export directory {}", settings.dir.display()))?;

    let json_path = settings.json_path();
    fs::write(&json_path, hoard_app::weapons_to_json(weapons)?)
        .with_context(|| format!("write {}", json_path.display()))?;

    let report_path = settings.report_path();
    fs::write(&report_path, hoard_app::render_report(weapons))
        .with_context(|| format!("write {}", report_path.display()))?;

    tracing::info!(
        records = weapons.len(),
        json = %json_path.display(),
        report = %report_path.display(),
        "exported weapons"
    );
    Ok(ExportReceipt {
        records: weapons.len(),
        json_path,
        report_path,
    })
}
