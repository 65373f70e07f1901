// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};

use crate::Weapon;

pub const DEFAULT_JSON_FILE: &str = "items.json";
pub const DEFAULT_REPORT_FILE: &str = "readable_items.txt";

const REPORT_SEPARATOR: &str = "-----------------------------------------";
const DESCRIPTION_MARKER: &str = "| ";

/// Serializes weapons as a JSON array of column-keyed objects.
pub fn weapons_to_json(weapons: &[Weapon]) -> Result<String> {
    serde_json::to_string(weapons).context("encode weapons as JSON")
}

/// Human-readable report: one separator-led block per weapon.
pub fn render_report(weapons: &[Weapon]) -> String {
    let mut out = String::new();
    for weapon in weapons {
        let fields = &weapon.fields;
        out.push_str(REPORT_SEPARATOR);
        out.push('\n');
        for (label, value) in [
            ("Name", &fields.name),
            ("Weight", &fields.weight),
            ("Range", &fields.range),
            ("Modifiers", &fields.modifiers),
            ("Damage", &fields.damage),
            ("Damage Type", &fields.damage_type),
            ("Price", &fields.price),
            ("Rarity", &fields.rarity),
            ("Properties", &fields.properties),
        ] {
            out.push_str(label);
            out.push_str(": ");
            out.push_str(value);
            out.push('\n');
        }
        out.push_str("Description:\n");
        out.push_str(DESCRIPTION_MARKER);
        out.push_str(&reindent_description(&fields.description));
        out.push('\n');
    }
    out
}

/// Double spaces become tabs; every continuation line gets the marker.
fn reindent_description(description: &str) -> String {
    description
        .replace("  ", "\t")
        .replace('\n', &format!("\n{DESCRIPTION_MARKER}"))
}
