// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use hoard_app::{ItemFields, WeaponFields};
use std::path::PathBuf;

const ITEM_NOUNS: [&str; 12] = [
    "Potion",
    "Scroll",
    "Wand",
    "Ring",
    "Amulet",
    "Cloak",
    "Boots",
    "Gem",
    "Rope",
    "Lantern",
    "Tome",
    "Flask",
];

const ITEM_QUALIFIERS: [&str; 10] = [
    "of Healing",
    "of Fire Bolt",
    "of Protection",
    "of Water Breathing",
    "of the Owl",
    "of Levitation",
    "of Climbing",
    "of Speaking",
    "of Holding",
    "of Light",
];

const WEAPON_NAMES: [&str; 14] = [
    "Club",
    "Dagger",
    "Greatclub",
    "Handaxe",
    "Javelin",
    "Light Hammer",
    "Mace",
    "Quarterstaff",
    "Sickle",
    "Spear",
    "Longsword",
    "Rapier",
    "Scimitar",
    "Warhammer",
];

const DAMAGE_DICE: [&str; 6] = ["1d4", "1d6", "1d8", "1d10", "1d12", "2d6"];
const DAMAGE_TYPES: [&str; 3] = ["bludgeoning", "piercing", "slashing"];
const RARITIES: [&str; 5] = ["common", "uncommon", "rare", "very rare", "legendary"];
const RANGES: [&str; 5] = ["", "20/60", "30/120", "80/320", "150/600"];
const PROPERTIES: [&str; 8] = [
    "finesse",
    "light",
    "thrown",
    "versatile (1d10)",
    "two-handed",
    "heavy",
    "reach",
    "ammunition",
];
const LORE_WORDS: [&str; 20] = [
    "forged", "by", "dwarven", "smiths", "under", "the", "mountain", "etched", "with", "runes",
    "that", "glow", "faintly", "in", "moonlight", "once", "carried", "a", "forgotten", "king",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Seeded generator of plausible item and weapon field mappings.
#[derive(Debug, Clone)]
pub struct LootFaker {
    rng: DeterministicRng,
}

impl LootFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn item(&mut self) -> ItemFields {
        let name = format!("{} {}", self.pick(&ITEM_NOUNS), self.pick(&ITEM_QUALIFIERS));
        let charges = if self.rng.bool() {
            self.int_range(1, 7).to_string()
        } else {
            String::new()
        };
        ItemFields {
            name,
            price: format!("{}gp", self.int_range(1, 500)),
            charges,
            quantity: self.int_range(-2, 20).to_string(),
        }
    }

    pub fn weapon(&mut self) -> WeaponFields {
        let bonus = self.int_range(0, 3);
        let first_property = self.pick(&PROPERTIES);
        let properties = if self.rng.bool() {
            format!("{first_property}, {}", self.pick(&PROPERTIES))
        } else {
            first_property.to_owned()
        };
        WeaponFields {
            name: self.pick(&WEAPON_NAMES).to_owned(),
            weight: self.int_range(1, 18).to_string(),
            modifiers: if bonus == 0 {
                String::new()
            } else {
                format!("+{bonus}")
            },
            damage: self.pick(&DAMAGE_DICE).to_owned(),
            range: self.pick(&RANGES).to_owned(),
            damage_type: self.pick(&DAMAGE_TYPES).to_owned(),
            price: format!("{}gp", self.int_range(1, 50)),
            rarity: self.pick(&RARITIES).to_owned(),
            properties,
            description: self.description(),
        }
    }

    fn description(&mut self) -> String {
        let lines = self.int_range(1, 3);
        (0..lines)
            .map(|index| {
                let sentence = self.sentence(3, 8);
                if index > 0 && self.rng.bool() {
                    format!("  {sentence}")
                } else {
                    sentence
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn sentence(&mut self, min_words: i64, max_words: i64) -> String {
        let count = self.int_range(min_words, max_words);
        let mut sentence = (0..count)
            .map(|_| self.pick(&LORE_WORDS))
            .collect::<Vec<_>>()
            .join(" ");
        if let Some(first) = sentence.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        sentence.push('.');
        sentence
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        min + (self.rng.next_u64() % (span as u64)) as i64
    }
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("hoard.db");
    Ok((dir, db_path))
}

/// The weapon used throughout the export examples.
pub fn dagger() -> WeaponFields {
    WeaponFields {
        name: "Dagger".to_owned(),
        weight: "1".to_owned(),
        modifiers: "+1".to_owned(),
        damage: "1d4".to_owned(),
        range: "20/60".to_owned(),
        damage_type: "piercing".to_owned(),
        price: "2gp".to_owned(),
        rarity: "common".to_owned(),
        properties: "finesse, light, thrown".to_owned(),
        description: "A simple blade.".to_owned(),
    }
}
