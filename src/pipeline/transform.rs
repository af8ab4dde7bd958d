use crate::common::{rewrite_share_link, slugify};
use crate::pipeline::tsv::{FlatRow, GroupedRow};
use crate::types::{Entity, FlatRecord, OutfitTag, OutfitVariant};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

static OUTFIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\((.*?)\)").expect("valid regex"));
static PARENTHETICAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\(.*?\)").expect("valid regex"));

/// Split `"Alex (Winter)"` into `("Alex", Some("Winter"))`.
///
/// Only the first parenthetical becomes the outfit, but every parenthetical
/// (with the whitespace before it) is removed from the name. An empty `()`
/// yields no outfit.
pub fn split_name(raw: &str) -> (String, Option<String>) {
    let Some(caps) = OUTFIT.captures(raw) else {
        return (raw.to_string(), None);
    };
    let outfit = caps
        .get(1)
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let name = PARENTHETICAL.replace_all(raw, "").trim().to_string();
    (name, outfit)
}

fn outfit_tag(outfit: Option<String>) -> Option<OutfitTag> {
    outfit.map(|outfit| OutfitTag {
        slug: slugify(&outfit),
        outfit,
    })
}

/// One record per row. Rows whose names collapse to the same slug get an
/// increasing `index` (1, 2, ...) in row order.
pub fn transform_flat(rows: &[FlatRow], height_cm: f64) -> Vec<FlatRecord> {
    let mut slug_counts: HashMap<String, u32> = HashMap::new();

    rows.iter()
        .map(|row| {
            let (name, outfit) = split_name(&row.name);
            let name_slug = slugify(&name);

            let count = slug_counts.entry(name_slug.clone()).or_insert(0);
            *count += 1;
            let index = *count;
            if index > 1 {
                debug!(name_slug = %name_slug, index, "repeated slug");
            }

            FlatRecord {
                name,
                name_slug,
                index,
                face_pic_url: rewrite_share_link(&row.face_link),
                body_pic_url: rewrite_share_link(&row.body_link),
                outfit_weight_threshold_in_lb: row.weight_threshold_lb,
                height_in_cm: height_cm,
                main_shape: row.main_shape.clone(),
                outfit: outfit_tag(outfit),
                secondary_shape: row.secondary_shape.clone(),
            }
        })
        .collect()
}

/// Fold rows into one entity per slug. Entities come out in first-seen order,
/// outfits in row order; the first row for a slug fixes its name and height.
pub fn transform_grouped(rows: &[GroupedRow]) -> Vec<Entity> {
    let mut entities: Vec<Entity> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let (name, outfit) = split_name(&row.name);
        let name_slug = slugify(&name);

        let variant = OutfitVariant {
            outfit_weight_threshold_in_lb: row.weight_threshold_lb,
            main_shape: row.main_shape.clone(),
            outfit: outfit_tag(outfit),
            secondary_shape: row.secondary_shape.clone(),
        };

        match positions.get(&name_slug) {
            Some(&pos) => entities[pos].outfits.push(variant),
            None => {
                positions.insert(name_slug.clone(), entities.len());
                entities.push(Entity {
                    name,
                    name_slug,
                    height_in_cm: row.height_cm,
                    outfits: vec![variant],
                });
            }
        }
    }

    entities
}
