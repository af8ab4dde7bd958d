use serde::{Deserialize, Serialize};
use std::fmt;

/// Named outfit split out of a parenthesised name suffix.
///
/// Flattened into its parent record so `outfit` and `outfitSlug` are either
/// both present in the JSON or both absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutfitTag {
    pub outfit: String,
    #[serde(rename = "outfitSlug")]
    pub slug: String,
}

/// One record per input row; the shape consumed by the download stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatRecord {
    pub name: String,
    pub name_slug: String,
    /// 1-based occurrence of `name_slug` within one transform run
    pub index: u32,
    pub face_pic_url: String,
    pub body_pic_url: String,
    pub outfit_weight_threshold_in_lb: f64,
    pub height_in_cm: f64,
    pub main_shape: String,
    #[serde(flatten)]
    pub outfit: Option<OutfitTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_shape: Option<String>,
}

/// All rows sharing one `nameSlug`, folded together.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub name: String,
    pub name_slug: String,
    pub height_in_cm: f64,
    pub outfits: Vec<OutfitVariant>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutfitVariant {
    pub outfit_weight_threshold_in_lb: f64,
    pub main_shape: String,
    #[serde(flatten)]
    pub outfit: Option<OutfitTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_shape: Option<String>,
}

/// The subset of a flat record the download stage needs. Anything else in
/// the JSON is ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageEntry {
    pub name_slug: String,
    #[serde(default)]
    pub outfit_slug: Option<String>,
    pub face_pic_url: String,
    pub body_pic_url: String,
}

impl ImageEntry {
    /// `{nameSlug}[_{outfitSlug}]_{role}`
    pub fn base_name(&self, role: ImageRole) -> String {
        match &self.outfit_slug {
            Some(outfit) => format!("{}_{}_{}", self.name_slug, outfit, role),
            None => format!("{}_{}", self.name_slug, role),
        }
    }

    pub fn url(&self, role: ImageRole) -> &str {
        match role {
            ImageRole::Face => &self.face_pic_url,
            ImageRole::Body => &self.body_pic_url,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRole {
    Face,
    Body,
}

impl ImageRole {
    pub const ALL: [ImageRole; 2] = [ImageRole::Face, ImageRole::Body];

    pub fn as_str(self) -> &'static str {
        match self {
            ImageRole::Face => "face",
            ImageRole::Body => "body",
        }
    }
}

impl fmt::Display for ImageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
