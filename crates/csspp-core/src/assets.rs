//! Side-channel data for declarations that have no CSS representation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub type SelectorMap = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetKind {
    Audio,
    Texture,
    Material,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMap {
    pub audio: SelectorMap,
    pub textures: SelectorMap,
    pub materials: SelectorMap,
}

impl AssetMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn section_mut(&mut self, kind: AssetKind) -> &mut SelectorMap {
        match kind {
            AssetKind::Audio => &mut self.audio,
            AssetKind::Texture => &mut self.textures,
            AssetKind::Material => &mut self.materials,
        }
    }

    pub fn section(&self, kind: AssetKind) -> &SelectorMap {
        match kind {
            AssetKind::Audio => &self.audio,
            AssetKind::Texture => &self.textures,
            AssetKind::Material => &self.materials,
        }
    }

    /// Records one binding. Different properties on a selector accumulate;
    /// the same `(selector, property)` pair is overwritten.
    pub fn insert(
        &mut self,
        kind: AssetKind,
        selector: impl Into<String>,
        property: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.section_mut(kind)
            .entry(selector.into())
            .or_default()
            .insert(property.into(), value.into());
    }

    /// Folds `other` into `self`. A selector present in both is replaced
    /// wholesale by `other`'s entry.
    pub fn merge(&mut self, other: &AssetMap) {
        for kind in [AssetKind::Audio, AssetKind::Texture, AssetKind::Material] {
            let target = self.section_mut(kind);
            for (selector, props) in other.section(kind) {
                target.insert(selector.clone(), props.clone());
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.audio.is_empty() && self.textures.is_empty() && self.materials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_accumulates_and_overwrites() {
        let mut map = AssetMap::new();
        map.insert(AssetKind::Audio, ".btn", "hover-sfx", "a.mp3");
        map.insert(AssetKind::Audio, ".btn", "click-sfx", "b.mp3");
        map.insert(AssetKind::Audio, ".btn", "hover-sfx", "c.mp3");

        let btn = &map.audio[".btn"];
        assert_eq!(btn.len(), 2);
        assert_eq!(btn["hover-sfx"], "c.mp3");
        assert_eq!(btn["click-sfx"], "b.mp3");
        assert!(map.textures.is_empty());
    }

    #[test]
    fn merge_is_last_write_wins_per_selector() {
        let mut first = AssetMap::new();
        first.insert(AssetKind::Audio, ".btn", "hover-sfx", "a.mp3");
        first.insert(AssetKind::Audio, ".btn", "click-sfx", "b.mp3");
        first.insert(AssetKind::Texture, ".wall", "texture", "brick.png");

        let mut second = AssetMap::new();
        second.insert(AssetKind::Audio, ".btn", "hover-sfx", "z.mp3");

        first.merge(&second);
        assert_eq!(first.audio[".btn"].len(), 1);
        assert_eq!(first.audio[".btn"]["hover-sfx"], "z.mp3");
        assert_eq!(first.textures[".wall"]["texture"], "brick.png");
    }

    #[test]
    fn serializes_all_sections() {
        let json = serde_json::to_value(AssetMap::new()).unwrap();
        assert_eq!(json, serde_json::json!({"audio": {}, "textures": {}, "materials": {}}));
    }
}
