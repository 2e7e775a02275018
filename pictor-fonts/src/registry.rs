//! The font registry: slots, alias edges, and variation queries.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::Hasher;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Reading a font file from disk failed.
    #[error("failed to read font file: {0}")]
    Io(#[from] std::io::Error),
}

/// Opaque key identifying a registered font.
///
/// The slot index is reused deterministically after removal, so the key
/// also carries the content hash; a stale key whose slot was reassigned
/// no longer matches and cannot remove the new occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontKey {
    slot: u32,
    hash: u64,
}

/// One style record within a family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontStyleEntry {
    /// OpenType weight class (100-900).
    pub weight: u16,
    /// OpenType width class (1-9).
    pub width: u16,
    /// Style keyword ("normal", "italic", "oblique").
    pub style: &'static str,
}

/// A font family and its registered styles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyStyles {
    /// Family name.
    pub family: String,
    /// Styles registered under the family.
    pub styles: Vec<FontStyleEntry>,
}

/// A variation axis of a variable font.
#[derive(Debug, Clone, PartialEq)]
pub struct VariationAxis {
    /// Four-character axis tag (e.g. "wght").
    pub tag: String,
    /// Minimum axis value.
    pub min: f32,
    /// Maximum axis value.
    pub max: f32,
    /// Default axis value.
    pub def: f32,
}

#[derive(Debug)]
struct FontEntry {
    hash: u64,
    /// Raw font bytes, kept for variation-axis queries.
    data: Arc<Vec<u8>>,
    /// Faces this entry contributed to the database.
    face_ids: Vec<fontdb::ID>,
    /// Family-name edges owned by this entry.
    names: Vec<String>,
    /// User alias edges owned by this entry.
    aliases: Vec<String>,
}

/// Registry owning a font database plus the name/alias index.
#[derive(Debug)]
pub struct FontRegistry {
    db: fontdb::Database,
    slots: Vec<Option<FontEntry>>,
    /// Freed slot indices, reused LIFO.
    free_slots: Vec<u32>,
    /// Name or alias to slot. Every key here is owned by exactly one
    /// entry's `names`/`aliases` list.
    by_name: HashMap<String, u32>,
    by_hash: HashMap<u64, u32>,
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self {
            db: fontdb::Database::new(),
            slots: Vec::new(),
            free_slots: Vec::new(),
            by_name: HashMap::new(),
            by_hash: HashMap::new(),
        }
    }
}

fn content_hash(data: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    hasher.write(data);
    hasher.finish()
}

impl FontRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered fonts.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Whether the registry holds no fonts.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The underlying font database (for wiring into text stacks).
    pub fn database(&self) -> &fontdb::Database {
        &self.db
    }

    /// Register a font from raw bytes, optionally under an alias.
    ///
    /// Returns `None` when the bytes are not a parseable font.
    /// Registering identical bytes again returns the existing key
    /// (adding the alias edge if a new one is given).
    pub fn register(&mut self, data: &[u8], alias: Option<&str>) -> Option<FontKey> {
        let hash = content_hash(data);

        if let Some(&slot) = self.by_hash.get(&hash) {
            if let Some(alias) = alias {
                self.link_alias(slot, alias);
            }
            return Some(FontKey { slot, hash });
        }

        let before: HashSet<fontdb::ID> = self.db.faces().map(|f| f.id).collect();
        self.db.load_font_data(data.to_vec());
        let face_ids: Vec<fontdb::ID> = self
            .db
            .faces()
            .map(|f| f.id)
            .filter(|id| !before.contains(id))
            .collect();

        if face_ids.is_empty() {
            log::warn!(target: "fonts", "rejected unparseable font data ({} bytes)", data.len());
            return None;
        }

        let mut names: Vec<String> = Vec::new();
        for id in &face_ids {
            if let Some(face) = self.db.face(*id) {
                for (family, _lang) in &face.families {
                    if !names.contains(family) {
                        names.push(family.clone());
                    }
                }
            }
        }

        let slot = self.allocate_slot(FontEntry {
            hash,
            data: Arc::new(data.to_vec()),
            face_ids,
            names: Vec::new(),
            aliases: Vec::new(),
        });

        let names_to_link = names;
        for name in names_to_link {
            self.link_name(slot, &name);
        }
        if let Some(alias) = alias {
            self.link_alias(slot, alias);
        }
        self.by_hash.insert(hash, slot);

        Some(FontKey { slot, hash })
    }

    /// Register a font file from disk, optionally under an alias.
    ///
    /// A nonexistent path is a synchronous error; unparseable content
    /// returns `Ok(None)`.
    pub fn register_from_path(
        &mut self,
        path: impl AsRef<Path>,
        alias: Option<&str>,
    ) -> Result<Option<FontKey>, RegistryError> {
        let data = std::fs::read(path)?;
        Ok(self.register(&data, alias))
    }

    /// Remove a registered font.
    ///
    /// Unlinks every family-name and alias edge owned by the entry, so no
    /// stale name can resolve afterwards, then frees the slot for
    /// deterministic reuse. Returns false for unknown or stale keys.
    pub fn remove(&mut self, key: &FontKey) -> bool {
        let Some(entry_slot) = self.slots.get_mut(key.slot as usize) else {
            return false;
        };
        let matches = entry_slot
            .as_ref()
            .map(|e| e.hash == key.hash)
            .unwrap_or(false);
        if !matches {
            return false;
        }
        let entry = entry_slot.take().expect("occupancy just checked");

        // Owned adjacency removal: every edge the entry carried goes away
        // with it. Only edges still pointing at this slot are unlinked,
        // so an alias later rebound to another font survives.
        for name in entry.names.iter().chain(entry.aliases.iter()) {
            if self.by_name.get(name) == Some(&key.slot) {
                self.by_name.remove(name);
            }
        }
        self.by_hash.remove(&entry.hash);
        for id in entry.face_ids {
            self.db.remove_face(id);
        }
        self.free_slots.push(key.slot);
        true
    }

    /// Remove several fonts; returns how many were actually removed.
    pub fn remove_batch(&mut self, keys: &[FontKey]) -> usize {
        keys.iter().filter(|key| self.remove(key)).count()
    }

    /// Remove every registered font; returns how many were removed.
    pub fn remove_all(&mut self) -> usize {
        let keys: Vec<FontKey> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(slot, entry)| {
                entry.as_ref().map(|e| FontKey {
                    slot: slot as u32,
                    hash: e.hash,
                })
            })
            .collect();
        self.remove_batch(&keys)
    }

    /// Whether a family name or alias resolves to a registered font.
    pub fn has(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Look up a font by family name or alias.
    pub fn lookup(&self, name: &str) -> Option<FontKey> {
        let slot = *self.by_name.get(name)?;
        let entry = self.slots.get(slot as usize)?.as_ref()?;
        Some(FontKey {
            slot,
            hash: entry.hash,
        })
    }

    /// Attach an additional alias to an already-resolvable name.
    /// Returns false when `existing` does not resolve.
    pub fn set_alias(&mut self, existing: &str, alias: &str) -> bool {
        let Some(&slot) = self.by_name.get(existing) else {
            return false;
        };
        self.link_alias(slot, alias);
        true
    }

    /// Families and styles currently in the database, grouped by family
    /// name and sorted for stable output.
    pub fn get_families(&self) -> Vec<FamilyStyles> {
        let mut grouped: HashMap<String, Vec<FontStyleEntry>> = HashMap::new();
        for face in self.db.faces() {
            let style = match face.style {
                fontdb::Style::Normal => "normal",
                fontdb::Style::Italic => "italic",
                fontdb::Style::Oblique => "oblique",
            };
            let entry = FontStyleEntry {
                weight: face.weight.0,
                width: face.stretch.to_number(),
                style,
            };
            for (family, _lang) in &face.families {
                let styles = grouped.entry(family.clone()).or_default();
                if !styles.contains(&entry) {
                    styles.push(entry.clone());
                }
            }
        }
        let mut families: Vec<FamilyStyles> = grouped
            .into_iter()
            .map(|(family, mut styles)| {
                styles.sort_by_key(|s| (s.weight, s.width));
                FamilyStyles { family, styles }
            })
            .collect();
        families.sort_by(|a, b| a.family.cmp(&b.family));
        families
    }

    /// Whether the named font is variable and covers the given
    /// weight/width/slant position.
    pub fn has_variations(&self, family: &str, weight: f32, width: f32, slant: f32) -> bool {
        let axes = self.get_variation_axes(family);
        if axes.is_empty() {
            return false;
        }
        let covers = |tag: &str, value: f32| {
            axes.iter()
                .find(|a| a.tag == tag)
                .map(|a| value >= a.min && value <= a.max)
        };
        covers("wght", weight).unwrap_or(true)
            && covers("wdth", width).unwrap_or(true)
            && covers("slnt", slant).unwrap_or(true)
    }

    /// Variation axes of the named font, empty for static fonts or
    /// unknown names.
    pub fn get_variation_axes(&self, family: &str) -> Vec<VariationAxis> {
        let Some(&slot) = self.by_name.get(family) else {
            return Vec::new();
        };
        let Some(Some(entry)) = self.slots.get(slot as usize) else {
            return Vec::new();
        };
        let Ok(face) = ttf_parser::Face::parse(&entry.data, 0) else {
            return Vec::new();
        };
        face.variation_axes()
            .into_iter()
            .map(|axis| VariationAxis {
                tag: String::from_utf8_lossy(&axis.tag.to_bytes()).into_owned(),
                min: axis.min_value,
                max: axis.max_value,
                def: axis.def_value,
            })
            .collect()
    }

    // --- Internal ---

    fn allocate_slot(&mut self, entry: FontEntry) -> u32 {
        match self.free_slots.pop() {
            Some(slot) => {
                self.slots[slot as usize] = Some(entry);
                slot
            }
            None => {
                self.slots.push(Some(entry));
                (self.slots.len() - 1) as u32
            }
        }
    }

    fn link_name(&mut self, slot: u32, name: &str) {
        self.relink(slot, name);
        if let Some(Some(entry)) = self.slots.get_mut(slot as usize) {
            if !entry.names.iter().any(|n| n == name) {
                entry.names.push(name.to_string());
            }
        }
    }

    fn link_alias(&mut self, slot: u32, alias: &str) {
        self.relink(slot, alias);
        if let Some(Some(entry)) = self.slots.get_mut(slot as usize) {
            if !entry.aliases.iter().any(|a| a == alias) {
                entry.aliases.push(alias.to_string());
            }
        }
    }

    /// Point a name at a slot, detaching it from any previous owner so
    /// the edge is never owned twice.
    fn relink(&mut self, slot: u32, name: &str) {
        if let Some(previous) = self.by_name.insert(name.to_string(), slot) {
            if previous != slot {
                if let Some(Some(entry)) = self.slots.get_mut(previous as usize) {
                    entry.names.retain(|n| n != name);
                    entry.aliases.retain(|a| a != name);
                }
            }
        }
    }

    /// Test-only: install an entry without font parsing, to exercise the
    /// slot/alias bookkeeping in isolation.
    #[cfg(test)]
    fn insert_raw(&mut self, data: &[u8], names: &[&str]) -> FontKey {
        let hash = content_hash(data);
        let slot = self.allocate_slot(FontEntry {
            hash,
            data: Arc::new(data.to_vec()),
            face_ids: Vec::new(),
            names: Vec::new(),
            aliases: Vec::new(),
        });
        for name in names {
            self.link_name(slot, name);
        }
        self.by_hash.insert(hash, slot);
        FontKey { slot, hash }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_rejects_garbage() {
        let mut fonts = FontRegistry::new();
        assert!(fonts.register(b"not a font at all", None).is_none());
        assert!(fonts.is_empty());
    }

    #[test]
    fn test_register_from_missing_path_is_error() {
        let mut fonts = FontRegistry::new();
        assert!(matches!(
            fonts.register_from_path("/no/such/font.ttf", None),
            Err(RegistryError::Io(_))
        ));
    }

    #[test]
    fn test_remove_unlinks_all_edges() {
        let mut fonts = FontRegistry::new();
        let key = fonts.insert_raw(b"font-a", &["Alpha"]);
        assert!(fonts.set_alias("Alpha", "A1"));
        assert!(fonts.set_alias("A1", "A2"));
        assert!(fonts.has("Alpha"));
        assert!(fonts.has("A1"));
        assert!(fonts.has("A2"));

        assert!(fonts.remove(&key));
        // No stale alias survives the removal.
        assert!(!fonts.has("Alpha"));
        assert!(!fonts.has("A1"));
        assert!(!fonts.has("A2"));
        assert!(fonts.is_empty());
    }

    #[test]
    fn test_stale_key_cannot_remove_reused_slot() {
        let mut fonts = FontRegistry::new();
        let old = fonts.insert_raw(b"font-a", &["Alpha"]);
        assert!(fonts.remove(&old));

        // The freed slot is reused for the next registration.
        let fresh = fonts.insert_raw(b"font-b", &["Beta"]);
        assert_eq!(fresh.slot, old.slot);
        assert_ne!(fresh.hash, old.hash);

        // The displaced key no longer matches and removes nothing.
        assert!(!fonts.remove(&old));
        assert!(fonts.has("Beta"));
        // A second removal with the stale key is still inert.
        assert!(!fonts.remove(&old));
        assert_eq!(fonts.len(), 1);
    }

    #[test]
    fn test_alias_rebinding_moves_ownership() {
        let mut fonts = FontRegistry::new();
        let a = fonts.insert_raw(b"font-a", &["Alpha"]);
        let _b = fonts.insert_raw(b"font-b", &["Beta"]);

        assert!(fonts.set_alias("Alpha", "Shared"));
        assert_eq!(fonts.lookup("Shared"), Some(a));

        // Rebinding the alias to the other font moves the edge; removing
        // the first font afterwards must not take "Shared" with it.
        assert!(fonts.set_alias("Beta", "Shared"));
        assert!(fonts.remove(&a));
        assert!(fonts.has("Shared"));
        assert_eq!(fonts.lookup("Shared"), fonts.lookup("Beta"));
    }

    #[test]
    fn test_duplicate_registration_returns_same_key() {
        let mut fonts = FontRegistry::new();
        let first = fonts.insert_raw(b"font-a", &["Alpha"]);
        // Same content hash resolves to the existing slot.
        let again = fonts.register(b"font-a", Some("Extra"));
        assert_eq!(again, Some(first));
        assert!(fonts.has("Extra"));
        assert_eq!(fonts.len(), 1);
    }

    #[test]
    fn test_remove_batch_counts_only_removed() {
        let mut fonts = FontRegistry::new();
        let a = fonts.insert_raw(b"font-a", &["Alpha"]);
        let b = fonts.insert_raw(b"font-b", &["Beta"]);
        assert!(fonts.remove(&a));
        // One already gone, one live.
        assert_eq!(fonts.remove_batch(&[a, b]), 1);
        assert!(fonts.is_empty());
    }

    #[test]
    fn test_remove_all() {
        let mut fonts = FontRegistry::new();
        fonts.insert_raw(b"font-a", &["Alpha"]);
        fonts.insert_raw(b"font-b", &["Beta"]);
        fonts.insert_raw(b"font-c", &["Gamma"]);
        assert_eq!(fonts.remove_all(), 3);
        assert!(fonts.is_empty());
        assert!(!fonts.has("Alpha"));
        assert_eq!(fonts.remove_all(), 0);
    }

    #[test]
    fn test_set_alias_requires_existing_name() {
        let mut fonts = FontRegistry::new();
        assert!(!fonts.set_alias("Nope", "Alias"));
        fonts.insert_raw(b"font-a", &["Alpha"]);
        assert!(fonts.set_alias("Alpha", "Alias"));
        assert_eq!(fonts.lookup("Alias"), fonts.lookup("Alpha"));
    }

    #[test]
    fn test_variation_queries_on_static_or_unknown() {
        let fonts = FontRegistry::new();
        assert!(fonts.get_variation_axes("Unknown").is_empty());
        assert!(!fonts.has_variations("Unknown", 400.0, 100.0, 0.0));
    }
}
