//! Backend-agnostic font configuration for canvas contexts.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

/// Font configuration resolved once into a `fontdb` database and shared
/// across contexts.
#[derive(Clone, Debug)]
pub struct FontConfig {
    /// Custom font data to register (raw TTF/OTF bytes).
    pub custom_fonts: Vec<Arc<Vec<u8>>>,
    /// Mappings from generic CSS family names to concrete font family
    /// names, in priority order.
    pub generic_families: GenericFamilyMap,
    /// Whether to load system fonts (default: true).
    pub load_system_fonts: bool,
    /// Additional directories to scan for font files.
    pub font_dirs: Vec<PathBuf>,
    /// Whether font hinting is enabled for text rendering.
    ///
    /// Disabled by default to match vector text rendering behavior.
    pub hinting_enabled: bool,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            custom_fonts: Vec::new(),
            generic_families: GenericFamilyMap::defaults(),
            load_system_fonts: true,
            font_dirs: Vec::new(),
            hinting_enabled: false,
        }
    }
}

/// Mappings from generic CSS family names to concrete font family names.
#[derive(Clone, Debug, Default)]
pub struct GenericFamilyMap {
    pub serif: Vec<String>,
    pub sans_serif: Vec<String>,
    pub monospace: Vec<String>,
    pub cursive: Vec<String>,
    pub fantasy: Vec<String>,
}

impl GenericFamilyMap {
    /// Default generic family mappings matching browser behavior.
    pub fn defaults() -> Self {
        Self {
            sans_serif: vec!["Arial".into(), "Helvetica".into(), "Liberation Sans".into()],
            monospace: vec![
                "Courier New".into(),
                "Courier".into(),
                "Liberation Mono".into(),
                "DejaVu Sans Mono".into(),
            ],
            serif: vec![
                "Times New Roman".into(),
                "Times".into(),
                "Liberation Serif".into(),
                "DejaVu Serif".into(),
            ],
            cursive: vec!["Comic Sans MS".into(), "Apple Chancery".into()],
            fantasy: vec!["Impact".into(), "Papyrus".into()],
        }
    }
}

impl FontConfig {
    /// Resolve this configuration into a concrete font database.
    ///
    /// This performs the expensive work (system font scanning, directory
    /// loading, custom font registration) once; the result can be shared
    /// across contexts without repeating the scan.
    pub fn resolve(&self) -> ResolvedFontConfig {
        ResolvedFontConfig::new(self)
    }
}

/// A [`FontConfig`] resolved into a concrete font database.
pub struct ResolvedFontConfig {
    pub(crate) fontdb: fontdb::Database,
    pub(crate) hinting_enabled: bool,
}

impl ResolvedFontConfig {
    /// Resolve a [`FontConfig`] into a concrete font database.
    pub fn new(config: &FontConfig) -> Self {
        Self {
            fontdb: font_config_to_fontdb(config),
            hinting_enabled: config.hinting_enabled,
        }
    }
}

/// Convert a [`FontConfig`] into a `fontdb::Database`.
pub fn font_config_to_fontdb(config: &FontConfig) -> fontdb::Database {
    let mut db = fontdb::Database::new();

    if config.load_system_fonts {
        db.load_system_fonts();
    }

    for dir in &config.font_dirs {
        db.load_fonts_dir(dir);
    }

    for data in &config.custom_fonts {
        db.load_font_data(Vec::from(data.as_slice()));
    }

    apply_generic_families(&mut db, &config.generic_families);

    db
}

/// Point each generic family at the first available concrete family from
/// its priority list.
fn apply_generic_families(db: &mut fontdb::Database, families: &GenericFamilyMap) {
    let available: HashSet<String> = db
        .faces()
        .flat_map(|face| {
            face.families
                .iter()
                .map(|(fam, _lang)| fam.clone())
                .collect::<Vec<_>>()
        })
        .collect();

    let pick = |list: &[String]| -> Option<String> {
        list.iter().find(|f| available.contains(*f)).cloned()
    };

    if let Some(f) = pick(&families.sans_serif) {
        db.set_sans_serif_family(f);
    }
    if let Some(f) = pick(&families.monospace) {
        db.set_monospace_family(f);
    }
    if let Some(f) = pick(&families.serif) {
        db.set_serif_family(f);
    }
    if let Some(f) = pick(&families.cursive) {
        db.set_cursive_family(f);
    }
    if let Some(f) = pick(&families.fantasy) {
        db.set_fantasy_family(f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_font_config() {
        let config = FontConfig::default();
        assert!(config.custom_fonts.is_empty());
        assert!(config.load_system_fonts);
        assert!(config.font_dirs.is_empty());
        assert_eq!(config.generic_families.sans_serif[0], "Arial");
        assert!(!config.hinting_enabled);
    }

    #[test]
    fn test_font_config_to_fontdb_no_system_fonts() {
        let config = FontConfig {
            load_system_fonts: false,
            ..FontConfig::default()
        };
        let db = font_config_to_fontdb(&config);
        // With no system fonts and no custom fonts, database has no faces
        assert_eq!(db.faces().count(), 0);
    }

    #[test]
    fn test_custom_font_data_shared() {
        let data = Arc::new(vec![0u8; 1000]);
        let config = FontConfig {
            custom_fonts: vec![data.clone()],
            ..FontConfig::default()
        };
        let cloned = config.clone();
        assert!(Arc::ptr_eq(&config.custom_fonts[0], &cloned.custom_fonts[0]));
    }
}
