//! Table loader - decodes raw table bytes into keyed rows
//!
//! The on-disk format is picked from the source extension. Both formats are
//! plain lists of row records; the key of each row comes from the domain.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::Domain;

/// Error while resolving or decoding a table source
#[derive(Debug, Error)]
pub enum LoadError {
    /// Source handle was never assigned
    #[error("Source handle is unset")]
    Unset,
    /// Asset not found
    #[error("Source not found: {0}")]
    NotFound(String),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Parse/decode error
    #[error("Parse error in {path}: {message}")]
    Parse { path: String, message: String },
    /// Unsupported format
    #[error("Unsupported table format: {0}")]
    UnsupportedFormat(String),
}

/// Result type for table loading
pub type LoadResult<T> = Result<T, LoadError>;

/// Serialized layout of a table source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Top-level JSON array of row objects
    Json,
    /// TOML document with a `[[rows]]` array of tables
    Toml,
}

impl TableFormat {
    /// File extensions recognized for each format
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Json => &["json"],
            Self::Toml => &["toml"],
        }
    }

    /// Pick a format from a path's extension (case-insensitive)
    pub fn from_path(path: &str) -> LoadResult<Self> {
        let ext = path
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .ok_or_else(|| LoadError::UnsupportedFormat("No file extension".into()))?;

        [Self::Json, Self::Toml]
            .into_iter()
            .find(|format| format.extensions().contains(&ext.as_str()))
            .ok_or(LoadError::UnsupportedFormat(ext))
    }
}

#[derive(Deserialize)]
struct TomlTable<R> {
    #[serde(default = "Vec::new")]
    rows: Vec<R>,
}

/// Context provided while decoding one source
pub struct LoadContext<'a> {
    /// Source path being loaded
    pub path: &'a str,
    /// Raw table data
    pub data: &'a [u8],
}

impl<'a> LoadContext<'a> {
    /// Create a new load context
    pub fn new(path: &'a str, data: &'a [u8]) -> Self {
        Self { path, data }
    }

    /// Read data as string (UTF-8)
    pub fn read_string(&self) -> LoadResult<&str> {
        core::str::from_utf8(self.data)
            .map_err(|e| self.parse_error(format!("Invalid UTF-8: {}", e)))
    }

    /// Decode every row of the source, in file order
    pub fn decode_rows<R: DeserializeOwned>(&self) -> LoadResult<Vec<R>> {
        match TableFormat::from_path(self.path)? {
            TableFormat::Json => {
                serde_json::from_slice(self.data).map_err(|e| self.parse_error(e.to_string()))
            }
            TableFormat::Toml => {
                let text = self.read_string()?;
                toml::from_str::<TomlTable<R>>(text)
                    .map(|table| table.rows)
                    .map_err(|e| self.parse_error(e.to_string()))
            }
        }
    }

    /// Decode rows and pair each with its key, preserving source order
    pub fn decode_keyed<D: Domain>(&self) -> LoadResult<Vec<(D::Key, D::Row)>> {
        Ok(self
            .decode_rows::<D::Row>()?
            .into_iter()
            .map(|row| (D::key_of(&row), row))
            .collect())
    }

    fn parse_error(&self, message: String) -> LoadError {
        LoadError::Parse {
            path: self.path.to_string(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CharacterAsset, HitStop};
    use crate::keys::{CharacterType, DamageType};

    #[test]
    fn test_format_from_path() {
        assert_eq!(TableFormat::from_path("DT_HitStop.json").unwrap(), TableFormat::Json);
        assert_eq!(TableFormat::from_path("a/b/DT.TOML").unwrap(), TableFormat::Toml);
        assert!(matches!(
            TableFormat::from_path("DT_HitStop.csv"),
            Err(LoadError::UnsupportedFormat(ext)) if ext == "csv"
        ));
        assert!(TableFormat::from_path("no_extension").is_err());
    }

    #[test]
    fn test_decode_json_keeps_order() {
        let data = br#"[
            { "damage_type": "Blunt", "delay_time": 0.5 },
            { "damage_type": "Slash", "delay_time": 0.2 }
        ]"#;
        let ctx = LoadContext::new("DT_HitStop.json", data);

        let rows = ctx.decode_keyed::<HitStop>().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, DamageType::Blunt);
        assert_eq!(rows[1].0, DamageType::Slash);
        assert_eq!(rows[1].1.delay_time, 0.2);
    }

    #[test]
    fn test_decode_toml() {
        let data = br#"
            [[rows]]
            character_type = "Boss"
            mesh_path = "/Game/Boss/SK_Boss"

            [[rows]]
            character_type = "Player"
            mesh_path = "/Game/Player/SK_Player"
            portrait_path = "/Game/UI/T_Player"
        "#;
        let ctx = LoadContext::new("DT_CharacterAsset.toml", data);

        let rows = ctx.decode_keyed::<CharacterAsset>().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, CharacterType::Boss);
        assert_eq!(rows[1].1.portrait_path, "/Game/UI/T_Player");
    }

    #[test]
    fn test_decode_error_names_path() {
        let ctx = LoadContext::new("DT_HitStop.json", b"{ not json");
        match ctx.decode_keyed::<HitStop>() {
            Err(LoadError::Parse { path, .. }) => assert_eq!(path, "DT_HitStop.json"),
            other => panic!("expected parse error, got {:?}", other.map(|r| r.len())),
        }
    }
}
