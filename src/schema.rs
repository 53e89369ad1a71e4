//! Mirror and stage schema composition.
//!
//! A [`DerivedSchema`] is the ordered column → storage type mapping for one
//! warehouse layer: the data columns first, then the layer's reserved
//! metadata columns in their declared order.
//!
//! - **Mirror** keeps every data column as the string storage type and
//!   appends file-lineage columns.
//! - **Stage** keeps the inferred storage type of each column and appends
//!   audit and versioning columns.
//!
//! Metadata names are compared case-insensitively against data columns and a
//! clash is a [`ProfileError::SchemaConflict`].

use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use serde::{Deserialize, Serialize, Serializer, ser::SerializeMap};

use crate::{
    error::{ProfileError, Result},
    types::{ColumnProfile, StorageTypeMap},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataColumn {
    pub name: &'static str,
    pub storage_type: &'static str,
}

const fn meta(name: &'static str, storage_type: &'static str) -> MetadataColumn {
    MetadataColumn { name, storage_type }
}

pub const MIRROR_METADATA_COLUMNS: &[MetadataColumn] = &[
    meta("file_date", "TIMESTAMP"),
    meta("filename", "STRING"),
    meta("file_row_number", "STRING"),
    meta("file_last_modified", "TIMESTAMP"),
    meta("CREATED_DTS", "TIMESTAMP"),
    meta("CREATED_BY", "STRING"),
];

pub const STAGE_METADATA_COLUMNS: &[MetadataColumn] = &[
    meta("CREATED_DTS", "TIMESTAMP"),
    meta("CREATED_BY", "STRING"),
    meta("UPDATED_DTS", "TIMESTAMP"),
    meta("UPDATED_BY", "STRING"),
    meta("ACTIVE_FL", "STRING"),
    meta("EFFECTIVE_START_DATE", "TIMESTAMP"),
    meta("EFFECTIVE_END_DATE", "TIMESTAMP"),
    meta("UNIQUE_HASH_ID", "STRING"),
    meta("ROW_HASH_ID", "STRING"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Mirror,
    Stage,
}

impl Layer {
    pub fn metadata_columns(self) -> &'static [MetadataColumn] {
        match self {
            Layer::Mirror => MIRROR_METADATA_COLUMNS,
            Layer::Stage => STAGE_METADATA_COLUMNS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Layer::Mirror => "mirror",
            Layer::Stage => "stage",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered column → storage type pairs; serializes as a map in insertion
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SchemaMap(Vec<(String, String)>);

impl SchemaMap {
    /// Every column typed as the string storage type of `storage`.
    pub fn uniform(columns: &[String], storage: &StorageTypeMap<'_>) -> Self {
        let string_type = storage.string_type();
        SchemaMap(
            columns
                .iter()
                .map(|name| (name.clone(), string_type.to_string()))
                .collect(),
        )
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn storage_type(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, storage)| storage.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for SchemaMap {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, storage) in &self.0 {
            map.serialize_entry(name, storage)?;
        }
        map.end()
    }
}

/// Immutable per-layer schema produced by [`compose_schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedSchema {
    layer: Layer,
    columns: SchemaMap,
    data_columns: usize,
    unique_keys: Vec<String>,
}

impl DerivedSchema {
    pub fn layer(&self) -> Layer {
        self.layer
    }

    pub fn columns(&self) -> &SchemaMap {
        &self.columns
    }

    /// Data columns only, without the appended metadata.
    pub fn data_columns(&self) -> &[(String, String)] {
        &self.columns.entries()[..self.data_columns]
    }

    pub fn metadata_columns(&self) -> &[(String, String)] {
        &self.columns.entries()[self.data_columns..]
    }

    pub fn storage_type(&self, name: &str) -> Option<&str> {
        self.columns.storage_type(name)
    }

    pub fn unique_keys(&self) -> &[String] {
        &self.unique_keys
    }
}

impl Serialize for DerivedSchema {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.columns.serialize(serializer)
    }
}

pub fn compose_schema(
    columns: &[String],
    profiles: &[ColumnProfile],
    unique_keys: &[String],
    layer: Layer,
    storage: &StorageTypeMap<'_>,
) -> Result<DerivedSchema> {
    let mut seen = HashSet::with_capacity(columns.len());
    for name in columns {
        if !seen.insert(name.to_uppercase()) {
            return Err(ProfileError::DuplicateColumn(name.clone()));
        }
    }
    for key in unique_keys {
        if !columns.contains(key) {
            return Err(ProfileError::UnknownKeyColumn(key.clone()));
        }
    }
    for column in layer.metadata_columns() {
        if seen.contains(&column.name.to_uppercase()) {
            return Err(ProfileError::SchemaConflict {
                column: column.name.to_string(),
                layer,
            });
        }
    }

    let mut entries = match layer {
        Layer::Mirror => SchemaMap::uniform(columns, storage).0,
        Layer::Stage => {
            let by_name: HashMap<&str, &str> = profiles
                .iter()
                .map(|p| (p.name.as_str(), p.storage_type.as_str()))
                .collect();
            columns
                .iter()
                .map(|name| {
                    by_name
                        .get(name.as_str())
                        .map(|storage_type| (name.clone(), storage_type.to_string()))
                        .ok_or_else(|| ProfileError::MissingProfile(name.clone()))
                })
                .collect::<Result<Vec<_>>>()?
        }
    };
    let data_columns = entries.len();
    entries.extend(
        layer
            .metadata_columns()
            .iter()
            .map(|column| (column.name.to_string(), column.storage_type.to_string())),
    );

    Ok(DerivedSchema {
        layer,
        columns: SchemaMap(entries),
        data_columns,
        unique_keys: unique_keys.to_vec(),
    })
}
