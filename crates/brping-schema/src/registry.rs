use std::collections::btree_map::{BTreeMap, Entry};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::config::RegistryConfig;
use crate::entry::SchemaEntry;
use crate::error::{Result, SchemaError};
use crate::field::FieldSpec;
use crate::ping1d::PING1D;

/// Id-keyed table of message layouts.
///
/// Populated once at construction; there is no insertion or removal API.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    entries: BTreeMap<u16, Arc<SchemaEntry>>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TableFile {
    messages: Vec<TableEntry>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TableEntry {
    id: u16,
    name: String,
    #[serde(default)]
    fields: Vec<FieldSpec>,
}

impl SchemaRegistry {
    /// The built-in Ping1D message table.
    pub fn ping1d() -> Self {
        let entries = PING1D.iter().map(|(id, name, fields)| {
            let fields = fields
                .iter()
                .map(|(field, ty)| FieldSpec::new(*field, *ty))
                .collect();
            SchemaEntry::new(*id, *name, fields)
        });

        // The static table is covered by `builtin_table_is_consistent`.
        match entries
            .collect::<Result<Vec<_>>>()
            .and_then(Self::from_entries)
        {
            Ok(registry) => registry,
            Err(err) => unreachable!("built-in Ping1D table is invalid: {err}"),
        }
    }

    /// Build a registry from already-validated entries.
    pub fn from_entries(entries: impl IntoIterator<Item = SchemaEntry>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for entry in entries {
            match map.entry(entry.type_id()) {
                Entry::Occupied(_) => return Err(SchemaError::DuplicateId(entry.type_id())),
                Entry::Vacant(slot) => {
                    slot.insert(Arc::new(entry));
                }
            }
        }
        Ok(Self { entries: map })
    }

    /// Parse a JSON schema table with default limits.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_json_str_with_config(json, RegistryConfig::default())
    }

    /// Parse a JSON schema table with explicit limits.
    pub fn from_json_str_with_config(json: &str, config: RegistryConfig) -> Result<Self> {
        let table: TableFile = serde_json::from_str(json)?;
        if table.messages.len() > config.max_entries {
            return Err(SchemaError::LoadFailed(format!(
                "schema table has {} entries, max {}",
                table.messages.len(),
                config.max_entries
            )));
        }

        let entries = table
            .messages
            .into_iter()
            .map(|entry| SchemaEntry::new(entry.id, entry.name, entry.fields))
            .collect::<Result<Vec<_>>>()?;
        let registry = Self::from_entries(entries)?;
        tracing::debug!(entries = registry.len(), "loaded schema table");
        Ok(registry)
    }

    /// Load a JSON schema table from a file with default limits.
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_file_with_config(path, RegistryConfig::default())
    }

    /// Load a JSON schema table from a file with explicit limits.
    pub fn from_file_with_config(path: &Path, config: RegistryConfig) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|err| SchemaError::LoadFailed(format!("{}: {err}", path.display())))?;
        let metadata = file
            .metadata()
            .map_err(|err| SchemaError::LoadFailed(format!("{}: {err}", path.display())))?;
        if metadata.len() > config.max_file_size as u64 {
            return Err(SchemaError::LoadFailed(format!(
                "schema table too large ({} bytes): {}",
                metadata.len(),
                path.display()
            )));
        }

        let read_limit = u64::try_from(config.max_file_size.saturating_add(1)).unwrap_or(u64::MAX);
        let mut content = String::new();
        file.take(read_limit)
            .read_to_string(&mut content)
            .map_err(|err| {
                SchemaError::LoadFailed(format!("failed reading {}: {err}", path.display()))
            })?;
        if content.len() > config.max_file_size {
            return Err(SchemaError::LoadFailed(format!(
                "schema table too large while reading: {}",
                path.display()
            )));
        }

        Self::from_json_str_with_config(&content, config)
    }

    /// Look up the layout for a message id.
    pub fn lookup(&self, type_id: u16) -> Option<Arc<SchemaEntry>> {
        self.entries.get(&type_id).cloned()
    }

    /// Look up a layout by message name.
    pub fn lookup_name(&self, name: &str) -> Option<Arc<SchemaEntry>> {
        self.entries
            .values()
            .find(|entry| entry.name() == name)
            .cloned()
    }

    pub fn contains(&self, type_id: u16) -> bool {
        self.entries.contains_key(&type_id)
    }

    /// Registered message ids in ascending order.
    pub fn ids(&self) -> Vec<u16> {
        self.entries.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<SchemaEntry>> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
