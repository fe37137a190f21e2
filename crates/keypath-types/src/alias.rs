//! Type alias repository
//!
//! Aliases give long fully-qualified type names short display forms.
//! The table loads from a two-column CSV resource (`type,alias`, with
//! a header row). Loading is lenient: a malformed or conflicting row
//! is logged and skipped, never fatal, so one bad entry cannot take
//! the whole table down.

use std::io;
use std::path::Path;

use rustc_hash::FxHashMap;

use crate::registry::TypeRegistry;

/// Bidirectional alias table
#[derive(Default)]
pub struct AliasRepository {
    alias_to_type: FxHashMap<String, String>,
    type_to_alias: FxHashMap<String, String>,
}

impl AliasRepository {
    /// Empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a CSV file; an unreadable file yields an empty
    /// repository with a warning
    pub fn load_from_path(path: impl AsRef<Path>, registry: &TypeRegistry) -> Self {
        let path = path.as_ref();
        match std::fs::File::open(path) {
            Ok(file) => Self::load_from_reader(file, registry),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "alias file unreadable, starting empty");
                Self::new()
            }
        }
    }

    /// Load from any CSV reader with a `type,alias` header row; extra
    /// columns are ignored
    pub fn load_from_reader(reader: impl io::Read, registry: &TypeRegistry) -> Self {
        let mut repository = Self::new();
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        for (row, record) in csv.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(err) => {
                    tracing::warn!(row, error = %err, "skipping unparseable alias row");
                    continue;
                }
            };
            let (Some(type_name), Some(alias)) = (record.get(0), record.get(1)) else {
                tracing::warn!(row, "skipping alias row with missing columns");
                continue;
            };
            repository.register(registry, type_name.trim(), alias.trim());
        }
        repository
    }

    /// Register one alias; false (with a warning) when it fails
    /// validation or duplicates an existing entry
    pub fn register(&mut self, registry: &TypeRegistry, type_name: &str, alias: &str) -> bool {
        if let Err(reason) = Self::validate(registry, type_name, alias) {
            tracing::warn!(alias, type_name, reason, "rejected type alias");
            return false;
        }
        if !self.insert_validated(type_name, alias) {
            tracing::warn!(alias, type_name, "duplicate type alias, first registration wins");
            return false;
        }
        true
    }

    /// Registry-dependent validation, shared with programmatic
    /// registration
    pub(crate) fn validate(
        registry: &TypeRegistry,
        type_name: &str,
        alias: &str,
    ) -> Result<(), &'static str> {
        if !registry.resolves_without_aliases(type_name) {
            return Err("target type does not resolve");
        }
        if !is_legal_alias(alias) {
            return Err("alias is not a legal identifier");
        }
        if alias == type_name {
            return Err("alias names its own target");
        }
        if registry.resolves_without_aliases(alias) {
            return Err("alias collides with a resolvable type name");
        }
        let shadows_short_name = registry
            .classes()
            .names()
            .iter()
            .any(|name| name.rsplit('.').next() == Some(alias));
        if shadows_short_name {
            return Err("alias collides with a class short name");
        }
        let shadows_namespace = registry
            .classes()
            .names()
            .iter()
            .any(|name| name.split('.').next() == Some(alias) && name.contains('.'));
        if shadows_namespace {
            return Err("alias collides with a namespace root");
        }
        Ok(())
    }

    /// Insert an already-validated pair; false when the alias or the
    /// target type already has an entry
    pub(crate) fn insert_validated(&mut self, type_name: &str, alias: &str) -> bool {
        if self.alias_to_type.contains_key(alias) || self.type_to_alias.contains_key(type_name) {
            return false;
        }
        self.alias_to_type
            .insert(alias.to_string(), type_name.to_string());
        self.type_to_alias
            .insert(type_name.to_string(), alias.to_string());
        true
    }

    /// Alias registered for a type name
    pub fn alias_for(&self, type_name: &str) -> Option<&str> {
        self.type_to_alias.get(type_name).map(String::as_str)
    }

    /// Target type name for an alias
    pub fn type_for(&self, alias: &str) -> Option<&str> {
        self.alias_to_type.get(alias).map(String::as_str)
    }

    /// Number of registered aliases
    pub fn len(&self) -> usize {
        self.alias_to_type.len()
    }

    /// True when no alias is registered
    pub fn is_empty(&self) -> bool {
        self.alias_to_type.is_empty()
    }
}

fn is_legal_alias(alias: &str) -> bool {
    !alias.is_empty()
        && alias
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}
