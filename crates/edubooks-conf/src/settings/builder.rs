//! Merging of configuration sources

use super::sources::{ConfigSource, SourceError};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
	#[error("Failed to load {source_name}: {error}")]
	Source {
		source_name: String,
		#[source]
		error: SourceError,
	},

	#[error("Failed to deserialize settings: {0}")]
	Deserialize(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum GetError {
	#[error("Key not found: {0}")]
	NotFound(String),

	#[error("Type mismatch for {key}: {error}")]
	Type {
		key: String,
		#[source]
		error: serde_json::Error,
	},
}

/// Collects sources and merges them in priority order
#[derive(Default)]
pub struct SettingsBuilder {
	sources: Vec<Box<dyn ConfigSource>>,
}

impl SettingsBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_source<S: ConfigSource + 'static>(mut self, source: S) -> Self {
		self.sources.push(Box::new(source));
		self
	}

	/// Loads every source; higher priorities win, sections merge key by key
	pub fn build(mut self) -> Result<MergedSettings, BuildError> {
		// Stable sort keeps insertion order among equal priorities
		self.sources.sort_by_key(|source| source.priority());

		let mut data = IndexMap::new();
		for source in &self.sources {
			let values = source.load().map_err(|error| BuildError::Source {
				source_name: source.description(),
				error,
			})?;
			tracing::trace!(source = %source.description(), keys = values.len(), "Merging settings source");
			for (key, value) in values {
				match data.get_mut(&key) {
					Some(existing) => merge_value(existing, value),
					None => {
						data.insert(key, value);
					}
				}
			}
		}

		Ok(MergedSettings { data })
	}
}

fn merge_value(target: &mut Value, incoming: Value) {
	match (target, incoming) {
		(Value::Object(target_map), Value::Object(incoming_map)) => {
			for (key, value) in incoming_map {
				match target_map.get_mut(&key) {
					Some(existing) => merge_value(existing, value),
					None => {
						target_map.insert(key, value);
					}
				}
			}
		}
		(target, incoming) => *target = incoming,
	}
}

/// Result of merging all sources
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedSettings {
	data: IndexMap<String, Value>,
}

impl MergedSettings {
	/// Looks up a dotted key such as `loans.daily_fine`
	pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, GetError> {
		let mut parts = key.split('.');
		let first = parts.next().unwrap_or_default();
		let mut current = self
			.data
			.get(first)
			.ok_or_else(|| GetError::NotFound(key.to_string()))?;
		for part in parts {
			current = current
				.get(part)
				.ok_or_else(|| GetError::NotFound(key.to_string()))?;
		}
		serde_json::from_value(current.clone()).map_err(|error| GetError::Type {
			key: key.to_string(),
			error,
		})
	}

	pub fn contains(&self, key: &str) -> bool {
		self.data.contains_key(key)
	}

	/// Deserializes the merged values into a typed settings struct
	pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, BuildError> {
		let object: serde_json::Map<String, Value> = self.data.into_iter().collect();
		Ok(serde_json::from_value(Value::Object(object))?)
	}
}
