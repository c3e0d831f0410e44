// src/document/templates.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::map::{Door, DoorKind, DoorRecord};

/// Named snapshots of objects the author wants to reuse, e.g. a door with a
/// particular name and keypad prompt. Stored in the map file.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectTemplates {
    objects: BTreeMap<String, Value>,
}

impl ObjectTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Template name for an object: `"(Kind) prefix name"`.
    pub fn name_for(kind: &str, prefix: &str, name: &str) -> String {
        format!("({}) {} {}", kind, prefix, name)
    }

    /// Stores `value` under its template name, replacing an older one.
    pub fn save(&mut self, kind: &str, prefix: &str, name: &str, value: Value) -> String {
        let key = Self::name_for(kind, prefix, name);
        self.objects.insert(key.clone(), value);
        key
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.objects.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.objects.remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.objects.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }

    /// Snapshot of a door without its id or destination.
    pub fn save_door(&mut self, door: &Door) -> Result<String, serde_json::Error> {
        let mut rec = DoorRecord {
            tile_id: String::new(),
            prefix: door.prefix.clone(),
            name: door.name.clone(),
            code: None,
            prompt: None,
            replacement_tile: None,
        };
        if let DoorKind::Keypad { code, prompt } = &door.kind {
            rec.code = Some(*code);
            rec.prompt = Some(prompt.clone());
        }
        let value = serde_json::to_value(&rec)?;
        Ok(self.save(door.type_name(), &door.prefix, &door.name, value))
    }

    /// A new unattached door from a door template, with id `tile_id`.
    /// `None` when `name` is unknown or is not a door.
    pub fn door(&self, name: &str, tile_id: &str) -> Option<Door> {
        let rec: DoorRecord = serde_json::from_value(self.get(name)?.clone()).ok()?;
        Some(match rec.code {
            Some(code) => Door::keypad(
                tile_id,
                &rec.prefix,
                &rec.name,
                code,
                rec.prompt.as_deref().unwrap_or_default(),
                None,
            ),
            None => Door::locked(tile_id, &rec.prefix, &rec.name, None),
        })
    }
}
