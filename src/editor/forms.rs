// src/editor/forms.rs

//! Settings objects edited through generic forms. Each one describes its
//! fields with a static table; the UI renders the table, fills a
//! `FormValues` snapshot and the editor writes it back with `apply`.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::MapError;
use crate::map::{Direction, Door, DoorKind, Tile, TileAttributes};

/// Widget kind of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Str,
    /// Multi-line text.
    LongStr,
    Integer,
    Float,
    Bool,
    /// One of a fixed set of strings.
    Choice(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub label: &'static str,
}

impl FieldSpec {
    const fn new(name: &'static str, kind: FieldKind, label: &'static str) -> Self {
        Self { name, kind, label }
    }

    /// Checks `value` fits this field. Integers are accepted for float
    /// fields; strings for choice fields must be one of the choices.
    pub fn check(&self, value: &FieldValue) -> Result<(), MapError> {
        let ok = match (self.kind, value) {
            (FieldKind::Str | FieldKind::LongStr, FieldValue::Str(_)) => true,
            (FieldKind::Integer, FieldValue::Integer(_)) => true,
            (FieldKind::Float, FieldValue::Float(_) | FieldValue::Integer(_)) => true,
            (FieldKind::Bool, FieldValue::Bool(_)) => true,
            (FieldKind::Choice(choices), FieldValue::Str(s)) => choices.contains(&s.as_str()),
            _ => false,
        };
        if ok {
            Ok(())
        } else {
            Err(MapError::InvalidField {
                field: self.label.to_string(),
                reason: format!("'{}' is not a valid {:?} value", value, self.kind),
            })
        }
    }

    /// Parses text typed by the user into a value of this field's kind.
    pub fn parse(&self, text: &str) -> Result<FieldValue, MapError> {
        let invalid = |reason: &str| MapError::InvalidField {
            field: self.label.to_string(),
            reason: reason.to_string(),
        };
        let value = match self.kind {
            FieldKind::Str | FieldKind::LongStr | FieldKind::Choice(_) => {
                FieldValue::Str(text.to_string())
            }
            FieldKind::Integer => FieldValue::Integer(
                text.trim()
                    .parse()
                    .map_err(|_| invalid("expected a whole number"))?,
            ),
            FieldKind::Float => FieldValue::Float(
                text.trim()
                    .parse()
                    .map_err(|_| invalid("expected a number"))?,
            ),
            FieldKind::Bool => match text.trim().to_ascii_lowercase().as_str() {
                "y" | "yes" | "true" | "1" => FieldValue::Bool(true),
                "n" | "no" | "false" | "0" => FieldValue::Bool(false),
                _ => return Err(invalid("expected yes or no")),
            },
        };
        self.check(&value)?;
        Ok(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(x) => Some(*x),
            FieldValue::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Str(s) => f.write_str(s),
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Float(x) => write!(f, "{}", x),
            FieldValue::Bool(b) => f.write_str(if *b { "yes" } else { "no" }),
        }
    }
}

/// Values shown in, and collected from, one form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormValues {
    values: BTreeMap<String, FieldValue>,
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn set(&mut self, name: &str, value: FieldValue) {
        self.values.insert(name.to_string(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> + '_ {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Something the generic form can edit.
pub trait Editable {
    /// Form title.
    fn title(&self) -> &'static str;

    fn fields(&self) -> &'static [FieldSpec];

    fn get_field(&self, name: &str) -> Option<FieldValue>;

    /// Stores one value. The value has already passed `FieldSpec::check`.
    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), MapError>;

    fn values(&self) -> FormValues {
        let mut values = FormValues::new();
        for field in self.fields() {
            if let Some(value) = self.get_field(field.name) {
                values.set(field.name, value);
            }
        }
        values
    }

    /// Writes back every field present in `values`. All values are checked
    /// before any is written.
    fn apply(&mut self, values: &FormValues) -> Result<(), MapError> {
        let fields = self.fields();
        for field in fields {
            if let Some(value) = values.get(field.name) {
                field.check(value)?;
            }
        }
        for field in fields {
            if let Some(value) = values.get(field.name) {
                self.set_field(field.name, value.clone())?;
            }
        }
        Ok(())
    }
}

fn string(value: FieldValue) -> String {
    match value {
        FieldValue::Str(s) => s,
        other => other.to_string(),
    }
}

fn direction(value: &FieldValue) -> Result<Direction, MapError> {
    value
        .as_str()
        .unwrap_or_default()
        .parse()
        .map_err(|_| MapError::InvalidField {
            field: "direction".to_string(),
            reason: format!("'{}' is not a direction", value),
        })
}

fn unknown(name: &str) -> MapError {
    MapError::InvalidField {
        field: name.to_string(),
        reason: "no such field".to_string(),
    }
}

// --- Tile ---

#[derive(Debug, Clone, PartialEq)]
pub struct TileSettings {
    pub tile_id: String,
    pub attributes: TileAttributes,
}

impl TileSettings {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("description", FieldKind::LongStr, "description"),
        FieldSpec::new("name", FieldKind::Str, "name"),
        FieldSpec::new("tile_id", FieldKind::Str, "tile ID"),
        FieldSpec::new("first_visit_message", FieldKind::LongStr, "first visit message"),
        FieldSpec::new(
            "first_visit_message_in_dark",
            FieldKind::Bool,
            "show first visit message if dark",
        ),
        FieldSpec::new("dark", FieldKind::Bool, "dark"),
        FieldSpec::new("smell_description", FieldKind::Str, "smell description"),
        FieldSpec::new("ground_smell_description", FieldKind::Str, "ground smell description"),
        FieldSpec::new("ground_taste_description", FieldKind::Str, "ground taste description"),
    ];

    /// Settings for a tile about to be created.
    pub fn new(tile_id: &str) -> Self {
        Self {
            tile_id: tile_id.to_string(),
            attributes: TileAttributes::default(),
        }
    }

    pub fn from_tile(tile: &Tile) -> Self {
        Self {
            tile_id: tile.tile_id.clone(),
            attributes: tile.attributes.clone(),
        }
    }
}

impl Editable for TileSettings {
    fn title(&self) -> &'static str {
        "Tile settings"
    }

    fn fields(&self) -> &'static [FieldSpec] {
        Self::FIELDS
    }

    fn get_field(&self, name: &str) -> Option<FieldValue> {
        let a = &self.attributes;
        Some(match name {
            "description" => FieldValue::Str(a.description.clone()),
            "name" => FieldValue::Str(a.name.clone()),
            "tile_id" => FieldValue::Str(self.tile_id.clone()),
            "first_visit_message" => FieldValue::Str(a.first_visit_message.clone()),
            "first_visit_message_in_dark" => FieldValue::Bool(a.first_visit_message_in_dark),
            "dark" => FieldValue::Bool(a.dark),
            "smell_description" => FieldValue::Str(a.smell_description.clone()),
            "ground_smell_description" => FieldValue::Str(a.ground_smell_description.clone()),
            "ground_taste_description" => FieldValue::Str(a.ground_taste_description.clone()),
            _ => return None,
        })
    }

    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), MapError> {
        let a = &mut self.attributes;
        match name {
            "description" => a.description = string(value),
            "name" => a.name = string(value),
            "tile_id" => self.tile_id = string(value),
            "first_visit_message" => a.first_visit_message = string(value),
            "first_visit_message_in_dark" => {
                a.first_visit_message_in_dark = value.as_bool().unwrap_or(true)
            }
            "dark" => a.dark = value.as_bool().unwrap_or(false),
            "smell_description" => a.smell_description = string(value),
            "ground_smell_description" => a.ground_smell_description = string(value),
            "ground_taste_description" => a.ground_taste_description = string(value),
            _ => return Err(unknown(name)),
        }
        Ok(())
    }
}

// --- Doors ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoorSettings {
    pub direction: Direction,
    pub prefix: String,
    pub name: String,
    pub tile_id: String,
}

impl DoorSettings {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("direction", FieldKind::Choice(&["north", "south", "east", "west"]), "direction"),
        FieldSpec::new("prefix", FieldKind::Str, "prefix"),
        FieldSpec::new("name", FieldKind::Str, "name"),
        FieldSpec::new("tile_id", FieldKind::Str, "tile ID"),
    ];

    pub fn new(direction: Direction, tile_id: &str) -> Self {
        Self {
            direction,
            prefix: "a".to_string(),
            name: "door".to_string(),
            tile_id: tile_id.to_string(),
        }
    }

    pub fn from_door(direction: Direction, door: &Door) -> Self {
        Self {
            direction,
            prefix: door.prefix.clone(),
            name: door.name.clone(),
            tile_id: door.tile_id.clone(),
        }
    }

    pub fn to_door(&self) -> Door {
        Door::locked(&self.tile_id, &self.prefix, &self.name, None)
    }
}

impl Editable for DoorSettings {
    fn title(&self) -> &'static str {
        "Door settings"
    }

    fn fields(&self) -> &'static [FieldSpec] {
        Self::FIELDS
    }

    fn get_field(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "direction" => FieldValue::Str(self.direction.name().to_string()),
            "prefix" => FieldValue::Str(self.prefix.clone()),
            "name" => FieldValue::Str(self.name.clone()),
            "tile_id" => FieldValue::Str(self.tile_id.clone()),
            _ => return None,
        })
    }

    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), MapError> {
        match name {
            "direction" => self.direction = direction(&value)?,
            "prefix" => self.prefix = string(value),
            "name" => self.name = string(value),
            "tile_id" => self.tile_id = string(value),
            _ => return Err(unknown(name)),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeypadDoorSettings {
    pub door: DoorSettings,
    pub code: i64,
    pub prompt: String,
}

impl KeypadDoorSettings {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("direction", FieldKind::Choice(&["north", "south", "east", "west"]), "direction"),
        FieldSpec::new("prefix", FieldKind::Str, "prefix"),
        FieldSpec::new("name", FieldKind::Str, "name"),
        FieldSpec::new("tile_id", FieldKind::Str, "tile ID"),
        FieldSpec::new("code", FieldKind::Integer, "keypad code"),
        FieldSpec::new("prompt", FieldKind::Str, "keypad prompt"),
    ];

    pub fn new(direction: Direction, tile_id: &str) -> Self {
        Self {
            door: DoorSettings::new(direction, tile_id),
            code: 0,
            prompt: "Enter the code:".to_string(),
        }
    }

    pub fn from_door(direction: Direction, door: &Door) -> Self {
        let (code, prompt) = match &door.kind {
            DoorKind::Keypad { code, prompt } => (*code, prompt.clone()),
            DoorKind::Locked => (0, String::new()),
        };
        Self {
            door: DoorSettings::from_door(direction, door),
            code,
            prompt,
        }
    }

    pub fn direction(&self) -> Direction {
        self.door.direction
    }

    pub fn to_door(&self) -> Door {
        let d = &self.door;
        Door::keypad(&d.tile_id, &d.prefix, &d.name, self.code, &self.prompt, None)
    }
}

impl Editable for KeypadDoorSettings {
    fn title(&self) -> &'static str {
        "Keypad door settings"
    }

    fn fields(&self) -> &'static [FieldSpec] {
        Self::FIELDS
    }

    fn get_field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "code" => Some(FieldValue::Integer(self.code)),
            "prompt" => Some(FieldValue::Str(self.prompt.clone())),
            _ => self.door.get_field(name),
        }
    }

    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), MapError> {
        match name {
            "code" => {
                self.code = value.as_i64().ok_or_else(|| MapError::InvalidField {
                    field: "keypad code".to_string(),
                    reason: "expected a whole number".to_string(),
                })?
            }
            "prompt" => self.prompt = string(value),
            _ => return self.door.set_field(name, value),
        }
        Ok(())
    }
}

// --- Walls ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallSettings {
    pub north: bool,
    pub south: bool,
    pub east: bool,
    pub west: bool,
}

impl WallSettings {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("north", FieldKind::Bool, "north"),
        FieldSpec::new("south", FieldKind::Bool, "south"),
        FieldSpec::new("east", FieldKind::Bool, "east"),
        FieldSpec::new("west", FieldKind::Bool, "west"),
    ];

    /// Walls in `Direction::ALL` order.
    pub fn to_array(self) -> [bool; 4] {
        [self.north, self.south, self.east, self.west]
    }
}

impl From<[bool; 4]> for WallSettings {
    fn from([north, south, east, west]: [bool; 4]) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }
}

impl Editable for WallSettings {
    fn title(&self) -> &'static str {
        "Wall settings"
    }

    fn fields(&self) -> &'static [FieldSpec] {
        Self::FIELDS
    }

    fn get_field(&self, name: &str) -> Option<FieldValue> {
        let dir: Direction = name.parse().ok()?;
        Some(FieldValue::Bool(self.to_array()[dir.index()]))
    }

    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), MapError> {
        let wall = value.as_bool().unwrap_or(false);
        match name {
            "north" => self.north = wall,
            "south" => self.south = wall,
            "east" => self.east = wall,
            "west" => self.west = wall,
            _ => return Err(unknown(name)),
        }
        Ok(())
    }
}
