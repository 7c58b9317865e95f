use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use engine::{Transform, Vec3};
use roxmltree::{Document, Node};

use crate::catalog::{FoodType, ItemType, KeyType};
use crate::world::{
    ChestItem, DayNightCycle, Door, FoodPickup, GemPickup, Interactable, KeyPickup,
    TreasureChest, NOON,
};

pub const LEVEL_FILE_NAME: &str = "level.xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelErrorCode {
    ReadFile,
    XmlMalformed,
    InvalidRoot,
    UnknownElement,
    DuplicateElement,
    MissingAttribute,
    InvalidValue,
    DuplicateName,
}

#[derive(Debug, Clone)]
pub struct LevelError {
    pub code: LevelErrorCode,
    pub message: String,
    pub file_path: PathBuf,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(
                f,
                "{:?}: {} (file={}, line={}, column={})",
                self.code,
                self.message,
                self.file_path.display(),
                loc.line,
                loc.column
            ),
            None => write!(
                f,
                "{:?}: {} (file={})",
                self.code,
                self.message,
                self.file_path.display()
            ),
        }
    }
}

impl std::error::Error for LevelError {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerSpawn {
    pub position: Vec3,
    pub yaw: f32,
}

impl PlayerSpawn {
    pub fn transform(&self) -> Transform {
        Transform {
            position: self.position,
            rotation: Vec3::new(0.0, self.yaw, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayNightSettings {
    pub day_length_minutes: f32,
    pub start_time: f32,
}

impl Default for DayNightSettings {
    fn default() -> Self {
        Self {
            day_length_minutes: 10.0,
            start_time: NOON,
        }
    }
}

impl DayNightSettings {
    pub fn build(&self) -> DayNightCycle {
        DayNightCycle::new(self.day_length_minutes, self.start_time)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlacedKind {
    Key {
        key_type: KeyType,
    },
    Food {
        food_type: FoodType,
    },
    Gem {
        label: String,
        points: i64,
    },
    Door {
        label: String,
        required_key: KeyType,
        consume_key: bool,
    },
    Chest {
        items: Vec<ChestItem>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedDef {
    pub name: String,
    pub position: Vec3,
    pub kind: PlacedKind,
}

impl PlacedDef {
    pub fn build(&self) -> Box<dyn Interactable> {
        let name = self.name.clone();
        match &self.kind {
            PlacedKind::Key { key_type } => Box::new(KeyPickup::new(name, *key_type)),
            PlacedKind::Food { food_type } => Box::new(FoodPickup::new(name, *food_type)),
            PlacedKind::Gem { label, points } => {
                Box::new(GemPickup::new(name, label.clone(), *points))
            }
            PlacedKind::Door {
                label,
                required_key,
                consume_key,
            } => Box::new(Door::new(name, label.clone(), *required_key, *consume_key)),
            PlacedKind::Chest { items } => Box::new(TreasureChest::new(name, items.clone())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LanternDef {
    pub name: String,
    pub position: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LevelLayout {
    pub player: PlayerSpawn,
    pub day_night: DayNightSettings,
    pub objects: Vec<PlacedDef>,
    pub lanterns: Vec<LanternDef>,
}

pub fn load_level(path: &Path) -> Result<LevelLayout, LevelError> {
    let raw = fs::read_to_string(path).map_err(|error| LevelError {
        code: LevelErrorCode::ReadFile,
        message: format!("failed to read level: {error}"),
        file_path: path.to_path_buf(),
        location: None,
    })?;
    parse_level(path, &raw)
}

pub fn parse_level(file_path: &Path, raw: &str) -> Result<LevelLayout, LevelError> {
    let doc = Document::parse(raw).map_err(|error| LevelError {
        code: LevelErrorCode::XmlMalformed,
        message: format!("malformed XML: {error}"),
        file_path: file_path.to_path_buf(),
        location: Some(SourceLocation {
            line: error.pos().row as usize,
            column: error.pos().col as usize,
        }),
    })?;
    LevelParser {
        file_path,
        doc: &doc,
    }
    .parse()
}

struct LevelParser<'a, 'input> {
    file_path: &'a Path,
    doc: &'a Document<'input>,
}

impl LevelParser<'_, '_> {
    fn parse(&self) -> Result<LevelLayout, LevelError> {
        let root = self.doc.root_element();
        if root.tag_name().name() != "Level" {
            return Err(self.error_at(
                LevelErrorCode::InvalidRoot,
                "root element must be <Level>".to_string(),
                root,
            ));
        }

        let mut player: Option<PlayerSpawn> = None;
        let mut day_night: Option<DayNightSettings> = None;
        let mut objects = Vec::new();
        let mut lanterns = Vec::new();
        let mut seen_names = HashMap::<String, SourceLocation>::new();

        for child in root.children().filter(|node| node.is_element()) {
            let tag = child.tag_name().name();
            match tag {
                "Player" => {
                    if player.is_some() {
                        return Err(self.duplicate_element(child));
                    }
                    player = Some(PlayerSpawn {
                        position: self.position(child)?,
                        yaw: self.optional_f32(child, "yaw", 0.0)?,
                    });
                    continue;
                }
                "DayNight" => {
                    if day_night.is_some() {
                        return Err(self.duplicate_element(child));
                    }
                    day_night = Some(self.day_night(child)?);
                    continue;
                }
                "Key" | "Food" | "Gem" | "Door" | "Chest" | "Lantern" => {}
                _ => {
                    return Err(self.error_at(
                        LevelErrorCode::UnknownElement,
                        format!("unknown element <{tag}> in <Level>"),
                        child,
                    ))
                }
            }

            let name = self.required(child, "name")?;
            let location = self.location(child);
            if let Some(first) = seen_names.insert(name.to_string(), location) {
                return Err(self.error_at(
                    LevelErrorCode::DuplicateName,
                    format!(
                        "duplicate name '{name}' (first seen at line {}, column {})",
                        first.line, first.column
                    ),
                    child,
                ));
            }
            let position = self.position(child)?;

            let kind = match tag {
                "Key" => PlacedKind::Key {
                    key_type: self.parsed(child, "type")?,
                },
                "Food" => PlacedKind::Food {
                    food_type: self.parsed(child, "type")?,
                },
                "Gem" => PlacedKind::Gem {
                    label: self.required(child, "label")?.to_string(),
                    points: self.parsed(child, "points")?,
                },
                "Door" => PlacedKind::Door {
                    label: self.required(child, "label")?.to_string(),
                    required_key: self.parsed(child, "requiredKey")?,
                    consume_key: self.optional_bool(child, "consumeKey", false)?,
                },
                "Chest" => PlacedKind::Chest {
                    items: self.chest_items(child)?,
                },
                _ => {
                    lanterns.push(LanternDef {
                        name: name.to_string(),
                        position,
                    });
                    continue;
                }
            };
            objects.push(PlacedDef {
                name: name.to_string(),
                position,
                kind,
            });
        }

        Ok(LevelLayout {
            player: player.unwrap_or(PlayerSpawn {
                position: Vec3::ZERO,
                yaw: 0.0,
            }),
            day_night: day_night.unwrap_or_default(),
            objects,
            lanterns,
        })
    }

    fn day_night(&self, node: Node<'_, '_>) -> Result<DayNightSettings, LevelError> {
        let defaults = DayNightSettings::default();
        let day_length_minutes =
            self.optional_f32(node, "dayLengthMinutes", defaults.day_length_minutes)?;
        if day_length_minutes <= 0.0 {
            return Err(self.error_at(
                LevelErrorCode::InvalidValue,
                "dayLengthMinutes must be > 0".to_string(),
                node,
            ));
        }
        let start_time = self.optional_f32(node, "startTime", defaults.start_time)?;
        if !(0.0..=1.0).contains(&start_time) {
            return Err(self.error_at(
                LevelErrorCode::InvalidValue,
                format!("startTime {start_time} must be within [0, 1]"),
                node,
            ));
        }
        Ok(DayNightSettings {
            day_length_minutes,
            start_time,
        })
    }

    fn chest_items(&self, chest: Node<'_, '_>) -> Result<Vec<ChestItem>, LevelError> {
        let mut items = Vec::new();
        for child in chest.children().filter(|node| node.is_element()) {
            if child.tag_name().name() != "Item" {
                return Err(self.error_at(
                    LevelErrorCode::UnknownElement,
                    format!("unknown element <{}> in <Chest>", child.tag_name().name()),
                    child,
                ));
            }
            let kind: ItemType = self.parsed(child, "type")?;
            let name = self.required(child, "name")?;
            let points = self.parsed(child, "points")?;
            items.push(ChestItem::new(kind, name, points));
        }
        Ok(items)
    }

    fn position(&self, node: Node<'_, '_>) -> Result<Vec3, LevelError> {
        Ok(Vec3::new(
            self.required_f32(node, "x")?,
            self.optional_f32(node, "y", 0.0)?,
            self.required_f32(node, "z")?,
        ))
    }

    fn required<'n>(&self, node: Node<'n, '_>, attr: &str) -> Result<&'n str, LevelError> {
        match node.attribute(attr).map(str::trim) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(self.error_at(
                LevelErrorCode::MissingAttribute,
                format!(
                    "missing required attribute '{attr}' on <{}>",
                    node.tag_name().name()
                ),
                node,
            )),
        }
    }

    fn parsed<T>(&self, node: Node<'_, '_>, attr: &str) -> Result<T, LevelError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let value = self.required(node, attr)?;
        value.parse::<T>().map_err(|error| {
            self.error_at(
                LevelErrorCode::InvalidValue,
                format!("invalid {attr} '{value}': {error}"),
                node,
            )
        })
    }

    fn required_f32(&self, node: Node<'_, '_>, attr: &str) -> Result<f32, LevelError> {
        let value: f32 = self.parsed(node, attr)?;
        self.finite(node, attr, value)
    }

    fn optional_f32(
        &self,
        node: Node<'_, '_>,
        attr: &str,
        default: f32,
    ) -> Result<f32, LevelError> {
        if node.attribute(attr).is_none() {
            return Ok(default);
        }
        self.required_f32(node, attr)
    }

    fn optional_bool(
        &self,
        node: Node<'_, '_>,
        attr: &str,
        default: bool,
    ) -> Result<bool, LevelError> {
        if node.attribute(attr).is_none() {
            return Ok(default);
        }
        self.parsed(node, attr)
    }

    fn finite(&self, node: Node<'_, '_>, attr: &str, value: f32) -> Result<f32, LevelError> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(self.error_at(
                LevelErrorCode::InvalidValue,
                format!("{attr} must be a finite number"),
                node,
            ))
        }
    }

    fn duplicate_element(&self, node: Node<'_, '_>) -> LevelError {
        self.error_at(
            LevelErrorCode::DuplicateElement,
            format!("<{}> may appear only once", node.tag_name().name()),
            node,
        )
    }

    fn location(&self, node: Node<'_, '_>) -> SourceLocation {
        let pos = self.doc.text_pos_at(node.range().start);
        SourceLocation {
            line: pos.row as usize,
            column: pos.col as usize,
        }
    }

    fn error_at(&self, code: LevelErrorCode, message: String, node: Node<'_, '_>) -> LevelError {
        LevelError {
            code,
            message,
            file_path: self.file_path.to_path_buf(),
            location: Some(self.location(node)),
        }
    }
}
