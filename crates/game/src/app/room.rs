use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use engine::interaction::{
    CarriedItem, CursorIconId, DoubleClickApproach, Hotspot, HotspotId, ItemId, ItemSelectMode,
    ItemTable, VerbBinding,
};
use engine::Vec2;
use serde::Deserialize;
use thiserror::Error;

pub(crate) const ROOM_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub(crate) enum RoomLoadError {
    #[error("read room '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse room json at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("unsupported room_version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("validation failed at {path}: {message}")]
    Invalid { path: String, message: String },
}

/// A room ready to be handed to the scene: hotspots, the item catalog and the
/// character's starting state.
#[derive(Debug, Clone)]
pub(crate) struct Room {
    pub(crate) name: String,
    pub(crate) character_spawn: Vec2,
    pub(crate) walk_speed: f32,
    pub(crate) run_speed: f32,
    pub(crate) hotspots: Vec<Hotspot>,
    pub(crate) items: ItemTable,
    pub(crate) starting_item: Option<ItemId>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
struct Vec2Dto {
    x: f32,
    y: f32,
}

impl From<Vec2Dto> for Vec2 {
    fn from(value: Vec2Dto) -> Self {
        Vec2::new(value.x, value.y)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RoomDto {
    room_version: u32,
    name: String,
    character: CharacterDto,
    #[serde(default)]
    hotspots: Vec<HotspotDto>,
    #[serde(default)]
    items: Vec<ItemDto>,
    #[serde(default)]
    starting_item: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CharacterDto {
    position: Vec2Dto,
    #[serde(default = "default_walk_speed")]
    walk_speed: f32,
    #[serde(default = "default_run_speed")]
    run_speed: f32,
}

fn default_walk_speed() -> f32 {
    4.0
}

fn default_run_speed() -> f32 {
    8.0
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct HotspotDto {
    id: u64,
    label: String,
    anchor: Vec2Dto,
    #[serde(default)]
    half_extents: Option<Vec2Dto>,
    #[serde(default)]
    walk_to: Option<Vec2Dto>,
    #[serde(default)]
    interaction_boundary: Option<f32>,
    #[serde(default)]
    proximity_radius: Option<f32>,
    #[serde(default)]
    layer: Option<u32>,
    #[serde(default = "default_true")]
    enabled: bool,
    #[serde(default)]
    verbs: Vec<VerbDto>,
    #[serde(default)]
    unhandled_use: Option<u32>,
    #[serde(default)]
    unhandled_inventory: Option<u32>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum VerbSourceDto {
    Use,
    Examine,
    Combine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum DoubleClickDto {
    Ignore,
    Run,
    Snap,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct VerbDto {
    icon: u32,
    source: VerbSourceDto,
    #[serde(default)]
    item: Option<u32>,
    #[serde(default)]
    walk_to: bool,
    #[serde(default)]
    double_click: Option<DoubleClickDto>,
    #[serde(default)]
    disabled: bool,
    #[serde(default)]
    single_interaction_only: bool,
    #[serde(default)]
    consumes_item: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum SelectModeDto {
    #[default]
    Use,
    Give,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ItemDto {
    id: u32,
    label: String,
    #[serde(default)]
    select_mode: SelectModeDto,
    #[serde(default)]
    consumable: bool,
    #[serde(default)]
    drag_drop_only: bool,
    #[serde(default)]
    verbs: Vec<VerbDto>,
}

pub(crate) fn load_room(path: &Path) -> Result<Room, RoomLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| RoomLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_room(&raw)
}

pub(crate) fn parse_room(raw: &str) -> Result<Room, RoomLoadError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let dto = serde_path_to_error::deserialize::<_, RoomDto>(&mut deserializer).map_err(
        |error| {
            let path = error.path().to_string();
            RoomLoadError::Parse {
                path: if path.is_empty() { ".".to_string() } else { path },
                source: error.into_inner(),
            }
        },
    )?;
    build_room(dto)
}

fn invalid(path: impl Into<String>, message: impl Into<String>) -> RoomLoadError {
    RoomLoadError::Invalid {
        path: path.into(),
        message: message.into(),
    }
}

fn finite(path: &str, value: f32) -> Result<f32, RoomLoadError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(invalid(path, format!("expected finite number, got {value}")))
    }
}

fn finite_vec(path: &str, value: Vec2Dto) -> Result<Vec2, RoomLoadError> {
    finite(&format!("{path}.x"), value.x)?;
    finite(&format!("{path}.y"), value.y)?;
    Ok(value.into())
}

fn non_negative(path: &str, value: f32) -> Result<f32, RoomLoadError> {
    let value = finite(path, value)?;
    if value < 0.0 {
        return Err(invalid(path, format!("expected >= 0, got {value}")));
    }
    Ok(value)
}

fn build_room(dto: RoomDto) -> Result<Room, RoomLoadError> {
    if dto.room_version != ROOM_VERSION {
        return Err(RoomLoadError::UnsupportedVersion {
            found: dto.room_version,
            expected: ROOM_VERSION,
        });
    }

    let item_ids = dto.items.iter().map(|item| item.id).collect::<BTreeSet<_>>();
    if item_ids.len() != dto.items.len() {
        return Err(invalid("items", "duplicate item id"));
    }

    let mut items = ItemTable::default();
    for (index, item) in dto.items.into_iter().enumerate() {
        let path = format!("items[{index}]");
        let mut carried = CarriedItem::new(ItemId(item.id), item.label);
        carried.select_mode = match item.select_mode {
            SelectModeDto::Use => ItemSelectMode::Use,
            SelectModeDto::Give => ItemSelectMode::Give,
        };
        carried.consumable = item.consumable;
        carried.drag_drop_only = item.drag_drop_only;
        carried.bindings = build_verbs(&path, item.verbs, &item_ids)?;
        items.insert(carried);
    }

    let mut seen_hotspots = BTreeSet::new();
    let mut hotspots = Vec::with_capacity(dto.hotspots.len());
    for (index, raw) in dto.hotspots.into_iter().enumerate() {
        let path = format!("hotspots[{index}]");
        if !seen_hotspots.insert(raw.id) {
            return Err(invalid(
                format!("{path}.id"),
                format!("duplicate hotspot id {}", raw.id),
            ));
        }

        let mut hotspot = Hotspot::new(
            HotspotId(raw.id),
            raw.label,
            finite_vec(&format!("{path}.anchor"), raw.anchor)?,
        );
        if let Some(half_extents) = raw.half_extents {
            hotspot.half_extents = finite_vec(&format!("{path}.half_extents"), half_extents)?;
        }
        hotspot.walk_to = raw
            .walk_to
            .map(|walk_to| finite_vec(&format!("{path}.walk_to"), walk_to))
            .transpose()?;
        hotspot.interaction_boundary = raw
            .interaction_boundary
            .map(|boundary| non_negative(&format!("{path}.interaction_boundary"), boundary))
            .transpose()?;
        if let Some(radius) = raw.proximity_radius {
            hotspot.proximity_radius = non_negative(&format!("{path}.proximity_radius"), radius)?;
        }
        if let Some(layer) = raw.layer {
            hotspot.layer = layer;
        }
        hotspot.enabled = raw.enabled;
        hotspot.bindings = build_verbs(&path, raw.verbs, &item_ids)?;
        hotspot.unhandled_use = raw
            .unhandled_use
            .map(|icon| VerbBinding::unhandled(CursorIconId(icon)));
        hotspot.unhandled_inventory = raw
            .unhandled_inventory
            .map(|icon| VerbBinding::unhandled(CursorIconId(icon)));
        hotspots.push(hotspot);
    }

    if let Some(item) = dto.starting_item {
        if !item_ids.contains(&item) {
            return Err(invalid(
                "starting_item",
                format!("item {item} is not defined in items"),
            ));
        }
    }

    Ok(Room {
        name: dto.name,
        character_spawn: finite_vec("character.position", dto.character.position)?,
        walk_speed: non_negative("character.walk_speed", dto.character.walk_speed)?,
        run_speed: non_negative("character.run_speed", dto.character.run_speed)?,
        hotspots,
        items,
        starting_item: dto.starting_item.map(ItemId),
    })
}

fn build_verbs(
    owner_path: &str,
    verbs: Vec<VerbDto>,
    item_ids: &BTreeSet<u32>,
) -> Result<Vec<VerbBinding>, RoomLoadError> {
    verbs
        .into_iter()
        .enumerate()
        .map(|(index, verb)| {
            let path = format!("{owner_path}.verbs[{index}]");
            let icon = CursorIconId(verb.icon);
            let mut binding = match (verb.source, verb.item) {
                (VerbSourceDto::Use, None) => VerbBinding::use_verb(icon),
                (VerbSourceDto::Examine, None) => VerbBinding::examine(icon),
                (VerbSourceDto::Combine, Some(item)) => {
                    if !item_ids.contains(&item) {
                        return Err(invalid(
                            format!("{path}.item"),
                            format!("item {item} is not defined in items"),
                        ));
                    }
                    VerbBinding::combine(icon, ItemId(item))
                }
                (VerbSourceDto::Combine, None) => {
                    return Err(invalid(path, "combine verbs require an item"));
                }
                (_, Some(_)) => {
                    return Err(invalid(
                        format!("{path}.item"),
                        "only combine verbs may name an item",
                    ));
                }
            };
            if verb.walk_to {
                binding = binding.walk_to();
            }
            binding.double_click = verb.double_click.map(|approach| match approach {
                DoubleClickDto::Ignore => DoubleClickApproach::Ignore,
                DoubleClickDto::Run => DoubleClickApproach::Run,
                DoubleClickDto::Snap => DoubleClickApproach::Snap,
            });
            binding.disabled = verb.disabled;
            binding.single_interaction_only = verb.single_interaction_only;
            binding.consumes_item = verb.consumes_item;
            Ok(binding)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use engine::interaction::{ApproachMode, ItemCatalog, VerbSource};

    use super::*;

    const MINIMAL: &str = r#"{
        "room_version": 1,
        "name": "cellar",
        "character": { "position": { "x": 0.0, "y": 0.0 } },
        "hotspots": [
            {
                "id": 1,
                "label": "Door",
                "anchor": { "x": 3.0, "y": 0.5 },
                "walk_to": { "x": 2.5, "y": 0.0 },
                "interaction_boundary": 6.0,
                "verbs": [
                    { "icon": 1, "source": "use", "walk_to": true, "double_click": "run" },
                    { "icon": 2, "source": "examine" },
                    { "icon": 1, "source": "combine", "item": 5, "consumes_item": true }
                ],
                "unhandled_inventory": 7
            }
        ],
        "items": [
            { "id": 5, "label": "Key", "verbs": [ { "icon": 2, "source": "examine" } ] },
            { "id": 6, "label": "Coin", "select_mode": "give", "consumable": true }
        ],
        "starting_item": 5
    }"#;

    #[test]
    fn room_json_builds_hotspots_and_items() {
        let room = parse_room(MINIMAL).expect("room");
        assert_eq!(room.name, "cellar");
        assert!((room.walk_speed - 4.0).abs() < f32::EPSILON);
        assert_eq!(room.starting_item, Some(ItemId(5)));

        let door = &room.hotspots[0];
        assert_eq!(door.walk_anchor(), Vec2::new(2.5, 0.0));
        assert_eq!(door.bindings.len(), 3);
        assert_eq!(door.bindings[0].approach, ApproachMode::WalkTo);
        assert_eq!(door.bindings[0].double_click, Some(DoubleClickApproach::Run));
        assert_eq!(door.bindings[2].source, VerbSource::InventoryCombination);
        assert!(door.bindings[2].consumes_item);
        assert_eq!(
            door.unhandled_inventory,
            Some(VerbBinding::unhandled(CursorIconId(7)))
        );

        let coin = room.items.item(ItemId(6)).expect("coin");
        assert_eq!(coin.select_mode, ItemSelectMode::Give);
        assert!(coin.consumable);
    }

    #[test]
    fn parse_errors_carry_the_json_path() {
        let raw = MINIMAL.replace(r#""source": "examine" }"#, r#""source": "lick" }"#);
        let err = parse_room(&raw).expect_err("err");
        match err {
            RoomLoadError::Parse { path, .. } => assert_eq!(path, "hotspots[0].verbs[1].source"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let raw = MINIMAL.replace(r#""label": "Door","#, r#""label": "Door", "colour": "red","#);
        assert!(matches!(
            parse_room(&raw),
            Err(RoomLoadError::Parse { .. })
        ));
    }

    #[test]
    fn combine_verbs_must_reference_known_items() {
        let raw = MINIMAL.replace(r#""item": 5"#, r#""item": 99"#);
        let err = parse_room(&raw).expect_err("err");
        match err {
            RoomLoadError::Invalid { path, .. } => assert_eq!(path, "hotspots[0].verbs[2].item"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn version_and_duplicate_ids_are_validated() {
        let raw = MINIMAL.replace(r#""room_version": 1"#, r#""room_version": 2"#);
        assert!(matches!(
            parse_room(&raw),
            Err(RoomLoadError::UnsupportedVersion { found: 2, .. })
        ));

        let raw = MINIMAL.replace(r#""id": 6"#, r#""id": 5"#);
        assert!(matches!(
            parse_room(&raw),
            Err(RoomLoadError::Invalid { .. })
        ));
    }

    #[test]
    fn negative_boundary_is_invalid() {
        let raw = MINIMAL.replace("6.0", "-1.0");
        let err = parse_room(&raw).expect_err("err");
        assert!(err.to_string().contains("interaction_boundary"));
    }
}
