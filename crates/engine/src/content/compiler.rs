use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};
use tracing::{debug, info};

use crate::interaction::{
    CursorIcon, CursorIconId, CursorIconTable, DoubleClickApproach, InteractionPhilosophy,
    InteractionSettings, LookInput, TargetingMode, VerbBinding,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentErrorCode {
    ReadFile,
    XmlMalformed,
    InvalidRoot,
    UnknownDefType,
    UnknownField,
    DuplicateField,
    MissingField,
    InvalidValue,
    DuplicateDef,
    UnknownIcon,
}

#[derive(Debug, Clone)]
pub struct ContentCompileError {
    pub code: ContentErrorCode,
    pub message: String,
    pub file_path: PathBuf,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for ContentCompileError {
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

impl std::error::Error for ContentCompileError {}

/// Everything the interaction definition files configure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionDefs {
    pub settings: InteractionSettings,
    pub icons: CursorIconTable,
}

const PHILOSOPHIES: &[(&str, InteractionPhilosophy)] = &[
    ("ContextSensitive", InteractionPhilosophy::ContextSensitive),
    (
        "ChooseInteractionThenTarget",
        InteractionPhilosophy::ChooseInteractionThenTarget,
    ),
    (
        "ChooseTargetThenInteraction",
        InteractionPhilosophy::ChooseTargetThenInteraction,
    ),
    ("CustomScript", InteractionPhilosophy::CustomScript),
];

const TARGETING_MODES: &[(&str, TargetingMode)] = &[
    ("PointerQuery", TargetingMode::PointerQuery),
    ("ProximityNearest", TargetingMode::ProximityNearest),
    ("ProximityCycle", TargetingMode::ProximityCycle),
];

const LOOK_INPUTS: &[(&str, LookInput)] = &[
    ("SecondaryPress", LookInput::SecondaryPress),
    ("ToggleAction", LookInput::ToggleAction),
];

const DOUBLE_CLICK_APPROACHES: &[(&str, DoubleClickApproach)] = &[
    ("Ignore", DoubleClickApproach::Ignore),
    ("Run", DoubleClickApproach::Run),
    ("Snap", DoubleClickApproach::Snap),
];

/// Compiles every `*.xml` file under `defs_dir`, visited in sorted relative-path
/// order. At most one `<InteractionSettings>` may exist across all files; a
/// directory without one yields the default settings.
pub fn compile_interaction_defs(defs_dir: &Path) -> Result<InteractionDefs, ContentCompileError> {
    let xml_files = collect_xml_files_sorted(defs_dir)
        .map_err(|error| read_error(error.path, error.source))?;

    let mut merged = MergedDefs::default();
    for xml_file in &xml_files {
        let raw = fs::read_to_string(xml_file)
            .map_err(|source| read_error(xml_file.clone(), source))?;
        parse_defs_document(xml_file, &raw, &mut merged)?;
    }

    let defs = merged.finish()?;
    info!(
        dir = %defs_dir.display(),
        file_count = xml_files.len(),
        icon_count = defs.icons.len(),
        philosophy = ?defs.settings.philosophy,
        "interaction_defs_compiled"
    );
    Ok(defs)
}

pub fn compile_interaction_defs_from_str(
    file_path: &Path,
    raw: &str,
) -> Result<InteractionDefs, ContentCompileError> {
    let mut merged = MergedDefs::default();
    parse_defs_document(file_path, raw, &mut merged)?;
    merged.finish()
}

#[derive(Debug, Default)]
struct MergedDefs {
    settings: Option<InteractionSettings>,
    icons: BTreeMap<CursorIconId, CursorIcon>,
    fallback_refs: Vec<FallbackRef>,
}

#[derive(Debug)]
struct FallbackRef {
    field: &'static str,
    icon: CursorIconId,
    file_path: PathBuf,
    location: SourceLocation,
}

impl MergedDefs {
    fn finish(self) -> Result<InteractionDefs, ContentCompileError> {
        // An empty icon table means the project does not author icons at all.
        if !self.icons.is_empty() {
            if let Some(missing) = self
                .fallback_refs
                .iter()
                .find(|reference| !self.icons.contains_key(&reference.icon))
            {
                return Err(ContentCompileError {
                    code: ContentErrorCode::UnknownIcon,
                    message: format!(
                        "<{}> references cursor icon {} which no <CursorIcon> defines",
                        missing.field, missing.icon.0
                    ),
                    file_path: missing.file_path.clone(),
                    location: Some(missing.location),
                });
            }
        }

        Ok(InteractionDefs {
            settings: self.settings.unwrap_or_default(),
            icons: CursorIconTable::new(self.icons.into_values().collect()),
        })
    }
}

struct XmlSource<'a, 'input> {
    file_path: &'a Path,
    doc: &'a Document<'input>,
}

impl XmlSource<'_, '_> {
    fn location(&self, node: Node<'_, '_>) -> SourceLocation {
        let pos = self.doc.text_pos_at(node.range().start);
        SourceLocation {
            line: pos.row as usize,
            column: pos.col as usize,
        }
    }

    fn error_at(
        &self,
        code: ContentErrorCode,
        message: String,
        node: Node<'_, '_>,
    ) -> ContentCompileError {
        ContentCompileError {
            code,
            message,
            file_path: self.file_path.to_path_buf(),
            location: Some(self.location(node)),
        }
    }

    fn text(&self, node: Node<'_, '_>) -> String {
        node.text().map(str::trim).unwrap_or_default().to_string()
    }

    fn required_text(&self, node: Node<'_, '_>, field: &str) -> Result<String, ContentCompileError> {
        let value = self.text(node);
        if value.is_empty() {
            return Err(self.error_at(
                ContentErrorCode::MissingField,
                format!("field <{field}> must not be empty"),
                node,
            ));
        }
        Ok(value)
    }

    fn parse_bool(&self, node: Node<'_, '_>, field: &str) -> Result<bool, ContentCompileError> {
        let value = self.required_text(node, field)?;
        match value.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(self.error_at(
                ContentErrorCode::InvalidValue,
                format!("{field} '{value}' is not a boolean; allowed values: true, false"),
                node,
            )),
        }
    }

    fn parse_non_negative(&self, node: Node<'_, '_>, field: &str) -> Result<f32, ContentCompileError> {
        let value = self.required_text(node, field)?;
        let parsed = value.parse::<f32>().map_err(|_| {
            self.error_at(
                ContentErrorCode::InvalidValue,
                format!("{field} '{value}' is not a valid number"),
                node,
            )
        })?;
        if !parsed.is_finite() || parsed < 0.0 {
            return Err(self.error_at(
                ContentErrorCode::InvalidValue,
                format!("{field} must be finite and >= 0"),
                node,
            ));
        }
        Ok(parsed)
    }

    fn parse_u32(&self, node: Node<'_, '_>, field: &str) -> Result<u32, ContentCompileError> {
        let value = self.required_text(node, field)?;
        value.parse::<u32>().map_err(|_| {
            self.error_at(
                ContentErrorCode::InvalidValue,
                format!("{field} '{value}' is not an unsigned integer"),
                node,
            )
        })
    }

    fn parse_enum<T: Copy>(
        &self,
        node: Node<'_, '_>,
        field: &str,
        allowed: &[(&str, T)],
    ) -> Result<T, ContentCompileError> {
        let value = self.required_text(node, field)?;
        allowed
            .iter()
            .find(|(name, _)| *name == value)
            .map(|(_, parsed)| *parsed)
            .ok_or_else(|| {
                let names = allowed
                    .iter()
                    .map(|(name, _)| *name)
                    .collect::<Vec<_>>()
                    .join(", ");
                self.error_at(
                    ContentErrorCode::InvalidValue,
                    format!("invalid {field} '{value}'; allowed values: {names}"),
                    node,
                )
            })
    }

    fn check_duplicate(
        &self,
        seen: &mut HashSet<String>,
        field: Node<'_, '_>,
        parent: &str,
    ) -> Result<(), ContentCompileError> {
        let name = field.tag_name().name();
        if seen.insert(name.to_string()) {
            Ok(())
        } else {
            Err(self.error_at(
                ContentErrorCode::DuplicateField,
                format!("duplicate field <{name}> in <{parent}>"),
                field,
            ))
        }
    }

    fn unknown_field(&self, field: Node<'_, '_>, parent: &str) -> ContentCompileError {
        self.error_at(
            ContentErrorCode::UnknownField,
            format!("unknown field <{}> in <{parent}>", field.tag_name().name()),
            field,
        )
    }
}

fn parse_defs_document(
    file_path: &Path,
    raw: &str,
    merged: &mut MergedDefs,
) -> Result<(), ContentCompileError> {
    let doc = Document::parse(raw).map_err(|error| ContentCompileError {
        code: ContentErrorCode::XmlMalformed,
        message: format!("malformed XML: {error}"),
        file_path: file_path.to_path_buf(),
        location: Some(SourceLocation {
            line: error.pos().row as usize,
            column: error.pos().col as usize,
        }),
    })?;
    let source = XmlSource {
        file_path,
        doc: &doc,
    };

    let root = doc.root_element();
    if root.tag_name().name() != "Defs" {
        return Err(source.error_at(
            ContentErrorCode::InvalidRoot,
            "root element must be <Defs>".to_string(),
            root,
        ));
    }

    for child in root.children().filter(|node| node.is_element()) {
        match child.tag_name().name() {
            "InteractionSettings" => {
                if merged.settings.is_some() {
                    return Err(source.error_at(
                        ContentErrorCode::DuplicateDef,
                        "<InteractionSettings> may be defined only once across all files"
                            .to_string(),
                        child,
                    ));
                }
                merged.settings = Some(parse_settings(&source, child, &mut merged.fallback_refs)?);
            }
            "CursorIcon" => {
                let icon = parse_cursor_icon(&source, child)?;
                if merged.icons.contains_key(&icon.id) {
                    return Err(source.error_at(
                        ContentErrorCode::DuplicateDef,
                        format!("duplicate <CursorIcon> id {}", icon.id.0),
                        child,
                    ));
                }
                debug!(icon = icon.id.0, label = icon.label.as_str(), "cursor_icon_parsed");
                merged.icons.insert(icon.id, icon);
            }
            other => {
                return Err(source.error_at(
                    ContentErrorCode::UnknownDefType,
                    format!(
                        "unsupported def type <{other}>; expected <InteractionSettings> or <CursorIcon>"
                    ),
                    child,
                ))
            }
        }
    }

    Ok(())
}

fn parse_settings(
    source: &XmlSource<'_, '_>,
    node: Node<'_, '_>,
    fallback_refs: &mut Vec<FallbackRef>,
) -> Result<InteractionSettings, ContentCompileError> {
    const PARENT: &str = "InteractionSettings";
    let mut settings = InteractionSettings::default();
    let mut seen = HashSet::<String>::new();

    for field in node.children().filter(|child| child.is_element()) {
        source.check_duplicate(&mut seen, field, PARENT)?;
        let name = field.tag_name().name();
        match name {
            "philosophy" => settings.philosophy = source.parse_enum(field, name, PHILOSOPHIES)?,
            "clickLockoutSeconds" => {
                settings.click_lockout_seconds = source.parse_non_negative(field, name)?;
            }
            "doublePressWindowSeconds" => {
                settings.double_press_window_seconds = source.parse_non_negative(field, name)?;
            }
            "dragThreshold" => settings.drag_threshold = source.parse_non_negative(field, name)?,
            "inventoryDragDrop" => settings.inventory_drag_drop = source.parse_bool(field, name)?,
            "freeDragMovement" => settings.free_drag_movement = source.parse_bool(field, name)?,
            "fireOnRelease" => settings.fire_on_release = source.parse_bool(field, name)?,
            "targeting" => settings.targeting = source.parse_enum(field, name, TARGETING_MODES)?,
            "interactiveLayerMask" => {
                settings.interactive_layer_mask = source.parse_u32(field, name)?;
            }
            "pointerQueryRange" => {
                settings.pointer_query_range = Some(source.parse_non_negative(field, name)?);
            }
            "detectorRadius" => settings.detector_radius = source.parse_non_negative(field, name)?,
            "autoDisableUnhandled" => {
                settings.auto_disable_unhandled = source.parse_bool(field, name)?;
            }
            "contextLookInput" => {
                settings.context_look_input = source.parse_enum(field, name, LOOK_INPUTS)?;
            }
            "resetCursorAfterInteraction" => {
                settings.reset_cursor_after_interaction = source.parse_bool(field, name)?;
            }
            "clearItemAfterInteraction" => {
                settings.clear_item_after_interaction = source.parse_bool(field, name)?;
            }
            "deselectItemOnEmptyClick" => {
                settings.deselect_item_on_empty_click = source.parse_bool(field, name)?;
            }
            "walkOnEmptyClick" => settings.walk_on_empty_click = source.parse_bool(field, name)?,
            "cycleInventoryCursors" => {
                settings.cycle_inventory_cursors = source.parse_bool(field, name)?;
            }
            "doubleClickApproach" => {
                settings.double_click_approach =
                    source.parse_enum(field, name, DOUBLE_CLICK_APPROACHES)?;
            }
            "arrivalThreshold" => {
                settings.arrival_threshold = source.parse_non_negative(field, name)?;
            }
            "unhandledUse" => {
                let icon = parse_fallback_icon(source, field, "unhandledUse", fallback_refs)?;
                settings.unhandled_use = Some(VerbBinding::unhandled(icon));
            }
            "unhandledGive" => {
                let icon = parse_fallback_icon(source, field, "unhandledGive", fallback_refs)?;
                settings.unhandled_give = Some(VerbBinding::unhandled(icon));
            }
            "cursorAxisX" => settings.cursor_axis_x = source.text(field),
            "cursorAxisY" => settings.cursor_axis_y = source.text(field),
            "aimAxisX" => settings.aim_axis_x = source.text(field),
            "aimAxisY" => settings.aim_axis_y = source.text(field),
            "simulatedCursorSpeed" => {
                settings.simulated_cursor_speed = source.parse_non_negative(field, name)?;
            }
            "aimSmoothing" => {
                let smoothing = source.parse_non_negative(field, name)?;
                if smoothing >= 1.0 {
                    return Err(source.error_at(
                        ContentErrorCode::InvalidValue,
                        "aimSmoothing must be below 1".to_string(),
                        field,
                    ));
                }
                settings.aim_smoothing = smoothing;
            }
            "allowInteractionInCutscenes" => {
                settings.allow_interaction_in_cutscenes = source.parse_bool(field, name)?;
            }
            _ => return Err(source.unknown_field(field, PARENT)),
        }
    }

    Ok(settings)
}

fn parse_fallback_icon(
    source: &XmlSource<'_, '_>,
    field: Node<'_, '_>,
    name: &'static str,
    fallback_refs: &mut Vec<FallbackRef>,
) -> Result<CursorIconId, ContentCompileError> {
    let icon = CursorIconId(source.parse_u32(field, name)?);
    fallback_refs.push(FallbackRef {
        field: name,
        icon,
        file_path: source.file_path.to_path_buf(),
        location: source.location(field),
    });
    Ok(icon)
}

fn parse_cursor_icon(
    source: &XmlSource<'_, '_>,
    node: Node<'_, '_>,
) -> Result<CursorIcon, ContentCompileError> {
    const PARENT: &str = "CursorIcon";
    let mut seen = HashSet::<String>::new();
    let mut id: Option<u32> = None;
    let mut label: Option<String> = None;
    let mut allow_cycling = true;

    for field in node.children().filter(|child| child.is_element()) {
        source.check_duplicate(&mut seen, field, PARENT)?;
        match field.tag_name().name() {
            "id" => id = Some(source.parse_u32(field, "id")?),
            "label" => label = Some(source.required_text(field, "label")?),
            "allowCycling" => allow_cycling = source.parse_bool(field, "allowCycling")?,
            _ => return Err(source.unknown_field(field, PARENT)),
        }
    }

    let Some(id) = id else {
        return Err(source.error_at(
            ContentErrorCode::MissingField,
            "missing required field <id> in <CursorIcon>".to_string(),
            node,
        ));
    };
    let Some(label) = label else {
        return Err(source.error_at(
            ContentErrorCode::MissingField,
            "missing required field <label> in <CursorIcon>".to_string(),
            node,
        ));
    };

    Ok(CursorIcon {
        id: CursorIconId(id),
        label,
        allow_cycling,
    })
}

struct ReadError {
    path: PathBuf,
    source: std::io::Error,
}

fn collect_xml_files_sorted(root: &Path) -> Result<Vec<PathBuf>, ReadError> {
    let mut files = Vec::<PathBuf>::new();
    collect_recursive(root, &mut files)?;
    files.sort_by_cached_key(|path| normalize_rel_path(path.strip_prefix(root).unwrap_or(path)));
    Ok(files)
}

fn collect_recursive(current: &Path, files: &mut Vec<PathBuf>) -> Result<(), ReadError> {
    let entries = fs::read_dir(current).map_err(|source| ReadError {
        path: current.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| ReadError {
            path: current.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_recursive(&path, files)?;
        } else if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
        {
            files.push(path);
        }
    }
    Ok(())
}

fn normalize_rel_path(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("/")
}

fn read_error(path: PathBuf, source: std::io::Error) -> ContentCompileError {
    ContentCompileError {
        code: ContentErrorCode::ReadFile,
        message: format!("failed to read interaction definitions: {source}"),
        file_path: path,
        location: None,
    }
}
