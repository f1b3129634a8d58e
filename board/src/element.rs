//! Element model: kinds, payload variants, the wire shape, and snapshot
//! parsing.
//!
//! Elements live in the shared document tree as a map from push-id to
//! record. The id is the map key only; it never appears inside the record
//! value, so parsing injects it and serialization skips it. Payloads are a
//! closed tagged union on the `type` field; the session core never inspects
//! payload fields, only geometry and id, and payload edits pass through it
//! as opaque JSON field maps.

#[cfg(test)]
#[path = "element_test.rs"]
mod element_test;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::consts::{FORMULA_SIZE, IMAGE_SIZE, NOTE_SIZE, TABLE_SIZE};

/// Unique identifier for an element (store-assigned push id).
pub type ElementId = String;

/// The kind of an element. Immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// Formula card with a LaTeX body.
    Formula,
    /// Free-text note card.
    Note,
    /// Column/row grid card.
    Table,
    /// Image tile referencing an external URL.
    Image,
}

impl ElementKind {
    /// Default footprint for a freshly created element of this kind.
    #[must_use]
    pub fn default_size(self) -> (f64, f64) {
        match self {
            Self::Formula => FORMULA_SIZE,
            Self::Note => NOTE_SIZE,
            Self::Table => TABLE_SIZE,
            Self::Image => IMAGE_SIZE,
        }
    }

    /// Default payload for a freshly created element of this kind.
    #[must_use]
    pub fn default_content(self) -> Content {
        match self {
            Self::Formula => Content::Formula(FormulaContent {
                title: "New Formula".to_owned(),
                latex: "F = ma".to_owned(),
                subject: "Physics".to_owned(),
                topic: "Mechanics".to_owned(),
                notes: String::new(),
            }),
            Self::Note => Content::Note(NoteContent {
                title: "New Note".to_owned(),
                ..NoteContent::default()
            }),
            Self::Table => Content::Table(TableContent {
                title: "New Table".to_owned(),
                columns: vec!["Column 1".to_owned(), "Column 2".to_owned()],
                rows: vec![TableRow {
                    id: "row-1".to_owned(),
                    cells: vec![String::new(), String::new()],
                }],
            }),
            Self::Image => Content::Image(ImageContent::default()),
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Formula => "formula",
            Self::Note => "note",
            Self::Table => "table",
            Self::Image => "image",
        };
        f.write_str(name)
    }
}

/// Returned when a token names no element kind.
#[derive(Debug, thiserror::Error)]
#[error("unknown element kind `{0}` (expected formula, note, table, or image)")]
pub struct UnknownElementKind(String);

impl std::str::FromStr for ElementKind {
    type Err = UnknownElementKind;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "formula" => Ok(Self::Formula),
            "note" => Ok(Self::Note),
            "table" => Ok(Self::Table),
            "image" => Ok(Self::Image),
            other => Err(UnknownElementKind(other.to_owned())),
        }
    }
}

/// Payload of a formula card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormulaContent {
    /// Card heading.
    pub title: String,
    /// LaTeX source of the formula body.
    pub latex: String,
    /// Subject the formula belongs to (grouping key in layouts).
    pub subject: String,
    /// Finer-grained topic within the subject.
    pub topic: String,
    /// Free-form annotations.
    pub notes: String,
}

/// Payload of a note card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteContent {
    /// Card heading.
    pub title: String,
    /// Note body text.
    pub content: String,
    /// Free-form annotations.
    pub notes: String,
}

/// One row of a table card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableRow {
    /// Row identifier, unique within its table.
    pub id: String,
    /// Cell text, one entry per column.
    pub cells: Vec<String>,
}

/// Payload of a table card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableContent {
    /// Card heading.
    pub title: String,
    /// Column headers.
    pub columns: Vec<String>,
    /// Row data.
    pub rows: Vec<TableRow>,
}

/// Payload of an image tile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageContent {
    /// Tile caption.
    pub title: String,
    /// Image location.
    pub url: String,
    /// Free-form annotations.
    pub notes: String,
}

/// Kind-specific payload, tagged on the wire by the `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    Formula(FormulaContent),
    Note(NoteContent),
    Table(TableContent),
    Image(ImageContent),
}

impl Content {
    /// The kind tag of this payload.
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Formula(_) => ElementKind::Formula,
            Self::Note(_) => ElementKind::Note,
            Self::Table(_) => ElementKind::Table,
            Self::Image(_) => ElementKind::Image,
        }
    }

    /// The payload heading, present on every variant.
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Formula(payload) => &payload.title,
            Self::Note(payload) => &payload.title,
            Self::Table(payload) => &payload.title,
            Self::Image(payload) => &payload.title,
        }
    }

    /// Merge opaque field edits into this payload. The `type` key is
    /// ignored (kind is immutable) and a null value clears a field. An edit
    /// set that no longer fits the payload shape leaves it unchanged.
    pub fn merge_fields(&mut self, fields: &Map<String, Value>) {
        let Ok(mut value) = serde_json::to_value(&*self) else {
            return;
        };
        let Some(object) = value.as_object_mut() else {
            return;
        };
        for (key, field) in fields {
            if key == "type" {
                continue;
            }
            if field.is_null() {
                object.remove(key);
            } else {
                object.insert(key.clone(), field.clone());
            }
        }
        if let Ok(merged) = serde_json::from_value::<Self>(value) {
            *self = merged;
        }
    }
}

/// An element as stored in the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Collection key of this record; injected on parse, never serialized.
    #[serde(skip)]
    pub id: ElementId,
    /// Left edge in board units.
    pub x: f64,
    /// Top edge in board units.
    pub y: f64,
    /// Width in board units.
    pub width: f64,
    /// Height in board units.
    pub height: f64,
    /// Background color token; only used to derive foreground contrast.
    pub color: String,
    /// Epoch milliseconds at creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    /// Kind-specific payload.
    #[serde(flatten)]
    pub content: Content,
}

impl Element {
    /// Seed a new element with its kind's creation defaults at the given
    /// position.
    #[must_use]
    pub fn seeded(id: ElementId, kind: ElementKind, x: f64, y: f64, color: String) -> Self {
        let (width, height) = kind.default_size();
        Self {
            id,
            x,
            y,
            width,
            height,
            color,
            created_at: None,
            content: kind.default_content(),
        }
    }

    /// The kind tag of this element.
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        self.content.kind()
    }
}

/// Sparse update for an element. Only present fields are applied; entries
/// in `fields` are kind-payload edits, opaque to the session core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementPatch {
    /// New left edge, if moving.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// New top edge, if moving.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// New width, if resizing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// New height, if resizing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// New background token, if recoloring.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Payload edits to merge into the kind content.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ElementPatch {
    /// A patch that moves an element.
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self { x: Some(x), y: Some(y), ..Self::default() }
    }

    /// A patch that resizes an element.
    #[must_use]
    pub fn size(width: f64, height: f64) -> Self {
        Self { width: Some(width), height: Some(height), ..Self::default() }
    }

    /// A patch carrying only payload edits.
    #[must_use]
    pub fn content(fields: Map<String, Value>) -> Self {
        Self { fields, ..Self::default() }
    }

    /// Returns `true` when the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_none()
            && self.y.is_none()
            && self.width.is_none()
            && self.height.is_none()
            && self.color.is_none()
            && self.fields.is_empty()
    }
}

/// Parse a full element-collection snapshot, injecting each record's map
/// key as its element id. A null or non-map snapshot is an empty board;
/// records that do not parse are skipped.
#[must_use]
pub fn parse_snapshot(value: &Value) -> Vec<Element> {
    let Some(records) = value.as_object() else {
        return Vec::new();
    };
    let mut elements = Vec::with_capacity(records.len());
    for (id, record) in records {
        if let Ok(mut element) = serde_json::from_value::<Element>(record.clone()) {
            element.id = id.clone();
            elements.push(element);
        }
    }
    elements
}
