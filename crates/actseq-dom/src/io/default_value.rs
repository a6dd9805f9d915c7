//! Default values of document inputs.
//!
//! A default is stored under a `default-value` child of the input. Which
//! shape is read back is decided by the input's declared type; a stored
//! default whose shape does not match the declared type reads as absent.

use crate::names::{
    ValueShape, COLUMNS, DEFAULT_VALUE, ENTRY, KEY_ATTR, LIST_ITEM, PROPERTY_MAP, ROW, TYPE_ATTR,
};
use crate::tree::Element;

const CELL: &str = "cell";
const DEFAULT_COLUMN_TYPE: &str = "string";

/// One ordered row of key/value pairs.
pub type PropertyMapRow = Vec<(String, String)>;

/// Column of a tabular default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableColumn {
    pub name: String,
    pub column_type: String,
}

impl TableColumn {
    pub fn new(name: impl Into<String>) -> Self {
        Self::typed(name, DEFAULT_COLUMN_TYPE)
    }

    pub fn typed(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
        }
    }
}

/// Tabular data with an explicit column list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<TableColumn>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn with_row<I, S>(mut self, row: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
        self
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Value at `row` for the named column.
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.columns.iter().position(|c| c.name == column)?;
        self.rows.get(row)?.get(index).map(String::as_str)
    }
}

/// Default value of a document input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultValue {
    Scalar(String),
    StringList(Vec<String>),
    PropertyMap(PropertyMapRow),
    PropertyMapList(Vec<PropertyMapRow>),
    ResultSet(Table),
}

impl DefaultValue {
    pub fn shape(&self) -> ValueShape {
        match self {
            DefaultValue::Scalar(_) => ValueShape::Scalar,
            DefaultValue::StringList(_) => ValueShape::StringList,
            DefaultValue::PropertyMap(_) => ValueShape::PropertyMap,
            DefaultValue::PropertyMapList(_) => ValueShape::PropertyMapList,
            DefaultValue::ResultSet(_) => ValueShape::ResultSet,
        }
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            DefaultValue::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// Uniform tabular view of a property-map list or result set.
    ///
    /// Property-map rows may each carry a different key set; the columns
    /// are the union of all keys in first-seen order and missing cells are
    /// empty.
    pub fn as_table(&self) -> Option<Table> {
        match self {
            DefaultValue::ResultSet(table) => Some(table.clone()),
            DefaultValue::PropertyMapList(rows) => {
                let mut columns: Vec<String> = Vec::new();
                for row in rows {
                    for (key, _) in row {
                        if !columns.contains(key) {
                            columns.push(key.clone());
                        }
                    }
                }
                let table_rows = rows
                    .iter()
                    .map(|row| {
                        columns
                            .iter()
                            .map(|column| {
                                row.iter()
                                    .find(|(k, _)| k == column)
                                    .map(|(_, v)| v.clone())
                                    .unwrap_or_default()
                            })
                            .collect()
                    })
                    .collect();
                Some(Table {
                    columns: columns.into_iter().map(TableColumn::new).collect(),
                    rows: table_rows,
                })
            }
            _ => None,
        }
    }

    fn marker(&self) -> Option<&'static str> {
        match self {
            DefaultValue::Scalar(_) => None,
            DefaultValue::StringList(_) => Some("string-list"),
            DefaultValue::PropertyMap(_) => Some("property-map"),
            DefaultValue::PropertyMapList(_) => Some("property-map-list"),
            DefaultValue::ResultSet(_) => Some("result-set"),
        }
    }
}

fn stored_shape(default_element: &Element) -> ValueShape {
    match default_element.attribute(TYPE_ATTR).as_deref() {
        None => ValueShape::Scalar,
        Some("string-list") => ValueShape::StringList,
        Some("property-map") => ValueShape::PropertyMap,
        Some("property-map-list") => ValueShape::PropertyMapList,
        Some("result-set") => ValueShape::ResultSet,
        Some(_) => ValueShape::Unsupported,
    }
}

fn read_property_map(map: &Element) -> PropertyMapRow {
    map.children_named(ENTRY)
        .into_iter()
        .filter_map(|entry| entry.attribute(KEY_ATTR).map(|key| (key, entry.text())))
        .collect()
}

fn write_property_map(parent: &Element, row: &PropertyMapRow) {
    let map = parent.add_child(PROPERTY_MAP);
    for (key, value) in row {
        let entry = map.add_child(ENTRY);
        entry.set_attribute(KEY_ATTR, key);
        entry.set_text(value);
    }
}

/// Read the default stored on `input` if it has the shape `expected`.
pub(crate) fn read_default(input: &Element, expected: ValueShape) -> Option<DefaultValue> {
    let default_element = input.child(DEFAULT_VALUE)?;
    if stored_shape(&default_element) != expected {
        return None;
    }
    match expected {
        ValueShape::Scalar => Some(DefaultValue::Scalar(default_element.text())),
        ValueShape::StringList => Some(DefaultValue::StringList(
            default_element
                .children_named(LIST_ITEM)
                .iter()
                .map(Element::text)
                .collect(),
        )),
        ValueShape::PropertyMap => Some(DefaultValue::PropertyMap(
            default_element
                .child(PROPERTY_MAP)
                .map(|map| read_property_map(&map))
                .unwrap_or_default(),
        )),
        ValueShape::PropertyMapList => Some(DefaultValue::PropertyMapList(
            default_element
                .children_named(PROPERTY_MAP)
                .iter()
                .map(read_property_map)
                .collect(),
        )),
        ValueShape::ResultSet => {
            let columns = input
                .child(COLUMNS)
                .map(|cols| {
                    cols.children()
                        .into_iter()
                        .map(|col| {
                            let column_type = col
                                .attribute(TYPE_ATTR)
                                .unwrap_or_else(|| DEFAULT_COLUMN_TYPE.to_string());
                            TableColumn::typed(col.name(), column_type)
                        })
                        .collect()
                })
                .unwrap_or_default();
            let rows = default_element
                .children_named(ROW)
                .into_iter()
                .map(|row| row.children_named(CELL).iter().map(Element::text).collect())
                .collect();
            Some(DefaultValue::ResultSet(Table { columns, rows }))
        }
        ValueShape::Unsupported => None,
    }
}

pub(crate) fn has_stored_default(input: &Element) -> bool {
    input.child(DEFAULT_VALUE).is_some() || input.child(COLUMNS).is_some()
}

/// Remove any stored default, including result-set columns.
pub(crate) fn clear_default(input: &Element) {
    for existing in input.children_named(DEFAULT_VALUE) {
        existing.detach();
    }
    for existing in input.children_named(COLUMNS) {
        existing.detach();
    }
}

/// Replace the stored default with `value`.
pub(crate) fn write_default(input: &Element, value: Option<&DefaultValue>) {
    clear_default(input);
    let Some(value) = value else {
        return;
    };

    let default_element = input.add_child(DEFAULT_VALUE);
    if let Some(marker) = value.marker() {
        default_element.set_attribute(TYPE_ATTR, marker);
    }
    match value {
        DefaultValue::Scalar(text) => default_element.set_text(text),
        DefaultValue::StringList(items) => {
            for item in items {
                default_element.add_child(LIST_ITEM).set_text(item);
            }
        }
        DefaultValue::PropertyMap(row) => write_property_map(&default_element, row),
        DefaultValue::PropertyMapList(rows) => {
            for row in rows {
                write_property_map(&default_element, row);
            }
        }
        DefaultValue::ResultSet(table) => {
            let columns = input.add_child(COLUMNS);
            for column in &table.columns {
                columns
                    .add_child(&column.name)
                    .set_attribute(TYPE_ATTR, &column.column_type);
            }
            for row in &table.rows {
                let row_element = default_element.add_child(ROW);
                for cell in row {
                    row_element.add_child(CELL).set_text(cell);
                }
            }
        }
    }
}
