use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A Slack `rich_text` value as submitted by a `rich_text_input` field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct RichTextDocument {
    #[serde(default, rename = "elements", deserialize_with = "lenient_nodes")]
    pub blocks: Vec<Block>,
}

impl RichTextDocument {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Reads a bare `rich_text` document. Anything without the expected
    /// top-level shape becomes an empty document.
    pub fn from_value(value: &Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        Self::deserialize(value).unwrap_or_default()
    }

    /// Reads the state of a `rich_text_input` form field
    /// (`{"type": "rich_text_input", "rich_text_value": {...}}`).
    ///
    /// A bare `rich_text` document is accepted too. An absent field, or one
    /// without a rich text value, is empty.
    pub fn from_field(field: &Value) -> Self {
        if let Some(value) = field.get("rich_text_value") {
            return Self::from_value(value);
        }
        match field.get("type").and_then(Value::as_str) {
            Some("rich_text") => Self::from_value(field),
            _ => Self::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of blocks and inline elements that were skipped because their
    /// tag was unknown or their shape malformed.
    pub fn unknown_node_count(&self) -> usize {
        self.blocks
            .iter()
            .map(|block| match block {
                Block::Section(section) | Block::Preformatted(section) | Block::Quote(section) => {
                    section.unknown_element_count()
                }
                Block::List(list) => list.items.iter().map(Section::unknown_element_count).sum(),
                Block::Unknown => 1,
            })
            .sum()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum Block {
    #[serde(rename = "rich_text_section")]
    Section(Section),
    #[serde(rename = "rich_text_list")]
    List(List),
    #[serde(rename = "rich_text_preformatted")]
    Preformatted(Section),
    #[serde(rename = "rich_text_quote")]
    Quote(Section),
    #[serde(other)]
    Unknown,
}

/// An ordered run of inline elements.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Section {
    #[serde(default, deserialize_with = "lenient_nodes")]
    pub elements: Vec<InlineElement>,
}

impl Section {
    pub fn new(elements: Vec<InlineElement>) -> Self {
        Self { elements }
    }

    fn unknown_element_count(&self) -> usize {
        self.elements.iter().filter(|element| matches!(element, InlineElement::Unknown)).count()
    }
}

/// Deepest list nesting rendered; larger indents are clamped to it.
pub const MAX_LIST_INDENT: u32 = 8;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct List {
    #[serde(default, deserialize_with = "lenient_list_style")]
    pub style: ListStyle,
    #[serde(default, deserialize_with = "lenient_indent")]
    pub indent: u32,
    /// Only section items are kept; lists never nest other blocks.
    #[serde(default, rename = "elements", deserialize_with = "list_items")]
    pub items: Vec<Section>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListStyle {
    #[default]
    Bullet,
    Ordered,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    pub bold: bool,
    pub italic: bool,
    pub strike: bool,
    pub code: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InlineElement {
    Text {
        #[serde(default, deserialize_with = "null_as_default")]
        text: String,
        #[serde(default, deserialize_with = "null_as_default")]
        style: TextStyle,
    },
    Emoji {
        #[serde(default, deserialize_with = "null_as_default")]
        name: String,
    },
    #[serde(rename = "user")]
    UserMention {
        #[serde(default, deserialize_with = "null_as_default")]
        user_id: String,
    },
    #[serde(rename = "channel")]
    ChannelMention {
        #[serde(default, deserialize_with = "null_as_default")]
        channel_id: String,
    },
    #[serde(rename = "usergroup")]
    UsergroupMention {
        #[serde(default, deserialize_with = "null_as_default")]
        usergroup_id: String,
    },
    Link {
        #[serde(default, deserialize_with = "null_as_default")]
        url: String,
        #[serde(default)]
        text: Option<String>,
    },
    Broadcast {
        #[serde(default, deserialize_with = "null_as_default")]
        range: String,
    },
    #[serde(other)]
    Unknown,
}

impl InlineElement {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into(), style: TextStyle::default() }
    }

    pub fn styled(text: impl Into<String>, style: TextStyle) -> Self {
        Self::Text { text: text.into(), style }
    }

    pub fn emoji(name: impl Into<String>) -> Self {
        Self::Emoji { name: name.into() }
    }

    pub fn user(user_id: impl Into<String>) -> Self {
        Self::UserMention { user_id: user_id.into() }
    }
}

trait Fallback {
    fn fallback() -> Self;
}

impl Fallback for Block {
    fn fallback() -> Self {
        Self::Unknown
    }
}

impl Fallback for InlineElement {
    fn fallback() -> Self {
        Self::Unknown
    }
}

/// Deserializes a node array one entry at a time so a single malformed node
/// degrades to its `Unknown` variant instead of failing the whole document.
fn lenient_nodes<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Fallback,
{
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw.into_iter().map(|node| T::deserialize(node).unwrap_or_else(|_| T::fallback())).collect())
}

fn list_items<'de, D>(deserializer: D) -> Result<Vec<Section>, D::Error>
where
    D: Deserializer<'de>,
{
    let blocks: Vec<Block> = lenient_nodes(deserializer)?;
    Ok(blocks
        .into_iter()
        .filter_map(|block| match block {
            Block::Section(section) => Some(section),
            _ => None,
        })
        .collect())
}

fn lenient_list_style<'de, D>(deserializer: D) -> Result<ListStyle, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw.as_ref().and_then(Value::as_str) {
        Some("ordered") => ListStyle::Ordered,
        _ => ListStyle::Bullet,
    })
}

fn lenient_indent<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(Value::as_u64)
        .map(|indent| indent.min(u64::from(MAX_LIST_INDENT)) as u32)
        .unwrap_or_default())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Block, InlineElement, ListStyle, RichTextDocument, TextStyle, MAX_LIST_INDENT};

    #[test]
    fn parses_every_block_and_element_tag() {
        let document = RichTextDocument::from_value(&json!({
            "type": "rich_text",
            "elements": [
                {
                    "type": "rich_text_section",
                    "elements": [
                        {"type": "text", "text": "hi", "style": {"bold": true}},
                        {"type": "emoji", "name": "tada", "unicode": "1f389"},
                        {"type": "user", "user_id": "U1"},
                        {"type": "channel", "channel_id": "C1"},
                        {"type": "usergroup", "usergroup_id": "S1"},
                        {"type": "link", "url": "https://example.com", "text": "site"},
                        {"type": "broadcast", "range": "here"}
                    ]
                },
                {
                    "type": "rich_text_list",
                    "style": "ordered",
                    "indent": 1,
                    "elements": [
                        {"type": "rich_text_section", "elements": [{"type": "text", "text": "a"}]}
                    ]
                },
                {"type": "rich_text_preformatted", "border": 0, "elements": []},
                {"type": "rich_text_quote", "elements": []}
            ]
        }));

        assert_eq!(document.blocks.len(), 4);
        let Block::Section(section) = &document.blocks[0] else {
            panic!("expected section block");
        };
        assert_eq!(
            section.elements[0],
            InlineElement::styled("hi", TextStyle { bold: true, ..TextStyle::default() })
        );
        assert_eq!(section.elements[2], InlineElement::user("U1"));
        assert_eq!(
            section.elements[5],
            InlineElement::Link {
                url: "https://example.com".to_owned(),
                text: Some("site".to_owned())
            }
        );

        let Block::List(list) = &document.blocks[1] else {
            panic!("expected list block");
        };
        assert_eq!(list.style, ListStyle::Ordered);
        assert_eq!(list.indent, 1);
        assert_eq!(list.items.len(), 1);
        assert!(matches!(document.blocks[2], Block::Preformatted(_)));
        assert!(matches!(document.blocks[3], Block::Quote(_)));
        assert_eq!(document.unknown_node_count(), 0);
    }

    #[test]
    fn unknown_and_malformed_nodes_degrade_to_unknown() {
        let document = RichTextDocument::from_value(&json!({
            "type": "rich_text",
            "elements": [
                {"type": "rich_text_table", "rows": []},
                {
                    "type": "rich_text_section",
                    "elements": [
                        {"type": "date", "timestamp": 1},
                        {"type": "text", "text": 42},
                        {"type": "text", "text": "kept"}
                    ]
                },
                "not-an-object"
            ]
        }));

        assert_eq!(document.blocks.len(), 3);
        assert_eq!(document.blocks[0], Block::Unknown);
        assert_eq!(document.blocks[2], Block::Unknown);
        let Block::Section(section) = &document.blocks[1] else {
            panic!("expected section block");
        };
        assert_eq!(section.elements[2], InlineElement::text("kept"));
        assert_eq!(document.unknown_node_count(), 4);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let document = RichTextDocument::from_value(&json!({
            "elements": [
                {"type": "rich_text_list", "style": "checklist", "indent": -2, "elements": [
                    {"type": "rich_text_quote", "elements": []},
                    {"type": "rich_text_section"}
                ]},
                {"type": "rich_text_section", "elements": [
                    {"type": "text", "style": null},
                    {"type": "link", "url": "https://example.com"}
                ]}
            ]
        }));

        let Block::List(list) = &document.blocks[0] else {
            panic!("expected list block");
        };
        assert_eq!(list.style, ListStyle::Bullet);
        assert_eq!(list.indent, 0);
        assert_eq!(list.items.len(), 1, "non-section list items are dropped");

        let Block::Section(section) = &document.blocks[1] else {
            panic!("expected section block");
        };
        assert_eq!(section.elements[0], InlineElement::text(""));
        assert_eq!(
            section.elements[1],
            InlineElement::Link { url: "https://example.com".to_owned(), text: None }
        );
    }

    #[test]
    fn malformed_or_absent_documents_are_empty() {
        assert!(RichTextDocument::from_value(&json!(null)).is_empty());
        assert!(RichTextDocument::from_value(&json!("text")).is_empty());
        assert!(RichTextDocument::from_value(&json!({"elements": "nope"})).is_empty());
        assert!(RichTextDocument::from_value(&json!({"type": "rich_text"})).is_empty());
        assert!(RichTextDocument::from_value(&json!([[{
            "type": "rich_text_section",
            "elements": [{"type": "text", "text": "leak"}]
        }]]))
        .is_empty());
    }

    #[test]
    fn oversized_list_indent_is_clamped() {
        let document = RichTextDocument::from_value(&json!({
            "type": "rich_text",
            "elements": [{"type": "rich_text_list", "indent": 4294967295_u64, "elements": []}]
        }));
        let Block::List(list) = &document.blocks[0] else {
            panic!("expected a list");
        };
        assert_eq!(list.indent, MAX_LIST_INDENT);
    }

    #[test]
    fn null_reference_fields_read_as_empty_instead_of_unknown() {
        let document = RichTextDocument::from_value(&json!({
            "type": "rich_text",
            "elements": [{
                "type": "rich_text_section",
                "elements": [
                    {"type": "emoji", "name": null},
                    {"type": "user", "user_id": null},
                    {"type": "channel", "channel_id": null},
                    {"type": "usergroup", "usergroup_id": null},
                    {"type": "link", "url": null, "text": null},
                    {"type": "broadcast", "range": null}
                ]
            }]
        }));

        assert_eq!(document.unknown_node_count(), 0);
        let Block::Section(section) = &document.blocks[0] else {
            panic!("expected a section");
        };
        assert_eq!(section.elements[0], InlineElement::emoji(""));
        assert_eq!(section.elements[1], InlineElement::user(""));
        assert_eq!(
            section.elements[4],
            InlineElement::Link { url: String::new(), text: None }
        );
    }

    #[test]
    fn field_reader_unwraps_rich_text_input_state() {
        let field = json!({
            "type": "rich_text_input",
            "rich_text_value": {
                "type": "rich_text",
                "elements": [{"type": "rich_text_section", "elements": [{"type": "text", "text": "x"}]}]
            }
        });
        assert_eq!(RichTextDocument::from_field(&field).blocks.len(), 1);

        let bare = field["rich_text_value"].clone();
        assert_eq!(RichTextDocument::from_field(&bare).blocks.len(), 1);

        assert!(RichTextDocument::from_field(&json!({"type": "rich_text_input"})).is_empty());
        assert!(RichTextDocument::from_field(&json!(null)).is_empty());
    }
}
