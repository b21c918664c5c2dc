//! Template and message models
//!
//! A template is an ordered list of messages. Each message carries a delay in
//! seconds applied before it is sent, and a body tagged by its `type` field.

use serde::{Deserialize, Serialize};

use super::{clamped_delay, null_as_default, string_or_number};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTemplate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Editor-assigned identifier, opaque to the client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    /// Seconds to wait before sending
    #[serde(default, deserialize_with = "clamped_delay")]
    pub delay: u32,
    #[serde(flatten)]
    pub body: MessageBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageBody {
    Text {
        content: String,
        #[serde(default, rename = "mentionAll")]
        mention_all: bool,
    },
    Image(MediaContent),
    Video(MediaContent),
    Audio(MediaContent),
    Document(MediaContent),
    /// One button label per line of `content`
    Button {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<Vec<String>>,
    },
    /// `content` is the list title, `options` its items
    List {
        content: String,
        #[serde(default, deserialize_with = "null_as_default")]
        options: Vec<String>,
    },
    Contact {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        phone: Option<String>,
    },
}

/// Media payload: a data URL or remote URL plus the original file name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaContent {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    Image,
    Video,
    Audio,
    Document,
    Button,
    List,
    Contact,
}

impl Message {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            id: None,
            delay: 0,
            body: MessageBody::Text {
                content: content.into(),
                mention_all: false,
            },
        }
    }

    pub fn with_delay(mut self, delay: u32) -> Self {
        self.delay = delay;
        self
    }

    pub fn kind(&self) -> MessageKind {
        match &self.body {
            MessageBody::Text { .. } => MessageKind::Text,
            MessageBody::Image(_) => MessageKind::Image,
            MessageBody::Video(_) => MessageKind::Video,
            MessageBody::Audio(_) => MessageKind::Audio,
            MessageBody::Document(_) => MessageKind::Document,
            MessageBody::Button { .. } => MessageKind::Button,
            MessageBody::List { .. } => MessageKind::List,
            MessageBody::Contact { .. } => MessageKind::Contact,
        }
    }

    pub fn content(&self) -> &str {
        match &self.body {
            MessageBody::Text { content, .. }
            | MessageBody::Button { content, .. }
            | MessageBody::List { content, .. }
            | MessageBody::Contact { content, .. } => content,
            MessageBody::Image(media)
            | MessageBody::Video(media)
            | MessageBody::Audio(media)
            | MessageBody::Document(media) => &media.content,
        }
    }

    pub fn media(&self) -> Option<&MediaContent> {
        match &self.body {
            MessageBody::Image(media)
            | MessageBody::Video(media)
            | MessageBody::Audio(media)
            | MessageBody::Document(media) => Some(media),
            _ => None,
        }
    }

    /// Button labels, one per non-empty line of content
    pub fn button_labels(&self) -> Vec<&str> {
        match &self.body {
            MessageBody::Button { content, .. } => content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Image => "image",
            MessageKind::Video => "video",
            MessageKind::Audio => "audio",
            MessageKind::Document => "document",
            MessageKind::Button => "button",
            MessageKind::List => "list",
            MessageKind::Contact => "contact",
        }
    }

    pub fn is_media(&self) -> bool {
        matches!(self, MessageKind::Image | MessageKind::Video | MessageKind::Audio | MessageKind::Document)
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_message_wire_shape() {
        let message: Message = serde_json::from_value(json!({"type": "text", "content": "hi", "delay": 0})).unwrap();
        assert_eq!(message, Message::text("hi"));

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["type"], "text");
        assert_eq!(value["content"], "hi");
        assert_eq!(value["delay"], 0);
        assert_eq!(value["mentionAll"], false);
    }

    #[test]
    fn test_editor_message_with_extra_fields() {
        let message: Message = serde_json::from_value(json!({
            "id": 1718030000000u64,
            "type": "button",
            "content": "Sim\nNão\n",
            "options": [],
            "mentionAll": false,
            "delay": 5
        }))
        .unwrap();

        assert_eq!(message.kind(), MessageKind::Button);
        assert_eq!(message.delay, 5);
        assert_eq!(message.button_labels(), vec!["Sim", "Não"]);
    }

    #[test]
    fn test_media_message() {
        let message: Message = serde_json::from_value(json!({
            "type": "image",
            "content": "data:image/png;base64,QUJD",
            "fileName": "promo.png",
            "delay": 2
        }))
        .unwrap();

        assert!(message.kind().is_media());
        assert_eq!(message.media().unwrap().file_name.as_deref(), Some("promo.png"));
        assert_eq!(message.content(), "data:image/png;base64,QUJD");
    }

    #[test]
    fn test_unknown_type_rejected() {
        let result = serde_json::from_value::<Message>(json!({"type": "sticker", "content": "x"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_list_and_contact() {
        let list: Message = serde_json::from_value(json!({"type": "list", "content": "Menu", "options": ["a", "b"]})).unwrap();
        assert_eq!(list.body, MessageBody::List { content: "Menu".into(), options: vec!["a".into(), "b".into()] });

        let contact: Message = serde_json::from_value(json!({"type": "contact", "content": "Ana", "phone": "+5511999999999"})).unwrap();
        assert_eq!(contact.kind().to_string(), "contact");
    }

    #[test]
    fn test_editor_list_with_null_options() {
        let list: Message = serde_json::from_value(json!({
            "id": 1700000000000u64,
            "type": "list",
            "content": "Menu",
            "options": null,
            "mentionAll": false,
            "delay": 0
        }))
        .unwrap();

        assert_eq!(list.body, MessageBody::List { content: "Menu".into(), options: Vec::new() });
        assert_eq!(serde_json::to_value(&list).unwrap()["options"], json!([]));
    }

    #[test]
    fn test_out_of_range_delays_are_clamped() {
        let delay = |raw: serde_json::Value| {
            serde_json::from_value::<Message>(json!({"type": "text", "content": "x", "delay": raw}))
                .unwrap()
                .delay
        };

        assert_eq!(delay(json!(-3)), 0);
        assert_eq!(delay(json!(null)), 0);
        assert_eq!(delay(json!(2.7)), 2);
        assert_eq!(delay(json!(7)), 7);
    }
}
