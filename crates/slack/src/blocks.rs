use kudos_core::RecognitionCatalog;
use serde::Serialize;

pub const KUDOS_CALLBACK_ID: &str = "kudos_modal";
pub const RECIPIENT_BLOCK: &str = "recipient_block";
pub const RECIPIENT_INPUT: &str = "recipient_input";
pub const RECOGNITION_TYPE_BLOCK: &str = "recognition_type_block";
pub const RECOGNITION_TYPE_SELECT: &str = "recognition_type_select";
pub const MESSAGE_BLOCK: &str = "message_block";
pub const MESSAGE_INPUT: &str = "message_input";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextObject {
    #[serde(rename = "plain_text")]
    Plain { text: String },
    Mrkdwn { text: String },
}

impl TextObject {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Plain { text: text.into() }
    }

    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self::Mrkdwn { text: text.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub text: TextObject,
    pub value: String,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self { text: TextObject::plain(label), value: value.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputElement {
    RichTextInput {
        action_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<TextObject>,
    },
    StaticSelect {
        action_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<TextObject>,
        options: Vec<SelectOption>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Section {
        block_id: String,
        text: TextObject,
    },
    Input {
        block_id: String,
        label: TextObject,
        element: InputElement,
        #[serde(skip_serializing_if = "Option::is_none")]
        hint: Option<TextObject>,
    },
}

/// A `views.open` payload for a modal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ModalView {
    #[serde(rename = "type")]
    pub view_type: String,
    pub callback_id: String,
    pub private_metadata: String,
    pub title: TextObject,
    pub submit: TextObject,
    pub close: TextObject,
    pub blocks: Vec<Block>,
}

pub struct ModalBuilder {
    callback_id: String,
    title: String,
    submit: String,
    close: String,
    private_metadata: String,
    blocks: Vec<Block>,
}

impl ModalBuilder {
    pub fn new(callback_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            callback_id: callback_id.into(),
            title: title.into(),
            submit: "Submit".to_owned(),
            close: "Cancel".to_owned(),
            private_metadata: String::new(),
            blocks: Vec::new(),
        }
    }

    pub fn submit(mut self, label: impl Into<String>) -> Self {
        self.submit = label.into();
        self
    }

    pub fn close(mut self, label: impl Into<String>) -> Self {
        self.close = label.into();
        self
    }

    pub fn private_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.private_metadata = metadata.into();
        self
    }

    pub fn section<F>(mut self, block_id: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(&mut SectionBuilder),
    {
        let mut builder = SectionBuilder::default();
        build(&mut builder);
        self.blocks.push(Block::Section { block_id: block_id.into(), text: builder.build() });
        self
    }

    pub fn input<F>(mut self, block_id: impl Into<String>, label: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(InputBuilder) -> InputBuilder,
    {
        let builder = build(InputBuilder::default());
        let (element, hint) = builder.build();
        self.blocks.push(Block::Input {
            block_id: block_id.into(),
            label: TextObject::plain(label),
            element,
            hint,
        });
        self
    }

    pub fn build(self) -> ModalView {
        ModalView {
            view_type: "modal".to_owned(),
            callback_id: self.callback_id,
            private_metadata: self.private_metadata,
            title: TextObject::plain(self.title),
            submit: TextObject::plain(self.submit),
            close: TextObject::plain(self.close),
            blocks: self.blocks,
        }
    }
}

#[derive(Default)]
pub struct SectionBuilder {
    text: Option<TextObject>,
}

impl SectionBuilder {
    pub fn plain(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = Some(TextObject::plain(text));
        self
    }

    pub fn mrkdwn(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = Some(TextObject::mrkdwn(text));
        self
    }

    fn build(self) -> TextObject {
        self.text.unwrap_or_else(|| TextObject::plain(""))
    }
}

#[derive(Default)]
pub struct InputBuilder {
    element: Option<InputElement>,
    hint: Option<TextObject>,
}

impl InputBuilder {
    pub fn rich_text(mut self, action_id: impl Into<String>, placeholder: impl Into<String>) -> Self {
        self.element = Some(InputElement::RichTextInput {
            action_id: action_id.into(),
            placeholder: Some(TextObject::plain(placeholder)),
        });
        self
    }

    pub fn static_select(
        mut self,
        action_id: impl Into<String>,
        placeholder: impl Into<String>,
        options: Vec<SelectOption>,
    ) -> Self {
        self.element = Some(InputElement::StaticSelect {
            action_id: action_id.into(),
            placeholder: Some(TextObject::plain(placeholder)),
            options,
        });
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(TextObject::plain(hint));
        self
    }

    fn build(self) -> (InputElement, Option<TextObject>) {
        let element = self.element.unwrap_or_else(|| InputElement::RichTextInput {
            action_id: "input".to_owned(),
            placeholder: None,
        });
        (element, self.hint)
    }
}

/// Dropdown options in catalog order, labelled `"{emoji} {title}"`.
pub fn recognition_options(catalog: &RecognitionCatalog) -> Vec<SelectOption> {
    catalog
        .entries()
        .iter()
        .map(|recognition| SelectOption::new(recognition.option_label(), recognition.key.clone()))
        .collect()
}

/// The form opened by `/kudos`. The originating channel rides along in
/// `private_metadata` so the submission knows where to post.
pub fn kudos_modal(channel_id: &str, catalog: &RecognitionCatalog) -> ModalView {
    ModalBuilder::new(KUDOS_CALLBACK_ID, "🎉 Give Kudos")
        .submit("Send Kudos")
        .close("Cancel")
        .private_metadata(channel_id)
        .input(RECIPIENT_BLOCK, "👥 Coworker", |input| {
            input
                .rich_text(RECIPIENT_INPUT, "@mention the coworker you want to thank")
                .hint("Mention exactly one person.")
        })
        .input(RECOGNITION_TYPE_BLOCK, "🏆 Recognition Type", |input| {
            input.static_select(
                RECOGNITION_TYPE_SELECT,
                "Select recognition type",
                recognition_options(catalog),
            )
        })
        .input(MESSAGE_BLOCK, "💬 Message", |input| {
            input.rich_text(
                MESSAGE_INPUT,
                "Write your kudos message here... You can use emojis and @mention people!",
            )
        })
        .build()
}
