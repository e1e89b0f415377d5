use super::document::{InlineElement, TextStyle};

/// Renders one inline element as a mrkdwn fragment.
pub fn format_inline(element: &InlineElement) -> String {
    match element {
        InlineElement::Text { text, style } => apply_style(text, style),
        InlineElement::Emoji { name } => format!(":{name}:"),
        InlineElement::UserMention { user_id } => format!("<@{user_id}>"),
        InlineElement::ChannelMention { channel_id } => format!("<#{channel_id}>"),
        InlineElement::UsergroupMention { usergroup_id } => format!("<!subteam^{usergroup_id}>"),
        InlineElement::Link { url, text } => match text.as_deref() {
            Some(label) if !label.is_empty() && label != url => format!("<{url}|{label}>"),
            _ => url.clone(),
        },
        InlineElement::Broadcast { range } => format!("<!{range}>"),
        InlineElement::Unknown => String::new(),
    }
}

/// Wraps bold first and code last, so code ends up outermost.
fn apply_style(text: &str, style: &TextStyle) -> String {
    [(style.bold, '*'), (style.italic, '_'), (style.strike, '~'), (style.code, '`')]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .fold(text.to_owned(), |wrapped, (_, marker)| format!("{marker}{wrapped}{marker}"))
}

#[cfg(test)]
mod tests {
    use super::format_inline;
    use crate::richtext::document::{InlineElement, TextStyle};

    fn styled(bold: bool, italic: bool, strike: bool, code: bool) -> InlineElement {
        InlineElement::styled("hi", TextStyle { bold, italic, strike, code })
    }

    #[test]
    fn plain_text_is_left_untouched() {
        assert_eq!(format_inline(&InlineElement::text("Great job ")), "Great job ");
    }

    #[test]
    fn single_styles_use_their_own_marker() {
        assert_eq!(format_inline(&styled(true, false, false, false)), "*hi*");
        assert_eq!(format_inline(&styled(false, true, false, false)), "_hi_");
        assert_eq!(format_inline(&styled(false, false, true, false)), "~hi~");
        assert_eq!(format_inline(&styled(false, false, false, true)), "`hi`");
    }

    #[test]
    fn combined_styles_nest_with_code_outermost() {
        assert_eq!(format_inline(&styled(true, true, false, false)), "_*hi*_");
        assert_eq!(format_inline(&styled(true, false, false, true)), "`*hi*`");
        assert_eq!(format_inline(&styled(false, true, true, false)), "~_hi_~");
        assert_eq!(format_inline(&styled(true, true, true, true)), "`~_*hi*_~`");
    }

    #[test]
    fn references_render_as_slack_escapes() {
        assert_eq!(format_inline(&InlineElement::emoji("tada")), ":tada:");
        assert_eq!(format_inline(&InlineElement::user("U123")), "<@U123>");
        assert_eq!(
            format_inline(&InlineElement::ChannelMention { channel_id: "C42".to_owned() }),
            "<#C42>"
        );
        assert_eq!(
            format_inline(&InlineElement::UsergroupMention { usergroup_id: "S7".to_owned() }),
            "<!subteam^S7>"
        );
        assert_eq!(
            format_inline(&InlineElement::Broadcast { range: "here".to_owned() }),
            "<!here>"
        );
    }

    #[test]
    fn links_only_carry_a_label_when_it_differs_from_the_url() {
        let url = "https://example.com".to_owned();
        let labelled = InlineElement::Link { url: url.clone(), text: Some("docs".to_owned()) };
        let same = InlineElement::Link { url: url.clone(), text: Some(url.clone()) };
        let empty = InlineElement::Link { url: url.clone(), text: Some(String::new()) };
        let bare = InlineElement::Link { url: url.clone(), text: None };

        assert_eq!(format_inline(&labelled), "<https://example.com|docs>");
        assert_eq!(format_inline(&same), url);
        assert_eq!(format_inline(&empty), url);
        assert_eq!(format_inline(&bare), url);
    }

    #[test]
    fn unknown_elements_render_nothing() {
        assert_eq!(format_inline(&InlineElement::Unknown), "");
    }
}
