use super::document::{Block, InlineElement, List, ListStyle, Section, MAX_LIST_INDENT};
use super::inline::format_inline;

/// Renders one top-level block.
pub fn render_block(block: &Block) -> String {
    match block {
        Block::Section(section) => render_section(section),
        Block::List(list) => render_list(list),
        Block::Preformatted(section) => format!("\n```{}```\n", raw_text(section)),
        Block::Quote(section) => format!("\n> {}\n", raw_text(section).replace('\n', "\n> ")),
        Block::Unknown => String::new(),
    }
}

pub fn render_section(section: &Section) -> String {
    section.elements.iter().map(format_inline).collect()
}

fn render_list(list: &List) -> String {
    let indent = "  ".repeat(list.indent.min(MAX_LIST_INDENT) as usize);
    let items: String = list
        .items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let marker = match list.style {
                ListStyle::Bullet => "• ".to_owned(),
                ListStyle::Ordered => format!("{}. ", index + 1),
            };
            format!("{indent}{marker}{}\n", render_section(item))
        })
        .collect();
    format!("\n{items}")
}

/// Unstyled text of the section's text elements; everything else is dropped.
fn raw_text(section: &Section) -> String {
    section
        .elements
        .iter()
        .filter_map(|element| match element {
            InlineElement::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::render_block;
    use crate::richtext::document::{
        Block, InlineElement, List, ListStyle, Section, TextStyle,
    };

    fn list(style: ListStyle, indent: u32, items: &[&str]) -> Block {
        Block::List(List {
            style,
            indent,
            items: items
                .iter()
                .map(|item| Section::new(vec![InlineElement::text(*item)]))
                .collect(),
        })
    }

    #[test]
    fn section_concatenates_fragments_without_separator() {
        let block = Block::Section(Section::new(vec![
            InlineElement::text("Great job "),
            InlineElement::emoji("tada"),
            InlineElement::text(" "),
            InlineElement::user("U123"),
        ]));
        assert_eq!(render_block(&block), "Great job :tada: <@U123>");
    }

    #[test]
    fn ordered_list_numbers_items_from_one() {
        assert_eq!(render_block(&list(ListStyle::Ordered, 0, &["a", "b"])), "\n1. a\n2. b\n");
    }

    #[test]
    fn bullet_list_indents_two_spaces_per_level() {
        assert_eq!(render_block(&list(ListStyle::Bullet, 2, &["x"])), "\n    • x\n");
    }

    #[test]
    fn huge_indent_renders_at_the_deepest_level() {
        let expected = format!("\n{}• x\n", "  ".repeat(8));
        assert_eq!(render_block(&list(ListStyle::Bullet, u32::MAX, &["x"])), expected);
    }

    #[test]
    fn list_items_keep_inline_formatting() {
        let block = Block::List(List {
            style: ListStyle::Bullet,
            indent: 0,
            items: vec![Section::new(vec![
                InlineElement::styled("ship", TextStyle { bold: true, ..TextStyle::default() }),
                InlineElement::text(" it "),
                InlineElement::emoji("rocket"),
            ])],
        });
        assert_eq!(render_block(&block), "\n• *ship* it :rocket:\n");
    }

    #[test]
    fn empty_list_is_a_single_newline() {
        assert_eq!(render_block(&list(ListStyle::Ordered, 0, &[])), "\n");
    }

    #[test]
    fn preformatted_ignores_styles_and_non_text_elements() {
        let block = Block::Preformatted(Section::new(vec![
            InlineElement::styled("let x", TextStyle { bold: true, ..TextStyle::default() }),
            InlineElement::emoji("tada"),
            InlineElement::text(" = 1;"),
        ]));
        assert_eq!(render_block(&block), "\n```let x = 1;```\n");
    }

    #[test]
    fn quote_prefixes_every_continuation_line() {
        let block = Block::Quote(Section::new(vec![InlineElement::text("line1\nline2")]));
        assert_eq!(render_block(&block), "\n> line1\n> line2\n");
    }

    #[test]
    fn quote_ignores_mentions() {
        let block = Block::Quote(Section::new(vec![
            InlineElement::user("U1"),
            InlineElement::text("said so"),
        ]));
        assert_eq!(render_block(&block), "\n> said so\n");
    }

    #[test]
    fn unknown_block_renders_nothing() {
        assert_eq!(render_block(&Block::Unknown), "");
    }
}
