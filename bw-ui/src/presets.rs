/// Font choices offered by the configurator: label and CSS family list.
pub const FONT_PRESETS: &[(&str, &str)] = &[
    (
        "System Sans (Segoe/Helvetica/Arial)",
        r#"-apple-system, BlinkMacSystemFont, "Segoe UI", "Helvetica Neue", Arial, sans-serif"#,
    ),
    (
        "System Serif (Times/Baskerville)",
        r#""Times New Roman", "Times", Georgia, "Baskerville", "Palatino Linotype", serif"#,
    ),
    (
        "System Mono (SFMono/Consolas)",
        r#""SFMono-Regular", Consolas, "Liberation Mono", Menlo, monospace"#,
    ),
    ("Arial", r#"Arial, "Helvetica Neue", Helvetica, sans-serif"#),
    ("Verdana", "Verdana, Geneva, sans-serif"),
    ("Tahoma", "Tahoma, Geneva, sans-serif"),
    (
        "Trebuchet MS",
        r#""Trebuchet MS", "Helvetica Neue", Helvetica, sans-serif"#,
    ),
    ("Helvetica", r#""Helvetica Neue", Helvetica, Arial, sans-serif"#),
    ("Segoe UI", r#""Segoe UI", "Helvetica Neue", Arial, sans-serif"#),
    ("Georgia", r#"Georgia, "Times New Roman", serif"#),
    ("Times New Roman", r#""Times New Roman", Times, serif"#),
    ("Garamond", r#"Garamond, "Times New Roman", serif"#),
    (
        "Palatino",
        r#""Palatino Linotype", "Book Antiqua", Palatino, serif"#,
    ),
    ("Courier New", r#""Courier New", Courier, monospace"#),
    ("Consolas", r#"Consolas, "Liberation Mono", Menlo, monospace"#),
    ("Menlo", r#"Menlo, Monaco, Consolas, "Liberation Mono", monospace"#),
    ("Monaco", r#"Monaco, Menlo, Consolas, "Liberation Mono", monospace"#),
];

pub const FONT_PLACEHOLDER: &str = "Select a font";

/// Label shown in the picker for a stored family list.
pub fn font_label(family: &str) -> &str {
    if family.trim().is_empty() {
        return FONT_PLACEHOLDER;
    }
    FONT_PRESETS
        .iter()
        .find(|(_, value)| *value == family)
        .map(|(label, _)| *label)
        .unwrap_or(family)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_unique() {
        for (i, (label, value)) in FONT_PRESETS.iter().enumerate() {
            assert!(
                FONT_PRESETS[i + 1..]
                    .iter()
                    .all(|(l, v)| l != label && v != value)
            );
        }
        assert_eq!(FONT_PRESETS.len(), 17);
    }

    #[test]
    fn labels_resolve_from_family_lists() {
        assert_eq!(font_label(""), FONT_PLACEHOLDER);
        assert_eq!(font_label("Verdana, Geneva, sans-serif"), "Verdana");
        assert_eq!(font_label("Comic Sans MS"), "Comic Sans MS");
    }
}
