//! Text helpers for presenting code.

/// Remove the whitespace prefix common to every non-blank line.
///
/// Whitespace-only lines do not count toward the prefix and come out empty.
/// Tabs and spaces are compared literally, so `"\t"` and `"    "` share no
/// prefix.
#[must_use]
pub fn dedent(text: &str) -> String {
    textwrap::dedent(text)
}

/// Human-readable language name, e.g. `cpp` → `C++`.
///
/// Ids without a special spelling are title-cased word by word, splitting on
/// `_` and `-`.
#[must_use]
pub fn display_name(lang: &str) -> String {
    let special = match lang {
        "cpp" => "C++",
        "c_sharp" => "C#",
        "javascript" => "JavaScript",
        "typescript" => "TypeScript",
        "tsx" => "TSX",
        "html" => "HTML",
        "css" => "CSS",
        "scss" => "SCSS",
        "json" => "JSON",
        "xml" => "XML",
        "yaml" => "YAML",
        "php" => "PHP",
        "gdscript" => "GDScript",
        "hcl" => "HCL",
        "dtd" => "DTD",
        "r" => "R",
        _ => "",
    };
    if !special.is_empty() {
        return special.to_string();
    }

    lang.split(['_', '-'])
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::common_margin("    def f():\n        return 1\n", "def f():\n    return 1\n")]
    #[case::blank_lines_ignored("  a\n\n  b\n   \n  c", "a\n\nb\n\nc")]
    #[case::all_blank("  \n\t\n", "\n\n")]
    #[case::tabs_and_spaces_differ("\tx\n    y", "\tx\n    y")]
    #[case::no_margin("fn main() {\n    run();\n}", "fn main() {\n    run();\n}")]
    fn test_dedent(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(dedent(text), expected);
    }

    #[rstest]
    #[case::special("cpp", "C++")]
    #[case::csharp("c_sharp", "C#")]
    #[case::tsx("tsx", "TSX")]
    #[case::plain("python", "Python")]
    #[case::words("embedded_template", "Embedded Template")]
    #[case::dashed("objective-c", "Objective C")]
    fn test_display_name(#[case] lang: &str, #[case] expected: &str) {
        assert_eq!(display_name(lang), expected);
    }
}
