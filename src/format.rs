//! Structural reindentation of raw pseudocode. The pass is purely lexical: it
//! never parses, so it works on incomplete programs while they are typed.

const INDENT: &str = "   ";

fn leading_words(line: &str) -> (String, Option<String>) {
    let mut words = line.split_whitespace();
    let first = words
        .next()
        .map(|w| w.to_ascii_lowercase())
        .unwrap_or_default();
    let second = words.next().map(|w| w.to_ascii_lowercase());
    (first, second)
}

/// Lines that close a block step back out before they are written: the
/// multi-word `End` forms, a Do-loop's trailing `Until`, and `Else`.
fn outdents(first: &str, second: Option<&str>) -> bool {
    match first {
        "end" => matches!(
            second,
            Some("module" | "function" | "if" | "while" | "for")
        ),
        "until" | "else" => true,
        _ => false,
    }
}

/// Lines that open a block indent what follows them; `Else` re-indents the
/// branch it introduces.
fn indents(first: &str) -> bool {
    matches!(
        first,
        "module" | "function" | "if" | "do" | "while" | "for" | "else"
    )
}

pub fn format_source(source: &str) -> String {
    let mut output = String::new();
    let mut indent_level: usize = 0;

    for line in source.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            output.push('\n');
            continue;
        }

        let (first, second) = leading_words(trimmed);
        if outdents(&first, second.as_deref()) {
            indent_level = indent_level.saturating_sub(1);
        }
        for _ in 0..indent_level {
            output.push_str(INDENT);
        }
        output.push_str(trimmed);
        output.push('\n');
        if indents(&first) {
            indent_level += 1;
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_body_indents() {
        let source = "Module main()\nDisplay \"hi\"\nEnd Module\n";
        let formatted = format_source(source);
        assert_eq!(formatted, "Module main()\n   Display \"hi\"\nEnd Module\n");
    }

    #[test]
    fn test_nested_blocks() {
        let source = "Module main()\nIf x > 0 Then\nDisplay x\nElse\nDisplay 0\nEnd If\nEnd Module\n";
        let formatted = format_source(source);
        assert_eq!(
            formatted,
            "Module main()\n   If x > 0 Then\n      Display x\n   Else\n      Display 0\n   End If\nEnd Module\n"
        );
    }

    #[test]
    fn test_do_until_outdents() {
        let source = "Do\nDisplay x\nUntil x > 3\n";
        let formatted = format_source(source);
        assert_eq!(formatted, "Do\n   Display x\nUntil x > 3\n");
    }

    #[test]
    fn test_blank_lines_kept_empty() {
        let source = "Module main()\n\nDisplay 1\nEnd Module\n";
        let formatted = format_source(source);
        assert_eq!(formatted, "Module main()\n\n   Display 1\nEnd Module\n");
    }

    #[test]
    fn test_case_and_spacing_insensitive() {
        let source = "MODULE main()\ndisplay 1\nEND   module\n";
        let formatted = format_source(source);
        assert_eq!(formatted, "MODULE main()\n   display 1\nEND   module\n");
    }

    #[test]
    fn test_level_never_goes_negative() {
        let source = "End If\nEnd While\nDisplay 1\n";
        let formatted = format_source(source);
        assert_eq!(formatted, "End If\nEnd While\nDisplay 1\n");
    }

    #[test]
    fn test_idempotent() {
        let source =
            "Module main()\nFor i = 1 To 3\nIf i == 2 Then\nDisplay i\nEnd If\nEnd For\nEnd Module\n";
        let once = format_source(source);
        assert_eq!(format_source(&once), once);
    }

    #[test]
    fn test_keyword_like_identifiers_are_left_alone() {
        let source = "Display formula\nDisplay endgame\n";
        let formatted = format_source(source);
        assert_eq!(formatted, "Display formula\nDisplay endgame\n");
    }
}
