use gaddis::format_source;

#[test]
fn test_whole_program_reindented() {
    let source = "\
Module main()
Declare Integer total = 0
For i = 1 To 3
If i == 2 Then
Display \"two\"
Else
Display i
End If
End For
Display total
End Module
";
    let expected = "\
Module main()
   Declare Integer total = 0
   For i = 1 To 3
      If i == 2 Then
         Display \"two\"
      Else
         Display i
      End If
   End For
   Display total
End Module
";
    assert_eq!(format_source(source), expected);
}

#[test]
fn test_existing_indentation_is_normalized() {
    let source = "      Module main()\n\t\tDisplay 1\n  End Module\n";
    assert_eq!(
        format_source(source),
        "Module main()\n   Display 1\nEnd Module\n"
    );
}

#[test]
fn test_formatting_is_idempotent() {
    let source = "\
Module main()
Declare Integer x = 0
Do
Set x = x + 1
Until x > 3
While x < 10
Set x = x + 2
End While
End Module
";
    let once = format_source(source);
    let twice = format_source(&once);
    assert_eq!(once, twice);
}

#[test]
fn test_blank_lines_survive_without_trailing_spaces() {
    let source = "Module main()\n\nDisplay 1\nEnd Module\n";
    let formatted = format_source(source);
    assert!(formatted.contains("\n\n"));
    for line in formatted.lines() {
        assert_eq!(line, line.trim_end());
    }
}

#[test]
fn test_function_blocks_indent() {
    let source = "Function Integer f(Integer n)\nReturn n\nEnd Function\n";
    assert_eq!(
        format_source(source),
        "Function Integer f(Integer n)\n   Return n\nEnd Function\n"
    );
}

#[test]
fn test_do_until_loop_shape() {
    let source = "Do\nDisplay 1\nUntil done\n";
    assert_eq!(format_source(source), "Do\n   Display 1\nUntil done\n");
}

#[test]
fn test_comment_lines_are_indented_with_their_block() {
    let source = "Module main()\n// setup\nDisplay 1\nEnd Module\n";
    assert_eq!(
        format_source(source),
        "Module main()\n   // setup\n   Display 1\nEnd Module\n"
    );
}

#[test]
fn test_unbalanced_input_clamps_at_zero() {
    let source = "End If\nDisplay 1\n";
    assert_eq!(format_source(source), "End If\nDisplay 1\n");
}
