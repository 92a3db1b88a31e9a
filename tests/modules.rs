mod common;

use common::{run_error, run_program};
use gaddis::interpreter::InterpreterError;

#[test]
fn test_call_module() {
    let source = "
        Module greet()
           Display \"hello\"
        End Module
        Module main()
           Call greet()
        End Module
    ";
    assert_eq!(run_program(source), vec!["hello"]);
}

#[test]
fn test_module_names_are_case_insensitive() {
    let source = "
        Module Greet()
           Display \"hi\"
        End Module
        Module main()
           Call GREET()
        End Module
    ";
    assert_eq!(run_program(source), vec!["hi"]);
}

#[test]
fn test_by_value_parameters() {
    let source = "
        Module show(Integer n)
           Set n = n + 1
           Display n
        End Module
        Module main()
           Declare Integer x = 5
           Call show(x)
           Display x
        End Module
    ";
    assert_eq!(run_program(source), vec!["6", "5"]);
}

#[test]
fn test_by_reference_swap() {
    let source = "
        Module swap(Ref Integer x, Ref Integer y)
           Declare Integer t
           Set t = x
           Set x = y
           Set y = t
        End Module
        Module main()
           Declare Integer a = 1, b = 2
           Call swap(a, b)
           Display a, \" \", b
        End Module
    ";
    assert_eq!(run_program(source), vec!["2 1"]);
}

#[test]
fn test_ref_marker_after_type_keyword() {
    let source = "
        Module bump(Integer Ref n)
           Set n = n + 1
        End Module
        Module main()
           Declare Integer x = 1
           Call bump(x)
           Display x
        End Module
    ";
    assert_eq!(run_program(source), vec!["2"]);
}

#[test]
fn test_auto_parameter_adopts_argument() {
    let source = "
        Module show(value)
           Display value
        End Module
        Module main()
           Call show(\"text\")
           Call show(7)
        End Module
    ";
    assert_eq!(run_program(source), vec!["text", "7"]);
}

#[test]
fn test_array_parameter() {
    let source = "
        Module first(Integer values[])
           Display values[0]
        End Module
        Module main()
           Declare Integer nums[3] = 7, 8, 9
           Call first(nums)
        End Module
    ";
    assert_eq!(run_program(source), vec!["7"]);
}

#[test]
fn test_globals_visible_inside_modules() {
    let source = "
        Declare Integer counter = 0
        Module bump()
           Set counter = counter + 1
        End Module
        Module main()
           Call bump()
           Call bump()
           Display counter
        End Module
    ";
    assert_eq!(run_program(source), vec!["2"]);
}

#[test]
fn test_caller_locals_hidden_from_callee() {
    let source = "
        Module peek()
           Display secret
        End Module
        Module main()
           Declare Integer secret = 42
           Call peek()
        End Module
    ";
    assert!(matches!(
        run_error(source),
        InterpreterError::Semantic { .. }
    ));
}

#[test]
fn test_module_locals_do_not_leak() {
    let source = "
        Module setup()
           Declare Integer temp = 1
        End Module
        Module main()
           Call setup()
           Display temp
        End Module
    ";
    assert!(matches!(
        run_error(source),
        InterpreterError::Semantic { .. }
    ));
}

#[test]
fn test_return_exits_module_early() {
    let source = "
        Module report(Integer n)
           If n < 0 Then
              Return 0
           End If
           Display n
        End Module
        Module main()
           Call report(-1)
           Call report(3)
        End Module
    ";
    assert_eq!(run_program(source), vec!["3"]);
}

#[test]
fn test_wrong_argument_count() {
    let source = "
        Module pair(Integer a, Integer b)
           Display a + b
        End Module
        Module main()
           Call pair(1)
        End Module
    ";
    assert!(matches!(
        run_error(source),
        InterpreterError::Semantic { .. }
    ));
}

#[test]
fn test_by_reference_argument_must_be_a_variable() {
    let source = "
        Module bump(Ref Integer n)
           Set n = n + 1
        End Module
        Module main()
           Call bump(1 + 2)
        End Module
    ";
    assert!(matches!(
        run_error(source),
        InterpreterError::Semantic { .. }
    ));
}

#[test]
fn test_main_required_when_modules_exist() {
    let source = "
        Module helper()
           Display \"nope\"
        End Module
    ";
    let err = run_error(source);
    assert!(matches!(err, InterpreterError::Semantic { .. }));
    assert!(err.to_string().contains("main"));
}

#[test]
fn test_undefined_module() {
    let source = "
        Module main()
           Call ghost()
        End Module
    ";
    assert!(matches!(
        run_error(source),
        InterpreterError::Semantic { .. }
    ));
}

#[test]
fn test_duplicate_module_names_rejected() {
    let source = "
        Module work() End Module
        Module WORK() End Module
        Module main() End Module
    ";
    assert!(matches!(
        run_error(source),
        InterpreterError::Semantic { .. }
    ));
}

#[test]
fn test_top_level_declarations_run_before_main() {
    let source = "
        Declare Integer base = 40
        Module main()
           Display base + 2
        End Module
    ";
    assert_eq!(run_program(source), vec!["42"]);
}

#[test]
fn test_stray_top_level_statements_do_not_run_with_modules() {
    let source = "
        Display \"stray\"
        Module main()
           Display \"main\"
        End Module
    ";
    assert_eq!(run_program(source), vec!["main"]);
}

#[test]
fn test_modules_can_call_other_modules() {
    let source = "
        Module inner()
           Display \"inner\"
        End Module
        Module outer()
           Display \"outer\"
           Call inner()
        End Module
        Module main()
           Call outer()
        End Module
    ";
    assert_eq!(run_program(source), vec!["outer", "inner"]);
}
