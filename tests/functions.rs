mod common;

use common::{run_error, run_program};
use gaddis::interpreter::InterpreterError;

#[test]
fn test_function_call_in_expression() {
    let source = "
        Function Integer double(Integer n)
           Return n * 2
        End Function
        Module main()
           Display double(21)
        End Module
    ";
    assert_eq!(run_program(source), vec!["42"]);
}

#[test]
fn test_recursive_factorial() {
    let source = "
        Function Integer f(Integer n)
           If n == 0 Then
              Return 1
           Else
              Return n * f(n - 1)
           End If
        End Function
        Module main()
           Display f(4)
        End Module
    ";
    assert_eq!(run_program(source), vec!["24"]);
}

#[test]
fn test_function_without_module_wrapper() {
    let source = "
        Function Integer square(Integer n)
           Return n * n
        End Function
        Display square(9)
    ";
    assert_eq!(run_program(source), vec!["81"]);
}

#[test]
fn test_function_result_feeds_expressions() {
    let source = "
        Function Real half(Real n)
           Return n / 2
        End Function
        Module main()
           Display half(7) + 1
        End Module
    ";
    assert_eq!(run_program(source), vec!["4.5"]);
}

#[test]
fn test_function_names_are_case_insensitive() {
    let source = "
        Function Integer Triple(Integer n)
           Return n * 3
        End Function
        Module main()
           Display TRIPLE(5)
        End Module
    ";
    assert_eq!(run_program(source), vec!["15"]);
}

#[test]
fn test_function_sees_globals_not_caller_locals() {
    let source = "
        Declare Integer offset = 100
        Function Integer shifted(Integer n)
           Return n + offset
        End Function
        Module main()
           Display shifted(5)
        End Module
    ";
    assert_eq!(run_program(source), vec!["105"]);
}

#[test]
fn test_nested_function_calls() {
    let source = "
        Function Integer inc(Integer n)
           Return n + 1
        End Function
        Module main()
           Display inc(inc(inc(0)))
        End Module
    ";
    assert_eq!(run_program(source), vec!["3"]);
}

#[test]
fn test_function_with_reference_parameter() {
    let source = "
        Function Integer consume(Ref Integer n)
           Set n = 0
           Return 1
        End Function
        Module main()
           Declare Integer x = 9
           Display consume(x)
           Display x
        End Module
    ";
    assert_eq!(run_program(source), vec!["1", "0"]);
}

#[test]
fn test_missing_return_is_an_error() {
    let source = "
        Function Integer broken(Integer n)
           Set n = n + 1
        End Function
        Module main()
           Display broken(1)
        End Module
    ";
    assert!(matches!(
        run_error(source),
        InterpreterError::MissingReturn { .. }
    ));
}

#[test]
fn test_missing_return_only_on_paths_that_fall_through() {
    let source = "
        Function Integer sign(Integer n)
           If n < 0 Then
              Return -1
           End If
        End Function
        Module main()
           Display sign(5)
        End Module
    ";
    assert!(matches!(
        run_error(source),
        InterpreterError::MissingReturn { .. }
    ));
}

#[test]
fn test_undefined_function() {
    let err = run_error("Display ghost(1)");
    assert!(matches!(err, InterpreterError::Semantic { .. }));
}

#[test]
fn test_builtins_shadow_user_functions() {
    let source = "
        Function Integer abs(Integer n)
           Return 999
        End Function
        Module main()
           Display abs(-4)
        End Module
    ";
    assert_eq!(run_program(source), vec!["4"]);
}

#[test]
fn test_function_argument_count_checked() {
    let source = "
        Function Integer add(Integer a, Integer b)
           Return a + b
        End Function
        Module main()
           Display add(1)
        End Module
    ";
    assert!(matches!(
        run_error(source),
        InterpreterError::Semantic { .. }
    ));
}

#[test]
fn test_module_cannot_be_called_as_function() {
    let source = "
        Module work()
           Display \"working\"
        End Module
        Module main()
           Display work()
        End Module
    ";
    assert!(matches!(
        run_error(source),
        InterpreterError::Semantic { .. }
    ));
}
