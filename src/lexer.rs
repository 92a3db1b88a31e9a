use chumsky::{prelude::*, text};

use crate::interpreter::InterpreterError;
use crate::token::{Token, TokenKind};

/// Raw token produced by the combinator pass, before keyword folding and
/// multi-word assembly. `Unknown` makes lexing total; it is rejected with a
/// proper line number in [`lex`].
#[derive(Debug, Clone, PartialEq)]
enum RawToken {
    Word(String),
    Number(String),
    Str { text: String, closed: bool },
    Punct(TokenKind),
    Unknown(char),
}

fn raw_lexer<'a>()
-> impl Parser<'a, &'a str, Vec<(RawToken, SimpleSpan)>, extra::Err<Simple<'a, char>>> {
    let number = text::digits(10)
        .then(just('.').then(text::digits(10)).or_not())
        .to_slice()
        .map(|s: &str| RawToken::Number(s.to_string()));

    // No escape sequences in this language; a string must close on its line.
    let string = just('"')
        .ignore_then(none_of("\"\n").repeated().collect::<String>())
        .then(just('"').or_not())
        .map(|(text, close)| RawToken::Str {
            text,
            closed: close.is_some(),
        });

    let word = any()
        .filter(|c: &char| c.is_ascii_alphabetic())
        .then(
            any()
                .filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_')
                .repeated(),
        )
        .to_slice()
        .map(|s: &str| RawToken::Word(s.to_string()));

    let two_char_operators = choice((
        just("==").to(TokenKind::Equal),
        just("!=").to(TokenKind::NotEqual),
        just("<=").to(TokenKind::LessEqual),
        just(">=").to(TokenKind::GreaterEqual),
    ));

    let one_char_operators = choice((
        just('=').to(TokenKind::Assign),
        just('<').to(TokenKind::Less),
        just('>').to(TokenKind::Greater),
        just('+').to(TokenKind::Plus),
        just('-').to(TokenKind::Minus),
        just('*').to(TokenKind::Star),
        just('/').to(TokenKind::Slash),
        just('%').to(TokenKind::Percent),
        just('^').to(TokenKind::Power),
        just('(').to(TokenKind::LParen),
        just(')').to(TokenKind::RParen),
        just('[').to(TokenKind::LBracket),
        just(']').to(TokenKind::RBracket),
        just(',').to(TokenKind::Comma),
    ));

    let operator = two_char_operators.or(one_char_operators).map(RawToken::Punct);

    let line_comment = just('/')
        .then(just('/'))
        .ignore_then(any().and_is(just('\n').not()).repeated())
        .ignored();

    let skip = choice((
        line_comment,
        any().filter(|c: &char| c.is_whitespace()).ignored(),
    ))
    .repeated();

    let token = choice((number, string, word, operator, any().map(RawToken::Unknown)))
        .map_with(|tok, e| (tok, e.span()))
        .padded_by(skip.clone());

    skip.ignore_then(token.repeated().collect()).then_ignore(end())
}

/// Byte-offset to 1-based line number lookup.
struct LineTracker {
    starts: Vec<usize>,
}

impl LineTracker {
    fn new(source: &str) -> Self {
        let mut starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                starts.push(i + 1);
            }
        }
        Self { starts }
    }

    fn line_at(&self, offset: usize) -> usize {
        self.starts.partition_point(|&s| s <= offset)
    }
}

/// Tokenize a whole source text. Keywords are matched case-insensitively;
/// `End` merges with the following block word into a single multi-word token,
/// with any run of whitespace (including newlines) between the two words.
pub fn lex(source: &str) -> Result<Vec<Token>, InterpreterError> {
    let raw = raw_lexer()
        .parse(source)
        .into_output()
        .ok_or_else(|| InterpreterError::syntax("Unable to tokenize input", 1))?;

    let tracker = LineTracker::new(source);
    let mut tokens = Vec::with_capacity(raw.len() + 1);
    let mut iter = raw.into_iter().peekable();

    while let Some((tok, span)) = iter.next() {
        let line = tracker.line_at(span.start);
        match tok {
            RawToken::Word(word) => {
                let folded = word.to_ascii_lowercase();
                if folded == "end" {
                    let merged = match iter.peek() {
                        Some((RawToken::Word(next), _)) => {
                            TokenKind::end_block(&next.to_ascii_lowercase())
                                .map(|kind| (kind, next.clone()))
                        }
                        _ => None,
                    };
                    match merged {
                        Some((kind, next_word)) => {
                            iter.next();
                            tokens.push(Token::new(kind, format!("{} {}", word, next_word), line));
                        }
                        None => {
                            return Err(InterpreterError::syntax(
                                "Expected Module, Function, If, While or For after 'End'",
                                line,
                            ));
                        }
                    }
                } else if let Some(kind) = TokenKind::keyword(&folded) {
                    tokens.push(Token::new(kind, word, line));
                } else {
                    tokens.push(Token::new(TokenKind::Identifier, word, line));
                }
            }
            RawToken::Number(text) => tokens.push(Token::new(TokenKind::Number, text, line)),
            RawToken::Str { text, closed } => {
                if !closed {
                    return Err(InterpreterError::syntax("Unterminated string literal", line));
                }
                tokens.push(Token::new(TokenKind::Str, text, line));
            }
            RawToken::Punct(kind) => tokens.push(Token::new(kind, kind.to_string(), line)),
            RawToken::Unknown(c) => {
                return Err(InterpreterError::syntax(
                    format!("Unexpected character '{}'", c),
                    line,
                ));
            }
        }
    }

    tokens.push(Token::new(TokenKind::Eof, "", tracker.line_at(source.len())));
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source)
            .expect("Lexer failed")
            .iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_keywords_case_insensitive() {
        assert_eq!(
            kinds("Module MODULE module"),
            vec![
                TokenKind::Module,
                TokenKind::Module,
                TokenKind::Module,
                TokenKind::Eof
            ]
        );
        assert_eq!(
            kinds("declare DISPLAY Set"),
            vec![
                TokenKind::Declare,
                TokenKind::Display,
                TokenKind::Set,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_multi_word_keywords() {
        assert_eq!(kinds("End Module"), vec![TokenKind::EndModule, TokenKind::Eof]);
        assert_eq!(kinds("end   if"), vec![TokenKind::EndIf, TokenKind::Eof]);
        assert_eq!(kinds("END\nWHILE"), vec![TokenKind::EndWhile, TokenKind::Eof]);
        assert_eq!(kinds("End\t For"), vec![TokenKind::EndFor, TokenKind::Eof]);
        assert_eq!(
            kinds("end function"),
            vec![TokenKind::EndFunction, TokenKind::Eof]
        );
    }

    #[test]
    fn test_multi_word_keyword_keeps_opening_line() {
        let tokens = lex("Display 1\nEnd\nModule").unwrap();
        assert_eq!(tokens[2].kind, TokenKind::EndModule);
        assert_eq!(tokens[2].line, 2);
    }

    #[test]
    fn test_dangling_end_is_an_error() {
        assert!(lex("End 5").is_err());
        assert!(lex("End").is_err());
    }

    #[test]
    fn test_numbers() {
        let tokens = lex("42 3.14 0").unwrap();
        assert_eq!(tokens[0].lexeme, "42");
        assert_eq!(tokens[1].lexeme, "3.14");
        assert_eq!(tokens[2].lexeme, "0");
        assert!(tokens[..3].iter().all(|t| t.kind == TokenKind::Number));
    }

    #[test]
    fn test_strings() {
        let tokens = lex(r#"Display "Hello, World!""#).unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Str);
        assert_eq!(tokens[1].lexeme, "Hello, World!");
    }

    #[test]
    fn test_unterminated_string_reports_opening_line() {
        let err = lex("Display 1\nDisplay \"oops\nDisplay 2").unwrap_err();
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_operators_longest_match() {
        assert_eq!(
            kinds("== != <= >= < > ="),
            vec![
                TokenKind::Equal,
                TokenKind::NotEqual,
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
                TokenKind::Less,
                TokenKind::Greater,
                TokenKind::Assign,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds("Set x = 1 // trailing note\n// full line\nDisplay x"),
            vec![
                TokenKind::Set,
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Number,
                TokenKind::Display,
                TokenKind::Identifier,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_identifier_keeps_original_case() {
        let tokens = lex("Declare Integer totalSum").unwrap();
        assert_eq!(tokens[2].kind, TokenKind::Identifier);
        assert_eq!(tokens[2].lexeme, "totalSum");
    }

    #[test]
    fn test_keyword_prefix_identifiers() {
        // `Modules` is an identifier, not the Module keyword.
        let tokens = lex("Modules formula").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
    }

    #[test]
    fn test_unexpected_character() {
        let err = lex("Set x = 1 ~ 2").unwrap_err();
        assert_eq!(err.line(), Some(1));
        assert!(err.to_string().contains('~'));
    }

    #[test]
    fn test_line_numbers() {
        let tokens = lex("Module main()\n   Display 1\nEnd Module").unwrap();
        let lines: Vec<usize> = tokens.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![1, 1, 1, 1, 2, 2, 3, 3]);
    }

    #[test]
    fn test_mod_and_tap_keywords() {
        assert_eq!(
            kinds("5 Mod 2"),
            vec![
                TokenKind::Number,
                TokenKind::Mod,
                TokenKind::Number,
                TokenKind::Eof
            ]
        );
        assert_eq!(
            kinds("Display Tap"),
            vec![TokenKind::Display, TokenKind::Tap, TokenKind::Eof]
        );
    }
}
