use std::rc::Rc;

use super::error::InterpreterError;
use crate::ast::{
    BinaryOp, DataType, Declarator, DisplayItem, Expr, ExprKind, Param, Stmt, StmtKind, UnaryOp,
};
use crate::token::{Token, TokenKind};
use crate::value::Value;

pub struct TokenParser {
    tokens: Vec<Token>,
    current: usize,
}

fn data_type_for(kind: TokenKind) -> Option<DataType> {
    match kind {
        TokenKind::IntegerType => Some(DataType::Integer),
        TokenKind::RealType => Some(DataType::Real),
        TokenKind::StringType => Some(DataType::String),
        _ => None,
    }
}

impl TokenParser {
    /// Takes the lexer's output; the token vector always ends with EOF.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    fn kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn line(&self) -> usize {
        self.peek().line
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.current += 1;
        }
        token
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, InterpreterError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let found = self.peek();
            let found_text = if found.kind == TokenKind::Eof {
                "end of input".to_string()
            } else {
                format!("'{}'", found.lexeme)
            };
            Err(InterpreterError::syntax(
                format!("Expected {}, found {}", kind, found_text),
                found.line,
            ))
        }
    }

    fn expect_identifier(&mut self) -> Result<Rc<str>, InterpreterError> {
        let token = self.expect(TokenKind::Identifier)?;
        Ok(Rc::from(token.lexeme.as_str()))
    }

    fn unexpected(&self) -> InterpreterError {
        let token = self.peek();
        match token.kind {
            TokenKind::Eof => InterpreterError::syntax("Unexpected end of input", token.line),
            TokenKind::Power => InterpreterError::syntax(
                "The '^' operator is not supported; use power(base, exponent)",
                token.line,
            ),
            _ => InterpreterError::syntax(
                format!("Unexpected token '{}'", token.lexeme),
                token.line,
            ),
        }
    }

    /// Parse a whole program: module and function declarations plus loose
    /// statements, until EOF.
    pub fn parse(&mut self) -> Result<Vec<Stmt>, InterpreterError> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::Eof) {
            let stmt = match self.kind() {
                TokenKind::Module => self.parse_module()?,
                TokenKind::Function => self.parse_function()?,
                _ => self.parse_statement()?,
            };
            statements.push(stmt);
        }
        Ok(statements)
    }

    fn parse_statement(&mut self) -> Result<Stmt, InterpreterError> {
        match self.kind() {
            TokenKind::Declare => self.parse_declaration(false),
            TokenKind::Constant => self.parse_declaration(true),
            TokenKind::Set => self.parse_assignment(),
            TokenKind::Display => self.parse_display(),
            TokenKind::Input => self.parse_input(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Do => self.parse_do(),
            TokenKind::For => self.parse_for(),
            TokenKind::Call => self.parse_call(),
            TokenKind::Return => self.parse_return(),
            _ => Err(self.unexpected()),
        }
    }

    /// Statements until one of `terminators`; the terminator itself is left
    /// for the caller.
    fn parse_block(&mut self, terminators: &[TokenKind]) -> Result<Vec<Stmt>, InterpreterError> {
        let mut body = Vec::new();
        while !terminators.contains(&self.kind()) {
            if self.check(TokenKind::Eof) {
                let expected: Vec<String> =
                    terminators.iter().map(|t| t.to_string()).collect();
                return Err(InterpreterError::syntax(
                    format!("Expected {} before end of input", expected.join(" or ")),
                    self.line(),
                ));
            }
            body.push(self.parse_statement()?);
        }
        Ok(body)
    }

    fn parse_module(&mut self) -> Result<Stmt, InterpreterError> {
        let keyword = self.advance();
        let name = self.expect_identifier()?;
        let params = self.parse_params()?;
        let body = self.parse_block(&[TokenKind::EndModule])?;
        self.expect(TokenKind::EndModule)?;
        Ok(Stmt {
            kind: StmtKind::Module { name, params, body },
            line: keyword.line,
        })
    }

    fn parse_function(&mut self) -> Result<Stmt, InterpreterError> {
        let keyword = self.advance();
        let return_type = match data_type_for(self.kind()) {
            Some(data_type) => {
                self.advance();
                data_type
            }
            None => {
                return Err(InterpreterError::syntax(
                    "Expected a return type after 'Function'",
                    self.line(),
                ));
            }
        };
        let name = self.expect_identifier()?;
        let params = self.parse_params()?;
        let body = self.parse_block(&[TokenKind::EndFunction])?;
        self.expect(TokenKind::EndFunction)?;
        Ok(Stmt {
            kind: StmtKind::Function {
                name,
                return_type,
                params,
                body,
            },
            line: keyword.line,
        })
    }

    fn parse_params(&mut self) -> Result<Vec<Param>, InterpreterError> {
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                params.push(self.parse_param()?);
                if !self.matches(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(params)
    }

    /// `Ref` may come before or after the type keyword; a missing type means
    /// the parameter adopts its argument's type at call time.
    fn parse_param(&mut self) -> Result<Param, InterpreterError> {
        let mut is_reference = false;
        let mut data_type = DataType::Auto;
        loop {
            if self.check(TokenKind::Ref) {
                self.advance();
                is_reference = true;
            } else if let Some(parsed) = data_type_for(self.kind()) {
                self.advance();
                data_type = parsed;
            } else {
                break;
            }
        }
        let name = self.expect_identifier()?;
        let mut is_array = false;
        if self.matches(TokenKind::LBracket) {
            self.expect(TokenKind::RBracket)?;
            is_array = true;
        }
        Ok(Param {
            name,
            data_type,
            is_reference,
            is_array,
        })
    }

    fn parse_declaration(&mut self, is_constant: bool) -> Result<Stmt, InterpreterError> {
        let keyword = self.advance();
        let data_type = match data_type_for(self.kind()) {
            Some(data_type) => {
                self.advance();
                data_type
            }
            None => {
                return Err(InterpreterError::syntax(
                    format!("Expected a type after '{}'", keyword.lexeme),
                    self.line(),
                ));
            }
        };

        let mut declarators = Vec::new();
        loop {
            let name_token = self.expect(TokenKind::Identifier)?;
            let name: Rc<str> = Rc::from(name_token.lexeme.as_str());

            let mut size = None;
            if self.matches(TokenKind::LBracket) {
                size = Some(self.parse_expression()?);
                self.expect(TokenKind::RBracket)?;
            }

            if self.matches(TokenKind::Assign) {
                if size.is_some() {
                    // The whole comma-separated list after `=` belongs to the
                    // array, so an initialized array closes its declaration.
                    let mut elements = vec![self.parse_expression()?];
                    while self.matches(TokenKind::Comma) {
                        elements.push(self.parse_expression()?);
                    }
                    let init_line = elements[0].line;
                    declarators.push(Declarator {
                        name,
                        size,
                        initializer: Some(Expr {
                            kind: ExprKind::ArrayLiteral(elements),
                            line: init_line,
                        }),
                    });
                    break;
                }
                let initializer = Some(self.parse_expression()?);
                declarators.push(Declarator {
                    name,
                    size,
                    initializer,
                });
            } else if is_constant {
                return Err(InterpreterError::syntax(
                    format!("Constant '{}' must have an initializer", name),
                    name_token.line,
                ));
            } else {
                declarators.push(Declarator {
                    name,
                    size,
                    initializer: None,
                });
            }

            if !self.matches(TokenKind::Comma) {
                break;
            }
        }

        Ok(Stmt {
            kind: StmtKind::Declaration {
                data_type,
                is_constant,
                declarators,
            },
            line: keyword.line,
        })
    }

    fn parse_assignment(&mut self) -> Result<Stmt, InterpreterError> {
        let keyword = self.advance();
        let target = self.parse_postfix()?;
        if !matches!(
            target.kind,
            ExprKind::Identifier(_) | ExprKind::ArrayAccess { .. }
        ) {
            return Err(InterpreterError::syntax(
                "Set requires a variable or array element on the left of '='",
                target.line,
            ));
        }
        self.expect(TokenKind::Assign)?;
        let value = self.parse_expression()?;
        Ok(Stmt {
            kind: StmtKind::Assignment { target, value },
            line: keyword.line,
        })
    }

    fn parse_display(&mut self) -> Result<Stmt, InterpreterError> {
        let keyword = self.advance();
        if self.check(TokenKind::Tap) {
            return Err(InterpreterError::syntax(
                "Display cannot begin with Tap",
                self.line(),
            ));
        }
        let mut items = Vec::new();
        loop {
            if self.check(TokenKind::Tap) {
                self.advance();
                items.push(DisplayItem::Tap);
            } else {
                items.push(DisplayItem::Expr(self.parse_expression()?));
            }
            if !self.matches(TokenKind::Comma) {
                break;
            }
        }
        Ok(Stmt {
            kind: StmtKind::Display { items },
            line: keyword.line,
        })
    }

    fn parse_input(&mut self) -> Result<Stmt, InterpreterError> {
        let keyword = self.advance();
        let name = self.expect_identifier()?;
        Ok(Stmt {
            kind: StmtKind::Input { name },
            line: keyword.line,
        })
    }

    fn parse_if(&mut self) -> Result<Stmt, InterpreterError> {
        let keyword = self.advance();
        let condition = self.parse_expression()?;
        self.expect(TokenKind::Then)?;
        let then_branch = self.parse_block(&[TokenKind::Else, TokenKind::EndIf])?;

        let else_branch = if self.matches(TokenKind::Else) {
            if self.check(TokenKind::If) {
                // `Else If` chains share the outermost End If; the innermost
                // recursion consumes it.
                Some(vec![self.parse_if()?])
            } else {
                let body = self.parse_block(&[TokenKind::EndIf])?;
                self.expect(TokenKind::EndIf)?;
                Some(body)
            }
        } else {
            self.expect(TokenKind::EndIf)?;
            None
        };

        Ok(Stmt {
            kind: StmtKind::If {
                condition,
                then_branch,
                else_branch,
            },
            line: keyword.line,
        })
    }

    fn parse_while(&mut self) -> Result<Stmt, InterpreterError> {
        let keyword = self.advance();
        let condition = self.parse_expression()?;
        let body = self.parse_block(&[TokenKind::EndWhile])?;
        self.expect(TokenKind::EndWhile)?;
        Ok(Stmt {
            kind: StmtKind::While { condition, body },
            line: keyword.line,
        })
    }

    fn parse_do(&mut self) -> Result<Stmt, InterpreterError> {
        let keyword = self.advance();
        let body = self.parse_block(&[TokenKind::While, TokenKind::Until])?;
        let kind = if self.matches(TokenKind::While) {
            StmtKind::DoWhile {
                body,
                condition: self.parse_expression()?,
            }
        } else {
            self.expect(TokenKind::Until)?;
            StmtKind::DoUntil {
                body,
                condition: self.parse_expression()?,
            }
        };
        Ok(Stmt {
            kind,
            line: keyword.line,
        })
    }

    fn parse_for(&mut self) -> Result<Stmt, InterpreterError> {
        let keyword = self.advance();
        let counter = self.expect_identifier()?;
        self.expect(TokenKind::Assign)?;
        let start = self.parse_expression()?;
        self.expect(TokenKind::To)?;
        let end = self.parse_expression()?;
        let body = self.parse_block(&[TokenKind::EndFor])?;
        self.expect(TokenKind::EndFor)?;
        Ok(Stmt {
            kind: StmtKind::For {
                counter,
                start,
                end,
                body,
            },
            line: keyword.line,
        })
    }

    fn parse_call(&mut self) -> Result<Stmt, InterpreterError> {
        let keyword = self.advance();
        let name = self.expect_identifier()?;
        let mut args = Vec::new();
        if self.matches(TokenKind::LParen) {
            if !self.check(TokenKind::RParen) {
                loop {
                    args.push(self.parse_expression()?);
                    if !self.matches(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::RParen)?;
        }
        Ok(Stmt {
            kind: StmtKind::Call { name, args },
            line: keyword.line,
        })
    }

    fn parse_return(&mut self) -> Result<Stmt, InterpreterError> {
        let keyword = self.advance();
        let value = self.parse_expression()?;
        Ok(Stmt {
            kind: StmtKind::Return(value),
            line: keyword.line,
        })
    }

    // Expressions, lowest precedence first.

    pub fn parse_expression(&mut self) -> Result<Expr, InterpreterError> {
        self.parse_or()
    }

    fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
        let line = left.line;
        Expr {
            kind: ExprKind::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
            line,
        }
    }

    fn parse_or(&mut self) -> Result<Expr, InterpreterError> {
        let mut left = self.parse_and()?;
        while self.matches(TokenKind::Or) {
            let right = self.parse_and()?;
            left = Self::binary(left, BinaryOp::Or, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, InterpreterError> {
        let mut left = self.parse_equality()?;
        while self.matches(TokenKind::And) {
            let right = self.parse_equality()?;
            left = Self::binary(left, BinaryOp::And, right);
        }
        Ok(left)
    }

    /// `=` inside an expression is equality; only the `=` directly after a
    /// `Set` lvalue (or in declarators and For headers) binds as assignment.
    fn parse_equality(&mut self) -> Result<Expr, InterpreterError> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.kind() {
                TokenKind::Equal | TokenKind::Assign => BinaryOp::Eq,
                TokenKind::NotEqual => BinaryOp::NotEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            left = Self::binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, InterpreterError> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.kind() {
                TokenKind::Less => BinaryOp::Less,
                TokenKind::LessEqual => BinaryOp::LessEq,
                TokenKind::Greater => BinaryOp::Greater,
                TokenKind::GreaterEqual => BinaryOp::GreaterEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = Self::binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, InterpreterError> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_factor()?;
            left = Self::binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<Expr, InterpreterError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent | TokenKind::Mod => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Self::binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, InterpreterError> {
        let op = match self.kind() {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Not => Some(UnaryOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            let token = self.advance();
            let right = self.parse_unary()?;
            return Ok(Expr {
                kind: ExprKind::Unary {
                    op,
                    right: Box::new(right),
                },
                line: token.line,
            });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, InterpreterError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.matches(TokenKind::LParen) {
                let callee = match &expr.kind {
                    ExprKind::Identifier(name) => Rc::clone(name),
                    _ => {
                        return Err(InterpreterError::syntax(
                            "Only named functions can be called",
                            expr.line,
                        ));
                    }
                };
                let mut args = Vec::new();
                if !self.check(TokenKind::RParen) {
                    loop {
                        args.push(self.parse_expression()?);
                        if !self.matches(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RParen)?;
                expr = Expr {
                    line: expr.line,
                    kind: ExprKind::Call { callee, args },
                };
            } else if self.matches(TokenKind::LBracket) {
                let index = self.parse_expression()?;
                self.expect(TokenKind::RBracket)?;
                let line = expr.line;
                expr = Expr {
                    kind: ExprKind::ArrayAccess {
                        array: Box::new(expr),
                        index: Box::new(index),
                    },
                    line,
                };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, InterpreterError> {
        match self.kind() {
            TokenKind::Number => {
                let token = self.advance();
                let value = token.lexeme.parse::<f64>().map_err(|_| {
                    InterpreterError::syntax(
                        format!("Invalid number '{}'", token.lexeme),
                        token.line,
                    )
                })?;
                let literal = if token.lexeme.contains('.') {
                    Value::real(value)
                } else {
                    Value::integer(value)
                };
                Ok(Expr {
                    kind: ExprKind::Literal(literal),
                    line: token.line,
                })
            }
            TokenKind::Str => {
                let token = self.advance();
                Ok(Expr {
                    kind: ExprKind::Literal(Value::string(&token.lexeme)),
                    line: token.line,
                })
            }
            TokenKind::Identifier => {
                let token = self.advance();
                Ok(Expr {
                    kind: ExprKind::Identifier(Rc::from(token.lexeme.as_str())),
                    line: token.line,
                })
            }
            TokenKind::LParen => {
                let token = self.advance();
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                Ok(Expr {
                    kind: ExprKind::Grouping(Box::new(inner)),
                    line: token.line,
                })
            }
            _ => Err(self.unexpected()),
        }
    }
}
