//! Lexer and Pratt parser for cross-validation expressions.

use rust_decimal::Decimal;
use std::iter::Peekable;
use std::str::{CharIndices, FromStr};

use super::expr::{BinaryOp, ExprError, ExprNode, ExprResult, Function, UnaryOp};

/// Binding power of prefix operators; above every binary operator.
const PREFIX_PRECEDENCE: u8 = 7;

/// Maximum nesting of parentheses, prefix operators and calls.
pub const MAX_NESTING: usize = 64;

/// Maximum height of a parsed tree. Long operator chains grow the tree
/// without nesting, and evaluation recurses once per level.
pub const MAX_HEIGHT: usize = 256;

/// A node with the height of its subtree.
type Parsed = (ExprNode, usize);

fn bounded(height: usize) -> ExprResult<usize> {
    if height > MAX_HEIGHT {
        Err(ExprError::TooDeep(MAX_HEIGHT))
    } else {
        Ok(height)
    }
}

/// Lexical tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Numeric literal.
    Number(Decimal),
    /// `true` / `false`.
    Bool(bool),
    /// Field name or function name.
    Identifier(String),
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `==`, `=`, `===`
    Equal,
    /// `!=`, `!==`, `<>`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `&&`, `and`
    And,
    /// `||`, `or`
    Or,
    /// `!`, `not`
    Not,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `,`
    Comma,
    /// End of input.
    End,
}

impl Token {
    /// Converts the token to a binary operator if possible.
    #[must_use]
    pub fn to_binary_op(&self) -> Option<BinaryOp> {
        match self {
            Self::Plus => Some(BinaryOp::Add),
            Self::Minus => Some(BinaryOp::Sub),
            Self::Star => Some(BinaryOp::Mul),
            Self::Slash => Some(BinaryOp::Div),
            Self::Equal => Some(BinaryOp::Eq),
            Self::NotEqual => Some(BinaryOp::Ne),
            Self::Less => Some(BinaryOp::Lt),
            Self::LessEqual => Some(BinaryOp::Le),
            Self::Greater => Some(BinaryOp::Gt),
            Self::GreaterEqual => Some(BinaryOp::Ge),
            Self::And => Some(BinaryOp::And),
            Self::Or => Some(BinaryOp::Or),
            _ => None,
        }
    }

    /// Converts the token to a prefix operator if possible.
    #[must_use]
    pub fn to_unary_op(&self) -> Option<UnaryOp> {
        match self {
            Self::Minus => Some(UnaryOp::Neg),
            Self::Not => Some(UnaryOp::Not),
            _ => None,
        }
    }
}

/// Splits an expression string into tokens.
pub struct Lexer<'a> {
    input: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer over `input`.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            input: input.char_indices().peekable(),
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.input.peek().map(|&(_, ch)| ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.input.next();
            true
        } else {
            false
        }
    }

    /// Returns the next token, or `Token::End`.
    ///
    /// # Errors
    ///
    /// Returns an error on unknown characters or malformed numbers.
    pub fn next_token(&mut self) -> ExprResult<Token> {
        while self.peek().is_some_and(char::is_whitespace) {
            self.input.next();
        }

        let Some((position, ch)) = self.input.next() else {
            return Ok(Token::End);
        };

        let token = match ch {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            ',' => Token::Comma,
            '=' => {
                // `=`, `==` and `===` all mean equality.
                self.eat('=');
                self.eat('=');
                Token::Equal
            }
            '!' => {
                if self.eat('=') {
                    self.eat('=');
                    Token::NotEqual
                } else {
                    Token::Not
                }
            }
            '<' => {
                if self.eat('=') {
                    Token::LessEqual
                } else if self.eat('>') {
                    Token::NotEqual
                } else {
                    Token::Less
                }
            }
            '>' => {
                if self.eat('=') {
                    Token::GreaterEqual
                } else {
                    Token::Greater
                }
            }
            '&' if self.eat('&') => Token::And,
            '|' if self.eat('|') => Token::Or,
            c if c.is_ascii_digit() || c == '.' => self.read_number(c)?,
            c if c.is_alphabetic() || c == '_' => self.read_identifier(c),
            c => return Err(ExprError::UnexpectedChar { ch: c, position }),
        };
        Ok(token)
    }

    fn read_number(&mut self, first: char) -> ExprResult<Token> {
        let mut text = String::from(first);
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() || ch == '.' {
                text.push(ch);
                self.input.next();
            } else {
                break;
            }
        }
        Decimal::from_str(&text)
            .map(Token::Number)
            .map_err(|_| ExprError::InvalidNumber(text))
    }

    fn read_identifier(&mut self, first: char) -> Token {
        let mut text = String::from(first);
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' || ch == '.' {
                text.push(ch);
                self.input.next();
            } else {
                break;
            }
        }
        match text.to_ascii_lowercase().as_str() {
            "true" => Token::Bool(true),
            "false" => Token::Bool(false),
            "and" => Token::And,
            "or" => Token::Or,
            "not" => Token::Not,
            _ => Token::Identifier(text),
        }
    }
}

/// Pratt parser producing an [`ExprNode`].
///
/// Input nested beyond [`MAX_NESTING`] or producing a tree taller than
/// [`MAX_HEIGHT`] is rejected with [`ExprError::TooDeep`].
pub struct ExprParser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    depth: usize,
}

impl<'a> ExprParser<'a> {
    /// Creates a parser and reads the first token.
    ///
    /// # Errors
    ///
    /// Returns a lexer error if the first token is invalid.
    pub fn new(input: &'a str) -> ExprResult<Self> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            depth: 0,
        })
    }

    fn advance(&mut self) -> ExprResult<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn expect(&mut self, expected: &Token) -> ExprResult<()> {
        if &self.current == expected {
            self.advance()
        } else {
            Err(self.unexpected())
        }
    }

    fn unexpected(&self) -> ExprError {
        match &self.current {
            Token::End => ExprError::UnexpectedEnd,
            other => ExprError::UnexpectedToken(format!("{other:?}")),
        }
    }

    /// Parses a complete expression; trailing tokens are an error.
    ///
    /// # Errors
    ///
    /// Returns a syntax error if the input is not a single expression.
    pub fn parse(mut self) -> ExprResult<ExprNode> {
        let (root, _) = self.parse_expression(0)?;
        if self.current == Token::End {
            Ok(root)
        } else {
            Err(self.unexpected())
        }
    }

    fn parse_expression(&mut self, min_precedence: u8) -> ExprResult<Parsed> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(ExprError::TooDeep(MAX_NESTING));
        }
        let (mut left, mut height) = self.parse_primary()?;

        while let Some(op) = self.current.to_binary_op() {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.advance()?;
            // All binary operators are left-associative.
            let (right, right_height) = self.parse_expression(precedence + 1)?;
            height = bounded(height.max(right_height) + 1)?;
            left = ExprNode::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        self.depth -= 1;
        Ok((left, height))
    }

    fn parse_primary(&mut self) -> ExprResult<Parsed> {
        if let Some(op) = self.current.to_unary_op() {
            self.advance()?;
            let (operand, height) = self.parse_expression(PREFIX_PRECEDENCE)?;
            let node = ExprNode::Unary {
                op,
                operand: Box::new(operand),
            };
            return Ok((node, bounded(height + 1)?));
        }

        match self.current.clone() {
            Token::Number(n) => {
                self.advance()?;
                Ok((ExprNode::Number(n), 1))
            }
            Token::Bool(b) => {
                self.advance()?;
                Ok((ExprNode::Bool(b), 1))
            }
            Token::Identifier(name) => {
                self.advance()?;
                if self.current == Token::LeftParen {
                    let function = Function::from_name(&name)
                        .ok_or_else(|| ExprError::UnknownFunction(name.clone()))?;
                    let (args, height) = self.parse_arguments()?;
                    Ok((ExprNode::Call { function, args }, bounded(height + 1)?))
                } else {
                    Ok((ExprNode::Field(name), 1))
                }
            }
            Token::LeftParen => {
                self.advance()?;
                let inner = self.parse_expression(0)?;
                self.expect(&Token::RightParen)?;
                Ok(inner)
            }
            _ => Err(self.unexpected()),
        }
    }

    /// Returns the arguments and the tallest argument height.
    fn parse_arguments(&mut self) -> ExprResult<(Vec<ExprNode>, usize)> {
        self.expect(&Token::LeftParen)?;
        let mut args = Vec::new();
        let mut height = 0;
        if self.current == Token::RightParen {
            self.advance()?;
            return Ok((args, height));
        }
        loop {
            let (arg, arg_height) = self.parse_expression(0)?;
            args.push(arg);
            height = height.max(arg_height);
            if self.current == Token::Comma {
                self.advance()?;
            } else {
                self.expect(&Token::RightParen)?;
                return Ok((args, height));
            }
        }
    }
}

/// Parses `input` into an expression tree.
///
/// # Errors
///
/// Returns a syntax error if the input is not a valid expression.
pub fn parse(input: &str) -> ExprResult<ExprNode> {
    ExprParser::new(input)?.parse()
}
