// ABOUTME: The calculate capability, a local recursive-descent arithmetic evaluator with bounded nesting.
// ABOUTME: Supports + - * / % ^, parentheses, unary minus, common functions, and the constants pi and e.

use async_trait::async_trait;
use serde_json::{Value, json};
use switchboard_core::{Capability, CapabilityError};
use thiserror::Error;

/// Deepest nesting of parentheses, function calls, unary signs and powers accepted.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("expression nests deeper than {0} levels")]
    TooDeep(usize),

    #[error("{0}")]
    Invalid(String),
}

fn invalid(message: impl Into<String>) -> EvalError {
    EvalError::Invalid(message.into())
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Op(char),
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let number = text
                    .parse::<f64>()
                    .map_err(|_| invalid(format!("invalid number '{}'", text)))?;
                tokens.push(Token::Number(number));
            }
            c if c.is_ascii_alphabetic() => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_alphanumeric() {
                    i += 1;
                }
                tokens.push(Token::Ident(
                    chars[start..i].iter().collect::<String>().to_lowercase(),
                ));
            }
            '+' | '-' | '*' | '/' | '%' | '^' => {
                tokens.push(Token::Op(c));
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            other => return Err(invalid(format!("unexpected character '{}'", other))),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat_op(&mut self, ops: &[char]) -> Option<char> {
        match self.peek() {
            Some(Token::Op(op)) if ops.contains(op) => {
                let op = *op;
                self.pos += 1;
                Some(op)
            }
            _ => None,
        }
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<f64, EvalError> {
        let mut value = self.term()?;
        while let Some(op) = self.eat_op(&['+', '-']) {
            let rhs = self.term()?;
            value = if op == '+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    // term := unary (('*' | '/' | '%') unary)*
    fn term(&mut self) -> Result<f64, EvalError> {
        let mut value = self.unary()?;
        while let Some(op) = self.eat_op(&['*', '/', '%']) {
            let rhs = self.unary()?;
            value = match op {
                '*' => value * rhs,
                '/' => value / rhs,
                _ => value % rhs,
            };
        }
        Ok(value)
    }

    // unary := ('-' | '+') unary | power
    // Every recursive cycle of the grammar passes through here, so the depth
    // counted here bounds the whole call stack.
    fn unary(&mut self) -> Result<f64, EvalError> {
        if self.depth >= MAX_DEPTH {
            return Err(EvalError::TooDeep(MAX_DEPTH));
        }
        self.depth += 1;
        let value = match self.eat_op(&['-', '+']) {
            Some('-') => self.unary().map(|v| -v),
            Some(_) => self.unary(),
            None => self.power(),
        };
        self.depth -= 1;
        value
    }

    // power := primary ('^' unary)?, right associative
    fn power(&mut self) -> Result<f64, EvalError> {
        let base = self.primary()?;
        if self.eat_op(&['^']).is_some() {
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<f64, EvalError> {
        match self.next() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::LParen) => {
                let value = self.expr()?;
                self.expect_rparen()?;
                Ok(value)
            }
            Some(Token::Ident(name)) => match name.as_str() {
                "pi" => Ok(std::f64::consts::PI),
                "e" => Ok(std::f64::consts::E),
                _ => {
                    if self.next() != Some(Token::LParen) {
                        return Err(invalid(format!("unknown identifier '{}'", name)));
                    }
                    let arg = self.expr()?;
                    self.expect_rparen()?;
                    apply(&name, arg)
                }
            },
            Some(token) => Err(invalid(format!("unexpected token {:?}", token))),
            None => Err(invalid("unexpected end of expression")),
        }
    }

    fn expect_rparen(&mut self) -> Result<(), EvalError> {
        match self.next() {
            Some(Token::RParen) => Ok(()),
            _ => Err(invalid("missing closing parenthesis")),
        }
    }
}

fn apply(function: &str, arg: f64) -> Result<f64, EvalError> {
    let value = match function {
        "sqrt" => arg.sqrt(),
        "abs" => arg.abs(),
        "ln" => arg.ln(),
        "log" => arg.log10(),
        "sin" => arg.sin(),
        "cos" => arg.cos(),
        "tan" => arg.tan(),
        other => return Err(invalid(format!("unknown function '{}'", other))),
    };
    Ok(value)
}

/// Evaluate an arithmetic expression. Non-finite results are errors.
pub fn evaluate(expression: &str) -> Result<f64, EvalError> {
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(invalid("empty expression"));
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if let Some(token) = parser.peek() {
        return Err(invalid(format!("unexpected trailing token {:?}", token)));
    }
    if !value.is_finite() {
        return Err(invalid(format!("result is not a finite number ({})", value)));
    }
    Ok(value)
}

#[derive(Debug, Clone, Default)]
pub struct CalculateCapability;

impl CalculateCapability {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Capability for CalculateCapability {
    fn name(&self) -> &str {
        "calculate"
    }

    fn description(&self) -> &str {
        "Evaluate an arithmetic expression exactly, e.g. '3^3 + sqrt(16)'"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "Arithmetic expression using + - * / % ^, parentheses, sqrt, abs, ln, log, sin, cos, tan, pi and e"
                }
            },
            "required": ["expression"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value, CapabilityError> {
        let expression = args
            .get("expression")
            .and_then(|v| v.as_str())
            .ok_or_else(|| CapabilityError::InvalidArguments("missing 'expression'".to_string()))?;

        let result = evaluate(expression).map_err(|e| match &e {
            EvalError::TooDeep(_) => CapabilityError::InvalidArguments(e.to_string()),
            EvalError::Invalid(message) => CapabilityError::Failed(message.clone()),
        })?;
        tracing::debug!(expression, result, "calculated");

        Ok(json!({
            "expression": expression,
            "result": result
        }))
    }
}
