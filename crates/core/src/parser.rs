//! Operation expression grammar and address resolution.
//!
//! ```text
//! expression := [ '/' ] segment ( '/' segment )* [ ':' operation [ '(' [ param ( ',' param )* ] ')' ] ]
//! segment    := type [ '=' name ] | '..' | '.' | '.type'
//! param      := name '=' value
//! value      := "quoted" | integer | float | true | false | undefined
//!             | '{' [ key ( '=' | '=>' ) value ( ',' ... )* ] '}'
//!             | '[' [ value ( ',' value )* ] ']'
//!             | bare-word
//! ```
//!
//! A leading `/` makes the address absolute; otherwise it is resolved against
//! the supplied [`AddressContext`]. The context itself is never touched: the
//! caller decides whether to commit the resolved address.
//!
//! Offsets in [`ParseError`] and [`ParsedOperation::offset`] are byte offsets
//! into the parsed line.

use std::collections::BTreeMap;

use crate::address::{Address, AddressContext, AddressStep};
use crate::error::{ParseError, ParseResult};
use crate::request::Request;
use crate::value::{is_name_delimiter, is_value_delimiter, Value};

/// The operation part of an expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedOperation {
    /// Operation name
    pub name: String,
    /// Parameters by name
    pub parameters: BTreeMap<String, Value>,
    /// Byte offset of the `:` separator in the parsed line
    pub offset: usize,
}

/// Result of parsing one expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedExpression {
    /// The parsed text
    pub line: String,
    /// Resolved absolute address
    pub address: Address,
    /// Operation, when the expression carried one
    pub operation: Option<ParsedOperation>,
}

impl ParsedExpression {
    /// Text of the expression from the operation separator onwards.
    pub fn operation_text(&self) -> Option<&str> {
        self.operation
            .as_ref()
            .and_then(|op| self.line.get(op.offset..))
    }

    /// Turn the expression into an executable request.
    ///
    /// Fails when there is no operation or when any address step lacks a name.
    pub fn into_request(self) -> ParseResult<Request> {
        let operation = match self.operation {
            Some(operation) => operation,
            None => {
                return Err(ParseError::new(
                    self.line.clone(),
                    self.line.len(),
                    "operation name is missing",
                ))
            }
        };
        if let Some(step) = self.address.steps().iter().find(|s| !s.is_named()) {
            return Err(ParseError::new(
                self.line.clone(),
                operation.offset,
                format!("node name not specified for type '{}'", step.node_type),
            ));
        }
        Ok(Request {
            address: self.address,
            operation: operation.name,
            parameters: operation.parameters,
        })
    }
}

/// Parser for operation expressions.
///
/// Stateless; every call resolves against the context it is given.
#[derive(Debug, Clone, Copy, Default)]
pub struct OperationRequestParser;

impl OperationRequestParser {
    /// Parse an expression, resolving relative addresses against `context`.
    pub fn parse(line: &str, context: &AddressContext) -> ParseResult<ParsedExpression> {
        let mut cursor = Cursor::new(line);
        let address = cursor.address(context)?;
        let operation = if cursor.peek() == Some(':') {
            Some(cursor.operation()?)
        } else {
            None
        };
        cursor.skip_whitespace();
        if !cursor.at_end() {
            return Err(cursor.error("unexpected trailing input"));
        }
        Ok(ParsedExpression {
            line: line.to_string(),
            address,
            operation,
        })
    }

    /// Parse an expression that must name an operation and a complete address.
    pub fn parse_request(line: &str, context: &AddressContext) -> ParseResult<Request> {
        Self::parse(line, context)?.into_request()
    }

    /// Resolve a navigation path. Operations are rejected.
    pub fn parse_address(line: &str, context: &AddressContext) -> ParseResult<Address> {
        let parsed = Self::parse(line, context)?;
        match parsed.operation {
            Some(op) => Err(ParseError::new(
                line,
                op.offset,
                "an operation is not allowed in a node path",
            )),
            None => Ok(parsed.address),
        }
    }
}

/// Byte offset of the operation separator: the first `:` outside double quotes.
pub fn find_operation_separator(line: &str) -> Option<usize> {
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ':' if !in_quotes => return Some(i),
            _ => {}
        }
    }
    None
}

/// A word read from the input, remembering whether it was quoted.
struct Word {
    text: String,
    quoted: bool,
}

struct Cursor<'a> {
    line: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(line: &'a str) -> Self {
        Self { line, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.line[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.line.len()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn error(&self, reason: impl Into<String>) -> ParseError {
        ParseError::new(self.line, self.pos, reason)
    }

    fn error_at(&self, offset: usize, reason: impl Into<String>) -> ParseError {
        ParseError::new(self.line, offset, reason)
    }

    fn take_until(&mut self, stop: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if !stop(c)) {
            self.bump();
        }
        &self.line[start..self.pos]
    }

    /// Body of a double-quoted string; the opening quote is at the cursor.
    fn quoted(&mut self) -> ParseResult<String> {
        let start = self.pos;
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error_at(start, "unterminated quoted string")),
                Some('"') => return Ok(out),
                Some('\\') => match self.bump() {
                    Some(c) => out.push(c),
                    None => return Err(self.error_at(start, "unterminated quoted string")),
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn name(&mut self) -> ParseResult<Word> {
        if self.peek() == Some('"') {
            return Ok(Word {
                text: self.quoted()?,
                quoted: true,
            });
        }
        Ok(Word {
            text: self.take_until(is_name_delimiter).to_string(),
            quoted: false,
        })
    }

    fn address(&mut self, context: &AddressContext) -> ParseResult<Address> {
        let mut address = if self.eat('/') {
            Address::root()
        } else {
            context.snapshot()
        };
        // `/` alone, or `/:op`, is the root
        let mut need_segment = !(address.is_empty() && self.pos > 0);
        loop {
            if self.at_end() || self.peek() == Some(':') {
                if need_segment && self.pos > 0 {
                    return Err(self.error("empty address segment"));
                }
                return Ok(address);
            }
            self.segment(&mut address)?;
            match self.peek() {
                Some('/') => {
                    self.bump();
                    need_segment = true;
                }
                None | Some(':') => return Ok(address),
                Some(c) => return Err(self.error(format!("unexpected character '{}'", c))),
            }
        }
    }

    fn segment(&mut self, address: &mut Address) -> ParseResult<()> {
        let start = self.pos;
        let word = self.name()?;
        if !word.quoted {
            match word.text.as_str() {
                "" => return Err(self.error_at(start, "empty address segment")),
                ".." => {
                    if address.pop().is_none() {
                        return Err(self.error_at(start, "cannot navigate above the root"));
                    }
                    return Ok(());
                }
                "." => return Ok(()),
                ".type" => {
                    if !address.strip_last_name() {
                        return Err(self.error_at(start, "the root has no node type"));
                    }
                    return Ok(());
                }
                _ => {}
            }
        } else if word.text.is_empty() {
            return Err(self.error_at(start, "node type not specified"));
        }

        if self.eat('=') {
            let name_start = self.pos;
            let name = self.name()?;
            if name.text.is_empty() {
                return Err(self.error_at(name_start, "node name not specified"));
            }
            address.push(AddressStep::new(word.text, name.text));
        } else if !address.name_last(word.text.clone()) {
            address.push(AddressStep::node_type(word.text));
        }
        Ok(())
    }

    fn operation(&mut self) -> ParseResult<ParsedOperation> {
        let offset = self.pos;
        self.bump();
        let name = self.name()?;
        if name.text.is_empty() {
            return Err(self.error("operation name is missing"));
        }
        self.skip_whitespace();
        let mut parameters = BTreeMap::new();
        if self.eat('(') {
            let open = self.pos - 1;
            self.skip_whitespace();
            if !self.eat(')') {
                loop {
                    self.skip_whitespace();
                    let param_start = self.pos;
                    let param = self.name()?;
                    if param.text.is_empty() {
                        return Err(self.error("parameter name is missing"));
                    }
                    self.skip_whitespace();
                    if !self.eat('=') {
                        return Err(self.error(format!(
                            "expected '=' after parameter '{}'",
                            param.text
                        )));
                    }
                    self.skip_whitespace();
                    let value = self.value()?;
                    if parameters.contains_key(&param.text) {
                        return Err(self.error_at(
                            param_start,
                            format!("duplicate parameter '{}'", param.text),
                        ));
                    }
                    parameters.insert(param.text, value);
                    self.skip_whitespace();
                    match self.bump() {
                        Some(',') => continue,
                        Some(')') => break,
                        None => return Err(self.error_at(open, "unterminated parameter list")),
                        Some(c) => {
                            self.pos -= c.len_utf8();
                            return Err(self.error(format!("unexpected character '{}'", c)));
                        }
                    }
                }
            }
        }
        Ok(ParsedOperation {
            name: name.text,
            parameters,
            offset,
        })
    }

    fn value(&mut self) -> ParseResult<Value> {
        match self.peek() {
            Some('"') => Ok(Value::String(self.quoted()?)),
            Some('{') => self.object(),
            Some('[') => self.list(),
            _ => {
                let start = self.pos;
                let word = self.take_until(is_value_delimiter);
                if word.is_empty() {
                    return Err(self.error_at(start, "unknown value syntax"));
                }
                Ok(Value::from_bare_word(word))
            }
        }
    }

    fn list(&mut self) -> ParseResult<Value> {
        let open = self.pos;
        self.bump();
        let mut items = Vec::new();
        self.skip_whitespace();
        if self.eat(']') {
            return Ok(Value::List(items));
        }
        loop {
            self.skip_whitespace();
            items.push(self.value()?);
            self.skip_whitespace();
            match self.bump() {
                Some(',') => continue,
                Some(']') => return Ok(Value::List(items)),
                None => return Err(self.error_at(open, "unterminated list")),
                Some(c) => {
                    self.pos -= c.len_utf8();
                    return Err(self.error(format!("unexpected character '{}' in list", c)));
                }
            }
        }
    }

    fn object(&mut self) -> ParseResult<Value> {
        let open = self.pos;
        self.bump();
        let mut map = BTreeMap::new();
        self.skip_whitespace();
        if self.eat('}') {
            return Ok(Value::Object(map));
        }
        loop {
            self.skip_whitespace();
            let key_start = self.pos;
            let key = self.name()?;
            if key.text.is_empty() {
                if self.at_end() {
                    return Err(self.error_at(open, "unterminated object"));
                }
                return Err(self.error("object key is missing"));
            }
            self.skip_whitespace();
            if !self.eat('=') {
                return Err(self.error(format!("expected '=' after key '{}'", key.text)));
            }
            self.eat('>');
            self.skip_whitespace();
            let value = self.value()?;
            if map.contains_key(&key.text) {
                return Err(self.error_at(key_start, format!("duplicate key '{}'", key.text)));
            }
            map.insert(key.text, value);
            self.skip_whitespace();
            match self.bump() {
                Some(',') => continue,
                Some('}') => return Ok(Value::Object(map)),
                None => return Err(self.error_at(open, "unterminated object")),
                Some(c) => {
                    self.pos -= c.len_utf8();
                    return Err(self.error(format!("unexpected character '{}' in object", c)));
                }
            }
        }
    }
}
