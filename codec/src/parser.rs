use crate::error::PureError;
use crate::loader::{FileLoader, FsLoader};
use crate::scanner::{Scanner, Token, TokenKind};
use crate::utils::{excerpt, position, quote};
use pure_schema::{EnvRef, Kind, PathValue, Quantity, Schema, Value};

use std::collections::HashMap;

/// What to do when a mapping literal assigns the same key twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateKeys {
    /// The later assignment wins, matching plain property semantics.
    LastWins,
    /// Fail the decode with [`PureError::DuplicateKey`].
    Reject,
}

/// Knobs for one decode call.
#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
    pub duplicate_keys: DuplicateKeys,
    /// Upper bound on `%include` nesting. Self-including documents fail
    /// with [`PureError::IncludeRead`] instead of recursing forever.
    pub max_include_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> DecodeOptions {
        DecodeOptions {
            duplicate_keys: DuplicateKeys::LastWins,
            max_include_depth: 16,
        }
    }
}

/// Decodes a Pure document into `root`, reading includes from the
/// filesystem.
///
/// `root` is caller-owned and must be a [`Value::Group`], typically
/// allocated with [`Schema::default_value`]. Only fields whose tags
/// appear in the source are mutated; unknown source tags are skipped
/// without error.
pub fn decode(src: &[u8], schema: &Schema, root: &mut Value) -> Result<(), PureError> {
    decode_with(src, schema, root, &FsLoader, DecodeOptions::default())
}

/// Like [`decode`], with an explicit include loader and options.
pub fn decode_with(
    src: &[u8],
    schema: &Schema,
    root: &mut Value,
    loader: &dyn FileLoader,
    options: DecodeOptions,
) -> Result<(), PureError> {
    if !matches!(root, Value::Group(_)) {
        return Err(PureError::InvalidRoot);
    }
    let mut decoder = Decoder {
        scanner: Scanner::new(src),
        src,
        schema,
        loader,
        options,
        depth: 0,
    };
    decoder.run(root)
}

/// Schema-directed recursive descent over the token stream. The decoder
/// tracks the current group scope as a path of tags from the root, so a
/// reference can read a snapshot out of the tree while a statement holds
/// the only mutable borrow.
struct Decoder<'a> {
    scanner: Scanner<'a>,
    src: &'a [u8],
    schema: &'a Schema,
    loader: &'a dyn FileLoader,
    options: DecodeOptions,
    depth: usize,
}

impl<'a> Decoder<'a> {
    fn run(&mut self, root: &mut Value) -> Result<(), PureError> {
        let mut path = Vec::new();
        loop {
            let tok = self.scan_significant();
            match tok.kind {
                TokenKind::Eof => return Ok(()),
                TokenKind::Identifier => self.statement(root, &mut path, tok)?,
                TokenKind::Group => self.group_statement(root, &mut path, tok)?,
                TokenKind::Include => self.include(root, &tok)?,
                // Stray structural tokens between statements are skipped,
                // same as unknown tags.
                _ => {}
            }
        }
    }

    /// The next token that isn't whitespace, a comment, or filler.
    fn scan_significant(&mut self) -> Token {
        loop {
            let tok = self.scanner.scan();
            match tok.kind {
                TokenKind::Whitespace
                | TokenKind::Comment
                | TokenKind::Colon
                | TokenKind::Illegal => continue,
                _ => return tok,
            }
        }
    }

    /// The next significant token on the current line. A line feed comes
    /// back as a Whitespace token with text `"\n"` so callers can detect
    /// a statement ending early.
    fn scan_inline(&mut self) -> Token {
        loop {
            let tok = self.scanner.scan();
            match tok.kind {
                TokenKind::Whitespace if tok.text != "\n" => continue,
                TokenKind::Comment => continue,
                _ => return tok,
            }
        }
    }

    fn field_decl(&self, path: &[String], tag: &str) -> Option<(Kind, bool, Option<Kind>)> {
        let field = self.schema.at(path)?.field(tag)?;
        Some((field.kind, field.unquoted, field.elem))
    }

    fn missing_value(&self, tag: &str, at: usize) -> PureError {
        let (line, column) = position(self.src, at);
        PureError::MissingValue {
            tag: quote(tag),
            line,
            column,
        }
    }

    /// One `identifier = value`, `identifier => ref`, or continuation
    /// statement inside the scope named by `path`.
    fn statement(
        &mut self,
        root: &mut Value,
        path: &mut Vec<String>,
        ident: Token,
    ) -> Result<(), PureError> {
        let tag = ident.text.clone();
        let tok = self.scan_inline();
        match tok.kind {
            TokenKind::Equals => self.assignment(root, path, &tag),
            TokenKind::Ref => self.reference(root, path, &tag),
            _ => Err(self.missing_value(&tag, ident.start)),
        }
    }

    /// A Group token: either a dotted path segment (`server.host = …`)
    /// or the header of an indented block.
    fn group_statement(
        &mut self,
        root: &mut Value,
        path: &mut Vec<String>,
        gtok: Token,
    ) -> Result<(), PureError> {
        path.push(gtok.text.clone());
        let result = if self.scanner.peek() == b'.' {
            self.scanner.scan(); // the dot
            self.scanner.skip_inline_ws();
            let tok = self.scanner.scan();
            match tok.kind {
                TokenKind::Identifier => self.statement(root, path, tok),
                // Another dotted segment; resolve one level per recursion.
                TokenKind::Group => self.group_statement(root, path, tok),
                _ => Err(self.missing_value(&gtok.text, tok.start)),
            }
        } else {
            self.block(root, path)
        };
        path.pop();
        result
    }

    /// Member statements of an indented block. The indent width of the
    /// first member line delimits the block: it ends at the first blank
    /// line, any line indented less, or EOF.
    fn block(&mut self, root: &mut Value, path: &mut Vec<String>) -> Result<(), PureError> {
        let indent = match self.scanner.peek_line_indent() {
            Some(indent) if indent > 0 => indent,
            _ => return Ok(()),
        };
        loop {
            match self.scanner.peek_line_indent() {
                Some(next) if next >= indent => {}
                _ => return Ok(()),
            }
            self.scanner.skip_to_next_line();
            let tok = self.scanner.scan();
            match tok.kind {
                TokenKind::Identifier => self.statement(root, path, tok)?,
                TokenKind::Group => self.group_statement(root, path, tok)?,
                TokenKind::Include => self.include(root, &tok)?,
                TokenKind::Eof => return Ok(()),
                _ => {}
            }
        }
    }

    /// Everything after `identifier =`.
    fn assignment(
        &mut self,
        root: &mut Value,
        path: &[String],
        tag: &str,
    ) -> Result<(), PureError> {
        let decl = self.field_decl(path, tag);
        self.scanner.skip_inline_ws();

        if self.scanner.peek() == b'[' {
            let lbrack = self.scanner.scan();
            return self.bracket(root, path, tag, decl, &lbrack);
        }

        // Unknown tags consume the rest of the line and bind nothing, so
        // newer documents keep decoding against older schemas.
        let Some((kind, unquoted, _)) = decl else {
            self.scanner.scan_unquoted();
            return Ok(());
        };

        let tok = match kind {
            // The unquoted modifier and bare string values switch the
            // scanner to raw line capture before the value is scanned.
            Kind::String if unquoted || self.scanner.peek() != b'"' => {
                let tok = self.scanner.scan_unquoted();
                if tok.text.is_empty() {
                    return Err(self.missing_value(tag, tok.start));
                }
                tok
            }
            _ => {
                let tok = self.scanner.scan();
                if tok.kind == TokenKind::Eof || tok.kind == TokenKind::Whitespace {
                    return Err(self.missing_value(tag, tok.start));
                }
                tok
            }
        };

        let value = self.coerce(kind, &tok)?;
        set_in(root, path, tag, value);
        Ok(())
    }

    /// A bracketed literal. The first meaningful content decides the
    /// shape: `identifier =` opens a mapping, anything else an ordered
    /// sequence. Elements coerce to the declared element kind; the first
    /// failure aborts the whole block with nothing bound.
    fn bracket(
        &mut self,
        root: &mut Value,
        path: &[String],
        tag: &str,
        decl: Option<(Kind, bool, Option<Kind>)>,
        open: &Token,
    ) -> Result<(), PureError> {
        let declared = decl.map(|(kind, _, _)| kind);
        let elem = decl.and_then(|(_, _, elem)| elem);

        if let Some(kind) = declared {
            if !matches!(kind, Kind::Sequence | Kind::Mapping) {
                return Err(self.coercion_error("[", kind, open.start));
            }
        }

        let first = self.scan_element(open)?;
        if first.kind == TokenKind::RBrack {
            match declared {
                Some(Kind::Mapping) => set_in(root, path, tag, Value::Mapping(HashMap::new())),
                Some(_) => set_in(root, path, tag, Value::Sequence(Vec::new())),
                None => {}
            }
            return Ok(());
        }

        if first.kind == TokenKind::Identifier && self.peek_equals() {
            return self.mapping(root, path, tag, declared, elem, open, first);
        }
        self.sequence(root, path, tag, declared, elem, open, first)
    }

    fn sequence(
        &mut self,
        root: &mut Value,
        path: &[String],
        tag: &str,
        declared: Option<Kind>,
        elem: Option<Kind>,
        open: &Token,
        first: Token,
    ) -> Result<(), PureError> {
        if declared == Some(Kind::Mapping) {
            return Err(self.coercion_error(&first.text, Kind::Mapping, first.start));
        }

        let mut items = Vec::new();
        let mut tok = first;
        loop {
            if tok.kind == TokenKind::RBrack {
                break;
            }
            if let Some(elem) = elem {
                items.push(self.coerce(elem, &tok)?);
            }
            tok = self.scan_element(open)?;
        }
        if declared.is_some() {
            set_in(root, path, tag, Value::Sequence(items));
        }
        Ok(())
    }

    fn mapping(
        &mut self,
        root: &mut Value,
        path: &[String],
        tag: &str,
        declared: Option<Kind>,
        elem: Option<Kind>,
        open: &Token,
        first: Token,
    ) -> Result<(), PureError> {
        if let Some(kind) = declared {
            if kind != Kind::Mapping {
                return Err(self.coercion_error(&first.text, kind, first.start));
            }
        }

        let mut entries = HashMap::new();
        let mut key = first;
        loop {
            let eq = self.scan_element(open)?;
            if eq.kind != TokenKind::Equals {
                return Err(self.missing_value(&key.text, key.start));
            }
            let val = self.scan_element(open)?;
            if val.kind == TokenKind::RBrack {
                return Err(self.missing_value(&key.text, key.start));
            }
            if let Some(elem) = elem {
                if self.options.duplicate_keys == DuplicateKeys::Reject
                    && entries.contains_key(&key.text)
                {
                    let (line, column) = position(self.src, key.start);
                    return Err(PureError::DuplicateKey {
                        key: quote(&key.text),
                        line,
                        column,
                    });
                }
                let value = self.coerce(elem, &val)?;
                entries.insert(key.text.clone(), value);
            }

            let next = self.scan_element(open)?;
            if next.kind == TokenKind::RBrack {
                break;
            }
            key = next;
        }
        if declared.is_some() {
            set_in(root, path, tag, Value::Mapping(entries));
        }
        Ok(())
    }

    /// The next element token inside a bracketed block, skipping line
    /// breaks. Hitting EOF means the closing `]` is missing.
    fn scan_element(&mut self, open: &Token) -> Result<Token, PureError> {
        loop {
            let tok = self.scanner.scan();
            match tok.kind {
                TokenKind::Whitespace | TokenKind::Comment => continue,
                TokenKind::Eof => {
                    let (line, column) = position(self.src, open.start);
                    return Err(PureError::UnterminatedArray {
                        line,
                        column,
                        excerpt: excerpt(self.src, open.start),
                    });
                }
                _ => return Ok(tok),
            }
        }
    }

    /// True when the next non-blank byte on the line is `=`, which marks
    /// a bracketed block as a mapping.
    fn peek_equals(&self) -> bool {
        let mut n = 0;
        while crate::scanner::is_inline_ws(self.scanner.peek_at(n)) {
            n += 1;
        }
        self.scanner.peek_at(n) == b'='
    }

    /// Everything after `identifier =>`: resolve the source field, take
    /// a snapshot of its current value as canonical text, and bind that
    /// text exactly like a literal assignment.
    fn reference(
        &mut self,
        root: &mut Value,
        path: &[String],
        tag: &str,
    ) -> Result<(), PureError> {
        self.scanner.skip_inline_ws();
        let first = self.scanner.scan();

        let (scopes, source_tag, ref_text) = match first.kind {
            TokenKind::Group => {
                // Dotted source path; the named group resolves as a
                // sibling in the current scope first, then from the root.
                let dot = self.scanner.scan();
                if dot.kind != TokenKind::Dot {
                    return Err(self.unresolved(&first.text, first.start));
                }
                let prop = self.scanner.scan();
                if !matches!(prop.kind, TokenKind::Identifier | TokenKind::Group) {
                    return Err(self.unresolved(&first.text, first.start));
                }
                let text = format!("{}.{}", first.text, prop.text);
                let mut sibling = path.to_vec();
                sibling.push(first.text.clone());
                (vec![sibling, vec![first.text.clone()]], prop.text, text)
            }
            TokenKind::Identifier | TokenKind::Bool => {
                (vec![path.to_vec()], first.text.clone(), first.text.clone())
            }
            _ => return Err(self.unresolved(&first.text, first.start)),
        };

        let Some((kind, _, _)) = self.field_decl(path, tag) else {
            // Unknown destination tag; the reference is consumed and
            // dropped like any other unknown statement.
            return Ok(());
        };

        let snapshot = scopes
            .iter()
            .find_map(|scope| get_in(root, scope).and_then(|group| group.get(&source_tag)))
            .and_then(render_snapshot);
        let Some(text) = snapshot else {
            return Err(self.unresolved(&ref_text, first.start));
        };

        let value = self.coerce_text(kind, &text, first.start)?;
        set_in(root, path, tag, value);
        Ok(())
    }

    fn unresolved(&self, path: &str, at: usize) -> PureError {
        let (line, column) = position(self.src, at);
        PureError::UnresolvedReference {
            path: quote(path),
            line,
            column,
        }
    }

    /// Inlines another document into the same root target. The included
    /// file decodes completely before the includer continues, so later
    /// statements override included values.
    fn include(&mut self, root: &mut Value, tok: &Token) -> Result<(), PureError> {
        if tok.text.is_empty() {
            return Err(PureError::IncludeRead {
                path: String::new(),
                reason: "malformed include directive".to_owned(),
            });
        }
        if self.depth + 1 > self.options.max_include_depth {
            return Err(PureError::IncludeRead {
                path: tok.text.clone(),
                reason: format!(
                    "include depth exceeded ({} levels); circular include?",
                    self.options.max_include_depth
                ),
            });
        }
        let bytes = self
            .loader
            .read(&tok.text)
            .map_err(|err| PureError::IncludeRead {
                path: tok.text.clone(),
                reason: err.to_string(),
            })?;

        let mut sub = Decoder {
            scanner: Scanner::new(&bytes),
            src: &bytes,
            schema: self.schema,
            loader: self.loader,
            options: self.options,
            depth: self.depth + 1,
        };
        sub.run(root)
    }

    fn coerce(&self, kind: Kind, tok: &Token) -> Result<Value, PureError> {
        self.coerce_text(kind, &tok.text, tok.start)
    }

    /// Type-directed literal coercion. The declared kind drives the
    /// conversion; text that can't be read as that kind fails with a
    /// positional TypeCoercion error.
    fn coerce_text(&self, kind: Kind, text: &str, at: usize) -> Result<Value, PureError> {
        match kind {
            Kind::Int => text
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| self.coercion_error(text, kind, at)),
            Kind::Float => text
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| self.coercion_error(text, kind, at)),
            Kind::Bool => {
                if text.eq_ignore_ascii_case("true") {
                    Ok(Value::Bool(true))
                } else if text.eq_ignore_ascii_case("false") {
                    Ok(Value::Bool(false))
                } else {
                    Err(self.coercion_error(text, kind, at))
                }
            }
            Kind::String => Ok(Value::String(text.to_owned())),
            Kind::Quantity => Ok(Value::Quantity(Quantity::new(text))),
            Kind::Path => Ok(Value::Path(PathValue::new(text))),
            Kind::Env => Ok(Value::Env(EnvRef::new(text))),
            Kind::Group | Kind::Sequence | Kind::Mapping => {
                Err(self.coercion_error(text, kind, at))
            }
        }
    }

    fn coercion_error(&self, literal: &str, expected: Kind, at: usize) -> PureError {
        let (line, column) = position(self.src, at);
        PureError::TypeCoercion {
            literal: quote(literal),
            expected: expected.name(),
            line,
            column,
            excerpt: excerpt(self.src, at),
        }
    }
}

/// The source field's current value rendered as canonical text, or
/// `None` for composite values, which references can't copy.
fn render_snapshot(value: &Value) -> Option<String> {
    match value {
        Value::Int(v) => Some(v.to_string()),
        Value::Float(v) => Some(v.to_string()),
        Value::Bool(v) => Some(v.to_string()),
        Value::String(v) => Some(v.clone()),
        Value::Quantity(v) => Some(v.text().to_owned()),
        Value::Path(v) => Some(v.text().to_owned()),
        Value::Env(v) => Some(v.text().to_owned()),
        _ => None,
    }
}

/// Writes `value` under `tag` in the group reached by walking `path`
/// from the root. A path through entries the target doesn't have is a
/// no-op; unknown groups bind nothing.
fn set_in(root: &mut Value, path: &[String], tag: &str, value: Value) {
    let mut cur = root;
    for seg in path {
        match cur.get_mut(seg) {
            Some(next) => cur = next,
            None => return,
        }
    }
    if let Value::Group(_) = cur {
        cur.set(tag, value);
    }
}

fn get_in<'v>(root: &'v Value, path: &[String]) -> Option<&'v Value> {
    let mut cur = root;
    for seg in path {
        cur = cur.get(seg)?;
    }
    Some(cur)
}
