use serde::Serialize;

/// The token kinds produced by the scanner. Structural characters carry
/// their literal text; literal kinds carry the (already unescaped) value
/// text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    Identifier,
    Group,
    Int,
    Double,
    Quantity,
    Bool,
    String,
    Path,
    Env,
    LBrack,
    RBrack,
    Equals,
    Ref,
    Dot,
    Colon,
    Include,
    Comment,
    Whitespace,
    Illegal,
    Eof,
}

/// A classified span of source text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>, start: usize, end: usize) -> Token {
        Token {
            kind,
            text: text.into(),
            start,
            end,
        }
    }
}

pub fn is_digit(b: u8) -> bool {
    b.is_ascii_digit()
}

pub fn is_alpha(b: u8) -> bool {
    b.is_ascii_alphabetic()
}

pub fn is_alnum(b: u8) -> bool {
    is_alpha(b) || is_digit(b) || b == b'_'
}

/// Space, tab, or carriage return. Line feeds are structurally
/// significant and never treated as inline whitespace.
pub fn is_inline_ws(b: u8) -> bool {
    b == b' ' || b == b'\t' || b == b'\r'
}

fn is_unit_char(b: u8) -> bool {
    is_alnum(b) || matches!(b, b'%' | b'@' | b'#' | b'/' | b'^' | b'.' | b'-')
}

fn is_path_char(b: u8) -> bool {
    is_alnum(b) || matches!(b, b'/' | b'\\' | b'.' | b'-' | b'_' | b':' | b' ')
}

/// Converts a raw byte buffer into classified tokens.
///
/// The scanner advances monotonically and only ever looks ahead through
/// non-consuming peeks; there is no backtracking. Classification is
/// context-sensitive: an identifier becomes a Group token when a dot or
/// an indented follow-on line announces a sub-block, and the parser can
/// switch to raw line capture via [`scan_unquoted`](Scanner::scan_unquoted)
/// for fields carrying the `unquoted` modifier.
pub struct Scanner<'a> {
    src: &'a [u8],
    pos: usize,
    line: usize,
    col: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a [u8]) -> Scanner<'a> {
        Scanner {
            src,
            pos: 0,
            line: 1,
            col: 0,
        }
    }

    /// Current 1-based line.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Current 0-based column.
    pub fn col(&self) -> usize {
        self.col
    }

    /// Current absolute byte offset.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// The next byte without consuming it, `0` at end of input.
    pub fn peek(&self) -> u8 {
        self.peek_at(0)
    }

    /// The byte `n` positions ahead without consuming, `0` past the end.
    pub fn peek_at(&self, n: usize) -> u8 {
        self.src.get(self.pos + n).copied().unwrap_or(0)
    }

    fn advance(&mut self) -> u8 {
        let b = self.peek();
        if b == 0 {
            return 0;
        }
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.col = 0;
        } else {
            self.col += 1;
        }
        b
    }

    /// Consumes space/tab/CR without crossing a line feed.
    pub fn skip_inline_ws(&mut self) {
        while is_inline_ws(self.peek()) {
            self.advance();
        }
    }

    /// The indent width of the next substantive line, looking ahead
    /// without consuming. Trailing and comment-only lines are looked
    /// through; they never decide anything. Returns `None` when the rest
    /// of the current line holds anything but whitespace or a comment,
    /// at end of input, or when the next line is blank.
    pub fn peek_line_indent(&self) -> Option<usize> {
        let mut i = self.pos;
        while i < self.src.len() && is_inline_ws(self.src[i]) {
            i += 1;
        }
        if self.src.get(i) == Some(&b'#') {
            while i < self.src.len() && self.src[i] != b'\n' {
                i += 1;
            }
        }
        if self.src.get(i) != Some(&b'\n') {
            return None;
        }

        loop {
            i += 1;
            let mut indent = 0;
            while i < self.src.len() && (self.src[i] == b' ' || self.src[i] == b'\t') {
                indent += 1;
                i += 1;
            }
            match self.src.get(i) {
                None | Some(b'\n') | Some(b'\r') => return None,
                Some(b'#') => {
                    while i < self.src.len() && self.src[i] != b'\n' {
                        i += 1;
                    }
                    if i >= self.src.len() {
                        return None;
                    }
                }
                Some(_) => return Some(indent),
            }
        }
    }

    /// Consumes the line break and the following line's indentation, so
    /// the next [`scan`](Scanner::scan) lands on that line's first token.
    pub fn skip_to_next_line(&mut self) {
        self.skip_inline_ws();
        if self.peek() == b'#' {
            while self.peek() != 0 && self.peek() != b'\n' {
                self.advance();
            }
        }
        if self.peek() == b'\n' {
            self.advance();
        }
        while self.peek() == b' ' || self.peek() == b'\t' {
            self.advance();
        }
    }

    /// Scans the next token.
    pub fn scan(&mut self) -> Token {
        let start = self.pos;
        let c = self.peek();

        if c == 0 {
            return Token::new(TokenKind::Eof, "", start, start);
        }
        if c == b'\n' {
            self.advance();
            return Token::new(TokenKind::Whitespace, "\n", start, self.pos);
        }
        if is_inline_ws(c) {
            self.skip_inline_ws();
            let text = String::from_utf8_lossy(&self.src[start..self.pos]).into_owned();
            return Token::new(TokenKind::Whitespace, text, start, self.pos);
        }
        if is_alpha(c) {
            return self.scan_identifier(start);
        }
        if is_digit(c) {
            return self.scan_number(start);
        }

        match c {
            b'"' => self.scan_string(start),
            b'$' => self.scan_env(start),
            b'%' => self.scan_include(start),
            b'#' => self.scan_comment(start),
            b'/' | b'\\' => self.scan_path(start),
            b'.' => {
                if self.peek_at(1) == b'/' {
                    return self.scan_path(start);
                }
                self.advance();
                Token::new(TokenKind::Dot, ".", start, self.pos)
            }
            b'[' => {
                self.advance();
                Token::new(TokenKind::LBrack, "[", start, self.pos)
            }
            b']' => {
                self.advance();
                Token::new(TokenKind::RBrack, "]", start, self.pos)
            }
            b'=' => {
                self.advance();
                if self.peek() == b'>' {
                    self.advance();
                    return Token::new(TokenKind::Ref, "=>", start, self.pos);
                }
                Token::new(TokenKind::Equals, "=", start, self.pos)
            }
            b':' => {
                self.advance();
                Token::new(TokenKind::Colon, ":", start, self.pos)
            }
            _ => {
                self.advance();
                let text = String::from_utf8_lossy(&self.src[start..self.pos]).into_owned();
                Token::new(TokenKind::Illegal, text, start, self.pos)
            }
        }
    }

    fn scan_identifier(&mut self, start: usize) -> Token {
        while is_alnum(self.peek()) {
            self.advance();
        }
        let text = String::from_utf8_lossy(&self.src[start..self.pos]).into_owned();

        if text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("false") {
            return Token::new(TokenKind::Bool, text, start, self.pos);
        }

        // A dotted path or an indented follow-on line announces a group.
        if self.peek() == b'.' {
            return Token::new(TokenKind::Group, text, start, self.pos);
        }
        if matches!(self.peek_line_indent(), Some(indent) if indent > 0) {
            return Token::new(TokenKind::Group, text, start, self.pos);
        }
        Token::new(TokenKind::Identifier, text, start, self.pos)
    }

    fn scan_number(&mut self, start: usize) -> Token {
        let mut kind = TokenKind::Int;
        while is_digit(self.peek()) {
            self.advance();
        }
        if self.peek() == b'.' && is_digit(self.peek_at(1)) {
            kind = TokenKind::Double;
            self.advance();
            while is_digit(self.peek()) {
                self.advance();
            }
        }
        // Letters or unit symbols glued to the digits reclassify the
        // literal as a quantity, e.g. `10GB`, `2.5ms`, `50%`.
        if is_alpha(self.peek()) || (is_unit_char(self.peek()) && !is_digit(self.peek())) {
            kind = TokenKind::Quantity;
            while is_unit_char(self.peek()) {
                self.advance();
            }
        }
        let text = String::from_utf8_lossy(&self.src[start..self.pos]).into_owned();
        Token::new(kind, text, start, self.pos)
    }

    fn scan_string(&mut self, start: usize) -> Token {
        self.advance(); // opening quote
        let mut bytes = Vec::new();

        loop {
            let c = self.advance();
            if c == 0 || c == b'"' {
                break;
            }
            if c == b'\\' {
                // A backslash before a line break continues the string on
                // the next line, swallowing the break and the indentation.
                if self.peek() == b'\n' || self.peek() == b'\r' {
                    while self.peek() == b'\n' || is_inline_ws(self.peek()) {
                        self.advance();
                    }
                    continue;
                }
                let escaped = self.advance();
                if escaped != 0 {
                    bytes.push(escaped);
                }
                continue;
            }
            bytes.push(c);
        }
        let text = String::from_utf8_lossy(&bytes).into_owned();
        Token::new(TokenKind::String, text, start, self.pos)
    }

    /// Captures raw text through the end of the line, used for fields
    /// whose tag carries the `unquoted` modifier. Carriage returns are
    /// stripped; a backslash before the line break continues onto the
    /// next line.
    pub fn scan_unquoted(&mut self) -> Token {
        self.skip_inline_ws();
        let start = self.pos;
        let mut bytes = Vec::new();

        loop {
            let c = self.peek();
            if c == 0 || c == b'\n' {
                break;
            }
            self.advance();
            if c == b'\r' {
                continue;
            }
            if c == b'\\' && (self.peek() == b'\n' || self.peek() == b'\r') {
                while self.peek() == b'\n' || is_inline_ws(self.peek()) {
                    self.advance();
                }
                continue;
            }
            bytes.push(c);
        }
        let text = String::from_utf8_lossy(&bytes).into_owned();
        Token::new(TokenKind::String, text, start, self.pos)
    }

    fn scan_path(&mut self, start: usize) -> Token {
        self.advance();
        while is_path_char(self.peek()) {
            self.advance();
        }
        let raw = String::from_utf8_lossy(&self.src[start..self.pos]).into_owned();
        Token::new(
            TokenKind::Path,
            raw.trim_end_matches(' ').to_owned(),
            start,
            self.pos,
        )
    }

    fn scan_env(&mut self, start: usize) -> Token {
        self.advance(); // consume the '$'
        let braced = self.peek() == b'{';
        if braced {
            self.advance();
        }
        while is_alnum(self.peek()) {
            self.advance();
        }
        if braced && self.peek() == b'}' {
            self.advance();
        }
        let text = String::from_utf8_lossy(&self.src[start..self.pos]).into_owned();
        Token::new(TokenKind::Env, text, start, self.pos)
    }

    fn scan_include(&mut self, start: usize) -> Token {
        self.advance(); // consume the '%'
        self.skip_inline_ws();

        let word_start = self.pos;
        while is_alpha(self.peek()) {
            self.advance();
        }
        let word = &self.src[word_start..self.pos];
        if word != b"include" {
            // Malformed directive; the parser reports it as an include
            // read failure.
            return Token::new(TokenKind::Include, "", start, self.pos);
        }

        self.skip_inline_ws();
        let path_start = self.pos;
        while is_alnum(self.peek())
            || matches!(self.peek(), b'/' | b'\\' | b'.' | b'-' | b':')
        {
            self.advance();
        }
        let path = String::from_utf8_lossy(&self.src[path_start..self.pos]).into_owned();
        Token::new(TokenKind::Include, path, start, self.pos)
    }

    fn scan_comment(&mut self, start: usize) -> Token {
        while self.peek() != 0 && self.peek() != b'\n' {
            self.advance();
        }
        let text = String::from_utf8_lossy(&self.src[start..self.pos]).into_owned();
        Token::new(
            TokenKind::Comment,
            text.trim_end_matches('\r').to_owned(),
            start,
            self.pos,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<(TokenKind, String)> {
        let mut scanner = Scanner::new(src.as_bytes());
        let mut out = Vec::new();
        loop {
            let tok = scanner.scan();
            let done = tok.kind == TokenKind::Eof;
            if tok.kind != TokenKind::Whitespace {
                out.push((tok.kind, tok.text));
            }
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn scan_simple_assignment() {
        assert_eq!(
            kinds("name = \"Ada\""),
            vec![
                (TokenKind::Identifier, "name".to_owned()),
                (TokenKind::Equals, "=".to_owned()),
                (TokenKind::String, "Ada".to_owned()),
                (TokenKind::Eof, "".to_owned()),
            ]
        );
    }

    #[test]
    fn scan_numbers() {
        assert_eq!(
            kinds("a = 10"),
            vec![
                (TokenKind::Identifier, "a".to_owned()),
                (TokenKind::Equals, "=".to_owned()),
                (TokenKind::Int, "10".to_owned()),
                (TokenKind::Eof, "".to_owned()),
            ]
        );
        assert_eq!(kinds("a = 2.5")[2], (TokenKind::Double, "2.5".to_owned()));
        assert_eq!(
            kinds("a = 10GB")[2],
            (TokenKind::Quantity, "10GB".to_owned())
        );
        assert_eq!(
            kinds("a = 2.5ms")[2],
            (TokenKind::Quantity, "2.5ms".to_owned())
        );
        assert_eq!(kinds("a = 50%")[2], (TokenKind::Quantity, "50%".to_owned()));
    }

    #[test]
    fn scan_bools_case_insensitive() {
        assert_eq!(kinds("a = true")[2], (TokenKind::Bool, "true".to_owned()));
        assert_eq!(kinds("a = FALSE")[2], (TokenKind::Bool, "FALSE".to_owned()));
    }

    #[test]
    fn scan_paths_and_env() {
        assert_eq!(
            kinds("p = ./fonts/mono.ttf")[2],
            (TokenKind::Path, "./fonts/mono.ttf".to_owned())
        );
        assert_eq!(kinds("p = /etc/app")[2], (TokenKind::Path, "/etc/app".to_owned()));
        assert_eq!(kinds("e = $HOME")[2], (TokenKind::Env, "$HOME".to_owned()));
        assert_eq!(
            kinds("e = ${APP_ROOT}")[2],
            (TokenKind::Env, "${APP_ROOT}".to_owned())
        );
    }

    #[test]
    fn identifier_before_dot_is_a_group() {
        assert_eq!(
            kinds("server.port = 80")[0],
            (TokenKind::Group, "server".to_owned())
        );
    }

    #[test]
    fn identifier_before_indented_line_is_a_group() {
        let toks = kinds("server\n    port = 80\n");
        assert_eq!(toks[0], (TokenKind::Group, "server".to_owned()));
        assert_eq!(toks[1], (TokenKind::Identifier, "port".to_owned()));
    }

    #[test]
    fn identifier_before_plain_line_stays_identifier() {
        let toks = kinds("mode = fast\nother = 1\n");
        assert_eq!(toks[2], (TokenKind::Identifier, "fast".to_owned()));
        assert_eq!(toks[3], (TokenKind::Identifier, "other".to_owned()));
    }

    #[test]
    fn scan_reference_and_brackets() {
        assert_eq!(
            kinds("scaled => base")[1],
            (TokenKind::Ref, "=>".to_owned())
        );
        let toks = kinds("sizes = [1 2 3]");
        assert_eq!(toks[2], (TokenKind::LBrack, "[".to_owned()));
        assert_eq!(toks[6], (TokenKind::RBrack, "]".to_owned()));
    }

    #[test]
    fn scan_comment_runs_to_end_of_line() {
        let toks = kinds("# a comment\na = 1\n");
        assert_eq!(toks[0], (TokenKind::Comment, "# a comment".to_owned()));
        assert_eq!(toks[1], (TokenKind::Identifier, "a".to_owned()));
    }

    #[test]
    fn scan_include_directive() {
        assert_eq!(
            kinds("%include other.pure")[0],
            (TokenKind::Include, "other.pure".to_owned())
        );
        assert_eq!(
            kinds("%import other.pure")[0],
            (TokenKind::Include, "".to_owned())
        );
    }

    #[test]
    fn string_escapes_and_continuation() {
        assert_eq!(
            kinds(r#"a = "say \"hi\"""#)[2],
            (TokenKind::String, "say \"hi\"".to_owned())
        );
        assert_eq!(
            kinds("a = \"one \\\n    two\"")[2],
            (TokenKind::String, "one two".to_owned())
        );
    }

    #[test]
    fn unquoted_capture() {
        let src = b"motd = Hello, \"world\" & co\n";
        let mut scanner = Scanner::new(src);
        assert_eq!(scanner.scan().kind, TokenKind::Identifier);
        scanner.skip_inline_ws();
        assert_eq!(scanner.scan().kind, TokenKind::Equals);
        let tok = scanner.scan_unquoted();
        assert_eq!(tok.text, "Hello, \"world\" & co");
    }

    #[test]
    fn peek_line_indent() {
        let scanner = Scanner::new(b"  \n    x = 1\n");
        assert_eq!(scanner.peek_line_indent(), Some(4));

        let scanner = Scanner::new(b"\nx = 1\n");
        assert_eq!(scanner.peek_line_indent(), Some(0));

        let scanner = Scanner::new(b"\n\nx = 1\n");
        assert_eq!(scanner.peek_line_indent(), None);

        let scanner = Scanner::new(b"rest of line\n  x = 1\n");
        assert_eq!(scanner.peek_line_indent(), None);

        let scanner = Scanner::new(b" # trailing note\n    x = 1\n");
        assert_eq!(scanner.peek_line_indent(), Some(4));

        let scanner = Scanner::new(b"\n    # note\n    x = 1\n");
        assert_eq!(scanner.peek_line_indent(), Some(4));

        let scanner = Scanner::new(b"\n    # note\n");
        assert_eq!(scanner.peek_line_indent(), None);
    }

    #[test]
    fn indented_comment_line_does_not_make_a_group() {
        let toks = kinds("scaled => base\n    # note\n");
        assert_eq!(toks[0], (TokenKind::Identifier, "scaled".to_owned()));
        assert_eq!(toks[2], (TokenKind::Identifier, "base".to_owned()));
    }
}
