use crate::token::{Arg, Call, SourcePos, Token, TokenKind, MAX_ARGS};

/// SC document reader.
///
/// Produces one token per `next_token` call, advancing a cursor over the
/// input buffer and tracking line/column as a side effect. All emitted
/// slices borrow from the input. Once an `End` or `Error` token has been
/// produced the reader is frozen: every later call returns an equivalent
/// token and the cursor never moves again.
pub struct Reader<'a> {
    source: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    error: Option<&'static str>,
    path: &'a str,
    file_name: &'a str,
}

impl<'a> Reader<'a> {
    /// Create a reader over a whole document. `path` and `file_name` are
    /// only used when building diagnostics, they are never opened or read.
    pub fn new(source: &'a str, path: &'a str, file_name: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
            column: 1,
            error: None,
            path,
            file_name,
        }
    }

    /// Drain a document into a token list, including the terminal
    /// `End`/`Error` token.
    pub fn tokenize(source: &'a str, path: &'a str, file_name: &'a str) -> Vec<Token<'a>> {
        let mut reader = Reader::new(source, path, file_name);
        let mut tokens = Vec::new();
        loop {
            let token = reader.next_token();
            let terminal = matches!(token.kind, TokenKind::End | TokenKind::Error(_));
            tokens.push(token);
            if terminal {
                break;
            }
        }
        tokens
    }

    /// Read the next token from the document.
    pub fn next_token(&mut self) -> Token<'a> {
        let start = self.position();

        if let Some(message) = self.error {
            return self.make(start, TokenKind::Error(message));
        }

        match self.peek() {
            None => self.make(start, TokenKind::End),
            Some(b'\\') => match self.peek_next() {
                None => {
                    self.fail(
                        start,
                        "Backslash unescaped and with no function at the end of file",
                    )
                }
                Some(b'\\') => {
                    let begin = self.pos;
                    self.advance();
                    self.advance();
                    self.make(
                        start,
                        TokenKind::EscapedBackslash(&self.source[begin..self.pos]),
                    )
                }
                Some(_) => match self.read_function() {
                    Ok(call) => self.make(start, TokenKind::Call(call)),
                    Err(message) => self.fail(start, message),
                },
            },
            Some(_) => {
                let begin = self.pos;
                self.consume_until(b'\\');
                self.make(start, TokenKind::Text(&self.source[begin..self.pos]))
            }
        }
    }

    // --- Grammar ---

    /// Read a command call. The cursor sits on the backslash.
    fn read_function(&mut self) -> Result<Call<'a>, &'static str> {
        self.advance(); // the backslash

        let name_begin = self.pos;
        self.consume_while(is_name_char);
        if self.pos == name_begin {
            return Err("Expected function name after backslash");
        }
        let name = &self.source[name_begin..self.pos];

        let mut args = Vec::new();
        if self.peek() == Some(b'(') {
            self.read_argument_list(&mut args)?;
        }

        let mut block = None;
        if self.peek() == Some(b'{') {
            block = Some(self.read_block()?);
        }

        Ok(Call { name, args, block })
    }

    /// Read a parenthesized argument list. A comma after an argument
    /// continues the list; anything else ends it.
    fn read_argument_list(&mut self, args: &mut Vec<Arg<'a>>) -> Result<(), &'static str> {
        self.advance(); // opening paren

        while !self.is_at_end() {
            self.read_argument(args)?;
            if self.peek() == Some(b',') {
                self.advance();
            } else {
                break;
            }
        }

        self.expect(b')', "Parameter list is missing the closing paren")
    }

    /// Read one `key = value` argument. The value is either a quoted string
    /// (raw bytes up to the next quote, no escapes) or a permissive number
    /// (any run of digits, `.`, `-` — honor system on formatting).
    fn read_argument(&mut self, args: &mut Vec<Arg<'a>>) -> Result<(), &'static str> {
        if args.len() >= MAX_ARGS {
            return Err("Function exceeds the max argument count");
        }

        self.consume_whitespace();

        let key_begin = self.pos;
        self.consume_while(is_name_char);
        if self.pos == key_begin {
            return Err("Expected a parameter name");
        }
        let key = &self.source[key_begin..self.pos];

        self.consume_whitespace();
        self.expect(b'=', "Expected = after param name")?;
        self.consume_whitespace();

        let value = match self.peek() {
            None => return Err("Reached EOF without finding parameter value"),
            Some(b'"') => {
                self.advance();
                let begin = self.pos;
                self.consume_until(b'"');
                let end = self.pos;
                self.expect(b'"', "Reached EOF without finding closing quote")?;
                &self.source[begin..end]
            }
            Some(b) if is_number_char(b) => {
                let begin = self.pos;
                self.consume_while(is_number_char);
                &self.source[begin..self.pos]
            }
            Some(_) => return Err("Expected parameter value but found something else"),
        };

        args.push(Arg { key, value });
        self.consume_whitespace();
        Ok(())
    }

    /// Read a brace-delimited block. Braces are depth-counted, so balanced
    /// braces inside the block pass through verbatim. The final unmatched
    /// `}` is consumed but excluded from the returned slice.
    fn read_block(&mut self) -> Result<&'a str, &'static str> {
        self.advance(); // opening brace

        let begin = self.pos;
        let mut level = 1usize;
        while let Some(b) = self.peek() {
            match b {
                b'{' => level += 1,
                b'}' => {
                    level -= 1;
                    if level == 0 {
                        break;
                    }
                }
                _ => {}
            }
            self.advance();
        }

        if level > 0 {
            return Err("Closing brace of block is missing");
        }

        let end = self.pos;
        self.advance(); // the closing brace
        Ok(&self.source[begin..end])
    }

    // --- Token construction ---

    fn make(&self, start: SourcePos, kind: TokenKind<'a>) -> Token<'a> {
        Token {
            kind,
            start,
            end: self.position(),
            path: self.path,
            file_name: self.file_name,
        }
    }

    /// Freeze the reader into its sticky error state and emit the error
    /// token. The end position is wherever the cursor stopped.
    fn fail(&mut self, start: SourcePos, message: &'static str) -> Token<'a> {
        self.error = Some(message);
        self.make(start, TokenKind::Error(message))
    }

    // --- Cursor ---

    fn position(&self) -> SourcePos {
        SourcePos::new(self.line, self.column)
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn peek(&self) -> Option<u8> {
        self.source.as_bytes().get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<u8> {
        self.source.as_bytes().get(self.pos + 1).copied()
    }

    /// Consume one byte, updating the line/column bookkeeping. A newline
    /// bumps the line and resets the column so the next byte lands at
    /// column 1.
    fn advance(&mut self) {
        if let Some(b) = self.peek() {
            if b == b'\n' {
                self.line += 1;
                self.column = 0;
            }
            self.pos += 1;
            self.column += 1;
        }
    }

    fn consume_until(&mut self, target: u8) {
        while let Some(b) = self.peek() {
            if b == target {
                break;
            }
            self.advance();
        }
    }

    fn consume_while(&mut self, pred: impl Fn(u8) -> bool) {
        while let Some(b) = self.peek() {
            if !pred(b) {
                break;
            }
            self.advance();
        }
    }

    fn consume_whitespace(&mut self) {
        self.consume_while(|b| b.is_ascii_whitespace());
    }

    /// Consume the expected byte or fail with the given message.
    fn expect(&mut self, b: u8, err: &'static str) -> Result<(), &'static str> {
        if self.peek() == Some(b) {
            self.advance();
            Ok(())
        } else {
            Err(err)
        }
    }
}

/// Valid characters for command names and argument keys.
fn is_name_char(b: u8) -> bool {
    b == b'_' || b.is_ascii_alphanumeric()
}

/// Characters accepted in a number value. No validation beyond this.
fn is_number_char(b: u8) -> bool {
    b.is_ascii_digit() || b == b'.' || b == b'-'
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Helper: tokenize with dummy file identity and return token kinds.
    fn kinds(source: &str) -> Vec<TokenKind<'_>> {
        Reader::tokenize(source, "test_path", "test_file")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    /// Helper: read the first token only.
    fn first(source: &str) -> Token<'_> {
        Reader::new(source, "test_path", "test_file").next_token()
    }

    /// Helper: the single call token of a one-command document.
    fn call(source: &str) -> Call<'_> {
        match first(source).kind {
            TokenKind::Call(call) => call,
            other => panic!("expected a call token, got {other:?}"),
        }
    }

    /// Helper: the sticky error message of a failing document.
    fn error_of(source: &str) -> &'static str {
        for kind in kinds(source) {
            if let TokenKind::Error(message) = kind {
                return message;
            }
        }
        panic!("expected an error token");
    }

    // =========================================================================
    // Structure: empty input, text runs, escaped backslash
    // =========================================================================

    #[test]
    fn test_empty_source() {
        assert_eq!(kinds(""), vec![TokenKind::End]);
    }

    #[test]
    fn test_plain_text_is_one_token() {
        assert_eq!(
            kinds("Herp derp derp"),
            vec![TokenKind::Text("Herp derp derp"), TokenKind::End]
        );
    }

    #[test]
    fn test_text_runs_up_to_backslash() {
        assert_eq!(
            kinds("abc\\bold{x}"),
            vec![
                TokenKind::Text("abc"),
                TokenKind::Call(Call {
                    name: "bold",
                    args: vec![],
                    block: Some("x"),
                }),
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn test_multiline_text_is_one_token() {
        assert_eq!(
            kinds("line one\nline two\n"),
            vec![TokenKind::Text("line one\nline two\n"), TokenKind::End]
        );
    }

    #[test]
    fn test_escaped_backslash() {
        let kinds = kinds("a\\\\b");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Text("a"),
                TokenKind::EscapedBackslash("\\\\"),
                TokenKind::Text("b"),
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn test_backslash_at_eof_is_error() {
        assert_eq!(
            error_of("herp\\"),
            "Backslash unescaped and with no function at the end of file"
        );
    }

    // =========================================================================
    // Command calls: names
    // =========================================================================

    #[test]
    fn test_bare_call() {
        let call = call("\\paragraph");
        assert_eq!(call.name, "paragraph");
        assert!(call.args.is_empty());
        assert_eq!(call.block, None);
    }

    #[test]
    fn test_name_characters() {
        assert_eq!(call("\\ordered_list").name, "ordered_list");
        assert_eq!(call("\\h1x2").name, "h1x2");
    }

    #[test]
    fn test_name_ends_at_non_name_char() {
        assert_eq!(
            kinds("\\foo bar"),
            vec![
                TokenKind::Call(Call {
                    name: "foo",
                    args: vec![],
                    block: None,
                }),
                TokenKind::Text(" bar"),
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn test_empty_name_is_error() {
        assert_eq!(error_of("\\ bold"), "Expected function name after backslash");
    }

    // =========================================================================
    // Command calls: argument lists
    // =========================================================================

    #[test]
    fn test_string_and_number_arguments() {
        let call = call("\\herp(foo=2, bar=\"qwer\")");
        assert_eq!(
            call.args,
            vec![
                Arg { key: "foo", value: "2" },
                Arg { key: "bar", value: "qwer" },
            ]
        );
    }

    #[test]
    fn test_whitespace_around_arguments() {
        let call = call("\\f(  a  =  \"x\"  ,  b  =  7  )");
        assert_eq!(
            call.args,
            vec![Arg { key: "a", value: "x" }, Arg { key: "b", value: "7" }]
        );
    }

    #[test]
    fn test_string_value_takes_raw_bytes() {
        // No escape processing inside string values
        let call = call("\\f(a=\"he\\llo\")");
        assert_eq!(call.arg("a"), Some("he\\llo"));
    }

    #[test]
    fn test_permissive_number_value() {
        // Honor system: any run of digits, '.' and '-' is accepted
        let call = call("\\f(a=1-2.-3.)");
        assert_eq!(call.arg("a"), Some("1-2.-3."));
    }

    #[test]
    fn test_arg_lookup_by_key() {
        let call = call("\\image(url=\"poop.jpg\", width=640, height=480)");
        assert_eq!(call.arg("url"), Some("poop.jpg"));
        assert_eq!(call.arg("width"), Some("640"));
        assert_eq!(call.arg("missing"), None);
    }

    #[test]
    fn test_empty_argument_list_is_error() {
        // The list grammar demands at least a parameter name after '('
        assert_eq!(error_of("\\f()"), "Expected a parameter name");
    }

    #[test]
    fn test_trailing_comma_is_error() {
        assert_eq!(error_of("\\f(a=1,)"), "Expected a parameter name");
    }

    #[test]
    fn test_missing_equals_is_error() {
        assert_eq!(error_of("\\f(a 1)"), "Expected = after param name");
    }

    #[test]
    fn test_missing_value_at_eof_is_error() {
        assert_eq!(
            error_of("\\f(a="),
            "Reached EOF without finding parameter value"
        );
    }

    #[test]
    fn test_garbled_value_is_error() {
        assert_eq!(
            error_of("\\bold($$$)"),
            "Expected a parameter name"
        );
    }

    #[test]
    fn test_non_value_after_equals_is_error() {
        assert_eq!(
            error_of("\\f(a=$)"),
            "Expected parameter value but found something else"
        );
    }

    #[test]
    fn test_unterminated_string_is_error() {
        assert_eq!(
            error_of("\\f(a=\"oops"),
            "Reached EOF without finding closing quote"
        );
    }

    #[test]
    fn test_missing_closing_paren_is_error() {
        assert_eq!(
            error_of("\\f(a=1 b=2)"),
            "Parameter list is missing the closing paren"
        );
    }

    #[test]
    fn test_argument_cap() {
        let mut source = String::from("\\f(");
        for i in 0..MAX_ARGS {
            if i > 0 {
                source.push_str(", ");
            }
            source.push_str(&format!("k{i}={i}"));
        }
        source.push(')');
        assert_eq!(call(&source).args.len(), MAX_ARGS);

        let mut over = source;
        over.pop();
        over.push_str(", extra=1)");
        assert_eq!(error_of(&over), "Function exceeds the max argument count");
    }

    // =========================================================================
    // Command calls: blocks
    // =========================================================================

    #[test]
    fn test_simple_block() {
        assert_eq!(call("\\bold{scoopidiwoop}").block, Some("scoopidiwoop"));
    }

    #[test]
    fn test_multiline_block() {
        assert_eq!(call("\\derp{qwer \nasdf zxcv}").block, Some("qwer \nasdf zxcv"));
    }

    #[test]
    fn test_block_balances_braces() {
        // Inner balanced braces pass through verbatim; only the outermost
        // pair is stripped
        assert_eq!(call("\\code{if (x) { y(); }}").block, Some("if (x) { y(); }"));
        assert_eq!(call("\\f{{{}}}").block, Some("{{}}"));
    }

    #[test]
    fn test_block_keeps_empty_content() {
        assert_eq!(call("\\f{}").block, Some(""));
    }

    #[test]
    fn test_unterminated_block_is_error() {
        assert_eq!(error_of("\\bold{unterminated"), "Closing brace of block is missing");
        assert_eq!(error_of("\\f{a{b}"), "Closing brace of block is missing");
    }

    #[test]
    fn test_args_and_block_together() {
        let call = call("\\herp(foo=2, bar=\"qwer\"){woop woop}");
        assert_eq!(call.name, "herp");
        assert_eq!(call.args.len(), 2);
        assert_eq!(call.block, Some("woop woop"));
    }

    // =========================================================================
    // Token sequences over whole documents
    // =========================================================================

    #[test]
    fn test_mixed_document_sequence() {
        let source = "Herp derp derp\n\
                      herp derp\\\\ derp\n\
                      \\foo\n\
                      asdf asdf asdf \\qwer asdf\
                      \\herp(foo=2, bar=\"qwer\"){woop woop}\n\
                      \\derp{qwer \nasdf zxcv}\n\
                      \n\
                      \n";
        let names: Vec<_> = kinds(source)
            .into_iter()
            .map(|k| match k {
                TokenKind::Text(_) => "text",
                TokenKind::EscapedBackslash(_) => "backslash",
                TokenKind::Call(_) => "call",
                TokenKind::End => "end",
                TokenKind::Error(_) => "error",
            })
            .collect();
        assert_eq!(
            names,
            vec![
                "text", "backslash", "text", "call", "text", "call", "text", "call", "text",
                "call", "text", "end",
            ]
        );
    }

    // =========================================================================
    // Positions
    // =========================================================================

    #[test]
    fn test_first_token_starts_at_line_one_column_one() {
        let token = first("abc");
        assert_eq!(token.start, SourcePos::new(1, 1));
        assert_eq!(token.end, SourcePos::new(1, 4));
    }

    #[test]
    fn test_newline_resets_column() {
        let token = first("a\nb");
        // 'a' advances to col 2, '\n' lands on (2, 1), 'b' advances to (2, 2)
        assert_eq!(token.end, SourcePos::new(2, 2));
    }

    #[test]
    fn test_call_positions_bracket_full_text() {
        let mut reader = Reader::new("ab\\bold{x} c", "p", "f");
        let text = reader.next_token();
        assert_eq!(text.start, SourcePos::new(1, 1));
        assert_eq!(text.end, SourcePos::new(1, 3));
        let call = reader.next_token();
        assert_eq!(call.start, SourcePos::new(1, 3));
        assert_eq!(call.end, SourcePos::new(1, 11));
    }

    #[test]
    fn test_positions_are_monotonic() {
        let source = "one\ntwo \\bold{three\nfour} five\n\\item six";
        let tokens = Reader::tokenize(source, "p", "f");
        let mut previous = SourcePos::new(1, 1);
        for token in &tokens {
            assert!(token.start <= token.end, "token spans backwards: {token:?}");
            assert!(previous <= token.start, "token out of order: {token:?}");
            assert!(token.start.line >= 1 && token.start.column >= 1);
            previous = token.end;
        }
    }

    #[test]
    fn test_tokens_carry_file_identity() {
        let token = first("x");
        assert_eq!(token.path, "test_path");
        assert_eq!(token.file_name, "test_file");
    }

    // =========================================================================
    // Sticky terminal states
    // =========================================================================

    #[test]
    fn test_end_is_sticky() {
        let mut reader = Reader::new("", "p", "f");
        let first = reader.next_token();
        assert_eq!(first.kind, TokenKind::End);
        for _ in 0..3 {
            let again = reader.next_token();
            assert_eq!(again.kind, TokenKind::End);
            assert_eq!(again.end, first.end);
        }
    }

    #[test]
    fn test_error_is_sticky_and_cursor_freezes() {
        let mut reader = Reader::new("\\f(a=$) trailing text", "p", "f");
        let first = reader.next_token();
        let message = match first.kind {
            TokenKind::Error(message) => message,
            other => panic!("expected error, got {other:?}"),
        };
        for _ in 0..3 {
            let again = reader.next_token();
            assert_eq!(again.kind, TokenKind::Error(message));
            // The cursor never advances past the failure point
            assert_eq!(again.end, first.end);
        }
    }
}
