//! Lexical scanner for HCL block structure.
//!
//! This understands just enough HCL to pull `variable` and `output`
//! declarations out of a module: blocks, labels, attributes, quoted
//! strings, heredocs and comments. Attribute values are kept as the raw
//! expression text; nothing is evaluated.

use std::fmt;

/// A body item: either `name = expr` or a labelled block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Item {
    Attribute { name: String, expr: String },
    Block(Block),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Block {
    pub kind: String,
    pub labels: Vec<String>,
    pub body: Vec<Item>,
}

impl Block {
    /// Raw expression text of a top-level attribute in this block.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.body.iter().find_map(|item| match item {
            Item::Attribute { name: n, expr } if n == name => Some(expr.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SyntaxError {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Parse a whole file into its top-level items.
pub(crate) fn parse(src: &str) -> Result<Vec<Item>, SyntaxError> {
    let mut cur = Cursor::new(src);
    cur.body(false)
}

/// Decode a quoted string or heredoc expression into its text.
///
/// Returns `None` for anything that is not a plain literal.
pub(crate) fn string_literal(expr: &str) -> Option<String> {
    let mut cur = Cursor::new(expr);
    let value = match cur.peek() {
        Some('"') => cur.string().ok()?,
        Some('<') if cur.peek2() == Some('<') => cur.heredoc().ok()?,
        _ => return None,
    };
    if cur.rest().trim().is_empty() {
        Some(value)
    } else {
        None
    }
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek2(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError {
            line: self.src[..self.pos].matches('\n').count() + 1,
            message: message.into(),
        }
    }

    fn body(&mut self, nested: bool) -> Result<Vec<Item>, SyntaxError> {
        let mut items = Vec::new();
        loop {
            self.skip_trivia(true)?;
            match self.peek() {
                None if nested => return Err(self.error("unexpected end of file, expected '}'")),
                None => return Ok(items),
                Some('}') if nested => {
                    self.bump();
                    return Ok(items);
                }
                Some('}') => return Err(self.error("unexpected '}'")),
                Some(_) => items.push(self.item()?),
            }
        }
    }

    fn item(&mut self) -> Result<Item, SyntaxError> {
        let name = match self.ident() {
            Some(name) => name.to_string(),
            None => {
                let c = self.peek().unwrap_or_default();
                return Err(self.error(format!("unexpected character '{c}'")));
            }
        };
        self.skip_trivia(false)?;

        if self.peek() == Some('=') {
            self.bump();
            let expr = self.expression()?;
            return Ok(Item::Attribute { name, expr });
        }

        let mut labels = Vec::new();
        loop {
            self.skip_trivia(false)?;
            match self.peek() {
                Some('"') => labels.push(self.string()?),
                Some('{') => {
                    self.bump();
                    let body = self.body(true)?;
                    return Ok(Item::Block(Block {
                        kind: name,
                        labels,
                        body,
                    }));
                }
                Some(c) if is_ident_start(c) => {
                    if let Some(label) = self.ident() {
                        labels.push(label.to_string());
                    }
                }
                _ => return Err(self.error(format!("expected '=' or '{{' after '{name}'"))),
            }
        }
    }

    fn ident(&mut self) -> Option<&'a str> {
        let start = self.pos;
        match self.peek() {
            Some(c) if is_ident_start(c) => {
                self.bump();
            }
            _ => return None,
        }
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                self.bump();
            } else {
                break;
            }
        }
        Some(&self.src[start..self.pos])
    }

    /// Skip whitespace and comments. Without `newlines`, stop at a line end.
    fn skip_trivia(&mut self, newlines: bool) -> Result<(), SyntaxError> {
        while let Some(c) = self.peek() {
            match c {
                '\n' if !newlines => return Ok(()),
                c if c.is_whitespace() => {
                    self.bump();
                }
                '#' if newlines => self.skip_line(),
                '/' if newlines && self.peek2() == Some('/') => self.skip_line(),
                '/' if self.peek2() == Some('*') => self.skip_block_comment()?,
                _ => return Ok(()),
            }
        }
        Ok(())
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), SyntaxError> {
        match self.rest()[2..].find("*/") {
            Some(end) => {
                self.pos += end + 4;
                Ok(())
            }
            None => Err(self.error("unterminated block comment")),
        }
    }

    /// Consume an attribute expression up to the end of its line, or up to
    /// the `}` closing the enclosing body. Comments inside a multi-line
    /// expression are dropped from the returned text.
    fn expression(&mut self) -> Result<String, SyntaxError> {
        self.skip_trivia(false)?;
        let mut raw = String::new();
        let mut start = self.pos;
        let mut end = self.pos;
        let mut depth = 0usize;
        loop {
            match self.peek() {
                None if depth == 0 => break,
                None => return Err(self.error("unexpected end of file in expression")),
                Some('"') => {
                    self.string()?;
                }
                Some('<') if self.peek2() == Some('<') => {
                    self.heredoc()?;
                }
                Some('#') if depth == 0 => break,
                Some('/') if depth == 0 && self.peek2() == Some('/') => break,
                Some('#') => {
                    raw.push_str(self.src[start..self.pos].trim_end_matches([' ', '\t']));
                    self.skip_line();
                    start = self.pos;
                }
                Some('/') if self.peek2() == Some('/') => {
                    raw.push_str(self.src[start..self.pos].trim_end_matches([' ', '\t']));
                    self.skip_line();
                    start = self.pos;
                }
                Some('/') if self.peek2() == Some('*') => {
                    raw.push_str(&self.src[start..self.pos]);
                    self.skip_block_comment()?;
                    start = self.pos;
                    end = self.pos;
                    continue;
                }
                Some('(' | '[' | '{') => {
                    depth += 1;
                    self.bump();
                }
                Some(c @ (')' | ']' | '}')) => {
                    if depth == 0 {
                        if c == '}' {
                            break;
                        }
                        return Err(self.error(format!("unbalanced '{c}'")));
                    }
                    depth -= 1;
                    self.bump();
                }
                Some('\n') if depth == 0 => break,
                Some(_) => {
                    self.bump();
                }
            }
            end = self.pos;
        }

        if start < end {
            raw.push_str(&self.src[start..end]);
        }
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(self.error("missing attribute value"));
        }
        Ok(raw.to_string())
    }

    fn string(&mut self) -> Result<String, SyntaxError> {
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => return Err(self.error("unterminated string")),
                Some('"') => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some(c @ ('"' | '\\')) => out.push(c),
                    Some(c) => {
                        out.push('\\');
                        out.push(c);
                    }
                    None => return Err(self.error("unterminated string")),
                },
                Some(c @ ('$' | '%')) if self.peek() == Some('{') => {
                    out.push(c);
                    self.template(&mut out)?;
                }
                Some(c) => out.push(c),
            }
        }
    }

    /// Copy a `${ ... }` template sequence verbatim. Quoted strings nested
    /// in the sequence are scanned whole so their braces are not counted.
    fn template(&mut self, out: &mut String) -> Result<(), SyntaxError> {
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            if c == '"' {
                let start = self.pos;
                self.string()?;
                out.push_str(&self.src[start..self.pos]);
                continue;
            }
            self.bump();
            out.push(c);
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
        Err(self.error("unterminated template sequence"))
    }

    fn heredoc(&mut self) -> Result<String, SyntaxError> {
        self.pos += 2;
        let indented = if self.peek() == Some('-') {
            self.bump();
            true
        } else {
            false
        };
        let marker = self
            .ident()
            .ok_or_else(|| self.error("expected heredoc marker after '<<'"))?;
        if !self.rest().starts_with('\n') && !self.rest().starts_with("\r\n") {
            return Err(self.error("heredoc marker must end the line"));
        }
        self.skip_line();
        self.bump();

        let mut lines = Vec::new();
        loop {
            if self.peek().is_none() {
                return Err(self.error(format!("unterminated heredoc, expected '{marker}'")));
            }
            let line_end = self.rest().find('\n').unwrap_or(self.rest().len());
            let line = &self.rest()[..line_end];
            if line.trim() == marker {
                self.pos += line_end;
                break;
            }
            lines.push(line.trim_end_matches('\r'));
            self.pos += line_end;
            self.bump();
        }

        if indented {
            let strip = lines
                .iter()
                .filter(|l| !l.trim().is_empty())
                .map(|l| l.len() - l.trim_start().len())
                .min()
                .unwrap_or(0);
            let mut out = String::new();
            for line in lines {
                out.push_str(line.get(strip..).unwrap_or(""));
                out.push('\n');
            }
            Ok(out)
        } else {
            let mut out = lines.join("\n");
            out.push('\n');
            Ok(out)
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks(src: &str) -> Vec<Block> {
        parse(src)
            .expect("parse should succeed")
            .into_iter()
            .filter_map(|item| match item {
                Item::Block(b) => Some(b),
                Item::Attribute { .. } => None,
            })
            .collect()
    }

    #[test]
    fn parses_labelled_blocks_and_attributes() {
        let src = r#"
variable "zone" {
  type        = string
  description = "Zone to deploy into"
  default     = "us-central1-a"
}
"#;
        let parsed = blocks(src);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].kind, "variable");
        assert_eq!(parsed[0].labels, vec!["zone".to_string()]);
        assert_eq!(parsed[0].attribute("type"), Some("string"));
        assert_eq!(parsed[0].attribute("default"), Some("\"us-central1-a\""));
    }

    #[test]
    fn multiline_expressions_stay_whole() {
        let src = r#"
variable "network" {
  type = object({
    name = string
    cidr = list(string)
  })
  default = {
    name = "default" # inline comment
    cidr = ["10.0.0.0/8"]
  }
}
"#;
        let parsed = blocks(src);
        let ty = parsed[0].attribute("type").expect("type attribute");
        assert!(ty.starts_with("object({"));
        assert!(ty.ends_with("})"));
        let default = parsed[0].attribute("default").expect("default attribute");
        assert!(default.contains("10.0.0.0/8"));
    }

    #[test]
    fn single_line_block() {
        let parsed = blocks("output \"id\" { value = module.vm.id }\n");
        assert_eq!(parsed[0].kind, "output");
        assert_eq!(parsed[0].attribute("value"), Some("module.vm.id"));
    }

    #[test]
    fn comments_are_skipped() {
        let src = r#"
# leading comment
// another comment
/* block
   comment { with braces } */
variable "a" {
  # description = "not this"
  description = "this" // trailing
}
"#;
        let parsed = blocks(src);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].attribute("description"), Some("\"this\""));
    }

    #[test]
    fn braces_inside_strings_do_not_nest() {
        let src = "variable \"a\" {\n  default = \"}{\"\n}\n";
        let parsed = blocks(src);
        assert_eq!(parsed[0].attribute("default"), Some("\"}{\""));
    }

    #[test]
    fn template_sequences_with_quotes() {
        let src = "output \"x\" {\n  value = \"${var.a == \"b\" ? 1 : 2}\"\n}\n";
        let parsed = blocks(src);
        assert_eq!(
            parsed[0].attribute("value"),
            Some("\"${var.a == \"b\" ? 1 : 2}\"")
        );
    }

    #[test]
    fn braces_in_strings_nested_in_templates() {
        let src = "output \"x\" {\n  value = \"${replace(var.name, \"}\", \"\")}\"\n}\n";
        let parsed = blocks(src);
        assert_eq!(
            parsed[0].attribute("value"),
            Some("\"${replace(var.name, \"}\", \"\")}\"")
        );
        assert_eq!(
            string_literal("\"${lookup(var.m, \"{\")}-suffix\""),
            Some("${lookup(var.m, \"{\")}-suffix".to_string())
        );
    }

    #[test]
    fn comments_inside_nested_expressions_are_dropped() {
        let src = r#"
variable "labels" {
  default = {
    a = 1 # note
    b = 2 // other
    c = /* inline */ 3
  }
}
"#;
        let parsed = blocks(src);
        assert_eq!(
            parsed[0].attribute("default"),
            Some("{\n    a = 1\n    b = 2\n    c =  3\n  }")
        );
    }

    #[test]
    fn heredoc_values() {
        let src = "variable \"a\" {\n  description = <<-EOT\n    First line\n      indented\n  EOT\n  type = string\n}\n";
        let parsed = blocks(src);
        let raw = parsed[0].attribute("description").expect("description");
        assert_eq!(
            string_literal(raw).as_deref(),
            Some("First line\n  indented\n")
        );
        assert_eq!(parsed[0].attribute("type"), Some("string"));
    }

    #[test]
    fn string_literal_unescapes() {
        assert_eq!(
            string_literal(r#""say \"hi\"\n""#).as_deref(),
            Some("say \"hi\"\n")
        );
        assert_eq!(string_literal("var.other"), None);
        assert_eq!(string_literal("\"a\" + \"b\""), None);
    }

    #[test]
    fn nested_blocks_are_kept_separately() {
        let src = r#"
variable "size" {
  type = number
  validation {
    condition     = var.size > 0
    error_message = "Must be positive."
  }
}
"#;
        let parsed = blocks(src);
        assert_eq!(parsed[0].attribute("condition"), None);
        assert!(matches!(
            parsed[0].body.last(),
            Some(Item::Block(b)) if b.kind == "validation"
        ));
    }

    #[test]
    fn unbalanced_braces_report_line() {
        let err = parse("variable \"a\" {\n  type = string\n").unwrap_err();
        assert!(err.message.contains("expected '}'"));
        assert_eq!(err.line, 3);
    }

    #[test]
    fn unterminated_string_is_error() {
        let err = parse("variable \"a\" {\n  default = \"oops\n}\n").unwrap_err();
        assert_eq!(err.message, "unterminated string");
    }

    #[test]
    fn stray_closing_brace_is_error() {
        assert!(parse("}\n").is_err());
    }
}
