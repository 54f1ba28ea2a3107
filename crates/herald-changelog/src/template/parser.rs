//! Template syntax tree and recursive-descent parser

/// A value transformation applied with `|`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modifier {
    /// Strip everything before the first digit (`v1.2.3` -> `1.2.3`)
    NoPrefix,
    Upper,
    Lower,
    /// Unrecognized name, passed through at render time
    Unknown(String),
}

impl Modifier {
    fn from_name(name: &str) -> Self {
        match name {
            "noprefix" | "no-prefix" => Self::NoPrefix,
            "upper" => Self::Upper,
            "lower" => Self::Lower,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// A context lookup with its modifier chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarRef {
    pub key: String,
    pub modifiers: Vec<Modifier>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Literal(String),
    Var(VarRef),
    /// A `{...}` group, rendered all-or-nothing
    Block(Vec<Node>),
    /// `<NL>` inside a block
    Newline,
}

const NEWLINE_TOKEN: &str = "<NL>";

/// Parse template source into top-level nodes.
///
/// Never fails: brace groups that do not parse are kept as literal text.
pub fn parse(source: &str) -> Vec<Node> {
    let mut parser = Parser {
        chars: source.chars().collect(),
        pos: 0,
    };
    parser.parse_text()
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn starts_with(&self, token: &str) -> bool {
        token
            .chars()
            .enumerate()
            .all(|(i, c)| self.chars.get(self.pos + i) == Some(&c))
    }

    fn parse_text(&mut self) -> Vec<Node> {
        let mut nodes = Vec::new();
        let mut text = String::new();

        while let Some(c) = self.peek() {
            if c == '{' {
                let start = self.pos;
                self.pos += 1;
                match self.parse_block_body() {
                    Some(children) => {
                        if !text.is_empty() {
                            nodes.push(Node::Literal(std::mem::take(&mut text)));
                        }
                        nodes.push(Node::Block(children));
                    }
                    None => {
                        self.pos = start + 1;
                        text.push('{');
                    }
                }
            } else {
                text.push(c);
                self.pos += 1;
            }
        }

        if !text.is_empty() {
            nodes.push(Node::Literal(text));
        }
        nodes
    }

    /// Parse after an opening `{` up to and including the matching `}`.
    fn parse_block_body(&mut self) -> Option<Vec<Node>> {
        let mut children = Vec::new();

        loop {
            self.skip_spaces();
            match self.peek()? {
                '}' => {
                    self.pos += 1;
                    return if children.is_empty() {
                        None
                    } else {
                        Some(children)
                    };
                }
                '{' => {
                    self.pos += 1;
                    children.push(Node::Block(self.parse_block_body()?));
                }
                '"' => {
                    let literal = self.parse_quoted()?;
                    children.push(Node::Literal(literal));
                }
                ':' => {
                    // `"label": "key"` names its key in quotes
                    if !matches!(children.last(), Some(Node::Literal(_))) {
                        return None;
                    }
                    self.pos += 1;
                    self.skip_spaces();
                    if self.peek()? != '"' {
                        return None;
                    }
                    let key = self.parse_quoted()?;
                    if key.is_empty() || !key.chars().all(is_key_char) {
                        return None;
                    }
                    let modifiers = self.parse_modifiers()?;
                    children.push(Node::Var(VarRef { key, modifiers }));
                }
                _ if self.starts_with(NEWLINE_TOKEN) => {
                    self.pos += NEWLINE_TOKEN.len();
                    children.push(Node::Newline);
                }
                c if is_key_char(c) => {
                    let key = self.take_while(is_key_char);
                    let modifiers = self.parse_modifiers()?;
                    children.push(Node::Var(VarRef { key, modifiers }));
                }
                _ => return None,
            }
        }
    }

    fn parse_quoted(&mut self) -> Option<String> {
        // opening quote
        self.pos += 1;
        let mut out = String::new();

        loop {
            let c = self.peek()?;
            self.pos += 1;
            match c {
                '"' => return Some(out),
                '\\' => {
                    let escaped = self.peek()?;
                    self.pos += 1;
                    match escaped {
                        '"' => out.push('"'),
                        '\\' => out.push('\\'),
                        'n' => out.push('\n'),
                        other => {
                            out.push('\\');
                            out.push(other);
                        }
                    }
                }
                c => out.push(c),
            }
        }
    }

    fn parse_modifiers(&mut self) -> Option<Vec<Modifier>> {
        let mut modifiers = Vec::new();
        loop {
            let save = self.pos;
            self.skip_spaces();
            if self.peek() != Some('|') {
                self.pos = save;
                return Some(modifiers);
            }
            self.pos += 1;
            self.skip_spaces();
            let name = self.take_while(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
            if name.is_empty() {
                return None;
            }
            modifiers.push(Modifier::from_name(&name));
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek().filter(|c| pred(*c)) {
            out.push(c);
            self.pos += 1;
        }
        out
    }

    fn skip_spaces(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t')) {
            self.pos += 1;
        }
    }
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}
