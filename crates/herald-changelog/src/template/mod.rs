//! Mini template language
//!
//! ```text
//! {key}                       value of key
//! {"prefix"key"suffix"}       decorated value, dropped when key is empty
//! {"label": "key"}            same as {"label"key}
//! {<NL><NL>body}              newlines emitted only with the block
//! {<NL>{"Ticket: "ticket}}    nested blocks
//! {version|noprefix|upper}    modifiers, applied left to right
//! ```

mod parser;
mod source;

use std::collections::HashMap;

use tracing::warn;

pub use parser::{parse, Modifier, Node, VarRef};
pub use source::{Template, TemplateLoader, TemplateSource};

/// Key-value pairs a template renders against
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    values: HashMap<String, String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Insert when `value` is present
    pub fn insert_opt(&mut self, key: impl Into<String>, value: Option<impl Into<String>>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    /// Value for `key`, empty when absent
    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or_default()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut context = Self::new();
        for (key, value) in iter {
            context.insert(key, value);
        }
        context
    }
}

/// Render template source against a context
pub fn render(source: &str, context: &Context) -> String {
    render_nodes(&parse(source), context)
}

/// Render already-parsed nodes
pub fn render_nodes(nodes: &[Node], context: &Context) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            Node::Literal(text) => out.push_str(text),
            Node::Newline => out.push('\n'),
            Node::Var(var) => out.push_str(&resolve(var, context)),
            Node::Block(children) => {
                if let Some(rendered) = render_block(children, context) {
                    out.push_str(&rendered);
                }
            }
        }
    }
    out
}

/// `None` when the block is suppressed.
fn render_block(children: &[Node], context: &Context) -> Option<String> {
    let mut has_vars = false;
    for child in children {
        if let Node::Var(var) = child {
            has_vars = true;
            if context.get(&var.key).is_empty() {
                return None;
            }
        }
    }

    let mut out = String::new();
    let mut has_nested = false;
    let mut nested_output = false;

    for child in children {
        match child {
            Node::Literal(text) => out.push_str(text),
            Node::Newline => out.push('\n'),
            Node::Var(var) => out.push_str(&resolve(var, context)),
            Node::Block(nested) => {
                has_nested = true;
                if let Some(rendered) = render_block(nested, context) {
                    nested_output |= !rendered.is_empty();
                    out.push_str(&rendered);
                }
            }
        }
    }

    if !has_vars && has_nested && !nested_output {
        return None;
    }
    Some(out)
}

fn resolve(var: &VarRef, context: &Context) -> String {
    var.modifiers
        .iter()
        .fold(context.get(&var.key).to_string(), |value, modifier| {
            apply_modifier(modifier, value)
        })
}

fn apply_modifier(modifier: &Modifier, value: String) -> String {
    match modifier {
        Modifier::NoPrefix => match value.find(|c: char| c.is_ascii_digit()) {
            Some(start) => value[start..].to_string(),
            None => value,
        },
        Modifier::Upper => value.to_uppercase(),
        Modifier::Lower => value.to_lowercase(),
        Modifier::Unknown(name) => {
            warn!(modifier = %name, "unknown template modifier, value left unchanged");
            value
        }
    }
}
