use crate::document::Document;
use hcl::{Block, Body, Expression, ObjectKey, Structure};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Placeholder for expressions that cannot be evaluated statically.
pub const UNEVALUATED: &str = "${unevaluated}";

/// Surface syntax of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Syntax {
    /// Native HCL (`.tf`, `.hcl`).
    Hcl,
    /// JSON variant of the configuration language (`.tf.json`).
    Json,
}

impl Syntax {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "tf" | "hcl" => Some(Syntax::Hcl),
            "json" => Some(Syntax::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid HCL: {0}")]
    Hcl(#[from] hcl::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected an object or an array of blocks at the top level")]
    UnexpectedShape,
}

/// Reads and parses `path` as `syntax`, as resolved during file discovery.
pub fn parse_file(path: &Path, syntax: Syntax) -> Result<Document, ParseError> {
    let source = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_str(&source, syntax)
}

pub fn parse_str(source: &str, syntax: Syntax) -> Result<Document, ParseError> {
    match syntax {
        Syntax::Hcl => {
            let body = hcl::parse(source)?;
            Ok(body_to_document(body))
        }
        Syntax::Json => {
            let value: Value = serde_json::from_str(source)?;
            json_to_document(value)
        }
    }
}

fn body_to_document(body: Body) -> Document {
    let blocks = body
        .into_iter()
        .map(|structure| {
            let mut entry = Map::new();
            insert_structure(&mut entry, structure);
            Value::Object(entry)
        })
        .collect();

    Document::new(blocks)
}

fn body_to_value(body: Body) -> Value {
    let mut map = Map::new();
    for structure in body {
        insert_structure(&mut map, structure);
    }
    Value::Object(map)
}

fn insert_structure(map: &mut Map<String, Value>, structure: Structure) {
    match structure {
        Structure::Attribute(attribute) => {
            map.insert(attribute.key.as_str().to_owned(), expression_to_value(attribute.expr));
        }
        Structure::Block(block) => insert_block(map, block),
    }
}

/// Nests a block under its identifier and labels. A key declared more than
/// once collects its bodies into a sequence.
fn insert_block(map: &mut Map<String, Value>, block: Block) {
    let mut keys: Vec<String> = std::iter::once(block.identifier.as_str().to_owned())
        .chain(block.labels.iter().map(|label| label.as_str().to_owned()))
        .collect();
    let Some(last) = keys.pop() else {
        return;
    };

    let mut target = map;
    for key in keys {
        target = match target.entry(key).or_insert_with(|| Value::Object(Map::new())) {
            Value::Object(inner) => inner,
            _ => {
                tracing::trace!("block label collides with a non-block value; skipping");
                return;
            }
        };
    }

    let value = body_to_value(block.body);
    match target.get_mut(&last) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let previous = existing.take();
            *existing = Value::Array(vec![previous, value]);
        }
        None => {
            target.insert(last, value);
        }
    }
}

fn expression_to_value(expr: Expression) -> Value {
    match expr {
        Expression::Null => Value::Null,
        Expression::Bool(b) => Value::Bool(b),
        Expression::Number(n) => serde_json::to_value(n).unwrap_or(Value::Null),
        Expression::String(s) => Value::String(s),
        Expression::Array(items) => Value::Array(items.into_iter().map(expression_to_value).collect()),
        Expression::Object(object) => Value::Object(
            object
                .into_iter()
                .map(|(key, value)| (object_key(key), expression_to_value(value)))
                .collect(),
        ),
        Expression::Parenthesis(inner) => expression_to_value(*inner),
        // References, function calls and templates are only known at plan
        // time; keep an opaque, non-empty placeholder.
        _ => Value::String(UNEVALUATED.to_owned()),
    }
}

fn object_key(key: ObjectKey) -> String {
    match key {
        ObjectKey::Identifier(ident) => ident.as_str().to_owned(),
        ObjectKey::Expression(Expression::String(s)) => s,
        // Computed keys such as `(var.k)` or `"${var.prefix}-owner"`.
        _ => UNEVALUATED.to_owned(),
    }
}

fn json_to_document(value: Value) -> Result<Document, ParseError> {
    match value {
        Value::Object(object) => {
            let blocks = object
                .into_iter()
                .map(|(kind, content)| {
                    let mut entry = Map::new();
                    entry.insert(kind, content);
                    Value::Object(entry)
                })
                .collect();
            Ok(Document::new(blocks))
        }
        Value::Array(blocks) => Ok(Document::new(blocks)),
        _ => Err(ParseError::UnexpectedShape),
    }
}
