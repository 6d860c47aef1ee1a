use arcstr::ArcStr;
use serde_derive::{Deserialize, Serialize};
use std::sync::Arc;

/// A tensor payload: row-major element buffer plus shape.
///
/// Mirrors the `tensor` case of the wire schema documented in
/// `proto/value.proto.md`; this crate does not interpret tensor contents
/// beyond carrying them structurally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor {
    pub shape: Vec<u32>,
    pub elements: Vec<f32>,
}

impl Tensor {
    pub fn new(shape: Vec<u32>, elements: Vec<f32>) -> Self {
        Tensor { shape, elements }
    }
}

/// A leaf literal. `Media` carries opaque bytes (the original's "media"
/// case, e.g. image or audio payloads); this crate makes no assumptions
/// about their encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Str(ArcStr),
    Boolean(bool),
    Int32(i32),
    Float32(f32),
    Media(Arc<[u8]>),
    Tensor(Tensor),
}

/// One element of a `Struct` node: an optional label plus the child value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructField {
    pub label: Option<ArcStr>,
    pub value: Value,
}

impl StructField {
    pub fn unlabeled(value: Value) -> Self {
        StructField { label: None, value }
    }

    pub fn labeled(label: impl Into<ArcStr>, value: Value) -> Self {
        StructField { label: Some(label.into()), value }
    }
}

/// One local binding inside a `Block`: `name` is in scope for every
/// subsequent local and for the block's result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockLocal {
    pub name: ArcStr,
    pub value: Value,
}

/// An immutable node in the user-authored computation graph.
///
/// `Value` is the wire/authoring representation; it carries no runtime
/// identity. Executors lower it into their own opaque handles via
/// `create_value`/`create_call`/etc. Structural equality holds by derive,
/// which backs the `materialize(create_value(v)) == v` testable property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Literal(Literal),
    Struct(Vec<StructField>),
    Selection { source: Arc<Value>, index: u32 },
    Reference(ArcStr),
    Lambda { parameter_name: ArcStr, body: Arc<Value> },
    Call { function: Arc<Value>, argument: Option<Arc<Value>> },
    Block { locals: Vec<BlockLocal>, result: Arc<Value> },
    Intrinsic { uri: ArcStr, static_parameter: Arc<Value> },
}

impl Value {
    pub fn str(s: impl Into<ArcStr>) -> Self {
        Value::Literal(Literal::Str(s.into()))
    }

    pub fn boolean(b: bool) -> Self {
        Value::Literal(Literal::Boolean(b))
    }

    pub fn int32(i: i32) -> Self {
        Value::Literal(Literal::Int32(i))
    }

    pub fn float32(f: f32) -> Self {
        Value::Literal(Literal::Float32(f))
    }

    pub fn bytes(b: impl Into<Arc<[u8]>>) -> Self {
        Value::Literal(Literal::Media(b.into()))
    }

    pub fn tensor(shape: Vec<u32>, elements: Vec<f32>) -> Self {
        Value::Literal(Literal::Tensor(Tensor::new(shape, elements)))
    }

    pub fn reference(name: impl Into<ArcStr>) -> Self {
        Value::Reference(name.into())
    }

    pub fn lambda(parameter_name: impl Into<ArcStr>, body: Value) -> Self {
        Value::Lambda { parameter_name: parameter_name.into(), body: Arc::new(body) }
    }

    pub fn call(function: Value, argument: Option<Value>) -> Self {
        Value::Call { function: Arc::new(function), argument: argument.map(Arc::new) }
    }

    pub fn block(locals: Vec<BlockLocal>, result: Value) -> Self {
        Value::Block { locals, result: Arc::new(result) }
    }

    pub fn struct_of(fields: Vec<StructField>) -> Self {
        Value::Struct(fields)
    }

    pub fn struct_unlabeled(values: impl IntoIterator<Item = Value>) -> Self {
        Value::Struct(values.into_iter().map(StructField::unlabeled).collect())
    }

    pub fn selection(source: Value, index: u32) -> Self {
        Value::Selection { source: Arc::new(source), index }
    }

    pub fn intrinsic(uri: impl Into<ArcStr>, static_parameter: Value) -> Self {
        Value::Intrinsic { uri: uri.into(), static_parameter: Arc::new(static_parameter) }
    }

    /// `Some` for a literal string, `None` otherwise. Convenience used
    /// pervasively by the template and chain intrinsics, which operate on
    /// string-shaped arguments.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Literal(Literal::Str(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Literal(Literal::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&[StructField]> {
        match self {
            Value::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    /// Names left unresolved within this node, i.e. `Reference`s not bound
    /// by an enclosing `Lambda` parameter or `Block` local within the same
    /// tree. Used by `delegate`/`confidential_computation` to reject
    /// computations with open references before they cross a process
    /// boundary (closed-form only, per the boundary-crossing decision in
    /// DESIGN.md).
    pub fn unresolved_references(&self) -> Vec<ArcStr> {
        let mut out = Vec::new();
        self.collect_unresolved(&mut Vec::new(), &mut out);
        out
    }

    fn collect_unresolved(&self, bound: &mut Vec<ArcStr>, out: &mut Vec<ArcStr>) {
        match self {
            Value::Literal(_) => {}
            Value::Reference(name) => {
                if !bound.contains(name) {
                    out.push(name.clone());
                }
            }
            Value::Struct(fields) => {
                for f in fields {
                    f.value.collect_unresolved(bound, out);
                }
            }
            Value::Selection { source, .. } => source.collect_unresolved(bound, out),
            Value::Lambda { parameter_name, body } => {
                bound.push(parameter_name.clone());
                body.collect_unresolved(bound, out);
                bound.pop();
            }
            Value::Call { function, argument } => {
                function.collect_unresolved(bound, out);
                if let Some(arg) = argument {
                    arg.collect_unresolved(bound, out);
                }
            }
            Value::Block { locals, result } => {
                let pushed = locals.len();
                for local in locals {
                    local.value.collect_unresolved(bound, out);
                    bound.push(local.name.clone());
                }
                result.collect_unresolved(bound, out);
                bound.truncate(bound.len() - pushed);
            }
            Value::Intrinsic { static_parameter, .. } => {
                static_parameter.collect_unresolved(bound, out)
            }
        }
    }
}
