use genc_value::{GencError, Value};

/// Looks up a labeled field of a `Struct`-shaped static parameter, the
/// representation every multi-field intrinsic in this crate uses for its
/// static parameter (`conditional`'s `then`/`else`, `while`'s
/// `condition_fn`/`body_fn`, and so on).
pub fn labeled<'a>(static_parameter: &'a Value, label: &str) -> genc_value::Result<&'a Value> {
    let fields = static_parameter
        .as_struct()
        .ok_or_else(|| GencError::invalid_argument(format!("static parameter must be a struct carrying '{label}'")))?;
    fields
        .iter()
        .find(|f| f.label.as_deref() == Some(label))
        .map(|f| &f.value)
        .ok_or_else(|| GencError::invalid_argument(format!("static parameter is missing labeled field '{label}'")))
}

/// The ordered list of candidate functions carried by a struct-of-functions
/// static parameter (`fallback`, `serial_chain`, `breakable_chain`'s
/// function list).
pub fn ordered_functions(static_parameter: &Value) -> genc_value::Result<Vec<&Value>> {
    let fields = static_parameter
        .as_struct()
        .ok_or_else(|| GencError::invalid_argument("static parameter must be a struct of functions"))?;
    if fields.is_empty() {
        return Err(GencError::invalid_argument("static parameter function list must not be empty"));
    }
    Ok(fields.iter().map(|f| &f.value).collect())
}
