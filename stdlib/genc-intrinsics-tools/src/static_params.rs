use genc_value::{GencError, Value};

pub fn labeled<'a>(static_parameter: &'a Value, label: &str) -> genc_value::Result<&'a Value> {
    static_parameter
        .as_struct()
        .ok_or_else(|| GencError::invalid_argument(format!("static parameter must be a struct carrying '{label}'")))?
        .iter()
        .find(|f| f.label.as_deref() == Some(label))
        .map(|f| &f.value)
        .ok_or_else(|| GencError::invalid_argument(format!("static parameter is missing labeled field '{label}'")))
}
