use std::fmt;

use once_cell::unsync::OnceCell;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::context::RequestContext;
use crate::error::{Failure, RequestError};
use crate::exception::{MISSING_PARAMETER, PARAMETER_BINDING};
use crate::meta::{ParamSource, ParameterSpec, TargetType};

/// Turns a request body into a JSON value for non-text body parameters.
pub trait BodyDeserializer: Send + Sync {
    fn deserialize(&self, body: &[u8], content_type: Option<&str>) -> Result<Value, String>;
}

/// `serde_json` body deserializer; ignores the content type.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBodyDeserializer;

impl BodyDeserializer for JsonBodyDeserializer {
    fn deserialize(&self, body: &[u8], _content_type: Option<&str>) -> Result<Value, String> {
        serde_json::from_slice(body).map_err(|e| e.to_string())
    }
}

/// A converted parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Json(Value),
    /// Placeholder for context parameters; handlers read the context directly.
    Context,
}

impl BoundValue {
    fn type_name(&self) -> &'static str {
        match self {
            BoundValue::Text(_) => "text",
            BoundValue::Integer(_) => "integer",
            BoundValue::Float(_) => "float",
            BoundValue::Boolean(_) => "boolean",
            BoundValue::Json(_) => "json",
            BoundValue::Context => "context",
        }
    }
}

/// Conversion from a bound value into a handler-side type.
pub trait FromBound: Sized {
    fn from_bound(value: &BoundValue) -> Option<Self>;
}

impl FromBound for String {
    fn from_bound(value: &BoundValue) -> Option<Self> {
        match value {
            BoundValue::Text(s) | BoundValue::Json(Value::String(s)) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromBound for i64 {
    fn from_bound(value: &BoundValue) -> Option<Self> {
        match value {
            BoundValue::Integer(n) => Some(*n),
            BoundValue::Json(v) => v.as_i64(),
            _ => None,
        }
    }
}

impl FromBound for i32 {
    fn from_bound(value: &BoundValue) -> Option<Self> {
        i64::from_bound(value).and_then(|n| i32::try_from(n).ok())
    }
}

impl FromBound for u64 {
    fn from_bound(value: &BoundValue) -> Option<Self> {
        match value {
            BoundValue::Integer(n) => u64::try_from(*n).ok(),
            BoundValue::Json(v) => v.as_u64(),
            _ => None,
        }
    }
}

impl FromBound for f64 {
    #[allow(clippy::cast_precision_loss)]
    fn from_bound(value: &BoundValue) -> Option<Self> {
        match value {
            BoundValue::Float(n) => Some(*n),
            BoundValue::Integer(n) => Some(*n as f64),
            BoundValue::Json(v) => v.as_f64(),
            _ => None,
        }
    }
}

impl FromBound for bool {
    fn from_bound(value: &BoundValue) -> Option<Self> {
        match value {
            BoundValue::Boolean(b) => Some(*b),
            BoundValue::Json(v) => v.as_bool(),
            _ => None,
        }
    }
}

impl FromBound for Value {
    fn from_bound(value: &BoundValue) -> Option<Self> {
        match value {
            BoundValue::Text(s) => Some(Value::String(s.clone())),
            BoundValue::Integer(n) => Some(Value::from(*n)),
            BoundValue::Float(n) => Some(Value::from(*n)),
            BoundValue::Boolean(b) => Some(Value::Bool(*b)),
            BoundValue::Json(v) => Some(v.clone()),
            BoundValue::Context => None,
        }
    }
}

/// Bound parameters in declaration order. Absent nullable parameters are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: Vec<(String, Option<BoundValue>)>,
}

impl Arguments {
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at declaration position `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&BoundValue> {
        self.values.get(index).and_then(|(_, v)| v.as_ref())
    }

    /// Value by parameter name (`"body"` / `"context"` for unnamed parameters).
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&BoundValue> {
        self.values
            .iter()
            .find(|(key, _)| key == name)
            .and_then(|(_, v)| v.as_ref())
    }

    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.value(name)? {
            BoundValue::Text(s) | BoundValue::Json(Value::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn integer(&self, name: &str) -> Option<i64> {
        self.value(name).and_then(i64::from_bound)
    }

    #[must_use]
    pub fn float(&self, name: &str) -> Option<f64> {
        self.value(name).and_then(f64::from_bound)
    }

    #[must_use]
    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.value(name).and_then(bool::from_bound)
    }

    #[must_use]
    pub fn json(&self, name: &str) -> Option<&Value> {
        match self.value(name)? {
            BoundValue::Json(v) => Some(v),
            _ => None,
        }
    }

    /// The body parameter, if one was declared and present.
    #[must_use]
    pub fn body(&self) -> Option<&BoundValue> {
        self.value(ParamSource::Body.as_str())
    }

    /// Typed access; absence and type mismatch become failures.
    pub fn require<T: FromBound>(&self, name: &str) -> Result<T, Failure> {
        self.optional(name)?.ok_or_else(|| {
            Failure::new(
                &MISSING_PARAMETER,
                format!("missing required parameter '{name}'"),
            )
        })
    }

    pub fn optional<T: FromBound>(&self, name: &str) -> Result<Option<T>, Failure> {
        let Some(value) = self.value(name) else {
            return Ok(None);
        };
        T::from_bound(value).map(Some).ok_or_else(|| {
            Failure::new(
                &PARAMETER_BINDING,
                format!(
                    "parameter '{name}' is {} and cannot be read as {}",
                    value.type_name(),
                    std::any::type_name::<T>()
                ),
            )
        })
    }

    /// Decode a JSON parameter into a user type.
    pub fn decode<T: DeserializeOwned>(&self, name: &str) -> Result<T, Failure> {
        let value = match self.value(name) {
            Some(BoundValue::Context) | None => {
                return Err(Failure::new(
                    &MISSING_PARAMETER,
                    format!("missing required parameter '{name}'"),
                ))
            }
            Some(BoundValue::Json(v)) => v.clone(),
            Some(other) => Value::from_bound(other).unwrap_or(Value::Null),
        };
        serde_json::from_value(value).map_err(|e| {
            Failure::new(&PARAMETER_BINDING, format!("cannot decode '{name}': {e}"))
                .with_cause(e)
        })
    }

    pub fn decode_body<T: DeserializeOwned>(&self) -> Result<T, Failure> {
        self.decode(ParamSource::Body.as_str())
    }
}

/// Bind every parameter of an endpoint against the request.
///
/// Path parameters must already be set on the context by the router. The
/// body is deserialized at most once however many parameters read it.
pub fn bind(
    params: &[ParameterSpec],
    ctx: &RequestContext,
    deserializer: &dyn BodyDeserializer,
) -> Result<Arguments, RequestError> {
    let body = OnceCell::new();
    let mut values = Vec::with_capacity(params.len());

    for spec in params {
        let key = spec.key();
        let bound = match spec.source {
            ParamSource::Context => Some(BoundValue::Context),
            ParamSource::Body => bind_body(spec, ctx, deserializer, &body)?,
            ParamSource::Path => raw_text(spec, ctx.path_param(key))?,
            ParamSource::Query => raw_text(spec, ctx.query(key))?,
            ParamSource::Header => raw_text(spec, ctx.header(key))?,
            ParamSource::Cookie => raw_text(spec, ctx.cookie(key))?,
        };
        if bound.is_none() && !spec.nullable {
            return Err(RequestError::MissingParameter {
                name: key.to_string(),
                location: spec.source,
            });
        }
        values.push((key.to_string(), bound));
    }

    Ok(Arguments { values })
}

fn raw_text(spec: &ParameterSpec, raw: Option<&str>) -> Result<Option<BoundValue>, RequestError> {
    raw.map(|raw| convert_text(raw, spec.target).map_err(|reason| binding_error(spec, reason)))
        .transpose()
}

fn bind_body(
    spec: &ParameterSpec,
    ctx: &RequestContext,
    deserializer: &dyn BodyDeserializer,
    cache: &OnceCell<Value>,
) -> Result<Option<BoundValue>, RequestError> {
    let bytes = ctx.body();
    if bytes.is_empty() {
        return Ok(None);
    }
    if spec.target == TargetType::Text {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| binding_error(spec, format!("body is not valid UTF-8: {e}")))?;
        return Ok(Some(BoundValue::Text(text.to_string())));
    }
    let value = cache
        .get_or_try_init(|| deserializer.deserialize(bytes, ctx.content_type()))
        .map_err(|reason| binding_error(spec, reason))?;
    if value.is_null() {
        return Ok(None);
    }
    convert_json(value, spec.target)
        .map(Some)
        .map_err(|reason| binding_error(spec, reason))
}

fn convert_text(raw: &str, target: TargetType) -> Result<BoundValue, String> {
    match target {
        TargetType::Text => Ok(BoundValue::Text(raw.to_string())),
        TargetType::Integer => raw
            .trim()
            .parse::<i64>()
            .map(BoundValue::Integer)
            .map_err(|_| format!("expected integer, got '{raw}'")),
        TargetType::Float => match raw.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(BoundValue::Float(n)),
            _ => Err(format!("expected number, got '{raw}'")),
        },
        TargetType::Boolean => match raw.trim() {
            s if s.eq_ignore_ascii_case("true") => Ok(BoundValue::Boolean(true)),
            s if s.eq_ignore_ascii_case("false") => Ok(BoundValue::Boolean(false)),
            _ => Err(format!("expected boolean, got '{raw}'")),
        },
        TargetType::Json => Ok(BoundValue::Json(
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())),
        )),
    }
}

fn convert_json(value: &Value, target: TargetType) -> Result<BoundValue, String> {
    let mismatch = || format!("expected {target}, got {}", json_type(value));
    match target {
        TargetType::Json => Ok(BoundValue::Json(value.clone())),
        TargetType::Text => value
            .as_str()
            .map(|s| BoundValue::Text(s.to_string()))
            .ok_or_else(mismatch),
        TargetType::Integer => value.as_i64().map(BoundValue::Integer).ok_or_else(mismatch),
        TargetType::Float => value.as_f64().map(BoundValue::Float).ok_or_else(mismatch),
        TargetType::Boolean => value.as_bool().map(BoundValue::Boolean).ok_or_else(mismatch),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn binding_error(spec: &ParameterSpec, reason: impl fmt::Display) -> RequestError {
    RequestError::ParameterBinding {
        name: spec.key().to_string(),
        location: spec.source,
        reason: reason.to_string(),
    }
}
