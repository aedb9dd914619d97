//! Per-source decoders.
//!
//! Each decoder turns one request source into a [`Layer`]: the parameter type
//! decoded from that source alone, re-serialised to JSON, plus the keys the
//! source actually carried. The binder overlays layers in capability order.

use mortar_core::Exchange;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::Source;

/// One decoded source.
#[derive(Debug)]
pub(crate) struct Layer {
    value: Value,
    present: Vec<String>,
}

impl Layer {
    fn new<T: Serialize>(decoded: &T, present: Vec<String>) -> Result<Self, String> {
        let value = serde_json::to_value(decoded).map_err(|e| e.to_string())?;
        Ok(Self { value, present })
    }

    /// Copies the fields this source carried onto `acc`.
    ///
    /// Non-object values replace `acc` wholesale.
    pub(crate) fn overlay(self, acc: &mut Value) {
        match (acc, self.value) {
            (Value::Object(acc), Value::Object(mut decoded)) => {
                for key in self.present {
                    if let Some(value) = decoded.remove(&key) {
                        acc.insert(key, value);
                    }
                }
            }
            (acc, value) => *acc = value,
        }
    }
}

/// Decodes `T` from `source`.
pub(crate) fn decode<T>(source: Source, exchange: &Exchange) -> Result<Layer, String>
where
    T: Serialize + DeserializeOwned,
{
    match source {
        Source::Json => json::<T>(exchange),
        Source::QueryOrForm => pairs::<T>(query_or_form(exchange)?),
        Source::Path => pairs::<T>(path(exchange)?),
        Source::Header => pairs::<T>(headers(exchange)),
    }
}

fn json<T>(exchange: &Exchange) -> Result<Layer, String>
where
    T: Serialize + DeserializeOwned,
{
    let raw: Value = serde_json::from_slice(exchange.body()).map_err(|e| e.to_string())?;
    let present = match &raw {
        Value::Object(map) => map.keys().cloned().collect(),
        _ => Vec::new(),
    };
    let decoded: T = serde_json::from_value(raw).map_err(|e| e.to_string())?;
    Layer::new(&decoded, present)
}

/// Decodes `T` from string pairs, later pairs winning over earlier ones.
fn pairs<T>(pairs: Vec<(String, String)>) -> Result<Layer, String>
where
    T: Serialize + DeserializeOwned,
{
    let merged = last_wins(pairs);
    let encoded = serde_urlencoded::to_string(&merged).map_err(|e| e.to_string())?;
    let decoded: T = serde_urlencoded::from_str(&encoded).map_err(|e| e.to_string())?;
    let present = merged.into_iter().map(|(k, _)| k).collect();
    Layer::new(&decoded, present)
}

fn last_wins(pairs: Vec<(String, String)>) -> Vec<(String, String)> {
    let mut merged: Vec<(String, String)> = Vec::with_capacity(pairs.len());
    for (key, value) in pairs {
        match merged.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => merged.push((key, value)),
        }
    }
    merged
}

/// Path variables, percent-decoded.
fn path(exchange: &Exchange) -> Result<Vec<(String, String)>, String> {
    exchange
        .path_params()
        .iter()
        .map(|(name, raw)| {
            let value = urlencoding::decode(raw).map_err(|e| format!("{name}: {e}"))?;
            Ok((name.to_string(), value.into_owned()))
        })
        .collect()
}

fn query_or_form(exchange: &Exchange) -> Result<Vec<(String, String)>, String> {
    let mut pairs: Vec<(String, String)> =
        serde_urlencoded::from_str(exchange.query_string().unwrap_or(""))
            .map_err(|e| e.to_string())?;

    if is_form(exchange) && !exchange.body().is_empty() {
        let form: Vec<(String, String)> =
            serde_urlencoded::from_bytes(exchange.body()).map_err(|e| e.to_string())?;
        pairs.extend(form);
    }

    Ok(pairs)
}

fn is_form(exchange: &Exchange) -> bool {
    exchange
        .content_type()
        .and_then(|ct| ct.parse::<mime::Mime>().ok())
        .is_some_and(|m| m.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str())
}

/// Header pairs with lowercase names. Values that are not visible ASCII are
/// skipped.
fn headers(exchange: &Exchange) -> Vec<(String, String)> {
    exchange
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}

/// Starting point for overlays: the defaulted value as a JSON map.
pub(crate) fn seed<T: Serialize>(value: &T) -> Result<Value, String> {
    match serde_json::to_value(value).map_err(|e| e.to_string())? {
        Value::Null => Ok(Value::Object(Map::new())),
        other => Ok(other),
    }
}
