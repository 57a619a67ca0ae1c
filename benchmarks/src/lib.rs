//! Inputs shared by the immo_price benchmarks.
//!
//! Requests are derived from the library fixtures and varied by index so that
//! every one-hot block and the imputer both see realistic traffic.

use immo_price::fixtures;
use immo_price::PropertyAttributes;
use serde_json::{json, Value};

const PROVINCES: [&str; 6] = [
    "Antwerp",
    "Brussels",
    "East Flanders",
    "Liège",
    "West Flanders",
    "Limburg",
];

/// `n` request payloads. Every third one leaves `garden_sqm` null and every
/// sixth uses a province the encoder has never seen.
pub fn request_values(n: usize) -> Vec<Value> {
    (0..n)
        .map(|i| {
            let mut request = fixtures::request_json();
            let object = request
                .as_object_mut()
                .expect("fixture request is an object");
            object.insert("total_area_sqm".into(), json!(60.0 + (i % 200) as f64));
            object.insert("nbr_bedrooms".into(), json!(1 + i % 5));
            object.insert("province".into(), json!(PROVINCES[i % PROVINCES.len()]));
            if i % 3 == 0 {
                object.insert("garden_sqm".into(), Value::Null);
            }
            request
        })
        .collect()
}

pub fn requests(n: usize) -> Vec<PropertyAttributes> {
    request_values(n)
        .into_iter()
        .map(|value| serde_json::from_value(value).expect("fixture request deserialises"))
        .collect()
}

/// The same requests as a CSV document with a header row.
pub fn requests_csv(n: usize) -> String {
    let values = request_values(n);
    let Some(first) = values.first().and_then(Value::as_object) else {
        return String::new();
    };
    let header: Vec<&String> = first.keys().collect();

    let mut out = header
        .iter()
        .map(|h| h.as_str())
        .collect::<Vec<_>>()
        .join(",");
    out.push('\n');
    for value in &values {
        let row: Vec<String> = header
            .iter()
            .map(|h| match &value[h.as_str()] {
                Value::Null => String::new(),
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}
