//! Multi-valued header maps as stored in cassettes.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

/// Header name to values, in the order the values were observed.
///
/// Names keep the case they were captured with; lookups are
/// case-insensitive.
pub type Headers = BTreeMap<String, Vec<String>>;

/// All values of `name`, across every case variant of the name.
pub fn values<'a>(headers: &'a Headers, name: &str) -> impl Iterator<Item = &'a str> + 'a {
    let wanted = name.to_ascii_lowercase();
    headers
        .iter()
        .filter(move |(key, _)| key.eq_ignore_ascii_case(&wanted))
        .flat_map(|(_, values)| values.iter().map(String::as_str))
}

/// The media type of the first `Content-Type` value, lowercased and stripped
/// of parameters.
#[must_use]
pub fn content_type(headers: &Headers) -> Option<String> {
    values(headers, "content-type")
        .next()
        .and_then(|raw| raw.split(';').next())
        .map(|mime| mime.trim().to_ascii_lowercase())
        .filter(|mime| !mime.is_empty())
}

/// Drops every header whose name matches one of `names`, ignoring case.
pub fn remove_all(headers: &mut Headers, names: &[String]) {
    if names.is_empty() {
        return;
    }
    headers.retain(|key, _| !names.iter().any(|name| name.eq_ignore_ascii_case(key)));
}

/// Appends a value under `name`.
pub fn append(headers: &mut Headers, name: impl Into<String>, value: impl Into<String>) {
    headers.entry(name.into()).or_default().push(value.into());
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

/// Accepts both `{"name": ["v1", "v2"]}` and the older `{"name": "v1"}` shape.
pub(crate) fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Headers, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: BTreeMap<String, OneOrMany> = BTreeMap::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(name, value)| {
            let values = match value {
                OneOrMany::One(single) => vec![single],
                OneOrMany::Many(list) => list,
            };
            (name, values)
        })
        .collect())
}
