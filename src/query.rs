//! Query mode selection and the `?name=&type=` route parameters

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Type chips offered by the filter row, in display order.
pub const TYPE_NAMES: [&str; 18] = [
    "Normal", "Fire", "Water", "Electric", "Grass", "Ice", "Fighting", "Poison", "Ground",
    "Flying", "Psychic", "Bug", "Rock", "Ghost", "Dragon", "Dark", "Steel", "Fairy",
];

/// Which kind of listing the result window currently holds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum QueryMode {
    #[default]
    All,
    Search(String),
    Type(String),
}

impl QueryMode {
    pub fn is_filtered(&self) -> bool {
        !matches!(self, QueryMode::All)
    }

    pub fn label(&self) -> String {
        match self {
            QueryMode::All => "All".to_string(),
            QueryMode::Search(term) => format!("\"{term}\""),
            QueryMode::Type(name) => name.clone(),
        }
    }
}

/// A committed search wins over the selected type; neither means `All`.
pub fn mode(committed_search: &str, selected_type: Option<&str>) -> QueryMode {
    let term = committed_search.trim();
    if !term.is_empty() {
        return QueryMode::Search(term.to_string());
    }
    match selected_type {
        Some(name) if !name.is_empty() => QueryMode::Type(name.to_string()),
        _ => QueryMode::All,
    }
}

/// Case-insensitive lookup into [`TYPE_NAMES`], returning the canonical name.
pub fn canonical_type(name: &str) -> Option<&'static str> {
    TYPE_NAMES
        .iter()
        .copied()
        .find(|candidate| candidate.eq_ignore_ascii_case(name.trim()))
}

/// `?name=...&type=...` as seen in the header and accepted on the command line.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RouteQuery {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub type_name: Option<String>,
}

impl RouteQuery {
    pub fn new(name: &str, type_name: Option<&str>) -> Self {
        let name = Some(name.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        Self {
            name,
            type_name: type_name.map(str::to_string),
        }
    }

    /// Parses `?name=char&type=Fire`; the leading `?` is optional and unknown
    /// keys are ignored.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        let mut query = RouteQuery::default();
        for pair in raw.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = decode(value);
            if value.trim().is_empty() {
                continue;
            }
            match key {
                "name" => query.name = Some(value),
                "type" => {
                    query.type_name = Some(
                        canonical_type(&value)
                            .map(str::to_string)
                            .unwrap_or(value),
                    )
                }
                _ => {}
            }
        }
        query
    }

    /// Empty string when neither parameter is set.
    pub fn to_query_string(&self) -> String {
        let mut pairs = Vec::new();
        if let Some(name) = &self.name {
            pairs.push(format!("name={}", urlencoding::encode(name)));
        }
        if let Some(type_name) = &self.type_name {
            pairs.push(format!("type={}", urlencoding::encode(type_name)));
        }
        if pairs.is_empty() {
            String::new()
        } else {
            format!("?{}", pairs.join("&"))
        }
    }
}

fn decode(value: &str) -> String {
    let value = value.replace('+', " ");
    urlencoding::decode(&value)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_wins_over_type() {
        assert_eq!(mode("char", Some("Fire")), QueryMode::Search("char".into()));
        assert_eq!(mode("", Some("Fire")), QueryMode::Type("Fire".into()));
        assert_eq!(mode("", None), QueryMode::All);
    }

    #[test]
    fn test_blank_search_is_no_filter() {
        assert_eq!(mode("   ", None), QueryMode::All);
        assert_eq!(mode("  pika ", None), QueryMode::Search("pika".into()));
    }

    #[test]
    fn test_route_query_round_trip() {
        let query = RouteQuery::new("mr mime", Some("Psychic"));
        let encoded = query.to_query_string();
        assert_eq!(encoded, "?name=mr%20mime&type=Psychic");
        assert_eq!(RouteQuery::parse(&encoded), query);
    }

    #[test]
    fn test_route_query_parse_normalizes_type() {
        let query = RouteQuery::parse("type=fire&utm=x");
        assert_eq!(query.name, None);
        assert_eq!(query.type_name.as_deref(), Some("Fire"));
        assert_eq!(RouteQuery::default().to_query_string(), "");
    }
}
