//! Rison encoding: compact JSON that survives being placed in a URL.
//!
//! `encode` and `decode` work on [`serde_json::Value`]; `to_string` and
//! `from_str` wrap them for any serde type.

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::error::EndpointError;
use crate::types::Query;

#[derive(Parser)]
#[grammar = "rison/rison.pest"]
pub struct RisonParser;

const NOT_ID_CHARS: &str = " '!:(),*@$";
const NOT_ID_START: &str = "-0123456789";

pub fn decode(text: &str) -> Result<Value, EndpointError> {
    let mut pairs = RisonParser::parse(Rule::document, text)
        .map_err(|e| EndpointError::DecodeError(format!("invalid rison: {}", e)))?;

    let value = pairs
        .next()
        .ok_or_else(|| EndpointError::DecodeError("empty rison document".into()))?;

    build_value(value)
}

pub fn from_str<T: DeserializeOwned>(text: &str) -> Result<T, EndpointError> {
    let value = decode(text)?;
    Ok(serde_json::from_value(value)?)
}

pub fn encode(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

pub fn to_string<T: Serialize>(value: &T) -> Result<String, EndpointError> {
    Ok(encode(&serde_json::to_value(value)?))
}

/// Decode the search bar query carried in the URL, defaulting to the
/// match-all query when the parameter is absent.
pub fn decode_query(raw: Option<&str>) -> Result<Query, EndpointError> {
    match raw {
        Some(raw) => from_str(raw),
        None => Ok(Query::match_all()),
    }
}

fn build_value(pair: Pair<Rule>) -> Result<Value, EndpointError> {
    match pair.as_rule() {
        Rule::object => {
            let mut map = Map::new();
            for entry in pair.into_inner() {
                let mut inner = entry.into_inner();
                let (Some(key), Some(value)) = (inner.next(), inner.next()) else {
                    return Err(EndpointError::DecodeError("malformed object entry".into()));
                };
                map.insert(build_string(key)?, build_value(value)?);
            }
            Ok(Value::Object(map))
        }
        Rule::array => pair
            .into_inner()
            .map(build_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Rule::true_lit => Ok(Value::Bool(true)),
        Rule::false_lit => Ok(Value::Bool(false)),
        Rule::null_lit => Ok(Value::Null),
        Rule::number => build_number(pair.as_str()).map(Value::Number),
        Rule::string | Rule::id => build_string(pair).map(Value::String),
        other => Err(EndpointError::DecodeError(format!(
            "unexpected token {:?}",
            other
        ))),
    }
}

fn build_string(pair: Pair<Rule>) -> Result<String, EndpointError> {
    match pair.as_rule() {
        Rule::id => Ok(pair.as_str().to_string()),
        Rule::string => {
            let inner = pair.into_inner().next().map(|p| p.as_str()).unwrap_or("");
            Ok(unescape(inner))
        }
        other => Err(EndpointError::DecodeError(format!(
            "expected string, found {:?}",
            other
        ))),
    }
}

fn build_number(text: &str) -> Result<Number, EndpointError> {
    let invalid = || EndpointError::DecodeError(format!("invalid number '{}'", text));

    if !text.contains(['.', 'e']) {
        if let Ok(n) = text.parse::<i64>() {
            return Ok(Number::from(n));
        }
        if let Ok(n) = text.parse::<u64>() {
            return Ok(Number::from(n));
        }
    }

    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .ok_or_else(invalid)
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '!' {
            // The grammar only admits "!!" and "!'" inside quotes
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn is_id(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        None => false,
        Some(first) if NOT_ID_START.contains(first) || NOT_ID_CHARS.contains(first) => false,
        Some(_) => chars.all(|c| !NOT_ID_CHARS.contains(c)),
    }
}

fn write_string(out: &mut String, s: &str) {
    if is_id(s) {
        out.push_str(s);
        return;
    }

    out.push('\'');
    for c in s.chars() {
        if c == '!' || c == '\'' {
            out.push('!');
        }
        out.push(c);
    }
    out.push('\'');
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("!n"),
        Value::Bool(true) => out.push_str("!t"),
        Value::Bool(false) => out.push_str("!f"),
        Value::Number(n) => out.push_str(&n.to_string().replace('+', "")),
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            out.push_str("!(");
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                write_value(out, item);
            }
            out.push(')');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            out.push('(');
            for (index, key) in keys.into_iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                write_string(out, key);
                out.push(':');
                write_value(out, &map[key]);
            }
            out.push(')');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_encode_scalars() {
        assert_eq!(encode(&json!(true)), "!t");
        assert_eq!(encode(&json!(false)), "!f");
        assert_eq!(encode(&json!(null)), "!n");
        assert_eq!(encode(&json!(0)), "0");
        assert_eq!(encode(&json!(-3)), "-3");
        assert_eq!(encode(&json!(1.5)), "1.5");
    }

    #[test]
    fn test_encode_strings() {
        assert_eq!(encode(&json!("")), "''");
        assert_eq!(encode(&json!("a")), "a");
        assert_eq!(encode(&json!("a-z")), "a-z");
        assert_eq!(encode(&json!("0a")), "'0a'");
        assert_eq!(encode(&json!("-h")), "'-h'");
        assert_eq!(encode(&json!("abc def")), "'abc def'");
        assert_eq!(encode(&json!("wow!")), "'wow!!'");
        assert_eq!(encode(&json!("can't")), "'can!'t'");
        assert_eq!(encode(&json!("user@domain.com")), "'user@domain.com'");
    }

    #[test]
    fn test_encode_containers() {
        assert_eq!(encode(&json!({})), "()");
        assert_eq!(encode(&json!([])), "!()");
        assert_eq!(
            encode(&json!({"c": "23skidoo", "a": 0, "b": "foo"})),
            "(a:0,b:foo,c:'23skidoo')"
        );
        assert_eq!(encode(&json!([1, [true, null], {"x": ""}])), "!(1,!(!t,!n),(x:''))");
    }

    #[test]
    fn test_decode_query() {
        let query: Query = from_str("(language:kuery,query:'host.name:foo')").unwrap();
        assert_eq!(query.language, "kuery");
        assert_eq!(query.query, "host.name:foo");
    }

    #[test]
    fn test_decode_escapes() {
        assert_eq!(decode("'can!'t'").unwrap(), json!("can't"));
        assert_eq!(decode("'wow!!'").unwrap(), json!("wow!"));
        assert_eq!(decode("''").unwrap(), json!(""));
    }

    #[test]
    fn test_decode_numbers() {
        assert_eq!(decode("42").unwrap(), json!(42));
        assert_eq!(decode("-7").unwrap(), json!(-7));
        assert_eq!(decode("2.5").unwrap(), json!(2.5));
        assert_eq!(decode("1e3").unwrap(), json!(1000.0));
    }

    #[test]
    fn test_decode_rejects_malformed_input() {
        for bad in ["(a:", "( a:1)", "!x", "'unterminated", "(a:1))", "", "-"] {
            let result = decode(bad);
            assert!(
                matches!(result, Err(EndpointError::DecodeError(_))),
                "expected decode error for {:?}, got {:?}",
                bad,
                result
            );
        }
    }

    #[test]
    fn test_decode_query_defaults_to_match_all() {
        assert_eq!(decode_query(None).unwrap(), Query::match_all());
    }

    #[test]
    fn test_decode_query_wrong_shape() {
        assert!(decode_query(Some("(query:foo)")).is_err());
    }

    #[test]
    fn test_query_round_trip() {
        let query = Query {
            query: "host.os.name : \"Windows\" and not agent.version: 7.9!".into(),
            language: Query::KUERY.into(),
        };
        let encoded = to_string(&query).unwrap();
        let decoded: Query = from_str(&encoded).unwrap();
        assert_eq!(decoded, query);
    }

    proptest! {
        #[test]
        fn prop_string_round_trip(s in "\\PC*") {
            let encoded = encode(&Value::String(s.clone()));
            prop_assert_eq!(decode(&encoded).unwrap(), Value::String(s));
        }

        #[test]
        fn prop_query_round_trip(query in ".*", language in "[a-z]{1,8}") {
            let original = Query { query, language };
            let decoded: Query = from_str(&to_string(&original).unwrap()).unwrap();
            prop_assert_eq!(decoded, original);
        }
    }
}
