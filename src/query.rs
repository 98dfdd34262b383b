//! Query-string encoding for TradeInfo fields.
//!
//! The gateway expects the trade info as one percent-encoded string in which
//! only the `=` and `&` separators stay literal. Encoding is applied to the
//! whole joined string, not field by field, and the encoded separators are
//! then restored.

use crate::error::{MpgError, Result};

/// Build the encoded `k1=v1&k2=v2` string from ordered fields.
///
/// Fields keep their given order. An empty field list is rejected.
///
/// # Example
/// ```
/// use newebpay_mpg::query::build_query;
///
/// let query = build_query(&[("A", "1"), ("B", "x y")]).unwrap();
/// assert_eq!(query, "A=1&B=x%20y");
/// ```
pub fn build_query<K, V>(fields: &[(K, V)]) -> Result<String>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    if fields.is_empty() {
        return Err(MpgError::InvalidInput(
            "cannot build a query from an empty field list".to_string(),
        ));
    }

    let joined = fields
        .iter()
        .map(|(k, v)| format!("{}={}", k.as_ref(), v.as_ref()))
        .collect::<Vec<String>>()
        .join("&");

    let query = urlencoding::encode(&joined)
        .replace("%3D", "=")
        .replace("%26", "&");

    tracing::debug!(fields = fields.len(), query_len = query.len(), "Built trade query");

    Ok(query)
}

/// Parse a gateway `k=v&k=v` response body into ordered, decoded pairs.
///
/// `+` decodes to a space. A pair without `=` yields an empty value.
pub fn parse_query(query: &str) -> Result<Vec<(String, String)>> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| -> Result<(String, String)> {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            Ok((decode_component(key)?, decode_component(value)?))
        })
        .collect()
}

fn decode_component(raw: &str) -> Result<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .map_err(|e| MpgError::Encoding(format!("invalid percent-encoded UTF-8 in '{}': {}", raw, e)))
}
