use serde::{Deserialize, Deserializer};

// a page that is not a positive integer falls back to the default page instead of failing the request,
// digit strings too large for i64 saturate so they still land past the end
pub fn deserialize_lenient_page<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|v| parse_page(v.trim())).filter(|page| *page > 0))
}

fn parse_page(value: &str) -> Option<i64> {
    match value.parse::<i64>() {
        Ok(page) => Some(page),
        Err(_) if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) => Some(i64::MAX),
        Err(_) => None,
    }
}

// clients send ids both as JSON numbers and as numeric strings (object keys on the frontend)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "NumberOrString")]
pub struct LenientI64(pub i64);

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(i64),
    String(String),
}

impl TryFrom<NumberOrString> for LenientI64 {
    type Error = String;

    fn try_from(value: NumberOrString) -> Result<Self, Self::Error> {
        match value {
            NumberOrString::Number(v) => Ok(LenientI64(v)),
            NumberOrString::String(s) => match s.trim().parse::<i64>() {
                Ok(v) => Ok(LenientI64(v)),
                Err(_) => Err(format!("Wrong value {s}, can not parse to i64")),
            },
        }
    }
}
