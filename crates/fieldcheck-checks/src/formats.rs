//! Text format checks backed by regular expressions or parsers.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use fieldcheck_core::{CheckFactory, Kind, Registry, Value, factory, predicate};
use regex::Regex;
use url::Url;
use uuid::Uuid;

use crate::support::{invalid, require_text, unsupported};

const DOMAIN: &str = r"(?:[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)+[a-zA-Z]{2,63}";
const WWW_DOMAIN: &str =
    r"^www\.(?:[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)+[a-zA-Z]{2,63}$";
const IAB_CATEGORY: &str = r"^IAB\d{1,2}(?:-\d{1,2})?$";

/// Check name and anchored pattern.
const PATTERNS: &[(&str, &str)] = &[
    ("alpha", r"^[a-zA-Z]+$"),
    ("alphanum", r"^[a-zA-Z0-9]+$"),
    ("alphaUnicode", r"^\p{L}+$"),
    ("alphaUnicodeNumeric", r"^[\p{L}\p{N}]+$"),
    ("numeric", r"^[-+]?[0-9]+(?:\.[0-9]+)?$"),
    ("number", r"^[0-9]+$"),
    ("hexadecimal", r"^(0[xX])?[0-9a-fA-F]+$"),
    (
        "hexColor",
        r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$",
    ),
    ("e164", r"^\+[1-9]?[0-9]{7,14}$"),
    ("localPhone", r"^\(?\d{3}\)?[\s.-]\d{3}[\s.-]\d{4}$"),
    (
        "email",
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$",
    ),
    (
        "base64",
        r"^(?:[A-Za-z0-9+/]{4})*(?:[A-Za-z0-9+/]{2}==|[A-Za-z0-9+/]{3}=|[A-Za-z0-9+/]{4})$",
    ),
    ("ulid", r"^[A-HJKMNP-TV-Z0-9]{26}$"),
    (
        "uuidv7",
        r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-7[0-9a-fA-F]{3}-[89abAB][0-9a-fA-F]{3}-[0-9a-fA-F]{12}$",
    ),
    (
        "mac",
        r"^(?:[0-9A-Fa-f]{2}(?::[0-9A-Fa-f]{2}){5}(?:(?::[0-9A-Fa-f]{2}){2})?|[0-9A-Fa-f]{2}(?:-[0-9A-Fa-f]{2}){5}(?:(?:-[0-9A-Fa-f]{2}){2})?|[0-9A-Fa-f]{4}(?:\.[0-9A-Fa-f]{4}){2}(?:\.[0-9A-Fa-f]{4})?)$",
    ),
    ("md5", r"^[0-9a-f]{32}$"),
    ("sha256", r"^[0-9a-f]{64}$"),
    ("latitude", r"^[-+]?([1-8]?\d(\.\d+)?|90(\.0+)?)$"),
    (
        "longitude",
        r"^[-+]?(180(\.0+)?|((1[0-7]\d)|([1-9]?\d))(\.\d+)?)$",
    ),
    (
        "hostname",
        r"^([a-zA-Z0-9][a-zA-Z0-9-]{0,62})(\.[a-zA-Z0-9][a-zA-Z0-9-]{0,62})*$",
    ),
    ("wwwDomain", WWW_DOMAIN),
    ("iabCategory", IAB_CATEGORY),
    ("slug", r"^[a-z0-9]+(?:-[a-z0-9]+)*$"),
    (
        "semver",
        r"^(0|[1-9]\d*)\.(0|[1-9]\d*)\.(0|[1-9]\d*)(?:-(?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*)(?:\.(?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*))*)?(?:\+[0-9a-zA-Z-]+(?:\.[0-9a-zA-Z-]+)*)?$",
    ),
];

/// Registers every pattern check plus the parser backed format checks.
pub(crate) fn register(registry: &Registry) {
    for (name, pattern) in PATTERNS {
        registry.register(name, matching(pattern, false));
    }
    registry.register("domain", matching(&format!("^{DOMAIN}$"), false));
    registry.register("nonWwwDomain", matching(WWW_DOMAIN, true));
    registry.register("iabCategories", repeated(IAB_CATEGORY, ','));
    registry.register("uuid", parsed(|text| text.len() == 36 && Uuid::parse_str(text).is_ok()));
    registry.register("ip", parsed(|text| text.parse::<IpAddr>().is_ok()));
    registry.register("ipv4", parsed(|text| text.parse::<Ipv4Addr>().is_ok()));
    registry.register("ipv6", parsed(|text| text.parse::<Ipv6Addr>().is_ok()));
    registry.register("cidr", parsed(is_cidr));
    registry.register("url", parsed(|text| Url::parse(text).is_ok_and(|url| has_host(&url))));
    registry.register("uri", parsed(|text| Url::parse(text).is_ok()));
    registry.register("http_url", parsed(is_http_url));
    registry.register("json", parsed(|text| serde_json::from_str::<serde_json::Value>(text).is_ok()));
    registry.register("port", port());
}

/// Text must match `pattern`, or must not match it when `negate` is set.
pub fn matching(pattern: &str, negate: bool) -> CheckFactory {
    let pattern = pattern.to_string();
    factory(move |field, check| {
        require_text(field, check)?;
        let expr = Regex::new(&pattern).map_err(|err| invalid(check, err.to_string()))?;
        Ok(predicate(move |_, value| {
            Ok(value.as_str().is_some_and(|text| expr.is_match(text) != negate))
        }))
    })
}

/// Non-empty text whose `separator` delimited items all match `pattern`.
pub fn repeated(pattern: &str, separator: char) -> CheckFactory {
    let pattern = pattern.to_string();
    factory(move |field, check| {
        require_text(field, check)?;
        let expr = Regex::new(&pattern).map_err(|err| invalid(check, err.to_string()))?;
        Ok(predicate(move |_, value| {
            Ok(value
                .as_str()
                .filter(|text| !text.is_empty())
                .is_some_and(|text| text.split(separator).all(|item| expr.is_match(item))))
        }))
    })
}

/// Text accepted by a parser.
pub fn parsed(accepts: fn(&str) -> bool) -> CheckFactory {
    factory(move |field, check| {
        require_text(field, check)?;
        Ok(predicate(move |_, value| {
            Ok(value.as_str().is_some_and(accepts))
        }))
    })
}

fn has_host(url: &Url) -> bool {
    url.host_str().is_some_and(|host| !host.is_empty())
}

fn is_http_url(text: &str) -> bool {
    Url::parse(text).is_ok_and(|url| matches!(url.scheme(), "http" | "https") && has_host(&url))
}

/// `address/prefix` with a prefix no longer than the address width.
fn is_cidr(text: &str) -> bool {
    let Some((address, prefix)) = text.split_once('/') else {
        return false;
    };
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let width = match address.parse::<IpAddr>() {
        Ok(IpAddr::V4(_)) => 32,
        Ok(IpAddr::V6(_)) => 128,
        Err(_) => return false,
    };
    prefix.parse::<u8>().is_ok_and(|prefix| prefix <= width)
}

/// TCP/UDP port number, as text or as an integer.
pub fn port() -> CheckFactory {
    factory(|field, check| match field.kind() {
        Kind::String => Ok(predicate(|_, value| {
            Ok(value
                .as_str()
                .and_then(|text| text.parse::<u16>().ok())
                .is_some_and(|port| port >= 1))
        })),
        Kind::Int | Kind::Uint => Ok(predicate(|_, value| {
            let port = match value {
                Value::Int(number) => i128::from(*number),
                Value::Uint(number) => i128::from(*number),
                _ => return Ok(false),
            };
            Ok((1..=65535).contains(&port))
        })),
        _ => Err(unsupported(field, check, "string or integer field required")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::support::testing::{build, eval};

    fn pattern(name: &str) -> CheckFactory {
        let (_, pattern) = PATTERNS
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .expect("known pattern");
        matching(pattern, false)
    }

    #[test]
    fn every_pattern_compiles() {
        for (name, _) in PATTERNS {
            assert!(build(pattern(name), Kind::String, name).is_ok(), "{name}");
        }
    }

    #[test]
    fn phone_formats() {
        assert!(eval(pattern("e164"), Kind::String, "e164", Value::Str("+14155552671")));
        assert!(!eval(pattern("e164"), Kind::String, "e164", Value::Str("4155552671")));
        assert!(eval(pattern("localPhone"), Kind::String, "localPhone", Value::Str("(415) 555-2671")));
        assert!(eval(pattern("localPhone"), Kind::String, "localPhone", Value::Str("415.555.2671")));
    }

    #[test]
    fn email_addresses() {
        assert!(eval(pattern("email"), Kind::String, "email", Value::Str("dev@example.com")));
        assert!(!eval(pattern("email"), Kind::String, "email", Value::Str("dev@")));
        assert!(!eval(pattern("email"), Kind::String, "email", Value::Str("example.com")));
    }

    #[test]
    fn domains() {
        let domain = matching(&format!("^{DOMAIN}$"), false);
        assert!(eval(domain.clone(), Kind::String, "domain", Value::Str("viant.com")));
        assert!(!eval(domain, Kind::String, "domain", Value::Str("localhost")));
        assert!(eval(pattern("wwwDomain"), Kind::String, "wwwDomain", Value::Str("www.viant.com")));
        assert!(!eval(matching(WWW_DOMAIN, true), Kind::String, "nonWwwDomain", Value::Str("www.viant.com")));
        assert!(eval(matching(WWW_DOMAIN, true), Kind::String, "nonWwwDomain", Value::Str("viant.com")));
    }

    #[test]
    fn iab_categories() {
        let categories = repeated(IAB_CATEGORY, ',');
        assert!(eval(categories.clone(), Kind::String, "iabCategories", Value::Str("IAB1,IAB2-3")));
        assert!(!eval(categories.clone(), Kind::String, "iabCategories", Value::Str("IAB1,XYZ")));
        assert!(!eval(categories, Kind::String, "iabCategories", Value::Str("")));
    }

    #[test]
    fn parser_backed_formats() {
        let uuid = parsed(|text| text.len() == 36 && Uuid::parse_str(text).is_ok());
        assert!(eval(uuid.clone(), Kind::String, "uuid", Value::Str("67e55044-10b1-426f-9247-bb680e5fe0c8")));
        assert!(!eval(uuid, Kind::String, "uuid", Value::Str("67e5504410b1426f9247bb680e5fe0c8")));
        let ip = parsed(|text| text.parse::<IpAddr>().is_ok());
        assert!(eval(ip.clone(), Kind::String, "ip", Value::Str("::1")));
        assert!(!eval(ip, Kind::String, "ip", Value::Str("300.1.1.1")));
    }

    #[test]
    fn urls_and_uris() {
        let url = parsed(|text| Url::parse(text).is_ok_and(|url| has_host(&url)));
        assert!(eval(url.clone(), Kind::String, "url", Value::Str("ftp://files.example.com/a")));
        assert!(!eval(url.clone(), Kind::String, "url", Value::Str("mailto:dev@example.com")));
        assert!(!eval(url, Kind::String, "url", Value::Str("example.com/path")));

        let uri = parsed(|text| Url::parse(text).is_ok());
        assert!(eval(uri, Kind::String, "uri", Value::Str("mailto:dev@example.com")));

        let http = parsed(is_http_url);
        assert!(eval(http.clone(), Kind::String, "http_url", Value::Str("HTTPS://example.com")));
        assert!(!eval(http, Kind::String, "http_url", Value::Str("ftp://example.com")));
    }

    #[test]
    fn network_formats() {
        assert!(is_cidr("10.0.0.0/8"));
        assert!(is_cidr("2001:db8::/32"));
        assert!(!is_cidr("10.0.0.0/33"));
        assert!(!is_cidr("10.0.0.0/+8"));
        assert!(!is_cidr("10.0.0.0"));

        let mac = pattern("mac");
        assert!(eval(mac.clone(), Kind::String, "mac", Value::Str("00:1A:2b:3c:4D:5e")));
        assert!(eval(mac.clone(), Kind::String, "mac", Value::Str("00-1a-2b-3c-4d-5e-6f-70")));
        assert!(eval(mac.clone(), Kind::String, "mac", Value::Str("001a.2b3c.4d5e")));
        assert!(!eval(mac, Kind::String, "mac", Value::Str("00:1a:2b:3c:4d")));
    }

    #[test]
    fn uuid_version_seven() {
        let v7 = pattern("uuidv7");
        assert!(eval(v7.clone(), Kind::String, "uuidv7", Value::Str("01890a5d-ac96-774b-bcce-b302099a8057")));
        assert!(!eval(v7, Kind::String, "uuidv7", Value::Str("67e55044-10b1-426f-9247-bb680e5fe0c8")));
    }

    #[test]
    fn ports() {
        assert!(eval(port(), Kind::String, "port", Value::Str("8080")));
        assert!(!eval(port(), Kind::String, "port", Value::Str("0")));
        assert!(eval(port(), Kind::Uint, "port", Value::Uint(443)));
        assert!(!eval(port(), Kind::Int, "port", Value::Int(70000)));
        assert!(build(port(), Kind::Float, "port").is_err());
    }

    #[test]
    fn non_text_fields_are_rejected() {
        assert!(build(pattern("alpha"), Kind::Int, "alpha").is_err());
    }
}
