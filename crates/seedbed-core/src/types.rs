use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Normalized, parameterized representation of a column's declared type.
///
/// Optional parameters stay `None` when the declaration omits them, so
/// `varchar` and `varchar(0)` remain distinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SemanticType {
    SmallInt,
    Integer,
    BigInt,
    SmallSerial,
    Serial,
    BigSerial,
    Real,
    Double,
    Numeric {
        precision: Option<u32>,
        scale: Option<u32>,
    },
    Money,
    Char {
        length: Option<u32>,
    },
    VarChar {
        max_length: Option<u32>,
    },
    Text,
    Bit {
        length: Option<u32>,
    },
    VarBit {
        max_length: Option<u32>,
    },
    Boolean,
    Date,
    Time {
        precision: Option<u32>,
        with_time_zone: bool,
    },
    Timestamp {
        precision: Option<u32>,
        with_time_zone: bool,
    },
    Interval {
        precision: Option<u32>,
    },
    Bytea,
    Point,
    Line,
    LineSegment,
    Box,
    Path,
    Polygon,
    Circle,
    Inet,
    Cidr,
    MacAddr,
    MacAddr8,
    Json,
    Jsonb,
    Xml,
    Uuid,
    TsVector,
    TsQuery,
    PgLsn,
    PgSnapshot,
}

/// Multi-word spellings rewritten to single tokens before matching.
const MULTI_WORD_ALIASES: &[(&str, &str)] = &[
    ("character varying", "varchar"),
    ("double precision", "float8"),
    ("bit varying", "varbit"),
];

const INTERVAL_FIELDS: &[&str] = &["year", "month", "day", "hour", "minute", "second", "to"];

impl SemanticType {
    /// Parse a raw type string such as `numeric(10,2)` or
    /// `timestamp(3) with time zone`.
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = normalize(raw);
        let declaration = split_declaration(raw, &normalized)?;
        resolve(raw, &declaration)
    }

    /// Serial types are filled by their sequence and never inserted explicitly.
    pub fn is_auto_generated(&self) -> bool {
        matches!(
            self,
            SemanticType::SmallSerial | SemanticType::Serial | SemanticType::BigSerial
        )
    }

    /// Full-text-search types are derived from other columns.
    pub fn is_text_search(&self) -> bool {
        matches!(self, SemanticType::TsVector | SemanticType::TsQuery)
    }

    /// Whether values of this type are supplied by inserts.
    pub fn is_insertable(&self) -> bool {
        !self.is_auto_generated() && !self.is_text_search()
    }

    /// The sequence-backed variant for an integer type whose default is `nextval(...)`.
    pub fn as_serial(self) -> Self {
        match self {
            SemanticType::SmallInt => SemanticType::SmallSerial,
            SemanticType::Integer => SemanticType::Serial,
            SemanticType::BigInt => SemanticType::BigSerial,
            other => other,
        }
    }
}

impl FromStr for SemanticType {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        Self::parse(raw)
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticType::SmallInt => f.write_str("smallint"),
            SemanticType::Integer => f.write_str("integer"),
            SemanticType::BigInt => f.write_str("bigint"),
            SemanticType::SmallSerial => f.write_str("smallserial"),
            SemanticType::Serial => f.write_str("serial"),
            SemanticType::BigSerial => f.write_str("bigserial"),
            SemanticType::Real => f.write_str("real"),
            SemanticType::Double => f.write_str("double precision"),
            SemanticType::Numeric { precision, scale } => match (precision, scale) {
                (Some(precision), Some(scale)) => write!(f, "numeric({precision},{scale})"),
                (Some(precision), None) => write!(f, "numeric({precision})"),
                _ => f.write_str("numeric"),
            },
            SemanticType::Money => f.write_str("money"),
            SemanticType::Char { length } => write_with_length(f, "character", *length),
            SemanticType::VarChar { max_length } => {
                write_with_length(f, "character varying", *max_length)
            }
            SemanticType::Text => f.write_str("text"),
            SemanticType::Bit { length } => write_with_length(f, "bit", *length),
            SemanticType::VarBit { max_length } => write_with_length(f, "bit varying", *max_length),
            SemanticType::Boolean => f.write_str("boolean"),
            SemanticType::Date => f.write_str("date"),
            SemanticType::Time {
                precision,
                with_time_zone,
            } => {
                write_with_length(f, "time", *precision)?;
                write_zone(f, *with_time_zone)
            }
            SemanticType::Timestamp {
                precision,
                with_time_zone,
            } => {
                write_with_length(f, "timestamp", *precision)?;
                write_zone(f, *with_time_zone)
            }
            SemanticType::Interval { precision } => write_with_length(f, "interval", *precision),
            SemanticType::Bytea => f.write_str("bytea"),
            SemanticType::Point => f.write_str("point"),
            SemanticType::Line => f.write_str("line"),
            SemanticType::LineSegment => f.write_str("lseg"),
            SemanticType::Box => f.write_str("box"),
            SemanticType::Path => f.write_str("path"),
            SemanticType::Polygon => f.write_str("polygon"),
            SemanticType::Circle => f.write_str("circle"),
            SemanticType::Inet => f.write_str("inet"),
            SemanticType::Cidr => f.write_str("cidr"),
            SemanticType::MacAddr => f.write_str("macaddr"),
            SemanticType::MacAddr8 => f.write_str("macaddr8"),
            SemanticType::Json => f.write_str("json"),
            SemanticType::Jsonb => f.write_str("jsonb"),
            SemanticType::Xml => f.write_str("xml"),
            SemanticType::Uuid => f.write_str("uuid"),
            SemanticType::TsVector => f.write_str("tsvector"),
            SemanticType::TsQuery => f.write_str("tsquery"),
            SemanticType::PgLsn => f.write_str("pg_lsn"),
            SemanticType::PgSnapshot => f.write_str("pg_snapshot"),
        }
    }
}

fn write_with_length(f: &mut fmt::Formatter<'_>, name: &str, length: Option<u32>) -> fmt::Result {
    match length {
        Some(length) => write!(f, "{name}({length})"),
        None => f.write_str(name),
    }
}

fn write_zone(f: &mut fmt::Formatter<'_>, with_time_zone: bool) -> fmt::Result {
    if with_time_zone {
        f.write_str(" with time zone")
    } else {
        f.write_str(" without time zone")
    }
}

/// Structural pieces of a type declaration.
#[derive(Debug, Default, PartialEq, Eq)]
struct Declaration {
    name: String,
    first: Option<u32>,
    second: Option<u32>,
    qualifier: Option<String>,
}

/// Lowercase, collapse whitespace and rewrite multi-word aliases.
fn normalize(raw: &str) -> String {
    let mut normalized = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    for (from, to) in MULTI_WORD_ALIASES {
        normalized = normalized.replace(from, to);
    }
    normalized
}

fn malformed(raw: &str, reason: impl Into<String>) -> Error {
    Error::MalformedType {
        raw: raw.to_string(),
        reason: reason.into(),
    }
}

fn split_declaration(raw: &str, normalized: &str) -> Result<Declaration> {
    let name_len = normalized
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(normalized.len());
    let name = &normalized[..name_len];
    if !name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        return Err(malformed(raw, "missing type name"));
    }

    let mut declaration = Declaration {
        name: name.to_string(),
        ..Declaration::default()
    };

    let mut rest = normalized[name_len..].trim_start();
    if let Some(after_open) = rest.strip_prefix('(') {
        let Some((inner, after_close)) = after_open.split_once(')') else {
            return Err(malformed(raw, "unclosed parameter list"));
        };
        let params = inner
            .split(',')
            .map(|param| parse_param(raw, param))
            .collect::<Result<Vec<_>>>()?;
        match params.as_slice() {
            [first] => declaration.first = Some(*first),
            [first, second] => {
                declaration.first = Some(*first);
                declaration.second = Some(*second);
            }
            _ => return Err(malformed(raw, "expected one or two parameters")),
        }
        rest = after_close.trim_start();
    }

    if !rest.is_empty() {
        let mut qualifier = rest.trim_end();
        // `interval day to second(3)`: the precision follows the field words.
        if declaration.name == "interval"
            && declaration.first.is_none()
            && let Some(open) = qualifier.find('(')
            && let Some(inner) = qualifier[open + 1..].strip_suffix(')')
        {
            declaration.first = Some(parse_param(raw, inner)?);
            qualifier = qualifier[..open].trim_end();
        }
        if !qualifier.chars().all(|c| c.is_ascii_alphabetic() || c == ' ') {
            return Err(malformed(raw, format!("unexpected trailing text '{rest}'")));
        }
        declaration.qualifier = Some(qualifier.to_string());
    }

    Ok(declaration)
}

fn parse_param(raw: &str, param: &str) -> Result<u32> {
    let param = param.trim();
    if param.is_empty() || !param.chars().all(|c| c.is_ascii_digit()) {
        return Err(malformed(raw, format!("parameter '{param}' is not a number")));
    }
    param
        .parse::<u32>()
        .map_err(|_| malformed(raw, format!("parameter '{param}' is out of range")))
}

fn resolve(raw: &str, decl: &Declaration) -> Result<SemanticType> {
    let semantic = match decl.name.as_str() {
        "smallint" | "int2" => plain(raw, decl, SemanticType::SmallInt)?,
        "integer" | "int" | "int4" => plain(raw, decl, SemanticType::Integer)?,
        "bigint" | "int8" => plain(raw, decl, SemanticType::BigInt)?,
        "smallserial" | "serial2" => plain(raw, decl, SemanticType::SmallSerial)?,
        "serial" | "serial4" => plain(raw, decl, SemanticType::Serial)?,
        "bigserial" | "serial8" => plain(raw, decl, SemanticType::BigSerial)?,
        "real" | "float4" => plain(raw, decl, SemanticType::Real)?,
        "float8" => plain(raw, decl, SemanticType::Double)?,
        "numeric" | "decimal" => {
            unqualified(raw, decl)?;
            SemanticType::Numeric {
                precision: decl.first,
                scale: decl.second,
            }
        }
        "money" => plain(raw, decl, SemanticType::Money)?,
        "char" | "character" | "bpchar" => SemanticType::Char {
            length: single(raw, decl)?,
        },
        "varchar" => SemanticType::VarChar {
            max_length: single(raw, decl)?,
        },
        "text" => plain(raw, decl, SemanticType::Text)?,
        "bit" => SemanticType::Bit {
            length: single(raw, decl)?,
        },
        "varbit" => SemanticType::VarBit {
            max_length: single(raw, decl)?,
        },
        "boolean" | "bool" => plain(raw, decl, SemanticType::Boolean)?,
        "date" => plain(raw, decl, SemanticType::Date)?,
        "time" => SemanticType::Time {
            precision: one_param(raw, decl)?,
            with_time_zone: zone_qualifier(raw, decl)?,
        },
        "timetz" => SemanticType::Time {
            precision: single(raw, decl)?,
            with_time_zone: true,
        },
        "timestamp" => SemanticType::Timestamp {
            precision: one_param(raw, decl)?,
            with_time_zone: zone_qualifier(raw, decl)?,
        },
        "timestamptz" => SemanticType::Timestamp {
            precision: single(raw, decl)?,
            with_time_zone: true,
        },
        "interval" => {
            if let Some(fields) = &decl.qualifier
                && !fields
                    .split(' ')
                    .all(|word| INTERVAL_FIELDS.contains(&word))
            {
                return Err(malformed(raw, format!("unknown interval fields '{fields}'")));
            }
            SemanticType::Interval {
                precision: one_param(raw, decl)?,
            }
        }
        "bytea" => plain(raw, decl, SemanticType::Bytea)?,
        "point" => plain(raw, decl, SemanticType::Point)?,
        "line" => plain(raw, decl, SemanticType::Line)?,
        "lseg" => plain(raw, decl, SemanticType::LineSegment)?,
        "box" => plain(raw, decl, SemanticType::Box)?,
        "path" => plain(raw, decl, SemanticType::Path)?,
        "polygon" => plain(raw, decl, SemanticType::Polygon)?,
        "circle" => plain(raw, decl, SemanticType::Circle)?,
        "inet" => plain(raw, decl, SemanticType::Inet)?,
        "cidr" => plain(raw, decl, SemanticType::Cidr)?,
        "macaddr" => plain(raw, decl, SemanticType::MacAddr)?,
        "macaddr8" => plain(raw, decl, SemanticType::MacAddr8)?,
        "json" => plain(raw, decl, SemanticType::Json)?,
        "jsonb" => plain(raw, decl, SemanticType::Jsonb)?,
        "xml" => plain(raw, decl, SemanticType::Xml)?,
        "uuid" => plain(raw, decl, SemanticType::Uuid)?,
        "tsvector" => plain(raw, decl, SemanticType::TsVector)?,
        "tsquery" => plain(raw, decl, SemanticType::TsQuery)?,
        "pg_lsn" => plain(raw, decl, SemanticType::PgLsn)?,
        "pg_snapshot" | "txid_snapshot" => plain(raw, decl, SemanticType::PgSnapshot)?,
        other => {
            return Err(Error::UnknownType {
                raw: raw.to_string(),
                name: other.to_string(),
            });
        }
    };
    Ok(semantic)
}

fn plain(raw: &str, decl: &Declaration, semantic: SemanticType) -> Result<SemanticType> {
    if decl.first.is_some() {
        return Err(malformed(raw, format!("'{}' takes no parameters", decl.name)));
    }
    unqualified(raw, decl)?;
    Ok(semantic)
}

fn single(raw: &str, decl: &Declaration) -> Result<Option<u32>> {
    unqualified(raw, decl)?;
    one_param(raw, decl)
}

fn one_param(raw: &str, decl: &Declaration) -> Result<Option<u32>> {
    if decl.second.is_some() {
        return Err(malformed(raw, format!("'{}' takes one parameter", decl.name)));
    }
    Ok(decl.first)
}

fn unqualified(raw: &str, decl: &Declaration) -> Result<()> {
    match &decl.qualifier {
        Some(qualifier) => Err(malformed(
            raw,
            format!("'{}' does not accept '{qualifier}'", decl.name),
        )),
        None => Ok(()),
    }
}

fn zone_qualifier(raw: &str, decl: &Declaration) -> Result<bool> {
    match decl.qualifier.as_deref() {
        None | Some("without time zone") => Ok(false),
        Some("with time zone") => Ok(true),
        Some(other) => Err(malformed(raw, format!("unknown qualifier '{other}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_precision_and_scale() {
        let parsed = SemanticType::parse("numeric (10, 2)").unwrap();
        assert_eq!(
            parsed,
            SemanticType::Numeric {
                precision: Some(10),
                scale: Some(2)
            }
        );
    }

    #[test]
    fn absent_parameters_differ_from_zero() {
        assert_eq!(
            SemanticType::parse("varchar").unwrap(),
            SemanticType::VarChar { max_length: None }
        );
        assert_eq!(
            SemanticType::parse("varchar(0)").unwrap(),
            SemanticType::VarChar {
                max_length: Some(0)
            }
        );
        assert_ne!(
            SemanticType::parse("numeric").unwrap(),
            SemanticType::parse("numeric(0,0)").unwrap()
        );
    }

    #[test]
    fn parses_time_precision_and_zone() {
        assert_eq!(
            SemanticType::parse("time (6) with time zone").unwrap(),
            SemanticType::Time {
                precision: Some(6),
                with_time_zone: true
            }
        );
        assert_eq!(
            SemanticType::parse("time with time zone").unwrap(),
            SemanticType::Time {
                precision: None,
                with_time_zone: true
            }
        );
        assert_eq!(
            SemanticType::parse("time(4)").unwrap(),
            SemanticType::Time {
                precision: Some(4),
                with_time_zone: false
            }
        );
        assert_eq!(
            SemanticType::parse("timestamp without time zone").unwrap(),
            SemanticType::Timestamp {
                precision: None,
                with_time_zone: false
            }
        );
        assert_eq!(
            SemanticType::parse("timestamptz").unwrap(),
            SemanticType::Timestamp {
                precision: None,
                with_time_zone: true
            }
        );
    }

    #[test]
    fn normalizes_multi_word_aliases() {
        assert_eq!(
            SemanticType::parse("Character Varying(50)").unwrap(),
            SemanticType::VarChar {
                max_length: Some(50)
            }
        );
        assert_eq!(
            SemanticType::parse("double precision").unwrap(),
            SemanticType::Double
        );
        assert_eq!(
            SemanticType::parse("bit varying(12)").unwrap(),
            SemanticType::VarBit {
                max_length: Some(12)
            }
        );
    }

    #[test]
    fn resolves_integer_aliases() {
        for raw in ["int", "int4", "INTEGER"] {
            assert_eq!(SemanticType::parse(raw).unwrap(), SemanticType::Integer);
        }
        for raw in ["int8", "bigint"] {
            assert_eq!(SemanticType::parse(raw).unwrap(), SemanticType::BigInt);
        }
        assert_eq!(SemanticType::parse("int2").unwrap(), SemanticType::SmallInt);
    }

    #[test]
    fn unknown_names_fail_with_unknown_type() {
        let err = SemanticType::parse("geography").unwrap_err();
        assert!(matches!(err, Error::UnknownType { ref name, .. } if name == "geography"));
    }

    #[test]
    fn structural_errors_fail_with_malformed_type() {
        for raw in ["", "(10)", "numeric(10", "varchar(x)", "integer[]", "numeric(1,2,3)"] {
            let err = SemanticType::parse(raw).unwrap_err();
            assert!(
                matches!(err, Error::MalformedType { .. }),
                "expected malformed for {raw:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn rejects_parameters_on_plain_types() {
        assert!(matches!(
            SemanticType::parse("integer(5)"),
            Err(Error::MalformedType { .. })
        ));
        assert!(matches!(
            SemanticType::parse("varchar(5,2)"),
            Err(Error::MalformedType { .. })
        ));
        assert!(matches!(
            SemanticType::parse("date with time zone"),
            Err(Error::MalformedType { .. })
        ));
    }

    #[test]
    fn accepts_interval_fields() {
        assert_eq!(
            SemanticType::parse("interval year to month").unwrap(),
            SemanticType::Interval { precision: None }
        );
        assert_eq!(
            SemanticType::parse("interval second(3)").unwrap(),
            SemanticType::Interval { precision: Some(3) }
        );
        assert_eq!(
            SemanticType::parse("interval day to second(6)").unwrap(),
            SemanticType::Interval { precision: Some(6) }
        );
        assert!(SemanticType::parse("interval fortnight").is_err());
        assert!(SemanticType::parse("interval(2) second(3)").is_err());
        assert!(SemanticType::parse("time with time zone(3)").is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        let samples = [
            "numeric(12,4)",
            "numeric(7)",
            "character varying(80)",
            "character(3)",
            "time(3) with time zone",
            "timestamp without time zone",
            "bit varying(9)",
            "double precision",
            "pg_lsn",
            "lseg",
        ];
        for raw in samples {
            let parsed = SemanticType::parse(raw).unwrap();
            assert_eq!(SemanticType::parse(&parsed.to_string()).unwrap(), parsed);
        }
    }

    #[test]
    fn classifies_excluded_types() {
        assert!(SemanticType::parse("serial8").unwrap().is_auto_generated());
        assert!(SemanticType::parse("tsvector").unwrap().is_text_search());
        assert!(SemanticType::parse("text").unwrap().is_insertable());
        assert_eq!(SemanticType::Integer.as_serial(), SemanticType::Serial);
        assert_eq!(SemanticType::Text.as_serial(), SemanticType::Text);
    }
}
