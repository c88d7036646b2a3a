use chrono::{NaiveDate, NaiveTime};
use fake::Fake;
use fake::faker::internet::en::IPv4;
use fake::faker::lorem::en::{Sentence, Word};
use rand::Rng;
use rand::seq::IndexedRandom;
use seedbed_core::SemanticType;

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";
pub(crate) const TIME_FORMAT: &str = "%H:%M:%S";

const INTERVALS: &[&str] = &[
    "1 year 3 hours 20 minutes",
    "2 weeks ago",
    "5 days 4 hours",
    "3 months 2 days",
    "5 minutes",
    "1 hour",
    "1 day",
    "1 week",
    "1 month",
    "4 weeks",
];

const MAX_FRACTION_DIGITS: u32 = 6;
const DEFAULT_VARCHAR_LENGTH: u32 = 255;

/// Produce one value of `ty` in the text form PostgreSQL accepts on input.
///
/// Never returns an empty string.
pub fn default_value<R: Rng + ?Sized>(ty: SemanticType, rng: &mut R) -> String {
    match ty {
        SemanticType::SmallInt => rng.random_range(0..100i16).to_string(),
        SemanticType::Integer => rng.random_range(0..1000i32).to_string(),
        SemanticType::BigInt => rng.random_range(0..=i64::MAX).to_string(),
        SemanticType::SmallSerial => rng.random_range(1..=i16::MAX).to_string(),
        SemanticType::Serial => rng.random_range(1..=i32::MAX).to_string(),
        SemanticType::BigSerial => rng.random_range(1..=i64::MAX).to_string(),
        SemanticType::Real => format!("{:.4}", rng.random::<f32>() * 1000.0),
        SemanticType::Double => format!("{:.6}", rng.random::<f64>() * 1000.0),
        SemanticType::Numeric { precision, scale } => numeric(precision, scale, rng),
        SemanticType::Money => format!("{:.2}", rng.random::<f64>() * 1000.0),
        SemanticType::Char { length } => letters(length.unwrap_or(1).max(1), rng),
        SemanticType::VarChar { max_length } => {
            let limit = max_length.unwrap_or(DEFAULT_VARCHAR_LENGTH).max(1);
            text_up_to(limit as usize, rng)
        }
        SemanticType::Text => sentence(rng),
        SemanticType::Bit { length } => bits(length.unwrap_or(1).max(1), rng),
        SemanticType::VarBit { max_length } => bits(max_length.unwrap_or(8).max(1), rng),
        SemanticType::Boolean => rng.random_bool(0.5).to_string(),
        SemanticType::Date => random_date(rng).format(DATE_FORMAT).to_string(),
        SemanticType::Time {
            precision,
            with_time_zone,
        } => {
            let mut value = random_time(rng).format(TIME_FORMAT).to_string();
            push_fraction(&mut value, precision, rng);
            push_zone(&mut value, with_time_zone);
            value
        }
        SemanticType::Timestamp {
            precision,
            with_time_zone,
        } => {
            let mut value = format!(
                "{} {}",
                random_date(rng).format(DATE_FORMAT),
                random_time(rng).format(TIME_FORMAT)
            );
            push_fraction(&mut value, precision, rng);
            push_zone(&mut value, with_time_zone);
            value
        }
        SemanticType::Interval { .. } => pick(INTERVALS, rng),
        SemanticType::Bytea => format!("\\x{}", hex::encode(rng.random::<[u8; 8]>())),
        SemanticType::Point => point(rng),
        SemanticType::Line => format!(
            "{{{},{},{}}}",
            rng.random_range(1..100i32),
            coordinate(rng),
            coordinate(rng)
        ),
        SemanticType::LineSegment => format!("[{},{}]", point(rng), point(rng)),
        SemanticType::Box => format!("{},{}", point(rng), point(rng)),
        SemanticType::Path => format!("({},{})", point(rng), point(rng)),
        SemanticType::Polygon => format!("({},{},{})", point(rng), point(rng), point(rng)),
        SemanticType::Circle => format!("<{},{}>", point(rng), rng.random_range(1..100i32)),
        SemanticType::Inet => IPv4().fake_with_rng(rng),
        SemanticType::Cidr => {
            let [a, b, c]: [u8; 3] = rng.random();
            format!("{a}.{b}.{c}.0/24")
        }
        SemanticType::MacAddr => mac(6, rng),
        SemanticType::MacAddr8 => mac(8, rng),
        SemanticType::Json | SemanticType::Jsonb => serde_json::json!({
            "id": rng.random_range(1..10_000i32),
            "label": word(rng),
        })
        .to_string(),
        SemanticType::Xml => format!("<item>{}</item>", word(rng)),
        SemanticType::Uuid => uuid::Builder::from_random_bytes(rng.random())
            .into_uuid()
            .to_string(),
        SemanticType::TsVector => format!("'{}':1", word(rng)),
        SemanticType::TsQuery => word(rng),
        SemanticType::PgLsn => format!(
            "{:X}/{:X}",
            rng.random_range(0..16u32),
            rng.random::<u32>()
        ),
        SemanticType::PgSnapshot => {
            let xmin = rng.random_range(1..1000u32);
            let xmax = xmin + rng.random_range(0..100u32);
            format!("{xmin}:{xmax}:")
        }
    }
}

/// One lorem sentence.
pub(crate) fn sentence<R: Rng + ?Sized>(rng: &mut R) -> String {
    Sentence(3..10).fake_with_rng(rng)
}

/// Lorem text of at most `limit` characters, never empty for `limit > 0`.
pub(crate) fn text_up_to<R: Rng + ?Sized>(limit: usize, rng: &mut R) -> String {
    let mut text = sentence(rng);
    while text.chars().count() < limit {
        text.push(' ');
        text.push_str(&sentence(rng));
    }
    let truncated: String = text.chars().take(limit).collect();
    truncated.trim_end().to_string()
}

pub(crate) fn word<R: Rng + ?Sized>(rng: &mut R) -> String {
    Word().fake_with_rng(rng)
}

pub(crate) fn random_date<R: Rng + ?Sized>(rng: &mut R) -> NaiveDate {
    NaiveDate::from_ymd_opt(
        rng.random_range(1970..=2030),
        rng.random_range(1..=12),
        rng.random_range(1..=28),
    )
    .unwrap_or_default()
}

pub(crate) fn random_time<R: Rng + ?Sized>(rng: &mut R) -> NaiveTime {
    NaiveTime::from_hms_opt(
        rng.random_range(0..24),
        rng.random_range(0..60),
        rng.random_range(0..60),
    )
    .unwrap_or_default()
}

pub(crate) fn pick<R: Rng + ?Sized>(values: &[&str], rng: &mut R) -> String {
    values.choose(rng).copied().unwrap_or_default().to_string()
}

fn numeric<R: Rng + ?Sized>(precision: Option<u32>, scale: Option<u32>, rng: &mut R) -> String {
    let scale = scale.unwrap_or(if precision.is_some() { 0 } else { 2 });
    let integer_digits = precision.map_or(3, |p| p.saturating_sub(scale)).min(3);
    let whole = match integer_digits {
        0 => 0,
        digits => rng.random_range(0..10u32.pow(digits)),
    };
    if scale == 0 {
        return whole.to_string();
    }

    // numeric(p,s) with s > p keeps the first s-p fractional digits at zero.
    let leading_zeros = precision.map_or(0, |p| scale.saturating_sub(p));
    let fraction: String = (0..scale)
        .map(|idx| {
            if idx < leading_zeros {
                '0'
            } else {
                char::from(b'0' + rng.random_range(0..10u8))
            }
        })
        .collect();
    format!("{whole}.{fraction}")
}

fn letters<R: Rng + ?Sized>(count: u32, rng: &mut R) -> String {
    (0..count)
        .map(|_| char::from(b'a' + rng.random_range(0..26u8)))
        .collect()
}

fn bits<R: Rng + ?Sized>(count: u32, rng: &mut R) -> String {
    (0..count)
        .map(|_| if rng.random_bool(0.5) { '1' } else { '0' })
        .collect()
}

fn push_fraction<R: Rng + ?Sized>(value: &mut String, precision: Option<u32>, rng: &mut R) {
    let digits = precision.unwrap_or(0).min(MAX_FRACTION_DIGITS);
    if digits == 0 {
        return;
    }
    value.push('.');
    for _ in 0..digits {
        value.push(char::from(b'0' + rng.random_range(0..10u8)));
    }
}

fn push_zone(value: &mut String, with_time_zone: bool) {
    if with_time_zone {
        value.push_str("+00");
    }
}

fn coordinate<R: Rng + ?Sized>(rng: &mut R) -> i32 {
    rng.random_range(0..100)
}

fn point<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("({},{})", coordinate(rng), coordinate(rng))
}

fn mac<R: Rng + ?Sized>(octets: usize, rng: &mut R) -> String {
    (0..octets)
        .map(|_| format!("{:02x}", rng.random::<u8>()))
        .collect::<Vec<_>>()
        .join(":")
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(11)
    }

    fn samples(ty: SemanticType) -> Vec<String> {
        let mut rng = rng();
        (0..100).map(|_| default_value(ty, &mut rng)).collect()
    }

    #[test]
    fn varchar_respects_declared_length() {
        for value in samples(SemanticType::VarChar {
            max_length: Some(5),
        }) {
            assert!(!value.is_empty());
            assert!(value.chars().count() <= 5, "{value}");
        }
    }

    #[test]
    fn char_has_exact_length() {
        for value in samples(SemanticType::Char { length: Some(3) }) {
            assert_eq!(value.len(), 3);
        }
        for value in samples(SemanticType::Char { length: None }) {
            assert_eq!(value.len(), 1);
        }
    }

    #[test]
    fn bits_have_declared_width() {
        for value in samples(SemanticType::Bit { length: Some(4) }) {
            assert_eq!(value.len(), 4);
            assert!(value.chars().all(|c| c == '0' || c == '1'));
        }
    }

    #[test]
    fn numeric_fits_precision_and_scale() {
        for value in samples(SemanticType::Numeric {
            precision: Some(5),
            scale: Some(2),
        }) {
            let (whole, fraction) = value.split_once('.').expect("decimal point");
            assert!(whole.len() <= 3, "{value}");
            assert_eq!(fraction.len(), 2, "{value}");
        }
        for value in samples(SemanticType::Numeric {
            precision: Some(4),
            scale: None,
        }) {
            assert!(value.parse::<u32>().is_ok(), "{value}");
        }
    }

    #[test]
    fn timestamps_carry_precision_and_zone() {
        for value in samples(SemanticType::Timestamp {
            precision: Some(3),
            with_time_zone: true,
        }) {
            let stripped = value.strip_suffix("+00").expect("zone offset");
            assert!(
                chrono::NaiveDateTime::parse_from_str(stripped, "%Y-%m-%d %H:%M:%S%.3f").is_ok(),
                "{value}"
            );
        }
        for value in samples(SemanticType::Time {
            precision: None,
            with_time_zone: false,
        }) {
            assert!(NaiveTime::parse_from_str(&value, TIME_FORMAT).is_ok(), "{value}");
        }
    }

    #[test]
    fn geometric_values_use_postgres_text_forms() {
        assert!(
            samples(SemanticType::Point)
                .iter()
                .all(|v| v.starts_with('(') && v.ends_with(')'))
        );
        assert!(
            samples(SemanticType::Circle)
                .iter()
                .all(|v| v.starts_with("<(") && v.ends_with('>'))
        );
        assert!(
            samples(SemanticType::LineSegment)
                .iter()
                .all(|v| v.starts_with("[(") && v.ends_with(")]"))
        );
        assert!(
            samples(SemanticType::Line)
                .iter()
                .all(|v| v.starts_with('{') && v.matches(',').count() == 2)
        );
    }

    #[test]
    fn uuid_and_bytea_are_well_formed() {
        for value in samples(SemanticType::Uuid) {
            assert!(uuid::Uuid::parse_str(&value).is_ok(), "{value}");
        }
        for value in samples(SemanticType::Bytea) {
            assert!(value.starts_with("\\x"));
            assert_eq!(value.len(), 18);
        }
    }

    #[test]
    fn every_type_produces_a_value() {
        let types = [
            "smallint", "integer", "bigint", "smallserial", "serial", "bigserial", "real",
            "double precision", "numeric", "money", "char", "varchar", "text", "bit", "varbit",
            "boolean", "date", "time", "timetz", "timestamp", "timestamptz", "interval", "bytea",
            "point", "line", "lseg", "box", "path", "polygon", "circle", "inet", "cidr",
            "macaddr", "macaddr8", "json", "jsonb", "xml", "uuid", "tsvector", "tsquery",
            "pg_lsn", "pg_snapshot",
        ];
        let mut rng = rng();
        for raw in types {
            let ty = SemanticType::parse(raw).unwrap_or_else(|err| panic!("{raw}: {err}"));
            for _ in 0..10 {
                assert!(!default_value(ty, &mut rng).is_empty(), "{raw}");
            }
        }
    }
}
