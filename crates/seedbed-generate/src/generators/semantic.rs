use fake::Fake;
use fake::faker::address::en::{
    BuildingNumber, CityName, CountryName, StateName, StreetName, ZipCode,
};
use fake::faker::creditcard::en::CreditCardNumber;
use fake::faker::currency::en::CurrencyCode;
use fake::faker::internet::en::{
    DomainSuffix, IPv4, IPv6, MACAddress, SafeEmail, UserAgent, Username,
};
use fake::faker::lorem::en::Paragraph;
use fake::faker::name::en::{FirstName, LastName};
use fake::faker::phone_number::en::PhoneNumber;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::primitives::{DATE_FORMAT, TIME_FORMAT, pick, random_date, random_time, word};

/// Rule names resolvable by the registry, aliases included.
pub const NAMED_GENERATORS: &[&str] = &[
    "int",
    "integer",
    "sentence",
    "text",
    "firstname",
    "name",
    "lastname",
    "email",
    "username",
    "currency",
    "ccnumber",
    "cctype",
    "country",
    "city",
    "address",
    "state",
    "postalcode",
    "latitude",
    "lat",
    "longitude",
    "lon",
    "phone",
    "date",
    "dayofweek",
    "month",
    "year",
    "time",
    "datetime",
    "timestamp",
    "bloodtype",
    "bloodrhfactor",
    "bloodgroup",
    "paragraph",
    "ipv4",
    "ipv6",
    "mac",
    "url",
    "useragent",
];

const CARD_TYPES: &[&str] = &[
    "Visa",
    "Mastercard",
    "American Express",
    "Discover",
    "JCB",
    "Diners Club",
];
const WEEKDAYS: &[&str] = &[
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];
const MONTHS: &[&str] = &[
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];
const BLOOD_TYPES: &[&str] = &["A", "B", "AB", "O"];
const BLOOD_RH_FACTORS: &[&str] = &["+", "-"];
const BLOOD_GROUPS: &[&str] = &["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];

pub(crate) type Producer = fn(&mut ChaCha8Rng) -> String;

/// Parameterless producer for a catalog name; `int` and `sentence` take
/// arguments and are resolved by the registry itself.
pub(crate) fn producer(name: &str) -> Option<Producer> {
    let produce: Producer = match name {
        "firstname" | "name" => |rng| FirstName().fake_with_rng(rng),
        "lastname" => |rng| LastName().fake_with_rng(rng),
        "email" => |rng| SafeEmail().fake_with_rng(rng),
        "username" => |rng| Username().fake_with_rng(rng),
        "currency" => |rng| CurrencyCode().fake_with_rng(rng),
        "ccnumber" => |rng| CreditCardNumber().fake_with_rng(rng),
        "cctype" => |rng| pick(CARD_TYPES, rng),
        "country" => |rng| CountryName().fake_with_rng(rng),
        "city" => |rng| CityName().fake_with_rng(rng),
        "address" => |rng| {
            let number: String = BuildingNumber().fake_with_rng(rng);
            let street: String = StreetName().fake_with_rng(rng);
            format!("{number} {street}")
        },
        "state" => |rng| StateName().fake_with_rng(rng),
        "postalcode" => |rng| ZipCode().fake_with_rng(rng),
        "latitude" | "lat" => |rng| format!("{:.6}", rng.random_range(-90.0..=90.0f64)),
        "longitude" | "lon" => |rng| format!("{:.6}", rng.random_range(-180.0..=180.0f64)),
        "phone" => |rng| PhoneNumber().fake_with_rng(rng),
        "date" => |rng| random_date(rng).format(DATE_FORMAT).to_string(),
        "dayofweek" => |rng| pick(WEEKDAYS, rng),
        "month" => |rng| pick(MONTHS, rng),
        "year" => |rng| rng.random_range(1970..=2030).to_string(),
        "time" => |rng| random_time(rng).format(TIME_FORMAT).to_string(),
        "datetime" | "timestamp" => |rng| {
            format!(
                "{} {}",
                random_date(rng).format(DATE_FORMAT),
                random_time(rng).format(TIME_FORMAT)
            )
        },
        "bloodtype" => |rng| pick(BLOOD_TYPES, rng),
        "bloodrhfactor" => |rng| pick(BLOOD_RH_FACTORS, rng),
        "bloodgroup" => |rng| pick(BLOOD_GROUPS, rng),
        "paragraph" => |rng| Paragraph(3..6).fake_with_rng(rng),
        "ipv4" => |rng| IPv4().fake_with_rng(rng),
        "ipv6" => |rng| IPv6().fake_with_rng(rng),
        "mac" => |rng| MACAddress().fake_with_rng(rng),
        "url" => |rng| {
            let host = word(rng).to_lowercase();
            let suffix: String = DomainSuffix().fake_with_rng(rng);
            format!("https://www.{host}.{suffix}/")
        },
        "useragent" => |rng| UserAgent().fake_with_rng(rng),
        _ => return None,
    };
    Some(produce)
}
