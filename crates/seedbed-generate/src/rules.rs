//! Column rule DSL.
//!
//! ```text
//! rule       := combinator | named
//! combinator := name "[" value ("," value)* "]"
//! named      := name ["(" int ["," int] ")"]
//! ```
//!
//! Combinators are `oneof[label%weight, ...]` and `constant[value]`. Rule
//! names are case-insensitive; labels and values are trimmed but keep their
//! case.

use rand::Rng;

use crate::errors::GenerationError;
use crate::generators::{GeneratorFn, GeneratorRegistry};

/// Compile a rule string into a generator drawing from the registry's random source.
pub fn compile_rule(
    rule: &str,
    registry: &GeneratorRegistry,
) -> Result<GeneratorFn, GenerationError> {
    let trimmed = rule.trim();
    if trimmed.is_empty() {
        return Err(GenerationError::malformed(rule, "empty rule"));
    }

    if let Some((name, body)) = split_combinator(trimmed) {
        return compile_combinator(rule, &name, body, registry);
    }

    let (name, args) = parse_named(rule, trimmed)?;
    registry.named(rule, &name, &args)
}

/// `name[body]` with an alphabetic name, or `None` when the rule has another shape.
fn split_combinator(rule: &str) -> Option<(String, &str)> {
    let open = rule.find('[')?;
    let body = rule[open + 1..].strip_suffix(']')?;
    let name = rule[..open].trim_end();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some((name.to_ascii_lowercase(), body))
}

fn compile_combinator(
    rule: &str,
    name: &str,
    body: &str,
    registry: &GeneratorRegistry,
) -> Result<GeneratorFn, GenerationError> {
    if body.trim().is_empty() {
        return Err(GenerationError::malformed(rule, format!("{name}[] needs a value")));
    }

    match name {
        "oneof" => {
            let choices = parse_weighted(rule, body)?;
            let rng = registry.rng().clone();
            Ok(GeneratorFn::new("oneof", move || {
                let draw = rng.with(|rng| rng.random_range(0..100u32));
                pick_weighted(&choices, draw).to_string()
            }))
        }
        "constant" => {
            let values: Vec<&str> = body.split(',').collect();
            let [value] = values.as_slice() else {
                return Err(GenerationError::malformed(
                    rule,
                    format!("constant takes one value, got {}", values.len()),
                ));
            };
            let value = value.trim().to_string();
            Ok(GeneratorFn::new("constant", move || value.clone()))
        }
        _ => Err(GenerationError::UnknownRule {
            rule: rule.to_string(),
            name: name.to_string(),
        }),
    }
}

fn parse_weighted(rule: &str, body: &str) -> Result<Vec<(String, u32)>, GenerationError> {
    body.split(',')
        .map(|entry| {
            let parts: Vec<&str> = entry.split('%').collect();
            let [label, weight] = parts.as_slice() else {
                return Err(GenerationError::malformed(
                    rule,
                    format!("oneof entry '{}' must be label%weight", entry.trim()),
                ));
            };
            let weight = weight.trim().parse::<u32>().map_err(|_| {
                GenerationError::malformed(
                    rule,
                    format!("weight '{}' is not an integer", weight.trim()),
                )
            })?;
            Ok((label.trim().to_string(), weight))
        })
        .collect()
}

/// First label whose cumulative weight exceeds `draw`; the last label otherwise.
fn pick_weighted(choices: &[(String, u32)], draw: u32) -> &str {
    let mut cumulative = 0u32;
    for (label, weight) in choices {
        cumulative = cumulative.saturating_add(*weight);
        if draw < cumulative {
            return label;
        }
    }
    choices.last().map(|(label, _)| label.as_str()).unwrap_or_default()
}

fn parse_named(rule: &str, trimmed: &str) -> Result<(String, Vec<i64>), GenerationError> {
    let name_end = trimmed
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(trimmed.len());
    let name = &trimmed[..name_end];
    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err(GenerationError::malformed(rule, "expected a generator name"));
    }

    let rest = trimmed[name_end..].trim();
    if rest.is_empty() {
        return Ok((name.to_ascii_lowercase(), Vec::new()));
    }

    let inner = rest
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| {
            GenerationError::malformed(rule, format!("unexpected '{rest}' after '{name}'"))
        })?;
    let args = inner
        .split(',')
        .map(|arg| {
            let arg = arg.trim();
            arg.parse::<i64>().map_err(|_| {
                GenerationError::malformed(rule, format!("argument '{arg}' is not an integer"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    if args.len() > 2 {
        return Err(GenerationError::malformed(rule, "at most two arguments"));
    }

    Ok((name.to_ascii_lowercase(), args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RandomSource;

    fn registry() -> GeneratorRegistry {
        GeneratorRegistry::new(RandomSource::seeded(1234))
    }

    fn compile(rule: &str) -> Result<GeneratorFn, GenerationError> {
        compile_rule(rule, &registry())
    }

    #[test]
    fn bounded_int_stays_in_half_open_range() {
        let generator = compile("int(1,10)").unwrap();
        for _ in 0..1000 {
            let value: i64 = generator.generate().parse().unwrap();
            assert!((1..10).contains(&value), "{value}");
        }
    }

    #[test]
    fn single_bound_int_starts_at_zero() {
        let generator = compile("integer(3)").unwrap();
        for _ in 0..300 {
            let value: i64 = generator.generate().parse().unwrap();
            assert!((0..3).contains(&value), "{value}");
        }
    }

    #[test]
    fn unbounded_int_is_non_negative() {
        let generator = compile("int").unwrap();
        for _ in 0..1000 {
            let value: i64 = generator.generate().parse().unwrap();
            assert!(value >= 0);
        }
    }

    #[test]
    fn negative_bounds_are_accepted() {
        let generator = compile("int(-5, -1)").unwrap();
        for _ in 0..100 {
            let value: i64 = generator.generate().parse().unwrap();
            assert!((-5..-1).contains(&value), "{value}");
        }
    }

    #[test]
    fn oneof_follows_weights() {
        let generator = compile("oneof[a%30,b%70]").unwrap();
        let draws = 10_000;
        let mut a = 0;
        for _ in 0..draws {
            match generator.generate().as_str() {
                "a" => a += 1,
                "b" => {}
                other => panic!("unexpected label {other}"),
            }
        }
        assert!((2700..=3300).contains(&a), "a drawn {a} times");
    }

    #[test]
    fn oneof_falls_back_to_last_label() {
        let choices = vec![("x".to_string(), 10), ("y".to_string(), 20)];
        assert_eq!(pick_weighted(&choices, 5), "x");
        assert_eq!(pick_weighted(&choices, 25), "y");
        assert_eq!(pick_weighted(&choices, 99), "y");
    }

    #[test]
    fn oneof_trims_labels() {
        let generator = compile(" OneOf[ active %100 , banned% 0 ] ").unwrap();
        assert_eq!(generator.generate(), "active");
    }

    #[test]
    fn constant_always_returns_value() {
        let generator = compile("constant[x]").unwrap();
        for _ in 0..10 {
            assert_eq!(generator.generate(), "x");
        }
        assert_eq!(compile("CONSTANT[ Hello World ]").unwrap().generate(), "Hello World");
    }

    #[test]
    fn rule_names_are_case_insensitive() {
        let generator = compile("INT(1,3)").unwrap();
        assert!(["1", "2"].contains(&generator.generate().as_str()));
        assert!(compile("Email").is_ok());
        assert!(compile("ipv4").is_ok());
    }

    #[test]
    fn rejects_broken_rules() {
        assert!(matches!(compile(""), Err(GenerationError::MalformedRule { .. })));
        assert!(matches!(compile("   "), Err(GenerationError::MalformedRule { .. })));
        assert!(matches!(compile("bogus["), Err(GenerationError::MalformedRule { .. })));
        assert!(matches!(
            compile("unknownname"),
            Err(GenerationError::UnknownRule { ref name, .. }) if name == "unknownname"
        ));
        assert!(matches!(
            compile("shuffle[a,b]"),
            Err(GenerationError::UnknownRule { .. })
        ));
    }

    #[test]
    fn rejects_malformed_combinators() {
        for rule in [
            "oneof[a]",
            "oneof[a%x]",
            "oneof[a%1%2]",
            "oneof[]",
            "constant[a,b]",
            "constant[]",
        ] {
            assert!(
                matches!(compile(rule), Err(GenerationError::MalformedRule { .. })),
                "{rule} should be malformed"
            );
        }
    }

    #[test]
    fn rejects_malformed_arguments() {
        for rule in [
            "int(a)",
            "int(1,2,3)",
            "int(5,5)",
            "int(0)",
            "int(1",
            "int)1(",
            "sentence(0)",
            "sentence(1,2)",
            "email(3)",
            "(1,2)",
        ] {
            assert!(
                matches!(compile(rule), Err(GenerationError::MalformedRule { .. })),
                "{rule} should be malformed"
            );
        }
    }
}
