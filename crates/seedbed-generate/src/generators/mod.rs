//! Value producers: per-type defaults and the named-generator catalog.

pub mod primitives;
pub mod semantic;

use std::fmt;

use rand::Rng;
use seedbed_core::SemanticType;

use crate::errors::GenerationError;
use crate::rng::RandomSource;

/// Zero-argument producer of one text-encoded column value.
pub struct GeneratorFn {
    id: String,
    produce: Box<dyn Fn() -> String>,
}

impl GeneratorFn {
    pub fn new(id: impl Into<String>, produce: impl Fn() -> String + 'static) -> Self {
        Self {
            id: id.into(),
            produce: Box::new(produce),
        }
    }

    /// Identifier of the producer (type name, rule name or combinator).
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn generate(&self) -> String {
        (self.produce)()
    }
}

impl fmt::Debug for GeneratorFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorFn").field("id", &self.id).finish()
    }
}

/// Resolves semantic types and rule names to generators sharing one random source.
#[derive(Debug, Clone)]
pub struct GeneratorRegistry {
    rng: RandomSource,
}

impl GeneratorRegistry {
    pub fn new(rng: RandomSource) -> Self {
        Self { rng }
    }

    pub fn rng(&self) -> &RandomSource {
        &self.rng
    }

    /// Default generator for a column type; never fails.
    pub fn default_generator(&self, ty: SemanticType) -> GeneratorFn {
        let rng = self.rng.clone();
        GeneratorFn::new(ty.to_string(), move || {
            rng.with(|rng| primitives::default_value(ty, rng))
        })
    }

    /// Compile a rule string (see [`crate::rules::compile_rule`]).
    pub fn compile(&self, rule: &str) -> Result<GeneratorFn, GenerationError> {
        crate::rules::compile_rule(rule, self)
    }

    /// Names accepted by [`GeneratorRegistry::named`].
    pub fn named_generators() -> &'static [&'static str] {
        semantic::NAMED_GENERATORS
    }

    /// Resolve a lowercase generator name with its numeric arguments.
    ///
    /// `rule` is the original rule text, used in error reports.
    pub fn named(
        &self,
        rule: &str,
        name: &str,
        args: &[i64],
    ) -> Result<GeneratorFn, GenerationError> {
        let rng = self.rng.clone();
        match name {
            "int" | "integer" => int_generator(rule, args, rng),
            "sentence" | "text" => sentence_generator(rule, args, rng),
            _ => {
                let produce =
                    semantic::producer(name).ok_or_else(|| GenerationError::UnknownRule {
                        rule: rule.to_string(),
                        name: name.to_string(),
                    })?;
                if !args.is_empty() {
                    return Err(GenerationError::malformed(
                        rule,
                        format!("'{name}' takes no arguments"),
                    ));
                }
                Ok(GeneratorFn::new(name, move || rng.with(produce)))
            }
        }
    }
}

fn int_generator(
    rule: &str,
    args: &[i64],
    rng: RandomSource,
) -> Result<GeneratorFn, GenerationError> {
    let (low, high) = match *args {
        [] => {
            return Ok(GeneratorFn::new("int", move || {
                rng.with(|rng| rng.random_range(0..=i64::MAX)).to_string()
            }));
        }
        [n] if n > 0 => (0, n),
        [n] => {
            return Err(GenerationError::malformed(
                rule,
                format!("upper bound must be positive, got {n}"),
            ));
        }
        [n, m] if m > n => (n, m),
        [n, m] => {
            return Err(GenerationError::malformed(
                rule,
                format!("empty range [{n}, {m})"),
            ));
        }
        _ => {
            return Err(GenerationError::malformed(
                rule,
                "int takes at most two arguments",
            ));
        }
    };

    Ok(GeneratorFn::new("int", move || {
        rng.with(|rng| rng.random_range(low..high)).to_string()
    }))
}

fn sentence_generator(
    rule: &str,
    args: &[i64],
    rng: RandomSource,
) -> Result<GeneratorFn, GenerationError> {
    match *args {
        [] => Ok(GeneratorFn::new("sentence", move || {
            rng.with(|rng| primitives::sentence(rng))
        })),
        [n] if n > 0 => {
            let length = usize::try_from(n)
                .map_err(|_| GenerationError::malformed(rule, "length out of range"))?;
            Ok(GeneratorFn::new("sentence", move || {
                rng.with(|rng| primitives::text_up_to(length, rng))
            }))
        }
        [n] => Err(GenerationError::malformed(
            rule,
            format!("length must be positive, got {n}"),
        )),
        _ => Err(GenerationError::malformed(
            rule,
            "sentence takes at most one argument",
        )),
    }
}
