//! Argument definitions: how one token parses, completes, and defaults.
//!
//! Argument behavior is data, not a type hierarchy: parser, completer,
//! default supplier, and per-error-kind message overrides are closures
//! bound to the definition value. Built-in kinds cover single words,
//! integers (optionally bounded), floats, booleans, fixed choices, and the
//! greedy trailing-text kind that swallows the rest of the line.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Number, Value};

use crate::dispatch_error::{ArgumentErrorKind, ParseFailure};
use crate::environment::{Environment, ParsedArgument};

pub type ArgumentParser =
    Arc<dyn Fn(&str, &Environment) -> Result<Value, ParseFailure> + Send + Sync>;
pub type ArgumentCompleter = Arc<dyn Fn(&str, &Environment) -> Vec<String> + Send + Sync>;
pub type DefaultSupplier = Arc<dyn Fn(&Environment) -> Value + Send + Sync>;
pub type FailureMessageRenderer = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Outcome of `parse_into`: a bound argument, or a failure that a
/// configured per-kind message already reported to the invoker.
#[derive(Debug)]
pub enum ParseOutcome {
    Bound(ParsedArgument),
    Recovered,
}

/// Public struct `ArgumentSpec` used across Helm components.
pub struct ArgumentSpec {
    name: String,
    greedy: bool,
    parser: ArgumentParser,
    completer: Option<ArgumentCompleter>,
    default: Option<DefaultSupplier>,
    failure_messages: BTreeMap<ArgumentErrorKind, FailureMessageRenderer>,
}

impl fmt::Debug for ArgumentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentSpec")
            .field("name", &self.name)
            .field("greedy", &self.greedy)
            .field("has_default", &self.default.is_some())
            .finish_non_exhaustive()
    }
}

impl ArgumentSpec {
    /// An argument driven by an arbitrary parser closure.
    pub fn custom(name: impl Into<String>, parser: ArgumentParser) -> Self {
        Self {
            name: name.into(),
            greedy: false,
            parser,
            completer: None,
            default: None,
            failure_messages: BTreeMap::new(),
        }
    }

    /// Any single token, bound verbatim as a string.
    pub fn word(name: impl Into<String>) -> Self {
        Self::custom(
            name,
            Arc::new(|token, _environment| Ok(Value::String(token.to_string()))),
        )
    }

    /// A signed integer token.
    pub fn integer(name: impl Into<String>) -> Self {
        Self::custom(name, integer_parser(None, None))
    }

    /// A signed integer token rejected outside `[min, max]`.
    pub fn integer_in_range(name: impl Into<String>, min: i64, max: i64) -> Self {
        Self::custom(name, integer_parser(Some(min), Some(max)))
    }

    /// A finite floating-point token.
    pub fn float(name: impl Into<String>) -> Self {
        Self::custom(
            name,
            Arc::new(|token, _environment| {
                let parsed: f64 = token.parse().map_err(|_| {
                    ParseFailure::new(
                        ArgumentErrorKind::InvalidFloat,
                        format!("`{token}` is not a number"),
                    )
                })?;
                let number = Number::from_f64(parsed).ok_or_else(|| {
                    ParseFailure::new(
                        ArgumentErrorKind::InvalidFloat,
                        format!("`{token}` is not a finite number"),
                    )
                })?;
                Ok(Value::Number(number))
            }),
        )
    }

    /// `true`/`false` (also `yes`/`no`, `on`/`off`), case-insensitive.
    pub fn boolean(name: impl Into<String>) -> Self {
        let mut spec = Self::custom(
            name,
            Arc::new(|token, _environment| {
                match token.to_ascii_lowercase().as_str() {
                    "true" | "yes" | "on" => Ok(Value::Bool(true)),
                    "false" | "no" | "off" => Ok(Value::Bool(false)),
                    _ => Err(ParseFailure::new(
                        ArgumentErrorKind::InvalidBoolean,
                        format!("`{token}` is not true or false"),
                    )),
                }
            }),
        );
        spec.completer = Some(Arc::new(|_partial, _environment| {
            vec!["false".to_string(), "true".to_string()]
        }));
        spec
    }

    /// One of a fixed set of candidate strings.
    pub fn choice(name: impl Into<String>, choices: &[&str]) -> Self {
        let owned: Vec<String> = choices.iter().map(|choice| choice.to_string()).collect();
        let candidates = owned.clone();
        let mut spec = Self::custom(
            name,
            Arc::new(move |token, _environment| {
                if owned.iter().any(|choice| choice == token) {
                    Ok(Value::String(token.to_string()))
                } else {
                    Err(ParseFailure::new(
                        ArgumentErrorKind::UnknownChoice,
                        format!("`{token}` is not one of: {}", owned.join(", ")),
                    ))
                }
            }),
        );
        spec.completer =
            Some(Arc::new(move |_partial, _environment| candidates.clone()));
        spec
    }

    /// Greedy trailing text: consumes every remaining token, joined by
    /// single spaces, and binds the result verbatim.
    pub fn text(name: impl Into<String>) -> Self {
        let mut spec = Self::word(name);
        spec.greedy = true;
        spec
    }

    pub fn with_completer(mut self, completer: ArgumentCompleter) -> Self {
        self.completer = Some(completer);
        self
    }

    pub fn with_default_value(mut self, value: Value) -> Self {
        self.default = Some(Arc::new(move |_environment| value.clone()));
        self
    }

    pub fn with_default_supplier(mut self, supplier: DefaultSupplier) -> Self {
        self.default = Some(supplier);
        self
    }

    /// Routes failures of `kind` to a user-facing message instead of
    /// aborting dispatch; the renderer receives the original message.
    pub fn on_failure(mut self, kind: ArgumentErrorKind, render: FailureMessageRenderer) -> Self {
        self.failure_messages.insert(kind, render);
        self
    }

    /// Fixed-message variant of `on_failure`.
    pub fn on_failure_message(
        self,
        kind: ArgumentErrorKind,
        message: impl Into<String>,
    ) -> Self {
        let message = message.into();
        self.on_failure(kind, Arc::new(move |_original| message.clone()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_greedy(&self) -> bool {
        self.greedy
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Runs the parser on `token`. Pure: never messages the invoker.
    pub fn parse_token(
        &self,
        token: &str,
        environment: &Environment,
    ) -> Result<Value, ParseFailure> {
        (self.parser)(token, environment)
    }

    /// Parses `token` into a bound argument. A failure whose kind has a
    /// configured message is reported to the invoker and signalled as
    /// `Recovered`; any other failure propagates.
    pub fn parse_into(
        &self,
        token: &str,
        environment: &Environment,
    ) -> Result<ParseOutcome, ParseFailure> {
        match self.parse_token(token, environment) {
            Ok(value) => Ok(ParseOutcome::Bound(ParsedArgument {
                name: self.name.clone(),
                raw: token.to_string(),
                value,
            })),
            Err(failure) => match self.failure_messages.get(&failure.kind) {
                Some(render) => {
                    environment.invoker().send_message(&render(&failure.message));
                    Ok(ParseOutcome::Recovered)
                }
                None => Err(failure),
            },
        }
    }

    /// Completion candidates for a partial token, or `None` when this
    /// argument offers no completions at all (distinct from an empty list).
    pub fn complete(&self, partial: &str, environment: &Environment) -> Option<Vec<String>> {
        self.completer
            .as_ref()
            .map(|completer| completer(partial, environment))
    }

    /// The argument bound when an optional token is absent; `None` when no
    /// default was configured.
    pub fn default_value(&self, environment: &Environment) -> Option<ParsedArgument> {
        let supplier = self.default.as_ref()?;
        let value = supplier(environment);
        Some(ParsedArgument {
            name: self.name.clone(),
            raw: String::new(),
            value,
        })
    }
}

fn integer_parser(min: Option<i64>, max: Option<i64>) -> ArgumentParser {
    Arc::new(move |token, _environment| {
        let parsed: i64 = token.parse().map_err(|_| {
            ParseFailure::new(
                ArgumentErrorKind::InvalidInteger,
                format!("`{token}` is not an integer"),
            )
        })?;
        if let Some(min) = min {
            if parsed < min {
                return Err(ParseFailure::new(
                    ArgumentErrorKind::IntegerOutOfRange,
                    format!("`{token}` is below the minimum of {min}"),
                ));
            }
        }
        if let Some(max) = max {
            if parsed > max {
                return Err(ParseFailure::new(
                    ArgumentErrorKind::IntegerOutOfRange,
                    format!("`{token}` is above the maximum of {max}"),
                ));
            }
        }
        Ok(Value::Number(Number::from(parsed)))
    })
}
