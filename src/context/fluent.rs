use std::fmt;

use fluent_bundle::{
    FluentArgs,
    FluentBundle,
    FluentError,
    FluentResource,
    FluentValue,
};
use serde_json::Value;

use super::{
    ContextOptions,
    MessageContext,
};
use crate::error::FormatError;
use crate::types::{
    L10nArgs,
    LanguageTag,
};

/// A [`MessageContext`] backed by a `FluentBundle`.
pub struct FluentContext {
    lang: LanguageTag,
    bundle: FluentBundle<FluentResource>,
}

impl fmt::Debug for FluentContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FluentContext").field("lang", &self.lang).finish_non_exhaustive()
    }
}

/// Name of the host platform as seen by the `OS()` message function.
#[must_use]
pub fn os_name() -> &'static str {
    match std::env::consts::OS {
        "windows" => "win",
        "linux" => "lin",
        "macos" => "mac",
        "android" => "android",
        _ => "other",
    }
}

fn to_fluent_args(args: &L10nArgs) -> FluentArgs<'_> {
    let mut fluent_args = FluentArgs::new();
    for (name, value) in args {
        let value = match value {
            Value::String(s) => FluentValue::from(s.as_str()),
            Value::Number(n) => n.as_f64().map_or(FluentValue::None, FluentValue::from),
            Value::Null => FluentValue::None,
            other => FluentValue::from(other.to_string()),
        };
        fluent_args.set(name.as_str(), value);
    }
    fluent_args
}

fn resolver_errors(id: &str, errors: Vec<FluentError>) -> impl Iterator<Item = FormatError> + '_ {
    errors.into_iter().map(move |err| FormatError::Resolver { id: id.to_string(), message: err.to_string() })
}

impl MessageContext for FluentContext {
    fn create(lang: &LanguageTag, options: &ContextOptions) -> Self {
        let mut bundle = FluentBundle::new(vec![lang.langid()]);
        bundle.set_use_isolating(options.use_isolating);
        if let Err(err) = bundle.add_function("OS", |_, _| FluentValue::from(os_name())) {
            tracing::warn!(%lang, %err, "Failed to register OS()");
        }
        Self { lang: lang.clone(), bundle }
    }

    fn lang(&self) -> &LanguageTag {
        &self.lang
    }

    fn add_messages(&mut self, source: &str, overriding: bool) -> Vec<FormatError> {
        let mut errors = Vec::new();
        let resource = match FluentResource::try_new(source.to_string()) {
            Ok(resource) => resource,
            Err((resource, parse_errors)) => {
                errors.extend(
                    parse_errors.into_iter().map(|err| FormatError::Parse { message: err.to_string() }),
                );
                resource
            }
        };

        if overriding {
            self.bundle.add_resource_overriding(resource);
        } else if let Err(add_errors) = self.bundle.add_resource(resource) {
            errors.extend(
                add_errors.into_iter().map(|err| FormatError::Resource { message: err.to_string() }),
            );
        }
        errors
    }

    fn has_message(&self, id: &str) -> bool {
        self.bundle.has_message(id)
    }

    fn format_to_primitive(
        &self,
        id: &str,
        args: Option<&L10nArgs>,
    ) -> Option<(Option<String>, Vec<FormatError>)> {
        let message = self.bundle.get_message(id)?;
        let Some(pattern) = message.value() else {
            return Some((None, Vec::new()));
        };

        let fluent_args = args.map(to_fluent_args);
        let mut errors = Vec::new();
        let value = self.bundle.format_pattern(pattern, fluent_args.as_ref(), &mut errors).into_owned();
        Some((Some(value), resolver_errors(id, errors).collect()))
    }

    fn format_traits(&self, id: &str, args: Option<&L10nArgs>) -> (Vec<(String, String)>, Vec<FormatError>) {
        let Some(message) = self.bundle.get_message(id) else {
            return (Vec::new(), Vec::new());
        };

        let fluent_args = args.map(to_fluent_args);
        let mut traits = Vec::new();
        let mut all_errors = Vec::new();
        for attr in message.attributes() {
            let mut errors = Vec::new();
            let value =
                self.bundle.format_pattern(attr.value(), fluent_args.as_ref(), &mut errors).into_owned();
            all_errors.extend(resolver_errors(id, errors));
            traits.push((attr.id().to_string(), value));
        }
        (traits, all_errors)
    }
}
