//! User-facing text, rendered from Fluent resources embedded in the binary.

use anyhow::{anyhow, Result};
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource, FluentValue};
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::warn;
use unic_langid::LanguageIdentifier;

pub const DEFAULT_LANGUAGE: &str = "en";

const RESOURCES: &[(&str, &str)] = &[
    ("en", include_str!("../locales/en/main.ftl")),
    ("fr", include_str!("../locales/fr/main.ftl")),
];

static LOCALIZATION_MANAGER: LazyLock<LocalizationManager> =
    LazyLock::new(|| LocalizationManager::load().0);

/// Localization manager holding one bundle per supported language
pub struct LocalizationManager {
    bundles: HashMap<String, FluentBundle<FluentResource>>,
}

impl LocalizationManager {
    /// Build all bundles, failing on any resource problem
    pub fn new() -> Result<Self> {
        let (manager, problems) = Self::load();
        if problems.is_empty() {
            Ok(manager)
        } else {
            Err(anyhow!("Invalid localization resources: {}", problems.join("; ")))
        }
    }

    /// Build all bundles, collecting problems instead of failing
    fn load() -> (Self, Vec<String>) {
        let mut bundles = HashMap::new();
        let mut problems = Vec::new();

        for (language, source) in RESOURCES {
            let locale: LanguageIdentifier = match language.parse() {
                Ok(locale) => locale,
                Err(e) => {
                    problems.push(format!("{language}: {e}"));
                    continue;
                }
            };

            let mut bundle = FluentBundle::new_concurrent(vec![locale]);
            // Placeables are rendered without Unicode isolation marks so replies stay plain text
            bundle.set_use_isolating(false);

            let resource = match FluentResource::try_new(source.to_string()) {
                Ok(resource) => resource,
                Err((partial, errors)) => {
                    problems.push(format!("{language}: {} parse errors", errors.len()));
                    partial
                }
            };
            if let Err(errors) = bundle.add_resource(resource) {
                problems.push(format!("{language}: {} duplicate messages", errors.len()));
            }

            bundles.insert(language.to_string(), bundle);
        }

        (Self { bundles }, problems)
    }

    pub fn is_language_supported(&self, language: &str) -> bool {
        self.bundles.contains_key(language)
    }

    /// Get a localized message, falling back to English for unknown languages
    pub fn get_message_in_language(
        &self,
        key: &str,
        language: &str,
        args: Option<&HashMap<&str, &str>>,
    ) -> String {
        let bundle = match self
            .bundles
            .get(language)
            .or_else(|| self.bundles.get(DEFAULT_LANGUAGE))
        {
            Some(bundle) => bundle,
            None => return format!("Missing translation: {key}"),
        };

        let pattern = match bundle.get_message(key).and_then(|msg| msg.value()) {
            Some(pattern) => pattern,
            None => return format!("Missing translation: {key}"),
        };

        let fluent_args = args.map(|args| {
            let mut fluent_args = FluentArgs::new();
            for (name, value) in args {
                fluent_args.set(*name, FluentValue::from(*value));
            }
            fluent_args
        });

        let mut errors = vec![];
        let value = bundle.format_pattern(pattern, fluent_args.as_ref(), &mut errors);
        if !errors.is_empty() {
            warn!(key = %key, language = %language, errors = ?errors, "Localization formatting errors");
        }
        value.into_owned()
    }
}

/// Validate the embedded resources at startup
pub fn init_localization() -> Result<()> {
    LocalizationManager::new().map(|_| ())
}

pub fn get_localization_manager() -> &'static LocalizationManager {
    &LOCALIZATION_MANAGER
}

/// Map a Telegram language code ("fr-FR", "en") to a supported language
pub fn detect_language(language_code: Option<&str>) -> &'static str {
    let primary = language_code
        .and_then(|code| code.split(['-', '_']).next())
        .map(str::to_lowercase);

    match primary.as_deref() {
        Some("fr") => "fr",
        _ => DEFAULT_LANGUAGE,
    }
}

/// Localized message for the user's language code
pub fn t_lang(key: &str, language_code: Option<&str>) -> String {
    get_localization_manager().get_message_in_language(key, detect_language(language_code), None)
}

/// Localized message with arguments for the user's language code
pub fn t_args_lang(key: &str, args: &[(&str, &str)], language_code: Option<&str>) -> String {
    let args_map: HashMap<&str, &str> = args.iter().cloned().collect();
    get_localization_manager().get_message_in_language(
        key,
        detect_language(language_code),
        Some(&args_map),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_resources_are_valid() {
        assert!(init_localization().is_ok());
    }

    #[test]
    fn test_language_detection() {
        assert_eq!(detect_language(Some("fr")), "fr");
        assert_eq!(detect_language(Some("fr-FR")), "fr");
        assert_eq!(detect_language(Some("en-US")), "en");
        assert_eq!(detect_language(Some("de")), "en");
        assert_eq!(detect_language(None), "en");
    }

    #[test]
    fn test_arguments_render_without_isolation_marks() {
        let confirmation = t_args_lang("subject-set", &[("subject", "Physics")], None);
        assert!(confirmation.starts_with("Subject set to Physics."));
    }
}
