use tracing::warn;

/// Locales that ship with the binary
pub const AVAILABLE_LOCALES: [&str; 1] = ["en"];

/// Reduce a locale tag such as `en-US` or `en_GB` to its language part
pub fn normalize_locale(locale: &str) -> String {
    locale
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

/// Set the message locale, falling back to English when it is not bundled
pub fn set_locale(locale: &str) {
    let normalized = normalize_locale(locale);
    if AVAILABLE_LOCALES.contains(&normalized.as_str()) {
        rust_i18n::set_locale(&normalized);
    } else {
        warn!("Locale {} is not available, falling back to en", locale);
        rust_i18n::set_locale("en");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_locale() {
        assert_eq!(normalize_locale("en"), "en");
        assert_eq!(normalize_locale("en-US"), "en");
        assert_eq!(normalize_locale("EN_gb"), "en");
        assert_eq!(normalize_locale(""), "");
    }
}
