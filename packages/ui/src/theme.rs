//! Light/dark theme, remembered in `localStorage`.

use dioxus::prelude::*;

pub const THEME_STORAGE_KEY: &str = "parkspot-theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Theme> {
        match value {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

pub type ThemeSignal = Signal<Theme>;

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

/// The saved theme, or light when nothing (valid) is stored.
pub fn load_theme_from_storage() -> Theme {
    #[cfg(target_arch = "wasm32")]
    {
        local_storage()
            .and_then(|s| s.get_item(THEME_STORAGE_KEY).ok().flatten())
            .and_then(|v| Theme::parse(&v))
            .unwrap_or_default()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        Theme::default()
    }
}

/// Set `data-theme` on `<html>` and remember the choice.
pub fn apply_theme(theme: Theme) {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(root) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.document_element())
        {
            let _ = root.set_attribute("data-theme", theme.as_str());
        }
        if let Some(storage) = local_storage() {
            let _ = storage.set_item(THEME_STORAGE_KEY, theme.as_str());
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    let _ = theme;
}

/// Provides the [`ThemeSignal`]; the stored choice is applied once mounted.
#[component]
pub fn ThemeProvider(children: Element) -> Element {
    let mut theme = use_signal(Theme::default);
    use_context_provider(|| theme);

    use_effect(move || {
        let saved = load_theme_from_storage();
        apply_theme(saved);
        theme.set(saved);
    });

    rsx! {
        {children}
    }
}

#[component]
pub fn ThemeToggle() -> Element {
    let mut theme = use_context::<ThemeSignal>();
    let next = theme().toggled();
    let (icon, title) = match theme() {
        Theme::Light => ("\u{1F319}", "Switch to dark mode"),
        Theme::Dark => ("\u{2600}\u{FE0F}", "Switch to light mode"),
    };

    rsx! {
        button {
            class: "icon-button",
            title: "{title}",
            onclick: move |_| {
                apply_theme(next);
                theme.set(next);
            },
            "{icon}"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_toggle() {
        assert_eq!(Theme::parse("dark"), Some(Theme::Dark));
        assert_eq!(Theme::parse("sepia"), None);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled().as_str(), "light");
    }
}
