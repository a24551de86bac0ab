//! Companion naming: `render` pairs with `el`, `renderHeader` with `headerEl`.

const RENDER_PREFIX: &str = "render";

/// The companion method name required for `method`, if any.
///
/// Only `render` itself and `render` followed by an uppercase letter take
/// part; `renderx` or `prerender` do not.
pub fn companion_name(method: &str) -> Option<String> {
    let suffix = method.strip_prefix(RENDER_PREFIX)?;
    let mut chars = suffix.chars();
    let Some(first) = chars.next() else {
        return Some("el".to_string());
    };
    if !first.is_uppercase() {
        return None;
    }
    let mut name: String = first.to_lowercase().collect();
    name.push_str(chars.as_str());
    name.push_str("El");
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_pairs_with_el() {
        assert_eq!(companion_name("render").as_deref(), Some("el"));
    }

    #[test]
    fn suffix_is_lowercased_first() {
        assert_eq!(companion_name("renderHeader").as_deref(), Some("headerEl"));
        assert_eq!(companion_name("renderListItem").as_deref(), Some("listItemEl"));
        assert_eq!(companion_name("renderHTML").as_deref(), Some("hTMLEl"));
        assert_eq!(companion_name("renderÉtat").as_deref(), Some("étatEl"));
    }

    #[test]
    fn other_names_have_no_companion() {
        for name in ["renderx", "render_header", "render2", "prerender", "Render", "el", ""] {
            assert_eq!(companion_name(name), None, "{}", name);
        }
    }
}
