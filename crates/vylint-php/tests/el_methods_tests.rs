//! Integration tests for the render/element pairing rule.
//!
//! Each test runs the rule over a whole PHP file and checks the reported
//! diagnostics and, where a fix applies, the exact fixed content.

use vylint_core::config::RuleConfig;
use vylint_core::diagnostic::{DiagnosticCode, FixMode};
use vylint_core::output::DiagnosticInfo;
use vylint_php::{check_source, fix_source, ElMethodsRule};

/// Diagnostics as `(line, code, message)` triples.
fn messages(source: &str) -> Vec<(u32, DiagnosticCode, String)> {
    let check = check_source(&ElMethodsRule::default(), source, &FixMode::Off).unwrap();
    check
        .diagnostics
        .iter()
        .map(|d| (d.location.line, d.code, d.message.clone()))
        .collect()
}

/// Fix `source` and assert the result is clean.
fn fixed(source: &str) -> String {
    let outcome = fix_source(&ElMethodsRule::default(), source, &FixMode::All).unwrap();
    assert!(outcome.remaining.is_empty(), "remaining: {:?}", outcome.remaining);
    outcome.content
}

// ============================================================================
// Missing companion
// ============================================================================

mod missing_companion {
    use super::*;

    const PUBLIC_RENDER: &str = r#"<?php

use StefanFisk\Vy\Attributes\VyComponent;

class Foo
{
    #[VyComponent]
    public function render(
        ?string $foo = null,
        mixed $children = null,
    ): mixed {
        return $children;
    }
}
"#;

    #[test]
    fn test_ignores_render_without_trigger() {
        let source = r#"<?php

class Foo
{
    public function render(
        ?string $foo = null,
        mixed $children = null,
    ): mixed {
        return $children;
    }
}
"#;
        assert!(messages(source).is_empty());
        let outcome = fix_source(&ElMethodsRule::default(), source, &FixMode::All).unwrap();
        assert!(!outcome.changed());
    }

    #[test]
    fn test_reports_public_render() {
        assert_eq!(
            messages(PUBLIC_RENDER),
            [(
                8,
                DiagnosticCode::RenderWithoutEl,
                "Method \"render\" does not have matching \"el\" method".to_string()
            )]
        );
    }

    #[test]
    fn test_generates_static_el_for_public_render() {
        let expected = r#"<?php

use StefanFisk\Vy\Attributes\VyComponent;

class Foo
{
    #[\StefanFisk\Vy\Attributes\VyElement]
    public static function el(
        ?string $foo = null,
        mixed $children = null,
    ): \StefanFisk\Vy\Element {
        return \StefanFisk\Vy\el(static::class, [
            'foo' => $foo,
            'children' => $children,
        ]);
    }

    #[VyComponent]
    public function render(
        ?string $foo = null,
        mixed $children = null,
    ): mixed {
        return $children;
    }
}
"#;
        assert_eq!(fixed(PUBLIC_RENDER), expected);
    }

    #[test]
    fn test_generates_bound_el_for_private_render() {
        let source = PUBLIC_RENDER.replace("public function render", "private function render");
        let expected = r#"<?php

use StefanFisk\Vy\Attributes\VyComponent;

class Foo
{
    #[\StefanFisk\Vy\Attributes\VyElement]
    private function el(
        ?string $foo = null,
        mixed $children = null,
    ): \StefanFisk\Vy\Element {
        return \StefanFisk\Vy\el($this->render(...), [
            'foo' => $foo,
            'children' => $children,
        ]);
    }

    #[VyComponent]
    private function render(
        ?string $foo = null,
        mixed $children = null,
    ): mixed {
        return $children;
    }
}
"#;
        assert_eq!(fixed(&source), expected);
    }

    #[test]
    fn test_static_render_passes_itself() {
        let source = r#"<?php

use StefanFisk\Vy\Attributes\VyComponent;

final class Icons
{
    public function __construct() {}

    #[VyComponent]
    protected static function renderIcon(string $name): string
    {
        return $name;
    }
}
"#;
        let expected = r#"<?php

use StefanFisk\Vy\Attributes\VyComponent;

final class Icons
{
    public function __construct() {}

    #[\StefanFisk\Vy\Attributes\VyElement]
    protected static function iconEl(string $name): \StefanFisk\Vy\Element {
        return \StefanFisk\Vy\el(static::renderIcon(...), [
            'name' => $name,
        ]);
    }

    #[VyComponent]
    protected static function renderIcon(string $name): string
    {
        return $name;
    }
}
"#;
        assert_eq!(fixed(source), expected);
    }

    #[test]
    fn test_single_line_class() {
        let source = "<?php class Foo { #[\\StefanFisk\\Vy\\Attributes\\VyComponent] public function render(?string $foo = null): mixed { return $foo; } }";
        assert_eq!(
            messages(source),
            [(
                1,
                DiagnosticCode::RenderWithoutEl,
                "Method \"render\" does not have matching \"el\" method".to_string()
            )]
        );

        let content = fixed(source);
        let el = content
            .find("public static function el(?string $foo = null): \\StefanFisk\\Vy\\Element {")
            .unwrap();
        let render = content.find("public function render").unwrap();
        assert!(el < render);
        assert!(content.contains("return \\StefanFisk\\Vy\\el(static::class, ["));
        assert!(content.contains("'foo' => $foo,"));
    }
}

// ============================================================================
// Mismatched companion
// ============================================================================

mod mismatched_companion {
    use super::*;

    const MISMATCHED: &str = r#"<?php

use StefanFisk\Vy\Attributes\VyComponent;
use StefanFisk\Vy\Attributes\VyElement;

class Foo
{
    #[VyElement]
    public static function el(
        ?string $foo = null,
    ): \StefanFisk\Vy\Element {
        return \StefanFisk\Vy\el(static::class, [
            'foo' => $foo,
        ]);
    }

    #[VyComponent]
    public function render(
        ?string $bar = null,
    ): mixed {
        return $bar;
    }
}
"#;

    #[test]
    fn test_reports_at_companion() {
        assert_eq!(
            messages(MISMATCHED),
            [(
                9,
                DiagnosticCode::RenderElParamsMismatch,
                "Parameters of \"el()\" do not match parameters of \"render()\"".to_string()
            )]
        );
    }

    #[test]
    fn test_rewrites_parameters_and_body() {
        let expected = r#"<?php

use StefanFisk\Vy\Attributes\VyComponent;
use StefanFisk\Vy\Attributes\VyElement;

class Foo
{
    #[VyElement]
    public static function el(
        ?string $bar = null,
    ): \StefanFisk\Vy\Element {
        return \StefanFisk\Vy\el(static::class, [
            'bar' => $bar,
        ]);
    }

    #[VyComponent]
    public function render(
        ?string $bar = null,
    ): mixed {
        return $bar;
    }
}
"#;
        let outcome = fix_source(&ElMethodsRule::default(), MISMATCHED, &FixMode::All).unwrap();
        assert_eq!(outcome.passes, 1);
        assert_eq!(outcome.content, expected);
        assert!(outcome.remaining.is_empty());
    }

    #[test]
    fn test_whitespace_difference_is_a_mismatch() {
        let source = r#"<?php
use StefanFisk\Vy\Attributes\VyComponent;
class Foo
{
    public static function el(int  $a) {}

    #[VyComponent]
    public function render(int $a) {}
}
"#;
        let found = messages(source);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].1, DiagnosticCode::RenderElParamsMismatch);
    }

    #[test]
    fn test_companion_lookup_is_case_insensitive() {
        let source = r#"<?php
use StefanFisk\Vy\Attributes\VyComponent;
class Foo
{
    public static function HeaderEl(int $a) {}

    #[VyComponent]
    public function renderHeader(int $a) {}
}
"#;
        assert!(messages(source).is_empty());
    }
}

// ============================================================================
// Naming and attribute resolution
// ============================================================================

mod applicability {
    use super::*;

    fn component(attribute: &str, imports: &str, method: &str) -> String {
        format!(
            "<?php\n{imports}\nclass Foo\n{{\n    #[{attribute}]\n    public function {method}() {{}}\n}}\n"
        )
    }

    #[test]
    fn test_lowercase_suffix_is_ignored() {
        let source = component(
            "VyComponent",
            "use StefanFisk\\Vy\\Attributes\\VyComponent;",
            "renderx",
        );
        assert!(messages(&source).is_empty());
    }

    #[test]
    fn test_suffix_derives_companion_name() {
        let source = component(
            "VyComponent",
            "use StefanFisk\\Vy\\Attributes\\VyComponent;",
            "renderHeader",
        );
        let found = messages(&source);
        assert_eq!(
            found[0].2,
            "Method \"renderHeader\" does not have matching \"headerEl\" method"
        );
    }

    #[test]
    fn test_aliased_trigger() {
        let source = component(
            "Component",
            "use StefanFisk\\Vy\\Attributes\\VyComponent as Component;",
            "render",
        );
        assert_eq!(messages(&source).len(), 1);
    }

    #[test]
    fn test_trigger_resolved_against_namespace() {
        let source = component("VyComponent", "namespace StefanFisk\\Vy\\Attributes;", "render");
        assert_eq!(messages(&source).len(), 1);
    }

    #[test]
    fn test_fully_qualified_trigger() {
        let source = component("\\StefanFisk\\Vy\\Attributes\\VyComponent", "", "render");
        assert_eq!(messages(&source).len(), 1);
    }

    #[test]
    fn test_same_short_name_elsewhere_is_not_the_trigger() {
        let source = component("VyComponent", "use App\\Attributes\\VyComponent;", "render");
        assert!(messages(&source).is_empty());
    }

    #[test]
    fn test_trigger_inside_attribute_group() {
        let source = component(
            "Deprecated, VyComponent",
            "use StefanFisk\\Vy\\Attributes\\VyComponent;",
            "render",
        );
        assert_eq!(messages(&source).len(), 1);
    }

    #[test]
    fn test_configured_trigger() {
        let config = RuleConfig {
            trigger_attribute: "App\\Component".to_string(),
            ..RuleConfig::default()
        };
        let rule = ElMethodsRule::new(config);
        let source = component("Component", "use App\\Component;", "render");
        let check = check_source(&rule, &source, &FixMode::Off).unwrap();
        assert_eq!(check.diagnostics.len(), 1);
        assert!(messages(&source).is_empty());
    }
}

// ============================================================================
// Fix behaviour
// ============================================================================

mod fixing {
    use super::*;

    #[test]
    fn test_fixed_file_is_clean_on_rerun() {
        let source = r#"<?php
namespace App\View;

use StefanFisk\Vy\Attributes\VyComponent;

class Page
{
    #[VyComponent]
    public function render(string $title, array $items = []) {}

    #[VyComponent]
    private function renderItem(string $label) {}

    #[VyComponent]
    public static function renderFooter() {}
}
"#;
        let once = fixed(source);
        assert!(messages(&once).is_empty());
        assert_eq!(fixed(&once), once);
        assert!(once.contains("public static function el(string $title, array $items = [])"));
        assert!(once.contains("private function itemEl(string $label)"));
        assert!(once.contains("public static function footerEl()"));
    }

    #[test]
    fn test_diagnostics_serialize_for_output() {
        let source = "<?php\nuse StefanFisk\\Vy\\Attributes\\VyComponent;\nclass A\n{\n    #[VyComponent]\n    public function render() {}\n}\n";
        let check = check_source(&ElMethodsRule::default(), source, &FixMode::Off).unwrap();
        let info = DiagnosticInfo::from(&check.diagnostics[0]);
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["code"], "RenderWithoutEl");
        assert_eq!(json["severity"], "error");
        assert_eq!(json["line"], 6);
        assert_eq!(json["fixable"], true);
    }
}
