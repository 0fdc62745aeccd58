//! Directive passes: pattern-driven rewrites over the template text.
//!
//! The passes run in a fixed order: conditionals → equality helpers →
//! loops → variables. Each pass replaces the *shortest* matching block, so
//! blocks of the same kind do not nest. A directive without its closing tag
//! never matches and stays in the output as literal text.
//!
//! | Directive   | Form                                                         |
//! |-------------|--------------------------------------------------------------|
//! | Variable    | `{{employee.path}}`, `{{employee.path \| filter:arg}}`        |
//! | Conditional | `{{#if employee.path}}…{{/if}}` (also `unless`, `ifNotEmpty`, `hasContent`) |
//! | Equality    | `{{#ifEquals employee.path "literal"}}…{{/ifEquals}}`        |
//! | Loop        | `{{#each employee.path}}…{{this.prop}}…{{/each}}`            |

use regex::{Captures, Regex};
use serde_json::Value;

use cvtpl_core::value::{has_content, is_truthy, resolve, stringify};

use crate::error::RenderError;
use crate::filters::{apply_filter, format_date_range, Filter, FilterExpr};

/// Path segment characters accepted after `employee.` / `this.`.
const PATH: &str = r"([\w.\-]+)";

// ---------------------------------------------------------------------------
// ConditionKind
// ---------------------------------------------------------------------------

/// The four conditional block forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionKind {
    If,
    Unless,
    IfNotEmpty,
    HasContent,
}

impl ConditionKind {
    /// Evaluation order of the conditional pass.
    pub fn all() -> &'static [ConditionKind] {
        &[
            ConditionKind::If,
            ConditionKind::Unless,
            ConditionKind::IfNotEmpty,
            ConditionKind::HasContent,
        ]
    }

    /// Block helper name as written after `{{#`.
    pub fn keyword(&self) -> &'static str {
        match self {
            ConditionKind::If         => "if",
            ConditionKind::Unless     => "unless",
            ConditionKind::IfNotEmpty => "ifNotEmpty",
            ConditionKind::HasContent => "hasContent",
        }
    }

    /// Whether the block body is kept for `value`.
    pub fn holds(&self, value: Option<&Value>) -> bool {
        match self {
            ConditionKind::If => is_truthy(value),
            ConditionKind::Unless => !is_truthy(value),
            ConditionKind::IfNotEmpty | ConditionKind::HasContent => has_content(value),
        }
    }
}

// ---------------------------------------------------------------------------
// Directives
// ---------------------------------------------------------------------------

/// Compiled directive patterns. Built once per processor, read-only afterwards.
#[derive(Debug, Clone)]
pub struct Directives {
    conditionals: Vec<(ConditionKind, Regex)>,
    equality: Regex,
    each: Regex,
    this_ref: Regex,
    variable: Regex,
}

fn block_pattern(keyword: &str, head_tail: &str) -> String {
    [
        r"(?s)\{\{#",
        keyword,
        r"\s+employee\.",
        PATH,
        head_tail,
        r"\s*\}\}(.*?)\{\{/",
        keyword,
        r"\}\}",
    ]
    .concat()
}

impl Directives {
    /// Compile every directive pattern.
    pub fn new() -> Result<Self, RenderError> {
        let conditionals = ConditionKind::all()
            .iter()
            .map(|kind| Ok((*kind, Regex::new(&block_pattern(kind.keyword(), ""))?)))
            .collect::<Result<Vec<_>, RenderError>>()?;

        let equality = Regex::new(&block_pattern(
            "ifEquals",
            r#"\s+(?:"([^"]*)"|'([^']*)')"#,
        ))?;
        let each = Regex::new(&block_pattern("each", ""))?;
        let this_ref = Regex::new(&[
            r"\{\{\s*this(?:\.",
            PATH,
            r")?\s*(?:\|\s*([^}]*?))?\s*\}\}",
        ]
        .concat())?;
        let variable = Regex::new(&[
            r"\{\{\s*employee\.",
            PATH,
            r"\s*(?:\|\s*([^}]*?))?\s*\}\}",
        ]
        .concat())?;

        Ok(Directives {
            conditionals,
            equality,
            each,
            this_ref,
            variable,
        })
    }

    /// Run all four passes in order.
    pub fn apply(&self, template: &str, record: &Value, date_format: &str) -> String {
        let text = self.conditional_pass(template, record);
        let text = self.equality_pass(&text, record);
        let text = self.loop_pass(&text, record, date_format);
        self.variable_pass(&text, record, date_format)
    }

    /// Keep or drop every `if` / `unless` / `ifNotEmpty` / `hasContent` block.
    pub fn conditional_pass(&self, text: &str, record: &Value) -> String {
        let mut out = text.to_string();
        for (kind, pattern) in &self.conditionals {
            out = pattern
                .replace_all(&out, |caps: &Captures| {
                    let value = resolve(record, &caps[1]);
                    if kind.holds(value) {
                        caps[2].to_string()
                    } else {
                        String::new()
                    }
                })
                .into_owned();
        }
        out
    }

    /// Keep `ifEquals` bodies whose stringified value equals the literal.
    pub fn equality_pass(&self, text: &str, record: &Value) -> String {
        self.equality
            .replace_all(text, |caps: &Captures| {
                let literal = caps
                    .get(2)
                    .or_else(|| caps.get(3))
                    .map_or("", |m| m.as_str());
                if stringify(resolve(record, &caps[1])) == literal {
                    caps[4].to_string()
                } else {
                    String::new()
                }
            })
            .into_owned()
    }

    /// Expand every `each` block once per array element.
    pub fn loop_pass(&self, text: &str, record: &Value, date_format: &str) -> String {
        self.each
            .replace_all(text, |caps: &Captures| {
                let Some(Value::Array(items)) = resolve(record, &caps[1]) else {
                    return String::new();
                };
                let body = &caps[2];
                items
                    .iter()
                    .map(|item| self.instantiate_body(body, item, date_format))
                    .collect::<String>()
            })
            .into_owned()
    }

    /// Resolve `{{this}}` / `{{this.prop}}` / `{{this.prop | f}}` against `item`.
    fn instantiate_body(&self, body: &str, item: &Value, date_format: &str) -> String {
        self.this_ref
            .replace_all(body, |caps: &Captures| {
                let synthesized;
                let value = match caps.get(1).map(|m| m.as_str()) {
                    None => Some(item).filter(|v| !v.is_null()),
                    Some("dateRange") if item.get("dateRange").is_none() => {
                        synthesized = Value::String(
                            format_date_range(Some(item), date_format, Filter::FormatDateRange.name())
                                .unwrap_or_default(),
                        );
                        Some(&synthesized)
                    }
                    Some(path) => resolve(item, path),
                };
                render_value(value, caps.get(2).map(|m| m.as_str()), date_format)
            })
            .into_owned()
    }

    /// Substitute every remaining `{{employee.path}}`.
    pub fn variable_pass(&self, text: &str, record: &Value, date_format: &str) -> String {
        self.variable
            .replace_all(text, |caps: &Captures| {
                render_value(
                    resolve(record, &caps[1]),
                    caps.get(2).map(|m| m.as_str()),
                    date_format,
                )
            })
            .into_owned()
    }
}

fn render_value(value: Option<&Value>, filter: Option<&str>, date_format: &str) -> String {
    match filter.map(str::trim).filter(|f| !f.is_empty()) {
        Some(expr) => {
            let expr = FilterExpr::parse(expr);
            apply_filter(value, &expr.name, &expr.args, date_format)
        }
        None => stringify(value),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FMT: &str = "MMM yyyy";

    fn directives() -> Directives {
        Directives::new().expect("patterns compile")
    }

    #[test]
    fn if_keeps_body_for_truthy_values() {
        let d = directives();
        let tpl = "{{#if employee.bio}}[{{employee.bio}}]{{/if}}";
        assert_eq!(d.conditional_pass(tpl, &json!({"bio": "Hi"})), "[{{employee.bio}}]");
        assert_eq!(d.conditional_pass(tpl, &json!({"bio": ""})), "");
        assert_eq!(d.conditional_pass(tpl, &json!({})), "");
    }

    #[test]
    fn unless_inverts_truthiness() {
        let d = directives();
        let tpl = "{{#unless employee.phone}}no phone{{/unless}}";
        assert_eq!(d.conditional_pass(tpl, &json!({})), "no phone");
        assert_eq!(d.conditional_pass(tpl, &json!({"phone": "555"})), "");
    }

    #[test]
    fn emptiness_checks_reject_empty_arrays_and_blank_text() {
        let d = directives();
        let tpl = "{{#ifNotEmpty employee.skills}}S{{/ifNotEmpty}}{{#hasContent employee.bio}}B{{/hasContent}}";
        assert_eq!(d.conditional_pass(tpl, &json!({"skills": [], "bio": "  "})), "");
        assert_eq!(d.conditional_pass(tpl, &json!({"skills": ["Go"], "bio": "x"})), "SB");
        // plain `if` treats an empty array as truthy
        let tpl = "{{#if employee.skills}}S{{/if}}";
        assert_eq!(d.conditional_pass(tpl, &json!({"skills": []})), "S");
    }

    #[test]
    fn if_does_not_match_longer_helper_names() {
        let d = directives();
        let tpl = "{{#ifEquals employee.role \"admin\"}}A{{/ifEquals}}";
        assert_eq!(d.conditional_pass(tpl, &json!({"role": "admin"})), tpl);
    }

    #[test]
    fn equality_compares_strings_only() {
        let d = directives();
        let tpl = "{{#ifEquals employee.level \"8\"}}eight{{/ifEquals}}";
        assert_eq!(d.equality_pass(tpl, &json!({"level": 8})), "eight");
        assert_eq!(d.equality_pass(tpl, &json!({"level": "8"})), "eight");
        assert_eq!(d.equality_pass(tpl, &json!({"level": "08"})), "");
        let single = "{{#ifEquals employee.role 'lead'}}L{{/ifEquals}}";
        assert_eq!(d.equality_pass(single, &json!({"role": "lead"})), "L");
    }

    #[test]
    fn equality_with_missing_path_matches_empty_literal() {
        let d = directives();
        let tpl = "{{#ifEquals employee.role \"\"}}none{{/ifEquals}}";
        assert_eq!(d.equality_pass(tpl, &json!({})), "none");
    }

    #[test]
    fn loop_renders_one_instance_per_element() {
        let d = directives();
        let tpl = "{{#each employee.skills}}<li>{{this.name}} ({{this.level | formatProficiency}})</li>{{/each}}";
        let record = json!({"skills": [{"name": "Go", "level": 5}, {"name": "Rust", "level": 9}]});
        assert_eq!(
            d.loop_pass(tpl, &record, FMT),
            "<li>Go (Intermediate)</li><li>Rust (Expert)</li>"
        );
    }

    #[test]
    fn loop_over_non_arrays_renders_nothing() {
        let d = directives();
        let tpl = "a{{#each employee.skills}}x{{/each}}b";
        assert_eq!(d.loop_pass(tpl, &json!({"skills": []}), FMT), "ab");
        assert_eq!(d.loop_pass(tpl, &json!({"skills": "Go"}), FMT), "ab");
        assert_eq!(d.loop_pass(tpl, &json!({}), FMT), "ab");
    }

    #[test]
    fn loop_binds_scalars_to_bare_this() {
        let d = directives();
        let tpl = "{{#each employee.languages}}{{this | uppercase}};{{/each}}";
        assert_eq!(d.loop_pass(tpl, &json!({"languages": ["en", "fr"]}), FMT), "EN;FR;");
    }

    #[test]
    fn loop_synthesizes_date_range() {
        let d = directives();
        let tpl = "{{#each employee.experiences}}{{this.company}}: {{this.dateRange}}|{{/each}}";
        let record = json!({"experiences": [
            {"company": "Acme", "startDate": "2018-02-01", "endDate": "2020-07-01"},
            {"company": "Initech", "startDate": "2020-08-01", "isCurrent": true},
            {"company": "Own", "dateRange": "2010s"}
        ]});
        assert_eq!(
            d.loop_pass(tpl, &record, FMT),
            "Acme: Feb 2018 - Jul 2020|Initech: Aug 2020 - Present|Own: 2010s|"
        );
    }

    #[test]
    fn loop_leaves_outer_references_for_the_variable_pass() {
        let d = directives();
        let tpl = "{{#each employee.skills}}{{employee.firstName}}:{{this.name}} {{/each}}";
        let record = json!({"firstName": "Ann", "skills": [{"name": "Go"}]});
        let looped = d.loop_pass(tpl, &record, FMT);
        assert_eq!(looped, "{{employee.firstName}}:Go ");
        assert_eq!(d.variable_pass(&looped, &record, FMT), "Ann:Go ");
    }

    #[test]
    fn variables_resolve_with_and_without_filters() {
        let d = directives();
        let record = json!({"firstName": "ann", "contact": {"city": "Oslo"}});
        assert_eq!(
            d.variable_pass("{{employee.firstName | capitalize}} in {{ employee.contact.city }}", &record, FMT),
            "Ann in Oslo"
        );
        assert_eq!(d.variable_pass("[{{employee.missing}}]", &record, FMT), "[]");
    }

    #[test]
    fn unclosed_blocks_stay_literal() {
        let d = directives();
        let tpl = "{{#if employee.bio}}never closed";
        assert_eq!(d.apply(tpl, &json!({"bio": "x"}), FMT), tpl);
        let tpl = "{{#each employee.skills}}{{this.name}}";
        assert_eq!(d.apply(tpl, &json!({"skills": [{"name": "Go"}]}), FMT), tpl);
    }
}
