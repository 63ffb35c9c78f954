/// Static validation of a template library.
///
/// Expansion never fails loudly, so broken templates only show up as
/// upper-cased keywords in generated text. The lint pass finds them ahead
/// of time.

use rustc_hash::FxHashSet;
use std::collections::HashMap;

use crate::core::library::TemplateLibrary;
use crate::core::wildcard::{scan_wildcards, WildcardExpression, WILDCARD_CLOSE, WILDCARD_OPEN};

#[derive(Debug, Clone, Default)]
pub struct LintReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl LintReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check every template in `library` for problems expansion would hide.
pub fn lint(library: &TemplateLibrary) -> LintReport {
    let mut report = LintReport::default();
    let mut references: HashMap<&str, FxHashSet<String>> = HashMap::new();

    for keyword in library.keywords() {
        let Some(pool) = library.get(keyword) else {
            continue;
        };
        if pool.is_empty() {
            report
                .errors
                .push(format!("Keyword '{}' has no templates", keyword));
            continue;
        }

        let refs = references.entry(keyword).or_default();
        for template in pool.items() {
            let mut scanned_to = 0;
            for wildcard in scan_wildcards(template) {
                scanned_to = wildcard.end;
                match WildcardExpression::parse(wildcard.body) {
                    Ok(expr) => {
                        let Some(target) = library.get(&expr.keyword) else {
                            report.errors.push(format!(
                                "Keyword '{}' references unknown keyword '{}'",
                                keyword, expr.keyword
                            ));
                            continue;
                        };
                        if let Some(count) = expr.count {
                            if !expr.repeat_allowed && count.max() > target.distinct_len() {
                                report.warnings.push(format!(
                                    "Keyword '{}' asks for up to {} of '{}' which has {} distinct templates; repeats will be forced",
                                    keyword,
                                    count.max(),
                                    expr.keyword,
                                    target.distinct_len()
                                ));
                            }
                        }
                        refs.insert(expr.keyword);
                    }
                    Err(e) => report.errors.push(format!(
                        "Keyword '{}' has malformed wildcard '{}{}{}': {}",
                        keyword, WILDCARD_OPEN, wildcard.body, WILDCARD_CLOSE, e
                    )),
                }
            }
            if template[scanned_to..].contains(WILDCARD_OPEN) {
                report.warnings.push(format!(
                    "Keyword '{}' has an unterminated wildcard in '{}'",
                    keyword, template
                ));
            }
        }
    }

    for keyword in library.keywords() {
        if reaches(&references, keyword, keyword) {
            report.warnings.push(format!(
                "Keyword '{}' can expand into itself; only the depth limit stops it",
                keyword
            ));
        }
    }

    report
}

/// True when `target` is reachable from `from` through one or more references.
fn reaches(references: &HashMap<&str, FxHashSet<String>>, from: &str, target: &str) -> bool {
    let mut visited: FxHashSet<&str> = FxHashSet::default();
    let mut stack: Vec<&str> = references
        .get(from)
        .map(|refs| refs.iter().map(String::as_str).collect())
        .unwrap_or_default();

    while let Some(current) = stack.pop() {
        if current == target {
            return true;
        }
        if !visited.insert(current) {
            continue;
        }
        if let Some(next) = references.get(current) {
            stack.extend(next.iter().map(String::as_str));
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::selector::Pool;

    fn lib(ron: &str) -> TemplateLibrary {
        TemplateLibrary::parse_ron(ron).unwrap()
    }

    #[test]
    fn clean_library() {
        let report = lint(&lib(r#"{
            "case": ["A ?{victim} was found with ?{clue|2}."],
            "victim": ["baker", "judge"],
            "clue": ["hair", "ticket", "glove"],
        }"#));
        assert!(report.is_clean(), "{:?}", report.errors);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    }

    #[test]
    fn unknown_reference_is_error() {
        let report = lint(&lib(r#"{ "case": ["?{ghost}"] }"#));
        assert!(!report.is_clean());
        assert!(report.errors[0].contains("ghost"));
    }

    #[test]
    fn empty_pool_is_error() {
        let mut library = TemplateLibrary::new();
        library.insert("void", Pool::Collection(Vec::new()));
        let report = lint(&library);
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn malformed_modifier_is_error() {
        let report = lint(&lib(r#"{ "case": ["?{clue|3-1}"], "clue": ["x"] }"#));
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("?{clue|3-1}"));
    }

    #[test]
    fn forced_repeat_is_warning() {
        let report = lint(&lib(r#"{ "case": ["?{clue|1-4}"], "clue": ["x", "y"] }"#));
        assert!(report.is_clean());
        assert_eq!(report.warnings.len(), 1);

        let report = lint(&lib(r#"{ "case": ["?{clue|3%}"], "clue": ["x", "y"] }"#));
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn unterminated_wildcard_is_warning() {
        let report = lint(&lib(r#"{ "case": ["?{clue} and ?{oops"], "clue": ["x"] }"#));
        assert!(report.is_clean());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("unterminated"));
    }

    #[test]
    fn cycles_are_warnings() {
        let report = lint(&lib(r#"{
            "self": ["?{self}"],
            "ping": ["?{pong}"],
            "pong": ["?{ping}"],
            "leaf": ["done"],
        }"#));
        assert!(report.is_clean());
        assert_eq!(report.warnings.len(), 3);
    }
}
