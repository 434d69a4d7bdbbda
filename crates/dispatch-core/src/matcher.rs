//! Rule matching - decide which routing rules apply to a task
//!
//! A linear scan over the enabled rules with case-folded substring
//! matching. Raw matches are filtered to the highest priority present;
//! ties are all retained in rule-file order. When nothing matches, the
//! `general-chat` rule is the designated catch-all.

use crate::catalog::Catalog;
use crate::rules::{MatchType, Rule, RuleSet, FALLBACK_RULE_ID};

/// Built-in capability vocabulary
///
/// Maps a capability name to the task keywords that imply it.
const CAPABILITIES: &[(&str, &[&str])] = &[
    (
        "code",
        &["code", "代码", "编程", "programming", "debug", "compile"],
    ),
    ("write", &["write", "draft", "写作", "文章", "essay"]),
    ("summarize", &["summarize", "summary", "总结", "摘要", "tldr"]),
    ("translate", &["translate", "翻译", "translation"]),
    ("chat", &["chat", "聊天", "talk", "converse"]),
    ("search", &["search", "搜索", "find", "lookup"]),
];

/// Keywords implied by a capability, if the capability is known
pub fn capability_keywords(capability: &str) -> Option<&'static [&'static str]> {
    CAPABILITIES
        .iter()
        .find(|(name, _)| *name == capability)
        .map(|(_, keywords)| *keywords)
}

/// True when any keyword is a case-folded substring of the task
fn contains_any<S: AsRef<str>>(task_folded: &str, keywords: &[S]) -> bool {
    keywords.iter().any(|k| {
        let keyword = k.as_ref().to_lowercase();
        !keyword.is_empty() && task_folded.contains(&keyword)
    })
}

/// True when the task hits any keyword of any listed capability
fn matches_capabilities(task_folded: &str, capabilities: &[String]) -> bool {
    capabilities.iter().any(|cap| {
        capability_keywords(cap)
            .map(|keywords| contains_any(task_folded, keywords))
            .unwrap_or(false)
    })
}

/// Decide whether a single rule applies to the task
pub fn rule_matches(task: &str, rule: &Rule, catalog: &Catalog) -> bool {
    let task_folded = task.to_lowercase();
    let spec = &rule.match_spec;

    match spec.match_type {
        MatchType::Keyword | MatchType::KeywordExact => {
            contains_any(&task_folded, &spec.keywords)
        }
        MatchType::KeywordOrCapability => {
            // Keyword hit short-circuits; capabilities are the backstop
            contains_any(&task_folded, &spec.keywords)
                || matches_capabilities(&task_folded, &spec.capabilities)
        }
        MatchType::Capability => matches_capabilities(&task_folded, &spec.capabilities),
        // TODO: category rules match on catalog metadata and never look at
        // the task text; confirm that is intended before changing it
        MatchType::Category => catalog
            .tools
            .iter()
            .any(|t| spec.categories.contains(&t.category)),
        MatchType::Any => true,
    }
}

/// Match a task against all enabled rules
///
/// Returns the matching rules filtered to the single highest priority
/// value present. Falls back to the `general-chat` rule when nothing
/// matches; an empty result means no fallback is configured either.
pub fn match_rules<'a>(task: &str, rules: &'a RuleSet, catalog: &Catalog) -> Vec<&'a Rule> {
    let mut matched: Vec<&Rule> = rules
        .enabled()
        .filter(|rule| rule_matches(task, rule, catalog))
        .collect();

    if matched.is_empty() {
        if let Some(fallback) = rules.get(FALLBACK_RULE_ID).filter(|r| r.enabled) {
            matched.push(fallback);
        }
    }

    if let Some(top) = matched.iter().map(|r| r.priority).max() {
        matched.retain(|r| r.priority == top);
    }

    tracing::debug!(task, matched = matched.len(), "rule match complete");
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{MatchSpec, Recommend};

    fn keyword_rule(id: &str, priority: i32, keywords: &[&str]) -> Rule {
        Rule {
            id: id.to_string(),
            name: id.to_string(),
            priority,
            enabled: true,
            match_spec: MatchSpec {
                match_type: MatchType::Keyword,
                keywords: keywords.iter().map(|s| s.to_string()).collect(),
                capabilities: vec![],
                categories: vec![],
            },
            recommend: Recommend {
                tools: vec!["aichat".into()],
                fallback: None,
                reason_template: None,
            },
        }
    }

    fn rule_set(rules: Vec<Rule>) -> RuleSet {
        RuleSet { rules }
    }

    #[test]
    fn test_keyword_match() {
        let catalog = Catalog::builtin();
        let rules = rule_set(vec![keyword_rule("summarize", 10, &["summarize", "总结"])]);

        let matched = match_rules("please summarize this report", &rules, &catalog);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, "summarize");
    }

    #[test]
    fn test_keyword_match_is_case_folded() {
        let catalog = Catalog::builtin();
        let rules = rule_set(vec![keyword_rule("summarize", 10, &["summarize"])]);

        let matched = match_rules("SUMMARIZE the minutes", &rules, &catalog);
        assert_eq!(matched.len(), 1);
    }

    #[test]
    fn test_chinese_keyword_match() {
        let catalog = Catalog::builtin();
        let rules = rule_set(vec![keyword_rule("summarize", 10, &["总结", "summarize"])]);

        let matched = match_rules("总结这段文字", &rules, &catalog);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, "summarize");
    }

    #[test]
    fn test_only_highest_priority_retained() {
        let catalog = Catalog::builtin();
        let rules = rule_set(vec![
            keyword_rule("low", 5, &["report"]),
            keyword_rule("high", 20, &["report"]),
            keyword_rule("also-high", 20, &["summarize"]),
        ]);

        let matched = match_rules("summarize the report", &rules, &catalog);
        let ids: Vec<&str> = matched.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["high", "also-high"]);
    }

    #[test]
    fn test_fallback_to_general_chat() {
        let catalog = Catalog::builtin();
        // A fallback rule that would not match on its own keywords still
        // gets picked up by id when the scan comes back empty
        let fallback = keyword_rule(FALLBACK_RULE_ID, 0, &["chat"]);
        let rules = rule_set(vec![keyword_rule("summarize", 10, &["summarize"]), fallback]);

        let matched = match_rules("hello there", &rules, &catalog);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, FALLBACK_RULE_ID);
    }

    #[test]
    fn test_no_match_and_no_fallback_is_empty() {
        let catalog = Catalog::builtin();
        let rules = rule_set(vec![keyword_rule("summarize", 10, &["summarize"])]);

        let matched = match_rules("hello", &rules, &catalog);
        assert!(matched.is_empty());
    }

    #[test]
    fn test_any_matches_everything() {
        let catalog = Catalog::builtin();
        let mut rule = keyword_rule("catch-all", 1, &[]);
        rule.match_spec.match_type = MatchType::Any;
        let rules = rule_set(vec![rule]);

        for task in ["hello", "总结这段文字", "x"] {
            assert_eq!(match_rules(task, &rules, &catalog).len(), 1);
        }
    }

    #[test]
    fn test_capability_match() {
        let catalog = Catalog::builtin();
        let mut rule = keyword_rule("coding", 10, &[]);
        rule.match_spec.match_type = MatchType::Capability;
        rule.match_spec.capabilities = vec!["code".into()];
        let rules = rule_set(vec![rule]);

        assert_eq!(match_rules("帮我写代码", &rules, &catalog).len(), 1);
        assert_eq!(match_rules("fix this programming bug", &rules, &catalog).len(), 1);
        assert!(match_rules("make me a sandwich", &rules, &catalog).is_empty());
    }

    #[test]
    fn test_keyword_or_capability_uses_both() {
        let catalog = Catalog::builtin();
        let mut rule = keyword_rule("coding", 10, &["refactor"]);
        rule.match_spec.match_type = MatchType::KeywordOrCapability;
        rule.match_spec.capabilities = vec!["code".into()];
        let rules = rule_set(vec![rule]);

        // Keyword path
        assert_eq!(match_rules("refactor the parser", &rules, &catalog).len(), 1);
        // Capability path
        assert_eq!(match_rules("编程问题", &rules, &catalog).len(), 1);
    }

    #[test]
    fn test_category_rule_ignores_task_text() {
        let catalog = Catalog::builtin();
        let mut rule = keyword_rule("local-tools", 5, &[]);
        rule.match_spec.match_type = MatchType::Category;
        rule.match_spec.categories = vec![crate::catalog::ToolCategory::Local];
        let rules = rule_set(vec![rule]);

        // Matches any task because the catalog carries a local tool
        assert_eq!(match_rules("anything at all", &rules, &catalog).len(), 1);

        // Stops matching once the catalog has no tool in the category
        let empty = Catalog { tools: vec![] };
        assert!(match_rules("anything at all", &rules, &empty).is_empty());
    }

    #[test]
    fn test_disabled_rules_are_skipped() {
        let catalog = Catalog::builtin();
        let mut rule = keyword_rule("summarize", 10, &["summarize"]);
        rule.enabled = false;
        let rules = rule_set(vec![rule]);

        assert!(match_rules("summarize this", &rules, &catalog).is_empty());
    }

    #[test]
    fn test_builtin_rules_route_known_tasks() {
        let catalog = Catalog::builtin();
        let rules = RuleSet::builtin();

        let matched = match_rules("总结这段文字", &rules, &catalog);
        assert_eq!(matched[0].id, "summarize");

        let matched = match_rules("debug the failing build", &rules, &catalog);
        assert_eq!(matched[0].id, "coding");

        let matched = match_rules("what is the capital of France", &rules, &catalog);
        assert_eq!(matched[0].id, FALLBACK_RULE_ID);
    }
}
