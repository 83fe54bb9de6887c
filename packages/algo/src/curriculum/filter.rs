//! 学习目标路径规则
//!
//! 每个 [`Goal`] 对应一组结构化的筛选谓词（关键词 / 包含 / 排除 / 必修）。

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 学习目标（职业方向）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Goal {
    Frontend,
    Backend,
    Fullstack,
    Devops,
    DataScience,
    InterviewPrep,
}

impl Goal {
    pub const ALL: [Goal; 6] = [
        Goal::Frontend,
        Goal::Backend,
        Goal::Fullstack,
        Goal::Devops,
        Goal::DataScience,
        Goal::InterviewPrep,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::Frontend => "frontend",
            Goal::Backend => "backend",
            Goal::Fullstack => "fullstack",
            Goal::Devops => "devops",
            Goal::DataScience => "data-science",
            Goal::InterviewPrep => "interview-prep",
        }
    }

    /// Unknown identifiers yield `None`.
    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|goal| goal.as_str() == id)
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Predicate over a node slug
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlugPattern {
    Contains(String),
    Exact(String),
}

impl SlugPattern {
    pub fn contains(fragment: &str) -> Self {
        SlugPattern::Contains(fragment.to_string())
    }

    pub fn exact(slug: &str) -> Self {
        SlugPattern::Exact(slug.to_string())
    }

    pub fn matches(&self, slug: &str) -> bool {
        match self {
            SlugPattern::Contains(fragment) => slug.contains(fragment.as_str()),
            SlugPattern::Exact(expected) => slug == expected,
        }
    }
}

/// 某个学习目标的筛选规则
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathRule {
    pub keywords: Vec<SlugPattern>,
    pub include: Vec<String>,
    pub exclude: Vec<SlugPattern>,
    pub must_have: Vec<String>,
}

/// Outcome of evaluating a rule against a single slug
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Excluded,
    Listed,
    KeywordMatch,
    NoMatch,
}

impl Verdict {
    pub fn keeps(self) -> bool {
        matches!(self, Verdict::Listed | Verdict::KeywordMatch)
    }
}

impl PathRule {
    pub fn keywords(mut self, fragments: &[&str]) -> Self {
        self.keywords
            .extend(fragments.iter().map(|f| SlugPattern::contains(f)));
        self
    }

    pub fn include(mut self, slugs: &[&str]) -> Self {
        self.include.extend(slugs.iter().map(|s| s.to_string()));
        self
    }

    pub fn exclude(mut self, fragments: &[&str]) -> Self {
        self.exclude
            .extend(fragments.iter().map(|f| SlugPattern::contains(f)));
        self
    }

    pub fn must_have(mut self, slugs: &[&str]) -> Self {
        self.must_have.extend(slugs.iter().map(|s| s.to_string()));
        self
    }

    /// 规则优先级：排除 > 包含/必修 > 关键词 > 丢弃
    pub fn evaluate(&self, slug: &str) -> Verdict {
        if self.exclude.iter().any(|p| p.matches(slug)) {
            Verdict::Excluded
        } else if self.include.iter().any(|s| s == slug) || self.must_have.iter().any(|s| s == slug)
        {
            Verdict::Listed
        } else if self.keywords.iter().any(|p| p.matches(slug)) {
            Verdict::KeywordMatch
        } else {
            Verdict::NoMatch
        }
    }
}

/// Goal → rule table
#[derive(Clone, Debug, Default)]
pub struct PathFilter {
    rules: HashMap<Goal, PathRule>,
}

impl PathFilter {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, goal: Goal, rule: PathRule) -> Self {
        self.rules.insert(goal, rule);
        self
    }

    pub fn rule(&self, goal: Goal) -> Option<&PathRule> {
        self.rules.get(&goal)
    }

    /// 内置规则表，每个目标一组
    pub fn builtin() -> Self {
        Self::empty()
            .with_rule(
                Goal::Frontend,
                PathRule::default()
                    .keywords(&["html", "css", "script", "react"])
                    .include(&["git", "testing"])
                    .exclude(&["machine", "kubernetes"])
                    .must_have(&["programming-fundamentals", "javascript"]),
            )
            .with_rule(
                Goal::Backend,
                PathRule::default()
                    .keywords(&["node", "sql", "database", "api", "python"])
                    .include(&["git", "testing", "linux", "security", "docker"])
                    .exclude(&["react", "css", "machine"])
                    .must_have(&["programming-fundamentals", "databases"]),
            )
            .with_rule(
                Goal::Fullstack,
                PathRule::default()
                    .keywords(&["html", "css", "script", "react", "node", "sql", "database", "api"])
                    .include(&["git", "testing", "docker"])
                    .exclude(&["machine", "statistics"])
                    .must_have(&["programming-fundamentals", "javascript", "databases"]),
            )
            .with_rule(
                Goal::Devops,
                PathRule::default()
                    .keywords(&["linux", "network", "docker", "kubernetes", "cloud"])
                    .include(&["git", "security"])
                    .exclude(&["react", "css", "html", "machine"])
                    .must_have(&["linux", "docker"]),
            )
            .with_rule(
                Goal::DataScience,
                PathRule::default()
                    .keywords(&["python", "statistics", "machine", "sql"])
                    .include(&["git", "data-structures"])
                    .exclude(&["react", "css", "html", "kubernetes"])
                    .must_have(&["programming-fundamentals", "python"]),
            )
            .with_rule(
                Goal::InterviewPrep,
                PathRule::default()
                    .keywords(&["algorithm", "data-structure", "system-design"])
                    .include(&["databases", "networking"])
                    .exclude(&["css", "html"])
                    .must_have(&["data-structures", "algorithms"]),
            )
    }
}
