//! 个性化学习路径
//!
//! 组合 [`DependencyGraph`] 与 [`PathFilter`]，从完整的课程目录生成
//! 针对某个学习目标、按依赖顺序排列的节点序列：
//!
//! 1. 按目标规则筛选（排除 > 包含/必修 > 关键词 > 丢弃）
//! 2. 补回筛选结果中缺失的必修节点（从完整目录取）
//! 3. 三色 DFS 拓扑排序：前置节点总在依赖它的节点之前；遇到环时跳过回边，不会死循环
//!
//! 无 I/O，对相同输入输出顺序稳定。

pub mod filter;
pub mod graph;

use std::collections::HashMap;

pub use filter::{Goal, PathFilter, PathRule, SlugPattern, Verdict};
pub use graph::{DependencyGraph, GraphError};

use crate::types::Node;

/// DFS 访问标记
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

#[derive(Clone, Debug)]
pub struct CurriculumScheduler {
    graph: DependencyGraph,
    filter: PathFilter,
}

impl Default for CurriculumScheduler {
    fn default() -> Self {
        Self::new(DependencyGraph::builtin(), PathFilter::builtin())
    }
}

impl CurriculumScheduler {
    pub fn new(graph: DependencyGraph, filter: PathFilter) -> Self {
        Self { graph, filter }
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn filter(&self) -> &PathFilter {
        &self.filter
    }

    /// 按字符串目标 ID 生成路径；缺省或未知 ID 时不做筛选
    pub fn generate_path_for_id(&self, catalog: &[Node], goal_id: Option<&str>) -> Vec<Node> {
        self.generate_path(catalog, goal_id.and_then(Goal::parse))
    }

    /// 生成学习路径
    ///
    /// `goal` 为 `None` 或该目标没有规则时，返回按依赖排序的完整目录。
    pub fn generate_path(&self, catalog: &[Node], goal: Option<Goal>) -> Vec<Node> {
        let selected = match goal.and_then(|g| self.filter.rule(g)) {
            Some(rule) => Self::apply_rule(catalog, rule),
            None => catalog.iter().collect(),
        };

        self.sort_by_dependencies(&selected)
            .into_iter()
            .cloned()
            .collect()
    }

    /// 筛选 + 补回必修节点
    ///
    /// 必修节点在排除之后注入：一个被排除模式命中的必修节点仍会出现在结果中。
    fn apply_rule<'a>(catalog: &'a [Node], rule: &PathRule) -> Vec<&'a Node> {
        let mut selected: Vec<&Node> = catalog
            .iter()
            .filter(|node| rule.evaluate(&node.slug).keeps())
            .collect();

        for required in &rule.must_have {
            if selected.iter().any(|node| &node.slug == required) {
                continue;
            }
            if let Some(node) = catalog.iter().find(|node| &node.slug == required) {
                selected.push(node);
            }
        }

        selected
    }

    /// 三色 DFS 拓扑排序
    ///
    /// 只考虑 `nodes` 中存在的前置节点；重复 slug 只输出第一次出现的节点。
    fn sort_by_dependencies<'a>(&self, nodes: &[&'a Node]) -> Vec<&'a Node> {
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            index.entry(node.slug.as_str()).or_insert(i);
        }

        let mut marks = vec![Mark::Unvisited; nodes.len()];
        let mut order = Vec::with_capacity(nodes.len());

        for (i, node) in nodes.iter().enumerate() {
            if index.get(node.slug.as_str()) == Some(&i) {
                self.visit(i, nodes, &index, &mut marks, &mut order);
            }
        }

        order.into_iter().map(|i| nodes[i]).collect()
    }

    fn visit(
        &self,
        i: usize,
        nodes: &[&Node],
        index: &HashMap<&str, usize>,
        marks: &mut [Mark],
        order: &mut Vec<usize>,
    ) {
        // InProgress 表示回边（环），直接跳过
        if marks[i] != Mark::Unvisited {
            return;
        }
        marks[i] = Mark::InProgress;

        for prerequisite in self.graph.prerequisites(&nodes[i].slug) {
            if let Some(&j) = index.get(prerequisite.as_str()) {
                self.visit(j, nodes, index, marks, order);
            }
        }

        marks[i] = Mark::Done;
        order.push(i);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(slug: &str) -> Node {
        Node::new(slug, slug.to_uppercase())
    }

    fn slugs(nodes: &[Node]) -> Vec<&str> {
        nodes.iter().map(|n| n.slug.as_str()).collect()
    }

    fn builtin_catalog() -> Vec<Node> {
        // 故意打乱顺序
        [
            "react",
            "machine-learning",
            "css",
            "kubernetes",
            "javascript",
            "html",
            "programming-fundamentals",
            "docker",
            "linux",
            "networking",
            "python",
            "statistics",
            "git",
            "testing",
            "sql",
            "databases",
            "nodejs",
            "rest-apis",
        ]
        .iter()
        .map(|s| node(s))
        .collect()
    }

    fn position(path: &[Node], slug: &str) -> Option<usize> {
        path.iter().position(|n| n.slug == slug)
    }

    #[test]
    fn test_no_goal_returns_full_catalog_in_dependency_order() {
        let scheduler = CurriculumScheduler::default();
        let catalog = builtin_catalog();

        let path = scheduler.generate_path(&catalog, None);

        assert_eq!(path.len(), catalog.len());
        assert!(position(&path, "html") < position(&path, "css"));
        assert!(position(&path, "css") < position(&path, "react"));
        assert!(position(&path, "javascript") < position(&path, "react"));
        assert!(position(&path, "linux") < position(&path, "docker"));
        assert!(position(&path, "docker") < position(&path, "kubernetes"));
    }

    #[test]
    fn test_unknown_goal_id_falls_back_to_no_filtering() {
        let scheduler = CurriculumScheduler::default();
        let catalog = builtin_catalog();

        let unfiltered = scheduler.generate_path(&catalog, None);
        let unknown = scheduler.generate_path_for_id(&catalog, Some("astronaut"));
        let absent = scheduler.generate_path_for_id(&catalog, None);

        assert_eq!(unknown, unfiltered);
        assert_eq!(absent, unfiltered);
    }

    #[test]
    fn test_known_goal_without_rule_falls_back() {
        let scheduler = CurriculumScheduler::new(DependencyGraph::builtin(), PathFilter::empty());
        let catalog = builtin_catalog();

        let path = scheduler.generate_path(&catalog, Some(Goal::Frontend));
        assert_eq!(path.len(), catalog.len());
    }

    #[test]
    fn test_frontend_path() {
        let scheduler = CurriculumScheduler::default();
        let path = scheduler.generate_path_for_id(&builtin_catalog(), Some("frontend"));

        assert_eq!(
            slugs(&path),
            vec![
                "programming-fundamentals",
                "html",
                "javascript",
                "css",
                "react",
                "git",
                "testing",
            ]
        );
    }

    #[test]
    fn test_exclude_then_must_have_injection() {
        let catalog = vec![node("alpha"), node("beta"), node("gamma")];
        let filter = PathFilter::empty().with_rule(
            Goal::Frontend,
            PathRule::default().exclude(&["b"]).must_have(&["gamma"]),
        );
        let scheduler = CurriculumScheduler::new(DependencyGraph::new(), filter);

        let path = scheduler.generate_path(&catalog, Some(Goal::Frontend));

        assert_eq!(slugs(&path), vec!["gamma"]);
    }

    #[test]
    fn test_excluded_must_have_is_still_injected() {
        let catalog = vec![node("react"), node("redux")];
        let filter = PathFilter::empty().with_rule(
            Goal::Frontend,
            PathRule::default()
                .keywords(&["re"])
                .exclude(&["redux"])
                .must_have(&["redux"]),
        );
        let scheduler = CurriculumScheduler::new(DependencyGraph::new(), filter);

        let path = scheduler.generate_path(&catalog, Some(Goal::Frontend));

        assert_eq!(slugs(&path), vec!["react", "redux"]);
    }

    #[test]
    fn test_must_have_missing_from_catalog_is_skipped() {
        let catalog = vec![node("alpha")];
        let filter = PathFilter::empty().with_rule(
            Goal::Backend,
            PathRule::default().must_have(&["omega"]),
        );
        let scheduler = CurriculumScheduler::new(DependencyGraph::new(), filter);

        assert!(scheduler.generate_path(&catalog, Some(Goal::Backend)).is_empty());
    }

    #[test]
    fn test_prerequisite_outside_selection_not_pulled_in() {
        let catalog = vec![node("react"), node("javascript")];
        let filter = PathFilter::empty().with_rule(
            Goal::Frontend,
            PathRule::default().include(&["react"]),
        );
        let scheduler = CurriculumScheduler::new(DependencyGraph::builtin(), filter);

        let path = scheduler.generate_path(&catalog, Some(Goal::Frontend));
        assert_eq!(slugs(&path), vec!["react"]);
    }

    #[test]
    fn test_cycle_terminates_without_duplicates() {
        let graph = DependencyGraph::new()
            .with_edge("a", "b")
            .with_edge("b", "c")
            .with_edge("c", "a");
        let scheduler = CurriculumScheduler::new(graph, PathFilter::empty());
        let catalog = vec![node("a"), node("b"), node("c")];

        let path = scheduler.generate_path(&catalog, None);

        // a -> b -> c -> (a 回边跳过)，完成顺序 c, b, a
        assert_eq!(slugs(&path), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_self_loop_and_duplicates() {
        let graph = DependencyGraph::new().with_edge("a", "a");
        let scheduler = CurriculumScheduler::new(graph, PathFilter::empty());
        let catalog = vec![node("a"), node("a"), node("b")];

        let path = scheduler.generate_path(&catalog, None);
        assert_eq!(slugs(&path), vec!["a", "b"]);
    }

    #[test]
    fn test_deterministic_output() {
        let scheduler = CurriculumScheduler::default();
        let catalog = builtin_catalog();

        for goal in Goal::ALL {
            let first = scheduler.generate_path(&catalog, Some(goal));
            let second = scheduler.generate_path(&catalog, Some(goal));
            assert_eq!(first, second, "unstable order for {goal}");
        }
    }

    #[test]
    fn test_must_have_always_present_for_builtin_goals() {
        let scheduler = CurriculumScheduler::default();
        let catalog = builtin_catalog();

        for goal in Goal::ALL {
            let path = scheduler.generate_path(&catalog, Some(goal));
            let rule = scheduler.filter().rule(goal).unwrap();
            for required in &rule.must_have {
                if catalog.iter().any(|n| &n.slug == required) {
                    assert!(
                        position(&path, required).is_some(),
                        "{required} missing from {goal} path"
                    );
                }
            }
        }
    }
}
