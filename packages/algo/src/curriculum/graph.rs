//! 课程依赖图
//!
//! 静态配置：节点 slug → 前置节点 slug 列表。必须是有向无环图，
//! 出现环属于配置缺陷，由 [`DependencyGraph::validate`] 在测试中发现。

use std::collections::HashMap;

use thiserror::Error;

/// Built-in prerequisite table, in declaration order.
const BUILTIN_DEPENDENCIES: &[(&str, &[&str])] = &[
    ("programming-fundamentals", &[]),
    ("git", &[]),
    ("html", &[]),
    ("css", &["html"]),
    ("javascript", &["programming-fundamentals", "html"]),
    ("typescript", &["javascript"]),
    ("react", &["javascript", "css"]),
    ("nodejs", &["javascript"]),
    ("python", &["programming-fundamentals"]),
    ("sql", &[]),
    ("databases", &["sql"]),
    ("linux", &[]),
    ("networking", &["linux"]),
    ("rest-apis", &["networking"]),
    ("testing", &["programming-fundamentals"]),
    ("data-structures", &["programming-fundamentals"]),
    ("algorithms", &["data-structures"]),
    ("docker", &["linux"]),
    ("kubernetes", &["docker", "networking"]),
    ("cloud-computing", &["linux", "networking"]),
    ("security", &["networking"]),
    ("system-design", &["databases", "networking", "rest-apis"]),
    ("statistics", &[]),
    ("machine-learning", &["python", "statistics"]),
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("依赖图存在环: {}", .0.join(" -> "))]
    Cycle(Vec<String>),
}

/// Prerequisite table keyed by node slug
#[derive(Clone, Debug, Default)]
pub struct DependencyGraph {
    edges: HashMap<String, Vec<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// 内置课程依赖表
    pub fn builtin() -> Self {
        Self::from_table(BUILTIN_DEPENDENCIES)
    }

    pub fn from_table(table: &[(&str, &[&str])]) -> Self {
        let mut graph = Self::new();
        for (slug, prerequisites) in table {
            for prerequisite in *prerequisites {
                graph.add_edge(slug, prerequisite);
            }
        }
        graph
    }

    /// Declares `prerequisite` as a prerequisite of `slug`. Repeated edges are ignored.
    pub fn add_edge(&mut self, slug: &str, prerequisite: &str) {
        let entry = self.edges.entry(slug.to_string()).or_default();
        if !entry.iter().any(|p| p == prerequisite) {
            entry.push(prerequisite.to_string());
        }
    }

    pub fn with_edge(mut self, slug: &str, prerequisite: &str) -> Self {
        self.add_edge(slug, prerequisite);
        self
    }

    pub fn prerequisites(&self, slug: &str) -> &[String] {
        self.edges.get(slug).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn depends_on(&self, slug: &str, prerequisite: &str) -> bool {
        self.prerequisites(slug).iter().any(|p| p == prerequisite)
    }

    /// 检查配置是否无环，返回第一个发现的环路
    pub fn validate(&self) -> Result<(), GraphError> {
        // 按 slug 排序以得到确定的报告
        let mut slugs: Vec<&str> = self.edges.keys().map(String::as_str).collect();
        slugs.sort_unstable();

        let mut done: Vec<&str> = Vec::new();
        let mut stack: Vec<&str> = Vec::new();
        for slug in slugs {
            self.find_cycle(slug, &mut stack, &mut done)?;
        }
        Ok(())
    }

    fn find_cycle<'a>(
        &'a self,
        slug: &'a str,
        stack: &mut Vec<&'a str>,
        done: &mut Vec<&'a str>,
    ) -> Result<(), GraphError> {
        if done.contains(&slug) {
            return Ok(());
        }
        if let Some(pos) = stack.iter().position(|s| *s == slug) {
            let mut cycle: Vec<String> = stack[pos..].iter().map(|s| s.to_string()).collect();
            cycle.push(slug.to_string());
            return Err(GraphError::Cycle(cycle));
        }

        stack.push(slug);
        for prerequisite in self.prerequisites(slug) {
            self.find_cycle(prerequisite, stack, done)?;
        }
        stack.pop();
        done.push(slug);
        Ok(())
    }
}
