//! # pathwise-algo - 课程学习核心算法库
//!
//! 本 crate 提供纯 Rust 实现的学习进度算法:
//!
//! - **Curriculum Path** - 依赖图 + 目标规则，生成个性化、按前置关系排序的学习路径
//! - **SM-2 Review** - 根据回忆质量评分计算下一次复习时间与难度因子
//!
//! ## 设计理念
//!
//! - **纯函数** - 无 I/O、无异步、无全局状态，相同输入得到相同输出
//! - **可复用** - 客户端同步层 (`pathwise-client`) 只调用这里的算法
//! - **充分测试** - 单元测试 + 属性测试覆盖无环安全、必修包含与依赖顺序
//!
//! ## 模块结构
//!
//! - [`curriculum`] - 依赖图、路径规则与拓扑排序
//! - [`review`] - 间隔重复调度与复习队列
//! - [`types`] - 公共类型和常量
//!
//! ## 使用示例
//!
//! ```rust
//! use pathwise_algo::{CurriculumScheduler, Goal, Node, ReviewState};
//!
//! let catalog = vec![Node::new("css", "CSS"), Node::new("html", "HTML")];
//! let path = CurriculumScheduler::default().generate_path(&catalog, Some(Goal::Frontend));
//! assert_eq!(path[0].slug, "html");
//!
//! let now = chrono::Utc::now();
//! let next = ReviewState::first_study("html/forms", now).review(4, now).unwrap();
//! assert_eq!(next.interval, 1);
//! ```

// ============================================================================
// 模块声明
// ============================================================================

pub mod curriculum;
pub mod review;
pub mod types;

// ============================================================================
// 重新导出
// ============================================================================

/// 重新导出所有公共类型
pub use types::*;

/// 重新导出学习路径
pub use curriculum::{
    CurriculumScheduler, DependencyGraph, Goal, GraphError, PathFilter, PathRule, SlugPattern,
};

/// 重新导出复习调度
pub use review::{due_items, is_due, schedule, ReviewError, Scheduled};
