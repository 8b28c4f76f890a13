//! 实体（Entity）基础抽象
//!
//! 实体以标识（Id）区分彼此：同一具体类型的两个实体当且仅当 Id 相等时相等，
//! 与其他字段无关。标识在构造时生成（或由调用方显式提供），之后不可变更。
//!
use std::{fmt::Debug, fmt::Display, hash::Hash};

use ulid::Ulid;
use uuid::Uuid;

/// 实体标识需要满足的能力边界
pub trait EntityId: Clone + Eq + Hash + Debug + Display + Send + Sync + 'static {
    /// 生成一个新的唯一标识
    fn generate() -> Self;
}

impl EntityId for Uuid {
    fn generate() -> Self {
        Uuid::new_v4()
    }
}

impl EntityId for Ulid {
    fn generate() -> Self {
        Ulid::new()
    }
}

impl EntityId for String {
    fn generate() -> Self {
        Uuid::new_v4().to_string()
    }
}

/// 具备唯一标识的实体抽象
///
/// 只暴露只读的 `id()`：标识只能经由构造函数写入。
pub trait Entity: Send + Sync {
    type Id: EntityId;

    /// 获取实体标识
    fn id(&self) -> &Self::Id;

    /// 判断两个实体是否为同一个（仅比较标识）
    fn same_identity_as(&self, other: &Self) -> bool
    where
        Self: Sized,
    {
        self.id() == other.id()
    }
}
