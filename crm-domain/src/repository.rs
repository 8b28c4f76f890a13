//! 仓储契约（Repository）
//!
//! 处理器依赖的最小持久化接口，与具体存储技术无关：
//! - 每个读方法都显式接收 [`Scope`]，默认作用域只返回 `active = true` 的记录；
//! - `delete` 为逻辑删除，对不存在或已删除的标识返回 `false` 而非报错；
//! - 仓储从不自动盖审计戳，`delete` 所需的戳由调用方提供；
//! - 所有方法接收取消信号，取消时返回 [`DomainError::Cancelled`](crate::error::DomainError::Cancelled)。
//!
use crate::audit::{AuditStamp, Auditable};
use crate::entity::Entity;
use crate::error::DomainResult;
use crate::specification::Specification;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// 读取作用域
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Scope {
    /// 仅活动记录（默认）
    #[default]
    Active,
    /// 包含已逻辑删除的记录
    IncludeInactive,
}

impl Scope {
    pub fn from_include_inactive(include_inactive: bool) -> Self {
        if include_inactive {
            Scope::IncludeInactive
        } else {
            Scope::Active
        }
    }

    pub fn admits<T: Auditable>(self, entity: &T) -> bool {
        match self {
            Scope::Active => entity.is_active(),
            Scope::IncludeInactive => true,
        }
    }
}

#[async_trait]
pub trait Repository<T>: Send + Sync
where
    T: Entity + Auditable + Send + Sync + 'static,
{
    async fn get_by_id(
        &self,
        id: &T::Id,
        scope: Scope,
        cancel: &CancellationToken,
    ) -> DomainResult<Option<T>>;

    async fn get_all(&self, scope: Scope, cancel: &CancellationToken) -> DomainResult<Vec<T>>;

    /// 按条件查询（`GetByX` 一族）
    async fn find(
        &self,
        filter: &dyn Specification<T>,
        scope: Scope,
        cancel: &CancellationToken,
    ) -> DomainResult<Vec<T>>;

    /// 新增实体；标识重复时返回 `Conflict`
    async fn add(&self, entity: T, cancel: &CancellationToken) -> DomainResult<T>;

    /// 覆盖保存实体；标识不存在时返回 `NotFound`
    async fn update(&self, entity: T, cancel: &CancellationToken) -> DomainResult<T>;

    /// 逻辑删除：置 `active = false` 并以 `stamp` 刷新修改者/修改时间
    async fn delete(
        &self,
        id: &T::Id,
        stamp: AuditStamp,
        cancel: &CancellationToken,
    ) -> DomainResult<bool>;

    async fn exists(
        &self,
        id: &T::Id,
        scope: Scope,
        cancel: &CancellationToken,
    ) -> DomainResult<bool> {
        Ok(self.get_by_id(id, scope, cancel).await?.is_some())
    }
}

#[async_trait]
impl<T, R> Repository<T> for Arc<R>
where
    T: Entity + Auditable + Send + Sync + 'static,
    R: Repository<T> + ?Sized,
{
    async fn get_by_id(
        &self,
        id: &T::Id,
        scope: Scope,
        cancel: &CancellationToken,
    ) -> DomainResult<Option<T>> {
        (**self).get_by_id(id, scope, cancel).await
    }

    async fn get_all(&self, scope: Scope, cancel: &CancellationToken) -> DomainResult<Vec<T>> {
        (**self).get_all(scope, cancel).await
    }

    async fn find(
        &self,
        filter: &dyn Specification<T>,
        scope: Scope,
        cancel: &CancellationToken,
    ) -> DomainResult<Vec<T>> {
        (**self).find(filter, scope, cancel).await
    }

    async fn add(&self, entity: T, cancel: &CancellationToken) -> DomainResult<T> {
        (**self).add(entity, cancel).await
    }

    async fn update(&self, entity: T, cancel: &CancellationToken) -> DomainResult<T> {
        (**self).update(entity, cancel).await
    }

    async fn delete(
        &self,
        id: &T::Id,
        stamp: AuditStamp,
        cancel: &CancellationToken,
    ) -> DomainResult<bool> {
        (**self).delete(id, stamp, cancel).await
    }

    async fn exists(
        &self,
        id: &T::Id,
        scope: Scope,
        cancel: &CancellationToken,
    ) -> DomainResult<bool> {
        (**self).exists(id, scope, cancel).await
    }
}
