//! 内存仓储（InMemoryRepository）
//!
//! 仓储契约的参考实现，基于 `DashMap`：
//! - 保存（add/update）成功后才取出实体台账中的事件并放入 outbox，返回的实体台账为空；
//! - 读取按 [`Scope`] 过滤，并按创建时间排序；
//! - 每次调用前检查取消信号。
//!
//! 用于测试与示例；生产环境由外部持久化协作者实现 [`Repository`]。
//!
use crate::audit::{AuditStamp, Auditable};
use crate::domain_event::EventSource;
use crate::entity::Entity;
use crate::error::{DomainError, DomainResult};
use crate::repository::{Repository, Scope};
use crate::specification::Specification;
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

pub struct InMemoryRepository<T>
where
    T: Entity + EventSource,
{
    rows: DashMap<T::Id, T>,
    outbox: Mutex<Vec<T::Event>>,
}

impl<T> Default for InMemoryRepository<T>
where
    T: Entity + EventSource,
{
    fn default() -> Self {
        Self {
            rows: DashMap::new(),
            outbox: Mutex::new(Vec::new()),
        }
    }
}

impl<T> InMemoryRepository<T>
where
    T: Entity + Auditable + EventSource + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// 已存储的行数（含逻辑删除）
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 已在保存后取出的事件（按保存顺序）
    pub fn published_events(&self) -> Vec<T::Event> {
        self.outbox.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn take_published_events(&self) -> Vec<T::Event> {
        std::mem::take(&mut *self.outbox.lock().unwrap_or_else(|e| e.into_inner()))
    }

    fn publish(&self, events: Vec<T::Event>) {
        if events.is_empty() {
            return;
        }
        self.outbox
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend(events);
    }

    // 存储副本不携带待投递事件
    fn detached(entity: &T) -> T {
        let mut stored = entity.clone();
        stored.clear_domain_events();
        stored
    }

    fn collect(&self, scope: Scope, filter: impl Fn(&T) -> bool) -> Vec<T> {
        let mut rows: Vec<T> = self
            .rows
            .iter()
            .filter(|row| scope.admits(row.value()) && filter(row.value()))
            .map(|row| row.value().clone())
            .collect();
        rows.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().to_string().cmp(&b.id().to_string()))
        });
        rows
    }
}

fn ensure_live(cancel: &CancellationToken) -> DomainResult<()> {
    if cancel.is_cancelled() {
        return Err(DomainError::Cancelled);
    }
    Ok(())
}

#[async_trait]
impl<T> Repository<T> for InMemoryRepository<T>
where
    T: Entity + Auditable + EventSource + Clone + Send + Sync + 'static,
{
    async fn get_by_id(
        &self,
        id: &T::Id,
        scope: Scope,
        cancel: &CancellationToken,
    ) -> DomainResult<Option<T>> {
        ensure_live(cancel)?;
        Ok(self
            .rows
            .get(id)
            .filter(|row| scope.admits(row.value()))
            .map(|row| row.value().clone()))
    }

    async fn get_all(&self, scope: Scope, cancel: &CancellationToken) -> DomainResult<Vec<T>> {
        ensure_live(cancel)?;
        Ok(self.collect(scope, |_| true))
    }

    async fn find(
        &self,
        filter: &dyn Specification<T>,
        scope: Scope,
        cancel: &CancellationToken,
    ) -> DomainResult<Vec<T>> {
        ensure_live(cancel)?;
        Ok(self.collect(scope, |row| filter.is_satisfied_by(row)))
    }

    async fn add(&self, mut entity: T, cancel: &CancellationToken) -> DomainResult<T> {
        ensure_live(cancel)?;
        match self.rows.entry(entity.id().clone()) {
            Entry::Occupied(_) => {
                return Err(DomainError::conflict(format!(
                    "entity {} already exists",
                    entity.id()
                )));
            }
            Entry::Vacant(slot) => {
                slot.insert(Self::detached(&entity));
            }
        }
        self.publish(entity.take_domain_events());
        Ok(entity)
    }

    async fn update(&self, mut entity: T, cancel: &CancellationToken) -> DomainResult<T> {
        ensure_live(cancel)?;
        match self.rows.get_mut(entity.id()) {
            Some(mut row) => {
                // 创建戳只在 add 时写入
                if row.audit().created() != entity.audit().created() {
                    return Err(DomainError::InvalidState {
                        reason: format!("created stamp of entity {} cannot change", entity.id()),
                    });
                }
                *row = Self::detached(&entity);
            }
            None => {
                return Err(DomainError::not_found(format!(
                    "entity {} does not exist",
                    entity.id()
                )));
            }
        }
        self.publish(entity.take_domain_events());
        Ok(entity)
    }

    async fn delete(
        &self,
        id: &T::Id,
        stamp: AuditStamp,
        cancel: &CancellationToken,
    ) -> DomainResult<bool> {
        ensure_live(cancel)?;
        Ok(match self.rows.get_mut(id) {
            Some(mut row) => row.deactivate(stamp),
            None => false,
        })
    }

    async fn exists(
        &self,
        id: &T::Id,
        scope: Scope,
        cancel: &CancellationToken,
    ) -> DomainResult<bool> {
        ensure_live(cancel)?;
        Ok(self
            .rows
            .get(id)
            .is_some_and(|row| scope.admits(row.value())))
    }
}
