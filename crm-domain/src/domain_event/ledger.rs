use super::DomainEvent;
use crate::error::{DomainError, DomainResult};
use std::ops::Deref;
use std::slice::Iter;

/// 实体实例级的事件台账
///
/// - 按调用顺序追加，不去重（同一类型事件可出现多次）；
/// - 只读视图通过 `events()` / `Deref<Target = [E]>` 暴露；
/// - 仅由持久化边界在保存成功后清空（`clear` / `drain`）。
///
/// 台账不做跨线程共享：它随实体一起被单个处理器独占。
#[derive(Debug, Clone)]
pub struct EventLedger<E>
where
    E: DomainEvent,
{
    events: Vec<E>,
}

impl<E> Default for EventLedger<E>
where
    E: DomainEvent,
{
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<E> EventLedger<E>
where
    E: DomainEvent,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加事件
    ///
    /// 传入 `None` 时返回 [`DomainError::InvalidArgument`]，台账保持不变。
    pub fn add(&mut self, event: impl Into<Option<E>>) -> DomainResult<()> {
        let Some(event) = event.into() else {
            return Err(DomainError::invalid_argument("domain event must not be absent"));
        };
        self.events.push(event);
        Ok(())
    }

    /// 移除第一个与之相等的事件，返回是否移除成功
    pub fn remove(&mut self, event: &E) -> bool {
        match self.events.iter().position(|e| e == event) {
            Some(index) => {
                self.events.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// 取出全部事件并清空台账
    pub fn drain(&mut self) -> Vec<E> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[E] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, E> {
        self.events.iter()
    }
}

impl<E> Deref for EventLedger<E>
where
    E: DomainEvent,
{
    type Target = [E];

    fn deref(&self) -> &Self::Target {
        &self.events
    }
}

impl<'a, E> IntoIterator for &'a EventLedger<E>
where
    E: DomainEvent,
{
    type Item = &'a E;
    type IntoIter = Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
