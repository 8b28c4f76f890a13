use super::{DomainEvent, EventLedger};
use crate::error::DomainResult;

/// “该实体持有一份事件台账”的能力
///
/// 以组合而非继承的方式暴露台账，使存储适配器可以在不了解具体实体类型的情况下
/// 读取并清空待投递事件。
pub trait EventSource {
    type Event: DomainEvent;

    fn ledger(&self) -> &EventLedger<Self::Event>;

    fn ledger_mut(&mut self) -> &mut EventLedger<Self::Event>;

    fn add_domain_event(&mut self, event: impl Into<Option<Self::Event>>) -> DomainResult<()>
    where
        Self: Sized,
    {
        self.ledger_mut().add(event)
    }

    fn remove_domain_event(&mut self, event: &Self::Event) -> bool {
        self.ledger_mut().remove(event)
    }

    fn clear_domain_events(&mut self) {
        self.ledger_mut().clear();
    }

    fn domain_events(&self) -> &[Self::Event] {
        self.ledger().events()
    }

    /// 取出并清空（持久化边界在保存成功后调用）
    fn take_domain_events(&mut self) -> Vec<Self::Event> {
        self.ledger_mut().drain()
    }
}
