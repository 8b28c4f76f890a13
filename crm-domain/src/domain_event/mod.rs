//! 领域事件（Domain Event）与事件台账
//!
//! 实体在一次工作单元内发生的变更以事件形式记录在实体自身持有的 [`EventLedger`] 中，
//! 持久化边界在保存成功后通过 [`EventSource`] 能力将其取出并清空，交由外部（如 Outbox）投递。

mod domain_event_trait;
mod event_source;
mod field_changed;
mod ledger;

pub use domain_event_trait::DomainEvent;
pub use event_source::EventSource;
pub use field_changed::FieldChanged;
pub use ledger::EventLedger;
