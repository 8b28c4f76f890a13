//! CRM 应用层（crm-application）
//!
//! 以请求为中心的 CQRS 核心：
//! - [`request`] / [`handler`]：请求与其唯一处理器；
//! - [`validation`]：校验器与组合规则，校验失败作为数据返回；
//! - [`pipeline`]：处理器之前的前置步骤；
//! - [`mediator`]：启动期登记、运行期按类型分发的单一入口。
//!
pub mod context;
pub mod error;
pub mod handler;
pub mod mediator;
pub mod pipeline;
pub mod request;
pub mod validation;

pub use mediator::{Mediator, MediatorBuilder, MediatorConfig};
pub use pipeline::Outcome;
