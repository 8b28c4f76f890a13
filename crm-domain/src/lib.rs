//! CRM 领域层基础库（crm-domain）
//!
//! 提供 CRM 业务对象的通用构件：
//! - 实体标识与实体（`entity`），以及强类型标识（`#[entity_id]`）
//! - 审计信息与逻辑删除（`audit`）
//! - 领域事件台账（`domain_event`）
//! - 规约（`specification`）与仓储契约（`repository`）
//! - 时钟与当前用户等环境协作者（`provider`）
//!
//! 持久化只定义契约；`memory` 特性下提供一个内存实现，供测试与示例使用。
//!
extern crate self as crm_domain;

pub mod audit;
pub mod domain_event;
pub mod entity;
pub mod error;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
pub mod repository;
pub mod specification;

pub use crm_macros::{domain_event, entity, entity_id};
