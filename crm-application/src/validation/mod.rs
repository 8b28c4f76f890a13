//! 请求校验
//!
//! - [`ValidationFailure`] / [`ValidationResult`]：校验失败是数据，不是错误；
//! - [`Validator`]：可异步查询外部状态（例如外键是否存在）的校验器；
//! - [`RuleSet`]：按字段聚合规则的组合校验器，收集全部失败、不短路；
//! - [`ValidationBehavior`]：在处理器之前运行全部校验器的管道步骤。
//!
mod behavior;
mod failure;
mod rules;
mod validator;

pub use behavior::{ValidationBehavior, ValidationMode};
pub use failure::{ValidationFailure, ValidationResult};
pub use rules::RuleSet;
pub use validator::Validator;
