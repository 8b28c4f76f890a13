use super::ValidationResult;
use crate::{context::AppContext, error::AppError, request::Request};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// 请求校验器
///
/// 对请求值本身是纯函数，但可以通过注入的只读协作者查询外部状态，
/// 因此是异步的。返回 `Err` 表示基础设施故障，而不是规则违反。
#[async_trait]
pub trait Validator<R>: Send + Sync
where
    R: Request,
{
    async fn validate(
        &self,
        ctx: &AppContext,
        request: &R,
        cancel: &CancellationToken,
    ) -> Result<ValidationResult, AppError>;
}

#[async_trait]
impl<R, V> Validator<R> for Arc<V>
where
    R: Request,
    V: Validator<R> + ?Sized,
{
    async fn validate(
        &self,
        ctx: &AppContext,
        request: &R,
        cancel: &CancellationToken,
    ) -> Result<ValidationResult, AppError> {
        (**self).validate(ctx, request, cancel).await
    }
}
