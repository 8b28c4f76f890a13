use crate::{context::AppContext, error::AppError, request::Request};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// 请求处理器：每种请求类型有且仅有一个
///
/// 处理器负责审计戳与持久化调用；取消信号必须向下传递给每一次仓储调用。
#[async_trait]
pub trait RequestHandler<R>: Send + Sync
where
    R: Request,
{
    async fn handle(
        &self,
        ctx: &AppContext,
        request: R,
        cancel: &CancellationToken,
    ) -> Result<R::Response, AppError>;
}
