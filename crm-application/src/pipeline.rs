//! 请求管道
//!
//! 处理器之前的一组前置步骤，按注册顺序执行；
//! 任一步骤返回 [`StepOutcome::Reject`] 即终止，后续步骤与处理器都不会运行。
//!
use crate::{
    context::AppContext, error::AppError, handler::RequestHandler, request::Request,
    validation::ValidationResult,
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// 前置步骤的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Reject(ValidationResult),
}

#[async_trait]
pub trait PipelineStep<R>: Send + Sync
where
    R: Request,
{
    async fn process(
        &self,
        ctx: &AppContext,
        request: &R,
        cancel: &CancellationToken,
    ) -> Result<StepOutcome, AppError>;
}

/// 一次分发的结果
///
/// 校验失败是数据而非错误；`Err(AppError)` 才表示故障。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Completed(T),
    ValidationFailed(ValidationResult),
}

impl<T> Outcome<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::ValidationFailed(_) => None,
        }
    }

    pub fn failures(&self) -> Option<&ValidationResult> {
        match self {
            Self::Completed(_) => None,
            Self::ValidationFailed(failures) => Some(failures),
        }
    }

    pub fn into_result(self) -> Result<T, ValidationResult> {
        match self {
            Self::Completed(value) => Ok(value),
            Self::ValidationFailed(failures) => Err(failures),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Completed(value) => Outcome::Completed(f(value)),
            Self::ValidationFailed(failures) => Outcome::ValidationFailed(failures),
        }
    }
}

/// 单个请求类型的完整管道：前置步骤 + 唯一处理器
pub(crate) struct Pipeline<R: Request> {
    steps: Vec<Arc<dyn PipelineStep<R>>>,
    handler: Arc<dyn RequestHandler<R>>,
}

impl<R: Request> Pipeline<R> {
    pub(crate) fn new(
        steps: Vec<Arc<dyn PipelineStep<R>>>,
        handler: Arc<dyn RequestHandler<R>>,
    ) -> Self {
        Self { steps, handler }
    }

    #[cfg(test)]
    pub(crate) fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub(crate) async fn run(
        &self,
        ctx: &AppContext,
        request: R,
        cancel: &CancellationToken,
    ) -> Result<Outcome<R::Response>, AppError> {
        for step in &self.steps {
            ensure_live(cancel)?;
            if let StepOutcome::Reject(failures) = step.process(ctx, &request, cancel).await? {
                return Ok(Outcome::ValidationFailed(failures));
            }
        }

        ensure_live(cancel)?;
        let response = self.handler.handle(ctx, request, cancel).await?;
        Ok(Outcome::Completed(response))
    }
}

pub(crate) fn ensure_live(cancel: &CancellationToken) -> Result<(), AppError> {
    if cancel.is_cancelled() {
        return Err(AppError::Cancelled);
    }
    Ok(())
}
