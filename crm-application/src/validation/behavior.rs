use super::{ValidationResult, Validator};
use crate::{
    context::AppContext,
    error::AppError,
    pipeline::{PipelineStep, StepOutcome, ensure_live},
    request::Request,
};
use async_trait::async_trait;
use futures_util::future::try_join_all;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// 校验器的执行方式；失败的合并顺序始终是注册顺序
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationMode {
    #[default]
    Concurrent,
    Sequential,
}

/// 校验管道步骤
///
/// 运行请求类型的全部校验器并合并失败；有任何失败即拒绝，处理器不会被调用。
/// 校验器的 `Err` 原样向上传播。
pub struct ValidationBehavior<R: Request> {
    validators: Vec<Arc<dyn Validator<R>>>,
    mode: ValidationMode,
}

impl<R: Request> ValidationBehavior<R> {
    pub fn new(validators: Vec<Arc<dyn Validator<R>>>, mode: ValidationMode) -> Self {
        Self { validators, mode }
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    async fn run_all(
        &self,
        ctx: &AppContext,
        request: &R,
        cancel: &CancellationToken,
    ) -> Result<Vec<ValidationResult>, AppError> {
        match self.mode {
            ValidationMode::Concurrent => {
                try_join_all(
                    self.validators
                        .iter()
                        .map(|validator| validator.validate(ctx, request, cancel)),
                )
                .await
            }
            ValidationMode::Sequential => {
                let mut results = Vec::with_capacity(self.validators.len());
                for validator in &self.validators {
                    ensure_live(cancel)?;
                    results.push(validator.validate(ctx, request, cancel).await?);
                }
                Ok(results)
            }
        }
    }
}

#[async_trait]
impl<R: Request> PipelineStep<R> for ValidationBehavior<R> {
    async fn process(
        &self,
        ctx: &AppContext,
        request: &R,
        cancel: &CancellationToken,
    ) -> Result<StepOutcome, AppError> {
        let merged: ValidationResult = self
            .run_all(ctx, request, cancel)
            .await?
            .into_iter()
            .flatten()
            .collect();

        if merged.is_valid() {
            Ok(StepOutcome::Continue)
        } else {
            Ok(StepOutcome::Reject(merged))
        }
    }
}
