use super::{ValidationFailure, ValidationResult, Validator};
use crate::{context::AppContext, error::AppError, request::Request};
use async_trait::async_trait;
use crm_domain::specification::Specification;
use tokio_util::sync::CancellationToken;

type Rule<R> = Box<dyn Fn(&R, &mut ValidationResult) + Send + Sync>;

/// 组合校验器：按注册顺序执行全部规则并收集所有失败
///
/// ```rust
/// use crm_application::validation::RuleSet;
///
/// struct Rename {
///     name: String,
/// }
///
/// let rules = RuleSet::<Rename>::new()
///     .not_blank("Name", |r| r.name.as_str())
///     .max_length("Name", |r| r.name.as_str(), 5);
///
/// let result = rules.check(&Rename { name: "".into() });
/// assert_eq!(result.len(), 1);
/// assert_eq!(result.failures()[0].message, "Name is required.");
/// ```
pub struct RuleSet<R> {
    rules: Vec<Rule<R>>,
}

impl<R> Default for RuleSet<R> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<R: 'static> RuleSet<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 谓词为假时记录失败
    pub fn must<F>(mut self, path: impl Into<String>, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        let path = path.into();
        let message = message.into();
        self.rules.push(Box::new(move |request, result| {
            if !predicate(request) {
                result.push(ValidationFailure::new(path.clone(), message.clone()));
            }
        }));
        self
    }

    /// 请求不满足规约时记录失败
    pub fn satisfies<S>(self, path: impl Into<String>, spec: S, message: impl Into<String>) -> Self
    where
        S: Specification<R> + 'static,
    {
        self.must(path, move |request| spec.is_satisfied_by(request), message)
    }

    /// 去除空白后为空即失败，消息为 `"<path> is required."`
    pub fn not_blank<G>(self, path: impl Into<String>, getter: G) -> Self
    where
        G: Fn(&R) -> &str + Send + Sync + 'static,
    {
        let path = path.into();
        let message = format!("{path} is required.");
        self.must(path, move |request| !getter(request).trim().is_empty(), message)
    }

    /// 字符数超过 `max` 即失败
    pub fn max_length<G>(self, path: impl Into<String>, getter: G, max: usize) -> Self
    where
        G: Fn(&R) -> &str + Send + Sync + 'static,
    {
        let path = path.into();
        let message = format!("{path} must not exceed {max} characters.");
        self.must(path, move |request| getter(request).chars().count() <= max, message)
    }

    /// 仅当条件成立时执行嵌套规则
    pub fn when<C>(mut self, condition: C, nested: RuleSet<R>) -> Self
    where
        C: Fn(&R) -> bool + Send + Sync + 'static,
    {
        self.rules.push(Box::new(move |request, result| {
            if condition(request) {
                result.merge(nested.check(request));
            }
        }));
        self
    }

    pub fn check(&self, request: &R) -> ValidationResult {
        let mut result = ValidationResult::new();
        for rule in &self.rules {
            rule(request, &mut result);
        }
        result
    }
}

#[async_trait]
impl<R> Validator<R> for RuleSet<R>
where
    R: Request,
{
    async fn validate(
        &self,
        _ctx: &AppContext,
        request: &R,
        _cancel: &CancellationToken,
    ) -> Result<ValidationResult, AppError> {
        Ok(self.check(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestKind;
    use crm_domain::specification::spec_fn;

    struct Signup {
        name: String,
        email: Option<String>,
        newsletter: bool,
    }

    impl Request for Signup {
        const NAME: &'static str = "Signup";
        const KIND: RequestKind = RequestKind::Command;
        type Response = ();
    }

    fn rules() -> RuleSet<Signup> {
        RuleSet::<Signup>::new()
            .not_blank("Name", |r: &Signup| r.name.as_str())
            .max_length("Name", |r: &Signup| r.name.as_str(), 8)
            .when(
                |r: &Signup| r.newsletter,
                RuleSet::<Signup>::new()
                    .not_blank("Email", |r: &Signup| r.email.as_deref().unwrap_or(""))
                    .satisfies(
                        "Email",
                        spec_fn(|r: &Signup| r.email.as_deref().is_none_or(|e| e.contains('@'))),
                        "Email is invalid.",
                    ),
            )
    }

    #[test]
    fn collects_every_failure_in_order() {
        let request = Signup {
            name: "   ".into(),
            email: None,
            newsletter: true,
        };

        let result = rules().check(&request);

        assert_eq!(
            result.into_failures(),
            vec![
                ValidationFailure::new("Name", "Name is required."),
                ValidationFailure::new("Email", "Email is required."),
            ]
        );
    }

    #[test]
    fn nested_rules_skipped_when_condition_false() {
        let request = Signup {
            name: "ann".into(),
            email: Some("no-at-sign".into()),
            newsletter: false,
        };
        assert!(rules().check(&request).is_valid());
    }

    #[test]
    fn max_length_counts_characters() {
        let ok = Signup {
            name: "ÅÅÅÅÅÅÅÅ".into(),
            email: None,
            newsletter: false,
        };
        assert!(rules().check(&ok).is_valid());

        let too_long = Signup {
            name: "abcdefghi".into(),
            email: None,
            newsletter: false,
        };
        let result = rules().check(&too_long);
        assert_eq!(result.len(), 1);
        assert_eq!(result.failures()[0].message, "Name must not exceed 8 characters.");
    }

    #[tokio::test]
    async fn rule_set_is_a_validator() {
        let request = Signup {
            name: "bob".into(),
            email: Some("bob".into()),
            newsletter: true,
        };
        let result = rules()
            .validate(&AppContext::default(), &request, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(
            result.into_failures(),
            vec![ValidationFailure::new("Email", "Email is invalid.")]
        );
    }
}
