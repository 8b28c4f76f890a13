//! 规约（Specification）
//!
//! 封装可复用、可组合的业务谓词：既用于仓储的条件查询（`Repository::find`），
//! 也用于应用层的校验规则。
//!
use std::marker::PhantomData;

/// 规约模式的核心 trait
pub trait Specification<T>: Send + Sync {
    /// 检查候选对象是否满足规约
    fn is_satisfied_by(&self, candidate: &T) -> bool;

    /// 与另一个规约进行 AND 组合
    fn and<S>(self, other: S) -> And<Self, S>
    where
        Self: Sized,
        S: Specification<T>,
    {
        And {
            left: self,
            right: other,
        }
    }

    /// 与另一个规约进行 OR 组合
    fn or<S>(self, other: S) -> Or<Self, S>
    where
        Self: Sized,
        S: Specification<T>,
    {
        Or {
            left: self,
            right: other,
        }
    }

    /// 对规约进行 NOT 操作
    fn not(self) -> Not<Self>
    where
        Self: Sized,
    {
        Not { inner: self }
    }
}

impl<T> Specification<T> for Box<dyn Specification<T>> {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        self.as_ref().is_satisfied_by(candidate)
    }
}

/// 以闭包表达的规约
pub struct FnSpecification<T, F> {
    predicate: F,
    _marker: PhantomData<fn(&T)>,
}

/// 由闭包构造规约
///
/// ```
/// use crm_domain::specification::{spec_fn, Specification};
///
/// let positive = spec_fn(|n: &i32| *n > 0);
/// let even = spec_fn(|n: &i32| n % 2 == 0);
/// let spec = positive.and(even);
/// assert!(spec.is_satisfied_by(&4));
/// assert!(!spec.is_satisfied_by(&3));
/// ```
pub fn spec_fn<T, F>(predicate: F) -> FnSpecification<T, F>
where
    F: Fn(&T) -> bool + Send + Sync,
{
    FnSpecification {
        predicate,
        _marker: PhantomData,
    }
}

impl<T, F> Specification<T> for FnSpecification<T, F>
where
    F: Fn(&T) -> bool + Send + Sync,
{
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        (self.predicate)(candidate)
    }
}

/// AND 组合：两个规约都满足时才满足
pub struct And<L, R> {
    left: L,
    right: R,
}

impl<T, L, R> Specification<T> for And<L, R>
where
    L: Specification<T>,
    R: Specification<T>,
{
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        self.left.is_satisfied_by(candidate) && self.right.is_satisfied_by(candidate)
    }
}

/// OR 组合：任意一个满足即满足
pub struct Or<L, R> {
    left: L,
    right: R,
}

impl<T, L, R> Specification<T> for Or<L, R>
where
    L: Specification<T>,
    R: Specification<T>,
{
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        self.left.is_satisfied_by(candidate) || self.right.is_satisfied_by(candidate)
    }
}

/// NOT：内部规约不满足时才满足
pub struct Not<S> {
    inner: S,
}

impl<T, S> Specification<T> for Not<S>
where
    S: Specification<T>,
{
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        !self.inner.is_satisfied_by(candidate)
    }
}
