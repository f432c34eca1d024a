// crates/nbs_biota/src/error.rs
//! 生物模型错误类型定义
//!
//! 生物过程中的数值失败（容量超限、形状不匹配等）统一为 [`BiotaError`]，
//! 并可转换为 [`NbsError`] 向上层传递。

use nbs_foundation::NbsError;
use nbs_io::IoError;
use thiserror::Error;

/// 生物模块结果类型别名
pub type BiotaResult<T> = Result<T, BiotaError>;

/// 生物模块错误枚举
#[derive(Error, Debug)]
pub enum BiotaError {
    /// 种群状态之和超过承载能力
    #[error("Total population is larger than carrying capacity (cell {cell}: {total} > {capacity})")]
    CarryingCapacity {
        /// 网格索引
        cell: usize,
        /// 种群总和
        total: f64,
        /// 承载能力（覆盖度）
        capacity: f64,
    },

    /// 数组长度不匹配
    #[error("数组长度不匹配: {name} 期望 {expected}, 实际 {actual}")]
    ShapeMismatch {
        /// 变量名
        name: &'static str,
        /// 期望长度
        expected: usize,
        /// 实际长度
        actual: usize,
    },

    /// 缺少所需状态
    #[error("缺少状态 {0}, 请先执行对应的过程")]
    MissingState(&'static str),

    /// 缺少环境数据
    #[error("缺少环境数据: {0}")]
    MissingEnvironment(String),

    /// 输出错误
    #[error(transparent)]
    Io(#[from] IoError),

    /// 底层错误
    #[error(transparent)]
    Foundation(#[from] NbsError),
}

impl BiotaError {
    /// 长度检查
    pub fn check_len(name: &'static str, expected: usize, actual: usize) -> BiotaResult<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::ShapeMismatch {
                name,
                expected,
                actual,
            })
        }
    }
}

impl From<BiotaError> for NbsError {
    fn from(err: BiotaError) -> Self {
        match err {
            BiotaError::Foundation(e) => e,
            BiotaError::Io(e) => e.into(),
            BiotaError::ShapeMismatch {
                name,
                expected,
                actual,
            } => NbsError::size_mismatch(name, expected, actual),
            other => NbsError::internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_len() {
        assert!(BiotaError::check_len("cover", 3, 3).is_ok());
        let err = BiotaError::check_len("cover", 3, 2).unwrap_err();
        assert!(err.to_string().contains("cover"));
    }

    #[test]
    fn test_convert_to_nbs_error() {
        let err: NbsError = BiotaError::MissingState("light").into();
        assert!(err.to_string().contains("light"));
    }
}
