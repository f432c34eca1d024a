// crates/nbs_foundation/src/lib.rs

//! NbsDynamics Foundation Layer
//!
//! 基础层，提供整个项目共享的基础抽象。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型
//! - [`reshape`]: 时空维度与 (space × time) 矩阵整形
//! - [`calendar`]: 日期序列、月-日窗口、生态时间步统计
//!
//! # 示例
//!
//! ```
//! use nbs_foundation::reshape::{DataReshape, Dim, SpaceTime};
//!
//! let reshape = DataReshape::new(SpaceTime::new(2, 365));
//! let depth = reshape.variable2matrix(&[5.0, 8.0], Dim::Space).unwrap();
//! assert_eq!(depth.dim(), (2, 365));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod calendar;
pub mod error;
pub mod reshape;

// 重导出常用类型
pub use calendar::MonthDay;
pub use error::{NbsError, NbsResult};
pub use reshape::{Conversion, DataReshape, Dim, SpaceTime};
