// crates/nbs_simulation/src/directories.rs

//! 模拟目录

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{SimulationError, SimulationResult};

/// 一次模拟使用的目录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationDirectories {
    /// 工作目录
    pub working_dir: PathBuf,
    /// 输入目录
    pub input_dir: PathBuf,
    /// 输出目录
    pub output_dir: PathBuf,
    /// 图件目录
    pub figures_dir: PathBuf,
}

impl Default for SimulationDirectories {
    fn default() -> Self {
        Self::new(".")
    }
}

impl SimulationDirectories {
    /// 以工作目录下的 `input`、`output`、`figures` 为默认子目录
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        let working_dir = working_dir.into();
        Self {
            input_dir: working_dir.join("input"),
            output_dir: working_dir.join("output"),
            figures_dir: working_dir.join("figures"),
            working_dir,
        }
    }

    /// 指定输出目录
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// 相对路径按工作目录解析
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }

    /// 创建缺失的目录
    pub fn validate_simulation_directories(&self) -> SimulationResult<()> {
        for dir in [
            &self.working_dir,
            &self.output_dir,
            &self.input_dir,
            &self.figures_dir,
        ] {
            if !dir.is_dir() {
                std::fs::create_dir_all(dir).map_err(|e| SimulationError::directory(dir, e))?;
                debug!("创建目录 {}", dir.display());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let dirs = SimulationDirectories::new("/work");
        assert_eq!(dirs.input_dir, PathBuf::from("/work/input"));
        assert_eq!(dirs.output_dir, PathBuf::from("/work/output"));
        assert_eq!(dirs.figures_dir, PathBuf::from("/work/figures"));
        assert_eq!(dirs.resolve(Path::new("a.txt")), PathBuf::from("/work/a.txt"));
        assert_eq!(dirs.resolve(Path::new("/b.txt")), PathBuf::from("/b.txt"));
    }

    #[test]
    fn test_creates_missing_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = SimulationDirectories::new(tmp.path().join("case"))
            .with_output_dir(tmp.path().join("results"));
        dirs.validate_simulation_directories().unwrap();
        assert!(dirs.working_dir.is_dir());
        assert!(dirs.input_dir.is_dir());
        assert!(dirs.figures_dir.is_dir());
        assert!(tmp.path().join("results").is_dir());
        // 已存在时不报错
        dirs.validate_simulation_directories().unwrap();
    }
}
