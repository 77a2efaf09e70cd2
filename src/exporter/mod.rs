//! 报告输出模块
//!
//! 提供统一的报告渲染接口，默认实现把报告写为 JSON 文件。

pub mod json;

pub use json::JsonReportRenderer;

use crate::analytics::Report;
use crate::error::Result;
use std::path::{Path, PathBuf};

/// 报告渲染器的统一接口
pub trait ReportRenderer {
    /// 渲染器名称
    fn name(&self) -> &str;

    /// 把报告写入 `output_dir`，返回生成的文件路径
    fn render(&self, report: &Report, output_dir: &Path) -> Result<PathBuf>;
}
