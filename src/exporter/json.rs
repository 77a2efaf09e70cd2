//! JSON 报告渲染器

use super::ReportRenderer;
use crate::analytics::Report;
use crate::error::Result;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// 把报告写为单个 JSON 文件
///
/// 先写入同目录下的临时文件再重命名，读取方不会看到写了一半的报告。
#[derive(Debug, Clone)]
pub struct JsonReportRenderer {
    file_name: String,
    pretty: bool,
}

impl JsonReportRenderer {
    pub fn new<S: Into<String>>(file_name: S) -> Self {
        Self { file_name: file_name.into(), pretty: true }
    }

    /// 输出紧凑格式
    pub fn compact(mut self) -> Self {
        self.pretty = false;
        self
    }
}

impl Default for JsonReportRenderer {
    fn default() -> Self {
        Self::new("report.json")
    }
}

impl ReportRenderer for JsonReportRenderer {
    fn name(&self) -> &str {
        "JSON"
    }

    fn render(&self, report: &Report, output_dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(output_dir)?;
        let target = output_dir.join(&self.file_name);
        let staging = output_dir.join(format!(".{}.tmp", self.file_name));

        {
            let file = std::fs::File::create(&staging)?;
            let mut writer = BufWriter::new(file);
            if self.pretty {
                serde_json::to_writer_pretty(&mut writer, report)?;
            } else {
                serde_json::to_writer(&mut writer, report)?;
            }
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        std::fs::rename(&staging, &target)?;

        #[cfg(feature = "logging")]
        tracing::info!("报告已写入: {}", target.display());

        Ok(target)
    }
}
