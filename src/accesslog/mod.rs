//! 访问日志读取与解析
//!
//! - [`discover`]：按目录、文件名模式和时效策略发现日志文件
//! - [`io`]：跨块边界安全的分块行读取器
//! - [`parser`]：combined 格式单行解析
//! - [`utils`]：路径、查询串和 referrer 处理工具

pub mod discover;
pub mod io;
pub mod parser;
pub mod types;
pub mod utils;

pub use discover::{RecencyPolicy, discover_files};
pub use io::ChunkedLines;
pub use types::{ParseFailure, ParseFailureKind, ParseResult, RequestRecord};
pub use utils::{blog_slug, clean_slug};
