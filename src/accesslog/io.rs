//! 分块行读取器
//!
//! 以固定字节数分块读取文件，把跨块的行重新拼接完整后逐行产出。
//! 产出的行序列与一次性读入整个文件后执行 `str::lines` 的结果逐字节一致。

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// 按块读取并产出完整行的迭代器
///
/// - 行结束符为 `\n`，紧邻其前的 `\r` 会被去掉
/// - 文件末尾没有换行符的残行仍会被产出，末尾单独的 `\r` 原样保留
/// - 读取出错时产出一个 `Err`，之后迭代结束
/// - `Interrupted` 错误会自动重试
pub struct ChunkedLines<R: Read> {
    reader: R,
    buf: Vec<u8>,
    /// 尚未遇到换行符的残行
    pending: Vec<u8>,
    /// 已经切分好、等待产出的行
    ready: VecDeque<Vec<u8>>,
    done: bool,
}

impl ChunkedLines<File> {
    /// 打开文件并创建读取器
    ///
    /// # Errors
    /// 文件无法打开时返回 I/O 错误
    pub fn open<P: AsRef<Path>>(path: P, chunk_size: usize) -> io::Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(file, chunk_size))
    }
}

impl<R: Read> ChunkedLines<R> {
    /// 用任意 `Read` 创建读取器，`chunk_size` 为 0 时按 1 处理
    pub fn new(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            buf: vec![0; chunk_size.max(1)],
            pending: Vec::new(),
            ready: VecDeque::new(),
            done: false,
        }
    }

    /// 读取下一块，把其中完整的行移入 `ready`。返回读取的字节数
    fn fill(&mut self) -> io::Result<usize> {
        let n = loop {
            match self.reader.read(&mut self.buf) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };

        let mut chunk = &self.buf[..n];
        while let Some(pos) = chunk.iter().position(|&b| b == b'\n') {
            self.pending.extend_from_slice(&chunk[..pos]);
            let mut line = std::mem::take(&mut self.pending);
            strip_cr(&mut line);
            self.ready.push_back(line);
            chunk = &chunk[pos + 1..];
        }
        self.pending.extend_from_slice(chunk);

        Ok(n)
    }
}

fn strip_cr(line: &mut Vec<u8>) {
    if line.last() == Some(&b'\r') {
        line.pop();
    }
}

impl<R: Read> Iterator for ChunkedLines<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(line) = self.ready.pop_front() {
                return Some(Ok(line));
            }
            if self.done {
                return None;
            }

            match self.fill() {
                Ok(0) => {
                    self.done = true;
                    if !self.pending.is_empty() {
                        return Some(Ok(std::mem::take(&mut self.pending)));
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    self.done = true;
                    self.ready.clear();
                    self.pending.clear();
                    return Some(Err(e));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn collect(content: &str, chunk_size: usize) -> Vec<String> {
        ChunkedLines::new(Cursor::new(content.as_bytes().to_vec()), chunk_size)
            .map(|line| String::from_utf8(line.unwrap()).unwrap())
            .collect()
    }

    #[test]
    fn test_chunk_size_invariance() {
        let content = "first line\nsecond, a bit longer line\r\n\nfourth 你好\nlast without newline";
        let expected: Vec<String> = content.lines().map(str::to_string).collect();
        for chunk_size in 1..=content.len() + 1 {
            assert_eq!(collect(content, chunk_size), expected, "chunk_size = {chunk_size}");
        }
    }

    #[test]
    fn test_trailing_newline_and_empty_input() {
        assert_eq!(collect("a\nb\n", 3), vec!["a", "b"]);
        assert!(collect("", 4).is_empty());
        assert_eq!(collect("\n", 4), vec![""]);
        assert_eq!(collect("only\r\n", 2), vec!["only"]);
    }

    #[test]
    fn test_bare_cr_at_eof_is_kept() {
        let content = "a\nb\r";
        for chunk_size in 1..=content.len() + 1 {
            assert_eq!(collect(content, chunk_size), vec!["a", "b\r"], "chunk_size = {chunk_size}");
        }
        let expected: Vec<String> = content.lines().map(str::to_string).collect();
        assert_eq!(collect(content, 2), expected);
    }

    struct FlakyReader {
        data: Cursor<Vec<u8>>,
        calls: usize,
    }

    impl Read for FlakyReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.calls += 1;
            match self.calls {
                1 => Err(io::Error::new(io::ErrorKind::Interrupted, "retry")),
                4 => Err(io::Error::other("disk gone")),
                _ => self.data.read(buf),
            }
        }
    }

    #[test]
    fn test_interrupted_is_retried_and_error_ends_sequence() {
        let reader = FlakyReader {
            data: Cursor::new(b"ab\ncd\nef".to_vec()),
            calls: 0,
        };
        let items: Vec<_> = ChunkedLines::new(reader, 3).collect();

        // 第 2、3 次读取分别产出 "ab" 与 "cd"，第 4 次读取失败，残行 "ef" 被丢弃
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_ref().unwrap(), b"ab");
        assert_eq!(items[1].as_ref().unwrap(), b"cd");
        assert!(items[2].is_err());
    }

    #[test]
    fn test_open_missing_file() {
        let err = ChunkedLines::open("/definitely/not/here.log", 16).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
