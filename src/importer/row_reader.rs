// ==========================================
// 商品目录导入系统 - 行读取器
// ==========================================
// 职责: 将分隔文本解析为按文件顺序的原始行（惰性、单遍）
// 约束:
// - 前 N 条记录无条件跳过（表头，空行同样计数）
// - 不过滤空白行/空行，由调用方决定是否跳过
// - 行号为记录起始的物理行号（引号内换行的记录占多行）
// - 列数以读到的第一条非空记录为准（表头或数据）
// ==========================================

use crate::domain::import::RawRow;
use crate::importer::error::{ImportError, ImportResult};
use csv::{ReaderBuilder, StringRecord};
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

const QUOTE: u8 = b'"';

pub struct RowReader<R: Read> {
    source: BufReader<R>,
    delimiter: u8,
    /// 构造时为确定列数而预读的记录
    pending: VecDeque<ImportResult<RawRow>>,
    column_count: Option<usize>,
    to_skip: usize,
    next_line: u64,
}

impl RowReader<File> {
    /// 打开文件
    ///
    /// # 错误
    /// - FileNotFound: 文件不存在
    /// - FileReadError: 无法打开
    /// - CsvParseError: 首条记录不是合法分隔文本
    pub fn open(path: &Path, delimiter: u8, rows_to_skip: usize) -> ImportResult<Self> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }
        let file = File::open(path)?;
        Self::from_reader(file, delimiter, rows_to_skip)
    }
}

impl<R: Read> RowReader<R> {
    pub fn from_reader(reader: R, delimiter: u8, rows_to_skip: usize) -> ImportResult<Self> {
        let mut rows = Self {
            source: BufReader::new(reader),
            delimiter,
            pending: VecDeque::new(),
            column_count: None,
            to_skip: rows_to_skip,
            next_line: 1,
        };

        // 预读到第一条非空记录以确定列数
        while let Some(record) = rows.read_record() {
            let record = record?;
            let column_count = (!record.fields.is_empty()).then_some(record.fields.len());
            rows.pending.push_back(Ok(record));
            if column_count.is_some() {
                rows.column_count = column_count;
                break;
            }
        }

        Ok(rows)
    }

    /// 文件列数（空文件为 None）
    pub fn column_count(&self) -> Option<usize> {
        self.column_count
    }

    /// 读取一条逻辑记录
    ///
    /// 引号未闭合时继续读入下一物理行；空行返回无字段的 RawRow
    fn read_record(&mut self) -> Option<ImportResult<RawRow>> {
        let line = self.next_line;
        let mut buf = Vec::new();
        let mut quotes = 0usize;

        loop {
            let start = buf.len();
            match self.source.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    self.next_line += 1;
                    quotes += buf[start..].iter().filter(|b| **b == QUOTE).count();
                    if quotes % 2 == 0 {
                        break;
                    }
                }
                Err(e) => return Some(Err(e.into())),
            }
        }

        if buf.is_empty() {
            return None;
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
        if buf.is_empty() {
            return Some(Ok(RawRow::new(line, Vec::new())));
        }

        Some(self.parse_record(line, &buf))
    }

    fn parse_record(&self, line: u64, bytes: &[u8]) -> ImportResult<RawRow> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(bytes);
        let mut record = StringRecord::new();
        reader
            .read_record(&mut record)
            .map_err(|e| ImportError::CsvParseError {
                line,
                message: e.to_string(),
            })?;
        Ok(RawRow::new(line, record.iter().map(str::to_string).collect()))
    }
}

impl<R: Read> Iterator for RowReader<R> {
    type Item = ImportResult<RawRow>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.pending.pop_front() {
                Some(record) => record,
                None => self.read_record()?,
            };
            let row = match record {
                Ok(row) => row,
                Err(e) => return Some(Err(e)),
            };

            if self.to_skip > 0 {
                self.to_skip -= 1;
                continue;
            }
            return Some(Ok(row));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(input: &str, delimiter: u8, skip: usize) -> Vec<RawRow> {
        RowReader::from_reader(input.as_bytes(), delimiter, skip)
            .unwrap()
            .collect::<ImportResult<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_skips_header_rows_and_keeps_line_numbers() {
        let rows = read_all("Name,Price\nWidget,10\nGadget,5\n", b',', 1);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[0].fields, vec!["Widget", "10"]);
        assert_eq!(rows[1].line, 3);
    }

    #[test]
    fn test_pipe_delimiter_and_quoted_fields() {
        let rows = read_all("a|b\n\"x|y\"|z\n", b'|', 1);
        assert_eq!(rows[0].fields, vec!["x|y", "z"]);
    }

    #[test]
    fn test_blank_rows_not_filtered() {
        let rows = read_all("h1,h2\n,\nA,B\n", b',', 1);
        assert_eq!(rows.len(), 2);
        assert!(rows[0].is_blank());
    }

    #[test]
    fn test_empty_lines_kept_with_physical_line_numbers() {
        let rows = read_all("h1,h2\nA,B\n\n\nC,D\n", b',', 1);
        let lines: Vec<u64> = rows.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![2, 3, 4, 5]);
        assert!(rows[1].is_blank());
        assert!(rows[2].is_blank());
        assert_eq!(rows[3].fields, vec!["C", "D"]);
    }

    #[test]
    fn test_quoted_newline_spans_lines() {
        let rows = read_all("h1,h2\r\n\"two\nlines\",x\r\nnext,y\r\n", b',', 1);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[0].fields, vec!["two\nlines", "x"]);
        assert_eq!(rows[1].line, 4);
        assert_eq!(rows[1].fields, vec!["next", "y"]);
    }

    #[test]
    fn test_column_count_skips_leading_empty_lines() {
        let reader = RowReader::from_reader("\nh1,h2\n1,2\n".as_bytes(), b',', 2).unwrap();
        assert_eq!(reader.column_count(), Some(2));
        let rows: Vec<RawRow> = reader.collect::<ImportResult<Vec<_>>>().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].line, 3);
    }

    #[test]
    fn test_column_count_from_first_record() {
        let reader = RowReader::from_reader("h1,h2,h3\n1,2\n".as_bytes(), b',', 1).unwrap();
        assert_eq!(reader.column_count(), Some(3));

        let empty = RowReader::from_reader("".as_bytes(), b',', 1).unwrap();
        assert_eq!(empty.column_count(), None);
        assert_eq!(empty.count(), 0);
    }

    #[test]
    fn test_skip_larger_than_file() {
        assert!(read_all("only\n", b',', 3).is_empty());
    }

    #[test]
    fn test_missing_file() {
        let result = RowReader::open(Path::new("/nonexistent/products.csv"), b',', 1);
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_invalid_utf8_is_parse_error() {
        let bytes: &[u8] = b"h\n\xff\xfe\n";
        let results: Vec<_> = RowReader::from_reader(bytes, b',', 1).unwrap().collect();
        assert!(matches!(results[0], Err(ImportError::CsvParseError { .. })));
    }
}
