// ==========================================
// 选课分班系统 - CSV 行解析器
// ==========================================
// 输出: 表头 → 值 的行映射 (表头与值均去除首尾空白)
// 跳过完全空白的行
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub type RawRow = HashMap<String, String>;

pub struct RowParser;

impl RowParser {
    /// 从文件解析 (仅支持 .csv)
    pub fn parse_file(path: impl AsRef<Path>) -> ImportResult<Vec<RawRow>> {
        let path = path.as_ref();

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        if let Some(ext) = path.extension() {
            if ext != "csv" {
                return Err(ImportError::UnsupportedFormat(
                    ext.to_string_lossy().to_string(),
                ));
            }
        }

        let file = File::open(path)?;
        Self::parse_reader(file)
    }

    /// 从任意 reader 解析
    pub fn parse_reader<R: Read>(reader: R) -> ImportResult<Vec<RawRow>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(reader);

        // 读取表头
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let mut row = HashMap::new();

            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    row.insert(header.clone(), value.trim().to_string());
                }
            }

            // 跳过完全空白的行
            if row.values().all(|v| v.is_empty()) {
                continue;
            }

            rows.push(row);
        }

        Ok(rows)
    }
}
