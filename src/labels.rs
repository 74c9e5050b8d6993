// 该文件是 Kanjian （看见） 项目的一部分。
// src/labels.rs - 类别标签
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::{
  ErrorKind,
  source::{ByteRegion, SourceError},
};

/// 标签数量补齐到该值的整数倍
const LABEL_PADDING: usize = 16;

#[derive(Error, Debug)]
pub enum LabelsError {
  #[error("标签文件读取失败: {0}")]
  Source(#[from] SourceError),
}

impl LabelsError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      LabelsError::Source(e) => e.kind(),
    }
  }
}

/// 每行一个标签
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Labels {
  names: Vec<String>,
  found: usize,
}

impl Labels {
  pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LabelsError> {
    let region = ByteRegion::try_open_file(path.as_ref())?;
    let labels = Self::parse(region.base());
    debug!(
      "读取标签文件 {}: {} 个标签",
      path.as_ref().display(),
      labels.found
    );
    Ok(labels)
  }

  pub fn parse(data: &[u8]) -> Self {
    let text = String::from_utf8_lossy(data);
    let mut names: Vec<String> = text.lines().map(str::to_string).collect();
    let found = names.len();
    let padded = found.next_multiple_of(LABEL_PADDING);
    names.resize(padded, String::new());
    Labels { names, found }
  }

  /// 文件中实际读到的标签数
  pub fn found(&self) -> usize {
    self.found
  }

  /// 补齐后的标签数
  pub fn len(&self) -> usize {
    self.names.len()
  }

  pub fn is_empty(&self) -> bool {
    self.names.is_empty()
  }

  pub fn get(&self, index: usize) -> Option<&str> {
    self.names.get(index).map(String::as_str)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_pads_to_sixteen() {
    let labels = Labels::parse(b"background\ntench\ngoldfish\n");
    assert_eq!(labels.found(), 3);
    assert_eq!(labels.len(), 16);
    assert_eq!(labels.get(1), Some("tench"));
    assert_eq!(labels.get(3), Some(""));
    assert_eq!(labels.get(16), None);
  }

  #[test]
  fn parse_exact_multiple_is_not_padded() {
    let text: String = (0..32).map(|i| format!("label{}\n", i)).collect();
    let labels = Labels::parse(text.as_bytes());
    assert_eq!(labels.found(), 32);
    assert_eq!(labels.len(), 32);
    assert_eq!(labels.get(31), Some("label31"));
  }

  #[test]
  fn parse_crlf_and_missing_trailing_newline() {
    let labels = Labels::parse(b"cat\r\ndog");
    assert_eq!(labels.found(), 2);
    assert_eq!(labels.get(0), Some("cat"));
    assert_eq!(labels.get(1), Some("dog"));
  }

  #[test]
  fn parse_empty() {
    let labels = Labels::parse(b"");
    assert_eq!(labels.found(), 0);
    assert!(labels.is_empty());
  }

  #[test]
  fn open_missing_file() {
    let err = Labels::open("/nonexistent/kanjian/labels.txt").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
  }

  #[test]
  fn open_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("labels.txt");
    std::fs::write(&path, "a\nb\n").unwrap();
    let labels = Labels::open(&path).unwrap();
    assert_eq!(labels.found(), 2);
    assert_eq!(labels.get(1), Some("b"));
  }
}
