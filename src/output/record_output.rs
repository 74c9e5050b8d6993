// 该文件是 Kanjian （看见） 项目的一部分。
// src/output/record_output.rs - 文本记录输出
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

use std::{
  fs::File,
  io::{BufWriter, Write},
  path::PathBuf,
};

use thiserror::Error;
use tracing::info;
use url::Url;

use crate::{
  ErrorKind, FromUrl, FromUrlWithScheme, UrlPathError,
  bitmap::DecodedImage,
  labels::Labels,
  output::{Render, label_name},
  ranking::RankedResult,
};

#[derive(Error, Debug)]
pub enum RecordOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("无效的输出路径: {0}")]
  InvalidPath(#[from] UrlPathError),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
}

impl RecordOutputError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      RecordOutputError::SchemeMismatch | RecordOutputError::InvalidPath(_) => ErrorKind::Format,
      RecordOutputError::IoError(_) => ErrorKind::Io,
    }
  }
}

/// 将结果写入文本文件，每行 `标签, 置信度`
///
/// `record:///path/result.txt`，追加 `?record=id` 时以类别编号代替名称。
#[derive(Debug)]
pub struct RecordOutput {
  path: PathBuf,
  label_with_name: bool,
  labels: Option<Labels>,
}

impl FromUrlWithScheme for RecordOutput {
  const SCHEME: &'static str = "record";
}

impl FromUrl for RecordOutput {
  type Error = RecordOutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(RecordOutputError::SchemeMismatch);
    }

    let label_with_name = !url
      .query_pairs()
      .any(|(k, v)| k == "record" && v == "id");

    Ok(RecordOutput {
      path: crate::url_file_path(url)?,
      label_with_name,
      labels: None,
    })
  }
}

impl RecordOutput {
  pub fn with_labels(mut self, labels: Labels) -> Self {
    self.labels = Some(labels);
    self
  }

  pub fn records(&self, result: &RankedResult) -> Vec<String> {
    result
      .iter()
      .map(|item| {
        let name = if self.label_with_name {
          label_name(self.labels.as_ref(), item.class_index)
        } else {
          format!("{}", item.class_index)
        };
        format!("{}, {:.4}", name, item.score)
      })
      .collect()
  }
}

impl Render<DecodedImage, RankedResult> for RecordOutput {
  type Error = RecordOutputError;

  fn render_result(&self, _frame: &DecodedImage, result: &RankedResult) -> Result<(), Self::Error> {
    let records = self.records(result);
    let mut writer = BufWriter::new(File::create(&self.path)?);
    for record in &records {
      writeln!(writer, "{}", record)?;
    }
    writer.flush()?;
    info!("写入 {} 条记录到 {}", records.len(), self.path.display());
    Ok(())
  }
}
