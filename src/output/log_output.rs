// 该文件是 Kanjian （看见） 项目的一部分。
// src/output/log_output.rs - 日志输出
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

use thiserror::Error;
use tracing::info;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  bitmap::DecodedImage,
  labels::Labels,
  output::{Render, label_name},
  ranking::RankedResult,
};

#[derive(Error, Debug)]
pub enum LogOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

/// 将结果逐行写入日志: `置信度: 编号 标签`
#[derive(Debug, Default)]
pub struct LogOutput {
  labels: Option<Labels>,
}

impl FromUrlWithScheme for LogOutput {
  const SCHEME: &'static str = "log";
}

impl FromUrl for LogOutput {
  type Error = LogOutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(LogOutputError::SchemeMismatch);
    }
    Ok(LogOutput::default())
  }
}

impl LogOutput {
  pub fn with_labels(mut self, labels: Labels) -> Self {
    self.labels = Some(labels);
    self
  }

  pub fn lines(&self, result: &RankedResult) -> Vec<String> {
    result
      .iter()
      .map(|item| {
        format!(
          "{:.6}: {} {}",
          item.score,
          item.class_index,
          label_name(self.labels.as_ref(), item.class_index)
        )
      })
      .collect()
  }
}

impl Render<DecodedImage, RankedResult> for LogOutput {
  type Error = LogOutputError;

  fn render_result(&self, frame: &DecodedImage, result: &RankedResult) -> Result<(), Self::Error> {
    info!(
      "图像 {}x{}: {} 个结果",
      frame.width(),
      frame.height(),
      result.len()
    );
    for line in self.lines(result) {
      info!("{}", line);
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ranking::select_top_k;

  #[test]
  fn lines_use_labels() {
    let output = LogOutput::default().with_labels(Labels::parse(b"cat\ndog\n"));
    let result = select_top_k(&[0.25f32, 0.75], 2, 0.0, true);
    assert_eq!(
      output.lines(&result),
      vec!["0.750000: 1 dog".to_string(), "0.250000: 0 cat".to_string()]
    );
  }

  #[test]
  fn lines_without_labels() {
    let output = LogOutput::from_url(&Url::parse("log:").unwrap()).unwrap();
    let result = select_top_k(&[0.5f32], 1, 0.0, true);
    assert_eq!(output.lines(&result), vec!["0.500000: 0 #0".to_string()]);
  }
}
