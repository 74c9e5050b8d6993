// 该文件是 Kanjian （看见） 项目的一部分。
// src/output.rs - 输出定义
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
use url::Url;

use crate::{
  ErrorKind, FromUrl, FromUrlWithScheme, bitmap::DecodedImage, labels::Labels,
  ranking::RankedResult,
};

pub trait Render<Frame, Output>: Sized {
  type Error;
  fn render_result(&self, frame: &Frame, result: &Output) -> Result<(), Self::Error>;
}

mod log_output;
pub use self::log_output::{LogOutput, LogOutputError};

#[cfg(feature = "record_output")]
mod record_output;
#[cfg(feature = "record_output")]
pub use self::record_output::{RecordOutput, RecordOutputError};

#[derive(Error, Debug)]
pub enum OutputError {
  #[error("日志输出错误: {0}")]
  LogOutputError(#[from] LogOutputError),
  #[cfg(feature = "record_output")]
  #[error("记录输出错误: {0}")]
  RecordOutputError(#[from] RecordOutputError),
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

impl OutputError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      OutputError::LogOutputError(_) | OutputError::SchemeMismatch => ErrorKind::Format,
      #[cfg(feature = "record_output")]
      OutputError::RecordOutputError(e) => e.kind(),
    }
  }
}

/// 结果中类别编号对应的名称，没有标签时使用编号本身
pub(crate) fn label_name(labels: Option<&Labels>, class_index: usize) -> String {
  match labels.and_then(|labels| labels.get(class_index)) {
    Some(name) => name.to_string(),
    None => format!("#{}", class_index),
  }
}

pub enum OutputWrapper {
  LogOutput(LogOutput),
  #[cfg(feature = "record_output")]
  RecordOutput(RecordOutput),
}

impl FromUrl for OutputWrapper {
  type Error = OutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      LogOutput::SCHEME => Ok(OutputWrapper::LogOutput(LogOutput::from_url(url)?)),
      #[cfg(feature = "record_output")]
      RecordOutput::SCHEME => Ok(OutputWrapper::RecordOutput(RecordOutput::from_url(url)?)),
      _ => Err(OutputError::SchemeMismatch),
    }
  }
}

impl OutputWrapper {
  pub fn with_labels(self, labels: Labels) -> Self {
    match self {
      OutputWrapper::LogOutput(output) => OutputWrapper::LogOutput(output.with_labels(labels)),
      #[cfg(feature = "record_output")]
      OutputWrapper::RecordOutput(output) => {
        OutputWrapper::RecordOutput(output.with_labels(labels))
      }
    }
  }
}

impl Render<DecodedImage, RankedResult> for OutputWrapper {
  type Error = OutputError;

  fn render_result(&self, frame: &DecodedImage, result: &RankedResult) -> Result<(), Self::Error> {
    match self {
      OutputWrapper::LogOutput(output) => output
        .render_result(frame, result)
        .map_err(OutputError::from),
      #[cfg(feature = "record_output")]
      OutputWrapper::RecordOutput(output) => output
        .render_result(frame, result)
        .map_err(OutputError::from),
    }
  }
}
