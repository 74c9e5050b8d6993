// 该文件是 Kanjian （看见） 项目的一部分。
// src/model/passthrough.rs - 等尺寸输入转换
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
use tracing::debug;

use crate::{
  ErrorKind,
  bitmap::DecodedImage,
  model::{InputDims, InputType, ModelInput, Resize},
};

#[derive(Error, Debug)]
pub enum PassthroughError {
  #[error("图像尺寸不匹配: 期望 {expected}, 实际 {actual}")]
  GeometryMismatch {
    expected: InputDims,
    actual: InputDims,
  },
  #[error("标准差必须为正数: {0}")]
  InvalidStd(f32),
}

impl PassthroughError {
  pub fn kind(&self) -> ErrorKind {
    ErrorKind::Format
  }
}

/// 不做重采样的输入转换
///
/// 只接受尺寸与模型输入完全一致的图像。
/// 浮点输入按 `(value - input_mean) / input_std` 归一化。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Passthrough {
  input_mean: f32,
  input_std: f32,
}

impl Default for Passthrough {
  fn default() -> Self {
    Passthrough {
      input_mean: 127.5,
      input_std: 127.5,
    }
  }
}

impl Passthrough {
  pub fn input_mean(mut self, input_mean: f32) -> Self {
    self.input_mean = input_mean;
    self
  }

  pub fn input_std(mut self, input_std: f32) -> Self {
    self.input_std = input_std;
    self
  }
}

impl Resize for Passthrough {
  type Error = PassthroughError;

  fn resize(
    &self,
    image: &DecodedImage,
    dims: InputDims,
    input_type: InputType,
  ) -> Result<ModelInput, Self::Error> {
    let actual = InputDims::of(image);
    if actual != dims {
      return Err(PassthroughError::GeometryMismatch {
        expected: dims,
        actual,
      });
    }

    debug!("输入转换: {} ({:?})", dims, input_type);
    match input_type {
      InputType::Quantized => Ok(ModelInput::Quantized(image.pixels().into())),
      InputType::Float => {
        if self.input_std.is_nan() || self.input_std <= 0.0 {
          return Err(PassthroughError::InvalidStd(self.input_std));
        }
        let data = image
          .pixels()
          .iter()
          .map(|&value| (value as f32 - self.input_mean) / self.input_std)
          .collect();
        Ok(ModelInput::Float(data))
      }
    }
  }
}
