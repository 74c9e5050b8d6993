// 该文件是 Kanjian （看见） 项目的一部分。
// src/model.rs - 模型
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

use std::fmt;

use crate::{
  bitmap::DecodedImage,
  ranking::{RankedResult, TopK},
};

pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

/// 模型输入张量的描述
pub trait ModelInfo {
  fn input_dims(&self) -> InputDims;
  fn input_type(&self) -> InputType;
}

/// 将解码后的图像转换为模型输入
///
/// 实现需保持通道顺序，输出几何尺寸与 `dims` 一致。
pub trait Resize {
  type Error;

  fn resize(
    &self,
    image: &DecodedImage,
    dims: InputDims,
    input_type: InputType,
  ) -> Result<ModelInput, Self::Error>;
}

/// NHWC 输入尺寸（批大小恒为 1）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputDims {
  pub height: u32,
  pub width: u32,
  pub channels: u32,
}

impl InputDims {
  pub fn new(height: u32, width: u32, channels: u32) -> Self {
    InputDims {
      height,
      width,
      channels,
    }
  }

  pub fn of(image: &DecodedImage) -> Self {
    InputDims::new(image.height(), image.width(), image.channels() as u32)
  }

  pub fn elements(&self) -> usize {
    self.height as usize * self.width as usize * self.channels as usize
  }
}

impl Default for InputDims {
  fn default() -> Self {
    InputDims::new(224, 224, 3)
  }
}

impl fmt::Display for InputDims {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}x{}x{}", self.width, self.height, self.channels)
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputType {
  Float,
  #[default]
  Quantized,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelInput {
  Float(Box<[f32]>),
  Quantized(Box<[u8]>),
}

impl ModelInput {
  pub fn len(&self) -> usize {
    match self {
      ModelInput::Float(data) => data.len(),
      ModelInput::Quantized(data) => data.len(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn input_type(&self) -> InputType {
    match self {
      ModelInput::Float(_) => InputType::Float,
      ModelInput::Quantized(_) => InputType::Quantized,
    }
  }
}

/// 模型的原始输出分数
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreTensor {
  Float(Box<[f32]>),
  Quantized(Box<[u8]>),
}

impl ScoreTensor {
  pub fn len(&self) -> usize {
    match self {
      ScoreTensor::Float(data) => data.len(),
      ScoreTensor::Quantized(data) => data.len(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn rank(&self, top_k: &TopK) -> RankedResult {
    match self {
      ScoreTensor::Float(scores) => top_k.select(&scores[..]),
      ScoreTensor::Quantized(scores) => top_k.select(&scores[..]),
    }
  }
}

mod passthrough;
pub use self::passthrough::{Passthrough, PassthroughError};

#[cfg(feature = "score_file_model")]
mod score_file;
#[cfg(feature = "score_file_model")]
pub use self::score_file::{ScoreEncoding, ScoreFileError, ScoreFileModel, ScoreFileModelBuilder};
