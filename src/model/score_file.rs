// 该文件是 Kanjian （看见） 项目的一部分。
// src/model/score_file.rs - 分数文件回放模型
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

use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use crate::{
  ErrorKind, FromUrl, UrlPathError,
  model::{InputDims, InputType, Model, ModelInfo, ModelInput, ScoreTensor},
  source::{ByteRegion, SourceError},
};

const SCORES_F32_SCHEME: &str = "scores-f32";
const SCORES_U8_SCHEME: &str = "scores-u8";

#[derive(Error, Debug)]
pub enum ScoreFileError {
  #[error("模型路径必须使用 scores-f32 或 scores-u8 方案, 实际为 {0}")]
  SchemeMismatch(String),
  #[error("无效的模型路径: {0}")]
  InvalidPath(#[from] UrlPathError),
  #[error("无效的查询参数 {key}={value}")]
  InvalidQuery { key: String, value: String },
  #[error("分数文件读取失败: {0}")]
  Source(#[from] SourceError),
  #[error("分数文件长度 {0} 不是 4 的整数倍")]
  MisalignedScores(usize),
  #[error("模型输入不匹配: 期望 {expected} 个 {expected_type:?} 元素, 实际 {actual} 个 {actual_type:?} 元素")]
  InputMismatch {
    expected: usize,
    expected_type: InputType,
    actual: usize,
    actual_type: InputType,
  },
}

impl ScoreFileError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      ScoreFileError::Source(e) => e.kind(),
      _ => ErrorKind::Format,
    }
  }
}

/// 分数文件的编码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreEncoding {
  /// 小端序 f32
  Float,
  /// 每个分数一个字节
  Quantized,
}

/// 回放外部推理结果的模型
///
/// 分数文件是外部推理引擎输出张量的原样转储，模型本身不做计算，
/// 只校验输入的尺寸与类型后返回文件中的分数。
#[derive(Debug, Clone)]
pub struct ScoreFileModel {
  scores: ScoreTensor,
  dims: InputDims,
  input_type: InputType,
}

pub struct ScoreFileModelBuilder {
  path: PathBuf,
  encoding: ScoreEncoding,
  dims: InputDims,
  input_type: InputType,
}

impl FromUrl for ScoreFileModelBuilder {
  type Error = ScoreFileError;

  /// `scores-f32:///path/scores.bin?width=224&height=224&channels=3&input=float`
  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    let encoding = match url.scheme() {
      SCORES_F32_SCHEME => ScoreEncoding::Float,
      SCORES_U8_SCHEME => ScoreEncoding::Quantized,
      other => {
        error!("URI scheme mismatch: {}", other);
        return Err(ScoreFileError::SchemeMismatch(other.to_string()));
      }
    };

    let mut builder = ScoreFileModelBuilder::new(crate::url_file_path(url)?, encoding);
    for (key, value) in url.query_pairs() {
      let invalid = || ScoreFileError::InvalidQuery {
        key: key.to_string(),
        value: value.to_string(),
      };
      match &*key {
        "width" => builder.dims.width = value.parse().map_err(|_| invalid())?,
        "height" => builder.dims.height = value.parse().map_err(|_| invalid())?,
        "channels" => builder.dims.channels = value.parse().map_err(|_| invalid())?,
        "input" => {
          builder.input_type = match &*value {
            "float" => InputType::Float,
            "quantized" | "uint8" => InputType::Quantized,
            _ => return Err(invalid()),
          }
        }
        _ => debug!("忽略查询参数 {}={}", key, value),
      }
    }
    Ok(builder)
  }
}

impl ScoreFileModelBuilder {
  pub fn new<P: Into<PathBuf>>(path: P, encoding: ScoreEncoding) -> Self {
    ScoreFileModelBuilder {
      path: path.into(),
      encoding,
      dims: InputDims::default(),
      input_type: InputType::default(),
    }
  }

  pub fn dims(mut self, dims: InputDims) -> Self {
    self.dims = dims;
    self
  }

  pub fn input_type(mut self, input_type: InputType) -> Self {
    self.input_type = input_type;
    self
  }

  pub fn build(self) -> Result<ScoreFileModel, ScoreFileError> {
    info!("加载分数文件: {}", self.path.display());
    let region = ByteRegion::try_open_file(&self.path)?;
    let data = region.base();

    let scores = match self.encoding {
      ScoreEncoding::Float => {
        if data.len() % 4 != 0 {
          return Err(ScoreFileError::MisalignedScores(data.len()));
        }
        ScoreTensor::Float(
          data
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect(),
        )
      }
      ScoreEncoding::Quantized => ScoreTensor::Quantized(data.into()),
    };

    debug!("分数数量: {}", scores.len());
    debug!("模型输入: {} ({:?})", self.dims, self.input_type);

    Ok(ScoreFileModel {
      scores,
      dims: self.dims,
      input_type: self.input_type,
    })
  }
}

impl ModelInfo for ScoreFileModel {
  fn input_dims(&self) -> InputDims {
    self.dims
  }

  fn input_type(&self) -> InputType {
    self.input_type
  }
}

impl Model for ScoreFileModel {
  type Input = ModelInput;
  type Output = ScoreTensor;
  type Error = ScoreFileError;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    let expected = self.dims.elements();
    if input.len() != expected || input.input_type() != self.input_type {
      return Err(ScoreFileError::InputMismatch {
        expected,
        expected_type: self.input_type,
        actual: input.len(),
        actual_type: input.input_type(),
      });
    }
    Ok(self.scores.clone())
  }
}
