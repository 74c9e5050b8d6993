// 该文件是 Kanjian （看见） 项目的一部分。
// src/input/read_bitmap_file.rs - 位图文件输入
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
use tracing::{error, info};
use url::Url;

use crate::{
  ErrorKind, FromUrl, FromUrlWithScheme, UrlPathError,
  bitmap::{BitmapDecoder, DecodeError, DecodedImage},
  source::{ByteRegion, SourceError},
};

#[derive(Error, Debug)]
pub enum BitmapFileInputError {
  #[error("URI schema mismatch")]
  SchemaMismatch,
  #[error("Invalid path: {0}")]
  InvalidPath(#[from] UrlPathError),
  #[error("Invalid query parameter {key}={value}")]
  InvalidQuery { key: String, value: String },
  #[error("I/O error: {0}")]
  IoError(#[from] SourceError),
  #[error("Bitmap decoding error: {0}")]
  DecodeError(#[from] DecodeError),
}

impl BitmapFileInputError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      BitmapFileInputError::SchemaMismatch => ErrorKind::Io,
      BitmapFileInputError::InvalidPath(_) | BitmapFileInputError::InvalidQuery { .. } => {
        ErrorKind::Format
      }
      BitmapFileInputError::IoError(e) => e.kind(),
      BitmapFileInputError::DecodeError(e) => e.kind(),
    }
  }
}

/// 从文件读入并解码的单张位图
///
/// `bmp:///path/to/image.bmp`，追加 `?strict` 或 `?strict=true` 时校验 `"BM"` 签名。
pub struct BitmapFileInput {
  image: Option<DecodedImage>,
}

impl FromUrlWithScheme for BitmapFileInput {
  const SCHEME: &'static str = "bmp";
}

impl FromUrl for BitmapFileInput {
  type Error = BitmapFileInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(BitmapFileInputError::SchemaMismatch);
    }

    let mut strict = false;
    for (key, value) in url.query_pairs() {
      if key == "strict" {
        strict = match &*value {
          "" | "true" | "1" => true,
          "false" | "0" => false,
          _ => {
            return Err(BitmapFileInputError::InvalidQuery {
              key: key.to_string(),
              value: value.to_string(),
            });
          }
        };
      }
    }
    let decoder = BitmapDecoder::new().strict_signature(strict);

    let path = crate::url_file_path(url)?;
    info!("读取位图文件: {}", path.display());
    let region = ByteRegion::try_open_file(&path)?;
    Self::decode(&region, &decoder)
  }
}

impl BitmapFileInput {
  /// 从任意字节区域解码，例如内嵌在程序中的资源
  pub fn decode(
    region: &ByteRegion<'_>,
    decoder: &BitmapDecoder,
  ) -> Result<Self, BitmapFileInputError> {
    let image = decoder.decode(region)?;
    info!(
      "位图解码完成: {}x{}x{}",
      image.width(),
      image.height(),
      image.channels()
    );
    Ok(BitmapFileInput { image: Some(image) })
  }
}

impl IntoIterator for BitmapFileInput {
  type Item = DecodedImage;
  type IntoIter = BitmapFileInputIter;

  fn into_iter(self) -> Self::IntoIter {
    BitmapFileInputIter { inner: self }
  }
}

pub struct BitmapFileInputIter {
  inner: BitmapFileInput,
}

impl Iterator for BitmapFileInputIter {
  type Item = DecodedImage;

  fn next(&mut self) -> Option<Self::Item> {
    self.inner.image.take()
  }
}
