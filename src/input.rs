// 该文件是 Kanjian （看见） 项目的一部分。
// src/input.rs - 图像输入
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

use crate::{ErrorKind, FromUrl, bitmap::DecodedImage};

#[cfg(feature = "read_bitmap_file")]
mod read_bitmap_file;
#[cfg(feature = "read_bitmap_file")]
pub use self::read_bitmap_file::{BitmapFileInput, BitmapFileInputError, BitmapFileInputIter};

#[derive(Error, Debug)]
pub enum InputError {
  #[cfg(feature = "read_bitmap_file")]
  #[error("位图文件输入错误: {0}")]
  BitmapFileInputError(#[from] BitmapFileInputError),
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

impl InputError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      #[cfg(feature = "read_bitmap_file")]
      InputError::BitmapFileInputError(e) => e.kind(),
      InputError::SchemeMismatch => ErrorKind::Io,
    }
  }
}

pub enum InputWrapper {
  #[cfg(feature = "read_bitmap_file")]
  ReadBitmapFile(BitmapFileInput),
}

impl FromUrl for InputWrapper {
  type Error = InputError;

  fn from_url(url: &url::Url) -> Result<Self, Self::Error> {
    #[cfg(feature = "read_bitmap_file")]
    {
      use crate::FromUrlWithScheme;

      if url.scheme() == BitmapFileInput::SCHEME {
        let input = BitmapFileInput::from_url(url)?;
        return Ok(InputWrapper::ReadBitmapFile(input));
      }
    }
    let _ = url;
    Err(InputError::SchemeMismatch)
  }
}

impl IntoIterator for InputWrapper {
  type Item = DecodedImage;
  type IntoIter = InputWrapperIter;

  fn into_iter(self) -> Self::IntoIter {
    match self {
      #[cfg(feature = "read_bitmap_file")]
      InputWrapper::ReadBitmapFile(input) => InputWrapperIter::ReadBitmapFile(input.into_iter()),
    }
  }
}

pub enum InputWrapperIter {
  #[cfg(feature = "read_bitmap_file")]
  ReadBitmapFile(BitmapFileInputIter),
}

impl Iterator for InputWrapperIter {
  type Item = DecodedImage;

  fn next(&mut self) -> Option<Self::Item> {
    match self {
      #[cfg(feature = "read_bitmap_file")]
      InputWrapperIter::ReadBitmapFile(input) => input.next(),
    }
  }
}
