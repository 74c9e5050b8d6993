// 该文件是 Kanjian （看见） 项目的一部分。
// src/bitmap.rs - 位图解码
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

use crate::{ErrorKind, source::SourceError};

mod decoder;
mod header;

pub use self::decoder::BitmapDecoder;
pub use self::header::{BitmapHeader, MIN_HEADER_SIZE};

#[derive(Error, Debug)]
pub enum DecodeError {
  #[error("字节来源错误: {0}")]
  Source(#[from] SourceError),
  #[error("位图头部过短: 至少需要 {expected} 字节, 实际 {actual} 字节")]
  HeaderTooShort { expected: usize, actual: usize },
  #[error("缺少位图签名 \"BM\"")]
  MissingSignature,
  #[error("不支持的通道数: {channels} (位深 {bits_per_pixel})")]
  UnsupportedChannels { channels: i32, bits_per_pixel: i32 },
  #[error("图像宽度非法: {0}")]
  InvalidWidth(i32),
  #[error("图像高度非法: {0}")]
  InvalidHeight(i32),
  #[error("像素数据被截断: 需要 {expected} 字节, 实际 {actual} 字节")]
  PixelDataTruncated { expected: u64, actual: usize },
  #[error("无法分配 {size} 字节的像素缓冲区")]
  Allocation { size: usize },
  #[error("像素缓冲区大小溢出: {width}x{height}x{channels}")]
  SizeOverflow {
    width: usize,
    height: usize,
    channels: usize,
  },
}

impl DecodeError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      DecodeError::Source(e) => e.kind(),
      DecodeError::Allocation { .. } | DecodeError::SizeOverflow { .. } => ErrorKind::Allocation,
      _ => ErrorKind::Format,
    }
  }
}

/// 输出通道排列，始终为 R,G,B[,A] 顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
  Gray = 1,
  Rgb = 3,
  Rgba = 4,
}

impl Channels {
  pub fn from_count(count: i32) -> Option<Self> {
    match count {
      1 => Some(Channels::Gray),
      3 => Some(Channels::Rgb),
      4 => Some(Channels::Rgba),
      _ => None,
    }
  }

  pub fn count(self) -> usize {
    self as usize
  }
}

/// 解码后的图像
///
/// 像素按行优先、首行在上排列，长度恰为 `width * height * channels`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
  width: u32,
  height: u32,
  channels: Channels,
  pixels: Box<[u8]>,
}

impl DecodedImage {
  pub(crate) fn new(width: u32, height: u32, channels: Channels, pixels: Box<[u8]>) -> Self {
    debug_assert_eq!(
      pixels.len(),
      width as usize * height as usize * channels.count()
    );
    Self {
      width,
      height,
      channels,
      pixels,
    }
  }

  pub fn width(&self) -> u32 {
    self.width
  }

  pub fn height(&self) -> u32 {
    self.height
  }

  pub fn channels(&self) -> usize {
    self.channels.count()
  }

  pub fn layout(&self) -> Channels {
    self.channels
  }

  pub fn pixels(&self) -> &[u8] {
    &self.pixels
  }

  pub fn into_pixels(self) -> Box<[u8]> {
    self.pixels
  }
}

impl AsRef<[u8]> for DecodedImage {
  fn as_ref(&self) -> &[u8] {
    &self.pixels
  }
}
