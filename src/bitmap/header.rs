// 该文件是 Kanjian （看见） 项目的一部分。
// src/bitmap/header.rs - 位图头部
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

use crate::bitmap::DecodeError;

const SIGNATURE: &[u8; 2] = b"BM";
const PIXEL_OFFSET_AT: usize = 10;
const WIDTH_AT: usize = 18;
const HEIGHT_AT: usize = 22;
const BITS_PER_PIXEL_AT: usize = 28;

/// 读取全部头部字段所需的最少字节数
pub const MIN_HEADER_SIZE: usize = BITS_PER_PIXEL_AT + 4;

/// 位图头部字段，均为小端序
///
/// ```text
/// 偏移 10: 像素数据起始偏移
/// 偏移 18: 宽度（有符号）
/// 偏移 22: 高度（有符号，负数表示自上而下存储）
/// 偏移 28: 每像素位数
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapHeader {
  pub pixel_offset: u32,
  pub width: i32,
  pub height: i32,
  pub bits_per_pixel: i32,
}

impl BitmapHeader {
  /// 解析头部，长度只在此处检查一次
  pub fn parse(data: &[u8]) -> Result<Self, DecodeError> {
    if data.len() < MIN_HEADER_SIZE {
      return Err(DecodeError::HeaderTooShort {
        expected: MIN_HEADER_SIZE,
        actual: data.len(),
      });
    }

    Ok(BitmapHeader {
      pixel_offset: u32::from_le_bytes(field(data, PIXEL_OFFSET_AT)),
      width: i32::from_le_bytes(field(data, WIDTH_AT)),
      height: i32::from_le_bytes(field(data, HEIGHT_AT)),
      bits_per_pixel: i32::from_le_bytes(field(data, BITS_PER_PIXEL_AT)),
    })
  }

  pub fn has_signature(data: &[u8]) -> bool {
    data.starts_with(SIGNATURE)
  }

  pub fn channel_count(&self) -> i32 {
    self.bits_per_pixel / 8
  }

  pub fn top_down(&self) -> bool {
    self.height < 0
  }

  pub fn rows(&self) -> u32 {
    self.height.unsigned_abs()
  }
}

fn field(data: &[u8], offset: usize) -> [u8; 4] {
  let mut bytes = [0u8; 4];
  bytes.copy_from_slice(&data[offset..offset + 4]);
  bytes
}
