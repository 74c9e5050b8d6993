// 该文件是 Kanjian （看见） 项目的一部分。
// src/bitmap/decoder.rs - 位图解码器
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

use tracing::debug;

use crate::{
  bitmap::{BitmapHeader, Channels, DecodeError, DecodedImage},
  source::ByteRegion,
};

/// 位图解码器
///
/// 默认与原有行为一致，不校验 `"BM"` 签名；
/// 可通过 [`BitmapDecoder::strict_signature`] 打开。
#[derive(Debug, Default, Clone)]
pub struct BitmapDecoder {
  strict_signature: bool,
}

/// 由头部推导出的像素布局，所有偏移都已确认落在区域之内
struct PixelLayout {
  pixel_offset: usize,
  width: usize,
  rows: usize,
  channels: Channels,
  row_size: usize,
  top_down: bool,
}

impl PixelLayout {
  fn new(header: &BitmapHeader, available: usize) -> Result<Self, DecodeError> {
    if header.width <= 0 {
      return Err(DecodeError::InvalidWidth(header.width));
    }
    if header.height == 0 {
      return Err(DecodeError::InvalidHeight(header.height));
    }
    let channels =
      Channels::from_count(header.channel_count()).ok_or(DecodeError::UnsupportedChannels {
        channels: header.channel_count(),
        bits_per_pixel: header.bits_per_pixel,
      })?;

    let width = header.width as u64;
    let rows = header.rows() as u64;
    let pixel_size = channels.count() as u64;

    // 每行按 4 字节对齐
    let row_size = (8 * pixel_size * width).div_ceil(32) * 4;

    // 最后一行不要求带有填充字节
    let required = (header.pixel_offset as u64)
      .saturating_add((rows - 1).saturating_mul(row_size))
      .saturating_add(width * pixel_size);
    if required > available as u64 {
      return Err(DecodeError::PixelDataTruncated {
        expected: required,
        actual: available,
      });
    }

    Ok(PixelLayout {
      pixel_offset: header.pixel_offset as usize,
      width: width as usize,
      rows: rows as usize,
      channels,
      row_size: row_size as usize,
      top_down: header.top_down(),
    })
  }

  fn output_size(&self) -> Result<usize, DecodeError> {
    self
      .width
      .checked_mul(self.rows)
      .and_then(|n| n.checked_mul(self.channels.count()))
      .ok_or(DecodeError::SizeOverflow {
        width: self.width,
        height: self.rows,
        channels: self.channels.count(),
      })
  }

  /// 第 `row` 个输出行对应的源数据切片（不含填充）
  fn source_row<'d>(&self, data: &'d [u8], row: usize) -> &'d [u8] {
    let source_row = if self.top_down {
      row
    } else {
      self.rows - 1 - row
    };
    let start = self.pixel_offset + source_row * self.row_size;
    &data[start..start + self.width * self.channels.count()]
  }
}

impl BitmapDecoder {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn strict_signature(mut self, strict: bool) -> Self {
    self.strict_signature = strict;
    self
  }

  /// 解码字节区域；无效区域直接报错，不会读取其内容
  pub fn decode(&self, region: &ByteRegion<'_>) -> Result<DecodedImage, DecodeError> {
    let data = region.require_valid()?;
    self.decode_bytes(data)
  }

  pub fn decode_bytes(&self, data: &[u8]) -> Result<DecodedImage, DecodeError> {
    let header = BitmapHeader::parse(data)?;
    if self.strict_signature && !BitmapHeader::has_signature(data) {
      return Err(DecodeError::MissingSignature);
    }

    debug!(
      "宽度, 高度, 通道数: {}, {}, {}",
      header.width,
      header.height,
      header.channel_count()
    );

    let layout = PixelLayout::new(&header, data.len())?;
    let size = layout.output_size()?;

    let mut pixels = Vec::new();
    pixels
      .try_reserve_exact(size)
      .map_err(|_| DecodeError::Allocation { size })?;

    for row in 0..layout.rows {
      let source = layout.source_row(data, row);
      match layout.channels {
        Channels::Gray => pixels.extend_from_slice(source),
        // BGR -> RGB
        Channels::Rgb => {
          for bgr in source.chunks_exact(3) {
            pixels.extend_from_slice(&[bgr[2], bgr[1], bgr[0]]);
          }
        }
        // BGRA -> RGBA
        Channels::Rgba => {
          for bgra in source.chunks_exact(4) {
            pixels.extend_from_slice(&[bgra[2], bgra[1], bgra[0], bgra[3]]);
          }
        }
      }
    }

    debug!("解码完成: {} 字节", pixels.len());
    Ok(DecodedImage::new(
      layout.width as u32,
      layout.rows as u32,
      layout.channels,
      pixels.into_boxed_slice(),
    ))
  }
}
