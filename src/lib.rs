// 该文件是 Kanjian （看见） 项目的一部分。
// src/lib.rs - 库主文件
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

pub mod bitmap;
pub mod input;
pub mod labels;
pub mod model;
pub mod output;
pub mod ranking;
pub mod source;
pub mod task;

use std::path::PathBuf;

use thiserror::Error;

pub trait FromUrl {
  type Error;
  fn from_url(url: &url::Url) -> Result<Self, Self::Error>
  where
    Self: Sized;
}

pub trait FromUrlWithScheme: FromUrl {
  const SCHEME: &'static str;
}

/// 错误类别，每个模块的错误类型都可以归入其中之一
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// 文件不存在、打开或读取失败、字节数不符
  Io,
  /// 头部过短、通道数不支持、尺寸非法
  Format,
  /// 无法按声明的大小分配缓冲区
  Allocation,
}

#[derive(Error, Debug)]
#[error("URL 路径解码后不是有效的 UTF-8: {path}")]
pub struct UrlPathError {
  pub path: String,
}

/// 取出 URL 中的文件路径，`%20` 等转义序列会被还原
pub fn url_file_path(url: &url::Url) -> Result<PathBuf, UrlPathError> {
  let path = urlencoding::decode(url.path()).map_err(|_| UrlPathError {
    path: url.path().to_string(),
  })?;
  Ok(PathBuf::from(path.into_owned()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn url_file_path_decodes_escapes() {
    let url = url::Url::parse("bmp:///tmp/kanjian 图像/a b.bmp").unwrap();
    assert_eq!(url.path(), "/tmp/kanjian%20%E5%9B%BE%E5%83%8F/a%20b.bmp");
    assert_eq!(
      url_file_path(&url).unwrap(),
      PathBuf::from("/tmp/kanjian 图像/a b.bmp")
    );
  }

  #[test]
  fn url_file_path_rejects_invalid_utf8() {
    let url = url::Url::parse("bmp:///tmp/%FF.bmp").unwrap();
    let err = url_file_path(&url).unwrap_err();
    assert_eq!(err.path, "/tmp/%FF.bmp");
  }
}
