// 该文件是 Kanjian （看见） 项目的一部分。
// src/source.rs - 字节来源
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

use std::{
  fs::File,
  io::Read,
  path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, error};

use crate::ErrorKind;

#[derive(Error, Debug)]
pub enum SourceError {
  #[error("无法打开文件 '{path}': {source}")]
  Open {
    path: PathBuf,
    source: std::io::Error,
  },
  #[error("无法获取文件大小 '{path}': {source}")]
  Metadata {
    path: PathBuf,
    source: std::io::Error,
  },
  #[error("文件 '{path}' 过大 ({size} 字节)，超出可寻址范围")]
  TooLarge { path: PathBuf, size: u64 },
  #[error("为 '{path}' 分配 {size} 字节缓冲区失败")]
  Allocation { path: PathBuf, size: usize },
  #[error("读取 '{path}' 失败: {source}")]
  Read {
    path: PathBuf,
    source: std::io::Error,
  },
  #[error("读取 '{path}' 字节数不符: 期望 {expected}, 实际 {actual}")]
  SizeMismatch {
    path: PathBuf,
    expected: usize,
    actual: usize,
  },
  #[error("字节区域无效")]
  Invalid,
}

impl SourceError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      SourceError::TooLarge { .. } | SourceError::Allocation { .. } => ErrorKind::Allocation,
      _ => ErrorKind::Io,
    }
  }
}

#[derive(Debug)]
enum Storage<'a> {
  /// 从文件完整复制而来，随区域一起释放
  Owned(Box<[u8]>),
  /// 外部持有的内存，区域不复制也不释放
  Borrowed(&'a [u8]),
  Invalid,
}

/// 只读字节区域
///
/// 两种来源共享同一组读取接口：
/// - [`ByteRegion::open_file`] 将文件一次性读入自有缓冲区；
/// - [`ByteRegion::wrap`] 直接引用调用方提供的内存（例如内嵌资源）。
///
/// 借用的内存在解码期间不得被修改，这由生命周期 `'a` 保证。
#[derive(Debug)]
pub struct ByteRegion<'a> {
  storage: Storage<'a>,
}

impl ByteRegion<'static> {
  /// 读取整个文件；任何失败都会被记录并返回无效区域
  pub fn open_file<P: AsRef<Path>>(path: P) -> Self {
    match Self::try_open_file(path) {
      Ok(region) => region,
      Err(e) => {
        error!("{}", e);
        Self::invalid()
      }
    }
  }

  /// 读取整个文件，失败时返回具体原因
  ///
  /// 文件大小取自文件系统元数据，缓冲区按该大小一次分配、一次读满。
  /// 读到的字节数与预期不符时不会保留任何部分数据。
  pub fn try_open_file<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
    let path = path.as_ref();

    let file = File::open(path).map_err(|source| SourceError::Open {
      path: path.to_path_buf(),
      source,
    })?;

    let size = file
      .metadata()
      .map_err(|source| SourceError::Metadata {
        path: path.to_path_buf(),
        source,
      })?
      .len();
    let expected = usize::try_from(size).map_err(|_| SourceError::TooLarge {
      path: path.to_path_buf(),
      size,
    })?;

    let buffer = read_exact_size(file, expected, path)?;
    debug!("读取文件 {}: {} 字节", path.display(), buffer.len());
    Ok(ByteRegion {
      storage: Storage::Owned(buffer),
    })
  }
}

/// 按预期大小一次分配、一次读满；字节数不符时丢弃已读内容
fn read_exact_size<R: Read>(
  reader: R,
  expected: usize,
  path: &Path,
) -> Result<Box<[u8]>, SourceError> {
  let mut buffer = Vec::new();
  buffer
    .try_reserve_exact(expected)
    .map_err(|_| SourceError::Allocation {
      path: path.to_path_buf(),
      size: expected,
    })?;

  let actual = reader
    .take(expected as u64)
    .read_to_end(&mut buffer)
    .map_err(|source| SourceError::Read {
      path: path.to_path_buf(),
      source,
    })?;
  if actual != expected {
    return Err(SourceError::SizeMismatch {
      path: path.to_path_buf(),
      expected,
      actual,
    });
  }

  Ok(buffer.into_boxed_slice())
}

impl<'a> ByteRegion<'a> {
  /// 包装外部内存，`None` 对应空指针，得到无效区域
  pub fn wrap(data: Option<&'a [u8]>) -> Self {
    match data {
      Some(data) => Self::borrowed(data),
      None => Self::invalid(),
    }
  }

  pub fn borrowed(data: &'a [u8]) -> Self {
    ByteRegion {
      storage: Storage::Borrowed(data),
    }
  }

  pub fn invalid() -> Self {
    ByteRegion {
      storage: Storage::Invalid,
    }
  }

  pub fn is_valid(&self) -> bool {
    !matches!(self.storage, Storage::Invalid)
  }

  pub fn is_owned(&self) -> bool {
    matches!(self.storage, Storage::Owned(_))
  }

  /// 区域内的字节
  ///
  /// 前置条件：调用方应先检查 [`ByteRegion::is_valid`]。
  /// 对无效区域调用时返回空切片，不会越界。
  pub fn base(&self) -> &[u8] {
    match &self.storage {
      Storage::Owned(data) => data,
      Storage::Borrowed(data) => data,
      Storage::Invalid => &[],
    }
  }

  /// 区域长度（字节），前置条件同 [`ByteRegion::base`]
  pub fn bytes(&self) -> usize {
    self.base().len()
  }

  pub fn require_valid(&self) -> Result<&[u8], SourceError> {
    if self.is_valid() {
      Ok(self.base())
    } else {
      Err(SourceError::Invalid)
    }
  }
}

impl<'a> From<&'a [u8]> for ByteRegion<'a> {
  fn from(data: &'a [u8]) -> Self {
    ByteRegion::borrowed(data)
  }
}

impl AsRef<[u8]> for ByteRegion<'_> {
  fn as_ref(&self) -> &[u8] {
    self.base()
  }
}
