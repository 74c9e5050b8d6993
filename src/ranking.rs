// 该文件是 Kanjian （看见） 项目的一部分。
// src/ranking.rs - 结果排序与筛选
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

use std::cmp::Ordering;

use tracing::debug;

/// 模型输出的原始分数
pub trait Score: Copy {
  fn confidence(self) -> f32;
}

impl Score for f32 {
  fn confidence(self) -> f32 {
    self
  }
}

/// 量化输出，按 1/255 缩放
impl Score for u8 {
  fn confidence(self) -> f32 {
    self as f32 / 255.0
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCandidate {
  pub score: f32,
  pub class_index: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedResult {
  pub items: Box<[ScoredCandidate]>,
}

impl RankedResult {
  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, ScoredCandidate> {
    self.items.iter()
  }
}

impl<'a> IntoIterator for &'a RankedResult {
  type Item = &'a ScoredCandidate;
  type IntoIter = std::slice::Iter<'a, ScoredCandidate>;

  fn into_iter(self) -> Self::IntoIter {
    self.items.iter()
  }
}

/// 选出分数严格大于 `threshold` 的前 `k` 个结果
///
/// - 每个元素的下标即类别编号；
/// - `higher_is_better` 为真时按分数降序，否则升序；
/// - 分数相同的元素保持输入顺序；
/// - `k <= 0` 时返回空结果。
pub fn select_top_k<S: Score>(
  scores: &[S],
  k: isize,
  threshold: f32,
  higher_is_better: bool,
) -> RankedResult {
  let cap = usize::try_from(k).unwrap_or(0);
  if cap == 0 {
    return RankedResult::default();
  }

  let mut items: Vec<ScoredCandidate> = scores
    .iter()
    .enumerate()
    .map(|(class_index, score)| ScoredCandidate {
      score: score.confidence(),
      class_index,
    })
    .filter(|candidate| candidate.score > threshold)
    .collect();

  // NaN 已被阈值过滤，这里的比较总是有序的
  if higher_is_better {
    items.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
  } else {
    items.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal));
  }
  items.truncate(cap);

  debug!(
    "从 {} 个分数中选出 {} 个结果 (k={}, 阈值={})",
    scores.len(),
    items.len(),
    k,
    threshold
  );

  RankedResult {
    items: items.into_boxed_slice(),
  }
}

/// [`select_top_k`] 的参数集合
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopK {
  k: isize,
  threshold: f32,
  higher_is_better: bool,
}

impl TopK {
  pub fn new(k: isize) -> Self {
    TopK {
      k,
      threshold: 0.0,
      higher_is_better: true,
    }
  }

  pub fn threshold(mut self, threshold: f32) -> Self {
    self.threshold = threshold;
    self
  }

  pub fn higher_is_better(mut self, higher_is_better: bool) -> Self {
    self.higher_is_better = higher_is_better;
    self
  }

  pub fn select<S: Score>(&self, scores: &[S]) -> RankedResult {
    select_top_k(scores, self.k, self.threshold, self.higher_is_better)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn pairs(result: &RankedResult) -> Vec<(f32, usize)> {
    result.iter().map(|c| (c.score, c.class_index)).collect()
  }

  #[test]
  fn top_two_descending() {
    let result = select_top_k(&[0.9f32, 0.95, 0.2], 2, 0.0, true);
    assert_eq!(pairs(&result), vec![(0.95, 1), (0.9, 0)]);
  }

  #[test]
  fn ascending_order() {
    let result = select_top_k(&[0.9f32, 0.95, 0.2], 2, 0.0, false);
    assert_eq!(pairs(&result), vec![(0.2, 2), (0.9, 0)]);
  }

  #[test]
  fn threshold_is_strict() {
    let scores = [0.5f32, 0.25, 0.75];
    assert!(select_top_k(&scores, 3, 0.75, true).is_empty());
    assert!(select_top_k(&scores, 3, 1.0, true).is_empty());
    assert_eq!(pairs(&select_top_k(&scores, 3, 0.5, true)), vec![(0.75, 2)]);
  }

  #[test]
  fn non_positive_k_is_empty() {
    let scores = [0.5f32, 0.6];
    assert!(select_top_k(&scores, 0, -1.0, true).is_empty());
    assert!(select_top_k(&scores, -3, -1.0, true).is_empty());
  }

  #[test]
  fn negative_threshold_keeps_everything_up_to_k() {
    let scores = [-0.5f32, 0.0, -0.25, 0.1];
    let result = select_top_k(&scores, 10, f32::MIN, true);
    assert_eq!(
      pairs(&result),
      vec![(0.1, 3), (0.0, 1), (-0.25, 2), (-0.5, 0)]
    );
  }

  #[test]
  fn equal_scores_keep_input_order() {
    let scores = [0.3f32, 0.7, 0.3, 0.7, 0.3];
    assert_eq!(
      pairs(&select_top_k(&scores, 5, 0.0, true)),
      vec![(0.7, 1), (0.7, 3), (0.3, 0), (0.3, 2), (0.3, 4)]
    );
    assert_eq!(
      pairs(&select_top_k(&scores, 5, 0.0, false)),
      vec![(0.3, 0), (0.3, 2), (0.3, 4), (0.7, 1), (0.7, 3)]
    );
  }

  #[test]
  fn nan_scores_are_dropped() {
    let scores = [f32::NAN, 0.4, f32::NAN];
    assert_eq!(pairs(&select_top_k(&scores, 3, -1.0, true)), vec![(0.4, 1)]);
  }

  #[test]
  fn quantized_scores_are_scaled() {
    let scores = [0u8, 255, 51];
    let result = TopK::new(5).threshold(0.001).select(&scores);
    assert_eq!(pairs(&result), vec![(1.0, 1), (0.2, 2)]);
  }

  #[test]
  fn empty_input() {
    let scores: [f32; 0] = [];
    assert!(select_top_k(&scores, 5, 0.0, true).is_empty());
  }
}
