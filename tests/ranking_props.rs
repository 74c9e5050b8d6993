// 该文件是 Kanjian （看见） 项目的一部分。
// tests/ranking_props.rs - 排序选择的性质测试
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

use proptest::prelude::*;

use kanjian::ranking::{ScoredCandidate, select_top_k};

fn scores() -> impl Strategy<Value = Vec<f32>> {
  // 较少的取值让相同分数经常出现
  prop::collection::vec((-8i32..8).prop_map(|v| v as f32 / 8.0), 0..64)
}

fn ordered(a: &ScoredCandidate, b: &ScoredCandidate, higher_is_better: bool) -> bool {
  if a.score == b.score {
    a.class_index < b.class_index
  } else if higher_is_better {
    a.score > b.score
  } else {
    a.score < b.score
  }
}

proptest! {
  #[test]
  fn size_is_min_of_k_and_passing(
    scores in scores(),
    k in -4isize..16,
    threshold in -1.0f32..1.0,
    higher_is_better in any::<bool>(),
  ) {
    let result = select_top_k(&scores, k, threshold, higher_is_better);
    let passing = scores.iter().filter(|s| **s > threshold).count();
    let cap = usize::try_from(k).unwrap_or(0);
    prop_assert_eq!(result.len(), passing.min(cap));
  }

  #[test]
  fn items_pass_threshold_and_keep_their_index(
    scores in scores(),
    k in 0isize..16,
    threshold in -1.0f32..1.0,
    higher_is_better in any::<bool>(),
  ) {
    let result = select_top_k(&scores, k, threshold, higher_is_better);
    for item in &result {
      prop_assert!(item.score > threshold);
      prop_assert_eq!(item.score, scores[item.class_index]);
    }
  }

  #[test]
  fn order_is_stable(
    scores in scores(),
    k in 0isize..16,
    higher_is_better in any::<bool>(),
  ) {
    let result = select_top_k(&scores, k, -1.0, higher_is_better);
    for pair in result.items.windows(2) {
      prop_assert!(ordered(&pair[0], &pair[1], higher_is_better));
    }
  }

  #[test]
  fn smaller_k_is_a_prefix(
    scores in scores(),
    k in 0isize..16,
    threshold in -1.0f32..1.0,
    higher_is_better in any::<bool>(),
  ) {
    let small = select_top_k(&scores, k, threshold, higher_is_better);
    let large = select_top_k(&scores, k + 8, threshold, higher_is_better);
    prop_assert_eq!(&small.items[..], &large.items[..small.len()]);
  }

  #[test]
  fn reselecting_keeps_content(
    scores in scores(),
    k in 0isize..16,
    threshold in -1.0f32..1.0,
    higher_is_better in any::<bool>(),
  ) {
    let first = select_top_k(&scores, k, threshold, higher_is_better);
    let again_input: Vec<f32> = first.iter().map(|c| c.score).collect();
    let again = select_top_k(&again_input, k, threshold, higher_is_better);
    let again_scores: Vec<f32> = again.iter().map(|c| c.score).collect();
    prop_assert_eq!(again_scores, again_input);
  }
}
