// 该文件是 Kanjian （看见） 项目的一部分。
// src/task.rs - 推理任务
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

use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::{
  bitmap::DecodedImage,
  model::{Model, ModelInfo, ModelInput, Resize, ScoreTensor},
  output::Render,
  ranking::{RankedResult, TopK},
};

pub trait Task<I, M, O>: Sized {
  type Error;
  fn run_task(self, input: I, model: M, output: O) -> Result<(), Self::Error>;
}

/// 单次推理
pub struct OneShotTask<R> {
  resize: R,
  top_k: TopK,
}

impl<R> OneShotTask<R> {
  pub fn new(resize: R, top_k: TopK) -> Self {
    OneShotTask { resize, top_k }
  }
}

impl<
  R: Resize<Error = RZE>,
  RZE: std::error::Error + Sync + Send + 'static,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: IntoIterator<Item = DecodedImage>,
  M: Model<Input = ModelInput, Output = ScoreTensor, Error = ME> + ModelInfo,
  O: Render<DecodedImage, RankedResult, Error = RE>,
> Task<I, M, O> for OneShotTask<R>
{
  type Error = anyhow::Error;

  fn run_task(self, input: I, model: M, output: O) -> Result<(), Self::Error> {
    RepeatShotTask::new(self.resize, self.top_k, 1).run_task(input, model, output)
  }
}

/// 重复推理，统计平均耗时，只对最后一次的输出排序
pub struct RepeatShotTask<R> {
  resize: R,
  top_k: TopK,
  loop_count: usize,
}

impl<R> RepeatShotTask<R> {
  /// `loop_count` 至少为 1
  pub fn new(resize: R, top_k: TopK, loop_count: usize) -> Self {
    RepeatShotTask {
      resize,
      top_k,
      loop_count: loop_count.max(1),
    }
  }
}

impl<
  R: Resize<Error = RZE>,
  RZE: std::error::Error + Sync + Send + 'static,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: IntoIterator<Item = DecodedImage>,
  M: Model<Input = ModelInput, Output = ScoreTensor, Error = ME> + ModelInfo,
  O: Render<DecodedImage, RankedResult, Error = RE>,
> Task<I, M, O> for RepeatShotTask<R>
{
  type Error = anyhow::Error;

  fn run_task(self, input: I, model: M, output: O) -> Result<(), Self::Error> {
    info!("开始任务...");
    let frame = input
      .into_iter()
      .next()
      .ok_or_else(|| anyhow::anyhow!("没有输入帧"))?;

    let dims = model.input_dims();
    let now = Instant::now();
    let model_input = self.resize.resize(&frame, dims, model.input_type())?;
    info!("输入转换完成，耗时: {:.2?}", now.elapsed());

    let mut times = Vec::with_capacity(self.loop_count);
    let mut scores = None;
    for i in 0..self.loop_count {
      let now = Instant::now();
      scores = Some(model.infer(&model_input)?);
      let elapsed = now.elapsed();
      info!("({})推理完成，耗时: {:.2?}", i, elapsed);
      times.push(elapsed);
    }
    let scores = scores.ok_or_else(|| anyhow::anyhow!("没有推理结果"))?;

    if times.len() > 1 {
      warn!(
        "平均推理时间: {:.2?}",
        times.iter().sum::<Duration>() / times.len() as u32
      );
    }

    let result = scores.rank(&self.top_k);
    info!("共 {} 个分数，选出 {} 个结果", scores.len(), result.len());
    output.render_result(&frame, &result)?;
    info!("任务完成");

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::cell::RefCell;

  use super::*;
  use crate::{
    bitmap::BitmapDecoder,
    model::{InputDims, InputType, Passthrough},
  };

  #[derive(Debug, thiserror::Error)]
  #[error("不会发生")]
  struct Never;

  struct FixedModel {
    scores: Vec<f32>,
    calls: RefCell<usize>,
  }

  impl Model for &FixedModel {
    type Input = ModelInput;
    type Output = ScoreTensor;
    type Error = Never;

    fn infer(&self, _input: &Self::Input) -> Result<Self::Output, Self::Error> {
      *self.calls.borrow_mut() += 1;
      Ok(ScoreTensor::Float(self.scores.clone().into_boxed_slice()))
    }
  }

  impl ModelInfo for &FixedModel {
    fn input_dims(&self) -> InputDims {
      InputDims::new(1, 1, 3)
    }

    fn input_type(&self) -> InputType {
      InputType::Float
    }
  }

  #[derive(Default)]
  struct Capture {
    results: RefCell<Vec<RankedResult>>,
  }

  impl Render<DecodedImage, RankedResult> for &Capture {
    type Error = Never;

    fn render_result(
      &self,
      _frame: &DecodedImage,
      result: &RankedResult,
    ) -> Result<(), Self::Error> {
      self.results.borrow_mut().push(result.clone());
      Ok(())
    }
  }

  fn one_pixel() -> DecodedImage {
    let mut data = vec![0u8; 54];
    data[10..14].copy_from_slice(&54u32.to_le_bytes());
    data[18..22].copy_from_slice(&1i32.to_le_bytes());
    data[22..26].copy_from_slice(&1i32.to_le_bytes());
    data[28..32].copy_from_slice(&24i32.to_le_bytes());
    data.extend_from_slice(&[0, 0, 255, 0]);
    BitmapDecoder::new().decode_bytes(&data).unwrap()
  }

  #[test]
  fn one_shot_ranks_scores() {
    let model = FixedModel {
      scores: vec![0.1, 0.7, 0.2],
      calls: RefCell::new(0),
    };
    let capture = Capture::default();

    OneShotTask::new(Passthrough::default(), TopK::new(2).threshold(0.15))
      .run_task(vec![one_pixel()], &model, &capture)
      .unwrap();

    let results = capture.results.borrow();
    assert_eq!(results.len(), 1);
    let indices: Vec<usize> = results[0].iter().map(|c| c.class_index).collect();
    assert_eq!(indices, vec![1, 2]);
    assert_eq!(*model.calls.borrow(), 1);
  }

  #[test]
  fn repeat_shot_invokes_loop_count_times() {
    let model = FixedModel {
      scores: vec![0.5],
      calls: RefCell::new(0),
    };
    let capture = Capture::default();

    RepeatShotTask::new(Passthrough::default(), TopK::new(1), 4)
      .run_task(vec![one_pixel()], &model, &capture)
      .unwrap();

    assert_eq!(*model.calls.borrow(), 4);
    assert_eq!(capture.results.borrow().len(), 1);
  }

  #[test]
  fn empty_input_fails() {
    let model = FixedModel {
      scores: vec![0.5],
      calls: RefCell::new(0),
    };
    let capture = Capture::default();

    let result = OneShotTask::new(Passthrough::default(), TopK::new(1)).run_task(
      Vec::<DecodedImage>::new(),
      &model,
      &capture,
    );
    assert!(result.is_err());
    assert!(capture.results.borrow().is_empty());
  }

  #[test]
  fn geometry_mismatch_fails() {
    let model = FixedModel {
      scores: vec![0.5],
      calls: RefCell::new(0),
    };
    let capture = Capture::default();

    let mut data = vec![0u8; 54];
    data[10..14].copy_from_slice(&54u32.to_le_bytes());
    data[18..22].copy_from_slice(&2i32.to_le_bytes());
    data[22..26].copy_from_slice(&1i32.to_le_bytes());
    data[28..32].copy_from_slice(&24i32.to_le_bytes());
    data.extend_from_slice(&[0; 8]);
    let image = BitmapDecoder::new().decode_bytes(&data).unwrap();

    let result = OneShotTask::new(Passthrough::default(), TopK::new(1)).run_task(
      vec![image],
      &model,
      &capture,
    );
    assert!(result.is_err());
    assert_eq!(*model.calls.borrow(), 0);
  }
}
