// 该文件是 Kanjian （看见） 项目的一部分。
// src/bin/label_image.rs - 图像分类标注
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

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use url::Url;

use kanjian::{
  FromUrl,
  input::InputWrapper,
  labels::Labels,
  model::{Passthrough, ScoreFileModelBuilder},
  output::OutputWrapper,
  ranking::TopK,
  task::{OneShotTask, RepeatShotTask, Task},
};
use tracing::info;

/// Kanjian 项目参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 输入位图，例如 bmp:///data/grace_hopper.bmp
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 模型输出的分数文件，例如 scores-f32:///data/scores.bin?width=224&height=224
  #[arg(long, value_name = "MODEL")]
  pub model: Url,
  /// 输出位置
  #[arg(long, value_name = "OUTPUT", default_value = "log:")]
  pub output: Url,
  /// 标签文件，每行一个
  #[arg(long, value_name = "FILE")]
  pub labels: Option<PathBuf>,
  /// 最多显示的结果数
  #[arg(long, default_value_t = 5, allow_negative_numbers = true)]
  pub num_results: isize,
  /// 置信度阈值，只保留严格大于该值的结果
  #[arg(long, default_value_t = 0.001, allow_negative_numbers = true)]
  pub threshold: f32,
  /// 分数越低越好
  #[arg(long)]
  pub ascending: bool,
  /// 推理重复次数
  #[arg(long, default_value_t = 1)]
  pub count: usize,
  /// 浮点输入的均值
  #[arg(long, default_value_t = 127.5)]
  pub input_mean: f32,
  /// 浮点输入的标准差
  #[arg(long, default_value_t = 127.5)]
  pub input_std: f32,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("输入来源: {}", args.input);
  info!("模型路径: {}", args.model);
  info!("输出路径: {}", args.output);

  let input = InputWrapper::from_url(&args.input)?;
  let model = ScoreFileModelBuilder::from_url(&args.model)?.build()?;
  let mut output = OutputWrapper::from_url(&args.output)?;
  if let Some(path) = &args.labels {
    let labels = Labels::open(path)?;
    info!("标签数量: {} (补齐后 {})", labels.found(), labels.len());
    output = output.with_labels(labels);
  }

  let resize = Passthrough::default()
    .input_mean(args.input_mean)
    .input_std(args.input_std);
  let top_k = TopK::new(args.num_results)
    .threshold(args.threshold)
    .higher_is_better(!args.ascending);

  if args.count > 1 {
    RepeatShotTask::new(resize, top_k, args.count).run_task(input, model, output)?;
  } else {
    OneShotTask::new(resize, top_k).run_task(input, model, output)?;
  }

  Ok(())
}
