// 该文件是 Guijian （轨检） 项目的一部分。
// tests/output.rs - 输出端集成测试
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

mod common;

use common::synthetic_image::rail_crack_frame;
use guijian::{
  FromUrl,
  input::ImageSource,
  model::{CrackDetectorBuilder, DetectionResult, DetectorParams, Model},
  output::{OutputWrapper, Render},
};
use url::Url;

#[test]
fn results_flow_into_jsonl_and_log_outputs() {
  let dir = tempfile::tempdir().unwrap();
  let jsonl = dir.path().join("results.jsonl");
  let outputs = vec![
    OutputWrapper::from_url(&Url::parse(&format!("jsonl://{}", jsonl.display())).unwrap())
      .unwrap(),
    OutputWrapper::from_url(&Url::parse("log:").unwrap()).unwrap(),
  ];

  let detector = CrackDetectorBuilder::new(DetectorParams::default().with_size(200, 200)).build();
  let inspection = detector
    .infer(&ImageSource::Raw(rail_crack_frame()))
    .unwrap();
  outputs.render_result(&inspection).unwrap();

  let text = std::fs::read_to_string(&jsonl).unwrap();
  let saved: DetectionResult = serde_json::from_str(text.trim()).unwrap();
  assert_eq!(saved.detections, inspection.result.detections);
}

#[cfg(feature = "directory_record")]
#[test]
fn significant_frames_are_archived() {
  let dir = tempfile::tempdir().unwrap();
  let url = Url::parse(&format!("folder://{}", dir.path().display())).unwrap();
  let output = OutputWrapper::from_url(&url).unwrap();

  let detector = CrackDetectorBuilder::new(DetectorParams::default().with_size(200, 200)).build();
  let inspection = detector
    .infer(&ImageSource::Raw(rail_crack_frame()))
    .unwrap();
  output.render_result(&inspection).unwrap();

  let year = std::fs::read_dir(dir.path()).unwrap().count();
  assert_eq!(year, 1);
}

#[test]
fn unknown_output_scheme_is_rejected() {
  let url = Url::parse("rtsp://camera/stream").unwrap();
  assert!(OutputWrapper::from_url(&url).is_err());
}
