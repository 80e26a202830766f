// 该文件是 Guijian （轨检） 项目的一部分。
// src/input/data_url.rs - data URL 输入
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

use base64::{Engine as _, engine::general_purpose::STANDARD};
use tracing::debug;
use url::Url;

use super::{DecodeError, ImageSource, InputError};
use crate::{FromUrl, FromUrlWithScheme};

const DATA_URL_PREFIX: &str = "data:";

/// 解析 `data:[<mime>][;base64],<payload>` 并返回其中的字节
pub fn decode_data_url(text: &str) -> Result<Vec<u8>, DecodeError> {
  let rest = text
    .trim()
    .strip_prefix(DATA_URL_PREFIX)
    .ok_or_else(|| DecodeError::InvalidDataUrl("缺少 data: 前缀".to_string()))?;

  let (meta, payload) = rest
    .split_once(',')
    .ok_or_else(|| DecodeError::InvalidDataUrl("缺少数据分隔符 ','".to_string()))?;

  let mut params = meta.split(';');
  let mime = params.next().unwrap_or_default().trim();
  if !mime.is_empty() && !mime.to_ascii_lowercase().starts_with("image/") {
    return Err(DecodeError::InvalidDataUrl(format!("不支持的 MIME 类型: {}", mime)));
  }
  let is_base64 = params.any(|p| p.trim().eq_ignore_ascii_case("base64"));

  let payload = urlencoding::decode_binary(payload.as_bytes());
  let bytes = if is_base64 {
    let compact = payload
      .iter()
      .copied()
      .filter(|b| !b.is_ascii_whitespace())
      .collect::<Vec<_>>();
    STANDARD.decode(compact)?
  } else {
    payload.into_owned()
  };

  debug!("data URL 解码完成: {} 字节", bytes.len());
  if bytes.is_empty() {
    return Err(DecodeError::Empty);
  }
  Ok(bytes)
}

/// 以 data URL 形式给出的单帧输入
pub struct DataUrlInput {
  text: Option<String>,
}

impl FromUrlWithScheme for DataUrlInput {
  const SCHEME: &'static str = "data";
}

impl FromUrl for DataUrlInput {
  type Error = InputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(InputError::SchemeMismatch(url.scheme().to_string()));
    }

    Ok(DataUrlInput {
      text: Some(url.as_str().to_string()),
    })
  }
}

impl Iterator for DataUrlInput {
  type Item = ImageSource;

  fn next(&mut self) -> Option<Self::Item> {
    self.text.take().map(ImageSource::DataUrl)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn base64_payload_is_decoded() {
    let bytes = decode_data_url("data:image/png;base64,AAEC/w==").unwrap();
    assert_eq!(bytes, vec![0x00, 0x01, 0x02, 0xff]);
  }

  #[test]
  fn whitespace_and_percent_escapes_are_tolerated() {
    let bytes = decode_data_url("data:image/png;base64,AAEC%2F w==").unwrap();
    assert_eq!(bytes, vec![0x00, 0x01, 0x02, 0xff]);
  }

  #[test]
  fn plain_payload_is_percent_decoded() {
    let bytes = decode_data_url("data:,GIF%38").unwrap();
    assert_eq!(bytes, b"GIF8".to_vec());
  }

  #[test]
  fn malformed_urls_are_rejected() {
    assert!(matches!(
      decode_data_url("image/png;base64,AAAA"),
      Err(DecodeError::InvalidDataUrl(_))
    ));
    assert!(matches!(
      decode_data_url("data:image/png;base64"),
      Err(DecodeError::InvalidDataUrl(_))
    ));
    assert!(matches!(
      decode_data_url("data:text/plain;base64,AAAA"),
      Err(DecodeError::InvalidDataUrl(_))
    ));
    assert!(matches!(
      decode_data_url("data:image/png;base64,!!!!"),
      Err(DecodeError::Base64(_))
    ));
    assert!(matches!(
      decode_data_url("data:image/png;base64,"),
      Err(DecodeError::Empty)
    ));
  }
}
