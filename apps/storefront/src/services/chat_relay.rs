// apps/storefront/src/services/chat_relay.rs

//! Forwards a prompt to the local generation server and re-emits its
//! newline-delimited JSON reply one complete line at a time.

use crate::config::AppConfig;
use crate::errors::AppError;
use actix_web::web::Bytes;
use futures_util::stream::{self, BoxStream, StreamExt};
use serde::Serialize;
use std::collections::VecDeque;
use tracing::{error, info, instrument};

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
  model: &'a str,
  prompt: &'a str,
  stream: bool,
}

/// Reassembles lines that arrive split across network chunks.
#[derive(Debug, Default)]
pub struct LineBuffer {
  pending: Vec<u8>,
}

impl LineBuffer {
  /// Feeds a chunk and returns every line it completed, each terminated by `\n`.
  /// Blank lines are dropped.
  pub fn push(&mut self, chunk: &[u8]) -> Vec<Bytes> {
    self.pending.extend_from_slice(chunk);
    let mut lines = Vec::new();
    while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
      let raw: Vec<u8> = self.pending.drain(..=pos).collect();
      if let Some(line) = Self::frame(&raw[..raw.len() - 1]) {
        lines.push(line);
      }
    }
    lines
  }

  /// Flushes a trailing line that was not newline-terminated.
  pub fn finish(&mut self) -> Option<Bytes> {
    let rest = std::mem::take(&mut self.pending);
    Self::frame(&rest)
  }

  fn frame(raw: &[u8]) -> Option<Bytes> {
    let line = raw.strip_suffix(b"\r").unwrap_or(raw);
    if line.iter().all(u8::is_ascii_whitespace) {
      return None;
    }
    let mut framed = Vec::with_capacity(line.len() + 1);
    framed.extend_from_slice(line);
    framed.push(b'\n');
    Some(Bytes::from(framed))
  }
}

struct RelayState<S> {
  upstream: S,
  buffer: LineBuffer,
  ready: VecDeque<Bytes>,
  finished: bool,
}

/// Opens the upstream request. Connection failures and non-2xx statuses are
/// reported before any bytes are relayed; a failure after that ends the stream.
#[instrument(name = "chat_relay::open", skip(http, config, prompt), fields(model = %config.chat_model, prompt_len = prompt.len()))]
pub async fn open_stream(
  http: &reqwest::Client,
  config: &AppConfig,
  prompt: &str,
) -> Result<BoxStream<'static, Result<Bytes, AppError>>, AppError> {
  let body = GenerateRequest {
    model: &config.chat_model,
    prompt,
    stream: true,
  };

  let response = http
    .post(&config.chat_endpoint)
    .json(&body)
    .send()
    .await
    .map_err(|e| {
      error!(error = %e, endpoint = %config.chat_endpoint, "Chat upstream unreachable.");
      AppError::Upstream(format!("Could not reach the chat service: {}", e))
    })?;

  let status = response.status();
  if !status.is_success() {
    error!(%status, "Chat upstream returned an error status.");
    return Err(AppError::Upstream(format!("Chat service responded with {}", status)));
  }
  info!("Chat upstream stream opened.");

  let state = RelayState {
    upstream: Box::pin(response.bytes_stream()),
    buffer: LineBuffer::default(),
    ready: VecDeque::new(),
    finished: false,
  };

  Ok(stream::unfold(state, |mut st| async move {
    loop {
      if let Some(line) = st.ready.pop_front() {
        return Some((Ok(line), st));
      }
      if st.finished {
        return None;
      }
      match st.upstream.next().await {
        Some(Ok(chunk)) => st.ready.extend(st.buffer.push(&chunk)),
        Some(Err(e)) => {
          error!(error = %e, "Chat upstream failed mid-stream.");
          st.finished = true;
          return Some((Err(AppError::Upstream(e.to_string())), st));
        }
        None => {
          st.finished = true;
          st.ready.extend(st.buffer.finish());
        }
      }
    }
  })
  .boxed())
}
