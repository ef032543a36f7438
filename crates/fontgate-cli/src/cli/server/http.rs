//! Just enough HTTP/1.1 for the front end: one request per connection,
//! `Content-Length` bodies only, response always closes the connection.

use anyhow::{bail, Context, Result};
use fontgate_core::proxy::{Headers, ProxyRequest, ProxyResponse};
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

const MAX_HEAD_BYTES: usize = 64 * 1024;
const MAX_BODY_BYTES: usize = 1024 * 1024;

fn head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Reads and parses one request. `peer` becomes `remote_addr`.
pub async fn read_request<R: AsyncRead + Unpin>(
    reader: &mut R,
    peer: Option<SocketAddr>,
) -> Result<ProxyRequest> {
    let mut buf = Vec::with_capacity(4096);
    let mut chunk = [0u8; 4096];
    let end = loop {
        if let Some(end) = head_end(&buf) {
            break end;
        }
        if buf.len() > MAX_HEAD_BYTES {
            bail!("request head larger than {} bytes", MAX_HEAD_BYTES);
        }
        let n = reader.read(&mut chunk).await.context("read request")?;
        if n == 0 {
            bail!("connection closed before request head was complete");
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = std::str::from_utf8(&buf[..end]).context("request head is not UTF-8")?;
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or("");
    let mut parts = request_line.split_whitespace();
    let (method, target) = match (parts.next(), parts.next(), parts.next()) {
        (Some(m), Some(t), Some(v)) if v.starts_with("HTTP/1.") => (m, t),
        _ => bail!("malformed request line {:?}", request_line),
    };
    if !target.starts_with('/') {
        bail!("unsupported request target {:?}", target);
    }

    let mut req = ProxyRequest::from_target(method, target);
    for line in lines {
        req.headers.push_line(line);
    }
    req.remote_addr = peer;

    if req.headers.contains("Transfer-Encoding") {
        bail!("chunked request bodies are not supported");
    }
    let body_len = match req.headers.get("Content-Length") {
        Some(v) => v
            .parse::<usize>()
            .with_context(|| format!("bad Content-Length {:?}", v))?,
        None => 0,
    };
    if body_len > MAX_BODY_BYTES {
        bail!("request body larger than {} bytes", MAX_BODY_BYTES);
    }
    let mut body = buf[end + 4..].to_vec();
    while body.len() < body_len {
        let n = reader.read(&mut chunk).await.context("read request body")?;
        if n == 0 {
            bail!("connection closed mid-body");
        }
        body.extend_from_slice(&chunk[..n]);
    }
    body.truncate(body_len);
    req.body = body;
    Ok(req)
}

/// Writes `resp` with framing owned by this server. For HEAD the upstream
/// `Content-Length` is kept and no body is sent.
pub async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    resp: &ProxyResponse,
    head_only: bool,
) -> Result<()> {
    let mut out = format!("HTTP/1.1 {} {}\r\n", resp.status, resp.reason).into_bytes();
    let mut headers = Headers::new();
    for (name, value) in resp.headers.iter() {
        if name.eq_ignore_ascii_case("connection")
            || name.eq_ignore_ascii_case("transfer-encoding")
            || (!head_only && name.eq_ignore_ascii_case("content-length"))
        {
            continue;
        }
        headers.append(name, value);
    }
    if !head_only {
        headers.append("Content-Length", resp.body.len().to_string());
    }
    headers.append("Connection", "close");
    for (name, value) in headers.iter() {
        out.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
    }
    out.extend_from_slice(b"\r\n");
    if !head_only {
        out.extend_from_slice(&resp.body);
    }
    writer.write_all(&out).await.context("write response")?;
    writer.flush().await.context("flush response")?;
    Ok(())
}
