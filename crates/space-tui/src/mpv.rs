/// mpv-backed audio output for the ambient background sound.
///
/// Architecture:
///
/// ```text
///   MpvOutput (AudioOutput)  ── OutputRequest ──▶  output_task
///                                                     │  owns MpvDriver + MpvHandle
///                                                     ├── writer_task  ← MpvRequest → socket
///                                                     └── reader_task  ← JSON lines
///                                                            └── response (request_id) → oneshot
/// ```
///
/// `start_loop` / `stop` only enqueue; `output_task` applies requests one at a
/// time, so a stop always lands after the start that preceded it.  mpv is
/// spawned on the first start and reused afterwards.
///
/// Platform notes:
/// - Unix:   Unix domain sockets
/// - Windows: Named pipes  \\.\pipe\<name>
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, info, warn};

use space_core::error::PlaybackError;
use space_core::playback::{AudioOutput, StartAck};

#[cfg(unix)]
use tokio::net::UnixStream;

#[cfg(windows)]
use tokio::net::windows::named_pipe::ClientOptions;

// ── global request-id counter ─────────────────────────────────────────────────

static NEXT_REQ_ID: AtomicU64 = AtomicU64::new(1);

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<anyhow::Result<Value>>>>>;

struct PendingRequest {
    req_id: u64,
    payload: String, // serialised JSON line (already has '\n')
    reply: oneshot::Sender<anyhow::Result<Value>>,
}

// ── IPC handle ────────────────────────────────────────────────────────────────

/// Handle to the mpv writer task.  `send()` fires a command and awaits the
/// response.
#[derive(Clone)]
pub struct MpvHandle {
    tx: mpsc::Sender<PendingRequest>,
}

impl MpvHandle {
    pub async fn send(&self, command: Value) -> anyhow::Result<Value> {
        let req_id = NEXT_REQ_ID.fetch_add(1, Ordering::Relaxed);
        let msg = json!({ "command": command, "request_id": req_id });
        let mut raw = serde_json::to_string(&msg)?;
        raw.push('\n');

        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(PendingRequest {
                req_id,
                payload: raw,
                reply: reply_tx,
            })
            .await
            .map_err(|_| anyhow::anyhow!("mpv writer task gone"))?;

        tokio::time::timeout(tokio::time::Duration::from_secs(5), reply_rx)
            .await
            .map_err(|_| anyhow::anyhow!("mpv IPC timeout for req={}", req_id))?
            .map_err(|_| anyhow::anyhow!("mpv reply channel dropped req={}", req_id))?
    }

    /// Replace whatever is loaded with `url`, looping forever.
    pub async fn load_loop(&self, url: &str, volume: f64) -> anyhow::Result<()> {
        self.send(json!(["set_property", "loop-file", "inf"])).await?;
        self.send(json!(["set_property", "volume", volume])).await?;
        let resp = self.send(json!(["loadfile", url, "replace"])).await?;
        debug!("mpv: loadfile response: {:?}", resp);
        Ok(())
    }

    pub async fn stop(&self) -> anyhow::Result<()> {
        self.send(json!(["stop"])).await?;
        Ok(())
    }
}

// ── driver ────────────────────────────────────────────────────────────────────

/// Owns the mpv child process.
pub struct MpvDriver {
    binary: PathBuf,
    socket_name: String,
    volume: f64,
    process: Option<tokio::process::Child>,
}

impl MpvDriver {
    pub fn new(binary: PathBuf, volume: f64) -> Self {
        Self {
            binary,
            socket_name: space_core::platform::mpv_socket_name(),
            volume,
            process: None,
        }
    }

    pub fn process_alive(&mut self) -> bool {
        if let Some(ref mut child) = self.process {
            match child.try_wait() {
                Ok(None) => true,
                Ok(Some(status)) => {
                    warn!("mpv process exited: {}", status);
                    false
                }
                Err(e) => {
                    warn!("mpv process_alive check failed: {}", e);
                    false
                }
            }
        } else {
            false
        }
    }

    pub async fn kill(&mut self) {
        if let Some(mut p) = self.process.take() {
            let _ = p.kill().await;
        }
    }

    fn command(&self) -> anyhow::Result<tokio::process::Command> {
        let stderr_path = space_core::platform::data_dir().join("mpv-stderr.log");
        let stderr_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&stderr_path)?;

        let mut cmd = tokio::process::Command::new(&self.binary);
        cmd.arg("--no-video")
            .arg("--idle=yes")
            .arg(space_core::platform::mpv_socket_arg())
            .arg("--quiet")
            .arg(format!("--volume={}", self.volume.round() as i64))
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(stderr_file)
            .kill_on_drop(true);
        Ok(cmd)
    }

    // ── spawn / connect ───────────────────────────────────────────────────────

    #[cfg(unix)]
    pub async fn spawn_and_connect(&mut self) -> anyhow::Result<MpvHandle> {
        self.kill().await;

        let socket_path = PathBuf::from(&self.socket_name);
        let _ = tokio::fs::remove_file(&socket_path).await;

        info!("mpv: spawning {:?}", self.binary);
        let child = self.command()?.spawn()?;
        info!("mpv: spawned process with pid {:?}", child.id());
        self.process = Some(child);

        for _ in 0..50 {
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
            if socket_path.exists() {
                break;
            }
        }
        if !socket_path.exists() {
            anyhow::bail!("mpv IPC socket did not appear");
        }

        let stream = UnixStream::connect(&socket_path).await?;
        info!("mpv: connected to IPC socket");
        let (read_half, write_half) = stream.into_split();
        Ok(start_io_tasks(BufReader::new(read_half), write_half))
    }

    #[cfg(windows)]
    pub async fn spawn_and_connect(&mut self) -> anyhow::Result<MpvHandle> {
        self.kill().await;

        info!("mpv: spawning {:?}", self.binary);
        let child = self.command()?.spawn()?;
        self.process = Some(child);

        let pipe_path = format!(r"\\.\pipe\{}", self.socket_name);
        for _ in 0..50 {
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
            if let Ok(client) = ClientOptions::new().open(&pipe_path) {
                info!("mpv: connected to named pipe");
                let (read_half, write_half) = tokio::io::split(client);
                return Ok(start_io_tasks(BufReader::new(read_half), write_half));
            }
        }
        anyhow::bail!("mpv named pipe did not appear")
    }
}

fn start_io_tasks<R, W>(reader: BufReader<R>, writer: W) -> MpvHandle
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
    W: tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    // req_id → reply channel.  Writer inserts, reader resolves.
    let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
    let (cmd_tx, cmd_rx) = mpsc::channel::<PendingRequest>(64);

    tokio::spawn(writer_task(writer, cmd_rx, pending.clone()));
    tokio::spawn(reader_task(reader, pending));

    MpvHandle { tx: cmd_tx }
}

// ── reader task ───────────────────────────────────────────────────────────────

async fn reader_task<R>(mut reader: BufReader<R>, pending: PendingMap)
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                debug!("mpv reader: connection closed");
                fail_all(&pending, "mpv IPC connection closed").await;
                break;
            }
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let val: Value = match serde_json::from_str(trimmed) {
                    Ok(v) => v,
                    Err(e) => {
                        debug!("mpv reader: invalid json '{}': {}", trimmed, e);
                        continue;
                    }
                };

                let Some(req_id) = val.get("request_id").and_then(|v| v.as_u64()) else {
                    // Unsolicited event; only end-file errors are interesting.
                    if val["event"].as_str() == Some("end-file")
                        && val["reason"].as_str() == Some("error")
                    {
                        warn!("mpv: playback ended with error: {}", trimmed);
                    }
                    continue;
                };

                let mut map = pending.lock().await;
                if let Some(tx) = map.remove(&req_id) {
                    let result = if val["error"].as_str() == Some("success") {
                        Ok(val)
                    } else {
                        let err = val["error"].as_str().unwrap_or("unknown error").to_string();
                        debug!("mpv reader: response req={} err={}", req_id, err);
                        Err(anyhow::anyhow!("mpv error: {}", err))
                    };
                    let _ = tx.send(result);
                } else {
                    debug!("mpv reader: response for unknown req={}", req_id);
                }
            }
            Err(e) => {
                warn!("mpv reader: read error: {}", e);
                fail_all(&pending, "mpv IPC read error").await;
                break;
            }
        }
    }
}

async fn fail_all(pending: &PendingMap, reason: &str) {
    let mut map = pending.lock().await;
    for (_, tx) in map.drain() {
        let _ = tx.send(Err(anyhow::anyhow!("{}", reason)));
    }
}

// ── writer task ───────────────────────────────────────────────────────────────

async fn writer_task<W>(mut writer: W, mut rx: mpsc::Receiver<PendingRequest>, pending: PendingMap)
where
    W: tokio::io::AsyncWrite + Unpin,
{
    while let Some(req) = rx.recv().await {
        // Register reply channel before writing so reader can match it
        pending.lock().await.insert(req.req_id, req.reply);
        debug!(
            "mpv writer: send req={} payload={}",
            req.req_id,
            req.payload.trim()
        );
        if let Err(e) = writer.write_all(req.payload.as_bytes()).await {
            warn!("mpv writer: write error: {}", e);
            if let Some(tx) = pending.lock().await.remove(&req.req_id) {
                let _ = tx.send(Err(anyhow::anyhow!("mpv write error: {}", e)));
            }
            break;
        }
    }
    debug!("mpv writer: task exiting");
}

// ── audio output ──────────────────────────────────────────────────────────────

#[derive(Debug)]
enum OutputRequest {
    Start {
        url: String,
        ack: oneshot::Sender<Result<(), PlaybackError>>,
    },
    Stop,
}

/// `AudioOutput` backed by a single mpv process.
pub struct MpvOutput {
    tx: mpsc::UnboundedSender<OutputRequest>,
}

impl MpvOutput {
    /// Start the output task.  The returned join handle completes once the
    /// output has been dropped and mpv has been shut down.
    pub fn spawn(binary: PathBuf, volume: f64) -> (Self, tokio::task::JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(output_task(MpvDriver::new(binary, volume), volume, rx));
        (Self { tx }, task)
    }
}

impl AudioOutput for MpvOutput {
    fn start_loop(&mut self, url: &str) -> StartAck {
        let (ack, rx) = oneshot::channel();
        // A closed channel drops `ack`, which the caller reads as OutputClosed.
        let _ = self.tx.send(OutputRequest::Start {
            url: url.to_string(),
            ack,
        });
        rx
    }

    fn stop(&mut self) {
        let _ = self.tx.send(OutputRequest::Stop);
    }
}

async fn output_task(
    mut driver: MpvDriver,
    volume: f64,
    mut rx: mpsc::UnboundedReceiver<OutputRequest>,
) {
    let mut handle: Option<MpvHandle> = None;

    while let Some(req) = rx.recv().await {
        match req {
            OutputRequest::Start { url, ack } => {
                if handle.is_none() || !driver.process_alive() {
                    handle = match driver.spawn_and_connect().await {
                        Ok(h) => Some(h),
                        Err(e) => {
                            warn!("mpv: cannot start player: {}", e);
                            let _ = ack.send(Err(PlaybackError::Denied(e.to_string())));
                            continue;
                        }
                    };
                }
                let loaded = match handle.as_ref() {
                    Some(h) => h.load_loop(&url, volume).await,
                    None => continue,
                };
                if let Err(e) = &loaded {
                    warn!("mpv: loading {} failed: {}", url, e);
                    handle = None;
                }
                let _ = ack.send(loaded.map_err(|e| PlaybackError::Denied(e.to_string())));
            }
            OutputRequest::Stop => {
                let stopped = match handle.as_ref() {
                    Some(h) => h.stop().await,
                    None => continue,
                };
                if let Err(e) = stopped {
                    warn!("mpv: stop failed: {}", e);
                    handle = None;
                }
            }
        }
    }

    debug!("mpv: output closed, shutting down player");
    if let Some(h) = handle.as_ref() {
        let _ = h.send(json!(["quit"])).await;
    }
    driver.kill().await;
}
