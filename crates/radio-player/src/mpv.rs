/// mpv IPC backend with separated reader/writer tasks.
///
/// Architecture:
///
/// ```text
///   MpvBackend (UI thread, sync)
///         │  post(cmd) — try_send, never waits for mpv
///         ▼
///   private tokio runtime ("mpv-ipc" thread)
///         ├── writer_task   ← receives PendingRequest via mpsc, serialises → socket
///         ├── reader_task   ← reads JSON lines from socket
///         │                      ├── response (has request_id) → reply / warn on error
///         │                      └── event / property-change   → event channel
///         └── event_task    ← logs end-file errors and stream changes
/// ```
///
/// Platform notes:
/// - Unix:   Unix domain sockets
/// - Windows: Named pipes  \\.\pipe\<name>
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use radio_core::config::MpvConfig;
use radio_core::{PlaybackError, PlayerBackend};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, info, warn};

#[cfg(unix)]
use tokio::net::UnixStream;

#[cfg(windows)]
use tokio::net::windows::named_pipe::ClientOptions;

// ── global request-id counter ─────────────────────────────────────────────────

static NEXT_REQ_ID: AtomicU64 = AtomicU64::new(1);

// ── internal channel types ────────────────────────────────────────────────────

/// Who is waiting for a reply.
enum Reply {
    /// An awaiting caller (startup handshake).
    Waiter(oneshot::Sender<anyhow::Result<Value>>),
    /// Fire-and-forget command; only failures are logged.
    Posted(String),
}

struct PendingRequest {
    req_id: u64,
    payload: String, // serialised JSON line (already has '\n')
    reply: Reply,
}

type PendingMap = Arc<Mutex<HashMap<u64, Reply>>>;

/// An mpv event that arrived unsolicited (no request_id).
#[derive(Debug, Clone)]
pub struct MpvEvent {
    pub raw: Value,
}

impl MpvEvent {
    /// Returns the event name, e.g. "end-file", "start-file", "file-loaded".
    pub fn event_name(&self) -> Option<&str> {
        self.raw.get("event")?.as_str()
    }

    /// For `end-file`: the reason plus mpv's `file_error`, if any.
    pub fn end_file_reason(&self) -> Option<(&str, Option<&str>)> {
        if self.event_name()? != "end-file" {
            return None;
        }
        let reason = self.raw.get("reason").and_then(|v| v.as_str()).unwrap_or("unknown");
        let file_error = self.raw.get("file_error").and_then(|v| v.as_str());
        Some((reason, file_error))
    }
}

// ── handle ────────────────────────────────────────────────────────────────────

#[derive(Clone)]
struct MpvHandle {
    tx: mpsc::Sender<PendingRequest>,
}

impl MpvHandle {
    fn encode(command: &Value) -> anyhow::Result<(u64, String)> {
        let req_id = NEXT_REQ_ID.fetch_add(1, Ordering::Relaxed);
        let msg = json!({ "command": command, "request_id": req_id });
        let mut raw = serde_json::to_string(&msg)?;
        raw.push('\n');
        Ok((req_id, raw))
    }

    /// Queue a command without waiting for mpv. Callable from sync code.
    fn post(&self, command: Value) -> Result<(), PlaybackError> {
        let (req_id, payload) = Self::encode(&command)
            .map_err(|e| PlaybackError::DecodeFailure(e.to_string()))?;
        self.tx
            .try_send(PendingRequest {
                req_id,
                payload,
                reply: Reply::Posted(command.to_string()),
            })
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => {
                    PlaybackError::BackendUnavailable("mpv command queue full".to_string())
                }
                mpsc::error::TrySendError::Closed(_) => {
                    PlaybackError::BackendUnavailable("mpv IPC connection closed".to_string())
                }
            })
    }

    /// Send a command and await the reply.
    async fn send(&self, command: Value) -> anyhow::Result<Value> {
        let (req_id, payload) = Self::encode(&command)?;
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(PendingRequest {
                req_id,
                payload,
                reply: Reply::Waiter(reply_tx),
            })
            .await
            .map_err(|_| anyhow::anyhow!("mpv writer task gone"))?;

        tokio::time::timeout(Duration::from_secs(5), reply_rx)
            .await
            .map_err(|_| anyhow::anyhow!("mpv IPC timeout for req={}", req_id))?
            .map_err(|_| anyhow::anyhow!("mpv reply channel dropped req={}", req_id))?
    }
}

// ── driver ────────────────────────────────────────────────────────────────────

/// Owns the mpv child process and its IPC endpoint.
struct MpvDriver {
    socket_name: String,
    process: Option<tokio::process::Child>,
}

impl MpvDriver {
    fn new() -> Self {
        Self {
            socket_name: radio_core::platform::mpv_socket_name(),
            process: None,
        }
    }

    fn process_alive(&mut self) -> bool {
        match self.process.as_mut().map(|child| child.try_wait()) {
            Some(Ok(None)) => true,
            Some(Ok(Some(status))) => {
                warn!("mpv: process exited with {}", status);
                false
            }
            Some(Err(e)) => {
                warn!("mpv: process_alive check failed: {}", e);
                false
            }
            None => false,
        }
    }

    /// Wait briefly for a clean exit, then kill.
    async fn shutdown(&mut self) {
        if let Some(mut p) = self.process.take() {
            match tokio::time::timeout(Duration::from_millis(500), p.wait()).await {
                Ok(Ok(status)) => debug!("mpv: exited with {}", status),
                _ => {
                    let _ = p.kill().await;
                    debug!("mpv: killed");
                }
            }
        }
        #[cfg(unix)]
        {
            let _ = tokio::fs::remove_file(&self.socket_name).await;
        }
    }

    fn spawn(&mut self, config: &MpvConfig, volume: i32) -> anyhow::Result<()> {
        let mpv_binary = radio_core::platform::find_mpv_binary(config.binary.as_deref())
            .ok_or_else(|| anyhow::anyhow!("mpv binary not found"))?;
        info!("mpv: spawning {:?}", mpv_binary);

        let child = tokio::process::Command::new(mpv_binary)
            .arg("--no-video")
            .arg("--idle=yes")
            .arg("--quiet")
            .arg(radio_core::platform::mpv_socket_arg())
            .arg(format!("--volume={}", volume.clamp(0, 100)))
            .args(&config.extra_args)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()?;
        self.process = Some(child);
        Ok(())
    }

    #[cfg(unix)]
    async fn spawn_and_connect(
        &mut self,
        config: &MpvConfig,
        volume: i32,
        event_tx: mpsc::Sender<MpvEvent>,
    ) -> anyhow::Result<MpvHandle> {
        let socket_path = PathBuf::from(&self.socket_name);
        let _ = tokio::fs::remove_file(&socket_path).await;

        self.spawn(config, volume)?;

        // Wait for socket to appear
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            if socket_path.exists() {
                break;
            }
            if !self.process_alive() {
                anyhow::bail!("mpv exited during startup");
            }
        }
        if !socket_path.exists() {
            anyhow::bail!("mpv IPC socket did not appear");
        }

        let stream = UnixStream::connect(&socket_path).await?;
        info!("mpv: connected to IPC socket {:?}", socket_path);
        let (read_half, write_half) = stream.into_split();
        Ok(start_io_tasks(read_half, write_half, event_tx))
    }

    #[cfg(windows)]
    async fn spawn_and_connect(
        &mut self,
        config: &MpvConfig,
        volume: i32,
        event_tx: mpsc::Sender<MpvEvent>,
    ) -> anyhow::Result<MpvHandle> {
        self.spawn(config, volume)?;

        let pipe_path = format!(r"\\.\pipe\{}", self.socket_name);
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            match ClientOptions::new().open(&pipe_path) {
                Ok(client) => {
                    info!("mpv: connected to named pipe {}", pipe_path);
                    let (read_half, write_half) = tokio::io::split(client);
                    return Ok(start_io_tasks(read_half, write_half, event_tx));
                }
                Err(_) => continue,
            }
        }
        anyhow::bail!("mpv named pipe did not appear")
    }
}

fn start_io_tasks<R, W>(read_half: R, write_half: W, event_tx: mpsc::Sender<MpvEvent>) -> MpvHandle
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
    W: tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    // req_id → reply.  Writer inserts, reader resolves.
    let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
    let (cmd_tx, cmd_rx) = mpsc::channel::<PendingRequest>(64);

    tokio::spawn(writer_task(write_half, cmd_rx, pending.clone()));
    tokio::spawn(reader_task(BufReader::new(read_half), pending, event_tx));

    MpvHandle { tx: cmd_tx }
}

// ── reader task ───────────────────────────────────────────────────────────────

fn resolve(reply: Reply, result: anyhow::Result<Value>) {
    match reply {
        Reply::Waiter(tx) => {
            let _ = tx.send(result);
        }
        Reply::Posted(command) => {
            if let Err(e) = result {
                warn!("mpv: command {} failed: {}", command, e);
            }
        }
    }
}

async fn fail_all(pending: &PendingMap, reason: &str) {
    let mut map = pending.lock().await;
    for (_, reply) in map.drain() {
        resolve(reply, Err(anyhow::anyhow!("{}", reason)));
    }
}

async fn reader_task<R>(
    mut reader: BufReader<R>,
    pending: PendingMap,
    event_tx: mpsc::Sender<MpvEvent>,
) where
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

                if let Some(req_id) = val.get("request_id").and_then(|v| v.as_u64()) {
                    let reply = pending.lock().await.remove(&req_id);
                    let Some(reply) = reply else {
                        debug!("mpv reader: response for unknown req={}", req_id);
                        continue;
                    };
                    let result = if val["error"].as_str() == Some("success") {
                        debug!("mpv reader: response req={} ok", req_id);
                        Ok(val)
                    } else {
                        let err = val["error"].as_str().unwrap_or("unknown error").to_string();
                        Err(anyhow::anyhow!("mpv error: {}", err))
                    };
                    resolve(reply, result);
                } else {
                    debug!("mpv reader: event {}", trimmed);
                    let _ = event_tx.send(MpvEvent { raw: val }).await;
                }
            }
            Err(e) => {
                warn!("mpv reader: read error: {}", e);
                fail_all(&pending, &format!("mpv IPC read error: {}", e)).await;
                break;
            }
        }
    }
}

// ── writer task ───────────────────────────────────────────────────────────────

async fn writer_task<W>(mut writer: W, mut rx: mpsc::Receiver<PendingRequest>, pending: PendingMap)
where
    W: tokio::io::AsyncWrite + Unpin,
{
    while let Some(req) = rx.recv().await {
        // Register reply before writing so reader can match it
        pending.lock().await.insert(req.req_id, req.reply);
        debug!("mpv writer: send req={} payload={}", req.req_id, req.payload.trim());
        if let Err(e) = writer.write_all(req.payload.as_bytes()).await {
            warn!("mpv writer: write error: {}", e);
            if let Some(reply) = pending.lock().await.remove(&req.req_id) {
                resolve(reply, Err(anyhow::anyhow!("mpv write error: {}", e)));
            }
            break;
        }
    }
    debug!("mpv writer: task exiting");
}

// ── event task ────────────────────────────────────────────────────────────────

async fn event_task(mut rx: mpsc::Receiver<MpvEvent>) {
    while let Some(evt) = rx.recv().await {
        if let Some((reason, file_error)) = evt.end_file_reason() {
            match reason {
                "error" => warn!(
                    "mpv: stream failed: {}",
                    file_error.unwrap_or("unknown error")
                ),
                "eof" => info!("mpv: stream ended"),
                other => debug!("mpv: end-file reason={}", other),
            }
            continue;
        }
        match evt.event_name() {
            Some("file-loaded") => info!("mpv: stream loaded"),
            Some("start-file") => debug!("mpv: start-file"),
            _ => {}
        }
    }
}

// ── backend ───────────────────────────────────────────────────────────────────

/// `PlayerBackend` over an mpv child process.
pub struct MpvBackend {
    runtime: Option<tokio::runtime::Runtime>,
    driver: MpvDriver,
    handle: MpvHandle,
}

impl MpvBackend {
    /// Start mpv on a private runtime and connect to its IPC endpoint.
    /// Must not be called from inside another tokio runtime.
    pub fn create_instance(config: &MpvConfig, volume: i32) -> Result<Self, PlaybackError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("mpv-ipc")
            .enable_all()
            .build()
            .map_err(|e| PlaybackError::BackendUnavailable(e.to_string()))?;

        let mut driver = MpvDriver::new();
        let (event_tx, event_rx) = mpsc::channel::<MpvEvent>(256);

        let connected = runtime.block_on(async {
            let handle = driver.spawn_and_connect(config, volume, event_tx).await?;
            handle.send(json!(["get_property", "mpv-version"])).await?;
            anyhow::Ok(handle)
        });

        let handle = match connected {
            Ok(h) => h,
            Err(e) => {
                runtime.block_on(driver.shutdown());
                return Err(PlaybackError::BackendUnavailable(e.to_string()));
            }
        };
        runtime.spawn(event_task(event_rx));
        info!("mpv: backend ready");

        Ok(Self {
            runtime: Some(runtime),
            driver,
            handle,
        })
    }

    fn command(&mut self, command: Value) -> Result<(), PlaybackError> {
        let Some(runtime) = self.runtime.as_ref() else {
            return Err(PlaybackError::BackendUnavailable("released".to_string()));
        };
        let _guard = runtime.enter();
        if !self.driver.process_alive() {
            return Err(PlaybackError::BackendUnavailable(
                "mpv process is not running".to_string(),
            ));
        }
        self.handle.post(command)
    }
}

/// Reject URIs that cannot possibly open: blank, or a local path that does not
/// exist. Anything with a scheme is left to mpv.
fn check_uri(uri: &str) -> Result<(), PlaybackError> {
    let uri = uri.trim();
    if uri.is_empty() {
        return Err(PlaybackError::NotFound("empty stream address".to_string()));
    }
    if !uri.contains("://") && !std::path::Path::new(uri).exists() {
        return Err(PlaybackError::NotFound(uri.to_string()));
    }
    Ok(())
}

impl PlayerBackend for MpvBackend {
    fn open(&mut self, uri: &str) -> Result<(), PlaybackError> {
        check_uri(uri)?;
        self.command(json!(["loadfile", uri.trim(), "replace"]))
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        self.command(json!(["set_property", "pause", false]))
    }

    fn pause(&mut self) -> Result<(), PlaybackError> {
        self.command(json!(["set_property", "pause", true]))
    }

    fn stop(&mut self) -> Result<(), PlaybackError> {
        self.command(json!(["stop"]))
    }

    fn set_volume(&mut self, percent: i32) -> Result<(), PlaybackError> {
        self.command(json!(["set_property", "volume", percent]))
    }

    fn release(&mut self) {
        let Some(runtime) = self.runtime.take() else {
            return;
        };
        let _ = self.handle.post(json!(["quit"]));
        runtime.block_on(self.driver.shutdown());
        runtime.shutdown_timeout(Duration::from_millis(200));
        info!("mpv: backend released");
    }
}

impl Drop for MpvBackend {
    fn drop(&mut self) {
        self.release();
    }
}
