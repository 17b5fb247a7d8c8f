//! MPD (Music Player Daemon) now-playing source
//!
//! Speaks the MPD text protocol over TCP. Each fetch opens a short-lived
//! connection for `currentsong`; change notification keeps a second,
//! persistent connection parked in `idle player`.

use async_trait::async_trait;
use log::debug;
use m2bar_core::{FetchError, RefreshPolicy, Source, SourceMetadata};
use m2bar_types::{MpdConfig, SourceKind, StatusItem};
use std::io;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

/// Key/value pairs of one MPD response, in server order
pub type Response = Vec<(String, String)>;

fn protocol_error(message: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message.into())
}

/// Read one response up to its terminating `OK` (or `ACK` error line)
pub async fn read_response<R: AsyncBufRead + Unpin>(reader: &mut R) -> io::Result<Response> {
    let mut pairs = Vec::new();
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed mid-response"));
        }
        let line = line.trim_end_matches(['\r', '\n']);
        if line == "OK" {
            return Ok(pairs);
        }
        if let Some(error) = line.strip_prefix("ACK ") {
            return Err(protocol_error(format!("server error: {}", error)));
        }
        match line.split_once(": ") {
            Some((key, value)) => pairs.push((key.to_string(), value.to_string())),
            None => return Err(protocol_error(format!("unexpected line {:?}", line))),
        }
    }
}

/// One open connection to the server
pub struct MpdConnection {
    stream: BufReader<TcpStream>,
}

impl MpdConnection {
    /// Connect and consume the `OK MPD <version>` greeting
    pub async fn connect(address: &str) -> io::Result<Self> {
        let stream = TcpStream::connect(address).await?;
        let mut stream = BufReader::new(stream);

        let mut greeting = String::new();
        stream.read_line(&mut greeting).await?;
        if !greeting.starts_with("OK MPD ") {
            return Err(protocol_error(format!("not an MPD server: {:?}", greeting.trim_end())));
        }
        debug!("Connected to {} ({})", address, greeting.trim_end());
        Ok(Self { stream })
    }

    pub async fn command(&mut self, command: &str) -> io::Result<Response> {
        let stream = self.stream.get_mut();
        stream.write_all(command.as_bytes()).await?;
        stream.write_all(b"\n").await?;
        read_response(&mut self.stream).await
    }
}

fn lookup<'a>(song: &'a Response, key: &str) -> Option<&'a str> {
    song.iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Display text for a `currentsong` response.
///
/// Prefers "Artist - Title", then the title, then the stream name, then the
/// file's basename. Nothing playing gives an empty string.
pub fn song_text(song: &Response) -> String {
    match (lookup(song, "Artist"), lookup(song, "Title")) {
        (Some(artist), Some(title)) => format!("{} - {}", artist, title),
        (_, Some(title)) => title.to_string(),
        _ => match lookup(song, "Name") {
            Some(name) => name.to_string(),
            None => lookup(song, "file")
                .map(|file| file.rsplit('/').next().unwrap_or(file).to_string())
                .unwrap_or_default(),
        },
    }
}

/// MPD data source
pub struct MpdSource {
    metadata: SourceMetadata,
    config: MpdConfig,
    watcher: Option<MpdConnection>,
}

impl MpdSource {
    pub fn new(config: MpdConfig) -> Self {
        let metadata = SourceMetadata::new(
            SourceKind::Mpd,
            config.address.clone(),
            "Current track of a Music Player Daemon",
        );

        Self {
            metadata,
            config,
            watcher: None,
        }
    }

    /// Get current configuration
    pub fn get_config(&self) -> &MpdConfig {
        &self.config
    }
}

#[async_trait]
impl Source for MpdSource {
    fn metadata(&self) -> &SourceMetadata {
        &self.metadata
    }

    fn policy(&self) -> RefreshPolicy {
        RefreshPolicy::Event {
            retry: Duration::from_millis(self.config.retry_interval_ms),
        }
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(self.config.timeout_ms)
    }

    fn placeholder(&self) -> Option<StatusItem> {
        Some(StatusItem::empty("mpd", self.config.address.clone()))
    }

    async fn fetch(&mut self) -> Result<StatusItem, FetchError> {
        let address = &self.config.address;
        let mut connection = MpdConnection::connect(address)
            .await
            .map_err(|e| FetchError::transient(format!("connecting to {}: {}", address, e)))?;
        let song = connection
            .command("currentsong")
            .await
            .map_err(|e| FetchError::transient(format!("currentsong on {}: {}", address, e)))?;

        Ok(StatusItem::new("mpd", song_text(&song)).with_instance(address.clone()))
    }

    async fn wait_event(&mut self) -> Result<(), FetchError> {
        let mut watcher = match self.watcher.take() {
            Some(watcher) => watcher,
            None => MpdConnection::connect(&self.config.address)
                .await
                .map_err(|e| FetchError::transient(format!("watcher connect: {}", e)))?,
        };

        // On failure the watcher is dropped and rebuilt on the next wait
        let changed = watcher
            .command("idle player")
            .await
            .map_err(|e| FetchError::transient(format!("idle: {}", e)))?;
        debug!("{}: {:?}", self.metadata.label(), changed);
        self.watcher = Some(watcher);
        Ok(())
    }
}
