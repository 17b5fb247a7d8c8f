//! Wireless network source
//!
//! Looks up the ESSID of a wireless interface through the wireless
//! extensions ioctl. Values are delivered on every tick, changed or not.

use async_trait::async_trait;
use m2bar_core::{FetchError, RefreshPolicy, Source, SourceMetadata};
use m2bar_types::source_configs::wifi::IFNAMSIZ;
use m2bar_types::{SourceKind, StatusItem, WifiConfig};
use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use std::time::Duration;

// From linux/wireless.h
const SIOCGIWESSID: u64 = 0x8B1B;
const IW_ESSID_MAX_SIZE: usize = 32;

/// `struct iwreq` restricted to the `essid` member of its data union
#[repr(C)]
struct EssidRequest {
    interface: [u8; IFNAMSIZ],
    pointer: *mut u8,
    length: u16,
    flags: u16,
}

fn open_socket() -> io::Result<OwnedFd> {
    // SAFETY: plain socket(2) call; the returned descriptor is checked
    // before ownership is taken.
    let fd = unsafe { libc::socket(libc::AF_INET, libc::SOCK_DGRAM | libc::SOCK_CLOEXEC, 0) };
    if fd < 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: fd is a freshly created, valid descriptor owned by nobody else
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

/// Ask the kernel for the ESSID `interface` is associated with.
///
/// An interface that is up but not associated yields an empty string.
fn query_essid(socket: &OwnedFd, interface: &str) -> io::Result<String> {
    let name = interface.as_bytes();
    if name.len() >= IFNAMSIZ {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "interface name too long"));
    }

    let mut essid = [0u8; IW_ESSID_MAX_SIZE];
    let mut request = EssidRequest {
        interface: [0u8; IFNAMSIZ],
        pointer: essid.as_mut_ptr(),
        length: IW_ESSID_MAX_SIZE as u16,
        flags: 0,
    };
    request.interface[..name.len()].copy_from_slice(name);

    // SAFETY: request matches the kernel's struct iwreq layout for this
    // call, and `pointer` refers to a live buffer of `length` bytes.
    let rc = unsafe {
        libc::ioctl(
            socket.as_raw_fd(),
            SIOCGIWESSID as _,
            &mut request as *mut EssidRequest,
        )
    };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }

    let length = usize::from(request.length).min(IW_ESSID_MAX_SIZE);
    Ok(essid_text(&essid[..length]))
}

/// Kernel ESSIDs are raw bytes and may carry a trailing NUL
fn essid_text(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

/// Wireless SSID data source
pub struct WifiSource {
    metadata: SourceMetadata,
    config: WifiConfig,
    socket: Option<OwnedFd>,
}

impl WifiSource {
    pub fn new(config: WifiConfig) -> Self {
        let metadata = SourceMetadata::new(
            SourceKind::Wifi,
            config.interface.clone(),
            "SSID of a wireless interface",
        );

        Self {
            metadata,
            config,
            socket: None,
        }
    }

    /// Get current configuration
    pub fn get_config(&self) -> &WifiConfig {
        &self.config
    }
}

#[async_trait]
impl Source for WifiSource {
    fn metadata(&self) -> &SourceMetadata {
        &self.metadata
    }

    fn policy(&self) -> RefreshPolicy {
        RefreshPolicy::Interval {
            period: Duration::from_millis(self.config.update_interval_ms),
            dedup: false,
        }
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(self.config.timeout_ms)
    }

    async fn fetch(&mut self) -> Result<StatusItem, FetchError> {
        let socket = match self.socket.take() {
            Some(socket) => socket,
            None => open_socket().map_err(|e| FetchError::fatal(format!("unable to get socket: {}", e)))?,
        };
        let result = query_essid(&socket, &self.config.interface);
        self.socket = Some(socket);

        let essid = result.map_err(|e| {
            FetchError::transient(format!("ESSID lookup on {} failed: {}", self.config.interface, e))
        })?;
        Ok(StatusItem::new("wifi", essid).with_instance(self.config.interface.clone()))
    }
}
