//! MPRIS (D-Bus) integration: publishes the now-playing descriptor and turns
//! remote control calls into `ControlCmd`s for the event loop.

use std::collections::HashMap;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_io::block_on;
use tracing::{debug, info, warn};
use zbus::{Connection, interface, object_server::SignalEmitter};
use zvariant::{ObjectPath, OwnedValue, Value};

use crate::transport::{MediaSession, NowPlaying, PlaybackState};

const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
    /// Relative seek in microseconds.
    Seek(i64),
    /// Absolute position in microseconds, valid only for `track_id`.
    SetPosition { track_id: String, position: i64 },
}

/// Object path identifying the track at `index`.
pub fn track_object_path(index: usize) -> String {
    format!("{OBJECT_PATH}/track/{index}")
}

#[derive(Debug, Default)]
struct SharedState {
    playback: PlaybackState,
    title: Option<String>,
    artist: Vec<String>,
    album: Option<String>,
    url: Option<String>,
    length_micros: Option<i64>,
    art_url: Option<String>,
    track_id: Option<ObjectPath<'static>>,
    position_micros: i64,
    /// When `position_micros` was taken.
    position_at: Option<Instant>,
    /// Position to announce with `Seeked` on the next wake-up.
    pending_seek: Option<i64>,
}

impl SharedState {
    /// Position at `now`: the published snapshot, advanced by the time since
    /// it was taken while playing, and capped at the track length.
    fn position_at(&self, now: Instant) -> i64 {
        let mut position = self.position_micros;
        if let (PlaybackState::Playing, Some(at)) = (self.playback, self.position_at) {
            position = position.saturating_add(micros(now.saturating_duration_since(at)));
        }
        match self.length_micros {
            Some(length) => position.min(length),
            None => position,
        }
    }
}

fn file_url(path: &Path) -> String {
    let abs = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    format!("file://{}", abs.display())
}

/// Data URIs are passed through; anything else is a file reference.
fn art_url(src: &str) -> String {
    if src.starts_with("data:") {
        src.to_string()
    } else {
        file_url(Path::new(src))
    }
}

fn micros(d: Duration) -> i64 {
    i64::try_from(d.as_micros()).unwrap_or(i64::MAX)
}

pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
    notify: Sender<()>,
}

impl MprisHandle {
    /// Replace the shared state with `now`. Clears the track fields when
    /// nothing is selected.
    pub fn set_now_playing(&self, now: &NowPlaying) {
        self.set_now_playing_at(now, Instant::now());
    }

    fn set_now_playing_at(&self, now: &NowPlaying, at: Instant) {
        let Ok(mut s) = self.state.lock() else {
            return;
        };
        s.playback = now.playback;
        s.position_micros = micros(now.position);
        s.position_at = Some(at);

        match (now.index, now.path.as_deref()) {
            (Some(index), Some(path)) => {
                s.title = Some(now.title.clone());
                s.artist = vec![now.artist.clone()];
                s.album = Some(now.album.clone());
                s.url = Some(file_url(path));
                s.length_micros = now.length.map(micros);
                s.art_url = now.artwork.first().map(|a| art_url(&a.src));
                s.track_id = ObjectPath::try_from(track_object_path(index)).ok();
            }
            _ => {
                s.title = None;
                s.artist.clear();
                s.album = None;
                s.url = None;
                s.length_micros = None;
                s.art_url = None;
                s.track_id = None;
            }
        }
    }
}

impl MediaSession for MprisHandle {
    fn publish(&self, now: &NowPlaying) {
        self.set_now_playing(now);
        // Service thread gone: nothing to notify.
        let _ = self.notify.send(());
    }

    fn seeked(&self, position: Duration) {
        if let Ok(mut s) = self.state.lock() {
            s.pending_seek = Some(micros(position));
        }
        let _ = self.notify.send(());
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No window to raise.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "cassette"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec!["file".to_string()]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

fn owned<'a>(v: impl Into<Value<'a>>) -> Option<OwnedValue> {
    OwnedValue::try_from(v.into()).ok()
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        let _ = self.tx.send(ControlCmd::Next);
    }

    fn previous(&self) {
        let _ = self.tx.send(ControlCmd::Prev);
    }

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        let _ = self.tx.send(ControlCmd::Stop);
    }

    fn seek(&self, offset: i64) {
        let _ = self.tx.send(ControlCmd::Seek(offset));
    }

    fn set_position(&self, track_id: ObjectPath<'_>, position: i64) {
        let _ = self.tx.send(ControlCmd::SetPosition {
            track_id: track_id.as_str().to_string(),
            position,
        });
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match s.playback {
            PlaybackState::Stopped => "Stopped",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
        }
    }

    #[zbus(signal)]
    async fn seeked(emitter: &SignalEmitter<'_>, position: i64) -> zbus::Result<()>;

    /// Not cached by clients, so it is never announced with
    /// `PropertiesChanged`; readers get the extrapolated value.
    #[zbus(property(emits_changed_signal = "false"))]
    fn position(&self) -> i64 {
        self.state
            .lock()
            .map(|s| s.position_at(Instant::now()))
            .unwrap_or(0)
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };

        let mut put = |key: &str, value: Option<OwnedValue>| {
            if let Some(v) = value {
                map.insert(key.to_string(), v);
            }
        };

        put("mpris:trackid", s.track_id.clone().and_then(owned));
        put("xesam:title", s.title.clone().and_then(owned));
        if !s.artist.is_empty() {
            put("xesam:artist", owned(s.artist.clone()));
        }
        put("xesam:album", s.album.clone().and_then(owned));
        put("xesam:url", s.url.clone().and_then(owned));
        put("mpris:length", s.length_micros.and_then(owned));
        put("mpris:artUrl", s.art_url.clone().and_then(owned));
        map
    }
}

async fn register(
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
    bus_name: &str,
) -> zbus::Result<Connection> {
    let connection = Connection::session().await?;
    connection
        .request_name(format!("org.mpris.MediaPlayer2.{bus_name}"))
        .await?;

    let object_server = connection.object_server();
    object_server
        .at(OBJECT_PATH, RootIface { tx: tx.clone() })
        .await?;
    object_server
        .at(OBJECT_PATH, PlayerIface { tx, state })
        .await?;
    Ok(connection)
}

async fn emit_changed(connection: &Connection, seek: Option<i64>) -> zbus::Result<()> {
    let iface_ref = connection
        .object_server()
        .interface::<_, PlayerIface>(OBJECT_PATH)
        .await?;
    let iface = iface_ref.get().await;
    let emitter = iface_ref.signal_emitter();
    iface.playback_status_changed(emitter).await?;
    iface.metadata_changed(emitter).await?;
    if let Some(position) = seek {
        PlayerIface::seeked(emitter, position).await?;
    }
    Ok(())
}

fn take_pending_seek(state: &Mutex<SharedState>) -> Option<i64> {
    state.lock().ok().and_then(|mut s| s.pending_seek.take())
}

fn serve(
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
    bus_name: String,
    notify: Receiver<()>,
) {
    let connection = match block_on(register(tx, state.clone(), &bus_name)) {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "MPRIS unavailable");
            return;
        }
    };
    info!(bus_name = %bus_name, "MPRIS service registered");

    // One PropertiesChanged per burst of publishes.
    while notify.recv().is_ok() {
        while notify.try_recv().is_ok() {}
        let seek = take_pending_seek(&state);
        if let Err(e) = block_on(emit_changed(&connection, seek)) {
            debug!(error = %e, "failed to emit MPRIS change");
        }
    }
}

/// Start the MPRIS service on its own thread. Remote calls arrive on `tx`.
/// If the session bus is unavailable the handle still works; publishes just
/// go nowhere.
pub fn spawn_mpris(tx: Sender<ControlCmd>, bus_name: &str) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify, notify_rx) = mpsc::channel();

    let state_for_thread = state.clone();
    let bus_name = bus_name.to_string();
    std::thread::spawn(move || serve(tx, state_for_thread, bus_name, notify_rx));

    MprisHandle { state, notify }
}
