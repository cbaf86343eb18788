//! Event coalescing
//!
//! Collapses everything the native watcher queued since the last poll into a
//! single "changed" verdict. The queue is bounded: once it is full further
//! events are dropped and an overflow flag is raised, which the next drain
//! reports as a change like any other.

use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError};
use notify::event::{MetadataKind, ModifyKind};
use notify::{Event, EventHandler, EventKind};
use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::trace;

/// Events held between two polls before the queue overflows
pub(crate) const EVENT_QUEUE_CAPACITY: usize = 256;

/// Everything drained from the event queue in one poll
#[derive(Debug, Default)]
pub(crate) struct Drained {
    /// Relevant events seen
    pub changes: usize,
    /// Errors the native watcher delivered in place of events
    pub errors: Vec<notify::Error>,
    /// Events were dropped because the queue was full
    pub overflowed: bool,
    /// The watched directory itself went away
    pub target_removed: bool,
    /// The native watcher stopped sending
    pub disconnected: bool,
}

impl Drained {
    pub fn changed(&self) -> bool {
        self.changes > 0
    }
}

/// Whether an event counts as a directory change on its kind alone.
///
/// Creation, deletion, rename and last-write updates count. Reads and
/// permission/ownership changes do not. Unspecified metadata changes are
/// left to [`is_attribute_change`].
pub(crate) fn is_relevant(event: &Event) -> bool {
    if event.need_rescan() {
        return true;
    }

    match &event.kind {
        EventKind::Create(_) | EventKind::Remove(_) => true,
        EventKind::Modify(ModifyKind::Name(_))
        | EventKind::Modify(ModifyKind::Data(_))
        | EventKind::Modify(ModifyKind::Any) => true,
        EventKind::Modify(ModifyKind::Metadata(MetadataKind::WriteTime)) => true,
        _ => false,
    }
}

/// An unspecified metadata change.
///
/// inotify reports every `IN_ATTRIB` (chmod, chown, utime) this way, so it
/// only counts when the entry's last-write time actually moved.
pub(crate) fn is_attribute_change(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(ModifyKind::Metadata(MetadataKind::Any))
    )
}

/// The watched directory, as given and as the OS resolves it.
///
/// Some backends report resolved paths (FSEvents under `/private/var`), others
/// echo the path they were given.
#[derive(Debug, Clone)]
pub(crate) struct WatchRoot {
    given: PathBuf,
    canonical: PathBuf,
}

impl WatchRoot {
    pub fn new(given: PathBuf, canonical: PathBuf) -> Self {
        Self { given, canonical }
    }

    pub fn canonical(&self) -> &Path {
        &self.canonical
    }

    fn is_root(&self, path: &Path) -> bool {
        path == self.given || path == self.canonical
    }

    /// Key for an event path: `None` for the root itself, otherwise the entry
    /// name. The watch is non-recursive, so names are unique.
    fn key(&self, path: &Path) -> Option<OsString> {
        if self.is_root(path) {
            None
        } else {
            path.file_name().map(|n| n.to_os_string())
        }
    }
}

/// Last-write times of the root and its direct entries
#[derive(Debug, Default)]
pub(crate) struct WriteTimes {
    times: HashMap<Option<OsString>, SystemTime>,
}

impl WriteTimes {
    /// Record the root and every entry currently in it. Unreadable entries
    /// are skipped; they count as changed the first time they show up.
    pub fn snapshot(root: &WatchRoot) -> Self {
        let mut times = Self::default();
        times.refresh(root, root.canonical());

        if let Ok(entries) = fs::read_dir(root.canonical()) {
            for entry in entries.flatten() {
                times.refresh(root, &entry.path());
            }
        }
        times
    }

    /// Re-read the last-write time of `path`. True when it differs from the
    /// recorded one, or nothing was recorded yet.
    pub fn refresh(&mut self, root: &WatchRoot, path: &Path) -> bool {
        let key = root.key(path);
        match fs::symlink_metadata(path).and_then(|m| m.modified()) {
            Ok(modified) => self.times.insert(key, modified) != Some(modified),
            Err(_) => {
                // Gone again; its Remove event does the counting
                self.times.remove(&key);
                false
            }
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.times.len()
    }
}

/// Producer half, handed to the native watcher's thread
pub(crate) struct EventSink {
    events: Sender<notify::Result<Event>>,
    overflowed: Arc<AtomicBool>,
}

impl EventHandler for EventSink {
    fn handle_event(&mut self, event: notify::Result<Event>) {
        match self.events.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => self.overflowed.store(true, Ordering::Release),
            // Receiver gone means the handle is being dropped
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

/// Consumer half, owned by the live subscription
pub(crate) struct EventQueue {
    events: Receiver<notify::Result<Event>>,
    overflowed: Arc<AtomicBool>,
    root: WatchRoot,
    times: WriteTimes,
}

/// Create a queue holding at most `capacity` events for `root`.
pub(crate) fn event_queue(root: WatchRoot, capacity: usize) -> (EventSink, EventQueue) {
    let (tx, rx) = crossbeam_channel::bounded(capacity);
    let overflowed = Arc::new(AtomicBool::new(false));
    let times = WriteTimes::snapshot(&root);

    let sink = EventSink {
        events: tx,
        overflowed: overflowed.clone(),
    };
    let queue = EventQueue {
        events: rx,
        overflowed,
        root,
        times,
    };
    (sink, queue)
}

impl EventQueue {
    /// Events waiting for the next drain
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[cfg(test)]
    pub fn root(&self) -> &WatchRoot {
        &self.root
    }

    /// Empty the queue without blocking.
    pub fn drain(&mut self) -> Drained {
        let mut drained = Drained::default();

        loop {
            match self.events.try_recv() {
                Ok(Ok(event)) => {
                    trace!("Queued {:?} for {:?}", event.kind, event.paths);
                    if !self.counts(&event) {
                        continue;
                    }
                    if matches!(event.kind, EventKind::Remove(_))
                        && event.paths.iter().any(|p| self.root.is_root(p))
                    {
                        drained.target_removed = true;
                    }
                    drained.changes += 1;
                }
                Ok(Err(err)) => drained.errors.push(err),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    drained.disconnected = true;
                    break;
                }
            }
        }

        if self.overflowed.swap(false, Ordering::AcqRel) {
            // Dropped events may have carried writes the cache never saw
            self.times = WriteTimes::snapshot(&self.root);
            drained.overflowed = true;
            drained.changes += 1;
        }

        drained
    }

    fn counts(&mut self, event: &Event) -> bool {
        if is_attribute_change(event) && !event.need_rescan() {
            let mut moved = false;
            for path in &event.paths {
                moved |= self.times.refresh(&self.root, path);
            }
            return moved;
        }

        if !is_relevant(event) {
            return false;
        }
        for path in &event.paths {
            self.times.refresh(&self.root, path);
        }
        true
    }
}
