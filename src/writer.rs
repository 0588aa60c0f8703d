//! Streaming mtree specification writer.
//!
//! The writer assembles one logical line per entry, emits attribute
//! keywords only when they differ from the `/set` baseline captured from
//! the first regular file, and buffers finished lines until they are worth
//! flushing to the sink.

use std::io::Write;

use crate::digest::SumPipeline;
use crate::entry::{Entry, FileType};
use crate::escape::escape_into;
use crate::keys::KeySet;
use crate::wrap::LineBuffer;

/// Flush the output buffer to the sink once it grows past this.
const FLUSH_THRESHOLD: usize = 32 * 1024;

/// Errors produced by [`MtreeWriter`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `finish_entry` was called with no entry open. Fatal: the caller has
    /// broken the header/data/finish protocol.
    #[error("finished entry without being open first")]
    EntryNotOpen,
    /// The keyword is not recognized by this build. Non-fatal; callers may
    /// probe for digest availability this way.
    #[error("unsupported mtree keyword: {0}")]
    Unsupported(String),
    /// The byte sink failed. Fatal; the stream is unusable.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Baseline attribute values established by the `/set` directive.
#[derive(Debug, Clone, Copy, Default)]
struct SetValues {
    uid: i64,
    gid: i64,
    mode: u32,
    fflags_set: u64,
    fflags_clear: u64,
}

/// Writer producing an mtree specification file on `sink`.
///
/// Entries follow a fixed protocol: [`write_header`](Self::write_header),
/// zero or more [`write_data`](Self::write_data) calls, then
/// [`finish_entry`](Self::finish_entry); [`finish`](Self::finish) flushes
/// the stream once all entries are written.
pub struct MtreeWriter<W: Write> {
    sink: W,
    keys: KeySet,
    first: bool,
    defaults_pending: bool,
    defaults: SetValues,
    pending: Option<Entry>,
    bytes_remaining: u64,
    sums: SumPipeline,
    line: LineBuffer,
    out: Vec<u8>,
    finished: bool,
}

impl<W: Write> Drop for MtreeWriter<W> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!(
                "MtreeWriter dropped without calling finish(). \
                 Buffered specification output was discarded."
            );
        }
    }
}

impl<W: Write> MtreeWriter<W> {
    /// Create a writer with the default keyword set.
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            keys: KeySet::DEFAULT,
            first: true,
            defaults_pending: true,
            defaults: SetValues::default(),
            pending: None,
            bytes_remaining: 0,
            sums: SumPipeline::empty(),
            line: LineBuffer::new(),
            out: Vec::new(),
            finished: false,
        }
    }

    /// The keywords currently enabled.
    pub fn keys(&self) -> KeySet {
        self.keys
    }

    /// Enable or disable a keyword by name.
    ///
    /// A present `value` enables the keyword, `None` disables it. Unknown
    /// keywords (including digests not compiled into this build) return
    /// [`Error::Unsupported`], which leaves the session fully usable.
    pub fn set_option(&mut self, key: &str, value: Option<&str>) -> Result<(), Error> {
        let Some(flag) = KeySet::for_keyword(key) else {
            return Err(Error::Unsupported(key.to_string()));
        };
        if value.is_some() {
            self.keys.insert(flag);
        } else {
            self.keys.remove(flag);
        }
        Ok(())
    }

    /// Begin a new entry.
    ///
    /// Emits the format signature before the first entry and, on the first
    /// regular file, the `/set` directive establishing the global defaults.
    /// The entry metadata is cloned and held until
    /// [`finish_entry`](Self::finish_entry).
    pub fn write_header(&mut self, entry: &Entry) -> Result<(), Error> {
        tracing::trace!(path = ?String::from_utf8_lossy(&entry.path), "write_header");
        let entry = entry.clone();

        if self.first {
            self.first = false;
            self.out.extend_from_slice(b"#mtree\n");
        }
        if self.defaults_pending && entry.file_type == FileType::Regular {
            self.defaults_pending = false;
            self.write_global_set(&entry);
        }

        self.line.clear();
        escape_into(&mut self.line.buf, &entry.path);
        self.line.pad_to_name_column(&mut self.out);

        self.bytes_remaining = entry.size;
        self.sums = SumPipeline::for_entry(self.keys, entry.file_type == FileType::Regular);
        self.pending = Some(entry);
        Ok(())
    }

    fn write_global_set(&mut self, entry: &Entry) {
        let mut group = KeySet::FLAGS;
        group.insert(KeySet::GID);
        group.insert(KeySet::GNAME);
        group.insert(KeySet::NLINK);
        group.insert(KeySet::MODE);
        group.insert(KeySet::TYPE);
        group.insert(KeySet::UID);
        group.insert(KeySet::UNAME);
        if !self.keys.intersects(group) {
            return;
        }

        let mut set = Vec::new();
        if self.keys.contains(KeySet::TYPE) {
            set.extend_from_slice(b" type=file");
        }
        if self.keys.contains(KeySet::UNAME) {
            if let Some(name) = &entry.uname {
                set.extend_from_slice(b" uname=");
                escape_into(&mut set, name);
            }
        }
        self.defaults.uid = entry.uid;
        if self.keys.contains(KeySet::UID) {
            set.extend_from_slice(format!(" uid={}", self.defaults.uid).as_bytes());
        }
        if self.keys.contains(KeySet::GNAME) {
            if let Some(name) = &entry.gname {
                set.extend_from_slice(b" gname=");
                escape_into(&mut set, name);
            }
        }
        self.defaults.gid = entry.gid;
        if self.keys.contains(KeySet::GID) {
            set.extend_from_slice(format!(" gid={}", self.defaults.gid).as_bytes());
        }
        self.defaults.mode = entry.mode & 0o7777;
        if self.keys.contains(KeySet::MODE) {
            set.extend_from_slice(format!(" mode={:o}", self.defaults.mode).as_bytes());
        }
        if self.keys.contains(KeySet::NLINK) {
            set.extend_from_slice(b" nlink=1");
        }
        if self.keys.contains(KeySet::FLAGS) {
            if let Some(text) = &entry.fflags_text {
                set.extend_from_slice(b" flags=");
                escape_into(&mut set, text);
            }
        }
        self.defaults.fflags_set = entry.fflags_set;
        self.defaults.fflags_clear = entry.fflags_clear;

        if !set.is_empty() {
            self.out.extend_from_slice(b"/set");
            self.out.extend_from_slice(&set);
            self.out.push(b'\n');
        }
    }

    /// Feed content bytes for the open entry.
    ///
    /// Input is clipped to the entry's remaining declared size; the clipped
    /// prefix is fed to every active digest and its length returned. Bytes
    /// past the declared size are ignored, never an error.
    pub fn write_data(&mut self, data: &[u8]) -> usize {
        let n = data.len().min(self.bytes_remaining as usize);
        self.bytes_remaining -= n as u64;
        self.sums.update(&data[..n]);
        n
    }

    /// Complete the open entry: emit its attribute deltas, finalize the
    /// digests, and wrap the logical line into the output buffer.
    pub fn finish_entry(&mut self) -> Result<(), Error> {
        let entry = self.pending.take().ok_or(Error::EntryNotOpen)?;
        let line = &mut self.line;

        if self.keys.contains(KeySet::NLINK)
            && entry.nlink != 1
            && entry.file_type != FileType::Directory
        {
            line.push_str(&format!(" nlink={}", entry.nlink));
        }
        if self.keys.contains(KeySet::GNAME) && self.defaults.gid != entry.gid {
            if let Some(name) = &entry.gname {
                line.push_str(" gname=");
                escape_into(&mut line.buf, name);
            }
        }
        if self.keys.contains(KeySet::UNAME) && self.defaults.uid != entry.uid {
            if let Some(name) = &entry.uname {
                line.push_str(" uname=");
                escape_into(&mut line.buf, name);
            }
        }
        if self.keys.contains(KeySet::FLAGS)
            && (self.defaults.fflags_set != entry.fflags_set
                || self.defaults.fflags_clear != entry.fflags_clear)
        {
            if let Some(text) = &entry.fflags_text {
                line.push_str(" flags=");
                escape_into(&mut line.buf, text);
            }
        }
        if self.keys.contains(KeySet::TIME) {
            line.push_str(&format!(" time={}.{}", entry.mtime, entry.mtime_nsec));
        }
        if self.keys.contains(KeySet::MODE) && self.defaults.mode != entry.mode & 0o7777 {
            line.push_str(&format!(" mode={:o}", entry.mode & 0o7777));
        }
        if self.keys.contains(KeySet::GID) && self.defaults.gid != entry.gid {
            line.push_str(&format!(" gid={}", entry.gid));
        }
        if self.keys.contains(KeySet::UID) && self.defaults.uid != entry.uid {
            line.push_str(&format!(" uid={}", entry.uid));
        }

        match entry.file_type {
            FileType::SymbolicLink => {
                if self.keys.contains(KeySet::TYPE) {
                    line.push_str(" type=link");
                }
                if self.keys.contains(KeySet::SLINK) {
                    line.push_str(" link=");
                    escape_into(&mut line.buf, &entry.link_target);
                }
            }
            FileType::Socket => {
                if self.keys.contains(KeySet::TYPE) {
                    line.push_str(" type=socket");
                }
            }
            FileType::CharDevice => {
                if self.keys.contains(KeySet::TYPE) {
                    line.push_str(" type=char");
                }
                if self.keys.contains(KeySet::DEV) {
                    line.push_str(&format!(
                        " device=native,{},{}",
                        entry.rdev_major, entry.rdev_minor
                    ));
                }
            }
            FileType::BlockDevice => {
                if self.keys.contains(KeySet::TYPE) {
                    line.push_str(" type=block");
                }
                if self.keys.contains(KeySet::DEV) {
                    line.push_str(&format!(
                        " device=native,{},{}",
                        entry.rdev_major, entry.rdev_minor
                    ));
                }
            }
            FileType::Directory => {
                if self.keys.contains(KeySet::TYPE) {
                    line.push_str(" type=dir");
                }
            }
            FileType::Fifo => {
                if self.keys.contains(KeySet::TYPE) {
                    line.push_str(" type=fifo");
                }
            }
            FileType::Regular => {
                // type=file is established by the /set directive.
                if self.keys.contains(KeySet::SIZE) {
                    line.push_str(&format!(" size={}", entry.size));
                }
            }
        }

        let sums = std::mem::replace(&mut self.sums, SumPipeline::empty());
        sums.finalize_into(&mut line.buf);

        line.push_str("\n");
        line.flush_wrapped(&mut self.out);
        self.bytes_remaining = 0;

        if self.out.len() > FLUSH_THRESHOLD {
            self.sink.write_all(&self.out)?;
            self.out.clear();
        }
        Ok(())
    }

    /// Flush all buffered output to the sink and end the stream.
    pub fn finish(&mut self) -> Result<(), Error> {
        self.sink.write_all(&self.out)?;
        self.out.clear();
        self.sink.flush()?;
        self.finished = true;
        Ok(())
    }
}
