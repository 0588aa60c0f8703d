//! Archive entry metadata the writer reads from.
//!
//! All name-like fields (path, user/group names, symlink target, flags
//! text) are byte strings: mtree quoting handles arbitrary bytes, so no
//! UTF-8 requirement is imposed here.

/// The file type of an [`Entry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Regular,
    Directory,
    SymbolicLink,
    Fifo,
    Socket,
    CharDevice,
    BlockDevice,
}

/// Metadata for a single archive entry.
///
/// The writer clones this at `write_header` time and keeps the clone until
/// the entry is finished, so the caller's copy only needs to live for the
/// duration of that call.
#[derive(Debug, Clone)]
pub struct Entry {
    /// Entry path, quoted into the leading name token.
    pub path: Vec<u8>,
    pub file_type: FileType,
    /// Declared content length; data writes are clipped to it.
    pub size: u64,
    pub uid: i64,
    pub gid: i64,
    pub uname: Option<Vec<u8>>,
    pub gname: Option<Vec<u8>>,
    /// Permission bits. Only the low 12 bits (0o7777) are emitted.
    pub mode: u32,
    pub nlink: u32,
    /// Modification time, seconds since the epoch.
    pub mtime: i64,
    /// Nanosecond part of the modification time.
    pub mtime_nsec: i64,
    /// Symlink target, meaningful for `SymbolicLink` entries.
    pub link_target: Vec<u8>,
    /// Device numbers, meaningful for char and block entries.
    pub rdev_major: u32,
    pub rdev_minor: u32,
    /// File flag bits known to be set.
    pub fflags_set: u64,
    /// File flag bits known to be clear.
    pub fflags_clear: u64,
    /// Textual rendering of the file flags, if any.
    pub fflags_text: Option<Vec<u8>>,
}

impl Entry {
    pub fn new(path: impl Into<Vec<u8>>, file_type: FileType) -> Self {
        Self {
            path: path.into(),
            file_type,
            size: 0,
            uid: 0,
            gid: 0,
            uname: None,
            gname: None,
            mode: 0,
            nlink: 1,
            mtime: 0,
            mtime_nsec: 0,
            link_target: Vec::new(),
            rdev_major: 0,
            rdev_minor: 0,
            fflags_set: 0,
            fflags_clear: 0,
            fflags_text: None,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn with_owner(mut self, uid: i64, gid: i64) -> Self {
        self.uid = uid;
        self.gid = gid;
        self
    }

    pub fn with_uname(mut self, uname: impl Into<Vec<u8>>) -> Self {
        self.uname = Some(uname.into());
        self
    }

    pub fn with_gname(mut self, gname: impl Into<Vec<u8>>) -> Self {
        self.gname = Some(gname.into());
        self
    }

    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_nlink(mut self, nlink: u32) -> Self {
        self.nlink = nlink;
        self
    }

    pub fn with_mtime(mut self, mtime: i64, mtime_nsec: i64) -> Self {
        self.mtime = mtime;
        self.mtime_nsec = mtime_nsec;
        self
    }

    pub fn with_link_target(mut self, target: impl Into<Vec<u8>>) -> Self {
        self.link_target = target.into();
        self
    }

    pub fn with_rdev(mut self, major: u32, minor: u32) -> Self {
        self.rdev_major = major;
        self.rdev_minor = minor;
        self
    }

    pub fn with_fflags(mut self, set: u64, clear: u64, text: Option<Vec<u8>>) -> Self {
        self.fflags_set = set;
        self.fflags_clear = clear;
        self.fflags_text = text;
        self
    }
}
