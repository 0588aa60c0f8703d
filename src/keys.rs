//! Keyword selection for mtree output.
//!
//! Each mtree keyword (attribute or digest) has a flag; a [`KeySet`] is the
//! set of flags currently enabled on a writer. Digest flags exist only when
//! the matching algorithm is compiled into this build, and their keyword
//! names are unrecognized otherwise.

/// A set of enabled mtree keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySet(u32);

impl KeySet {
    pub const EMPTY: KeySet = KeySet(0);

    /// `cksum` — POSIX checksum of file content.
    pub const CKSUM: KeySet = KeySet(1 << 0);
    /// `device` — device major/minor for char and block entries.
    pub const DEV: KeySet = KeySet(1 << 1);
    /// `flags` — file flags text.
    pub const FLAGS: KeySet = KeySet(1 << 2);
    /// `gid` — numeric group id.
    pub const GID: KeySet = KeySet(1 << 3);
    /// `gname` — group name.
    pub const GNAME: KeySet = KeySet(1 << 4);
    /// `md5digest` — MD5 of file content.
    pub const MD5: KeySet = KeySet(1 << 5);
    /// `mode` — permission bits, octal.
    pub const MODE: KeySet = KeySet(1 << 6);
    /// `nlink` — hard link count.
    pub const NLINK: KeySet = KeySet(1 << 7);
    /// `rmd160digest` — RIPEMD-160 of file content.
    pub const RMD160: KeySet = KeySet(1 << 8);
    /// `sha1digest` — SHA-1 of file content.
    pub const SHA1: KeySet = KeySet(1 << 9);
    /// `sha256digest` — SHA-256 of file content.
    pub const SHA256: KeySet = KeySet(1 << 10);
    /// `sha384digest` — SHA-384 of file content.
    pub const SHA384: KeySet = KeySet(1 << 11);
    /// `sha512digest` — SHA-512 of file content.
    pub const SHA512: KeySet = KeySet(1 << 12);
    /// `size` — content length in bytes.
    pub const SIZE: KeySet = KeySet(1 << 13);
    /// `link` — symlink target.
    pub const SLINK: KeySet = KeySet(1 << 14);
    /// `time` — modification time, seconds and nanoseconds.
    pub const TIME: KeySet = KeySet(1 << 15);
    /// `type` — entry file type.
    pub const TYPE: KeySet = KeySet(1 << 16);
    /// `uid` — numeric user id.
    pub const UID: KeySet = KeySet(1 << 17);
    /// `uname` — user name.
    pub const UNAME: KeySet = KeySet(1 << 18);

    /// Every keyword, including digests not enabled by default.
    pub const ALL: KeySet = KeySet((1 << 19) - 1);

    /// The keywords enabled on a fresh writer.
    pub const DEFAULT: KeySet = KeySet(
        Self::DEV.0
            | Self::FLAGS.0
            | Self::GID.0
            | Self::GNAME.0
            | Self::SLINK.0
            | Self::MODE.0
            | Self::NLINK.0
            | Self::SIZE.0
            | Self::TIME.0
            | Self::TYPE.0
            | Self::UID.0
            | Self::UNAME.0,
    );

    #[inline]
    pub fn contains(self, other: KeySet) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn intersects(self, other: KeySet) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub fn insert(&mut self, other: KeySet) {
        self.0 |= other.0;
    }

    #[inline]
    pub fn remove(&mut self, other: KeySet) {
        self.0 &= !other.0;
    }

    /// Map a configuration keyword to its flag.
    ///
    /// Returns `None` for keywords this build does not support, which
    /// callers surface as a non-fatal "unsupported" condition. Digest
    /// keywords accept both the short name and the `*digest` form.
    pub(crate) fn for_keyword(key: &str) -> Option<KeySet> {
        let flag = match key {
            "all" => Self::ALL,
            "cksum" => Self::CKSUM,
            "device" => Self::DEV,
            "flags" => Self::FLAGS,
            "gid" => Self::GID,
            "gname" => Self::GNAME,
            "link" => Self::SLINK,
            #[cfg(feature = "md5")]
            "md5" | "md5digest" => Self::MD5,
            "mode" => Self::MODE,
            "nlink" => Self::NLINK,
            #[cfg(feature = "rmd160")]
            "ripemd160digest" | "rmd160" | "rmd160digest" => Self::RMD160,
            #[cfg(feature = "sha1")]
            "sha1" | "sha1digest" => Self::SHA1,
            #[cfg(feature = "sha2")]
            "sha256" | "sha256digest" => Self::SHA256,
            #[cfg(feature = "sha2")]
            "sha384" | "sha384digest" => Self::SHA384,
            #[cfg(feature = "sha2")]
            "sha512" | "sha512digest" => Self::SHA512,
            "size" => Self::SIZE,
            "time" => Self::TIME,
            "type" => Self::TYPE,
            "uid" => Self::UID,
            "uname" => Self::UNAME,
            _ => return None,
        };
        Some(flag)
    }
}

impl Default for KeySet {
    fn default() -> Self {
        Self::DEFAULT
    }
}
