use std::fmt::{Display, Formatter};
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;
use url::Url;

/// Leading bytes of every `.sjsir` file, big-endian.
pub const IR_MAGIC: u32 = 0xCAFE4A53;
pub const IR_VERSION_MAJOR: u32 = 1;
pub const IR_VERSION_MINOR: u32 = 17;
pub const IR_FILE_EXTENSION: &str = "sjsir";

/// A classpath entry resolved into something that holds IR files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrContainer {
    Directory(PathBuf),
    Archive(PathBuf),
    SingleFile(PathBuf),
}

impl IrContainer {
    pub fn path(&self) -> &Path {
        match self {
            IrContainer::Directory(path)
            | IrContainer::Archive(path)
            | IrContainer::SingleFile(path) => path,
        }
    }
}

/// An open `.jar` or `.zip`. Its central directory is parsed once.
pub type IrArchive = zip::ZipArchive<std::fs::File>;

pub fn open_archive(path: &Path) -> std::io::Result<IrArchive> {
    let file = std::fs::File::open(path)?;
    Ok(zip::ZipArchive::new(file)?)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum IrLocation {
    File(PathBuf),
    ArchiveEntry(PathBuf),
}

/// Handle to a single IR file. Nothing is read until [`IrFile::read`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IrFile {
    location: IrLocation,
    // Path inside the container, always '/' separated
    relative_path: String,
}

impl IrFile {
    pub fn from_file(path: impl Into<PathBuf>, relative_path: impl Into<String>) -> Self {
        IrFile {
            location: IrLocation::File(path.into()),
            relative_path: relative_path.into(),
        }
    }

    pub fn from_archive(archive: impl Into<PathBuf>, entry: impl Into<String>) -> Self {
        IrFile {
            location: IrLocation::ArchiveEntry(archive.into()),
            relative_path: entry.into(),
        }
    }

    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    /// `java/lang/Object.sjsir` becomes `java.lang.Object`.
    pub fn class_name(&self) -> String {
        let suffix = format!(".{}", IR_FILE_EXTENSION);
        self.relative_path
            .strip_suffix(suffix.as_str())
            .unwrap_or(&self.relative_path)
            .replace('/', ".")
    }

    /// The archive holding this file, if it is an archive entry.
    pub fn archive(&self) -> Option<&Path> {
        match &self.location {
            IrLocation::File(_) => None,
            IrLocation::ArchiveEntry(archive) => Some(archive),
        }
    }

    /// Reads the whole file. Archive entries open their archive each time;
    /// use [`IrFile::read_from`] to read many entries of one archive.
    pub fn read(&self) -> std::io::Result<Vec<u8>> {
        match &self.location {
            IrLocation::File(path) => {
                let mut buffer = Vec::with_capacity(2048);
                std::fs::File::open(path)?.read_to_end(&mut buffer)?;
                Ok(buffer)
            }
            IrLocation::ArchiveEntry(archive) => self.read_from(&mut open_archive(archive)?),
        }
    }

    /// Reads this entry out of an archive that is already open.
    pub fn read_from(&self, archive: &mut IrArchive) -> std::io::Result<Vec<u8>> {
        let mut buffer = Vec::with_capacity(2048);
        archive
            .by_name(&self.relative_path)?
            .read_to_end(&mut buffer)?;

        Ok(buffer)
    }

    /// `file:` URI for plain files, `jar:file:...!/entry` for archive entries.
    pub fn uri(&self) -> Option<Url> {
        match &self.location {
            IrLocation::File(path) => {
                let absolute = std::path::absolute(path).ok()?;
                Url::from_file_path(absolute).ok()
            }
            IrLocation::ArchiveEntry(archive) => {
                let absolute = std::path::absolute(archive).ok()?;
                let archive_url = Url::from_file_path(absolute).ok()?;
                Url::parse(&format!("jar:{}!/{}", archive_url, self.relative_path)).ok()
            }
        }
    }
}

impl Display for IrFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            IrLocation::File(path) => write!(f, "{}", path.display()),
            IrLocation::ArchiveEntry(archive) => {
                write!(f, "{}:{}", archive.display(), self.relative_path)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IrHeaderError {
    #[error("file is too short to hold an IR header")]
    Truncated,
    #[error("bad magic number {0:#010x}")]
    BadMagic(u32),
    #[error("IR version string is not valid UTF-8")]
    InvalidVersionString,
}

/// Magic number followed by a length-prefixed version string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrHeader {
    version: String,
}

impl IrHeader {
    pub fn new(version: impl Into<String>) -> Self {
        IrHeader {
            version: version.into(),
        }
    }

    /// Header for the newest IR version this linker reads.
    pub fn current() -> Self {
        IrHeader::new(format!("{}.{}", IR_VERSION_MAJOR, IR_VERSION_MINOR))
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, IrHeaderError> {
        let magic_bytes: [u8; 4] = bytes
            .get(0..4)
            .and_then(|b| b.try_into().ok())
            .ok_or(IrHeaderError::Truncated)?;
        let magic = u32::from_be_bytes(magic_bytes);

        if magic != IR_MAGIC {
            return Err(IrHeaderError::BadMagic(magic));
        }

        let len_bytes: [u8; 2] = bytes
            .get(4..6)
            .and_then(|b| b.try_into().ok())
            .ok_or(IrHeaderError::Truncated)?;
        let len = u16::from_be_bytes(len_bytes) as usize;

        let version_bytes = bytes.get(6..6 + len).ok_or(IrHeaderError::Truncated)?;
        let version = std::str::from_utf8(version_bytes)
            .map_err(|_| IrHeaderError::InvalidVersionString)?;

        Ok(IrHeader::new(version))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(6 + self.version.len());

        bytes.extend_from_slice(&IR_MAGIC.to_be_bytes());
        bytes.extend_from_slice(&(self.version.len() as u16).to_be_bytes());
        bytes.extend_from_slice(self.version.as_bytes());

        bytes
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Same major version, minor no newer than ours. `-SNAPSHOT` style
    /// suffixes are ignored.
    pub fn is_supported(&self) -> bool {
        let mut parts = self.version.splitn(2, '.');

        let major = parts.next().and_then(|p| p.parse::<u32>().ok());
        let minor = parts
            .next()
            .and_then(|p| p.split('-').next())
            .and_then(|p| p.parse::<u32>().ok());

        match (major, minor) {
            (Some(major), Some(minor)) => major == IR_VERSION_MAJOR && minor <= IR_VERSION_MINOR,
            _ => false,
        }
    }
}
