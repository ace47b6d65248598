//! Ogg Vorbis sample directory.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use cpal::Sample;
use lewton::inside_ogg::OggStreamReader;
use tracing::{debug, info};

use super::{AssetError, AssetProvider, SampleBank, SampleBuffer};
use crate::KEY_COUNT;

const DEFAULT_PREFIX: &str = "KEPSREC";
const FALLBACK_FILE: &str = "hammer.ogg";

/// A directory of per-key Ogg files named `<prefix><key:03>.ogg`.
///
/// Keys without their own file share `hammer.ogg` from the same directory.
pub struct OggDirectory {
    dir: PathBuf,
    prefix: String,
}

impl OggDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: DEFAULT_PREFIX.to_owned(),
        }
    }

    /// Override the file name prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// File that holds the sample for `key`.
    pub fn path_for(&self, key: u8) -> PathBuf {
        let path = self.dir.join(format!("{}{:03}.ogg", self.prefix, key));
        if path.exists() {
            path
        } else {
            self.dir.join(FALLBACK_FILE)
        }
    }
}

impl AssetProvider for OggDirectory {
    fn load_all(&self) -> Result<SampleBank, AssetError> {
        // Several keys usually share the fallback file; decode it once.
        let mut decoded: HashMap<PathBuf, SampleBuffer> = HashMap::new();
        let mut buffers = Vec::with_capacity(KEY_COUNT);

        for key in 0..KEY_COUNT as u8 {
            let path = self.path_for(key);
            let buffer = match decoded.get(&path) {
                Some(buffer) => buffer.clone(),
                None => {
                    let buffer = decode_file(&path)?;
                    debug!(key, path = %path.display(), "decoded sample");
                    decoded.insert(path, buffer.clone());
                    buffer
                }
            };
            buffers.push(buffer);
        }

        info!(
            dir = %self.dir.display(),
            files = decoded.len(),
            "loaded ogg sample bank"
        );
        SampleBank::new(buffers)
    }
}

fn decode_file(path: &Path) -> Result<SampleBuffer, AssetError> {
    let file = File::open(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let vorbis_err = |source| AssetError::Vorbis {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = OggStreamReader::new(BufReader::new(file)).map_err(vorbis_err)?;
    let channels = reader.ident_hdr.audio_channels as usize;
    let sample_rate = reader.ident_hdr.audio_sample_rate;

    let mut samples = Vec::new();
    while let Some(packet) = reader.read_dec_packet_itl().map_err(vorbis_err)? {
        samples.extend(packet.into_iter().map(|s| s.to_sample::<f32>()));
    }

    if samples.is_empty() {
        return Err(AssetError::EmptySample {
            path: path.to_path_buf(),
        });
    }

    Ok(SampleBuffer::new(samples, channels, sample_rate))
}
