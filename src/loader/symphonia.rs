use crate::error::{PrepError, PrepResult};
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Symphonia-based loader for non-WAV containers (FLAC, OGG, MP3, ...)
pub struct SymphoniaLoader {
    /// Current reader for the audio source
    reader: Box<dyn symphonia::core::formats::FormatReader>,
    /// Track information
    track_id: u32,
    /// Sample rate reported by the container
    sample_rate: u32,
    /// Channel count reported by the container
    channels: usize,
    /// Current decoder state
    decoder: Box<dyn symphonia::core::codecs::Decoder>,
}

impl SymphoniaLoader {
    /// Create a loader from a file path
    pub fn from_file<P: AsRef<Path>>(path: P) -> PrepResult<Self> {
        let path = path.as_ref();

        let file = Box::new(File::open(path).map_err(PrepError::Io)?);
        let mss = MediaSourceStream::new(file, Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let format_opts = FormatOptions::default();
        let metadata_opts = MetadataOptions::default();

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &format_opts, &metadata_opts)
            .map_err(|e| PrepError::Format {
                path: path.to_path_buf(),
                detail: format!("unsupported container: {}", e),
            })?;

        let reader = probed.format;

        let track = reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
            .ok_or_else(|| PrepError::Format {
                path: path.to_path_buf(),
                detail: "no audio track found".to_string(),
            })?
            .clone();

        let track_id = track.id;
        let codec_params = &track.codec_params;

        let sample_rate = codec_params.sample_rate.ok_or_else(|| PrepError::Format {
            path: path.to_path_buf(),
            detail: "unknown sample rate".to_string(),
        })?;

        let channels = codec_params
            .channels
            .map(|c| c.count())
            .ok_or_else(|| PrepError::Format {
                path: path.to_path_buf(),
                detail: "unknown channel count".to_string(),
            })?;

        let decoder = symphonia::default::get_codecs()
            .make(codec_params, &Default::default())
            .map_err(|e| PrepError::Decode(e.to_string()))?;

        Ok(SymphoniaLoader {
            reader,
            track_id,
            sample_rate,
            channels,
            decoder,
        })
    }

    /// Sample rate reported by the container
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Channel count reported by the container
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Decode the whole stream into interleaved f32 samples
    ///
    /// Returns `(samples, sample_rate, channels)`.
    pub fn decode_all(mut self) -> PrepResult<(Vec<f32>, u32, usize)> {
        let mut samples = Vec::new();
        let mut sample_buf: Option<SampleBuffer<f32>> = None;

        loop {
            let packet = match self.reader.next_packet() {
                Ok(packet) => packet,
                Err(symphonia::core::errors::Error::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(symphonia::core::errors::Error::DecodeError(_)) => {
                    // Skip corrupt packets and try the next one
                    continue;
                }
                Err(e) => return Err(PrepError::Decode(e.to_string())),
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            let decoded = match self.decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(e) => return Err(PrepError::Decode(e.to_string())),
            };

            let buf = sample_buf.get_or_insert_with(|| {
                SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec())
            });
            if buf.capacity() < decoded.capacity() * self.channels {
                *buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
            }
            buf.copy_interleaved_ref(decoded);
            samples.extend_from_slice(buf.samples());
        }

        Ok((samples, self.sample_rate, self.channels))
    }
}
