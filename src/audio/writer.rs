use std::sync::Arc;

use crossbeam_channel::Receiver;
use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::debug;

use crate::error::HiveError;

/// Background WAV sink. Interleaved blocks arrive over a channel; the file
/// is finalised when every sender is dropped.
pub struct WavOutput;

impl WavOutput {
    pub fn run(
        rx: Receiver<Arc<[f32]>>,
        path: String,
        sample_rate: u32,
        channels: u16,
    ) -> std::thread::JoinHandle<Result<u64, HiveError>> {
        std::thread::spawn(move || {
            let spec = WavSpec {
                channels: channels.max(1),
                sample_rate,
                bits_per_sample: 16,
                sample_format: SampleFormat::Int,
            };
            let mut writer = WavWriter::create(&path, spec)?;
            let mut written: u64 = 0;

            while let Ok(samples) = rx.recv() {
                for &s in samples.iter() {
                    let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                    writer.write_sample(v)?;
                }
                written += samples.len() as u64;
            }

            writer.finalize()?;
            let frames = written / spec.channels as u64;
            debug!("wrote {frames} frames to {path}");
            Ok(frames)
        })
    }
}
