use std::path::Path;

use tracing::debug;

use crate::disc::{
    AspectRatio, AudioFormat, AudioRate, AudioStream, Chapter, Clip, CodingType, Disc, DiscError,
    DiscReader, ReadRequest, SubtitleStream, Ticks, Title, VideoFormat, VideoRate, VideoStream,
    ticks::TICKS_PER_SECOND,
};

/// In-memory disc for tests and `--simulation` runs.
///
/// The device path is not opened; the configured disc is returned with the
/// request's device and KEYDB paths filled in.
pub struct SimulatedReader {
    disc: Disc,
}

impl SimulatedReader {
    pub fn new(disc: Disc) -> Self {
        Self { disc }
    }
}

impl Default for SimulatedReader {
    fn default() -> Self {
        Self::new(sample_disc())
    }
}

impl DiscReader for SimulatedReader {
    fn read(&self, request: &ReadRequest) -> Result<Disc, DiscError> {
        request.validate()?;
        debug!(device = %request.device.display(), "(Simulated) Reading disc");

        let mut disc = self.disc.clone();
        disc.device = request.device.clone();
        disc.keydb = request.keydb.clone();

        let min_ticks = u64::from(request.min_title_length) * TICKS_PER_SECOND;
        if min_ticks > 0 {
            disc.titles.retain(|t| t.length.0 >= min_ticks);
            for (idx, title) in disc.titles.iter_mut().enumerate() {
                title.index = idx as u32;
            }
            disc.main_title = disc
                .titles
                .iter()
                .max_by_key(|t| t.length)
                .map(|t| t.index);
        }

        if disc.titles.is_empty() {
            return Err(DiscError::NoTitles);
        }

        Ok(disc)
    }
}

fn secs(s: u64) -> Ticks {
    Ticks(s * TICKS_PER_SECOND)
}

fn feature_clip(index: u32, clip_id: &str) -> Clip {
    Clip {
        index,
        clip_id: clip_id.to_string(),
        videos: vec![VideoStream {
            index: 0,
            pid: 0x1011,
            language: String::new(),
            coding_type: CodingType::H264,
            format: VideoFormat::Progressive1080,
            rate: VideoRate::Film,
            aspect: AspectRatio::Widescreen,
        }],
        audios: vec![
            AudioStream {
                index: 0,
                pid: 0x1100,
                language: "eng".to_string(),
                coding_type: CodingType::TrueHd,
                format: AudioFormat::MultiChannel,
                rate: AudioRate::Hz48000,
            },
            AudioStream {
                index: 1,
                pid: 0x1101,
                language: "fra".to_string(),
                coding_type: CodingType::Ac3,
                format: AudioFormat::MultiChannel,
                rate: AudioRate::Hz48000,
            },
        ],
        secondary_videos: Vec::new(),
        secondary_audios: Vec::new(),
        subtitles: vec![
            SubtitleStream {
                index: 0,
                pid: 0x1200,
                language: "eng".to_string(),
                coding_type: CodingType::PresentationGraphics,
            },
            SubtitleStream {
                index: 1,
                pid: 0x1201,
                language: "fra".to_string(),
                coding_type: CodingType::PresentationGraphics,
            },
        ],
    }
}

/// A two-title disc: a feature with three chapters and a one-minute extra.
pub fn sample_disc() -> Disc {
    let chapter_len = [secs(1800), secs(2400), secs(2910)];
    let mut start = Ticks(0);
    let chapters = chapter_len
        .iter()
        .enumerate()
        .map(|(i, len)| {
            let chapter = Chapter {
                number: i as u32 + 1,
                start,
                length: *len,
                clip_ref: 0,
            };
            start = start + *len;
            chapter
        })
        .collect::<Vec<_>>();

    let feature = Title {
        index: 0,
        playlist: 800,
        length: start,
        angle_count: 1,
        chapters,
        clips: vec![feature_clip(0, "00055")],
    };

    let extra = Title {
        index: 1,
        playlist: 1,
        length: secs(60),
        angle_count: 1,
        chapters: vec![Chapter {
            number: 1,
            start: Ticks(0),
            length: secs(60),
            clip_ref: 0,
        }],
        clips: vec![Clip {
            subtitles: Vec::new(),
            ..feature_clip(0, "00012")
        }],
    };

    Disc {
        device: Path::new("/dev/sr0").to_path_buf(),
        keydb: None,
        volume_id: Some("SIMULATED_DISC".to_string()),
        disc_id: Some("0123456789abcdef0123456789abcdef".to_string()),
        org_id: Some("00000001".to_string()),
        main_title: Some(0),
        titles: vec![feature, extra],
    }
}
