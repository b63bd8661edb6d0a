//! Owned Blu-ray metadata model.
//!
//! A [`Disc`] is read eagerly by a [`DiscReader`]: every title, chapter, clip
//! and stream is copied out of the native library before the reader returns,
//! so nothing here refers back into native memory. Accessors mirror the
//! numbering used on disc: titles, clips and streams are 0-based, chapters are
//! 1-based.

pub mod codes;
pub mod error;
pub mod reader;
pub mod ticks;
pub mod xml;

use std::path::PathBuf;

use serde::Serialize;

pub use codes::{AspectRatio, AudioFormat, AudioRate, CodingType, VideoFormat, VideoRate};
pub use error::{DiscError, ItemKind};
pub use reader::{DiscReader, ReadRequest, TitleFilter};
pub use ticks::Ticks;

fn get_indexed<T>(items: &[T], kind: ItemKind, index: u32) -> Result<&T, DiscError> {
    items.get(index as usize).ok_or(DiscError::OutOfRange {
        kind,
        requested: index,
        available: items.len() as u32,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Disc {
    pub device: PathBuf,
    pub keydb: Option<PathBuf>,
    pub volume_id: Option<String>,
    pub disc_id: Option<String>,
    pub org_id: Option<String>,
    pub main_title: Option<u32>,
    pub titles: Vec<Title>,
}

impl Disc {
    pub fn title_count(&self) -> u32 {
        self.titles.len() as u32
    }

    pub fn title(&self, index: u32) -> Result<&Title, DiscError> {
        get_indexed(&self.titles, ItemKind::Title, index)
    }

    /// The title libbluray picked as the main feature, if any.
    pub fn main(&self) -> Option<&Title> {
        self.main_title.and_then(|idx| self.title(idx).ok())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub index: u32,
    pub playlist: u32,
    pub length: Ticks,
    pub angle_count: u8,
    pub chapters: Vec<Chapter>,
    pub clips: Vec<Clip>,
}

impl Title {
    pub fn chapter_count(&self) -> u32 {
        self.chapters.len() as u32
    }

    pub fn clip_count(&self) -> u32 {
        self.clips.len() as u32
    }

    /// Chapter by 1-based number.
    pub fn chapter(&self, number: u32) -> Result<&Chapter, DiscError> {
        let out_of_range = DiscError::OutOfRange {
            kind: ItemKind::Chapter,
            requested: number,
            available: self.chapter_count(),
        };
        match number.checked_sub(1) {
            Some(idx) => self.chapters.get(idx as usize).ok_or(out_of_range),
            None => Err(out_of_range),
        }
    }

    pub fn clip(&self, index: u32) -> Result<&Clip, DiscError> {
        get_indexed(&self.clips, ItemKind::Clip, index)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chapter {
    pub number: u32,
    pub start: Ticks,
    pub length: Ticks,
    pub clip_ref: u32,
}

impl Chapter {
    pub fn end(&self) -> Ticks {
        self.start + self.length
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Clip {
    pub index: u32,
    pub clip_id: String,
    pub videos: Vec<VideoStream>,
    pub audios: Vec<AudioStream>,
    pub secondary_videos: Vec<VideoStream>,
    pub secondary_audios: Vec<AudioStream>,
    pub subtitles: Vec<SubtitleStream>,
}

impl Clip {
    pub fn video(&self, index: u32) -> Result<&VideoStream, DiscError> {
        get_indexed(&self.videos, ItemKind::Video, index)
    }

    pub fn audio(&self, index: u32) -> Result<&AudioStream, DiscError> {
        get_indexed(&self.audios, ItemKind::Audio, index)
    }

    pub fn subtitle(&self, index: u32) -> Result<&SubtitleStream, DiscError> {
        get_indexed(&self.subtitles, ItemKind::Subtitle, index)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoStream {
    pub index: u32,
    pub pid: u16,
    pub language: String,
    pub coding_type: CodingType,
    pub format: VideoFormat,
    pub rate: VideoRate,
    pub aspect: AspectRatio,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioStream {
    pub index: u32,
    pub pid: u16,
    pub language: String,
    pub coding_type: CodingType,
    pub format: AudioFormat,
    pub rate: AudioRate,
}

/// Presentation graphics stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtitleStream {
    pub index: u32,
    pub pid: u16,
    pub language: String,
    pub coding_type: CodingType,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title() -> Title {
        Title {
            index: 0,
            playlist: 800,
            length: Ticks(900_000),
            angle_count: 1,
            chapters: vec![
                Chapter {
                    number: 1,
                    start: Ticks(0),
                    length: Ticks(450_000),
                    clip_ref: 0,
                },
                Chapter {
                    number: 2,
                    start: Ticks(450_000),
                    length: Ticks(450_000),
                    clip_ref: 0,
                },
            ],
            clips: vec![Clip {
                index: 0,
                clip_id: "00001".to_string(),
                videos: Vec::new(),
                audios: Vec::new(),
                secondary_videos: Vec::new(),
                secondary_audios: Vec::new(),
                subtitles: vec![SubtitleStream {
                    index: 0,
                    pid: 0x1200,
                    language: "eng".to_string(),
                    coding_type: CodingType::PresentationGraphics,
                }],
            }],
        }
    }

    #[test]
    fn test_chapters_are_one_based() {
        let title = title();
        assert_eq!(title.chapter(1).unwrap().start, Ticks(0));
        assert_eq!(title.chapter(2).unwrap().end(), Ticks(900_000));

        let err = title.chapter(0).unwrap_err();
        assert!(matches!(
            err,
            DiscError::OutOfRange {
                kind: ItemKind::Chapter,
                requested: 0,
                available: 2
            }
        ));
        assert!(title.chapter(3).is_err());
    }

    #[test]
    fn test_clips_and_streams_are_zero_based() {
        let title = title();
        let clip = title.clip(0).unwrap();
        assert_eq!(clip.subtitle(0).unwrap().language, "eng");
        assert!(clip.subtitle(1).is_err());
        assert!(clip.video(0).is_err());
        assert!(title.clip(1).is_err());
    }

    #[test]
    fn test_out_of_range_message() {
        let disc = Disc {
            device: PathBuf::from("/dev/sr0"),
            keydb: None,
            volume_id: None,
            disc_id: None,
            org_id: None,
            main_title: Some(0),
            titles: vec![title()],
        };
        assert_eq!(disc.main().map(|t| t.playlist), Some(800));
        assert_eq!(
            disc.title(1).unwrap_err().to_string(),
            "title number 1 is out of range (1 available)"
        );
    }
}
