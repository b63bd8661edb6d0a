//! Disc reader backed by libbluray.
//!
//! The native handle and every title-info allocation are owned by guards that
//! release them on drop, so nothing native outlives [`LibblurayReader::read`].

mod ffi;

use std::ffi::{CStr, CString};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::ptr::{self, NonNull};

use libc::c_char;
use tracing::{debug, info};

use crate::disc::{
    AspectRatio, AudioFormat, AudioRate, AudioStream, Chapter, Clip, CodingType, Disc, DiscError,
    DiscReader, ReadRequest, SubtitleStream, Ticks, Title, VideoFormat, VideoRate, VideoStream,
};

pub struct LibblurayReader;

impl DiscReader for LibblurayReader {
    fn read(&self, request: &ReadRequest) -> Result<Disc, DiscError> {
        request.validate()?;

        let handle = Handle::open(&request.device, request.keydb.as_deref())?;
        let info = handle.disc_info().ok_or(DiscError::NoDiscInfo)?;

        let volume_id = unsafe { c_string(info.udf_volume_id) };
        let disc_id = fixed_string(&info.bdj_disc_id);
        let org_id = fixed_string(&info.bdj_org_id);

        let count = handle.title_count(request.title_filter.flags(), request.min_title_length);
        if count == 0 {
            return Err(DiscError::NoTitles);
        }

        let main_title = handle.main_title();
        debug!(titles = count, main_title = ?main_title, "Disc opened");

        let titles = (0..count)
            .map(|idx| handle.title(idx))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            device = %request.device.display(),
            volume_id = volume_id.as_deref().unwrap_or(""),
            titles = titles.len(),
            "Read disc metadata"
        );

        Ok(Disc {
            device: request.device.clone(),
            keydb: request.keydb.clone(),
            volume_id,
            disc_id,
            org_id,
            main_title,
            titles,
        })
    }
}

/// Owned `BLURAY*`, closed on drop.
struct Handle(NonNull<ffi::BLURAY>);

impl Handle {
    fn open(device: &Path, keydb: Option<&Path>) -> Result<Self, DiscError> {
        let open_failed = || DiscError::OpenFailed(device.to_path_buf());

        let device_c = path_cstring(device).ok_or_else(open_failed)?;
        let keydb_c = match keydb {
            Some(path) => Some(path_cstring(path).ok_or_else(open_failed)?),
            None => None,
        };
        let keydb_ptr = keydb_c.as_ref().map_or(ptr::null(), |k| k.as_ptr());

        let raw = unsafe { ffi::bd_open(device_c.as_ptr(), keydb_ptr) };
        NonNull::new(raw).map(Handle).ok_or_else(open_failed)
    }

    fn as_ptr(&self) -> *mut ffi::BLURAY {
        self.0.as_ptr()
    }

    /// Disc info is owned by the handle and valid while it is open.
    fn disc_info(&self) -> Option<&ffi::BLURAY_DISC_INFO> {
        unsafe { ffi::bd_get_disc_info(self.as_ptr()).as_ref() }
    }

    fn title_count(&self, flags: u8, min_title_length: u32) -> u32 {
        unsafe { ffi::bd_get_titles(self.as_ptr(), flags, min_title_length) }
    }

    fn main_title(&self) -> Option<u32> {
        let main = unsafe { ffi::bd_get_main_title(self.as_ptr()) };
        u32::try_from(main).ok()
    }

    fn title(&self, idx: u32) -> Result<Title, DiscError> {
        let raw = unsafe { ffi::bd_get_title_info(self.as_ptr(), idx, 0) };
        let guard = TitleInfo(NonNull::new(raw).ok_or(DiscError::TitleInfo(idx))?);
        let info = guard.get();

        let chapters = unsafe { slice(info.chapters, info.chapter_count as usize) }
            .iter()
            .enumerate()
            .map(|(i, c)| Chapter {
                number: i as u32 + 1,
                start: Ticks(c.start),
                length: Ticks(c.duration),
                clip_ref: c.clip_ref,
            })
            .collect();

        let clips = unsafe { slice(info.clips, info.clip_count as usize) }
            .iter()
            .enumerate()
            .map(|(i, c)| convert_clip(i as u32, c))
            .collect();

        Ok(Title {
            index: idx,
            playlist: info.playlist,
            length: Ticks(info.duration),
            angle_count: info.angle_count,
            chapters,
            clips,
        })
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        unsafe { ffi::bd_close(self.as_ptr()) }
    }
}

/// Owned `BLURAY_TITLE_INFO*`, freed on drop.
struct TitleInfo(NonNull<ffi::BLURAY_TITLE_INFO>);

impl TitleInfo {
    fn get(&self) -> &ffi::BLURAY_TITLE_INFO {
        unsafe { self.0.as_ref() }
    }
}

impl Drop for TitleInfo {
    fn drop(&mut self) {
        unsafe { ffi::bd_free_title_info(self.0.as_ptr()) }
    }
}

fn convert_clip(index: u32, clip: &ffi::BLURAY_CLIP_INFO) -> Clip {
    let streams = |ptr: *mut ffi::BLURAY_STREAM_INFO, count: u8| unsafe {
        slice(ptr.cast_const(), count as usize)
    };

    Clip {
        index,
        clip_id: fixed_string(&clip.clip_id).unwrap_or_default(),
        videos: streams(clip.video_streams, clip.video_stream_count)
            .iter()
            .enumerate()
            .map(|(i, s)| video_stream(i as u32, s))
            .collect(),
        audios: streams(clip.audio_streams, clip.audio_stream_count)
            .iter()
            .enumerate()
            .map(|(i, s)| audio_stream(i as u32, s))
            .collect(),
        secondary_videos: streams(clip.sec_video_streams, clip.sec_video_stream_count)
            .iter()
            .enumerate()
            .map(|(i, s)| video_stream(i as u32, s))
            .collect(),
        secondary_audios: streams(clip.sec_audio_streams, clip.sec_audio_stream_count)
            .iter()
            .enumerate()
            .map(|(i, s)| audio_stream(i as u32, s))
            .collect(),
        subtitles: streams(clip.pg_streams, clip.pg_stream_count)
            .iter()
            .enumerate()
            .map(|(i, s)| SubtitleStream {
                index: i as u32,
                pid: s.pid,
                language: language(&s.lang),
                coding_type: CodingType::from_code(s.coding_type),
            })
            .collect(),
    }
}

fn video_stream(index: u32, s: &ffi::BLURAY_STREAM_INFO) -> VideoStream {
    VideoStream {
        index,
        pid: s.pid,
        language: language(&s.lang),
        coding_type: CodingType::from_code(s.coding_type),
        format: VideoFormat::from_code(s.format),
        rate: VideoRate::from_code(s.rate),
        aspect: AspectRatio::from_code(s.aspect),
    }
}

fn audio_stream(index: u32, s: &ffi::BLURAY_STREAM_INFO) -> AudioStream {
    AudioStream {
        index,
        pid: s.pid,
        language: language(&s.lang),
        coding_type: CodingType::from_code(s.coding_type),
        format: AudioFormat::from_code(s.format),
        rate: AudioRate::from_code(s.rate),
    }
}

fn path_cstring(path: &Path) -> Option<CString> {
    CString::new(path.as_os_str().as_bytes()).ok()
}

/// View a native array; a null pointer is an empty slice.
///
/// # Safety
/// `ptr` must be null or point to `len` initialized values that stay alive
/// for the returned lifetime.
unsafe fn slice<'a, T>(ptr: *const T, len: usize) -> &'a [T] {
    if ptr.is_null() || len == 0 {
        &[]
    } else {
        unsafe { std::slice::from_raw_parts(ptr, len) }
    }
}

/// # Safety
/// `ptr` must be null or a NUL-terminated string.
unsafe fn c_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    let value = unsafe { CStr::from_ptr(ptr) }.to_string_lossy().trim().to_string();
    (!value.is_empty()).then_some(value)
}

/// Read a fixed-size, possibly unterminated, character array.
fn fixed_string(chars: &[c_char]) -> Option<String> {
    let bytes: Vec<u8> = chars
        .iter()
        .take_while(|c| **c != 0)
        .map(|c| *c as u8)
        .collect();
    let value = String::from_utf8_lossy(&bytes).trim().to_string();
    (!value.is_empty()).then_some(value)
}

fn language(lang: &[u8; 4]) -> String {
    let bytes: Vec<u8> = lang.iter().take_while(|b| **b != 0).copied().collect();
    String::from_utf8_lossy(&bytes).to_string()
}
