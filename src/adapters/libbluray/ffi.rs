//! Raw declarations for the parts of libbluray's public API that are read.
//!
//! Layouts follow `libbluray/bluray.h` from the 1.x series.

#![allow(non_camel_case_types, dead_code)]

use libc::{c_char, c_int, c_uint, c_void};

#[repr(C)]
pub struct BLURAY {
    _private: [u8; 0],
}

#[repr(C)]
pub struct BLURAY_DISC_INFO {
    pub bluray_detected: u8,

    pub disc_name: *const c_char,
    pub udf_volume_id: *const c_char,
    pub disc_id: [u8; 20],

    pub no_menu_support: u8,
    pub first_play_supported: u8,
    pub top_menu_supported: u8,

    pub num_titles: u32,
    pub titles: *const *const c_void,
    pub first_play: *const c_void,
    pub top_menu: *const c_void,

    pub num_hdmv_titles: u32,
    pub num_bdj_titles: u32,
    pub num_unsupported_titles: u32,

    pub bdj_detected: u8,
    pub bdj_supported: u8,
    pub libjvm_detected: u8,
    pub bdj_handled: u8,

    pub bdj_org_id: [c_char; 9],
    pub bdj_disc_id: [c_char; 33],

    pub video_format: u8,
    pub frame_rate: u8,
    pub content_exist_3d: u8,
    pub initial_output_mode_preference: u8,
    pub provider_data: [u8; 32],

    pub aacs_detected: u8,
    pub libaacs_detected: u8,
    pub aacs_handled: u8,

    pub aacs_error_code: c_int,
    pub aacs_mkbv: c_int,

    pub bdplus_detected: u8,
    pub libbdplus_detected: u8,
    pub bdplus_handled: u8,

    pub bdplus_gen: u8,
    pub bdplus_date: u32,

    pub initial_dynamic_range_type: u8,
}

#[repr(C)]
pub struct BLURAY_STREAM_INFO {
    pub coding_type: u8,
    pub format: u8,
    pub rate: u8,
    pub char_code: u8,
    pub lang: [u8; 4],
    pub pid: u16,
    pub aspect: u8,
    pub subpath_id: u8,
}

#[repr(C)]
pub struct BLURAY_CLIP_INFO {
    pub pkt_count: u32,
    pub still_mode: u8,
    pub still_time: u16,
    pub video_stream_count: u8,
    pub audio_stream_count: u8,
    pub pg_stream_count: u8,
    pub ig_stream_count: u8,
    pub sec_audio_stream_count: u8,
    pub sec_video_stream_count: u8,
    pub video_streams: *mut BLURAY_STREAM_INFO,
    pub audio_streams: *mut BLURAY_STREAM_INFO,
    pub pg_streams: *mut BLURAY_STREAM_INFO,
    pub ig_streams: *mut BLURAY_STREAM_INFO,
    pub sec_audio_streams: *mut BLURAY_STREAM_INFO,
    pub sec_video_streams: *mut BLURAY_STREAM_INFO,
    pub start_time: u64,
    pub in_time: u64,
    pub out_time: u64,
    pub clip_id: [c_char; 6],
}

#[repr(C)]
pub struct BLURAY_TITLE_CHAPTER {
    pub idx: u32,
    pub start: u64,
    pub duration: u64,
    pub offset: u64,
    pub clip_ref: c_uint,
}

#[repr(C)]
pub struct BLURAY_TITLE_MARK {
    pub idx: u32,
    pub type_: c_int,
    pub start: u64,
    pub duration: u64,
    pub offset: u64,
    pub clip_ref: c_uint,
}

#[repr(C)]
pub struct BLURAY_TITLE_INFO {
    pub idx: u32,
    pub playlist: u32,
    pub duration: u64,
    pub clip_count: u32,
    pub angle_count: u8,
    pub chapter_count: u32,
    pub mark_count: u32,
    pub clips: *mut BLURAY_CLIP_INFO,
    pub chapters: *mut BLURAY_TITLE_CHAPTER,
    pub marks: *mut BLURAY_TITLE_MARK,
    pub mvc_base_view_r_flag: u8,
}

#[link(name = "bluray")]
unsafe extern "C" {
    pub fn bd_open(device_path: *const c_char, keyfile_path: *const c_char) -> *mut BLURAY;
    pub fn bd_close(bd: *mut BLURAY);
    pub fn bd_get_disc_info(bd: *mut BLURAY) -> *const BLURAY_DISC_INFO;
    pub fn bd_get_titles(bd: *mut BLURAY, flags: u8, min_title_length: u32) -> u32;
    pub fn bd_get_main_title(bd: *mut BLURAY) -> c_int;
    pub fn bd_get_title_info(bd: *mut BLURAY, title_idx: u32, angle: c_uint)
    -> *mut BLURAY_TITLE_INFO;
    pub fn bd_free_title_info(title_info: *mut BLURAY_TITLE_INFO);
}
