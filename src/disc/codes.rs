//! Numeric stream attribute codes reported by libbluray.
//!
//! Each mapping is total: values without a named variant land in
//! `Unknown(code)` and keep their raw value.

use std::fmt;

use serde::{Serialize, Serializer};

macro_rules! code_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident = $code:literal => $label:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
            Unknown(u8),
        }

        impl $name {
            pub fn from_code(code: u8) -> Self {
                match code {
                    $($code => Self::$variant,)+
                    other => Self::Unknown(other),
                }
            }

            pub fn code(&self) -> u8 {
                match self {
                    $(Self::$variant => $code,)+
                    Self::Unknown(code) => *code,
                }
            }
        }

        impl From<u8> for $name {
            fn from(code: u8) -> Self {
                Self::from_code(code)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($label),)+
                    Self::Unknown(code) => write!(f, "unknown (0x{:02x})", code),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }
    };
}

code_enum! {
    /// Elementary stream coding type.
    CodingType {
        Mpeg1Video = 0x01 => "MPEG-1 Video",
        Mpeg2Video = 0x02 => "MPEG-2 Video",
        Mpeg1Audio = 0x03 => "MPEG-1 Audio",
        Mpeg2Audio = 0x04 => "MPEG-2 Audio",
        H264 = 0x1b => "H.264",
        Hevc = 0x24 => "HEVC",
        Lpcm = 0x80 => "LPCM",
        Ac3 = 0x81 => "AC-3",
        Dts = 0x82 => "DTS",
        TrueHd = 0x83 => "TrueHD",
        Ac3Plus = 0x84 => "AC-3 Plus",
        DtsHd = 0x85 => "DTS-HD",
        DtsHdMaster = 0x86 => "DTS-HD Master",
        PresentationGraphics = 0x90 => "Presentation Graphics",
        InteractiveGraphics = 0x91 => "Interactive Graphics",
        TextSubtitle = 0x92 => "Text Subtitle",
        Ac3PlusSecondary = 0xa1 => "AC-3 Plus (secondary)",
        DtsHdSecondary = 0xa2 => "DTS-HD (secondary)",
        Vc1 = 0xea => "VC-1",
    }
}

code_enum! {
    VideoFormat {
        Interlaced480 = 1 => "480i",
        Interlaced576 = 2 => "576i",
        Progressive480 = 3 => "480p",
        Interlaced1080 = 4 => "1080i",
        Progressive720 = 5 => "720p",
        Progressive1080 = 6 => "1080p",
        Progressive576 = 7 => "576p",
        Progressive2160 = 8 => "2160p",
    }
}

code_enum! {
    /// Video frame rate.
    VideoRate {
        Film = 1 => "23.976",
        Fps24 = 2 => "24",
        Fps25 = 3 => "25",
        Ntsc = 4 => "29.97",
        Fps50 = 6 => "50",
        Fps5994 = 7 => "59.94",
    }
}

code_enum! {
    AspectRatio {
        Standard = 2 => "4:3",
        Widescreen = 3 => "16:9",
    }
}

code_enum! {
    /// Audio channel layout.
    AudioFormat {
        Mono = 1 => "mono",
        Stereo = 3 => "stereo",
        MultiChannel = 6 => "multichannel",
        StereoMultiChannel = 12 => "stereo + multichannel",
    }
}

code_enum! {
    AudioRate {
        Hz48000 = 1 => "48 kHz",
        Hz96000 = 4 => "96 kHz",
        Hz192000 = 5 => "192 kHz",
        Hz192000Combo = 12 => "192 kHz / 48 kHz",
        Hz96000Combo = 14 => "96 kHz / 48 kHz",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_round_trip() {
        for code in [0x01u8, 0x1b, 0x24, 0x83, 0x86, 0x90, 0xea] {
            let coding = CodingType::from_code(code);
            assert!(
                !matches!(coding, CodingType::Unknown(_)),
                "0x{code:02x} should be known"
            );
            assert_eq!(coding.code(), code);
        }
    }

    #[test]
    fn test_unknown_code_keeps_value() {
        let coding = CodingType::from(0x7f);
        assert_eq!(coding, CodingType::Unknown(0x7f));
        assert_eq!(coding.code(), 0x7f);
        assert_eq!(coding.to_string(), "unknown (0x7f)");
    }

    #[test]
    fn test_labels() {
        assert_eq!(VideoFormat::from(6).to_string(), "1080p");
        assert_eq!(VideoRate::from(1).to_string(), "23.976");
        assert_eq!(AspectRatio::from(3).to_string(), "16:9");
        assert_eq!(AudioFormat::from(6).to_string(), "multichannel");
        assert_eq!(AudioRate::from(5).to_string(), "192 kHz");
        assert_eq!(AudioRate::from(0), AudioRate::Unknown(0));
    }

    #[test]
    fn test_serializes_as_label() {
        let json = serde_json::to_string(&CodingType::TrueHd).unwrap();
        assert_eq!(json, "\"TrueHD\"");
    }
}
